//! Terminal client: sign in, then turn topics typed on stdin into posts.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;
use tracing_subscriber::EnvFilter;

use threadsmith_api::composer::Composer;
use threadsmith_api::config::Config;
use threadsmith_api::generation::OutputType;
use threadsmith_api::history::{GenerationStore, HISTORY_UNAVAILABLE_MESSAGE};
use threadsmith_api::identity::{SessionHandle, SessionState};
use threadsmith_api::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "compose", about = "Generate X/Twitter posts from the terminal")]
struct Args {
    #[arg(long, env = "THREADSMITH_EMAIL")]
    email: String,

    #[arg(long, env = "THREADSMITH_PASSWORD", hide_env_values = true)]
    password: String,

    /// Create the account and exit. Sign in after confirming the email.
    #[arg(long)]
    sign_up: bool,

    /// single, thread or variations
    #[arg(long, default_value = "single")]
    mode: OutputType,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("threadsmith_api={}", config.rust_log))),
        )
        .with_writer(std::io::stderr)
        .init();

    let state = AppState::from_config(config).await;
    for banner in state.banners() {
        eprintln!("[{}] {}", banner.feature, banner.message);
    }

    let identity = state.identity.clone().map_err(|e| anyhow!(e))?;
    let session = Arc::new(SessionHandle::new(identity));
    session.restore(None).await;

    let mut transitions = session.subscribe();
    tokio::spawn(async move {
        while transitions.changed().await.is_ok() {
            match &*transitions.borrow_and_update() {
                SessionState::Authenticated(user) => println!(
                    "* signed in as {}",
                    user.email.as_deref().unwrap_or("(no email)")
                ),
                SessionState::Anonymous => println!("* signed out"),
                SessionState::Unknown => {}
            }
        }
    });

    if args.sign_up {
        session.sign_up(&args.email, &args.password).await?;
        println!("Check your email for the confirmation link!");
        return Ok(());
    }

    session.sign_in(&args.email, &args.password).await?;

    let generator = state.generator.clone().map_err(|e| anyhow!(e))?;
    let history = state.history.clone().ok();
    let mut composer = Composer::new(generator, history.clone());
    composer.set_mode(args.mode);

    println!("Mode: {}. Type a topic, or /mode, /history, /signout, /quit.", composer.mode());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line.split_once(' ').unwrap_or((line, "")) {
            ("/quit", _) => break,
            ("/signout", _) => {
                session.sign_out().await;
                break;
            }
            ("/mode", value) => match value.trim().parse::<OutputType>() {
                Ok(mode) => {
                    composer.set_mode(mode);
                    println!("Mode: {mode}");
                }
                Err(e) => println!("{e}"),
            },
            ("/history", _) => print_history(history.as_deref(), &session).await,
            _ => {
                composer.set_topic(line);
                let principal = session.principal();
                composer.generate(principal.as_ref()).await;
                print_result(&composer);
            }
        }
    }

    Ok(())
}

fn print_result(composer: &Composer) {
    if let Some(error) = composer.error() {
        println!("! {error}");
        return;
    }
    for (i, tweet) in composer.tweets().iter().enumerate() {
        println!("[{}] {tweet}", i + 1);
    }
    if composer.saved() {
        println!("(saved to history)");
    }
}

async fn print_history(store: Option<&dyn GenerationStore>, session: &SessionHandle) {
    let Some(user) = session.principal() else {
        println!("! You must be logged in to view history.");
        return;
    };
    let Some(store) = store else {
        println!("! {HISTORY_UNAVAILABLE_MESSAGE}");
        return;
    };

    match store.list(user.id).await {
        Ok(generations) if generations.is_empty() => println!("No saved generations yet."),
        Ok(generations) => {
            for generation in generations {
                println!(
                    "{}  {}  {} ({} post(s))",
                    generation.created_at.format("%Y-%m-%d %H:%M"),
                    generation.output_type,
                    generation.topic,
                    generation.tweets.len()
                );
            }
        }
        Err(e) => {
            error!("Error fetching generations: {e}");
            println!("! {HISTORY_UNAVAILABLE_MESSAGE}");
        }
    }
}
