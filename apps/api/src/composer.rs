//! The "Generate" interaction, independent of any UI toolkit.
//!
//! A front end renders `topic`, `mode`, `tweets`, `error` and `saved`, and forwards
//! user input to the setters. `generate` takes `&mut self`, so a second request
//! cannot start while one is in flight.

use std::sync::Arc;

use tracing::debug;

use crate::generation::{generate_and_record, OutputType, PostGenerator, PostSequence, Topic};
use crate::history::GenerationStore;
use crate::identity::extract::LOGIN_REQUIRED_MESSAGE;
use crate::identity::Principal;

pub struct Composer {
    generator: Arc<dyn PostGenerator>,
    store: Option<Arc<dyn GenerationStore>>,
    topic: String,
    mode: OutputType,
    tweets: PostSequence,
    error: Option<String>,
    saved: bool,
}

impl Composer {
    pub fn new(generator: Arc<dyn PostGenerator>, store: Option<Arc<dyn GenerationStore>>) -> Self {
        Self {
            generator,
            store,
            topic: String::new(),
            mode: OutputType::default(),
            tweets: Vec::new(),
            error: None,
            saved: false,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn mode(&self) -> OutputType {
        self.mode
    }

    /// Posts from the last successful generation.
    pub fn tweets(&self) -> &[String] {
        &self.tweets
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn saved(&self) -> bool {
        self.saved
    }

    pub fn set_topic(&mut self, topic: impl Into<String>) {
        self.topic = topic.into();
        self.error = None;
        self.saved = false;
    }

    pub fn set_mode(&mut self, mode: OutputType) {
        self.mode = mode;
        self.saved = false;
    }

    pub fn can_submit(&self, principal: Option<&Principal>) -> bool {
        principal.is_some() && !self.topic.trim().is_empty()
    }

    /// Runs one generation. Input problems are reported without any external call.
    pub async fn generate(&mut self, principal: Option<&Principal>) {
        let topic = match Topic::parse(&self.topic) {
            Ok(topic) => topic,
            Err(e) => {
                self.error = Some(e.to_string());
                return;
            }
        };
        let Some(principal) = principal else {
            self.error = Some(LOGIN_REQUIRED_MESSAGE.to_string());
            return;
        };

        self.tweets.clear();
        self.error = None;
        self.saved = false;

        debug!("Composer generating {} for \"{}\"", self.mode, topic);
        match generate_and_record(
            self.generator.as_ref(),
            self.store.as_deref(),
            principal,
            &topic,
            self.mode,
        )
        .await
        {
            Ok(outcome) => {
                self.tweets = outcome.tweets;
                self.saved = outcome.saved;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }
}
