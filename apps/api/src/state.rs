use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::{Config, ConfigError, HistorySettings};
use crate::db::{create_pool, ensure_schema};
use crate::errors::AppError;
use crate::generation::{LlmPostGenerator, PostGenerator};
use crate::history::{GenerationStore, MemoryGenerationStore, PgGenerationStore};
use crate::identity::{GoTrueClient, IdentityProvider};
use crate::llm_client::build_provider;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Each collaborator is built once at startup. A feature that could not be
/// configured keeps its `ConfigError`, which handlers return as a 503 and
/// `/api/v1/site` lists as a banner.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub generator: Result<Arc<dyn PostGenerator>, ConfigError>,
    pub identity: Result<Arc<dyn IdentityProvider>, ConfigError>,
    pub history: Result<Arc<dyn GenerationStore>, ConfigError>,
}

/// A configuration problem surfaced to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub feature: &'static str,
    pub message: String,
}

impl AppState {
    /// Builds every collaborator from config. Never fails: errors are kept per feature.
    pub async fn from_config(config: Config) -> Self {
        let generator = config.llm.clone().and_then(|settings| {
            let llm = build_provider(&settings).map_err(|e| ConfigError::Init {
                feature: "Content generation",
                reason: e.to_string(),
            })?;
            info!(
                "LLM client initialized (provider: {:?}, model: {})",
                settings.provider,
                llm.model()
            );
            Ok(Arc::new(LlmPostGenerator::new(llm)) as Arc<dyn PostGenerator>)
        });

        let identity = config.supabase.clone().and_then(|settings| {
            let client = GoTrueClient::new(&settings).map_err(|e| ConfigError::Init {
                feature: "Supabase",
                reason: e.to_string(),
            })?;
            info!("Identity client initialized");
            Ok(Arc::new(client) as Arc<dyn IdentityProvider>)
        });

        let history = match config.history.clone() {
            Ok(settings) => build_history(settings).await,
            Err(e) => Err(e),
        };

        let state = AppState {
            config,
            generator,
            identity,
            history,
        };

        for banner in state.banners() {
            warn!("{} disabled: {}", banner.feature, banner.message);
        }

        state
    }

    pub fn generator(&self) -> Result<&dyn PostGenerator, AppError> {
        feature(&self.generator).map(|g| g.as_ref())
    }

    pub fn identity(&self) -> Result<&dyn IdentityProvider, AppError> {
        feature(&self.identity).map(|i| i.as_ref())
    }

    pub fn history(&self) -> Result<&dyn GenerationStore, AppError> {
        feature(&self.history).map(|h| h.as_ref())
    }

    /// Every disabled feature with a human-readable reason.
    pub fn banners(&self) -> Vec<Banner> {
        let mut banners = Vec::new();
        let mut push = |feature: &'static str, err: Option<&ConfigError>| {
            if let Some(err) = err {
                banners.push(Banner {
                    feature,
                    message: err.to_string(),
                });
            }
        };

        push("generation", self.generator.as_ref().err());
        push("identity", self.identity.as_ref().err());
        push("history", self.history.as_ref().err());
        push("analytics", self.config.analytics.as_ref().err());
        push("ads", self.config.ads.as_ref().err());
        banners
    }
}

fn feature<T: ?Sized>(slot: &Result<Arc<T>, ConfigError>) -> Result<&Arc<T>, AppError> {
    slot.as_ref().map_err(|e| AppError::Config(e.clone()))
}

async fn build_history(
    settings: HistorySettings,
) -> Result<Arc<dyn GenerationStore>, ConfigError> {
    match settings {
        HistorySettings::Memory => {
            warn!("Using in-memory generation history; rows are lost on restart");
            Ok(Arc::new(MemoryGenerationStore::new()))
        }
        HistorySettings::Postgres { database_url } => {
            let init = |e: anyhow::Error| ConfigError::Init {
                feature: "Generation history",
                reason: e.to_string(),
            };
            let pool = create_pool(&database_url).await.map_err(init)?;
            ensure_schema(&pool).await.map_err(init)?;
            Ok(Arc::new(PgGenerationStore::new(pool)))
        }
    }
}
