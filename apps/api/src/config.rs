use anyhow::{Context, Result};
use serde::Serialize;
use thiserror::Error;

/// Google Analytics ships this placeholder in its setup snippet. Treated as unset.
const GA_PLACEHOLDER_ID: &str = "G-XXXXXXXXXX";

/// A feature whose settings could not be read from the environment.
///
/// Carried in `Config` instead of aborting startup so the rest of the service
/// keeps working and the UI can show the message as a banner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{feature} is not configured. Please set {vars} to enable it.")]
    Missing {
        feature: &'static str,
        vars: &'static str,
    },

    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("{feature} could not be initialized: {reason}")]
    Init {
        feature: &'static str,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderKind {
    OpenAi,
    Anthropic,
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub provider: LlmProviderKind,
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct SupabaseSettings {
    pub url: String,
    pub anon_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistorySettings {
    Postgres { database_url: String },
    Memory,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSettings {
    pub measurement_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdSettings {
    pub client_id: String,
    pub slot_id: String,
}

/// Application configuration loaded from environment variables.
///
/// Only `PORT` can fail startup. Every external feature is captured as a
/// `Result` so a missing key disables that feature alone.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub llm: Result<LlmSettings, ConfigError>,
    pub supabase: Result<SupabaseSettings, ConfigError>,
    pub history: Result<HistorySettings, ConfigError>,
    pub analytics: Result<AnalyticsSettings, ConfigError>,
    pub ads: Result<AdSettings, ConfigError>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            port: get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            llm: llm_settings(&get),
            supabase: supabase_settings(&get),
            history: history_settings(&get),
            analytics: analytics_settings(&get),
            ads: ad_settings(&get),
        })
    }
}

fn llm_settings(get: &dyn Fn(&str) -> Option<String>) -> Result<LlmSettings, ConfigError> {
    let provider = match get("LLM_PROVIDER").as_deref().map(str::to_ascii_lowercase) {
        None => LlmProviderKind::OpenAi,
        Some(p) if p == "openai" => LlmProviderKind::OpenAi,
        Some(p) if p == "anthropic" => LlmProviderKind::Anthropic,
        Some(other) => {
            return Err(ConfigError::Invalid {
                key: "LLM_PROVIDER",
                reason: format!("expected 'openai' or 'anthropic', got '{other}'"),
            })
        }
    };

    let (key, feature) = match provider {
        LlmProviderKind::OpenAi => ("OPENAI_API_KEY", "OpenAI API key"),
        LlmProviderKind::Anthropic => ("ANTHROPIC_API_KEY", "Anthropic API key"),
    };

    let api_key = get(key).ok_or(ConfigError::Missing { feature, vars: key })?;
    Ok(LlmSettings { provider, api_key })
}

fn supabase_settings(
    get: &dyn Fn(&str) -> Option<String>,
) -> Result<SupabaseSettings, ConfigError> {
    match (get("SUPABASE_URL"), get("SUPABASE_ANON_KEY")) {
        (Some(url), Some(anon_key)) => {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Invalid {
                    key: "SUPABASE_URL",
                    reason: "must start with http:// or https://".to_string(),
                });
            }
            Ok(SupabaseSettings {
                url: url.trim_end_matches('/').to_string(),
                anon_key,
            })
        }
        _ => Err(ConfigError::Missing {
            feature: "Supabase",
            vars: "SUPABASE_URL and SUPABASE_ANON_KEY",
        }),
    }
}

fn history_settings(
    get: &dyn Fn(&str) -> Option<String>,
) -> Result<HistorySettings, ConfigError> {
    if get("HISTORY_STORE").is_some_and(|s| s.eq_ignore_ascii_case("memory")) {
        return Ok(HistorySettings::Memory);
    }

    get("DATABASE_URL")
        .map(|database_url| HistorySettings::Postgres { database_url })
        .ok_or(ConfigError::Missing {
            feature: "Generation history",
            vars: "DATABASE_URL",
        })
}

fn analytics_settings(
    get: &dyn Fn(&str) -> Option<String>,
) -> Result<AnalyticsSettings, ConfigError> {
    match get("GA_MEASUREMENT_ID") {
        Some(id) if id != GA_PLACEHOLDER_ID => Ok(AnalyticsSettings { measurement_id: id }),
        _ => Err(ConfigError::Missing {
            feature: "Google Analytics",
            vars: "GA_MEASUREMENT_ID",
        }),
    }
}

fn ad_settings(get: &dyn Fn(&str) -> Option<String>) -> Result<AdSettings, ConfigError> {
    match (get("ADSENSE_CLIENT_ID"), get("ADSENSE_SLOT_ID")) {
        (Some(client_id), Some(slot_id)) => Ok(AdSettings { client_id, slot_id }),
        _ => Err(ConfigError::Missing {
            feature: "AdSense",
            vars: "ADSENSE_CLIENT_ID and ADSENSE_SLOT_ID",
        }),
    }
}
