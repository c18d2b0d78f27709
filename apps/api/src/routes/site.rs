use axum::{extract::State, Json};
use serde::Serialize;

use crate::config::{AdSettings, AnalyticsSettings};
use crate::state::{AppState, Banner};

/// Public page configuration. Absent integrations are `null` and reported in `banners`.
#[derive(Debug, Serialize)]
pub struct SiteConfig {
    pub analytics: Option<AnalyticsSettings>,
    pub ads: Option<AdSettings>,
    pub banners: Vec<Banner>,
}

/// GET /api/v1/site
pub async fn site_handler(State(state): State<AppState>) -> Json<SiteConfig> {
    Json(SiteConfig {
        analytics: state.config.analytics.clone().ok(),
        ads: state.config.ads.clone().ok(),
        banners: state.banners(),
    })
}
