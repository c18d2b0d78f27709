//! Identity: hosted email/password auth and session observation.
//!
//! The provider owns users and credentials; this module only forwards calls,
//! resolves bearer tokens to a `Principal`, and tracks session state for clients.

pub mod extract;
pub mod gotrue;
pub mod handlers;
pub mod session;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use extract::{AuthUser, BearerToken};
pub use gotrue::GoTrueClient;
pub use session::{SessionHandle, SessionState};

/// The authenticated user that owns generations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub email: Option<String>,
}

/// An established session returned by sign-in.
#[derive(Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub user: Principal,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

/// Result of sign-up. No session is established; the user must confirm by email first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignUpOutcome {
    pub user_id: Option<Uuid>,
    pub confirmation_required: bool,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    /// Message is the provider's own text, shown to the user verbatim.
    #[error("{message}")]
    Provider { status: u16, message: String },

    #[error("Your session has expired. Please sign in again.")]
    Unauthenticated,

    #[error("Identity service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Identity service returned an unexpected response: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    #[error("Identity service returned an invalid session expiry: {0}s")]
    InvalidExpiry(i64),
}

/// Hosted identity provider.
///
/// Carried in `AppState` as `Arc<dyn IdentityProvider>`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, IdentityError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, IdentityError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError>;

    /// Resolves a bearer token. `Unauthenticated` if the provider rejects it.
    async fn principal(&self, access_token: &str) -> Result<Principal, IdentityError>;
}
