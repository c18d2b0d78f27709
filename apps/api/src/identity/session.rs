//! Client-side session state, pushed to subscribers on every transition.
//!
//! ```text
//! Unknown ──restore──▶ Authenticated | Anonymous
//! Anonymous ──sign_in──▶ Authenticated
//! Authenticated ──sign_out / expiry / rejection──▶ Anonymous
//! ```
//!
//! Expiry is scheduled when a session is accepted, so subscribers see the
//! `Anonymous` transition at `expires_at` without anyone polling.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::{IdentityError, IdentityProvider, Principal, Session, SignUpOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Before the first session check has resolved.
    Unknown,
    Anonymous,
    Authenticated(Principal),
}

impl SessionState {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            SessionState::Authenticated(principal) => Some(principal),
            _ => None,
        }
    }
}

/// State shared with the expiry task. Every publish happens under the `session` lock.
struct Shared {
    provider: Arc<dyn IdentityProvider>,
    session: Mutex<Option<Session>>,
    state: watch::Sender<SessionState>,
}

impl Shared {
    fn publish(&self, next: SessionState) {
        self.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            info!("Session state: {:?} -> {:?}", current, next);
            *current = next;
            true
        });
    }

    /// Drops the held session only if it is still the one identified by `token`.
    async fn clear_if_current(&self, token: &str) -> bool {
        let mut guard = self.session.lock().await;
        if guard.as_ref().is_some_and(|s| s.access_token == token) {
            *guard = None;
            self.publish(SessionState::Anonymous);
            return true;
        }
        false
    }
}

/// Owns the current session and broadcasts state changes through a `watch` channel.
pub struct SessionHandle {
    shared: Arc<Shared>,
    expiry: Mutex<Option<JoinHandle<()>>>,
}

impl SessionHandle {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let (state, _) = watch::channel(SessionState::Unknown);
        Self {
            shared: Arc::new(Shared {
                provider,
                session: Mutex::new(None),
                state,
            }),
            expiry: Mutex::new(None),
        }
    }

    /// Receives every state transition. The current value is available immediately.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.shared.state.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.shared.state.borrow().clone()
    }

    pub fn principal(&self) -> Option<Principal> {
        self.shared.state.borrow().principal().cloned()
    }

    pub async fn access_token(&self) -> Option<String> {
        self.shared
            .session
            .lock()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    /// Resolves the initial `Unknown` state from a previously stored session, if any.
    pub async fn restore(&self, stored: Option<Session>) -> SessionState {
        *self.shared.session.lock().await = stored;
        self.refresh().await
    }

    /// Re-checks the held session. Expired or rejected sessions become `Anonymous`;
    /// a provider outage leaves the state as it was.
    pub async fn refresh(&self) -> SessionState {
        let token = {
            let mut guard = self.shared.session.lock().await;
            if guard.as_ref().is_some_and(|s| s.is_expired(Utc::now())) {
                *guard = None;
            }
            let token = guard.as_ref().map(|s| s.access_token.clone());
            if token.is_none() {
                self.shared.publish(SessionState::Anonymous);
            }
            token
        };

        let Some(token) = token else {
            self.disarm_expiry().await;
            return self.state();
        };

        match self.shared.provider.principal(&token).await {
            Ok(principal) => {
                // A sign-out or new sign-in may have replaced the session while we waited
                let expires_at = {
                    let guard = self.shared.session.lock().await;
                    let still_held = guard
                        .as_ref()
                        .filter(|held| held.access_token == token)
                        .map(|held| held.expires_at);
                    if still_held.is_some() {
                        self.shared.publish(SessionState::Authenticated(principal));
                    }
                    still_held
                };
                if let Some(expires_at) = expires_at {
                    self.arm_expiry(token, expires_at).await;
                }
            }
            Err(IdentityError::Unauthenticated) => {
                if self.shared.clear_if_current(&token).await {
                    self.disarm_expiry().await;
                }
            }
            Err(e) => warn!("Session check failed, keeping current state: {e}"),
        }
        self.state()
    }

    /// Starts the confirmation-email flow. The session state does not change.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, IdentityError> {
        self.shared.provider.sign_up(email, password).await
    }

    /// On failure the state is unchanged and the provider's message is returned.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Principal, IdentityError> {
        let session = self.shared.provider.sign_in(email, password).await?;
        let principal = session.user.clone();
        let token = session.access_token.clone();
        let expires_at = session.expires_at;
        {
            let mut guard = self.shared.session.lock().await;
            *guard = Some(session);
            self.shared
                .publish(SessionState::Authenticated(principal.clone()));
        }
        self.arm_expiry(token, expires_at).await;
        Ok(principal)
    }

    /// Always ends `Anonymous`. A provider failure is logged, not returned.
    pub async fn sign_out(&self) {
        let session = {
            let mut guard = self.shared.session.lock().await;
            let session = guard.take();
            self.shared.publish(SessionState::Anonymous);
            session
        };
        self.disarm_expiry().await;

        if let Some(session) = session {
            if let Err(e) = self.shared.provider.sign_out(&session.access_token).await {
                warn!("Provider sign-out failed; local session cleared anyway: {e}");
            }
        }
    }

    /// Schedules the `Anonymous` transition for `expires_at`, replacing any earlier timer.
    async fn arm_expiry(&self, token: String, expires_at: DateTime<Utc>) {
        let ttl = (expires_at - Utc::now()).to_std().unwrap_or_default();
        let shared = Arc::clone(&self.shared);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if shared.clear_if_current(&token).await {
                info!("Session expired");
            }
        });
        if let Some(previous) = self.expiry.lock().await.replace(timer) {
            previous.abort();
        }
    }

    async fn disarm_expiry(&self) {
        if let Some(timer) = self.expiry.lock().await.take() {
            timer.abort();
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if let Some(timer) = self.expiry.get_mut().take() {
            timer.abort();
        }
    }
}
