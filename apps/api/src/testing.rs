//! In-process doubles for the external services, shared by unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Value;
use tokio::sync::Notify;
use uuid::Uuid;

use crate::config::{Config, ConfigError};
use crate::generation::{GenerationError, OutputType, PostGenerator, PostSequence, Topic};
use crate::history::{GenerationStore, MemoryGenerationStore, StoreError};
use crate::identity::{IdentityError, IdentityProvider, Principal, Session, SignUpOutcome};
use crate::llm_client::{LlmError, LlmProvider, ToolCallRequest};
use crate::models::generation::{Generation, NewGeneration};
use crate::state::AppState;

/// The only access token `StubIdentity` accepts.
pub const STUB_TOKEN: &str = "stub-access-token";

/// The only password `StubIdentity` accepts.
pub const STUB_PASSWORD: &str = "hunter22";

pub fn principal() -> Principal {
    Principal {
        id: Uuid::new_v4(),
        email: Some("maker@example.com".to_string()),
    }
}

pub fn session_for(user: &Principal, ttl: Duration) -> Session {
    Session {
        access_token: STUB_TOKEN.to_string(),
        refresh_token: Some("stub-refresh-token".to_string()),
        expires_at: Utc::now() + ttl,
        user: user.clone(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Model provider
// ────────────────────────────────────────────────────────────────────────────

/// Owned copy of a `ToolCallRequest`.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub system: String,
    pub prompt: String,
    pub tool_name: String,
    pub parameters: Value,
    pub temperature: f64,
}

/// Replies with a fixed tool-argument string or a fixed API error.
pub struct ScriptedLlm {
    reply: Result<String, (u16, String)>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedLlm {
    pub fn returning(raw: &str) -> Self {
        Self {
            reply: Ok(raw.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16, message: &str) -> Self {
        Self {
            reply: Err((status, message.to_string())),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    fn model(&self) -> &'static str {
        "scripted"
    }

    async fn call_tool(&self, request: &ToolCallRequest<'_>) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            system: request.system.to_string(),
            prompt: request.prompt.to_string(),
            tool_name: request.tool_name.to_string(),
            parameters: request.parameters.clone(),
            temperature: request.temperature,
        });

        match &self.reply {
            Ok(raw) => Ok(raw.clone()),
            Err((status, message)) => Err(LlmError::Api {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Generator
// ────────────────────────────────────────────────────────────────────────────

pub struct StubGenerator {
    posts: Option<PostSequence>,
    calls: AtomicUsize,
}

impl StubGenerator {
    pub fn new(posts: PostSequence) -> Self {
        Self {
            posts: Some(posts),
            calls: AtomicUsize::new(0),
        }
    }

    /// Every call fails as if the model returned unparseable output.
    pub fn failing() -> Self {
        Self {
            posts: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PostGenerator for StubGenerator {
    async fn generate(
        &self,
        _topic: &Topic,
        _mode: OutputType,
    ) -> Result<PostSequence, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.posts.clone().ok_or(GenerationError::InvalidFormat)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// History
// ────────────────────────────────────────────────────────────────────────────

/// A history store whose database is down.
pub struct FailingStore;

#[async_trait]
impl GenerationStore for FailingStore {
    async fn save(&self, _new: NewGeneration) -> Result<Generation, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn list(&self, _user_id: Uuid) -> Result<Vec<Generation>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Identity
// ────────────────────────────────────────────────────────────────────────────

/// One known user who signs in with `STUB_PASSWORD` and holds `STUB_TOKEN`.
pub struct StubIdentity {
    pub user: Principal,
    revoked: AtomicBool,
    sign_outs: AtomicUsize,
    principal_calls: AtomicUsize,
    held: AtomicBool,
    release: Notify,
}

impl StubIdentity {
    pub fn new() -> Self {
        Self {
            user: principal(),
            revoked: AtomicBool::new(false),
            sign_outs: AtomicUsize::new(0),
            principal_calls: AtomicUsize::new(0),
            held: AtomicBool::new(false),
            release: Notify::new(),
        }
    }

    /// Every token is rejected from now on.
    pub fn revoke_all(&self) {
        self.revoked.store(true, Ordering::SeqCst);
    }

    /// Token checks block until `release_principal` is called.
    pub fn hold_principal(&self) {
        self.held.store(true, Ordering::SeqCst);
    }

    pub fn release_principal(&self) {
        self.held.store(false, Ordering::SeqCst);
        self.release.notify_one();
    }

    pub fn sign_outs(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }

    pub fn principal_calls(&self) -> usize {
        self.principal_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for StubIdentity {
    async fn sign_up(&self, _email: &str, _password: &str) -> Result<SignUpOutcome, IdentityError> {
        Ok(SignUpOutcome {
            user_id: Some(Uuid::new_v4()),
            confirmation_required: true,
        })
    }

    async fn sign_in(&self, _email: &str, password: &str) -> Result<Session, IdentityError> {
        if password != STUB_PASSWORD {
            return Err(IdentityError::Provider {
                status: 400,
                message: "Invalid login credentials".to_string(),
            });
        }
        self.revoked.store(false, Ordering::SeqCst);
        Ok(session_for(&self.user, Duration::hours(1)))
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), IdentityError> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn principal(&self, access_token: &str) -> Result<Principal, IdentityError> {
        self.principal_calls.fetch_add(1, Ordering::SeqCst);
        if self.held.load(Ordering::SeqCst) {
            self.release.notified().await;
        }
        if self.revoked.load(Ordering::SeqCst) || access_token != STUB_TOKEN {
            return Err(IdentityError::Unauthenticated);
        }
        Ok(self.user.clone())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// App state
// ────────────────────────────────────────────────────────────────────────────

/// Config with nothing set: every external feature is missing.
pub fn empty_config() -> Config {
    Config::from_lookup(|_| None).unwrap()
}

/// State wired to the given doubles. `None` leaves that feature unconfigured.
pub fn app_state(
    generator: Option<Arc<dyn PostGenerator>>,
    identity: Option<Arc<dyn IdentityProvider>>,
    history: Option<Arc<dyn GenerationStore>>,
) -> AppState {
    let missing = |feature, vars| ConfigError::Missing { feature, vars };
    AppState {
        config: empty_config(),
        generator: generator.ok_or(missing("OpenAI API key", "OPENAI_API_KEY")),
        identity: identity.ok_or(missing("Supabase", "SUPABASE_URL and SUPABASE_ANON_KEY")),
        history: history.ok_or(missing("Generation history", "DATABASE_URL")),
    }
}

/// Fully wired state over fresh doubles, returned alongside them for assertions.
pub fn stub_state() -> (AppState, Arc<StubGenerator>, Arc<StubIdentity>, Arc<MemoryGenerationStore>) {
    let generator = Arc::new(StubGenerator::new(vec![
        "AI is changing everything 🚀 #AI".to_string(),
    ]));
    let identity = Arc::new(StubIdentity::new());
    let history = Arc::new(MemoryGenerationStore::new());
    let state = app_state(
        Some(generator.clone()),
        Some(identity.clone()),
        Some(history.clone()),
    );
    (state, generator, identity, history)
}
