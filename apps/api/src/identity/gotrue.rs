//! Supabase Auth (GoTrue) REST binding.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use super::{IdentityError, IdentityProvider, Principal, Session, SignUpOutcome};
use crate::config::SupabaseSettings;

const REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Deserialize)]
struct UserBody {
    id: Uuid,
    email: Option<String>,
}

impl From<UserBody> for Principal {
    fn from(user: UserBody) -> Self {
        Principal {
            id: user.id,
            email: user.email,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
    user: UserBody,
}

/// Sign-up returns the bare user when confirmation is pending, or a session
/// wrapping it when the project auto-confirms.
#[derive(Debug, Deserialize)]
struct SignUpBody {
    id: Option<Uuid>,
    user: Option<UserBody>,
    access_token: Option<String>,
}

#[derive(Clone)]
pub struct GoTrueClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl GoTrueClient {
    pub fn new(settings: &SupabaseSettings) -> Result<Self, IdentityError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            base_url: format!("{}/auth/v1", settings.url.trim_end_matches('/')),
            anon_key: settings.anon_key.clone(),
        })
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .header("apikey", &self.anon_key)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .header("apikey", &self.anon_key)
    }
}

/// Reads the provider's message from any of the error shapes GoTrue has used.
fn provider_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

async fn check(response: Response) -> Result<Response, IdentityError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = provider_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Authentication failed")
            .to_string()
    });
    Err(IdentityError::Provider {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl IdentityProvider for GoTrueClient {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, IdentityError> {
        let response = self
            .post("/signup")
            .bearer_auth(&self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let body: SignUpBody = serde_json::from_str(&check(response).await?.text().await?)?;

        Ok(SignUpOutcome {
            user_id: body.user.map(|u| u.id).or(body.id),
            confirmation_required: body.access_token.is_none(),
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        let response = self
            .post("/token")
            .query(&[("grant_type", "password")])
            .bearer_auth(&self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let token: TokenBody = serde_json::from_str(&check(response).await?.text().await?)?;

        debug!("Signed in user {}", token.user.id);

        let expires_at = Duration::try_seconds(token.expires_in)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or(IdentityError::InvalidExpiry(token.expires_in))?;

        Ok(Session {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at,
            user: token.user.into(),
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        let response = self.post("/logout").bearer_auth(access_token).send().await?;
        check(response).await?;
        Ok(())
    }

    async fn principal(&self, access_token: &str) -> Result<Principal, IdentityError> {
        let response = self.get("/user").bearer_auth(access_token).send().await?;
        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            return Err(IdentityError::Unauthenticated);
        }
        let user: UserBody = serde_json::from_str(&check(response).await?.text().await?)?;
        Ok(user.into())
    }
}
