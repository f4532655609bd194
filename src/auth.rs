use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use uuid::Uuid;

use crate::{
    catalog::CatalogState,
    config::AppConfig,
    errors::AuthError,
    models::User,
};

/// Claims
///
/// Represents the standard payload structure expected inside a JSON Web Token (JWT).
/// These claims are signed by the auth provider's secret and checked when a session
/// is established.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): The UUID of the user. This is the canonical identity used
    /// throughout the client, including the access-log writes.
    pub sub: Uuid,
    /// Expiration Time (exp): Timestamp after which the JWT must not be accepted.
    /// This is crucial for preventing replay attacks and maintaining session freshness.
    pub exp: usize,
    /// Issued At (iat): Timestamp when the JWT was issued.
    pub iat: usize,
}

/// AuthProvider Trait
///
/// Defines the abstract contract for identity: who is signed in right now, and
/// the sign-in/sign-up/sign-out operations. Session changes are published on a
/// watch channel so observers re-evaluate derived state reactively instead of
/// polling.
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn AuthProvider>`) safely shareable across asynchronous task boundaries.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The current session snapshot, if any.
    fn current_user(&self) -> Option<User>;

    /// A receiver that observes every session change, starting from the
    /// current value.
    fn subscribe(&self) -> watch::Receiver<Option<User>>;

    /// Establishes a session from credentials. On success the new session is
    /// published before the call returns.
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError>;

    /// Registers a new account and establishes a session for it.
    async fn sign_up(&self, email: &str, password: &str) -> Result<User, AuthError>;

    /// Ends the session. Infallible from the caller's point of view: the local
    /// session is always cleared, even if the provider cannot be reached.
    async fn sign_out(&self);
}

/// AuthState
///
/// The concrete type used to share the auth provider across the session.
pub type AuthState = Arc<dyn AuthProvider>;

// --- Supabase (GoTrue) Implementation ---

/// Shape of a successful GoTrue password-grant response. Only the fields the
/// client consumes are modeled.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    user: SupabaseUser,
}

/// The user object embedded in a GoTrue session response.
#[derive(Debug, Deserialize)]
struct SupabaseUser {
    id: Uuid,
    email: Option<String>,
}

/// parse_rejection
///
/// Maps a GoTrue error body onto the `AuthError` taxonomy. The provider has
/// shipped several body shapes over time (`error_description`, `msg`,
/// `message`), so all are consulted; `fallback` is used when none is present.
pub fn parse_rejection(body: &str, fallback: &str) -> AuthError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["error_description", "msg", "message"]
                .iter()
                .find_map(|key| value.get(key).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| fallback.to_string());

    let lowered = message.to_lowercase();
    if lowered.contains("invalid login credentials") {
        AuthError::InvalidCredentials
    } else if lowered.contains("already registered") || lowered.contains("already exists") {
        AuthError::EmailTaken
    } else {
        AuthError::Rejected(message)
    }
}

/// SupabaseAuth
///
/// The concrete implementation of the `AuthProvider` trait, backed by the
/// Supabase auth service (GoTrue). Token issuance, password storage, and
/// refresh are the provider's business; this client exchanges credentials for
/// a session, resolves the subscription flag through the catalog, and
/// publishes the result.
pub struct SupabaseAuth {
    client: reqwest::Client,
    auth_url: String,
    anon_key: String,
    // When present, access tokens are verified locally before being trusted.
    jwt_secret: Option<String>,
    // The subscription flag lives in the data backend, not in the token.
    catalog: CatalogState,
    session: watch::Sender<Option<User>>,
    // Held for the sign-out call; GoTrue revokes the token server-side.
    access_token: Mutex<Option<String>>,
    // Session deadline, consulted lazily on every snapshot read.
    expires_at: Mutex<Option<DateTime<Utc>>>,
}

impl SupabaseAuth {
    /// Creates a new auth client for the configured project. The catalog is
    /// consulted once per sign-in to resolve the subscription flag.
    pub fn new(config: &AppConfig, catalog: CatalogState) -> Self {
        let (session, _) = watch::channel(None);
        Self {
            client: reqwest::Client::new(),
            auth_url: format!("{}/auth/v1", config.supabase_url),
            anon_key: config.supabase_anon_key.clone(),
            jwt_secret: config.jwt_secret.clone(),
            catalog,
            session,
            access_token: Mutex::new(None),
            expires_at: Mutex::new(None),
        }
    }

    /// resolve_session
    ///
    /// Turns a token response into the published `User`:
    ///
    /// 1. Establish the canonical user id: from the verified token claims
    ///    when a JWT secret is configured, otherwise from the provider's
    ///    session payload.
    /// 2. Resolve the subscription flag through the catalog. A failed lookup
    ///    degrades to a free account rather than failing the sign-in.
    /// 3. Store the access token and session deadline, publish the session.
    async fn resolve_session(
        &self,
        token_response: TokenResponse,
        submitted_email: &str,
    ) -> Result<User, AuthError> {
        // 1. Canonical identity, plus the verified deadline when claims are checked.
        let (user_id, claims_exp) = match &self.jwt_secret {
            Some(secret) => {
                let decoding_key = DecodingKey::from_secret(secret.as_bytes());
                let mut validation = Validation::default();

                // Ensure expiration time validation is always active.
                validation.validate_exp = true;

                match decode::<Claims>(&token_response.access_token, &decoding_key, &validation) {
                    Ok(data) => (
                        data.claims.sub,
                        DateTime::from_timestamp(data.claims.exp as i64, 0),
                    ),
                    Err(e) => match e.kind() {
                        ErrorKind::ExpiredSignature => {
                            return Err(AuthError::Rejected(
                                "Session token is already expired".to_string(),
                            ));
                        }
                        _ => {
                            return Err(AuthError::Rejected(
                                "Session token failed verification".to_string(),
                            ));
                        }
                    },
                }
            }
            // Without the secret we take the provider's word for it.
            None => (token_response.user.id, None),
        };

        // 2. Subscription flag.
        let subscription_active = match self.catalog.check_subscription(user_id).await {
            Ok(active) => active,
            Err(e) => {
                tracing::warn!("Subscription lookup failed, treating account as free: {}", e);
                false
            }
        };

        let user = User {
            id: user_id,
            email: token_response
                .user
                .email
                .unwrap_or_else(|| submitted_email.to_string()),
            subscription_active,
        };

        // 3. Publish. Claims-derived expiry wins; the provider's advisory
        // `expires_in` stands in when no secret is configured.
        let expires_at = claims_exp.or_else(|| {
            token_response
                .expires_in
                .and_then(TimeDelta::try_seconds)
                .map(|ttl| Utc::now() + ttl)
        });
        if let Ok(mut guard) = self.access_token.lock() {
            *guard = Some(token_response.access_token);
        }
        if let Ok(mut guard) = self.expires_at.lock() {
            *guard = expires_at;
        }
        if let Some(deadline) = expires_at {
            tracing::debug!("Session established, expires at {}", deadline);
        }
        self.session.send_replace(Some(user.clone()));

        Ok(user)
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuth {
    /// The session snapshot. A session past its deadline is cleared and the
    /// sign-out published before answering.
    fn current_user(&self) -> Option<User> {
        let now = Utc::now();
        let expired = self
            .expires_at
            .lock()
            .ok()
            .and_then(|guard| *guard)
            .is_some_and(|deadline| deadline <= now);

        if expired {
            tracing::info!("Session expired, signing out");
            if let Ok(mut guard) = self.access_token.lock() {
                *guard = None;
            }
            if let Ok(mut guard) = self.expires_at.lock() {
                *guard = None;
            }
            self.session.send_replace(None);
            return None;
        }

        self.session.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.session.subscribe()
    }

    /// sign_in
    ///
    /// Exchanges credentials for a session via the password grant.
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let url = format!("{}/token?grant_type=password", self.auth_url);

        let response = self
            .client
            .post(url)
            .header("apikey", &self.anon_key)
            .header("Content-Type", "application/json")
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(parse_rejection(
                &body,
                &format!("Sign-in rejected with status {}", status),
            ));
        }

        let token_response = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        self.resolve_session(token_response, email).await
    }

    /// sign_up
    ///
    /// Registers the account with the provider, then signs in with the same
    /// credentials to establish the session. If the project requires email
    /// confirmation the follow-up sign-in is rejected with the provider's
    /// message, which the form surfaces verbatim.
    async fn sign_up(&self, email: &str, password: &str) -> Result<User, AuthError> {
        // Step 1: Create the account.
        let url = format!("{}/signup", self.auth_url);

        let response = self
            .client
            .post(url)
            .header("apikey", &self.anon_key)
            .header("Content-Type", "application/json")
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if !response.status().is_success() {
            // If the provider rejects the user (e.g., email already exists, weak password).
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(parse_rejection(
                &body,
                &format!("Sign-up rejected with status {}", status),
            ));
        }

        // Step 2: Establish the session.
        self.sign_in(email, password).await
    }

    /// sign_out
    ///
    /// Asks the provider to revoke the token, then clears the local session.
    /// A failed revocation is logged and otherwise ignored; the local session
    /// is cleared regardless.
    async fn sign_out(&self) {
        let token = self.access_token.lock().ok().and_then(|mut guard| guard.take());
        if let Ok(mut guard) = self.expires_at.lock() {
            *guard = None;
        }

        if let Some(token) = token {
            let url = format!("{}/logout", self.auth_url);
            let result = self
                .client
                .post(url)
                .header("apikey", &self.anon_key)
                .header("Authorization", format!("Bearer {}", token))
                .send()
                .await;

            match result {
                Ok(response) if !response.status().is_success() => {
                    tracing::warn!(
                        "Sign-out not acknowledged by provider: {}",
                        response.status()
                    );
                }
                Err(e) => tracing::warn!("Sign-out request failed: {}", e),
                _ => {}
            }
        }

        self.session.send_replace(None);
    }
}

// --- Mock Implementation ---

/// MockAuth
///
/// In-memory implementation of the `AuthProvider` trait for tests and offline
/// development. Sign-in fabricates an account for whatever credentials it is
/// given; `subscribed` controls the subscription flag of fabricated users and
/// `fail_with` forces the next operation to fail with a chosen error.
pub struct MockAuth {
    session: watch::Sender<Option<User>>,
    pub subscribed: bool,
    pub fail_with: Option<AuthError>,
}

impl Default for MockAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAuth {
    pub fn new() -> Self {
        let (session, _) = watch::channel(None);
        Self {
            session,
            subscribed: false,
            fail_with: None,
        }
    }

    /// A mock whose fabricated users hold an active subscription.
    pub fn new_subscribed() -> Self {
        Self {
            subscribed: true,
            ..Self::new()
        }
    }

    /// Publishes a session change directly, bypassing the credential flow.
    /// Lets tests drive the observer side of the contract.
    pub fn publish(&self, user: Option<User>) {
        self.session.send_replace(user);
    }
}

#[async_trait]
impl AuthProvider for MockAuth {
    fn current_user(&self) -> Option<User> {
        self.session.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.session.subscribe()
    }

    async fn sign_in(&self, email: &str, _password: &str) -> Result<User, AuthError> {
        if let Some(error) = &self.fail_with {
            return Err(error.clone());
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            subscription_active: self.subscribed,
        };
        self.session.send_replace(Some(user.clone()));
        Ok(user)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.sign_in(email, password).await
    }

    async fn sign_out(&self) {
        self.session.send_replace(None);
    }
}
