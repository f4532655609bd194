use std::env;

/// AppConfig
///
/// Holds the client's entire configuration state. This struct is designed to be
/// immutable once loaded, ensuring every collaborator (auth, catalog, session)
/// sees the same values for the lifetime of the process.
#[derive(Clone)]
pub struct AppConfig {
    // Supabase project base URL; the auth and REST endpoints both hang off it.
    pub supabase_url: String,
    // Publishable anon key, sent as the `apikey` header on every request.
    pub supabase_anon_key: String,
    // Optional secret for verifying access tokens locally. When absent, token
    // claims are taken at face value and expiry falls back to `expires_in`.
    pub jwt_secret: Option<String>,
    // Runtime environment marker. Controls log output format.
    pub env: Env,
    // Whether failed catalog reads substitute the static sample data.
    pub static_fallback: bool,
}

/// Env
///
/// Defines the runtime context, used to switch between developer-friendly
/// output (pretty logs) and production-grade output (structured JSON logs).
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// default
    ///
    /// Provides a safe, non-panicking AppConfig instance primarily used for test setup.
    /// This allows us to instantiate the configuration without needing to set environment
    /// variables for lightweight unit or integration testing state scaffolding.
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            jwt_secret: Some("super-secure-test-secret-value-local".to_string()),
            env: Env::Local,
            static_fallback: true,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// The canonical function for initializing the configuration at startup.
    /// It reads all parameters from environment variables and implements the **fail-fast**
    /// principle.
    ///
    /// # Panics
    /// Panics if the Supabase project URL or anon key is not set. The client cannot
    /// reach any backend without them, so starting up would only defer the failure
    /// to the first request.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        // Both are mandatory in every environment; there is no meaningful
        // local default for a hosted project URL.
        let supabase_url =
            env::var("SUPABASE_URL").expect("FATAL: SUPABASE_URL must be set.");
        let supabase_anon_key =
            env::var("SUPABASE_ANON_KEY").expect("FATAL: SUPABASE_ANON_KEY must be set.");

        // Optional: without it, access tokens are not verified locally.
        let jwt_secret = env::var("SUPABASE_JWT_SECRET").ok();

        // The fallback substitution is on unless explicitly disabled, matching
        // the portal's established behavior. Deployments that prefer a visible
        // outage over sample data set STATIC_FALLBACK=off.
        let static_fallback = match env::var("STATIC_FALLBACK") {
            Ok(raw) => !matches!(raw.to_lowercase().as_str(), "0" | "false" | "off"),
            Err(_) => true,
        };

        Self {
            supabase_url,
            supabase_anon_key,
            jwt_secret,
            env,
            static_fallback,
        }
    }
}
