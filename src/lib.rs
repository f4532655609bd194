// --- Module Structure ---

// External collaborator boundaries (auth provider, catalog backend).
pub mod auth;
pub mod catalog;

// Core portal logic.
pub mod errors;
pub mod fallback;
pub mod gate;
pub mod models;
pub mod navigation;
pub mod protection;
pub mod session;

// Front end and configuration.
pub mod config;
pub mod console;

// --- Public Re-exports ---

// Makes the core state types easily accessible to the entry point (main.rs)
// and to integration tests.
pub use auth::{AuthProvider, AuthState, MockAuth, SupabaseAuth};
pub use catalog::{Catalog, CatalogState, MockCatalog, SupabaseCatalog};
pub use config::AppConfig;
pub use session::{ActionOutcome, Session};
