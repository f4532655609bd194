use crate::config::AppConfig;
use crate::errors::CatalogError;
use crate::models::{AccessLogEntry, Faculty, Paper, Subject};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Catalog Trait
///
/// Defines the abstract contract for the read-only catalog and the access-log
/// write. This keeps the session logic independent of the concrete backend
/// (Supabase REST, Mock, etc.).
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Catalog>`) safely shareable across asynchronous task boundaries.
#[async_trait]
pub trait Catalog: Send + Sync {
    // --- Ordered List Reads ---
    // Every faculty, sorted by name.
    async fn list_faculties(&self) -> Result<Vec<Faculty>, CatalogError>;
    // Subjects of one faculty, sorted by name.
    async fn list_subjects(&self, faculty_id: i64) -> Result<Vec<Subject>, CatalogError>;
    // Papers of one subject, newest academic year first.
    async fn list_papers(&self, subject_id: i64) -> Result<Vec<Paper>, CatalogError>;

    // --- Subscription Lookup ---
    /// True when the user has an active subscription row.
    async fn check_subscription(&self, user_id: Uuid) -> Result<bool, CatalogError>;

    // --- Telemetry ---
    /// Records one document access. Best-effort: callers fire and forget.
    async fn log_access(&self, entry: AccessLogEntry) -> Result<(), CatalogError>;
}

/// CatalogState
///
/// The concrete type used to share the catalog access across the session.
pub type CatalogState = Arc<dyn Catalog>;

/// SupabaseCatalog
///
/// The concrete implementation of the `Catalog` trait, backed by the Supabase
/// REST gateway (PostgREST). All requests authenticate with the project's
/// anon key; row-level security on the backend decides what that key may see.
pub struct SupabaseCatalog {
    client: reqwest::Client,
    rest_url: String,
    anon_key: String,
}

impl SupabaseCatalog {
    /// Creates a new catalog client for the configured project.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            rest_url: format!("{}/rest/v1", config.supabase_url),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    /// fetch_rows
    ///
    /// Shared GET helper: issues one table read and decodes the JSON row set.
    /// `path_and_query` is the table name plus its PostgREST filter string.
    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        path_and_query: &str,
    ) -> Result<Vec<T>, CatalogError> {
        let url = format!("{}/{}", self.rest_url, path_and_query);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", &self.anon_key))
            .send()
            .await
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CatalogError::Unavailable(format!(
                "backend returned {}",
                response.status()
            )));
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| CatalogError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl Catalog for SupabaseCatalog {
    async fn list_faculties(&self) -> Result<Vec<Faculty>, CatalogError> {
        self.fetch_rows("faculties?select=*&order=name.asc").await
    }

    async fn list_subjects(&self, faculty_id: i64) -> Result<Vec<Subject>, CatalogError> {
        self.fetch_rows(&format!(
            "subjects?select=*&faculty_id=eq.{}&order=name.asc",
            faculty_id
        ))
        .await
    }

    async fn list_papers(&self, subject_id: i64) -> Result<Vec<Paper>, CatalogError> {
        self.fetch_rows(&format!(
            "papers?select=*&subject_id=eq.{}&order=year.desc",
            subject_id
        ))
        .await
    }

    /// check_subscription
    ///
    /// Queries `user_subscriptions` for an active row. An empty result is the
    /// normal "no subscription" case, not an error.
    async fn check_subscription(&self, user_id: Uuid) -> Result<bool, CatalogError> {
        let rows: Vec<serde_json::Value> = self
            .fetch_rows(&format!(
                "user_subscriptions?select=*&user_id=eq.{}&active=eq.true",
                user_id
            ))
            .await?;
        Ok(!rows.is_empty())
    }

    /// log_access
    ///
    /// Inserts one row into `paper_access_logs`. `Prefer: return=minimal`
    /// keeps the response empty; the caller only cares whether the write
    /// landed.
    async fn log_access(&self, entry: AccessLogEntry) -> Result<(), CatalogError> {
        let url = format!("{}/paper_access_logs", self.rest_url);

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", &self.anon_key))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=minimal")
            .json(&entry)
            .send()
            .await
            .map_err(|e| CatalogError::LogFailure(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CatalogError::LogFailure(format!(
                "backend returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}

/// MockCatalog
///
/// In-memory implementation of the `Catalog` trait for tests and offline
/// development. Reads mirror the backend's ordering rules so callers see the
/// same sequences either way, and the failure toggles let tests drive the
/// degraded paths deterministically.
#[derive(Default)]
pub struct MockCatalog {
    pub faculties: Vec<Faculty>,
    pub subjects: Vec<Subject>,
    pub papers: Vec<Paper>,
    // Users considered actively subscribed.
    pub subscribed_users: Vec<Uuid>,
    // When set, every read fails with `Unavailable`.
    pub fail_reads: bool,
    // When set, every log write fails with `LogFailure`.
    pub fail_logs: bool,
    logged: Mutex<Vec<AccessLogEntry>>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock that refuses every read, for exercising the fallback path.
    pub fn new_failing() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    /// Snapshot of the access-log entries recorded so far.
    pub fn logged_entries(&self) -> Vec<AccessLogEntry> {
        match self.logged.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => Vec::new(),
        }
    }
}

#[async_trait]
impl Catalog for MockCatalog {
    async fn list_faculties(&self) -> Result<Vec<Faculty>, CatalogError> {
        if self.fail_reads {
            return Err(CatalogError::Unavailable("mock read failure".to_string()));
        }
        let mut faculties = self.faculties.clone();
        faculties.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(faculties)
    }

    async fn list_subjects(&self, faculty_id: i64) -> Result<Vec<Subject>, CatalogError> {
        if self.fail_reads {
            return Err(CatalogError::Unavailable("mock read failure".to_string()));
        }
        let mut subjects: Vec<Subject> = self
            .subjects
            .iter()
            .filter(|s| s.faculty_id == faculty_id)
            .cloned()
            .collect();
        subjects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(subjects)
    }

    async fn list_papers(&self, subject_id: i64) -> Result<Vec<Paper>, CatalogError> {
        if self.fail_reads {
            return Err(CatalogError::Unavailable("mock read failure".to_string()));
        }
        let mut papers: Vec<Paper> = self
            .papers
            .iter()
            .filter(|p| p.subject_id == subject_id)
            .cloned()
            .collect();
        papers.sort_by(|a, b| b.year.cmp(&a.year));
        Ok(papers)
    }

    async fn check_subscription(&self, user_id: Uuid) -> Result<bool, CatalogError> {
        if self.fail_reads {
            return Err(CatalogError::Unavailable("mock read failure".to_string()));
        }
        Ok(self.subscribed_users.contains(&user_id))
    }

    async fn log_access(&self, entry: AccessLogEntry) -> Result<(), CatalogError> {
        if self.fail_logs {
            return Err(CatalogError::LogFailure("mock log failure".to_string()));
        }
        if let Ok(mut guard) = self.logged.lock() {
            guard.push(entry);
        }
        Ok(())
    }
}
