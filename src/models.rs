use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Catalog Schemas (Mapped to the Backend Tables) ---

/// Faculty
///
/// Top level of the catalog hierarchy, loaded from the `faculties` table.
/// The list is read-only from the client's point of view and arrives ordered by name.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Faculty {
    pub id: i64,
    pub name: String,
    // Short blurb shown on the faculty tile, e.g. "Computer Science, IT, Electronics".
    pub description: String,
}

/// Subject
///
/// Second level of the hierarchy, loaded from the `subjects` table.
/// Each subject belongs to exactly one faculty via `faculty_id`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Subject {
    pub id: i64,
    pub faculty_id: i64,
    pub name: String,
    // Course code shown on the subject card (e.g. "CS101").
    pub code: String,
    pub semester: i32,
    pub credits: i32,
}

/// PaperKind
///
/// Whether a paper record is a mid-term or a final exam. The backend column is
/// lowercase text, hence the serde casing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaperKind {
    #[default]
    Midterm,
    Final,
}

impl PaperKind {
    /// Badge text in the portal's established wording.
    pub fn label(&self) -> &'static str {
        match self {
            PaperKind::Midterm => "Mid Term",
            PaperKind::Final => "Final",
        }
    }
}

/// Paper
///
/// Leaf of the hierarchy, loaded from the `papers` table. Carries both document
/// locators; which one is dereferenced is decided per request (see
/// `DocumentRequest`). `year` is an academic year string ("2023-2024"), not a
/// calendar year, and papers arrive ordered by it descending.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Paper {
    pub id: i64,
    pub subject_id: i64,
    pub title: String,
    pub year: String,

    /// Maps the SQL column "type" to the Rust field "kind".
    /// This renaming is necessary because `type` is a reserved keyword in Rust.
    #[serde(rename = "type")]
    pub kind: PaperKind,

    pub paper_url: String,
    pub answer_url: String,
}

/// DocumentType
///
/// Selects which of a paper's two locators a request refers to: the question
/// paper itself or the answer key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Paper,
    Answer,
}

impl DocumentType {
    /// Wire and filename fragment ("paper" / "answer").
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Paper => "paper",
            DocumentType::Answer => "answer",
        }
    }

    /// Caption used on buttons and in the viewer title.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::Paper => "Question Paper",
            DocumentType::Answer => "Answer Key",
        }
    }
}

/// DocumentRequest
///
/// A paper annotated with the document type being requested. Constructed per
/// request, handed to the access gate, and held by the navigation state while
/// the viewer is open. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRequest {
    pub paper: Paper,
    pub document: DocumentType,
}

impl DocumentRequest {
    pub fn new(paper: Paper, document: DocumentType) -> Self {
        Self { paper, document }
    }

    /// The locator this request dereferences to.
    pub fn url(&self) -> &str {
        match self.document {
            DocumentType::Paper => &self.paper.paper_url,
            DocumentType::Answer => &self.paper.answer_url,
        }
    }

    /// Download filename in the portal's established format,
    /// e.g. "Final Exam_2022-2023_answer.pdf".
    pub fn download_filename(&self) -> String {
        format!(
            "{}_{}_{}.pdf",
            self.paper.title,
            self.paper.year,
            self.document.as_str()
        )
    }
}

// --- Identity & Telemetry Schemas ---

/// User
///
/// The signed-in account as the client sees it: the canonical id from the
/// external auth provider plus the resolved subscription flag. Present only
/// while a session is live.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct User {
    // Primary Key in the external auth system (auth.users.id).
    pub id: Uuid,
    pub email: String,
    // True when an active row exists in `user_subscriptions` for this user.
    pub subscription_active: bool,
}

/// AccessLogEntry
///
/// Payload of the fire-and-forget access-log write (`paper_access_logs`).
/// Best-effort telemetry, not an authorization record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessLogEntry {
    pub user_id: Uuid,
    pub paper_id: i64,
    pub accessed_at: DateTime<Utc>,
}

impl AccessLogEntry {
    /// Builds an entry stamped with the current time.
    pub fn now(user_id: Uuid, paper_id: i64) -> Self {
        Self {
            user_id,
            paper_id,
            accessed_at: Utc::now(),
        }
    }
}
