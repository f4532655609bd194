//! Static fallback datasets.
//!
//! When a catalog read fails the session substitutes these fixed records so
//! the browsing experience degrades to sample data instead of an error
//! dialog. The substitution is logged, and it can be disabled through
//! configuration for deployments that prefer a visible outage.

use crate::models::{Faculty, Paper, PaperKind, Subject};

/// The five faculty tiles shown when the backend cannot be reached.
pub fn faculties() -> Vec<Faculty> {
    vec![
        Faculty {
            id: 1,
            name: "Engineering".to_string(),
            description: "Computer Science, IT, Electronics".to_string(),
        },
        Faculty {
            id: 2,
            name: "Science".to_string(),
            description: "Chemistry, Microbiology, Agriculture".to_string(),
        },
        Faculty {
            id: 3,
            name: "Management Studies".to_string(),
            description: "BBA, B.Com, Digital Finance".to_string(),
        },
        Faculty {
            id: 4,
            name: "Law".to_string(),
            description: "BA LLB, BCom LLB".to_string(),
        },
        Faculty {
            id: 5,
            name: "Physiotherapy".to_string(),
            description: "Physical Therapy Programs".to_string(),
        },
    ]
}

/// Sample subjects, stamped with the faculty they were requested for.
pub fn subjects(faculty_id: i64) -> Vec<Subject> {
    vec![
        Subject {
            id: 1,
            faculty_id,
            name: "Data Structures".to_string(),
            code: "CS101".to_string(),
            semester: 3,
            credits: 4,
        },
        Subject {
            id: 2,
            faculty_id,
            name: "Algorithms".to_string(),
            code: "CS102".to_string(),
            semester: 4,
            credits: 4,
        },
        Subject {
            id: 3,
            faculty_id,
            name: "Database Systems".to_string(),
            code: "CS201".to_string(),
            semester: 5,
            credits: 3,
        },
        Subject {
            id: 4,
            faculty_id,
            name: "Computer Networks".to_string(),
            code: "CS202".to_string(),
            semester: 6,
            credits: 3,
        },
    ]
}

/// Sample papers, stamped with the subject they were requested for. The
/// locators point at bundled sample documents.
pub fn papers(subject_id: i64) -> Vec<Paper> {
    vec![
        Paper {
            id: 1,
            subject_id,
            title: "Mid Term Exam".to_string(),
            year: "2023-2024".to_string(),
            kind: PaperKind::Midterm,
            paper_url: "/sample-paper.pdf".to_string(),
            answer_url: "/sample-answer.pdf".to_string(),
        },
        Paper {
            id: 2,
            subject_id,
            title: "Final Exam".to_string(),
            year: "2023-2024".to_string(),
            kind: PaperKind::Final,
            paper_url: "/sample-paper.pdf".to_string(),
            answer_url: "/sample-answer.pdf".to_string(),
        },
        Paper {
            id: 3,
            subject_id,
            title: "Mid Term Exam".to_string(),
            year: "2022-2023".to_string(),
            kind: PaperKind::Midterm,
            paper_url: "/sample-paper.pdf".to_string(),
            answer_url: "/sample-answer.pdf".to_string(),
        },
    ]
}
