use exam_portal::gate::{AccessDecision, decide};
use exam_portal::models::{DocumentRequest, DocumentType, Paper, PaperKind, User};
use uuid::Uuid;

// --- Test Data Helpers ---

fn sample_paper() -> Paper {
    Paper {
        id: 42,
        subject_id: 7,
        title: "Mid Term Exam".to_string(),
        year: "2023-2024".to_string(),
        kind: PaperKind::Midterm,
        paper_url: "/sample-paper.pdf".to_string(),
        answer_url: "/sample-answer.pdf".to_string(),
    }
}

fn request(document: DocumentType) -> DocumentRequest {
    DocumentRequest::new(sample_paper(), document)
}

fn user(subscription_active: bool) -> User {
    User {
        id: Uuid::from_u128(9),
        email: "someone@example.com".to_string(),
        subscription_active,
    }
}

// --- Tests ---

#[test]
fn test_anonymous_viewer_must_sign_in() {
    for document in [DocumentType::Paper, DocumentType::Answer] {
        let decision = decide(None, &request(document));
        assert_eq!(decision, AccessDecision::RequireAuth);
    }
}

#[test]
fn test_free_account_must_subscribe() {
    let free = user(false);

    for document in [DocumentType::Paper, DocumentType::Answer] {
        let decision = decide(Some(&free), &request(document));
        assert_eq!(decision, AccessDecision::RequireSubscription);
    }
}

#[test]
fn test_subscriber_is_approved() {
    let premium = user(true);

    for document in [DocumentType::Paper, DocumentType::Answer] {
        let decision = decide(Some(&premium), &request(document));
        assert_eq!(decision, AccessDecision::Approve);
    }
}

#[test]
fn test_identity_is_checked_before_subscription() {
    // An anonymous viewer is never told about the subscription tier;
    // the sign-in requirement always wins.
    let decision = decide(None, &request(DocumentType::Answer));
    assert_ne!(decision, AccessDecision::RequireSubscription);
    assert_eq!(decision, AccessDecision::RequireAuth);
}

#[test]
fn test_both_document_kinds_share_one_policy() {
    // The answer key is not gated more strictly than the question paper.
    let free = user(false);

    let paper_decision = decide(Some(&free), &request(DocumentType::Paper));
    let answer_decision = decide(Some(&free), &request(DocumentType::Answer));
    assert_eq!(paper_decision, answer_decision);
}
