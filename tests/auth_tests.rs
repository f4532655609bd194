use std::time::{SystemTime, UNIX_EPOCH};

use exam_portal::auth::{AuthProvider, Claims, MockAuth, parse_rejection};
use exam_portal::errors::AuthError;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

const TEST_JWT_SECRET: &str = "super-secure-test-secret-value-local";
const TEST_USER_ID: Uuid = Uuid::from_u128(1);

// --- Helper Functions ---

/// Creates a signed token for the given user, expiring `exp_offset_secs`
/// from now (negative for an already-expired token).
fn create_token(user_id: Uuid, exp_offset_secs: i64) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    let claims = Claims {
        sub: user_id,
        exp: (now + exp_offset_secs) as usize,
        iat: now as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

fn decode_claims(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}

// --- Token Verification Tests ---

#[test]
fn test_valid_token_recovers_the_subject() {
    let token = create_token(TEST_USER_ID, 3600);

    let claims = decode_claims(&token, TEST_JWT_SECRET).unwrap();
    assert_eq!(claims.sub, TEST_USER_ID);
    assert!(claims.exp > claims.iat);
}

#[test]
fn test_expired_token_is_rejected() {
    // Two hours past expiry, well beyond the default validation leeway.
    let token = create_token(TEST_USER_ID, -7200);

    let error = decode_claims(&token, TEST_JWT_SECRET).unwrap_err();
    assert!(matches!(error.kind(), ErrorKind::ExpiredSignature));
}

#[test]
fn test_token_signed_with_another_secret_is_rejected() {
    let token = create_token(TEST_USER_ID, 3600);

    let error = decode_claims(&token, "a-completely-different-secret").unwrap_err();
    assert!(matches!(error.kind(), ErrorKind::InvalidSignature));
}

// --- Rejection Mapping Tests ---

#[test]
fn test_rejection_maps_invalid_credentials() {
    let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;

    let error = parse_rejection(body, "Sign-in rejected with status 400");
    assert_eq!(error, AuthError::InvalidCredentials);
}

#[test]
fn test_rejection_maps_a_duplicate_email() {
    let registered = r#"{"code":422,"msg":"User already registered"}"#;
    assert_eq!(
        parse_rejection(registered, "fallback"),
        AuthError::EmailTaken
    );

    let exists = r#"{"message":"A user with this email address already exists"}"#;
    assert_eq!(parse_rejection(exists, "fallback"), AuthError::EmailTaken);
}

#[test]
fn test_rejection_passes_the_provider_message_through() {
    let body = r#"{"msg":"Password should be at least 6 characters"}"#;

    let error = parse_rejection(body, "fallback");
    assert_eq!(
        error,
        AuthError::Rejected("Password should be at least 6 characters".to_string())
    );
    // The form shows the message verbatim.
    assert_eq!(error.to_string(), "Password should be at least 6 characters");
}

#[test]
fn test_rejection_falls_back_when_the_body_is_opaque() {
    let error = parse_rejection("<html>Bad Gateway</html>", "Sign-in rejected with status 502");
    assert_eq!(
        error,
        AuthError::Rejected("Sign-in rejected with status 502".to_string())
    );
}

#[test]
fn test_rejection_reads_every_known_body_shape() {
    // GoTrue has shipped the message under several keys over time.
    let shapes = [
        r#"{"error_description":"Invalid login credentials"}"#,
        r#"{"msg":"Invalid login credentials"}"#,
        r#"{"message":"Invalid login credentials"}"#,
    ];
    for body in shapes {
        assert_eq!(
            parse_rejection(body, "fallback"),
            AuthError::InvalidCredentials,
            "shape not recognized: {}",
            body
        );
    }
}

#[test]
fn test_error_messages_are_user_facing() {
    assert_eq!(
        AuthError::InvalidCredentials.to_string(),
        "Invalid email or password"
    );
    assert_eq!(
        AuthError::EmailTaken.to_string(),
        "An account with this email already exists"
    );
}

// --- Mock Provider Tests ---

#[tokio::test]
async fn test_mock_sign_in_publishes_the_session() {
    let auth = MockAuth::new_subscribed();
    let mut sessions = auth.subscribe();
    assert!(sessions.borrow().is_none());

    let user = auth.sign_in("viewer@example.com", "password").await.unwrap();

    assert!(sessions.has_changed().unwrap());
    assert_eq!(
        sessions.borrow_and_update().as_ref().map(|u| u.id),
        Some(user.id)
    );
    assert_eq!(auth.current_user().map(|u| u.email), Some("viewer@example.com".to_string()));
}

#[tokio::test]
async fn test_mock_sessions_carry_the_subscription_flag() {
    let free = MockAuth::new();
    let user = free.sign_in("a@example.com", "password").await.unwrap();
    assert!(!user.subscription_active);

    let premium = MockAuth::new_subscribed();
    let user = premium.sign_in("b@example.com", "password").await.unwrap();
    assert!(user.subscription_active);
}

#[tokio::test]
async fn test_mock_failure_is_surfaced_and_publishes_nothing() {
    let mut auth = MockAuth::new();
    auth.fail_with = Some(AuthError::InvalidCredentials);

    let result = auth.sign_in("viewer@example.com", "wrong").await;

    assert_eq!(result, Err(AuthError::InvalidCredentials));
    assert!(auth.current_user().is_none());
}

#[tokio::test]
async fn test_mock_sign_up_establishes_a_session() {
    let auth = MockAuth::new();

    let user = auth.sign_up("new@example.com", "password").await.unwrap();

    assert_eq!(user.email, "new@example.com");
    assert_eq!(auth.current_user().map(|u| u.id), Some(user.id));
}

#[tokio::test]
async fn test_mock_sign_out_clears_the_published_session() {
    let auth = MockAuth::new();
    let mut sessions = auth.subscribe();
    auth.sign_in("viewer@example.com", "password").await.unwrap();
    sessions.borrow_and_update();

    auth.sign_out().await;

    assert!(sessions.has_changed().unwrap());
    assert!(sessions.borrow_and_update().is_none());
    assert!(auth.current_user().is_none());
}
