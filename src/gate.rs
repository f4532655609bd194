//! Document access gate.
//!
//! The single authorization decision point in front of protected documents.
//! The decision is pure: opening prompts, advancing navigation, and writing
//! the access log are all the caller's responsibility.

use crate::models::{DocumentRequest, User};

/// AccessDecision
///
/// Outcome of evaluating a document request against the current auth state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// Open the viewer. The caller must also record an access-log event
    /// (fire-and-forget; a failed write never blocks viewing).
    Approve,
    /// No signed-in user. Prompt for sign-in; navigation is unchanged.
    RequireAuth,
    /// Signed in but not subscribed. Prompt the subscription upsell;
    /// navigation is unchanged.
    RequireSubscription,
}

/// decide
///
/// Evaluates a document request against the auth state snapshot taken at the
/// moment of the request. Rules apply in order, identity before subscription:
/// an anonymous caller is told to sign in and never learns whether the
/// document sits behind the paywall.
///
/// The decision is the same for both document types of a paper; the request
/// is taken whole so callers hand over exactly what they hold.
pub fn decide(user: Option<&User>, _request: &DocumentRequest) -> AccessDecision {
    match user {
        None => AccessDecision::RequireAuth,
        Some(user) if !user.subscription_active => AccessDecision::RequireSubscription,
        Some(_) => AccessDecision::Approve,
    }
}
