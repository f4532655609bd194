use std::sync::Arc;

use crate::auth::AuthState;
use crate::catalog::CatalogState;
use crate::config::AppConfig;
use crate::errors::{AuthError, CatalogError};
use crate::fallback;
use crate::models::{AccessLogEntry, DocumentRequest, Faculty, Paper, Subject, User};
use crate::navigation::{self, Action, Effect, NavigationState, View};
use crate::protection::{ContentProtection, InputEvent, Verdict};

/// ActionOutcome
///
/// What a dispatched action amounted to, from the front end's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The screen changed; re-render.
    Navigated,
    /// The gate wants a sign-in first. The screen did not change.
    SignInRequired,
    /// The gate wants an active subscription first. The screen did not change.
    SubscriptionRequired,
    /// The action was not valid on the current screen; nothing happened.
    Ignored,
}

/// Session
///
/// Owns the per-session state: the navigation snapshot and the protection
/// layer, plus handles to the auth and catalog collaborators. All mutation
/// goes through `dispatch`, which applies one action at a time against the
/// auth state as resolved at that moment.
///
/// The session is deliberately single-owner: one user, one screen, no
/// concurrent mutation path. The only background work it starts is the
/// fire-and-forget access-log write.
pub struct Session {
    config: AppConfig,
    catalog: CatalogState,
    auth: AuthState,
    state: NavigationState,
    protection: Arc<ContentProtection>,
}

impl Session {
    /// Creates a session at the faculties screen with no document open.
    pub fn new(config: AppConfig, catalog: CatalogState, auth: AuthState) -> Self {
        Self {
            config,
            catalog,
            auth,
            state: NavigationState::new(),
            protection: Arc::new(ContentProtection::default()),
        }
    }

    // --- State Access ---

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn breadcrumb(&self) -> String {
        self.state.breadcrumb()
    }

    /// The document currently open in the viewer, if any.
    pub fn current_document(&self) -> Option<&DocumentRequest> {
        self.state.selected_paper.as_ref()
    }

    pub fn current_user(&self) -> Option<User> {
        self.auth.current_user()
    }

    /// A handle to the protection layer, cloneable into the blocking task
    /// that runs the viewer.
    pub fn protection(&self) -> Arc<ContentProtection> {
        Arc::clone(&self.protection)
    }

    /// Routes one front-end input event through the protection layer.
    pub fn inspect_event(&self, event: &InputEvent) -> Verdict {
        self.protection.inspect(event)
    }

    // --- Action Dispatch ---

    /// dispatch
    ///
    /// Applies one action:
    ///
    /// 1. Snapshot the auth state; the gate decision is made against exactly
    ///    this snapshot, not against whatever the provider resolves later.
    /// 2. Reduce the navigation state.
    /// 3. Perform the implied effect: an approved access spawns the
    ///    fire-and-forget log write before the state advances to the viewer.
    /// 4. Install or remove the protection layer when the viewer is entered
    ///    or left.
    ///
    /// Must be called from within the async runtime, as the log write is
    /// spawned as a background task.
    pub fn dispatch(&mut self, action: Action) -> ActionOutcome {
        // 1. Auth snapshot.
        let user = self.auth.current_user();

        // 2. Reduce.
        let step = navigation::reduce(&self.state, action, user.as_ref());

        // 3. Effect.
        let outcome = match &step.effect {
            Effect::None => {
                if step.next == self.state {
                    ActionOutcome::Ignored
                } else {
                    ActionOutcome::Navigated
                }
            }
            Effect::PromptSignIn => ActionOutcome::SignInRequired,
            Effect::PromptSubscription => ActionOutcome::SubscriptionRequired,
            Effect::RecordAccess { user_id, paper_id } => {
                self.record_access(*user_id, *paper_id);
                ActionOutcome::Navigated
            }
        };

        // 4. Apply, bracketing the protection layer around the viewer.
        self.apply(step.next);

        outcome
    }

    /// Spawns the access-log write. Failure is logged and swallowed: the log
    /// is telemetry, never an authorization record, and must not delay or
    /// block the viewer.
    fn record_access(&self, user_id: uuid::Uuid, paper_id: i64) {
        let catalog = Arc::clone(&self.catalog);
        tokio::spawn(async move {
            if let Err(e) = catalog.log_access(AccessLogEntry::now(user_id, paper_id)).await {
                tracing::warn!("{}", e);
            }
        });
    }

    fn apply(&mut self, next: NavigationState) {
        let was_viewer = self.state.view == View::Viewer;
        let is_viewer = next.view == View::Viewer;
        self.state = next;

        if is_viewer && !was_viewer {
            self.protection.install();
            tracing::debug!("Content protection installed");
        } else if was_viewer && !is_viewer {
            self.protection.remove();
            tracing::debug!("Content protection removed");
        }
    }

    // --- Screen Data ---

    /// The faculty list for the faculties screen.
    ///
    /// On a backend failure the static fallback is substituted (with a
    /// warning) so browsing degrades to sample data instead of an error
    /// dialog. Deployments that prefer a visible outage disable the
    /// substitution in configuration, in which case the error propagates.
    pub async fn faculties(&self) -> Result<Vec<Faculty>, CatalogError> {
        match self.catalog.list_faculties().await {
            Ok(faculties) => Ok(faculties),
            Err(e) if self.config.static_fallback => {
                tracing::warn!("Faculty list unavailable, serving the static fallback: {}", e);
                Ok(fallback::faculties())
            }
            Err(e) => Err(e),
        }
    }

    /// The subject list for the currently selected faculty. Empty when no
    /// faculty is selected, since no screen would show it.
    pub async fn subjects(&self) -> Result<Vec<Subject>, CatalogError> {
        let Some(faculty) = &self.state.selected_faculty else {
            return Ok(Vec::new());
        };
        match self.catalog.list_subjects(faculty.id).await {
            Ok(subjects) => Ok(subjects),
            Err(e) if self.config.static_fallback => {
                tracing::warn!("Subject list unavailable, serving the static fallback: {}", e);
                Ok(fallback::subjects(faculty.id))
            }
            Err(e) => Err(e),
        }
    }

    /// The paper list for the currently selected subject. Empty when no
    /// subject is selected.
    pub async fn papers(&self) -> Result<Vec<Paper>, CatalogError> {
        let Some(subject) = &self.state.selected_subject else {
            return Ok(Vec::new());
        };
        match self.catalog.list_papers(subject.id).await {
            Ok(papers) => Ok(papers),
            Err(e) if self.config.static_fallback => {
                tracing::warn!("Paper list unavailable, serving the static fallback: {}", e);
                Ok(fallback::papers(subject.id))
            }
            Err(e) => Err(e),
        }
    }

    // --- Account Operations ---

    /// Delegates to the auth provider. Errors are surfaced verbatim to the
    /// sign-in form; the form stays open for another attempt.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.auth.sign_in(email, password).await
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.auth.sign_up(email, password).await
    }

    /// Ends the account session. Navigation is left where it is; the next
    /// gated action will be decided against the signed-out state.
    pub async fn sign_out(&self) {
        self.auth.sign_out().await;
    }
}
