//! Navigation state machine.
//!
//! Governs which screen is shown and enforces the gate before any document is
//! opened. Modeled as a reducer: a single update function takes the current
//! state snapshot plus one action and returns the next snapshot together with
//! the side effect the caller must perform. The state itself is never mutated
//! in place.

use uuid::Uuid;

use crate::gate::{self, AccessDecision};
use crate::models::{DocumentRequest, DocumentType, Faculty, Paper, Subject, User};

/// View
///
/// The four screens of the portal, a strictly linear forward chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Faculties,
    Subjects,
    Exams,
    Viewer,
}

/// NavigationState
///
/// Snapshot of where the session is in the catalog hierarchy.
///
/// Invariants, upheld by `reduce` after every step:
/// - `view == Subjects` implies `selected_faculty` is set
/// - `view == Exams` implies `selected_subject` is set (and the faculty too)
/// - `view == Viewer` implies `selected_paper` is set (and the levels above)
///
/// Created at session start as the faculties screen, discarded on session
/// end. Deliberately not persisted across sessions: this is navigation, not a
/// resumable workflow.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NavigationState {
    pub view: View,
    pub selected_faculty: Option<Faculty>,
    pub selected_subject: Option<Subject>,
    pub selected_paper: Option<DocumentRequest>,
}

impl NavigationState {
    /// The initial state: faculties screen, nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// The header breadcrumb for the current screen.
    pub fn breadcrumb(&self) -> String {
        match self.view {
            View::Faculties => "Faculties".to_string(),
            View::Subjects => match &self.selected_faculty {
                Some(faculty) => format!("{} - Subjects", faculty.name),
                None => "Subjects".to_string(),
            },
            View::Exams => match (&self.selected_faculty, &self.selected_subject) {
                (Some(faculty), Some(subject)) => {
                    format!("{} - {} - Exams", faculty.name, subject.name)
                }
                _ => "Exams".to_string(),
            },
            View::Viewer => "PDF Viewer".to_string(),
        }
    }
}

/// Action
///
/// The events the reducer understands, one per user gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A faculty tile was chosen. Valid only on the faculties screen.
    SelectFaculty(Faculty),
    /// A subject card was chosen. Valid only on the subjects screen.
    SelectSubject(Subject),
    /// A question-paper or answer-key button was pressed on the exams screen.
    RequestAccess {
        paper: Paper,
        document: DocumentType,
    },
    /// Move exactly one level up, clearing the selection being left.
    Back,
}

/// Effect
///
/// What the caller must do after applying a step. The reducer itself performs
/// no I/O and opens no prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// The gate turned the request away for lack of a session.
    PromptSignIn,
    /// The gate turned the request away for lack of a subscription.
    PromptSubscription,
    /// The gate approved: record the access in the backend log.
    /// Fire-and-forget; a failed write never blocks the viewer.
    RecordAccess { user_id: Uuid, paper_id: i64 },
}

/// Step
///
/// Result of one reduction: the next state plus the effect it implies.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub next: NavigationState,
    pub effect: Effect,
}

impl Step {
    fn stay(state: &NavigationState, effect: Effect) -> Self {
        Self {
            next: state.clone(),
            effect,
        }
    }
}

/// reduce
///
/// The single transition function. Actions that are not valid on the current
/// screen leave the state unchanged with no effect. The `user` argument is
/// the auth snapshot taken when the action was raised; the gate decision is
/// evaluated against exactly that snapshot.
pub fn reduce(state: &NavigationState, action: Action, user: Option<&User>) -> Step {
    match action {
        Action::SelectFaculty(faculty) => {
            if state.view != View::Faculties {
                return Step::stay(state, Effect::None);
            }
            let mut next = state.clone();
            next.view = View::Subjects;
            next.selected_faculty = Some(faculty);
            Step {
                next,
                effect: Effect::None,
            }
        }

        Action::SelectSubject(subject) => {
            if state.view != View::Subjects {
                return Step::stay(state, Effect::None);
            }
            let mut next = state.clone();
            next.view = View::Exams;
            next.selected_subject = Some(subject);
            Step {
                next,
                effect: Effect::None,
            }
        }

        Action::RequestAccess { paper, document } => {
            if state.view != View::Exams {
                return Step::stay(state, Effect::None);
            }
            let request = DocumentRequest::new(paper, document);
            match gate::decide(user, &request) {
                AccessDecision::RequireAuth => Step::stay(state, Effect::PromptSignIn),
                AccessDecision::RequireSubscription => {
                    Step::stay(state, Effect::PromptSubscription)
                }
                AccessDecision::Approve => {
                    // The gate only approves for a present user.
                    let Some(user) = user else {
                        return Step::stay(state, Effect::PromptSignIn);
                    };
                    let paper_id = request.paper.id;
                    let mut next = state.clone();
                    next.view = View::Viewer;
                    next.selected_paper = Some(request);
                    Step {
                        next,
                        effect: Effect::RecordAccess {
                            user_id: user.id,
                            paper_id,
                        },
                    }
                }
            }
        }

        Action::Back => {
            let mut next = state.clone();
            match state.view {
                // Already at the top; nothing to go back to.
                View::Faculties => return Step::stay(state, Effect::None),
                View::Subjects => {
                    next.view = View::Faculties;
                    next.selected_faculty = None;
                }
                View::Exams => {
                    next.view = View::Subjects;
                    next.selected_subject = None;
                }
                View::Viewer => {
                    next.view = View::Exams;
                    next.selected_paper = None;
                }
            }
            Step {
                next,
                effect: Effect::None,
            }
        }
    }
}
