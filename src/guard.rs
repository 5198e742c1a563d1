use crate::models::Role;
use crate::session::SessionState;

/// Access
///
/// The guard's verdict for a panel entry attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Session resolution is still in flight. Render a neutral loading state
    /// and perform no redirect.
    Pending,
    /// The session holds one of the required roles.
    Allowed,
    Denied(DenyReason),
}

/// DenyReason
///
/// Distinguishes "send them to the login screen" from "tell them this panel
/// is not theirs". The latter must never redirect, or an admin landing on a
/// student page would bounce forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NotAuthenticated,
    WrongRole,
}

/// RoleGuard
///
/// Gates a panel on a set of roles. `decide` is a pure function of the
/// session snapshot: no network calls, no hidden mutation, so identical
/// inputs always produce identical verdicts.
#[derive(Debug, Clone)]
pub struct RoleGuard {
    required: Vec<Role>,
}

impl RoleGuard {
    pub fn new(required: impl Into<Vec<Role>>) -> Self {
        Self {
            required: required.into(),
        }
    }

    /// Convenience for single-role panels.
    pub fn only(role: Role) -> Self {
        Self {
            required: vec![role],
        }
    }

    pub fn decide(&self, session: &SessionState) -> Access {
        evaluate(session, &self.required)
    }
}

/// Pure decision function behind `RoleGuard`.
pub fn evaluate(session: &SessionState, required: &[Role]) -> Access {
    match session {
        SessionState::Authenticating => Access::Pending,
        SessionState::Anonymous | SessionState::Error(_) => {
            Access::Denied(DenyReason::NotAuthenticated)
        }
        SessionState::Authenticated(profile) => {
            if required.contains(&profile.role) {
                Access::Allowed
            } else {
                Access::Denied(DenyReason::WrongRole)
            }
        }
    }
}
