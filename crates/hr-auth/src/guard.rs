//! Route guard
//!
//! Decides whether a visitor may enter a protected area of the dashboard,
//! and where to send them otherwise.

use hr_core::error::{HrError, HrResult};
use hr_models::Role;

use crate::current_user::CurrentUser;

pub const LOGIN_PATH: &str = "/login";
pub const PENDING_APPROVAL_PATH: &str = "/pending-approval";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

/// What is known about the visitor
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Profile still being fetched
    Loading,
    Anonymous,
    Authenticated(CurrentUser),
}

/// Entry requirement of a protected area
#[derive(Debug, Clone, PartialEq)]
pub struct Requirement {
    /// `None` admits every role
    pub roles: Option<Vec<Role>>,
    pub require_approved: bool,
}

impl Default for Requirement {
    fn default() -> Self {
        Self {
            roles: None,
            require_approved: true,
        }
    }
}

impl Requirement {
    pub fn any_role() -> Self {
        Self::default()
    }

    pub fn roles(roles: &[Role]) -> Self {
        Self {
            roles: Some(roles.to_vec()),
            ..Default::default()
        }
    }

    /// Also admit accounts still waiting for approval
    pub fn allow_unapproved(mut self) -> Self {
        self.require_approved = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Loading,
    RedirectLogin,
    PendingApproval,
    Unauthorized,
    Allow,
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow)
    }

    /// Where a refused visitor goes
    pub fn redirect_path(&self) -> Option<&'static str> {
        match self {
            GuardDecision::RedirectLogin => Some(LOGIN_PATH),
            GuardDecision::PendingApproval => Some(PENDING_APPROVAL_PATH),
            GuardDecision::Unauthorized => Some(UNAUTHORIZED_PATH),
            GuardDecision::Loading | GuardDecision::Allow => None,
        }
    }
}

/// Checks run in order: loading, signed in, approved, role.
pub fn evaluate(state: &SessionState, requirement: &Requirement) -> GuardDecision {
    let user = match state {
        SessionState::Loading => return GuardDecision::Loading,
        SessionState::Anonymous => return GuardDecision::RedirectLogin,
        SessionState::Authenticated(user) => user,
    };

    if requirement.require_approved && !user.approved {
        return GuardDecision::PendingApproval;
    }

    match &requirement.roles {
        Some(roles) if !roles.contains(&user.role) => GuardDecision::Unauthorized,
        _ => GuardDecision::Allow,
    }
}

impl GuardDecision {
    /// API form of the decision: 401 for anonymous, 403 for refusals
    pub fn into_result(self) -> HrResult<()> {
        match self {
            GuardDecision::Allow => Ok(()),
            GuardDecision::Loading | GuardDecision::RedirectLogin => Err(HrError::Unauthorized {
                message: "Authentication required".to_string(),
            }),
            GuardDecision::PendingApproval => {
                Err(HrError::forbidden("Your account is pending approval"))
            }
            GuardDecision::Unauthorized => Err(HrError::forbidden(
                "You are not authorized to access this resource",
            )),
        }
    }
}
