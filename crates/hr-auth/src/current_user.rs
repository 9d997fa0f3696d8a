//! The authenticated caller

use hr_contracts::UserContext;
use hr_core::traits::Id;
use hr_models::{Role, UserProfile};
use serde::Serialize;

/// Caller identity resolved from a token and the live profile
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: Id,
    pub role: Role,
    pub approved: bool,
    pub branch_id: Option<String>,
}

impl From<&UserProfile> for CurrentUser {
    fn from(profile: &UserProfile) -> Self {
        Self {
            id: profile.id,
            role: profile.role,
            approved: profile.approved,
            branch_id: profile.branch_scope().map(str::to_string),
        }
    }
}

impl UserContext for CurrentUser {
    fn id(&self) -> Id {
        self.id
    }

    fn role(&self) -> Role {
        self.role
    }

    fn branch_id(&self) -> Option<&str> {
        self.branch_id.as_deref()
    }

    fn is_approved(&self) -> bool {
        self.approved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_profile_trims_scope() {
        let mut profile = UserProfile::registered("v@example.com", None, String::new());
        profile.branch_id = Some("  ".into());
        let user = CurrentUser::from(&profile);

        assert_eq!(user.branch_id, None);
        assert!(!user.is_approved());
        assert!(!user.is_admin());
    }
}
