//! User profile model
//!
//! Table: user_profiles

use chrono::{DateTime, Utc};
use hr_core::traits::{Entity, Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::role::Role;

/// Account plus dashboard profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Id,
    pub email: String,
    pub display_name: Option<String>,
    pub role: Role,
    /// Branch title an approver is scoped to
    pub branch_id: Option<String>,
    /// Set by an admin before the dashboard opens up
    pub approved: bool,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Self-registered profile: viewer, awaiting approval
    pub fn registered(email: &str, display_name: Option<String>, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.trim().to_lowercase(),
            display_name,
            role: Role::Viewer,
            branch_id: None,
            approved: false,
            password_hash,
            created_at: Utc::now(),
        }
    }

    /// Trimmed branch scope, ignoring blanks
    pub fn branch_scope(&self) -> Option<&str> {
        self.branch_id
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
    }
}

impl Identifiable for UserProfile {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for UserProfile {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}

impl Entity for UserProfile {
    const TABLE_NAME: &'static str = "user_profiles";
    const TYPE_NAME: &'static str = "User";
}

/// Registration or admin-created account
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(max = 255))]
    pub display_name: Option<String>,
    /// Ignored on self-registration
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub branch_id: Option<String>,
}
