//! Dashboard roles

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Role stored on a user profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Approver,
    #[default]
    Viewer,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Approver, Role::Viewer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Approver => "approver",
            Role::Viewer => "viewer",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn is_approver(&self) -> bool {
        matches!(self, Role::Approver)
    }

    /// Admins and approvers may create accounts for others
    pub fn can_add_users(&self) -> bool {
        matches!(self, Role::Admin | Role::Approver)
    }

    /// Admins and approvers see every overtime record of an employee
    pub fn sees_all_overtime(&self) -> bool {
        matches!(self, Role::Admin | Role::Approver)
    }

    /// Landing page after login
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::Admin => "/admin",
            Role::Approver => "/approver",
            Role::Viewer => "/viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "approver" => Ok(Role::Approver),
            "viewer" => Ok(Role::Viewer),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roles() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!(" Approver ".parse::<Role>(), Ok(Role::Approver));
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_capabilities() {
        assert!(Role::Admin.can_add_users());
        assert!(Role::Approver.can_add_users());
        assert!(!Role::Viewer.can_add_users());
        assert!(!Role::Viewer.sees_all_overtime());
        assert_eq!(Role::default(), Role::Viewer);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Role::Approver).unwrap();
        assert_eq!(json, "\"approver\"");
    }
}
