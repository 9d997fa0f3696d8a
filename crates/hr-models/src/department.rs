//! Department model
//!
//! Table: departments

use chrono::{DateTime, Utc};
use hr_core::traits::{Entity, Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Department title given to employees created without one
pub const UNASSIGNED: &str = "Unassigned";

/// A department inside a branch, unique on (branch, title)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: Id,

    /// Title of the owning branch
    #[validate(length(min = 1, max = 255))]
    pub branch: String,

    #[validate(length(min = 1, max = 255))]
    pub title: String,

    /// Mean score of the scorecards filed under (branch, title)
    pub avg_score: f64,

    /// Distinct employees with a scorecard under (branch, title)
    pub employee_count: u32,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Department {
    pub fn new(branch: &str, title: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            branch: branch.trim().to_string(),
            title: title.trim().to_string(),
            avg_score: 0.0,
            employee_count: 0,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// The auto-created bucket for employees without a department.
    /// Created on first sync, so it starts with that employee counted.
    pub fn unassigned(branch: &str) -> Self {
        Self {
            employee_count: 1,
            ..Self::new(branch, UNASSIGNED)
        }
    }

    pub fn is_unassigned(&self) -> bool {
        self.title == UNASSIGNED
    }

    pub fn matches(&self, branch: &str, title: &str) -> bool {
        self.branch == branch.trim() && self.title == title.trim()
    }
}

impl Identifiable for Department {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for Department {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for Department {
    const TABLE_NAME: &'static str = "departments";
    const TYPE_NAME: &'static str = "Department";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unassigned_department() {
        let dept = Department::unassigned(" Adama ");
        assert_eq!(dept.branch, "Adama");
        assert!(dept.is_unassigned());
        assert_eq!(dept.employee_count, 1);
    }

    #[test]
    fn test_matches_trims_input() {
        let dept = Department::new("Adama", "Finance");
        assert!(dept.matches(" Adama", "Finance "));
        assert!(!dept.matches("Adama", "Sales"));
    }
}
