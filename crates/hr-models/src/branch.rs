//! Branch model
//!
//! Table: branches

use chrono::{DateTime, Utc};
use hr_core::traits::{Entity, Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A company branch. Other collections reference it by `title`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: Id,

    #[validate(length(min = 1, max = 255))]
    pub title: String,

    /// Mean KPI score over every scorecard in the branch
    pub avg_score: f64,

    /// Sum of the department head counts
    pub employee_count: u32,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Branch {
    /// New branch with empty aggregates
    pub fn new(title: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.trim().to_string(),
            avg_score: 0.0,
            employee_count: 0,
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

impl Identifiable for Branch {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for Branch {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for Branch {
    const TABLE_NAME: &'static str = "branches";
    const TYPE_NAME: &'static str = "Branch";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_branch_is_trimmed_and_empty() {
        let branch = Branch::new("  Bole  ");
        assert_eq!(branch.title, "Bole");
        assert_eq!(branch.avg_score, 0.0);
        assert_eq!(branch.employee_count, 0);
        assert!(branch.validate().is_ok());
    }
}
