//! Employee master record
//!
//! Table: employees

use chrono::{DateTime, Utc};
use hr_core::traits::{Entity, Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::department::UNASSIGNED;
use crate::kpi::KpiMetrics;

/// Default weekly hours on a new overtime profile
pub const DEFAULT_STANDARD_HOURS: f64 = 40.0;

/// Employee entity, the single source of truth for employee data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Id,
    pub name: String,
    /// Job title
    pub role: String,
    /// Monthly salary in ETB
    pub salary: f64,
    pub branch: String,
    pub department: String,
    pub metrics: KpiMetrics,
    pub standard_hours_per_week: f64,
    pub created_by: Option<Id>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    /// Department title, treating blanks as unassigned
    pub fn department_or_unassigned(&self) -> &str {
        let dept = self.department.trim();
        if dept.is_empty() {
            UNASSIGNED
        } else {
            dept
        }
    }

    /// The data a sync needs to rewrite this employee
    pub fn to_input(&self) -> EmployeeInput {
        EmployeeInput {
            name: self.name.clone(),
            role: self.role.clone(),
            salary: self.salary,
            branch: self.branch.clone(),
            department: Some(self.department.clone()),
            metrics: Some(self.metrics),
            standard_hours_per_week: Some(self.standard_hours_per_week),
            created_by: self.created_by,
        }
    }
}

impl Identifiable for Employee {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for Employee {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }
}

impl Entity for Employee {
    const TABLE_NAME: &'static str = "employees";
    const TYPE_NAME: &'static str = "Employee";
}

/// Employee data as handed to the synchronization routine
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EmployeeInput {
    pub name: String,
    pub role: String,
    pub salary: f64,
    pub branch: String,
    pub department: Option<String>,
    pub metrics: Option<KpiMetrics>,
    pub standard_hours_per_week: Option<f64>,
    pub created_by: Option<Id>,
}

impl EmployeeInput {
    pub fn normalized_branch(&self) -> String {
        self.branch.trim().to_string()
    }

    /// Trimmed department, or `Unassigned` when blank
    pub fn normalized_department(&self) -> String {
        match self.department.as_deref().map(str::trim) {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => UNASSIGNED.to_string(),
        }
    }
}

/// Create employee request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    #[validate(length(max = 255))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub role: String,
    #[serde(default)]
    pub salary: f64,
    #[validate(length(max = 255))]
    pub branch: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub metrics: Option<KpiMetrics>,
}

impl NewEmployee {
    pub fn into_input(self, created_by: Id) -> EmployeeInput {
        EmployeeInput {
            name: self.name.trim().to_string(),
            role: self.role.trim().to_string(),
            salary: self.salary,
            branch: self.branch,
            department: self.department,
            metrics: Some(self.metrics.unwrap_or_default()),
            standard_hours_per_week: Some(DEFAULT_STANDARD_HOURS),
            created_by: Some(created_by),
        }
    }
}

/// Partial employee update; absent fields keep their current value
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployee {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 255))]
    pub role: Option<String>,
    pub salary: Option<f64>,
    #[validate(length(min = 1, max = 255))]
    pub branch: Option<String>,
    pub department: Option<String>,
    pub standard_hours_per_week: Option<f64>,
}

impl UpdateEmployee {
    /// Overlay the update on the current record
    pub fn merge(&self, existing: &Employee) -> EmployeeInput {
        let mut input = existing.to_input();
        if let Some(name) = &self.name {
            input.name = name.trim().to_string();
        }
        if let Some(role) = &self.role {
            input.role = role.trim().to_string();
        }
        if let Some(salary) = self.salary {
            input.salary = salary;
        }
        if let Some(branch) = &self.branch {
            input.branch = branch.clone();
        }
        if let Some(department) = &self.department {
            input.department = Some(department.clone());
        }
        if let Some(hours) = self.standard_hours_per_week {
            input.standard_hours_per_week = Some(hours);
        }
        input
    }
}
