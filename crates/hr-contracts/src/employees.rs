//! Employee contracts

use hr_core::error::ValidationErrors;
use hr_core::traits::Id;
use hr_models::EmployeeInput;

use crate::base::{authorize, validate_present, Contract, UserContext, ValidationResult};

/// Field rules shared by create and update
fn validate_fields(input: &EmployeeInput, errors: &mut ValidationErrors) {
    validate_present("name", &input.name, errors);
    validate_present("role", &input.role, errors);
    validate_present("branch", &input.branch, errors);

    if !input.salary.is_finite() || input.salary <= 0.0 {
        errors.add("salary", "must be greater than 0");
    }

    if let Some(hours) = input.standard_hours_per_week {
        if !hours.is_finite() || hours <= 0.0 || hours > 168.0 {
            errors.add("standardHoursPerWeek", "must be between 0 and 168");
        }
    }

    if let Some(metrics) = input.metrics {
        for (name, value) in hr_models::KpiMetrics::NAMES.iter().zip(metrics.values()) {
            if value > 100 {
                errors.add(format!("metrics.{name}"), "must be between 0 and 100");
            }
        }
    }
}

/// Adding a new employee
pub struct CreateEmployeeContract<'a, U: UserContext> {
    user: &'a U,
}

impl<'a, U: UserContext> CreateEmployeeContract<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }
}

impl<'a, U: UserContext> Contract<EmployeeInput> for CreateEmployeeContract<'a, U> {
    fn validate(&self, input: &EmployeeInput) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        authorize(self.user.is_admin(), "add employees", &mut errors);
        validate_fields(input, &mut errors);
        errors.into_result()
    }
}

/// Editing an existing employee. Validates the merged result.
pub struct UpdateEmployeeContract<'a, U: UserContext> {
    user: &'a U,
}

impl<'a, U: UserContext> UpdateEmployeeContract<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }

    /// Role check alone, run before the target is looked up
    pub fn check_role(&self) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        authorize(self.user.is_admin(), "edit employees", &mut errors);
        errors.into_result()
    }
}

impl<'a, U: UserContext> Contract<EmployeeInput> for UpdateEmployeeContract<'a, U> {
    fn validate(&self, input: &EmployeeInput) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        authorize(self.user.is_admin(), "edit employees", &mut errors);
        validate_fields(input, &mut errors);
        errors.into_result()
    }
}

pub struct DeleteEmployeeContract<'a, U: UserContext> {
    user: &'a U,
}

impl<'a, U: UserContext> DeleteEmployeeContract<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }
}

impl<'a, U: UserContext> Contract<Id> for DeleteEmployeeContract<'a, U> {
    fn validate(&self, _employee_id: &Id) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        authorize(self.user.is_admin(), "delete employees", &mut errors);
        errors.into_result()
    }
}
