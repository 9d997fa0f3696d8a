//! Overtime contracts

use hr_core::error::ValidationErrors;
use hr_models::{NewOvertimeRecord, OvertimeRecord, OvertimeStatus};
use validator::Validate;

use crate::base::{authorize, from_validator, Contract, UserContext, ValidationResult};

/// Filing an overtime claim for an employee with a known salary
pub struct SubmitOvertimeContract<'a, U: UserContext> {
    user: &'a U,
    employee_salary: f64,
}

impl<'a, U: UserContext> SubmitOvertimeContract<'a, U> {
    pub fn new(user: &'a U, employee_salary: f64) -> Self {
        Self {
            user,
            employee_salary,
        }
    }
}

impl<'a, U: UserContext> Contract<NewOvertimeRecord> for SubmitOvertimeContract<'a, U> {
    fn validate(&self, request: &NewOvertimeRecord) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        authorize(self.user.is_approved(), "file overtime", &mut errors);

        if let Err(source) = request.validate() {
            errors.merge(from_validator(&source));
        }
        if !request.hours.is_finite() || request.hours <= 0.0 {
            errors.add("hours", "must be greater than 0");
        }
        if request.description.trim().is_empty() {
            errors.add("description", "can't be blank");
        }
        if !self.employee_salary.is_finite() || self.employee_salary <= 0.0 {
            errors.add_base("Cannot calculate overtime: employee salary is missing or zero");
        }

        errors.into_result()
    }
}

/// Approving or disapproving a claim
pub struct UpdateOvertimeStatusContract<'a, U: UserContext> {
    user: &'a U,
}

impl<'a, U: UserContext> UpdateOvertimeStatusContract<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }
}

impl<'a, U: UserContext> Contract<OvertimeStatus> for UpdateOvertimeStatusContract<'a, U> {
    fn validate(&self, status: &OvertimeStatus) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        authorize(self.user.is_approver(), "approve overtime", &mut errors);
        if !status.is_decision() {
            errors.add("status", "must be Approved or Disapproved");
        }
        errors.into_result()
    }
}

pub struct DeleteOvertimeContract<'a, U: UserContext> {
    user: &'a U,
}

impl<'a, U: UserContext> DeleteOvertimeContract<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }
}

impl<'a, U: UserContext> Contract<OvertimeRecord> for DeleteOvertimeContract<'a, U> {
    fn validate(&self, _record: &OvertimeRecord) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        authorize(self.user.is_admin(), "delete overtime records", &mut errors);
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::is_authorization_failure;
    use crate::base::test_support::MockUser;
    use hr_models::{OvertimeType, Role};
    use uuid::Uuid;

    fn request(hours: f64, description: &str) -> NewOvertimeRecord {
        NewOvertimeRecord {
            employee_id: Uuid::new_v4(),
            date: None,
            hours,
            ot_type: OvertimeType::Holiday,
            description: description.into(),
        }
    }

    #[test]
    fn test_viewer_may_submit() {
        let user = MockUser::with_role(Role::Viewer);
        let contract = SubmitOvertimeContract::new(&user, 12_000.0);
        assert!(contract.validate(&request(2.0, "Month-end close")).is_ok());
    }

    #[test]
    fn test_submission_rules() {
        let user = MockUser::with_role(Role::Viewer);
        let errors = SubmitOvertimeContract::new(&user, 0.0)
            .validate(&request(0.0, " "))
            .unwrap_err();
        assert!(errors.has_error("hours"));
        assert!(errors.has_error("description"));
        assert_eq!(errors.base_errors.len(), 1);
    }

    #[test]
    fn test_only_approvers_decide() {
        let admin = MockUser::with_role(Role::Admin);
        let errors = UpdateOvertimeStatusContract::new(&admin)
            .validate(&OvertimeStatus::Approved)
            .unwrap_err();
        assert!(is_authorization_failure(&errors));

        let approver = MockUser::with_role(Role::Approver);
        let contract = UpdateOvertimeStatusContract::new(&approver);
        assert!(contract.validate(&OvertimeStatus::Disapproved).is_ok());
        assert!(contract
            .validate(&OvertimeStatus::Pending)
            .unwrap_err()
            .has_error("status"));
    }
}
