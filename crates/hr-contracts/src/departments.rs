//! Department contracts

use hr_core::error::ValidationErrors;
use hr_models::Department;

use crate::base::{authorize, validate_present, Contract, UserContext, ValidationResult};

/// Creating or renaming a department
pub struct SaveDepartmentContract<'a, U: UserContext> {
    user: &'a U,
}

impl<'a, U: UserContext> SaveDepartmentContract<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }
}

impl<'a, U: UserContext> Contract<Department> for SaveDepartmentContract<'a, U> {
    fn validate(&self, department: &Department) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        authorize(self.user.is_admin(), "manage departments", &mut errors);
        validate_present("branch", &department.branch, &mut errors);
        validate_present("title", &department.title, &mut errors);
        if department.title.trim().chars().count() > 255 {
            errors.add("title", "is too long (maximum is 255 characters)");
        }
        errors.into_result()
    }
}

pub struct DeleteDepartmentContract<'a, U: UserContext> {
    user: &'a U,
}

impl<'a, U: UserContext> DeleteDepartmentContract<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }
}

impl<'a, U: UserContext> Contract<Department> for DeleteDepartmentContract<'a, U> {
    fn validate(&self, _department: &Department) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        authorize(self.user.is_admin(), "delete departments", &mut errors);
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::test_support::MockUser;
    use hr_models::Role;

    #[test]
    fn test_requires_branch_context() {
        let user = MockUser::with_role(Role::Admin);
        let errors = SaveDepartmentContract::new(&user)
            .validate(&Department::new("", "Sales"))
            .unwrap_err();
        assert!(errors.has_error("branch"));
        assert!(!errors.has_error("title"));
    }

    #[test]
    fn test_viewer_cannot_delete() {
        let user = MockUser::with_role(Role::Viewer);
        assert!(DeleteDepartmentContract::new(&user)
            .validate(&Department::new("Bole", "Sales"))
            .is_err());
    }
}
