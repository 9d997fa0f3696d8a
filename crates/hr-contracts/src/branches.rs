//! Branch contracts

use hr_core::error::ValidationErrors;
use hr_models::Branch;

use crate::base::{authorize, validate_present, Contract, UserContext, ValidationResult};

fn validate_title(title: &str, errors: &mut ValidationErrors) {
    validate_present("title", title, errors);
    if title.trim().chars().count() > 255 {
        errors.add("title", "is too long (maximum is 255 characters)");
    }
}

/// Creating or renaming a branch
pub struct SaveBranchContract<'a, U: UserContext> {
    user: &'a U,
}

impl<'a, U: UserContext> SaveBranchContract<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }
}

impl<'a, U: UserContext> Contract<Branch> for SaveBranchContract<'a, U> {
    fn validate(&self, branch: &Branch) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        authorize(self.user.is_admin(), "manage branches", &mut errors);
        validate_title(&branch.title, &mut errors);
        errors.into_result()
    }
}

pub struct DeleteBranchContract<'a, U: UserContext> {
    user: &'a U,
}

impl<'a, U: UserContext> DeleteBranchContract<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }
}

impl<'a, U: UserContext> Contract<Branch> for DeleteBranchContract<'a, U> {
    fn validate(&self, _branch: &Branch) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        authorize(self.user.is_admin(), "delete branches", &mut errors);
        errors.into_result()
    }
}
