//! User account contracts

use hr_core::error::ValidationErrors;
use hr_models::{NewUser, Role, UserProfile};
use validator::Validate;

use crate::base::{authorize, from_validator, Contract, UserContext, ValidationResult};

fn validate_new_user(request: &NewUser, min_password: usize, errors: &mut ValidationErrors) {
    if let Err(source) = request.validate() {
        errors.merge(from_validator(&source));
    }
    if request.password.chars().count() < min_password {
        errors.add(
            "password",
            format!("is too short (minimum is {min_password} characters)"),
        );
    }
}

/// Self-registration. Anyone may register; the account starts unapproved.
pub struct RegisterUserContract {
    min_password: usize,
}

impl RegisterUserContract {
    pub fn new(min_password: usize) -> Self {
        Self { min_password }
    }
}

impl Contract<NewUser> for RegisterUserContract {
    fn validate(&self, request: &NewUser) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        validate_new_user(request, self.min_password, &mut errors);
        errors.into_result()
    }
}

/// An admin or approver creating an account for someone else
pub struct AddUserContract<'a, U: UserContext> {
    user: &'a U,
    min_password: usize,
}

impl<'a, U: UserContext> AddUserContract<'a, U> {
    pub fn new(user: &'a U, min_password: usize) -> Self {
        Self { user, min_password }
    }
}

impl<'a, U: UserContext> Contract<NewUser> for AddUserContract<'a, U> {
    fn validate(&self, request: &NewUser) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        authorize(self.user.role().can_add_users(), "add users", &mut errors);
        if request.role == Some(Role::Admin) && !self.user.is_admin() {
            errors.add("role", "can only be granted by an admin");
        }
        validate_new_user(request, self.min_password, &mut errors);
        errors.into_result()
    }
}

/// Role, branch and approval changes
pub struct UpdateUserContract<'a, U: UserContext> {
    user: &'a U,
}

impl<'a, U: UserContext> UpdateUserContract<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }
}

impl<'a, U: UserContext> Contract<UserProfile> for UpdateUserContract<'a, U> {
    fn validate(&self, _profile: &UserProfile) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        authorize(self.user.is_admin(), "manage users", &mut errors);
        errors.into_result()
    }
}

pub struct DeleteUserContract<'a, U: UserContext> {
    user: &'a U,
}

impl<'a, U: UserContext> DeleteUserContract<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }
}

impl<'a, U: UserContext> Contract<UserProfile> for DeleteUserContract<'a, U> {
    fn validate(&self, profile: &UserProfile) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        authorize(self.user.is_admin(), "delete users", &mut errors);
        if profile.id == self.user.id() {
            errors.add_base("You cannot delete your own account");
        }
        errors.into_result()
    }
}
