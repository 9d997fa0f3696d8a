//! Request handlers, one module per resource

pub mod auth;
pub mod branches;
pub mod departments;
pub mod employees;
pub mod overtime;
pub mod reports;
pub mod users;

use hr_core::error::HrResult;

/// Password hasher handed to the account services
pub(crate) fn hash(password: &str) -> HrResult<String> {
    Ok(hr_auth::hash_password(password)?)
}
