//! Service result type

use hr_contracts::is_authorization_failure;
use hr_core::error::{HrError, HrResult, ValidationErrors};

/// Outcome of a service call.
///
/// Contract failures keep their field errors. Storage and lookup failures
/// carry the underlying `HrError`.
#[derive(Debug)]
pub struct ServiceResult<T> {
    success: bool,
    result: Option<T>,
    errors: ValidationErrors,
    error: Option<HrError>,
    message: Option<String>,
}

impl<T> ServiceResult<T> {
    pub fn success(result: T) -> Self {
        Self {
            success: true,
            result: Some(result),
            errors: ValidationErrors::new(),
            error: None,
            message: None,
        }
    }

    pub fn success_with_message(result: T, message: impl Into<String>) -> Self {
        Self::success(result).with_message(message)
    }

    /// Failed contract
    pub fn failure(errors: ValidationErrors) -> Self {
        Self {
            success: false,
            result: None,
            errors,
            error: None,
            message: None,
        }
    }

    pub fn failure_with_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        Self::failure(errors)
    }

    pub fn failure_with_base_error(message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add_base(message);
        Self::failure(errors)
    }

    /// Failure that is not a validation problem
    pub fn from_error(error: HrError) -> Self {
        let errors = match &error {
            HrError::Validation(errors) => errors.clone(),
            other => {
                let mut errors = ValidationErrors::new();
                errors.add_base(other.to_string());
                errors
            }
        };
        Self {
            success: false,
            result: None,
            errors,
            error: Some(error),
            message: None,
        }
    }

    pub fn from_result(result: HrResult<T>) -> Self {
        match result {
            Ok(value) => Self::success(value),
            Err(error) => Self::from_error(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn is_failure(&self) -> bool {
        !self.success
    }

    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    pub fn take_result(&mut self) -> Option<T> {
        self.result.take()
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn error(&self) -> Option<&HrError> {
        self.error.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn full_messages(&self) -> Vec<String> {
        self.errors.full_messages()
    }

    pub fn map<U, F>(self, f: F) -> ServiceResult<U>
    where
        F: FnOnce(T) -> U,
    {
        ServiceResult {
            success: self.success,
            result: self.result.map(f),
            errors: self.errors,
            error: self.error,
            message: self.message,
        }
    }

    /// Convert into a plain result. Role failures become `Forbidden`,
    /// other contract failures `Validation`.
    pub fn into_result(self) -> HrResult<T> {
        if let Some(error) = self.error {
            return Err(error);
        }
        match self.result {
            Some(value) if self.success => Ok(value),
            _ if is_authorization_failure(&self.errors) => {
                Err(HrError::forbidden(self.errors.full_messages().join(", ")))
            }
            _ => Err(HrError::Validation(self.errors)),
        }
    }
}

impl<T> From<HrError> for ServiceResult<T> {
    fn from(error: HrError) -> Self {
        Self::from_error(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hr_contracts::AUTHORIZATION;

    #[test]
    fn test_success() {
        let result = ServiceResult::success(42).with_message("done");
        assert!(result.is_success());
        assert_eq!(result.result(), Some(&42));
        assert_eq!(result.message(), Some("done"));
        assert_eq!(result.into_result().unwrap(), 42);
    }

    #[test]
    fn test_validation_failure() {
        let result: ServiceResult<()> = ServiceResult::failure_with_error("title", "can't be blank");
        assert!(result.is_failure());
        assert_eq!(result.full_messages(), vec!["title can't be blank"]);
        assert_eq!(result.into_result().unwrap_err().status_code(), 422);
    }

    #[test]
    fn test_authorization_failure_is_forbidden() {
        let result: ServiceResult<()> =
            ServiceResult::failure_with_error(AUTHORIZATION, "nope");
        assert_eq!(result.into_result().unwrap_err().status_code(), 403);
    }

    #[test]
    fn test_error_passthrough() {
        let result: ServiceResult<u8> = HrError::not_found("Branch", "x").into();
        assert!(result.is_failure());
        assert_eq!(result.errors().base_errors.len(), 1);
        assert_eq!(result.into_result().unwrap_err().status_code(), 404);
    }

    #[test]
    fn test_map() {
        let result = ServiceResult::success(2).map(|n| n * 10);
        assert_eq!(result.result(), Some(&20));
    }
}
