//! Base contract system

use hr_core::error::ValidationErrors;
use hr_core::traits::Id;
use hr_models::Role;
use validator::ValidationErrorsKind;

/// Result of contract validation
pub type ValidationResult = Result<(), ValidationErrors>;

/// Key under which role failures are collected
pub const AUTHORIZATION: &str = "authorization";

/// The acting user as seen by contracts and services
pub trait UserContext: Send + Sync {
    fn id(&self) -> Id;
    fn role(&self) -> Role;
    /// Branch title the user is scoped to, if any
    fn branch_id(&self) -> Option<&str>;

    fn is_approved(&self) -> bool {
        true
    }

    fn is_admin(&self) -> bool {
        self.role().is_admin()
    }

    fn is_approver(&self) -> bool {
        self.role().is_approver()
    }
}

/// Base contract trait
pub trait Contract<T>: Send + Sync {
    /// Validate the entity
    fn validate(&self, entity: &T) -> ValidationResult;
}

/// Record a role failure unless `allowed`
pub fn authorize(allowed: bool, action: &str, errors: &mut ValidationErrors) {
    if !allowed {
        errors.add(AUTHORIZATION, format!("You are not authorized to {action}"));
    }
}

/// Whether the collected errors include a role failure
pub fn is_authorization_failure(errors: &ValidationErrors) -> bool {
    errors.has_error(AUTHORIZATION)
}

/// Blank check on a trimmed string
pub fn validate_present(field: &str, value: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(field, "can't be blank");
    }
}

/// Fold `validator` derive output into our error collection.
/// Nested structs are reported as `parent.field`.
pub fn from_validator(source: &validator::ValidationErrors) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    collect("", source, &mut errors);
    errors
}

fn collect(prefix: &str, source: &validator::ValidationErrors, out: &mut ValidationErrors) {
    for (field, kind) in source.errors() {
        let name = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for error in list {
                    out.add(name.clone(), message_for(error));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect(&name, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(&format!("{name}[{index}]"), inner, out);
                }
            }
        }
    }
}

fn message_for(error: &validator::ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    match error.code.as_ref() {
        "length" => "has an invalid length".to_string(),
        "range" => "is out of range".to_string(),
        "email" => "is not a valid email".to_string(),
        other => format!("is invalid ({other})"),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use uuid::Uuid;

    pub struct MockUser {
        pub id: Id,
        pub role: Role,
        pub branch: Option<String>,
    }

    impl MockUser {
        pub fn with_role(role: Role) -> Self {
            Self {
                id: Uuid::new_v4(),
                role,
                branch: None,
            }
        }
    }

    impl UserContext for MockUser {
        fn id(&self) -> Id {
            self.id
        }
        fn role(&self) -> Role {
            self.role
        }
        fn branch_id(&self) -> Option<&str> {
            self.branch.as_deref()
        }
    }
}
