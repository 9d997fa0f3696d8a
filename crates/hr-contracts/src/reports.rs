//! Report filter contracts

use hr_core::error::ValidationErrors;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::base::{Contract, ValidationResult};

/// `YYYY-MM` with a real month
static MONTH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-(0[1-9]|1[0-2])$").expect("month pattern compiles"));

/// Whether `value` is a `YYYY-MM` month
pub fn is_month(value: &str) -> bool {
    MONTH_PATTERN.is_match(value)
}

/// Month filter of the overtime report: a month, or blank/"all" for all time
pub struct MonthFilterContract;

impl Contract<Option<String>> for MonthFilterContract {
    fn validate(&self, month: &Option<String>) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        if let Some(value) = month.as_deref().map(str::trim) {
            if !value.is_empty() && !value.eq_ignore_ascii_case("all") && !is_month(value) {
                errors.add("month", "must be formatted as YYYY-MM");
            }
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_pattern() {
        assert!(is_month("2024-05"));
        assert!(!is_month("2024-13"));
        assert!(!is_month("2024-5"));
        assert!(!is_month("May 2024"));
    }

    #[test]
    fn test_month_filter() {
        let contract = MonthFilterContract;
        assert!(contract.validate(&None).is_ok());
        assert!(contract.validate(&Some("all".into())).is_ok());
        assert!(contract.validate(&Some("2023-11".into())).is_ok());
        assert!(contract
            .validate(&Some("11/2023".into()))
            .unwrap_err()
            .has_error("month"));
    }
}
