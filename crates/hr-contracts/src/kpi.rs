//! KPI metric contracts

use hr_core::error::ValidationErrors;
use hr_models::KpiMetrics;
use validator::Validate;

use crate::base::{authorize, from_validator, Contract, UserContext, ValidationResult};

pub struct UpdateMetricsContract<'a, U: UserContext> {
    user: &'a U,
}

impl<'a, U: UserContext> UpdateMetricsContract<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }
}

impl<'a, U: UserContext> Contract<KpiMetrics> for UpdateMetricsContract<'a, U> {
    fn validate(&self, metrics: &KpiMetrics) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        authorize(self.user.is_admin(), "update KPI metrics", &mut errors);
        if let Err(source) = metrics.validate() {
            errors.merge(from_validator(&source));
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::test_support::MockUser;
    use hr_models::Role;

    #[test]
    fn test_rating_scale_accepted() {
        let user = MockUser::with_role(Role::Admin);
        let contract = UpdateMetricsContract::new(&user);
        assert!(contract.validate(&KpiMetrics::new(25, 50, 75, 100)).is_ok());
        assert!(contract.validate(&KpiMetrics::uniform(0)).is_ok());
    }

    #[test]
    fn test_over_hundred_rejected() {
        let user = MockUser::with_role(Role::Admin);
        let errors = UpdateMetricsContract::new(&user)
            .validate(&KpiMetrics::new(50, 50, 50, 200))
            .unwrap_err();
        assert!(errors.has_error("teamwork"));
    }
}
