//! KPI scorecard services

use chrono::Utc;
use hr_contracts::kpi::UpdateMetricsContract;
use hr_contracts::{Contract, UserContext};
use hr_core::error::{HrError, HrResult};
use hr_core::traits::Id;
use hr_db::{Store, WriteBatch};
use hr_models::{KpiMetrics, KpiScorecard};

use crate::result::ServiceResult;
use crate::sync::SyncService;

pub struct KpiService<'a, U: UserContext> {
    store: &'a dyn Store,
    user: &'a U,
}

impl<'a, U: UserContext> KpiService<'a, U> {
    pub fn new(store: &'a dyn Store, user: &'a U) -> Self {
        Self { store, user }
    }

    pub async fn scorecard(&self, employee_id: Id) -> HrResult<KpiScorecard> {
        self.store
            .get_scorecard(employee_id)
            .await?
            .ok_or_else(|| HrError::not_found("KpiScorecard", employee_id))
    }

    /// Write new ratings to the scorecard and the master record, then
    /// refresh the employee's department and branch
    pub async fn update_metrics(
        &self,
        employee_id: Id,
        metrics: KpiMetrics,
    ) -> ServiceResult<KpiScorecard> {
        if let Err(errors) = UpdateMetricsContract::new(self.user).validate(&metrics) {
            return ServiceResult::failure(errors);
        }
        ServiceResult::from_result(self.apply(employee_id, metrics).await)
    }

    async fn apply(&self, employee_id: Id, metrics: KpiMetrics) -> HrResult<KpiScorecard> {
        let mut scorecard = self.scorecard(employee_id).await?;
        let now = Utc::now();
        scorecard.set_metrics(metrics, now);

        let mut batch = WriteBatch::new();
        batch.upsert_scorecard(scorecard.clone());
        match self.store.get_employee(employee_id).await? {
            Some(mut employee) => {
                employee.metrics = metrics;
                employee.updated_at = now;
                batch.upsert_employee(employee);
            }
            None => tracing::warn!(employee_id = %employee_id, "scorecard without master record"),
        }
        self.store.commit(batch).await?;

        tracing::info!(employee_id = %employee_id, score = scorecard.score, "KPI metrics updated");
        SyncService::new(self.store)
            .recalc_logged(&scorecard.branch, &scorecard.department)
            .await;
        Ok(scorecard)
    }
}
