//! Employee synchronization and aggregate recalculation
//!
//! An employee lives in three collections: the master record, the KPI
//! scorecard and the overtime profile. `sync_employee` rewrites all three
//! from one input in a single batch, then refreshes the department and
//! branch aggregates for the employee's location.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use hr_core::error::HrResult;
use hr_core::traits::Id;
use hr_db::{Store, WriteBatch};
use hr_models::{
    Department, Employee, EmployeeInput, KpiScorecard, OvertimeProfile, DEFAULT_STANDARD_HOURS,
    PROFILE_READY_STATUS, UNASSIGNED,
};

/// The three documents written by a sync
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOutcome {
    pub employee: Employee,
    pub scorecard: KpiScorecard,
    pub profile: OvertimeProfile,
}

pub struct SyncService<'a> {
    store: &'a dyn Store,
}

/// Mean of the values, 0 when there are none
pub(crate) fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

impl<'a> SyncService<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Stage the writes for one employee without committing them
    pub async fn stage_employee(
        &self,
        batch: &mut WriteBatch,
        employee_id: Id,
        input: &EmployeeInput,
        acting_user: Id,
        now: DateTime<Utc>,
    ) -> HrResult<SyncOutcome> {
        let branch = input.normalized_branch();
        let department = input.normalized_department();

        if department == UNASSIGNED
            && self
                .store
                .find_department(&branch, UNASSIGNED)
                .await?
                .is_none()
        {
            tracing::info!(branch = %branch, "creating Unassigned department");
            batch.ensure_department(Department::unassigned(&branch));
        }

        let existing = self.store.get_employee(employee_id).await?;
        let metrics = input
            .metrics
            .or_else(|| existing.as_ref().map(|e| e.metrics))
            .unwrap_or_default();
        let standard_hours = input
            .standard_hours_per_week
            .unwrap_or(DEFAULT_STANDARD_HOURS);

        let employee = Employee {
            id: employee_id,
            name: input.name.trim().to_string(),
            role: input.role.trim().to_string(),
            salary: input.salary,
            branch: branch.clone(),
            department: department.clone(),
            metrics,
            standard_hours_per_week: standard_hours,
            created_by: input
                .created_by
                .or_else(|| existing.as_ref().and_then(|e| e.created_by))
                .or(Some(acting_user)),
            is_active: true,
            created_at: existing.as_ref().map_or(now, |e| e.created_at),
            updated_at: now,
        };

        let profile = OvertimeProfile {
            employee_id,
            employee_name: employee.name.clone(),
            branch: branch.clone(),
            department: department.clone(),
            standard_hours_per_week: standard_hours,
            current_ot_hours: 0.0,
            status: PROFILE_READY_STATUS.to_string(),
            last_updated: now,
        };

        let scorecard = KpiScorecard {
            employee_id,
            employee_name: employee.name.clone(),
            job_role: employee.role.clone(),
            branch,
            department,
            metrics,
            score: metrics.score(),
            assignment_date: now,
            updated_at: now,
        };

        batch
            .upsert_employee(employee.clone())
            .upsert_overtime_profile(profile.clone())
            .upsert_scorecard(scorecard.clone());

        Ok(SyncOutcome {
            employee,
            scorecard,
            profile,
        })
    }

    /// Write the master record, scorecard and overtime profile for one
    /// employee atomically, then recalculate its location.
    pub async fn sync_employee(
        &self,
        employee_id: Id,
        input: &EmployeeInput,
        acting_user: Id,
    ) -> HrResult<SyncOutcome> {
        let mut batch = WriteBatch::new();
        let outcome = self
            .stage_employee(&mut batch, employee_id, input, acting_user, Utc::now())
            .await?;

        self.store.commit(batch).await?;
        tracing::info!(
            employee_id = %employee_id,
            branch = %outcome.employee.branch,
            department = %outcome.employee.department,
            "employee synced"
        );

        self.recalc_logged(&outcome.employee.branch, &outcome.employee.department)
            .await;
        Ok(outcome)
    }

    /// Recalculate after a committed write. A failure here leaves the
    /// aggregates stale until the next write and is only logged.
    pub async fn recalc_logged(&self, branch: &str, department: &str) {
        if let Err(err) = self.recalc_dept_and_branch(branch, department).await {
            tracing::error!(
                branch = %branch,
                department = %department,
                error = %err,
                "aggregate recalculation failed"
            );
        }
    }

    /// Refresh `avg_score`/`employee_count` of (branch, department) and of
    /// the branch. No-op when either name is blank.
    pub async fn recalc_dept_and_branch(&self, branch: &str, department: &str) -> HrResult<()> {
        let branch = branch.trim();
        let department = department.trim();
        if branch.is_empty() || department.is_empty() {
            return Ok(());
        }

        let now = Utc::now();
        let mut batch = WriteBatch::new();

        let updated = self.stage_department(&mut batch, branch, department, now).await?;
        self.stage_branch(&mut batch, branch, updated.as_ref(), now)
            .await?;

        if !batch.is_empty() {
            self.store.commit(batch).await?;
        }
        Ok(())
    }

    /// Refresh only the branch aggregates
    pub async fn recalc_branch(&self, branch: &str) -> HrResult<()> {
        let branch = branch.trim();
        if branch.is_empty() {
            return Ok(());
        }

        let mut batch = WriteBatch::new();
        self.stage_branch(&mut batch, branch, None, Utc::now()).await?;
        if !batch.is_empty() {
            self.store.commit(batch).await?;
        }
        Ok(())
    }

    async fn stage_department(
        &self,
        batch: &mut WriteBatch,
        branch: &str,
        department: &str,
        now: DateTime<Utc>,
    ) -> HrResult<Option<Department>> {
        let scorecards = self
            .store
            .list_scorecards(Some(branch.to_string()), Some(department.to_string()))
            .await?;

        let Some(mut dept) = self.store.find_department(branch, department).await? else {
            tracing::warn!(branch, department, "department missing, skipping its aggregates");
            return Ok(None);
        };

        let employees: HashSet<Id> = scorecards.iter().map(|s| s.employee_id).collect();
        dept.avg_score = mean(scorecards.iter().map(|s| s.score));
        dept.employee_count = employees.len() as u32;
        dept.updated_at = Some(now);

        tracing::debug!(
            branch,
            department,
            avg_score = dept.avg_score,
            employee_count = dept.employee_count,
            "department aggregates"
        );
        batch.upsert_department(dept.clone());
        Ok(Some(dept))
    }

    /// `updated` replaces the stored copy of that department when summing
    async fn stage_branch(
        &self,
        batch: &mut WriteBatch,
        branch: &str,
        updated: Option<&Department>,
        now: DateTime<Utc>,
    ) -> HrResult<()> {
        let Some(mut record) = self.store.find_branch_by_title(branch).await? else {
            tracing::warn!(branch, "branch missing, skipping its aggregates");
            return Ok(());
        };

        let scorecards = self
            .store
            .list_scorecards(Some(branch.to_string()), None)
            .await?;
        let departments = self.store.list_departments(Some(branch.to_string())).await?;

        record.avg_score = mean(scorecards.iter().map(|s| s.score));
        record.employee_count = departments
            .iter()
            .map(|d| match updated {
                Some(u) if u.id == d.id => u.employee_count,
                _ => d.employee_count,
            })
            .sum();
        record.updated_at = Some(now);

        tracing::debug!(
            branch,
            avg_score = record.avg_score,
            employee_count = record.employee_count,
            "branch aggregates"
        );
        batch.upsert_branch(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_branch, seed_department};
    use hr_db::{MemoryStore, MockStore, RepositoryError};
    use hr_models::KpiMetrics;
    use uuid::Uuid;

    fn input(name: &str, branch: &str, department: Option<&str>, metrics: KpiMetrics) -> EmployeeInput {
        EmployeeInput {
            name: name.into(),
            role: "Barista".into(),
            salary: 8_000.0,
            branch: branch.into(),
            department: department.map(Into::into),
            metrics: Some(metrics),
            standard_hours_per_week: None,
            created_by: None,
        }
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(Vec::<f64>::new()), 0.0);
        assert_eq!(mean([50.0, 100.0]), 75.0);
    }

    #[tokio::test]
    async fn test_sync_writes_three_documents() {
        let store = MemoryStore::new();
        seed_branch(&store, "Bole").await;
        seed_department(&store, "Bole", "Bakery").await;

        let id = Uuid::new_v4();
        let actor = Uuid::new_v4();
        let outcome = SyncService::new(&store)
            .sync_employee(id, &input(" Hana ", " Bole ", Some(" Bakery "), KpiMetrics::new(100, 75, 50, 75)), actor)
            .await
            .unwrap();

        assert_eq!(outcome.employee.name, "Hana");
        assert_eq!(outcome.employee.branch, "Bole");
        assert_eq!(outcome.employee.created_by, Some(actor));
        assert_eq!(outcome.scorecard.score, 75.0);
        assert_eq!(outcome.profile.status, PROFILE_READY_STATUS);
        assert_eq!(outcome.profile.standard_hours_per_week, 40.0);

        assert!(store.get_employee(id).await.unwrap().is_some());
        assert!(store.get_scorecard(id).await.unwrap().is_some());
        assert!(store.get_overtime_profile(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_blank_department_creates_unassigned() {
        let store = MemoryStore::new();
        seed_branch(&store, "Adama").await;

        let outcome = SyncService::new(&store)
            .sync_employee(Uuid::new_v4(), &input("Kidus", "Adama", Some("  "), KpiMetrics::default()), Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(outcome.employee.department, UNASSIGNED);

        let dept = store.find_department("Adama", UNASSIGNED).await.unwrap().unwrap();
        assert_eq!(dept.employee_count, 1);
        assert_eq!(dept.avg_score, 50.0);

        // A second unassigned employee reuses the same department
        SyncService::new(&store)
            .sync_employee(Uuid::new_v4(), &input("Meron", "Adama", None, KpiMetrics::default()), Uuid::new_v4())
            .await
            .unwrap();
        let departments = store.list_departments(Some("Adama".into())).await.unwrap();
        assert_eq!(departments.len(), 1);
        assert_eq!(departments[0].employee_count, 2);
    }

    #[tokio::test]
    async fn test_concurrent_unassigned_adds_both_land() {
        let store = MemoryStore::new();
        seed_branch(&store, "Adama").await;
        let sync = SyncService::new(&store);
        let actor = Uuid::new_v4();

        // Both batches are staged before the department exists
        let mut first = WriteBatch::new();
        sync.stage_employee(&mut first, Uuid::new_v4(), &input("Kidus", "Adama", None, KpiMetrics::default()), actor, Utc::now())
            .await
            .unwrap();
        let mut second = WriteBatch::new();
        sync.stage_employee(&mut second, Uuid::new_v4(), &input("Meron", "Adama", None, KpiMetrics::default()), actor, Utc::now())
            .await
            .unwrap();

        store.commit(first).await.unwrap();
        store.commit(second).await.unwrap();
        sync.recalc_dept_and_branch("Adama", UNASSIGNED).await.unwrap();

        assert_eq!(store.list_employees(Some("Adama".into()), None).await.unwrap().len(), 2);
        let departments = store.list_departments(Some("Adama".into())).await.unwrap();
        assert_eq!(departments.len(), 1);
        assert_eq!(departments[0].employee_count, 2);
    }

    #[tokio::test]
    async fn test_recalc_aggregates() {
        let store = MemoryStore::new();
        seed_branch(&store, "Bole").await;
        seed_department(&store, "Bole", "Bakery").await;
        seed_department(&store, "Bole", "Front").await;

        let sync = SyncService::new(&store);
        let actor = Uuid::new_v4();
        sync.sync_employee(Uuid::new_v4(), &input("A", "Bole", Some("Bakery"), KpiMetrics::uniform(100)), actor)
            .await
            .unwrap();
        sync.sync_employee(Uuid::new_v4(), &input("B", "Bole", Some("Bakery"), KpiMetrics::uniform(50)), actor)
            .await
            .unwrap();
        sync.sync_employee(Uuid::new_v4(), &input("C", "Bole", Some("Front"), KpiMetrics::uniform(25)), actor)
            .await
            .unwrap();

        let bakery = store.find_department("Bole", "Bakery").await.unwrap().unwrap();
        assert_eq!(bakery.employee_count, 2);
        assert_eq!(bakery.avg_score, 75.0);
        assert!(bakery.updated_at.is_some());

        let branch = store.find_branch_by_title("Bole").await.unwrap().unwrap();
        assert_eq!(branch.employee_count, 3);
        assert!((branch.avg_score - 175.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_recalc_blank_names_is_noop() {
        let store = MemoryStore::new();
        let sync = SyncService::new(&store);
        sync.recalc_dept_and_branch(" ", "Bakery").await.unwrap();
        sync.recalc_dept_and_branch("Bole", "").await.unwrap();
        assert!(store.list_branches().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_recalc_missing_rows_skipped() {
        let store = MemoryStore::new();
        SyncService::new(&store)
            .recalc_dept_and_branch("Ghost", "Nowhere")
            .await
            .unwrap();
        assert!(store.list_departments(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_commit_writes_nothing() {
        let mut store = MockStore::new();
        store.expect_find_department().returning(|_, _| Ok(None));
        store.expect_get_employee().returning(|_| Ok(None));
        store
            .expect_commit()
            .times(1)
            .returning(|_| Err(RepositoryError::Conflict("simulated".into())));
        store.expect_find_branch_by_title().never();

        let result = SyncService::new(&store)
            .sync_employee(Uuid::new_v4(), &input("D", "Bole", None, KpiMetrics::default()), Uuid::new_v4())
            .await;
        assert_eq!(result.unwrap_err().status_code(), 409);
    }
}
