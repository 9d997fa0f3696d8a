//! Postgres-backed `Store`

use async_trait::async_trait;
use hr_core::traits::Id;
use hr_models::{
    Branch, Department, Employee, KpiScorecard, OvertimeProfile, OvertimeRecord, UserProfile,
};
use sqlx::{PgConnection, PgPool};

use crate::batch::{WriteBatch, WriteOp};
use crate::branches::{self, BranchRepository};
use crate::departments::{self, DepartmentRepository};
use crate::employees::{self, EmployeeRepository};
use crate::overtime::{self, OvertimeRepository};
use crate::repository::{OvertimeFilter, RepositoryError, RepositoryResult, Store};
use crate::scorecards::{self, ScorecardRepository};
use crate::users::{self, UserRepository};

/// Store implementation over a Postgres pool
pub struct PgStore {
    pool: PgPool,
    branches: BranchRepository,
    departments: DepartmentRepository,
    employees: EmployeeRepository,
    scorecards: ScorecardRepository,
    overtime: OvertimeRepository,
    users: UserRepository,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            branches: BranchRepository::new(pool.clone()),
            departments: DepartmentRepository::new(pool.clone()),
            employees: EmployeeRepository::new(pool.clone()),
            scorecards: ScorecardRepository::new(pool.clone()),
            overtime: OvertimeRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

async fn apply(conn: &mut PgConnection, op: &WriteOp) -> RepositoryResult<()> {
    match op {
        WriteOp::UpsertBranch(b) => branches::upsert(conn, b).await,
        WriteOp::DeleteBranch(id) => branches::delete(conn, *id).await,
        WriteOp::UpsertDepartment(d) => departments::upsert(conn, d).await,
        WriteOp::EnsureDepartment(d) => departments::insert_if_absent(conn, d).await,
        WriteOp::DeleteDepartment(id) => departments::delete(conn, *id).await,
        WriteOp::UpsertEmployee(e) => employees::upsert(conn, e).await,
        WriteOp::DeleteEmployee(id) => employees::delete(conn, *id).await,
        WriteOp::UpsertScorecard(s) => scorecards::upsert(conn, s).await,
        WriteOp::DeleteScorecard(id) => scorecards::delete(conn, *id).await,
        WriteOp::UpsertOvertimeProfile(p) => overtime::upsert_profile(conn, p).await,
        WriteOp::DeleteOvertimeProfile(id) => overtime::delete_profile(conn, *id).await,
        WriteOp::UpsertOvertimeRecord(r) => overtime::upsert_record(conn, r).await,
        WriteOp::DeleteOvertimeRecord(id) => overtime::delete_record(conn, *id).await,
        WriteOp::UpsertUser(u) => users::upsert(conn, u).await,
        WriteOp::DeleteUser(id) => users::delete(conn, *id).await,
    }
}

/// Unique violations surface as conflicts, everything else as-is
fn classify(op: &WriteOp, err: RepositoryError) -> RepositoryError {
    match err {
        RepositoryError::Database(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            RepositoryError::Conflict(format!("{} violates a unique constraint", op.kind()))
        }
        other => other,
    }
}

#[async_trait]
impl Store for PgStore {
    async fn get_branch(&self, id: Id) -> RepositoryResult<Option<Branch>> {
        self.branches.find_by_id(id).await
    }

    async fn find_branch_by_title(&self, title: &str) -> RepositoryResult<Option<Branch>> {
        self.branches.find_by_title(title).await
    }

    async fn list_branches(&self) -> RepositoryResult<Vec<Branch>> {
        self.branches.list().await
    }

    async fn get_department(&self, id: Id) -> RepositoryResult<Option<Department>> {
        self.departments.find_by_id(id).await
    }

    async fn find_department(
        &self,
        branch: &str,
        title: &str,
    ) -> RepositoryResult<Option<Department>> {
        self.departments.find_in_branch(branch, title).await
    }

    async fn list_departments(&self, branch: Option<String>) -> RepositoryResult<Vec<Department>> {
        self.departments.list(branch.as_deref()).await
    }

    async fn get_employee(&self, id: Id) -> RepositoryResult<Option<Employee>> {
        self.employees.find_by_id(id).await
    }

    async fn list_employees(
        &self,
        branch: Option<String>,
        department: Option<String>,
    ) -> RepositoryResult<Vec<Employee>> {
        self.employees
            .list(branch.as_deref(), department.as_deref())
            .await
    }

    async fn get_scorecard(&self, employee_id: Id) -> RepositoryResult<Option<KpiScorecard>> {
        self.scorecards.find_by_employee(employee_id).await
    }

    async fn list_scorecards(
        &self,
        branch: Option<String>,
        department: Option<String>,
    ) -> RepositoryResult<Vec<KpiScorecard>> {
        self.scorecards
            .list(branch.as_deref(), department.as_deref())
            .await
    }

    async fn get_overtime_profile(
        &self,
        employee_id: Id,
    ) -> RepositoryResult<Option<OvertimeProfile>> {
        self.overtime.find_profile(employee_id).await
    }

    async fn list_overtime_profiles(
        &self,
        branch: Option<String>,
    ) -> RepositoryResult<Vec<OvertimeProfile>> {
        self.overtime.list_profiles(branch.as_deref()).await
    }

    async fn get_overtime_record(&self, id: Id) -> RepositoryResult<Option<OvertimeRecord>> {
        self.overtime.find_record(id).await
    }

    async fn list_overtime_records(
        &self,
        filter: OvertimeFilter,
    ) -> RepositoryResult<Vec<OvertimeRecord>> {
        self.overtime.list_records(&filter).await
    }

    async fn get_user(&self, id: Id) -> RepositoryResult<Option<UserProfile>> {
        self.users.find_by_id(id).await
    }

    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<UserProfile>> {
        self.users.find_by_email(email).await
    }

    async fn list_users(&self) -> RepositoryResult<Vec<UserProfile>> {
        self.users.list().await
    }

    async fn commit(&self, batch: WriteBatch) -> RepositoryResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let count = batch.len();
        let mut tx = self.pool.begin().await?;
        for op in batch.ops() {
            if let Err(err) = apply(&mut tx, op).await {
                tracing::warn!(op = op.kind(), error = %err, "batch write failed, rolling back");
                tx.rollback().await?;
                return Err(classify(op, err));
            }
        }
        tx.commit().await?;

        tracing::debug!(writes = count, "batch committed");
        Ok(())
    }

    async fn ping(&self) -> RepositoryResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
