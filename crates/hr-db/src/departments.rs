//! Department repository

use chrono::{DateTime, Utc};
use hr_core::traits::Id;
use hr_models::Department;
use sqlx::{FromRow, PgConnection, PgPool};

use crate::repository::RepositoryResult;

/// Department database row
#[derive(Debug, Clone, FromRow)]
pub struct DepartmentRow {
    pub id: Id,
    pub branch: String,
    pub title: String,
    pub avg_score: f64,
    pub employee_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<DepartmentRow> for Department {
    fn from(row: DepartmentRow) -> Self {
        Department {
            id: row.id,
            branch: row.branch,
            title: row.title,
            avg_score: row.avg_score,
            employee_count: row.employee_count.max(0) as u32,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SELECT: &str =
    "SELECT id, branch, title, avg_score, employee_count, created_at, updated_at FROM departments";

/// Department repository implementation
pub struct DepartmentRepository {
    pool: PgPool,
}

impl DepartmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Department>> {
        let row = sqlx::query_as::<_, DepartmentRow>(&format!("{SELECT} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Department::from))
    }

    /// Find the department with this title inside a branch
    pub async fn find_in_branch(
        &self,
        branch: &str,
        title: &str,
    ) -> RepositoryResult<Option<Department>> {
        let row = sqlx::query_as::<_, DepartmentRow>(&format!(
            "{SELECT} WHERE branch = $1 AND title = $2"
        ))
        .bind(branch)
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Department::from))
    }

    pub async fn list(&self, branch: Option<&str>) -> RepositoryResult<Vec<Department>> {
        let rows = sqlx::query_as::<_, DepartmentRow>(&format!(
            "{SELECT} WHERE ($1::TEXT IS NULL OR branch = $1) ORDER BY branch ASC, title ASC"
        ))
        .bind(branch)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Department::from).collect())
    }
}

pub(crate) async fn upsert(conn: &mut PgConnection, dept: &Department) -> RepositoryResult<()> {
    sqlx::query(
        r#"
        INSERT INTO departments (id, branch, title, avg_score, employee_count, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (id) DO UPDATE SET
            branch = EXCLUDED.branch,
            title = EXCLUDED.title,
            avg_score = EXCLUDED.avg_score,
            employee_count = EXCLUDED.employee_count,
            updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(dept.id)
    .bind(&dept.branch)
    .bind(&dept.title)
    .bind(dept.avg_score)
    .bind(i32::try_from(dept.employee_count).unwrap_or(i32::MAX))
    .bind(dept.created_at)
    .bind(dept.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub(crate) async fn insert_if_absent(
    conn: &mut PgConnection,
    dept: &Department,
) -> RepositoryResult<()> {
    sqlx::query(
        r#"
        INSERT INTO departments (id, branch, title, avg_score, employee_count, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (branch, title) DO NOTHING
        "#,
    )
    .bind(dept.id)
    .bind(&dept.branch)
    .bind(&dept.title)
    .bind(dept.avg_score)
    .bind(i32::try_from(dept.employee_count).unwrap_or(i32::MAX))
    .bind(dept.created_at)
    .bind(dept.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub(crate) async fn delete(conn: &mut PgConnection, id: Id) -> RepositoryResult<()> {
    sqlx::query("DELETE FROM departments WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
