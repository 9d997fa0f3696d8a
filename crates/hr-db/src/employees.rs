//! Employee repository

use chrono::{DateTime, Utc};
use hr_core::traits::Id;
use hr_models::{Employee, KpiMetrics};
use sqlx::{FromRow, PgConnection, PgPool};

use crate::repository::RepositoryResult;

/// Employee database row; metrics are stored as four columns
#[derive(Debug, Clone, FromRow)]
pub struct EmployeeRow {
    pub id: Id,
    pub name: String,
    pub role: String,
    pub salary: f64,
    pub branch: String,
    pub department: String,
    pub punctuality: i16,
    pub efficiency: i16,
    pub speed: i16,
    pub teamwork: i16,
    pub standard_hours_per_week: f64,
    pub created_by: Option<Id>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Clamp a stored metric column into the 0..=100 range
pub(crate) fn metric(value: i16) -> u8 {
    value.clamp(0, 100) as u8
}

impl From<EmployeeRow> for Employee {
    fn from(row: EmployeeRow) -> Self {
        Employee {
            id: row.id,
            name: row.name,
            role: row.role,
            salary: row.salary,
            branch: row.branch,
            department: row.department,
            metrics: KpiMetrics::new(
                metric(row.punctuality),
                metric(row.efficiency),
                metric(row.speed),
                metric(row.teamwork),
            ),
            standard_hours_per_week: row.standard_hours_per_week,
            created_by: row.created_by,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SELECT: &str = r#"
    SELECT id, name, role, salary, branch, department,
           punctuality, efficiency, speed, teamwork,
           standard_hours_per_week, created_by, is_active, created_at, updated_at
    FROM employees
"#;

/// Employee repository implementation
pub struct EmployeeRepository {
    pool: PgPool,
}

impl EmployeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Employee>> {
        let row = sqlx::query_as::<_, EmployeeRow>(&format!("{SELECT} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Employee::from))
    }

    /// Employees, optionally narrowed to a branch and department
    pub async fn list(
        &self,
        branch: Option<&str>,
        department: Option<&str>,
    ) -> RepositoryResult<Vec<Employee>> {
        let rows = sqlx::query_as::<_, EmployeeRow>(&format!(
            "{SELECT} WHERE ($1::TEXT IS NULL OR branch = $1) \
             AND ($2::TEXT IS NULL OR department = $2) \
             ORDER BY name ASC, id ASC"
        ))
        .bind(branch)
        .bind(department)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Employee::from).collect())
    }
}

pub(crate) async fn upsert(conn: &mut PgConnection, e: &Employee) -> RepositoryResult<()> {
    sqlx::query(
        r#"
        INSERT INTO employees (
            id, name, role, salary, branch, department,
            punctuality, efficiency, speed, teamwork,
            standard_hours_per_week, created_by, is_active, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        ON CONFLICT (id) DO UPDATE SET
            name = EXCLUDED.name,
            role = EXCLUDED.role,
            salary = EXCLUDED.salary,
            branch = EXCLUDED.branch,
            department = EXCLUDED.department,
            punctuality = EXCLUDED.punctuality,
            efficiency = EXCLUDED.efficiency,
            speed = EXCLUDED.speed,
            teamwork = EXCLUDED.teamwork,
            standard_hours_per_week = EXCLUDED.standard_hours_per_week,
            created_by = EXCLUDED.created_by,
            is_active = EXCLUDED.is_active,
            updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(e.id)
    .bind(&e.name)
    .bind(&e.role)
    .bind(e.salary)
    .bind(&e.branch)
    .bind(&e.department)
    .bind(i16::from(e.metrics.punctuality))
    .bind(i16::from(e.metrics.efficiency))
    .bind(i16::from(e.metrics.speed))
    .bind(i16::from(e.metrics.teamwork))
    .bind(e.standard_hours_per_week)
    .bind(e.created_by)
    .bind(e.is_active)
    .bind(e.created_at)
    .bind(e.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub(crate) async fn delete(conn: &mut PgConnection, id: Id) -> RepositoryResult<()> {
    sqlx::query("DELETE FROM employees WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_clamps() {
        assert_eq!(metric(-5), 0);
        assert_eq!(metric(75), 75);
        assert_eq!(metric(250), 100);
    }
}
