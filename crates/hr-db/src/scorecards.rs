//! KPI scorecard repository

use chrono::{DateTime, Utc};
use hr_core::traits::Id;
use hr_models::{KpiMetrics, KpiScorecard};
use sqlx::{FromRow, PgConnection, PgPool};

use crate::employees::metric;
use crate::repository::RepositoryResult;

#[derive(Debug, Clone, FromRow)]
pub struct ScorecardRow {
    pub employee_id: Id,
    pub employee_name: String,
    pub job_role: String,
    pub branch: String,
    pub department: String,
    pub punctuality: i16,
    pub efficiency: i16,
    pub speed: i16,
    pub teamwork: i16,
    pub score: f64,
    pub assignment_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ScorecardRow> for KpiScorecard {
    fn from(row: ScorecardRow) -> Self {
        KpiScorecard {
            employee_id: row.employee_id,
            employee_name: row.employee_name,
            job_role: row.job_role,
            branch: row.branch,
            department: row.department,
            metrics: KpiMetrics::new(
                metric(row.punctuality),
                metric(row.efficiency),
                metric(row.speed),
                metric(row.teamwork),
            ),
            score: row.score,
            assignment_date: row.assignment_date,
            updated_at: row.updated_at,
        }
    }
}

const SELECT: &str = r#"
    SELECT employee_id, employee_name, job_role, branch, department,
           punctuality, efficiency, speed, teamwork, score, assignment_date, updated_at
    FROM kpi_scorecards
"#;

pub struct ScorecardRepository {
    pool: PgPool,
}

impl ScorecardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_employee(&self, employee_id: Id) -> RepositoryResult<Option<KpiScorecard>> {
        let row = sqlx::query_as::<_, ScorecardRow>(&format!("{SELECT} WHERE employee_id = $1"))
            .bind(employee_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(KpiScorecard::from))
    }

    pub async fn list(
        &self,
        branch: Option<&str>,
        department: Option<&str>,
    ) -> RepositoryResult<Vec<KpiScorecard>> {
        let rows = sqlx::query_as::<_, ScorecardRow>(&format!(
            "{SELECT} WHERE ($1::TEXT IS NULL OR branch = $1) \
             AND ($2::TEXT IS NULL OR department = $2) \
             ORDER BY employee_name ASC"
        ))
        .bind(branch)
        .bind(department)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(KpiScorecard::from).collect())
    }
}

pub(crate) async fn upsert(conn: &mut PgConnection, s: &KpiScorecard) -> RepositoryResult<()> {
    sqlx::query(
        r#"
        INSERT INTO kpi_scorecards (
            employee_id, employee_name, job_role, branch, department,
            punctuality, efficiency, speed, teamwork, score, assignment_date, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        ON CONFLICT (employee_id) DO UPDATE SET
            employee_name = EXCLUDED.employee_name,
            job_role = EXCLUDED.job_role,
            branch = EXCLUDED.branch,
            department = EXCLUDED.department,
            punctuality = EXCLUDED.punctuality,
            efficiency = EXCLUDED.efficiency,
            speed = EXCLUDED.speed,
            teamwork = EXCLUDED.teamwork,
            score = EXCLUDED.score,
            assignment_date = EXCLUDED.assignment_date,
            updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(s.employee_id)
    .bind(&s.employee_name)
    .bind(&s.job_role)
    .bind(&s.branch)
    .bind(&s.department)
    .bind(i16::from(s.metrics.punctuality))
    .bind(i16::from(s.metrics.efficiency))
    .bind(i16::from(s.metrics.speed))
    .bind(i16::from(s.metrics.teamwork))
    .bind(s.score)
    .bind(s.assignment_date)
    .bind(s.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub(crate) async fn delete(conn: &mut PgConnection, employee_id: Id) -> RepositoryResult<()> {
    sqlx::query("DELETE FROM kpi_scorecards WHERE employee_id = $1")
        .bind(employee_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
