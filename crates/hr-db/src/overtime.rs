//! Overtime profile and record repositories

use chrono::{DateTime, NaiveDate, Utc};
use hr_core::traits::Id;
use hr_models::{OvertimeProfile, OvertimeRecord, OvertimeStatus, OvertimeType};
use sqlx::{FromRow, PgConnection, PgPool};

use crate::repository::{OvertimeFilter, RepositoryResult};

#[derive(Debug, Clone, FromRow)]
pub struct OvertimeProfileRow {
    pub employee_id: Id,
    pub employee_name: String,
    pub branch: String,
    pub department: String,
    pub standard_hours_per_week: f64,
    pub current_ot_hours: f64,
    pub status: String,
    pub last_updated: DateTime<Utc>,
}

impl From<OvertimeProfileRow> for OvertimeProfile {
    fn from(row: OvertimeProfileRow) -> Self {
        OvertimeProfile {
            employee_id: row.employee_id,
            employee_name: row.employee_name,
            branch: row.branch,
            department: row.department,
            standard_hours_per_week: row.standard_hours_per_week,
            current_ot_hours: row.current_ot_hours,
            status: row.status,
            last_updated: row.last_updated,
        }
    }
}

/// Overtime record row; type and status are stored as their display names
#[derive(Debug, Clone, FromRow)]
pub struct OvertimeRecordRow {
    pub id: Id,
    pub employee_id: Id,
    pub employee_name: String,
    pub branch: String,
    pub date: NaiveDate,
    pub hours: f64,
    pub ot_type: String,
    pub description: String,
    pub amount: f64,
    pub status: Option<String>,
    pub submitted_by: Id,
    pub manager_comment: Option<String>,
    pub approved_by: Option<Id>,
    pub approval_timestamp: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<OvertimeRecordRow> for OvertimeRecord {
    fn from(row: OvertimeRecordRow) -> Self {
        let ot_type = OvertimeType::parse_lenient(&row.ot_type).unwrap_or_else(|| {
            tracing::warn!(record_id = %row.id, ot_type = %row.ot_type, "unknown overtime type, using Working Day");
            OvertimeType::WorkingDay
        });
        // Unknown statuses surface as missing so reports flag them
        let status = row
            .status
            .as_deref()
            .and_then(|s| s.parse::<OvertimeStatus>().ok());

        OvertimeRecord {
            id: row.id,
            employee_id: row.employee_id,
            employee_name: row.employee_name,
            branch: row.branch,
            date: row.date,
            hours: row.hours,
            ot_type,
            description: row.description,
            amount: row.amount,
            status,
            submitted_by: row.submitted_by,
            manager_comment: row.manager_comment,
            approved_by: row.approved_by,
            approval_timestamp: row.approval_timestamp,
            created_at: row.created_at,
        }
    }
}

const SELECT_PROFILE: &str = r#"
    SELECT employee_id, employee_name, branch, department,
           standard_hours_per_week, current_ot_hours, status, last_updated
    FROM overtime_profiles
"#;

const SELECT_RECORD: &str = r#"
    SELECT id, employee_id, employee_name, branch, date, hours, ot_type, description,
           amount, status, submitted_by, manager_comment, approved_by,
           approval_timestamp, created_at
    FROM overtime_records
"#;

pub struct OvertimeRepository {
    pool: PgPool,
}

impl OvertimeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_profile(&self, employee_id: Id) -> RepositoryResult<Option<OvertimeProfile>> {
        let row = sqlx::query_as::<_, OvertimeProfileRow>(&format!(
            "{SELECT_PROFILE} WHERE employee_id = $1"
        ))
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(OvertimeProfile::from))
    }

    pub async fn list_profiles(&self, branch: Option<&str>) -> RepositoryResult<Vec<OvertimeProfile>> {
        let rows = sqlx::query_as::<_, OvertimeProfileRow>(&format!(
            "{SELECT_PROFILE} WHERE ($1::TEXT IS NULL OR branch = $1) ORDER BY employee_name ASC"
        ))
        .bind(branch)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(OvertimeProfile::from).collect())
    }

    pub async fn find_record(&self, id: Id) -> RepositoryResult<Option<OvertimeRecord>> {
        let row = sqlx::query_as::<_, OvertimeRecordRow>(&format!("{SELECT_RECORD} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(OvertimeRecord::from))
    }

    pub async fn list_records(&self, filter: &OvertimeFilter) -> RepositoryResult<Vec<OvertimeRecord>> {
        let rows = sqlx::query_as::<_, OvertimeRecordRow>(&format!(
            "{SELECT_RECORD} WHERE ($1::UUID IS NULL OR employee_id = $1) \
             AND ($2::TEXT IS NULL OR branch = $2) \
             AND ($3::TEXT IS NULL OR status = $3) \
             AND ($4::UUID IS NULL OR submitted_by = $4) \
             ORDER BY date DESC, created_at DESC"
        ))
        .bind(filter.employee_id)
        .bind(filter.branch.as_deref())
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.submitted_by)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(OvertimeRecord::from).collect())
    }
}

pub(crate) async fn upsert_profile(
    conn: &mut PgConnection,
    p: &OvertimeProfile,
) -> RepositoryResult<()> {
    sqlx::query(
        r#"
        INSERT INTO overtime_profiles (
            employee_id, employee_name, branch, department,
            standard_hours_per_week, current_ot_hours, status, last_updated
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (employee_id) DO UPDATE SET
            employee_name = EXCLUDED.employee_name,
            branch = EXCLUDED.branch,
            department = EXCLUDED.department,
            standard_hours_per_week = EXCLUDED.standard_hours_per_week,
            current_ot_hours = EXCLUDED.current_ot_hours,
            status = EXCLUDED.status,
            last_updated = EXCLUDED.last_updated
        "#,
    )
    .bind(p.employee_id)
    .bind(&p.employee_name)
    .bind(&p.branch)
    .bind(&p.department)
    .bind(p.standard_hours_per_week)
    .bind(p.current_ot_hours)
    .bind(&p.status)
    .bind(p.last_updated)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub(crate) async fn delete_profile(conn: &mut PgConnection, employee_id: Id) -> RepositoryResult<()> {
    sqlx::query("DELETE FROM overtime_profiles WHERE employee_id = $1")
        .bind(employee_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub(crate) async fn upsert_record(
    conn: &mut PgConnection,
    r: &OvertimeRecord,
) -> RepositoryResult<()> {
    sqlx::query(
        r#"
        INSERT INTO overtime_records (
            id, employee_id, employee_name, branch, date, hours, ot_type, description,
            amount, status, submitted_by, manager_comment, approved_by,
            approval_timestamp, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        ON CONFLICT (id) DO UPDATE SET
            employee_name = EXCLUDED.employee_name,
            branch = EXCLUDED.branch,
            date = EXCLUDED.date,
            hours = EXCLUDED.hours,
            ot_type = EXCLUDED.ot_type,
            description = EXCLUDED.description,
            amount = EXCLUDED.amount,
            status = EXCLUDED.status,
            manager_comment = EXCLUDED.manager_comment,
            approved_by = EXCLUDED.approved_by,
            approval_timestamp = EXCLUDED.approval_timestamp
        "#,
    )
    .bind(r.id)
    .bind(r.employee_id)
    .bind(&r.employee_name)
    .bind(&r.branch)
    .bind(r.date)
    .bind(r.hours)
    .bind(r.ot_type.as_str())
    .bind(&r.description)
    .bind(r.amount)
    .bind(r.status.map(|s| s.as_str()))
    .bind(r.submitted_by)
    .bind(&r.manager_comment)
    .bind(r.approved_by)
    .bind(r.approval_timestamp)
    .bind(r.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub(crate) async fn delete_record(conn: &mut PgConnection, id: Id) -> RepositoryResult<()> {
    sqlx::query("DELETE FROM overtime_records WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn row(ot_type: &str, status: Option<&str>) -> OvertimeRecordRow {
        OvertimeRecordRow {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            employee_name: "Hana".into(),
            branch: "Bole".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            hours: 3.0,
            ot_type: ot_type.into(),
            description: "Audit".into(),
            amount: 0.0,
            status: status.map(String::from),
            submitted_by: Uuid::new_v4(),
            manager_comment: None,
            approved_by: None,
            approval_timestamp: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_record_row_decodes_names() {
        let record = OvertimeRecord::from(row("Rest Day", Some("Approved")));
        assert_eq!(record.ot_type, OvertimeType::RestDay);
        assert_eq!(record.status, Some(OvertimeStatus::Approved));
    }

    #[test]
    fn test_lowercase_type_from_legacy_rows() {
        let record = OvertimeRecord::from(row("holiday", Some("Pending")));
        assert_eq!(record.ot_type, OvertimeType::Holiday);
        assert!(record.is_pending());
    }

    #[test]
    fn test_unknown_values_degrade() {
        let record = OvertimeRecord::from(row("Weekend", Some("Escalated")));
        assert_eq!(record.ot_type, OvertimeType::WorkingDay);
        assert_eq!(record.status, None);
    }
}
