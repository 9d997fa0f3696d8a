//! Branch repository

use chrono::{DateTime, Utc};
use hr_core::traits::Id;
use hr_models::Branch;
use sqlx::{FromRow, PgConnection, PgPool};

use crate::repository::RepositoryResult;

/// Branch database row
#[derive(Debug, Clone, FromRow)]
pub struct BranchRow {
    pub id: Id,
    pub title: String,
    pub avg_score: f64,
    pub employee_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<BranchRow> for Branch {
    fn from(row: BranchRow) -> Self {
        Branch {
            id: row.id,
            title: row.title,
            avg_score: row.avg_score,
            employee_count: row.employee_count.max(0) as u32,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SELECT: &str = "SELECT id, title, avg_score, employee_count, created_at, updated_at FROM branches";

/// Branch repository implementation
pub struct BranchRepository {
    pool: PgPool,
}

impl BranchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Branch>> {
        let row = sqlx::query_as::<_, BranchRow>(&format!("{SELECT} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Branch::from))
    }

    pub async fn find_by_title(&self, title: &str) -> RepositoryResult<Option<Branch>> {
        let row = sqlx::query_as::<_, BranchRow>(&format!("{SELECT} WHERE title = $1"))
            .bind(title)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Branch::from))
    }

    pub async fn list(&self) -> RepositoryResult<Vec<Branch>> {
        let rows = sqlx::query_as::<_, BranchRow>(&format!("{SELECT} ORDER BY title ASC"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Branch::from).collect())
    }
}

pub(crate) async fn upsert(conn: &mut PgConnection, branch: &Branch) -> RepositoryResult<()> {
    sqlx::query(
        r#"
        INSERT INTO branches (id, title, avg_score, employee_count, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (id) DO UPDATE SET
            title = EXCLUDED.title,
            avg_score = EXCLUDED.avg_score,
            employee_count = EXCLUDED.employee_count,
            updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(branch.id)
    .bind(&branch.title)
    .bind(branch.avg_score)
    .bind(i32::try_from(branch.employee_count).unwrap_or(i32::MAX))
    .bind(branch.created_at)
    .bind(branch.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub(crate) async fn delete(conn: &mut PgConnection, id: Id) -> RepositoryResult<()> {
    sqlx::query("DELETE FROM branches WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_row_conversion_clamps_negative_counts() {
        let row = BranchRow {
            id: Uuid::new_v4(),
            title: "Bole".into(),
            avg_score: 62.5,
            employee_count: -3,
            created_at: Utc::now(),
            updated_at: None,
        };
        let branch = Branch::from(row);
        assert_eq!(branch.employee_count, 0);
        assert_eq!(branch.avg_score, 62.5);
    }
}
