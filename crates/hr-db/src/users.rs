//! User profile repository

use chrono::{DateTime, Utc};
use hr_core::traits::Id;
use hr_models::{Role, UserProfile};
use sqlx::{FromRow, PgConnection, PgPool};

use crate::repository::{RepositoryError, RepositoryResult};

/// User profile database row
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Id,
    pub email: String,
    pub display_name: Option<String>,
    pub role: String,
    pub branch_id: Option<String>,
    pub approved: bool,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserProfile {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<Role>()
            .map_err(|e| RepositoryError::Decode(format!("user {}: {}", row.id, e)))?;

        Ok(UserProfile {
            id: row.id,
            email: row.email,
            display_name: row.display_name,
            role,
            branch_id: row.branch_id,
            approved: row.approved,
            password_hash: row.password_hash,
            created_at: row.created_at,
        })
    }
}

const SELECT: &str = r#"
    SELECT id, email, display_name, role, branch_id, approved, password_hash, created_at
    FROM user_profiles
"#;

/// User repository implementation
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<UserProfile>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(UserProfile::try_from).transpose()
    }

    /// Find a user by email (case-insensitive)
    pub async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<UserProfile>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT} WHERE email = LOWER($1)"))
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?;
        row.map(UserProfile::try_from).transpose()
    }

    pub async fn list(&self) -> RepositoryResult<Vec<UserProfile>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!("{SELECT} ORDER BY email ASC"))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(UserProfile::try_from).collect()
    }
}

pub(crate) async fn upsert(conn: &mut PgConnection, u: &UserProfile) -> RepositoryResult<()> {
    sqlx::query(
        r#"
        INSERT INTO user_profiles (id, email, display_name, role, branch_id, approved, password_hash, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (id) DO UPDATE SET
            email = EXCLUDED.email,
            display_name = EXCLUDED.display_name,
            role = EXCLUDED.role,
            branch_id = EXCLUDED.branch_id,
            approved = EXCLUDED.approved,
            password_hash = EXCLUDED.password_hash
        "#,
    )
    .bind(u.id)
    .bind(&u.email)
    .bind(&u.display_name)
    .bind(u.role.as_str())
    .bind(&u.branch_id)
    .bind(u.approved)
    .bind(&u.password_hash)
    .bind(u.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub(crate) async fn delete(conn: &mut PgConnection, id: Id) -> RepositoryResult<()> {
    sqlx::query("DELETE FROM user_profiles WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
