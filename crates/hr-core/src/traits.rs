//! Core traits shared by models, repositories and services

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Primary key type. Every document carries a generated UUID.
pub type Id = Uuid;

/// Trait for entities that have a primary key
pub trait Identifiable {
    fn id(&self) -> Id;
}

/// Trait for entities with timestamps
pub trait Timestamped {
    fn created_at(&self) -> Option<DateTime<Utc>>;
    fn updated_at(&self) -> Option<DateTime<Utc>>;
}

/// Base trait for all domain entities
pub trait Entity: Identifiable + Send + Sync {
    /// The database table name
    const TABLE_NAME: &'static str;

    /// Human-readable type name for error messages
    const TYPE_NAME: &'static str;
}

/// Trims a name field the way every write path expects it
pub fn normalize_name(value: &str) -> String {
    value.trim().to_string()
}
