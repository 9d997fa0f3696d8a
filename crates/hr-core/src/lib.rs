//! # hr-core
//!
//! Core types, traits, and utilities for hrdash.
//!
//! This crate provides the building blocks shared by every other crate:
//! - Common error types
//! - Core traits (Entity, Timestamped)
//! - Pagination types
//! - Configuration loading
//! - Display helpers (currency, dates, status tones)

pub mod error;
pub mod traits;
pub mod pagination;
pub mod config;
pub mod format;

pub use error::*;
pub use traits::*;
pub use pagination::*;
