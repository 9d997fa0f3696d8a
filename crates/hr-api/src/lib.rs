//! # hr-api
//!
//! JSON API for hrdash, mounted under `/api/v1`.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;

pub use extractors::AppState;
pub use routes::router;
