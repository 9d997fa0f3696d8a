//! # hr-contracts
//!
//! Contract validation for hrdash.
//!
//! Contracts check the acting user's role and the field rules of an
//! entity before a service writes anything. They collect every problem
//! into one `ValidationErrors` instead of stopping at the first.

pub mod base;
pub mod branches;
pub mod departments;
pub mod employees;
pub mod kpi;
pub mod overtime;
pub mod reports;
pub mod users;

pub use base::*;
