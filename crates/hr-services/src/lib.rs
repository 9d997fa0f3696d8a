//! # hr-services
//!
//! Business logic services for hrdash.
//!
//! Every write goes through a contract, is staged in a `WriteBatch` and
//! committed atomically. Employee writes fan out through [`sync`] and are
//! followed by an aggregate recalculation for the touched department and
//! branch.

pub mod result;
pub mod sync;
pub mod branches;
pub mod departments;
pub mod employees;
pub mod kpi;
pub mod overtime;
pub mod reports;
pub mod users;

pub use result::ServiceResult;
pub use sync::{SyncOutcome, SyncService};

#[cfg(test)]
pub(crate) mod test_support;
