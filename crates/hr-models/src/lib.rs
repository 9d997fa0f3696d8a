//! # hr-models
//!
//! Domain models for hrdash.
//!
//! One module per collection. The employee master record is the single
//! source of truth; scorecards and overtime profiles are denormalized
//! copies keyed by the same employee id.

pub use hr_core::traits::{Entity, Id, Identifiable, Timestamped};

pub mod role;
pub mod kpi;
pub mod branch;
pub mod department;
pub mod employee;
pub mod overtime;
pub mod user;

pub use role::{Role, UnknownRole};
pub use kpi::{Banded, KpiMetrics, KpiScorecard, MetricRating, MetricsUpdate, Rating, ScoreBand, Scored};
pub use branch::Branch;
pub use department::{Department, UNASSIGNED};
pub use employee::{Employee, EmployeeInput, NewEmployee, UpdateEmployee, DEFAULT_STANDARD_HOURS};
pub use overtime::{
    overtime_amount, DisplayStatus, NewOvertimeRecord, OvertimeProfile, OvertimeRecord,
    OvertimeStatus, OvertimeType, PROFILE_READY_STATUS, STANDARD_MONTHLY_HOURS,
};
pub use user::{NewUser, UserProfile};
