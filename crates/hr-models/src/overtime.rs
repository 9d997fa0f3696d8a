//! Overtime profiles and records
//!
//! Tables: overtime_profiles, overtime_records

use chrono::{DateTime, NaiveDate, Utc};
use hr_core::format::capitalize_words;
use hr_core::traits::{Entity, Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Standard monthly working hours used to derive an hourly rate
pub const STANDARD_MONTHLY_HOURS: f64 = 173.33;

/// Status text written on every synced overtime profile
pub const PROFILE_READY_STATUS: &str = "OT Tracking Ready";

/// Kind of day the overtime was worked on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OvertimeType {
    Holiday,
    #[serde(rename = "Rest Day")]
    RestDay,
    #[default]
    #[serde(rename = "Working Day")]
    WorkingDay,
    Night,
}

impl OvertimeType {
    pub const ALL: [OvertimeType; 4] = [
        OvertimeType::Holiday,
        OvertimeType::RestDay,
        OvertimeType::WorkingDay,
        OvertimeType::Night,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OvertimeType::Holiday => "Holiday",
            OvertimeType::RestDay => "Rest Day",
            OvertimeType::WorkingDay => "Working Day",
            OvertimeType::Night => "Night",
        }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            OvertimeType::Holiday => 2.5,
            OvertimeType::RestDay => 2.0,
            OvertimeType::WorkingDay => 1.5,
            OvertimeType::Night => 1.75,
        }
    }

    /// Parse a stored type name ignoring case, so `rest day` is `Rest Day`
    pub fn parse_lenient(name: &str) -> Option<Self> {
        name.parse()
            .or_else(|_| capitalize_words(name).parse())
            .ok()
    }
}

impl fmt::Display for OvertimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OvertimeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OvertimeType::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| format!("unknown overtime type: {s}"))
    }
}

/// Overtime payout: `hours * (salary / 173.33) * multiplier`.
/// Zero when either salary or hours is not positive.
pub fn overtime_amount(hours: f64, ot_type: OvertimeType, salary: f64) -> f64 {
    let hours = if hours.is_finite() { hours } else { 0.0 };
    let salary = if salary.is_finite() { salary } else { 0.0 };
    if salary <= 0.0 || hours <= 0.0 {
        return 0.0;
    }

    let hourly_rate = salary / STANDARD_MONTHLY_HOURS;
    hours * hourly_rate * ot_type.multiplier()
}

/// Approval state of an overtime record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OvertimeStatus {
    Pending,
    Approved,
    Disapproved,
}

impl OvertimeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OvertimeStatus::Pending => "Pending",
            OvertimeStatus::Approved => "Approved",
            OvertimeStatus::Disapproved => "Disapproved",
        }
    }

    /// Statuses an approver may set
    pub fn is_decision(&self) -> bool {
        matches!(self, OvertimeStatus::Approved | OvertimeStatus::Disapproved)
    }
}

impl fmt::Display for OvertimeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OvertimeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Pending" => Ok(OvertimeStatus::Pending),
            "Approved" => Ok(OvertimeStatus::Approved),
            "Disapproved" => Ok(OvertimeStatus::Disapproved),
            other => Err(format!("unknown overtime status: {other}")),
        }
    }
}

/// Status as shown on report rows, including the repair fallbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayStatus {
    Recorded(OvertimeStatus),
    /// Status missing but an amount is present
    DataInconsistent,
    /// Status and amount both missing
    NoStatus,
    /// Placeholder row for an employee without records
    NoOtFiled,
}

impl DisplayStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DisplayStatus::Recorded(status) => status.as_str(),
            DisplayStatus::DataInconsistent => "Data Inconsistent",
            DisplayStatus::NoStatus => "No Status",
            DisplayStatus::NoOtFiled => "No OT Filed",
        }
    }
}

impl Serialize for DisplayStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-employee overtime tracking stub, keyed by employee id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OvertimeProfile {
    pub employee_id: Id,
    pub employee_name: String,
    pub branch: String,
    pub department: String,
    pub standard_hours_per_week: f64,
    pub current_ot_hours: f64,
    pub status: String,
    pub last_updated: DateTime<Utc>,
}

impl Identifiable for OvertimeProfile {
    fn id(&self) -> Id {
        self.employee_id
    }
}

impl Entity for OvertimeProfile {
    const TABLE_NAME: &'static str = "overtime_profiles";
    const TYPE_NAME: &'static str = "OvertimeProfile";
}

/// A filed overtime claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OvertimeRecord {
    pub id: Id,
    pub employee_id: Id,
    pub employee_name: String,
    pub branch: String,
    pub date: NaiveDate,
    pub hours: f64,
    pub ot_type: OvertimeType,
    pub description: String,
    /// Payout computed at submission; may be 0 on legacy rows
    pub amount: f64,
    /// Missing on legacy rows
    pub status: Option<OvertimeStatus>,
    pub submitted_by: Id,
    pub manager_comment: Option<String>,
    pub approved_by: Option<Id>,
    pub approval_timestamp: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl OvertimeRecord {
    /// `YYYY-MM` of the record date
    pub fn month(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }

    pub fn is_pending(&self) -> bool {
        self.status == Some(OvertimeStatus::Pending)
    }
}

impl Identifiable for OvertimeRecord {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for OvertimeRecord {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.approval_timestamp
    }
}

impl Entity for OvertimeRecord {
    const TABLE_NAME: &'static str = "overtime_records";
    const TYPE_NAME: &'static str = "OvertimeRecord";
}

/// Overtime submission request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewOvertimeRecord {
    pub employee_id: Id,
    pub date: Option<NaiveDate>,
    pub hours: f64,
    #[serde(default)]
    pub ot_type: OvertimeType,
    #[validate(length(max = 2000))]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multipliers() {
        assert_eq!(OvertimeType::Holiday.multiplier(), 2.5);
        assert_eq!(OvertimeType::RestDay.multiplier(), 2.0);
        assert_eq!(OvertimeType::WorkingDay.multiplier(), 1.5);
        assert_eq!(OvertimeType::Night.multiplier(), 1.75);
    }

    #[test]
    fn test_parse_lenient() {
        assert_eq!(OvertimeType::parse_lenient("Rest Day"), Some(OvertimeType::RestDay));
        assert_eq!(OvertimeType::parse_lenient(" working DAY "), Some(OvertimeType::WorkingDay));
        assert_eq!(OvertimeType::parse_lenient("night"), Some(OvertimeType::Night));
        assert_eq!(OvertimeType::parse_lenient("Weekend"), None);
    }

    #[test]
    fn test_overtime_amount() {
        let amount = overtime_amount(2.0, OvertimeType::Holiday, 17_333.0);
        assert!((amount - 500.0).abs() < 1e-9);

        assert_eq!(overtime_amount(0.0, OvertimeType::Night, 10_000.0), 0.0);
        assert_eq!(overtime_amount(3.0, OvertimeType::Night, 0.0), 0.0);
        assert_eq!(overtime_amount(-1.0, OvertimeType::Night, 10_000.0), 0.0);
        assert_eq!(overtime_amount(f64::NAN, OvertimeType::Night, 10_000.0), 0.0);
    }

    #[test]
    fn test_type_serde_names() {
        let json = serde_json::to_string(&OvertimeType::RestDay).unwrap();
        assert_eq!(json, "\"Rest Day\"");
        let parsed: OvertimeType = serde_json::from_str("\"Working Day\"").unwrap();
        assert_eq!(parsed, OvertimeType::WorkingDay);
    }

    #[test]
    fn test_display_status_labels() {
        assert_eq!(DisplayStatus::Recorded(OvertimeStatus::Approved).label(), "Approved");
        assert_eq!(DisplayStatus::DataInconsistent.label(), "Data Inconsistent");
        assert_eq!(DisplayStatus::NoOtFiled.to_string(), "No OT Filed");
        assert!(OvertimeStatus::Disapproved.is_decision());
        assert!(!OvertimeStatus::Pending.is_decision());
    }
}
