//! Scoped overtime report

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use hr_contracts::reports::MonthFilterContract;
use hr_contracts::{Contract, UserContext};
use hr_core::error::{HrError, HrResult};
use hr_core::format::{format_date, format_etb};
use hr_core::traits::Id;
use hr_db::{OvertimeFilter, Store};
use hr_models::{DisplayStatus, Employee, OvertimeRecord, UNASSIGNED};
use serde::{Deserialize, Serialize};

use crate::overtime::repair_for_display;

pub const NO_ROWS: &str = "No employees or records found matching the selected filters.";

/// Report filters. Blank values and the "All ..." labels mean no filter.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OvertimeReportFilter {
    pub month: Option<String>,
    pub branch: Option<String>,
    pub department: Option<String>,
}

fn specific<'a>(value: Option<&'a str>, wildcard: &str) -> Option<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all") && *v != wildcard)
}

impl OvertimeReportFilter {
    pub fn month(&self) -> Option<&str> {
        specific(self.month.as_deref(), "All Time")
    }

    pub fn branch(&self) -> Option<&str> {
        specific(self.branch.as_deref(), "All Branches")
    }

    pub fn department(&self) -> Option<&str> {
        specific(self.department.as_deref(), "All Departments")
    }

    /// Placeholder rows are only produced when something is filtered
    pub fn is_specific(&self) -> bool {
        self.month().is_some() || self.branch().is_some() || self.department().is_some()
    }

    fn includes(&self, employee: &Employee) -> bool {
        self.branch().map_or(true, |b| employee.branch == b)
            && self
                .department()
                .map_or(true, |d| employee.department_or_unassigned() == d)
    }
}

/// One line of the report, either a repaired record or a placeholder
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OvertimeReportRow {
    /// Record id, or the employee id on placeholders
    pub id: Id,
    pub employee_id: Id,
    pub employee_name: String,
    pub branch: String,
    pub department: String,
    /// `None` on placeholders
    pub date: Option<NaiveDate>,
    pub ot_type: String,
    pub hours: f64,
    pub amount: f64,
    pub status: DisplayStatus,
    pub placeholder: bool,
}

impl OvertimeReportRow {
    fn placeholder(employee: &Employee) -> Self {
        Self {
            id: employee.id,
            employee_id: employee.id,
            employee_name: employee.name.clone(),
            branch: employee.branch.clone(),
            department: employee.department_or_unassigned().to_string(),
            date: None,
            ot_type: "N/A".to_string(),
            hours: 0.0,
            amount: 0.0,
            status: DisplayStatus::NoOtFiled,
            placeholder: true,
        }
    }

    fn repaired(record: &OvertimeRecord, employee: &Employee, salary: f64) -> Self {
        let (amount, status) = repair_for_display(record, salary);
        Self {
            id: record.id,
            employee_id: record.employee_id,
            employee_name: record.employee_name.clone(),
            branch: record.branch.clone(),
            department: employee.department_or_unassigned().to_string(),
            date: Some(record.date),
            ot_type: record.ot_type.to_string(),
            hours: record.hours,
            amount,
            status,
            placeholder: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OvertimeReport {
    pub filter: OvertimeReportFilter,
    pub rows: Vec<OvertimeReportRow>,
    pub total_payout: f64,
    pub generated_at: DateTime<Utc>,
}

/// Name order, then newest date first, placeholders last
fn row_order(a: &OvertimeReportRow, b: &OvertimeReportRow) -> Ordering {
    a.employee_name
        .to_lowercase()
        .cmp(&b.employee_name.to_lowercase())
        .then_with(|| a.employee_name.cmp(&b.employee_name))
        .then_with(|| match (a.date, b.date) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => y.cmp(&x),
        })
}

/// Build the report rows from all employees and records
pub fn build_overtime_report(
    filter: &OvertimeReportFilter,
    employees: &[Employee],
    records: &[OvertimeRecord],
    now: DateTime<Utc>,
) -> OvertimeReport {
    let salaries: HashMap<Id, f64> = employees.iter().map(|e| (e.id, e.salary)).collect();
    let month = filter.month();

    let mut rows: Vec<OvertimeReportRow> = Vec::new();
    for employee in employees.iter().filter(|e| filter.includes(e)) {
        let salary = salaries.get(&employee.id).copied().unwrap_or(0.0);
        let before = rows.len();
        rows.extend(
            records
                .iter()
                .filter(|r| r.employee_id == employee.id)
                .filter(|r| month.map_or(true, |m| r.month() == m))
                .map(|r| OvertimeReportRow::repaired(r, employee, salary)),
        );
        if rows.len() == before && filter.is_specific() {
            rows.push(OvertimeReportRow::placeholder(employee));
        }
    }
    rows.sort_by(row_order);

    let total_payout = rows.iter().map(|r| r.amount).sum();
    OvertimeReport {
        filter: filter.clone(),
        rows,
        total_payout,
        generated_at: now,
    }
}

impl OvertimeReport {
    /// Printable markdown version
    pub fn to_markdown(&self) -> String {
        let mut out = String::from("# Scoped Overtime Report\n\n");
        out.push_str(&format!(
            "**Month:** {} | **Branch:** {} | **Dept:** {}\n\n",
            self.filter.month().unwrap_or("All Time"),
            self.filter.branch().unwrap_or("All Branches"),
            self.filter.department().unwrap_or("All Departments"),
        ));
        out.push_str(&format!("Generated: {}\n\n", self.generated_at.format("%Y-%m-%d")));
        out.push_str(&format!(
            "**Total Estimated Payout:** {}\n\n",
            format_etb(self.total_payout)
        ));

        if self.rows.is_empty() {
            out.push_str(NO_ROWS);
            out.push('\n');
            return out;
        }

        out.push_str("| Date | Branch | Employee | Dept | Type | Hours | Amount | Status |\n");
        out.push_str("| :--- | :--- | :--- | :--- | :--- | ---: | ---: | :--- |\n");
        for row in &self.rows {
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} | {} |\n",
                format_date(row.date),
                row.branch,
                row.employee_name,
                row.department,
                row.ot_type,
                row.hours,
                format_etb(row.amount),
                row.status
            ));
        }
        out
    }
}

/// Admins see every branch; approvers scoped to a branch only see theirs
pub struct OvertimeReportService<'a, U: UserContext> {
    store: &'a dyn Store,
    user: &'a U,
}

impl<'a, U: UserContext> OvertimeReportService<'a, U> {
    pub fn new(store: &'a dyn Store, user: &'a U) -> Self {
        Self { store, user }
    }

    pub async fn call(&self, mut filter: OvertimeReportFilter) -> HrResult<OvertimeReport> {
        if !self.user.role().sees_all_overtime() {
            return Err(HrError::forbidden("You are not authorized to view overtime reports"));
        }
        MonthFilterContract.validate(&filter.month)?;

        if !self.user.is_admin() {
            if let Some(scope) = self.user.branch_id().map(str::trim).filter(|b| !b.is_empty()) {
                filter.branch = Some(scope.to_string());
            }
        }

        let employees = self
            .store
            .list_employees(filter.branch().map(str::to_string), None)
            .await?;
        let mut records_filter = OvertimeFilter::default();
        if let Some(branch) = filter.branch() {
            records_filter = records_filter.in_branch(branch);
        }
        let records = self.store.list_overtime_records(records_filter).await?;

        let report = build_overtime_report(&filter, &employees, &records, Utc::now());
        tracing::info!(
            month = ?filter.month(),
            branch = ?filter.branch(),
            department = ?filter.department(),
            rows = report.rows.len(),
            total_payout = report.total_payout,
            "overtime report generated"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockUser;
    use chrono::TimeZone;
    use hr_db::{MemoryStore, WriteBatch};
    use hr_models::{KpiMetrics, OvertimeStatus, OvertimeType};
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn employee(name: &str, branch: &str, department: &str, salary: f64) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            name: name.into(),
            role: "Driver".into(),
            salary,
            branch: branch.into(),
            department: department.into(),
            metrics: KpiMetrics::default(),
            standard_hours_per_week: 40.0,
            created_by: None,
            is_active: true,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn record(e: &Employee, date: (i32, u32, u32), amount: f64, status: Option<OvertimeStatus>) -> OvertimeRecord {
        OvertimeRecord {
            id: Uuid::new_v4(),
            employee_id: e.id,
            employee_name: e.name.clone(),
            branch: e.branch.clone(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            hours: 2.0,
            ot_type: OvertimeType::Holiday,
            description: "Event".into(),
            amount,
            status,
            submitted_by: Uuid::new_v4(),
            manager_comment: None,
            approved_by: None,
            approval_timestamp: None,
            created_at: now(),
        }
    }

    fn filter(month: Option<&str>, branch: Option<&str>, department: Option<&str>) -> OvertimeReportFilter {
        OvertimeReportFilter {
            month: month.map(Into::into),
            branch: branch.map(Into::into),
            department: department.map(Into::into),
        }
    }

    #[test]
    fn test_wildcards() {
        let f = filter(Some("All Time"), Some("All Branches"), Some(" all "));
        assert!(!f.is_specific());
        let f = filter(None, None, Some("Sales"));
        assert!(f.is_specific());
        assert_eq!(f.department(), Some("Sales"));
    }

    #[test]
    fn test_open_filters_skip_employees_without_records() {
        let abel = employee("Abel", "Bole", "Sales", 17_333.0);
        let hana = employee("Hana", "Bole", "Sales", 17_333.0);
        let records = vec![record(&abel, (2024, 5, 3), 100.0, Some(OvertimeStatus::Approved))];

        let report = build_overtime_report(&filter(None, None, None), &[abel, hana], &records, now());
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.total_payout, 100.0);
    }

    #[test]
    fn test_specific_filter_adds_placeholders_last() {
        let abel = employee("Abel", "Bole", "Sales", 17_333.0);
        let hana = employee("hana", "Bole", "", 17_333.0);
        let records = vec![
            record(&abel, (2024, 5, 3), 0.0, None),
            record(&abel, (2024, 5, 20), 50.0, Some(OvertimeStatus::Pending)),
            record(&abel, (2024, 4, 1), 70.0, Some(OvertimeStatus::Pending)),
        ];

        let report = build_overtime_report(
            &filter(Some("2024-05"), Some("Bole"), None),
            &[hana.clone(), abel.clone()],
            &records,
            now(),
        );

        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.rows[0].date, NaiveDate::from_ymd_opt(2024, 5, 20));
        assert_eq!(report.rows[1].status, DisplayStatus::DataInconsistent);
        assert!((report.rows[1].amount - 500.0).abs() < 1e-9);

        let placeholder = &report.rows[2];
        assert!(placeholder.placeholder);
        assert_eq!(placeholder.id, hana.id);
        assert_eq!(placeholder.department, UNASSIGNED);
        assert_eq!(placeholder.ot_type, "N/A");
        assert_eq!(placeholder.status, DisplayStatus::NoOtFiled);
        assert!((report.total_payout - 550.0).abs() < 1e-9);
    }

    #[test]
    fn test_department_filter_uses_unassigned() {
        let a = employee("A", "Bole", "", 10_000.0);
        let b = employee("B", "Bole", "Sales", 10_000.0);
        let report = build_overtime_report(&filter(None, None, Some("Unassigned")), &[a.clone(), b], &[], now());
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].employee_id, a.id);
    }

    #[test]
    fn test_markdown() {
        let abel = employee("Abel", "Bole", "Sales", 17_333.0);
        let records = vec![record(&abel, (2024, 5, 3), 1234.5, Some(OvertimeStatus::Approved))];
        let report = build_overtime_report(&filter(Some("2024-05"), None, None), &[abel], &records, now());
        let md = report.to_markdown();

        assert!(md.contains("**Month:** 2024-05 | **Branch:** All Branches | **Dept:** All Departments\n"));
        assert!(md.contains("**Total Estimated Payout:** ETB 1,234.50\n"));
        assert!(md.contains("| 2024-05-03 | Bole | Abel | Sales | Holiday | 2 | ETB 1,234.50 | Approved |\n"));

        let empty = build_overtime_report(&filter(None, None, None), &[], &[], now());
        assert!(empty.to_markdown().ends_with(&format!("{NO_ROWS}\n")));
    }

    #[tokio::test]
    async fn test_service_scopes_approver_and_rejects_viewer() {
        let store = MemoryStore::new();
        let bole = employee("Abel", "Bole", "Sales", 10_000.0);
        let adama = employee("Kidus", "Adama", "Sales", 10_000.0);
        let mut batch = WriteBatch::new();
        batch
            .upsert_overtime_record(record(&bole, (2024, 5, 3), 10.0, Some(OvertimeStatus::Pending)))
            .upsert_overtime_record(record(&adama, (2024, 5, 3), 20.0, Some(OvertimeStatus::Pending)))
            .upsert_employee(bole)
            .upsert_employee(adama);
        store.commit(batch).await.unwrap();

        let approver = MockUser::approver(Some("Bole"));
        let report = OvertimeReportService::new(&store, &approver)
            .call(OvertimeReportFilter::default())
            .await
            .unwrap();
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.total_payout, 10.0);

        let admin = MockUser::admin();
        let bad = OvertimeReportService::new(&store, &admin)
            .call(filter(Some("May"), None, None))
            .await
            .unwrap_err();
        assert_eq!(bad.status_code(), 422);

        let viewer = MockUser::viewer();
        let denied = OvertimeReportService::new(&store, &viewer)
            .call(OvertimeReportFilter::default())
            .await
            .unwrap_err();
        assert_eq!(denied.status_code(), 403);
    }
}
