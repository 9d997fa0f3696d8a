//! KPI performance report (markdown)

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use hr_contracts::UserContext;
use hr_core::error::HrResult;
use hr_db::Store;
use hr_models::{Branch, Department, Employee, KpiMetrics, KpiScorecard};

use crate::sync::mean;

pub const NO_DATA: &str =
    "No data available to generate a report for this scope. Please add branches, departments, and employees.";

/// Which branches the report covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportScope {
    All,
    Branch(String),
}

impl ReportScope {
    /// Blank or "all" (any case) is the whole company
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => ReportScope::All,
            Some(v) if v.eq_ignore_ascii_case("all") => ReportScope::All,
            Some(v) => ReportScope::Branch(v.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ReportScope::All => "All Branches",
            ReportScope::Branch(title) => title,
        }
    }

    fn includes(&self, branch: &str) -> bool {
        match self {
            ReportScope::All => true,
            ReportScope::Branch(title) => title == branch,
        }
    }
}

/// Snapshot the report is generated from
#[derive(Debug, Clone, Default)]
pub struct KpiReportData {
    pub branches: Vec<Branch>,
    pub departments: Vec<Department>,
    pub employees: Vec<Employee>,
    pub scorecards: Vec<KpiScorecard>,
}

struct Ranked<'a> {
    name: &'a str,
    score: f64,
    branch: &'a str,
    department: &'a str,
    metrics: Option<KpiMetrics>,
}

fn metric(value: Option<u8>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Render the performance report for `scope` as markdown
pub fn generate_kpi_report(scope: &ReportScope, data: &KpiReportData, now: DateTime<Utc>) -> String {
    let branches: Vec<&Branch> = data
        .branches
        .iter()
        .filter(|b| scope.includes(&b.title))
        .collect();
    if branches.is_empty() {
        return NO_DATA.to_string();
    }

    let employees: Vec<&Employee> = data
        .employees
        .iter()
        .filter(|e| scope.includes(&e.branch))
        .collect();
    let scorecard_of = |employee: &Employee| {
        data.scorecards
            .iter()
            .find(|s| s.employee_id == employee.id)
    };

    let title = match scope {
        ReportScope::All => "Company KPI Performance Report".to_string(),
        ReportScope::Branch(branch) => format!("{branch} Branch KPI Performance Report"),
    };

    let mut report = format!("# {title} ({})\n\n", now.format("%Y-%m-%d"));
    report.push_str("## Executive Summary\n");
    let overall = mean(employees.iter().filter_map(|e| scorecard_of(e)).map(|s| s.score));
    report.push_str(&format!("* **Scope:** {}\n", scope.label()));
    report.push_str(&format!("* **Total Employees Tracked:** {}\n", employees.len()));
    report.push_str(&format!("* **Overall Average KPI Score:** **{overall:.1}%**\n\n"));
    report.push_str("---\n\n");

    report.push_str("## Detailed Branch Breakdown\n\n");
    for branch in &branches {
        report.push_str(&format!(
            "### 🏢 Branch: {} ({:.1}%)\n",
            branch.title, branch.avg_score
        ));
        report.push_str(&format!("* Employees: {}\n", branch.employee_count));

        let departments: Vec<&Department> = data
            .departments
            .iter()
            .filter(|d| d.branch == branch.title)
            .collect();
        if departments.is_empty() {
            report.push_str("* No departments recorded for this branch.\n");
        } else {
            report.push_str(&format!("#### Departments in {}\n", branch.title));
            for dept in departments {
                report.push_str(&format!(
                    "* **{}**: {:.1}% ({} staff)\n",
                    dept.title, dept.avg_score, dept.employee_count
                ));
            }
        }
        report.push('\n');
    }

    report.push_str("---\n\n");
    report.push_str("## Top 5 / Bottom 5 Employees (By KPI Score)\n\n");

    let mut ranked: Vec<Ranked> = employees
        .iter()
        .map(|e| {
            let scorecard = scorecard_of(e);
            Ranked {
                name: &e.name,
                score: scorecard.map_or(0.0, |s| s.score),
                branch: &e.branch,
                department: &e.department,
                metrics: scorecard.map(|s| s.metrics),
            }
        })
        .collect();
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    if ranked.is_empty() {
        report.push_str("No employee score data available in this scope.\n");
    } else {
        push_rankings(&mut report, &ranked);
    }

    report.push_str("---\n\n");
    report.push_str(&format!(
        "*Report scope: {} | Generated by KPI Dashboard on {}.*",
        scope.label(),
        now.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    report
}

fn push_rankings(report: &mut String, ranked: &[Ranked]) {
    report.push_str("| Rank | Employee | Score | Branch | Department |\n");
    report.push_str("| :---: | :--- | :---: | :--- | :--- |\n");

    let top_len = ranked.len().min(5);
    let top_score = ranked[0].score;
    // Lowest five, minus anyone already in the top five or tied with the best
    let bottom: Vec<&Ranked> = ranked
        .iter()
        .enumerate()
        .skip(ranked.len().saturating_sub(5))
        .filter(|(index, e)| *index >= top_len && e.score < top_score)
        .map(|(_, e)| e)
        .rev()
        .collect();

    report.push_str("**Top 5 Performers:**\n");
    for (index, e) in ranked[..top_len].iter().enumerate() {
        report.push_str(&format!(
            "| {} | {} | **{:.1}%** | {} | {} |\n",
            index + 1,
            e.name,
            e.score,
            e.branch,
            e.department
        ));
    }

    if !bottom.is_empty() && bottom.len() < ranked.len() {
        report.push_str(&format!("\n**Bottom {} Performers:**\n", bottom.len()));
        for (index, e) in bottom.iter().enumerate() {
            report.push_str(&format!(
                "| {} | {} | {:.1}% | {} | {} |\n",
                ranked.len() - bottom.len() + index + 1,
                e.name,
                e.score,
                e.branch,
                e.department
            ));
        }
    }

    report.push_str("\n\n## Complete Employee Score Register\n\n");
    report.push_str("| Name | Score | Punctuality | Efficiency | Speed | Teamwork | Branch | Department |\n");
    report.push_str("| :--- | :---: | :---: | :---: | :---: | :---: | :--- | :--- |\n");
    for e in ranked {
        let m = e.metrics;
        report.push_str(&format!(
            "| {} | **{:.1}%** | {}% | {}% | {}% | {}% | {} | {} |\n",
            e.name,
            e.score,
            metric(m.map(|m| m.punctuality)),
            metric(m.map(|m| m.efficiency)),
            metric(m.map(|m| m.speed)),
            metric(m.map(|m| m.teamwork)),
            e.branch,
            e.department
        ));
    }
}

/// Loads the snapshot and renders the report. Any logged-in user may read it.
pub struct KpiReportService<'a, U: UserContext> {
    store: &'a dyn Store,
    user: &'a U,
}

impl<'a, U: UserContext> KpiReportService<'a, U> {
    pub fn new(store: &'a dyn Store, user: &'a U) -> Self {
        Self { store, user }
    }

    pub async fn call(&self, scope: &ReportScope) -> HrResult<String> {
        let data = KpiReportData {
            branches: self.store.list_branches().await?,
            departments: self.store.list_departments(None).await?,
            employees: self.store.list_employees(None, None).await?,
            scorecards: self.store.list_scorecards(None, None).await?,
        };

        tracing::info!(scope = %scope.label(), user_id = %self.user.id(), "KPI report generated");
        Ok(generate_kpi_report(scope, &data, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fake::faker::name::en::Name;
    use fake::Fake;
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()
    }

    fn employee(name: &str, branch: &str, department: &str) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            name: name.into(),
            role: "Clerk".into(),
            salary: 5_000.0,
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

    fn scorecard(employee: &Employee, metrics: KpiMetrics) -> KpiScorecard {
        KpiScorecard {
            employee_id: employee.id,
            employee_name: employee.name.clone(),
            job_role: employee.role.clone(),
            branch: employee.branch.clone(),
            department: employee.department.clone(),
            metrics,
            score: metrics.score(),
            assignment_date: now(),
            updated_at: now(),
        }
    }

    /// Employees scoring 100, 90, ... downwards
    fn data(count: usize) -> KpiReportData {
        let mut branch = Branch::new("Bole");
        branch.avg_score = 62.5;
        branch.employee_count = count as u32;
        let mut dept = Department::new("Bole", "Sales");
        dept.avg_score = 62.5;
        dept.employee_count = count as u32;

        let mut data = KpiReportData {
            branches: vec![branch, Branch::new("Adama")],
            departments: vec![dept],
            ..Default::default()
        };
        for i in 0..count {
            let name: String = Name().fake();
            let e = employee(&format!("{i:02} {name}"), "Bole", "Sales");
            data.scorecards
                .push(scorecard(&e, KpiMetrics::uniform(100 - (i as u8) * 10)));
            data.employees.push(e);
        }
        data
    }

    #[test]
    fn test_scope_parsing() {
        assert_eq!(ReportScope::parse(None), ReportScope::All);
        assert_eq!(ReportScope::parse(Some("ALL")), ReportScope::All);
        assert_eq!(
            ReportScope::parse(Some(" Bole ")),
            ReportScope::Branch("Bole".into())
        );
    }

    #[test]
    fn test_no_branches() {
        let report = generate_kpi_report(&ReportScope::Branch("Nope".into()), &data(2), now());
        assert_eq!(report, NO_DATA);
    }

    #[test]
    fn test_summary_and_breakdown() {
        let report = generate_kpi_report(&ReportScope::All, &data(2), now());
        assert!(report.starts_with("# Company KPI Performance Report (2024-06-01)\n\n## Executive Summary\n"));
        assert!(report.contains("* **Scope:** All Branches\n"));
        assert!(report.contains("* **Total Employees Tracked:** 2\n"));
        assert!(report.contains("* **Overall Average KPI Score:** **95.0%**\n\n---\n\n"));
        assert!(report.contains("### 🏢 Branch: Bole (62.5%)\n* Employees: 2\n#### Departments in Bole\n* **Sales**: 62.5% (2 staff)\n"));
        assert!(report.contains("### 🏢 Branch: Adama (0.0%)\n* Employees: 0\n* No departments recorded for this branch.\n"));
        assert!(report.ends_with("*Report scope: All Branches | Generated by KPI Dashboard on 2024-06-01 09:30:00 UTC.*"));
    }

    #[test]
    fn test_branch_scope_title() {
        let report = generate_kpi_report(&ReportScope::Branch("Adama".into()), &data(3), now());
        assert!(report.starts_with("# Adama Branch KPI Performance Report (2024-06-01)"));
        assert!(report.contains("* **Total Employees Tracked:** 0\n"));
        assert!(report.contains("No employee score data available in this scope.\n---\n\n"));
        assert!(!report.contains("Bole"));
    }

    #[test]
    fn test_bottom_ranks_count_from_end() {
        let report = generate_kpi_report(&ReportScope::All, &data(8), now());
        assert!(report.contains("**Top 5 Performers:**\n| 1 | 00 "));
        // 8 employees: the lowest three fall outside the top five
        assert!(report.contains("\n**Bottom 3 Performers:**\n| 6 | 07 "));
        assert!(report.contains("% | Bole | Sales |\n| 7 | 06 "));
        assert!(report.contains("| 8 | 05 "));
        assert!(report.contains("\n\n## Complete Employee Score Register\n\n"));
        assert_eq!(report.matches("| Bole | Sales |").count(), 5 + 3 + 8);
    }

    #[test]
    fn test_no_bottom_when_everyone_is_top() {
        let report = generate_kpi_report(&ReportScope::All, &data(4), now());
        assert!(!report.contains("**Bottom"));
    }

    #[test]
    fn test_missing_scorecard_shows_dashes() {
        let mut data = data(0);
        data.employees.push(employee("Lone", "Bole", "Sales"));
        let report = generate_kpi_report(&ReportScope::All, &data, now());
        assert!(report.contains("| Lone | **0.0%** | -% | -% | -% | -% | Bole | Sales |\n"));
    }
}
