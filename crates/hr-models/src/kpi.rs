//! KPI metrics and scorecards
//!
//! Table: kpi_scorecards (one row per employee, keyed by employee id)

use chrono::{DateTime, Utc};
use hr_core::traits::{Entity, Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{Branch, Department};

/// The four rated KPI dimensions, each 0..=100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct KpiMetrics {
    #[validate(range(max = 100))]
    pub punctuality: u8,
    #[validate(range(max = 100))]
    pub efficiency: u8,
    #[validate(range(max = 100))]
    pub speed: u8,
    #[validate(range(max = 100))]
    pub teamwork: u8,
}

impl Default for KpiMetrics {
    fn default() -> Self {
        Self::uniform(Rating::Good.value())
    }
}

impl KpiMetrics {
    pub const NAMES: [&'static str; 4] = ["punctuality", "efficiency", "speed", "teamwork"];

    pub fn new(punctuality: u8, efficiency: u8, speed: u8, teamwork: u8) -> Self {
        Self {
            punctuality,
            efficiency,
            speed,
            teamwork,
        }
    }

    pub fn uniform(value: u8) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn values(&self) -> [u8; 4] {
        [self.punctuality, self.efficiency, self.speed, self.teamwork]
    }

    /// Unweighted mean of the four ratings
    pub fn score(&self) -> f64 {
        let sum: u32 = self.values().iter().map(|v| u32::from(*v)).sum();
        f64::from(sum) / 4.0
    }
}

/// Ratings offered by the scorecard editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    Poor,
    Good,
    VeryGood,
    Excellent,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Poor, Rating::Good, Rating::VeryGood, Rating::Excellent];

    pub fn value(&self) -> u8 {
        match self {
            Rating::Poor => 25,
            Rating::Good => 50,
            Rating::VeryGood => 75,
            Rating::Excellent => 100,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rating::Poor => "Poor (25%)",
            Rating::Good => "Good (50%)",
            Rating::VeryGood => "Very Good (75%)",
            Rating::Excellent => "Excellent (100%)",
        }
    }

    pub fn from_value(value: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.value() == value)
    }
}

/// Colour band for a score card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoreBand {
    NoData,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl ScoreBand {
    pub fn for_score(score: f64) -> Self {
        if !score.is_finite() || score <= 0.0 {
            ScoreBand::NoData
        } else if score < 50.0 {
            ScoreBand::Poor
        } else if score < 75.0 {
            ScoreBand::Fair
        } else if score < 90.0 {
            ScoreBand::Good
        } else {
            ScoreBand::Excellent
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::NoData => "No Data",
            ScoreBand::Poor => "Poor",
            ScoreBand::Fair => "Fair",
            ScoreBand::Good => "Good",
            ScoreBand::Excellent => "Excellent",
        }
    }

    /// `N/A` for empty scores, otherwise the score with one decimal
    pub fn display(score: f64) -> String {
        match Self::for_score(score) {
            ScoreBand::NoData => "N/A".to_string(),
            _ => format!("{:.1}%", score),
        }
    }
}

/// Anything shown on a score card
pub trait Scored {
    fn score_value(&self) -> f64;
}

impl Scored for Branch {
    fn score_value(&self) -> f64 {
        self.avg_score
    }
}

impl Scored for Department {
    fn score_value(&self) -> f64 {
        self.avg_score
    }
}

impl Scored for KpiScorecard {
    fn score_value(&self) -> f64 {
        self.score
    }
}

/// An item serialized with its score band, e.g. `"scoreDisplay": "N/A"`
/// for a branch nobody has been rated in yet
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Banded<T> {
    #[serde(flatten)]
    pub item: T,
    pub band: ScoreBand,
    pub band_label: &'static str,
    pub score_display: String,
}

impl<T: Scored> From<T> for Banded<T> {
    fn from(item: T) -> Self {
        let score = item.score_value();
        let band = ScoreBand::for_score(score);
        Self {
            item,
            band,
            band_label: band.label(),
            score_display: ScoreBand::display(score),
        }
    }
}

/// One metric with its editor label; `label` is `None` off the 25-step grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricRating {
    pub metric: &'static str,
    pub value: u8,
    pub label: Option<&'static str>,
}

/// Denormalized KPI copy of an employee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiScorecard {
    pub employee_id: Id,
    pub employee_name: String,
    pub job_role: String,
    pub branch: String,
    pub department: String,
    pub metrics: KpiMetrics,
    pub score: f64,
    pub assignment_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl KpiScorecard {
    /// Apply new metrics and recompute the score
    pub fn set_metrics(&mut self, metrics: KpiMetrics, now: DateTime<Utc>) {
        self.metrics = metrics;
        self.score = metrics.score();
        self.updated_at = now;
    }

    pub fn ratings(&self) -> Vec<MetricRating> {
        KpiMetrics::NAMES
            .into_iter()
            .zip(self.metrics.values())
            .map(|(metric, value)| MetricRating {
                metric,
                value,
                label: Rating::from_value(value).map(|r| r.label()),
            })
            .collect()
    }
}

impl Identifiable for KpiScorecard {
    fn id(&self) -> Id {
        self.employee_id
    }
}

impl Timestamped for KpiScorecard {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        Some(self.assignment_date)
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }
}

impl Entity for KpiScorecard {
    const TABLE_NAME: &'static str = "kpi_scorecards";
    const TYPE_NAME: &'static str = "KpiScorecard";
}

/// Body of a metrics update request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MetricsUpdate {
    #[validate]
    pub metrics: KpiMetrics,
}
