use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The five PERMA wellbeing pillars. Declaration order is the canonical
/// ordering used for ranking tie-breaks and as the sort order of
/// serialized score maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Pillar {
    #[serde(rename = "Positive Emotion")]
    PositiveEmotion,
    Engagement,
    Relationships,
    Meaning,
    Accomplishment,
}

impl Pillar {
    pub const ALL: [Pillar; 5] = [
        Pillar::PositiveEmotion,
        Pillar::Engagement,
        Pillar::Relationships,
        Pillar::Meaning,
        Pillar::Accomplishment,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Pillar::PositiveEmotion => "Positive Emotion",
            Pillar::Engagement => "Engagement",
            Pillar::Relationships => "Relationships",
            Pillar::Meaning => "Meaning",
            Pillar::Accomplishment => "Accomplishment",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionOption {
    pub label: String,
    pub score: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub pillar: Pillar,
    pub text: String,
    pub options: Vec<QuestionOption>,
}

/// One completed check-in. Immutable once stored. Strongest/weakest are
/// kept as structured fields so later consumers never parse them back
/// out of the summary prose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodSession {
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub perma_scores: BTreeMap<Pillar, f64>,
    pub answers: Vec<u8>,
    pub strongest: Pillar,
    pub weakest: Pillar,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetRecord {
    pub timestamp: DateTime<Utc>,
    pub income: f64,
    pub expenses: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    pub sessions: BTreeMap<String, Vec<MoodSession>>,
    pub budgets: BTreeMap<String, Vec<BudgetRecord>>,
}

/// Per-pillar rolling view over recent sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendRecord {
    pub average: f64,
    pub trend: Vec<f64>,
    pub improvement: bool,
    pub consistency: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "6m")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "3y")]
    ThreeYears,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TimeSeries {
    pub labels: Vec<String>,
    pub income: Vec<f64>,
    pub expenses: Vec<f64>,
    pub savings: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BudgetAnalytics {
    pub time_series: TimeSeries,
    pub current_month_breakdown: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionStatus {
    pub count: usize,
    pub can_check_in: bool,
    pub next_check_in: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    pub user_id: String,
    /// One entry per question in today's set; `null` marks an unanswered
    /// question and is rejected.
    pub answers: Vec<Option<u8>>,
    pub tz: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckInResponse {
    pub session: MoodSession,
    pub daily_sessions: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrendsResponse {
    pub trends: BTreeMap<Pillar, TrendRecord>,
    pub mood: Option<String>,
    pub suggestions: Vec<String>,
}
