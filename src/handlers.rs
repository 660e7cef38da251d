use crate::admission::{self, resolve_tz};
use crate::budget;
use crate::errors::AppError;
use crate::models::{
    AdmissionStatus, BudgetAnalytics, BudgetRecord, CheckInRequest, CheckInResponse, MoodSession,
    Period, Pillar, Question, TrendsResponse,
};
use crate::questions::todays_questions;
use crate::scoring::{analyze, overall_score, summary_text};
use crate::state::AppState;
use crate::storage::persist_data;
use crate::tips::{TipReply, TipRequest};
use crate::trends::{compute_trends, declining_pillars, mood_label, suggestions_for};
use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

const DEFAULT_TREND_SESSIONS: usize = 5;

#[derive(Debug, Deserialize)]
pub struct TzQuery {
    pub tz: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SessionsQuery {
    pub user_id: String,
    pub date: Option<NaiveDate>,
    pub tz: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DailyCountQuery {
    pub user_id: String,
    pub tz: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrendsQuery {
    pub user_id: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub user_id: String,
    pub period: Option<Period>,
}

#[derive(Debug, Deserialize)]
pub struct BudgetCreateRequest {
    pub user_id: String,
    pub income: f64,
    #[serde(default)]
    pub expenses: BTreeMap<String, f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

fn require_user(user_id: &str) -> Result<(), AppError> {
    if user_id.trim().is_empty() {
        return Err(AppError::bad_request("user_id is required"));
    }
    Ok(())
}

/// Today's deterministic question set, for the caller's local date when
/// a timezone is forwarded.
pub async fn get_questions(Query(query): Query<TzQuery>) -> Json<Vec<Question>> {
    let tz = resolve_tz(query.tz.as_deref());
    let today = Utc::now().with_timezone(&tz).date_naive();
    Json(todays_questions(today))
}

/// Scores a completed questionnaire and records the session, subject to
/// the two-per-day admission policy. Admission check and append happen
/// under one lock of the store so concurrent submissions cannot
/// over-admit.
pub async fn check_in(
    State(state): State<AppState>,
    Json(payload): Json<CheckInRequest>,
) -> Result<Json<CheckInResponse>, AppError> {
    require_user(&payload.user_id)?;
    let tz = resolve_tz(payload.tz.as_deref());
    let now = Utc::now();
    let questions = todays_questions(now.with_timezone(&tz).date_naive());
    let analysis = analyze(&questions, &payload.answers)?;

    let mut data = state.data.lock().await;
    let existing = data
        .sessions
        .get(&payload.user_id)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let status = admission::check(existing, tz, now);
    if !status.can_check_in {
        warn!(user_id = %payload.user_id, "daily check-in limit reached");
        let next = status
            .next_check_in
            .unwrap_or_else(|| admission::local_day_bounds(now, tz).1);
        return Err(AppError::rate_limited(next));
    }

    let session = MoodSession {
        user_id: payload.user_id.clone(),
        timestamp: now,
        summary: summary_text(&analysis),
        perma_scores: analysis.pillar_averages,
        answers: payload.answers.iter().flatten().copied().collect(),
        strongest: analysis.strongest,
        weakest: analysis.weakest,
    };
    let daily_sessions = status.count + 1;
    data.sessions
        .entry(payload.user_id.clone())
        .or_default()
        .push(session.clone());
    persist_data(&state.data_path, &data).await?;
    info!(user_id = %payload.user_id, daily_sessions, "recorded mood session");

    Ok(Json(CheckInResponse {
        session,
        daily_sessions,
    }))
}

/// A user's sessions, most recent first, optionally narrowed to one
/// local calendar day.
pub async fn get_sessions(
    State(state): State<AppState>,
    Query(query): Query<SessionsQuery>,
) -> Result<Json<Vec<MoodSession>>, AppError> {
    require_user(&query.user_id)?;
    let tz = resolve_tz(query.tz.as_deref());
    let data = state.data.lock().await;
    let sessions: Vec<MoodSession> = data
        .sessions
        .get(&query.user_id)
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .rev()
        .filter(|session| match query.date {
            Some(date) => session.timestamp.with_timezone(&tz).date_naive() == date,
            None => true,
        })
        .cloned()
        .collect();
    Ok(Json(sessions))
}

pub async fn daily_count(
    State(state): State<AppState>,
    Query(query): Query<DailyCountQuery>,
) -> Result<Json<AdmissionStatus>, AppError> {
    require_user(&query.user_id)?;
    let tz = resolve_tz(query.tz.as_deref());
    let data = state.data.lock().await;
    let sessions = data
        .sessions
        .get(&query.user_id)
        .map(Vec::as_slice)
        .unwrap_or_default();
    Ok(Json(admission::check(sessions, tz, Utc::now())))
}

/// Per-pillar trends over the most recent sessions, with a headline
/// mood label and suggestions for pillars that are sliding.
pub async fn get_trends(
    State(state): State<AppState>,
    Query(query): Query<TrendsQuery>,
) -> Result<Json<TrendsResponse>, AppError> {
    require_user(&query.user_id)?;
    let limit = query.limit.unwrap_or(DEFAULT_TREND_SESSIONS).max(1);
    let data = state.data.lock().await;
    let recent: Vec<MoodSession> = data
        .sessions
        .get(&query.user_id)
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .rev()
        .take(limit)
        .cloned()
        .collect();

    let records = compute_trends(&recent, &Pillar::ALL);
    let mood = recent
        .first()
        .map(|session| mood_label(overall_score(&session.perma_scores)).to_string());
    let suggestions = declining_pillars(&records)
        .into_iter()
        .flat_map(|pillar| suggestions_for(pillar).iter().map(|s| s.to_string()))
        .collect();

    Ok(Json(TrendsResponse {
        trends: records,
        mood,
        suggestions,
    }))
}

pub async fn get_budgets(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<BudgetRecord>>, AppError> {
    require_user(&query.user_id)?;
    let data = state.data.lock().await;
    Ok(Json(
        data.budgets.get(&query.user_id).cloned().unwrap_or_default(),
    ))
}

pub async fn create_budget(
    State(state): State<AppState>,
    Json(payload): Json<BudgetCreateRequest>,
) -> Result<Json<BudgetRecord>, AppError> {
    require_user(&payload.user_id)?;
    let record = BudgetRecord {
        timestamp: payload.timestamp.unwrap_or_else(Utc::now),
        income: payload.income,
        expenses: payload.expenses,
    };
    let mut data = state.data.lock().await;
    data.budgets
        .entry(payload.user_id)
        .or_default()
        .push(record.clone());
    persist_data(&state.data_path, &data).await?;
    Ok(Json(record))
}

pub async fn budget_analytics(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<BudgetAnalytics>, AppError> {
    require_user(&query.user_id)?;
    let period = query.period.unwrap_or(Period::ThreeMonths);
    let data = state.data.lock().await;
    let records = data
        .budgets
        .get(&query.user_id)
        .map(Vec::as_slice)
        .unwrap_or_default();
    Ok(Json(budget::aggregate(records, period, Utc::now())))
}

/// Forwards a chat turn to the opaque tip collaborator. Unreachable or
/// unconfigured collaborators surface as 502; no retry here.
pub async fn perma_chat(
    State(state): State<AppState>,
    Json(payload): Json<TipRequest>,
) -> Result<Json<TipReply>, AppError> {
    let response = state.tips.generate(&payload).await?;
    Ok(Json(TipReply { response }))
}
