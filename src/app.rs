use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/questions/today", get(handlers::get_questions))
        .route(
            "/api/mood-session",
            get(handlers::get_sessions).post(handlers::check_in),
        )
        .route("/api/mood-session/daily-count", get(handlers::daily_count))
        .route("/api/mood-session/trends", get(handlers::get_trends))
        .route(
            "/api/budget",
            get(handlers::get_budgets).post(handlers::create_budget),
        )
        .route("/api/budget/analytics", get(handlers::budget_analytics))
        .route("/api/perma-chat", post(handlers::perma_chat))
        .with_state(state)
}
