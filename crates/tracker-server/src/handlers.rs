//! HTTP Handlers

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use chat_core::{ChatError, CommandCall, CommandReply, CommandSchema};
use coin_tracker::{Portfolio, PriceMap, PurchaseRecord, report};

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub cached_coins: usize,
    pub prices_updated_at: Option<String>,
    pub purchases: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct PricesResponse {
    pub prices: PriceMap,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct PortfolioResponse {
    pub portfolio: Portfolio,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub purchases: Vec<PurchaseRecord>,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    pub coin: String,
    #[serde(default)]
    pub amount: Option<serde_json::Value>,
    #[serde(default)]
    pub cost: Option<serde_json::Value>,
    /// `AMOUNT COST` as typed in chat
    #[serde(default)]
    pub entry: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastRequest {
    pub investment: serde_json::Value,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(err: &ChatError) -> ApiError {
    let (status, code) = match err {
        ChatError::CommandNotFound(_) => (StatusCode::NOT_FOUND, "COMMAND_NOT_FOUND"),
        ChatError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION"),
        ChatError::Parse(_) => (StatusCode::BAD_REQUEST, "PARSE"),
        ChatError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
    };

    (
        status,
        Json(ErrorResponse {
            error: err.user_message(),
            code: code.into(),
        }),
    )
}

fn unavailable(text: impl Into<String>) -> ApiError {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse {
            error: text.into(),
            code: "UNAVAILABLE".into(),
        }),
    )
}

async fn dispatch(state: &AppState, mut call: CommandCall) -> Result<CommandReply, ApiError> {
    if call.id.is_none() {
        call.id = Some(uuid::Uuid::new_v4().to_string());
    }

    state.commands.execute(&call).await.map_err(|err| {
        tracing::warn!(command = %call.name, error = %err, "Command failed");
        api_error(&err)
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.tracker.cache().current().await;

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        cached_coins: snapshot.as_ref().map_or(0, |s| s.len()),
        prices_updated_at: snapshot.map(|s| s.fetched_at.to_rfc3339()),
        purchases: state.tracker.list_purchases().await.len(),
    })
}

pub async fn get_prices(State(state): State<AppState>) -> Result<Json<PricesResponse>, ApiError> {
    let prices = state.tracker.get_current_prices().await;
    if prices.is_empty() {
        return Err(unavailable(report::PRICES_UNAVAILABLE));
    }

    let text = report::prices_report(&prices);
    Ok(Json(PricesResponse { prices, text }))
}

pub async fn get_portfolio(State(state): State<AppState>) -> Json<PortfolioResponse> {
    let portfolio = state.tracker.portfolio().await;
    let text = report::portfolio_report(&portfolio);
    Json(PortfolioResponse { portfolio, text })
}

pub async fn get_history(State(state): State<AppState>) -> Json<HistoryResponse> {
    let purchases = state.tracker.list_purchases().await;
    let text = report::history_report(&purchases);
    Json(HistoryResponse { purchases, text })
}

/// Record a purchase dated today
pub async fn add_purchase(
    State(state): State<AppState>,
    Json(payload): Json<PurchaseRequest>,
) -> Result<(StatusCode, Json<CommandReply>), ApiError> {
    let mut call = CommandCall::new("add_purchase").with_arg("coin", payload.coin.into());
    if let Some(amount) = payload.amount {
        call = call.with_arg("amount", amount);
    }
    if let Some(cost) = payload.cost {
        call = call.with_arg("cost", cost);
    }
    if let Some(entry) = payload.entry {
        call = call.with_arg("entry", entry.into());
    }

    let reply = dispatch(&state, call).await?;
    Ok((StatusCode::CREATED, Json(reply)))
}

pub async fn forecast(
    State(state): State<AppState>,
    Json(payload): Json<ForecastRequest>,
) -> Result<Json<CommandReply>, ApiError> {
    let call = CommandCall::new("forecast").with_arg("investment", payload.investment);
    let reply = dispatch(&state, call).await?;

    if reply.success {
        Ok(Json(reply))
    } else {
        Err(unavailable(reply.text))
    }
}

pub async fn list_commands(State(state): State<AppState>) -> Json<Vec<CommandSchema>> {
    Json(state.commands.schemas())
}

/// Generic chat entry point: any registered command, plus `help`
pub async fn run_command(
    State(state): State<AppState>,
    Json(call): Json<CommandCall>,
) -> Result<Json<CommandReply>, ApiError> {
    dispatch(&state, call).await.map(Json)
}
