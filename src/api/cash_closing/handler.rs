//! Cash closing handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{CashClosing, DailySummary};
use crate::db::repository::cash_closing as closing_repo;
use crate::utils::{AppResult, time};

const RESOURCE: &str = "cash_closing";

#[derive(Debug, Deserialize)]
pub struct CloseRequest {
    /// Calendar date to close, `YYYY-MM-DD`; defaults to today in the
    /// business timezone
    pub data_fechamento: Option<String>,
    pub observacoes: Option<String>,
}

/// POST /api/cash-closing
pub async fn close(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CloseRequest>,
) -> AppResult<(StatusCode, Json<CashClosing>)> {
    let tz = state.config.timezone;
    let date = payload
        .data_fechamento
        .as_deref()
        .map(time::parse_date)
        .transpose()?
        .unwrap_or_else(|| time::today(tz));
    time::validate_not_future(date, tz)?;

    let start = time::day_start_utc(date, tz);
    let end = time::day_end_utc(date, tz);

    let closing = closing_repo::close_day(
        &state.pool,
        date,
        start,
        end,
        &state.config.counted_statuses,
        payload.observacoes,
        Some(user.username.clone()),
    )
    .await?;

    tracing::info!(
        date = %date,
        operator = %user.username,
        total_pedidos = closing.total_pedidos,
        "Cash closing recorded"
    );
    state.notify(RESOURCE, "closed", &closing.id.to_string(), Some(&closing));

    Ok((StatusCode::CREATED, Json(closing)))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub data_inicio: Option<String>,
    pub data_fim: Option<String>,
}

/// GET /api/cash-closing
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<CashClosing>>> {
    let start_date = query
        .data_inicio
        .as_deref()
        .map(time::parse_date)
        .transpose()?;
    let end_date = query.data_fim.as_deref().map(time::parse_date).transpose()?;

    let closings = closing_repo::find_all(&state.pool, start_date, end_date).await?;
    Ok(Json(closings))
}

#[derive(Debug, Serialize)]
pub struct CurrentResponse {
    pub data: NaiveDate,
    pub already_closed: bool,
    /// The frozen snapshot, when the day is closed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fechamento: Option<CashClosing>,
    /// Live preview, when it is not
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resumo: Option<DailySummary>,
}

/// GET /api/cash-closing/current - today's figures, frozen or live
pub async fn current(State(state): State<ServerState>) -> AppResult<Json<CurrentResponse>> {
    let tz = state.config.timezone;
    let today = time::today(tz);

    if let Some(fechamento) = closing_repo::find_by_date(&state.pool, today).await? {
        return Ok(Json(CurrentResponse {
            data: today,
            already_closed: true,
            fechamento: Some(fechamento),
            resumo: None,
        }));
    }

    let start = time::day_start_utc(today, tz);
    let end = time::day_end_utc(today, tz);
    let resumo =
        closing_repo::compute_summary(&state.pool, start, end, &state.config.counted_statuses)
            .await?;

    Ok(Json(CurrentResponse {
        data: today,
        already_closed: false,
        fechamento: None,
        resumo: Some(resumo),
    }))
}

/// GET /api/cash-closing/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CashClosing>> {
    let closing = closing_repo::find_by_id(&state.pool, id).await?;
    Ok(Json(closing))
}
