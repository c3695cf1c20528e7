//! Dashboard handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::models::{DailySummary, KindBreakdown, OpenTable, PaymentBreakdown};
use crate::db::repository::{cash_closing as closing_repo, order as order_repo};
use crate::utils::{AppResult, time};

/// Consolidated queries are capped to one year
const MAX_RANGE_DAYS: i64 = 366;

#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub data: chrono::NaiveDate,
    pub resumo_hoje: DailySummary,
    pub pedidos_em_andamento: i64,
    pub mesas_abertas: Vec<OpenTable>,
}

/// GET /api/dashboard - today's KPIs
pub async fn overview(State(state): State<ServerState>) -> AppResult<Json<OverviewResponse>> {
    let tz = state.config.timezone;
    let today = time::today(tz);
    let start = time::day_start_utc(today, tz);
    let end = time::day_end_utc(today, tz);

    let resumo_hoje =
        closing_repo::compute_summary(&state.pool, start, end, &state.config.counted_statuses)
            .await?;
    let pedidos_em_andamento = order_repo::count_open(&state.pool).await?;
    let mesas_abertas = closing_repo::open_tables(&state.pool).await?;

    Ok(Json(OverviewResponse {
        data: today,
        resumo_hoje,
        pedidos_em_andamento,
        mesas_abertas,
    }))
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub data_inicio: Option<String>,
    pub data_fim: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TotaisGerais {
    pub total_pedidos: i64,
    pub vendas_brutas: f64,
    pub descontos_totais: f64,
    pub vendas_liquidas: f64,
    pub taxas_entrega: f64,
}

#[derive(Debug, Serialize)]
pub struct ConsolidatedResponse {
    pub data_inicio: chrono::NaiveDate,
    pub data_fim: chrono::NaiveDate,
    pub vendas_por_tipo: Vec<KindBreakdown>,
    pub vendas_por_pagamento: Vec<PaymentBreakdown>,
    pub totais_gerais: TotaisGerais,
    pub mesas_abertas: Vec<OpenTable>,
}

/// GET /api/dashboard/fechamento-consolidado - range summary (default: today)
pub async fn consolidated(
    State(state): State<ServerState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<ConsolidatedResponse>> {
    let tz = state.config.timezone;
    let today = time::today(tz);

    let data_inicio = query
        .data_inicio
        .as_deref()
        .map(time::parse_date)
        .transpose()?
        .unwrap_or(today);
    let data_fim = query
        .data_fim
        .as_deref()
        .map(time::parse_date)
        .transpose()?
        .unwrap_or(today);

    time::validate_range_span(data_inicio, data_fim, MAX_RANGE_DAYS)?;
    let (start, end) = time::date_range_utc(data_inicio, data_fim, tz)?;

    let summary =
        closing_repo::compute_summary(&state.pool, start, end, &state.config.counted_statuses)
            .await?;
    let mesas_abertas = closing_repo::open_tables(&state.pool).await?;

    Ok(Json(ConsolidatedResponse {
        data_inicio,
        data_fim,
        vendas_por_tipo: summary.vendas_por_tipo,
        vendas_por_pagamento: summary.vendas_por_pagamento,
        totais_gerais: TotaisGerais {
            total_pedidos: summary.total_pedidos,
            vendas_brutas: summary.vendas_brutas,
            descontos_totais: summary.descontos_totais,
            vendas_liquidas: summary.vendas_liquidas,
            taxas_entrega: summary.taxas_entrega,
        },
        mesas_abertas,
    }))
}

#[derive(Debug, Serialize)]
pub struct OpenTablesResponse {
    pub mesas: Vec<OpenTable>,
}

/// GET /api/dashboard/mesas-tempo-real
pub async fn open_tables(State(state): State<ServerState>) -> AppResult<Json<OpenTablesResponse>> {
    let mesas = closing_repo::open_tables(&state.pool).await?;
    Ok(Json(OpenTablesResponse { mesas }))
}
