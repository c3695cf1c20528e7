//! Order API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::ServerState;
use crate::db::models::{CreateOrder, Order, OrderFilters, OrderWithItems};
use crate::db::repository::order as order_repo;
use crate::orders::OrderStatus;
use crate::utils::{AppError, AppResult, time};

const RESOURCE: &str = "order";

/// Created order plus any degrade warnings
#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    #[serde(flatten)]
    pub pedido: OrderWithItems,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub avisos: Vec<String>,
}

/// POST /api/orders
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CreateOrder>,
) -> AppResult<(StatusCode, Json<CreateOrderResponse>)> {
    let (pedido, avisos) = order_repo::create(&state.pool, payload).await?;

    state.notify(
        RESOURCE,
        "created",
        &pedido.order.id.to_string(),
        Some(&pedido.order),
    );

    Ok((StatusCode::CREATED, Json(CreateOrderResponse { pedido, avisos })))
}

/// Query params for listing orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub data_inicio: Option<String>,
    pub data_fim: Option<String>,
    pub cliente_id: Option<Uuid>,
}

/// GET /api/orders
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<OrderWithItems>>> {
    let status = query
        .status
        .as_deref()
        .map(|s| s.parse::<OrderStatus>().map_err(AppError::validation))
        .transpose()?;

    let tz = state.config.timezone;
    let start = query
        .data_inicio
        .as_deref()
        .map(|d| time::parse_date(d).map(|date| time::day_start_utc(date, tz)))
        .transpose()?;
    let end = query
        .data_fim
        .as_deref()
        .map(|d| time::parse_date(d).map(|date| time::day_end_utc(date, tz)))
        .transpose()?;
    if let (Some(start), Some(end)) = (start, end) {
        if end <= start {
            return Err(AppError::validation("data_fim precedes data_inicio"));
        }
    }

    let filters = OrderFilters {
        status,
        start,
        end,
        cliente_id: query.cliente_id,
    };

    let orders = order_repo::find_all(&state.pool, filters).await?;
    Ok(Json(orders))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<OrderWithItems>> {
    let order = order_repo::find_by_id(&state.pool, id).await?;
    Ok(Json(order))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status_pedido: OrderStatus,
    /// Optimistic concurrency token; when present the transition fails with
    /// 409 if the order moved since the client last read it
    pub version: Option<i32>,
}

/// PATCH /api/orders/{id}/status
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<Order>> {
    let order =
        order_repo::transition(&state.pool, id, payload.status_pedido, payload.version).await?;

    state.notify(RESOURCE, "status_changed", &order.id.to_string(), Some(&order));

    Ok(Json(order))
}
