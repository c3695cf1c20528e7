//! Order repository
//!
//! Order creation (single transaction for the order row and all item rows),
//! reads, filtered listing, and the guarded status transition.

use std::collections::HashMap;

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{RepoError, RepoResult};
use crate::db::models::{CreateOrder, Order, OrderFilters, OrderItem, OrderWithItems};
use crate::orders::{OrderKind, OrderStatus};

/// Caller totals within one cent of the recomputed value are accepted as-is
pub const TOTAL_TOLERANCE: f64 = 0.01;

const ORDER_COLUMNS: &str = "id, tipo_pedido, numero_mesa, status_pedido, total, \
     desconto_aplicado, taxa_entrega, forma_pagamento, endereco_entrega, cliente_id, \
     observacoes, data_pedido, version, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, pedido_id, produto_id, sabor_registrado, \
     tamanho_registrado, quantidade, valor_unitario, created_at";

/// Σ(qty × unit price) − discount + delivery fee
pub fn recompute_total(
    items: &[crate::db::models::CreateOrderItem],
    desconto: f64,
    taxa_entrega: f64,
) -> f64 {
    let subtotal: f64 = items
        .iter()
        .map(|i| i.quantidade as f64 * i.valor_unitario)
        .sum();
    subtotal - desconto + taxa_entrega
}

fn validate_draft(data: &CreateOrder) -> RepoResult<()> {
    if data.itens.is_empty() {
        return Err(RepoError::Validation(
            "Order must have at least one item".into(),
        ));
    }
    for (idx, item) in data.itens.iter().enumerate() {
        if item.quantidade <= 0 {
            return Err(RepoError::Validation(format!(
                "Item {}: quantidade must be positive",
                idx
            )));
        }
        if item.valor_unitario < 0.0 {
            return Err(RepoError::Validation(format!(
                "Item {}: valor_unitario cannot be negative",
                idx
            )));
        }
    }
    if data.desconto_aplicado < 0.0 {
        return Err(RepoError::Validation("desconto_aplicado cannot be negative".into()));
    }
    if data.taxa_entrega < 0.0 {
        return Err(RepoError::Validation("taxa_entrega cannot be negative".into()));
    }

    // numero_mesa iff dine-in, endereco_entrega iff delivery
    match data.tipo_pedido {
        OrderKind::Mesa => {
            if data.numero_mesa.is_none() {
                return Err(RepoError::Validation(
                    "numero_mesa is required for mesa orders".into(),
                ));
            }
        }
        OrderKind::Delivery | OrderKind::Balcao => {
            if data.numero_mesa.is_some() {
                return Err(RepoError::Validation(format!(
                    "numero_mesa is not allowed for {} orders",
                    data.tipo_pedido
                )));
            }
        }
    }
    match data.tipo_pedido {
        OrderKind::Delivery => {
            if data.endereco_entrega.as_deref().unwrap_or("").trim().is_empty() {
                return Err(RepoError::Validation(
                    "endereco_entrega is required for delivery orders".into(),
                ));
            }
        }
        OrderKind::Mesa | OrderKind::Balcao => {
            if data.endereco_entrega.is_some() {
                return Err(RepoError::Validation(format!(
                    "endereco_entrega is not allowed for {} orders",
                    data.tipo_pedido
                )));
            }
        }
    }
    Ok(())
}

/// Create an order with its items.
///
/// The total is always recomputed server-side; a caller total off by more
/// than [`TOTAL_TOLERANCE`] is overwritten, not rejected. Unknown
/// `produto_id` references degrade to NULL. Both cases are reported back as
/// warnings alongside the created order.
pub async fn create(
    pool: &PgPool,
    data: CreateOrder,
) -> RepoResult<(OrderWithItems, Vec<String>)> {
    validate_draft(&data)?;

    let mut warnings = Vec::new();

    let computed = recompute_total(&data.itens, data.desconto_aplicado, data.taxa_entrega);
    if computed < 0.0 {
        return Err(RepoError::Validation(format!(
            "Discount exceeds order value (computed total {:.2})",
            computed
        )));
    }
    if let Some(caller_total) = data.total {
        if (caller_total - computed).abs() > TOTAL_TOLERANCE {
            tracing::warn!(
                caller_total,
                computed,
                "Caller total diverges, using recomputed value"
            );
            warnings.push(format!(
                "total informado ({:.2}) difere do calculado ({:.2}); valor calculado foi usado",
                caller_total, computed
            ));
        }
    }

    let mut tx = pool.begin().await?;

    let order = sqlx::query_as::<_, Order>(&format!(
        "INSERT INTO pedidos (tipo_pedido, numero_mesa, total, desconto_aplicado, \
         taxa_entrega, forma_pagamento, endereco_entrega, cliente_id, observacoes, data_pedido) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, COALESCE($10, now())) \
         RETURNING {ORDER_COLUMNS}"
    ))
    .bind(data.tipo_pedido)
    .bind(data.numero_mesa)
    .bind(computed)
    .bind(data.desconto_aplicado)
    .bind(data.taxa_entrega)
    .bind(data.forma_pagamento)
    .bind(&data.endereco_entrega)
    .bind(data.cliente_id)
    .bind(&data.observacoes)
    .bind(data.data_pedido)
    .fetch_one(&mut *tx)
    .await?;

    let mut itens = Vec::with_capacity(data.itens.len());
    for (idx, item) in data.itens.iter().enumerate() {
        let produto_id = match item.produto_id {
            Some(pid) => {
                let exists: bool =
                    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM produtos WHERE id = $1)")
                        .bind(pid)
                        .fetch_one(&mut *tx)
                        .await?;
                if exists {
                    Some(pid)
                } else {
                    tracing::warn!(%pid, item = idx, "Unknown produto_id, storing NULL");
                    warnings.push(format!(
                        "item {}: produto {} não encontrado; referência gravada como nula",
                        idx, pid
                    ));
                    None
                }
            }
            None => None,
        };

        let row = sqlx::query_as::<_, OrderItem>(&format!(
            "INSERT INTO itens_pedido (pedido_id, produto_id, sabor_registrado, \
             tamanho_registrado, quantidade, valor_unitario) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {ITEM_COLUMNS}"
        ))
        .bind(order.id)
        .bind(produto_id)
        .bind(&item.sabor_registrado)
        .bind(&item.tamanho_registrado)
        .bind(item.quantidade)
        .bind(item.valor_unitario)
        .fetch_one(&mut *tx)
        .await?;
        itens.push(row);
    }

    tx.commit().await?;

    Ok((OrderWithItems { order, itens }, warnings))
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> RepoResult<OrderWithItems> {
    let order = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM pedidos WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))?;

    let itens = sqlx::query_as::<_, OrderItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM itens_pedido WHERE pedido_id = $1 ORDER BY created_at"
    ))
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(OrderWithItems { order, itens })
}

/// Filtered listing, newest first. Date filters apply to
/// `COALESCE(data_pedido, created_at)` so legacy rows without a placement
/// instant still land in the right bucket.
pub async fn find_all(pool: &PgPool, filters: OrderFilters) -> RepoResult<Vec<OrderWithItems>> {
    let mut qb = QueryBuilder::<Postgres>::new(format!(
        "SELECT {ORDER_COLUMNS} FROM pedidos WHERE TRUE"
    ));
    if let Some(status) = filters.status {
        qb.push(" AND status_pedido = ").push_bind(status);
    }
    if let Some(start) = filters.start {
        qb.push(" AND COALESCE(data_pedido, created_at) >= ").push_bind(start);
    }
    if let Some(end) = filters.end {
        qb.push(" AND COALESCE(data_pedido, created_at) < ").push_bind(end);
    }
    if let Some(cliente_id) = filters.cliente_id {
        qb.push(" AND cliente_id = ").push_bind(cliente_id);
    }
    qb.push(" ORDER BY COALESCE(data_pedido, created_at) DESC");

    let orders: Vec<Order> = qb.build_query_as().fetch_all(pool).await?;
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    // Batch-fetch items for all orders in one round trip
    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let all_items = sqlx::query_as::<_, OrderItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM itens_pedido WHERE pedido_id = ANY($1) ORDER BY created_at"
    ))
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    for item in all_items {
        by_order.entry(item.pedido_id).or_default().push(item);
    }

    Ok(orders
        .into_iter()
        .map(|order| {
            let itens = by_order.remove(&order.id).unwrap_or_default();
            OrderWithItems { order, itens }
        })
        .collect())
}

/// Orders not yet in a terminal status, any kind
pub async fn count_open(pool: &PgPool) -> RepoResult<i64> {
    let terminal = crate::orders::terminal_statuses();
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM pedidos WHERE NOT (status_pedido = ANY($1))")
            .bind(&terminal)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// Apply a status transition.
///
/// The UPDATE is guarded on both the current status and the current version,
/// so a concurrent writer makes it affect zero rows instead of clobbering.
/// When the caller supplies `expected_version`, a stale value fails fast
/// with `Conflict` before touching the row.
pub async fn transition(
    pool: &PgPool,
    id: Uuid,
    target: OrderStatus,
    expected_version: Option<i32>,
) -> RepoResult<Order> {
    let current = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM pedidos WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))?;

    if !current.status_pedido.can_transition_to(target) {
        let allowed: Vec<&str> = current
            .status_pedido
            .allowed_successors()
            .iter()
            .map(|s| s.as_str())
            .collect();
        return Err(RepoError::InvalidTransition(format!(
            "Cannot go from {} to {} (allowed: [{}])",
            current.status_pedido,
            target,
            allowed.join(", ")
        )));
    }

    if let Some(expected) = expected_version {
        if expected != current.version {
            return Err(RepoError::Conflict(format!(
                "Order {} is at version {}, expected {}",
                id, current.version, expected
            )));
        }
    }

    let updated = sqlx::query_as::<_, Order>(&format!(
        "UPDATE pedidos SET status_pedido = $1, version = version + 1, updated_at = now() \
         WHERE id = $2 AND status_pedido = $3 AND version = $4 \
         RETURNING {ORDER_COLUMNS}"
    ))
    .bind(target)
    .bind(id)
    .bind(current.status_pedido)
    .bind(current.version)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| {
        RepoError::Conflict(format!("Order {} was modified concurrently", id))
    })?;

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::CreateOrderItem;
    use crate::orders::PaymentMethod;

    fn item(quantidade: i32, valor_unitario: f64) -> CreateOrderItem {
        CreateOrderItem {
            produto_id: None,
            sabor_registrado: Some("calabresa".into()),
            tamanho_registrado: Some("grande".into()),
            quantidade,
            valor_unitario,
        }
    }

    fn draft(tipo: OrderKind, itens: Vec<CreateOrderItem>) -> CreateOrder {
        CreateOrder {
            tipo_pedido: tipo,
            numero_mesa: (tipo == OrderKind::Mesa).then_some(5),
            forma_pagamento: PaymentMethod::Dinheiro,
            endereco_entrega: (tipo == OrderKind::Delivery).then(|| "Rua A, 123".into()),
            cliente_id: None,
            observacoes: None,
            desconto_aplicado: 0.0,
            taxa_entrega: 0.0,
            total: None,
            data_pedido: None,
            itens,
        }
    }

    // 2 × R$10 + 1 × R$15 = R$35
    #[test]
    fn total_recomputation() {
        let items = vec![item(2, 10.0), item(1, 15.0)];
        assert!((recompute_total(&items, 0.0, 0.0) - 35.0).abs() < f64::EPSILON);
        assert!((recompute_total(&items, 5.0, 8.0) - 38.0).abs() < f64::EPSILON);
    }

    #[test]
    fn caller_total_tolerance_is_one_cent() {
        let items = vec![item(3, 3.33)];
        let computed = recompute_total(&items, 0.0, 0.0);
        assert!((9.99 - computed).abs() <= TOTAL_TOLERANCE);
        assert!((10.05 - computed).abs() > TOTAL_TOLERANCE);
    }

    #[test]
    fn draft_validation_rules() {
        assert!(validate_draft(&draft(OrderKind::Balcao, vec![item(1, 10.0)])).is_ok());
        assert!(validate_draft(&draft(OrderKind::Mesa, vec![item(1, 10.0)])).is_ok());
        assert!(validate_draft(&draft(OrderKind::Delivery, vec![item(1, 10.0)])).is_ok());

        // empty items
        assert!(validate_draft(&draft(OrderKind::Balcao, vec![])).is_err());
        // non-positive quantity, negative price
        assert!(validate_draft(&draft(OrderKind::Balcao, vec![item(0, 10.0)])).is_err());
        assert!(validate_draft(&draft(OrderKind::Balcao, vec![item(1, -1.0)])).is_err());

        // mesa without table number
        let mut d = draft(OrderKind::Mesa, vec![item(1, 10.0)]);
        d.numero_mesa = None;
        assert!(validate_draft(&d).is_err());

        // table number on a counter order
        let mut d = draft(OrderKind::Balcao, vec![item(1, 10.0)]);
        d.numero_mesa = Some(3);
        assert!(validate_draft(&d).is_err());

        // delivery without address
        let mut d = draft(OrderKind::Delivery, vec![item(1, 10.0)]);
        d.endereco_entrega = None;
        assert!(validate_draft(&d).is_err());

        // address on a dine-in order
        let mut d = draft(OrderKind::Mesa, vec![item(1, 10.0)]);
        d.endereco_entrega = Some("Rua B, 456".into());
        assert!(validate_draft(&d).is_err());
    }
}
