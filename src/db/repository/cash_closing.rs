//! Daily reconciliation repository
//!
//! On-demand sales summaries, the idempotent cash closing, and the
//! open-tables view. All date bounds arrive here already converted to
//! absolute UTC instants; bucketing uses `COALESCE(data_pedido, created_at)`
//! so legacy rows without a placement instant still count.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{RepoError, RepoResult, is_unique_violation};
use crate::db::models::{CashClosing, DailySummary, KindBreakdown, OpenTable, PaymentBreakdown};
use crate::orders::{CountedStatuses, terminal_statuses};

const CLOSING_COLUMNS: &str = "id, data_fechamento, total_pedidos, vendas_brutas, \
     descontos_totais, vendas_liquidas, taxas_entrega, vendas_por_tipo, \
     vendas_por_pagamento, observacoes, fechado_por, fechado_em";

#[derive(sqlx::FromRow)]
struct TotalsRow {
    total_pedidos: i64,
    vendas_brutas: f64,
    descontos_totais: f64,
    taxas_entrega: f64,
}

/// Shape aggregate rows into a summary. `vendas_liquidas` is derived here,
/// in one place, as gross minus discounts.
fn build_summary(
    totals: TotalsRow,
    vendas_por_tipo: Vec<KindBreakdown>,
    vendas_por_pagamento: Vec<PaymentBreakdown>,
) -> DailySummary {
    DailySummary {
        total_pedidos: totals.total_pedidos,
        vendas_brutas: totals.vendas_brutas,
        descontos_totais: totals.descontos_totais,
        vendas_liquidas: totals.vendas_brutas - totals.descontos_totais,
        taxas_entrega: totals.taxas_entrega,
        vendas_por_tipo,
        vendas_por_pagamento,
    }
}

/// Aggregate counted orders inside `[start, end)`.
///
/// Pure read: running it never writes anything, so it is safe to call any
/// number of times (dashboard previews reuse it before the day is closed).
pub async fn compute_summary(
    pool: &PgPool,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    counted: &CountedStatuses,
) -> RepoResult<DailySummary> {
    let statuses = counted.to_vec();

    // Stored total = items − discount + fee; gross backs the discount and
    // fee out so the three figures stay independently meaningful.
    let totals = sqlx::query_as::<_, TotalsRow>(
        "SELECT COUNT(*) AS total_pedidos, \
         COALESCE(SUM(total + desconto_aplicado - taxa_entrega), 0) AS vendas_brutas, \
         COALESCE(SUM(desconto_aplicado), 0) AS descontos_totais, \
         COALESCE(SUM(taxa_entrega), 0) AS taxas_entrega \
         FROM pedidos \
         WHERE COALESCE(data_pedido, created_at) >= $1 \
         AND COALESCE(data_pedido, created_at) < $2 \
         AND status_pedido = ANY($3)",
    )
    .bind(start)
    .bind(end)
    .bind(&statuses)
    .fetch_one(pool)
    .await?;

    let vendas_por_tipo = sqlx::query_as::<_, KindBreakdown>(
        "SELECT tipo_pedido, COUNT(*) AS quantidade, COALESCE(SUM(total), 0) AS total \
         FROM pedidos \
         WHERE COALESCE(data_pedido, created_at) >= $1 \
         AND COALESCE(data_pedido, created_at) < $2 \
         AND status_pedido = ANY($3) \
         GROUP BY tipo_pedido ORDER BY tipo_pedido",
    )
    .bind(start)
    .bind(end)
    .bind(&statuses)
    .fetch_all(pool)
    .await?;

    let vendas_por_pagamento = sqlx::query_as::<_, PaymentBreakdown>(
        "SELECT forma_pagamento, COUNT(*) AS quantidade, COALESCE(SUM(total), 0) AS total \
         FROM pedidos \
         WHERE COALESCE(data_pedido, created_at) >= $1 \
         AND COALESCE(data_pedido, created_at) < $2 \
         AND status_pedido = ANY($3) \
         GROUP BY forma_pagamento ORDER BY forma_pagamento",
    )
    .bind(start)
    .bind(end)
    .bind(&statuses)
    .fetch_all(pool)
    .await?;

    Ok(build_summary(totals, vendas_por_tipo, vendas_por_pagamento))
}

/// The INSERT race loser hits the UNIQUE(data_fechamento) constraint;
/// everything else stays a database error.
fn map_close_error(err: sqlx::Error, date: NaiveDate) -> RepoError {
    if is_unique_violation(&err) {
        RepoError::AlreadyClosed(format!("Day {} is already closed", date))
    } else {
        err.into()
    }
}

/// Freeze a day's summary into `fechamento_caixa`.
///
/// The UNIQUE constraint on `data_fechamento` is the concurrency guard: two
/// racing closings both compute, only one INSERT wins, the loser gets
/// `AlreadyClosed`. A day with zero counted orders closes fine (zeroed
/// snapshot).
pub async fn close_day(
    pool: &PgPool,
    date: NaiveDate,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    counted: &CountedStatuses,
    observacoes: Option<String>,
    operator: Option<String>,
) -> RepoResult<CashClosing> {
    let summary = compute_summary(pool, start, end, counted).await?;

    let closing = sqlx::query_as::<_, CashClosing>(&format!(
        "INSERT INTO fechamento_caixa (data_fechamento, total_pedidos, vendas_brutas, \
         descontos_totais, vendas_liquidas, taxas_entrega, vendas_por_tipo, \
         vendas_por_pagamento, observacoes, fechado_por) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING {CLOSING_COLUMNS}"
    ))
    .bind(date)
    .bind(summary.total_pedidos as i32)
    .bind(summary.vendas_brutas)
    .bind(summary.descontos_totais)
    .bind(summary.vendas_liquidas)
    .bind(summary.taxas_entrega)
    .bind(sqlx::types::Json(&summary.vendas_por_tipo))
    .bind(sqlx::types::Json(&summary.vendas_por_pagamento))
    .bind(&observacoes)
    .bind(&operator)
    .fetch_one(pool)
    .await
    .map_err(|e| map_close_error(e, date))?;

    Ok(closing)
}

pub async fn find_by_date(pool: &PgPool, date: NaiveDate) -> RepoResult<Option<CashClosing>> {
    let closing = sqlx::query_as::<_, CashClosing>(&format!(
        "SELECT {CLOSING_COLUMNS} FROM fechamento_caixa WHERE data_fechamento = $1"
    ))
    .bind(date)
    .fetch_optional(pool)
    .await?;
    Ok(closing)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> RepoResult<CashClosing> {
    sqlx::query_as::<_, CashClosing>(&format!(
        "SELECT {CLOSING_COLUMNS} FROM fechamento_caixa WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("Cash closing {} not found", id)))
}

/// Closings inside an inclusive date range, newest first
pub async fn find_all(
    pool: &PgPool,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> RepoResult<Vec<CashClosing>> {
    let closings = sqlx::query_as::<_, CashClosing>(&format!(
        "SELECT {CLOSING_COLUMNS} FROM fechamento_caixa \
         WHERE ($1::date IS NULL OR data_fechamento >= $1) \
         AND ($2::date IS NULL OR data_fechamento <= $2) \
         ORDER BY data_fechamento DESC"
    ))
    .bind(start_date)
    .bind(end_date)
    .fetch_all(pool)
    .await?;
    Ok(closings)
}

/// Dine-in orders still in flight, grouped by table
pub async fn open_tables(pool: &PgPool) -> RepoResult<Vec<OpenTable>> {
    let terminal = terminal_statuses();
    let tables = sqlx::query_as::<_, OpenTable>(
        "SELECT numero_mesa, COUNT(*) AS pedidos, COALESCE(SUM(total), 0) AS valor_pendente \
         FROM pedidos \
         WHERE tipo_pedido = 'mesa' AND NOT (status_pedido = ANY($1)) \
         GROUP BY numero_mesa ORDER BY numero_mesa",
    )
    .bind(&terminal)
    .fetch_all(pool)
    .await?;
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::{OrderKind, PaymentMethod};

    #[test]
    fn summary_shaping_from_rows() {
        let totals = TotalsRow {
            total_pedidos: 3,
            vendas_brutas: 120.0,
            descontos_totais: 10.0,
            taxas_entrega: 8.0,
        };
        let por_tipo = vec![
            KindBreakdown {
                tipo_pedido: OrderKind::Mesa,
                quantidade: 2,
                total: 70.0,
            },
            KindBreakdown {
                tipo_pedido: OrderKind::Delivery,
                quantidade: 1,
                total: 48.0,
            },
        ];
        let por_pagamento = vec![PaymentBreakdown {
            forma_pagamento: PaymentMethod::Pix,
            quantidade: 3,
            total: 118.0,
        }];

        let summary = build_summary(totals, por_tipo, por_pagamento);
        assert_eq!(summary.total_pedidos, 3);
        assert!((summary.vendas_liquidas - 110.0).abs() < f64::EPSILON);
        assert_eq!(summary.vendas_por_tipo.len(), 2);
        assert_eq!(summary.vendas_por_pagamento[0].quantidade, 3);
    }

    // Closing the same day twice: the second INSERT's unique violation must
    // surface as AlreadyClosed, while any other database failure stays a
    // database error.
    #[test]
    fn duplicate_close_maps_to_already_closed() {
        use crate::db::repository::test_util::db_error;

        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        let err = map_close_error(db_error(true), date);
        assert!(matches!(err, RepoError::AlreadyClosed(ref msg) if msg.contains("2024-01-01")));

        let err = map_close_error(db_error(false), date);
        assert!(matches!(err, RepoError::Database(_)));
    }

    #[test]
    fn empty_summary_is_all_zeros() {
        let summary = build_summary(
            TotalsRow {
                total_pedidos: 0,
                vendas_brutas: 0.0,
                descontos_totais: 0.0,
                taxas_entrega: 0.0,
            },
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(summary.total_pedidos, 0);
        assert_eq!(summary.vendas_liquidas, 0.0);
        assert!(summary.vendas_por_tipo.is_empty());
    }
}
