//! Cash closing models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::orders::{OrderKind, PaymentMethod};

/// Per-order-kind sales breakdown
///
/// `total` is the as-charged order total (after discount, delivery fee
/// included), so breakdown totals reconcile against
/// `vendas_liquidas + taxas_entrega`, not `vendas_brutas`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct KindBreakdown {
    pub tipo_pedido: OrderKind,
    pub quantidade: i64,
    pub total: f64,
}

/// Per-payment-method sales breakdown
///
/// `total` is as-charged, same convention as [`KindBreakdown`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PaymentBreakdown {
    pub forma_pagamento: PaymentMethod,
    pub quantidade: i64,
    pub total: f64,
}

/// Aggregated sales figures for a date range. Pure read, never persisted
/// by itself; `close_day` freezes one of these into `fechamento_caixa`.
///
/// Headline figures are item revenue: `vendas_brutas` before discounts and
/// delivery fees, `vendas_liquidas` after discounts. The breakdown vectors
/// use as-charged totals instead (see [`KindBreakdown`]); their sum equals
/// `vendas_liquidas + taxas_entrega`.
#[derive(Debug, Clone, Serialize)]
pub struct DailySummary {
    pub total_pedidos: i64,
    /// Item revenue before discounts and delivery fees
    pub vendas_brutas: f64,
    pub descontos_totais: f64,
    /// vendas_brutas − descontos_totais
    pub vendas_liquidas: f64,
    pub taxas_entrega: f64,
    pub vendas_por_tipo: Vec<KindBreakdown>,
    pub vendas_por_pagamento: Vec<PaymentBreakdown>,
}

/// Immutable daily snapshot row (`fechamento_caixa`)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CashClosing {
    pub id: Uuid,
    pub data_fechamento: NaiveDate,
    pub total_pedidos: i32,
    pub vendas_brutas: f64,
    pub descontos_totais: f64,
    pub vendas_liquidas: f64,
    pub taxas_entrega: f64,
    #[sqlx(json)]
    pub vendas_por_tipo: Vec<KindBreakdown>,
    #[sqlx(json)]
    pub vendas_por_pagamento: Vec<PaymentBreakdown>,
    pub observacoes: Option<String>,
    pub fechado_por: Option<String>,
    pub fechado_em: DateTime<Utc>,
}

/// One open dine-in table with its pending amount
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OpenTable {
    pub numero_mesa: i32,
    pub pedidos: i64,
    pub valor_pendente: f64,
}
