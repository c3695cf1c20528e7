//! Order models
//!
//! Column names follow the historical schema (`pedidos`, `itens_pedido`),
//! so the JSON wire shape keeps the Portuguese field names existing clients
//! already consume.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::orders::{OrderKind, OrderStatus, PaymentMethod};

/// Order row (`pedidos`)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: Uuid,
    pub tipo_pedido: OrderKind,
    /// Table number, set iff `tipo_pedido = mesa`
    pub numero_mesa: Option<i32>,
    pub status_pedido: OrderStatus,
    /// Σ(items qty × unit price) − desconto_aplicado + taxa_entrega
    pub total: f64,
    pub desconto_aplicado: f64,
    pub taxa_entrega: f64,
    pub forma_pagamento: PaymentMethod,
    /// Delivery address, only on delivery orders
    pub endereco_entrega: Option<String>,
    /// External customer reference (customer CRUD lives elsewhere)
    pub cliente_id: Option<Uuid>,
    pub observacoes: Option<String>,
    /// Placement instant; NULL on legacy rows, `created_at` is the fallback
    pub data_pedido: Option<DateTime<Utc>>,
    /// Bumped on every mutation; optimistic concurrency token
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Line item row (`itens_pedido`)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub pedido_id: Uuid,
    /// NULL when the referenced product no longer exists (degraded reference)
    pub produto_id: Option<Uuid>,
    /// Flavor as captured at order time, free text
    pub sabor_registrado: Option<String>,
    /// Size as captured at order time, free text
    pub tamanho_registrado: Option<String>,
    pub quantidade: i32,
    pub valor_unitario: f64,
    pub created_at: DateTime<Utc>,
}

/// Order with its line items, the read shape of the API
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub itens: Vec<OrderItem>,
}

/// Order creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrder {
    pub tipo_pedido: OrderKind,
    pub numero_mesa: Option<i32>,
    pub forma_pagamento: PaymentMethod,
    pub endereco_entrega: Option<String>,
    pub cliente_id: Option<Uuid>,
    pub observacoes: Option<String>,
    #[serde(default)]
    pub desconto_aplicado: f64,
    #[serde(default)]
    pub taxa_entrega: f64,
    /// Caller-supplied total; recomputed server-side, overwritten when they
    /// differ by more than one cent
    pub total: Option<f64>,
    pub data_pedido: Option<DateTime<Utc>>,
    pub itens: Vec<CreateOrderItem>,
}

/// Line item creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderItem {
    pub produto_id: Option<Uuid>,
    pub sabor_registrado: Option<String>,
    pub tamanho_registrado: Option<String>,
    pub quantidade: i32,
    pub valor_unitario: f64,
}

/// Listing filters, already converted to absolute UTC bounds
#[derive(Debug, Clone, Default)]
pub struct OrderFilters {
    pub status: Option<OrderStatus>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub cliente_id: Option<Uuid>,
}
