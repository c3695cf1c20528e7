//! Order status transition table
//!
//! One authoritative successor table instead of a generic state-machine
//! engine: the status set is small and fixed, and a flat table keeps the set
//! of valid transitions exhaustively enumerable in tests.
//!
//! ```text
//! pending → preparing → ready → out_for_delivery → delivered   (delivery)
//!                             → picked_up                      (mesa/balcao)
//! cancelled reachable from any non-terminal state
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order kind (`tipo_pedido`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "order_kind", rename_all = "snake_case")]
pub enum OrderKind {
    /// Dine-in, bound to a table number
    Mesa,
    Delivery,
    /// Counter pickup
    Balcao,
}

impl OrderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderKind::Mesa => "mesa",
            OrderKind::Delivery => "delivery",
            OrderKind::Balcao => "balcao",
        }
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment method (`forma_pagamento`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
pub enum PaymentMethod {
    Dinheiro,
    Cartao,
    Pix,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Dinheiro => "dinheiro",
            PaymentMethod::Cartao => "cartao",
            PaymentMethod::Pix => "pix",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order status (`status_pedido`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    OutForDelivery,
    Delivered,
    PickedUp,
    Cancelled,
}

impl OrderStatus {
    /// All statuses, in lifecycle order
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::PickedUp,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::PickedUp => "picked_up",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Allowed successor statuses. Terminal statuses have none.
    pub fn allowed_successors(&self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Pending => &[OrderStatus::Preparing, OrderStatus::Cancelled],
            OrderStatus::Preparing => &[OrderStatus::Ready, OrderStatus::Cancelled],
            OrderStatus::Ready => &[
                OrderStatus::OutForDelivery,
                OrderStatus::PickedUp,
                OrderStatus::Cancelled,
            ],
            OrderStatus::OutForDelivery => &[OrderStatus::Delivered, OrderStatus::Cancelled],
            OrderStatus::Delivered | OrderStatus::PickedUp | OrderStatus::Cancelled => &[],
        }
    }

    /// Whether `target` is a legal next status from `self`
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        self.allowed_successors().contains(&target)
    }

    /// Terminal statuses admit no further transitions
    pub fn is_terminal(&self) -> bool {
        self.allowed_successors().is_empty()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .iter()
            .copied()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| format!("Unknown order status: {}", s))
    }
}

/// Revenue counting policy: which terminal statuses enter sales totals.
///
/// Configurable (`COUNTED_STATUSES`) because the historical data this system
/// replaces was ambiguous about the counted set. Cancelled and in-progress
/// statuses are never accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountedStatuses(Vec<OrderStatus>);

impl CountedStatuses {
    /// Build from a validated status list.
    ///
    /// Rejects empty sets, non-terminal statuses and `cancelled`.
    pub fn new(statuses: Vec<OrderStatus>) -> Result<Self, String> {
        if statuses.is_empty() {
            return Err("Counted status set cannot be empty".to_string());
        }
        for st in &statuses {
            if *st == OrderStatus::Cancelled {
                return Err("Cancelled orders are never counted as revenue".to_string());
            }
            if !st.is_terminal() {
                return Err(format!("Status {} is not terminal and cannot be counted", st));
            }
        }
        Ok(Self(statuses))
    }

    /// Parse a comma-separated list, e.g. `"delivered,picked_up"`
    pub fn parse(list: &str) -> Result<Self, String> {
        let statuses = list
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(OrderStatus::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(statuses)
    }

    pub fn contains(&self, status: OrderStatus) -> bool {
        self.0.contains(&status)
    }

    pub fn as_slice(&self) -> &[OrderStatus] {
        &self.0
    }

    /// Owned copy for binding as a SQL array parameter
    pub fn to_vec(&self) -> Vec<OrderStatus> {
        self.0.clone()
    }
}

impl Default for CountedStatuses {
    fn default() -> Self {
        Self(vec![OrderStatus::Delivered, OrderStatus::PickedUp])
    }
}

/// Terminal statuses, for "open orders" exclusion queries
pub fn terminal_statuses() -> Vec<OrderStatus> {
    OrderStatus::ALL
        .iter()
        .copied()
        .filter(|s| s.is_terminal())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_path_is_valid() {
        let path = [
            OrderStatus::Pending,
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn counter_path_is_valid() {
        assert!(OrderStatus::Ready.can_transition_to(OrderStatus::PickedUp));
    }

    #[test]
    fn no_skipping() {
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::PickedUp));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Ready));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Preparing.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn no_reverting() {
        assert!(!OrderStatus::Preparing.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Ready.can_transition_to(OrderStatus::Preparing));
    }

    #[test]
    fn cancel_from_any_non_terminal() {
        for st in OrderStatus::ALL {
            if st.is_terminal() {
                assert!(!st.can_transition_to(OrderStatus::Cancelled), "{}", st);
            } else {
                assert!(st.can_transition_to(OrderStatus::Cancelled), "{}", st);
            }
        }
    }

    #[test]
    fn terminal_states_admit_nothing() {
        for terminal in [
            OrderStatus::Delivered,
            OrderStatus::PickedUp,
            OrderStatus::Cancelled,
        ] {
            assert!(terminal.is_terminal());
            for target in OrderStatus::ALL {
                assert!(!terminal.can_transition_to(target), "{} -> {}", terminal, target);
            }
        }
    }

    // Exhaustive check: the successor table contains exactly the edges of the
    // lifecycle graph, nothing else.
    #[test]
    fn transition_table_is_exact() {
        let expected: &[(OrderStatus, &[OrderStatus])] = &[
            (OrderStatus::Pending, &[OrderStatus::Preparing, OrderStatus::Cancelled]),
            (OrderStatus::Preparing, &[OrderStatus::Ready, OrderStatus::Cancelled]),
            (
                OrderStatus::Ready,
                &[
                    OrderStatus::OutForDelivery,
                    OrderStatus::PickedUp,
                    OrderStatus::Cancelled,
                ],
            ),
            (
                OrderStatus::OutForDelivery,
                &[OrderStatus::Delivered, OrderStatus::Cancelled],
            ),
            (OrderStatus::Delivered, &[]),
            (OrderStatus::PickedUp, &[]),
            (OrderStatus::Cancelled, &[]),
        ];
        for (from, successors) in expected {
            assert_eq!(from.allowed_successors(), *successors, "from {}", from);
        }
    }

    #[test]
    fn counted_statuses_default_and_parse() {
        let default = CountedStatuses::default();
        assert!(default.contains(OrderStatus::Delivered));
        assert!(default.contains(OrderStatus::PickedUp));
        assert!(!default.contains(OrderStatus::Cancelled));

        let parsed = CountedStatuses::parse("delivered,picked_up").unwrap();
        assert_eq!(parsed, default);

        let only_delivered = CountedStatuses::parse("delivered").unwrap();
        assert!(!only_delivered.contains(OrderStatus::PickedUp));
    }

    #[test]
    fn counted_statuses_rejects_bad_sets() {
        assert!(CountedStatuses::parse("").is_err());
        assert!(CountedStatuses::parse("cancelled").is_err());
        assert!(CountedStatuses::parse("pending").is_err());
        assert!(CountedStatuses::parse("delivered,bogus").is_err());
    }

    #[test]
    fn status_round_trips_through_str() {
        for st in OrderStatus::ALL {
            assert_eq!(st.as_str().parse::<OrderStatus>().unwrap(), st);
        }
    }
}
