//! Order domain types
//!
//! The status transition table lives here; repositories and handlers consult
//! it instead of re-deriving validity rules.

pub mod status;

pub use status::{CountedStatuses, OrderKind, OrderStatus, PaymentMethod, terminal_statuses};
