//! Pizzaria Server - order lifecycle and daily reconciliation backend
//!
//! # Module structure
//!
//! ```text
//! src/
//! ├── core/          # config, state, server
//! ├── auth/          # JWT authentication
//! ├── orders/        # status transition table
//! ├── db/            # pool, models, repositories
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # errors, logging, time helpers
//! ```
//!
//! Order mutations and the daily cash closing both go through the
//! repositories in `db::repository`; date bucketing always happens in the
//! configured business timezone (`Config::timezone`) so that an order placed
//! late in the evening local time never slips into the next calendar day.

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod orders;
pub mod utils;

// Re-export public types
pub use crate::auth::{CurrentUser, JwtService};
pub use crate::core::{Config, Server, ServerState};
pub use crate::db::DbService;
pub use crate::orders::{CountedStatuses, OrderKind, OrderStatus, PaymentMethod};
pub use crate::utils::{AppError, AppResult};
