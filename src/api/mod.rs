//! API route modules
//!
//! | Module | Prefix | Auth |
//! |--------|--------|------|
//! | [`auth`] | `/api/auth` | login public |
//! | [`health`] | `/health` | public |
//! | [`orders`] | `/api/orders` | JWT |
//! | [`dashboard`] | `/api/dashboard` | JWT |
//! | [`cash_closing`] | `/api/cash-closing` | JWT |

pub mod auth;
pub mod cash_closing;
pub mod dashboard;
pub mod health;
pub mod orders;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};
