//! Dashboard routes
//!
//! Read-only aggregated views: today's figures, consolidated summaries over
//! a date range, and the live open-tables board. Everything goes through
//! the same aggregation queries the cash closing freezes, so preview and
//! snapshot can never disagree.

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/dashboard", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::overview))
        .route("/fechamento-consolidado", get(handler::consolidated))
        .route("/mesas-tempo-real", get(handler::open_tables))
}
