//! Cash closing routes
//!
//! | Path | Method | Notes |
//! |------|--------|-------|
//! | / | POST | close a day (default: today); 409 when already closed |
//! | / | GET | list closings in a date range |
//! | /current | GET | today's preview + `already_closed` flag |
//! | /{id} | GET | single closing |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cash-closing", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::close).get(handler::list))
        .route("/current", get(handler::current))
        .route("/{id}", get(handler::get_by_id))
}
