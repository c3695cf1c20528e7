//! Order routes
//!
//! | Path | Method | Notes |
//! |------|--------|-------|
//! | / | POST | create (201, degrade warnings in body) |
//! | / | GET | list with filters, newest first |
//! | /{id} | GET | with items |
//! | /{id}/status | PATCH | guarded transition |

mod handler;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create).get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/status", patch(handler::update_status))
}
