//! Scan & print API module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/consignments/{id}/scan", post(handler::scan))
        .route("/api/consignments/{id}/reprint", post(handler::reprint))
        .route("/api/consignments/{id}/boxes", get(handler::box_table))
        .route("/api/print-queue/next", get(handler::next_queued_page))
}
