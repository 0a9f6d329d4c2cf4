//! Master data API module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/master-data", get(handler::summary))
        .route("/api/master-data/sync", post(handler::sync))
        .route("/api/master-data/{sku}", get(handler::lookup))
}
