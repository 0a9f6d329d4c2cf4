//! Document API module (carrier upload, merged build, downloads)

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/api/consignments/{id}/carrier",
            post(handler::upload_carrier),
        )
        .route(
            "/api/consignments/{id}/documents/rebuild",
            post(handler::rebuild),
        )
        .route(
            "/api/consignments/{id}/documents/{kind}",
            get(handler::download),
        )
}
