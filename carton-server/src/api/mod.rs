//! HTTP API
//!
//! One router module per resource, merged here.

pub mod addresses;
pub mod consignments;
pub mod documents;
pub mod health;
pub mod master_data;
pub mod scan;

use crate::core::ServerState;
use axum::Router;

pub fn router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(consignments::router())
        .merge(documents::router())
        .merge(scan::router())
        .merge(addresses::router())
        .merge(master_data::router())
}
