//! Master data API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use shared::error::{AppError, AppResult};
use shared::models::MasterRecord;

use crate::core::ServerState;

#[derive(Debug, Serialize)]
pub struct MasterSummary {
    pub records: u64,
}

/// GET /api/master-data - current record count
pub async fn summary(State(state): State<ServerState>) -> AppResult<Json<MasterSummary>> {
    let records = state
        .storage
        .master_count()
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(MasterSummary { records }))
}

/// GET /api/master-data/{sku} - single SKU lookup
pub async fn lookup(
    State(state): State<ServerState>,
    Path(sku): Path<String>,
) -> AppResult<Json<MasterRecord>> {
    let record = state
        .storage
        .get_master(&sku)
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("SKU {}", sku)))?;
    Ok(Json(record))
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub records: usize,
}

/// POST /api/master-data/sync - pull the remote CSV export
pub async fn sync(State(state): State<ServerState>) -> AppResult<Json<SyncResponse>> {
    let records = state.master_sync.sync().await?;
    Ok(Json(SyncResponse { records }))
}
