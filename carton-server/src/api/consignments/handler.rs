//! Consignment API Handlers

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
};
use serde::Deserialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Channel, Consignment, ConsignmentSummary};

use crate::boxes;
use crate::core::ServerState;
use crate::reconcile;
use crate::storage::AddressBook;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub channel: Option<String>,
}

/// GET /api/consignments - list summaries, optionally filtered by channel
pub async fn list(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Vec<ConsignmentSummary>>> {
    let summaries = match params.channel.as_deref() {
        Some(raw) => {
            let channel: Channel = raw
                .parse()
                .map_err(|e: String| AppError::invalid_request(e))?;
            state
                .storage
                .list_by_channel(channel)
                .map_err(|e| AppError::database(e.to_string()))?
        }
        None => state
            .storage
            .list_consignments()
            .map_err(|e| AppError::database(e.to_string()))?,
    };

    Ok(Json(summaries))
}

/// GET /api/consignments/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Consignment>> {
    let consignment = load(&state, &id)?;
    Ok(Json(consignment))
}

/// POST /api/consignments - create from a multipart upload
///
/// Fields: `id`, `date` (yyyy-mm-dd), `channel`, `sender`, `receiver`
/// (address codes), and `file` (the shipment CSV). Reconciliation is the
/// hard validation gate: any SKU missing from master data rejects the
/// whole upload and nothing is stored.
pub async fn create(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> AppResult<Json<Consignment>> {
    let mut id = None;
    let mut date = None;
    let mut channel = None;
    let mut sender_code = None;
    let mut receiver_code = None;
    let mut csv_bytes = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::invalid_request(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "id" => id = Some(read_text(field).await?),
            "date" => date = Some(read_text(field).await?),
            "channel" => channel = Some(read_text(field).await?),
            "sender" => sender_code = Some(read_text(field).await?),
            "receiver" => receiver_code = Some(read_text(field).await?),
            "file" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::invalid_request(e.to_string()))?;
                csv_bytes = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    let id = required(id, "id")?;
    validate_id(&id)?;
    let date: chrono::NaiveDate = required(date, "date")?
        .parse()
        .map_err(|_| AppError::invalid_request("date must be yyyy-mm-dd"))?;
    let channel: Channel = required(channel, "channel")?
        .parse()
        .map_err(|e: String| AppError::invalid_request(e))?;
    let sender_code = required(sender_code, "sender")?;
    let receiver_code = required(receiver_code, "receiver")?;
    let csv_bytes = csv_bytes.ok_or_else(|| AppError::new(ErrorCode::NoFileProvided))?;
    if csv_bytes.is_empty() {
        return Err(AppError::new(ErrorCode::EmptyFile));
    }

    if state
        .storage
        .get_consignment(&id)
        .map_err(|e| AppError::database(e.to_string()))?
        .is_some()
    {
        return Err(AppError::with_message(
            ErrorCode::ConsignmentIdExists,
            format!("Consignment {} already exists", id),
        ));
    }

    let sender = state
        .storage
        .get_address(AddressBook::Senders, &sender_code)
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| address_not_found("Sender", &sender_code))?;
    let receiver = state
        .storage
        .get_address(AddressBook::Receivers, &receiver_code)
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| address_not_found("Receiver", &receiver_code))?;

    let master = state
        .storage
        .master_map()
        .map_err(|e| AppError::database(e.to_string()))?;
    let reconciled = reconcile::reconcile_csv(&csv_bytes, &master)?;

    let consignment = Consignment {
        id: id.clone(),
        date,
        channel,
        line_items: reconciled.line_items,
        original_csv: String::from_utf8_lossy(&csv_bytes).into_owned(),
        sender,
        receiver,
        printed_boxes: Default::default(),
        created_at: chrono::Utc::now().timestamp(),
    };

    state
        .storage
        .put_consignment(&consignment)
        .map_err(|e| AppError::database(e.to_string()))?;

    tracing::info!(
        consignment_id = %id,
        channel = %channel,
        items = consignment.line_items.len(),
        boxes = consignment.total_boxes(),
        "consignment created"
    );

    Ok(Json(consignment))
}

#[derive(Debug, Deserialize)]
pub struct ItemQtyUpdate {
    pub sku_id: String,
    pub editable_qty: u32,
}

/// PATCH /api/consignments/{id}/items - edit shipped quantities
///
/// Any edit that changes the expansion invalidates the printed state: the
/// printed set is reset, the merged document dropped, and the scan session
/// discarded. Box numbers on already-printed physical boxes cannot be
/// trusted once the numbering shifts.
pub async fn update_items(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(updates): Json<Vec<ItemQtyUpdate>>,
) -> AppResult<Json<Consignment>> {
    let mut consignment = load(&state, &id)?;
    let fingerprint_before = boxes::table_fingerprint(&consignment.line_items);

    for update in &updates {
        let item = consignment
            .line_items
            .iter_mut()
            .find(|i| i.sku_id == update.sku_id)
            .ok_or_else(|| {
                AppError::not_found(format!("Line item {}", update.sku_id))
            })?;

        item.editable_qty = update.editable_qty;
        item.editable_boxes =
            reconcile::round_boxes(update.editable_qty as f64 / item.units_per_carton);
    }

    let fingerprint_after = boxes::table_fingerprint(&consignment.line_items);
    if fingerprint_before != fingerprint_after {
        let printed = consignment.printed_boxes.len();
        consignment.printed_boxes.clear();
        state
            .documents
            .delete_merged(&id)
            .map_err(|e| AppError::internal(e.to_string()))?;
        state.scan_print.invalidate_session(&id);

        tracing::info!(
            consignment_id = %id,
            printed_boxes_reset = printed,
            "box counts changed; merged document and printed state invalidated"
        );
    }

    state
        .storage
        .put_consignment(&consignment)
        .map_err(|e| AppError::database(e.to_string()))?;

    Ok(Json(consignment))
}

/// DELETE /api/consignments/{id} - hard delete
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    // Ensure it exists so deletes of unknown ids 404
    let _ = load(&state, &id)?;

    state
        .storage
        .delete_consignment(&id)
        .map_err(|e| AppError::database(e.to_string()))?;
    state
        .documents
        .delete_all(&id)
        .map_err(|e| AppError::internal(e.to_string()))?;
    state.scan_print.invalidate_session(&id);

    tracing::info!(consignment_id = %id, "consignment deleted");
    Ok(Json(true))
}

// ========== Helpers ==========

fn load(state: &ServerState, id: &str) -> AppResult<Consignment> {
    state
        .storage
        .get_consignment(id)
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::ConsignmentNotFound,
                format!("Consignment {} not found", id),
            )
        })
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map(|s| s.trim().to_string())
        .map_err(|e| AppError::invalid_request(e.to_string()))
}

fn required(value: Option<String>, name: &str) -> AppResult<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::with_message(
            ErrorCode::RequiredField,
            format!("Field '{}' is required", name),
        )),
    }
}

/// Consignment ids become directory names; keep them filesystem-safe
fn validate_id(id: &str) -> AppResult<()> {
    let ok = !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(AppError::invalid_request(
            "Consignment id must be alphanumeric with '-' or '_'",
        ))
    }
}

fn address_not_found(kind: &str, code: &str) -> AppError {
    AppError::with_message(
        ErrorCode::AddressNotFound,
        format!("{} address {} not found", kind, code),
    )
}
