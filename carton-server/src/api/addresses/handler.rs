//! Address book API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::Address;
use validator::Validate;

use crate::core::ServerState;
use crate::storage::AddressBook;

fn parse_book(raw: &str) -> AppResult<AddressBook> {
    match raw {
        "senders" => Ok(AddressBook::Senders),
        "receivers" => Ok(AddressBook::Receivers),
        other => Err(AppError::invalid_request(format!(
            "Unknown address book: {}",
            other
        ))),
    }
}

/// GET /api/addresses/{book}
pub async fn list(
    State(state): State<ServerState>,
    Path(book): Path<String>,
) -> AppResult<Json<Vec<Address>>> {
    let book = parse_book(&book)?;
    let addresses = state
        .storage
        .list_addresses(book)
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(addresses))
}

/// POST /api/addresses/{book} - add an address
pub async fn create(
    State(state): State<ServerState>,
    Path(book): Path<String>,
    Json(address): Json<Address>,
) -> AppResult<Json<Address>> {
    let book = parse_book(&book)?;
    address
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    if state
        .storage
        .get_address(book, &address.code)
        .map_err(|e| AppError::database(e.to_string()))?
        .is_some()
    {
        return Err(AppError::with_message(
            ErrorCode::AddressCodeExists,
            format!("Address {} already exists", address.code),
        ));
    }

    state
        .storage
        .upsert_address(book, &address)
        .map_err(|e| AppError::database(e.to_string()))?;

    Ok(Json(address))
}
