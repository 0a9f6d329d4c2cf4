//! Document Generators
//!
//! Pure, stateless transforms of a reconciled consignment. Anything that
//! emits per-box rows goes through the box expander, never its own count.

pub mod confirm;
pub mod label_data;
pub mod manifest;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
}

impl From<GeneratorError> for shared::error::AppError {
    fn from(err: GeneratorError) -> Self {
        shared::error::AppError::with_message(
            shared::error::ErrorCode::DocumentRenderFailed,
            err.to_string(),
        )
    }
}

pub(crate) fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, GeneratorError> {
    writer
        .into_inner()
        .map_err(|e| GeneratorError::Io(e.into_error()))
}
