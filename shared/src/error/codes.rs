//! Unified error codes for the Carton warehouse manager
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Consignment errors
//! - 5xxx: Master data errors
//! - 6xxx: Document errors
//! - 7xxx: Print errors
//! - 8xxx: Address book errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 4xxx: Consignment ====================
    /// Consignment not found
    ConsignmentNotFound = 4001,
    /// Consignment id already exists
    ConsignmentIdExists = 4002,
    /// Consignment expands to zero boxes
    ConsignmentEmpty = 4003,

    // ==================== 5xxx: Master Data ====================
    /// Uploaded SKU is missing from master data
    SkuNotInMaster = 5001,
    /// Master data store is empty (sync required)
    MasterDataEmpty = 5002,
    /// Master data sync failed
    MasterSyncFailed = 5003,
    /// Required master data column missing
    MasterColumnMissing = 5004,

    // ==================== 6xxx: Documents ====================
    /// No carrier label document uploaded
    CarrierDocumentMissing = 6001,
    /// Merged label document not built yet
    MergedDocumentMissing = 6002,
    /// Merged label document is stale (line items changed since build)
    DocumentStale = 6003,
    /// Requested page is beyond the document's page count
    PageOutOfRange = 6004,
    /// Document rendering failed
    DocumentRenderFailed = 6005,
    /// File storage failed
    FileStorageFailed = 6006,
    /// No file provided in request
    NoFileProvided = 6007,
    /// Empty file provided
    EmptyFile = 6008,
    /// Unsupported file format
    UnsupportedFileFormat = 6009,

    // ==================== 7xxx: Print ====================
    /// Print submission failed
    PrintFailed = 7001,
    /// Printer is not available
    PrinterNotAvailable = 7002,
    /// Print submission timed out
    PrintTimeout = 7003,

    // ==================== 8xxx: Address Book ====================
    /// Address not found
    AddressNotFound = 8001,
    /// Address code already exists
    AddressCodeExists = 8002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Consignment
            ErrorCode::ConsignmentNotFound => "Consignment not found",
            ErrorCode::ConsignmentIdExists => "Consignment id already exists",
            ErrorCode::ConsignmentEmpty => "Consignment expands to zero boxes",

            // Master data
            ErrorCode::SkuNotInMaster => "SKU is missing from master data",
            ErrorCode::MasterDataEmpty => "Master data is empty, sync required",
            ErrorCode::MasterSyncFailed => "Master data sync failed",
            ErrorCode::MasterColumnMissing => "Required master data column is missing",

            // Documents
            ErrorCode::CarrierDocumentMissing => "No carrier label document uploaded",
            ErrorCode::MergedDocumentMissing => "Merged label document has not been built",
            ErrorCode::DocumentStale => "Merged label document is stale, rebuild required",
            ErrorCode::PageOutOfRange => "Page is beyond the document's page count",
            ErrorCode::DocumentRenderFailed => "Document rendering failed",
            ErrorCode::FileStorageFailed => "File storage failed",
            ErrorCode::NoFileProvided => "No file provided",
            ErrorCode::EmptyFile => "Empty file provided",
            ErrorCode::UnsupportedFileFormat => "Unsupported file format",

            // Print
            ErrorCode::PrintFailed => "Print submission failed",
            ErrorCode::PrinterNotAvailable => "Printer is not available",
            ErrorCode::PrintTimeout => "Print submission timed out",

            // Address book
            ErrorCode::AddressNotFound => "Address not found",
            ErrorCode::AddressCodeExists => "Address code already exists",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Consignment
            4001 => Ok(ErrorCode::ConsignmentNotFound),
            4002 => Ok(ErrorCode::ConsignmentIdExists),
            4003 => Ok(ErrorCode::ConsignmentEmpty),

            // Master data
            5001 => Ok(ErrorCode::SkuNotInMaster),
            5002 => Ok(ErrorCode::MasterDataEmpty),
            5003 => Ok(ErrorCode::MasterSyncFailed),
            5004 => Ok(ErrorCode::MasterColumnMissing),

            // Documents
            6001 => Ok(ErrorCode::CarrierDocumentMissing),
            6002 => Ok(ErrorCode::MergedDocumentMissing),
            6003 => Ok(ErrorCode::DocumentStale),
            6004 => Ok(ErrorCode::PageOutOfRange),
            6005 => Ok(ErrorCode::DocumentRenderFailed),
            6006 => Ok(ErrorCode::FileStorageFailed),
            6007 => Ok(ErrorCode::NoFileProvided),
            6008 => Ok(ErrorCode::EmptyFile),
            6009 => Ok(ErrorCode::UnsupportedFileFormat),

            // Print
            7001 => Ok(ErrorCode::PrintFailed),
            7002 => Ok(ErrorCode::PrinterNotAvailable),
            7003 => Ok(ErrorCode::PrintTimeout),

            // Address book
            8001 => Ok(ErrorCode::AddressNotFound),
            8002 => Ok(ErrorCode::AddressCodeExists),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::ConsignmentNotFound.code(), 4001);
        assert_eq!(ErrorCode::SkuNotInMaster.code(), 5001);
        assert_eq!(ErrorCode::CarrierDocumentMissing.code(), 6001);
        assert_eq!(ErrorCode::PageOutOfRange.code(), 6004);
        assert_eq!(ErrorCode::PrintFailed.code(), 7001);
        assert_eq!(ErrorCode::AddressNotFound.code(), 8001);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::Unknown.is_success());
        assert!(!ErrorCode::NotFound.is_success());
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(0), Ok(ErrorCode::Success));
        assert_eq!(ErrorCode::try_from(4001), Ok(ErrorCode::ConsignmentNotFound));
        assert_eq!(ErrorCode::try_from(6003), Ok(ErrorCode::DocumentStale));
        assert_eq!(ErrorCode::try_from(9001), Ok(ErrorCode::InternalError));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(10000), Err(InvalidErrorCode(10000)));
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&ErrorCode::NotFound).unwrap();
        assert_eq!(json, "3");

        let json = serde_json::to_string(&ErrorCode::ConsignmentNotFound).unwrap();
        assert_eq!(json, "4001");
    }

    #[test]
    fn test_deserialize() {
        let code: ErrorCode = serde_json::from_str("3").unwrap();
        assert_eq!(code, ErrorCode::NotFound);

        let code: ErrorCode = serde_json::from_str("6004").unwrap();
        assert_eq!(code, ErrorCode::PageOutOfRange);
    }

    #[test]
    fn test_deserialize_invalid() {
        let result: Result<ErrorCode, _> = serde_json::from_str("999");
        assert!(result.is_err());
    }

    #[test]
    fn test_roundtrip() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::ConsignmentNotFound,
            ErrorCode::DocumentStale,
            ErrorCode::PrintFailed,
            ErrorCode::InternalError,
        ];

        for code in codes {
            let json = serde_json::to_string(&code).unwrap();
            let parsed: ErrorCode = serde_json::from_str(&json).unwrap();
            assert_eq!(code, parsed);
        }
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::NotFound.message(), "Resource not found");
        assert_eq!(
            ErrorCode::DocumentStale.message(),
            "Merged label document is stale, rebuild required"
        );
    }
}
