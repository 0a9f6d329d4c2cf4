//! Address book entries (senders and receivers)

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A sender or receiver address, keyed by its short code.
///
/// Receivers are scoped to a channel; senders use "All".
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct Address {
    #[validate(length(min = 1))]
    pub code: String,
    pub address1: String,
    #[serde(default)]
    pub address2: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    #[serde(default)]
    pub gst: String,
    /// Channel name or "All"
    pub channel: String,
}
