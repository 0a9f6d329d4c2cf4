//! Box Expansion Module
//!
//! Deterministically expands a reconciled line-item table into the ordered
//! list of physical boxes. Every consumer of box numbers (scan table,
//! compositor, document generators) goes through [`expand`], which is what
//! keeps box numbering consistent across all of them.

pub mod expander;

pub use expander::{BoxRecord, expand, table_fingerprint, total_boxes};
