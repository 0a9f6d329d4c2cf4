//! Application services

pub mod master_sync;

pub use master_sync::{MasterSyncService, SyncError, parse_master_csv};
