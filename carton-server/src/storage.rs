//! redb-based storage for consignments, address books, and master data

use redb::{
    Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction,
};
use shared::models::{Address, Channel, Consignment, ConsignmentSummary, MasterRecord};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Consignments table: key = consignment_id, value = JSON
const CONSIGNMENTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("consignments");

/// Index: (channel, consignment_id) -> ()
const CONSIGNMENTS_BY_CHANNEL_TABLE: TableDefinition<(&str, &str), ()> =
    TableDefinition::new("consignments_by_channel");

/// Sender addresses: key = code, value = JSON
const SENDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("senders");

/// Receiver addresses: key = code, value = JSON
const RECEIVERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("receivers");

/// Master data: key = sku, value = JSON
const MASTER_DATA_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("master_data");

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Consignment not found: {0}")]
    ConsignmentNotFound(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Which address book a call targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressBook {
    Senders,
    Receivers,
}

impl AddressBook {
    fn table(&self) -> TableDefinition<'static, &'static str, &'static [u8]> {
        match self {
            AddressBook::Senders => SENDERS_TABLE,
            AddressBook::Receivers => RECEIVERS_TABLE,
        }
    }
}

/// Consignment storage
#[derive(Clone)]
pub struct ConsignmentStorage {
    db: Arc<Database>,
}

impl ConsignmentStorage {
    /// Open or create database
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        // Initialize tables
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CONSIGNMENTS_TABLE)?;
            let _ = write_txn.open_table(CONSIGNMENTS_BY_CHANNEL_TABLE)?;
            let _ = write_txn.open_table(SENDERS_TABLE)?;
            let _ = write_txn.open_table(RECEIVERS_TABLE)?;
            let _ = write_txn.open_table(MASTER_DATA_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Consignments ==========

    /// Store (insert or overwrite) a consignment
    pub fn put_consignment(&self, consignment: &Consignment) -> StorageResult<()> {
        let txn = self.begin_write()?;
        {
            let mut table = txn.open_table(CONSIGNMENTS_TABLE)?;
            let value = serde_json::to_vec(consignment)?;
            table.insert(consignment.id.as_str(), value.as_slice())?;

            let mut idx_table = txn.open_table(CONSIGNMENTS_BY_CHANNEL_TABLE)?;
            idx_table.insert(
                (consignment.channel.as_str(), consignment.id.as_str()),
                (),
            )?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Get a consignment by ID
    pub fn get_consignment(&self, id: &str) -> StorageResult<Option<Consignment>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CONSIGNMENTS_TABLE)?;

        match table.get(id)? {
            Some(guard) => {
                let consignment: Consignment = serde_json::from_slice(guard.value())?;
                Ok(Some(consignment))
            }
            None => Ok(None),
        }
    }

    /// List all consignments as summaries, newest first
    pub fn list_consignments(&self) -> StorageResult<Vec<ConsignmentSummary>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CONSIGNMENTS_TABLE)?;

        let mut rows = Vec::new();
        for result in table.iter()? {
            let (_, guard) = result?;
            let consignment: Consignment = serde_json::from_slice(guard.value())?;
            rows.push((consignment.created_at, consignment.summary()));
        }

        rows.sort_by_key(|(created_at, _)| std::cmp::Reverse(*created_at));
        Ok(rows.into_iter().map(|(_, summary)| summary).collect())
    }

    /// List consignments for one channel, newest first
    pub fn list_by_channel(&self, channel: Channel) -> StorageResult<Vec<ConsignmentSummary>> {
        let read_txn = self.db.begin_read()?;
        let idx_table = read_txn.open_table(CONSIGNMENTS_BY_CHANNEL_TABLE)?;
        let data_table = read_txn.open_table(CONSIGNMENTS_TABLE)?;

        let channel_key = channel.as_str();
        let range_start: (&str, &str) = (channel_key, "");
        let range_end: (&str, &str) = (channel_key, "\u{ffff}");

        let mut rows = Vec::new();
        for result in idx_table.range(range_start..=range_end)? {
            let (key, _) = result?;
            let (_, id) = key.value();
            if let Some(guard) = data_table.get(id)? {
                let consignment: Consignment = serde_json::from_slice(guard.value())?;
                rows.push((consignment.created_at, consignment.summary()));
            }
        }

        rows.sort_by_key(|(created_at, _)| std::cmp::Reverse(*created_at));
        Ok(rows.into_iter().map(|(_, summary)| summary).collect())
    }

    /// Hard-delete a consignment
    pub fn delete_consignment(&self, id: &str) -> StorageResult<()> {
        let txn = self.begin_write()?;
        {
            let mut table = txn.open_table(CONSIGNMENTS_TABLE)?;

            let channel = match table.remove(id)? {
                Some(guard) => {
                    let consignment: Consignment = serde_json::from_slice(guard.value())?;
                    Some(consignment.channel)
                }
                None => None,
            };

            if let Some(channel) = channel {
                let mut idx_table = txn.open_table(CONSIGNMENTS_BY_CHANNEL_TABLE)?;
                idx_table.remove((channel.as_str(), id))?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    // ========== Address books ==========

    /// Store an address keyed by its code
    pub fn upsert_address(&self, book: AddressBook, address: &Address) -> StorageResult<()> {
        let txn = self.begin_write()?;
        {
            let mut table = txn.open_table(book.table())?;
            let value = serde_json::to_vec(address)?;
            table.insert(address.code.as_str(), value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get_address(&self, book: AddressBook, code: &str) -> StorageResult<Option<Address>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(book.table())?;

        match table.get(code)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    pub fn list_addresses(&self, book: AddressBook) -> StorageResult<Vec<Address>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(book.table())?;

        let mut addresses = Vec::new();
        for result in table.iter()? {
            let (_, guard) = result?;
            addresses.push(serde_json::from_slice(guard.value())?);
        }
        Ok(addresses)
    }

    // ========== Master data ==========

    /// Replace the whole master data table in one transaction
    pub fn replace_master(&self, records: &[MasterRecord]) -> StorageResult<()> {
        let txn = self.begin_write()?;
        {
            txn.delete_table(MASTER_DATA_TABLE)?;
            let mut table = txn.open_table(MASTER_DATA_TABLE)?;
            for record in records {
                let value = serde_json::to_vec(record)?;
                table.insert(record.sku.as_str(), value.as_slice())?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get_master(&self, sku: &str) -> StorageResult<Option<MasterRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MASTER_DATA_TABLE)?;

        match table.get(sku)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Full master table keyed by SKU (reconciliation joins against this)
    pub fn master_map(&self) -> StorageResult<HashMap<String, MasterRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MASTER_DATA_TABLE)?;

        let mut map = HashMap::new();
        for result in table.iter()? {
            let (_, guard) = result?;
            let record: MasterRecord = serde_json::from_slice(guard.value())?;
            map.insert(record.sku.clone(), record);
        }
        Ok(map)
    }

    pub fn master_count(&self) -> StorageResult<u64> {
        use redb::ReadableTableMetadata;
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MASTER_DATA_TABLE)?;
        Ok(table.len()?)
    }
}

impl std::fmt::Debug for ConsignmentStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsignmentStorage").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::LineItem;
    use std::collections::BTreeSet;

    fn consignment(id: &str, channel: Channel) -> Consignment {
        Consignment {
            id: id.to_string(),
            date: chrono::NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
            channel,
            line_items: vec![LineItem {
                sku_id: "A".into(),
                product_name: "Shoe".into(),
                editable_qty: 20,
                units_per_carton: 5.0,
                editable_boxes: 4.0,
                fsn: None,
                ean: None,
            }],
            original_csv: "SKU Id,Quantity Sent\nA,20\n".into(),
            sender: Address::default(),
            receiver: Address::default(),
            printed_boxes: BTreeSet::new(),
            created_at: 100,
        }
    }

    #[test]
    fn test_consignment_crud() {
        let storage = ConsignmentStorage::open_in_memory().unwrap();

        storage
            .put_consignment(&consignment("C1", Channel::Flipkart))
            .unwrap();

        let loaded = storage.get_consignment("C1").unwrap().unwrap();
        assert_eq!(loaded.id, "C1");
        assert_eq!(loaded.total_boxes(), 4);

        storage.delete_consignment("C1").unwrap();
        assert!(storage.get_consignment("C1").unwrap().is_none());
        assert!(storage.list_by_channel(Channel::Flipkart).unwrap().is_empty());
    }

    #[test]
    fn test_printed_boxes_roundtrip() {
        let storage = ConsignmentStorage::open_in_memory().unwrap();

        let mut c = consignment("C1", Channel::Amazon);
        c.printed_boxes.insert(1);
        c.printed_boxes.insert(3);
        storage.put_consignment(&c).unwrap();

        let loaded = storage.get_consignment("C1").unwrap().unwrap();
        assert_eq!(loaded.printed_boxes, c.printed_boxes);
    }

    #[test]
    fn test_list_by_channel() {
        let storage = ConsignmentStorage::open_in_memory().unwrap();
        storage
            .put_consignment(&consignment("C1", Channel::Flipkart))
            .unwrap();
        storage
            .put_consignment(&consignment("C2", Channel::Amazon))
            .unwrap();
        storage
            .put_consignment(&consignment("C3", Channel::Flipkart))
            .unwrap();

        let flipkart = storage.list_by_channel(Channel::Flipkart).unwrap();
        assert_eq!(flipkart.len(), 2);
        assert!(flipkart.iter().all(|s| s.channel == Channel::Flipkart));

        assert_eq!(storage.list_consignments().unwrap().len(), 3);
    }

    #[test]
    fn test_address_books_are_separate() {
        let storage = ConsignmentStorage::open_in_memory().unwrap();

        let mut sender = Address::default();
        sender.code = "WH-1".into();
        sender.channel = "All".into();
        storage.upsert_address(AddressBook::Senders, &sender).unwrap();

        assert!(storage
            .get_address(AddressBook::Senders, "WH-1")
            .unwrap()
            .is_some());
        assert!(storage
            .get_address(AddressBook::Receivers, "WH-1")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_replace_master_is_wholesale() {
        let storage = ConsignmentStorage::open_in_memory().unwrap();

        let record = |sku: &str| MasterRecord {
            sku: sku.to_string(),
            product_name: "P".into(),
            units_per_carton: 6.0,
            ean: None,
            fsn: None,
        };

        storage.replace_master(&[record("A"), record("B")]).unwrap();
        assert_eq!(storage.master_count().unwrap(), 2);

        storage.replace_master(&[record("C")]).unwrap();
        assert_eq!(storage.master_count().unwrap(), 1);
        assert!(storage.get_master("A").unwrap().is_none());
        assert!(storage.get_master("C").unwrap().is_some());
    }
}
