//! redb-based storage layer for the order ledger
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | `Order` | Order headers with outstanding totals |
//! | `order_items` | `(order_id, item_id)` | `OrderItem` | Line items with outstanding prices |
//! | `payments` | `(order_id, payment_id)` | `PaymentRecord` | Append-only allocation audit trail |
//!
//! # Durability
//!
//! redb commits with `Durability::Immediate`: once `commit()` returns, the
//! pass is persistent, and an abort (dropping the transaction) leaves no
//! trace. Write transactions are exclusive, so a settlement pass observes
//! and mutates balances without interference from concurrent passes.

use redb::{
    Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction,
};
use shared::models::{LedgerSide, Order, OrderItem, PaymentRecord};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Order headers: key = order_id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Line items: key = (order_id, item_id), value = JSON-serialized OrderItem
const ORDER_ITEMS_TABLE: TableDefinition<(&str, &str), &[u8]> =
    TableDefinition::new("order_items");

/// Payment records: key = (order_id, payment_id), value = JSON-serialized PaymentRecord
const PAYMENTS_TABLE: TableDefinition<(&str, &str), &[u8]> = TableDefinition::new("payments");

/// Storage errors
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
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Ledger storage backed by redb
#[derive(Clone)]
pub struct LedgerStorage {
    db: Arc<Database>,
}

impl LedgerStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    /// Open an in-memory database (tests and tooling)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    fn init_tables(&self) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(ORDER_ITEMS_TABLE)?;
            let _ = write_txn.open_table(PAYMENTS_TABLE)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction
    ///
    /// Dropping the transaction without `commit()` aborts it — the failure
    /// path of a settlement pass relies on this.
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Write-transaction operations ==========

    /// Create an order together with its line items (one atomic insert set)
    pub fn create_order(
        &self,
        txn: &WriteTransaction,
        order: &Order,
        items: &[OrderItem],
    ) -> StorageResult<()> {
        {
            let mut orders = txn.open_table(ORDERS_TABLE)?;
            let bytes = serde_json::to_vec(order)?;
            orders.insert(order.id.as_str(), bytes.as_slice())?;
        }
        let mut table = txn.open_table(ORDER_ITEMS_TABLE)?;
        for item in items {
            let bytes = serde_json::to_vec(item)?;
            table.insert((order.id.as_str(), item.id.as_str()), bytes.as_slice())?;
        }
        Ok(())
    }

    /// Load an order within a write transaction
    pub fn order_in_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Option<Order>> {
        let table = txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Load an order's items within a write transaction, sorted by
    /// (delivery_date, created_at, id) — the allocation priority order.
    pub fn items_in_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Vec<OrderItem>> {
        let table = txn.open_table(ORDER_ITEMS_TABLE)?;
        let mut items = Vec::new();
        for entry in table.range((order_id, "")..)? {
            let (key, value) = entry?;
            if key.value().0 != order_id {
                break;
            }
            items.push(serde_json::from_slice::<OrderItem>(value.value())?);
        }
        sort_items(&mut items);
        Ok(items)
    }

    /// Persist an updated order header
    pub fn put_order(&self, txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        let bytes = serde_json::to_vec(order)?;
        table.insert(order.id.as_str(), bytes.as_slice())?;
        Ok(())
    }

    /// Persist an updated line item
    pub fn put_item(&self, txn: &WriteTransaction, item: &OrderItem) -> StorageResult<()> {
        let mut table = txn.open_table(ORDER_ITEMS_TABLE)?;
        let bytes = serde_json::to_vec(item)?;
        table.insert((item.order_id.as_str(), item.id.as_str()), bytes.as_slice())?;
        Ok(())
    }

    /// Append a payment record (never updated or deleted afterwards)
    pub fn append_payment(
        &self,
        txn: &WriteTransaction,
        payment: &PaymentRecord,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(PAYMENTS_TABLE)?;
        let bytes = serde_json::to_vec(payment)?;
        table.insert(
            (payment.order_id.as_str(), payment.payment_id.as_str()),
            bytes.as_slice(),
        )?;
        Ok(())
    }

    // ========== Read-only queries ==========

    /// Load one order
    pub fn get_order(&self, order_id: &str) -> StorageResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// List orders, optionally restricted to one ledger side,
    /// sorted by (created_at, id)
    pub fn list_orders(&self, side: Option<LedgerSide>) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        let mut orders = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let order: Order = serde_json::from_slice(value.value())?;
            if side.is_none_or(|s| order.side == s) {
                orders.push(order);
            }
        }
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(orders)
    }

    /// Load an order's items, sorted by (delivery_date, created_at, id)
    pub fn get_items(&self, order_id: &str) -> StorageResult<Vec<OrderItem>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDER_ITEMS_TABLE)?;
        let mut items = Vec::new();
        for entry in table.range((order_id, "")..)? {
            let (key, value) = entry?;
            if key.value().0 != order_id {
                break;
            }
            items.push(serde_json::from_slice::<OrderItem>(value.value())?);
        }
        sort_items(&mut items);
        Ok(items)
    }

    /// List an order's payment records, oldest first
    pub fn list_payments(&self, order_id: &str) -> StorageResult<Vec<PaymentRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PAYMENTS_TABLE)?;
        let mut payments = Vec::new();
        for entry in table.range((order_id, "")..)? {
            let (key, value) = entry?;
            if key.value().0 != order_id {
                break;
            }
            payments.push(serde_json::from_slice::<PaymentRecord>(value.value())?);
        }
        payments.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.payment_id.cmp(&b.payment_id))
        });
        Ok(payments)
    }
}

/// Allocation priority order: earliest delivery first, then creation time.
fn sort_items(items: &mut [OrderItem]) {
    items.sort_by(|a, b| {
        a.delivery_date
            .cmp(&b.delivery_date)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });
}
