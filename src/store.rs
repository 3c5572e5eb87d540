// 🗄️ Receipt Store - in-memory, indexed by id
//
// Receipts are held as Arc<Receipt> so the memoized parse results survive
// between requests. Ordered by id, like the index the listing walks.

use crate::error::StoreError;
use crate::receipt::{Receipt, ReceiptItem};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

#[derive(Clone, Default)]
pub struct ReceiptStore {
    receipts: Arc<RwLock<BTreeMap<String, Arc<Receipt>>>>,
}

impl ReceiptStore {
    /// Create new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create store with the sample receipts pre-loaded
    pub fn with_example_data() -> Result<Self, StoreError> {
        let store = ReceiptStore::new();
        store.load_example_data()?;
        Ok(store)
    }

    /// Store a receipt, assigning its id if it has none. Returns the id.
    pub fn insert(&self, mut receipt: Receipt) -> Result<String, StoreError> {
        let id = receipt.ensure_id();
        if id.is_empty() {
            return Err(StoreError::MissingId);
        }

        let mut receipts = self.receipts.write().map_err(|_| StoreError::LockPoisoned)?;
        if receipts.contains_key(&id) {
            return Err(StoreError::DuplicateId(id));
        }
        receipts.insert(id.clone(), Arc::new(receipt));

        Ok(id)
    }

    /// Look up a receipt; braces around the id are ignored
    pub fn get(&self, id: &str) -> Result<Option<Arc<Receipt>>, StoreError> {
        let receipts = self.receipts.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(receipts.get(strip_braces(id)).cloned())
    }

    /// All receipts in id order
    pub fn all(&self) -> Result<Vec<Arc<Receipt>>, StoreError> {
        let receipts = self.receipts.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(receipts.values().cloned().collect())
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        let receipts = self.receipts.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(receipts.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Insert the four sample receipts under fixed ids, so they can be queried
    /// the same way across restarts
    pub fn load_example_data(&self) -> Result<(), StoreError> {
        for receipt in example_receipts() {
            let id = self.insert(receipt)?;
            tracing::debug!(%id, "inserted example receipt");
        }
        Ok(())
    }
}

fn strip_braces(id: &str) -> &str {
    let id = id.strip_prefix('{').unwrap_or(id);
    id.strip_suffix('}').unwrap_or(id)
}

/// Sample receipts with fixed ids
pub fn example_receipts() -> Vec<Receipt> {
    vec![
        Receipt::new(
            "Walgreens",
            "2022-01-02",
            "08:13",
            "2.65",
            vec![
                ReceiptItem::new("Pepsi - 12-oz", "1.25"),
                ReceiptItem::new("Dasani", "1.40"),
            ],
        )
        .with_id("ae6ad71c-e978-4e93-a8a9-5909dc3d4422"),
        Receipt::new(
            "Target",
            "2022-01-02",
            "13:13",
            "1.25",
            vec![ReceiptItem::new("Pepsi - 12-oz", "1.25")],
        )
        .with_id("98557e85-1663-4d3b-adff-bbba1d002c4e"),
        Receipt::new(
            "Target",
            "2022-01-01",
            "13:01",
            "35.35",
            vec![
                ReceiptItem::new("Mountain Dew 12PK", "6.49"),
                ReceiptItem::new("Emils Cheese Pizza", "12.25"),
                ReceiptItem::new("Knorr Creamy Chicken", "1.26"),
                ReceiptItem::new("Doritos Nacho Cheese", "3.35"),
                ReceiptItem::new("   Klarbrunn 12-PK 12 FL OZ  ", "12.00"),
            ],
        )
        .with_id("392abbcf-4783-49f4-901c-ae0c708783df"),
        Receipt::new(
            "M&M Corner Market",
            "2022-03-20",
            "14:33",
            "9.00",
            vec![
                ReceiptItem::new("Gatorade", "2.25"),
                ReceiptItem::new("Gatorade", "2.25"),
                ReceiptItem::new("Gatorade", "2.25"),
                ReceiptItem::new("Gatorade", "2.25"),
            ],
        )
        .with_id("cbf19128-6408-4b47-9d20-08c2e84a9341"),
    ]
}

// ============================================================================
// TESTS
// ============================================================================
