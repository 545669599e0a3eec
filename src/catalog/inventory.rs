// Inventory ledger
// Per-store stock rows; a product's stock is the sum of its rows

use super::ProductId;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Stock of one product held by one store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub store: String,
    pub product: ProductId,
    pub amount: u64,
}

impl InventoryRecord {
    pub fn new(store: impl Into<String>, product: ProductId, amount: u64) -> Self {
        Self {
            store: store.into(),
            product,
            amount,
        }
    }
}

pub struct InventoryLedger {
    rows: RwLock<Vec<InventoryRecord>>,
}

impl InventoryLedger {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    /// Insert a row, replacing an existing row for the same store and product
    pub fn record(&self, row: InventoryRecord) {
        let mut rows = self.rows.write();
        match rows
            .iter_mut()
            .find(|r| r.store == row.store && r.product == row.product)
        {
            Some(existing) => existing.amount = row.amount,
            None => rows.push(row),
        }
    }

    pub fn set_amount(&self, store: &str, product: &ProductId, amount: u64) {
        debug!(store = %store, product_id = %product, amount, "Inventory row updated");
        self.record(InventoryRecord::new(store, product.clone(), amount));
    }

    /// Remove every row for a product
    pub fn clear_product(&self, product: &ProductId) {
        self.rows.write().retain(|r| &r.product != product);
    }

    /// Summed stock per requested product in a single pass.
    /// `None` means the product has no rows at all.
    pub fn aggregate(&self, products: &[ProductId]) -> HashMap<ProductId, Option<u64>> {
        let mut totals: HashMap<ProductId, Option<u64>> =
            products.iter().map(|p| (p.clone(), None)).collect();

        for row in self.rows.read().iter() {
            if let Some(total) = totals.get_mut(&row.product) {
                *total = Some(total.unwrap_or(0).saturating_add(row.amount));
            }
        }

        totals
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

impl Default for InventoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_sums_rows() {
        let ledger = InventoryLedger::new();
        ledger.record(InventoryRecord::new("a", ProductId::from(1), 2));
        ledger.record(InventoryRecord::new("b", ProductId::from(1), 5));
        ledger.record(InventoryRecord::new("a", ProductId::from(2), 1));

        let totals = ledger.aggregate(&[ProductId::from(1), ProductId::from(3)]);
        assert_eq!(totals[&ProductId::from(1)], Some(7));
        assert_eq!(totals[&ProductId::from(3)], None);
    }

    #[test]
    fn test_record_replaces_same_store_row() {
        let ledger = InventoryLedger::new();
        ledger.record(InventoryRecord::new("a", ProductId::from(1), 2));
        ledger.set_amount("a", &ProductId::from(1), 9);

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.aggregate(&[ProductId::from(1)])[&ProductId::from(1)], Some(9));
    }

    #[test]
    fn test_clear_product() {
        let ledger = InventoryLedger::new();
        ledger.record(InventoryRecord::new("a", ProductId::from(1), 2));
        ledger.clear_product(&ProductId::from(1));
        assert!(ledger.is_empty());
    }
}
