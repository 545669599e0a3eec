// Basket entry and reconciliation view types

use crate::catalog::{ProductId, ProductRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One product's quantity record as persisted in the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketEntry {
    pub amount: u64,
}

impl BasketEntry {
    pub fn new(amount: u64) -> Self {
        Self { amount }
    }
}

/// Entry enriched with live catalog data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasketLine {
    pub product: ProductRecord,
    pub amount: u64,
    pub stock_amount: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// A quantity reduced to the stock available at reconciliation time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Correction {
    pub product_id: ProductId,
    pub requested: u64,
    pub clamped_to: u64,
}

/// Result of reconciling the stored basket against the catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Reconciliation {
    pub lines: Vec<BasketLine>,
    pub corrections: Vec<Correction>,
    /// Basket keys the catalog no longer knows
    pub unresolved: Vec<ProductId>,
}

impl Reconciliation {
    pub fn grand_total(&self) -> Decimal {
        self.lines.iter().map(|line| line.total).sum()
    }

    pub fn line(&self, id: &ProductId) -> Option<&BasketLine> {
        self.lines.iter().find(|line| &line.product.id == id)
    }

    /// True when nothing needs to be written back
    pub fn is_clean(&self) -> bool {
        self.corrections.is_empty() && self.unresolved.is_empty()
    }
}
