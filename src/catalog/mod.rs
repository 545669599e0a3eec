// Catalog Lookup Module
// Batched product price and aggregated stock retrieval for the basket

pub mod inventory;
pub mod seed;

use crate::error::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::num::ParseIntError;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use tracing::{debug, info, instrument};

use inventory::InventoryLedger;

/// Product identifier: the canonical string form of an integer key
///
/// Input may be a JSON string or integer; output is always a string.
/// `"07"` and `7` name the same product, stored as `"7"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl FromStr for ProductId {
    type Err = ParseIntError;

    fn from_str(id: &str) -> std::result::Result<Self, Self::Err> {
        id.trim().parse::<u64>().map(Self::from)
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// Shorter keys first so integer keys sort numerically ("2" < "10").
impl Ord for ProductId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for ProductId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(u64),
            Str(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(id) => Ok(ProductId::from(id)),
            Raw::Str(id) => id.parse().map_err(|e| {
                de::Error::custom(format!("invalid product id {id:?}: {e}"))
            }),
        }
    }
}

/// Catalog view of a product as the basket sees it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Sum of all inventory rows for the product, 0 when there are none
    pub stock_amount: u64,
}

/// Batched catalog lookup consulted by the basket
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Resolve every known identifier in `ids`; unknown ones are simply absent
    async fn lookup(&self, ids: &[ProductId]) -> Result<HashMap<ProductId, ProductRecord>>;

    async fn get(&self, id: &ProductId) -> Result<Option<ProductRecord>> {
        let mut found = self.lookup(std::slice::from_ref(id)).await?;
        Ok(found.remove(id))
    }
}

/// Catalog product row
#[derive(Debug, Clone)]
pub struct Product {
    pub name: String,
    pub price: Decimal,
}

/// In-memory catalog backed by a product table and an inventory ledger
pub struct InMemoryCatalog {
    products: DashMap<ProductId, Product>,
    inventory: InventoryLedger,
    lookups: AtomicU64,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            products: DashMap::new(),
            inventory: InventoryLedger::new(),
            lookups: AtomicU64::new(0),
        }
    }

    pub fn insert_product(&self, id: ProductId, name: impl Into<String>, price: Decimal) {
        let name = name.into();
        debug!(product_id = %id, name = %name, price = %price, "Catalog product stored");
        self.products.insert(id, Product { name, price });
    }

    pub fn remove_product(&self, id: &ProductId) -> Option<Product> {
        info!(product_id = %id, "Catalog product removed");
        self.products.remove(id).map(|(_, product)| product)
    }

    pub fn inventory(&self) -> &InventoryLedger {
        &self.inventory
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    /// Every product with its aggregated stock, ordered by identifier
    pub fn records(&self) -> Vec<ProductRecord> {
        let ids: Vec<ProductId> = self.products.iter().map(|p| p.key().clone()).collect();
        let mut records: Vec<ProductRecord> = self.resolve(&ids).into_values().collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records
    }

    /// Number of lookups served so far
    pub fn lookup_count(&self) -> u64 {
        self.lookups.load(AtomicOrdering::Relaxed)
    }

    fn resolve(&self, ids: &[ProductId]) -> HashMap<ProductId, ProductRecord> {
        let stock = self.inventory.aggregate(ids);

        ids.iter()
            .filter_map(|id| {
                let product = self.products.get(id)?;
                Some((
                    id.clone(),
                    ProductRecord {
                        id: id.clone(),
                        name: product.name.clone(),
                        price: product.price,
                        stock_amount: stock.get(id).copied().flatten().unwrap_or(0),
                    },
                ))
            })
            .collect()
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    #[instrument(skip(self, ids), fields(requested = ids.len()))]
    async fn lookup(&self, ids: &[ProductId]) -> Result<HashMap<ProductId, ProductRecord>> {
        self.lookups.fetch_add(1, AtomicOrdering::Relaxed);

        let found = self.resolve(ids);
        debug!(resolved = found.len(), "Catalog lookup served");
        Ok(found)
    }
}
