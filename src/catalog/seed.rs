// Catalog seed files
// TOML description of products and inventory rows loaded at startup

use super::inventory::InventoryRecord;
use super::{InMemoryCatalog, ProductId};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub products: Vec<ProductSeed>,

    #[serde(default)]
    pub inventory: Vec<InventoryRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductSeed {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
}

impl CatalogSeed {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog seed {}", path.display()))?;

        let seed: CatalogSeed = toml::from_str(&contents)
            .context("Failed to parse catalog seed")?;

        seed.validate()?;
        Ok(seed)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for product in &self.products {
            if !seen.insert(&product.id) {
                anyhow::bail!("Duplicate product id {} in catalog seed", product.id);
            }
            if product.price.is_sign_negative() {
                anyhow::bail!("Product {} has a negative price", product.id);
            }
        }

        for row in &self.inventory {
            if !seen.contains(&row.product) {
                anyhow::bail!(
                    "Inventory row in store '{}' references unknown product {}",
                    row.store,
                    row.product
                );
            }
        }

        Ok(())
    }

    pub fn into_catalog(self) -> InMemoryCatalog {
        let catalog = InMemoryCatalog::new();

        for product in self.products {
            catalog.insert_product(product.id, product.name, product.price);
        }
        for row in self.inventory {
            catalog.inventory().record(row);
        }

        info!(
            products = catalog.product_count(),
            inventory_rows = catalog.inventory().len(),
            "Catalog seeded"
        );
        catalog
    }
}
