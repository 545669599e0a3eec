// Basket Module
// Session-persisted product quantities reconciled lazily against live stock

pub mod entry;
pub mod pricing;
pub mod reconcile;

use crate::catalog::{Catalog, ProductId, ProductRecord};
use crate::error::{BasketError, Result};
use crate::session::Session;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, instrument, warn};

pub use entry::{BasketEntry, BasketLine, Correction, Reconciliation};

/// Session key holding the basket mapping
pub const SESSION_KEY: &str = "basket";

/// What happens to basket keys the catalog no longer returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedPolicy {
    /// Hide them from the enriched view but leave them stored
    #[default]
    Keep,

    /// Remove them from storage when reconciliation is applied
    Prune,
}

/// Basket view over one request's session
///
/// Every mutation writes the whole mapping back into the session and marks
/// it modified. Quantities are only checked against stock by
/// [`Basket::iterate`].
pub struct Basket<'s> {
    session: &'s mut Session,
    entries: BTreeMap<ProductId, BasketEntry>,
    /// Catalog records cached for the lifetime of this instance
    products: Option<HashMap<ProductId, ProductRecord>>,
    policy: UnresolvedPolicy,
}

impl<'s> Basket<'s> {
    /// Load the basket from the session, creating an empty one if absent
    pub fn open(session: &'s mut Session) -> Result<Self> {
        if !session.contains(SESSION_KEY) {
            debug!(session_id = %session.session_id, "Creating empty basket");
            session.insert(SESSION_KEY, serde_json::json!({}));
        }

        let entries = match session.get(SESSION_KEY) {
            Some(value) => serde_json::from_value(value.clone())?,
            None => BTreeMap::new(),
        };

        Ok(Self {
            session,
            entries,
            products: None,
            policy: UnresolvedPolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: UnresolvedPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &ProductId) -> bool {
        self.entries.contains_key(id)
    }

    /// Stored quantity, not reconciled
    pub fn amount(&self, id: &ProductId) -> Option<u64> {
        self.entries.get(id).map(|e| e.amount)
    }

    /// Add one unit. No stock check happens here.
    #[instrument(skip(self), fields(session_id = %self.session.session_id))]
    pub fn add(&mut self, id: ProductId) -> Result<()> {
        match self.entries.get_mut(&id) {
            Some(entry) => entry.amount = entry.amount.saturating_add(1),
            None => {
                self.entries.insert(id, BasketEntry::new(1));
                // A new key is not covered by the cached lookup
                self.products = None;
            }
        }

        self.save()
    }

    /// Compute the enriched view without touching the stored mapping.
    ///
    /// Issues at most one batched catalog lookup per basket instance.
    pub async fn snapshot(&mut self, catalog: &dyn Catalog) -> Result<Reconciliation> {
        let products = match self.products.take() {
            Some(products) => products,
            None => {
                let ids: Vec<ProductId> = self.entries.keys().cloned().collect();
                if ids.is_empty() {
                    HashMap::new()
                } else {
                    catalog.lookup(&ids).await?
                }
            }
        };

        let detached = self.entries.clone();
        let view = reconcile::reconcile(&detached, &products);
        self.products = Some(products);

        Ok(view)
    }

    /// Write the corrections of a reconciliation back into storage.
    ///
    /// Returns the number of stored entries changed or removed.
    pub fn apply(&mut self, view: &Reconciliation) -> Result<usize> {
        let mut changed = 0;

        for correction in &view.corrections {
            if let Some(entry) = self.entries.get_mut(&correction.product_id) {
                if entry.amount > correction.clamped_to {
                    entry.amount = correction.clamped_to;
                    changed += 1;
                }
            }
        }

        if self.policy == UnresolvedPolicy::Prune {
            for id in &view.unresolved {
                if self.entries.remove(id).is_some() {
                    info!(product_id = %id, "Pruned product missing from catalog");
                    changed += 1;
                }
            }
        } else if !view.unresolved.is_empty() {
            debug!(count = view.unresolved.len(), "Basket keeps products missing from catalog");
        }

        if changed > 0 {
            self.save()?;
        }

        Ok(changed)
    }

    /// Snapshot and apply in one step: the read that clamps to stock
    #[instrument(skip(self, catalog), fields(session_id = %self.session.session_id))]
    pub async fn iterate(&mut self, catalog: &dyn Catalog) -> Result<Reconciliation> {
        let view = self.snapshot(catalog).await?;

        for correction in &view.corrections {
            warn!(
                product_id = %correction.product_id,
                requested = correction.requested,
                clamped_to = correction.clamped_to,
                "Basket amount clamped to available stock"
            );
        }

        self.apply(&view)?;
        Ok(view)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.save()
    }

    /// Set a quantity verbatim; negative values become 0.
    ///
    /// Not clamped against stock.
    pub fn update_item(&mut self, id: &ProductId, required_amount: i64) -> Result<()> {
        let amount = u64::try_from(required_amount).unwrap_or(0);
        self.entries
            .entry(id.clone())
            .or_insert(BasketEntry::new(0))
            .amount = amount;

        self.save()
    }

    pub fn delete_product(&mut self, id: &ProductId) -> Result<BasketEntry> {
        let removed = self
            .entries
            .remove(id)
            .ok_or_else(|| BasketError::ProductNotInBasket(id.clone()))?;

        self.save()?;
        Ok(removed)
    }

    fn save(&mut self) -> Result<()> {
        let value = serde_json::to_value(&self.entries)?;
        self.session.insert(SESSION_KEY, value);
        Ok(())
    }
}
