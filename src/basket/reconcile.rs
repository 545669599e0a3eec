// Stock reconciliation
// Pure derivation of the enriched basket view from a detached copy of the entries

use super::entry::{BasketEntry, BasketLine, Correction, Reconciliation};
use crate::catalog::{ProductId, ProductRecord};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// Clamp every entry to the stock reported by the catalog.
///
/// Lines keep the order of `entries`. Keys missing from `products` go to
/// `unresolved` and produce no line.
pub fn reconcile(
    entries: &BTreeMap<ProductId, BasketEntry>,
    products: &HashMap<ProductId, ProductRecord>,
) -> Reconciliation {
    let mut out = Reconciliation::default();

    for (id, entry) in entries {
        let Some(product) = products.get(id) else {
            out.unresolved.push(id.clone());
            continue;
        };

        let amount = if entry.amount > product.stock_amount {
            out.corrections.push(Correction {
                product_id: id.clone(),
                requested: entry.amount,
                clamped_to: product.stock_amount,
            });
            product.stock_amount
        } else {
            entry.amount
        };

        out.lines.push(BasketLine {
            product: product.clone(),
            amount,
            stock_amount: product.stock_amount,
            total: product.price * Decimal::from(amount),
        });
    }

    out
}
