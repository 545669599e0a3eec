// Request and response bodies of the basket endpoints

use crate::basket::{BasketLine, Correction, Reconciliation};
use crate::catalog::ProductId;
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};

/// Form body of the add endpoint
#[derive(Debug, Deserialize)]
pub struct AddForm {
    pub productid: ProductId,
}

#[derive(Debug, Deserialize)]
pub struct AdjustRequest {
    pub product_id: ProductId,

    #[serde(deserialize_with = "int_or_string")]
    pub product_amount: i64,

    /// Grand total last shown to the client
    #[serde(default, deserialize_with = "bounded_total")]
    pub total_price: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveRequest {
    pub product_id: ProductId,

    #[serde(default, deserialize_with = "bounded_total")]
    pub total_price: Option<Decimal>,
}

/// Largest running total a client may echo back, in either direction
pub const MAX_TOTAL_PRICE: i64 = 1_000_000_000_000_000;

#[derive(Debug, Serialize)]
pub struct RemoveResponse {
    pub total: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub items: Vec<BasketLine>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub corrections: Vec<Correction>,
    pub unresolved: Vec<ProductId>,
}

impl From<Reconciliation> for SummaryResponse {
    fn from(view: Reconciliation) -> Self {
        Self {
            total: view.grand_total(),
            items: view.lines,
            corrections: view.corrections,
            unresolved: view.unresolved,
        }
    }
}

// Browsers post quantities from text inputs, so "5" and 5 are both accepted.
fn int_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Str(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(value) => Ok(value),
        Raw::Str(value) => value.trim().parse().map_err(de::Error::custom),
    }
}

fn bounded_total<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Decimal>, D::Error> {
    match Option::<Decimal>::deserialize(deserializer)? {
        Some(total) if total.abs() > Decimal::from(MAX_TOTAL_PRICE) => Err(de::Error::custom(
            format!("total_price {total} is out of range"),
        )),
        total => Ok(total),
    }
}
