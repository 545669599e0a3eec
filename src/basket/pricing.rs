// Quantity adjustment and removal rules used by the request handlers

use crate::error::{BasketError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

/// Where the running grand total of an adjust/remove request comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotalSource {
    /// Recomputed from the persisted basket on every request
    #[default]
    Server,

    /// Taken from the `total_price` the client echoes back
    Client,
}

/// Tri-state answer to an adjust request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Agreement {
    Accepted,
    Rejected,
    OutOfStock,
}

impl Serialize for Agreement {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Agreement::Accepted => serializer.serialize_bool(true),
            Agreement::Rejected => serializer.serialize_bool(false),
            Agreement::OutOfStock => serializer.serialize_str("Out of stock"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustOutcome {
    pub agreement: Agreement,

    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub total_product: Option<Decimal>,

    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub total: Option<Decimal>,

    /// Unchanged quantity, reported on rejection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
}

impl AdjustOutcome {
    fn out_of_stock() -> Self {
        Self {
            agreement: Agreement::OutOfStock,
            total_product: None,
            total: None,
            amount: None,
        }
    }

    fn rejected(current: u64) -> Self {
        Self {
            agreement: Agreement::Rejected,
            total_product: None,
            total: None,
            amount: Some(current),
        }
    }

    pub fn accepted(&self) -> bool {
        self.agreement == Agreement::Accepted
    }
}

/// Decide an adjustment from `current` to `required` units.
///
/// The new grand total is derived incrementally from `running_total`;
/// a total outside the `Decimal` range is an error, never a panic.
pub fn adjust(
    current: u64,
    required: i64,
    stock: u64,
    price: Decimal,
    running_total: Decimal,
) -> Result<AdjustOutcome> {
    if stock == 0 {
        return Ok(AdjustOutcome::out_of_stock());
    }

    let Ok(required) = u64::try_from(required) else {
        return Ok(AdjustOutcome::rejected(current));
    };
    if required > stock {
        return Ok(AdjustOutcome::rejected(current));
    }

    let difference = Decimal::from(required) - Decimal::from(current);
    let total_product = Decimal::from(required)
        .checked_mul(price)
        .ok_or(BasketError::TotalOutOfRange)?;
    let total = difference
        .checked_mul(price)
        .and_then(|delta| running_total.checked_add(delta))
        .ok_or(BasketError::TotalOutOfRange)?;

    Ok(AdjustOutcome {
        agreement: Agreement::Accepted,
        total_product: Some(total_product),
        total: Some(total),
        amount: None,
    })
}

/// Grand total after removing `current` units priced at `price`
pub fn removal_total(running_total: Decimal, price: Decimal, current: u64) -> Result<Decimal> {
    price
        .checked_mul(Decimal::from(current))
        .and_then(|line| running_total.checked_sub(line))
        .ok_or(BasketError::TotalOutOfRange)
}
