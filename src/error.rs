// Basket domain errors
// Rejected adjustments are not errors; they travel in the response payload

use crate::catalog::ProductId;
use thiserror::Error;

pub type Result<T, E = BasketError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum BasketError {
    /// The product key is not present in the session basket
    #[error("product {0} is not in the basket")]
    ProductNotInBasket(ProductId),

    /// The catalog has no product with this identifier
    #[error("product {0} does not exist in the catalog")]
    ProductNotFound(ProductId),

    /// A client-supplied running total was required but absent
    #[error("total_price is required when totals are supplied by the client")]
    MissingTotal,

    /// The session value under `basket` could not be decoded
    #[error("session basket is corrupt: {0}")]
    CorruptBasket(#[from] serde_json::Error),

    /// A running total left the representable money range
    #[error("basket total is out of range")]
    TotalOutOfRange,
}
