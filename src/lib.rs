// Basket Server
// Session-backed shopping basket reconciled against live inventory

pub mod basket;
pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod observability;
pub mod session;
pub mod signals;

pub use basket::{Basket, Reconciliation, UnresolvedPolicy};
pub use catalog::{Catalog, InMemoryCatalog, ProductId, ProductRecord};
pub use error::BasketError;
pub use session::{InMemorySessionStore, Session, SessionStore};
