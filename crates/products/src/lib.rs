//! Products domain module.
//!
//! This crate contains the product entity and the inventory ledger rule that
//! evolves stock, sales and revenue across partial updates. Everything here is
//! pure (no IO, no HTTP, no storage) so it can be exercised without a database.

pub mod ledger;
pub mod product;

pub use ledger::{apply_update, open};
pub use product::{NewProduct, Product, ProductUpdate};
