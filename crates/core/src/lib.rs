//! `shopfloor-core`: ids, errors and the entity trait shared by every domain crate.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;

pub use entity::{not_found, Entity};
pub use error::{DomainError, DomainResult};
pub use id::{PostId, ProductId, SupplierId};
