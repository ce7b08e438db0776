//! Persistence abstractions for suppliers, products and posts.
//!
//! Handlers depend on the [`Repository`] trait object; the process picks the
//! in-memory or Postgres implementation once at startup.

use async_trait::async_trait;
use thiserror::Error;

use shopfloor_core::{DomainError, PostId, ProductId, SupplierId};
use shopfloor_feed::{NewPost, Post};
use shopfloor_parties::{Supplier, SupplierDetails};
use shopfloor_products::{NewProduct, Product, ProductUpdate};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryRepository;
pub use postgres::PostgresRepository;

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The requested id does not exist.
    #[error("{0} not found")]
    NotFound(String),
    /// Input rejected before or during the write (ledger rules, dangling references).
    #[error("validation failed: {0}")]
    Validation(String),
    /// A uniqueness or referential constraint failed in the store.
    #[error("integrity violation: {0}")]
    Integrity(String),
    /// The storage engine itself failed.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<DomainError> for RepositoryError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => Self::Validation(msg),
            DomainError::NotFound(what) => Self::NotFound(what),
        }
    }
}

#[async_trait]
pub trait SupplierRepository: Send + Sync {
    async fn create_supplier(&self, details: SupplierDetails) -> RepositoryResult<Supplier>;
    async fn get_supplier(&self, id: SupplierId) -> RepositoryResult<Supplier>;
    async fn list_suppliers(&self) -> RepositoryResult<Vec<Supplier>>;
    /// Replaces all four mutable fields.
    async fn update_supplier(
        &self,
        id: SupplierId,
        details: SupplierDetails,
    ) -> RepositoryResult<Supplier>;
    /// Products referencing the supplier are left in place.
    async fn delete_supplier(&self, id: SupplierId) -> RepositoryResult<()>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Fails with `Validation` when `supplied_by` does not exist.
    async fn create_product(
        &self,
        supplied_by: SupplierId,
        new: NewProduct,
    ) -> RepositoryResult<Product>;
    async fn get_product(&self, id: ProductId) -> RepositoryResult<Product>;
    async fn list_products(&self) -> RepositoryResult<Vec<Product>>;
    /// Load, apply the ledger rule and write back as one atomic step per product.
    async fn update_product(&self, id: ProductId, update: ProductUpdate)
    -> RepositoryResult<Product>;
    async fn delete_product(&self, id: ProductId) -> RepositoryResult<()>;
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create_post(&self, new: NewPost) -> RepositoryResult<Post>;
    async fn get_post(&self, id: PostId) -> RepositoryResult<Post>;
    /// Newest first.
    async fn list_posts(&self) -> RepositoryResult<Vec<Post>>;
}

/// Everything the HTTP layer needs from storage.
pub trait Repository: SupplierRepository + ProductRepository + PostRepository {}

impl<T> Repository for T where T: SupplierRepository + ProductRepository + PostRepository {}
