//! Infrastructure layer: storage, configuration and external service clients.

pub mod config;
pub mod external;
pub mod repository;

pub use config::AppConfig;
pub use external::{Mailer, MediaHost, UpstreamError};
pub use repository::{
    InMemoryRepository, PostRepository, PostgresRepository, ProductRepository, Repository,
    RepositoryError, RepositoryResult, SupplierRepository,
};
