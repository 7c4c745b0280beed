pub mod catalog;
pub mod policy;
pub mod repository;

pub use catalog::{CatalogError, ProductCatalog};
pub use policy::CompensationPolicy;
pub use repository::{OrderRepository, OrderTransaction, StoreError};
