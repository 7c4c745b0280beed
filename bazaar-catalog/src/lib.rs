pub mod client;
pub mod inventory;

pub use client::HttpProductCatalog;
pub use inventory::InMemoryCatalog;
