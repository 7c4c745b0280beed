pub mod app_config;
pub mod database;
pub mod memory;
pub mod order_repo;

pub use database::DbClient;
pub use memory::InMemoryOrderStore;
pub use order_repo::PgOrderRepository;
