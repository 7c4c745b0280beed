pub mod compensation;
pub mod error;
pub mod manager;
pub mod orchestrator;

pub use error::{FulfillmentError, OrderError};
pub use manager::OrderManager;
pub use orchestrator::{FulfillmentSettings, OrderFulfillmentOrchestrator};
