use std::sync::Arc;

use bazaar_core::{OrderRepository, ProductCatalog};
use bazaar_order::{FulfillmentSettings, OrderFulfillmentOrchestrator, OrderManager};

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<OrderFulfillmentOrchestrator>,
    pub orders: Arc<OrderManager>,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn ProductCatalog>,
        repo: Arc<dyn OrderRepository>,
        settings: FulfillmentSettings,
    ) -> Self {
        Self {
            orchestrator: Arc::new(OrderFulfillmentOrchestrator::new(
                catalog,
                repo.clone(),
                settings,
            )),
            orders: Arc::new(OrderManager::new(repo)),
        }
    }
}
