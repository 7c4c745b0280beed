use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Point-in-time read of a product's price and stock as reported by the
/// products service. Nothing guarantees it is still accurate after the read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub price: Decimal,
    pub stock: i32,
}

impl ProductSnapshot {
    pub fn new(price: Decimal, stock: i32) -> Self {
        Self { price, stock }
    }

    pub fn covers(&self, quantity: i32) -> bool {
        self.stock >= quantity
    }
}
