use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{OrderId, ProductId, UserId};

/// Ephemeral order request. Lines are processed in the order given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartRequest {
    pub user_id: UserId,
    pub items: Vec<CartLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: i32,
}

impl CartRequest {
    pub fn new(user_id: UserId, items: Vec<CartLine>) -> Self {
        Self { user_id, items }
    }
}

impl CartLine {
    pub fn new(product_id: ProductId, quantity: i32) -> Self {
        Self { product_id, quantity }
    }
}

/// Result of a successful fulfillment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub order_id: OrderId,
    pub total_amount: Decimal,
}
