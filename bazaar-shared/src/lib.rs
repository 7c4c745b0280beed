pub mod models;

pub use models::{
    CartLine, CartRequest, NewOrderItem, Order, OrderId, OrderItem, OrderItemId, OrderStatus,
    OrderSummary, ProductId, ProductSnapshot, UnknownStatus, UserId,
};
