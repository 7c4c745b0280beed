pub mod cart;
pub mod order;
pub mod product;

pub use cart::{CartLine, CartRequest, OrderSummary};
pub use order::{NewOrderItem, Order, OrderItem, OrderStatus, UnknownStatus};
pub use product::ProductSnapshot;

/// Store-assigned order identity
pub type OrderId = i64;
pub type OrderItemId = i64;

/// Weak reference into the users service
pub type UserId = i64;

/// Weak reference into the products service
pub type ProductId = i64;
