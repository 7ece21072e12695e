use super::value_objects::OrderStatus;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("No order items")]
    EmptyItems,

    #[error("Invalid item quantity: {0}")]
    InvalidQuantity(u32),

    #[error("Product {0} not found")]
    ProductNotFound(String),

    #[error("Insufficient stock for {name}. Available: {available}")]
    InsufficientStock { name: String, available: u32 },

    #[error("Order not found")]
    NotFound,

    #[error("Order is already paid")]
    AlreadyPaid,

    #[error("Order is already delivered")]
    AlreadyDelivered,

    #[error("Order is already cancelled")]
    AlreadyCancelled,

    #[error("Cannot cancel shipped or delivered orders")]
    CannotCancel(OrderStatus),

    #[error("Cannot modify order in status: {0:?}")]
    InvalidStatusTransition(OrderStatus),
}
