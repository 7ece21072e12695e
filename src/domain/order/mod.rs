// ============================================================================
// Order Domain - Business Logic for Orders
// ============================================================================
//
// This module contains ALL order-specific code:
// - Value objects (LineItem, OrderStatus, OrderDraft, PaymentConfirmation)
// - Errors (OrderError enum)
// - Model (Order with status transition rules)
// - Service (OrderService: placement, stock reservation, cancellation)
//
// ============================================================================

pub mod errors;
pub mod model;
pub mod service;
pub mod value_objects;

// Re-export for convenience
pub use errors::*;
pub use model::*;
pub use service::*;
pub use value_objects::*;
