// ============================================================================
// Document Store
// ============================================================================
//
// In-process document store backing every aggregate. The real deployment
// target is an external document database; this module models the handful
// of operations the service needs from it (point lookups, predicate scans,
// guarded updates, conditional batch mutation) behind one generic
// collection type.
//
// ============================================================================

mod collection;

pub use collection::{Collection, Document};

use crate::domain::order::Order;
use crate::domain::product::Product;
use crate::domain::user::{AccessToken, User};

/// Typed collections for the whole service.
pub struct Store {
    pub products: Collection<Product>,
    pub orders: Collection<Order>,
    pub users: Collection<User>,
    pub tokens: Collection<AccessToken>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            products: Collection::new("products"),
            orders: Collection::new("orders"),
            users: Collection::new("users"),
            tokens: Collection::new("tokens"),
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
