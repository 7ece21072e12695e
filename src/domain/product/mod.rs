// ============================================================================
// Product Domain Module
// ============================================================================
//
// Catalog products with embedded reviews:
//
// - value_objects: Review, NewProduct, ProductUpdate, CatalogFilter
// - errors: product and review failures
// - model: the Product document and its review aggregation rules
// - service: catalog operations on the shared store
//
// ============================================================================

pub mod errors;
pub mod model;
pub mod service;
pub mod value_objects;

pub use errors::ProductError;
pub use model::Product;
pub use service::CatalogService;
pub use value_objects::{CatalogFilter, NewProduct, NewReview, ProductUpdate, Review};
