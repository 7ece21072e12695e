// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// This module contains the business entities and their rules. Each entity
// has its own subdirectory with:
// - Value objects
// - Errors
// - Model (the stored document and its state rules)
// - Service (operations against the shared store)
//
// This layer knows nothing about HTTP; handlers call into the services and
// translate their errors at the boundary.
//
// ============================================================================

pub mod order;
pub mod product;
pub mod user;
