// ============================================================================
// User Domain Module
// ============================================================================
//
// Accounts, roles, tokens, and the address book:
//
// - value_objects: Role, Address and the partial-update payloads
// - errors: user and address failures
// - model: the User document, AccessToken, and default-address bookkeeping
// - service: account and address operations on the shared store
//
// ============================================================================

pub mod errors;
pub mod model;
pub mod service;
pub mod value_objects;

pub use errors::UserError;
pub use model::{AccessToken, User};
pub use service::UserService;
pub use value_objects::{Address, AddressKind, AddressUpdate, NewAddress, Role, UserUpdate};
