use thiserror::Error;

/// Failures raised by user and address operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("Address not found")]
    AddressNotFound,
}
