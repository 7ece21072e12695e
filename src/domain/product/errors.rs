// ============================================================================
// Product Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("Product not found")]
    NotFound,

    #[error("Product already reviewed")]
    AlreadyReviewed,

    #[error("Rating must be between 1 and 5")]
    InvalidRating(u8),
}
