use actix_web::HttpRequest;

use crate::domain::user::User;
use crate::store::Store;

use super::error::ApiError;

// ============================================================================
// Request Authentication
// ============================================================================
//
// Identity comes from a bearer token in the Authorization header. Token
// issuance happens outside this service; here a token is only looked up
// and resolved to its account, which must still exist and be active.
//
// ============================================================================

/// Resolve the acting user from the Authorization header.
pub async fn authenticate(store: &Store, req: &HttpRequest) -> Result<User, ApiError> {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Not authorized, no token".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Not authorized, no token".to_string()))?;

    let access = store
        .tokens
        .find_one(|t| t.token == token)
        .await
        .ok_or_else(|| ApiError::Unauthorized("Not authorized, token failed".to_string()))?;

    let user = store
        .users
        .get(access.user_id)
        .await
        .ok_or_else(|| ApiError::Unauthorized("Not authorized, token failed".to_string()))?;

    if !user.is_active {
        return Err(ApiError::Unauthorized("Account is deactivated".to_string()));
    }

    Ok(user)
}

/// Resolve the acting user and require the admin role.
pub async fn require_admin(store: &Store, req: &HttpRequest) -> Result<User, ApiError> {
    let user = authenticate(store, req).await?;

    if !user.is_admin() {
        return Err(ApiError::Unauthorized(
            "Not authorized as an admin".to_string(),
        ));
    }

    Ok(user)
}

// ============================================================================
// Unit Tests
// ============================================================================
