use crate::error::{AdminError, StoreError};
use crate::store::IdentityStore;
use crate::types::UserIdentity;

/// Extract the token from an `Authorization` header value.
///
/// Accepts `Bearer <token>` with any casing of the scheme, or a bare token.
pub fn bearer_token(header: &str) -> Option<&str> {
    let header = header.trim();
    if header.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = match header.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        Some(_) => return None,
        None => header,
    };

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Resolve the caller behind the `Authorization` header.
pub async fn authenticate(
    identity: &dyn IdentityStore,
    authorization: Option<&str>,
) -> Result<UserIdentity, AdminError> {
    let header = authorization.ok_or_else(|| {
        AdminError::Unauthenticated("Missing Authorization header".to_string())
    })?;

    let token = bearer_token(header).ok_or_else(|| {
        AdminError::Unauthenticated("Malformed Authorization header".to_string())
    })?;

    match identity.caller_identity(token).await {
        Ok(user) => Ok(user),
        Err(StoreError::Unauthorized(reason)) => {
            tracing::warn!("Caller token rejected: {}", reason);
            Err(AdminError::Unauthenticated("Invalid token".to_string()))
        }
        Err(e) => {
            tracing::error!("Failed to resolve caller identity: {:?}", e);
            Err(AdminError::Unauthenticated("Invalid token".to_string()))
        }
    }
}
