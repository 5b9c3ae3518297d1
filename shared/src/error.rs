use lambda_http::http::StatusCode;
use serde_json::{json, Value};
use thiserror::Error;

/// Failure reported by the identity or role store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("credential rejected: {0}")]
    Unauthorized(String),

    #[error("conditional write rejected: row already exists")]
    Conflict,

    #[error("backend error: {0}")]
    Backend(String),
}

/// Terminal failure of a bootstrap or invite invocation
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("an admin already exists")]
    AlreadyBootstrapped,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("user already has a role assigned")]
    DuplicateRole,

    #[error("dependency failed: {0}")]
    Dependency(#[from] StoreError),
}

impl AdminError {
    pub fn status(&self) -> StatusCode {
        match self {
            AdminError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AdminError::Forbidden(_) | AdminError::AlreadyBootstrapped => StatusCode::FORBIDDEN,
            AdminError::InvalidInput(_) | AdminError::DuplicateRole => StatusCode::BAD_REQUEST,
            AdminError::Dependency(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON body sent to the caller. Store details stay in the logs.
    pub fn body(&self) -> Value {
        match self {
            AdminError::AlreadyBootstrapped => json!({
                "success": false,
                "message": "Admin already exists. Ask an existing admin to invite you.",
            }),
            AdminError::Unauthenticated(msg)
            | AdminError::Forbidden(msg)
            | AdminError::InvalidInput(msg) => json!({ "error": msg }),
            AdminError::DuplicateRole => json!({ "error": "User already has a role assigned" }),
            AdminError::Dependency(_) => json!({ "error": "Internal server error" }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(AdminError::Unauthenticated("x".into()).status(), 401);
        assert_eq!(AdminError::Forbidden("x".into()).status(), 403);
        assert_eq!(AdminError::AlreadyBootstrapped.status(), 403);
        assert_eq!(AdminError::InvalidInput("x".into()).status(), 400);
        assert_eq!(AdminError::DuplicateRole.status(), 400);
        assert_eq!(
            AdminError::Dependency(StoreError::Backend("x".into())).status(),
            500
        );
    }

    #[test]
    fn already_bootstrapped_keeps_success_flag() {
        let body = AdminError::AlreadyBootstrapped.body();
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap().starts_with("Admin already exists"));
        assert!(body.get("error").is_none());
    }

    #[test]
    fn dependency_details_are_not_echoed() {
        let body = AdminError::Dependency(StoreError::Backend("table missing".into())).body();
        assert_eq!(body, json!({ "error": "Internal server error" }));
    }
}
