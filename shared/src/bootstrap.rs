use crate::auth::authenticate;
use crate::error::{AdminError, StoreError};
use crate::types::{GrantResponse, Role, RoleAssignment, Stage};
use crate::AppState;

/// Grant the admin role to the caller if no admin exists yet.
///
/// The existence check and the insert are not atomic: two first-time callers
/// racing each other can both become admin. The role store still refuses a
/// second role for the same user.
pub async fn bootstrap_admin(
    state: &AppState,
    authorization: Option<&str>,
) -> Result<GrantResponse, AdminError> {
    tracing::info!(stage = %Stage::Authenticating, "Bootstrap admin requested");
    let caller = authenticate(state.identity.as_ref(), authorization).await?;

    tracing::info!(stage = %Stage::Resolving, user_id = %caller.id, "Checking for existing admin");
    let admin_exists = state.roles.role_exists(Role::Admin).await.map_err(|e| {
        tracing::error!("Failed to check for existing admin: {:?}", e);
        AdminError::from(e)
    })?;

    if admin_exists {
        tracing::warn!(user_id = %caller.id, "Bootstrap refused: admin already exists");
        return Err(AdminError::AlreadyBootstrapped);
    }

    tracing::info!(stage = %Stage::Mutating, user_id = %caller.id, "Granting first admin role");
    let assignment = RoleAssignment::new(caller.id.clone(), Role::Admin);
    match state.roles.insert_role(&assignment).await {
        Ok(()) => {}
        Err(StoreError::Conflict) => {
            tracing::warn!(user_id = %caller.id, "Caller already holds a role");
            return Err(AdminError::DuplicateRole);
        }
        Err(e) => {
            tracing::error!("Failed to insert admin role: {:?}", e);
            return Err(e.into());
        }
    }

    tracing::info!(stage = %Stage::Completed, user_id = %caller.id, "✅ Admin bootstrapped");
    Ok(GrantResponse::new("Admin role granted successfully", caller.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::test_support::state_with;
    use std::sync::Arc;

    #[tokio::test]
    async fn first_caller_becomes_admin() {
        let store = Arc::new(MemoryStore::new());
        store.add_user("tok-u1", "U1", "u1@example.com").await;
        let state = state_with(store.clone());

        let resp = bootstrap_admin(&state, Some("Bearer tok-u1")).await.unwrap();

        assert!(resp.success);
        assert_eq!(resp.user_id.as_str(), "U1");
        let assignments = store.assignments().await;
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].user_id.as_str(), "U1");
        assert_eq!(assignments[0].role, Role::Admin);
    }

    #[tokio::test]
    async fn second_call_fails_without_mutation() {
        let store = Arc::new(MemoryStore::new());
        store.add_user("tok-u1", "U1", "u1@example.com").await;
        store.add_user("tok-u2", "U2", "u2@example.com").await;
        let state = state_with(store.clone());

        bootstrap_admin(&state, Some("Bearer tok-u1")).await.unwrap();
        let err = bootstrap_admin(&state, Some("Bearer tok-u2")).await.unwrap_err();

        assert!(matches!(err, AdminError::AlreadyBootstrapped));
        assert_eq!(store.assignments().await.len(), 1);
    }

    #[tokio::test]
    async fn same_caller_twice_yields_one_admin() {
        let store = Arc::new(MemoryStore::new());
        store.add_user("tok-u1", "U1", "u1@example.com").await;
        let state = state_with(store.clone());

        bootstrap_admin(&state, Some("Bearer tok-u1")).await.unwrap();
        let err = bootstrap_admin(&state, Some("Bearer tok-u1")).await.unwrap_err();

        assert!(matches!(err, AdminError::AlreadyBootstrapped));
        assert_eq!(store.assignments().await.len(), 1);
    }

    #[tokio::test]
    async fn editor_without_admin_cannot_hold_two_roles() {
        let store = Arc::new(MemoryStore::new());
        let id = store.add_user("tok-u1", "U1", "u1@example.com").await;
        store.grant(&id, Role::Editor).await;
        let state = state_with(store.clone());

        let err = bootstrap_admin(&state, Some("Bearer tok-u1")).await.unwrap_err();

        assert!(matches!(err, AdminError::DuplicateRole));
        assert_eq!(store.assignments().await[0].role, Role::Editor);
    }

    #[tokio::test]
    async fn missing_header_performs_no_mutation() {
        let store = Arc::new(MemoryStore::new());
        let state = state_with(store.clone());

        let err = bootstrap_admin(&state, None).await.unwrap_err();

        assert_eq!(err.status(), 401);
        assert!(store.assignments().await.is_empty());
    }

    #[tokio::test]
    async fn store_failure_is_dependency_error() {
        let store = Arc::new(MemoryStore::new());
        store.add_user("tok-u1", "U1", "u1@example.com").await;
        store.fail_with("connection reset").await;
        let state = state_with(store.clone());

        let err = bootstrap_admin(&state, Some("Bearer tok-u1")).await.unwrap_err();

        assert!(matches!(err, AdminError::Dependency(_)));
        assert_eq!(err.status(), 500);
    }
}
