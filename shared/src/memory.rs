//! In-memory identity and role store.
//!
//! Suitable for local runs and tests. Nothing is persisted and nothing is
//! shared between processes.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::store::{IdentityStore, RoleStore};
use crate::types::{Role, RoleAssignment, UserId, UserIdentity};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentInvite {
    pub email: String,
    pub redirect_url: String,
    pub user_id: UserId,
}

#[derive(Default)]
struct Inner {
    tokens: HashMap<String, UserIdentity>,
    users_by_email: HashMap<String, UserId>,
    roles: HashMap<UserId, RoleAssignment>,
    invites: Vec<SentInvite>,
    next_id: u64,
    fail_with: Option<String>,
}

pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Register an account reachable by `email` and by the access `token`.
    pub async fn add_user(&self, token: &str, id: &str, email: &str) -> UserId {
        let mut inner = self.inner.lock().await;
        let user_id = UserId::new(id);
        inner.tokens.insert(
            token.to_string(),
            UserIdentity {
                id: user_id.clone(),
                email: Some(email.to_string()),
            },
        );
        inner
            .users_by_email
            .insert(email.to_lowercase(), user_id.clone());
        user_id
    }

    pub async fn grant(&self, user_id: &UserId, role: Role) {
        let mut inner = self.inner.lock().await;
        inner
            .roles
            .insert(user_id.clone(), RoleAssignment::new(user_id.clone(), role));
    }

    /// Make every subsequent store call fail with a backend error.
    pub async fn fail_with(&self, message: &str) {
        self.inner.lock().await.fail_with = Some(message.to_string());
    }

    pub async fn assignments(&self) -> Vec<RoleAssignment> {
        let inner = self.inner.lock().await;
        let mut all: Vec<_> = inner.roles.values().cloned().collect();
        all.sort_by(|a, b| a.user_id.as_str().cmp(b.user_id.as_str()));
        all
    }

    pub async fn invites(&self) -> Vec<SentInvite> {
        self.inner.lock().await.invites.clone()
    }

    pub async fn user_for_email(&self, email: &str) -> Option<UserId> {
        self.inner
            .lock()
            .await
            .users_by_email
            .get(&email.to_lowercase())
            .cloned()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    fn check(&self) -> Result<(), StoreError> {
        match &self.fail_with {
            Some(message) => Err(StoreError::Backend(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn caller_identity(&self, token: &str) -> Result<UserIdentity, StoreError> {
        let inner = self.inner.lock().await;
        inner
            .tokens
            .get(token)
            .cloned()
            .ok_or_else(|| StoreError::Unauthorized("unknown access token".to_string()))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserId>, StoreError> {
        let inner = self.inner.lock().await;
        inner.check()?;
        Ok(inner.users_by_email.get(&email.to_lowercase()).cloned())
    }

    async fn invite_user_by_email(
        &self,
        email: &str,
        redirect_url: &str,
    ) -> Result<UserId, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.check()?;
        inner.next_id += 1;
        let user_id = UserId::new(format!("invited-{}", inner.next_id));
        inner
            .users_by_email
            .insert(email.to_lowercase(), user_id.clone());
        inner.invites.push(SentInvite {
            email: email.to_string(),
            redirect_url: redirect_url.to_string(),
            user_id: user_id.clone(),
        });
        Ok(user_id)
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn role_exists(&self, role: Role) -> Result<bool, StoreError> {
        let inner = self.inner.lock().await;
        inner.check()?;
        Ok(inner.roles.values().any(|a| a.role == role))
    }

    async fn get_role(&self, user_id: &UserId) -> Result<Option<Role>, StoreError> {
        let inner = self.inner.lock().await;
        inner.check()?;
        Ok(inner.roles.get(user_id).map(|a| a.role))
    }

    async fn insert_role(&self, assignment: &RoleAssignment) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.check()?;
        if inner.roles.contains_key(&assignment.user_id) {
            return Err(StoreError::Conflict);
        }
        inner
            .roles
            .insert(assignment.user_id.clone(), assignment.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_role_rejects_second_assignment() {
        let store = MemoryStore::new();
        let id = store.add_user("t", "U1", "u1@example.com").await;

        store
            .insert_role(&RoleAssignment::new(id.clone(), Role::Editor))
            .await
            .unwrap();
        let err = store
            .insert_role(&RoleAssignment::new(id.clone(), Role::Admin))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Conflict));
        assert_eq!(store.get_role(&id).await.unwrap(), Some(Role::Editor));
    }

    #[tokio::test]
    async fn email_lookup_is_case_insensitive() {
        let store = MemoryStore::new();
        let id = store.add_user("t", "U1", "Bob@Example.com").await;
        assert_eq!(
            store.find_user_by_email("bob@example.com").await.unwrap(),
            Some(id)
        );
    }

    #[tokio::test]
    async fn unknown_token_is_unauthorized() {
        let store = MemoryStore::new();
        let err = store.caller_identity("nope").await.unwrap_err();
        assert!(matches!(err, StoreError::Unauthorized(_)));
    }
}
