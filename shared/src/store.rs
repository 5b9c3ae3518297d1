//! Collaborator seams for the identity provider and the role table.
//!
//! The flows only ever talk to these traits. Production wires in
//! [`CognitoIdentityStore`](crate::cognito::CognitoIdentityStore) and
//! [`DynamoRoleStore`](crate::dynamo::DynamoRoleStore); tests use
//! [`MemoryStore`](crate::memory::MemoryStore).

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{Role, RoleAssignment, UserId, UserIdentity};

#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Resolve the owner of an access token.
    async fn caller_identity(&self, token: &str) -> Result<UserIdentity, StoreError>;

    /// Look up an existing account by email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserId>, StoreError>;

    /// Create a pending account and send the invitation mail pointing at
    /// `redirect_url`.
    async fn invite_user_by_email(
        &self,
        email: &str,
        redirect_url: &str,
    ) -> Result<UserId, StoreError>;
}

#[async_trait]
pub trait RoleStore: Send + Sync {
    /// True if at least one assignment with `role` exists.
    async fn role_exists(&self, role: Role) -> Result<bool, StoreError>;

    async fn get_role(&self, user_id: &UserId) -> Result<Option<Role>, StoreError>;

    /// Insert a new assignment. Returns [`StoreError::Conflict`] when the user
    /// already holds a role.
    async fn insert_role(&self, assignment: &RoleAssignment) -> Result<(), StoreError>;
}
