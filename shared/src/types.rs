use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AdminError;

// ========== USER ==========
/// Opaque identifier issued by the identity store (Cognito `sub`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: UserId,
    pub email: Option<String>,
}

// ========== ROLE ==========
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Editor => "editor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role '{}'", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "editor" => Ok(Role::Editor),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Permanent binding of a user to exactly one role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    pub user_id: UserId,
    pub role: Role,
    pub assigned_at: DateTime<Utc>,
}

impl RoleAssignment {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self {
            user_id,
            role,
            assigned_at: Utc::now(),
        }
    }
}

// ========== INVITE ==========
/// Raw invite body; both fields are optional so a missing one maps to a 400
/// instead of a serde error
#[derive(Debug, Default, Deserialize)]
pub struct InviteRequest {
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidInvite {
    pub email: String,
    pub role: Role,
}

impl InviteRequest {
    pub fn validate(self) -> Result<ValidInvite, AdminError> {
        let email = self
            .email
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty());
        // role must match exactly; no trimming
        let role = self.role.filter(|r| !r.is_empty());

        let (email, role) = match (email, role) {
            (Some(email), Some(role)) => (email, role),
            _ => {
                return Err(AdminError::InvalidInput(
                    "Email and role are required".to_string(),
                ))
            }
        };

        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => {
                return Err(AdminError::InvalidInput(format!(
                    "Invalid email address: {}",
                    email
                )))
            }
        }

        let role = role.parse::<Role>().map_err(|_| {
            AdminError::InvalidInput("Invalid role. Must be 'admin' or 'editor'".to_string())
        })?;

        Ok(ValidInvite { email, role })
    }
}

// ========== RESPONSES ==========
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantResponse {
    pub success: bool,
    pub message: String,
    pub user_id: UserId,
}

impl GrantResponse {
    pub fn new(message: impl Into<String>, user_id: UserId) -> Self {
        Self {
            success: true,
            message: message.into(),
            user_id,
        }
    }
}

/// Per-invocation progress, logged as each flow advances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Authenticating,
    Authorizing,
    Validating,
    Resolving,
    Mutating,
    Completed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Authenticating => "authenticating",
            Stage::Authorizing => "authorizing",
            Stage::Validating => "validating",
            Stage::Resolving => "resolving",
            Stage::Mutating => "mutating",
            Stage::Completed => "completed",
        };
        f.write_str(name)
    }
}
