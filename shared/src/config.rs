use std::collections::HashMap;
use std::env;
use thiserror::Error;

const DEFAULT_TABLE_NAME: &str = "reno-site";
const DEFAULT_ROLE_INDEX: &str = "GSI1";
const DEFAULT_FROM_EMAIL: &str = "noreply@example.com";
const DEFAULT_REDIRECT_PATH: &str = "/admin";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
}

/// Deployment settings, read once per cold start and handed to the handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub table_name: String,
    pub role_index_name: String,
    pub user_pool_id: String,
    /// Fallback base for invite redirects when the request has no Origin
    pub site_url: String,
    pub invite_from_email: String,
    pub invite_redirect_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        Ok(Self {
            table_name: get("TABLE_NAME").unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string()),
            role_index_name: get("ROLE_INDEX_NAME")
                .unwrap_or_else(|| DEFAULT_ROLE_INDEX.to_string()),
            user_pool_id: required("COGNITO_USER_POOL_ID")?,
            site_url: required("SITE_URL")?,
            invite_from_email: get("INVITE_FROM_EMAIL")
                .unwrap_or_else(|| DEFAULT_FROM_EMAIL.to_string()),
            invite_redirect_path: get("INVITE_REDIRECT_PATH")
                .unwrap_or_else(|| DEFAULT_REDIRECT_PATH.to_string()),
        })
    }
}
