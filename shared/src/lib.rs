pub mod types;
pub mod error;
pub mod config;
pub mod store;
pub mod auth;
pub mod bootstrap;
pub mod invites;
pub mod http;
pub mod email;
pub mod cognito;
pub mod dynamo;
pub mod memory;

use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_sesv2::Client as SesClient;
use std::sync::Arc;

use crate::cognito::CognitoIdentityStore;
use crate::config::Config;
use crate::dynamo::DynamoRoleStore;
use crate::store::{IdentityStore, RoleStore};

/// Shared application state
pub struct AppState {
    pub identity: Arc<dyn IdentityStore>,
    pub roles: Arc<dyn RoleStore>,
    pub config: Config,
}

impl AppState {
    pub fn new(
        identity: Arc<dyn IdentityStore>,
        roles: Arc<dyn RoleStore>,
        config: Config,
    ) -> Arc<Self> {
        Arc::new(Self {
            identity,
            roles,
            config,
        })
    }

    /// Wire the Cognito, DynamoDB and SES backed stores
    pub fn from_aws(
        cognito_client: CognitoClient,
        dynamo_client: DynamoClient,
        ses_client: SesClient,
        config: Config,
    ) -> Arc<Self> {
        let identity = CognitoIdentityStore::new(
            cognito_client,
            ses_client,
            &config.user_pool_id,
            &config.invite_from_email,
        );
        let roles = DynamoRoleStore::new(dynamo_client, &config.table_name, &config.role_index_name);
        Self::new(Arc::new(identity), Arc::new(roles), config)
    }
}
