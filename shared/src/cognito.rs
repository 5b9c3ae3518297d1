use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::types::{AttributeType, MessageActionType};
use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use aws_sdk_sesv2::Client as SesClient;

use crate::error::StoreError;
use crate::store::IdentityStore;
use crate::types::{UserId, UserIdentity};

/// Identity store backed by a Cognito user pool. Invitation mail goes out
/// through SES so it can carry the site's redirect link.
pub struct CognitoIdentityStore {
    cognito_client: CognitoClient,
    ses_client: SesClient,
    user_pool_id: String,
    from_email: String,
}

impl CognitoIdentityStore {
    pub fn new(
        cognito_client: CognitoClient,
        ses_client: SesClient,
        user_pool_id: &str,
        from_email: &str,
    ) -> Self {
        Self {
            cognito_client,
            ses_client,
            user_pool_id: user_pool_id.to_string(),
            from_email: from_email.to_string(),
        }
    }
}

fn attribute<'a>(attributes: &'a [AttributeType], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|a| a.name() == name)
        .and_then(|a| a.value())
}

/// Quote a value for a ListUsers filter expression
pub fn email_filter(email: &str) -> String {
    let escaped = email.replace('\\', "\\\\").replace('"', "\\\"");
    format!("email = \"{}\"", escaped)
}

fn build_attribute(name: &str, value: &str) -> Result<AttributeType, StoreError> {
    AttributeType::builder()
        .name(name)
        .value(value)
        .build()
        .map_err(|e| StoreError::Backend(format!("Failed to build attribute {}: {:?}", name, e)))
}

#[async_trait]
impl IdentityStore for CognitoIdentityStore {
    async fn caller_identity(&self, token: &str) -> Result<UserIdentity, StoreError> {
        let output = self
            .cognito_client
            .get_user()
            .access_token(token)
            .send()
            .await
            .map_err(|e| StoreError::Unauthorized(format!("{:?}", e)))?;

        let attributes = output.user_attributes();
        let sub = attribute(attributes, "sub")
            .ok_or_else(|| StoreError::Unauthorized("token owner has no sub".to_string()))?;

        Ok(UserIdentity {
            id: UserId::new(sub),
            email: attribute(attributes, "email").map(str::to_string),
        })
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserId>, StoreError> {
        let output = self
            .cognito_client
            .list_users()
            .user_pool_id(&self.user_pool_id)
            .filter(email_filter(email))
            .limit(1)
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to list users: {:?}", e)))?;

        Ok(output
            .users()
            .first()
            .and_then(|user| attribute(user.attributes(), "sub"))
            .map(UserId::new))
    }

    async fn invite_user_by_email(
        &self,
        email: &str,
        redirect_url: &str,
    ) -> Result<UserId, StoreError> {
        let output = self
            .cognito_client
            .admin_create_user()
            .user_pool_id(&self.user_pool_id)
            .username(email)
            .user_attributes(build_attribute("email", email)?)
            .user_attributes(build_attribute("email_verified", "true")?)
            .message_action(MessageActionType::Suppress)
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to create user: {:?}", e)))?;

        let user_id = output
            .user()
            .and_then(|user| attribute(user.attributes(), "sub"))
            .map(UserId::new)
            .ok_or_else(|| StoreError::Backend("Created user has no sub".to_string()))?;

        tracing::info!("Pending account {} created for {}", user_id, email);

        // Mail failure is logged only: the pending account already exists
        if let Err(e) =
            crate::email::send_invite_email(&self.ses_client, &self.from_email, email, redirect_url)
                .await
        {
            tracing::error!("Failed to send invite email: {}", e);
        } else {
            tracing::info!("Invite email sent successfully to {}", email);
        }

        Ok(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_filter_quotes_value() {
        assert_eq!(email_filter("bob@example.com"), r#"email = "bob@example.com""#);
        assert_eq!(email_filter(r#"a"b@x.y"#), r#"email = "a\"b@x.y""#);
    }

    #[test]
    fn attribute_lookup_by_name() {
        let attrs = vec![
            build_attribute("email", "bob@example.com").unwrap(),
            build_attribute("sub", "abc-123").unwrap(),
        ];
        assert_eq!(attribute(&attrs, "sub"), Some("abc-123"));
        assert_eq!(attribute(&attrs, "phone_number"), None);
    }
}
