use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, Select};
use aws_sdk_dynamodb::Client as DynamoClient;
use std::collections::HashMap;

use crate::error::StoreError;
use crate::store::RoleStore;
use crate::types::{Role, RoleAssignment, UserId};

const ROLE_SK: &str = "ROLE";

/// Role assignments stored one item per user:
/// PK=USER#<id>, SK=ROLE, GSI1PK=ROLE#<role>, GSI1SK=USER#<id>
pub struct DynamoRoleStore {
    client: DynamoClient,
    table_name: String,
    role_index_name: String,
}

impl DynamoRoleStore {
    pub fn new(client: DynamoClient, table_name: &str, role_index_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            role_index_name: role_index_name.to_string(),
        }
    }
}

fn user_pk(user_id: &UserId) -> String {
    format!("USER#{}", user_id)
}

fn role_pk(role: Role) -> String {
    format!("ROLE#{}", role)
}

pub fn role_item(assignment: &RoleAssignment) -> HashMap<String, AttributeValue> {
    let pk = user_pk(&assignment.user_id);
    HashMap::from([
        ("PK".to_string(), AttributeValue::S(pk.clone())),
        ("SK".to_string(), AttributeValue::S(ROLE_SK.to_string())),
        ("GSI1PK".to_string(), AttributeValue::S(role_pk(assignment.role))),
        ("GSI1SK".to_string(), AttributeValue::S(pk)),
        (
            "user_id".to_string(),
            AttributeValue::S(assignment.user_id.to_string()),
        ),
        (
            "role".to_string(),
            AttributeValue::S(assignment.role.to_string()),
        ),
        (
            "assigned_at".to_string(),
            AttributeValue::S(assignment.assigned_at.to_rfc3339()),
        ),
    ])
}

pub fn parse_role(item: &HashMap<String, AttributeValue>) -> Result<Role, StoreError> {
    let raw = item
        .get("role")
        .and_then(|v| v.as_s().ok())
        .ok_or_else(|| StoreError::Backend("Role item has no role attribute".to_string()))?;
    raw.parse::<Role>()
        .map_err(|e| StoreError::Backend(format!("Stored role is invalid: {}", e)))
}

#[async_trait]
impl RoleStore for DynamoRoleStore {
    async fn role_exists(&self, role: Role) -> Result<bool, StoreError> {
        let output = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(&self.role_index_name)
            .key_condition_expression("GSI1PK = :pk")
            .expression_attribute_values(":pk", AttributeValue::S(role_pk(role)))
            .select(Select::Count)
            .limit(1)
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to query roles: {:?}", e)))?;

        Ok(output.count() > 0)
    }

    async fn get_role(&self, user_id: &UserId) -> Result<Option<Role>, StoreError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(user_pk(user_id)))
            .key("SK", AttributeValue::S(ROLE_SK.to_string()))
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to fetch role: {:?}", e)))?;

        output.item().map(parse_role).transpose()
    }

    async fn insert_role(&self, assignment: &RoleAssignment) -> Result<(), StoreError> {
        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(role_item(assignment)))
            .condition_expression("attribute_not_exists(PK)")
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let conflict = e
                    .as_service_error()
                    .map(|se| se.is_conditional_check_failed_exception())
                    .unwrap_or(false);
                if conflict {
                    Err(StoreError::Conflict)
                } else {
                    Err(StoreError::Backend(format!("Failed to insert role: {:?}", e)))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_item_keys() {
        let item = role_item(&RoleAssignment::new(UserId::new("U1"), Role::Editor));
        assert_eq!(item["PK"], AttributeValue::S("USER#U1".to_string()));
        assert_eq!(item["SK"], AttributeValue::S("ROLE".to_string()));
        assert_eq!(item["GSI1PK"], AttributeValue::S("ROLE#editor".to_string()));
        assert_eq!(parse_role(&item).unwrap(), Role::Editor);
    }

    #[test]
    fn parse_role_rejects_unknown_value() {
        let item = HashMap::from([("role".to_string(), AttributeValue::S("owner".to_string()))]);
        assert!(matches!(parse_role(&item), Err(StoreError::Backend(_))));
        assert!(parse_role(&HashMap::new()).is_err());
    }
}
