use crate::errors::{from_sdk_error, StoreError};
use crate::table::{AttributeSet, Item, QueryPage, TableKey, TodoTable, USER_ID_ATTR};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use shared::Config;
use tracing::{debug, error};

/// 設定からクライアントを構築する（コンポジションルート用）
/// `dynamodb_endpoint` があれば DynamoDB Local などに向ける
pub async fn build_dynamodb_client(config: &Config) -> Client {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()));

    if let Some(endpoint) = &config.dynamodb_endpoint {
        loader = loader.endpoint_url(endpoint);
    }

    let aws_config = loader.load().await;
    Client::new(&aws_config)
}

/// DynamoDB 上の ToDo テーブル
#[derive(Clone)]
pub struct DynamoDbTodoTable {
    client: Client,
    table_name: Option<String>,
}

impl DynamoDbTodoTable {
    /// テーブル名の欠落はここでは検証しない（最初の操作で失敗する）
    pub fn new(client: Client, table_name: Option<String>) -> Self {
        Self { client, table_name }
    }

    pub fn from_config(client: Client, config: &Config) -> Self {
        Self::new(client, config.todos_table.clone())
    }

    pub fn table_name(&self) -> Result<&str, StoreError> {
        self.table_name
            .as_deref()
            .ok_or(StoreError::ConfigurationMissing("TODOS_TABLE"))
    }
}

fn request_failed<E, R>(operation: &'static str, table: &str, e: SdkError<E, R>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let err = from_sdk_error(e);
    error!(operation, table, error = %err, "DynamoDB request failed");
    err
}

#[async_trait]
impl TodoTable for DynamoDbTodoTable {
    async fn query(&self, user_id: &str, start: Option<Item>) -> Result<QueryPage, StoreError> {
        let table = self.table_name()?;
        debug!(table, user_id, "DynamoDB query");

        let output = self
            .client
            .query()
            .table_name(table)
            .key_condition_expression("#pk = :pk")
            .expression_attribute_names("#pk", USER_ID_ATTR)
            .expression_attribute_values(":pk", AttributeValue::S(user_id.to_string()))
            .set_exclusive_start_key(start)
            .send()
            .await
            .map_err(|e| request_failed("query", table, e))?;

        Ok(QueryPage {
            items: output.items.unwrap_or_default(),
            last_evaluated_key: output.last_evaluated_key,
        })
    }

    async fn put(&self, item: Item) -> Result<(), StoreError> {
        let table = self.table_name()?;
        debug!(table, "DynamoDB put_item");

        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| request_failed("put_item", table, e))?;

        Ok(())
    }

    async fn update(&self, key: TableKey, set: AttributeSet) -> Result<Option<Item>, StoreError> {
        let table = self.table_name()?;
        if set.is_empty() {
            return Err(StoreError::Backend("update requires at least one attribute".to_string()));
        }
        debug!(table, user_id = %key.user_id, todo_id = %key.todo_id, "DynamoDB update_item");

        let output = self
            .client
            .update_item()
            .table_name(table)
            .set_key(Some(key.to_item()))
            .update_expression(set.update_expression())
            .set_expression_attribute_names(Some(set.expression_attribute_names()))
            .set_expression_attribute_values(Some(set.expression_attribute_values()))
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| request_failed("update_item", table, e))?;

        Ok(output.attributes)
    }

    async fn delete(&self, key: TableKey) -> Result<(), StoreError> {
        let table = self.table_name()?;
        debug!(table, user_id = %key.user_id, todo_id = %key.todo_id, "DynamoDB delete_item");

        self.client
            .delete_item()
            .table_name(table)
            .set_key(Some(key.to_item()))
            .send()
            .await
            .map_err(|e| request_failed("delete_item", table, e))?;

        Ok(())
    }
}
