//! DynamoDB Local に対する統合テスト
//!
//! `docker run -p 8000:8000 amazon/dynamodb-local` で起動しておく。
//! 接続先は環境変数 DYNAMODB_ENDPOINT で変更可能。起動していない場合はスキップする。

use anyhow::Result;
use aws_sdk_dynamodb::config::Credentials;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType,
};
use aws_sdk_dynamodb::Client;
use domain::{TodoId, TodoRecord, TodoUpdatePatch, UserId};
use infrastructure::{
    build_dynamodb_client, DynamoDbTodoTable, StoreError, TodoRecordStore, TODO_ID_ATTR,
    USER_ID_ATTR,
};
use shared::Config;
use std::sync::Arc;

const TEST_TABLE: &str = "Todos-IntegrationTest";

fn test_config() -> Config {
    Config {
        todos_table: Some(TEST_TABLE.to_string()),
        aws_region: "us-east-1".to_string(),
        dynamodb_endpoint: Some(
            std::env::var("DYNAMODB_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
        ),
    }
}

/// DynamoDB Local 用のダミー認証情報を持つクライアント
async fn local_client(config: &Config) -> Client {
    let base = build_dynamodb_client(config).await;
    let local = base
        .config()
        .to_builder()
        .credentials_provider(Credentials::new("test", "test", None, None, "test"))
        .build();
    Client::from_conf(local)
}

async fn ensure_table(client: &Client) -> Result<()> {
    if client
        .describe_table()
        .table_name(TEST_TABLE)
        .send()
        .await
        .is_ok()
    {
        return Ok(());
    }

    let created = client
        .create_table()
        .table_name(TEST_TABLE)
        .billing_mode(BillingMode::PayPerRequest)
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name(USER_ID_ATTR)
                .attribute_type(ScalarAttributeType::S)
                .build()?,
        )
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name(TODO_ID_ATTR)
                .attribute_type(ScalarAttributeType::S)
                .build()?,
        )
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name(USER_ID_ATTR)
                .key_type(KeyType::Hash)
                .build()?,
        )
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name(TODO_ID_ATTR)
                .key_type(KeyType::Range)
                .build()?,
        )
        .send()
        .await;

    // 並行実行中の別テストが先に作成した場合も成功扱い
    if let Err(e) = created {
        client
            .describe_table()
            .table_name(TEST_TABLE)
            .send()
            .await
            .map_err(|_| e)?;
    }

    Ok(())
}

/// 統合テスト用のセットアップ（DynamoDB Local 未起動なら None）
async fn setup_test_environment() -> Option<(TodoRecordStore, UserId)> {
    let _ = shared::init_tracing();
    let config = test_config();
    let client = local_client(&config).await;

    if let Err(e) = ensure_table(&client).await {
        eprintln!("⚠ 統合テストスキップ (DynamoDB Local未起動?): {e}");
        return None;
    }

    let table = DynamoDbTodoTable::from_config(client, &config);
    let user_id = UserId::from_string(format!("test_user_{}", TodoId::new())).ok()?;
    Some((TodoRecordStore::new(Arc::new(table)), user_id))
}

#[tokio::test]
async fn test_crud_lifecycle_against_dynamodb_local() {
    let Some((store, user_id)) = setup_test_environment().await else {
        return;
    };

    let created = store
        .create(TodoRecord::new(user_id.clone(), "Buy milk", "2024-02-01"))
        .await
        .unwrap();

    let page = store.list_by_user(&user_id, None).await.unwrap();
    assert_eq!(page.items, vec![created.clone()]);

    let updated = store
        .update(
            &created.todo_id,
            &user_id,
            TodoUpdatePatch {
                name: "Buy milk and eggs".to_string(),
                due_date: "2024-02-02".to_string(),
                done: true,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Buy milk and eggs");
    assert_eq!(updated.created_at, created.created_at);

    let attached = store
        .attach_url(&created.todo_id, &user_id, "https://example.com/f.png")
        .await
        .unwrap();
    assert_eq!(attached.attachment_url.as_deref(), Some("https://example.com/f.png"));
    assert_eq!(attached.name, updated.name);

    store.delete(&created.todo_id, &user_id).await.unwrap();
    store.delete(&created.todo_id, &user_id).await.unwrap();

    let page = store.list_by_user(&user_id, None).await.unwrap();
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn test_update_of_missing_item_is_backend_upsert() {
    let Some((store, user_id)) = setup_test_environment().await else {
        return;
    };
    let missing = TodoId::new();

    let result = store
        .attach_url(&missing, &user_id, "https://example.com/f.png")
        .await;

    // UpdateItem は存在しないキーでもアイテムを作るため、作成日時の欠けたレコードになる
    assert!(matches!(result, Err(StoreError::Malformed(_))));

    // 残った部分アイテムがあっても一覧は失敗しない
    let page = store.list_by_user(&user_id, None).await.unwrap();
    let partial = page
        .items
        .iter()
        .find(|r| r.todo_id == missing)
        .expect("partial item should be listed");
    assert_eq!(partial.attachment_url.as_deref(), Some("https://example.com/f.png"));

    store.delete(&missing, &user_id).await.unwrap();
}

#[tokio::test]
async fn test_missing_table_name_surfaces_on_first_call() {
    let mut config = test_config();
    config.todos_table = None;
    let client = local_client(&config).await;
    let store = TodoRecordStore::new(Arc::new(DynamoDbTodoTable::from_config(client, &config)));
    let user_id = UserId::from_string("u1").unwrap();

    let result = store.list_by_user(&user_id, None).await;

    assert_eq!(result, Err(StoreError::ConfigurationMissing("TODOS_TABLE")));
}
