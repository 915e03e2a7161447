//! ToDo レコードのデータアクセス層
//!
//! 5 つの操作（一覧・作成・更新・削除・添付 URL 設定）を、テーブルの 4 つの
//! プリミティブ（query / put / update / delete）へそのまま対応させる。
//! 各操作はバックエンドへの 1 リクエストのみで、存在確認・条件付き書き込み・
//! リトライ・キャッシュは行わない。

use crate::errors::StoreError;
use crate::table::{AttributeSet, Item, TableKey, TodoTable};
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use domain::{TodoId, TodoRecord, TodoUpdatePatch, UserId};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// 一覧取得の続きを指す不透明なトークン（バックエンドの LastEvaluatedKey）
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuationToken(Item);

impl ContinuationToken {
    fn into_item(self) -> Item {
        self.0
    }
}

/// 一覧取得 1 回分の結果
#[derive(Debug, Clone, PartialEq)]
pub struct TodoPage {
    pub items: Vec<TodoRecord>,
    /// 件数上限に達した場合に Some（続きが空のこともある）
    pub next: Option<ContinuationToken>,
}

/// 一覧で読み出すアイテムの形
///
/// 存在しないキーへの update はバックエンドによっては部分的なアイテムを残す。
/// 一覧がそれで失敗しないよう、キー以外の属性は欠けていても既定値で埋める。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListedTodo {
    user_id: UserId,
    todo_id: TodoId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    due_date: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    attachment_url: Option<String>,
}

impl ListedTodo {
    fn is_partial(&self) -> bool {
        self.created_at.is_none()
    }
}

impl From<ListedTodo> for TodoRecord {
    // createdAt のないアイテムは UNIX エポックとして返す
    fn from(item: ListedTodo) -> Self {
        Self {
            user_id: item.user_id,
            todo_id: item.todo_id,
            name: item.name,
            due_date: item.due_date,
            done: item.done,
            created_at: item.created_at.unwrap_or_default(),
            attachment_url: item.attachment_url,
        }
    }
}

/// 削除の受領通知。対象が存在したかどうかは区別しない
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteAck;

#[derive(Clone)]
pub struct TodoRecordStore {
    table: Arc<dyn TodoTable>,
}

impl TodoRecordStore {
    pub fn new(table: Arc<dyn TodoTable>) -> Self {
        Self { table }
    }

    /// ユーザーの ToDo をバックエンドの並び順（ソートキー順）で返す
    ///
    /// ページをまたいだ取得はしない。`next` が返ったら呼び出し側が渡し直す。
    pub async fn list_by_user(
        &self,
        user_id: &UserId,
        start: Option<ContinuationToken>,
    ) -> Result<TodoPage, StoreError> {
        debug!(user_id = %user_id, resumed = start.is_some(), "Getting todos");

        let page = self
            .table
            .query(user_id.as_str(), start.map(ContinuationToken::into_item))
            .await?;

        let listed = page
            .items
            .into_iter()
            .map(serde_dynamo::from_item)
            .collect::<Result<Vec<ListedTodo>, _>>()?;

        let items: Vec<TodoRecord> = listed
            .into_iter()
            .inspect(|item| {
                if item.is_partial() {
                    warn!(
                        user_id = %item.user_id,
                        todo_id = %item.todo_id,
                        "Listed todo is missing createdAt"
                    );
                }
            })
            .map(TodoRecord::from)
            .collect();

        debug!(user_id = %user_id, count = items.len(), "Todos fetched");

        Ok(TodoPage {
            items,
            next: page.last_evaluated_key.map(ContinuationToken),
        })
    }

    /// レコード全体を無条件に書き込み、受け取ったレコードをそのまま返す
    pub async fn create(&self, record: TodoRecord) -> Result<TodoRecord, StoreError> {
        debug!(user_id = %record.user_id, todo_id = %record.todo_id, "Creating todo");

        let item: Item = serde_dynamo::to_item(&record)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.table.put(item).await?;

        Ok(record)
    }

    /// name / dueDate / done のみ上書きし、更新後のレコードを返す
    pub async fn update(
        &self,
        todo_id: &TodoId,
        user_id: &UserId,
        patch: TodoUpdatePatch,
    ) -> Result<TodoRecord, StoreError> {
        debug!(user_id = %user_id, todo_id = %todo_id, "Updating todo");

        let set = AttributeSet::new()
            .set("name", AttributeValue::S(patch.name))
            .set("dueDate", AttributeValue::S(patch.due_date))
            .set("done", AttributeValue::Bool(patch.done));

        self.update_attributes(todo_id, user_id, set).await
    }

    /// 無条件に削除する
    ///
    /// 存在しないキーでも成功する。存在確認が必要なら事前に読み出すこと。
    pub async fn delete(
        &self,
        todo_id: &TodoId,
        user_id: &UserId,
    ) -> Result<DeleteAck, StoreError> {
        debug!(user_id = %user_id, todo_id = %todo_id, "Deleting todo");

        self.table
            .delete(TableKey::new(user_id.as_str(), todo_id.as_str()))
            .await?;

        Ok(DeleteAck)
    }

    /// attachmentUrl のみ上書きする（URL の形式は検証しない）
    pub async fn attach_url(
        &self,
        todo_id: &TodoId,
        user_id: &UserId,
        url: impl Into<String>,
    ) -> Result<TodoRecord, StoreError> {
        debug!(user_id = %user_id, todo_id = %todo_id, "Updating attachment");

        let set = AttributeSet::new().set("attachmentUrl", AttributeValue::S(url.into()));

        self.update_attributes(todo_id, user_id, set).await
    }

    // 存在しないキーへの更新はバックエンド次第: 属性なしなら NotFound、
    // DynamoDB のアップサートで部分的なアイテムができた場合は Malformed になる
    async fn update_attributes(
        &self,
        todo_id: &TodoId,
        user_id: &UserId,
        set: AttributeSet,
    ) -> Result<TodoRecord, StoreError> {
        let attributes = self
            .table
            .update(TableKey::new(user_id.as_str(), todo_id.as_str()), set)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                user_id: user_id.to_string(),
                todo_id: todo_id.to_string(),
            })?;

        Ok(serde_dynamo::from_item(attributes)?)
    }
}
