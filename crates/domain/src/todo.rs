use crate::errors::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 所有者を識別する不透明な文字列（パーティションキー）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn from_string(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidUserId("empty user id".to_string()));
        }
        Ok(Self(id))
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

/// ユーザー内で一意な ToDo 識別子（ソートキー）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    /// ULID で新しい ID を生成
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    pub fn from_string(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidTodoId("empty todo id".to_string()));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// ULID 形式の場合のみ生成時刻（ミリ秒）を返す
    pub fn timestamp_ms(&self) -> Option<u64> {
        ulid::Ulid::from_string(&self.0)
            .ok()
            .map(|ulid| ulid.timestamp_ms())
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// テーブルに保存される ToDo レコード
///
/// (`user_id`, `todo_id`) が一意キー。`created_at` は作成時に一度だけ設定され、
/// `attachment_url` は添付専用の操作でのみ書き換わる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoRecord {
    pub user_id: UserId,
    pub todo_id: TodoId,
    pub name: String,
    pub due_date: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
}

impl TodoRecord {
    /// 新規レコードを組み立てる。ID と作成日時はここで採番する
    pub fn new(user_id: UserId, name: impl Into<String>, due_date: impl Into<String>) -> Self {
        Self {
            user_id,
            todo_id: TodoId::new(),
            name: name.into(),
            due_date: due_date.into(),
            done: false,
            created_at: Utc::now(),
            attachment_url: None,
        }
    }

    /// パッチを適用した後の状態（ストアの上書きと同じ規則）
    pub fn patched(&self, patch: &TodoUpdatePatch) -> Self {
        Self {
            name: patch.name.clone(),
            due_date: patch.due_date.clone(),
            done: patch.done,
            ..self.clone()
        }
    }
}

/// 更新操作の入力。3 項目すべて必須で、既存値とのマージは行わない
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoUpdatePatch {
    pub name: String,
    pub due_date: String,
    pub done: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> TodoRecord {
        TodoRecord {
            user_id: UserId::from_string("u1").unwrap(),
            todo_id: TodoId::from_string("t1").unwrap(),
            name: "Buy milk".to_string(),
            due_date: "2024-02-01".to_string(),
            done: false,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            attachment_url: None,
        }
    }

    #[test]
    fn test_todo_id_new_generates_ulid() {
        let todo_id = TodoId::new();

        assert_eq!(todo_id.as_str().len(), 26);
        assert!(todo_id.timestamp_ms().is_some());
    }

    #[test]
    fn test_empty_ids_are_rejected() {
        assert_eq!(
            UserId::from_string("  "),
            Err(DomainError::InvalidUserId("empty user id".to_string()))
        );
        assert!(TodoId::from_string("").is_err());
    }

    #[test]
    fn test_record_serializes_with_camel_case_attributes() {
        let json = serde_json::to_value(sample()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "userId": "u1",
                "todoId": "t1",
                "name": "Buy milk",
                "dueDate": "2024-02-01",
                "done": false,
                "createdAt": "2024-01-01T00:00:00Z"
            })
        );
    }

    #[test]
    fn test_record_without_attachment_deserializes() {
        let json = r#"{"userId":"u1","todoId":"t1","name":"Buy milk","dueDate":"2024-02-01","done":false,"createdAt":"2024-01-01T00:00:00Z"}"#;

        let record: TodoRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record, sample());
    }

    #[test]
    fn test_new_record_defaults() {
        let user_id = UserId::from_string("u1").unwrap();

        let record = TodoRecord::new(user_id.clone(), "Read", "2024-03-01");

        assert_eq!(record.user_id, user_id);
        assert!(!record.done);
        assert!(record.attachment_url.is_none());
        assert!(record.todo_id.timestamp_ms().is_some());
    }

    #[test]
    fn test_patched_keeps_created_at_and_attachment() {
        let mut record = sample();
        record.attachment_url = Some("https://example.com/f.png".to_string());
        let patch = TodoUpdatePatch {
            name: "A".to_string(),
            due_date: "2024-01-01".to_string(),
            done: true,
        };

        let patched = record.patched(&patch);

        assert_eq!(patched.name, "A");
        assert_eq!(patched.due_date, "2024-01-01");
        assert!(patched.done);
        assert_eq!(patched.created_at, record.created_at);
        assert_eq!(patched.attachment_url, record.attachment_url);
    }
}
