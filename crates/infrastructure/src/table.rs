use crate::errors::StoreError;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;

/// パーティションキー属性名
pub const USER_ID_ATTR: &str = "userId";
/// ソートキー属性名
pub const TODO_ID_ATTR: &str = "todoId";

/// DynamoDB アイテム（属性名 → 値）
pub type Item = HashMap<String, AttributeValue>;

/// 単一アイテムを指す複合キー
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableKey {
    pub user_id: String,
    pub todo_id: String,
}

impl TableKey {
    pub fn new(user_id: impl Into<String>, todo_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            todo_id: todo_id.into(),
        }
    }

    pub fn to_item(&self) -> Item {
        HashMap::from([
            (USER_ID_ATTR.to_string(), AttributeValue::S(self.user_id.clone())),
            (TODO_ID_ATTR.to_string(), AttributeValue::S(self.todo_id.clone())),
        ])
    }

    /// アイテムからキーを取り出す（キー属性が欠けていれば None）
    pub fn from_item(item: &Item) -> Option<Self> {
        let user_id = item.get(USER_ID_ATTR)?.as_s().ok()?;
        let todo_id = item.get(TODO_ID_ATTR)?.as_s().ok()?;
        Some(Self::new(user_id.as_str(), todo_id.as_str()))
    }
}

/// 上書き対象の属性集合。ここに含まれない属性には触れない
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeSet {
    entries: Vec<(&'static str, AttributeValue)>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: &'static str, value: AttributeValue) -> Self {
        self.entries.push((name, value));
        self
    }

    pub fn entries(&self) -> &[(&'static str, AttributeValue)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `SET #name = :name, ...` 形式の更新式
    /// 属性名はプレースホルダー経由にする（`name` は予約語）
    pub fn update_expression(&self) -> String {
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|(name, _)| format!("#{name} = :{name}"))
            .collect();
        format!("SET {}", parts.join(", "))
    }

    pub fn expression_attribute_names(&self) -> HashMap<String, String> {
        self.entries
            .iter()
            .map(|(name, _)| (format!("#{name}"), name.to_string()))
            .collect()
    }

    pub fn expression_attribute_values(&self) -> HashMap<String, AttributeValue> {
        self.entries
            .iter()
            .map(|(name, value)| (format!(":{name}"), value.clone()))
            .collect()
    }
}

/// クエリ 1 回分の結果。`last_evaluated_key` があれば続きが残っている
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPage {
    pub items: Vec<Item>,
    pub last_evaluated_key: Option<Item>,
}

/// ドキュメントテーブルの 4 つのプリミティブ操作
///
/// 実装は並行呼び出しに対して調整なしで共有できること。
#[async_trait]
pub trait TodoTable: Send + Sync {
    /// パーティションキーが一致するアイテムをソートキー順に返す
    async fn query(&self, user_id: &str, start: Option<Item>) -> Result<QueryPage, StoreError>;

    /// アイテム全体を無条件に書き込む（既存キーは置換）
    async fn put(&self, item: Item) -> Result<(), StoreError>;

    /// 指定属性のみ上書きし、更新後の全属性を返す
    async fn update(&self, key: TableKey, set: AttributeSet) -> Result<Option<Item>, StoreError>;

    /// 無条件に削除する。キーが存在しなくても成功する
    async fn delete(&self, key: TableKey) -> Result<(), StoreError>;
}
