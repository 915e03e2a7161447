use crate::errors::StoreError;
use crate::table::{AttributeSet, Item, QueryPage, TableKey, TodoTable};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Mutex;

/// 開発/テスト用のインメモリテーブル
///
/// DynamoDB と同じ振る舞いに寄せている: put は置換、update は存在しないキーでも
/// アイテムを作成（アップサート）し更新後の全属性を返す、delete は常に成功。
#[derive(Debug, Default)]
pub struct InMemoryTodoTable {
    items: Mutex<BTreeMap<TableKey, Item>>,
    page_size: Option<usize>,
}

impl InMemoryTodoTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 1 回のクエリで返す件数を制限する（打ち切りの再現用）
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            items: Mutex::default(),
            page_size: Some(page_size.max(1)),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().map(|items| items.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 保存されているアイテムをそのまま取得する（検証用）
    pub fn get(&self, key: &TableKey) -> Option<Item> {
        self.lock().ok()?.get(key).cloned()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<TableKey, Item>>, StoreError> {
        self.items
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory table lock poisoned".to_string()))
    }
}

#[async_trait]
impl TodoTable for InMemoryTodoTable {
    async fn query(&self, user_id: &str, start: Option<Item>) -> Result<QueryPage, StoreError> {
        let items = self.lock()?;

        let lower = match start {
            Some(start_key) => {
                let key = TableKey::from_item(&start_key).ok_or_else(|| {
                    StoreError::Backend("exclusive start key is missing key attributes".to_string())
                })?;
                if key.user_id != user_id {
                    return Err(StoreError::Backend(
                        "exclusive start key does not belong to the queried partition".to_string(),
                    ));
                }
                Bound::Excluded(key)
            }
            None => Bound::Included(TableKey::new(user_id, "")),
        };

        let partition = items
            .range((lower, Bound::Unbounded))
            .take_while(|(key, _)| key.user_id == user_id);

        let mut page = Vec::new();
        let mut last_key = None;
        for (key, item) in partition {
            page.push(item.clone());
            last_key = Some(key.clone());
            if self.page_size == Some(page.len()) {
                break;
            }
        }

        // DynamoDB の Limit と同じく、件数が上限に達したら残りがなくても続きのキーを返す
        let limit_reached = self.page_size == Some(page.len());
        let last_evaluated_key = last_key.filter(|_| limit_reached).map(|key| key.to_item());

        Ok(QueryPage {
            items: page,
            last_evaluated_key,
        })
    }

    async fn put(&self, item: Item) -> Result<(), StoreError> {
        let key = TableKey::from_item(&item).ok_or_else(|| {
            StoreError::Backend("item is missing key attributes".to_string())
        })?;
        self.lock()?.insert(key, item);
        Ok(())
    }

    async fn update(&self, key: TableKey, set: AttributeSet) -> Result<Option<Item>, StoreError> {
        if set.is_empty() {
            return Err(StoreError::Backend("update requires at least one attribute".to_string()));
        }

        let mut items = self.lock()?;
        let item = items.entry(key.clone()).or_insert_with(|| key.to_item());
        for (name, value) in set.entries() {
            item.insert(name.to_string(), value.clone());
        }

        Ok(Some(item.clone()))
    }

    async fn delete(&self, key: TableKey) -> Result<(), StoreError> {
        self.lock()?.remove(&key);
        Ok(())
    }
}
