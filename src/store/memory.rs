use std::io::Result;

use async_std::sync::Mutex;

use super::{EffectStore, StoredEffect, Table};

/// Keeps records in memory behind a mutex; ids start at 1.
#[derive(Debug, Default)]
pub struct MemoryStore {
  #[allow(clippy::missing_docs_in_private_items)]
  table: Mutex<Table>,
}

impl EffectStore for MemoryStore {
  async fn insert(&self, record: StoredEffect) -> Result<u64> {
    self.table.lock().await.insert(record)
  }

  async fn get(&self, id: u64) -> Result<Option<StoredEffect>> {
    Ok(self.table.lock().await.get(id))
  }

  async fn delete(&self, id: u64) -> Result<()> {
    self.table.lock().await.delete(id);
    Ok(())
  }

  async fn all(&self) -> Result<Vec<StoredEffect>> {
    Ok(self.table.lock().await.all())
  }
}

#[cfg(test)]
mod tests {
  use super::MemoryStore;
  use crate::store::{EffectStore, StoredEffect};

  fn record(id: u64, json: &str) -> StoredEffect {
    StoredEffect {
      id,
      name: "flash".into(),
      json: json.into(),
    }
  }

  #[async_std::test]
  async fn assigns_increasing_ids() {
    let store = MemoryStore::default();
    let first = store.insert(record(0, "{}")).await.expect("inserts");
    let second = store.insert(record(0, "{}")).await.expect("inserts");
    assert_eq!((first, second), (1, 2));
  }

  #[async_std::test]
  async fn conflicting_ids_are_ignored() {
    let store = MemoryStore::default();
    let id = store.insert(record(7, "{\"flashes\":1}")).await.expect("inserts");
    assert_eq!(id, 7);

    store.insert(record(7, "{\"flashes\":2}")).await.expect("inserts");
    let kept = store.get(7).await.expect("loads").expect("present");
    assert_eq!(kept.json, "{\"flashes\":1}");

    assert_eq!(store.insert(record(0, "{}")).await.expect("inserts"), 8);
  }

  #[async_std::test]
  async fn deleting_missing_ids_is_fine() {
    let store = MemoryStore::default();
    store.delete(42).await.expect("deletes");
    assert!(store.all().await.expect("loads").is_empty());
    assert_eq!(store.get(42).await.expect("loads"), None);
  }

  #[async_std::test]
  async fn ids_are_not_reused() {
    let store = MemoryStore::default();
    let first = store.insert(record(0, "{}")).await.expect("inserts");
    store.delete(first).await.expect("deletes");
    let second = store.insert(record(0, "{}")).await.expect("inserts");
    assert_ne!(first, second);
  }

  #[async_std::test]
  async fn exhausted_ids_fail() {
    let store = MemoryStore::default();
    let last = store.insert(record(u64::MAX - 1, "{}")).await.expect("inserts");
    assert_eq!(last, u64::MAX - 1);

    assert!(store.insert(record(0, "{}")).await.is_err());
    assert!(store.insert(record(u64::MAX, "{}")).await.is_err());
    assert_eq!(store.all().await.expect("loads").len(), 1);
  }
}
