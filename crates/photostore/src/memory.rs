//! In-memory store backend
//!
//! One keyspace of hash and set values behind a single `RwLock`; batches
//! apply under one write-lock acquisition, which makes them atomic with
//! respect to every other call.

use ahash::{AHashMap, AHashSet};
use async_trait::async_trait;
use parking_lot::RwLock;
use rand::Rng;

use crate::error::{Error, Result};
use crate::store::{BatchOp, Store};

enum Value {
    Hash(AHashMap<String, String>),
    Set(AHashSet<String>),
}

/// In-process [`Store`] implementation with Redis-like collection semantics
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<AHashMap<String, Value>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys of any kind
    pub fn key_count(&self) -> usize {
        self.data.read().len()
    }
}

fn hash_entry<'a>(
    data: &'a mut AHashMap<String, Value>,
    key: &str,
) -> Result<&'a mut AHashMap<String, String>> {
    match data
        .entry(key.to_string())
        .or_insert_with(|| Value::Hash(AHashMap::new()))
    {
        Value::Hash(fields) => Ok(fields),
        Value::Set(_) => Err(Error::WrongType(key.to_string())),
    }
}

fn set_entry<'a>(
    data: &'a mut AHashMap<String, Value>,
    key: &str,
) -> Result<&'a mut AHashSet<String>> {
    match data
        .entry(key.to_string())
        .or_insert_with(|| Value::Set(AHashSet::new()))
    {
        Value::Set(members) => Ok(members),
        Value::Hash(_) => Err(Error::WrongType(key.to_string())),
    }
}

fn hash_set_locked(
    data: &mut AHashMap<String, Value>,
    key: &str,
    field: &str,
    value: &str,
) -> Result<()> {
    hash_entry(data, key)?.insert(field.to_string(), value.to_string());
    Ok(())
}

fn set_add_locked(data: &mut AHashMap<String, Value>, key: &str, members: &[String]) -> Result<()> {
    if members.is_empty() {
        return Ok(());
    }
    let set = set_entry(data, key)?;
    for member in members {
        set.insert(member.clone());
    }
    Ok(())
}

#[async_trait]
impl Store for MemoryStore {
    async fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<()> {
        hash_set_locked(&mut self.data.write(), key, field, value)
    }

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>> {
        match self.data.read().get(key) {
            Some(Value::Hash(fields)) => Ok(fields.get(field).cloned()),
            Some(Value::Set(_)) => Err(Error::WrongType(key.to_string())),
            None => Ok(None),
        }
    }

    async fn hash_get_all(&self, key: &str) -> Result<Vec<(String, String)>> {
        match self.data.read().get(key) {
            Some(Value::Hash(fields)) => Ok(fields
                .iter()
                .map(|(f, v)| (f.clone(), v.clone()))
                .collect()),
            Some(Value::Set(_)) => Err(Error::WrongType(key.to_string())),
            None => Ok(Vec::new()),
        }
    }

    async fn hash_len(&self, key: &str) -> Result<usize> {
        match self.data.read().get(key) {
            Some(Value::Hash(fields)) => Ok(fields.len()),
            Some(Value::Set(_)) => Err(Error::WrongType(key.to_string())),
            None => Ok(0),
        }
    }

    async fn hash_del(&self, key: &str, field: &str) -> Result<()> {
        let mut data = self.data.write();
        let emptied = match data.get_mut(key) {
            Some(Value::Hash(fields)) => {
                fields.remove(field);
                fields.is_empty()
            }
            Some(Value::Set(_)) => return Err(Error::WrongType(key.to_string())),
            None => return Ok(()),
        };
        if emptied {
            data.remove(key);
        }
        Ok(())
    }

    async fn hash_random_field(&self, key: &str) -> Result<Option<String>> {
        match self.data.read().get(key) {
            Some(Value::Hash(fields)) => {
                if fields.is_empty() {
                    return Ok(None);
                }
                let idx = rand::rng().random_range(0..fields.len());
                Ok(fields.keys().nth(idx).cloned())
            }
            Some(Value::Set(_)) => Err(Error::WrongType(key.to_string())),
            None => Ok(None),
        }
    }

    async fn set_add(&self, key: &str, members: &[String]) -> Result<()> {
        set_add_locked(&mut self.data.write(), key, members)
    }

    async fn set_remove(&self, key: &str, members: &[String]) -> Result<()> {
        let mut data = self.data.write();
        let emptied = match data.get_mut(key) {
            Some(Value::Set(set)) => {
                for member in members {
                    set.remove(member);
                }
                set.is_empty()
            }
            Some(Value::Hash(_)) => return Err(Error::WrongType(key.to_string())),
            None => return Ok(()),
        };
        if emptied {
            data.remove(key);
        }
        Ok(())
    }

    async fn set_union(&self, keys: &[String]) -> Result<Vec<String>> {
        let data = self.data.read();
        let mut union = AHashSet::new();
        for key in keys {
            match data.get(key.as_str()) {
                Some(Value::Set(members)) => union.extend(members.iter().cloned()),
                Some(Value::Hash(_)) => return Err(Error::WrongType(key.clone())),
                None => {}
            }
        }
        Ok(union.into_iter().collect())
    }

    async fn set_card(&self, key: &str) -> Result<usize> {
        match self.data.read().get(key) {
            Some(Value::Set(members)) => Ok(members.len()),
            Some(Value::Hash(_)) => Err(Error::WrongType(key.to_string())),
            None => Ok(0),
        }
    }

    async fn delete_key(&self, key: &str) -> Result<()> {
        self.data.write().remove(key);
        Ok(())
    }

    async fn scan_keys(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .data
            .read()
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn apply_batch(&self, ops: Vec<BatchOp>) -> Result<()> {
        let mut data = self.data.write();
        for op in ops {
            match op {
                BatchOp::HashSet { key, field, value } => {
                    hash_set_locked(&mut data, &key, &field, &value)?;
                }
                BatchOp::SetAdd { key, members } => {
                    set_add_locked(&mut data, &key, &members)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_ops() {
        let store = MemoryStore::new();

        store.hash_set("h", "a", "1").await.unwrap();
        store.hash_set("h", "b", "2").await.unwrap();

        assert_eq!(store.hash_get("h", "a").await.unwrap(), Some("1".into()));
        assert_eq!(store.hash_get("h", "missing").await.unwrap(), None);
        assert_eq!(store.hash_len("h").await.unwrap(), 2);

        let mut all = store.hash_get_all("h").await.unwrap();
        all.sort();
        assert_eq!(all, vec![("a".into(), "1".into()), ("b".into(), "2".into())]);
    }

    #[tokio::test]
    async fn test_hash_del_removes_empty_key() {
        let store = MemoryStore::new();

        store.hash_set("h", "a", "1").await.unwrap();
        store.hash_del("h", "a").await.unwrap();

        assert_eq!(store.hash_len("h").await.unwrap(), 0);
        assert!(store.scan_keys("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_hash_random_field() {
        let store = MemoryStore::new();

        assert_eq!(store.hash_random_field("h").await.unwrap(), None);

        store.hash_set("h", "only", "1").await.unwrap();
        assert_eq!(
            store.hash_random_field("h").await.unwrap(),
            Some("only".into())
        );

        store.hash_set("h", "other", "2").await.unwrap();
        let picked = store.hash_random_field("h").await.unwrap().unwrap();
        assert!(picked == "only" || picked == "other");
    }

    #[tokio::test]
    async fn test_set_ops() {
        let store = MemoryStore::new();

        store
            .set_add("s", &["a".into(), "b".into()])
            .await
            .unwrap();
        assert_eq!(store.set_card("s").await.unwrap(), 2);

        store.set_add("t", &["b".into(), "c".into()]).await.unwrap();
        let mut union = store
            .set_union(&["s".into(), "t".into(), "missing".into()])
            .await
            .unwrap();
        union.sort();
        assert_eq!(union, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_set_remove_deletes_empty_key() {
        let store = MemoryStore::new();

        store.set_add("s", &["a".into()]).await.unwrap();
        store.set_remove("s", &["a".into()]).await.unwrap();

        assert_eq!(store.set_card("s").await.unwrap(), 0);
        assert!(store.scan_keys("s").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_add_empty_is_noop() {
        let store = MemoryStore::new();

        store.set_add("s", &[]).await.unwrap();
        assert!(store.scan_keys("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scan_keys_by_prefix() {
        let store = MemoryStore::new();

        store.set_add("category::cats", &["a".into()]).await.unwrap();
        store.set_add("category::dogs", &["b".into()]).await.unwrap();
        store.hash_set("photos", "a", "1").await.unwrap();

        let mut keys = store.scan_keys("category::").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["category::cats", "category::dogs"]);
    }

    #[tokio::test]
    async fn test_delete_key() {
        let store = MemoryStore::new();

        store.hash_set("h", "a", "1").await.unwrap();
        store.delete_key("h").await.unwrap();
        store.delete_key("missing").await.unwrap();

        assert_eq!(store.hash_get("h", "a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_wrong_type() {
        let store = MemoryStore::new();

        store.hash_set("h", "a", "1").await.unwrap();
        let result = store.set_add("h", &["x".into()]).await;
        assert!(matches!(result, Err(Error::WrongType(_))));

        store.set_add("s", &["x".into()]).await.unwrap();
        let result = store.hash_get("s", "a").await;
        assert!(matches!(result, Err(Error::WrongType(_))));
    }

    #[tokio::test]
    async fn test_apply_batch() {
        let store = MemoryStore::new();

        store
            .apply_batch(vec![
                BatchOp::HashSet {
                    key: "photos".into(),
                    field: "a.png".into(),
                    value: "record".into(),
                },
                BatchOp::SetAdd {
                    key: "categories_names".into(),
                    members: vec!["cats".into()],
                },
                BatchOp::SetAdd {
                    key: "category::cats".into(),
                    members: vec!["a.png".into()],
                },
                BatchOp::SetAdd {
                    key: "category::empty".into(),
                    members: vec![],
                },
            ])
            .await
            .unwrap();

        assert_eq!(
            store.hash_get("photos", "a.png").await.unwrap(),
            Some("record".into())
        );
        assert_eq!(store.set_card("category::cats").await.unwrap(), 1);
        // zero-member adds must not materialize a key
        assert!(store
            .scan_keys("category::empty")
            .await
            .unwrap()
            .is_empty());
    }
}
