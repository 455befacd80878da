use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::{mpsc, watch};
use tracing::debug;

use crate::error::StoreError;

pub const ROOMS_PATH: &str = "rooms";
pub const DEVICES_PATH: &str = "devices";

/// Stream of snapshots at a subscribed path. `None` means nothing is stored there.
pub type Feed = mpsc::Receiver<Result<Option<Value>, StoreError>>;

/// Realtime tree-shaped remote store addressed by slash separated paths.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError>;

    async fn write(&self, path: &str, value: Value) -> Result<(), StoreError>;

    /// Writes several paths at once, e.g. `{"rooms/kitchen/controls/fan": true}`.
    async fn update(&self, updates: Map<String, Value>) -> Result<(), StoreError>;

    /// Delivers the current snapshot at `path`, then one snapshot per change.
    async fn subscribe(&self, path: &str) -> Result<Feed, StoreError>;
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// Value stored at `path`, treating `null` as absent.
pub fn get_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut node = root;
    for segment in segments(path) {
        node = node.as_object()?.get(segment)?;
    }

    (!node.is_null()).then_some(node)
}

/// Stores `value` at `path`, creating intermediate objects. Writing `null` removes the entry.
pub fn set_path(root: &mut Value, path: &str, value: Value) {
    let parts: Vec<&str> = segments(path).collect();
    let Some((last, parents)) = parts.split_last() else {
        *root = value;
        return;
    };

    let mut node = root;
    for segment in parents {
        node = ensure_object(node)
            .entry(segment.to_string())
            .or_insert(Value::Null);
    }

    let map = ensure_object(node);
    if value.is_null() {
        map.remove(*last);
    } else {
        map.insert(last.to_string(), value);
    }
}

fn ensure_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }

    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was replaced with an object"),
    }
}

/// Snapshot semantics: an empty object is the same as nothing stored.
pub fn is_empty_snapshot(snapshot: Option<&Value>) -> bool {
    match snapshot {
        None | Some(Value::Null) => true,
        Some(Value::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}

/// Process-local [`RemoteStore`], used when no realtime database is configured and in tests.
pub struct MemoryStore {
    root: watch::Sender<Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_root(Value::Object(Map::new()))
    }

    pub fn with_root(root: Value) -> Self {
        let (root, _) = watch::channel(root);
        Self { root }
    }

    pub fn snapshot(&self, path: &str) -> Option<Value> {
        get_path(&self.root.borrow(), path).cloned()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.snapshot(path))
    }

    async fn write(&self, path: &str, value: Value) -> Result<(), StoreError> {
        self.root.send_modify(|root| set_path(root, path, value));
        Ok(())
    }

    async fn update(&self, updates: Map<String, Value>) -> Result<(), StoreError> {
        self.root.send_modify(|root| {
            for (path, value) in updates {
                set_path(root, &path, value);
            }
        });
        Ok(())
    }

    async fn subscribe(&self, path: &str) -> Result<Feed, StoreError> {
        let (tx, rx) = mpsc::channel(16);
        let mut root = self.root.subscribe();
        let path = path.to_string();

        tokio::spawn(async move {
            let mut last: Option<Option<Value>> = None;
            loop {
                let current = get_path(&root.borrow_and_update(), &path).cloned();
                if last.as_ref() != Some(&current) {
                    if tx.send(Ok(current.clone())).await.is_err() {
                        break;
                    }
                    last = Some(current);
                }

                if root.changed().await.is_err() {
                    break;
                }
            }

            debug!("memory store feed for {} closed", path);
        });

        Ok(rx)
    }
}
