use async_trait::async_trait;
use homesync_core::RemoteStore;
use homesync_core::error::StoreError;
use homesync_core::remote::{Feed, is_empty_snapshot, set_path};
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::sync::mpsc;

use crate::configs::Database;

/// Realtime database reached through its REST interface.
pub struct FirebaseStore {
    client: Client,
    url: String,
    auth: Option<String>,
}

impl FirebaseStore {
    pub fn new(database: &Database) -> Self {
        Self {
            client: Client::new(),
            url: database.url.trim_end_matches('/').to_string(),
            auth: database.auth.clone().filter(|token| !token.is_empty()),
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}.json", self.url, path.trim_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Some(token) => request.query(&[("auth", token)]),
            None => request,
        }
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected { status: status.as_u16(), message });
        }

        Ok(response)
    }
}

#[async_trait]
impl RemoteStore for FirebaseStore {
    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let value: Value = self
            .execute(self.client.get(self.endpoint(path)))
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        Ok((!value.is_null()).then_some(value))
    }

    async fn write(&self, path: &str, value: Value) -> Result<(), StoreError> {
        self.execute(self.client.put(self.endpoint(path)).json(&value)).await?;
        Ok(())
    }

    async fn update(&self, updates: Map<String, Value>) -> Result<(), StoreError> {
        // Multi-path updates are applied atomically at the root.
        self.execute(self.client.patch(self.endpoint("")).json(&updates)).await?;
        Ok(())
    }

    async fn subscribe(&self, path: &str) -> Result<Feed, StoreError> {
        let mut response = self
            .execute(self.client.get(self.endpoint(path)).header(ACCEPT, "text/event-stream"))
            .await?;

        let (tx, rx) = mpsc::channel(16);
        let path = path.to_string();

        tokio::spawn(async move {
            let mut parser = EventParser::default();
            let mut snapshot = Value::Null;

            loop {
                let chunk = match response.chunk().await {
                    Ok(Some(chunk)) => chunk,
                    Ok(None) => {
                        let reason = String::from("event stream ended");
                        tx.send(Err(StoreError::SubscriptionClosed { path, reason })).await.ok();
                        return;
                    }
                    Err(e) => {
                        let reason = e.to_string();
                        tx.send(Err(StoreError::SubscriptionClosed { path, reason })).await.ok();
                        return;
                    }
                };

                for event in parser.feed(&chunk) {
                    match apply_event(&mut snapshot, &event) {
                        Ok(false) => {}
                        Ok(true) => {
                            let current = (!is_empty_snapshot(Some(&snapshot))).then(|| snapshot.clone());
                            if tx.send(Ok(current)).await.is_err() {
                                return;
                            }
                        }
                        Err(reason) => {
                            tx.send(Err(StoreError::SubscriptionClosed { path, reason })).await.ok();
                            return;
                        }
                    }
                }
            }
        });

        Ok(rx)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamEvent {
    pub name: String,
    pub data: String,
}

/// Incremental `text/event-stream` parser.
#[derive(Debug, Default)]
pub struct EventParser {
    buffer: Vec<u8>,
    name: String,
    data: Vec<String>,
}

impl EventParser {
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(end) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=end).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if !self.name.is_empty() || !self.data.is_empty() {
                    events.push(StreamEvent {
                        name: std::mem::take(&mut self.name),
                        data: std::mem::take(&mut self.data).join("\n"),
                    });
                }
                continue;
            }

            let (field, value) = line.split_once(':').unwrap_or((line, ""));
            let value = value.strip_prefix(' ').unwrap_or(value);

            match field {
                "event" => self.name = value.to_string(),
                "data" => self.data.push(value.to_string()),
                _ => {}
            }
        }

        events
    }
}

#[derive(Debug, Deserialize)]
struct ChangeData {
    path: String,
    data: Value,
}

/// Applies a database event to `snapshot`. Returns whether the snapshot changed,
/// or the reason the subscription ended.
pub fn apply_event(snapshot: &mut Value, event: &StreamEvent) -> Result<bool, String> {
    match event.name.as_str() {
        "put" => {
            let change: ChangeData = serde_json::from_str(&event.data).map_err(|e| e.to_string())?;
            set_path(snapshot, &change.path, change.data);
            Ok(true)
        }
        "patch" => {
            let change: ChangeData = serde_json::from_str(&event.data).map_err(|e| e.to_string())?;
            let Value::Object(fields) = change.data else {
                return Ok(false);
            };

            for (key, value) in fields {
                set_path(snapshot, &format!("{}/{}", change.path, key), value);
            }
            Ok(true)
        }
        "keep-alive" => Ok(false),
        "cancel" => Err(format!("cancelled: {}", event.data)),
        "auth_revoked" => Err(String::from("credential expired")),
        other => {
            tracing::debug!("ignore database event {}", other);
            Ok(false)
        }
    }
}
