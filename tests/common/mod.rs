//! Common test utilities

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use vendorlist::config::RefreshConfig;
use vendorlist::error::FetchError;
use vendorlist::vendorlist::DocumentFetcher;

pub const LATEST_URL: &str = "https://vendorlist.consensu.org/vendorlist.json";
pub const LATEST_FR_URL: &str = "https://vendorlist.consensu.org/purposes-fr.json";

/// Outcome handed to a gated fetch: a document or an HTTP status
pub type GateResult = Result<Value, u16>;

enum Reply {
    Document(Value),
    Status(u16),
    Gated(oneshot::Receiver<GateResult>),
}

/// In-memory fetcher answering from per-URL scripts
///
/// Unscripted URLs answer 404. Gated replies stay pending until the test
/// releases them, which keeps a refresh cycle in flight.
#[derive(Default)]
pub struct ScriptedFetcher {
    script: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, url: &str, reply: Reply) {
        self.script
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn push_ok(&self, url: &str, document: Value) {
        self.push(url, Reply::Document(document));
    }

    pub fn push_status(&self, url: &str, status: u16) {
        self.push(url, Reply::Status(status));
    }

    pub fn push_gated(&self, url: &str) -> oneshot::Sender<GateResult> {
        let (sender, receiver) = oneshot::channel();
        self.push(url, Reply::Gated(receiver));
        sender
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == url).count()
    }
}

#[async_trait]
impl DocumentFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        let reply = self
            .script
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Reply::Status(404));

        let outcome = match reply {
            Reply::Document(document) => Ok(document),
            Reply::Status(status) => Err(status),
            Reply::Gated(receiver) => receiver.await.unwrap_or(Err(503)),
        };
        outcome.map_err(FetchError::ServerError)
    }
}

/// Vendor list as served by the primary endpoint
pub fn primary_document(version: u64) -> Value {
    json!({
        "vendorListVersion": version,
        "lastUpdated": "2018-05-28T00:00:00Z",
        "purposes": [
            { "id": 1, "name": "Information storage and access" },
            { "id": 2, "name": "Personalisation" }
        ],
        "features": [{ "id": 1, "name": "Matching data to offline sources" }],
        "vendors": [{ "id": 1, "name": "Globex", "purposeIds": [1, 2] }]
    })
}

/// French overlay for [`primary_document`]
pub fn french_document() -> Value {
    json!({
        "purposes": [
            { "id": 1, "name": "Stockage et accès aux informations" },
            { "id": 2, "name": "Personnalisation" }
        ],
        "features": [{ "id": 1, "name": "Mise en correspondance avec des sources hors ligne" }]
    })
}

/// One hour refresh, one minute retry
pub fn hourly_config(language: Option<&str>) -> RefreshConfig {
    let mut builder = RefreshConfig::builder()
        .refresh_interval(Duration::from_millis(3_600_000))
        .retry_interval(Duration::from_millis(60_000));
    if let Some(language) = language {
        builder = builder.language(language);
    }
    builder.build().unwrap()
}

/// Let spawned tasks run until they block
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
