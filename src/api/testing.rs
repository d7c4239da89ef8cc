// Recording `ApiClient` for unit tests.

use super::client::ApiClient;
use crate::error::PortalError;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedCall {
    pub method: &'static str,
    pub path: String,
    pub body: Value,
}

#[derive(Default)]
pub(crate) struct MockApiClient {
    calls: Mutex<Vec<RecordedCall>>,
    failures: Mutex<HashMap<String, PortalError>>,
    json_responses: Mutex<HashMap<String, Value>>,
    bytes_responses: Mutex<HashMap<String, Vec<u8>>>,
}

impl MockApiClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call to `path` fails with `err` until cleared.
    pub fn fail_on(&self, path: &str, err: PortalError) {
        self.failures
            .lock()
            .unwrap()
            .insert(path.to_string(), err);
    }

    pub fn clear_failure(&self, path: &str) {
        self.failures.lock().unwrap().remove(path);
    }

    pub fn respond_json(&self, path: &str, value: Value) {
        self.json_responses
            .lock()
            .unwrap()
            .insert(path.to_string(), value);
    }

    pub fn respond_bytes(&self, path: &str, bytes: Vec<u8>) {
        self.bytes_responses
            .lock()
            .unwrap()
            .insert(path.to_string(), bytes);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.path).collect()
    }

    fn record(&self, method: &'static str, path: &str, body: Value) -> Result<(), PortalError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            path: path.to_string(),
            body,
        });
        match self.failures.lock().unwrap().get(path) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ApiClient for MockApiClient {
    async fn post(&self, path: &str, body: &Value) -> Result<Value, PortalError> {
        self.record("POST", path, body.clone())?;
        Ok(self
            .json_responses
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_else(|| json!({ "success": true })))
    }

    async fn get_json(&self, path: &str) -> Result<Value, PortalError> {
        self.record("GET", path, Value::Null)?;
        Ok(self
            .json_responses
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or(Value::Null))
    }

    async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, PortalError> {
        self.record("GET", path, Value::Null)?;
        Ok(self
            .bytes_responses
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_default())
    }
}
