//! Firestore REST implementation of the document-store port.
//!
//! Uses the v1 REST surface: `GET` for single snapshots, `:batchGet` for
//! membership lookups (the response order is chosen by the backend, which is
//! exactly the loose order the port documents), and `PATCH` with an
//! `updateMask` for field merges. Authorized with a service-account token
//! from [`GoogleTokenSource`].

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::adapters::google::{GoogleTokenSource, ServiceAccountKey, TokenError};
use crate::ports::{Document, DocumentStore, StoreError};

const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";
const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

/// Firestore adapter configuration.
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    /// GCP project hosting the database.
    pub project_id: String,

    /// Override for the API base URL (tests / emulator).
    pub base_url: Option<String>,
}

impl FirestoreConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            base_url: None,
        }
    }

    fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    fn documents_root(&self) -> String {
        format!(
            "projects/{}/databases/(default)/documents",
            self.project_id
        )
    }

    fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.documents_root(), collection, id)
    }
}

/// Production `DocumentStore` over the Firestore REST API.
pub struct FirestoreDocumentStore {
    config: FirestoreConfig,
    tokens: GoogleTokenSource,
    http_client: reqwest::Client,
}

impl FirestoreDocumentStore {
    pub fn new(config: FirestoreConfig, key: ServiceAccountKey) -> Result<Self, StoreError> {
        let tokens = GoogleTokenSource::new(key, DATASTORE_SCOPE)
            .map_err(|e| StoreError::unavailable(e.to_string()))?;
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| StoreError::unavailable(e.to_string()))?;

        Ok(Self {
            config,
            tokens,
            http_client,
        })
    }

    async fn bearer(&self) -> Result<String, StoreError> {
        self.tokens.token().await.map_err(|e| match e {
            TokenError::Rejected(msg) => StoreError::rejected(msg),
            other => StoreError::unavailable(other.to_string()),
        })
    }
}

#[async_trait]
impl DocumentStore for FirestoreDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let url = format!(
            "{}/{}",
            self.config.base_url(),
            self.config.document_name(collection, id)
        );
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(self.bearer().await?)
            .send()
            .await
            .map_err(|e| StoreError::unavailable(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(status_error(response.status()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::unavailable(e.to_string()))?;
        Ok(Some(decode_fields(&body)))
    }

    async fn get_many(
        &self,
        collection: &str,
        ids: &[String],
    ) -> Result<Vec<(String, Document)>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let names: Vec<String> = ids
            .iter()
            .map(|id| self.config.document_name(collection, id))
            .collect();
        let url = format!(
            "{}/{}:batchGet",
            self.config.base_url(),
            self.config.documents_root()
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.bearer().await?)
            .json(&json!({ "documents": names }))
            .send()
            .await
            .map_err(|e| StoreError::unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(status_error(response.status()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::unavailable(e.to_string()))?;
        let results = body.as_array().cloned().unwrap_or_default();

        // Found documents come back in backend-chosen order; missing names
        // are reported separately and simply dropped.
        let mut found = Vec::new();
        for result in &results {
            if let Some(doc) = result.get("found") {
                let id = doc
                    .get("name")
                    .and_then(Value::as_str)
                    .and_then(|name| name.rsplit('/').next())
                    .unwrap_or_default()
                    .to_string();
                if !id.is_empty() {
                    found.push((id, decode_fields(doc)));
                }
            }
        }
        Ok(found)
    }

    async fn merge(&self, collection: &str, id: &str, fields: Document) -> Result<(), StoreError> {
        let mut url = format!(
            "{}/{}?",
            self.config.base_url(),
            self.config.document_name(collection, id)
        );
        for key in fields.keys() {
            url.push_str("updateMask.fieldPaths=");
            url.push_str(key);
            url.push('&');
        }
        url.pop();

        let encoded = encode_fields(&fields)?;
        let response = self
            .http_client
            .patch(&url)
            .bearer_auth(self.bearer().await?)
            .json(&json!({ "fields": encoded }))
            .send()
            .await
            .map_err(|e| StoreError::unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(status_error(response.status()));
        }
        Ok(())
    }
}

fn status_error(status: reqwest::StatusCode) -> StoreError {
    if status.is_client_error() {
        StoreError::rejected(format!("status {status}"))
    } else {
        StoreError::unavailable(format!("status {status}"))
    }
}

/// Decodes a Firestore document body into a plain field map.
fn decode_fields(doc: &Value) -> Document {
    doc.get("fields")
        .and_then(Value::as_object)
        .map(|fields| {
            fields
                .iter()
                .map(|(key, value)| (key.clone(), decode_value(value)))
                .collect()
        })
        .unwrap_or_default()
}

fn decode_value(value: &Value) -> Value {
    let Some(obj) = value.as_object() else {
        return Value::Null;
    };
    if let Some(b) = obj.get("booleanValue") {
        return b.clone();
    }
    if let Some(s) = obj.get("stringValue") {
        return s.clone();
    }
    if let Some(s) = obj.get("timestampValue") {
        return s.clone();
    }
    if let Some(i) = obj.get("integerValue").and_then(Value::as_str) {
        if let Ok(n) = i.parse::<i64>() {
            return json!(n);
        }
    }
    if let Some(d) = obj.get("doubleValue") {
        return d.clone();
    }
    if let Some(arr) = obj.get("arrayValue") {
        let values = arr
            .get("values")
            .and_then(Value::as_array)
            .map(|v| v.iter().map(decode_value).collect())
            .unwrap_or_default();
        return Value::Array(values);
    }
    if let Some(map) = obj.get("mapValue") {
        return Value::Object(
            map.get("fields")
                .and_then(Value::as_object)
                .map(|fields| {
                    fields
                        .iter()
                        .map(|(k, v)| (k.clone(), decode_value(v)))
                        .collect()
                })
                .unwrap_or_default(),
        );
    }
    Value::Null
}

/// Encodes a plain field map into Firestore typed values.
fn encode_fields(fields: &Document) -> Result<Map<String, Value>, StoreError> {
    fields
        .iter()
        .map(|(key, value)| Ok((key.clone(), encode_value(value)?)))
        .collect()
}

fn encode_value(value: &Value) -> Result<Value, StoreError> {
    Ok(match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) if n.is_i64() || n.is_u64() => {
            json!({ "integerValue": n.to_string() })
        }
        Value::Number(n) => json!({ "doubleValue": n }),
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Result<Vec<Value>, StoreError> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values? } })
        }
        Value::Object(map) => {
            let fields: Result<Map<String, Value>, StoreError> = map
                .iter()
                .map(|(k, v)| Ok((k.clone(), encode_value(v)?)))
                .collect();
            json!({ "mapValue": { "fields": fields? } })
        }
    })
}
