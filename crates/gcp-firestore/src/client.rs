use chrono::Utc;
use serde_json::json;

use gcp_transport::{ApiRequest, HttpTransport, TransportError};

use crate::error::{CodecError, FirestoreError, FirestoreResult};
use crate::query::{self, Query, WireDocument};
use crate::value::{self, ID_FIELD, Record, Value};

/// Explicit client configuration. `default_limit` caps queries that do not
/// set their own limit; `None` leaves the limit to the provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub database_id: String,
    pub default_limit: Option<i64>,
}

impl FirestoreConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            database_id: "(default)".to_string(),
            default_limit: None,
        }
    }

    pub fn with_database(mut self, database_id: impl Into<String>) -> Self {
        self.database_id = database_id.into();
        self
    }

    pub fn with_default_limit(mut self, limit: i64) -> Self {
        self.default_limit = Some(limit);
        self
    }
}

/// Produces collision-resistant document identifiers for inserts that do not
/// supply their own.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Default generator: 32-hex-char UUIDv4.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}

/// Firestore document client: single-document get/insert/delete plus
/// one-shot filtered queries. Stateless between calls; safe to share.
#[derive(Clone, Debug)]
pub struct Firestore<T, G = UuidGenerator> {
    transport: T,
    ids: G,
    config: FirestoreConfig,
    base_url: String,
}

impl<T> Firestore<T, UuidGenerator> {
    pub fn new(transport: T, config: FirestoreConfig) -> Self {
        Self::with_id_generator(transport, config, UuidGenerator)
    }
}

impl<T, G> Firestore<T, G> {
    pub fn with_id_generator(transport: T, config: FirestoreConfig, ids: G) -> Self {
        let base_url = format!(
            "https://firestore.googleapis.com/v1/projects/{}/databases/{}/documents",
            config.project_id, config.database_id
        );
        Self {
            transport,
            ids,
            config,
            base_url,
        }
    }

    pub fn config(&self) -> &FirestoreConfig {
        &self.config
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{collection}/{id}", self.base_url)
    }
}

impl<T, G> Firestore<T, G>
where
    T: HttpTransport,
    G: IdGenerator,
{
    /// Fetch one document. The result always carries the requested id, even
    /// for a document with no fields.
    pub async fn get(&self, collection: &str, id: &str) -> FirestoreResult<Record> {
        let body = self
            .transport
            .fetch(ApiRequest::get(self.document_url(collection, id)))
            .await?;
        let document: WireDocument =
            serde_json::from_value(body).map_err(CodecError::UnknownWireVariant)?;
        let mut record = value::decode_fields(document.fields).map_err(FirestoreError::Codec)?;
        record.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        Ok(record)
    }

    /// Create a document. Uses the record's own `id` field when present
    /// (it must be a string), otherwise asks the id generator; stamps
    /// `created_at`/`updated_at` unless the record already carries them.
    /// Returns the record with its resolved id merged in.
    pub async fn insert(&self, collection: &str, mut record: Record) -> FirestoreResult<Record> {
        let id = match record.get(ID_FIELD) {
            Some(Value::String(id)) => id.clone(),
            Some(other) => {
                return Err(FirestoreError::InvalidInput(format!(
                    "id field must be a string, got {other:?}"
                )));
            }
            None => self.ids.generate(),
        };

        let now = Value::Timestamp(Utc::now());
        record
            .entry("created_at".to_string())
            .or_insert_with(|| now.clone());
        record.entry("updated_at".to_string()).or_insert(now);

        let url = format!("{}/{collection}?documentId={id}", self.base_url);
        let body = json!({ "fields": value::encode_fields(&record) });
        self.transport
            .fetch(ApiRequest::post_json(url, body))
            .await?;

        record.insert(ID_FIELD.to_string(), Value::String(id));
        Ok(record)
    }

    /// Delete by collection + id. No fetch-and-discard; transport errors
    /// propagate as-is.
    pub async fn delete(&self, collection: &str, id: &str) -> FirestoreResult<()> {
        self.transport
            .fetch(ApiRequest::delete(self.document_url(collection, id)))
            .await?;
        Ok(())
    }

    /// One-shot structured query against a collection.
    pub async fn run_query(&self, collection: &str, query: &Query) -> FirestoreResult<Vec<Record>> {
        let request = query::build_run_query(collection, query, self.config.default_limit);
        let url = format!("{}:runQuery", self.base_url);
        let body = serde_json::to_value(&request).map_err(TransportError::Json)?;
        let response = self
            .transport
            .fetch(ApiRequest::post_json(url, body))
            .await?;
        Ok(query::decode_run_query_response(response)?)
    }
}
