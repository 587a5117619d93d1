#![doc = r#"
Cloud Storage client: bucket/object metadata, object listing, and media
upload over the shared `gcp-transport` seam.

Every call returns plain data; derived operations (listing, upload) are
separate methods rather than behavior hung off a fetched bucket. Object
names are percent-encoded into the URL path, since `/` inside an object name
is a name character, not a path separator, on this API.
"#]

use serde::{Deserialize, Serialize};

use gcp_transport::{ApiRequest, HttpTransport, Method, RequestBody, TransportError};

const STORAGE_API_URL: &str = "https://storage.googleapis.com/storage/v1/b";
const UPLOAD_API_URL: &str = "https://storage.googleapis.com/upload/storage/v1/b";

/// Bucket resource metadata, the subset the clients consume. The full
/// resource is preserved for callers that need more.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, rename = "storageClass")]
    pub storage_class: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Object resource metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Object {
    pub name: String,
    pub bucket: String,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default, rename = "contentType")]
    pub content_type: Option<String>,
    #[serde(default, rename = "updated")]
    pub updated: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct ObjectList {
    #[serde(default)]
    items: Vec<Object>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StorageConfig {
    pub default_bucket: Option<String>,
}

impl StorageConfig {
    pub fn with_default_bucket(bucket: impl Into<String>) -> Self {
        Self {
            default_bucket: Some(bucket.into()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Storage<T> {
    transport: T,
    config: StorageConfig,
}

impl<T> Storage<T> {
    pub fn new(transport: T, config: StorageConfig) -> Self {
        Self { transport, config }
    }

    fn resolve_bucket<'a>(&'a self, bucket: Option<&'a str>) -> Result<&'a str, TransportError> {
        bucket
            .or(self.config.default_bucket.as_deref())
            .ok_or(TransportError::MissingConfig(
                "no bucket name given and no default bucket configured",
            ))
    }
}

impl<T> Storage<T>
where
    T: HttpTransport,
{
    /// Fetch bucket metadata. `None` falls back to the configured default
    /// bucket.
    pub async fn bucket(&self, bucket: Option<&str>) -> Result<Bucket, TransportError> {
        let bucket = self.resolve_bucket(bucket)?;
        let body = self
            .transport
            .fetch(ApiRequest::get(format!("{STORAGE_API_URL}/{bucket}")))
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Fetch object metadata.
    pub async fn object(&self, bucket: &str, object: &str) -> Result<Object, TransportError> {
        let body = self
            .transport
            .fetch(ApiRequest::get(format!(
                "{STORAGE_API_URL}/{bucket}/o/{}",
                urlencoding::encode(object)
            )))
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    /// List objects in a bucket, optionally under a name prefix. An empty
    /// bucket answers without an `items` key; that is an empty list, not an
    /// error.
    pub async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<Object>, TransportError> {
        let mut url = format!("{STORAGE_API_URL}/{bucket}/o");
        if let Some(prefix) = prefix {
            url.push_str("?prefix=");
            url.push_str(&urlencoding::encode(prefix));
        }
        let body = self.transport.fetch(ApiRequest::get(url)).await?;
        let list: ObjectList = serde_json::from_value(body)?;
        Ok(list.items)
    }

    /// Single-request media upload. Returns the created object's metadata.
    pub async fn upload(
        &self,
        bucket: &str,
        object: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<Object, TransportError> {
        let url = format!(
            "{UPLOAD_API_URL}/{bucket}/o?uploadType=media&name={}",
            urlencoding::encode(object)
        );
        let body = self
            .transport
            .fetch(ApiRequest {
                method: Method::Post,
                url,
                body: RequestBody::Bytes {
                    content_type: content_type.to_string(),
                    data,
                },
            })
            .await?;
        Ok(serde_json::from_value(body)?)
    }
}
