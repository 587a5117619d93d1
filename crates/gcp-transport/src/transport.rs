use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;
use crate::token::{CLOUD_PLATFORM_SCOPE, TokenProvider};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Request payload. Media uploads (Cloud Storage) send raw bytes with their
/// own content type; everything else is JSON or empty.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Bytes { content_type: String, data: Vec<u8> },
}

/// One authenticated REST call, fully described.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            body: RequestBody::Empty,
        }
    }

    pub fn post_json(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            body: RequestBody::Json(body),
        }
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            url: url.into(),
            body: RequestBody::Empty,
        }
    }
}

/// Seam between the service clients and the wire. Implementations attach
/// credentials, send the request and hand back the parsed JSON body, turning
/// any non-2xx status into [`TransportError::Status`].
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn fetch(&self, request: ApiRequest) -> Result<Value, TransportError>;
}

#[async_trait]
impl<T> HttpTransport for std::sync::Arc<T>
where
    T: HttpTransport + ?Sized,
{
    async fn fetch(&self, request: ApiRequest) -> Result<Value, TransportError> {
        (**self).fetch(request).await
    }
}

/// Production transport: reqwest + bearer token from a [`TokenProvider`].
#[derive(Clone)]
pub struct ReqwestTransport<P> {
    client: reqwest::Client,
    tokens: P,
    scope: String,
}

impl<P> ReqwestTransport<P> {
    pub fn new(tokens: P) -> Self {
        Self {
            client: reqwest::Client::new(),
            tokens,
            scope: CLOUD_PLATFORM_SCOPE.to_string(),
        }
    }

    pub fn with_scope(tokens: P, scope: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            tokens,
            scope: scope.into(),
        }
    }
}

#[async_trait]
impl<P> HttpTransport for ReqwestTransport<P>
where
    P: TokenProvider,
{
    async fn fetch(&self, request: ApiRequest) -> Result<Value, TransportError> {
        let token = self.tokens.access_token(&self.scope).await?;

        let mut builder = self
            .client
            .request(request.method.as_reqwest(), &request.url)
            .bearer_auth(token);
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::Bytes { content_type, data } => builder
                .header(reqwest::header::CONTENT_TYPE, content_type)
                .body(data),
        };

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }
        if text.is_empty() {
            // DELETE returns an empty Document body; normalize to null.
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

/// Pull the provider's own error message out of a failed response body.
///
/// Single-shot endpoints answer `{"error": {...}}`; the streaming-shaped
/// `runQuery` endpoint answers an array whose first element carries the
/// error. Anything unparseable is returned verbatim.
pub fn error_message(body: &str) -> String {
    let parsed: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => return body.to_string(),
    };
    let error = parsed
        .get("error")
        .or_else(|| parsed.get(0).and_then(|first| first.get("error")));
    match error {
        Some(error) => error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        None => body.to_string(),
    }
}
