#![doc = r#"
Cloud Logging client: one-shot `entries:write` calls over the shared
`gcp-transport` seam.

String payloads go out as `textPayload`, structured payloads as
`jsonPayload`; [`error_payload`] mirrors the common "log this error" shape
(`{message, stack}` at `ERROR` severity). Entry batching is left to callers.
"#]

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use gcp_transport::{ApiRequest, HttpTransport, TransportError};

const LOGGING_API_URL: &str = "https://logging.googleapis.com/v2";

/// Cloud Logging severity levels, REST enum spelling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Default,
    Debug,
    #[default]
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

/// The monitored resource entries are attributed to, e.g.
/// `{"type": "global"}` or a `cloud_run_revision` with labels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoredResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "std::collections::BTreeMap::is_empty")]
    pub labels: std::collections::BTreeMap<String, String>,
}

impl MonitoredResource {
    pub fn global() -> Self {
        Self {
            resource_type: "global".to_string(),
            labels: Default::default(),
        }
    }
}

/// A log entry payload: plain text or arbitrary JSON.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Text(String),
    Json(Value),
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Payload::Text(value.to_string())
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Payload::Text(value)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

/// Payload for logging a failure: `message` renders like a text entry in the
/// console, `stack` rides along in the JSON payload. Pairs with
/// [`Severity::Error`].
pub fn error_payload(message: impl Into<String>, stack: impl Into<String>) -> Payload {
    Payload::Json(json!({
        "message": message.into(),
        "stack": stack.into(),
    }))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub project_id: String,
    pub log_name: String,
    pub resource: MonitoredResource,
}

impl LoggingConfig {
    pub fn new(project_id: impl Into<String>, log_name: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            log_name: log_name.into(),
            resource: MonitoredResource::global(),
        }
    }

    pub fn with_resource(mut self, resource: MonitoredResource) -> Self {
        self.resource = resource;
        self
    }
}

#[derive(Clone, Debug)]
pub struct Logging<T> {
    transport: T,
    config: LoggingConfig,
}

impl<T> Logging<T> {
    pub fn new(transport: T, config: LoggingConfig) -> Self {
        Self { transport, config }
    }

    fn entries_body(&self, payload: Payload, severity: Severity) -> Value {
        let mut entry = json!({ "severity": severity });
        match payload {
            Payload::Text(text) => entry["textPayload"] = Value::String(text),
            Payload::Json(value) => entry["jsonPayload"] = value,
        }
        json!({
            "logName": format!(
                "projects/{}/logs/{}",
                self.config.project_id, self.config.log_name
            ),
            "resource": self.config.resource,
            "entries": [entry],
        })
    }
}

impl<T> Logging<T>
where
    T: HttpTransport,
{
    /// Write one entry at the default `INFO` severity.
    pub async fn write(&self, payload: impl Into<Payload>) -> Result<(), TransportError> {
        self.write_with_severity(payload, Severity::Info).await
    }

    pub async fn write_with_severity(
        &self,
        payload: impl Into<Payload>,
        severity: Severity,
    ) -> Result<(), TransportError> {
        let body = self.entries_body(payload.into(), severity);
        self.transport
            .fetch(ApiRequest::post_json(
                format!("{LOGGING_API_URL}/entries:write"),
                body,
            ))
            .await?;
        Ok(())
    }

    /// Write an error with its stack trace at `ERROR` severity.
    pub async fn write_error(
        &self,
        message: impl Into<String>,
        stack: impl Into<String>,
    ) -> Result<(), TransportError> {
        self.write_with_severity(error_payload(message, stack), Severity::Error)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcp_transport::testing::MockTransport;
    use gcp_transport::{Method, RequestBody};

    fn logging(transport: MockTransport) -> Logging<MockTransport> {
        Logging::new(transport, LoggingConfig::new("demo-project", "app-log"))
    }

    fn sent_body(transport: &MockTransport) -> Value {
        let RequestBody::Json(body) = transport.requests()[0].body.clone() else {
            panic!("expected JSON body")
        };
        body
    }

    #[tokio::test(flavor = "current_thread")]
    async fn text_payload_writes_text_payload_at_info() {
        let transport = MockTransport::new();
        transport.push_response(json!({}));
        logging(transport.clone()).write("hello").await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(
            requests[0].url,
            "https://logging.googleapis.com/v2/entries:write"
        );
        let body = sent_body(&transport);
        assert_eq!(body["logName"], json!("projects/demo-project/logs/app-log"));
        assert_eq!(body["resource"], json!({"type": "global"}));
        assert_eq!(
            body["entries"],
            json!([{"severity": "INFO", "textPayload": "hello"}])
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn json_payload_writes_json_payload() {
        let transport = MockTransport::new();
        transport.push_response(json!({}));
        logging(transport.clone())
            .write_with_severity(json!({"user": "jo", "n": 3}), Severity::Warning)
            .await
            .unwrap();

        let body = sent_body(&transport);
        assert_eq!(
            body["entries"][0]["jsonPayload"],
            json!({"user": "jo", "n": 3})
        );
        assert_eq!(body["entries"][0]["severity"], json!("WARNING"));
        assert!(body["entries"][0].get("textPayload").is_none());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn write_error_defaults_to_error_severity() {
        let transport = MockTransport::new();
        transport.push_response(json!({}));
        logging(transport.clone())
            .write_error("boom", "at main.rs:1")
            .await
            .unwrap();

        let body = sent_body(&transport);
        assert_eq!(body["entries"][0]["severity"], json!("ERROR"));
        assert_eq!(
            body["entries"][0]["jsonPayload"],
            json!({"message": "boom", "stack": "at main.rs:1"})
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn transport_failures_propagate() {
        let transport = MockTransport::new();
        transport.push_error(500, "backend error");
        let result = logging(transport).write("hello").await;
        assert!(matches!(
            result,
            Err(TransportError::Status { status: 500, .. })
        ));
    }
}
