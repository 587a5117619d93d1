//! In-memory transport double for unit and integration tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::error::TransportError;
use crate::transport::{ApiRequest, HttpTransport};

#[derive(Default)]
struct MockTransportState {
    requests: Vec<ApiRequest>,
    responses: VecDeque<Result<Value, TransportError>>,
}

/// Records every request it sees and replays a FIFO queue of canned
/// responses. An exhausted queue answers `null`, which is what empty-bodied
/// endpoints (DELETE) produce through the real transport.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, response: Value) {
        self.inner.lock().unwrap().responses.push_back(Ok(response));
    }

    pub fn push_error(&self, status: u16, message: impl Into<String>) {
        self.inner
            .lock()
            .unwrap()
            .responses
            .push_back(Err(TransportError::Status {
                status,
                message: message.into(),
            }));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.inner.lock().unwrap().requests.len()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn fetch(&self, request: ApiRequest) -> Result<Value, TransportError> {
        let mut state = self.inner.lock().unwrap();
        state.requests.push(request);
        state.responses.pop_front().unwrap_or(Ok(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test(flavor = "current_thread")]
    async fn replays_responses_in_order_and_records_requests() {
        let transport = MockTransport::new();
        transport.push_response(json!({"n": 1}));
        transport.push_error(403, "denied");

        let first = transport
            .fetch(ApiRequest::get("https://example.test/one"))
            .await
            .unwrap();
        assert_eq!(first, json!({"n": 1}));

        let second = transport
            .fetch(ApiRequest::get("https://example.test/two"))
            .await;
        assert!(matches!(
            second,
            Err(TransportError::Status { status: 403, .. })
        ));

        let third = transport
            .fetch(ApiRequest::delete("https://example.test/three"))
            .await
            .unwrap();
        assert_eq!(third, Value::Null);

        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].url, "https://example.test/one");
        assert_eq!(requests[2].url, "https://example.test/three");
    }
}
