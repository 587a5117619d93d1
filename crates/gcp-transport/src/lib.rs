#![doc = r#"
Shared HTTP boundary for the Google Cloud REST clients in this workspace.

The service crates (`gcp-firestore`, `gcp-logging`, `gcp-storage`) never talk
to reqwest directly; they build [`ApiRequest`] values and hand them to an
[`HttpTransport`]. That seam keeps the clients pure request-builders and lets
tests run against [`testing::MockTransport`] with no network.

Responsibilities here:
- attach a bearer token from a [`TokenProvider`] to every request
- serialize JSON (or raw-byte upload) bodies
- surface non-2xx responses as [`TransportError::Status`] with the provider's
  own error message extracted from the body

Retry, timeout and cancellation policy belong to callers (or a wrapping
transport), not to this crate.
"#]

pub mod error;
pub mod testing;
pub mod token;
pub mod transport;

pub use error::{TransportError, TransportResult};
pub use token::{
    CLOUD_PLATFORM_SCOPE, ServiceAccountKey, StaticTokenProvider, TokenProvider,
};
pub use transport::{ApiRequest, HttpTransport, Method, ReqwestTransport, RequestBody};
