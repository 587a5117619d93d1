#![doc = r#"
Firestore REST client: typed value codec, structured-query builder, and
single-document CRUD over the shared `gcp-transport` seam.

Operation mapping:

| Client method | REST endpoint |
| --- | --- |
| `Firestore::get` | `GET {documents}/{collection}/{id}` |
| `Firestore::insert` | `POST {documents}/{collection}?documentId={id}` |
| `Firestore::delete` | `DELETE {documents}/{collection}/{id}` |
| `Firestore::run_query` | `POST {documents}:runQuery` |

The interesting pieces live in [`value`] (the bidirectional mapping between
native [`Value`]s and Firestore's one-key tagged wire objects) and [`query`]
(filter/order/limit translation into `structuredQuery` bodies and decoding of
the streamed result envelopes).

Implementation notes:
- wire integers stay string-typed (`integerValue: "42"`) to dodge JSON number
  precision loss; the native side is `i64`
- an empty `mapValue`/`arrayValue` omits its `fields`/`values` key on the
  wire and decodes to an empty map/sequence
- every decoded record carries its document id under the reserved `"id"` key
- codec and builder are pure; all state lives in [`FirestoreConfig`]
"#]

pub mod client;
pub mod error;
pub mod query;
pub mod value;

pub use client::{Firestore, FirestoreConfig, IdGenerator, UuidGenerator};
pub use error::{CodecError, FirestoreError, FirestoreResult};
pub use query::{
    Direction, Filter, FilterOp, Query, RunQueryRequest, StructuredQuery, WireDocument,
    build_run_query, decode_document, decode_run_query_response, document_id,
};
pub use value::{
    ArrayValue, GeoPoint, ID_FIELD, MapValue, Record, Value, WireValue, decode, decode_fields,
    encode, encode_fields,
};
