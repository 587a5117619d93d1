//! Structured-query construction and result decoding for `runQuery`.
//!
//! A [`Query`] is a declarative filter/order/limit description; building the
//! request translates every filter through the value codec and always wraps
//! the clauses in a single composite `AND` — even for zero or one filter,
//! which is what the endpoint expects.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::CodecError;
use crate::value::{self, ID_FIELD, Record, Value, WireValue};

/// Field-filter operators, closed set. The string forms accepted by
/// [`FromStr`] are the comparison spellings callers write in filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOp {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    In,
    ArrayContains,
}

impl FromStr for FilterOp {
    type Err = CodecError;

    fn from_str(op: &str) -> Result<Self, Self::Err> {
        match op {
            "==" => Ok(FilterOp::Equal),
            "!=" => Ok(FilterOp::NotEqual),
            "<" => Ok(FilterOp::LessThan),
            "<=" => Ok(FilterOp::LessThanOrEqual),
            ">" => Ok(FilterOp::GreaterThan),
            ">=" => Ok(FilterOp::GreaterThanOrEqual),
            "in" => Ok(FilterOp::In),
            "array-contains" => Ok(FilterOp::ArrayContains),
            other => Err(CodecError::UnknownOperator(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Ascending,
    Descending,
}

impl FromStr for Direction {
    type Err = CodecError;

    fn from_str(direction: &str) -> Result<Self, Self::Err> {
        match direction {
            "asc" => Ok(Direction::Ascending),
            "desc" => Ok(Direction::Descending),
            other => Err(CodecError::UnknownDirection(other.to_string())),
        }
    }
}

/// One `(field path, operator, value)` clause. Clauses combine under
/// implicit AND.
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

/// Declarative query description. Single-field ordering only; the explicit
/// limit beats any client-wide default at build time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query {
    filters: Vec<Filter>,
    order_by: Option<(String, Direction)>,
    limit: Option<i64>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(
        mut self,
        field: impl Into<String>,
        op: FilterOp,
        value: impl Into<Value>,
    ) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

// Wire shapes for the runQuery endpoint.

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryRequest {
    pub structured_query: StructuredQuery,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredQuery {
    pub from: Vec<CollectionSelector>,
    #[serde(rename = "where")]
    pub filter: QueryFilter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<Vec<Order>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSelector {
    pub collection_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryFilter {
    pub composite_filter: CompositeFilter,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeFilter {
    pub op: CompositeOp,
    pub filters: Vec<FilterClause>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompositeOp {
    #[serde(rename = "AND")]
    And,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterClause {
    pub field_filter: FieldFilter,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldFilter {
    pub field: FieldReference,
    pub op: FilterOp,
    pub value: WireValue,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReference {
    pub field_path: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub field: FieldReference,
    pub direction: Direction,
}

/// A document as returned by `runQuery` and `get`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireDocument {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, WireValue>>,
}

/// One streamed `runQuery` result envelope. Envelopes with no document
/// (read-time / end-of-stream markers) carry other keys we ignore.
#[derive(Clone, Debug, Deserialize)]
pub struct RunQueryResponseItem {
    #[serde(default)]
    pub document: Option<WireDocument>,
}

/// Assemble the request body. The composite AND filter is always present,
/// even with an empty clause list.
pub fn build_run_query(
    collection: &str,
    query: &Query,
    default_limit: Option<i64>,
) -> RunQueryRequest {
    let filters = query
        .filters
        .iter()
        .map(|filter| FilterClause {
            field_filter: FieldFilter {
                field: FieldReference {
                    field_path: filter.field.clone(),
                },
                op: filter.op,
                value: value::encode(&filter.value),
            },
        })
        .collect();

    RunQueryRequest {
        structured_query: StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: collection.to_string(),
            }],
            filter: QueryFilter {
                composite_filter: CompositeFilter {
                    op: CompositeOp::And,
                    filters,
                },
            },
            limit: query.limit.or(default_limit),
            order_by: query.order_by.as_ref().map(|(field, direction)| {
                vec![Order {
                    field: FieldReference {
                        field_path: field.clone(),
                    },
                    direction: *direction,
                }]
            }),
        },
    }
}

/// Final path segment of a document resource name.
pub fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Decode a document into a record, merging its id under [`ID_FIELD`].
pub fn decode_document(document: WireDocument) -> Result<Record, CodecError> {
    let id = document_id(&document.name).to_string();
    let mut record = value::decode_fields(document.fields)?;
    record.insert(ID_FIELD.to_string(), Value::String(id));
    Ok(record)
}

/// Decode the full `runQuery` response body, skipping document-less
/// envelopes and preserving provider order.
pub fn decode_run_query_response(body: serde_json::Value) -> Result<Vec<Record>, CodecError> {
    let items: Vec<RunQueryResponseItem> =
        serde_json::from_value(body).map_err(CodecError::UnknownWireVariant)?;
    items
        .into_iter()
        .filter_map(|item| item.document)
        .map(decode_document)
        .collect()
}
