//! Bidirectional codec between native values and Firestore's tagged wire
//! representation.
//!
//! The wire format is an object with exactly one populated key
//! (`stringValue`, `integerValue`, ...). [`WireValue`] models that as an
//! externally-tagged serde enum, so a response object with zero or several
//! keys fails at deserialization — the only place malformed input can enter.
//! Past that boundary both directions are exhaustive matches: there is no
//! runtime "unknown value type" fallback.
//!
//! Two wire quirks are load-bearing:
//! - `integerValue` carries a decimal *string* (64-bit integers would lose
//!   precision as JSON numbers);
//! - an empty map omits `fields` entirely, and an empty array omits
//!   `values` — both decode to empty, never to an error.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::CodecError;

/// Latitude/longitude pair, passed through without reprojection.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MapValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, WireValue>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<WireValue>>,
}

/// Firestore's `Value` message in its REST JSON form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum WireValue {
    #[serde(rename = "stringValue")]
    String(String),
    #[serde(rename = "integerValue")]
    Integer(String),
    #[serde(rename = "doubleValue")]
    Double(f64),
    #[serde(rename = "timestampValue")]
    Timestamp(String),
    #[serde(rename = "booleanValue")]
    Boolean(bool),
    #[serde(rename = "mapValue")]
    Map(MapValue),
    #[serde(rename = "arrayValue")]
    Array(ArrayValue),
    #[serde(rename = "nullValue")]
    Null(()),
    #[serde(rename = "geoPointValue")]
    GeoPoint(GeoPoint),
}

/// Native representation of a document field.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Double(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
    GeoPoint(GeoPoint),
    Null,
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

impl From<GeoPoint> for Value {
    fn from(value: GeoPoint) -> Self {
        Value::GeoPoint(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(value: BTreeMap<String, Value>) -> Self {
        Value::Map(value)
    }
}

/// A decoded document: field name to native value, with the document id
/// merged in under [`ID_FIELD`].
pub type Record = BTreeMap<String, Value>;

/// Reserved record key carrying the document identifier.
pub const ID_FIELD: &str = "id";

/// Native → wire. Total over [`Value`]; encoding cannot fail.
pub fn encode(value: &Value) -> WireValue {
    match value {
        Value::String(value) => WireValue::String(value.clone()),
        Value::Integer(value) => WireValue::Integer(value.to_string()),
        Value::Double(value) => WireValue::Double(*value),
        Value::Bool(value) => WireValue::Boolean(*value),
        Value::Timestamp(value) => {
            WireValue::Timestamp(value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        }
        Value::Array(values) => WireValue::Array(ArrayValue {
            values: Some(values.iter().map(encode).collect()),
        }),
        Value::Map(fields) => WireValue::Map(MapValue {
            fields: Some(
                fields
                    .iter()
                    .map(|(key, value)| (key.clone(), encode(value)))
                    .collect(),
            ),
        }),
        Value::GeoPoint(point) => WireValue::GeoPoint(*point),
        Value::Null => WireValue::Null(()),
    }
}

/// Wire → native. Fails on a non-decimal `integerValue` or a non-RFC 3339
/// `timestampValue`; a failure anywhere aborts the whole document.
pub fn decode(wire: WireValue) -> Result<Value, CodecError> {
    match wire {
        WireValue::String(value) => Ok(Value::String(value)),
        WireValue::Integer(raw) => raw
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| CodecError::InvalidInteger(raw)),
        WireValue::Double(value) => Ok(Value::Double(value)),
        WireValue::Timestamp(raw) => DateTime::parse_from_rfc3339(&raw)
            .map(|instant| Value::Timestamp(instant.with_timezone(&Utc)))
            .map_err(|_| CodecError::InvalidTimestamp(raw)),
        WireValue::Boolean(value) => Ok(Value::Bool(value)),
        WireValue::Map(map) => decode_fields(map.fields).map(Value::Map),
        WireValue::Array(array) => array
            .values
            .unwrap_or_default()
            .into_iter()
            .map(decode)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        WireValue::Null(()) => Ok(Value::Null),
        WireValue::GeoPoint(point) => Ok(Value::GeoPoint(point)),
    }
}

/// Decode a document or map `fields` object. `None` is the wire form of an
/// empty map.
pub fn decode_fields(
    fields: Option<BTreeMap<String, WireValue>>,
) -> Result<BTreeMap<String, Value>, CodecError> {
    fields
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| decode(value).map(|value| (key, value)))
        .collect()
}

/// Encode every field of a record for an insert body.
pub fn encode_fields(record: &Record) -> BTreeMap<String, WireValue> {
    record
        .iter()
        .map(|(key, value)| (key.clone(), encode(value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn round_trip(value: Value) {
        let decoded = decode(encode(&value)).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn round_trips_every_variant() {
        round_trip(Value::from("hello"));
        round_trip(Value::from(42i64));
        round_trip(Value::from(i64::MIN));
        round_trip(Value::from(i64::MAX));
        round_trip(Value::from(2.5f64));
        round_trip(Value::from(true));
        round_trip(Value::Null);
        round_trip(Value::from(GeoPoint {
            latitude: 48.8584,
            longitude: 2.2945,
        }));
        round_trip(Value::from(
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap(),
        ));
        round_trip(Value::Array(vec![
            Value::from("a"),
            Value::from(1i64),
            Value::Null,
            Value::Array(vec![Value::from(false)]),
        ]));
        let mut map = BTreeMap::new();
        map.insert("name".to_string(), Value::from("Jo"));
        map.insert("age".to_string(), Value::from(30i64));
        round_trip(Value::Map(map));
    }

    #[test]
    fn string_encodes_to_string_value() {
        let wire = serde_json::to_value(encode(&Value::from("hello"))).unwrap();
        assert_eq!(wire, json!({"stringValue": "hello"}));
    }

    #[test]
    fn integer_encodes_as_decimal_string() {
        let wire = serde_json::to_value(encode(&Value::from(42i64))).unwrap();
        assert_eq!(wire, json!({"integerValue": "42"}));
    }

    #[test]
    fn integer_string_decodes_to_native_integer() {
        let wire: WireValue = serde_json::from_value(json!({"integerValue": "42"})).unwrap();
        assert_eq!(decode(wire).unwrap(), Value::Integer(42));
    }

    #[test]
    fn non_decimal_integer_is_a_codec_error() {
        let wire: WireValue = serde_json::from_value(json!({"integerValue": "4x"})).unwrap();
        assert!(matches!(
            decode(wire),
            Err(CodecError::InvalidInteger(raw)) if raw == "4x"
        ));
    }

    #[test]
    fn bad_timestamp_is_a_codec_error() {
        let wire: WireValue =
            serde_json::from_value(json!({"timestampValue": "yesterday"})).unwrap();
        assert!(matches!(decode(wire), Err(CodecError::InvalidTimestamp(_))));
    }

    #[test]
    fn empty_map_value_decodes_to_empty_map() {
        let wire: WireValue = serde_json::from_value(json!({"mapValue": {}})).unwrap();
        assert_eq!(decode(wire).unwrap(), Value::Map(BTreeMap::new()));
    }

    #[test]
    fn empty_array_value_decodes_to_empty_array() {
        let wire: WireValue = serde_json::from_value(json!({"arrayValue": {}})).unwrap();
        assert_eq!(decode(wire).unwrap(), Value::Array(Vec::new()));
    }

    #[test]
    fn null_value_round_trips_through_json() {
        let wire = serde_json::to_value(encode(&Value::Null)).unwrap();
        assert_eq!(wire, json!({"nullValue": null}));
        let back: WireValue = serde_json::from_value(wire).unwrap();
        assert_eq!(decode(back).unwrap(), Value::Null);
    }

    #[test]
    fn geo_point_never_encodes_as_map() {
        let wire = serde_json::to_value(encode(&Value::from(GeoPoint {
            latitude: 1.0,
            longitude: 2.0,
        })))
        .unwrap();
        assert_eq!(
            wire,
            json!({"geoPointValue": {"latitude": 1.0, "longitude": 2.0}})
        );
    }

    #[test]
    fn nested_map_decodes_recursively() {
        let wire: WireValue = serde_json::from_value(json!({
            "mapValue": {"fields": {
                "inner": {"mapValue": {"fields": {"n": {"integerValue": "7"}}}},
                "tags": {"arrayValue": {"values": [{"stringValue": "x"}]}}
            }}
        }))
        .unwrap();
        let decoded = decode(wire).unwrap();
        let Value::Map(map) = decoded else {
            panic!("expected map")
        };
        let Some(Value::Map(inner)) = map.get("inner") else {
            panic!("expected inner map")
        };
        assert_eq!(inner.get("n"), Some(&Value::Integer(7)));
        assert_eq!(
            map.get("tags"),
            Some(&Value::Array(vec![Value::from("x")]))
        );
    }

    #[test]
    fn unknown_wire_key_is_rejected_at_the_boundary() {
        let result: Result<WireValue, _> =
            serde_json::from_value(json!({"bytesValue": "AA=="}));
        assert!(result.is_err());
    }

    #[test]
    fn multiply_tagged_object_is_rejected_at_the_boundary() {
        let result: Result<WireValue, _> =
            serde_json::from_value(json!({"stringValue": "a", "booleanValue": true}));
        assert!(result.is_err());
    }

    #[test]
    fn timestamp_wire_form_is_rfc3339() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap();
        let WireValue::Timestamp(raw) = encode(&Value::Timestamp(instant)) else {
            panic!("expected timestampValue")
        };
        assert_eq!(raw, "2024-03-01T12:30:45Z");
    }

    #[test]
    fn decode_fields_treats_missing_fields_as_empty_record() {
        assert!(decode_fields(None).unwrap().is_empty());
    }
}
