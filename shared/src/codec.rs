//! Conversion between [`Value`] and DynamoDB `AttributeValue`s.
//!
//! Numbers travel as decimal strings. Decoding parses them back into an
//! integer when one fits, otherwise an `f64`, so integers beyond 64 bits and
//! decimals with more digits than an `f64` holds do not come back exactly.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use serde_json::Number;
use tracing::warn;

use crate::value::{Fields, Set, Value};

pub fn encode(value: &Value) -> AttributeValue {
    match value {
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::Boolean(b) => AttributeValue::Bool(*b),
        Value::Null => AttributeValue::Null(true),
        Value::List(elements) => AttributeValue::L(elements.iter().map(encode).collect()),
        // Empty sets are not representable on the wire.
        Value::Set(set) if set.is_empty() => AttributeValue::L(Vec::new()),
        Value::Set(Set::Strings(members)) => AttributeValue::Ss(members.clone()),
        Value::Set(Set::Numbers(members)) => {
            AttributeValue::Ns(members.iter().map(Number::to_string).collect())
        }
        Value::Map(fields) => AttributeValue::M(encode_fields(fields)),
    }
}

pub fn encode_fields(fields: &Fields) -> HashMap<String, AttributeValue> {
    fields
        .iter()
        .map(|(key, value)| (key.to_string(), encode(value)))
        .collect()
}

pub fn decode(attribute: &AttributeValue) -> Value {
    match attribute {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => parse_number(n).map(Value::Number).unwrap_or(Value::Null),
        AttributeValue::Bool(b) => Value::Boolean(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::Ss(members) => Value::Set(Set::Strings(members.clone())),
        // One unparsable member drops the whole set, like a scalar `N`.
        AttributeValue::Ns(members) => members
            .iter()
            .map(|n| parse_number(n))
            .collect::<Option<Vec<_>>>()
            .map(|numbers| Value::Set(Set::Numbers(numbers)))
            .unwrap_or(Value::Null),
        AttributeValue::L(elements) => Value::List(elements.iter().map(decode).collect()),
        AttributeValue::M(map) => Value::Map(decode_attributes(map)),
        _ => Value::Null,
    }
}

/// Decodes a whole item. Keys come back sorted since the wire map has no order.
pub fn decode_attributes(attributes: &HashMap<String, AttributeValue>) -> Fields {
    let mut fields: Fields = attributes
        .iter()
        .map(|(key, value)| (key.clone(), decode(value)))
        .collect();
    fields.sort_keys();
    fields
}

fn parse_number(raw: &str) -> Option<Number> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<u64>() {
        return Some(n.into());
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n.into());
    }
    let parsed = raw.parse::<f64>().ok().and_then(Number::from_f64);
    if parsed.is_none() {
        warn!(raw = raw, "Dropping unparsable number attribute");
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ArrayKind;
    use serde_json::json;

    fn round_trip(value: &Value) -> Value {
        decode(&encode(value))
    }

    #[test]
    fn test_encode_primitives() {
        assert_eq!(encode(&Value::from("a")), AttributeValue::S("a".into()));
        assert_eq!(encode(&Value::from(42)), AttributeValue::N("42".into()));
        assert_eq!(encode(&Value::from(false)), AttributeValue::Bool(false));
        assert_eq!(encode(&Value::Null), AttributeValue::Null(true));
    }

    #[test]
    fn test_encode_number_as_decimal_string() {
        let value = Value::from_json(json!(-3.25), ArrayKind::List).unwrap();
        assert_eq!(encode(&value), AttributeValue::N("-3.25".into()));
    }

    #[test]
    fn test_encode_sets_and_lists() {
        let tags = Value::string_set(["a", "b"]).unwrap();
        assert_eq!(
            encode(&tags),
            AttributeValue::Ss(vec!["a".into(), "b".into()])
        );

        let scores = Value::number_set([Number::from(1), Number::from(20)]).unwrap();
        assert_eq!(
            encode(&scores),
            AttributeValue::Ns(vec!["1".into(), "20".into()])
        );

        let mixed = Value::from_json(json!(["a", 1]), ArrayKind::List).unwrap();
        assert_eq!(
            encode(&mixed),
            AttributeValue::L(vec![
                AttributeValue::S("a".into()),
                AttributeValue::N("1".into())
            ])
        );

        assert_eq!(encode(&Value::List(vec![])), AttributeValue::L(vec![]));
        assert_eq!(
            encode(&Value::Set(Set::Strings(vec![]))),
            AttributeValue::L(vec![])
        );
    }

    #[test]
    fn test_encode_nested_map() {
        let value = Value::from_json(json!({ "address": { "city": "Lima" } }), ArrayKind::List)
            .unwrap();
        let AttributeValue::M(outer) = encode(&value) else {
            panic!("expected map");
        };
        let AttributeValue::M(inner) = &outer["address"] else {
            panic!("expected nested map");
        };
        assert_eq!(inner["city"], AttributeValue::S("Lima".into()));
    }

    #[test]
    fn test_round_trip_supported_values() {
        let samples = [
            json!("text"),
            json!(""),
            json!(0),
            json!(-17),
            json!(9007199254740993u64),
            json!(1.5),
            json!(true),
            json!(null),
            json!([]),
            json!([{ "k": "v" }, [1, 2], "x"]),
            json!({ "name": "Ana", "age": 30, "tags": ["a", "b"], "meta": { "ok": true } }),
        ];
        for sample in samples {
            let value = Value::from_json(sample.clone(), ArrayKind::List).unwrap();
            assert_eq!(round_trip(&value), value, "round trip of {sample}");
        }

        for sample in [json!(["a", "b"]), json!([1, 2.5, -3])] {
            let value = Value::from_json(sample.clone(), ArrayKind::Set).unwrap();
            assert_eq!(round_trip(&value), value, "round trip of {sample}");
        }
    }

    #[test]
    fn test_numbers_beyond_f64_precision_are_a_known_boundary() {
        // Wider than u64, so decoding falls back to f64 and loses digits.
        let wide = "123456789012345678901234567890";
        let decoded = decode(&AttributeValue::N(wide.into()));
        let Value::Number(n) = decoded else {
            panic!("expected a number");
        };
        assert_ne!(n.to_string(), wide);
        assert!((n.as_f64().unwrap() - 1.2345678901234568e29).abs() < 1e15);
    }

    #[test]
    fn test_decode_unparsable_number_is_null() {
        assert_eq!(decode(&AttributeValue::N("abc".into())), Value::Null);
    }

    #[test]
    fn test_decode_number_set_with_unparsable_member_is_null() {
        let ns = AttributeValue::Ns(vec!["1".into(), "x".into()]);
        assert_eq!(decode(&ns), Value::Null);
    }

    #[test]
    fn test_decoded_sets_compare_regardless_of_order() {
        let ss = AttributeValue::Ss(vec!["b".into(), "a".into()]);
        assert_eq!(decode(&ss), Value::string_set(["a", "b"]).unwrap());

        let ns = AttributeValue::Ns(vec!["2".into(), "1".into()]);
        assert_eq!(
            decode(&ns),
            Value::number_set([Number::from(1), Number::from(2)]).unwrap()
        );
    }

    #[test]
    fn test_decode_unrecognized_tag_is_null() {
        let binary = AttributeValue::B(aws_sdk_dynamodb::primitives::Blob::new(vec![1u8, 2]));
        assert_eq!(decode(&binary), Value::Null);
    }

    #[test]
    fn test_decode_attributes_sorts_keys() {
        let mut attributes = HashMap::new();
        attributes.insert("b".to_string(), AttributeValue::S("2".into()));
        attributes.insert("a".to_string(), AttributeValue::N("1".into()));
        let fields = decode_attributes(&attributes);
        assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(fields.get("a"), Some(&Value::from(1)));
    }
}
