//! Tests for the JSON mapper

use super::*;
use crate::error::Error;
use crate::http::Charset;
use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Sample {
    external_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
}

#[derive(Debug, PartialEq, Deserialize)]
struct Dated {
    #[serde(default, with = "lenient_datetime")]
    created: Option<DateTime<Utc>>,
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_parse_ignores_unknown_properties() {
    let body = br#"{"externalId":"A-1","title":"Report","extra":42}"#;
    let sample: Sample = JsonMapper::new().parse(body, &Charset::Utf8).unwrap();
    assert_eq!(
        sample,
        Sample {
            external_id: "A-1".into(),
            title: Some("Report".into()),
        }
    );
}

#[test]
fn test_parse_latin1_body() {
    // "Café" with é as the single byte 0xE9
    let body = b"{\"externalId\":\"Caf\xE9\"}";
    let sample: Sample = JsonMapper::new().parse(body, &Charset::Iso8859_1).unwrap();
    assert_eq!(sample.external_id, "Café");
}

#[test]
fn test_parse_list() {
    let body = br#"[{"externalId":"a"},{"externalId":"b"}]"#;
    let list: Vec<Sample> = JsonMapper::new().parse_list(body, &Charset::Utf8).unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[1].external_id, "b");
}

#[test]
fn test_parse_failure_names_target_type() {
    let err = JsonMapper::new()
        .parse::<Sample>(b"not json", &Charset::Utf8)
        .unwrap_err();
    match err {
        Error::Mapper { type_name, .. } => assert!(type_name.ends_with("Sample")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        JsonMapper::new()
            .parse::<Sample>(b"{}", &Charset::Utf8)
            .unwrap_err()
            .status_code(),
        -1
    );
}

#[test]
fn test_parse_map() {
    let map = JsonMapper::new()
        .parse_map(br#"{"a":"1","b":"2"}"#)
        .unwrap();
    assert_eq!(map.get("a").map(String::as_str), Some("1"));
    assert_eq!(map.len(), 2);

    assert!(matches!(
        JsonMapper::new().parse_map(br#"{"a":1}"#),
        Err(Error::Mapper { .. })
    ));
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn test_serialize_skips_none() {
    let text = JsonMapper::new()
        .serialize(&Sample {
            external_id: "x".into(),
            title: None,
        })
        .unwrap();
    assert_eq!(text, r#"{"externalId":"x"}"#);
}

#[test]
fn test_serialize_bytes_matches_text() {
    let mapper = JsonMapper::new();
    let value = serde_json::json!({"k": [1, 2]});
    assert_eq!(
        mapper.serialize_bytes(&value).unwrap(),
        mapper.serialize(&value).unwrap().into_bytes()
    );
}

// ============================================================================
// Lenient timestamps
// ============================================================================

#[test]
fn test_lenient_datetime_valid() {
    let dated: Dated = serde_json::from_str(r#"{"created":"2024-03-01T10:00:00Z"}"#).unwrap();
    assert_eq!(
        dated.created,
        Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap())
    );
}

#[test]
fn test_lenient_datetime_invalid_becomes_epoch() {
    let dated: Dated = serde_json::from_str(r#"{"created":"yesterday"}"#).unwrap();
    assert_eq!(dated.created, Some(DateTime::<Utc>::default()));
}

#[test]
fn test_lenient_datetime_missing_or_null() {
    let dated: Dated = serde_json::from_str("{}").unwrap();
    assert_eq!(dated.created, None);
    let dated: Dated = serde_json::from_str(r#"{"created":null}"#).unwrap();
    assert_eq!(dated.created, None);
}
