use domain::{Envelope, Record};
use fwd_transform::{Outcome, SkipReason, decide};
use serde_json::json;

const TOPIC: &str = "status/AMT12345678901234";
const NOW: i64 = 1700000000000;

fn forward(payload: &str) -> Envelope {
    match decide(TOPIC, payload.as_bytes(), NOW) {
        Outcome::Forward(envelope) => envelope,
        other => panic!("expected forward for {payload:?}, got {other:?}"),
    }
}

fn skip(payload: &str) -> SkipReason {
    match decide(TOPIC, payload.as_bytes(), NOW) {
        Outcome::Skip(reason) => reason,
        other => panic!("expected skip for {payload:?}, got {other:?}"),
    }
}

#[test]
fn object_expands_to_named_records_in_key_order() {
    let envelope = forward(r#"{"AI1":0.07997,"AI2":1.5,"DI1":true}"#);
    assert_eq!(
        envelope.data,
        vec![
            Record::Named {
                name: "AI1".to_string(),
                value: json!(0.07997)
            },
            Record::Named {
                name: "AI2".to_string(),
                value: json!(1.5)
            },
            Record::Named {
                name: "DI1".to_string(),
                value: json!(true)
            },
        ]
    );
}

#[test]
fn key_order_is_encounter_order_not_lexicographic() {
    let envelope = forward(r#"{"zz":1,"aa":2}"#);
    let names: Vec<_> = envelope
        .data
        .iter()
        .map(|record| match record {
            Record::Named { name, .. } => name.as_str(),
            Record::Raw(_) => panic!("expected named records"),
        })
        .collect();
    assert_eq!(names, vec!["zz", "aa"]);
}

#[test]
fn empty_payload_is_skipped() {
    assert_eq!(skip(""), SkipReason::EmptyPayload);
}

#[test]
fn whitespace_only_payload_is_skipped() {
    assert_eq!(skip("   \t\r\n  "), SkipReason::EmptyPayload);
}

#[test]
fn empty_object_is_skipped() {
    assert_eq!(skip("{}"), SkipReason::EmptyJson);
    assert_eq!(skip("  {}  "), SkipReason::EmptyJson);
}

#[test]
fn null_is_skipped() {
    assert_eq!(skip("null"), SkipReason::EmptyJson);
}

#[test]
fn zero_is_forwarded_not_skipped() {
    let envelope = forward("0");
    assert_eq!(envelope.data, vec![Record::Raw(json!(0))]);
}

#[test]
fn false_is_forwarded_not_skipped() {
    let envelope = forward("false");
    assert_eq!(envelope.data, vec![Record::Raw(json!(false))]);
}

#[test]
fn array_is_wrapped_as_single_record() {
    let envelope = forward("[1,2,3]");
    assert_eq!(envelope.data, vec![Record::Raw(json!([1, 2, 3]))]);
}

#[test]
fn empty_array_is_still_forwarded() {
    // 只有空对象与 null 视为空；空数组是另一种 JSON 类型，按值转发。
    let envelope = forward("[]");
    assert_eq!(envelope.data, vec![Record::Raw(json!([]))]);
    let wire = serde_json::to_string(&envelope.data).expect("serialize");
    assert_eq!(wire, "[[]]");
}

#[test]
fn non_json_text_is_forwarded_as_raw_string() {
    let envelope = forward("not json");
    assert_eq!(envelope.data, vec![Record::Raw(json!("not json"))]);
}

#[test]
fn json_string_scalar_is_forwarded() {
    let envelope = forward(r#""hello""#);
    assert_eq!(envelope.data, vec![Record::Raw(json!("hello"))]);
}

#[test]
fn sn_is_prefix_plus_device_id() {
    let envelope = forward(r#"{"AI1":1}"#);
    assert_eq!(envelope.sn, "AMT12345678901234");
    assert_eq!(envelope.envelope_type, "park");
}

#[test]
fn timestamp_is_caller_supplied_clock() {
    let envelope = forward(r#"{"AI1":1}"#);
    assert_eq!(envelope.flexem_timestamp, NOW);
}

#[test]
fn timestamps_follow_arrival_order() {
    let first = match decide(TOPIC, b"1", 100) {
        Outcome::Forward(envelope) => envelope,
        other => panic!("expected forward, got {other:?}"),
    };
    let second = match decide(TOPIC, b"2", 101) {
        Outcome::Forward(envelope) => envelope,
        other => panic!("expected forward, got {other:?}"),
    };
    assert!(second.flexem_timestamp >= first.flexem_timestamp);
}

#[test]
fn unmatched_topic_is_skipped_defensively() {
    match decide("other/topic", b"{\"AI1\":1}", NOW) {
        Outcome::Skip(SkipReason::UnmatchedTopic) => {}
        other => panic!("expected unmatched-topic skip, got {other:?}"),
    }
}

#[test]
fn non_utf8_bytes_fall_back_to_opaque_string() {
    match decide(TOPIC, &[0xff, 0xfe, b'x'], NOW) {
        Outcome::Forward(envelope) => {
            assert_eq!(envelope.data.len(), 1);
            assert!(matches!(envelope.data[0], Record::Raw(serde_json::Value::String(_))));
        }
        other => panic!("expected forward, got {other:?}"),
    }
}

#[test]
fn end_to_end_wire_format() {
    let envelope = forward(r#"{"AI1": 0.07997}"#);
    let wire = serde_json::to_string(&envelope).expect("serialize");
    assert_eq!(
        wire,
        r#"{"data":[{"name":"AI1","value":0.07997}],"SN":"AMT12345678901234","Type":"park","flexem_timestamp":1700000000000}"#
    );
}

#[test]
fn envelope_round_trips_without_loss() {
    let envelope = forward(r#"{"AI1":0.07997,"nested":{"a":[1,null,"x"]}}"#);
    let wire = serde_json::to_string(&envelope).expect("serialize");
    let parsed: Envelope = serde_json::from_str(&wire).expect("parse back");
    assert_eq!(parsed, envelope);
}
