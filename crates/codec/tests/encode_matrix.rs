use std::collections::BTreeMap;

use js_bridge_codec::{
    encode, encode_json, CodingPath, DynamicValue, EncodeErrorKind, Encoder, EncoderOptions,
    Misuse, ScriptDate, ScriptUrl, ValueKind,
};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::json;

#[derive(Serialize)]
struct Person {
    name: String,
    age: u8,
    tags: Vec<String>,
}

#[derive(Serialize)]
enum Mood {
    Happy,
    Custom(String),
    Scored { score: f64 },
}

#[derive(Serialize)]
struct Marker;

#[derive(Serialize)]
struct Event {
    at: ScriptDate,
    link: ScriptUrl,
    mood: Mood,
}

#[test]
fn root_leaf_literal_matrix() {
    assert_eq!(encode(&true).unwrap(), "true");
    assert_eq!(encode(&false).unwrap(), "false");
    assert_eq!(encode(&()).unwrap(), "null");
    assert_eq!(encode(&None::<i32>).unwrap(), "null");
    assert_eq!(encode(&Some(5u16)).unwrap(), "5");
    assert_eq!(encode(&-128i8).unwrap(), "-128");
    assert_eq!(encode(&u64::MAX).unwrap(), "18446744073709551615");
    assert_eq!(encode(&1.25f64).unwrap(), "1.25");
    assert_eq!(encode(&0.1f32).unwrap(), "0.1");
    assert_eq!(encode(&'x').unwrap(), r#""x""#);
    assert_eq!(encode(&Marker).unwrap(), "{}");
}

#[test]
fn non_finite_numbers_use_number_constants() {
    assert_eq!(encode(&f64::INFINITY).unwrap(), "Number.POSITIVE_INFINITY");
    assert_eq!(encode(&f64::NEG_INFINITY).unwrap(), "Number.NEGATIVE_INFINITY");
    assert_eq!(encode(&f64::NAN).unwrap(), "Number.NaN");
    assert_eq!(encode(&f32::INFINITY).unwrap(), "Number.POSITIVE_INFINITY");
}

#[test]
fn root_strings_are_script_quoted() {
    assert_eq!(encode("O'Brien").unwrap(), r#""O\'Brien""#);
    assert_eq!(encode("say \"hi\"").unwrap(), r#""say \"hi\"""#);
    assert_eq!(encode("a\\b").unwrap(), r#""a\\b""#);
    assert_eq!(
        encode("\u{08}\t\n\u{0B}\u{0C}\r").unwrap(),
        r#""\b\t\n\v\f\r""#
    );
    assert_eq!(encode(&String::from("plain")).unwrap(), r#""plain""#);
}

#[test]
fn nested_strings_get_single_json_escaping() {
    assert_eq!(encode(&["O'Brien"]).unwrap(), r#"["O'Brien"]"#);
    assert_eq!(
        encode(&vec!["say \"hi\"", "a\\b", "line\nbreak"]).unwrap(),
        r#"["say \"hi\"","a\\b","line\nbreak"]"#
    );
}

#[test]
fn dates_render_as_constructor_or_millis() {
    let date = ScriptDate::from_epoch_seconds(1.5);
    assert_eq!(encode(&date).unwrap(), "new Date(1500)");
    assert_eq!(encode(&vec![date]).unwrap(), "[1500]");
    assert_eq!(
        encode(&ScriptDate::from_epoch_millis(f64::NAN)).unwrap(),
        "new Date(Number.NaN)"
    );
}

#[test]
fn urls_render_as_strings() {
    let url = ScriptUrl::parse("https://example.com/docs?page=2").unwrap();
    assert_eq!(encode(&url).unwrap(), r#""https://example.com/docs?page=2""#);
    assert_eq!(encode(&vec![url]).unwrap(), r#"["https://example.com/docs?page=2"]"#);
}

#[test]
fn structs_render_as_json_objects_in_field_order() {
    let person = Person {
        name: "O'Brien".into(),
        age: 42,
        tags: vec!["a".into(), "b".into()],
    };
    assert_eq!(
        encode(&person).unwrap(),
        r#"{"name":"O'Brien","age":42,"tags":["a","b"]}"#
    );
}

#[test]
fn nested_special_types_and_enums() {
    let event = Event {
        at: ScriptDate::from_epoch_millis(2000.0),
        link: ScriptUrl::parse("https://example.com/").unwrap(),
        mood: Mood::Happy,
    };
    assert_eq!(
        encode(&event).unwrap(),
        r#"{"at":2000,"link":"https://example.com/","mood":"Happy"}"#
    );
    assert_eq!(encode(&Mood::Happy).unwrap(), r#""Happy""#);
    assert_eq!(
        encode(&Mood::Custom("it's".into())).unwrap(),
        r#"{"Custom":"it's"}"#
    );
    assert_eq!(
        encode(&Mood::Scored { score: 0.5 }).unwrap(),
        r#"{"Scored":{"score":0.5}}"#
    );
}

#[test]
fn maps_with_scalar_keys() {
    let mut map = BTreeMap::new();
    map.insert(2u32, "two");
    map.insert(1u32, "one");
    assert_eq!(encode(&map).unwrap(), r#"{"1":"one","2":"two"}"#);
}

#[test]
fn non_string_keys_are_rejected() {
    let mut map = BTreeMap::new();
    map.insert(vec![1u8], 1);
    let err = encode(&map).unwrap_err();
    assert_eq!(err.kind(), &EncodeErrorKind::KeyMustBeString(ValueKind::Sequence));
}

#[test]
fn non_finite_nested_floats_are_rejected_with_path() {
    let err = encode(&vec![1.0, f64::NAN]).unwrap_err();
    assert!(matches!(err.kind(), EncodeErrorKind::NonFiniteFloat(f) if f.is_nan()));
    assert_eq!(err.path().to_string(), "/1");

    let err = encode(&Mood::Scored {
        score: f64::INFINITY,
    })
    .unwrap_err();
    assert_eq!(err.path().to_string(), "/Scored/score");
}

#[test]
fn custom_errors_carry_the_field_path() {
    struct Failing;
    impl Serialize for Failing {
        fn serialize<S: Serializer>(&self, _s: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("cannot describe"))
        }
    }
    #[derive(Serialize)]
    struct Holder {
        items: Vec<Failing>,
    }
    let err = encode(&Holder {
        items: vec![Failing],
    })
    .unwrap_err();
    assert_eq!(err.kind(), &EncodeErrorKind::Custom("cannot describe".into()));
    assert_eq!(err.path().to_string(), "/items/0");
}

#[test]
fn encode_json_matches_structured_rendering() {
    let value = encode_json(&Event {
        at: ScriptDate::from_epoch_millis(1.5),
        link: ScriptUrl::parse("https://example.com/").unwrap(),
        mood: Mood::Custom("x".into()),
    })
    .unwrap();
    assert_eq!(
        value,
        json!({"at": 1.5, "link": "https://example.com/", "mood": {"Custom": "x"}})
    );
    assert_eq!(encode_json("O'Brien").unwrap(), json!("O'Brien"));
}

#[test]
fn encode_value_exposes_the_structured_tree() {
    let encoder = Encoder::new();
    let tree = encoder
        .encode_value(&(ScriptDate::from_epoch_millis(2.0), "s", Marker))
        .unwrap();
    assert_eq!(
        tree,
        DynamicValue::from(vec![
            DynamicValue::from(2i64),
            DynamicValue::from("s"),
            DynamicValue::EmptySingleton,
        ])
    );
    let err = encoder.encode_value(&f64::NAN).unwrap_err();
    assert!(matches!(err.kind(), EncodeErrorKind::NonFiniteFloat(_)));
    assert!(err.path().is_root());
}

#[test]
fn codecs_are_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Encoder>();
    assert_send_sync::<js_bridge_codec::Decoder>();
}

fn intercept(misuse: &Misuse, path: &CodingPath) -> ! {
    panic!("intercepted at {path}: {misuse}");
}

struct ValueBeforeKey;

impl Serialize for ValueBeforeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_value(&1)?;
        map.end()
    }
}

struct DanglingKey;

impl Serialize for DanglingKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_key("orphan")?;
        map.end()
    }
}

#[test]
#[should_panic(expected = "intercepted at /0: map value written before its key")]
fn misuse_reaches_injected_handler() {
    let encoder = Encoder::with_options(EncoderOptions {
        on_misuse: intercept,
    });
    let _ = encoder.encode(&vec![ValueBeforeKey]);
}

#[test]
#[should_panic(expected = "js-bridge protocol misuse at (root): map key written without a value")]
fn default_misuse_handler_panics() {
    let _ = encode(&DanglingKey);
}
