#![cfg(test)]

use crate::{
    aggregate_codec, enum_codec,
    codec::{Codec, Describe, Visitor},
    de::Decoder,
    error::{Error, Result},
    ser::{Config, Encoder},
    Value,
};
use std::{
    collections::{BTreeMap, HashMap},
    rc::Rc,
};

#[derive(Debug, Default, Clone, PartialEq)]
struct GpsPosition {
    degrees: i32,
    minutes: i32,
    seconds: f32,
}

impl Describe for GpsPosition {
    fn describe<V: Visitor>(&mut self, visitor: &mut V, _version: u32) -> Result<()> {
        visitor.field("degrees", &mut self.degrees)?;
        visitor.field("minutes", &mut self.minutes)?;
        visitor.field("seconds", &mut self.seconds)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Flags {
    label: String,
    a: bool,
    b: bool,
    c: bool,
}

impl Flags {
    fn new(label: &str, a: bool, b: bool, c: bool) -> Self {
        Self {
            label: label.to_owned(),
            a,
            b,
            c,
        }
    }
}

impl Describe for Flags {
    fn describe<V: Visitor>(&mut self, visitor: &mut V, _version: u32) -> Result<()> {
        visitor.field("label", &mut self.label)?;
        visitor.field("a", &mut self.a)?;
        visitor.field("b", &mut self.b)?;
        visitor.field("c", &mut self.c)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct NestedFlags {
    first: Flags,
    second: Flags,
    third: Option<Box<Flags>>,
}

impl Describe for NestedFlags {
    fn describe<V: Visitor>(&mut self, visitor: &mut V, _version: u32) -> Result<()> {
        visitor.field("first", &mut self.first)?;
        visitor.field("second", &mut self.second)?;
        visitor.field("third", &mut self.third)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
enum Level {
    #[default]
    One = 1,
    Two = 2,
    Three = 3,
    Viva = 77,
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Readout {
    level: Level,
    samples: Vec<u32>,
}

impl Describe for Readout {
    fn describe<V: Visitor>(&mut self, visitor: &mut V, _version: u32) -> Result<()> {
        visitor.field("level", &mut self.level)?;
        visitor.field("samples", &mut self.samples)
    }
}

aggregate_codec!(GpsPosition, Flags, NestedFlags, Readout);
enum_codec!(Level { One, Two, Three, Viva });

fn round_trip<T>(name: &str, mut value: T)
where
    T: Codec + Default + PartialEq + std::fmt::Debug,
{
    let text = crate::to_string(name, &mut value).unwrap();
    let decoded = crate::from_str::<T>(&text, name).unwrap();
    assert_eq!(value, decoded, "round trip through {}", text);
}

#[test]
fn test_scalar_int() {
    let mut value = -66i32;
    let text = crate::to_string("int", &mut value).unwrap();
    assert_eq!(text, r#"{"int":-66}"#);
    assert_eq!(crate::from_str::<i32>(&text, "int").unwrap(), -66);
}

#[test]
fn test_scalars() {
    round_trip("bool", true);
    round_trip("i8", -12i8);
    round_trip("u32", 4_000_000_000u32);
    round_trip("uint", u64::MAX - 1);
    round_trip("double", -666.6f64);
    round_trip("float", 22.5f32);
    round_trip("string", "Test !!!".to_owned());
}

#[test]
fn test_scalar_type_mismatch() {
    let error = crate::from_str::<i32>(r#"{"int":"nope"}"#, "int").unwrap_err();
    assert!(matches!(error, Error::TypeMismatch("i32", "string")));

    let error = crate::from_str::<bool>(r#"{"b":{}}"#, "b").unwrap_err();
    assert!(matches!(error, Error::TypeMismatch("bool", "object")));

    // 300 does not fit an i8.
    let error = crate::from_str::<i8>(r#"{"x":300}"#, "x").unwrap_err();
    assert!(matches!(error, Error::TypeMismatch("i8", _)));
}

#[test]
fn test_int_vector() {
    let mut value = vec![0i32, 1, 2, 3];
    let text = crate::to_string("int_vec", &mut value).unwrap();
    assert_eq!(text, r#"{"int_vec":[0,1,2,3]}"#);
    assert_eq!(crate::from_str::<Vec<i32>>(&text, "int_vec").unwrap(), value);
}

#[test]
fn test_vectors() {
    round_trip("bool_vec", vec![true, false, true, false]);
    round_trip(
        "uint_vec",
        vec![u64::MAX, u64::MAX - 1, u64::MAX - 2, u64::MAX - 3],
    );
    round_trip("double_vec", vec![-123.345f64, 234.35, 324234.2342, 344.3334]);
    round_trip(
        "string_vec",
        vec!["true".to_owned(), "false".to_owned(), "true".to_owned()],
    );
    round_trip("empty_vec", Vec::<i64>::new());
}

#[test]
fn test_big_bool_vector() {
    let value = (0..1000).map(|i| i % 3 == 0).collect::<Vec<_>>();
    round_trip("bool_vec", value);
}

#[test]
fn test_vector_of_aggregates() {
    round_trip(
        "flags_vec",
        vec![
            Flags::new("f0", true, false, true),
            Flags::new("f1", false, false, false),
            Flags::new("f2", true, true, true),
        ],
    );
}

#[test]
fn test_vector_type_mismatch() {
    let error = crate::from_str::<Vec<i32>>(r#"{"v":5}"#, "v").unwrap_err();
    assert!(matches!(error, Error::TypeMismatch("array", "number")));
}

#[test]
fn test_fixed_array() {
    let mut value = [0i32, 1, 2, 3];
    let text = crate::to_string("int_array", &mut value).unwrap();
    assert_eq!(text, r#"{"int_array":[0,1,2,3]}"#);
    assert_eq!(crate::from_str::<[i32; 4]>(&text, "int_array").unwrap(), value);

    round_trip("double_array", [-123.345f64, 234.35, 324234.2342, 344.3334]);
    round_trip(
        "flags_array",
        [
            Flags::new("f0", true, false, true),
            Flags::new("f1", false, true, false),
        ],
    );
}

#[test]
fn test_fixed_array_shape_mismatch() {
    let error = crate::from_str::<[i32; 4]>(r#"{"a":[1,2,3]}"#, "a").unwrap_err();
    assert!(matches!(error, Error::ShapeMismatch(4, 3)));
}

#[test]
fn test_string_map() {
    let mut map = BTreeMap::new();
    map.insert("Key_0".to_owned(), 0i32);
    map.insert("Key_1".to_owned(), 1i32);
    let text = crate::to_string("m", &mut map).unwrap();
    assert_eq!(
        text,
        r#"{"m":[{"first":"Key_0","second":0},{"first":"Key_1","second":1}]}"#
    );
    assert_eq!(
        crate::from_str::<BTreeMap<String, i32>>(&text, "m").unwrap(),
        map
    );
}

#[test]
fn test_int_keyed_map() {
    let mut map = BTreeMap::new();
    map.insert(0i32, "Key_0".to_owned());
    map.insert(1i32, "Key_1".to_owned());
    map.insert(2i32, "Key_2".to_owned());
    round_trip("int_string_map", map);
}

#[test]
fn test_hash_map() {
    let mut map = HashMap::new();
    map.insert("Key_0".to_owned(), true);
    map.insert("Key_1".to_owned(), false);
    map.insert("Key_2".to_owned(), true);
    round_trip("string_bool_map", map);
}

#[test]
fn test_map_of_aggregates() {
    let mut map = BTreeMap::new();
    map.insert("Key_0".to_owned(), Flags::new("b1", false, false, false));
    map.insert("Key_1".to_owned(), Flags::new("b2", false, false, true));
    round_trip("string_flags_map", map);
}

#[test]
fn test_map_of_pointers() {
    let mut map = BTreeMap::<String, Option<Box<Flags>>>::new();
    map.insert(
        "Key_0".to_owned(),
        Some(Box::new(Flags::new("b1", true, false, false))),
    );
    map.insert("Key_1".to_owned(), None);
    round_trip("string_flags_ptr_map", map);
}

#[test]
fn test_map_duplicate_keys_last_wins() {
    let text = r#"{"m":[{"first":"k","second":1},{"first":"k","second":2}]}"#;
    let map = crate::from_str::<BTreeMap<String, i32>>(text, "m").unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(map["k"], 2);
}

#[test]
fn test_aggregate() {
    let mut gps = GpsPosition {
        degrees: 32,
        minutes: 75,
        seconds: 22.5,
    };
    let text = crate::to_string("gps", &mut gps).unwrap();
    assert_eq!(
        text,
        r#"{"gps":{"degrees":32,"minutes":75,"seconds":22.5}}"#
    );
    assert_eq!(crate::from_str::<GpsPosition>(&text, "gps").unwrap(), gps);
}

#[test]
fn test_nested_aggregates() {
    round_trip(
        "nested",
        NestedFlags {
            first: Flags::new("ba", true, true, true),
            second: Flags::new("bb", false, false, false),
            third: Some(Box::new(Flags::new("bc", true, false, true))),
        },
    );
}

#[test]
fn test_field_order_preserved() {
    let mut gps = GpsPosition {
        degrees: 1,
        minutes: 2,
        seconds: 3.0,
    };
    let document = crate::to_document("gps", &mut gps).unwrap();
    let fields = document["gps"].as_object().unwrap();
    let keys = fields.keys().collect::<Vec<_>>();
    assert_eq!(keys, vec!["degrees", "minutes", "seconds"]);
}

#[test]
fn test_null_pointer() {
    let mut value = Option::<Box<Flags>>::None;
    let text = crate::to_string("ptr", &mut value).unwrap();
    assert_eq!(text, r#"{"ptr":null}"#);
    assert_eq!(
        crate::from_str::<Option<Box<Flags>>>(&text, "ptr").unwrap(),
        None
    );
}

#[test]
fn test_pointers() {
    round_trip("boxed", Box::new(GpsPosition {
        degrees: 1,
        minutes: 2,
        seconds: 3.5,
    }));
    round_trip("boxed_scalar", Some(Box::new(42i64)));
    round_trip("rc", Rc::new(Flags::new("shared", true, false, true)));
    round_trip(
        "ptr_vec",
        vec![
            Some(Box::new(Flags::new("p0", true, false, false))),
            None,
            Some(Box::new(Flags::new("p2", false, false, true))),
        ],
    );
}

#[test]
fn test_fixed_array_of_pointers() {
    round_trip(
        "ptr_array",
        [
            Some(Box::new(Flags::new("p0", true, false, false))),
            None,
            Some(Box::new(Flags::new("p2", false, false, true))),
        ],
    );
    round_trip(
        "rc_array",
        [
            Rc::new(Flags::new("r0", true, true, false)),
            Rc::new(Flags::new("r1", false, true, true)),
        ],
    );
}

#[test]
fn test_shared_pointer_encodes_independent_copies() {
    let shared = Rc::new(Flags::new("shared", true, false, true));
    let mut list = vec![shared.clone(), shared];
    let text = crate::to_string("shared_vec", &mut list).unwrap();

    // Two structurally identical entries, no reference markers.
    let document = crate::parse(&text).unwrap();
    let items = document["shared_vec"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0], items[1]);

    // Decoding yields distinct allocations with equal field values.
    let decoded = crate::from_str::<Vec<Rc<Flags>>>(&text, "shared_vec").unwrap();
    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded[0], decoded[1]);
    assert!(!Rc::ptr_eq(&decoded[0], &decoded[1]));
}

#[test]
fn test_enum() {
    let mut value = Level::Three;
    let text = crate::to_string("level", &mut value).unwrap();
    assert_eq!(text, r#"{"level":3}"#);
    assert_eq!(crate::from_str::<Level>(&text, "level").unwrap(), Level::Three);

    round_trip("viva", Level::Viva);
    round_trip(
        "readout",
        Readout {
            level: Level::Two,
            samples: vec![4, 5, 6, 7],
        },
    );
}

#[test]
fn test_enum_invalid_value() {
    let error = crate::from_str::<Level>(r#"{"level":5}"#, "level").unwrap_err();
    assert!(matches!(error, Error::InvalidEnumValue(5)));
}

#[test]
fn test_missing_field() {
    let error = crate::from_str::<bool>(r#"{"bool":true}"#, "not_bool").unwrap_err();
    assert!(matches!(error, Error::FieldNotFound(name) if name == "not_bool"));
}

#[test]
fn test_missing_field_leaves_output_untouched() {
    let mut out = Flags::new("keep", true, false, true);
    let document = crate::parse(r#"{"other":{}}"#).unwrap();
    let error = Decoder::new(document, Config::default())
        .decode("flags", &mut out)
        .unwrap_err();
    assert!(matches!(error, Error::FieldNotFound(_)));
    assert_eq!(out, Flags::new("keep", true, false, true));
}

#[test]
fn test_malformed_document() {
    assert!(matches!(
        crate::from_str::<bool>("", "x").unwrap_err(),
        Error::MalformedDocument(_)
    ));
    assert!(matches!(
        crate::from_str::<bool>("{\"x\":", "x").unwrap_err(),
        Error::MalformedDocument(_)
    ));
}

#[test]
fn test_non_object_root() {
    let error = crate::from_str::<bool>("[1,2,3]", "x").unwrap_err();
    assert!(matches!(error, Error::TypeMismatch("object", "array")));
}

#[test]
fn test_pretty_printing_keeps_logical_tree() {
    let mut value = NestedFlags {
        first: Flags::new("ba", true, true, true),
        second: Flags::new("bb", false, true, false),
        third: None,
    };
    let compact = crate::to_string("nested", &mut value).unwrap();
    let pretty = crate::to_string_pretty("nested", &mut value).unwrap();
    assert_ne!(compact, pretty);
    assert!(pretty.contains('\n'));
    assert_eq!(
        crate::parse(&compact).unwrap(),
        crate::parse(&pretty).unwrap()
    );
}

#[test]
fn test_writer_reader() {
    let mut buffer = Vec::new();
    let mut value = vec![1u32, 2, 3];
    crate::to_writer(&mut buffer, "list", &mut value, Config::default()).unwrap();
    let decoded =
        crate::from_reader::<_, Vec<u32>>(&mut buffer.as_slice(), "list").unwrap();
    assert_eq!(decoded, value);
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Versioned {
    old: i32,
    new: i32,
}

impl Describe for Versioned {
    fn describe<V: Visitor>(&mut self, visitor: &mut V, version: u32) -> Result<()> {
        visitor.field("old", &mut self.old)?;
        if version >= 1 {
            visitor.field("new", &mut self.new)?;
        }
        Ok(())
    }
}

aggregate_codec!(Versioned);

#[test]
fn test_version_reaches_describe() {
    let mut value = Versioned { old: 1, new: 2 };

    let text = crate::to_string("v", &mut value).unwrap();
    assert_eq!(text, r#"{"v":{"old":1}}"#);

    let config = Config::default().with_version(1);
    let document = Encoder::new(config).encode("v", &mut value).unwrap();
    assert_eq!(document["v"]["new"], Value::from(2));

    let mut decoded = Versioned::default();
    Decoder::new(document, config)
        .decode("v", &mut decoded)
        .unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn test_root_object_holds_single_key() {
    let mut value = NestedFlags::default();
    let document = crate::to_document("root", &mut value).unwrap();
    let fields = document.as_object().unwrap();
    assert_eq!(fields.len(), 1);
    assert!(fields.contains_key("root"));
}
