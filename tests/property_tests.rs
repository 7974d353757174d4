//! Property-based tests for the round-trip guarantees.
//!
//! Values encoded under a context decode back to equal values under the same
//! context, for derived types, standard collections and every key strategy.

use proptest::prelude::*;
use serde_codable::strategy::{camel_to_snake, snake_to_camel};
use serde_codable::{codable, decode, encode, Context, Decode, Encode, KeyStrategy, NonFiniteFloatStrategy};
use std::collections::BTreeMap;
use std::fmt::Debug;

fn roundtrip<T: Encode + Decode + PartialEq + Debug>(value: &T, context: &Context) -> bool {
    match encode(value, context) {
        Ok(bytes) => match decode::<T>(&bytes, context) {
            Ok(decoded) => *value == decoded,
            Err(e) => {
                eprintln!("Decode failed: {}", e);
                eprintln!("Encoded was: {}", String::from_utf8_lossy(&bytes));
                false
            }
        },
        Err(e) => {
            eprintln!("Encode failed: {}", e);
            false
        }
    }
}

codable! {
    #[derive(Debug, Clone, PartialEq)]
    struct Vegetable {
        name: String,
        water_content: f64,
        harvest_count: u32,
        color: Option<String>,
        tags: Vec<String>,
    }
}

fn exact_float() -> impl Strategy<Value = f64> {
    // Quarters have short, exact decimal forms.
    (-1_000_000i64..1_000_000).prop_map(|n| n as f64 / 4.0)
}

fn vegetable() -> impl Strategy<Value = Vegetable> {
    (
        "[a-zA-Z ]{0,12}",
        exact_float(),
        any::<u32>(),
        proptest::option::of("[a-z]{1,8}"),
        prop::collection::vec("[a-z_]{0,6}", 0..4),
    )
        .prop_map(|(name, water_content, harvest_count, color, tags)| Vegetable {
            name,
            water_content,
            harvest_count,
            color,
            tags,
        })
}

fn key_strategy() -> impl Strategy<Value = KeyStrategy> {
    prop_oneof![
        Just(KeyStrategy::Identity),
        Just(KeyStrategy::SnakeToCamel),
        Just(KeyStrategy::CamelToSnake)
    ]
}

proptest! {
    #[test]
    fn prop_i64(n in any::<i64>()) {
        prop_assert!(roundtrip(&n, &Context::new()));
    }

    #[test]
    fn prop_u64(n in any::<u64>()) {
        prop_assert!(roundtrip(&n, &Context::new()));
    }

    #[test]
    fn prop_i8(n in any::<i8>()) {
        prop_assert!(roundtrip(&n, &Context::new()));
    }

    #[test]
    fn prop_bool(b in any::<bool>()) {
        prop_assert!(roundtrip(&b, &Context::new()));
    }

    #[test]
    fn prop_string(s in any::<String>()) {
        prop_assert!(roundtrip(&s, &Context::new()));
    }

    #[test]
    fn prop_float(f in exact_float()) {
        prop_assert!(roundtrip(&f, &Context::new()));
    }

    #[test]
    fn prop_vec_i32(v in prop::collection::vec(any::<i32>(), 0..20)) {
        prop_assert!(roundtrip(&v, &Context::new()));
    }

    #[test]
    fn prop_option_i32(opt in proptest::option::of(any::<i32>())) {
        prop_assert!(roundtrip(&opt, &Context::new()));
    }

    #[test]
    fn prop_map(m in prop::collection::btree_map("[a-zA-Z_]{0,8}", any::<i16>(), 0..8)) {
        // Map keys are data, so they survive any key strategy untouched.
        let context = Context::new().with_key_strategy(KeyStrategy::SnakeToCamel);
        prop_assert!(roundtrip::<BTreeMap<String, i16>>(&m, &context));
    }

    #[test]
    fn prop_vegetable(veg in vegetable(), strategy in key_strategy()) {
        let context = Context::new().with_key_strategy(strategy);
        prop_assert!(roundtrip(&veg, &context));
    }

    #[test]
    fn prop_vegetables(vegs in prop::collection::vec(vegetable(), 0..5)) {
        prop_assert!(roundtrip(&vegs, &Context::new()));
    }

    #[test]
    fn prop_non_finite_sentinels(pick in 0usize..3, values in prop::collection::vec(exact_float(), 0..4)) {
        let special = [f64::INFINITY, f64::NEG_INFINITY, f64::NAN][pick];
        let context = Context::new()
            .with_non_finite_floats(NonFiniteFloatStrategy::convert_to_string("inf", "-inf", "nan"));
        let bytes = encode(&special, &context).unwrap();
        let back: f64 = decode(&bytes, &context).unwrap();
        prop_assert!(back == special || (back.is_nan() && special.is_nan()));
        prop_assert!(roundtrip(&values, &context));
    }

    #[test]
    fn prop_snake_camel_inverse(words in prop::collection::vec("[a-z]{1,6}", 1..5)) {
        let snake = words.join("_");
        let camel = snake_to_camel(&snake);
        prop_assert_eq!(camel_to_snake(&camel), snake.as_str());
    }
}
