use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_codable::{
    codable, coding_keys, decode, encode, from_str, from_str_with_context, from_value, to_string,
    to_string_with_context, to_value, to_value_with_context, value, CodingKey, Context, DateStrategy,
    Decode, Decoder, Encode, Encoder, Error, ErrorKind, Key, KeyStrategy, NonFiniteFloatStrategy,
    OutputFormatting, Result, Serde, UserInfoKey, Value,
};
use std::collections::BTreeMap;

codable! {
    #[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
    pub struct Nutrition {
        pub carbs: f64,
        pub dietary_fiber: Option<f64>,
    }
}

codable! {
    #[derive(Debug, PartialEq, Clone)]
    pub struct Vegetable {
        pub name: String,
        pub water_content: f64,
        pub color: Option<String>,
        pub nutrition: Nutrition,
    }
}

codable! {
    #[derive(Debug, PartialEq)]
    pub struct Retailer {
        pub name: String,
        pub vegetables: Vec<Vegetable>,
        pub stock: BTreeMap<String, u32>,
    }
}

fn carrot() -> Vegetable {
    Vegetable {
        name: "Carrot".to_string(),
        water_content: 88.0,
        color: Some("orange".to_string()),
        nutrition: Nutrition { carbs: 9.6, dietary_fiber: Some(2.8) },
    }
}

fn camel() -> Context {
    Context::new().with_key_strategy(KeyStrategy::SnakeToCamel)
}

#[test]
fn test_round_trip_with_key_strategy() {
    let context = camel();
    let json = to_string_with_context(&carrot(), &context).unwrap();
    assert_eq!(
        json,
        r#"{"name":"Carrot","waterContent":88.0,"color":"orange","nutrition":{"carbs":9.6,"dietaryFiber":2.8}}"#
    );
    let back: Vegetable = from_str_with_context(&json, &context).unwrap();
    assert_eq!(back, carrot());
}

#[test]
fn test_key_strategies_pair_inversely() {
    let context = camel();
    let tree = to_value_with_context(&carrot(), &context).unwrap();
    assert!(tree.get("waterContent").is_some());
    assert!(tree.get("water_content").is_none());

    // Decoding snake_case input under the camel context still works: the
    // decode direction only rewrites camelCase names.
    let snake = to_value(&carrot()).unwrap();
    let back: Vegetable = serde_codable::from_value_with_context(&snake, &context).unwrap();
    assert_eq!(back, carrot());
}

codable! {
    #[derive(Debug, PartialEq)]
    pub struct Produce {
        pub name: String,
        pub water_content as "waterContent": f64,
        pub is_organic as "isOrganic": Option<bool>,
    }
}

#[test]
fn test_renamed_camel_case_fields_round_trip_under_key_strategy() {
    let apple = Produce { name: "Apple".to_string(), water_content: 86.0, is_organic: Some(true) };
    for strategy in [KeyStrategy::Identity, KeyStrategy::SnakeToCamel, KeyStrategy::CamelToSnake] {
        let context = Context::new().with_key_strategy(strategy).with_deny_unknown_keys(true);
        let json = to_string_with_context(&apple, &context).unwrap();
        let back: Produce = from_str_with_context(&json, &context).unwrap();
        assert_eq!(back, apple, "through {}", json);
    }

    let json = to_string_with_context(&apple, &camel()).unwrap();
    assert_eq!(json, r#"{"name":"Apple","waterContent":86.0,"isOrganic":true}"#);
}

#[test]
fn test_custom_key_strategy_round_trip() {
    let context = Context::new().with_key_strategy(KeyStrategy::custom(|name| format!("x_{}", name)));
    let json = to_string_with_context(&carrot(), &context).unwrap();
    assert!(json.starts_with(r#"{"x_name":"Carrot","x_water_content":88.0"#));
    let back: Vegetable = from_str_with_context(&json, &context).unwrap();
    assert_eq!(back, carrot());
}

#[test]
fn test_map_keys_are_data() {
    let mut stock = BTreeMap::new();
    stock.insert("baby_carrots".to_string(), 40);
    stock.insert("kale".to_string(), 12);
    let retailer = Retailer {
        name: "Farmer's Market".to_string(),
        vegetables: vec![carrot()],
        stock,
    };

    let context = camel();
    let tree = to_value_with_context(&retailer, &context).unwrap();
    let stock = tree.get("stock").and_then(Value::as_object).unwrap();
    assert!(stock.contains_key("baby_carrots"));

    let back: Retailer = serde_codable::from_value_with_context(&tree, &context).unwrap();
    assert_eq!(back, retailer);
}

#[test]
fn test_optional_omitted_and_null_accepted() {
    let plain = Vegetable { color: None, ..carrot() };
    let tree = to_value(&plain).unwrap();
    assert!(tree.get("color").is_none());

    let with_null = value!({
        "name": "Carrot",
        "water_content": 88.0,
        "color": null,
        "nutrition": { "carbs": 9.6, "dietary_fiber": 2.8 }
    });
    assert_eq!(from_value::<Vegetable>(&with_null).unwrap(), plain);
}

// The same type, written by hand with the same container calls.
#[derive(Debug)]
struct ManualVegetable(Vegetable);

coding_keys! {
    enum VegetableKey {
        Name = "name",
        WaterContent = "water_content",
        Color = "color",
        Nutrition = "nutrition",
    }
}

impl Encode for ManualVegetable {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        let veg = &self.0;
        let mut container = encoder.container::<VegetableKey>()?;
        container.encode(&veg.name, &VegetableKey::Name)?;
        container.encode(&veg.water_content, &VegetableKey::WaterContent)?;
        container.encode_if_present(&veg.color, &VegetableKey::Color)?;
        container.encode(&veg.nutrition, &VegetableKey::Nutrition)
    }
}

impl Decode for ManualVegetable {
    fn decode(decoder: &Decoder<'_>) -> Result<Self> {
        let container = decoder.container::<VegetableKey>()?;
        let water_content: f64 = container.decode(&VegetableKey::WaterContent)?;
        if !(0.0..=100.0).contains(&water_content) {
            return Err(Error::data_corrupted(
                &container.coding_path().appending(VegetableKey::WaterContent.to_key()),
                "water_content does not lie within the range of 0 - 100",
            ));
        }
        Ok(ManualVegetable(Vegetable {
            name: container.decode(&VegetableKey::Name)?,
            water_content,
            color: container.decode_if_present(&VegetableKey::Color)?,
            nutrition: container.decode(&VegetableKey::Nutrition)?,
        }))
    }
}

#[test]
fn test_derived_and_manual_are_byte_identical() {
    let context = camel().with_output_formatting(OutputFormatting::pretty());
    for veg in [carrot(), Vegetable { color: None, ..carrot() }] {
        let derived = encode(&veg, &context).unwrap();
        let manual = encode(&ManualVegetable(veg.clone()), &context).unwrap();
        assert_eq!(derived, manual);

        let back: ManualVegetable = decode(&derived, &context).unwrap();
        assert_eq!(back.0, veg);
    }
}

#[test]
fn test_validity_check_is_data_corrupted() {
    let json = r#"{"name":"Carrot","water_content":140,"nutrition":{"carbs":1}}"#;
    let err = from_str::<ManualVegetable>(json).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataCorrupted);
    assert_eq!(err.coding_path().as_slice(), &[Key::fixed("water_content")]);
}

#[test]
fn test_error_path_points_at_offending_leaf() {
    let json = r#"{"name":"Kale","water_content":84,"nutrition":{"carbs":"not-a-number"}}"#;
    let err = from_str::<Vegetable>(json).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));
    assert_eq!(
        err.coding_path().as_slice(),
        &[Key::fixed("nutrition"), Key::fixed("carbs")]
    );
}

#[test]
fn test_fail_fast_reports_first_missing_key() {
    let err = from_str::<Vegetable>(r#"{"color":"green"}"#).unwrap_err();
    match err {
        Error::KeyNotFound { key, context } => {
            assert_eq!(key, Key::fixed("name"));
            assert_eq!(context.coding_path.as_slice(), &[Key::fixed("name")]);
        }
        other => panic!("expected KeyNotFound, got {other:?}"),
    }
}

#[test]
fn test_null_for_required_field() {
    let json = r#"{"name":null,"water_content":84,"nutrition":{"carbs":1}}"#;
    let err = from_str::<Vegetable>(json).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValueNotFound);
}

#[test]
fn test_invalid_json() {
    let err = from_str::<Vegetable>(r#"{"name": "Kale""#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataCorrupted);
    assert!(err.underlying().is_some());
}

#[test]
fn test_unknown_keys_tolerated_unless_denied() {
    let json = r#"{"carbs":1.5,"sugar":0.2}"#;
    assert_eq!(
        from_str::<Nutrition>(json).unwrap(),
        Nutrition { carbs: 1.5, dietary_fiber: None }
    );

    let strict = Context::new().with_deny_unknown_keys(true);
    let err = from_str_with_context::<Nutrition>(json, &strict).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataCorrupted);
    assert_eq!(err.coding_path().as_slice(), &[Key::fixed("sugar")]);
}

#[test]
fn test_top_level_encoding_nothing_fails() {
    struct Silent;

    impl Encode for Silent {
        fn encode(&self, _encoder: &mut Encoder<'_>) -> Result<()> {
            Ok(())
        }
    }

    let err = to_string(&Silent).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValue);
}

#[test]
fn test_encode_none_vs_encode_if_present() {
    coding_keys! {
        enum NoteKey { Explicit = "explicit", Omitted = "omitted" }
    }

    struct Note;

    impl Encode for Note {
        fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
            let none: Option<String> = None;
            let mut container = encoder.container::<NoteKey>()?;
            container.encode(&none, &NoteKey::Explicit)?;
            container.encode_if_present(&none, &NoteKey::Omitted)
        }
    }

    assert_eq!(to_string(&Note).unwrap(), r#"{"explicit":null}"#);
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Stall {
    stall_number: u32,
    nutrition: Nutrition,
    prices: BTreeMap<String, f64>,
}

#[test]
fn test_serde_types_follow_the_context() {
    let mut prices = BTreeMap::new();
    prices.insert("per_kilo".to_string(), 2.5);
    let stall = Stall {
        stall_number: 7,
        nutrition: Nutrition { carbs: 1.0, dietary_fiber: None },
        prices,
    };

    let context = camel();
    let json = to_string_with_context(&Serde(&stall), &context).unwrap();
    assert_eq!(
        json,
        r#"{"stallNumber":7,"nutrition":{"carbs":1.0,"dietaryFiber":null},"prices":{"per_kilo":2.5}}"#
    );
    let back: Serde<Stall> = from_str_with_context(&json, &context).unwrap();
    assert_eq!(back.into_inner(), stall);
}

#[test]
fn test_serde_error_paths() {
    let json = r#"{"stall_number":7,"nutrition":{"carbs":"lots"},"prices":{}}"#;
    let err = from_str::<Serde<Stall>>(json).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert_eq!(
        err.coding_path().as_slice(),
        &[Key::fixed("nutrition"), Key::fixed("carbs")]
    );

    let err = from_str::<Serde<Stall>>(r#"{"stall_number":7,"prices":{}}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::KeyNotFound);
    assert_eq!(err.coding_path().as_slice(), &[Key::fixed("nutrition")]);
}

codable! {
    #[derive(Debug, PartialEq)]
    struct Measurement {
        label: String,
        ratio: f64,
    }
}

#[test]
fn test_non_finite_floats_throw_by_default() {
    let reading = vec![Measurement { label: "growth".into(), ratio: f64::INFINITY }];
    let err = to_string(&reading).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValue);
    assert_eq!(err.coding_path().as_slice(), &[Key::index(0), Key::fixed("ratio")]);
}

#[test]
fn test_non_finite_floats_as_sentinels() {
    let context = Context::new()
        .with_non_finite_floats(NonFiniteFloatStrategy::convert_to_string("+Infinity", "-Infinity", "NaN"));
    let readings = vec![
        Measurement { label: "up".into(), ratio: f64::INFINITY },
        Measurement { label: "down".into(), ratio: f64::NEG_INFINITY },
        Measurement { label: "unknown".into(), ratio: f64::NAN },
    ];

    let json = to_string_with_context(&readings, &context).unwrap();
    assert!(json.contains(r#""ratio":"+Infinity""#));

    let back: Vec<Measurement> = from_str_with_context(&json, &context).unwrap();
    assert_eq!(back[0].ratio, f64::INFINITY);
    assert_eq!(back[1].ratio, f64::NEG_INFINITY);
    assert!(back[2].ratio.is_nan());
}

codable! {
    #[derive(Debug, PartialEq)]
    struct Harvest {
        crop: String,
        picked_at: DateTime<Utc>,
    }
}

fn harvest() -> Harvest {
    Harvest {
        crop: "Kale".to_string(),
        picked_at: Utc.timestamp_opt(1_522_324_117, 0).unwrap(),
    }
}

#[test]
fn test_date_strategies() {
    let cases = [
        (DateStrategy::SecondsSince1970, value!(1522324117.0)),
        (DateStrategy::MillisecondsSince1970, value!(1522324117000.0)),
        (DateStrategy::Iso8601, value!("2018-03-29T11:48:37Z")),
        (DateStrategy::DeferredToDate, value!("2018-03-29T11:48:37Z")),
    ];
    for (strategy, expected) in cases {
        let context = Context::new().with_date_strategy(strategy);
        let tree = to_value_with_context(&harvest(), &context).unwrap();
        assert_eq!(tree.get("picked_at"), Some(&expected));
        let back: Harvest = serde_codable::from_value_with_context(&tree, &context).unwrap();
        assert_eq!(back, harvest());
    }
}

#[test]
fn test_formatted_date_strategy() {
    let context = Context::new().with_date_strategy(DateStrategy::formatted("%b-%d-%Y"));
    let json = to_string_with_context(&harvest(), &context).unwrap();
    assert_eq!(json, r#"{"crop":"Kale","picked_at":"Mar-29-2018"}"#);

    let back: Harvest = from_str_with_context(&json, &context).unwrap();
    assert_eq!(back.picked_at, Utc.with_ymd_and_hms(2018, 3, 29, 0, 0, 0).unwrap());

    let err = from_str_with_context::<Harvest>(r#"{"crop":"Kale","picked_at":"yesterday"}"#, &context)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataCorrupted);
    assert_eq!(err.coding_path().as_slice(), &[Key::fixed("picked_at")]);
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Shipment {
    crop: String,
    #[serde(with = "serde_codable::date")]
    shipped_at: DateTime<Utc>,
}

#[test]
fn test_dates_in_serde_types_follow_date_strategy() {
    let shipment = Shipment {
        crop: "Kale".to_string(),
        shipped_at: Utc.timestamp_opt(1_522_324_117, 0).unwrap(),
    };
    let context = Context::new().with_date_strategy(DateStrategy::SecondsSince1970);
    let json = to_string_with_context(&Serde(&shipment), &context).unwrap();
    assert_eq!(json, r#"{"crop":"Kale","shipped_at":1522324117.0}"#);

    let Serde(back) = from_str_with_context::<Serde<Shipment>>(&json, &context).unwrap();
    assert_eq!(back, shipment);

    let err = from_str_with_context::<Serde<Shipment>>(r#"{"crop":"Kale","shipped_at":"soon"}"#, &context)
        .unwrap_err();
    assert_eq!(err.coding_path().as_slice(), &[Key::fixed("shipped_at")]);
}

#[test]
fn test_custom_date_strategy() {
    let strategy = DateStrategy::custom(
        |date, encoder| encoder.single_value_container()?.encode_i64(date.timestamp() / 86_400),
        |decoder| {
            let days = decoder.single_value_container().decode_i64()?;
            DateTime::from_timestamp(days * 86_400, 0)
                .ok_or_else(|| Error::data_corrupted(decoder.coding_path(), "Day count out of range."))
        },
    );
    let context = Context::new().with_date_strategy(strategy);
    let json = to_string_with_context(&harvest(), &context).unwrap();
    assert_eq!(json, r#"{"crop":"Kale","picked_at":17619}"#);

    let back: Harvest = from_str_with_context(&json, &context).unwrap();
    assert_eq!(back.picked_at, Utc.with_ymd_and_hms(2018, 3, 29, 0, 0, 0).unwrap());
}

#[test]
fn test_output_formatting() {
    let context = Context::new().with_output_formatting(OutputFormatting::compact().with_sorted_keys(true));
    let json = to_string_with_context(&carrot(), &context).unwrap();
    assert_eq!(
        json,
        r#"{"color":"orange","name":"Carrot","nutrition":{"carbs":9.6,"dietary_fiber":2.8},"water_content":88.0}"#
    );

    let pretty = Context::new().with_output_formatting(OutputFormatting::pretty());
    let json = to_string_with_context(&Nutrition { carbs: 1.0, dietary_fiber: None }, &pretty).unwrap();
    assert_eq!(json, "{\n  \"carbs\": 1.0\n}");
}

// A type whose representation depends on an API version in the context.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ApiVersion {
    V1,
    V2,
}

const API_VERSION: UserInfoKey = UserInfoKey::new("api_version");

#[derive(Debug, PartialEq)]
struct Farmer {
    name: String,
}

impl Encode for Farmer {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        let version = *encoder.require_user_info::<ApiVersion>(&API_VERSION)?;
        let key = match version {
            ApiVersion::V1 => Key::fixed("full_name"),
            ApiVersion::V2 => Key::fixed("name"),
        };
        encoder.container::<Key>()?.encode(&self.name, &key)
    }
}

impl Decode for Farmer {
    fn decode(decoder: &Decoder<'_>) -> Result<Self> {
        let version = *decoder.require_user_info::<ApiVersion>(&API_VERSION)?;
        let key = match version {
            ApiVersion::V1 => Key::fixed("full_name"),
            ApiVersion::V2 => Key::fixed("name"),
        };
        Ok(Farmer { name: decoder.container::<Key>()?.decode(&key)? })
    }
}

#[test]
fn test_user_info_selects_representation() {
    let farmer = Farmer { name: "Old MacDonald".to_string() };
    let v1 = Context::new().with_user_info(API_VERSION, ApiVersion::V1);
    let v2 = Context::new().with_user_info(API_VERSION, ApiVersion::V2);

    // Deep inside a collection, the option is still visible.
    let farmers = vec![farmer];
    let json = to_string_with_context(&farmers, &v1).unwrap();
    assert_eq!(json, r#"[{"full_name":"Old MacDonald"}]"#);
    assert_eq!(to_string_with_context(&farmers, &v2).unwrap(), r#"[{"name":"Old MacDonald"}]"#);

    let back: Vec<Farmer> = from_str_with_context(&json, &v1).unwrap();
    assert_eq!(back, farmers);
}

#[test]
fn test_missing_user_info_is_an_error() {
    let err = from_str::<Vec<Farmer>>(r#"[{"name":"Old MacDonald"}]"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingUserInfo);
    assert_eq!(err.coding_path().as_slice(), &[Key::index(0)]);
}
