//! Tree-wide strategies and user options carried by a `Context`.
//!
//! Run with: cargo run --example custom_context

use chrono::{TimeZone, Utc};
use serde_codable::{
    codable, from_str_with_context, to_string_with_context, Context, DateStrategy, Decode, Decoder,
    Encode, Encoder, Key, KeyStrategy, NonFiniteFloatStrategy, OutputFormatting, Result, UserInfoKey,
};
use std::error::Error;

codable! {
    #[derive(Debug)]
    struct Harvest {
        crop_name: String,
        picked_at: chrono::DateTime<Utc>,
        yield_ratio: f64,
    }
}

const UNITS: UserInfoKey = UserInfoKey::new("units");

#[derive(Debug, Clone, Copy)]
enum Units {
    Metric,
    Imperial,
}

/// A weight whose representation depends on the units in the context.
#[derive(Debug)]
struct Weight {
    kilograms: f64,
}

impl Encode for Weight {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        let (amount, unit) = match encoder.require_user_info::<Units>(&UNITS)? {
            Units::Metric => (self.kilograms, "kg"),
            Units::Imperial => (self.kilograms * 2.204_62, "lb"),
        };
        let mut container = encoder.container::<Key>()?;
        container.encode(&amount, &Key::fixed("amount"))?;
        container.encode(unit, &Key::fixed("unit"))
    }
}

impl Decode for Weight {
    fn decode(decoder: &Decoder<'_>) -> Result<Self> {
        let container = decoder.container::<Key>()?;
        let amount: f64 = container.decode(&Key::fixed("amount"))?;
        let unit: String = container.decode(&Key::fixed("unit"))?;
        let kilograms = if unit == "lb" { amount / 2.204_62 } else { amount };
        Ok(Weight { kilograms })
    }
}

fn main() -> std::result::Result<(), Box<dyn Error>> {
    let harvest = Harvest {
        crop_name: "Kale".to_string(),
        picked_at: Utc
            .with_ymd_and_hms(2018, 3, 29, 11, 48, 37)
            .single()
            .ok_or("invalid date")?,
        yield_ratio: f64::INFINITY,
    };

    let context = Context::new()
        .with_key_strategy(KeyStrategy::SnakeToCamel)
        .with_date_strategy(DateStrategy::formatted("%b-%d-%Y"))
        .with_non_finite_floats(NonFiniteFloatStrategy::convert_to_string("+Infinity", "-Infinity", "NaN"))
        .with_output_formatting(OutputFormatting::pretty().with_sorted_keys(true));

    let json = to_string_with_context(&harvest, &context)?;
    println!("Strategies applied:\n{}\n", json);
    println!("Decoded: {:?}\n", from_str_with_context::<Harvest>(&json, &context)?);

    let crate_weight = Weight { kilograms: 12.5 };
    for units in [Units::Metric, Units::Imperial] {
        let context = Context::new().with_user_info(UNITS, units);
        let json = to_string_with_context(&crate_weight, &context)?;
        let back: Weight = from_str_with_context(&json, &context)?;
        println!("{:?}: {} -> {:.2} kg", units, json, back.kilograms);
    }

    match to_string_with_context(&crate_weight, &Context::new()) {
        Ok(json) => println!("unexpected: {}", json),
        Err(err) => println!("\nWithout units: {}", err),
    }

    Ok(())
}
