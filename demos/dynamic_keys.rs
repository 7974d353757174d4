//! Keys that are only known at runtime.
//!
//! Run with: cargo run --example dynamic_keys

use serde_codable::{from_str, to_string_pretty, CodingKey, Decode, Decoder, Encode, Encoder, Key, Result};
use std::error::Error;

#[derive(Debug)]
struct RockStar {
    role: String,
    name: String,
    instrument: String,
}

#[derive(Debug)]
struct RockBand(Vec<RockStar>);

const NAME: Key = Key::fixed("name");
const INSTRUMENT_NAME: Key = Key::fixed("instrumentName");

impl Decode for RockBand {
    fn decode(decoder: &Decoder<'_>) -> Result<Self> {
        let container = decoder.container::<Key>()?;
        container
            .all_keys()
            .into_iter()
            .map(|role| {
                let star = container.nested_container::<Key>(&role)?;
                Ok(RockStar {
                    role: role.name().into_owned(),
                    name: star.decode(&NAME)?,
                    instrument: star.decode(&INSTRUMENT_NAME)?,
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(RockBand)
    }
}

impl Encode for RockBand {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        let mut container = encoder.container::<Key>()?;
        for star in &self.0 {
            let mut fields = container.nested_container::<Key>(&Key::named(star.role.clone()))?;
            fields.encode(&star.name, &NAME)?;
            fields.encode(&star.instrument, &INSTRUMENT_NAME)?;
        }
        Ok(())
    }
}

fn main() -> std::result::Result<(), Box<dyn Error>> {
    let band: RockBand = from_str(
        r#"{
            "guitarist": { "name": "Jimi", "instrumentName": "Strat" },
            "drummer": { "name": "Dave", "instrumentName": "Drums" },
            "saxophonist": { "name": "John", "instrumentName": "Sax" }
        }"#,
    )?;

    for star in &band.0 {
        println!("{:<12} {} ({})", star.role, star.name, star.instrument);
    }

    println!("\nRe-encoded:\n{}", to_string_pretty(&band)?);
    Ok(())
}
