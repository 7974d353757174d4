//! Deriving containers with `codable!` and round-tripping through JSON.
//!
//! Run with: cargo run --example simple

use serde_codable::{codable, from_str, to_string, to_string_pretty};
use std::error::Error;

codable! {
    #[derive(Debug, PartialEq)]
    struct Vegetable {
        name: String,
        water_content as "waterContent": f64,
        color: Option<String>,
    }
}

codable! {
    #[derive(Debug, PartialEq)]
    struct Retailer {
        name: String,
        vegetables: Vec<Vegetable>,
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let market = Retailer {
        name: "Farmer's Market".to_string(),
        vegetables: vec![
            Vegetable {
                name: "Carrot".to_string(),
                water_content: 88.0,
                color: Some("orange".to_string()),
            },
            Vegetable {
                name: "Kale".to_string(),
                water_content: 84.0,
                color: None,
            },
        ],
    };

    let json = to_string(&market)?;
    println!("Compact:\n{}\n", json);
    println!("Pretty:\n{}\n", to_string_pretty(&market)?);

    let back: Retailer = from_str(&json)?;
    assert_eq!(market, back);
    println!("✓ Round-trip successful");

    Ok(())
}
