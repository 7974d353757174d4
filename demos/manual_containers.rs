//! Reshaping data with hand-written keyed and unkeyed containers.
//!
//! Run with: cargo run --example manual_containers

use serde_codable::{
    codable, coding_keys, from_str, to_string, Decode, Decoder, Encode, Encoder, Result,
};
use std::error::Error;

#[derive(Debug)]
struct Guitar {
    name: String,
    number_of_strings: u8,
    is_electric: Option<bool>,
}

coding_keys! {
    enum GuitarKey { Name = "name", Info = "info" }
}

coding_keys! {
    enum InfoKey { NumberOfStrings = "numberOfStrings", IsElectric = "isElectric" }
}

impl Encode for Guitar {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        let mut container = encoder.container::<GuitarKey>()?;
        container.encode(&self.name, &GuitarKey::Name)?;

        let mut info = container.nested_container::<InfoKey>(&GuitarKey::Info)?;
        info.encode(&self.number_of_strings, &InfoKey::NumberOfStrings)?;
        info.encode_if_present(&self.is_electric, &InfoKey::IsElectric)
    }
}

impl Decode for Guitar {
    fn decode(decoder: &Decoder<'_>) -> Result<Self> {
        let container = decoder.container::<GuitarKey>()?;
        let info = container.nested_container::<InfoKey>(&GuitarKey::Info)?;
        Ok(Guitar {
            name: container.decode(&GuitarKey::Name)?,
            number_of_strings: info.decode(&InfoKey::NumberOfStrings)?,
            is_electric: info.decode_if_present(&InfoKey::IsElectric)?,
        })
    }
}

codable! {
    #[derive(Debug)]
    struct Dish {
        name: String,
        price: f32,
    }
}

/// Keeps only the cheapest dish of all menu sections.
#[derive(Debug)]
struct Restaurant {
    name: String,
    cheapest_dish: Option<Dish>,
}

coding_keys! {
    enum RestaurantKey { Name = "name", MenuSections = "menuSections" }
}

coding_keys! {
    enum SectionKey { Dishes = "dishes" }
}

impl Decode for Restaurant {
    fn decode(decoder: &Decoder<'_>) -> Result<Self> {
        let container = decoder.container::<RestaurantKey>()?;
        let mut sections = container.nested_unkeyed_container(&RestaurantKey::MenuSections)?;

        let mut dishes: Vec<Dish> = Vec::new();
        while !sections.is_at_end() {
            let section = sections.nested_container::<SectionKey>()?;
            let mut section_dishes = section.nested_unkeyed_container(&SectionKey::Dishes)?;
            while !section_dishes.is_at_end() {
                dishes.push(section_dishes.decode()?);
            }
        }

        Ok(Restaurant {
            name: container.decode(&RestaurantKey::Name)?,
            cheapest_dish: dishes.into_iter().min_by(|a, b| a.price.total_cmp(&b.price)),
        })
    }
}

fn main() -> std::result::Result<(), Box<dyn Error>> {
    let strat = Guitar {
        name: "Strat".to_string(),
        number_of_strings: 6,
        is_electric: Some(true),
    };
    let json = to_string(&strat)?;
    println!("Flat fields, nested output:\n{}\n", json);
    println!("Decoded back: {:?}\n", from_str::<Guitar>(&json)?);

    let restaurants: Vec<Restaurant> = from_str(
        r#"[{
            "name": "Healthy Place #1",
            "menuSections": [
                { "name": "Appetizers", "dishes": [ { "name": "Tapas", "price": 10 } ] },
                { "name": "Desserts", "dishes": [ { "name": "Ice Cream", "price": 9.90 }, { "name": "Cake", "price": 15 } ] }
            ]
        }]"#,
    )?;
    for restaurant in &restaurants {
        println!("{}: cheapest dish {:?}", restaurant.name, restaurant.cheapest_dish);
    }

    Ok(())
}
