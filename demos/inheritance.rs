//! Delegating to a base type, nested under a key or merged into one map.
//!
//! Run with: cargo run --example inheritance

use serde_codable::{coding_keys, from_str, to_string, Decode, Decoder, Encode, Encoder, Result};
use std::error::Error;

#[derive(Debug)]
struct Vehicle {
    horse_power: u32,
}

coding_keys! {
    enum VehicleKey { HorsePower = "horsePower" }
}

impl Encode for Vehicle {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        encoder
            .container::<VehicleKey>()?
            .encode(&self.horse_power, &VehicleKey::HorsePower)
    }
}

impl Decode for Vehicle {
    fn decode(decoder: &Decoder<'_>) -> Result<Self> {
        let container = decoder.container::<VehicleKey>()?;
        Ok(Vehicle {
            horse_power: container.decode(&VehicleKey::HorsePower)?,
        })
    }
}

/// Writes its base under `generalInfo`.
#[derive(Debug)]
struct Motorcycle {
    vehicle: Vehicle,
    is_chopper: bool,
}

coding_keys! {
    enum MotorcycleKey { IsChopper = "isChopper", GeneralInfo = "generalInfo" }
}

impl Encode for Motorcycle {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        let mut container = encoder.container::<MotorcycleKey>()?;
        container.encode(&self.is_chopper, &MotorcycleKey::IsChopper)?;
        self.vehicle
            .encode(&mut container.super_encoder_for_key(&MotorcycleKey::GeneralInfo)?)
    }
}

impl Decode for Motorcycle {
    fn decode(decoder: &Decoder<'_>) -> Result<Self> {
        let container = decoder.container::<MotorcycleKey>()?;
        Ok(Motorcycle {
            is_chopper: container.decode(&MotorcycleKey::IsChopper)?,
            vehicle: Vehicle::decode(&container.super_decoder_for_key(&MotorcycleKey::GeneralInfo))?,
        })
    }
}

/// Shares one map with its base.
#[derive(Debug)]
struct Train {
    vehicle: Vehicle,
    wagons_count: u32,
}

coding_keys! {
    enum TrainKey { WagonsCount = "wagonsCount" }
}

impl Encode for Train {
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<()> {
        self.vehicle.encode(encoder)?;
        encoder
            .container::<TrainKey>()?
            .encode(&self.wagons_count, &TrainKey::WagonsCount)
    }
}

impl Decode for Train {
    fn decode(decoder: &Decoder<'_>) -> Result<Self> {
        let container = decoder.container::<TrainKey>()?;
        Ok(Train {
            wagons_count: container.decode(&TrainKey::WagonsCount)?,
            vehicle: Vehicle::decode(decoder)?,
        })
    }
}

fn main() -> std::result::Result<(), Box<dyn Error>> {
    let duke = Motorcycle {
        vehicle: Vehicle { horse_power: 73 },
        is_chopper: false,
    };
    let json = to_string(&duke)?;
    println!("Nested base: {}", json);
    println!("Decoded: {:?}\n", from_str::<Motorcycle>(&json)?);

    let union_pacific = Train {
        vehicle: Vehicle { horse_power: 4750 },
        wagons_count: 10,
    };
    let json = to_string(&union_pacific)?;
    println!("Merged base: {}", json);
    println!("Decoded: {:?}", from_str::<Train>(&json)?);

    Ok(())
}
