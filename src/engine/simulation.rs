use rand::seq::SliceRandom;
use rand::Rng;

use crate::engine::types::{NewOrder, Side};

/// Crops the demo order flow trades in.
pub const DEMO_CROPS: [&str; 4] = ["wheat", "rice", "cotton", "sugarcane"];

/// Reference price per quintal used to center simulated quotes.
pub fn base_price(crop: &str) -> i64 {
    match crop {
        "wheat" => 2150,
        "rice" => 3200,
        "cotton" => 6800,
        _ => 380,
    }
}

/// One random demo order: random crop and side, quantity 10..=109, price
/// within ±5% of the crop's reference price.
pub fn random_order() -> NewOrder {
    let mut rng = rand::thread_rng();

    let crop = *DEMO_CROPS.choose(&mut rng).unwrap_or(&"wheat");
    let side = if rng.gen_bool(0.5) {
        Side::Buy
    } else {
        Side::Sell
    };
    let quantity = rng.gen_range(10..110);
    let factor = 0.95 + rng.gen_range(0.0..0.1);
    let price = (base_price(crop) as f64 * factor).round() as i64;

    NewOrder {
        crop: crop.to_string(),
        side,
        quantity,
        price,
        trader: Some("simulator".to_string()),
    }
}
