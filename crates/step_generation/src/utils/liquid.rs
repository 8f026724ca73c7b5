use crate::robot_state::{LiquidVolume, LocationLiquidState, AIR};

pub fn total_volume(liquid: &LocationLiquidState) -> f64 {
    liquid
        .values()
        .map(|liquid| liquid.volume)
        .sum()
}

/// Splits `volume` off `source`, returning `(taken, remaining)`.
///
/// Liquids are taken in proportion to their share of the source. Taking from an empty source yields air, taking
/// more than the source holds yields all of it topped up with air.
pub fn split_liquid(volume: f64, source: &LocationLiquidState) -> (LocationLiquidState, LocationLiquidState) {
    let total = total_volume(source);

    if total <= 0.0 {
        let taken = LocationLiquidState::from([(AIR.to_string(), LiquidVolume {
            volume,
        })]);
        return (taken, source.clone());
    }

    if volume > total {
        let mut taken = source.clone();
        taken
            .entry(AIR.to_string())
            .or_default()
            .volume += volume - total;
        let remaining = source
            .keys()
            .map(|liquid_id| {
                (liquid_id.clone(), LiquidVolume {
                    volume: 0.0,
                })
            })
            .collect();
        return (taken, remaining);
    }

    let ratio = volume / total;
    let mut taken = LocationLiquidState::new();
    let mut remaining = LocationLiquidState::new();
    for (liquid_id, liquid) in source.iter() {
        let portion = liquid.volume * ratio;
        taken.insert(liquid_id.clone(), LiquidVolume {
            volume: portion,
        });
        remaining.insert(liquid_id.clone(), LiquidVolume {
            volume: liquid.volume - portion,
        });
    }
    (taken, remaining)
}

/// Sums the volumes of each liquid.
pub fn merge_liquid(a: &LocationLiquidState, b: &LocationLiquidState) -> LocationLiquidState {
    let mut merged = a.clone();
    for (liquid_id, liquid) in b.iter() {
        merged
            .entry(liquid_id.clone())
            .or_default()
            .volume += liquid.volume;
    }
    merged
}
