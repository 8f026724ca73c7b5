use itertools::Itertools;

use crate::errors::CommandCreatorWarning;
use crate::invariant_context::InvariantContext;
use crate::robot_state::{LocationLiquidState, PipetteLocation, RobotState, AIR};
use crate::utils::liquid::{merge_liquid, split_liquid, total_volume};
use crate::utils::well_geometry::get_wells_for_tips;

fn wells_for_tips(
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
    pipette_id: &str,
    labware_id: &str,
    well_name: &str,
) -> Option<Vec<Option<String>>> {
    let pipette = invariant_context
        .pipette_entities
        .get(pipette_id)?;
    let labware = invariant_context
        .labware_entities
        .get(labware_id)?;
    get_wells_for_tips(
        &pipette.spec,
        robot_state.pipette_nozzles(pipette_id),
        &labware.def,
        well_name,
    )
}

/// Each tip takes `volume` from the well below it, wells shared by several tips are drawn from once per tip.
pub fn aspirate(
    invariant_context: &InvariantContext,
    robot_state: &mut RobotState,
    pipette_id: &str,
    labware_id: &str,
    well_name: &str,
    volume: f64,
) -> Vec<CommandCreatorWarning> {
    let Some(wells) = wells_for_tips(invariant_context, robot_state, pipette_id, labware_id, well_name) else {
        return vec![];
    };

    let liquid_state = &mut robot_state.liquid_state;
    let labware_liquid = liquid_state
        .labware
        .entry(labware_id.to_string())
        .or_default();

    let mut warnings = vec![];
    for (tips, well) in wells.iter().flatten().dedup_with_count() {
        let total = labware_liquid
            .get(well)
            .map(total_volume)
            .unwrap_or(0.0);
        if total <= 0.0 {
            warnings.push(CommandCreatorWarning::AspirateFromPristineWell {
                labware_id: labware_id.to_string(),
                well_name: well.clone(),
            });
        } else if volume * tips as f64 > total {
            warnings.push(CommandCreatorWarning::AspirateMoreThanWellContents {
                labware_id: labware_id.to_string(),
                well_name: well.clone(),
            });
        }
    }

    let pipette_liquid = liquid_state
        .pipettes
        .entry(pipette_id.to_string())
        .or_default();
    for (tip_index, well) in wells.iter().enumerate() {
        let Some(well) = well else {
            continue;
        };
        let source = labware_liquid
            .entry(well.clone())
            .or_default();
        let (taken, remaining) = split_liquid(volume, source);
        *source = remaining;

        let tip = pipette_liquid
            .entry(tip_index.to_string())
            .or_default();
        *tip = merge_liquid(tip, &taken);
    }

    warnings
}

/// Removes `volume` (or everything, for `None`) from each tip.
fn take_from_tips(robot_state: &mut RobotState, pipette_id: &str, volume: Option<f64>) -> Vec<LocationLiquidState> {
    let Some(tips) = robot_state
        .liquid_state
        .pipettes
        .get_mut(pipette_id)
    else {
        return vec![];
    };

    tips.values_mut()
        .map(|tip| {
            let (taken, remaining) = match volume {
                Some(volume) => split_liquid(volume, tip),
                None => (tip.clone(), LocationLiquidState::new()),
            };
            *tip = remaining;
            taken
        })
        .collect()
}

fn without_air(mut liquid: LocationLiquidState) -> LocationLiquidState {
    liquid.remove(AIR);
    liquid
}

/// Each tip dispenses `volume` (or everything, for `None`) into the well below it, air is not deposited.
pub fn dispense_into_well(
    invariant_context: &InvariantContext,
    robot_state: &mut RobotState,
    pipette_id: &str,
    labware_id: &str,
    well_name: &str,
    volume: Option<f64>,
) {
    let Some(wells) = wells_for_tips(invariant_context, robot_state, pipette_id, labware_id, well_name) else {
        return;
    };

    let liquid_state = &mut robot_state.liquid_state;
    let labware_liquid = liquid_state
        .labware
        .entry(labware_id.to_string())
        .or_default();
    let pipette_liquid = liquid_state
        .pipettes
        .entry(pipette_id.to_string())
        .or_default();

    for (tip_index, well) in wells.iter().enumerate() {
        let tip = pipette_liquid
            .entry(tip_index.to_string())
            .or_default();
        let (taken, remaining) = match volume {
            Some(volume) => split_liquid(volume, tip),
            None => (tip.clone(), LocationLiquidState::new()),
        };
        *tip = remaining;

        if let Some(well) = well {
            let destination = labware_liquid
                .entry(well.clone())
                .or_default();
            *destination = merge_liquid(destination, &without_air(taken));
        }
    }
}

/// Dispenses at the pipette's current location, a well or a trash bin / waste chute.
pub fn dispense_in_place(
    invariant_context: &InvariantContext,
    robot_state: &mut RobotState,
    pipette_id: &str,
    volume: Option<f64>,
) {
    match robot_state.pipette_location(pipette_id).cloned() {
        Some(PipetteLocation::Well {
            labware_id,
            well_name,
        }) => dispense_into_well(invariant_context, robot_state, pipette_id, &labware_id, &well_name, volume),
        Some(PipetteLocation::AddressableArea {
            addressable_area_name,
        }) => {
            let taken = take_from_tips(robot_state, pipette_id, volume);
            if let Some(equipment) = invariant_context.equipment_for_addressable_area(&addressable_area_name) {
                let disposed = robot_state
                    .liquid_state
                    .additional_equipment
                    .entry(equipment.id.clone())
                    .or_default();
                for liquid in taken {
                    *disposed = merge_liquid(disposed, &without_air(liquid));
                }
            }
        }
        None => {
            take_from_tips(robot_state, pipette_id, volume);
        }
    }
}

/// An air gap, each active tip draws in air.
pub fn aspirate_air(invariant_context: &InvariantContext, robot_state: &mut RobotState, pipette_id: &str, volume: f64) {
    let Some(pipette) = invariant_context
        .pipette_entities
        .get(pipette_id)
    else {
        return;
    };
    let channels = pipette
        .spec
        .active_channels(robot_state.pipette_nozzles(pipette_id));

    let tips = robot_state
        .liquid_state
        .pipettes
        .entry(pipette_id.to_string())
        .or_default();
    for tip_index in 0..channels {
        tips.entry(tip_index.to_string())
            .or_default()
            .entry(AIR.to_string())
            .or_default()
            .volume += volume;
    }
}
