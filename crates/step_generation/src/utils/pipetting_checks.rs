//! Validation shared by the creators that move a pipette into a labware well.

use hardware::deck::{is_column_4_slot, RobotType};
use hardware::pipette::PipetteDisplayCategory;

use crate::errors::CommandCreatorError;
use crate::invariant_context::InvariantContext;
use crate::robot_state::{DeckLocation, ModuleState, RobotState};
use crate::robot_state_selectors::{get_labware_deck_slot, get_module_under_labware, get_pipette_with_tip_max_vol};
use crate::utils::heater_shaker::{
    get_is_heater_shaker_east_west_multi_channel, get_is_heater_shaker_east_west_with_latch_open,
    get_is_heater_shaker_north_south_east_west_shaking, get_is_tall_labware_east_west_of_heater_shaker,
};
use crate::utils::safe_pipette_movement::get_is_safe_pipette_movement;

/// OT-2 slots where GEN1 magnetic and temperature modules are hit by GEN1 multi-channel pipettes, and the slot to
/// the north of each.
const GEN1_COLLISION_SLOTS: [(&str, &str); 2] = [("1", "4"), ("3", "6")];

#[derive(Debug, Clone, Copy)]
pub struct PipettingCheck<'a> {
    pub pipette_id: &'a str,
    pub labware_id: &'a str,
    /// e.g. `aspirate`, used by the column 4 error.
    pub type_of_step: &'a str,
    pub requires_tip: bool,
    /// Checked against the capacity of the pipette with its tip.
    pub volume: Option<f64>,
}

/// Returns every violation found, or an empty list.
///
/// A missing pipette or labware ends validation early since no further check is meaningful.
pub fn check_pipetting(
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
    check: PipettingCheck,
) -> Vec<CommandCreatorError> {
    let pipette = match invariant_context.pipette(check.pipette_id) {
        Ok(pipette) => pipette,
        Err(error) => return vec![error],
    };
    if let Err(error) = invariant_context.labware(check.labware_id) {
        return vec![error];
    }

    let mut errors = vec![];

    let deck_location = robot_state.labware_deck_location(invariant_context, check.labware_id);
    match deck_location {
        Ok(DeckLocation::OffDeck) => errors.push(CommandCreatorError::LabwareOffDeck {
            labware_id: check.labware_id.to_string(),
        }),
        Ok(DeckLocation::Disposal(_)) => errors.push(CommandCreatorError::LabwareDiscardedInWasteChute {
            labware_id: check.labware_id.to_string(),
        }),
        Err(_) => errors.push(CommandCreatorError::LabwareDoesNotExist {
            labware_id: check.labware_id.to_string(),
        }),
        Ok(DeckLocation::Slot(_)) => {}
    }

    if pipette.spec.display_category == PipetteDisplayCategory::Gen1
        && pipette.spec.is_multi_channel()
        && get_is_gen1_module_collision(invariant_context, robot_state, check.labware_id)
    {
        errors.push(CommandCreatorError::ModulePipetteCollisionDanger);
    }

    if check.requires_tip && !robot_state.pipette_has_tip(check.pipette_id) {
        errors.push(CommandCreatorError::NoTipOnPipette {
            pipette_id: check.pipette_id.to_string(),
        });
    }

    let module = get_module_under_labware(robot_state, check.labware_id).and_then(|module_id| {
        robot_state
            .modules
            .get(module_id)
    });
    match module.map(|module| &module.module_state) {
        Some(ModuleState::Thermocycler {
            lid_open,
            ..
        }) if *lid_open != Some(true) => errors.push(CommandCreatorError::ThermocyclerLidClosed),
        Some(ModuleState::HeaterShaker {
            target_speed: Some(_),
            ..
        }) => errors.push(CommandCreatorError::HeaterShakerIsShaking),
        Some(ModuleState::AbsorbanceReader {
            lid_open,
            ..
        }) if *lid_open != Some(true) => errors.push(CommandCreatorError::AbsorbanceReaderLidClosed),
        _ => {}
    }

    let slot = get_labware_deck_slot(invariant_context, robot_state, check.labware_id);

    if invariant_context.robot_type == RobotType::Ot2 {
        if let Some(slot) = slot.as_deref() {
            let robot_type = invariant_context.robot_type;
            if get_is_heater_shaker_north_south_east_west_shaking(robot_type, robot_state, slot) {
                errors.push(CommandCreatorError::HeaterShakerNorthSouthEastWestShaking);
            }
            if get_is_heater_shaker_east_west_with_latch_open(robot_type, robot_state, slot) {
                errors.push(CommandCreatorError::HeaterShakerEastWestWithLatchOpen);
            }
            if get_is_heater_shaker_east_west_multi_channel(robot_type, robot_state, slot, &pipette.spec) {
                errors.push(CommandCreatorError::HeaterShakerEastWestMultiChannel);
            }
            let on_heater_shaker = matches!(
                module.map(|module| &module.module_state),
                Some(ModuleState::HeaterShaker { .. })
            );
            if on_heater_shaker && get_is_tall_labware_east_west_of_heater_shaker(invariant_context, robot_state, slot) {
                errors.push(CommandCreatorError::TallLabwareEastWestOfHeaterShaker);
            }
        }
    }

    if slot
        .as_deref()
        .map(is_column_4_slot)
        .unwrap_or(false)
    {
        errors.push(CommandCreatorError::PipettingIntoColumn4 {
            type_of_step: check.type_of_step.to_string(),
        });
    }

    if let Some(volume) = check.volume {
        let max_volume = get_pipette_with_tip_max_vol(invariant_context, check.pipette_id, None)
            .unwrap_or(pipette.spec.max_volume);
        if volume > max_volume {
            errors.push(CommandCreatorError::PipetteVolumeExceeded {
                volume,
                max_volume,
            });
        }
    }

    if !get_is_safe_pipette_movement(invariant_context, robot_state, check.pipette_id, check.labware_id) {
        errors.push(CommandCreatorError::PossiblePipetteCollision);
    }

    errors
}

/// GEN1 magnetic/temperature modules in slot 1 or 3 obstruct the labware on them and in the slot to their north.
fn get_is_gen1_module_collision(invariant_context: &InvariantContext, robot_state: &RobotState, labware_id: &str) -> bool {
    if invariant_context.robot_type != RobotType::Ot2 {
        return false;
    }
    let labware_slot = robot_state
        .labware
        .get(labware_id)
        .map(|labware| labware.slot.as_str());

    robot_state
        .modules
        .iter()
        .filter(|(module_id, _module)| {
            invariant_context
                .module_entities
                .get(*module_id)
                .map(|entity| entity.model.has_gen1_collision_issues())
                .unwrap_or(false)
        })
        .any(|(module_id, module)| {
            GEN1_COLLISION_SLOTS
                .iter()
                .filter(|(module_slot, _north)| module.slot == *module_slot)
                .any(|(_module_slot, north)| labware_slot == Some(module_id.as_str()) || labware_slot == Some(*north))
        })
}
