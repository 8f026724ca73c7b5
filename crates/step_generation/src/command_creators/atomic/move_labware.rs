use std::collections::BTreeSet;

use hardware::deck::GRIPPER_WASTE_CHUTE_ADDRESSABLE_AREA;

use crate::command::{CommandBody, LabwareLocation, LabwareMovementStrategy, MoveLabwareParams};
use crate::command_creator::{errors_to_result, make_command, CommandCreatorResult, CommandsAndWarnings};
use crate::errors::{CommandCreatorError, CommandCreatorWarning};
use crate::invariant_context::{AdditionalEquipmentName, InvariantContext};
use crate::python::{format_py_call, format_py_str, PROTOCOL_API_NAME, PROTOCOL_CONTEXT_NAME};
use crate::robot_state::{DeckLocation, ModuleState, RobotState};
use crate::robot_state_selectors::get_module_under_labware;

/// Moves a labware, with everything stacked on it, manually or with the gripper.
///
/// A gripper move with a tip on any pipette fails with only [`CommandCreatorError::PipetteHasTip`], other problems
/// are collected and returned together.
pub fn move_labware(args: &MoveLabwareParams, invariant_context: &InvariantContext, robot_state: &RobotState) -> CommandCreatorResult {
    let use_gripper = args.strategy == LabwareMovementStrategy::UsingGripper;

    if use_gripper && robot_state.any_pipette_has_tip() {
        return Err(CommandCreatorError::PipetteHasTip.into());
    }

    let labware = invariant_context.labware(&args.labware_id)?;
    if !robot_state
        .labware
        .contains_key(&args.labware_id)
    {
        return Err(CommandCreatorError::LabwareDoesNotExist {
            labware_id: args.labware_id.clone(),
        }
        .into());
    }

    let mut errors = vec![];

    match robot_state.labware_deck_location(invariant_context, &args.labware_id) {
        Ok(DeckLocation::Disposal(_)) => errors.push(CommandCreatorError::LabwareDiscardedInWasteChute {
            labware_id: args.labware_id.clone(),
        }),
        Ok(DeckLocation::OffDeck) if use_gripper => errors.push(CommandCreatorError::LabwareOffDeck {
            labware_id: args.labware_id.clone(),
        }),
        _ => {}
    }

    if use_gripper {
        if !invariant_context.has_gripper() {
            errors.push(CommandCreatorError::GripperRequired);
        }
        if !labware.def.is_gripper_compatible() {
            errors.push(CommandCreatorError::CannotMoveWithGripper {
                labware_id: args.labware_id.clone(),
            });
        }
    }

    if let Some(module_id) = get_module_under_labware(robot_state, &args.labware_id) {
        check_module_access(robot_state.module_state(module_id), &mut errors);
    }

    let destination = match &args.new_location {
        LabwareLocation::SlotName(slot) => {
            check_unoccupied(robot_state, &args.labware_id, slot, true, &mut errors);
            format_py_str(slot)
        }
        LabwareLocation::ModuleId(module_id) => {
            let module = invariant_context.module(module_id)?;
            check_module_access(robot_state.module_state(module_id), &mut errors);
            check_unoccupied(robot_state, &args.labware_id, module_id, false, &mut errors);
            module.python_name.clone()
        }
        LabwareLocation::LabwareId(labware_id) => {
            let below = invariant_context.labware(labware_id)?;
            if is_stacked_on(robot_state, labware_id, &args.labware_id) {
                errors.push(CommandCreatorError::InvalidLocation {
                    location: labware_id.clone(),
                });
            }
            if let Some(module_id) = get_module_under_labware(robot_state, labware_id) {
                check_module_access(robot_state.module_state(module_id), &mut errors);
            }
            check_unoccupied(robot_state, &args.labware_id, labware_id, false, &mut errors);
            below.python_name.clone()
        }
        LabwareLocation::AddressableAreaName(area) if area == GRIPPER_WASTE_CHUTE_ADDRESSABLE_AREA => {
            let waste_chute = invariant_context
                .additional_equipment_entities
                .values()
                .find(|entity| entity.name == AdditionalEquipmentName::WasteChute);
            match waste_chute {
                Some(waste_chute) => waste_chute.python_name.clone(),
                None => {
                    errors.push(CommandCreatorError::InvalidLocation {
                        location: area.clone(),
                    });
                    format_py_str(area)
                }
            }
        }
        LabwareLocation::AddressableAreaName(area) => format_py_str(area),
        LabwareLocation::OffDeck => format!("{}.OFF_DECK", PROTOCOL_API_NAME),
    };

    errors_to_result(errors)?;

    let warnings = match &args.new_location {
        LabwareLocation::AddressableAreaName(area) if area == GRIPPER_WASTE_CHUTE_ADDRESSABLE_AREA => {
            waste_chute_warnings(robot_state, &args.labware_id)
        }
        _ => vec![],
    };

    let python = format_py_call(&format!("{}.move_labware", PROTOCOL_CONTEXT_NAME), &[
        (None, labware.python_name.clone()),
        (None, destination),
        (Some("use_gripper"), if use_gripper { "True" } else { "False" }.to_string()),
    ]);

    Ok(
        CommandsAndWarnings::new(vec![make_command(invariant_context, CommandBody::MoveLabware(args.clone()))])
            .with_warnings(warnings)
            .with_python(python),
    )
}

/// Labware can only be placed on or taken from a module that is open and idle.
fn check_module_access(module_state: Option<&ModuleState>, errors: &mut Vec<CommandCreatorError>) {
    match module_state {
        Some(ModuleState::Thermocycler {
            lid_open, ..
        }) if *lid_open != Some(true) => errors.push(CommandCreatorError::ThermocyclerLidClosed),
        Some(ModuleState::HeaterShaker {
            target_speed,
            latch_open,
            ..
        }) => {
            if target_speed.is_some() {
                errors.push(CommandCreatorError::HeaterShakerIsShaking);
            }
            if !latch_open {
                errors.push(CommandCreatorError::HeaterShakerLatchClosed);
            }
        }
        Some(ModuleState::AbsorbanceReader {
            lid_open, ..
        }) if *lid_open != Some(true) => errors.push(CommandCreatorError::AbsorbanceReaderLidClosed),
        _ => {}
    }
}

/// True when `labware_id` is `base_id` or sits, directly or further up a stack, on it.
fn is_stacked_on(robot_state: &RobotState, labware_id: &str, base_id: &str) -> bool {
    let mut visited: BTreeSet<&str> = BTreeSet::new();
    let mut current = labware_id;
    while visited.insert(current) {
        if current == base_id {
            return true;
        }
        match robot_state.labware.get(current) {
            Some(labware) => current = &labware.slot,
            None => return false,
        }
    }
    false
}

fn check_unoccupied(
    robot_state: &RobotState,
    labware_id: &str,
    location: &str,
    include_modules: bool,
    errors: &mut Vec<CommandCreatorError>,
) {
    let occupied_by_labware = robot_state
        .labware
        .iter()
        .any(|(id, labware)| id != labware_id && labware.slot == location);
    let occupied_by_module = include_modules
        && robot_state
            .modules
            .values()
            .any(|module| module.slot == location);

    if occupied_by_labware || occupied_by_module {
        errors.push(CommandCreatorError::MultipleEntitiesOnSameSlotName {
            location: location.to_string(),
        });
    }
}

fn waste_chute_warnings(robot_state: &RobotState, labware_id: &str) -> Vec<CommandCreatorWarning> {
    let mut warnings = vec![];

    let has_tips = robot_state
        .tip_state
        .tipracks
        .get(labware_id)
        .is_some_and(|wells| wells.values().any(|has_tip| *has_tip));
    if has_tips {
        warnings.push(CommandCreatorWarning::TiprackInWasteChuteHasTips {
            labware_id: labware_id.to_string(),
        });
    }

    let has_liquid = robot_state
        .liquid_state
        .labware
        .get(labware_id)
        .is_some_and(|wells| {
            wells
                .values()
                .flat_map(|liquids| liquids.values())
                .any(|liquid| liquid.volume > 0.0)
        });
    if has_liquid {
        warnings.push(CommandCreatorWarning::LabwareInWasteChuteHasLiquid {
            labware_id: labware_id.to_string(),
        });
    }

    warnings
}
