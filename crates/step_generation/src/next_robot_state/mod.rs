//! Simulation of the effect of commands on the robot state.

mod liquid_updates;
mod module_updates;
mod tip_updates;

use hardware::deck::{GRIPPER_WASTE_CHUTE_ADDRESSABLE_AREA, OFF_DECK};

use crate::command::{Command, CommandBody, LabwareLocation};
use crate::errors::CommandCreatorWarning;
use crate::invariant_context::{AdditionalEquipmentName, InvariantContext};
use crate::robot_state::{PipetteLocation, RobotState};

#[derive(Debug, Clone, PartialEq)]
pub struct RobotStateAndWarnings {
    pub robot_state: RobotState,
    pub warnings: Vec<CommandCreatorWarning>,
}

/// Applies the commands in order to a copy of `prev_robot_state`.
pub fn get_next_robot_state_and_warnings(
    commands: &[Command],
    invariant_context: &InvariantContext,
    prev_robot_state: &RobotState,
) -> RobotStateAndWarnings {
    let mut next = RobotStateAndWarnings {
        robot_state: prev_robot_state.clone(),
        warnings: vec![],
    };
    for command in commands {
        apply_command(&command.body, invariant_context, &mut next);
    }
    next
}

fn apply_command(body: &CommandBody, invariant_context: &InvariantContext, next: &mut RobotStateAndWarnings) {
    let robot_state = &mut next.robot_state;
    match body {
        CommandBody::Aspirate(params) => {
            let warnings = liquid_updates::aspirate(
                invariant_context,
                robot_state,
                &params.pipette_id,
                &params.labware_id,
                &params.well_name,
                params.volume,
            );
            next.warnings.extend(warnings);
            set_well_location(robot_state, &params.pipette_id, &params.labware_id, &params.well_name);
        }
        CommandBody::Dispense(params) => {
            liquid_updates::dispense_into_well(
                invariant_context,
                robot_state,
                &params.pipette_id,
                &params.labware_id,
                &params.well_name,
                Some(params.volume),
            );
            set_well_location(robot_state, &params.pipette_id, &params.labware_id, &params.well_name);
        }
        CommandBody::AspirateInPlace(params) => {
            liquid_updates::aspirate_air(invariant_context, robot_state, &params.pipette_id, params.volume);
        }
        CommandBody::DispenseInPlace(params) => {
            liquid_updates::dispense_in_place(invariant_context, robot_state, &params.pipette_id, Some(params.volume));
        }
        CommandBody::Blowout(params) => {
            liquid_updates::dispense_into_well(
                invariant_context,
                robot_state,
                &params.pipette_id,
                &params.labware_id,
                &params.well_name,
                None,
            );
            set_well_location(robot_state, &params.pipette_id, &params.labware_id, &params.well_name);
        }
        CommandBody::BlowOutInPlace(params) => {
            liquid_updates::dispense_in_place(invariant_context, robot_state, &params.pipette_id, None);
        }
        CommandBody::TouchTip(params) => {
            set_well_location(robot_state, &params.pipette_id, &params.labware_id, &params.well_name);
        }
        CommandBody::MoveToWell(params) => {
            set_well_location(robot_state, &params.pipette_id, &params.labware_id, &params.well_name);
        }
        CommandBody::MoveToAddressableArea(params) => {
            set_location(robot_state, &params.pipette_id, PipetteLocation::AddressableArea {
                addressable_area_name: params.addressable_area_name.clone(),
            });
        }
        CommandBody::MoveToAddressableAreaForDropTip(params) => {
            set_location(robot_state, &params.pipette_id, PipetteLocation::AddressableArea {
                addressable_area_name: params.addressable_area_name.clone(),
            });
        }
        CommandBody::PickUpTip(params) => {
            tip_updates::pick_up_tip(invariant_context, robot_state, params);
            set_well_location(robot_state, &params.pipette_id, &params.labware_id, &params.well_name);
        }
        CommandBody::DropTip(params) => {
            tip_updates::remove_tip(robot_state, &params.pipette_id);
            set_well_location(robot_state, &params.pipette_id, &params.labware_id, &params.well_name);
        }
        CommandBody::DropTipInPlace(params) => {
            tip_updates::remove_tip(robot_state, &params.pipette_id);
        }
        CommandBody::ConfigureNozzleLayout(params) => {
            if let Some(pipette) = robot_state
                .pipettes
                .get_mut(&params.pipette_id)
            {
                pipette.nozzles = Some(params.configuration_params.style);
            }
        }
        CommandBody::MoveLabware(params) => {
            let slot = match &params.new_location {
                LabwareLocation::SlotName(slot) => slot.clone(),
                LabwareLocation::ModuleId(module_id) => module_id.clone(),
                LabwareLocation::LabwareId(labware_id) => labware_id.clone(),
                LabwareLocation::AddressableAreaName(area) => addressable_area_to_location(invariant_context, area),
                LabwareLocation::OffDeck => OFF_DECK.to_string(),
            };
            if let Some(labware) = robot_state
                .labware
                .get_mut(&params.labware_id)
            {
                labware.slot = slot;
            }
        }
        CommandBody::ConfigureForVolume(_)
        | CommandBody::Comment(_)
        | CommandBody::WaitForDuration(_)
        | CommandBody::WaitForResume(_) => {}
        module_command => module_updates::apply_module_command(robot_state, module_command),
    }
}

fn set_location(robot_state: &mut RobotState, pipette_id: &str, location: PipetteLocation) {
    if let Some(pipette) = robot_state.pipettes.get_mut(pipette_id) {
        pipette.location = Some(location);
    }
}

fn set_well_location(robot_state: &mut RobotState, pipette_id: &str, labware_id: &str, well_name: &str) {
    set_location(robot_state, pipette_id, PipetteLocation::Well {
        labware_id: labware_id.to_string(),
        well_name: well_name.to_string(),
    });
}

/// Labware moved into the gripper waste chute area is tracked as being in the waste chute.
fn addressable_area_to_location(invariant_context: &InvariantContext, area: &str) -> String {
    if area == GRIPPER_WASTE_CHUTE_ADDRESSABLE_AREA {
        let waste_chute = invariant_context
            .additional_equipment_entities
            .values()
            .find(|entity| entity.name == AdditionalEquipmentName::WasteChute);
        if let Some(waste_chute) = waste_chute {
            return waste_chute.id.clone();
        }
    }
    area.to_string()
}
