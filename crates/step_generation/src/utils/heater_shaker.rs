//! Heater-shaker adjacency rules, these only apply to the OT-2 deck where the slots around a heater-shaker are
//! within reach of its moving parts.

use hardware::deck::{east_west_slots, north_south_slots, RobotType, MAX_LABWARE_HEIGHT_EAST_WEST_HEATER_SHAKER_MM};
use hardware::pipette::PipetteSpec;

use crate::invariant_context::InvariantContext;
use crate::robot_state::{ModuleState, RobotState};
use crate::robot_state_selectors::{get_labware_deck_slot, get_labware_stack_height};

/// Heater-shaker states in the given slots.
fn heater_shakers_in<'a>(robot_state: &'a RobotState, slots: &'a [String]) -> impl Iterator<Item = &'a ModuleState> + 'a {
    robot_state
        .modules
        .values()
        .filter(|module| slots.contains(&module.slot))
        .map(|module| &module.module_state)
        .filter(|state| matches!(state, ModuleState::HeaterShaker { .. }))
}

fn is_shaking(module_state: &ModuleState) -> bool {
    matches!(
        module_state,
        ModuleState::HeaterShaker {
            target_speed: Some(_),
            ..
        }
    )
}

fn is_latch_open(module_state: &ModuleState) -> bool {
    matches!(
        module_state,
        ModuleState::HeaterShaker {
            latch_open: true,
            ..
        }
    )
}

fn adjacent_slots(robot_type: RobotType, slot: &str) -> Vec<String> {
    east_west_slots(robot_type, slot)
        .into_iter()
        .chain(north_south_slots(robot_type, slot))
        .collect()
}

pub fn get_is_heater_shaker_north_south_east_west_shaking(robot_type: RobotType, robot_state: &RobotState, slot: &str) -> bool {
    let slots = adjacent_slots(robot_type, slot);
    let shaking = heater_shakers_in(robot_state, &slots).any(is_shaking);
    shaking
}

pub fn get_is_heater_shaker_east_west_with_latch_open(robot_type: RobotType, robot_state: &RobotState, slot: &str) -> bool {
    let slots = east_west_slots(robot_type, slot);
    let latch_open = heater_shakers_in(robot_state, &slots).any(is_latch_open);
    latch_open
}

/// Multi-channel pipettes cannot reach past a heater-shaker to the east or west.
pub fn get_is_heater_shaker_east_west_multi_channel(
    robot_type: RobotType,
    robot_state: &RobotState,
    slot: &str,
    spec: &PipetteSpec,
) -> bool {
    if !spec.is_multi_channel() {
        return false;
    }
    let slots = east_west_slots(robot_type, slot);
    let found = heater_shakers_in(robot_state, &slots).count() > 0;
    found
}

/// Labware next to a heater-shaker (east or west) taller than the pipette can clear.
pub fn get_is_tall_labware_east_west_of_heater_shaker(
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
    heater_shaker_slot: &str,
) -> bool {
    let slots = east_west_slots(invariant_context.robot_type, heater_shaker_slot);
    robot_state
        .labware
        .keys()
        .filter(|labware_id| {
            get_labware_deck_slot(invariant_context, robot_state, labware_id)
                .map(|slot| slots.contains(&slot))
                .unwrap_or(false)
        })
        .any(|labware_id| {
            get_labware_stack_height(invariant_context, robot_state, labware_id)
                > MAX_LABWARE_HEIGHT_EAST_WEST_HEATER_SHAKER_MM
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{basic_robot_state, fixture_ot2_context, with_module_state, HEATER_SHAKER};

    fn shaking() -> ModuleState {
        ModuleState::HeaterShaker {
            target_temp: None,
            target_speed: Some(500.0),
            latch_open: false,
        }
    }

    #[test]
    fn shaking_blocks_all_neighbours() {
        // given
        let context = fixture_ot2_context();
        let robot_state = with_module_state(basic_robot_state(&context), HEATER_SHAKER, shaking());

        // then
        assert!(get_is_heater_shaker_north_south_east_west_shaking(RobotType::Ot2, &robot_state, "2"));
        assert!(get_is_heater_shaker_north_south_east_west_shaking(RobotType::Ot2, &robot_state, "4"));
        assert!(!get_is_heater_shaker_north_south_east_west_shaking(RobotType::Ot2, &robot_state, "5"));
    }

    #[test]
    fn latch_open_blocks_east_west() {
        // given
        let context = fixture_ot2_context();
        let robot_state = with_module_state(basic_robot_state(&context), HEATER_SHAKER, ModuleState::HeaterShaker {
            target_temp: None,
            target_speed: None,
            latch_open: true,
        });

        // then
        assert!(get_is_heater_shaker_east_west_with_latch_open(RobotType::Ot2, &robot_state, "2"));
        assert!(!get_is_heater_shaker_east_west_with_latch_open(RobotType::Ot2, &robot_state, "4"));
    }

    #[test]
    fn tiprack_east_of_heater_shaker_is_tall() {
        // given
        let context = fixture_ot2_context();
        let robot_state = basic_robot_state(&context);

        // then
        assert!(get_is_tall_labware_east_west_of_heater_shaker(&context, &robot_state, "1"));
        assert!(!get_is_tall_labware_east_west_of_heater_shaker(&context, &robot_state, "4"));
    }
}
