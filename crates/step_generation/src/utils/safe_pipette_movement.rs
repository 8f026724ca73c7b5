use hardware::deck::west_slot;
use hardware::pipette::NozzleConfiguration;

use crate::invariant_context::InvariantContext;
use crate::robot_state::RobotState;
use crate::robot_state_selectors::{get_labware_deck_slot, get_labware_stack_height, get_pipette_tip_length, get_slot_height};

/// Whether a 96-channel pipette using a single column of nozzles can reach the labware.
///
/// With the primary nozzle at `A12` the unused nozzles hang over the slot to the west, so everything in that slot must
/// be lower than the bottom of the tips when they are at the top of the target labware.
pub fn get_is_safe_pipette_movement(
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
    pipette_id: &str,
    labware_id: &str,
) -> bool {
    let Some(pipette) = invariant_context
        .pipette_entities
        .get(pipette_id)
    else {
        return true;
    };
    if !pipette.spec.is_ninety_six_channel()
        || robot_state.pipette_nozzles(pipette_id) != Some(NozzleConfiguration::Column)
    {
        return true;
    }

    let Some(slot) = get_labware_deck_slot(invariant_context, robot_state, labware_id) else {
        return true;
    };
    let Some(west) = west_slot(invariant_context.robot_type, &slot) else {
        return true;
    };

    let target_height = get_labware_stack_height(invariant_context, robot_state, labware_id);
    let tip_length = match robot_state.pipette_has_tip(pipette_id) {
        true => get_pipette_tip_length(invariant_context, pipette_id),
        false => 0.0,
    };

    get_slot_height(invariant_context, robot_state, &west) < target_height + tip_length
}

#[cfg(test)]
mod tests {
    use hardware::pipette::NozzleConfiguration;

    use super::*;
    use crate::fixtures::{basic_robot_state, fixture_96_channel_context, with_labware_at, P1000_96, PLATE_1, TIPRACK_1};

    #[test]
    fn all_nozzles_are_always_safe() {
        // given
        let context = fixture_96_channel_context();
        let robot_state = basic_robot_state(&context);

        // then
        assert!(get_is_safe_pipette_movement(&context, &robot_state, P1000_96, PLATE_1));
    }

    #[test]
    fn column_next_to_tall_labware_is_unsafe() {
        // given
        let context = fixture_96_channel_context();
        let mut robot_state = with_labware_at(basic_robot_state(&context), PLATE_1, "C3");
        robot_state
            .labware
            .get_mut("adapter")
            .unwrap()
            .slot = "C2".to_string();
        robot_state
            .pipettes
            .get_mut(P1000_96)
            .unwrap()
            .nozzles = Some(NozzleConfiguration::Column);

        // then
        assert!(!get_is_safe_pipette_movement(&context, &robot_state, P1000_96, PLATE_1));
        assert!(get_is_safe_pipette_movement(&context, &robot_state, P1000_96, TIPRACK_1));
    }
}
