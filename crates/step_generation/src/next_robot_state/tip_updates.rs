use tracing::warn;

use crate::command::TipParams;
use crate::invariant_context::InvariantContext;
use crate::robot_state::RobotState;
use crate::utils::well_geometry::get_tip_footprint;

/// Marks the tips under the active nozzles as used and the pipette as having a tip.
pub fn pick_up_tip(invariant_context: &InvariantContext, robot_state: &mut RobotState, params: &TipParams) {
    let (Some(pipette), Some(tiprack)) = (
        invariant_context
            .pipette_entities
            .get(&params.pipette_id),
        invariant_context
            .labware_entities
            .get(&params.labware_id),
    ) else {
        warn!(
            "Tip pick up with unknown pipette or tip rack. pipette: '{}', labware: '{}'",
            params.pipette_id, params.labware_id
        );
        return;
    };

    let nozzles = robot_state.pipette_nozzles(&params.pipette_id);
    let footprint = get_tip_footprint(&pipette.spec, nozzles, &tiprack.def, &params.well_name);

    let tips = robot_state
        .tip_state
        .tipracks
        .entry(params.labware_id.clone())
        .or_default();
    for well_name in footprint {
        tips.insert(well_name, false);
    }

    robot_state
        .tip_state
        .pipettes
        .insert(params.pipette_id.clone(), true);
}

/// Tips and the liquid in them are gone.
pub fn remove_tip(robot_state: &mut RobotState, pipette_id: &str) {
    robot_state
        .tip_state
        .pipettes
        .insert(pipette_id.to_string(), false);
    robot_state
        .liquid_state
        .pipettes
        .insert(pipette_id.to_string(), Default::default());
}
