pub mod absorbance_reader;
pub mod flow;
pub mod heater_shaker;
pub mod magnet;
pub mod move_labware;
pub mod pipetting;
pub mod temperature;
pub mod thermocycler;
pub mod tips;

use crate::command::{WellLocation, WellOrigin};
use crate::errors::CommandCreatorError;
use crate::invariant_context::{InvariantContext, ModuleEntity};
use crate::python::{format_py_float, format_py_well};
use crate::robot_state::{ModuleState, RobotState};

/// A module must exist in the context and have a state.
pub(crate) fn get_module<'a>(
    invariant_context: &'a InvariantContext,
    robot_state: &'a RobotState,
    module_id: &str,
) -> Result<(&'a ModuleEntity, &'a ModuleState), CommandCreatorError> {
    let module = invariant_context.module(module_id)?;
    let module_state = robot_state
        .module_state(module_id)
        .ok_or_else(|| CommandCreatorError::MissingModule {
            module_id: module_id.to_string(),
        })?;
    Ok((module, module_state))
}

/// `plate["A1"].bottom(z=1)`
pub(crate) fn format_py_location(
    labware_python_name: &str,
    well_name: &str,
    well_location: Option<&WellLocation>,
) -> String {
    let well = format_py_well(labware_python_name, well_name);
    let Some(well_location) = well_location else {
        return well;
    };

    let offset = well_location.offset;
    let located = match well_location.origin {
        WellOrigin::Top => format!("{}.top(z={})", well, format_py_float(offset.z)),
        WellOrigin::Bottom => format!("{}.bottom(z={})", well, format_py_float(offset.z)),
        WellOrigin::Center => format!("{}.center()", well),
    };

    let z = match well_location.origin {
        WellOrigin::Center => offset.z,
        _ => 0.0,
    };
    match offset.x != 0.0 || offset.y != 0.0 || z != 0.0 {
        true => format!(
            "{}.move(types.Point(x={}, y={}, z={}))",
            located,
            format_py_float(offset.x),
            format_py_float(offset.y),
            format_py_float(z)
        ),
        false => located,
    }
}
