//! Creators that move a pipette or move liquid with it.

use crate::command::{
    BlowOutInPlaceParams, BlowoutParams, CommandBody, InPlaceParams, MoveToAddressableAreaForDropTipParams,
    MoveToAddressableAreaParams, MoveToWellParams, PipettingParams, TouchTipParams, WellLocation,
};
use crate::command_creator::{errors_to_result, make_command, CommandCreatorResult, CommandsAndWarnings};
use crate::command_creators::atomic::format_py_location;
use crate::errors::CommandCreatorError;
use crate::invariant_context::InvariantContext;
use crate::python::{format_py_call, format_py_float};
use crate::robot_state::RobotState;
use crate::utils::pipetting_checks::{check_pipetting, PipettingCheck};

/// `rate` in the python api is relative to the pipette's default flow rate.
fn format_py_rate(flow_rate: f64, default_flow_rate: f64) -> String {
    match default_flow_rate > 0.0 {
        true => format_py_float(flow_rate / default_flow_rate),
        false => format_py_float(1.0),
    }
}

/// In-place commands need a tip and somewhere to be.
fn check_in_place(
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
    pipette_id: &str,
) -> Result<(), CommandCreatorError> {
    invariant_context.pipette(pipette_id)?;
    if !robot_state.pipette_has_tip(pipette_id) {
        return Err(CommandCreatorError::NoTipOnPipette {
            pipette_id: pipette_id.to_string(),
        });
    }
    if robot_state
        .pipette_location(pipette_id)
        .is_none()
    {
        return Err(CommandCreatorError::NoPipetteLocation {
            pipette_id: pipette_id.to_string(),
        });
    }
    Ok(())
}

pub fn aspirate(
    args: &PipettingParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    errors_to_result(check_pipetting(invariant_context, robot_state, PipettingCheck {
        pipette_id: &args.pipette_id,
        labware_id: &args.labware_id,
        type_of_step: "aspirate",
        requires_tip: true,
        volume: Some(args.volume),
    }))?;

    let pipette = invariant_context.pipette(&args.pipette_id)?;
    let labware = invariant_context.labware(&args.labware_id)?;

    let python = format_py_call(&format!("{}.aspirate", pipette.python_name), &[
        (Some("volume"), format_py_float(args.volume)),
        (
            Some("location"),
            format_py_location(&labware.python_name, &args.well_name, args.well_location.as_ref()),
        ),
        (
            Some("rate"),
            format_py_rate(args.flow_rate, pipette.spec.default_aspirate_flow_rate),
        ),
    ]);

    Ok(
        CommandsAndWarnings::new(vec![make_command(invariant_context, CommandBody::Aspirate(args.clone()))])
            .with_python(python),
    )
}

pub fn dispense(
    args: &PipettingParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    errors_to_result(check_pipetting(invariant_context, robot_state, PipettingCheck {
        pipette_id: &args.pipette_id,
        labware_id: &args.labware_id,
        type_of_step: "dispense",
        requires_tip: true,
        volume: None,
    }))?;

    let pipette = invariant_context.pipette(&args.pipette_id)?;
    let labware = invariant_context.labware(&args.labware_id)?;

    let python = format_py_call(&format!("{}.dispense", pipette.python_name), &[
        (Some("volume"), format_py_float(args.volume)),
        (
            Some("location"),
            format_py_location(&labware.python_name, &args.well_name, args.well_location.as_ref()),
        ),
        (
            Some("rate"),
            format_py_rate(args.flow_rate, pipette.spec.default_dispense_flow_rate),
        ),
    ]);

    Ok(
        CommandsAndWarnings::new(vec![make_command(invariant_context, CommandBody::Dispense(args.clone()))])
            .with_python(python),
    )
}

/// Aspirates at the current location, used for air gaps.
pub fn aspirate_in_place(
    args: &InPlaceParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    check_in_place(invariant_context, robot_state, &args.pipette_id)?;
    let pipette = invariant_context.pipette(&args.pipette_id)?;

    let python = format_py_call(&format!("{}.aspirate", pipette.python_name), &[
        (Some("volume"), format_py_float(args.volume)),
        (
            Some("rate"),
            format_py_rate(args.flow_rate, pipette.spec.default_aspirate_flow_rate),
        ),
    ]);

    Ok(CommandsAndWarnings::new(vec![make_command(
        invariant_context,
        CommandBody::AspirateInPlace(args.clone()),
    )])
    .with_python(python))
}

pub fn dispense_in_place(
    args: &InPlaceParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    check_in_place(invariant_context, robot_state, &args.pipette_id)?;
    let pipette = invariant_context.pipette(&args.pipette_id)?;

    let python = format_py_call(&format!("{}.dispense", pipette.python_name), &[
        (Some("volume"), format_py_float(args.volume)),
        (
            Some("rate"),
            format_py_rate(args.flow_rate, pipette.spec.default_dispense_flow_rate),
        ),
    ]);

    Ok(CommandsAndWarnings::new(vec![make_command(
        invariant_context,
        CommandBody::DispenseInPlace(args.clone()),
    )])
    .with_python(python))
}

pub fn blowout(args: &BlowoutParams, invariant_context: &InvariantContext, robot_state: &RobotState) -> CommandCreatorResult {
    errors_to_result(check_pipetting(invariant_context, robot_state, PipettingCheck {
        pipette_id: &args.pipette_id,
        labware_id: &args.labware_id,
        type_of_step: "blowout",
        requires_tip: true,
        volume: None,
    }))?;

    let pipette = invariant_context.pipette(&args.pipette_id)?;
    let labware = invariant_context.labware(&args.labware_id)?;

    let python = format_py_call(&format!("{}.blow_out", pipette.python_name), &[(
        Some("location"),
        format_py_location(&labware.python_name, &args.well_name, args.well_location.as_ref()),
    )]);

    Ok(
        CommandsAndWarnings::new(vec![make_command(invariant_context, CommandBody::Blowout(args.clone()))])
            .with_python(python),
    )
}

pub fn blow_out_in_place(
    args: &BlowOutInPlaceParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    check_in_place(invariant_context, robot_state, &args.pipette_id)?;
    let pipette = invariant_context.pipette(&args.pipette_id)?;

    Ok(CommandsAndWarnings::new(vec![make_command(
        invariant_context,
        CommandBody::BlowOutInPlace(args.clone()),
    )])
    .with_python(format!("{}.blow_out()", pipette.python_name)))
}

pub fn touch_tip(args: &TouchTipParams, invariant_context: &InvariantContext, robot_state: &RobotState) -> CommandCreatorResult {
    errors_to_result(check_pipetting(invariant_context, robot_state, PipettingCheck {
        pipette_id: &args.pipette_id,
        labware_id: &args.labware_id,
        type_of_step: "touch tip",
        requires_tip: true,
        volume: None,
    }))?;

    let pipette = invariant_context.pipette(&args.pipette_id)?;
    let labware = invariant_context.labware(&args.labware_id)?;

    let mut python_args = vec![(
        Some("location"),
        format_py_location(&labware.python_name, &args.well_name, None),
    )];
    if let Some(well_location) = args.well_location {
        python_args.push((Some("v_offset"), format_py_float(well_location.offset.z)));
    }
    let python = format_py_call(&format!("{}.touch_tip", pipette.python_name), &python_args);

    Ok(
        CommandsAndWarnings::new(vec![make_command(invariant_context, CommandBody::TouchTip(args.clone()))])
            .with_python(python),
    )
}

pub fn move_to_well(
    args: &MoveToWellParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    errors_to_result(check_pipetting(invariant_context, robot_state, PipettingCheck {
        pipette_id: &args.pipette_id,
        labware_id: &args.labware_id,
        type_of_step: "move to well",
        requires_tip: false,
        volume: None,
    }))?;

    let pipette = invariant_context.pipette(&args.pipette_id)?;
    let labware = invariant_context.labware(&args.labware_id)?;

    let well_location = args
        .well_location
        .unwrap_or_else(|| WellLocation::top(0.0));
    let mut python_args = vec![(
        Some("location"),
        format_py_location(&labware.python_name, &args.well_name, Some(&well_location)),
    )];
    if let Some(force_direct) = args.force_direct {
        python_args.push((
            Some("force_direct"),
            match force_direct {
                true => "True".to_string(),
                false => "False".to_string(),
            },
        ));
    }
    if let Some(minimum_z_height) = args.minimum_z_height {
        python_args.push((Some("minimum_z_height"), format_py_float(minimum_z_height)));
    }
    let python = format_py_call(&format!("{}.move_to", pipette.python_name), &python_args);

    Ok(
        CommandsAndWarnings::new(vec![make_command(invariant_context, CommandBody::MoveToWell(args.clone()))])
            .with_python(python),
    )
}

/// No python, the python api moves to trash bins and waste chutes as part of the operation done there.
pub fn move_to_addressable_area(
    args: &MoveToAddressableAreaParams,
    invariant_context: &InvariantContext,
    _robot_state: &RobotState,
) -> CommandCreatorResult {
    invariant_context.pipette(&args.pipette_id)?;

    Ok(CommandsAndWarnings::new(vec![make_command(
        invariant_context,
        CommandBody::MoveToAddressableArea(args.clone()),
    )]))
}

pub fn move_to_addressable_area_for_drop_tip(
    args: &MoveToAddressableAreaForDropTipParams,
    invariant_context: &InvariantContext,
    _robot_state: &RobotState,
) -> CommandCreatorResult {
    invariant_context.pipette(&args.pipette_id)?;

    Ok(CommandsAndWarnings::new(vec![make_command(
        invariant_context,
        CommandBody::MoveToAddressableAreaForDropTip(args.clone()),
    )]))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::command::Offset;
    use crate::fixtures::*;
    use crate::robot_state::PipetteLocation;

    fn aspirate_args(volume: f64) -> PipettingParams {
        PipettingParams {
            pipette_id: P300_SINGLE.to_string(),
            volume,
            labware_id: PLATE_1.to_string(),
            well_name: "A1".to_string(),
            well_location: Some(WellLocation::bottom(1.0)),
            flow_rate: 92.86,
        }
    }

    #[test]
    fn aspirate_with_tip() {
        // given
        let context = basic_context();
        let robot_state = with_tip(basic_robot_state(&context), P300_SINGLE);

        // when
        let result = aspirate(&aspirate_args(50.0), &context, &robot_state).unwrap();

        // then
        assert_eq!(result.commands.len(), 1);
        assert_eq!(result.commands[0].key, "command-1");
        assert_eq!(result.commands[0].body, CommandBody::Aspirate(aspirate_args(50.0)));
        assert_eq!(
            result.python.as_deref(),
            Some(r#"pipette_left.aspirate(volume=50, location=well_plate_1["A1"].bottom(z=1), rate=1)"#)
        );
    }

    #[rstest]
    #[case::no_tip(false, 50.0, vec!["NO_TIP_ON_PIPETTE"])]
    #[case::too_much(true, 350.0, vec!["PIPETTE_VOLUME_EXCEEDED"])]
    #[case::both(false, 350.0, vec!["NO_TIP_ON_PIPETTE", "PIPETTE_VOLUME_EXCEEDED"])]
    fn aspirate_errors(#[case] has_tip: bool, #[case] volume: f64, #[case] expected: Vec<&str>) {
        // given
        let context = basic_context();
        let mut robot_state = basic_robot_state(&context);
        if has_tip {
            robot_state = with_tip(robot_state, P300_SINGLE);
        }

        // when
        let errors = aspirate(&aspirate_args(volume), &context, &robot_state).unwrap_err();

        // then
        let kinds = errors
            .errors
            .iter()
            .map(|error| error.kind())
            .collect::<Vec<_>>();
        assert_eq!(kinds, expected);
    }

    #[test]
    fn aspirate_from_unknown_labware() {
        // given
        let context = basic_context();
        let robot_state = with_tip(basic_robot_state(&context), P300_SINGLE);
        let args = PipettingParams {
            labware_id: "missing".to_string(),
            ..aspirate_args(10.0)
        };

        // when
        let errors = aspirate(&args, &context, &robot_state).unwrap_err();

        // then
        assert_eq!(errors.errors, vec![CommandCreatorError::LabwareDoesNotExist {
            labware_id: "missing".to_string(),
        }]);
    }

    #[test]
    fn dispense_python() {
        // given
        let context = basic_context();
        let robot_state = with_tip(basic_robot_state(&context), P300_SINGLE);
        let args = PipettingParams {
            well_name: "B2".to_string(),
            well_location: Some(WellLocation::top(-1.0)),
            flow_rate: 46.43,
            ..aspirate_args(20.0)
        };

        // when
        let result = dispense(&args, &context, &robot_state).unwrap();

        // then
        assert_eq!(
            result.python.as_deref(),
            Some(r#"pipette_left.dispense(volume=20, location=well_plate_1["B2"].top(z=-1), rate=0.5)"#)
        );
    }

    #[test]
    fn in_place_commands_need_a_location() {
        // given
        let context = basic_context();
        let robot_state = with_tip(basic_robot_state(&context), P300_SINGLE);
        let args = InPlaceParams {
            pipette_id: P300_SINGLE.to_string(),
            volume: 5.0,
            flow_rate: 46.43,
        };

        // when
        let errors = aspirate_in_place(&args, &context, &robot_state).unwrap_err();

        // then
        assert_eq!(errors.errors, vec![CommandCreatorError::NoPipetteLocation {
            pipette_id: P300_SINGLE.to_string(),
        }]);
    }

    #[test]
    fn blow_out_in_place_at_well() {
        // given
        let context = basic_context();
        let mut robot_state = with_tip(basic_robot_state(&context), P300_SINGLE);
        robot_state
            .pipettes
            .get_mut(P300_SINGLE)
            .unwrap()
            .location = Some(PipetteLocation::Well {
            labware_id: PLATE_1.to_string(),
            well_name: "A1".to_string(),
        });

        // when
        let result = blow_out_in_place(
            &BlowOutInPlaceParams {
                pipette_id: P300_SINGLE.to_string(),
                flow_rate: 10.0,
            },
            &context,
            &robot_state,
        )
        .unwrap();

        // then
        assert_eq!(result.python.as_deref(), Some("pipette_left.blow_out()"));
    }

    #[test]
    fn touch_tip_python() {
        // given
        let context = basic_context();
        let robot_state = with_tip(basic_robot_state(&context), P300_SINGLE);
        let args = TouchTipParams {
            pipette_id: P300_SINGLE.to_string(),
            labware_id: PLATE_1.to_string(),
            well_name: "C3".to_string(),
            well_location: Some(WellLocation::top(-2.0)),
        };

        // when
        let result = touch_tip(&args, &context, &robot_state).unwrap();

        // then
        assert_eq!(
            result.python.as_deref(),
            Some(r#"pipette_left.touch_tip(location=well_plate_1["C3"], v_offset=-2)"#)
        );
    }

    #[test]
    fn move_to_well_defaults_to_top() {
        // given
        let context = basic_context();
        let robot_state = basic_robot_state(&context);
        let args = MoveToWellParams {
            pipette_id: P300_SINGLE.to_string(),
            labware_id: PLATE_1.to_string(),
            well_name: "A1".to_string(),
            well_location: None,
            force_direct: Some(true),
            minimum_z_height: None,
        };

        // when
        let result = move_to_well(&args, &context, &robot_state).unwrap();

        // then
        assert_eq!(
            result.python.as_deref(),
            Some(r#"pipette_left.move_to(location=well_plate_1["A1"].top(z=0), force_direct=True)"#)
        );
    }

    #[test]
    fn move_to_addressable_area_has_no_python() {
        // given
        let context = basic_context();
        let robot_state = basic_robot_state(&context);
        let args = MoveToAddressableAreaParams {
            pipette_id: P300_SINGLE.to_string(),
            addressable_area_name: "movableTrashA3".to_string(),
            offset: Offset::default(),
        };

        // when
        let result = move_to_addressable_area(&args, &context, &robot_state).unwrap();

        // then
        assert_eq!(result.commands.len(), 1);
        assert_eq!(result.python, None);
    }
}
