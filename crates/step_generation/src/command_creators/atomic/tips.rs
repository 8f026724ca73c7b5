use crate::command::{CommandBody, ConfigureForVolumeParams, ConfigureNozzleLayoutParams, PipetteParams, TipParams};
use crate::command_creator::{errors_to_result, make_command, CommandCreatorResult, CommandsAndWarnings};
use crate::command_creators::atomic::format_py_location;
use crate::errors::CommandCreatorError;
use crate::invariant_context::InvariantContext;
use crate::python::{format_py_call, format_py_str, PROTOCOL_API_NAME};
use crate::robot_state::RobotState;
use crate::utils::pipetting_checks::{check_pipetting, PipettingCheck};

/// The python api picks the next tip from the rack, which is the tip selected here.
pub fn pick_up_tip(args: &TipParams, invariant_context: &InvariantContext, robot_state: &RobotState) -> CommandCreatorResult {
    errors_to_result(check_pipetting(invariant_context, robot_state, PipettingCheck {
        pipette_id: &args.pipette_id,
        labware_id: &args.labware_id,
        type_of_step: "pick up tip",
        requires_tip: false,
        volume: None,
    }))?;

    let pipette = invariant_context.pipette(&args.pipette_id)?;
    let tiprack = invariant_context.labware(&args.labware_id)?;

    let has_tip = robot_state
        .tip_state
        .tipracks
        .get(&args.labware_id)
        .and_then(|tips| tips.get(&args.well_name))
        .copied()
        .unwrap_or(false);
    if !has_tip {
        return Err(CommandCreatorError::NoTipAvailable {
            labware_id: args.labware_id.clone(),
            well_name: args.well_name.clone(),
        }
        .into());
    }

    let python = format_py_call(&format!("{}.pick_up_tip", pipette.python_name), &[(
        Some("location"),
        tiprack.python_name.clone(),
    )]);

    Ok(
        CommandsAndWarnings::new(vec![make_command(invariant_context, CommandBody::PickUpTip(args.clone()))])
            .with_python(python),
    )
}

/// Drops the tip into a labware well, nothing is emitted when the pipette has no tip.
pub fn drop_tip(args: &TipParams, invariant_context: &InvariantContext, robot_state: &RobotState) -> CommandCreatorResult {
    let pipette = invariant_context.pipette(&args.pipette_id)?;
    let labware = invariant_context.labware(&args.labware_id)?;

    if !robot_state.pipette_has_tip(&args.pipette_id) {
        return Ok(CommandsAndWarnings::default());
    }

    let python = format_py_call(&format!("{}.drop_tip", pipette.python_name), &[(
        None,
        format_py_location(&labware.python_name, &args.well_name, None),
    )]);

    Ok(
        CommandsAndWarnings::new(vec![make_command(invariant_context, CommandBody::DropTip(args.clone()))])
            .with_python(python),
    )
}

pub fn drop_tip_in_place(
    args: &PipetteParams,
    invariant_context: &InvariantContext,
    _robot_state: &RobotState,
) -> CommandCreatorResult {
    let pipette = invariant_context.pipette(&args.pipette_id)?;

    Ok(CommandsAndWarnings::new(vec![make_command(
        invariant_context,
        CommandBody::DropTipInPlace(args.clone()),
    )])
    .with_python(format!("{}.drop_tip()", pipette.python_name)))
}

/// No python, the python api configures the volume mode when aspirating.
pub fn configure_for_volume(
    args: &ConfigureForVolumeParams,
    invariant_context: &InvariantContext,
    _robot_state: &RobotState,
) -> CommandCreatorResult {
    invariant_context.pipette(&args.pipette_id)?;

    Ok(CommandsAndWarnings::new(vec![make_command(
        invariant_context,
        CommandBody::ConfigureForVolume(args.clone()),
    )]))
}

pub fn configure_nozzle_layout(
    args: &ConfigureNozzleLayoutParams,
    invariant_context: &InvariantContext,
    _robot_state: &RobotState,
) -> CommandCreatorResult {
    let pipette = invariant_context.pipette(&args.pipette_id)?;

    let configuration = &args.configuration_params;
    let mut python_args = vec![(
        Some("style"),
        format!("{}.{}", PROTOCOL_API_NAME, configuration.style.python_style()),
    )];
    if let Some(primary_nozzle) = &configuration.primary_nozzle {
        python_args.push((Some("start"), format_py_str(primary_nozzle)));
    }
    let python = format_py_call(&format!("{}.configure_nozzle_layout", pipette.python_name), &python_args);

    Ok(CommandsAndWarnings::new(vec![make_command(
        invariant_context,
        CommandBody::ConfigureNozzleLayout(args.clone()),
    )])
    .with_python(python))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rstest::rstest;

    use hardware::deck::RobotType;
    use hardware::pipette::{NozzleConfiguration, PipetteMount};
    use hardware::test::{fixture_p1000_96, fixture_tiprack_1000_ul};

    use super::*;
    use crate::command::NozzleConfigurationParams;
    use crate::command_key::SequentialKeyGenerator;
    use crate::fixtures::*;
    use crate::invariant_context::InvariantContextBuilder;
    use crate::robot_state::{make_initial_robot_state, InitialLocations};

    fn tip_args(pipette_id: &str, labware_id: &str) -> TipParams {
        TipParams {
            pipette_id: pipette_id.to_string(),
            labware_id: labware_id.to_string(),
            well_name: "B1".to_string(),
        }
    }

    #[test]
    fn pick_up_tip_with_python_names() {
        // given
        let mut context = InvariantContextBuilder::new(RobotType::Flex)
            .with_key_generator(Arc::new(SequentialKeyGenerator::default()))
            .with_pipette("P", "p1000_96", fixture_p1000_96(), PipetteMount::Left, vec![])
            .with_labware("TR", fixture_tiprack_1000_ul())
            .build()
            .unwrap();
        context
            .pipette_entities
            .get_mut("P")
            .unwrap()
            .python_name = "mockPythonName".to_string();
        context
            .labware_entities
            .get_mut("TR")
            .unwrap()
            .python_name = "mockPythonName".to_string();
        let robot_state = make_initial_robot_state(&context, &InitialLocations {
            pipettes: [("P".to_string(), PipetteMount::Left)].into(),
            labware: [("TR".to_string(), "C2".to_string())].into(),
            modules: Default::default(),
            liquids: vec![],
        });

        // when
        let result = pick_up_tip(&tip_args("P", "TR"), &context, &robot_state).unwrap();

        // then
        let json = serde_json::to_value(&result.commands).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "key": "command-1",
                "commandType": "pickUpTip",
                "params": {"pipetteId": "P", "labwareId": "TR", "wellName": "B1"},
            }])
        );
        assert_eq!(
            result.python.as_deref(),
            Some("mockPythonName.pick_up_tip(location=mockPythonName)")
        );
    }

    #[test]
    fn pick_up_tip_from_column_4() {
        // given
        let context = basic_context();
        let robot_state = with_labware_at(basic_robot_state(&context), TIPRACK_1, "A4");

        // when
        let errors = pick_up_tip(&tip_args(P300_SINGLE, TIPRACK_1), &context, &robot_state).unwrap_err();

        // then
        assert_eq!(errors.errors, vec![CommandCreatorError::PipettingIntoColumn4 {
            type_of_step: "pick up tip".to_string(),
        }]);
    }

    #[rstest]
    #[case::used_tip(TIPRACK_1, "B1")]
    #[case::unknown_well(TIPRACK_1, "Z99")]
    #[case::not_a_tiprack(PLATE_1, "B1")]
    fn pick_up_tip_without_tip_in_well(#[case] labware_id: &str, #[case] well_name: &str) {
        // given
        let context = basic_context();
        let mut robot_state = basic_robot_state(&context);
        if let Some(tips) = robot_state
            .tip_state
            .tipracks
            .get_mut(TIPRACK_1)
        {
            tips.insert("B1".to_string(), false);
        }
        let args = TipParams {
            pipette_id: P300_SINGLE.to_string(),
            labware_id: labware_id.to_string(),
            well_name: well_name.to_string(),
        };

        // when
        let errors = pick_up_tip(&args, &context, &robot_state).unwrap_err();

        // then
        assert_eq!(errors.errors, vec![CommandCreatorError::NoTipAvailable {
            labware_id: labware_id.to_string(),
            well_name: well_name.to_string(),
        }]);
    }

    #[test]
    fn drop_tip_without_tip_is_a_no_op() {
        // given
        let context = basic_context();
        let robot_state = basic_robot_state(&context);

        // when
        let result = drop_tip(&tip_args(P300_SINGLE, TIPRACK_1), &context, &robot_state).unwrap();

        // then
        assert_eq!(result, CommandsAndWarnings::default());
    }

    #[test]
    fn drop_tip_into_labware() {
        // given
        let context = basic_context();
        let robot_state = with_tip(basic_robot_state(&context), P300_SINGLE);

        // when
        let result = drop_tip(&tip_args(P300_SINGLE, TIPRACK_1), &context, &robot_state).unwrap();

        // then
        assert_eq!(result.commands.len(), 1);
        assert_eq!(result.python.as_deref(), Some(r#"pipette_left.drop_tip(tip_rack_1["B1"])"#));
    }

    #[test]
    fn configure_nozzle_layout_python() {
        // given
        let context = fixture_96_channel_context();
        let robot_state = basic_robot_state(&context);
        let args = ConfigureNozzleLayoutParams {
            pipette_id: P1000_96.to_string(),
            configuration_params: NozzleConfigurationParams {
                style: NozzleConfiguration::Column,
                primary_nozzle: Some("A12".to_string()),
            },
        };

        // when
        let result = configure_nozzle_layout(&args, &context, &robot_state).unwrap();

        // then
        assert_eq!(
            result.python.as_deref(),
            Some(r#"pipette_left.configure_nozzle_layout(style=protocol_api.COLUMN, start="A12")"#)
        );
    }

    #[test]
    fn configure_for_volume_has_no_python() {
        // given
        let context = basic_context();
        let robot_state = basic_robot_state(&context);

        // when
        let result = configure_for_volume(
            &ConfigureForVolumeParams {
                pipette_id: P300_SINGLE.to_string(),
                volume: 10.0,
            },
            &context,
            &robot_state,
        )
        .unwrap();

        // then
        assert_eq!(result.commands.len(), 1);
        assert_eq!(result.python, None);
    }

    #[test]
    fn unknown_pipette() {
        // given
        let context = basic_context();
        let robot_state = basic_robot_state(&context);

        // when
        let errors = drop_tip_in_place(
            &PipetteParams {
                pipette_id: "missing".to_string(),
            },
            &context,
            &robot_state,
        )
        .unwrap_err();

        // then
        assert_eq!(errors.errors, vec![CommandCreatorError::PipetteDoesNotExist {
            pipette_id: "missing".to_string(),
        }]);
    }
}
