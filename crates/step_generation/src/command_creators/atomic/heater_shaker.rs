//! Heater-shaker commands. [`super::temperature`] dispatches on module type to the heating creators here.

use crate::command::{CommandBody, ModuleParams, ShakeSpeedParams, TemperatureParams};
use crate::command_creator::{make_command, CommandCreatorResult, CommandsAndWarnings};
use crate::command_creators::atomic::get_module;
use crate::errors::CommandCreatorError;
use crate::invariant_context::InvariantContext;
use crate::python::{format_py_call, format_py_float};
use crate::robot_state::{ModuleState, RobotState};

pub fn heater_shaker_set_target_temperature(
    args: &TemperatureParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let (module, _module_state) = get_module(invariant_context, robot_state, &args.module_id)?;

    let python = format_py_call(&format!("{}.set_target_temperature", module.python_name), &[(
        Some("celsius"),
        format_py_float(args.celsius),
    )]);

    Ok(CommandsAndWarnings::new(vec![make_command(
        invariant_context,
        CommandBody::HeaterShakerSetTargetTemperature(args.clone()),
    )])
    .with_python(python))
}

pub fn heater_shaker_wait_for_temperature(
    args: &ModuleParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let (module, _module_state) = get_module(invariant_context, robot_state, &args.module_id)?;

    Ok(CommandsAndWarnings::new(vec![make_command(
        invariant_context,
        CommandBody::HeaterShakerWaitForTemperature(args.clone()),
    )])
    .with_python(format!("{}.wait_for_temperature()", module.python_name)))
}

pub fn heater_shaker_deactivate_heater(
    args: &ModuleParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let (module, _module_state) = get_module(invariant_context, robot_state, &args.module_id)?;

    Ok(CommandsAndWarnings::new(vec![make_command(
        invariant_context,
        CommandBody::HeaterShakerDeactivateHeater(args.clone()),
    )])
    .with_python(format!("{}.deactivate_heater()", module.python_name)))
}

pub fn heater_shaker_open_latch(
    args: &ModuleParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let (module, module_state) = get_module(invariant_context, robot_state, &args.module_id)?;

    if let ModuleState::HeaterShaker {
        target_speed: Some(_),
        ..
    } = module_state
    {
        return Err(CommandCreatorError::HeaterShakerIsShaking.into());
    }

    Ok(CommandsAndWarnings::new(vec![make_command(
        invariant_context,
        CommandBody::HeaterShakerOpenLabwareLatch(args.clone()),
    )])
    .with_python(format!("{}.open_labware_latch()", module.python_name)))
}

pub fn heater_shaker_close_latch(
    args: &ModuleParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let (module, _module_state) = get_module(invariant_context, robot_state, &args.module_id)?;

    Ok(CommandsAndWarnings::new(vec![make_command(
        invariant_context,
        CommandBody::HeaterShakerCloseLabwareLatch(args.clone()),
    )])
    .with_python(format!("{}.close_labware_latch()", module.python_name)))
}

/// Shaking requires a closed latch.
pub fn heater_shaker_set_and_wait_for_shake_speed(
    args: &ShakeSpeedParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let (module, module_state) = get_module(invariant_context, robot_state, &args.module_id)?;

    if let ModuleState::HeaterShaker {
        latch_open: true,
        ..
    } = module_state
    {
        return Err(CommandCreatorError::HeaterShakerLatchOpen.into());
    }

    let python = format_py_call(&format!("{}.set_and_wait_for_shake_speed", module.python_name), &[(
        Some("rpm"),
        format_py_float(args.rpm),
    )]);

    Ok(CommandsAndWarnings::new(vec![make_command(
        invariant_context,
        CommandBody::HeaterShakerSetAndWaitForShakeSpeed(args.clone()),
    )])
    .with_python(python))
}

pub fn heater_shaker_stop_shake(
    args: &ModuleParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let (module, _module_state) = get_module(invariant_context, robot_state, &args.module_id)?;

    Ok(CommandsAndWarnings::new(vec![make_command(
        invariant_context,
        CommandBody::HeaterShakerDeactivateShaker(args.clone()),
    )])
    .with_python(format!("{}.deactivate_shaker()", module.python_name)))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::fixtures::*;

    fn module() -> ModuleParams {
        ModuleParams {
            module_id: HEATER_SHAKER.to_string(),
        }
    }

    fn heater_shaker(target_speed: Option<f64>, latch_open: bool) -> ModuleState {
        ModuleState::HeaterShaker {
            target_temp: None,
            target_speed,
            latch_open,
        }
    }

    #[rstest]
    #[case(None, true)]
    #[case(Some(500.0), false)]
    fn open_latch(#[case] target_speed: Option<f64>, #[case] allowed: bool) {
        // given
        let context = basic_context();
        let robot_state = with_module_state(
            basic_robot_state(&context),
            HEATER_SHAKER,
            heater_shaker(target_speed, false),
        );

        // when
        let result = heater_shaker_open_latch(&module(), &context, &robot_state);

        // then
        match allowed {
            true => assert_eq!(
                result.unwrap().python.as_deref(),
                Some("heater_shaker_1.open_labware_latch()")
            ),
            false => assert_eq!(result.unwrap_err().errors, vec![
                CommandCreatorError::HeaterShakerIsShaking
            ]),
        }
    }

    #[test]
    fn shake_with_open_latch() {
        // given
        let context = basic_context();
        let robot_state = with_module_state(basic_robot_state(&context), HEATER_SHAKER, heater_shaker(None, true));
        let args = ShakeSpeedParams {
            module_id: HEATER_SHAKER.to_string(),
            rpm: 500.0,
        };

        // when
        let errors = heater_shaker_set_and_wait_for_shake_speed(&args, &context, &robot_state).unwrap_err();

        // then
        assert_eq!(errors.errors, vec![CommandCreatorError::HeaterShakerLatchOpen]);
    }

    #[test]
    fn shake() {
        // given
        let context = basic_context();
        let robot_state = basic_robot_state(&context);
        let args = ShakeSpeedParams {
            module_id: HEATER_SHAKER.to_string(),
            rpm: 500.0,
        };

        // when
        let result = heater_shaker_set_and_wait_for_shake_speed(&args, &context, &robot_state).unwrap();

        // then
        assert_eq!(
            serde_json::to_value(&result.commands).unwrap(),
            serde_json::json!([{
                "key": "command-1",
                "commandType": "heaterShaker/setAndWaitForShakeSpeed",
                "params": {"moduleId": HEATER_SHAKER, "rpm": 500.0},
            }])
        );
        assert_eq!(
            result.python.as_deref(),
            Some("heater_shaker_1.set_and_wait_for_shake_speed(rpm=500)")
        );
    }

    #[test]
    fn stop_shake_and_close_latch() {
        // given
        let context = basic_context();
        let robot_state = basic_robot_state(&context);

        // when
        let stop = heater_shaker_stop_shake(&module(), &context, &robot_state).unwrap();
        let close = heater_shaker_close_latch(&module(), &context, &robot_state).unwrap();

        // then
        assert_eq!(stop.python.as_deref(), Some("heater_shaker_1.deactivate_shaker()"));
        assert_eq!(close.python.as_deref(), Some("heater_shaker_1.close_labware_latch()"));
    }
}
