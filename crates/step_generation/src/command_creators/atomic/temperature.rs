//! Temperature control shared by temperature modules, heater-shakers and (for deactivation) thermocyclers.

use hardware::module::ModuleType;

use crate::command::{CommandBody, ModuleParams, TemperatureParams, WaitForTemperatureParams};
use crate::command_creator::{make_command, CommandCreatorResult, CommandsAndWarnings};
use crate::command_creators::atomic::get_module;
use crate::command_creators::atomic::heater_shaker::{
    heater_shaker_deactivate_heater, heater_shaker_set_target_temperature, heater_shaker_wait_for_temperature,
};
use crate::invariant_context::InvariantContext;
use crate::python::{format_py_call, format_py_float};
use crate::robot_state::RobotState;

/// # Panics
///
/// When the module is neither a temperature module nor a heater-shaker.
pub fn set_temperature(
    args: &TemperatureParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let (module, module_state) = get_module(invariant_context, robot_state, &args.module_id)?;

    let celsius = format_py_float(args.celsius);
    let (body, python) = match module_state.module_type() {
        ModuleType::TemperatureModule => (
            CommandBody::TemperatureModuleSetTargetTemperature(args.clone()),
            format_py_call(&format!("{}.start_set_temperature", module.python_name), &[(
                Some("celsius"),
                celsius,
            )]),
        ),
        ModuleType::HeaterShaker => return heater_shaker_set_target_temperature(args, invariant_context, robot_state),
        other => panic!(
            "expected a temperature module or heater-shaker. module: '{}', type: '{}'",
            args.module_id, other
        ),
    };

    Ok(CommandsAndWarnings::new(vec![make_command(invariant_context, body)]).with_python(python))
}

/// A thermocycler deactivates both block and lid.
///
/// # Panics
///
/// When the module has no heating.
pub fn deactivate_temperature(
    args: &ModuleParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let (module, module_state) = get_module(invariant_context, robot_state, &args.module_id)?;
    let name = &module.python_name;

    let (bodies, python) = match module_state.module_type() {
        ModuleType::TemperatureModule => (
            vec![CommandBody::TemperatureModuleDeactivate(args.clone())],
            format!("{}.deactivate()", name),
        ),
        ModuleType::Thermocycler => (
            vec![
                CommandBody::ThermocyclerDeactivateBlock(args.clone()),
                CommandBody::ThermocyclerDeactivateLid(args.clone()),
            ],
            format!("{}.deactivate_block()\n{}.deactivate_lid()", name, name),
        ),
        ModuleType::HeaterShaker => return heater_shaker_deactivate_heater(args, invariant_context, robot_state),
        other => panic!(
            "expected a module with temperature control. module: '{}', type: '{}'",
            args.module_id, other
        ),
    };

    let commands = bodies
        .into_iter()
        .map(|body| make_command(invariant_context, body))
        .collect();
    Ok(CommandsAndWarnings::new(commands).with_python(python))
}

/// # Panics
///
/// When the module is neither a temperature module nor a heater-shaker.
pub fn wait_for_temperature(
    args: &WaitForTemperatureParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let (module, module_state) = get_module(invariant_context, robot_state, &args.module_id)?;

    let (body, python) = match module_state.module_type() {
        ModuleType::TemperatureModule => (
            CommandBody::TemperatureModuleWaitForTemperature(args.clone()),
            args.celsius.map(|celsius| {
                format_py_call(&format!("{}.await_temperature", module.python_name), &[(
                    Some("celsius"),
                    format_py_float(celsius),
                )])
            }),
        ),
        ModuleType::HeaterShaker => {
            let args = ModuleParams {
                module_id: args.module_id.clone(),
            };
            return heater_shaker_wait_for_temperature(&args, invariant_context, robot_state);
        }
        other => panic!(
            "expected a temperature module or heater-shaker. module: '{}', type: '{}'",
            args.module_id, other
        ),
    };

    let result = CommandsAndWarnings::new(vec![make_command(invariant_context, body)]);
    Ok(match python {
        Some(python) => result.with_python(python),
        None => result,
    })
}
