use indexmap::IndexMap;

use crate::command::{BlockTemperatureParams, CommandBody, ModuleParams, RunProfileParams, TemperatureParams};
use crate::command_creator::{make_command, CommandCreatorResult, CommandsAndWarnings};
use crate::command_creators::atomic::get_module;
use crate::invariant_context::InvariantContext;
use crate::python::{format_py_call, format_py_float, format_py_list, PyValue};
use crate::robot_state::RobotState;
use crate::utils::thermocycler_profile::find_thermocycler_profile_repetitions;

/// One command for the module, with python when the python api has an equivalent.
fn module_command(
    module_id: &str,
    body: CommandBody,
    python: impl FnOnce(&str) -> Option<String>,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let (module, _module_state) = get_module(invariant_context, robot_state, module_id)?;

    let result = CommandsAndWarnings::new(vec![make_command(invariant_context, body)]);
    Ok(match python(&module.python_name) {
        Some(python) => result.with_python(python),
        None => result,
    })
}

pub fn thermocycler_set_target_block_temperature(
    args: &BlockTemperatureParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    module_command(
        &args.module_id,
        CommandBody::ThermocyclerSetTargetBlockTemperature(args.clone()),
        |name| {
            let mut python_args = vec![(Some("temperature"), format_py_float(args.celsius))];
            if let Some(block_max_volume) = args.block_max_volume {
                python_args.push((Some("block_max_volume"), format_py_float(block_max_volume)));
            }
            Some(format_py_call(&format!("{}.set_block_temperature", name), &python_args))
        },
        invariant_context,
        robot_state,
    )
}

pub fn thermocycler_set_target_lid_temperature(
    args: &TemperatureParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    module_command(
        &args.module_id,
        CommandBody::ThermocyclerSetTargetLidTemperature(args.clone()),
        |name| {
            Some(format_py_call(&format!("{}.set_lid_temperature", name), &[(
                Some("temperature"),
                format_py_float(args.celsius),
            )]))
        },
        invariant_context,
        robot_state,
    )
}

/// No python, `set_block_temperature` waits.
pub fn thermocycler_wait_for_block_temperature(
    args: &ModuleParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    module_command(
        &args.module_id,
        CommandBody::ThermocyclerWaitForBlockTemperature(args.clone()),
        |_name| None,
        invariant_context,
        robot_state,
    )
}

/// No python, `set_lid_temperature` waits.
pub fn thermocycler_wait_for_lid_temperature(
    args: &ModuleParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    module_command(
        &args.module_id,
        CommandBody::ThermocyclerWaitForLidTemperature(args.clone()),
        |_name| None,
        invariant_context,
        robot_state,
    )
}

pub fn thermocycler_deactivate_block(
    args: &ModuleParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    module_command(
        &args.module_id,
        CommandBody::ThermocyclerDeactivateBlock(args.clone()),
        |name| Some(format!("{}.deactivate_block()", name)),
        invariant_context,
        robot_state,
    )
}

pub fn thermocycler_deactivate_lid(
    args: &ModuleParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    module_command(
        &args.module_id,
        CommandBody::ThermocyclerDeactivateLid(args.clone()),
        |name| Some(format!("{}.deactivate_lid()", name)),
        invariant_context,
        robot_state,
    )
}

pub fn thermocycler_open_lid(
    args: &ModuleParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    module_command(
        &args.module_id,
        CommandBody::ThermocyclerOpenLid(args.clone()),
        |name| Some(format!("{}.open_lid()", name)),
        invariant_context,
        robot_state,
    )
}

pub fn thermocycler_close_lid(
    args: &ModuleParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    module_command(
        &args.module_id,
        CommandBody::ThermocyclerCloseLid(args.clone()),
        |name| Some(format!("{}.close_lid()", name)),
        invariant_context,
        robot_state,
    )
}

/// The python profile is the shortest repeating cycle with a repetition count.
pub fn thermocycler_run_profile(
    args: &RunProfileParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    module_command(
        &args.module_id,
        CommandBody::ThermocyclerRunProfile(args.clone()),
        |name| {
            let repetitions = find_thermocycler_profile_repetitions(&args.profile);
            let steps = repetitions
                .repeating_profile_steps
                .iter()
                .map(|step| {
                    let mut entries: IndexMap<String, PyValue> = IndexMap::new();
                    entries.insert("temperature".to_string(), step.celsius.into());
                    entries.insert("hold_time_seconds".to_string(), step.hold_seconds.into());
                    PyValue::Dict(entries)
                })
                .collect::<Vec<_>>();

            Some(format_py_call(&format!("{}.execute_profile", name), &[
                (Some("steps"), format_py_list(&steps)),
                (Some("repetitions"), repetitions.num_repetitions.to_string()),
                (Some("block_max_volume"), format_py_float(args.block_max_volume)),
            ]))
        },
        invariant_context,
        robot_state,
    )
}
