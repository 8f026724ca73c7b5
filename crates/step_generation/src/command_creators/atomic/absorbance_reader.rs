use crate::command::{AbsorbanceReaderInitializeParams, AbsorbanceReaderReadParams, CommandBody, ModuleParams};
use crate::command_creator::{make_command, CommandCreatorResult, CommandsAndWarnings};
use crate::command_creators::atomic::get_module;
use crate::errors::CommandCreatorError;
use crate::invariant_context::InvariantContext;
use crate::python::{format_py_call, format_py_list, format_py_str, PyValue};
use crate::robot_state::{AbsorbanceReaderMode, ModuleState, RobotState};

/// The lid is moved by the gripper.
pub fn absorbance_reader_open_lid(
    args: &ModuleParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let (module, _module_state) = get_module(invariant_context, robot_state, &args.module_id)?;
    if !invariant_context.has_gripper() {
        return Err(CommandCreatorError::GripperRequired.into());
    }

    Ok(CommandsAndWarnings::new(vec![make_command(
        invariant_context,
        CommandBody::AbsorbanceReaderOpenLid(args.clone()),
    )])
    .with_python(format!("{}.open_lid()", module.python_name)))
}

/// The lid is moved by the gripper.
pub fn absorbance_reader_close_lid(
    args: &ModuleParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let (module, _module_state) = get_module(invariant_context, robot_state, &args.module_id)?;
    if !invariant_context.has_gripper() {
        return Err(CommandCreatorError::GripperRequired.into());
    }

    Ok(CommandsAndWarnings::new(vec![make_command(
        invariant_context,
        CommandBody::AbsorbanceReaderCloseLid(args.clone()),
    )])
    .with_python(format!("{}.close_lid()", module.python_name)))
}

pub fn absorbance_reader_initialize(
    args: &AbsorbanceReaderInitializeParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let (module, _module_state) = get_module(invariant_context, robot_state, &args.module_id)?;

    let mode = match args.measure_mode {
        AbsorbanceReaderMode::Single => "single",
        AbsorbanceReaderMode::Multi => "multi",
    };
    let wavelengths = args
        .sample_wavelengths
        .iter()
        .map(|wavelength| PyValue::from(*wavelength))
        .collect::<Vec<_>>();

    let mut python_args = vec![
        (Some("mode"), format_py_str(mode)),
        (Some("wavelengths"), format_py_list(&wavelengths)),
    ];
    if let Some(reference_wavelength) = args.reference_wavelength {
        python_args.push((Some("reference_wavelength"), reference_wavelength.to_string()));
    }
    let python = format_py_call(&format!("{}.initialize", module.python_name), &python_args);

    Ok(CommandsAndWarnings::new(vec![make_command(
        invariant_context,
        CommandBody::AbsorbanceReaderInitialize(args.clone()),
    )])
    .with_python(python))
}

/// Reading requires a prior initialization.
pub fn absorbance_reader_read(
    args: &AbsorbanceReaderReadParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let (module, module_state) = get_module(invariant_context, robot_state, &args.module_id)?;

    if !matches!(module_state, ModuleState::AbsorbanceReader {
        initialization: Some(_),
        ..
    }) {
        return Err(CommandCreatorError::AbsorbanceReaderNoInitialization.into());
    }

    let python_args = args
        .file_name
        .iter()
        .map(|file_name| (Some("export_filename"), format_py_str(file_name)))
        .collect::<Vec<_>>();
    let python = format_py_call(&format!("{}.read", module.python_name), &python_args);

    Ok(CommandsAndWarnings::new(vec![make_command(
        invariant_context,
        CommandBody::AbsorbanceReaderRead(args.clone()),
    )])
    .with_python(python))
}
