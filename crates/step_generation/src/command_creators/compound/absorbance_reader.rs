//! Absorbance reader steps. The plate reader only initializes and reads with its lid closed.

use crate::command::{AbsorbanceReaderInitializeParams, AbsorbanceReaderReadParams, ModuleParams};
use crate::command_creator::{
    curry_command_creator, reduce_command_creators, CommandCreatorResult, CurriedCommandCreator,
};
use crate::command_creators::atomic::absorbance_reader::{
    absorbance_reader_close_lid, absorbance_reader_initialize, absorbance_reader_open_lid, absorbance_reader_read,
};
use crate::command_creators::atomic::get_module;
use crate::errors::CommandCreatorError;
use crate::invariant_context::InvariantContext;
use crate::robot_state::{ModuleState, RobotState};

/// The state of an absorbance reader, any other module type is missing.
fn get_absorbance_reader<'a>(
    invariant_context: &'a InvariantContext,
    robot_state: &'a RobotState,
    module_id: &str,
) -> Result<&'a ModuleState, CommandCreatorError> {
    let (_module, module_state) = get_module(invariant_context, robot_state, module_id)?;
    match module_state {
        ModuleState::AbsorbanceReader {
            ..
        } => Ok(module_state),
        _ => Err(CommandCreatorError::MissingModule {
            module_id: module_id.to_string(),
        }),
    }
}

/// A close lid creator unless the lid is already known to be closed.
fn close_lid_if_needed(
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
    module_id: &str,
) -> Result<Option<CurriedCommandCreator>, CommandCreatorError> {
    let module_state = get_absorbance_reader(invariant_context, robot_state, module_id)?;
    let closed = matches!(module_state, ModuleState::AbsorbanceReader {
        lid_open: Some(false),
        ..
    });

    Ok((!closed).then(|| {
        curry_command_creator(absorbance_reader_close_lid, ModuleParams {
            module_id: module_id.to_string(),
        })
    }))
}

pub fn absorbance_reader_close_initialize(
    args: &AbsorbanceReaderInitializeParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let mut creators: Vec<CurriedCommandCreator> = vec![];
    creators.extend(close_lid_if_needed(invariant_context, robot_state, &args.module_id)?);
    creators.push(curry_command_creator(absorbance_reader_initialize, args.clone()));

    reduce_command_creators(&creators, invariant_context, robot_state)
}

pub fn absorbance_reader_close_read(
    args: &AbsorbanceReaderReadParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let mut creators: Vec<CurriedCommandCreator> = vec![];
    creators.extend(close_lid_if_needed(invariant_context, robot_state, &args.module_id)?);
    creators.push(curry_command_creator(absorbance_reader_read, args.clone()));

    reduce_command_creators(&creators, invariant_context, robot_state)
}

pub fn absorbance_reader_open_lid_step(
    args: &ModuleParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    get_absorbance_reader(invariant_context, robot_state, &args.module_id)?;

    let creators = vec![curry_command_creator(absorbance_reader_open_lid, args.clone())];
    reduce_command_creators(&creators, invariant_context, robot_state)
}

pub fn absorbance_reader_close_lid_step(
    args: &ModuleParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    get_absorbance_reader(invariant_context, robot_state, &args.module_id)?;

    let creators = vec![curry_command_creator(absorbance_reader_close_lid, args.clone())];
    reduce_command_creators(&creators, invariant_context, robot_state)
}
