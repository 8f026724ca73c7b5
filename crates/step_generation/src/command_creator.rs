//! The command creator contract and the curry/reduce pipeline used to compose creators.

use thiserror::Error;
use tracing::trace;

use crate::command::{Command, CommandBody};
use crate::errors::{CommandCreatorError, CommandCreatorWarning};
use crate::invariant_context::InvariantContext;
use crate::next_robot_state::get_next_robot_state_and_warnings;
use crate::robot_state::RobotState;

#[derive(Debug, serde::Serialize, Clone, PartialEq, Default)]
pub struct CommandsAndWarnings {
    pub commands: Vec<Command>,
    pub warnings: Vec<CommandCreatorWarning>,
    /// Zero-indented python statements, newline separated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub python: Option<String>,
}

impl CommandsAndWarnings {
    pub fn new(commands: Vec<Command>) -> Self {
        Self {
            commands,
            warnings: vec![],
            python: None,
        }
    }

    pub fn with_python(mut self, python: impl Into<String>) -> Self {
        self.python = Some(python.into());
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<CommandCreatorWarning>) -> Self {
        self.warnings = warnings;
        self
    }
}

#[derive(Error, Debug, serde::Serialize, Clone, PartialEq)]
#[error("Command creation failed. errors: [{}]", .errors.iter().map(|error| error.kind()).collect::<Vec<_>>().join(", "))]
pub struct CommandCreatorErrors {
    pub errors: Vec<CommandCreatorError>,
}

impl From<CommandCreatorError> for CommandCreatorErrors {
    fn from(error: CommandCreatorError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl From<Vec<CommandCreatorError>> for CommandCreatorErrors {
    fn from(errors: Vec<CommandCreatorError>) -> Self {
        Self {
            errors,
        }
    }
}

/// Either commands (with warnings and python) or errors, never both.
pub type CommandCreatorResult = Result<CommandsAndWarnings, CommandCreatorErrors>;

/// A command creator with its arguments bound.
pub type CurriedCommandCreator = Box<dyn Fn(&InvariantContext, &RobotState) -> CommandCreatorResult + Send + Sync>;

/// Returns `Err` when `errors` is non-empty, for creators that collect several validation errors.
pub fn errors_to_result(errors: Vec<CommandCreatorError>) -> Result<(), CommandCreatorErrors> {
    match errors.is_empty() {
        true => Ok(()),
        false => Err(errors.into()),
    }
}

/// Creates a command with the next key from the context's key generator.
pub fn make_command(invariant_context: &InvariantContext, body: CommandBody) -> Command {
    Command::new(invariant_context.next_key(), body)
}

pub fn curry_command_creator<A, F>(creator: F, args: A) -> CurriedCommandCreator
where
    A: Send + Sync + 'static,
    F: Fn(&A, &InvariantContext, &RobotState) -> CommandCreatorResult + Send + Sync + 'static,
{
    Box::new(move |invariant_context, robot_state| creator(&args, invariant_context, robot_state))
}

/// As [`curry_command_creator`], with the python of the result removed.
///
/// Used when the caller renders its own python for a group of commands.
pub fn curry_without_python<A, F>(creator: F, args: A) -> CurriedCommandCreator
where
    A: Send + Sync + 'static,
    F: Fn(&A, &InvariantContext, &RobotState) -> CommandCreatorResult + Send + Sync + 'static,
{
    Box::new(move |invariant_context, robot_state| {
        creator(&args, invariant_context, robot_state).map(|mut result| {
            result.python = None;
            result
        })
    })
}

/// Applies the creators in order, each to the state produced by the commands of the previous ones.
///
/// The first error aborts the fold and is returned unchanged.
pub fn reduce_command_creators(
    creators: &[CurriedCommandCreator],
    invariant_context: &InvariantContext,
    initial_robot_state: &RobotState,
) -> CommandCreatorResult {
    reduce_command_creators_with_state(creators, invariant_context, initial_robot_state).map(|(result, _)| result)
}

/// As [`reduce_command_creators`], also returning the state after the last creator's commands.
pub fn reduce_command_creators_with_state(
    creators: &[CurriedCommandCreator],
    invariant_context: &InvariantContext,
    initial_robot_state: &RobotState,
) -> Result<(CommandsAndWarnings, RobotState), CommandCreatorErrors> {
    let mut robot_state = initial_robot_state.clone();
    let mut commands = vec![];
    let mut warnings = vec![];
    let mut python = vec![];

    for (index, creator) in creators.iter().enumerate() {
        let result = match creator(invariant_context, &robot_state) {
            Ok(result) => result,
            Err(errors) => {
                trace!("Command creator failed. index: {}, errors: {}", index, errors);
                return Err(errors);
            }
        };

        let next = get_next_robot_state_and_warnings(&result.commands, invariant_context, &robot_state);
        trace!(
            "Command creator applied. index: {}, commands: {}, warnings: {}",
            index,
            result.commands.len(),
            result.warnings.len() + next.warnings.len()
        );

        commands.extend(result.commands);
        warnings.extend(result.warnings);
        warnings.extend(next.warnings);
        if let Some(fragment) = result.python {
            if !fragment.is_empty() {
                python.push(fragment);
            }
        }
        robot_state = next.robot_state;
    }

    let result = CommandsAndWarnings {
        commands,
        warnings,
        python: match python.is_empty() {
            true => None,
            false => Some(python.join("\n")),
        },
    };
    Ok((result, robot_state))
}
