use crate::command::{CommandBody, CommentParams, WaitForDurationParams, WaitForResumeParams};
use crate::command_creator::{make_command, CommandCreatorResult, CommandsAndWarnings};
use crate::invariant_context::InvariantContext;
use crate::python::{format_py_call, format_py_float, format_py_str, PROTOCOL_CONTEXT_NAME};
use crate::robot_state::RobotState;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DelayArgs {
    #[serde(default)]
    pub message: Option<String>,
    /// Without seconds the protocol pauses until resumed.
    #[serde(default)]
    pub seconds: Option<f64>,
}

pub fn comment(args: &CommentParams, invariant_context: &InvariantContext, _robot_state: &RobotState) -> CommandCreatorResult {
    let python = format_py_call(&format!("{}.comment", PROTOCOL_CONTEXT_NAME), &[(None, format_py_str(&args.message))]);

    Ok(
        CommandsAndWarnings::new(vec![make_command(invariant_context, CommandBody::Comment(args.clone()))])
            .with_python(python),
    )
}

pub fn delay(args: &DelayArgs, invariant_context: &InvariantContext, _robot_state: &RobotState) -> CommandCreatorResult {
    let (body, python) = match args.seconds {
        Some(seconds) => {
            let mut python_args = vec![(Some("seconds"), format_py_float(seconds))];
            if let Some(message) = &args.message {
                python_args.push((Some("msg"), format_py_str(message)));
            }
            (
                CommandBody::WaitForDuration(WaitForDurationParams {
                    seconds,
                    message: args.message.clone(),
                }),
                format_py_call(&format!("{}.delay", PROTOCOL_CONTEXT_NAME), &python_args),
            )
        }
        None => {
            let python_args = args
                .message
                .iter()
                .map(|message| (None, format_py_str(message)))
                .collect::<Vec<_>>();
            (
                CommandBody::WaitForResume(WaitForResumeParams {
                    message: args.message.clone(),
                }),
                format_py_call(&format!("{}.pause", PROTOCOL_CONTEXT_NAME), &python_args),
            )
        }
    };

    Ok(CommandsAndWarnings::new(vec![make_command(invariant_context, body)]).with_python(python))
}
