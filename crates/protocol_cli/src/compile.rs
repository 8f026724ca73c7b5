use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use step_generation::command::Command;
use step_generation::command_creator::CurriedCommandCreator;
use step_generation::python::{indent_py_lines, PROTOCOL_CONTEXT_NAME};
use step_generation::timeline::{command_creators_timeline, Timeline, TimelineOptions};
use tracing::{debug, error, info, warn};

use crate::opts::CompileArgs;
use crate::protocol::ProtocolFile;

pub(crate) fn compile(args: &CompileArgs) -> anyhow::Result<()> {
    info!("Compiling protocol. path: {:?}", args.protocol);

    let protocol = ProtocolFile::load(&args.protocol)?;

    let invariant_context = protocol
        .build_invariant_context(args.keys.build())
        .context("Building invariant context")?;
    let initial_robot_state = protocol
        .build_initial_robot_state(&invariant_context)
        .context("Building initial robot state")?;

    let steps: Vec<CurriedCommandCreator> = protocol
        .steps
        .into_iter()
        .enumerate()
        .map(|(index, step)| {
            debug!("Step. index: {}, creator: {}", index, step.creator_name());
            step.into_curried()
        })
        .collect();

    let options = TimelineOptions::default().with_on_step_error(args.on_step_error.into());
    let timeline = command_creators_timeline(&steps, &invariant_context, &initial_robot_state, &options);

    for frame in timeline.frames.iter() {
        for warning in frame.warnings.iter() {
            warn!("Step warning. index: {}, kind: {}, message: {}", frame.step_index, warning.kind(), warning);
        }
    }

    write_outputs(args, &timeline)?;

    if timeline.has_errors() {
        for step_error in timeline.errors.iter() {
            for error in step_error.errors.iter() {
                error!(
                    "Step error. index: {}, kind: {}, message: {}",
                    step_error.step_index,
                    error.kind(),
                    error
                );
            }
        }
        let failed_steps: Vec<usize> = timeline
            .errors
            .iter()
            .map(|step_error| step_error.step_index)
            .collect();
        bail!("Protocol has errors. failed steps: {:?}", failed_steps)
    }

    info!(
        "Compiled protocol. steps: {}, commands: {}",
        steps.len(),
        timeline.commands().count()
    );

    Ok(())
}

fn write_outputs(args: &CompileArgs, timeline: &Timeline) -> anyhow::Result<()> {
    let commands: Vec<&Command> = timeline.commands().collect();
    let commands_json = serde_json::to_string_pretty(&commands)?;
    match &args.commands {
        Some(path) => write_file(path, &commands_json)?,
        None => println!("{}", commands_json),
    }

    if let Some(path) = &args.python {
        write_file(path, &python_source(timeline))?;
    }

    if let Some(path) = &args.timeline {
        let timeline_json = serde_json::to_string_pretty(timeline)?;
        write_file(path, &timeline_json)?;
    }

    Ok(())
}

fn write_file(path: &Path, content: &str) -> anyhow::Result<()> {
    fs::write(path, content).with_context(|| format!("Writing file. path: {:?}", path))?;
    info!("Written file. path: {:?}", path);
    Ok(())
}

/// The python of every step as the body of the protocol's `run` function.
fn python_source(timeline: &Timeline) -> String {
    let body = timeline
        .python()
        .unwrap_or_else(|| "pass".to_string());

    format!("def run({}):\n{}\n", PROTOCOL_CONTEXT_NAME, indent_py_lines(&body))
}
