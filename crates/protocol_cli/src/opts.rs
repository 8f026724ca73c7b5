#![deny(missing_docs)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use cli::args::{KeyGeneratorArg, OnStepErrorArg};

#[derive(Parser, Debug)]
#[command(name = "protocol_cli")]
#[command(bin_name = "protocol_cli")]
#[command(version, about, long_about = None)]
pub(crate) struct Opts {
    #[command(subcommand)]
    pub(crate) command: ModeCommand,

    /// Trace log file
    #[arg(long, num_args = 0..=1, default_missing_value = "trace.log")]
    pub(crate) trace: Option<PathBuf>,

    #[command(flatten)]
    pub(crate) verbose: Verbosity<InfoLevel>,
}

#[derive(Debug, Subcommand)]
pub(crate) enum ModeCommand {
    /// Compile a protocol into robot commands and python
    Compile(CompileArgs),
}

#[derive(Debug, Parser)]
pub(crate) struct CompileArgs {
    /// Protocol file (JSON)
    #[arg(long, value_name = "PROTOCOL_FILE")]
    pub(crate) protocol: PathBuf,

    /// Commands output file, stdout when omitted
    #[arg(long, value_name = "COMMANDS_FILE")]
    pub(crate) commands: Option<PathBuf>,

    /// Python output file
    #[arg(long, value_name = "PYTHON_FILE")]
    pub(crate) python: Option<PathBuf>,

    /// Timeline output file, with the robot state after each step
    #[arg(long, value_name = "TIMELINE_FILE")]
    pub(crate) timeline: Option<PathBuf>,

    /// What to do with the remaining steps when a step fails
    #[arg(long, value_enum, default_value_t = OnStepErrorArg::Halt)]
    pub(crate) on_step_error: OnStepErrorArg,

    /// How command keys are generated
    #[arg(long, value_enum, default_value_t = KeyGeneratorArg::Uuid)]
    pub(crate) keys: KeyGeneratorArg,
}
