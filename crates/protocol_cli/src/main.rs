use anyhow::Context;
use clap::Parser;

use crate::opts::{ModeCommand, Opts};

mod compile;
mod opts;
mod protocol;

fn main() -> anyhow::Result<()> {
    let args = argfile::expand_args(argfile::parse_fromfile, argfile::PREFIX).context("Expanding argument files")?;

    let opts = Opts::parse_from(args);

    cli::tracing::configure_tracing(opts.trace.clone(), opts.verbose.clone())?;

    match opts.command {
        ModeCommand::Compile(args) => compile::compile(&args),
    }
}
