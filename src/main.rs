//! Thread dump analyzer - parse and analyze JVM thread dumps
//!
//! This is the binary entry point. All logic lives in the library.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tdump_core::logging;
use thread_dump_analyzer::Args;

fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;
    let args = Args::parse();

    logging::init()?;

    let mut out = io::stdout().lock();
    let mut err = io::stderr().lock();
    let loaded_any = thread_dump_analyzer::run(&args, &mut out, &mut err)?;

    Ok(if loaded_any {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
