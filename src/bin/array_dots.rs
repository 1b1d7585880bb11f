//! Array-of-dot-products bandwidth benchmark.
//!
//! Usage:
//!   array-dots                          # 1000 vectors of length 10000, 10 repeats
//!   array-dots -v 4000 -l 2000          # custom problem size
//!   array-dots -layout left -threads 8  # column-major views on 8 workers
//!   array-dots -help                    # Show help
//!
//! Diagnostics go to stderr (`RUST_LOG=info` for lifecycle messages); stdout
//! carries only the report.

use std::io::Write;

use anyhow::Context;
use array_dots::config::usage;
use array_dots::math::dot_product::run_with_layout;
use array_dots::utils::logging;
use array_dots::{BenchError, CliArgs, Command, Runtime};

fn main() -> anyhow::Result<()> {
    logging::init();

    let cli = match CliArgs::parse(std::env::args().skip(1)) {
        Ok(Command::Run(cli)) => cli,
        Ok(Command::Help) => {
            print!("{}", usage());
            return Ok(());
        }
        Err(e @ (BenchError::Cli(_) | BenchError::InvalidConfig(_))) => {
            eprintln!("{}", e);
            eprint!("{}", usage());
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let runtime =
        Runtime::initialize(cli.runtime.clone()).context("runtime initialization failed")?;
    let outcome = run_with_layout(&runtime, &cli.run, cli.layout)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    outcome.write_report(&mut out)?;
    out.flush()?;

    // Views go before the runtime that created them.
    drop(outcome);
    drop(runtime);
    Ok(())
}
