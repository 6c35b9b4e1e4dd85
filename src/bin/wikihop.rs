use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use wikihop::{logging, run_traversal, Cli, TraversalOutcome};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_tracing();

    let result = run_traversal(&cli).and_then(|outcome| {
        print_summary(&outcome, cli.json)?;
        Ok(outcome)
    });

    match result {
        Ok(outcome) if outcome.reached_target() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn print_summary(outcome: &TraversalOutcome, json: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        let summary = outcome.to_json().context("failed to serialize summary")?;
        serde_json::to_writer_pretty(&mut out, &summary)
            .context("failed to write JSON summary")?;
        writeln!(out)?;
    } else {
        outcome
            .write_report(&mut out)
            .context("failed to write summary")?;
    }
    out.flush()?;
    Ok(())
}
