//! Netcalc - subnet calculator CLI
//!
//! A command-line interface for IPv4/IPv6 subnet arithmetic and RFC 4193
//! unique local address generation.

mod commands;
mod nic;
mod ntp;

use netcalc_core::args::CalcArgs;
use netcalc_core::output::OutputWriter;
use std::process;
use tracing::debug;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = CalcArgs::from_iter_safe(std::env::args_os()).unwrap_or_else(|e| e.exit());

    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = run(&args).await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run(args: &CalcArgs) -> anyhow::Result<()> {
    args.validate()?;
    debug!(?args.command, "validated arguments");

    let rendered = commands::run(args).await?;

    let mut writer = OutputWriter::open(args.output.as_deref())?;
    writer.write_line(&rendered)?;
    debug!(destination = writer.destination(), "wrote report");

    Ok(())
}
