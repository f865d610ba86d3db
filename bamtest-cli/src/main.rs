//! bamtest: fixture-user registry tool.
//!
//! Usage:
//!   bamtest --env DEV list
//!   bamtest --env TEST pick --with-bank-account
//!   bamtest --hide-secrets show 42
//!
//! Logs go to stderr; command output goes to stdout.

use anyhow::Result;
use bamtest_cli::{Args, run};
use clap::Parser;
use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    debug!("Using {} registry under {}", args.env, args.data_dir.display());
    let stdout = std::io::stdout();
    run(&args, &mut stdout.lock())
}
