//! # ushr — Usher CLI
//!
//! Container entrypoint identity provisioner.
//! Ensures the requested user exists, drops privileges, and execs the
//! workload in place of itself.

mod cli;

use clap::Parser;

use crate::cli::Cli;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Only failure ever returns; success replaces this process image.
    let err = match cli::execute(&cli) {
        Err(err) => err,
        Ok(infallible) => match infallible {},
    };

    eprintln!("{}: {err}", usher_common::constants::BIN_NAME);
    std::process::exit(err.exit_code());
}
