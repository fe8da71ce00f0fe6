// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use metricsgen::{Cli, driver::display_path, run};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match generate(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("metricsgen: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn generate(cli: Cli) -> anyhow::Result<()> {
    let working_dir =
        std::env::current_dir().context("failed to determine the working directory")?;
    let options = cli.into_options(working_dir);
    for path in run(&options)? {
        println!(
            "Generated file: {}",
            display_path(&path, &options.working_dir).display()
        );
    }
    Ok(())
}
