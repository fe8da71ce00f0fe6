// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The `metricsgen` command: finds the requested traits in a Cargo package and writes a
//! latency-recording decorator for each of them.
//!
//! The generation itself lives in [`metricsgen_core`]; this crate resolves command line
//! arguments to packages and modules, and owns where the output goes.

pub mod cli;
pub mod driver;
pub mod output;
pub mod package;

pub use crate::cli::Cli;
pub use crate::driver::{ConfigError, InterfaceSpec, RunOptions, run};
