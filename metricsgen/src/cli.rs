// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use clap::Parser;
use metricsgen_core::GeneratorConfig;
use metricsgen_core::synth::{DEFAULT_RUNTIME_CRATE, DEFAULT_SUFFIX};

use crate::driver::{InterfaceSpec, RunOptions};

#[derive(Parser, Debug)]
#[command(name = "metricsgen")]
#[command(about = "Generates latency-recording decorators for Rust traits", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Comma-separated traits to decorate, as <package>.<TraitName> or <module path>::<TraitName>.
    /// The package is a source path (src/store.rs, src/store) or a module path (crate::store);
    /// use * as the trait name to decorate every trait of the module
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub interfaces: Vec<InterfaceSpec>,

    /// Destination file, or directory when several traits are generated
    #[arg(short, long)]
    pub output: PathBuf,

    /// Suffix appended to the snake_cased trait name to form file names
    #[arg(short, long, default_value = DEFAULT_SUFFIX)]
    pub suffix: String,

    /// Path of the metrics runtime crate in generated code
    #[arg(long, default_value = DEFAULT_RUNTIME_CRATE)]
    pub runtime_crate: String,
}

impl Cli {
    /// The run these arguments describe, with relative paths taken from `working_dir`.
    pub fn into_options(self, working_dir: PathBuf) -> RunOptions {
        RunOptions {
            interfaces: self.interfaces,
            output: self.output,
            config: GeneratorConfig {
                suffix: self.suffix,
                runtime_crate: self.runtime_crate,
            },
            working_dir,
        }
    }
}
