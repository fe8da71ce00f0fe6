// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Rendering a latency-recording decorator for a trait.
//!
//! [`generate`] turns an [`InterfaceDescriptor`] into the source of a module containing:
//!
//! - `<Trait>Metrics<Next>`, a struct wrapping any `Next: Trait`;
//! - `new_<trait>_metrics_collector`, which creates and registers the shared collector;
//! - `<Trait>Metrics::with_collector`, which wraps a value;
//! - an `impl Trait for <Trait>Metrics<Next>` (plus one per supertrait) forwarding every method
//!   and recording how long it took, labeled with the instance name and the method name.

use std::path::{Path, PathBuf};

mod render;

pub use render::DecoratorModel;

use crate::{
    error::SynthesisError,
    model::{InterfaceDescriptor, ModulePath},
    naming,
};

/// File name suffix used when none is configured.
pub const DEFAULT_SUFFIX: &str = "_metrics.rs";

/// Path generated code uses to reach the metrics runtime when none is configured.
pub const DEFAULT_RUNTIME_CRATE: &str = "metricsgen_runtime";

/// Settings shared by every decorator generated in one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Appended to the snake-cased trait name to build the output file name.
    pub suffix: String,
    /// Path of the runtime crate in generated code.
    pub runtime_crate: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_SUFFIX.to_owned(),
            runtime_crate: DEFAULT_RUNTIME_CRATE.to_owned(),
        }
    }
}

/// One decorator to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// The trait's name.
    pub interface_name: String,
    /// Module declaring the trait.
    pub source_package: ModulePath,
    /// `<InterfaceName>Metrics`
    pub struct_name: String,
    /// Where the generated source goes.
    pub output_file: PathBuf,
    /// Crate name of the trait's package, when the generated file lives in another package.
    pub source_crate: Option<String>,
    /// Path of the runtime crate in generated code.
    pub runtime_crate: String,
    /// External glob imports the trait's signatures may rely on.
    pub glob_imports: Vec<syn::Path>,
}

impl GenerationRequest {
    /// A request for a decorator living in the trait's package.
    ///
    /// The output file is relative until [`Self::in_directory`] or [`Self::with_output_file`]
    /// places it.
    pub fn new(interface_name: &str, source_package: ModulePath, config: &GeneratorConfig) -> Self {
        Self {
            interface_name: interface_name.to_owned(),
            source_package,
            struct_name: naming::struct_name(interface_name),
            output_file: PathBuf::from(naming::output_file_name(interface_name, &config.suffix)),
            source_crate: None,
            runtime_crate: config.runtime_crate.clone(),
            glob_imports: vec![],
        }
    }

    /// Put the output file, named after the trait, in `dir`.
    pub fn in_directory(mut self, dir: &Path) -> Self {
        self.output_file = dir.join(&self.output_file);
        self
    }

    /// Write to exactly `file`.
    pub fn with_output_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.output_file = file.into();
        self
    }

    /// The generated file belongs to another Cargo package, which reaches the trait's package as
    /// the extern crate `source_crate`. `None` keeps `crate::` paths.
    pub fn with_source_crate(mut self, source_crate: Option<String>) -> Self {
        self.source_crate = source_crate;
        self
    }

    /// Glob-import `globs` in the generated file, for names the trait's module takes from them.
    pub fn with_glob_imports(mut self, globs: Vec<syn::Path>) -> Self {
        self.glob_imports = globs;
        self
    }
}

/// Render the decorator for `descriptor` as a formatted Rust source file.
///
/// The same descriptor and request always give the same bytes.
pub fn generate(
    descriptor: &InterfaceDescriptor,
    request: &GenerationRequest,
) -> Result<String, SynthesisError> {
    DecoratorModel::new(descriptor, request)?.render()
}
