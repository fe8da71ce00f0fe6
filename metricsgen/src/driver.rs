// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Turning a set of requested traits into decorator files.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use metricsgen_core::{
    GenerationRequest, GeneratorConfig, InterfaceDescriptor, InterfaceTarget, SourceIndex,
    find_interfaces, generate,
};
use tracing::{debug, info, warn};

use crate::output::{OutputTarget, write_generated};
use crate::package::{self, Package};

const INTERFACE_HINT: &str = "expected <package>.<TraitName> or <module path>::<TraitName>, \
                              e.g. src/store.Store or crate::store::*";

/// A problem with the requested run itself, found before anything is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An `-i` entry that is not `<package>.<TraitName>`.
    InvalidInterface { spec: String },
    /// `-o` names a file but more than one trait was found.
    FileForManyInterfaces { output: PathBuf, count: usize },
    /// Two traits would be written to the same file.
    DuplicateOutput { output: PathBuf },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidInterface { spec } => {
                write!(f, "invalid interface name: {spec}\n{INTERFACE_HINT}")
            }
            ConfigError::FileForManyInterfaces { output, count } => write!(
                f,
                "{count} interfaces found but the output {} is a single file; \
                 pass a directory instead",
                output.display()
            ),
            ConfigError::DuplicateOutput { output } => write!(
                f,
                "more than one interface would be written to {}",
                output.display()
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// One `-i` entry: a package (path or module path) and the trait to look for in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceSpec {
    pub package: String,
    pub target: InterfaceTarget,
}

impl FromStr for InterfaceSpec {
    type Err = ConfigError;

    /// The trait name follows the last `.` or `::`, whichever comes later.
    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidInterface {
            spec: spec.to_owned(),
        };
        let spec = spec.trim();
        let dot = spec.rfind('.').map(|at| (at, at + 1));
        let colons = spec.rfind("::").map(|at| (at, at + 2));
        let (package_end, name_start) = match (dot, colons) {
            (Some(dot), Some(colons)) => dot.max(colons),
            (Some(split), None) | (None, Some(split)) => split,
            (None, None) => return Err(invalid()),
        };
        let package = &spec[..package_end];
        let name = &spec[name_start..];
        if package.is_empty() || !(name == "*" || is_identifier(name)) {
            return Err(invalid());
        }
        Ok(Self {
            package: package.to_owned(),
            target: InterfaceTarget::parse(name),
        })
    }
}

impl fmt::Display for InterfaceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.package, self.target)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
        && name != "_"
}

/// Everything a run needs.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub interfaces: Vec<InterfaceSpec>,
    /// The `-o` argument, relative paths taken from `working_dir`.
    pub output: PathBuf,
    pub config: GeneratorConfig,
    pub working_dir: PathBuf,
}

/// A decorator ready to be written.
struct Rendered {
    path: PathBuf,
    source: String,
}

/// Generate a decorator for every requested trait and return the written files.
///
/// Fails before writing anything if a trait cannot be found or rendered, so a run either
/// produces every file or none.
pub fn run(options: &RunOptions) -> anyhow::Result<Vec<PathBuf>> {
    let output = OutputTarget::from_arg(&options.output, |path| {
        package::normalize(&options.working_dir, path)
    });
    let destination_dir = output.directory();
    let destination = Package::find(destination_dir).with_context(|| {
        format!(
            "failed to detect the package of {}",
            destination_dir.display()
        )
    })?;
    let destination_module = destination.module_of(destination_dir).with_context(|| {
        format!(
            "failed to detect the module of {}",
            destination_dir.display()
        )
    })?;
    debug!(
        package = %destination.name,
        module = %destination_module,
        "generating into"
    );

    let mut indexes: BTreeMap<PathBuf, SourceIndex> = BTreeMap::new();
    let mut requests: Vec<(InterfaceDescriptor, GenerationRequest)> = vec![];
    for spec in &options.interfaces {
        let (source, module) = package::resolve(&spec.package, &options.working_dir)?;
        let index: &SourceIndex = match indexes.entry(source.manifest_dir.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(
                SourceIndex::load(&source.crate_name, &source.root_file)
                    .context("failed to load source code")?,
            ),
        };

        let found = find_interfaces(index, &module, &spec.target)
            .with_context(|| format!("failed to look up {spec}"))?;
        if found.is_empty() {
            match &spec.target {
                InterfaceTarget::Named(name) => {
                    anyhow::bail!("interface {name} not found in package {}", spec.package)
                }
                InterfaceTarget::All => warn!(%module, "no traits found"),
            }
        }

        let source_crate =
            (source.manifest_dir != destination.manifest_dir).then(|| source.crate_name.clone());
        for (name, descriptor) in found {
            let request = GenerationRequest::new(&name, module.clone(), &options.config)
                .with_source_crate(source_crate.clone())
                .with_glob_imports(index.external_globs(&module));
            let request = match &output {
                OutputTarget::Directory(dir) => request.in_directory(dir),
                OutputTarget::File(file) => request.with_output_file(file),
            };
            requests.push((descriptor, request));
        }
    }

    if let OutputTarget::File(file) = &output
        && requests.len() > 1
    {
        return Err(ConfigError::FileForManyInterfaces {
            output: file.clone(),
            count: requests.len(),
        }
        .into());
    }
    let mut outputs = BTreeSet::new();
    for (_, request) in &requests {
        if !outputs.insert(&request.output_file) {
            return Err(ConfigError::DuplicateOutput {
                output: request.output_file.clone(),
            }
            .into());
        }
    }

    let rendered = requests
        .iter()
        .map(|(descriptor, request)| {
            let source = generate(descriptor, request).with_context(|| {
                format!("failed to generate {}", request.output_file.display())
            })?;
            Ok(Rendered {
                path: request.output_file.clone(),
                source,
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut written = Vec::with_capacity(rendered.len());
    for file in rendered {
        write_generated(&file.path, &file.source)?;
        info!(path = %file.path.display(), "generated file");
        written.push(file.path);
    }
    Ok(written)
}

/// `path` relative to `base` when it is inside it, for reporting.
pub fn display_path<'a>(path: &'a Path, base: &Path) -> &'a Path {
    path.strip_prefix(base).unwrap_or(path)
}
