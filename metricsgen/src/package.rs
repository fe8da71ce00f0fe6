// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Mapping paths and module paths to Cargo packages.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use metricsgen_core::ModulePath;
use serde::Deserialize;
use tracing::debug;

/// A Cargo package, as far as locating its sources goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// `name` from the `[package]` table.
    pub name: String,
    /// The name other crates refer to the library by.
    pub crate_name: String,
    pub manifest_dir: PathBuf,
    /// `src/lib.rs`, `src/main.rs`, or the `[lib] path` of the manifest.
    pub root_file: PathBuf,
}

#[derive(Debug, Deserialize)]
struct Manifest {
    package: Option<PackageTable>,
    lib: Option<LibTable>,
}

#[derive(Debug, Deserialize)]
struct PackageTable {
    name: String,
}

#[derive(Debug, Deserialize)]
struct LibTable {
    name: Option<String>,
    path: Option<PathBuf>,
}

/// Why a package or module could not be determined.
#[derive(Debug)]
pub enum PackageError {
    /// Neither an existing path nor a module path of the current package.
    NotFound { package: String },
    /// No `Cargo.toml` with a `[package]` table above `path`.
    NoManifest { path: PathBuf },
    Io { path: PathBuf, source: io::Error },
    Manifest {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// The package has neither a library nor a binary root.
    NoRootFile { manifest_dir: PathBuf },
    /// `path` is not below the directory of the package's root file.
    OutsideSource { path: PathBuf, src: PathBuf },
    /// A path component that cannot be a module name.
    InvalidModule { path: PathBuf, segment: String },
}

impl fmt::Display for PackageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageError::NotFound { package } => write!(f, "unable to load package: {package}"),
            PackageError::NoManifest { path } => {
                write!(f, "no Cargo package contains {}", path.display())
            }
            PackageError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            PackageError::Manifest { path, source } => {
                write!(f, "failed to parse {}: {source}", path.display())
            }
            PackageError::NoRootFile { manifest_dir } => write!(
                f,
                "{} has neither src/lib.rs nor src/main.rs",
                manifest_dir.display()
            ),
            PackageError::OutsideSource { path, src } => write!(
                f,
                "{} is outside of the package sources in {}",
                path.display(),
                src.display()
            ),
            PackageError::InvalidModule { path, segment } => write!(
                f,
                "{} does not map to a module: `{segment}` is not a valid module name",
                path.display()
            ),
        }
    }
}

impl std::error::Error for PackageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PackageError::Io { source, .. } => Some(source),
            PackageError::Manifest { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl Package {
    /// The package owning `path`: the closest ancestor (or `path` itself) with a `Cargo.toml`
    /// declaring a `[package]`. Workspace-only manifests are skipped.
    ///
    /// `path` does not have to exist.
    pub fn find(path: &Path) -> Result<Self, PackageError> {
        for dir in path.ancestors() {
            let manifest_path = dir.join("Cargo.toml");
            if !manifest_path.is_file() {
                continue;
            }
            let text = fs::read_to_string(&manifest_path).map_err(|source| PackageError::Io {
                path: manifest_path.clone(),
                source,
            })?;
            let manifest: Manifest =
                toml::from_str(&text).map_err(|source| PackageError::Manifest {
                    path: manifest_path.clone(),
                    source,
                })?;
            let Some(package) = manifest.package else {
                continue;
            };
            return Self::from_manifest(dir, package, manifest.lib);
        }
        Err(PackageError::NoManifest {
            path: path.to_path_buf(),
        })
    }

    fn from_manifest(
        dir: &Path,
        package: PackageTable,
        lib: Option<LibTable>,
    ) -> Result<Self, PackageError> {
        let (lib_name, lib_path) = lib.map_or((None, None), |lib| (lib.name, lib.path));
        let root_file = match lib_path {
            Some(path) => dir.join(path),
            None => ["src/lib.rs", "src/main.rs"]
                .into_iter()
                .map(|file| dir.join(file))
                .find(|file| file.is_file())
                .ok_or_else(|| PackageError::NoRootFile {
                    manifest_dir: dir.to_path_buf(),
                })?,
        };
        let found = Self {
            crate_name: lib_name.unwrap_or_else(|| package.name.replace('-', "_")),
            name: package.name,
            manifest_dir: dir.to_path_buf(),
            root_file,
        };
        debug!(name = %found.name, root_file = %found.root_file.display(), "found package");
        Ok(found)
    }

    /// The module `path` holds.
    ///
    /// `src/lib.rs` is `crate`, `src/a/mod.rs` and `src/a.rs` are `crate::a`, and a directory is
    /// the module whose children it contains, so `src/a/` is `crate::a` as well.
    pub fn module_of(&self, path: &Path) -> Result<ModulePath, PackageError> {
        if path == self.root_file {
            return Ok(ModulePath::root());
        }
        let src = self.root_file.parent().unwrap_or(&self.manifest_dir);
        let relative = path
            .strip_prefix(src)
            .map_err(|_| PackageError::OutsideSource {
                path: path.to_path_buf(),
                src: src.to_path_buf(),
            })?;

        let mut segments: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if path.extension().is_some_and(|ext| ext == "rs")
            && let Some(file) = segments.pop()
        {
            let stem = file.strip_suffix(".rs").unwrap_or(&file);
            if stem != "mod" {
                segments.push(stem.to_owned());
            }
        }

        let mut module = ModulePath::root();
        for segment in segments {
            if !is_module_name(&segment) {
                return Err(PackageError::InvalidModule {
                    path: path.to_path_buf(),
                    segment,
                });
            }
            module = module.child(&segment);
        }
        Ok(module)
    }
}

/// Find the package and module `package` refers to.
///
/// A path that exists on disk, as given or with `.rs` appended (`src/store` for `src/store.rs`),
/// is mapped through its Cargo package. Anything else has to be a
/// module path of the package containing `working_dir`, starting with `crate` or that package's
/// crate name (`crate::store`, `my_service::store`).
pub fn resolve(package: &str, working_dir: &Path) -> Result<(Package, ModulePath), PackageError> {
    let path = normalize(working_dir, Path::new(package));
    let mut file = path.clone().into_os_string();
    file.push(".rs");
    for path in [path, PathBuf::from(file)] {
        if path.exists() {
            let found = Package::find(&path)?;
            let module = found.module_of(&path)?;
            return Ok((found, module));
        }
    }

    let not_found = || PackageError::NotFound {
        package: package.to_owned(),
    };
    let found = Package::find(working_dir).map_err(|_| not_found())?;
    let mut segments = package.split("::");
    let first = segments.next().unwrap_or_default();
    if first != "crate" && first != found.crate_name && first != found.name.replace('-', "_") {
        return Err(not_found());
    }
    let mut module = ModulePath::root();
    for segment in segments {
        if !is_module_name(segment) {
            return Err(not_found());
        }
        module = module.child(segment);
    }
    Ok((found, module))
}

/// `path` made absolute against `base`, with `.` and `..` removed lexically.
pub fn normalize(base: &Path, path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in base.join(path).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

fn is_module_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}
