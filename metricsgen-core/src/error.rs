// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::{fmt, io, path::PathBuf};

use crate::model::ModulePath;

/// Failure to build or query a [`crate::TypeResolver`].
#[derive(Debug)]
pub enum ResolveError {
    /// A source file could not be read.
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// A source file is not valid Rust.
    Parse {
        /// The file being parsed.
        path: PathBuf,
        /// The parser's error, spanning the offending tokens.
        source: syn::Error,
    },
    /// A path in a signature does not name anything visible from its module.
    UnresolvedType {
        /// The module the path is written in.
        module: ModulePath,
        /// The path as written.
        ty: String,
    },
    /// A declaration that was expected in `module` is not there.
    NotFound {
        /// The module searched.
        module: ModulePath,
        /// The missing name.
        name: String,
    },
    /// A trait item the decorator cannot reproduce, such as a macro invocation.
    UnsupportedItem {
        /// The trait declaring the item.
        interface: String,
        /// The item as written.
        item: String,
    },
    /// A supertrait the decorator cannot implement.
    UnsupportedSupertrait {
        /// The trait declaring the bound.
        interface: String,
        /// The bound as written.
        bound: String,
        /// Why it cannot be forwarded.
        reason: &'static str,
    },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            ResolveError::Parse { path, source } => {
                let start = source.span().start();
                write!(
                    f,
                    "failed to parse {}:{}:{}: {source}",
                    path.display(),
                    start.line,
                    start.column + 1
                )
            }
            ResolveError::UnresolvedType { module, ty } => {
                write!(f, "cannot resolve `{ty}` in {module}")
            }
            ResolveError::NotFound { module, name } => {
                write!(f, "`{name}` is not declared in {module}")
            }
            ResolveError::UnsupportedItem { interface, item } => {
                write!(f, "unsupported item in trait `{interface}`: `{item}`")
            }
            ResolveError::UnsupportedSupertrait {
                interface,
                bound,
                reason,
            } => write!(
                f,
                "unsupported supertrait `{bound}` of `{interface}`: {reason}"
            ),
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolveError::Io { source, .. } => Some(source),
            ResolveError::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Failure of [`crate::find_interfaces`].
#[derive(Debug)]
pub enum LocateError {
    /// The requested module is not part of the index.
    PackageNotFound {
        /// The module asked for.
        package: ModulePath,
    },
    /// A declaration in the module could not be resolved.
    Resolve(ResolveError),
}

impl fmt::Display for LocateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocateError::PackageNotFound { package } => write!(f, "package not found: {package}"),
            LocateError::Resolve(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for LocateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LocateError::PackageNotFound { .. } => None,
            LocateError::Resolve(err) => err.source(),
        }
    }
}

impl From<ResolveError> for LocateError {
    fn from(err: ResolveError) -> Self {
        LocateError::Resolve(err)
    }
}

/// Failure to render a decorator.
#[derive(Debug)]
pub enum SynthesisError {
    /// The trait (supertraits included) declares no methods.
    EmptyInterface {
        /// The trait's name.
        interface: String,
    },
    /// A method cannot be forwarded.
    UnsupportedSignature {
        /// The trait declaring the method.
        interface: String,
        /// The method's name.
        method: String,
        /// What about the signature is not supported.
        reason: String,
    },
    /// The assembled tokens are not a valid Rust file.
    Render {
        /// The trait being rendered.
        interface: String,
        /// The parser's complaint.
        source: syn::Error,
    },
}

impl fmt::Display for SynthesisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthesisError::EmptyInterface { interface } => {
                write!(f, "empty interface: {interface}")
            }
            SynthesisError::UnsupportedSignature {
                interface,
                method,
                reason,
            } => write!(f, "cannot forward `{interface}::{method}`: {reason}"),
            SynthesisError::Render { interface, source } => {
                write!(f, "generated code for {interface} is invalid: {source}")
            }
        }
    }
}

impl std::error::Error for SynthesisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SynthesisError::Render { source, .. } => Some(source),
            _ => None,
        }
    }
}
