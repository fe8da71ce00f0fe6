// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::io;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

use anyhow::Context;

/// Where generated files go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// One file per trait, named after it.
    Directory(PathBuf),
    /// Exactly this file, for a single trait.
    File(PathBuf),
}

impl OutputTarget {
    /// An existing directory, or a path written with a trailing separator, is a directory.
    /// Anything else is a file.
    pub fn new(path: PathBuf, trailing_separator: bool) -> Self {
        if trailing_separator || path.is_dir() {
            OutputTarget::Directory(path)
        } else {
            OutputTarget::File(path)
        }
    }

    /// Classify the `-o` argument as given on the command line, then make it absolute with
    /// `resolve`.
    pub fn from_arg(arg: &Path, resolve: impl FnOnce(&Path) -> PathBuf) -> Self {
        let text = arg.as_os_str().to_string_lossy();
        let trailing_separator = text.ends_with('/') || text.ends_with(MAIN_SEPARATOR);
        Self::new(resolve(arg), trailing_separator)
    }

    /// The directory generated files are placed in.
    pub fn directory(&self) -> &Path {
        match self {
            OutputTarget::Directory(dir) => dir,
            OutputTarget::File(file) => file.parent().unwrap_or(Path::new("")),
        }
    }
}

/// Replace whatever is at `path` with `contents`, creating missing parent directories.
pub fn write_generated(path: &Path, contents: &str) -> anyhow::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to remove output file {}", path.display()));
        }
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}
