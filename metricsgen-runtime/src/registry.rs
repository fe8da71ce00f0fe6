// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::LatencyCollector;

/// Something collectors can be registered with.
///
/// Generated constructors take a `&dyn Registerer` rather than reaching for a global registry, so
/// callers decide where metrics end up.
pub trait Registerer {
    /// Register `collector`, failing if its name is invalid or already taken.
    fn register(&self, collector: Arc<LatencyCollector>) -> Result<(), RegistrationError>;
}

impl<R: Registerer + ?Sized> Registerer for Arc<R> {
    fn register(&self, collector: Arc<LatencyCollector>) -> Result<(), RegistrationError> {
        (**self).register(collector)
    }
}

/// Why a collector could not be registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// The name is empty or contains characters other than ASCII letters, digits, `_` and `:`,
    /// or starts with a digit.
    InvalidName {
        /// The rejected name.
        name: String,
    },
    /// A collector with the same name is already registered.
    AlreadyRegistered {
        /// The name in use.
        name: String,
    },
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationError::InvalidName { name } => write!(f, "invalid metric name {name:?}"),
            RegistrationError::AlreadyRegistered { name } => {
                write!(f, "a collector named {name:?} is already registered")
            }
        }
    }
}

impl std::error::Error for RegistrationError {}

/// An in-process set of collectors, keyed by name.
#[derive(Debug, Default)]
pub struct Registry {
    collectors: Mutex<BTreeMap<String, Arc<LatencyCollector>>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The collector registered as `name`.
    pub fn get(&self, name: &str) -> Option<Arc<LatencyCollector>> {
        self.collectors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Every registered collector, sorted by name.
    pub fn gather(&self) -> Vec<Arc<LatencyCollector>> {
        self.collectors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }
}

impl Registerer for Registry {
    fn register(&self, collector: Arc<LatencyCollector>) -> Result<(), RegistrationError> {
        let name = collector.name().to_owned();
        if !valid_metric_name(&name) {
            return Err(RegistrationError::InvalidName { name });
        }
        let mut collectors = self.collectors.lock().unwrap_or_else(PoisonError::into_inner);
        match collectors.entry(name) {
            Entry::Occupied(entry) => Err(RegistrationError::AlreadyRegistered {
                name: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                debug!(name = %entry.key(), "registered collector");
                entry.insert(collector);
                Ok(())
            }
        }
    }
}

/// `[a-zA-Z_:][a-zA-Z0-9_:]*`
fn valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_' || first == ':')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}
