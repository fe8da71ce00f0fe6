// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

pub use crate::error::{LocateError, ResolveError, SynthesisError};
pub use crate::index::SourceIndex;
pub use crate::locate::{InterfaceTarget, find_interfaces};
pub use crate::model::{
    AssociatedItem, InterfaceDescriptor, MethodSignature, ModulePath, Parameter, Receiver, TypeRef,
};
pub use crate::resolve::{TypeDescriptor, TypeResolver};
pub use crate::synth::{GenerationRequest, GeneratorConfig, generate};

mod error;
mod index;
mod locate;
pub mod model;
pub mod naming;
mod resolve;
pub mod synth;

/// Version stamped into the header of generated files.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
