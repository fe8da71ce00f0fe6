// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

mod collector;
mod defer;
mod registry;

pub use crate::collector::{LatencyCollector, SeriesSnapshot};
pub use crate::defer::Deferred;
pub use crate::registry::{Registerer, RegistrationError, Registry};
