// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The capability the locator uses to look at source code.

use crate::{
    error::ResolveError,
    model::{InterfaceDescriptor, ModulePath, TypeRef},
};

/// What a declared name turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    /// A trait, with its method set extracted and qualified.
    Interface(InterfaceDescriptor),
    /// A struct, with its absolute path.
    Struct(syn::Path),
    /// An enum, with its absolute path.
    Enum(syn::Path),
    /// A union, with its absolute path.
    Union(syn::Path),
    /// A type alias, with its (qualified) target. Aliases are never treated as interfaces, even
    /// when they name one.
    Alias(TypeRef),
}

/// A queryable view of a Rust package's modules.
///
/// [`crate::SourceIndex`] is the implementation used by the command line tool; tests are free to
/// provide their own.
pub trait TypeResolver {
    /// The top-level items of `package`, or `None` if the module is not part of the index.
    fn package(&self, package: &ModulePath) -> Option<&[syn::Item]>;

    /// Resolve `path` as written in module `scope`.
    fn resolve(&self, scope: &ModulePath, path: &syn::Path)
    -> Result<TypeDescriptor, ResolveError>;
}
