// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Finding the traits declared in a module.

use std::collections::BTreeMap;
use std::fmt;

use syn::{
    Ident, ItemEnum, ItemFn, ItemImpl, ItemMod, ItemStruct, ItemTrait, ItemType, ItemUnion,
    visit::Visit,
};
use tracing::debug;

use crate::{
    error::{LocateError, ResolveError},
    model::{InterfaceDescriptor, ModulePath},
    resolve::{TypeDescriptor, TypeResolver},
};

/// Which traits of a module to look for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceTarget {
    /// The trait with this name.
    Named(String),
    /// Every trait in the module, written `*`.
    All,
}

impl InterfaceTarget {
    /// `*` is [`InterfaceTarget::All`], anything else a name.
    pub fn parse(name: &str) -> Self {
        match name {
            "*" => InterfaceTarget::All,
            name => InterfaceTarget::Named(name.to_owned()),
        }
    }

    /// Whether a trait called `name` is wanted.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            InterfaceTarget::Named(wanted) => wanted == name,
            InterfaceTarget::All => true,
        }
    }
}

impl fmt::Display for InterfaceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterfaceTarget::Named(name) => f.write_str(name),
            InterfaceTarget::All => f.write_str("*"),
        }
    }
}

/// Find the traits of `package` matching `target`, keyed by name.
///
/// Only the module's own top-level declarations are considered: nested modules, `impl` blocks and
/// function bodies are not searched. Declarations that turn out not to be traits are skipped. The
/// first resolution failure aborts the search.
///
/// A declaration is resolved only when its name matches `target`, so a named lookup succeeds even
/// if another trait of the module cannot be decorated; a wildcard resolves every declaration.
pub fn find_interfaces<R: TypeResolver + ?Sized>(
    resolver: &R,
    package: &ModulePath,
    target: &InterfaceTarget,
) -> Result<BTreeMap<String, InterfaceDescriptor>, LocateError> {
    let items = resolver
        .package(package)
        .ok_or_else(|| LocateError::PackageNotFound {
            package: package.clone(),
        })?;

    let mut locator = Locator {
        resolver,
        package,
        target,
        found: BTreeMap::new(),
        error: None,
    };
    for item in items {
        locator.visit_item(item);
        if locator.error.is_some() {
            break;
        }
    }
    if let Some(err) = locator.error {
        return Err(err.into());
    }

    debug!(
        %package,
        %target,
        found = locator.found.len(),
        "located interfaces"
    );
    Ok(locator.found)
}

struct Locator<'a, R: ?Sized> {
    resolver: &'a R,
    package: &'a ModulePath,
    target: &'a InterfaceTarget,
    found: BTreeMap<String, InterfaceDescriptor>,
    error: Option<ResolveError>,
}

impl<R: TypeResolver + ?Sized> Locator<'_, R> {
    fn declaration(&mut self, ident: &Ident) {
        let name = ident.to_string();
        if self.error.is_some() || !self.target.matches(&name) {
            return;
        }
        match self.resolver.resolve(self.package, &ident.clone().into()) {
            Ok(TypeDescriptor::Interface(descriptor)) => {
                self.found.insert(name, descriptor);
            }
            Ok(_) => {}
            Err(err) => self.error = Some(err),
        }
    }
}

impl<'ast, R: TypeResolver + ?Sized> Visit<'ast> for Locator<'_, R> {
    fn visit_item_trait(&mut self, item: &'ast ItemTrait) {
        self.declaration(&item.ident);
    }

    fn visit_item_struct(&mut self, item: &'ast ItemStruct) {
        self.declaration(&item.ident);
    }

    fn visit_item_enum(&mut self, item: &'ast ItemEnum) {
        self.declaration(&item.ident);
    }

    fn visit_item_union(&mut self, item: &'ast ItemUnion) {
        self.declaration(&item.ident);
    }

    fn visit_item_type(&mut self, item: &'ast ItemType) {
        self.declaration(&item.ident);
    }

    // top-level declarations only
    fn visit_item_fn(&mut self, _: &'ast ItemFn) {}

    fn visit_item_impl(&mut self, _: &'ast ItemImpl) {}

    fn visit_item_mod(&mut self, _: &'ast ItemMod) {}
}
