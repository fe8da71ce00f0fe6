// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::collections::{BTreeMap, BTreeSet};

use quote::ToTokens;
use syn::{
    ItemTrait, TraitBoundModifier, TraitItem, Type, TypeParamBound, WherePredicate,
    visit_mut::VisitMut,
};

use super::{
    SourceIndex, path_text,
    qualify::{Qualifier, generic_names},
    signature::method_signature,
};
use crate::{
    error::ResolveError,
    model::{AssociatedItem, InterfaceDescriptor, ModulePath, TypeRef},
    resolve::TypeDescriptor,
};

/// Supertrait chains longer than this are assumed to be cyclic.
const MAX_SUPERTRAIT_DEPTH: usize = 32;

/// Marker traits every decorator implements as long as the wrapped type does.
const STRUCTURAL: &[&str] = &["Send", "Sync", "Sized", "Unpin"];

/// Supertraits the decorator gets by deriving them.
const DERIVABLE: &[&str] = &["Clone", "Debug"];

type SupertraitKey = (ModulePath, String);

pub(super) fn describe_trait(
    index: &SourceIndex,
    module: &ModulePath,
    item: &ItemTrait,
    depth: usize,
) -> Result<InterfaceDescriptor, ResolveError> {
    let interface = item.ident.to_string();
    let mut descriptor = InterfaceDescriptor::new(module.clone(), item.ident.clone());
    descriptor.unsafety = item.unsafety.is_some();

    // `where Self: Bound` is another way of writing a supertrait
    let mut generics = item.generics.clone();
    let mut bounds: Vec<TypeParamBound> = item.supertraits.iter().cloned().collect();
    if let Some(where_clause) = &mut generics.where_clause {
        for predicate in std::mem::take(&mut where_clause.predicates) {
            match predicate {
                WherePredicate::Type(predicate)
                    if predicate.lifetimes.is_none() && is_self(&predicate.bounded_ty) =>
                {
                    bounds.extend(predicate.bounds);
                }
                other => where_clause.predicates.push(other),
            }
        }
        if where_clause.predicates.is_empty() {
            generics.where_clause = None;
        }
    }

    let trait_generics = generic_names(&generics);
    let mut qualifier = Qualifier::new(index, module, trait_generics.clone());
    qualifier.visit_generics_mut(&mut generics);
    qualifier.finish()?;
    descriptor.generics = generics;

    let mut supertraits = BTreeMap::new();
    for bound in &bounds {
        add_supertrait(
            index,
            module,
            &interface,
            bound,
            depth,
            &mut descriptor.derives,
            &mut supertraits,
        )?;
    }
    descriptor.supertraits = supertraits.into_values().collect();

    for trait_item in &item.items {
        match trait_item {
            TraitItem::Fn(method) => {
                let method = method_signature(index, module, &trait_generics, method)?;
                descriptor.methods.insert(method.name.to_string(), method);
            }
            TraitItem::Type(assoc) => {
                let mut generics = assoc.generics.clone();
                let mut names = trait_generics.clone();
                names.extend(generic_names(&generics));
                let mut qualifier = Qualifier::new(index, module, names);
                qualifier.visit_generics_mut(&mut generics);
                qualifier.finish()?;
                descriptor.associated.push(AssociatedItem::Type {
                    name: assoc.ident.clone(),
                    generics,
                });
            }
            TraitItem::Const(assoc) => {
                let mut ty = assoc.ty.clone();
                let mut qualifier = Qualifier::new(index, module, trait_generics.clone());
                qualifier.visit_type_mut(&mut ty);
                qualifier.finish()?;
                descriptor.associated.push(AssociatedItem::Const {
                    name: assoc.ident.clone(),
                    ty: TypeRef::new(ty),
                });
            }
            TraitItem::Macro(mac) => {
                return Err(ResolveError::UnsupportedItem {
                    interface,
                    item: format!("{}!", path_text(&mac.mac.path)),
                });
            }
            other => {
                return Err(ResolveError::UnsupportedItem {
                    interface,
                    item: other.to_token_stream().to_string(),
                });
            }
        }
    }
    descriptor
        .associated
        .sort_by(|a, b| a.name().to_string().cmp(&b.name().to_string()));

    Ok(descriptor)
}

fn add_supertrait(
    index: &SourceIndex,
    module: &ModulePath,
    interface: &str,
    bound: &TypeParamBound,
    depth: usize,
    derives: &mut BTreeSet<String>,
    found: &mut BTreeMap<SupertraitKey, InterfaceDescriptor>,
) -> Result<(), ResolveError> {
    let TypeParamBound::Trait(bound) = bound else {
        // lifetimes
        return Ok(());
    };
    if matches!(bound.modifier, TraitBoundModifier::Maybe(_)) {
        return Ok(());
    }
    let path = &bound.path;
    let unsupported = |reason| ResolveError::UnsupportedSupertrait {
        interface: interface.to_owned(),
        bound: path_text(path),
        reason,
    };

    if let Some(name) = std_trait_name(path) {
        if STRUCTURAL.contains(&name.as_str()) {
            return Ok(());
        }
        if DERIVABLE.contains(&name.as_str()) {
            derives.insert(name);
            return Ok(());
        }
    }
    if bound.lifetimes.is_some() || path.segments.iter().any(|s| !s.arguments.is_none()) {
        return Err(unsupported("generic supertraits are not supported"));
    }
    if depth >= MAX_SUPERTRAIT_DEPTH {
        return Err(unsupported("the supertrait chain is too deep"));
    }

    let mut descriptor = match index.describe(module, path, depth + 1) {
        Ok(TypeDescriptor::Interface(descriptor)) => descriptor,
        Ok(_) => return Err(unsupported("not a trait")),
        Err(ResolveError::UnresolvedType { .. } | ResolveError::NotFound { .. }) => {
            return Err(unsupported(
                "only traits declared in the same crate can be forwarded",
            ));
        }
        Err(err) => return Err(err),
    };
    if !descriptor.generics.params.is_empty() {
        return Err(unsupported("generic supertraits are not supported"));
    }

    derives.append(&mut descriptor.derives);
    for nested in std::mem::take(&mut descriptor.supertraits) {
        found.entry(key(&nested)).or_insert(nested);
    }
    found.entry(key(&descriptor)).or_insert(descriptor);
    Ok(())
}

fn key(descriptor: &InterfaceDescriptor) -> SupertraitKey {
    (descriptor.package_path.clone(), descriptor.name.to_string())
}

/// The trait name if `path` is spelled like a standard library trait (`Clone`, `std::fmt::Debug`).
fn std_trait_name(path: &syn::Path) -> Option<String> {
    let last = path.segments.last()?;
    let first = path.segments.first()?;
    let is_std = path.segments.len() == 1
        || matches!(first.ident.to_string().as_str(), "std" | "core" | "alloc");
    is_std.then(|| last.ident.to_string())
}

fn is_self(ty: &Type) -> bool {
    matches!(ty, Type::Path(p) if p.qself.is_none() && p.path.is_ident("Self"))
}
