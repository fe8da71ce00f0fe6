// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Trait method declarations to [`MethodSignature`]s.

use std::collections::BTreeSet;

use quote::{ToTokens, format_ident};
use syn::{
    FnArg, GenericArgument, Ident, Pat, PathArguments, ReturnType, TraitItemFn, Type, TypePath,
    visit_mut::VisitMut,
};

use super::{
    SourceIndex,
    qualify::{Qualifier, generic_names},
};
use crate::{
    error::ResolveError,
    model::{MethodSignature, ModulePath, Parameter, Receiver, TypeRef},
};

pub(super) fn method_signature(
    index: &SourceIndex,
    module: &ModulePath,
    trait_generics: &BTreeSet<String>,
    item: &TraitItemFn,
) -> Result<MethodSignature, ResolveError> {
    let sig = &item.sig;
    let mut generics = sig.generics.clone();
    let mut names = trait_generics.clone();
    names.extend(generic_names(&generics));
    let mut qualifier = Qualifier::new(index, module, names);
    qualifier.visit_generics_mut(&mut generics);

    let mut used = BTreeSet::new();
    let mut parameters = vec![];
    let typed = sig.inputs.iter().filter_map(|arg| match arg {
        FnArg::Typed(arg) => Some(arg),
        FnArg::Receiver(_) => None,
    });
    for (i, arg) in typed.enumerate() {
        let name = match &*arg.pat {
            Pat::Ident(pat) if pat.subpat.is_none() && !used.contains(&pat.ident.to_string()) => {
                pat.ident.clone()
            }
            _ => synthesized_name(i, &used),
        };
        used.insert(name.to_string());
        let mut ty = (*arg.ty).clone();
        qualifier.visit_type_mut(&mut ty);
        parameters.push(Parameter::new(name, TypeRef::new(ty)));
    }

    let mut results = vec![];
    for (i, mut ty) in split_results(&sig.output).into_iter().enumerate() {
        qualifier.visit_type_mut(&mut ty);
        results.push(Parameter::new(format_ident!("r{i}"), TypeRef::new(ty)));
    }
    qualifier.finish()?;

    Ok(MethodSignature {
        name: sig.ident.clone(),
        receiver: sig.receiver().map_or(Receiver::None, receiver),
        asyncness: sig.asyncness.is_some(),
        unsafety: sig.unsafety.is_some(),
        abi: sig.abi.clone(),
        generics,
        parameters,
        results,
        cfg_attrs: item
            .attrs
            .iter()
            .filter(|attr| attr.path().is_ident("cfg"))
            .cloned()
            .collect(),
    })
}

/// `p<i>`, with underscores appended until it is unique.
fn synthesized_name(i: usize, used: &BTreeSet<String>) -> Ident {
    let mut name = format!("p{i}");
    while used.contains(&name) {
        name.push('_');
    }
    format_ident!("{name}")
}

/// `()` and no return type give no results, a tuple of two or more gives one per element.
fn split_results(output: &ReturnType) -> Vec<Type> {
    match output {
        ReturnType::Default => vec![],
        ReturnType::Type(_, ty) => match &**ty {
            Type::Tuple(tuple) if tuple.elems.is_empty() => vec![],
            Type::Tuple(tuple) if tuple.elems.len() >= 2 => tuple.elems.iter().cloned().collect(),
            ty => vec![ty.clone()],
        },
    }
}

fn receiver(receiver: &syn::Receiver) -> Receiver {
    if let Some((_, lifetime)) = &receiver.reference {
        return match receiver.mutability {
            Some(_) => Receiver::RefMut(lifetime.clone()),
            None => Receiver::Ref(lifetime.clone()),
        };
    }
    if receiver.colon_token.is_none() {
        return Receiver::Value;
    }
    match &*receiver.ty {
        ty if is_self(ty) => Receiver::Value,
        Type::Reference(reference) if is_self(&reference.elem) => match reference.mutability {
            Some(_) => Receiver::RefMut(reference.lifetime.clone()),
            None => Receiver::Ref(reference.lifetime.clone()),
        },
        Type::Path(path) if is_box_of_self(path) => Receiver::Boxed,
        other => Receiver::Unsupported(other.to_token_stream().to_string()),
    }
}

fn is_self(ty: &Type) -> bool {
    matches!(ty, Type::Path(p) if p.qself.is_none() && p.path.is_ident("Self"))
}

/// `Box<Self>`, `std::boxed::Box<Self>` or `alloc::boxed::Box<Self>`.
fn is_box_of_self(ty: &TypePath) -> bool {
    if ty.qself.is_some() {
        return false;
    }
    let segments: Vec<String> = ty.path.segments.iter().map(|s| s.ident.to_string()).collect();
    let boxed = match segments.as_slice() {
        [single] => single == "Box",
        [krate, module, name] => {
            matches!(krate.as_str(), "std" | "alloc") && module == "boxed" && name == "Box"
        }
        _ => false,
    };
    let Some(last) = ty.path.segments.last() else {
        return false;
    };
    let PathArguments::AngleBracketed(args) = &last.arguments else {
        return false;
    };
    boxed
        && args.args.len() == 1
        && matches!(args.args.first(), Some(GenericArgument::Type(inner)) if is_self(inner))
}
