// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Rewrites the paths in a signature so they mean the same thing from any module.

use std::collections::BTreeSet;

use proc_macro2::Span;
use syn::{
    ExprPath, Generics, Ident, Path, PathArguments, PathSegment, TraitBound, TypePath,
    punctuated::Punctuated,
    visit_mut::{self, VisitMut},
};

use super::SourceIndex;
use super::scope::{DeclKind, Segments, is_crate_path, is_prelude};
use crate::{error::ResolveError, model::ModulePath};

/// Generic parameter names of `generics`, which must never be qualified.
pub(crate) fn generic_names(generics: &Generics) -> BTreeSet<String> {
    generics
        .type_params()
        .map(|p| p.ident.to_string())
        .chain(generics.const_params().map(|p| p.ident.to_string()))
        .collect()
}

pub(crate) struct Qualifier<'a> {
    index: &'a SourceIndex,
    module: &'a ModulePath,
    generics: BTreeSet<String>,
    error: Option<ResolveError>,
}

impl<'a> Qualifier<'a> {
    pub(crate) fn new(
        index: &'a SourceIndex,
        module: &'a ModulePath,
        generics: BTreeSet<String>,
    ) -> Self {
        Self {
            index,
            module,
            generics,
            error: None,
        }
    }

    /// The first failure seen while visiting, if any.
    pub(crate) fn finish(self) -> Result<(), ResolveError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Qualify a path that names an item, along with any generic arguments it carries.
    pub(crate) fn qualify_path(&mut self, path: &mut Path) {
        self.qualify(path);
        visit_mut::visit_path_mut(self, path);
    }

    /// Qualify `path` in place, returning how many segments were added in front of it.
    fn qualify(&mut self, path: &mut Path) -> usize {
        if self.error.is_some() || path.leading_colon.is_some() || path.segments.is_empty() {
            return 0;
        }
        let first = path.segments[0].ident.to_string();
        if first == "Self" || first == "crate" || self.generics.contains(&first) {
            return 0;
        }

        // how many leading segments the replacement stands for
        let (replacement, consumed) = match first.as_str() {
            "self" => (self.module.segments().to_vec(), 1),
            "super" => {
                let mut base = self.module.clone();
                let mut consumed = 0;
                while consumed < path.segments.len() && path.segments[consumed].ident == "super" {
                    base = base.parent().unwrap_or_else(ModulePath::root);
                    consumed += 1;
                }
                (base.segments().to_vec(), consumed)
            }
            _ => match self.lookup(&first, path.segments.len()) {
                Ok(Some(replacement)) => (replacement, 1),
                Ok(None) => return 0,
                Err(err) => {
                    self.error = Some(err);
                    return 0;
                }
            },
        };

        let original = std::mem::take(&mut path.segments);
        let mut rest = original.into_iter();
        // the arguments of the replaced segment move to the last replacement segment
        let mut replaced_args = PathArguments::None;
        for (i, segment) in rest.by_ref().take(consumed).enumerate() {
            if i + 1 == consumed {
                replaced_args = segment.arguments;
            }
        }

        let mut segments = Punctuated::<PathSegment, syn::Token![::]>::new();
        let count = replacement.len();
        for (i, name) in replacement.iter().enumerate() {
            let mut segment = PathSegment::from(ident(name));
            if i + 1 == count && consumed == 1 {
                segment.arguments = std::mem::replace(&mut replaced_args, PathArguments::None);
            }
            segments.push(segment);
        }
        segments.extend(rest);
        path.segments = segments;

        count.saturating_sub(consumed)
    }

    /// Where does `name`, the first segment of a path of `len` segments, come from?
    ///
    /// `Ok(None)` means "leave the path alone".
    fn lookup(&self, name: &str, len: usize) -> Result<Option<Segments>, ResolveError> {
        let scope = self.index.scope(self.module);
        if let Some(scope) = scope {
            if scope.declared(name).is_some() {
                return Ok(Some(join(self.module.segments(), name)));
            }
            if let Some(path) = scope.import(name) {
                return Ok(Some(path.clone()));
            }
            for glob in scope.globs().iter().filter(|g| is_crate_path(g)) {
                if let Some(found) = self.index.glob_lookup(glob, name) {
                    return Ok(Some(found));
                }
            }
        }
        if is_prelude(name) || len > 1 {
            // prelude names and external crate paths are valid anywhere
            return Ok(None);
        }
        if scope.is_some_and(|s| s.external_globs().next().is_some()) {
            // probably brought in by an external glob; the generated file carries those imports
            return Ok(None);
        }
        Err(ResolveError::UnresolvedType {
            module: self.module.clone(),
            ty: name.to_owned(),
        })
    }
}

impl VisitMut for Qualifier<'_> {
    fn visit_type_path_mut(&mut self, ty: &mut TypePath) {
        if let Some(qself) = &mut ty.qself {
            self.visit_type_mut(&mut qself.ty);
        }
        let added = self.qualify(&mut ty.path);
        if let Some(qself) = &mut ty.qself {
            // `<T as a::Trait>::Item`: the trait part got longer
            qself.position += added;
        }
        visit_mut::visit_path_mut(self, &mut ty.path);
    }

    fn visit_trait_bound_mut(&mut self, bound: &mut TraitBound) {
        if let Some(lifetimes) = &mut bound.lifetimes {
            self.visit_bound_lifetimes_mut(lifetimes);
        }
        self.qualify(&mut bound.path);
        visit_mut::visit_path_mut(self, &mut bound.path);
    }

    fn visit_expr_path_mut(&mut self, expr: &mut ExprPath) {
        // array lengths and const generic arguments
        if expr.qself.is_none()
            && let Some(first) = expr.path.segments.first()
            && self
                .index
                .scope(self.module)
                .and_then(|s| s.declared(&first.ident.to_string()))
                == Some(DeclKind::Value)
        {
            self.qualify(&mut expr.path);
        }
        visit_mut::visit_expr_path_mut(self, expr);
    }
}

fn ident(name: &str) -> Ident {
    match name.strip_prefix("r#") {
        Some(raw) => Ident::new_raw(raw, Span::call_site()),
        None => Ident::new(name, Span::call_site()),
    }
}

fn join(base: &[String], name: &str) -> Segments {
    let mut path = base.to_vec();
    path.push(name.to_owned());
    path
}

/// Whether `ty` mentions `Self` on its own (not as `Self::Assoc`).
pub(crate) fn mentions_bare_self(ty: &syn::Type) -> bool {
    struct BareSelf(bool);
    impl<'ast> syn::visit::Visit<'ast> for BareSelf {
        fn visit_type_path(&mut self, ty: &'ast TypePath) {
            if ty.qself.is_none() && ty.path.segments.len() == 1 && ty.path.is_ident("Self") {
                self.0 = true;
            }
            syn::visit::visit_type_path(self, ty);
        }
    }
    let mut visitor = BareSelf(false);
    syn::visit::Visit::visit_type(&mut visitor, ty);
    visitor.0
}
