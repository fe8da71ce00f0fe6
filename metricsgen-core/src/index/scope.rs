// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Names visible in one module: its own declarations, its `use` imports and its glob imports.

use std::collections::BTreeMap;

use syn::{Item, UseTree};

use crate::model::ModulePath;

/// The kind of an item declared directly in a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeclKind {
    Trait,
    Struct,
    Enum,
    Union,
    TypeAlias,
    Module,
    Value,
    Macro,
}

/// Names that are always in scope and never need qualifying.
const PRELUDE: &[&str] = &[
    // primitives
    "bool", "char", "str", "u8", "u16", "u32", "u64", "u128", "usize", "i8", "i16", "i32", "i64",
    "i128", "isize", "f32", "f64",
    // std prelude types
    "Box", "Option", "Result", "String", "Vec", "Some", "None", "Ok", "Err",
    // std prelude traits
    "Send", "Sync", "Sized", "Unpin", "Copy", "Clone", "Default", "Drop", "Eq", "PartialEq",
    "Ord", "PartialOrd", "Fn", "FnMut", "FnOnce", "AsRef", "AsMut", "From", "Into", "TryFrom",
    "TryInto", "Iterator", "IntoIterator", "DoubleEndedIterator", "ExactSizeIterator", "Extend",
    "FromIterator", "ToOwned", "ToString", "Future", "IntoFuture",
    // crate roots that are always available
    "std", "core", "alloc",
];

pub(crate) fn is_prelude(name: &str) -> bool {
    PRELUDE.contains(&name)
}

/// Path segments as written in a `use` item or a type, before normalization.
pub(crate) type Segments = Vec<String>;

#[derive(Debug, Default)]
pub(crate) struct Scope {
    declared: BTreeMap<String, DeclKind>,
    /// local name -> absolute path. Crate-internal paths start with `crate`, anything else is an
    /// external crate path.
    imports: BTreeMap<String, Segments>,
    globs: Vec<Segments>,
}

impl Scope {
    pub(crate) fn new(module: &ModulePath, items: &[Item]) -> Self {
        let mut scope = Scope::default();
        for item in items {
            if let Some((name, kind)) = declaration(item) {
                scope.declared.insert(name, kind);
            }
        }
        for item in items {
            match item {
                Item::Use(item_use) => {
                    let mut flat = vec![];
                    flatten_use_tree(vec![], &item_use.tree, &mut flat);
                    let leading_colon = item_use.leading_colon.is_some();
                    for entry in flat {
                        match entry {
                            UseEntry::Name { local, path } => {
                                let path = scope.normalize(module, path, leading_colon);
                                scope.imports.insert(local, path);
                            }
                            UseEntry::Glob(prefix) => {
                                let prefix = scope.normalize(module, prefix, leading_colon);
                                scope.globs.push(prefix);
                            }
                        }
                    }
                }
                Item::ExternCrate(extern_crate) => {
                    if let Some((_, rename)) = &extern_crate.rename {
                        scope
                            .imports
                            .insert(rename.to_string(), vec![extern_crate.ident.to_string()]);
                    }
                }
                _ => {}
            }
        }
        scope
    }

    pub(crate) fn declared(&self, name: &str) -> Option<DeclKind> {
        self.declared.get(name).copied()
    }

    pub(crate) fn import(&self, name: &str) -> Option<&Segments> {
        self.imports.get(name)
    }

    pub(crate) fn globs(&self) -> &[Segments] {
        &self.globs
    }

    /// Glob imports from outside the crate. Names they bring in cannot be resolved, only carried.
    pub(crate) fn external_globs(&self) -> impl Iterator<Item = &Segments> {
        self.globs.iter().filter(|g| !is_crate_path(g))
    }

    /// Turn a path written in this module into an absolute one.
    ///
    /// `self::`, `super::` and names declared in this module are made relative to `crate`; paths
    /// starting with anything else are taken to be external crate paths and kept as they are.
    pub(crate) fn normalize(
        &self,
        module: &ModulePath,
        path: Segments,
        leading_colon: bool,
    ) -> Segments {
        if leading_colon || path.is_empty() {
            return path;
        }
        let head = path[0].clone();
        match head.as_str() {
            "crate" => path,
            "self" => join(module.segments(), &path[1..]),
            "super" => {
                let mut base = module.clone();
                let mut rest = &path[..];
                while let Some(first) = rest.first()
                    && first == "super"
                {
                    base = base.parent().unwrap_or_else(ModulePath::root);
                    rest = &rest[1..];
                }
                join(base.segments(), rest)
            }
            first if self.declared.contains_key(first) => join(module.segments(), &path),
            _ => path,
        }
    }
}

pub(crate) fn is_crate_path(path: &[String]) -> bool {
    path.first().map(String::as_str) == Some("crate")
}

fn join(base: &[String], rest: &[String]) -> Segments {
    base.iter().chain(rest).cloned().collect()
}

pub(crate) fn declaration(item: &Item) -> Option<(String, DeclKind)> {
    let (ident, kind) = match item {
        Item::Trait(i) => (&i.ident, DeclKind::Trait),
        Item::TraitAlias(i) => (&i.ident, DeclKind::Trait),
        Item::Struct(i) => (&i.ident, DeclKind::Struct),
        Item::Enum(i) => (&i.ident, DeclKind::Enum),
        Item::Union(i) => (&i.ident, DeclKind::Union),
        Item::Type(i) => (&i.ident, DeclKind::TypeAlias),
        Item::Mod(i) => (&i.ident, DeclKind::Module),
        Item::Const(i) => (&i.ident, DeclKind::Value),
        Item::Static(i) => (&i.ident, DeclKind::Value),
        Item::Fn(i) => (&i.sig.ident, DeclKind::Value),
        Item::Macro(i) => (i.ident.as_ref()?, DeclKind::Macro),
        _ => return None,
    };
    Some((ident.to_string(), kind))
}

enum UseEntry {
    Name { local: String, path: Segments },
    Glob(Segments),
}

fn flatten_use_tree(prefix: Segments, tree: &UseTree, out: &mut Vec<UseEntry>) {
    match tree {
        UseTree::Path(p) => {
            let mut prefix = prefix;
            prefix.push(p.ident.to_string());
            flatten_use_tree(prefix, &p.tree, out);
        }
        UseTree::Name(n) => {
            let name = n.ident.to_string();
            if name == "self" {
                // `use a::b::{self}` imports `b`
                if let Some(last) = prefix.last().cloned() {
                    out.push(UseEntry::Name {
                        local: last,
                        path: prefix,
                    });
                }
            } else {
                let mut path = prefix;
                path.push(name.clone());
                out.push(UseEntry::Name { local: name, path });
            }
        }
        UseTree::Rename(r) => {
            let local = r.rename.to_string();
            // `use Trait as _` brings methods into scope, not a name
            if local == "_" {
                return;
            }
            let mut path = prefix;
            if r.ident != "self" {
                path.push(r.ident.to_string());
            }
            out.push(UseEntry::Name { local, path });
        }
        UseTree::Glob(_) => out.push(UseEntry::Glob(prefix)),
        UseTree::Group(g) => {
            for tree in &g.items {
                flatten_use_tree(prefix.clone(), tree, out);
            }
        }
    }
}
