// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! [`SourceIndex`], a [`TypeResolver`] over the module tree of one Cargo package.
//!
//! The index is purely syntactic. It knows the items declared in every module it could find and
//! the names each module imports, which is enough to turn every path in a trait signature into an
//! absolute one. It does not expand macros, evaluate `cfg` or look at dependencies.

mod interface;
mod qualify;
mod scope;
mod signature;

use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::{Path, PathBuf},
};

use proc_macro2::Span;
use quote::ToTokens;
use syn::{Expr, ExprLit, Item, ItemMod, Lit, Meta, MetaNameValue, ext::IdentExt, visit_mut::VisitMut};
use tracing::{debug, warn};

pub(crate) use self::qualify::mentions_bare_self;
use self::{
    qualify::Qualifier,
    scope::{DeclKind, Scope, Segments, declaration, is_crate_path},
};
use crate::{
    error::ResolveError,
    model::{ModulePath, TypeRef},
    resolve::{TypeDescriptor, TypeResolver},
};

/// How many `pub use` hops are followed before giving up on a name.
const MAX_REEXPORT_DEPTH: usize = 8;

#[derive(Debug)]
struct Module {
    items: Vec<Item>,
    scope: Scope,
}

/// Where the source files around a module live.
struct ModuleDir {
    /// `#[path]` attributes are relative to this directory.
    file_dir: PathBuf,
    /// `mod child;` is looked up in this directory.
    child_dir: PathBuf,
}

/// The parsed modules of one Cargo package.
#[derive(Debug)]
pub struct SourceIndex {
    crate_name: String,
    modules: BTreeMap<ModulePath, Module>,
}

impl SourceIndex {
    /// Parse the crate whose root module is `root_file` (usually `src/lib.rs`), following `mod`
    /// declarations into other files.
    ///
    /// A module whose file cannot be found is skipped with a warning, since it is most likely
    /// gated behind a `cfg` for another platform. A file that exists but does not parse is an
    /// error.
    pub fn load(
        crate_name: impl Into<String>,
        root_file: impl AsRef<Path>,
    ) -> Result<Self, ResolveError> {
        let root_file = root_file.as_ref();
        let mut index = Self::empty(crate_name.into());
        let items = parse_file(root_file)?;
        let dir = root_file.parent().map(Path::to_path_buf).unwrap_or_default();
        let dir = ModuleDir {
            file_dir: dir.clone(),
            child_dir: dir,
        };
        index.add_module(ModulePath::root(), items, Some(&dir))?;
        debug!(
            crate_name = %index.crate_name,
            modules = index.modules.len(),
            "loaded source index"
        );
        Ok(index)
    }

    /// Build an index from in-memory sources, keyed by module path (`"crate"`, `"crate::a"`).
    ///
    /// `mod a;` declarations are not followed; every file-backed module has to be listed. Inline
    /// modules are picked up as usual.
    pub fn from_sources<'a>(
        crate_name: impl Into<String>,
        sources: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, ResolveError> {
        let mut index = Self::empty(crate_name.into());
        for (module, source) in sources {
            let path = PathBuf::from(module);
            let Some(module) = ModulePath::parse(module) else {
                return Err(ResolveError::Parse {
                    path,
                    source: syn::Error::new(
                        Span::call_site(),
                        "expected a module path starting with `crate`",
                    ),
                });
            };
            let file =
                syn::parse_file(source).map_err(|source| ResolveError::Parse { path, source })?;
            index.add_module(module, file.items, None)?;
        }
        Ok(index)
    }

    fn empty(crate_name: String) -> Self {
        Self {
            crate_name,
            modules: BTreeMap::new(),
        }
    }

    /// The name the package is referred to by from other crates (`my_crate`).
    pub fn crate_name(&self) -> &str {
        &self.crate_name
    }

    /// Every module in the index, in path order.
    pub fn modules(&self) -> impl Iterator<Item = &ModulePath> {
        self.modules.keys()
    }

    /// Glob imports of `module` that point outside the crate, as `use` paths.
    ///
    /// Names they bring in cannot be resolved, so generated code has to import them too.
    pub fn external_globs(&self, module: &ModulePath) -> Vec<syn::Path> {
        let Some(scope) = self.scope(module) else {
            return vec![];
        };
        scope
            .external_globs()
            .filter(|glob| !glob.is_empty())
            .filter_map(|glob| syn::parse_str(&glob.join("::")).ok())
            .collect()
    }

    fn add_module(
        &mut self,
        module: ModulePath,
        items: Vec<Item>,
        dir: Option<&ModuleDir>,
    ) -> Result<(), ResolveError> {
        for item in &items {
            let Item::Mod(item_mod) = item else {
                continue;
            };
            let child = module.child(&item_mod.ident.to_string());
            let name = item_mod.ident.unraw().to_string();
            match (&item_mod.content, dir) {
                (Some((_, inner)), _) => {
                    let inner_dir = dir.map(|dir| ModuleDir {
                        file_dir: dir.child_dir.join(&name),
                        child_dir: dir.child_dir.join(&name),
                    });
                    self.add_module(child, inner.clone(), inner_dir.as_ref())?;
                }
                (None, Some(dir)) => {
                    let Some((file, child_dir)) = find_module_file(item_mod, &name, dir) else {
                        warn!(module = %child, "no source file found for module, skipping it");
                        continue;
                    };
                    let items = parse_file(&file)?;
                    self.add_module(child, items, Some(&child_dir))?;
                }
                // in-memory sources list their file modules separately
                (None, None) => {}
            }
        }
        let scope = Scope::new(&module, &items);
        self.modules.insert(module, Module { items, scope });
        Ok(())
    }

    pub(crate) fn scope(&self, module: &ModulePath) -> Option<&Scope> {
        self.modules.get(module).map(|m| &m.scope)
    }

    /// Look for `name` behind the crate-internal glob import `glob`, following glob re-exports.
    pub(crate) fn glob_lookup(&self, glob: &[String], name: &str) -> Option<Segments> {
        self.glob_lookup_at(glob, name, MAX_REEXPORT_DEPTH)
    }

    fn glob_lookup_at(&self, glob: &[String], name: &str, depth: usize) -> Option<Segments> {
        if !is_crate_path(glob) {
            return None;
        }
        // `use Enum::*` and friends land here too, and are simply not modules
        let scope = self.scope(&ModulePath::from_segments(glob.to_vec()))?;
        if scope.declared(name).is_some() {
            let mut path = glob.to_vec();
            path.push(name.to_owned());
            return Some(path);
        }
        if let Some(path) = scope.import(name) {
            return Some(path.clone());
        }
        if depth == 0 {
            return None;
        }
        scope
            .globs()
            .iter()
            .find_map(|inner| self.glob_lookup_at(inner, name, depth - 1))
    }

    /// Find the type declaration an absolute path points at, following re-exports.
    fn find_declaration(&self, mut segments: Segments) -> Option<(ModulePath, &Item)> {
        for _ in 0..=MAX_REEXPORT_DEPTH {
            let (name, module) = segments.split_last()?;
            if !is_crate_path(module) {
                return None;
            }
            let module = ModulePath::from_segments(module.to_vec());
            let entry = self.modules.get(&module)?;
            let item = entry.items.iter().find(|item| {
                declaration(item).is_some_and(|(declared, kind)| {
                    declared == *name && !matches!(kind, DeclKind::Value | DeclKind::Macro)
                })
            });
            if let Some(item) = item {
                return Some((module, item));
            }
            segments = self.glob_lookup(module.segments(), name)?;
        }
        None
    }

    /// [`TypeResolver::resolve`], with the depth of the supertrait chain that led here.
    fn describe(
        &self,
        scope: &ModulePath,
        path: &syn::Path,
        depth: usize,
    ) -> Result<TypeDescriptor, ResolveError> {
        let mut qualified = path.clone();
        let mut qualifier = Qualifier::new(self, scope, BTreeSet::new());
        qualifier.qualify_path(&mut qualified);
        qualifier.finish()?;

        let segments: Segments = qualified
            .segments
            .iter()
            .map(|s| s.ident.to_string())
            .collect();
        if qualified.leading_colon.is_some() || !is_crate_path(&segments) {
            return Err(ResolveError::UnresolvedType {
                module: scope.clone(),
                ty: path_text(path),
            });
        }
        let not_found = || ResolveError::NotFound {
            module: ModulePath::from_segments(segments[..segments.len() - 1].to_vec()),
            name: segments[segments.len() - 1].clone(),
        };
        if segments.len() < 2 {
            return Err(ResolveError::UnresolvedType {
                module: scope.clone(),
                ty: path_text(path),
            });
        }
        let Some((module, item)) = self.find_declaration(segments.clone()) else {
            return Err(not_found());
        };
        debug!(path = %path_text(path), %module, "resolved declaration");

        match item {
            Item::Trait(item_trait) => {
                interface::describe_trait(self, &module, item_trait, depth)
                    .map(TypeDescriptor::Interface)
            }
            Item::TraitAlias(alias) => Err(ResolveError::UnsupportedItem {
                interface: alias.ident.to_string(),
                item: "trait alias".to_owned(),
            }),
            Item::Struct(s) => Ok(TypeDescriptor::Struct(module.item_path(&s.ident))),
            Item::Enum(e) => Ok(TypeDescriptor::Enum(module.item_path(&e.ident))),
            Item::Union(u) => Ok(TypeDescriptor::Union(module.item_path(&u.ident))),
            Item::Type(alias) => {
                let mut ty = (*alias.ty).clone();
                let mut qualifier =
                    Qualifier::new(self, &module, qualify::generic_names(&alias.generics));
                qualifier.visit_type_mut(&mut ty);
                qualifier.finish()?;
                Ok(TypeDescriptor::Alias(TypeRef::new(ty)))
            }
            _ => Err(not_found()),
        }
    }
}

impl TypeResolver for SourceIndex {
    fn package(&self, package: &ModulePath) -> Option<&[Item]> {
        self.modules.get(package).map(|m| m.items.as_slice())
    }

    fn resolve(
        &self,
        scope: &ModulePath,
        path: &syn::Path,
    ) -> Result<TypeDescriptor, ResolveError> {
        self.describe(scope, path, 0)
    }
}

fn parse_file(path: &Path) -> Result<Vec<Item>, ResolveError> {
    let source = fs::read_to_string(path).map_err(|source| ResolveError::Io {
        path: path.to_owned(),
        source,
    })?;
    let file = syn::parse_file(&source).map_err(|source| ResolveError::Parse {
        path: path.to_owned(),
        source,
    })?;
    debug!(path = %path.display(), items = file.items.len(), "parsed source file");
    Ok(file.items)
}

/// The file holding `mod name;`, and the directories its own children live in.
fn find_module_file(item: &ItemMod, name: &str, dir: &ModuleDir) -> Option<(PathBuf, ModuleDir)> {
    if let Some(path) = path_attribute(item) {
        let file = dir.file_dir.join(path);
        let parent = file.parent().map(Path::to_path_buf).unwrap_or_default();
        return file.is_file().then(|| {
            (
                file,
                ModuleDir {
                    file_dir: parent.clone(),
                    child_dir: parent,
                },
            )
        });
    }

    let flat = dir.child_dir.join(format!("{name}.rs"));
    if flat.is_file() {
        return Some((
            flat,
            ModuleDir {
                file_dir: dir.child_dir.clone(),
                child_dir: dir.child_dir.join(name),
            },
        ));
    }
    let nested_dir = dir.child_dir.join(name);
    let nested = nested_dir.join("mod.rs");
    nested.is_file().then(|| {
        (
            nested,
            ModuleDir {
                file_dir: nested_dir.clone(),
                child_dir: nested_dir,
            },
        )
    })
}

fn path_attribute(item: &ItemMod) -> Option<String> {
    item.attrs
        .iter()
        .filter(|attr| attr.path().is_ident("path"))
        .find_map(|attr| match &attr.meta {
            Meta::NameValue(MetaNameValue {
                value:
                    Expr::Lit(ExprLit {
                        lit: Lit::Str(path),
                        ..
                    }),
                ..
            }) => Some(path.value()),
            _ => None,
        })
}

/// `a::b::C<T>` without the spaces token streams put everywhere.
pub(crate) fn path_text(path: &syn::Path) -> String {
    path.to_token_stream()
        .to_string()
        .replace(" :: ", "::")
        .replace(":: ", "::")
        .replace(" < ", "<")
        .replace(" >", ">")
        .replace(" ,", ",")
}
