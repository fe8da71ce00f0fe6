// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The normalized shape of a trait and its methods.
//!
//! Everything in here is plain data produced by a [`crate::TypeResolver`] and consumed by
//! [`crate::synth`]. Types are kept as [`syn`] trees that have already been qualified to absolute
//! paths, so the synthesis engine can reproduce them verbatim without ever looking inside.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use proc_macro2::TokenStream as Ts2;
use quote::{ToTokens, format_ident, quote};
use syn::{Abi, Attribute, Generics, Ident, Lifetime};

/// An absolute module path such as `crate::storage::sql`.
///
/// The first segment is always `crate`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModulePath(Vec<String>);

impl ModulePath {
    /// The crate root, `crate`.
    pub fn root() -> Self {
        Self(vec!["crate".to_owned()])
    }

    /// Parse `crate::a::b` (or `crate`). Returns `None` for anything not rooted at `crate`.
    pub fn parse(path: &str) -> Option<Self> {
        let segments: Vec<String> = path.split("::").map(|s| s.trim().to_owned()).collect();
        if segments.first().map(String::as_str) != Some("crate")
            || segments.iter().any(|s| s.is_empty())
        {
            return None;
        }
        Some(Self(segments))
    }

    /// Build a path from segments that already start with `crate`.
    pub(crate) fn from_segments(segments: Vec<String>) -> Self {
        debug_assert_eq!(segments.first().map(String::as_str), Some("crate"));
        Self(segments)
    }

    /// The path of the child module `name`.
    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.to_owned());
        Self(segments)
    }

    /// The parent module, or `None` at the crate root.
    pub fn parent(&self) -> Option<Self> {
        if self.0.len() <= 1 {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// The path's segments, `crate` first.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// The absolute path of `item` inside this module, as a token stream.
    pub fn item_path(&self, item: &Ident) -> syn::Path {
        let segments = self.0.iter().map(|s| format_ident!("{s}"));
        syn::parse_quote!(#(#segments::)* #item)
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("::"))
    }
}

/// An opaque reference to a type, already qualified to absolute paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef(syn::Type);

impl TypeRef {
    /// Wrap a type whose paths are already absolute.
    pub fn new(ty: syn::Type) -> Self {
        Self(ty)
    }

    /// The wrapped type.
    pub fn as_type(&self) -> &syn::Type {
        &self.0
    }
}

impl ToTokens for TypeRef {
    fn to_tokens(&self, tokens: &mut Ts2) {
        self.0.to_tokens(tokens);
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_token_stream())
    }
}

/// A named, typed parameter or result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Unique within the method.
    pub name: Ident,
    /// The declared type.
    pub ty: TypeRef,
}

impl Parameter {
    /// A parameter named `name` of type `ty`.
    pub fn new(name: Ident, ty: TypeRef) -> Self {
        Self { name, ty }
    }
}

/// How a method takes `self`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Receiver {
    /// `&self`, `&'a self` or `self: &Self`
    Ref(Option<Lifetime>),
    /// `&mut self`, `&'a mut self` or `self: &mut Self`
    RefMut(Option<Lifetime>),
    /// `self` or `self: Self`
    Value,
    /// `self: Box<Self>`
    Boxed,
    /// An associated function without a receiver.
    None,
    /// Any other typed receiver (`self: Rc<Self>`, `self: Pin<&mut Self>`, ...). Holds the
    /// receiver's source text for error reporting.
    Unsupported(String),
}

impl Receiver {
    /// Whether the generated method has an instance to record an observation against.
    pub fn is_timed(&self) -> bool {
        matches!(
            self,
            Receiver::Ref(_) | Receiver::RefMut(_) | Receiver::Value | Receiver::Boxed
        )
    }

    /// Whether the generated body has to take `self` apart before forwarding.
    pub fn consumes_self(&self) -> bool {
        matches!(self, Receiver::Value | Receiver::Boxed)
    }
}

/// The shape of one trait method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    /// Unique within the owning trait.
    pub name: Ident,
    /// How `self` is taken.
    pub receiver: Receiver,
    /// `async fn`
    pub asyncness: bool,
    /// `unsafe fn`
    pub unsafety: bool,
    /// `extern "C" fn` and the like.
    pub abi: Option<Abi>,
    /// Method generics with their where-clause, qualified.
    pub generics: Generics,
    /// Parameters after the receiver, in order. Patterns other than plain identifiers are
    /// renamed `p<index>`.
    pub parameters: Vec<Parameter>,
    /// One entry per returned value, named `r0`, `r1`, ... A tuple return type of two or more
    /// elements is split; `()` gives none.
    pub results: Vec<Parameter>,
    /// `#[cfg(..)]` attributes of the declaration.
    pub cfg_attrs: Vec<Attribute>,
}

impl MethodSignature {
    /// A plain `&self` method with no generics. Mostly useful for building descriptors by hand.
    pub fn new(name: Ident, parameters: Vec<Parameter>, results: Vec<Parameter>) -> Self {
        Self {
            name,
            receiver: Receiver::Ref(None),
            asyncness: false,
            unsafety: false,
            abi: None,
            generics: Generics::default(),
            parameters,
            results,
            cfg_attrs: vec![],
        }
    }

    /// The declared return type, rebuilt from [`Self::results`].
    pub fn return_type(&self) -> Ts2 {
        match self.results.as_slice() {
            [] => quote!(),
            [single] => {
                let ty = &single.ty;
                quote!(-> #ty)
            }
            many => {
                let types = many.iter().map(|r| &r.ty);
                quote!(-> (#(#types),*))
            }
        }
    }
}

/// An associated item declared by a trait, defined by the decorator as a projection through the
/// wrapped type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssociatedItem {
    /// `type Item;`, including generic associated types and their where-clause.
    Type {
        /// The associated type's name.
        name: Ident,
        /// Its own generics, for generic associated types.
        generics: Generics,
    },
    /// `const NAME: T;`
    Const {
        /// The constant's name.
        name: Ident,
        /// Its declared type.
        ty: TypeRef,
    },
}

impl AssociatedItem {
    /// The declared name.
    pub fn name(&self) -> &Ident {
        match self {
            AssociatedItem::Type { name, .. } | AssociatedItem::Const { name, .. } => name,
        }
    }
}

/// Everything needed to render a decorator for one trait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDescriptor {
    /// Module declaring the trait.
    pub package_path: ModulePath,
    /// The trait's name.
    pub name: Ident,
    /// Trait generics with the where-clause left after removing `Self` bounds, qualified.
    pub generics: Generics,
    /// `unsafe trait`, which makes every generated impl an `unsafe impl`.
    pub unsafety: bool,
    /// Methods keyed by name. Iteration order is the generation order.
    pub methods: BTreeMap<String, MethodSignature>,
    /// Associated types and consts, sorted by name.
    pub associated: Vec<AssociatedItem>,
    /// Supertraits found in the same index, flattened and ordered by path.
    pub supertraits: Vec<InterfaceDescriptor>,
    /// Supertraits satisfied by deriving them on the decorator (`Clone`, `Debug`).
    pub derives: BTreeSet<String>,
}

impl InterfaceDescriptor {
    /// A trait without generics, methods or supertraits.
    pub fn new(package_path: ModulePath, name: Ident) -> Self {
        Self {
            package_path,
            name,
            generics: Generics::default(),
            unsafety: false,
            methods: BTreeMap::new(),
            associated: vec![],
            supertraits: vec![],
            derives: BTreeSet::new(),
        }
    }

    /// Insert a method, keyed by its name.
    pub fn with_method(mut self, method: MethodSignature) -> Self {
        self.methods.insert(method.name.to_string(), method);
        self
    }

    /// The number of methods the decorator has to forward, supertraits included.
    pub fn method_count(&self) -> usize {
        self.methods.len()
            + self
                .supertraits
                .iter()
                .map(|s| s.methods.len())
                .sum::<usize>()
    }

    /// The absolute path of the trait.
    pub fn path(&self) -> syn::Path {
        self.package_path.item_path(&self.name)
    }
}
