// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::collections::{BTreeMap, BTreeSet};

use proc_macro2::{Span, TokenStream as Ts2};
use quote::{format_ident, quote};
use syn::{
    Ident, LitStr, Type, TypeImplTrait, UseTree, Visibility, ext::IdentExt, parse_quote,
    visit::Visit,
    visit_mut::{self, VisitMut},
};

use super::GenerationRequest;
use crate::{
    VERSION,
    error::SynthesisError,
    index::mentions_bare_self,
    model::{AssociatedItem, InterfaceDescriptor, MethodSignature, Receiver},
    naming,
};

/// Names the generated file imports, which a trait can therefore not be imported as.
const IMPORTED: &[&str] = &[
    "Arc",
    "Instant",
    "Deferred",
    "LatencyCollector",
    "Registerer",
    "RegistrationError",
];

/// Locals a by-value forwarding method declares.
const CONSUMING_LOCALS: &[&str] = &["_defer", "next", "collector", "instance_name"];

/// Locals a by-reference forwarding method declares.
const BORROWING_LOCALS: &[&str] = &["_defer"];

/// Everything [`super::generate`] renders, decided up front.
///
/// Building the model validates the descriptor, so rendering a model only fails if the produced
/// tokens turn out not to be valid Rust.
#[derive(Debug)]
pub struct DecoratorModel {
    interface: InterfaceDescriptor,
    struct_ident: Ident,
    collector_fn: Ident,
    /// The wrapped type's generic parameter.
    next: Ident,
    runtime: syn::Path,
    /// Trait names that are imported and used unqualified.
    imported_traits: BTreeSet<String>,
    source_crate: Option<Ident>,
    glob_imports: Vec<syn::Path>,
}

impl DecoratorModel {
    /// Validate `descriptor` and settle every name the decorator uses.
    pub fn new(
        descriptor: &InterfaceDescriptor,
        request: &GenerationRequest,
    ) -> Result<Self, SynthesisError> {
        let interface_name = descriptor.name.to_string();
        if descriptor.method_count() == 0 {
            return Err(SynthesisError::EmptyInterface {
                interface: interface_name,
            });
        }
        for interface in interfaces(descriptor) {
            for method in interface.methods.values() {
                check_signature(interface, method)?;
            }
        }

        let render_error = |source| SynthesisError::Render {
            interface: interface_name.clone(),
            source,
        };
        let struct_ident: Ident = syn::parse_str(&request.struct_name).map_err(render_error)?;
        let collector_fn: Ident =
            syn::parse_str(&naming::collector_fn_name(&request.struct_name)).map_err(render_error)?;
        let runtime: syn::Path = syn::parse_str(&request.runtime_crate).map_err(render_error)?;
        let source_crate: Option<Ident> = request
            .source_crate
            .as_deref()
            .map(syn::parse_str::<Ident>)
            .transpose()
            .map_err(render_error)?;

        Ok(Self {
            next: next_ident(descriptor, &request.struct_name),
            imported_traits: imported_traits(descriptor, &request.struct_name),
            interface: descriptor.clone(),
            struct_ident,
            collector_fn,
            runtime,
            source_crate,
            glob_imports: request.glob_imports.clone(),
        })
    }

    /// Whether any method records an observation.
    fn is_timed(&self) -> bool {
        interfaces(&self.interface)
            .flat_map(|i| i.methods.values())
            .any(|m| m.receiver.is_timed())
    }

    /// The formatted source file, header comment included.
    pub fn render(&self) -> Result<String, SynthesisError> {
        let render_error = |source| SynthesisError::Render {
            interface: self.interface.name.to_string(),
            source,
        };

        let trait_imports = self.generate_trait_imports();
        let decorator = self.generate_struct();
        let collector_fn = self.generate_collector_fn();
        let inherent = self.generate_inherent_impl();
        let trait_impls = interfaces(&self.interface).map(|i| self.generate_trait_impl(i));
        let body = quote! {
            #trait_imports
            #decorator
            #collector_fn
            #inherent
            #(#trait_impls)*
        };

        let mut file: syn::File = syn::parse2(body).map_err(render_error)?;
        if let Some(krate) = &self.source_crate {
            RebaseCrate { krate }.visit_file_mut(&mut file);
        }
        let mut imports: syn::File = syn::parse2(self.generate_imports()).map_err(render_error)?;
        imports.items.append(&mut file.items);
        file.items = imports.items;

        Ok(format!("{}{}", self.header(), prettyplease::unparse(&file)))
    }

    fn header(&self) -> String {
        let module = match &self.source_crate {
            Some(krate) => {
                let mut segments = self.interface.package_path.segments().to_vec();
                segments[0] = krate.to_string();
                segments.join("::")
            }
            None => self.interface.package_path.to_string(),
        };
        format!(
            "// Code generated by metricsgen v{VERSION}. DO NOT EDIT.\n\
             // The original trait `{}` can be found in `{module}`.\n\n",
            self.interface.name
        )
    }

    fn generate_imports(&self) -> Ts2 {
        let runtime = &self.runtime;
        let globs = &self.glob_imports;
        if self.is_timed() {
            quote! {
                use std::sync::Arc;
                use std::time::Instant;

                use #runtime::{Deferred, LatencyCollector, Registerer, RegistrationError};
                #(use #globs::*;)*
            }
        } else {
            quote! {
                use std::sync::Arc;

                use #runtime::{LatencyCollector, Registerer, RegistrationError};
                #(use #globs::*;)*
            }
        }
    }

    fn generate_trait_imports(&self) -> Ts2 {
        let paths = interfaces(&self.interface)
            .filter(|i| self.imported_traits.contains(&i.name.to_string()))
            .map(InterfaceDescriptor::path);
        quote! { #(use #paths;)* }
    }

    fn trait_path(&self, interface: &InterfaceDescriptor) -> syn::Path {
        if self.imported_traits.contains(&interface.name.to_string()) {
            interface.name.clone().into()
        } else {
            interface.path()
        }
    }

    fn generate_struct(&self) -> Ts2 {
        let name = &self.struct_ident;
        let next = &self.next;
        let doc = format!(
            " Wraps a `{}`, recording the latency of every call made through it.",
            self.interface.name
        );
        let derives = self.interface.derives.iter().map(|d| format_ident!("{d}"));
        let derive = (!self.interface.derives.is_empty()).then(|| quote!(#[derive(#(#derives),*)]));
        // with only associated functions nothing reads the collector
        let allow = (!self.is_timed()).then(|| quote!(#[allow(dead_code)]));
        quote! {
            #[doc = #doc]
            #derive
            #allow
            pub struct #name<#next> {
                next: #next,
                collector: Arc<LatencyCollector>,
                instance_name: String,
            }
        }
    }

    fn generate_collector_fn(&self) -> Ts2 {
        let name = &self.collector_fn;
        let doc = format!(
            " Creates the collector shared by `{}` instances and registers it with `registerer`.",
            self.struct_ident
        );
        quote! {
            #[doc = #doc]
            pub fn #name(
                registerer: &dyn Registerer,
                metric_name: &str,
            ) -> Result<Arc<LatencyCollector>, RegistrationError> {
                let collector = Arc::new(LatencyCollector::new(
                    metric_name,
                    metric_name,
                    &["instance_name", "method"],
                ));
                registerer.register(Arc::clone(&collector))?;
                Ok(collector)
            }
        }
    }

    fn generate_inherent_impl(&self) -> Ts2 {
        let name = &self.struct_ident;
        let next = &self.next;
        let observe = self.is_timed().then(|| {
            quote! {
                fn observe(
                    collector: &LatencyCollector,
                    instance_name: &str,
                    method: &str,
                    started_at: Instant,
                ) {
                    collector.observe(&[instance_name, method], started_at.elapsed());
                }
            }
        });
        quote! {
            impl<#next> #name<#next> {
                /// Wraps `next`, recording its calls in `collector` under `instance_name`.
                pub fn with_collector(
                    next: #next,
                    instance_name: impl Into<String>,
                    collector: Arc<LatencyCollector>,
                ) -> Self {
                    Self {
                        next,
                        collector,
                        instance_name: instance_name.into(),
                    }
                }

                #observe
            }
        }
    }

    fn generate_trait_impl(&self, interface: &InterfaceDescriptor) -> Ts2 {
        let name = &self.struct_ident;
        let next = &self.next;
        let trait_path = self.trait_path(interface);
        let (_, trait_generics, _) = interface.generics.split_for_impl();
        let trait_ref = quote!(#trait_path #trait_generics);

        let mut generics = interface.generics.clone();
        generics.params.push(parse_quote!(#next));
        generics
            .make_where_clause()
            .predicates
            .push(parse_quote!(#next: #trait_ref));
        let (impl_generics, _, where_clause) = generics.split_for_impl();

        let unsafety = interface.unsafety.then(|| quote!(unsafe));
        let associated = interface
            .associated
            .iter()
            .map(|item| generate_associated_item(item, next, &trait_ref));
        let methods = interface
            .methods
            .values()
            .map(|method| self.generate_method(method, &trait_ref));

        quote! {
            #unsafety impl #impl_generics #trait_ref for #name<#next> #where_clause {
                #(#associated)*
                #(#methods)*
            }
        }
    }

    fn generate_method(&self, method: &MethodSignature, trait_ref: &Ts2) -> Ts2 {
        let name = &method.name;
        let next = &self.next;
        let params = parameter_names(method);

        let receiver = match &method.receiver {
            Receiver::Ref(lifetime) => Some(quote!(&#lifetime self)),
            Receiver::RefMut(lifetime) => Some(quote!(&#lifetime mut self)),
            Receiver::Value => Some(quote!(self)),
            Receiver::Boxed => Some(quote!(self: Box<Self>)),
            Receiver::None | Receiver::Unsupported(_) => None,
        };
        let types = method.parameters.iter().map(|p| &p.ty);
        let inputs = receiver
            .into_iter()
            .chain(params.iter().zip(types).map(|(param, ty)| quote!(#param: #ty)));

        let self_arg = match &method.receiver {
            Receiver::Ref(_) => Some(quote!(&self.next)),
            Receiver::RefMut(_) => Some(quote!(&mut self.next)),
            Receiver::Value => Some(quote!(next)),
            Receiver::Boxed => Some(quote!(Box::new(next))),
            Receiver::None | Receiver::Unsupported(_) => None,
        };
        let args = self_arg.into_iter().chain(params.iter().map(|p| quote!(#p)));
        let turbofish = turbofish(method);
        let mut call = quote!(<#next as #trait_ref>::#name #turbofish(#(#args),*));
        if method.unsafety {
            call = quote!(unsafe { #call });
        }
        if method.asyncness {
            call = quote!(#call.await);
        }
        let call = if method.results.is_empty() {
            quote!(#call;)
        } else {
            call
        };

        let destructure = match &method.receiver {
            Receiver::Value => Some(quote!(let Self { next, collector, instance_name } = self;)),
            Receiver::Boxed => Some(quote!(let Self { next, collector, instance_name } = *self;)),
            _ => None,
        };
        let defer = method.receiver.is_timed().then(|| {
            let method_name = LitStr::new(&name.unraw().to_string(), Span::call_site());
            let (collector, instance_name) = if method.receiver.consumes_self() {
                (quote!(&collector), quote!(&instance_name))
            } else {
                (quote!(&self.collector), quote!(&self.instance_name))
            };
            quote! {
                let _defer = Deferred::new(Instant::now(), |started_at| {
                    Self::observe(#collector, #instance_name, #method_name, started_at)
                });
            }
        });

        let cfg_attrs = &method.cfg_attrs;
        let asyncness = method.asyncness.then(|| quote!(async));
        let unsafety = method.unsafety.then(|| quote!(unsafe));
        let abi = &method.abi;
        let generics = &method.generics;
        let where_clause = &method.generics.where_clause;
        let output = method.return_type();
        quote! {
            #(#cfg_attrs)*
            #asyncness #unsafety #abi fn #name #generics(#(#inputs),*) #output #where_clause {
                #destructure
                #defer
                #call
            }
        }
    }
}

/// The trait itself, then its flattened supertraits.
fn interfaces(descriptor: &InterfaceDescriptor) -> impl Iterator<Item = &InterfaceDescriptor> {
    std::iter::once(descriptor).chain(descriptor.supertraits.iter())
}

fn check_signature(
    interface: &InterfaceDescriptor,
    method: &MethodSignature,
) -> Result<(), SynthesisError> {
    let unsupported = |reason: String| SynthesisError::UnsupportedSignature {
        interface: interface.name.to_string(),
        method: method.name.to_string(),
        reason,
    };
    if let Receiver::Unsupported(ty) = &method.receiver {
        return Err(unsupported(format!("receiver type `{ty}` is not supported")));
    }
    if let Some(param) = method
        .parameters
        .iter()
        .find(|p| mentions_bare_self(p.ty.as_type()))
    {
        return Err(unsupported(format!(
            "parameter `{}` mentions `Self`, which the wrapped type cannot accept",
            param.name
        )));
    }
    if method.results.iter().any(|r| mentions_bare_self(r.ty.as_type())) {
        return Err(unsupported(
            "the return type mentions `Self`, which the wrapped type cannot produce".to_owned(),
        ));
    }
    Ok(())
}

/// `Next`, unless the trait already uses that name; then `Next0`, `Next1`, ...
fn next_ident(descriptor: &InterfaceDescriptor, struct_name: &str) -> Ident {
    let mut taken = BTreeSet::from([struct_name.to_owned()]);
    for interface in interfaces(descriptor) {
        taken.insert(interface.name.to_string());
        taken.extend(generic_idents(&interface.generics));
        for method in interface.methods.values() {
            taken.extend(generic_idents(&method.generics));
        }
    }

    let mut next = "Next".to_owned();
    let mut i = 0;
    while taken.contains(&next) {
        next = format!("Next{i}");
        i += 1;
    }
    format_ident!("{next}")
}

fn generic_idents(generics: &syn::Generics) -> impl Iterator<Item = String> + '_ {
    generics
        .type_params()
        .map(|p| p.ident.to_string())
        .chain(generics.const_params().map(|p| p.ident.to_string()))
}

/// Traits that can be imported by name without clashing with anything else in the file.
fn imported_traits(descriptor: &InterfaceDescriptor, struct_name: &str) -> BTreeSet<String> {
    let mut counts = BTreeMap::<String, usize>::new();
    for interface in interfaces(descriptor) {
        *counts.entry(interface.name.to_string()).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(name, count)| {
            *count == 1 && name != struct_name && !IMPORTED.contains(&name.as_str())
        })
        .map(|(name, _)| name)
        .collect()
}

/// The names parameters are passed under. Names that would clash with the generated locals are
/// replaced with `p<index>`.
fn parameter_names(method: &MethodSignature) -> Vec<Ident> {
    let reserved = match method.receiver {
        Receiver::Value | Receiver::Boxed => CONSUMING_LOCALS,
        Receiver::Ref(_) | Receiver::RefMut(_) => BORROWING_LOCALS,
        Receiver::None | Receiver::Unsupported(_) => &[],
    };
    let mut used: BTreeSet<String> = method
        .parameters
        .iter()
        .map(|p| p.name.unraw().to_string())
        .collect();
    method
        .parameters
        .iter()
        .enumerate()
        .map(|(i, p)| {
            if !reserved.contains(&p.name.unraw().to_string().as_str()) {
                return p.name.clone();
            }
            let mut name = format!("p{i}");
            while used.contains(&name) || reserved.contains(&name.as_str()) {
                name.push('_');
            }
            used.insert(name.clone());
            format_ident!("{name}")
        })
        .collect()
}

/// `::<T, N>` for methods with type or const parameters, unless `impl Trait` arguments forbid it.
fn turbofish(method: &MethodSignature) -> Option<Ts2> {
    let args: Vec<&Ident> = method
        .generics
        .type_params()
        .map(|p| &p.ident)
        .chain(method.generics.const_params().map(|p| &p.ident))
        .collect();
    if args.is_empty()
        || method
            .parameters
            .iter()
            .any(|p| contains_impl_trait(p.ty.as_type()))
    {
        return None;
    }
    Some(quote!(::<#(#args),*>))
}

fn contains_impl_trait(ty: &Type) -> bool {
    struct Finder(bool);
    impl<'ast> Visit<'ast> for Finder {
        fn visit_type_impl_trait(&mut self, _: &'ast TypeImplTrait) {
            self.0 = true;
        }
    }
    let mut finder = Finder(false);
    finder.visit_type(ty);
    finder.0
}

fn generate_associated_item(item: &AssociatedItem, next: &Ident, trait_ref: &Ts2) -> Ts2 {
    match item {
        AssociatedItem::Type { name, generics } => {
            let (impl_generics, type_generics, where_clause) = generics.split_for_impl();
            quote! {
                type #name #impl_generics = <#next as #trait_ref>::#name #type_generics #where_clause;
            }
        }
        AssociatedItem::Const { name, ty } => quote! {
            const #name: #ty = <#next as #trait_ref>::#name;
        },
    }
}

/// Rewrites `crate::...` paths to `<krate>::...`, for a decorator generated outside the trait's
/// own package.
struct RebaseCrate<'a> {
    krate: &'a Ident,
}

impl VisitMut for RebaseCrate<'_> {
    fn visit_path_mut(&mut self, path: &mut syn::Path) {
        if path.leading_colon.is_none()
            && let Some(first) = path.segments.first_mut()
            && first.ident == "crate"
        {
            first.ident = self.krate.clone();
        }
        visit_mut::visit_path_mut(self, path);
    }

    fn visit_use_tree_mut(&mut self, tree: &mut UseTree) {
        if let UseTree::Path(path) = tree
            && path.ident == "crate"
        {
            path.ident = self.krate.clone();
        }
    }

    // `pub(crate)` stays as it is
    fn visit_visibility_mut(&mut self, _: &mut Visibility) {}
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use quote::format_ident;
    use syn::{ImplItem, Item, parse_quote};

    use super::{RebaseCrate, next_ident, parameter_names};
    use crate::{
        error::SynthesisError,
        model::{
            InterfaceDescriptor, MethodSignature, ModulePath, Parameter, Receiver, TypeRef,
        },
        synth::{GenerationRequest, GeneratorConfig, generate},
    };

    fn param(name: &str, ty: syn::Type) -> Parameter {
        Parameter::new(format_ident!("{name}"), TypeRef::new(ty))
    }

    fn descriptor(methods: Vec<MethodSignature>) -> InterfaceDescriptor {
        methods.into_iter().fold(
            InterfaceDescriptor::new(ModulePath::parse("crate::store").unwrap(), format_ident!("Store")),
            InterfaceDescriptor::with_method,
        )
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new(
            "Store",
            ModulePath::parse("crate::store").unwrap(),
            &GeneratorConfig::default(),
        )
    }

    /// `method` laid out the way generated files are, so comparisons ignore line breaks and
    /// trailing commas.
    fn pretty(method: &syn::ImplItemFn) -> String {
        prettyplease::unparse(&parse_quote!(impl Decorator { #method }))
    }

    /// The forwarding method `name` of the first trait impl in `source`.
    fn method(source: &str, name: &str) -> syn::ImplItemFn {
        let file = syn::parse_file(source).unwrap();
        file.items
            .into_iter()
            .filter_map(|item| match item {
                Item::Impl(item) if item.trait_.is_some() => Some(item),
                _ => None,
            })
            .flat_map(|item| item.items)
            .find_map(|item| match item {
                ImplItem::Fn(f) if f.sig.ident == name => Some(f),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn by_value_receivers_take_the_decorator_apart() {
        let mut consume = MethodSignature::new(
            format_ident!("consume"),
            vec![param("next", parse_quote!(u8)), param("p0", parse_quote!(u8))],
            vec![param("r0", parse_quote!(u8))],
        );
        consume.receiver = Receiver::Value;
        let mut boxed = MethodSignature::new(format_ident!("boxed"), vec![], vec![]);
        boxed.receiver = Receiver::Boxed;
        let source = generate(&descriptor(vec![consume, boxed]), &request()).unwrap();

        let expected: syn::ImplItemFn = parse_quote! {
            fn consume(self, p0_: u8, p0: u8) -> u8 {
                let Self { next, collector, instance_name } = self;
                let _defer = Deferred::new(Instant::now(), |started_at| {
                    Self::observe(&collector, &instance_name, "consume", started_at)
                });
                <Next as Store>::consume(next, p0_, p0)
            }
        };
        check!(pretty(&method(&source, "consume")) == pretty(&expected));

        let expected: syn::ImplItemFn = parse_quote! {
            fn boxed(self: Box<Self>) {
                let Self { next, collector, instance_name } = *self;
                let _defer = Deferred::new(Instant::now(), |started_at| {
                    Self::observe(&collector, &instance_name, "boxed", started_at)
                });
                <Next as Store>::boxed(Box::new(next));
            }
        };
        check!(pretty(&method(&source, "boxed")) == pretty(&expected));
    }

    #[test]
    fn async_unsafe_and_generic_methods() {
        let mut fetch = MethodSignature::new(
            format_ident!("fetch"),
            vec![param("key", parse_quote!(K))],
            vec![param("r0", parse_quote!(Option<V>))],
        );
        fetch.asyncness = true;
        fetch.unsafety = true;
        fetch.generics = parse_quote!(<'a, K: AsRef<str>, V, const N: usize>);
        let mut sink = MethodSignature::new(
            format_ident!("sink"),
            vec![param("items", parse_quote!(impl IntoIterator<Item = T>))],
            vec![],
        );
        sink.generics = parse_quote!(<T>);
        sink.receiver = Receiver::RefMut(None);
        let source = generate(&descriptor(vec![fetch, sink]), &request()).unwrap();

        let expected: syn::ImplItemFn = parse_quote! {
            async unsafe fn fetch<'a, K: AsRef<str>, V, const N: usize>(&self, key: K) -> Option<V> {
                let _defer = Deferred::new(Instant::now(), |started_at| {
                    Self::observe(&self.collector, &self.instance_name, "fetch", started_at)
                });
                unsafe { <Next as Store>::fetch::<K, V, N>(&self.next, key) }.await
            }
        };
        check!(pretty(&method(&source, "fetch")) == pretty(&expected));

        let expected: syn::ImplItemFn = parse_quote! {
            fn sink<T>(&mut self, items: impl IntoIterator<Item = T>) {
                let _defer = Deferred::new(Instant::now(), |started_at| {
                    Self::observe(&self.collector, &self.instance_name, "sink", started_at)
                });
                <Next as Store>::sink(&mut self.next, items);
            }
        };
        check!(pretty(&method(&source, "sink")) == pretty(&expected));
    }

    #[test]
    fn associated_functions_are_not_timed() {
        let mut create = MethodSignature::new(
            format_ident!("describe"),
            vec![param("verbose", parse_quote!(bool))],
            vec![param("r0", parse_quote!(String))],
        );
        create.receiver = Receiver::None;
        let source = generate(&descriptor(vec![create]), &request()).unwrap();

        let expected: syn::ImplItemFn = parse_quote! {
            fn describe(verbose: bool) -> String {
                <Next as Store>::describe(verbose)
            }
        };
        check!(pretty(&method(&source, "describe")) == pretty(&expected));
        check!(!source.contains("Instant"));
        check!(source.contains("#[allow(dead_code)]"));
    }

    #[test]
    fn rejects_what_cannot_be_forwarded() {
        let mut shared = MethodSignature::new(format_ident!("shared"), vec![], vec![]);
        shared.receiver = Receiver::Unsupported("Rc < Self >".into());
        let_assert!(
            Err(SynthesisError::UnsupportedSignature { interface, method, .. }) =
                generate(&descriptor(vec![shared]), &request())
        );
        check!(interface == "Store");
        check!(method == "shared");

        let merge = MethodSignature::new(
            format_ident!("merge"),
            vec![param("other", parse_quote!(&Self))],
            vec![],
        );
        let_assert!(
            Err(SynthesisError::UnsupportedSignature { reason, .. }) =
                generate(&descriptor(vec![merge]), &request())
        );
        check!(reason.contains("`other`"));

        let cursor = MethodSignature::new(
            format_ident!("cursor"),
            vec![],
            vec![param("r0", parse_quote!(Self::Cursor))],
        );
        check!(generate(&descriptor(vec![cursor]), &request()).is_ok());
    }

    #[test]
    fn next_is_renamed_on_clashes() {
        let mut method = MethodSignature::new(format_ident!("get"), vec![], vec![]);
        method.generics = parse_quote!(<Next, Next0>);
        let descriptor = descriptor(vec![method]);
        check!(next_ident(&descriptor, "StoreMetrics") == "Next1");

        let plain = InterfaceDescriptor::new(ModulePath::root(), format_ident!("Next"));
        check!(next_ident(&plain, "NextMetrics") == "Next0");
    }

    #[test]
    fn parameters_shadowing_locals_are_renamed() {
        let mut method = MethodSignature::new(
            format_ident!("put"),
            vec![
                param("_defer", parse_quote!(u8)),
                param("collector", parse_quote!(u8)),
                param("p1", parse_quote!(u8)),
            ],
            vec![],
        );
        let names = |m: &MethodSignature| {
            parameter_names(m)
                .into_iter()
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
        };
        check!(names(&method) == ["p0", "collector", "p1"]);
        method.receiver = Receiver::Value;
        check!(names(&method) == ["p0", "p1_", "p1"]);
    }

    #[test]
    fn rebases_crate_paths() {
        let mut file: syn::File = parse_quote! {
            use crate::store::Store;
            pub(crate) fn f(x: crate::model::Order) -> ::crate_like::X {}
        };
        syn::visit_mut::VisitMut::visit_file_mut(
            &mut RebaseCrate {
                krate: &format_ident!("shop"),
            },
            &mut file,
        );
        let expected: syn::File = parse_quote! {
            use shop::store::Store;
            pub(crate) fn f(x: shop::model::Order) -> ::crate_like::X {}
        };
        check!(file == expected);
    }
}
