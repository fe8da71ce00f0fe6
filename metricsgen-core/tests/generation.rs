// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use assert2::{check, let_assert};
use metricsgen_core::{
    GenerationRequest, GeneratorConfig, InterfaceDescriptor, InterfaceTarget, ModulePath,
    SourceIndex, SynthesisError, find_interfaces, generate,
};
use rstest::rstest;
use syn::{ImplItem, Item, Stmt, parse_quote};

const EXAMPLE: &str = r#"
    use std::fmt;

    #[derive(Debug)]
    pub struct ExampleError;

    pub trait Example {
        fn another(&self, p: String);
        fn run(&self, p: String, p1: String) -> Result<(), ExampleError>;
    }
"#;

const COUNTER: &str = r#"
    pub trait Counter: Clone {
        fn add(&mut self, by: u32);
        fn total(&self) -> u32;
        fn finish(self) -> u32;
        fn kind() -> &'static str;
    }
"#;

fn index(sources: &[(&'static str, &'static str)]) -> SourceIndex {
    SourceIndex::from_sources("example", sources.iter().copied()).unwrap()
}

fn interface(index: &SourceIndex, module: &str, name: &str) -> InterfaceDescriptor {
    let module = ModulePath::parse(module).unwrap();
    let mut found =
        find_interfaces(index, &module, &InterfaceTarget::Named(name.to_owned())).unwrap();
    found.remove(name).unwrap()
}

fn request(name: &str, module: &str) -> GenerationRequest {
    GenerationRequest::new(
        name,
        ModulePath::parse(module).unwrap(),
        &GeneratorConfig::default(),
    )
}

/// Every item of every trait impl in the generated file.
fn impl_items(source: &str) -> Vec<(String, ImplItem)> {
    let file = syn::parse_file(source).unwrap();
    file.items
        .into_iter()
        .filter_map(|item| match item {
            Item::Impl(item) => {
                let (_, path, _) = item.trait_?;
                let name = path.segments.last()?.ident.to_string();
                Some(item.items.into_iter().map(move |i| (name.clone(), i)))
            }
            _ => None,
        })
        .flatten()
        .collect()
}

/// `item` laid out the way generated files are, so comparisons ignore line breaks and trailing
/// commas.
fn pretty(item: Item) -> String {
    prettyplease::unparse(&syn::File {
        shebang: None,
        attrs: vec![],
        items: vec![item],
    })
}

fn pretty_method(method: &syn::ImplItemFn) -> String {
    pretty(parse_quote!(impl Decorator { #method }))
}

fn forwarding_method(source: &str, name: &str) -> syn::ImplItemFn {
    impl_items(source)
        .into_iter()
        .find_map(|(_, item)| match item {
            ImplItem::Fn(f) if f.sig.ident == name => Some(f),
            _ => None,
        })
        .unwrap()
}

#[test]
fn example_scenario() {
    let index = index(&[("crate", EXAMPLE)]);
    let example = interface(&index, "crate", "Example");
    let source = generate(&example, &request("Example", "crate")).unwrap();

    check!(source.starts_with(&format!(
        "// Code generated by metricsgen v{}. DO NOT EDIT.\n// The original trait `Example` can be found in `crate`.\n",
        metricsgen_core::VERSION
    )));
    check!(source.contains("pub struct ExampleMetrics<Next>"));
    check!(source.contains("pub fn new_example_metrics_collector("));
    check!(source.contains("pub fn with_collector("));
    check!(source.contains(r#"&["instance_name", "method"]"#));

    let expected: syn::ImplItemFn = parse_quote! {
        fn another(&self, p: String) {
            let _defer = Deferred::new(Instant::now(), |started_at| {
                Self::observe(&self.collector, &self.instance_name, "another", started_at)
            });
            <Next as Example>::another(&self.next, p);
        }
    };
    check!(pretty_method(&forwarding_method(&source, "another")) == pretty_method(&expected));

    let expected: syn::ImplItemFn = parse_quote! {
        fn run(&self, p: String, p1: String) -> Result<(), crate::ExampleError> {
            let _defer = Deferred::new(Instant::now(), |started_at| {
                Self::observe(&self.collector, &self.instance_name, "run", started_at)
            });
            <Next as Example>::run(&self.next, p, p1)
        }
    };
    check!(pretty_method(&forwarding_method(&source, "run")) == pretty_method(&expected));
}

#[rstest]
#[case("fn m(&self);", 0, "")]
#[case("fn m(&self, a: u8);", 1, "")]
#[case("fn m(&self, a: u8, b: &str, c: &[String]);", 3, "")]
#[case("fn m(&self) -> u8;", 0, "-> u8")]
#[case("fn m(&self, a: u8) -> (u8, String);", 1, "-> (u8, String)")]
#[case("fn m(&self, a: u8, b: u8) -> (u8, u8, u8);", 2, "-> (u8, u8, u8)")]
#[case("fn m(&self, a: u8) -> ();", 1, "")]
fn arity_is_preserved(#[case] method: &str, #[case] params: usize, #[case] output: &str) {
    let trait_source = format!("pub trait Arity {{ {method} }}");
    let index = SourceIndex::from_sources("example", [("crate", trait_source.as_str())]).unwrap();
    let arity = interface(&index, "crate", "Arity");
    let source = generate(&arity, &request("Arity", "crate")).unwrap();

    let output: syn::ReturnType = syn::parse_str(output).unwrap();
    let tail = output != syn::ReturnType::Default;
    let forwarded = forwarding_method(&source, "m");
    check!(forwarded.sig.inputs.len() == params + 1);
    check!(forwarded.sig.output == output);

    // the forwarded call is returned exactly when there is something to return
    let_assert!(Some(Stmt::Expr(call, semi)) = forwarded.block.stmts.last());
    check!(semi.is_none() == tail);
    let_assert!(syn::Expr::Call(call) = call);
    check!(call.args.len() == params + 1);
}

#[test]
fn variadic_like_arguments_pass_through() {
    let index = index(&[(
        "crate",
        "pub trait Batch { fn put_all(&self, items: &[String], rest: impl IntoIterator<Item = u8>); }",
    )]);
    let batch = interface(&index, "crate", "Batch");
    let source = generate(&batch, &request("Batch", "crate")).unwrap();
    let put_all = forwarding_method(&source, "put_all");
    let expected: syn::Stmt = parse_quote!(<Next as Batch>::put_all(&self.next, items, rest););
    check!(put_all.block.stmts.last() == Some(&expected));
}

#[test]
fn generation_is_deterministic() {
    let forward = "pub trait T { fn b(&self); fn a(&self) -> u8; fn c(&mut self, x: u8); }";
    let backward = "pub trait T { fn c(&mut self, x: u8); fn a(&self) -> u8; fn b(&self); }";
    let render = |source: &'static str| {
        let index = index(&[("crate", source)]);
        generate(&interface(&index, "crate", "T"), &request("T", "crate")).unwrap()
    };

    let first = render(forward);
    check!(first == render(forward));
    check!(first == render(backward));

    let names: Vec<String> = impl_items(&first)
        .into_iter()
        .filter_map(|(_, item)| match item {
            ImplItem::Fn(f) => Some(f.sig.ident.to_string()),
            _ => None,
        })
        .collect();
    check!(names == ["a", "b", "c"]);
}

#[test]
fn wildcard_with_an_empty_trait() {
    let index = index(&[(
        "crate",
        "pub trait A { fn one(&self); fn two(&self); } pub trait B {}",
    )]);
    let found = find_interfaces(&index, &ModulePath::root(), &InterfaceTarget::All).unwrap();
    check!(found.keys().cloned().collect::<Vec<_>>() == ["A", "B"]);

    check!(generate(&found["A"], &request("A", "crate")).is_ok());
    let_assert!(Err(err) = generate(&found["B"], &request("B", "crate")));
    let_assert!(SynthesisError::EmptyInterface { interface } = &err);
    check!(interface == "B");
    check!(err.to_string() == "empty interface: B");
}

#[test]
fn supertraits_get_their_own_impls() {
    let index = index(&[
        (
            "crate",
            r#"
            pub mod base;
            pub trait Store: base::Named + Clone + Send + Sync {
                type Key: Ord;
                fn get(&self, key: Self::Key) -> Option<u64>;
            }
            "#,
        ),
        (
            "crate::base",
            r#"
            pub trait Named: std::fmt::Debug {
                const KIND: &'static str;
                fn name(&self) -> &str;
            }
            "#,
        ),
    ]);
    let store = interface(&index, "crate", "Store");
    let source = generate(&store, &request("Store", "crate")).unwrap();
    let file = syn::parse_file(&source).unwrap();

    let_assert!(Some(Item::Struct(decorator)) = file.items.iter().find(|i| matches!(i, Item::Struct(_))));
    let expected: syn::Attribute = parse_quote!(#[derive(Clone, Debug)]);
    check!(decorator.attrs.contains(&expected));

    let impls: Vec<syn::ItemImpl> = file
        .items
        .iter()
        .filter_map(|item| match item {
            Item::Impl(item) if item.trait_.is_some() => Some(item.clone()),
            _ => None,
        })
        .collect();
    check!(impls.len() == 2);
    let expected: syn::ItemImpl = parse_quote! {
        impl<Next> Named for StoreMetrics<Next>
        where
            Next: Named,
        {
            const KIND: &'static str = <Next as Named>::KIND;
            fn name(&self) -> &str {
                let _defer = Deferred::new(Instant::now(), |started_at| {
                    Self::observe(&self.collector, &self.instance_name, "name", started_at)
                });
                <Next as Named>::name(&self.next)
            }
        }
    };
    check!(pretty(Item::Impl(impls[1].clone())) == pretty(Item::Impl(expected)));

    let associated: syn::ImplItem = parse_quote!(type Key = <Next as Store>::Key;);
    check!(impls[0].items.contains(&associated));
    check!(source.contains("use crate::base::Named;"));
}

#[test]
fn generic_traits_keep_their_parameters() {
    let index = index(&[(
        "crate",
        r#"
        pub struct Id;
        pub trait Cache<K = Id, const N: usize = 4>: Send
        where
            K: Clone,
        {
            type Entry<'a>: AsRef<[u8]> where Self: 'a;
            fn get<'a>(&'a self, key: &K) -> Option<Self::Entry<'a>>;
        }
        "#,
    )]);
    let cache = interface(&index, "crate", "Cache");
    let source = generate(&cache, &request("Cache", "crate")).unwrap();
    let file = syn::parse_file(&source).unwrap();
    let_assert!(
        Some(Item::Impl(item)) = file
            .items
            .iter()
            .find(|i| matches!(i, Item::Impl(i) if i.trait_.is_some()))
    );
    let expected: syn::ItemImpl = parse_quote! {
        impl<K, const N: usize, Next> Cache<K, N> for CacheMetrics<Next>
        where
            K: Clone,
            Next: Cache<K, N>,
        {
            type Entry<'a> = <Next as Cache<K, N>>::Entry<'a> where Self: 'a;
            fn get<'a>(&'a self, key: &K) -> Option<Self::Entry<'a>> {
                let _defer = Deferred::new(Instant::now(), |started_at| {
                    Self::observe(&self.collector, &self.instance_name, "get", started_at)
                });
                <Next as Cache<K, N>>::get(&self.next, key)
            }
        }
    };
    check!(pretty(Item::Impl(item.clone())) == pretty(Item::Impl(expected)));
}

#[test]
fn decorators_in_another_package_use_the_crate_name() {
    let index = index(&[
        ("crate", "pub mod store;"),
        (
            "crate::store",
            "use crate::model::*; use serde_json::*; pub trait Store { fn get(&self) -> Order; fn raw(&self) -> Value; }",
        ),
        ("crate::model", "pub struct Order;"),
    ]);
    let store = interface(&index, "crate::store", "Store");
    let request = request("Store", "crate::store")
        .with_source_crate(Some("example".to_owned()))
        .with_glob_imports(index.external_globs(&ModulePath::parse("crate::store").unwrap()));
    let source = generate(&store, &request).unwrap();

    check!(source.contains("// The original trait `Store` can be found in `example::store`."));
    check!(source.contains("use example::store::Store;"));
    check!(source.contains("use serde_json::*;"));
    check!(source.contains("-> example::model::Order"));
    check!(source.contains("-> Value"));
    check!(!source.contains("crate::"));
}

#[test]
fn a_custom_runtime_path() {
    let index = index(&[("crate", EXAMPLE)]);
    let example = interface(&index, "crate", "Example");
    let config = GeneratorConfig {
        runtime_crate: "crate::metrics::runtime".to_owned(),
        ..GeneratorConfig::default()
    };
    let request = GenerationRequest::new("Example", ModulePath::root(), &config);
    let source = generate(&example, &request).unwrap();
    check!(source.contains(
        "use crate::metrics::runtime::{Deferred, LatencyCollector, Registerer, RegistrationError};"
    ));
}

/// The leading comment lines of a generated file.
fn header(source: &str) -> Vec<&str> {
    source.lines().take_while(|line| line.starts_with("//")).collect()
}

/// `source` laid out by prettyplease.
fn canonical(source: &str) -> String {
    prettyplease::unparse(&syn::parse_file(source).unwrap())
}

/// The decorators the runtime tests compile against are the generator's output for the same
/// traits.
#[rstest]
#[case(
    "Example",
    EXAMPLE,
    include_str!("../../metricsgen-runtime/tests/generated/example_metrics.rs")
)]
#[case(
    "Counter",
    COUNTER,
    include_str!("../../metricsgen-runtime/tests/generated/counter_metrics.rs")
)]
fn checked_in_decorators_are_current(
    #[case] name: &str,
    #[case] trait_source: &'static str,
    #[case] checked_in: &str,
) {
    let index = index(&[("crate", trait_source)]);
    let source = generate(&interface(&index, "crate", name), &request(name, "crate")).unwrap();
    check!(header(&source) == header(checked_in));
    check!(canonical(&source) == canonical(checked_in));
}
