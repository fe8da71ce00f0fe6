// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Decorators produced by `metricsgen` for the traits below, checked in under `generated/` and
//! exercised against the runtime. `metricsgen-core`'s generation tests render the same traits and
//! fail when these files fall behind.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Duration;

use assert2::{check, let_assert};
use metricsgen_runtime::{RegistrationError, Registry, SeriesSnapshot};

#[path = "generated/counter_metrics.rs"]
mod counter_metrics;
#[path = "generated/example_metrics.rs"]
mod example_metrics;

use counter_metrics::{CounterMetrics, new_counter_metrics_collector};
use example_metrics::{ExampleMetrics, new_example_metrics_collector};

#[derive(Debug, PartialEq)]
pub struct ExampleError(String);

pub trait Example {
    fn another(&self, p: String);
    fn run(&self, p: String, p1: String) -> Result<(), ExampleError>;
}

pub trait Counter: Clone {
    fn add(&mut self, by: u32);
    fn total(&self) -> u32;
    fn finish(self) -> u32;
    fn kind() -> &'static str;
}

struct Service;

impl Example for Service {
    fn another(&self, p: String) {
        if p == "panic" {
            panic!("asked to panic");
        }
    }

    fn run(&self, p: String, p1: String) -> Result<(), ExampleError> {
        std::thread::sleep(Duration::from_millis(2));
        if p == p1 {
            Ok(())
        } else {
            Err(ExampleError(format!("{p} != {p1}")))
        }
    }
}

#[derive(Clone, Default)]
struct Total(u32);

impl Counter for Total {
    fn add(&mut self, by: u32) {
        self.0 += by;
    }

    fn total(&self) -> u32 {
        self.0
    }

    fn finish(self) -> u32 {
        self.0
    }

    fn kind() -> &'static str {
        "total"
    }
}

fn series<'a>(snapshot: &'a [SeriesSnapshot], instance: &str, method: &str) -> &'a SeriesSnapshot {
    let found = snapshot
        .iter()
        .find(|s| s.label("instance_name") == Some(instance) && s.label("method") == Some(method));
    let_assert!(Some(series) = found);
    series
}

#[test]
fn calls_are_forwarded_and_timed() {
    let registry = Registry::new();
    let collector = new_example_metrics_collector(&registry, "example_latency").unwrap();
    let example = ExampleMetrics::with_collector(Service, "primary", Arc::clone(&collector));

    example.another("hello".to_owned());
    check!(example.run("a".to_owned(), "a".to_owned()) == Ok(()));
    check!(
        example.run("a".to_owned(), "b".to_owned()) == Err(ExampleError("a != b".to_owned()))
    );

    let_assert!(Some(registered) = registry.get("example_latency"));
    check!(Arc::ptr_eq(&registered, &collector));
    check!(registered.help() == "example_latency");
    check!(registered.label_names() == ["instance_name", "method"]);

    let snapshot = registered.snapshot();
    check!(snapshot.len() == 2);
    check!(series(&snapshot, "primary", "another").count == 1);
    let run = series(&snapshot, "primary", "run");
    check!(run.count == 2);
    check!(run.sum >= Duration::from_millis(4));
    let_assert!(Some(p50) = run.quantile(0.5));
    check!(p50 >= Duration::from_millis(2));
}

#[test]
fn instances_share_a_collector() {
    let registry = Registry::new();
    let collector = new_example_metrics_collector(&registry, "example_latency").unwrap();
    let primary = ExampleMetrics::with_collector(Service, "primary", Arc::clone(&collector));
    let replica = ExampleMetrics::with_collector(Service, "replica", Arc::clone(&collector));

    primary.another(String::new());
    replica.another(String::new());
    replica.another(String::new());

    let snapshot = collector.snapshot();
    check!(series(&snapshot, "primary", "another").count == 1);
    check!(series(&snapshot, "replica", "another").count == 2);
}

#[test]
fn duplicate_registration_fails() {
    let registry = Registry::new();
    new_example_metrics_collector(&registry, "example_latency").unwrap();
    let_assert!(
        Err(RegistrationError::AlreadyRegistered { name }) =
            new_example_metrics_collector(&registry, "example_latency")
    );
    check!(name == "example_latency");

    let_assert!(
        Err(RegistrationError::InvalidName { .. }) =
            new_counter_metrics_collector(&registry, "")
    );
}

#[test]
fn panicking_calls_are_recorded() {
    let registry = Registry::new();
    let collector = new_example_metrics_collector(&registry, "example_latency").unwrap();
    let example = ExampleMetrics::with_collector(Service, "primary", Arc::clone(&collector));

    let result = catch_unwind(AssertUnwindSafe(|| example.another("panic".to_owned())));
    check!(result.is_err());
    check!(series(&collector.snapshot(), "primary", "another").count == 1);
}

#[test]
fn every_receiver_kind_forwards() {
    let registry = Registry::new();
    let collector = new_counter_metrics_collector(&registry, "counter_latency").unwrap();
    let mut counter = CounterMetrics::with_collector(Total::default(), "c", Arc::clone(&collector));

    counter.add(2);
    counter.add(3);
    check!(counter.total() == 5);
    let copy = counter.clone();
    check!(counter.finish() == 5);
    check!(copy.finish() == 5);
    check!(CounterMetrics::<Total>::kind() == "total");

    let snapshot = collector.snapshot();
    check!(series(&snapshot, "c", "add").count == 2);
    check!(series(&snapshot, "c", "total").count == 1);
    check!(series(&snapshot, "c", "finish").count == 2);
    // associated functions have no instance to report against
    check!(snapshot.iter().all(|s| s.label("method") != Some("kind")));
}
