// Code generated by metricsgen v0.2.0. DO NOT EDIT.
// The original trait `Example` can be found in `crate`.

use std::sync::Arc;
use std::time::Instant;
use metricsgen_runtime::{Deferred, LatencyCollector, Registerer, RegistrationError};
use crate::Example;
/// Wraps a `Example`, recording the latency of every call made through it.
pub struct ExampleMetrics<Next> {
    next: Next,
    collector: Arc<LatencyCollector>,
    instance_name: String,
}
/// Creates the collector shared by `ExampleMetrics` instances and registers it with `registerer`.
pub fn new_example_metrics_collector(
    registerer: &dyn Registerer,
    metric_name: &str,
) -> Result<Arc<LatencyCollector>, RegistrationError> {
    let collector = Arc::new(
        LatencyCollector::new(metric_name, metric_name, &["instance_name", "method"]),
    );
    registerer.register(Arc::clone(&collector))?;
    Ok(collector)
}
impl<Next> ExampleMetrics<Next> {
    /// Wraps `next`, recording its calls in `collector` under `instance_name`.
    pub fn with_collector(
        next: Next,
        instance_name: impl Into<String>,
        collector: Arc<LatencyCollector>,
    ) -> Self {
        Self {
            next,
            collector,
            instance_name: instance_name.into(),
        }
    }
    fn observe(
        collector: &LatencyCollector,
        instance_name: &str,
        method: &str,
        started_at: Instant,
    ) {
        collector.observe(&[instance_name, method], started_at.elapsed());
    }
}
impl<Next> Example for ExampleMetrics<Next>
where
    Next: Example,
{
    fn another(&self, p: String) {
        let _defer = Deferred::new(
            Instant::now(),
            |started_at| {
                Self::observe(
                    &self.collector,
                    &self.instance_name,
                    "another",
                    started_at,
                )
            },
        );
        <Next as Example>::another(&self.next, p);
    }
    fn run(&self, p: String, p1: String) -> Result<(), crate::ExampleError> {
        let _defer = Deferred::new(
            Instant::now(),
            |started_at| {
                Self::observe(&self.collector, &self.instance_name, "run", started_at)
            },
        );
        <Next as Example>::run(&self.next, p, p1)
    }
}
