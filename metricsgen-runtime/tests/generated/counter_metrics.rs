// Code generated by metricsgen v0.2.0. DO NOT EDIT.
// The original trait `Counter` can be found in `crate`.

use std::sync::Arc;
use std::time::Instant;
use metricsgen_runtime::{Deferred, LatencyCollector, Registerer, RegistrationError};
use crate::Counter;
/// Wraps a `Counter`, recording the latency of every call made through it.
#[derive(Clone)]
pub struct CounterMetrics<Next> {
    next: Next,
    collector: Arc<LatencyCollector>,
    instance_name: String,
}
/// Creates the collector shared by `CounterMetrics` instances and registers it with `registerer`.
pub fn new_counter_metrics_collector(
    registerer: &dyn Registerer,
    metric_name: &str,
) -> Result<Arc<LatencyCollector>, RegistrationError> {
    let collector = Arc::new(
        LatencyCollector::new(metric_name, metric_name, &["instance_name", "method"]),
    );
    registerer.register(Arc::clone(&collector))?;
    Ok(collector)
}
impl<Next> CounterMetrics<Next> {
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
impl<Next> Counter for CounterMetrics<Next>
where
    Next: Counter,
{
    fn add(&mut self, by: u32) {
        let _defer = Deferred::new(
            Instant::now(),
            |started_at| {
                Self::observe(&self.collector, &self.instance_name, "add", started_at)
            },
        );
        <Next as Counter>::add(&mut self.next, by);
    }
    fn finish(self) -> u32 {
        let Self { next, collector, instance_name } = self;
        let _defer = Deferred::new(
            Instant::now(),
            |started_at| {
                Self::observe(&collector, &instance_name, "finish", started_at)
            },
        );
        <Next as Counter>::finish(next)
    }
    fn kind() -> &'static str {
        <Next as Counter>::kind()
    }
    fn total(&self) -> u32 {
        let _defer = Deferred::new(
            Instant::now(),
            |started_at| {
                Self::observe(&self.collector, &self.instance_name, "total", started_at)
            },
        );
        <Next as Counter>::total(&self.next)
    }
}
