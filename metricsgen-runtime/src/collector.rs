// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use histogram::{AtomicHistogram, Config};
use tracing::warn;

/// Histogram settings for latencies in nanoseconds: any `u64` value, about 6% relative error.
fn default_histogram_config() -> Config {
    Config::new(4, 64).expect("known good")
}

/// A latency metric partitioned by label values, like a Prometheus summary vector.
///
/// Each distinct tuple of label values gets its own series. Recording into an existing series is
/// lock-free; the series map is only locked for writing when a new tuple shows up.
pub struct LatencyCollector {
    name: String,
    help: String,
    label_names: Vec<String>,
    config: Config,
    series: RwLock<BTreeMap<Vec<String>, Arc<Series>>>,
}

struct Series {
    histogram: AtomicHistogram,
    count: AtomicU64,
    sum_nanos: AtomicU64,
}

impl Series {
    fn new(config: &Config) -> Self {
        Self {
            histogram: AtomicHistogram::with_config(config),
            count: AtomicU64::new(0),
            sum_nanos: AtomicU64::new(0),
        }
    }

    fn record(&self, nanos: u64) {
        // every u64 fits the configured range
        self.histogram.add(nanos, 1).ok();
        self.count.fetch_add(1, Ordering::Relaxed);
        self.sum_nanos.fetch_add(nanos, Ordering::Relaxed);
    }
}

impl LatencyCollector {
    /// Create a collector named `name` whose series are identified by `label_names`.
    ///
    /// The collector does nothing until it is registered with a [`crate::Registerer`] and
    /// observations are recorded.
    pub fn new(name: impl Into<String>, help: impl Into<String>, label_names: &[&str]) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            label_names: label_names.iter().map(|&l| l.to_owned()).collect(),
            config: default_histogram_config(),
            series: RwLock::new(BTreeMap::new()),
        }
    }

    /// The metric name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The metric description.
    pub fn help(&self) -> &str {
        &self.help
    }

    /// The label names, in the order values are passed to [`LatencyCollector::observe`].
    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    /// Record `elapsed` in the series identified by `label_values`.
    ///
    /// An observation with the wrong number of label values is dropped.
    pub fn observe(&self, label_values: &[&str], elapsed: Duration) {
        if label_values.len() != self.label_names.len() {
            warn!(
                collector = %self.name,
                expected = self.label_names.len(),
                got = label_values.len(),
                "dropping observation with the wrong number of label values"
            );
            return;
        }
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.series(label_values).record(nanos);
    }

    fn series(&self, label_values: &[&str]) -> Arc<Series> {
        let key: Vec<String> = label_values.iter().map(|&v| v.to_owned()).collect();
        if let Some(series) = self
            .series
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Arc::clone(series);
        }
        let mut series = self.series.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            series
                .entry(key)
                .or_insert_with(|| Arc::new(Series::new(&self.config))),
        )
    }

    /// A point-in-time copy of every series, sorted by label values.
    pub fn snapshot(&self) -> Vec<SeriesSnapshot> {
        let series = self.series.read().unwrap_or_else(PoisonError::into_inner);
        series
            .iter()
            .map(|(values, series)| {
                let buckets = series
                    .histogram
                    .load()
                    .iter()
                    .filter(|bucket| bucket.count() > 0)
                    .map(|bucket| (*bucket.range().end(), bucket.count()))
                    .collect();
                SeriesSnapshot {
                    labels: self
                        .label_names
                        .iter()
                        .cloned()
                        .zip(values.iter().cloned())
                        .collect(),
                    count: series.count.load(Ordering::Relaxed),
                    sum: Duration::from_nanos(series.sum_nanos.load(Ordering::Relaxed)),
                    buckets,
                }
            })
            .collect()
    }
}

impl fmt::Debug for LatencyCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LatencyCollector")
            .field("name", &self.name)
            .field("help", &self.help)
            .field("label_names", &self.label_names)
            .finish_non_exhaustive()
    }
}

/// The state of one series of a [`LatencyCollector`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesSnapshot {
    /// `(label name, label value)` pairs, in label order.
    pub labels: Vec<(String, String)>,
    /// The number of observations.
    pub count: u64,
    /// The sum of all observations.
    pub sum: Duration,
    /// Upper bound and count of each non-empty histogram bucket, in ascending order.
    buckets: Vec<(u64, u64)>,
}

impl SeriesSnapshot {
    /// The value of the label `name`.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(label, _)| label == name)
            .map(|(_, value)| value.as_str())
    }

    /// An upper bound for the `q` quantile (`0.0..=1.0`, clamped), or `None` without
    /// observations.
    ///
    /// The bound is the upper edge of the histogram bucket holding the quantile, so it overshoots
    /// the exact value by at most the bucket width.
    pub fn quantile(&self, q: f64) -> Option<Duration> {
        let total: u64 = self.buckets.iter().map(|(_, count)| count).sum();
        if total == 0 {
            return None;
        }
        let q = if q.is_nan() { 0.0 } else { q.clamp(0.0, 1.0) };
        let rank = ((q * total as f64).ceil() as u64).max(1);
        let mut seen = 0;
        for &(upper, count) in &self.buckets {
            seen += count;
            if seen >= rank {
                return Some(Duration::from_nanos(upper));
            }
        }
        self.buckets
            .last()
            .map(|&(upper, _)| Duration::from_nanos(upper))
    }
}
