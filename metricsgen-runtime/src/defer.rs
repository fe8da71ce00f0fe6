// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::time::Instant;

/// Runs a closure with a start time when dropped.
///
/// Generated decorators create one at the top of every forwarded method, so the latency is recorded
/// however the call ends: by returning, by unwinding, or by its future being dropped.
///
/// # Examples
/// ```rust
/// use std::cell::Cell;
/// use std::time::Instant;
///
/// use metricsgen_runtime::Deferred;
///
/// let calls = Cell::new(0);
/// {
///     let _defer = Deferred::new(Instant::now(), |_started_at| calls.set(calls.get() + 1));
///     assert_eq!(calls.get(), 0);
/// }
/// assert_eq!(calls.get(), 1);
/// ```
#[must_use = "the closure runs as soon as the guard is dropped"]
pub struct Deferred<F: FnOnce(Instant)> {
    started_at: Instant,
    on_drop: Option<F>,
}

impl<F: FnOnce(Instant)> Deferred<F> {
    /// Create a guard that calls `on_drop(started_at)` when dropped.
    pub fn new(started_at: Instant, on_drop: F) -> Self {
        Self {
            started_at,
            on_drop: Some(on_drop),
        }
    }

    /// The instant passed to [`Deferred::new`].
    pub fn started_at(&self) -> Instant {
        self.started_at
    }
}

impl<F: FnOnce(Instant)> Drop for Deferred<F> {
    fn drop(&mut self) {
        if let Some(on_drop) = self.on_drop.take() {
            on_drop(self.started_at);
        }
    }
}

impl<F: FnOnce(Instant)> fmt::Debug for Deferred<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}
