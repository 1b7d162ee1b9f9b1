//! Lookup latency hook.
//!
//! The router reports one sample per [`Router::resolve`](crate::Router::resolve)
//! call when an observer is installed, and skips the clock entirely when none is.

/// Receives the duration of every resolve call, in nanoseconds.
pub trait LatencyObserver: Send + Sync {
    fn observe(&self, duration_nanos: u64);
}

impl<F> LatencyObserver for F
where
    F: Fn(u64) + Send + Sync,
{
    fn observe(&self, duration_nanos: u64) {
        self(duration_nanos)
    }
}

/// Emits each sample as a `trace`-level event under the `pathwise::resolve` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl LatencyObserver for TracingObserver {
    fn observe(&self, duration_nanos: u64) {
        tracing::trace!(target: "pathwise::resolve", duration_nanos, "route resolved");
    }
}
