//! Debug handler hooks.
//!
//! The evaluator reports to a [`DebugHandler`] before every op, when an
//! error escapes to the host, and for every `debug` expression. Handlers
//! are shared across threads behind [`SharedDebugHandler`].
//!
//! - [`NoopDebugHandler`] ignores everything (default).
//! - [`TracingDebugHandler`] emits `tracing` events.
//! - [`RecordingDebugHandler`] collects `debug` values for tests and hosts
//!   that display them.
//! - [`CancellableDebugHandler`] interrupts evaluation once cancelled.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rill_ir::ops::OpNode;
use rill_ir::Span;
use rill_value::{EvalError, Value};

/// Returned from [`DebugHandler::before_op`] to stop evaluation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Interrupt;

pub trait DebugHandler: Send + Sync {
    /// Called before each op is evaluated. Returning `Err` aborts the
    /// evaluation with an uncatchable `Interrupted` error.
    fn before_op(&self, _op: &OpNode) -> Result<(), Interrupt> {
        Ok(())
    }

    /// Called once when an error escapes to the host.
    fn on_failure(&self, _error: &EvalError) {}

    /// Called with the value of every `debug` expression.
    fn on_debug(&self, _value: &Value, _span: Span) {}
}

pub type SharedDebugHandler = Arc<dyn DebugHandler>;

#[derive(Copy, Clone, Debug, Default)]
pub struct NoopDebugHandler;

impl DebugHandler for NoopDebugHandler {}

/// Create the default handler.
pub fn noop_handler() -> SharedDebugHandler {
    Arc::new(NoopDebugHandler)
}

/// Forwards `debug` values and escaping errors to `tracing`.
#[derive(Copy, Clone, Debug, Default)]
pub struct TracingDebugHandler;

impl DebugHandler for TracingDebugHandler {
    fn on_failure(&self, error: &EvalError) {
        tracing::warn!(code = error.code(), span = ?error.span, "{error}");
    }

    fn on_debug(&self, value: &Value, span: Span) {
        tracing::info!(target: "rill::debug", ?span, "{value}");
    }
}

/// Records `debug` values and escaping errors.
#[derive(Default)]
pub struct RecordingDebugHandler {
    values: Mutex<Vec<Value>>,
    failures: Mutex<Vec<&'static str>>,
}

impl RecordingDebugHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values passed to `debug`, in evaluation order.
    pub fn values(&self) -> Vec<Value> {
        self.values.lock().clone()
    }

    /// The values as display strings.
    pub fn output(&self) -> Vec<String> {
        self.values.lock().iter().map(ToString::to_string).collect()
    }

    /// Codes of the errors that escaped to the host.
    pub fn failures(&self) -> Vec<&'static str> {
        self.failures.lock().clone()
    }

    pub fn clear(&self) {
        self.values.lock().clear();
        self.failures.lock().clear();
    }
}

impl DebugHandler for RecordingDebugHandler {
    fn on_failure(&self, error: &EvalError) {
        self.failures.lock().push(error.code());
    }

    fn on_debug(&self, value: &Value, _span: Span) {
        self.values.lock().push(value.clone());
    }
}

/// Interrupts every evaluation once [`cancel`](Self::cancel) is called.
#[derive(Debug, Default)]
pub struct CancellableDebugHandler {
    cancelled: AtomicBool,
}

impl CancellableDebugHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl DebugHandler for CancellableDebugHandler {
    fn before_op(&self, _op: &OpNode) -> Result<(), Interrupt> {
        if self.is_cancelled() {
            Err(Interrupt)
        } else {
            Ok(())
        }
    }
}
