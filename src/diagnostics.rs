//! Observational hooks invoked at documented points in the submit/run lifecycle.
//!
//! Diagnostics are pure side effects: they receive no status and cannot influence control flow.
//! They run on the submitting thread (`on_submit`) or the executing worker (`on_task_begin`,
//! `on_task_end`), and must not block with respect to the same executor.

use std::any::Any;
use std::sync::Arc;

use crate::config::Backpressure;

/// An opaque, application-defined trace context forwarded from `submit` to diagnostics.
///
/// `texec` never inspects its contents; it only clones the `Arc` and passes it through.
pub type TraceContext = Arc<dyn Any + Send + Sync>;

/// Summary of a submit call, passed to [`Diagnostics::on_submit`].
#[derive(Debug, Clone, Copy)]
pub struct SubmitSummary {
    pub backpressure: Backpressure,
}

/// Diagnostic hooks an executor invokes at submit and around task execution.
///
/// All methods have empty default bodies so implementers only override what they need.
pub trait Diagnostics: Send + Sync {
    fn on_submit(&self, _submit: &SubmitSummary) {}
    fn on_task_begin(&self, _trace_context: Option<&TraceContext>) {}
    fn on_task_end(&self, _trace_context: Option<&TraceContext>, _result: i32) {}
}

/// The default diagnostics implementation: every hook is a no-op.
pub(crate) struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {}
