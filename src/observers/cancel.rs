use crate::controller::{Controller, Noop, Signal};
use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A stop button. Cloning shares the flag, and a cancelled handle can not be
/// un-cancelled.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Forwards every call to the wrapped observer and answers
/// [`Signal::Abort`] once its [`CancelHandle`] was cancelled, or when the
/// wrapped observer asks for it.
pub struct Cancellable<C> {
    inner: C,
    handle: CancelHandle,
}

impl Cancellable<Noop> {
    pub fn standalone() -> Self {
        Self::new(Noop)
    }
}

impl<C: Controller> Cancellable<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            handle: CancelHandle::new(),
        }
    }

    pub fn with_handle(inner: C, handle: CancelHandle) -> Self {
        Self { inner, handle }
    }

    pub fn handle(&self) -> CancelHandle {
        self.handle.clone()
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: Controller> Controller for Cancellable<C> {
    fn unit_starting(&mut self, phase: &str, unit: &str) -> Result<()> {
        self.inner.unit_starting(phase, unit)
    }

    fn report_progress(&mut self, current: u64, total: u64) -> Result<Signal> {
        let signal = self.inner.report_progress(current, total)?;
        if signal.is_abort() {
            // an abort from the inner observer stays, later polls keep aborting
            self.handle.cancel();
        }
        if self.handle.is_cancelled() {
            return Ok(Signal::Abort);
        }
        Ok(Signal::Continue)
    }
}
