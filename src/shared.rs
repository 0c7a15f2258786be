use crate::controller::{Controller, Signal};
use anyhow::Result;
use std::sync::{Arc, Mutex, MutexGuard};

/// Clone-able handle that serializes calls from several threads into one
/// observer. Every call holds the lock for its whole duration, so the
/// observer still sees one call at a time.
pub struct Shared<C>(Arc<Mutex<C>>);

impl<C> Clone for Shared<C> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<C: Controller> Shared<C> {
    pub fn new(inner: C) -> Self {
        Self(Arc::new(Mutex::new(inner)))
    }

    /// Direct access to the observer, e.g. to inspect it after a build.
    pub fn lock(&self) -> MutexGuard<'_, C> {
        self.0.lock().expect("poisoned lock")
    }
}

impl<C: Controller> Controller for Shared<C> {
    fn unit_starting(&mut self, phase: &str, unit: &str) -> Result<()> {
        self.lock().unit_starting(phase, unit)
    }

    fn report_progress(&mut self, current: u64, total: u64) -> Result<Signal> {
        self.lock().report_progress(current, total)
    }
}
