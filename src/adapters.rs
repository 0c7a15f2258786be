use crate::controller::{Controller, Signal};
use anyhow::Result;

/// Makes an observer's abort irreversible: once the inner observer answers
/// [`Signal::Abort`], every later poll answers `Abort` without asking it.
pub struct Sticky<C> {
    inner: C,
    aborted: bool,
}

impl<C: Controller> Sticky<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            aborted: false,
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: Controller> Controller for Sticky<C> {
    fn unit_starting(&mut self, phase: &str, unit: &str) -> Result<()> {
        self.inner.unit_starting(phase, unit)
    }

    fn report_progress(&mut self, current: u64, total: u64) -> Result<Signal> {
        if self.aborted {
            return Ok(Signal::Abort);
        }
        let signal = self.inner.report_progress(current, total)?;
        self.aborted = signal.is_abort();
        Ok(signal)
    }
}

/// Broadcasts every call to all of its observers, in the order they were
/// added. A poll aborts if any observer asks for it, but every observer is
/// still polled so all of them see the same sequence of calls.
#[derive(Default)]
pub struct Fanout {
    observers: Vec<Box<dyn Controller>>,
}

impl Fanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_observer(&mut self, observer: Box<dyn Controller>) {
        self.observers.push(observer);
    }

    pub fn with<C: Controller + 'static>(mut self, observer: C) -> Self {
        self.add_observer(Box::new(observer));
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl Controller for Fanout {
    fn unit_starting(&mut self, phase: &str, unit: &str) -> Result<()> {
        let mut first_error = None;
        for observer in &mut self.observers {
            if let Err(e) = observer.unit_starting(phase, unit) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn report_progress(&mut self, current: u64, total: u64) -> Result<Signal> {
        let mut signal = Signal::Continue;
        let mut first_error = None;
        for observer in &mut self.observers {
            match observer.report_progress(current, total) {
                Ok(Signal::Abort) => signal = Signal::Abort,
                Ok(Signal::Continue) => (),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(signal),
        }
    }
}
