use anyhow::Result;
use std::fmt;

/// What the driver should do after a progress poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    Continue,
    Abort,
}

impl Signal {
    pub fn is_abort(self) -> bool {
        matches!(self, Signal::Abort)
    }
}

/// `true` means "keep going", `false` means "abort as soon as possible".
impl From<bool> for Signal {
    fn from(keep_going: bool) -> Self {
        if keep_going {
            Signal::Continue
        } else {
            Signal::Abort
        }
    }
}

/// The capability a build driver calls into while it works through its units.
///
/// Both calls are synchronous: the driver is suspended until they return, so
/// implementations should not do unbounded blocking work in them.
///
/// An `Err` from either call is a fault of the observer itself. It never means
/// "cancel", the only way to ask the driver to stop is returning
/// [`Signal::Abort`] from [`Controller::report_progress`].
///
/// Calls arrive from a single logical thread. Wrap an observer into
/// [`crate::Shared`] if several threads need to report into it.
pub trait Controller {
    /// Called exactly once per (phase, unit) pair, before any work on that
    /// unit is done in that phase. Both strings are opaque labels.
    fn unit_starting(&mut self, phase: &str, unit: &str) -> Result<()>;

    /// Called periodically with coarse-grained progress. The answer is the
    /// observer's cancellation intent sampled at call time.
    fn report_progress(&mut self, current: u64, total: u64) -> Result<Signal>;
}

impl<C: Controller + ?Sized> Controller for &mut C {
    fn unit_starting(&mut self, phase: &str, unit: &str) -> Result<()> {
        (**self).unit_starting(phase, unit)
    }

    fn report_progress(&mut self, current: u64, total: u64) -> Result<Signal> {
        (**self).report_progress(current, total)
    }
}

impl<C: Controller + ?Sized> Controller for Box<C> {
    fn unit_starting(&mut self, phase: &str, unit: &str) -> Result<()> {
        (**self).unit_starting(phase, unit)
    }

    fn report_progress(&mut self, current: u64, total: u64) -> Result<Signal> {
        (**self).report_progress(current, total)
    }
}

/// Observer that ignores everything and never asks to abort.
#[derive(Clone, Copy, Debug, Default)]
pub struct Noop;

impl Controller for Noop {
    fn unit_starting(&mut self, _phase: &str, _unit: &str) -> Result<()> {
        Ok(())
    }

    fn report_progress(&mut self, _current: u64, _total: u64) -> Result<Signal> {
        Ok(Signal::Continue)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitStart {
    pub phase: String,
    pub unit: String,
}

impl UnitStart {
    pub fn new<P: Into<String>, U: Into<String>>(phase: P, unit: U) -> Self {
        Self {
            phase: phase.into(),
            unit: unit.into(),
        }
    }
}

impl fmt::Display for UnitStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.phase, self.unit)
    }
}

/// A single progress sample. Nothing stops a driver from reporting
/// `current > total`, it is tolerated and only clamped when rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub current: u64,
    pub total: u64,
}

impl Progress {
    pub fn new(current: u64, total: u64) -> Self {
        Self { current, total }
    }

    /// Share of the work done, within `0.0..=1.0`. An empty workload is done.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.current as f64 / self.total as f64).min(1.0)
    }

    pub fn is_overrun(&self) -> bool {
        self.current > self.total
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.total)
    }
}
