use crate::controller::{Controller, Signal};
use anyhow::{bail, Result};
use std::fmt;
use std::sync::{Arc, Mutex};

/// One call a driver made into a [`Recorder`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    UnitStarting { phase: String, unit: String },
    Progress { current: u64, total: u64 },
}

impl Call {
    pub fn unit<P: Into<String>, U: Into<String>>(phase: P, unit: U) -> Self {
        Call::UnitStarting {
            phase: phase.into(),
            unit: unit.into(),
        }
    }

    pub fn progress(current: u64, total: u64) -> Self {
        Call::Progress { current, total }
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Call::UnitStarting { phase, unit } => write!(f, "unit_starting({}, {})", phase, unit),
            Call::Progress { current, total } => {
                write!(f, "report_progress({}, {})", current, total)
            }
        }
    }
}

/// Test-harness observer. Keeps every call in a log shared by all of its
/// clones and answers polls from a small script.
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<Call>>>,
    abort_on_poll: Option<usize>,
    fail_on_poll: Option<usize>,
    fail_on_unit: Option<(String, String)>,
}

impl Recorder {
    /// Records everything, never aborts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers [`Signal::Abort`] to the `n`-th poll (1-based) and every poll
    /// after it.
    pub fn abort_on_poll(mut self, n: usize) -> Self {
        self.abort_on_poll = Some(n);
        self
    }

    /// Fails the `n`-th poll (1-based), as a broken observer would.
    pub fn fail_on_poll(mut self, n: usize) -> Self {
        self.fail_on_poll = Some(n);
        self
    }

    pub fn fail_on_unit<P: Into<String>, U: Into<String>>(mut self, phase: P, unit: U) -> Self {
        self.fail_on_unit = Some((phase.into(), unit.into()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("poisoned lock").clone()
    }

    pub fn polls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Progress { .. }))
            .count()
    }

    pub fn unit_starts(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::UnitStarting { phase, unit } => Some((phase, unit)),
                Call::Progress { .. } => None,
            })
            .collect()
    }
}

impl Controller for Recorder {
    fn unit_starting(&mut self, phase: &str, unit: &str) -> Result<()> {
        self.calls
            .lock()
            .expect("poisoned lock")
            .push(Call::unit(phase, unit));

        if let Some((fail_phase, fail_unit)) = &self.fail_on_unit {
            if fail_phase == phase && fail_unit == unit {
                bail!("recorder refused unit {}: {}", phase, unit);
            }
        }
        Ok(())
    }

    fn report_progress(&mut self, current: u64, total: u64) -> Result<Signal> {
        let mut calls = self.calls.lock().expect("poisoned lock");
        calls.push(Call::progress(current, total));
        let poll = calls
            .iter()
            .filter(|c| matches!(c, Call::Progress { .. }))
            .count();
        drop(calls);

        if self.fail_on_poll == Some(poll) {
            bail!("recorder failed poll #{}", poll);
        }
        match self.abort_on_poll {
            Some(n) if poll >= n => Ok(Signal::Abort),
            _ => Ok(Signal::Continue),
        }
    }
}

impl fmt::Display for Recorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for call in self.calls() {
            writeln!(f, "{}", call)?;
        }
        Ok(())
    }
}
