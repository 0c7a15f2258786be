use crate::controller::{Controller, Signal, UnitStart};
use crate::plan::Plan;
use crate::run_id::RunId;
use anyhow::{ensure, Context, Result};
use std::time::{Duration, Instant};

/// How a run ended. Observer faults are not an outcome, they come back
/// as the `Err` of [`Driver::run`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Every unit of every phase was processed.
    Completed,
    /// The observer asked to stop. `after` is the last unit that finished
    /// before the abort was observed, `None` if nothing had started yet.
    Aborted { after: Option<UnitStart> },
    /// Work on a unit failed. This is a build error, not a cancellation.
    Failed { unit: UnitStart, error: String },
}

impl Outcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed)
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Outcome::Aborted { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

#[derive(Clone, Debug)]
pub struct Report {
    pub run_id: RunId,
    pub outcome: Outcome,
    pub units_started: u64,
    pub units_done: u64,
    pub polls: u64,
    pub elapsed: Duration,
}

/// Reference driver: walks a [`Plan`] phase by phase, announcing every unit
/// to the controller and polling it for cancellation.
///
/// The controller is polled once before the first unit (so an empty plan
/// still reports `0/0`), then after every `poll_every` finished units and
/// always after the last one. The first [`Signal::Abort`] ends the run, no
/// unit is started and no poll is made after it.
pub struct Driver {
    plan: Plan,
    poll_every: u64,
}

impl Driver {
    pub fn new(plan: Plan) -> Self {
        Self {
            plan,
            poll_every: 1,
        }
    }

    pub fn poll_every(mut self, units: u64) -> Result<Self> {
        ensure!(units >= 1, "poll cadence must be at least one unit");
        self.poll_every = units;
        Ok(self)
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn run<C, W>(&self, controller: &mut C, mut work: W) -> Result<Report>
    where
        C: Controller + ?Sized,
        W: FnMut(&str, &str) -> Result<()>,
    {
        let mut run = Run::new(self.plan.total_units());

        if run.poll(controller)?.is_abort() {
            return Ok(run.finish(Outcome::Aborted { after: None }));
        }

        for phase in self.plan.phases() {
            for unit in &phase.units {
                let start = UnitStart::new(phase.name.as_str(), unit.as_str());
                controller
                    .unit_starting(&phase.name, unit)
                    .with_context(|| format!("[Controller] unit_starting\n  {}", &start))?;
                run.units_started += 1;

                if let Err(e) = work(&phase.name, unit) {
                    return Ok(run.finish(Outcome::Failed {
                        unit: start,
                        error: format!("{:?}", e),
                    }));
                }
                run.units_done += 1;

                let is_last = run.units_done == run.total;
                if (run.units_done % self.poll_every == 0 || is_last)
                    && run.poll(controller)?.is_abort()
                {
                    return Ok(run.finish(Outcome::Aborted { after: Some(start) }));
                }
            }
        }

        Ok(run.finish(Outcome::Completed))
    }
}

struct Run {
    id: RunId,
    started_at: Instant,
    total: u64,
    units_started: u64,
    units_done: u64,
    polls: u64,
}

impl Run {
    fn new(total: u64) -> Self {
        Self {
            id: RunId::new(),
            started_at: Instant::now(),
            total,
            units_started: 0,
            units_done: 0,
            polls: 0,
        }
    }

    fn poll<C: Controller + ?Sized>(&mut self, controller: &mut C) -> Result<Signal> {
        self.polls += 1;
        let (current, total) = (self.units_done, self.total);
        controller
            .report_progress(current, total)
            .with_context(|| format!("[Controller] report_progress\n  {}/{}", current, total))
    }

    fn finish(self, outcome: Outcome) -> Report {
        Report {
            run_id: self.id,
            outcome,
            units_started: self.units_started,
            units_done: self.units_done,
            polls: self.polls,
            elapsed: self.started_at.elapsed(),
        }
    }
}
