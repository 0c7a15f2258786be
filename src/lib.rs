/*!
# progctl - progress and cancellation for multi-unit builds

**progctl** is the contract between a long running build (the *driver*) and
whoever watches it (the *observer*: a console, an IDE, a test harness).

The driver works through ordered phases, and pushes a list of units (usually
source files) through each of them. It tells the observer through a
[`Controller`] when a unit starts, and every now and then it reports coarse
progress and asks whether it should keep going. The answer to that question,
[`Signal::Continue`] or [`Signal::Abort`], is the only way to cancel a build.
Cancellation is cooperative: the driver finishes the unit it's on and stops.

Observers can be combined: [`Fanout`] sends every call to several of them,
[`Sticky`] makes an abort irreversible, [`Shared`] lets several threads report
into a single observer. A handful of ready-made observers live in
[`observers`], and [`Driver`] is a reference driver that follows the protocol.

Example

```
use progctl::observers::{Cancellable, StdioObserver};
use progctl::{Driver, Outcome, Plan};

fn main() -> anyhow::Result<()> {
    let plan = Plan::uniform(&["parse", "emit"], &["A.src", "B.src"])?;
    let mut observer = Cancellable::new(StdioObserver::new());
    let stop = observer.handle();

    let report = Driver::new(plan).run(&mut observer, |phase, unit| {
        if phase == "emit" && unit == "A.src" {
            // somebody pressed the stop button
            stop.cancel();
        }
        Ok(())
    })?;

    assert!(matches!(report.outcome, Outcome::Aborted { .. }));
    Ok(())
}
```

 */
#![allow(clippy::new_without_default)]

pub mod adapters;
pub mod controller;
pub mod driver;
pub mod observers;
pub mod plan;
pub mod run_id;
pub mod shared;

pub use adapters::{Fanout, Sticky};
pub use controller::{Controller, Noop, Progress, Signal, UnitStart};
pub use driver::{Driver, Outcome, Report};
pub use plan::{Phase, Plan, PlanBuilder};
pub use run_id::RunId;
pub use shared::Shared;
