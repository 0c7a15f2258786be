use crate::utils::test_observer::{scenario_plan, TestObserver};
use anyhow::Result;
use k9::*;
use progctl::observers::{Call, Recorder};
use progctl::{Controller, Driver, Outcome, Plan, Signal, UnitStart};
use std::collections::BTreeSet;

#[test]
fn completes_when_observer_keeps_going() -> Result<()> {
    let mut t = TestObserver::new(Recorder::new());
    let report = Driver::new(scenario_plan()).run(&mut t.fanout, |_, _| Ok(()))?;

    assert_equal!(report.outcome, Outcome::Completed);
    assert_equal!(
        t.recorder.calls(),
        vec![
            Call::progress(0, 4),
            Call::unit("parse", "A.src"),
            Call::progress(1, 4),
            Call::unit("parse", "B.src"),
            Call::progress(2, 4),
            Call::unit("emit", "A.src"),
            Call::progress(3, 4),
            Call::unit("emit", "B.src"),
            Call::progress(4, 4),
        ]
    );
    assert_equal!(
        t.output.to_string(),
        "\
[ ] | PROGRESS | [....................] 0/4
[ ] | STARTING | parse: A.src
[ ] | PROGRESS | [#####...............] 1/4
[ ] | STARTING | parse: B.src
[ ] | PROGRESS | [##########..........] 2/4
[ ] | STARTING | emit: A.src
[ ] | PROGRESS | [###############.....] 3/4
[ ] | STARTING | emit: B.src
[ ] | PROGRESS | [####################] 4/4
"
        .to_string()
    );
    Ok(())
}

#[test]
fn abort_on_third_poll_stops_new_units() -> Result<()> {
    let mut t = TestObserver::new(Recorder::new().abort_on_poll(3));
    let report = Driver::new(scenario_plan()).run(&mut t.fanout, |_, _| Ok(()))?;

    assert_equal!(
        report.outcome,
        Outcome::Aborted {
            after: Some(UnitStart::new("parse", "B.src"))
        }
    );

    let calls = t.recorder.calls();
    let third_poll = calls
        .iter()
        .enumerate()
        .filter(|(_, c)| matches!(c, Call::Progress { .. }))
        .nth(2)
        .map(|(i, _)| i)
        .expect("three polls");
    // nothing at all happens once the abort was handed out
    assert_equal!(third_poll, calls.len() - 1);
    assert_equal!(
        t.recorder.unit_starts(),
        vec![
            ("parse".to_string(), "A.src".to_string()),
            ("parse".to_string(), "B.src".to_string()),
        ]
    );
    Ok(())
}

#[test]
fn empty_workload_reports_zero_of_zero() -> Result<()> {
    let no_units: &[&str] = &[];
    let plan = Plan::uniform(&["parse", "emit"], no_units)?;
    let mut t = TestObserver::new(Recorder::new());
    let report = Driver::new(plan).run(&mut t.fanout, |_, _| Ok(()))?;

    assert_equal!(report.outcome, Outcome::Completed);
    assert_equal!(t.recorder.calls(), vec![Call::progress(0, 0)]);
    assert_equal!(
        t.output.to_string(),
        "[ ] | PROGRESS | [####################] 0/0\n".to_string()
    );
    Ok(())
}

#[test]
fn every_unit_starts_once_per_phase() -> Result<()> {
    let plan = Plan::builder()
        .phase("parse", &["A.src", "B.src", "C.src"])
        .phase("typecheck", &["A.src", "B.src", "C.src"])
        .phase("link", &["app"])
        .build()?;
    let mut t = TestObserver::new(Recorder::new());
    let mut worked = vec![];
    let report = Driver::new(plan).run(&mut t.fanout, |phase, unit| {
        worked.push((phase.to_string(), unit.to_string()));
        Ok(())
    })?;

    let starts = t.recorder.unit_starts();
    let unique = starts.iter().cloned().collect::<BTreeSet<_>>();
    assert_equal!(starts.len(), 7usize);
    assert_equal!(unique.len(), 7usize);
    // announced before any work was done on it, and in the same order
    assert_equal!(&starts, &worked);
    assert_equal!(report.units_started, 7u64);
    Ok(())
}

#[test]
fn repeated_identical_polls_are_harmless() -> Result<()> {
    let mut once = Recorder::new();
    let mut twice = Recorder::new();

    let answers = vec![
        once.report_progress(5, 10)?,
        twice.report_progress(5, 10)?,
        twice.report_progress(5, 10)?,
    ];
    assert_equal!(answers, vec![Signal::Continue; 3]);

    // the second call is recorded, but nothing else changes
    assert_equal!(once.polls(), 1usize);
    assert_equal!(twice.polls(), 2usize);
    assert_equal!(
        twice.calls(),
        vec![Call::progress(5, 10), Call::progress(5, 10)]
    );
    Ok(())
}

#[test]
fn work_failure_is_its_own_outcome() -> Result<()> {
    let mut t = TestObserver::new(Recorder::new());
    let report = Driver::new(scenario_plan()).run(&mut t.fanout, |phase, unit| {
        anyhow::ensure!(
            !(phase == "parse" && unit == "B.src"),
            "B.src:1: unexpected token"
        );
        Ok(())
    })?;

    assert_equal!(report.outcome.is_failed(), true);
    assert_equal!(report.outcome.is_aborted(), false);
    assert_equal!(t.recorder.unit_starts().len(), 2usize);
    Ok(())
}

#[test]
fn observer_failure_is_a_driver_error() {
    let mut recorder = Recorder::new().fail_on_poll(2);
    let result = Driver::new(scenario_plan()).run(&mut recorder, |_, _| Ok(()));

    let err = result.err().expect("observer fault must surface");
    assert_matches_regex!(
        format!("{:?}", err).as_str(),
        r"^\[Controller\] report_progress\n  1/4\n\nCaused by:\n    recorder failed poll #2"
    );
    // nothing after the failing call
    assert_equal!(recorder.calls().len(), 3usize);
}

#[test]
fn failing_unit_notification_is_a_driver_error() {
    let mut recorder = Recorder::new().fail_on_unit("emit", "A.src");
    let err = Driver::new(scenario_plan())
        .run(&mut recorder, |_, _| Ok(()))
        .err()
        .expect("observer fault must surface");

    assert_matches_regex!(
        format!("{:?}", err).as_str(),
        r"\[Controller\] unit_starting\n  emit: A.src"
    );
    assert_equal!(recorder.unit_starts().len(), 3usize);
}
