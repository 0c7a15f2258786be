use crate::controller::{Controller, Progress, Signal, UnitStart};
use anyhow::Result;
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
pub struct UnitSpan {
    pub start: UnitStart,
    pub started_at: SystemTime,
    pub finished_at: Option<SystemTime>,
}

/// Turns the calls of one build run into unit spans. A unit's span ends when
/// the next unit starts, or when [`TraceObserver::finish`] is called.
#[derive(Debug, Clone, Default)]
pub struct TraceObserver {
    pub spans: Vec<UnitSpan>,
    pub samples: Vec<(SystemTime, Progress)>,
}

impl TraceObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close the span that is still open, if any.
    pub fn finish(&mut self) {
        self.close_open_span(SystemTime::now());
    }

    fn close_open_span(&mut self, at: SystemTime) {
        if let Some(span) = self.spans.last_mut() {
            span.finished_at.get_or_insert(at);
        }
    }

    /// Chrome trace-event JSON (chrome://tracing, Perfetto). Every phase
    /// gets its own track, progress samples become a counter.
    pub fn to_chrome_trace(&self) -> Result<String> {
        fn unix_micros(ts: SystemTime) -> Result<u64> {
            let since_the_epoch = ts.duration_since(UNIX_EPOCH)?;
            Ok(since_the_epoch.as_micros() as u64)
        }

        #[derive(serde::Serialize)]
        struct ChromeTraceEvent {
            name: String,
            cat: String,
            ph: &'static str,
            pid: u64,
            ts: u64,
            tid: u64,
            args: BTreeMap<String, String>,
        }

        let mut tids: Vec<&str> = vec![];
        let mut vec = vec![];

        for span in &self.spans {
            let phase = span.start.phase.as_str();
            let track = match tids.iter().position(|p| *p == phase) {
                Some(i) => i + 1,
                None => {
                    tids.push(phase);
                    tids.len()
                }
            };
            let tid = track as u64;

            let mut args = BTreeMap::new();
            args.insert("phase".to_string(), span.start.phase.clone());
            args.insert("unit".to_string(), span.start.unit.clone());

            vec.push(ChromeTraceEvent {
                name: span.start.unit.clone(),
                cat: span.start.phase.clone(),
                ph: "B",
                pid: 1,
                ts: unix_micros(span.started_at)?,
                tid,
                args: args.clone(),
            });

            if let Some(finished_at) = span.finished_at {
                vec.push(ChromeTraceEvent {
                    name: span.start.unit.clone(),
                    cat: span.start.phase.clone(),
                    ph: "E",
                    pid: 1,
                    ts: unix_micros(finished_at)?,
                    tid,
                    args,
                });
            }
        }

        for (at, progress) in &self.samples {
            let mut args = BTreeMap::new();
            args.insert("current".to_string(), progress.current.to_string());
            args.insert("total".to_string(), progress.total.to_string());
            vec.push(ChromeTraceEvent {
                name: "progress".to_string(),
                cat: "progress".to_string(),
                ph: "C",
                pid: 1,
                ts: unix_micros(*at)?,
                tid: 0,
                args,
            });
        }

        Ok(serde_json::to_string_pretty(&vec)?)
    }
}

impl Controller for TraceObserver {
    fn unit_starting(&mut self, phase: &str, unit: &str) -> Result<()> {
        let now = SystemTime::now();
        self.close_open_span(now);
        self.spans.push(UnitSpan {
            start: UnitStart::new(phase, unit),
            started_at: now,
            finished_at: None,
        });
        Ok(())
    }

    fn report_progress(&mut self, current: u64, total: u64) -> Result<Signal> {
        self.samples
            .push((SystemTime::now(), Progress::new(current, total)));
        Ok(Signal::Continue)
    }
}
