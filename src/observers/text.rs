use crate::controller::{Controller, Progress, Signal, UnitStart};
use anyhow::Result;
use chrono::prelude::*;
use chrono::{DateTime, Local, Utc};
use colored::*;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, SystemTime};

const PROGRESS_BAR_LEN: u64 = 20;

/// Simple observer that logs every call into STDERR
pub struct StdioObserver {
    pub timestamp_format: Option<TimestampFormat>,
    /// By default this observer writes to STDERR,
    /// this flag will make it write to STDOUT instead
    pub use_stdout: bool,
    first_call_at: Option<SystemTime>,
}

// Same lines as the STDIO observer, but kept in a string it owns so they can
// later be inspected/dumped.
#[derive(Clone)]
pub struct StringObserver {
    pub output: Arc<Mutex<String>>,
    timestamp_format: Arc<RwLock<TimestampFormat>>,
    duration_format: Arc<RwLock<DurationFormat>>,
    first_call_at: Arc<Mutex<Option<SystemTime>>>,
    strip_ansi: bool,
}

impl StdioObserver {
    pub fn new() -> Self {
        Self {
            timestamp_format: None,
            use_stdout: false,
            first_call_at: None,
        }
    }

    fn print(&mut self, line: Line) {
        let now = SystemTime::now();
        let first_call_at = *self.first_call_at.get_or_insert(now);
        let timestamp_format = self.timestamp_format.unwrap_or(TimestampFormat::UTC);
        let result = make_string(
            &line,
            now,
            now.duration_since(first_call_at).unwrap_or_default(),
            timestamp_format,
            DurationFormat::Milliseconds,
        );

        if self.use_stdout {
            println!("{}", result);
        } else {
            eprintln!("{}", result);
        }
    }
}

#[derive(Clone, Copy)]
#[allow(clippy::upper_case_acronyms)]
pub enum TimestampFormat {
    UTC,
    Local,
    None,
    Redacted,
}

/// Time elapsed since the observer saw its first call.
#[derive(Clone, Copy)]
pub enum DurationFormat {
    Milliseconds,
    None,
}

pub enum Line {
    Starting(UnitStart),
    Progress(Progress),
}

impl Controller for StdioObserver {
    fn unit_starting(&mut self, phase: &str, unit: &str) -> Result<()> {
        self.print(Line::Starting(UnitStart::new(phase, unit)));
        Ok(())
    }

    fn report_progress(&mut self, current: u64, total: u64) -> Result<Signal> {
        self.print(Line::Progress(Progress::new(current, total)));
        Ok(Signal::Continue)
    }
}

pub fn strip_ansi(s: &str) -> String {
    String::from_utf8(
        strip_ansi_escapes::strip(s).expect("Cant strip ANSI escape characters from a string"),
    )
    .expect("not a utf8 string")
}

impl StringObserver {
    pub fn new() -> Self {
        Self {
            output: Arc::new(Mutex::new(String::new())),
            timestamp_format: Arc::new(RwLock::new(TimestampFormat::Redacted)),
            duration_format: Arc::new(RwLock::new(DurationFormat::None)),
            first_call_at: Arc::new(Mutex::new(None)),
            strip_ansi: true,
        }
    }

    pub fn set_timestamp_format(&self, format: TimestampFormat) {
        *self.timestamp_format.write().unwrap() = format;
    }

    pub fn log_duration(&self, enabled: bool) {
        *self.duration_format.write().unwrap() = if enabled {
            DurationFormat::Milliseconds
        } else {
            DurationFormat::None
        };
    }

    fn push(&self, line: Line) {
        let now = SystemTime::now();
        let first_call_at = *self
            .first_call_at
            .lock()
            .expect("poisoned lock")
            .get_or_insert(now);
        let timestamp_format = *self.timestamp_format.read().unwrap();
        let duration_format = *self.duration_format.read().unwrap();
        let mut result = make_string(
            &line,
            now,
            now.duration_since(first_call_at).unwrap_or_default(),
            timestamp_format,
            duration_format,
        );
        if self.strip_ansi {
            result = strip_ansi(&result);
        }
        let mut output = self.output.lock().expect("poisoned lock");
        output.push_str(&result);
        output.push('\n');
    }
}

impl Controller for StringObserver {
    fn unit_starting(&mut self, phase: &str, unit: &str) -> Result<()> {
        self.push(Line::Starting(UnitStart::new(phase, unit)));
        Ok(())
    }

    fn report_progress(&mut self, current: u64, total: u64) -> Result<Signal> {
        self.push(Line::Progress(Progress::new(current, total)));
        Ok(Signal::Continue)
    }
}

impl std::fmt::Display for StringObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.output.lock().expect("poisoned lock");
        write!(f, "{}", &s)
    }
}

pub fn make_string(
    line: &Line,
    at: SystemTime,
    since_first_call: Duration,
    timestamp_format: TimestampFormat,
    duration_format: DurationFormat,
) -> String {
    let timestamp = match timestamp_format {
        TimestampFormat::None => String::new(),
        TimestampFormat::Redacted => "[ ] ".to_string(), // for testing
        TimestampFormat::Local => {
            let datetime: DateTime<Local> = at.into();
            let rounded = datetime.round_subsecs(0);
            let formatted = rounded.format("%I:%M:%S%p");
            format!("[{}] ", formatted).dimmed().to_string()
        }
        TimestampFormat::UTC => {
            let datetime: DateTime<Utc> = at.into();
            let rounded = datetime.round_subsecs(0);
            format!("[{:?}] ", rounded).dimmed().to_string()
        }
    };

    let body = match line {
        Line::Starting(start) => format!("| STARTING | {}", start.to_string().yellow()),
        Line::Progress(progress) => {
            format!("| PROGRESS | {} {}", make_progress_bar(progress), progress)
        }
    };

    match duration_format {
        DurationFormat::Milliseconds => format!(
            "{}{:<60}{}",
            timestamp,
            body,
            format_duration(since_first_call, duration_format)
        ),
        DurationFormat::None => format!("{}{}", timestamp, body),
    }
}

pub fn make_progress_bar(progress: &Progress) -> String {
    let done_blocks_len = (progress.fraction() * PROGRESS_BAR_LEN as f64).floor() as u64;
    let done_blocks_len = std::cmp::min(done_blocks_len, PROGRESS_BAR_LEN);
    let todo_blocks_len = PROGRESS_BAR_LEN - done_blocks_len;
    let done_blocks = "#".repeat(done_blocks_len as usize).green();
    let todo_blocks = ".".repeat(todo_blocks_len as usize).dimmed();
    format!("[{}{}]", done_blocks, todo_blocks)
}

fn format_duration(d: Duration, format: DurationFormat) -> String {
    match format {
        DurationFormat::Milliseconds => format!("|{:>6}ms", d.as_millis()),
        DurationFormat::None => String::new(),
    }
}
