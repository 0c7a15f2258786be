use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

lazy_static::lazy_static! {
    static ref INCREMENTAL_RUN_ID: AtomicU64 = AtomicU64::new(1);
}

/// Identifies one build run. A fresh id is handed out for every
/// `Driver::run`, ids never repeat within a process.
#[derive(Clone, Copy, Hash, PartialOrd, PartialEq, Ord, Eq, Debug)]
pub struct RunId(u64);

impl RunId {
    pub fn new() -> Self {
        RunId(INCREMENTAL_RUN_ID.fetch_add(1, Ordering::SeqCst))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{}", self.0)
    }
}
