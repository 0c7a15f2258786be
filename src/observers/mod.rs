pub mod cancel;
pub mod recorder;
pub mod text;
pub mod trace;

pub use cancel::{CancelHandle, Cancellable};
pub use recorder::{Call, Recorder};
pub use text::{StdioObserver, StringObserver};
pub use trace::TraceObserver;
