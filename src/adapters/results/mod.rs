//! Results adapters - filesystem bundle and log capture.

mod fs_store;
mod log_capture;

pub use fs_store::{FsResultsStore, LATEST_LINK, RUN_DIR_FORMAT};
pub use log_capture::{LogCapture, LogCaptureWriter};
