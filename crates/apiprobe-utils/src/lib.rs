pub mod atomic_write;
pub mod error;
pub mod exit_codes;
pub mod logging;
pub mod report_sink;
pub mod timer;
pub mod types;
