//! Process executor
//!
//! Runs a staged script as a child process, drains stdout and stderr
//! concurrently, optionally persists them to a log file, and waits for the
//! child under an optional time bound and cancellation token.

mod executor;
mod log_sink;
mod types;


pub use executor::ProcessExecutor;
pub use log_sink::write_log;
pub use types::ExecutionOutput;
