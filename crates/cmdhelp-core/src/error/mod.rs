//! Error types for cmdhelp
//!
//! Every failure in the stage/execute/cleanup pipeline is reported through
//! [`HelperError`]. Failures are synchronous and never retried; each variant
//! carries a stable [`HelperError::error_code`] for programmatic handling.

mod constructors;
mod types;

pub use types::{HelperError, HelperResult};
