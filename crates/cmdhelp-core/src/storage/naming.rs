//! Staged script file names
//!
//! Names combine a one-second timestamp with the process id and a
//! process-wide sequence number, so two names produced by this process never
//! collide, and names from concurrent processes differ by pid.

use chrono::Local;
use std::sync::atomic::{AtomicU64, Ordering};

/// Prefix of every staged script name
pub const SCRIPT_PREFIX: &str = "run_";

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generate a fresh script file name with the given extension
pub fn script_file_name(extension: &str) -> String {
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        format!("{SCRIPT_PREFIX}{stamp}_{}_{seq}", std::process::id())
    } else {
        format!("{SCRIPT_PREFIX}{stamp}_{}_{seq}.{extension}", std::process::id())
    }
}
