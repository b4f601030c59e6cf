//! Module that prints the coloured console diagnostics of peers and of the shared resource.

use color_print::cprintln;
use std::sync::atomic::{AtomicBool, Ordering};

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Function that enables or disables the output of `debug` lines.
pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

/// Function that tells if `debug` lines are printed.
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

pub fn info(msg: &str) {
    cprintln!("<green, bold>[INFO]</green, bold> {}", msg);
}

pub fn warn(msg: &str) {
    cprintln!("<yellow, bold>[WARN]</yellow, bold> {}", msg);
}

pub fn error(msg: &str) {
    color_print::ceprintln!("<red, bold>[ERROR]</red, bold> {}", msg);
}

pub fn debug(msg: &str) {
    if is_verbose() {
        cprintln!("<blue, bold>[DEBUG]</blue, bold> {}", msg);
    }
}
