//! Terminal output for CLI commands.
//!
//! Human-readable lines by default; with `--json` every line is a JSON
//! object `{"type": ..., "payload": ...}` so scripts can consume it.

use std::fmt::Display;

use owo_colors::OwoColorize;
use parking_lot::{const_rwlock, RwLock};
use serde_json::{json, Value};

/// Output switches taken from the global CLI flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    pub json: bool,
    pub quiet: bool,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }
}

static OUTPUT: RwLock<OutputConfig> = const_rwlock(OutputConfig::new(false, false));

/// Apply output settings from global CLI flags.
pub fn configure(config: OutputConfig) {
    *OUTPUT.write() = config;
}

fn current() -> OutputConfig {
    *OUTPUT.read()
}

#[must_use]
pub fn is_quiet() -> bool {
    current().quiet
}

fn emit(kind: &str, payload: Value) {
    println!("{}", json!({ "type": kind, "payload": payload }));
}

/// Returns true when the line was handled in JSON mode or suppressed.
fn handled(kind: &str, payload: impl FnOnce() -> Value) -> bool {
    let config = current();
    if config.json {
        emit(kind, payload());
        return true;
    }
    config.quiet
}

/// Print the application name and version.
pub fn header(version: &str) {
    if handled("header", || json!({ "app": "ordercache", "version": version })) {
        return;
    }
    println!("{} {}", "ordercache".bold(), version.dimmed());
    println!();
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    let value = value.to_string();
    if handled("field", || json!({ "label": label, "value": value })) {
        return;
    }
    println!("  {:<12} {}", label.dimmed(), value);
}

pub fn success(message: &str) {
    if handled("success", || json!({ "message": message })) {
        return;
    }
    println!("  {} {}", "✓".green(), message);
}

/// Warnings are printed even in quiet mode.
pub fn warning(message: &str) {
    if current().json {
        emit("warning", json!({ "message": message }));
        return;
    }
    println!("  {} {}", "⚠".yellow(), message);
}

/// Print an error line to stderr.
pub fn error(message: &str) {
    if current().json {
        eprintln!("{}", json!({ "type": "error", "payload": { "message": message } }));
        return;
    }
    eprintln!("  {} {}", "×".red(), message);
}

pub fn section(title: &str) {
    if handled("section", || json!({ "title": title })) {
        return;
    }
    println!();
    println!("{}", title.bold());
}
