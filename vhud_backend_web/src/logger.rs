// Copyright 2026 the VHUD Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `log` backend for the browser console.

use alloc::format;
use alloc::string::String;

use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::JsValue;
use web_sys::console;

/// Writes `vhud` log records to the console, prefixed with `[VHUD]`.
///
/// Records from other targets are ignored so a page's own logging is not
/// mixed in.
#[derive(Debug)]
pub struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl ConsoleLogger {
    /// Installs the logger and sets the maximum level.
    ///
    /// Only the first installation wins; later calls just adjust the level.
    pub fn install(level: LevelFilter) {
        if log::set_logger(&LOGGER).is_err() {
            log::trace!(target: "vhud::web", "logger already installed");
        }
        log::set_max_level(level);
    }
}

/// Formats one console line.
pub(crate) fn format_line(target: &str, args: &core::fmt::Arguments<'_>) -> String {
    let component = target.strip_prefix("vhud::").unwrap_or(target);
    format!("[VHUD] {component}: {args}")
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.target().starts_with("vhud")
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format_line(record.target(), record.args()));
        match record.level() {
            Level::Error => console::error_1(&line),
            Level::Warn => console::warn_1(&line),
            Level::Info => console::log_1(&line),
            Level::Debug | Level::Trace => console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_names_component() {
        assert_eq!(
            format_line("vhud::estimator", &format_args!("engaged {}", "Precise")),
            "[VHUD] estimator: engaged Precise"
        );
        assert_eq!(
            format_line("vhud", &format_args!("up")),
            "[VHUD] vhud: up"
        );
    }
}
