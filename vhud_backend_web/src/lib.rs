// Copyright 2026 the VHUD Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser backend for the video HUD.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`RafLoop`]: `requestAnimationFrame` frame loop
//! - [`IntervalTimer`]: `setInterval` timer for counter polling
//! - [`DomPanel`]: DOM presentation of the overlay panel
//! - [`DocumentVideoSource`] / [`WebVideo`]: video discovery, document
//!   observation, frame-presentation callbacks and playback counters
//! - [`LocalStorageStore`]: settings persistence
//! - [`InputListeners`]: pointer, keyboard, wheel and resize listeners
//! - [`ConsoleLogger`]: `log` backend writing to the browser console
//!
//! Every asynchronous browser callback is turned into a
//! [`Signal`](vhud_core::platform::Signal) and handed to a [`SignalSink`].

#![no_std]

extern crate alloc;

mod input;
mod logger;
mod panel;
mod raf;
mod store;
mod timer;
mod video;

pub use input::InputListeners;
pub use logger::ConsoleLogger;
pub use panel::DomPanel;
pub use raf::RafLoop;
pub use store::LocalStorageStore;
pub use timer::IntervalTimer;
pub use video::{DocumentVideoSource, WebVideo};

use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;

use kurbo::Size;
use vhud_core::error::HudError;
use vhud_core::platform::Signal;
use vhud_core::time::HostTime;
use wasm_bindgen::{JsCast as _, JsValue};

/// Receiver for signals produced by browser callbacks.
pub type SignalSink = Rc<dyn Fn(Signal)>;

/// Returns the current host time from `performance.now()`.
#[must_use]
pub fn now() -> HostTime {
    HostTime::from_millis_f64(raf::performance_now())
}

/// Returns the layout viewport size (`innerWidth` × `innerHeight`).
#[must_use]
pub fn viewport(window: &web_sys::Window) -> Size {
    let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    Size::new(dim(window.inner_width()), dim(window.inner_height()))
}

/// Extracts a readable message from a thrown JS value.
#[must_use]
pub fn js_message(err: &JsValue) -> String {
    if let Some(err) = err.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

/// Wraps a thrown JS value as a platform error with context.
#[must_use]
pub fn platform_error(context: &str, err: &JsValue) -> HudError {
    HudError::Platform(format!("{context}: {}", js_message(err)))
}
