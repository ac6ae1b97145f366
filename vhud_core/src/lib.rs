// Copyright 2026 the VHUD Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Platform-independent core of a heads-up display for web video.
//!
//! `vhud_core` finds the most prominent video element on a page, estimates its
//! presented frame rate, and drives a small draggable overlay panel that shows
//! resolution, frame-rate and dropped-frame readings. It is `no_std`
//! compatible (with `alloc`); every browser interaction goes through the
//! traits in [`platform`].
//!
//! # Architecture
//!
//! The host turns every asynchronous callback into a [`Signal`] and hands it
//! to the controller, which routes it by kind:
//!
//! ```text
//!   Platform (frame loops, timers, observers, listeners)
//!       │
//!       ▼
//!   Signal ──► Controller::dispatch()
//!                 │
//!     ┌───────────┼────────────────┬─────────────────┐
//!     ▼           ▼                ▼                 ▼
//!   Render     VideoFrame/Poll   Mutation          Input/IdleCheck
//!     │           │                │                 │
//!     ▼           ▼                ▼                 ▼
//!   VideoTracker  FrameRateEstimator  VideoTracker   Overlay
//!     │           │                                  │
//!     └──► DisplayMetrics::lines() ──► Overlay ──► Panel
//! ```
//!
//! **[`tracker`]**: Picks the video with the largest on-screen area and
//! reports identity changes.
//!
//! **[`estimator`]**: Frame-rate estimation over windows of at least one
//! second, via frame-presentation callbacks or counter polling.
//!
//! **[`overlay`]**: Hidden/visible/dragging state machine, hide deadlines
//! and viewport clamping.
//!
//! **[`controller`]**: Lifecycle (`init`, `cleanup`, `apply`) and epoch
//! based liveness of armed callbacks.
//!
//! **[`settings`]**: The persisted settings record and the
//! [`SettingsStore`](settings::SettingsStore) contract.
//!
//! **[`messaging`]**: `VHUD_PING`/`VHUD_APPLY` request protocol.
//!
//! **[`metrics`]**: Measured values and their text rendering.
//!
//! **[`time`]**: Microsecond host time.
//!
//! # Logging
//!
//! Components log through the [`log`] facade under `vhud::*` targets. The
//! host installs a logger; without one, records are discarded.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//!
//! [`Signal`]: platform::Signal

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod controller;
pub mod error;
pub mod estimator;
pub mod messaging;
pub mod metrics;
pub mod overlay;
pub mod platform;
pub mod settings;
pub mod time;
pub mod tracker;

#[cfg(test)]
mod testing;

pub use controller::Controller;
pub use error::HudError;
pub use settings::Settings;
