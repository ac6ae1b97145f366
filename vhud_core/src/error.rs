// Copyright 2026 the VHUD Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type shared by the core and its platform implementations.

use alloc::string::{String, ToString as _};

/// Errors surfaced by HUD components.
///
/// None of these are fatal to the host page: store failures degrade to
/// defaults, registration failures deactivate a measurement strategy, and
/// platform failures abort the current `init` with a report to the caller.
#[derive(Debug, thiserror::Error)]
pub enum HudError {
    /// The settings store could not be read or written.
    #[error("settings store: {0}")]
    Store(String),
    /// A settings blob could not be encoded or decoded.
    #[error("settings format: {0}")]
    Settings(String),
    /// A frame-presentation callback could not be registered.
    #[error("frame callback registration failed: {0}")]
    Registration(String),
    /// A host API call failed (DOM creation, listener wiring, timers).
    #[error("platform: {0}")]
    Platform(String),
    /// A request from the injection layer could not be understood.
    #[error("protocol: {0}")]
    Protocol(String),
}

impl From<serde_json::Error> for HudError {
    fn from(err: serde_json::Error) -> Self {
        Self::Settings(err.to_string())
    }
}
