// Copyright 2026 the VHUD Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Request/response protocol between the injection layer and a running HUD.
//!
//! Requests are JSON objects tagged by `type`:
//!
//! | `type`       | Effect                                   |
//! |--------------|------------------------------------------|
//! | `VHUD_PING`  | Liveness probe, always answered `ok`.    |
//! | `VHUD_APPLY` | Reload settings and reinitialize the HUD. |
//!
//! Every request is answered with `{"ok": bool}` plus an `error` string when
//! `ok` is false.

use alloc::string::{String, ToString as _};

use serde::{Deserialize, Serialize};

use crate::error::HudError;

/// A request addressed to the HUD.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Liveness probe.
    #[serde(rename = "VHUD_PING")]
    Ping,
    /// Tear down and reinitialize with freshly loaded settings.
    #[serde(rename = "VHUD_APPLY")]
    Apply,
}

impl Request {
    /// Parses a JSON request.
    pub fn parse(raw: &str) -> Result<Self, HudError> {
        serde_json::from_str(raw).map_err(|err| HudError::Protocol(err.to_string()))
    }
}

/// Reply to a [`Request`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Whether the request succeeded.
    pub ok: bool,
    /// Failure description; absent on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    /// A successful reply.
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    /// A failed reply carrying `err`'s description.
    #[must_use]
    pub fn failed(err: &HudError) -> Self {
        Self {
            ok: false,
            error: Some(err.to_string()),
        }
    }

    /// Serializes the reply.
    pub fn to_json(&self) -> Result<String, HudError> {
        serde_json::to_string(self).map_err(|err| HudError::Protocol(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_requests_parse() {
        assert_eq!(Request::parse(r#"{"type":"VHUD_PING"}"#).unwrap(), Request::Ping);
        assert_eq!(
            Request::parse(r#"{"type":"VHUD_APPLY","extra":1}"#).unwrap(),
            Request::Apply
        );
    }

    #[test]
    fn unknown_requests_are_protocol_errors() {
        for raw in [r#"{"type":"VHUD_NOPE"}"#, "{}", "ping"] {
            assert!(
                matches!(Request::parse(raw), Err(HudError::Protocol(_))),
                "{raw}"
            );
        }
    }

    #[test]
    fn replies_omit_error_on_success() {
        assert_eq!(Response::ok().to_json().unwrap(), r#"{"ok":true}"#);
        let failed = Response::failed(&HudError::Platform("no body".to_string()));
        assert_eq!(
            failed.to_json().unwrap(),
            r#"{"ok":false,"error":"platform: no body"}"#
        );
    }
}
