// Copyright 2026 the VHUD Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! HUD settings record and the store contract.
//!
//! [`Settings`] is a flat record serialized as one camelCase JSON object under
//! [`STORAGE_KEY`]. Every field is optional on the wire: missing fields take
//! their default, so a stored override merges over [`Settings::default`].
//!
//! A controller owns exactly one live record and shares it by reference
//! ([`SharedSettings`]) with the overlay, so position changes made during a
//! drag are visible to the next render tick without copying.

use alloc::rc::Rc;
use alloc::string::{String, ToString as _};
use core::cell::RefCell;

use serde::{Deserialize, Serialize};

use crate::error::HudError;
use crate::time::Duration;

/// Key under which the settings blob is persisted.
pub const STORAGE_KEY: &str = "vhud_settings_v1";

/// Settings shared by reference between the controller and the overlay.
pub type SharedSettings = Rc<RefCell<Settings>>;

/// How the panel is positioned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PosMode {
    /// Anchored to one of the viewport corners.
    #[default]
    #[serde(rename = "corner")]
    Corner,
    /// Explicit `x`/`y` from the top-left of the viewport. Entered by dragging.
    #[serde(rename = "xy", alias = "absolute")]
    Absolute,
}

/// Viewport corner used in [`PosMode::Corner`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    /// Top-left.
    #[serde(rename = "tl", alias = "top-left")]
    TopLeft,
    /// Top-right.
    #[default]
    #[serde(rename = "tr", alias = "top-right")]
    TopRight,
    /// Bottom-left.
    #[serde(rename = "bl", alias = "bottom-left")]
    BottomLeft,
    /// Bottom-right.
    #[serde(rename = "br", alias = "bottom-right")]
    BottomRight,
}

impl Corner {
    /// Returns the CSS properties that anchor the panel to this corner.
    #[must_use]
    pub const fn css_edges(self) -> (&'static str, &'static str) {
        match self {
            Self::TopLeft => ("top", "left"),
            Self::TopRight => ("top", "right"),
            Self::BottomLeft => ("bottom", "left"),
            Self::BottomRight => ("bottom", "right"),
        }
    }
}

/// When the panel content is shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityMode {
    /// Always shown.
    #[default]
    Always,
    /// Shown while the pointer is over the panel.
    Hover,
    /// Shown until the user has been inactive for `idleHideMs`.
    Idle,
}

/// The flat HUD settings record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Whether the HUD renders at all.
    pub enabled: bool,
    /// Foreground (text and handle) CSS color.
    pub fg: String,
    /// Background CSS color.
    pub bg: String,
    /// Font size in px.
    pub font_size: f64,
    /// Content padding in px.
    pub padding: f64,
    /// Corner radius in px.
    pub radius: f64,
    /// Drag handle width in px.
    pub handle_size: f64,
    /// Positioning mode.
    pub pos_mode: PosMode,
    /// Anchor corner for [`PosMode::Corner`].
    pub corner: Corner,
    /// Left offset in px, honored only in [`PosMode::Absolute`].
    pub x: f64,
    /// Top offset in px, honored only in [`PosMode::Absolute`].
    pub y: f64,
    /// Show the displayed (CSS box) resolution line.
    pub show_display: bool,
    /// Show the frame-rate line.
    pub show_fps: bool,
    /// Show the dropped-frames line.
    pub show_dropped: bool,
    /// Visibility policy.
    pub visibility_mode: VisibilityMode,
    /// Inactivity before hiding in [`VisibilityMode::Idle`], in ms.
    pub idle_hide_ms: f64,
    /// Delay before hiding in [`VisibilityMode::Hover`], in ms.
    pub hover_hide_ms: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            fg: "#00ff88".to_string(),
            bg: "rgba(0,0,0,0.75)".to_string(),
            font_size: 14.0,
            padding: 10.0,
            radius: 10.0,
            handle_size: 10.0,
            pos_mode: PosMode::Corner,
            corner: Corner::TopRight,
            x: 10.0,
            y: 10.0,
            show_display: true,
            show_fps: true,
            show_dropped: true,
            visibility_mode: VisibilityMode::Always,
            idle_hide_ms: 1500.0,
            hover_hide_ms: 1200.0,
        }
    }
}

impl Settings {
    /// Parses a stored blob, merging it over the defaults.
    pub fn from_json(raw: &str) -> Result<Self, HudError> {
        let parsed: Self = serde_json::from_str(raw)?;
        Ok(parsed.sanitized())
    }

    /// Serializes the full record.
    pub fn to_json(&self) -> Result<String, HudError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Resolves whatever a store returned into a usable record.
    ///
    /// Absent or unreadable blobs degrade to pure defaults; this never fails.
    #[must_use]
    pub fn from_stored(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        match Self::from_json(raw) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!(target: "vhud::settings", "ignoring stored settings: {err}");
                Self::default()
            }
        }
    }

    /// Wraps the record for sharing between components.
    #[must_use]
    pub fn into_shared(self) -> SharedSettings {
        Rc::new(RefCell::new(self))
    }

    /// Returns a copy with numeric fields forced into usable ranges.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        self.font_size = finite_at_least(self.font_size, 1.0, defaults.font_size);
        self.padding = finite_at_least(self.padding, 0.0, defaults.padding);
        self.radius = finite_at_least(self.radius, 0.0, defaults.radius);
        self.handle_size = finite_at_least(self.handle_size, 0.0, defaults.handle_size);
        self.idle_hide_ms = finite_at_least(self.idle_hide_ms, 0.0, defaults.idle_hide_ms);
        self.hover_hide_ms = finite_at_least(self.hover_hide_ms, 0.0, defaults.hover_hide_ms);
        if !self.x.is_finite() {
            self.x = defaults.x;
        }
        if !self.y.is_finite() {
            self.y = defaults.y;
        }
        self
    }

    /// Inactivity threshold for idle mode.
    #[must_use]
    pub fn idle_hide(&self) -> Duration {
        millis(self.idle_hide_ms)
    }

    /// Hide delay for hover mode.
    #[must_use]
    pub fn hover_hide(&self) -> Duration {
        millis(self.hover_hide_ms)
    }

    /// Height of the drag handle in px.
    #[must_use]
    pub fn handle_height(&self) -> f64 {
        (self.font_size * 3.0).max(40.0)
    }
}

fn finite_at_least(value: f64, min: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.max(min)
    } else {
        fallback
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "sanitized millisecond values are finite and non-negative"
)]
fn millis(ms: f64) -> Duration {
    Duration::from_millis(libm::round(ms.max(0.0)) as u64)
}

/// Persistence for the settings record.
///
/// `load` never fails: implementations degrade to [`Settings::default`] and
/// log. `save` is best-effort; callers log failures and do not retry.
pub trait SettingsStore {
    /// Returns the defaults merged with any stored override.
    fn load(&mut self) -> Settings;

    /// Persists the full record.
    fn save(&mut self, settings: &Settings) -> Result<(), HudError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let s = Settings::from_json(r#"{"fontSize":20,"corner":"bl"}"#).unwrap();
        assert_eq!(s.font_size, 20.0);
        assert_eq!(s.corner, Corner::BottomLeft);
        assert_eq!(s.fg, "#00ff88");
        assert_eq!(s.visibility_mode, VisibilityMode::Always);
        assert!(s.enabled);
    }

    #[test]
    fn original_wire_names_round_trip() {
        let mut s = Settings::default();
        s.pos_mode = PosMode::Absolute;
        s.visibility_mode = VisibilityMode::Idle;
        let json = s.to_json().unwrap();
        assert!(json.contains(r#""posMode":"xy""#), "{json}");
        assert!(json.contains(r#""visibilityMode":"idle""#), "{json}");
        assert!(json.contains(r#""hoverHideMs":1200.0"#), "{json}");
        assert_eq!(Settings::from_json(&json).unwrap(), s);
    }

    #[test]
    fn descriptive_aliases_are_accepted() {
        let s = Settings::from_json(r#"{"posMode":"absolute","corner":"bottom-right"}"#).unwrap();
        assert_eq!(s.pos_mode, PosMode::Absolute);
        assert_eq!(s.corner, Corner::BottomRight);
    }

    #[test]
    fn unreadable_blob_degrades_to_defaults() {
        assert_eq!(Settings::from_stored(Some("{not json")), Settings::default());
        assert_eq!(
            Settings::from_stored(Some(r#"{"corner":"middle"}"#)),
            Settings::default()
        );
        assert_eq!(Settings::from_stored(None), Settings::default());
    }

    #[test]
    fn sanitize_clamps_numbers() {
        let s = Settings::from_json(r#"{"fontSize":0,"padding":-4,"idleHideMs":-1}"#).unwrap();
        assert_eq!(s.font_size, 1.0);
        assert_eq!(s.padding, 0.0);
        assert_eq!(s.idle_hide(), Duration::ZERO);
    }

    #[test]
    fn handle_height_has_a_floor() {
        let mut s = Settings::default();
        assert_eq!(s.handle_height(), 42.0);
        s.font_size = 10.0;
        assert_eq!(s.handle_height(), 40.0);
    }
}
