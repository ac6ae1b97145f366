// Copyright 2026 the VHUD Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-tick display metrics and their text rendering.

use alloc::format;
use alloc::string::{String, ToString as _};
use alloc::vec::Vec;

use kurbo::Size;

use crate::settings::Settings;

/// Line shown in place of metrics while no video is tracked.
pub const NO_VIDEO_LINE: &str = "No video detected";

/// Placeholder for values that cannot be measured.
pub const NOT_AVAILABLE: &str = "n/a";

/// Decoded/dropped frame counters reported by the video.
///
/// Either counter may be unavailable, in which case it is `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaybackQuality {
    /// Total frames decoded so far.
    pub total_frames: Option<u64>,
    /// Frames dropped so far.
    pub dropped_frames: Option<u64>,
}

impl PlaybackQuality {
    /// Both counters unavailable.
    pub const UNAVAILABLE: Self = Self {
        total_frames: None,
        dropped_frames: None,
    };

    /// Returns `(dropped, percent)` when both counters exist and the total is
    /// non-zero.
    #[must_use]
    pub fn dropped_ratio(&self) -> Option<(u64, f64)> {
        let total = self.total_frames?;
        let dropped = self.dropped_frames?;
        if total == 0 {
            return None;
        }
        Some((dropped, dropped as f64 / total as f64 * 100.0))
    }
}

/// Everything the controller reads from the tracked video in one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayMetrics {
    /// Intrinsic (decoded) resolution.
    pub intrinsic: (u32, u32),
    /// Displayed CSS box size.
    pub displayed: Size,
    /// Current frame-rate estimate.
    pub fps: Option<f64>,
    /// Playback-quality counters.
    pub quality: PlaybackQuality,
}

impl DisplayMetrics {
    /// Renders the metric lines enabled in `settings`, in display order.
    #[must_use]
    pub fn lines(&self, settings: &Settings) -> Vec<String> {
        let mut lines = Vec::with_capacity(4);
        lines.push(format!("REAL:    {}×{}", self.intrinsic.0, self.intrinsic.1));
        if settings.show_display {
            lines.push(format!(
                "DISPLAY: {}×{}",
                round_px(self.displayed.width),
                round_px(self.displayed.height)
            ));
        }
        if settings.show_fps {
            lines.push(format!("FPS:     {}", format_fps(self.fps)));
        }
        if settings.show_dropped {
            lines.push(format_dropped(&self.quality));
        }
        lines
    }
}

/// Formats a frame rate to one decimal, or `n/a`.
#[must_use]
pub fn format_fps(fps: Option<f64>) -> String {
    match fps {
        Some(fps) if fps.is_finite() => format!("{fps:.1}"),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Formats the dropped-frames line.
#[must_use]
pub fn format_dropped(quality: &PlaybackQuality) -> String {
    match quality.dropped_ratio() {
        Some((dropped, pct)) => format!("DROPPED: {dropped} ({pct:.2}%)"),
        None => format!("DROPPED: {NOT_AVAILABLE}"),
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "CSS box sizes are far inside i64 range"
)]
fn round_px(v: f64) -> i64 {
    if v.is_finite() { libm::round(v) as i64 } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> DisplayMetrics {
        DisplayMetrics {
            intrinsic: (1920, 1080),
            displayed: Size::new(959.6, 540.2),
            fps: Some(59.94),
            quality: PlaybackQuality {
                total_frames: Some(200),
                dropped_frames: Some(5),
            },
        }
    }

    #[test]
    fn dropped_line_with_counters() {
        assert_eq!(format_dropped(&metrics().quality), "DROPPED: 5 (2.50%)");
    }

    #[test]
    fn dropped_line_without_usable_counters() {
        let cases = [
            PlaybackQuality::UNAVAILABLE,
            PlaybackQuality {
                total_frames: Some(100),
                dropped_frames: None,
            },
            PlaybackQuality {
                total_frames: None,
                dropped_frames: Some(3),
            },
            PlaybackQuality {
                total_frames: Some(0),
                dropped_frames: Some(0),
            },
        ];
        for quality in cases {
            assert_eq!(format_dropped(&quality), "DROPPED: n/a", "{quality:?}");
        }
    }

    #[test]
    fn fps_is_one_decimal_or_na() {
        assert_eq!(format_fps(Some(59.94)), "59.9");
        assert_eq!(format_fps(Some(0.0)), "0.0");
        assert_eq!(format_fps(None), "n/a");
    }

    #[test]
    fn all_lines_in_order() {
        let lines = metrics().lines(&Settings::default());
        assert_eq!(
            lines,
            [
                "REAL:    1920×1080",
                "DISPLAY: 960×540",
                "FPS:     59.9",
                "DROPPED: 5 (2.50%)",
            ]
        );
    }

    #[test]
    fn disabled_lines_are_skipped() {
        let settings = Settings {
            show_display: false,
            show_fps: false,
            show_dropped: false,
            ..Settings::default()
        };
        assert_eq!(metrics().lines(&settings), ["REAL:    1920×1080"]);
    }
}
