// Copyright 2026 the VHUD Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Discovery of the most prominent video element.
//!
//! [`VideoTracker`] picks the video with the largest on-screen area and
//! remembers it, so callers learn about identity changes rather than about
//! every document mutation.

use crate::error::HudError;
use crate::metrics::DisplayMetrics;
use crate::platform::{Epoch, VideoElement, VideoSource};

/// Outcome of re-evaluating the best candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackerUpdate {
    /// The tracked video is the same element as before (or still none).
    Unchanged,
    /// A different element is now tracked.
    Switched,
    /// The tracked element is gone and no candidate remains.
    Lost,
}

/// Returns the candidate with the largest bounding-box area.
///
/// Ties keep the earliest candidate. Degenerate rectangles count as zero area.
pub fn best_candidate<V: VideoElement>(candidates: impl IntoIterator<Item = V>) -> Option<V> {
    let mut best: Option<(V, f64)> = None;
    for video in candidates {
        let area = visible_area(&video);
        match &best {
            Some((_, best_area)) if area <= *best_area => {}
            _ => best = Some((video, area)),
        }
    }
    best.map(|(video, _)| video)
}

fn visible_area<V: VideoElement>(video: &V) -> f64 {
    let area = video.bounding_rect().abs().area();
    if area.is_finite() { area } else { 0.0 }
}

/// Tracks the most prominent video of a [`VideoSource`].
#[derive(Debug)]
pub struct VideoTracker<S: VideoSource> {
    source: S,
    current: Option<S::Video>,
    observing: bool,
}

impl<S: VideoSource> VideoTracker<S> {
    /// Creates a tracker that is not yet observing.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            current: None,
            observing: false,
        }
    }

    /// Returns the best candidate currently in the document, without
    /// changing the tracked element.
    #[must_use]
    pub fn find_best(&self) -> Option<S::Video> {
        best_candidate(self.source.videos())
    }

    /// The element currently tracked.
    #[must_use]
    pub fn current(&self) -> Option<&S::Video> {
        self.current.as_ref()
    }

    /// Subscribes to structural document changes.
    pub fn observe(&mut self, epoch: Epoch) -> Result<(), HudError> {
        self.source.observe(epoch)?;
        self.observing = true;
        Ok(())
    }

    /// Re-evaluates the best candidate and reports whether the tracked
    /// identity changed.
    pub fn refresh(&mut self) -> TrackerUpdate {
        let best = self.find_best();
        if best == self.current {
            return TrackerUpdate::Unchanged;
        }
        let update = if best.is_some() {
            TrackerUpdate::Switched
        } else {
            TrackerUpdate::Lost
        };
        log::debug!(target: "vhud::tracker", "tracked video {update:?}");
        self.current = best;
        update
    }

    /// Reads the tracked video's geometry and counters.
    #[must_use]
    pub fn sample(&self, fps: Option<f64>) -> Option<DisplayMetrics> {
        let video = self.current.as_ref()?;
        Some(DisplayMetrics {
            intrinsic: video.intrinsic_size(),
            displayed: video.bounding_rect().abs().size(),
            fps,
            quality: video.playback_quality(),
        })
    }

    /// Unsubscribes and forgets the tracked element. Idempotent.
    pub fn stop(&mut self) {
        if self.observing {
            self.source.disconnect();
            self.observing = false;
        }
        self.current = None;
    }
}
