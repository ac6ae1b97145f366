// Copyright 2026 the VHUD Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-rate estimation for the tracked video.
//!
//! Two mutually exclusive strategies feed the same [`RateWindow`]:
//!
//! - **Precise**: the video's frame-presentation callback reports a
//!   presented-frame counter on every painted frame. The callback re-arms
//!   itself after each delivery.
//! - **Polling**: a fixed [`POLL_INTERVAL`] timer samples the decoded-frame
//!   counter.
//!
//! Precise is chosen whenever the element supports it. Rates are only
//! committed over windows of at least [`MIN_WINDOW`]; shorter windows keep
//! accumulating, so each estimate spans a real interval of one second or
//! more regardless of callback jitter.
//!
//! A registration failure deactivates the strategy for the current video.
//! The estimator does not retry and does not switch to polling; the last
//! committed rate stays visible until the video changes.

use crate::platform::{Epoch, VideoElement};
use crate::time::{Duration, HostTime};

/// Sampling period of the polling strategy.
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Shortest window a rate is ever computed over.
pub const MIN_WINDOW: Duration = Duration::SECOND;

/// Measurement strategy in use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Nothing attached yet.
    #[default]
    None,
    /// Frame-presentation callbacks.
    Precise,
    /// Fixed-interval counter sampling.
    Polling,
}

/// Counter/time baseline that commits a rate once a full window elapsed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RateWindow {
    baseline: Option<(u64, HostTime)>,
}

impl RateWindow {
    /// Feeds one counter reading.
    ///
    /// The first reading primes the baseline. Later readings return a rate
    /// only once at least [`MIN_WINDOW`] has elapsed since the baseline, and
    /// then advance the baseline. A counter that moves backwards re-primes.
    pub fn observe(&mut self, count: u64, now: HostTime) -> Option<f64> {
        let Some((base_count, base_time)) = self.baseline else {
            self.baseline = Some((count, now));
            return None;
        };
        if count < base_count {
            self.baseline = Some((count, now));
            return None;
        }
        let elapsed = now.saturating_duration_since(base_time);
        if elapsed < MIN_WINDOW {
            return None;
        }
        self.baseline = Some((count, now));
        Some((count - base_count) as f64 / elapsed.as_secs_f64())
    }

    /// The last committed `(count, time)` pair.
    #[must_use]
    pub fn baseline(&self) -> Option<(u64, HostTime)> {
        self.baseline
    }
}

/// Read-only view of the estimator state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameRateSample {
    /// Strategy in use.
    pub strategy: Strategy,
    /// Counter value at the last commit point.
    pub last_count: Option<u64>,
    /// Time of the last commit point.
    pub last_sample: Option<HostTime>,
    /// Current estimate; `None` until the first full window.
    pub fps: Option<f64>,
}

/// Estimates frames per second for one video at a time.
#[derive(Clone, Debug, Default)]
pub struct FrameRateEstimator {
    strategy: Strategy,
    active: bool,
    window: RateWindow,
    fps: Option<f64>,
}

impl FrameRateEstimator {
    /// Creates an idle estimator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches to `video`, preferring the precise strategy.
    ///
    /// Returns the chosen strategy. When it is [`Strategy::Polling`] the
    /// caller arms a [`POLL_INTERVAL`] timer that calls
    /// [`on_poll`](Self::on_poll). Calling this again after a strategy was
    /// chosen, including one that has since deactivated, changes nothing.
    pub fn engage<V: VideoElement>(&mut self, video: &V, epoch: Epoch) -> Strategy {
        if self.strategy != Strategy::None {
            return self.strategy;
        }
        if video.supports_frame_callbacks() {
            self.strategy = Strategy::Precise;
            self.active = true;
            if let Err(err) = video.request_frame_callback(epoch) {
                log::error!(target: "vhud::estimator", "precise strategy unavailable: {err}");
                self.active = false;
            }
        } else {
            self.strategy = Strategy::Polling;
            self.active = true;
        }
        log::debug!(target: "vhud::estimator", "engaged {:?}", self.strategy);
        self.strategy
    }

    /// Handles one frame-presentation callback and re-arms the next one.
    pub fn on_video_frame<V: VideoElement>(
        &mut self,
        video: &V,
        epoch: Epoch,
        now: HostTime,
        presented_frames: Option<u64>,
    ) {
        if !self.active || self.strategy != Strategy::Precise {
            return;
        }
        if let Some(count) = presented_frames {
            self.commit(count, now);
        }
        if let Err(err) = video.request_frame_callback(epoch) {
            log::error!(target: "vhud::estimator", "frame callback re-registration failed: {err}");
            self.active = false;
        }
    }

    /// Handles one polling tick with the video's decoded-frame counter.
    pub fn on_poll(&mut self, now: HostTime, total_frames: Option<u64>) {
        if !self.active || self.strategy != Strategy::Polling {
            return;
        }
        if let Some(count) = total_frames {
            self.commit(count, now);
        }
    }

    fn commit(&mut self, count: u64, now: HostTime) {
        if let Some(fps) = self.window.observe(count, now) {
            self.fps = Some(fps);
        }
    }

    /// Current estimate; `None` until the first full window.
    #[must_use]
    pub fn fps(&self) -> Option<f64> {
        self.fps
    }

    /// Strategy in use.
    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Whether the chosen strategy is still producing samples.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Snapshot of the estimator state.
    #[must_use]
    pub fn sample(&self) -> FrameRateSample {
        let baseline = self.window.baseline();
        FrameRateSample {
            strategy: self.strategy,
            last_count: baseline.map(|(count, _)| count),
            last_sample: baseline.map(|(_, time)| time),
            fps: self.fps,
        }
    }

    /// Discards all window state, the estimate and the strategy choice.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Stops consuming callbacks and samples. Idempotent.
    ///
    /// Pending platform callbacks that still arrive are ignored.
    pub fn cleanup(&mut self) {
        self.active = false;
    }
}
