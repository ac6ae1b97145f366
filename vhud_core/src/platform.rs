// Copyright 2026 the VHUD Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host contract for platform integrations.
//!
//! The core never calls into a browser directly. A host crate implements the
//! traits in this module and feeds every asynchronous callback back into
//! [`Controller::dispatch`] as a [`Signal`]:
//!
//! - **Video discovery**: [`VideoSource`] enumerates candidate elements and
//!   reports structural document changes as [`Signal::Mutation`].
//! - **Video element**: [`VideoElement`] exposes geometry, playback-quality
//!   counters and the frame-presentation callback capability, which reports
//!   back as [`Signal::VideoFrame`].
//! - **Panel**: [`Panel`] applies overlay state to a native presentation
//!   (DOM elements on the web).
//! - **Scheduling**: [`Platform`] arms and disarms the two per-frame loops,
//!   the polling interval and the input listeners.
//!
//! # Liveness
//!
//! Every armed source is tagged with the [`Epoch`] current at arming time and
//! must echo it in each signal it delivers. The controller advances its epoch
//! on cleanup and whenever the measured video changes, so callbacks already in
//! flight are recognized as stale and dropped instead of resuming torn-down
//! state.
//!
//! [`Controller::dispatch`]: crate::controller::Controller::dispatch

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Point, Rect, Size};

use crate::error::HudError;
use crate::metrics::PlaybackQuality;
use crate::settings::{Settings, SettingsStore};
use crate::time::{Duration, HostTime};

/// Generation tag carried by armed callbacks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Epoch(pub u64);

impl Epoch {
    /// Returns the following epoch.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Which per-frame loop delivered a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameLoop {
    /// Re-detects the video, drives the estimator and renders content.
    Render,
    /// Evaluates visibility deadlines.
    IdleCheck,
}

/// Asynchronous notifications delivered by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Signal {
    /// An animation frame for one of the two loops.
    Frame {
        /// Epoch the loop was armed with.
        epoch: Epoch,
        /// Which loop fired.
        which: FrameLoop,
        /// Frame timestamp.
        now: HostTime,
    },
    /// A frame-presentation callback from the tracked video.
    VideoFrame {
        /// Epoch the callback was registered with.
        epoch: Epoch,
        /// Callback timestamp.
        now: HostTime,
        /// Presented-frame counter, if the platform supplied one.
        presented_frames: Option<u64>,
    },
    /// The polling interval elapsed.
    Poll {
        /// Epoch the interval was armed with.
        epoch: Epoch,
        /// Timer timestamp.
        now: HostTime,
    },
    /// The document's structure changed.
    Mutation {
        /// Epoch the observer was armed with.
        epoch: Epoch,
    },
    /// User input relevant to the overlay.
    Input {
        /// Epoch the listeners were armed with.
        epoch: Epoch,
        /// The event.
        event: InputEvent,
    },
}

/// Input events the overlay reacts to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// A button was pressed on the drag handle.
    HandleDown {
        /// Button index; `0` is the primary button.
        button: i16,
        /// Pointer position in viewport coordinates.
        pointer: Point,
        /// Event time.
        now: HostTime,
    },
    /// The pointer moved anywhere in the document.
    PointerMove {
        /// Pointer position in viewport coordinates.
        pointer: Point,
        /// Event time.
        now: HostTime,
    },
    /// A button was released anywhere in the document.
    PointerUp {
        /// Event time.
        now: HostTime,
    },
    /// The pointer entered the panel.
    PanelEnter {
        /// Event time.
        now: HostTime,
    },
    /// The pointer moved over the panel.
    PanelMove {
        /// Event time.
        now: HostTime,
    },
    /// The pointer left the panel.
    PanelLeave {
        /// Event time.
        now: HostTime,
    },
    /// Non-pointer user activity (key press, wheel).
    Activity {
        /// Event time.
        now: HostTime,
    },
    /// The viewport was resized.
    Resize,
}

/// A candidate video element.
///
/// Equality is element identity, not value equality.
pub trait VideoElement: Clone + PartialEq {
    /// On-screen bounding box in viewport coordinates.
    fn bounding_rect(&self) -> Rect;

    /// Intrinsic (decoded) width and height; `(0, 0)` before metadata loads.
    fn intrinsic_size(&self) -> (u32, u32);

    /// Current decoded/dropped counters.
    fn playback_quality(&self) -> PlaybackQuality;

    /// Whether the element exposes a frame-presentation callback.
    fn supports_frame_callbacks(&self) -> bool;

    /// Registers for the next presented frame, to be delivered as
    /// [`Signal::VideoFrame`] tagged with `epoch`.
    fn request_frame_callback(&self, epoch: Epoch) -> Result<(), HudError>;
}

/// Enumerates video elements and reports structural document changes.
pub trait VideoSource {
    /// Element type produced by this source.
    type Video: VideoElement;

    /// All reachable video elements, in document encounter order.
    fn videos(&self) -> Vec<Self::Video>;

    /// Subscribes to subtree child-list changes, delivered as
    /// [`Signal::Mutation`] tagged with `epoch`. Replaces any prior
    /// subscription.
    fn observe(&mut self, epoch: Epoch) -> Result<(), HudError>;

    /// Drops the subscription. Idempotent.
    fn disconnect(&mut self);
}

/// A native presentation of the overlay panel.
///
/// Implementations hold the rendered elements; the overlay state machine
/// decides what they show.
pub trait Panel {
    /// Applies colors, sizes and fonts.
    fn apply_style(&self, settings: &Settings);

    /// Anchors the panel to the configured corner, or to `x`/`y` in
    /// absolute mode.
    fn apply_position(&self, settings: &Settings);

    /// Places the panel's top-left corner at `origin` (absolute mode).
    fn set_origin(&self, origin: Point);

    /// Current on-screen bounding box.
    fn rect(&self) -> Rect;

    /// Shows or hides the content block.
    fn set_content_visible(&self, visible: bool);

    /// Shows or hides the drag handle.
    fn set_handle_visible(&self, visible: bool);

    /// Marks the panel as being dragged.
    fn set_dragging(&self, dragging: bool);

    /// Replaces the displayed text, one entry per line.
    fn set_lines(&self, lines: &[String]);

    /// Removes the panel from the page. Idempotent.
    fn detach(&self);
}

/// Everything a controller needs from its host.
pub trait Platform {
    /// Video discovery for this host.
    type Source: VideoSource;
    /// Panel presentation for this host.
    type Panel: Panel;
    /// Settings persistence for this host.
    type Store: SettingsStore;

    /// Current host time.
    fn now(&self) -> HostTime;

    /// Viewport size in CSS px.
    fn viewport(&self) -> Size;

    /// The settings store.
    fn store(&mut self) -> &mut Self::Store;

    /// A video source over the host document.
    fn video_source(&self) -> Self::Source;

    /// Builds and attaches a fresh panel.
    fn create_panel(&mut self, settings: &Settings) -> Result<Self::Panel, HudError>;

    /// Starts both per-frame loops, delivering [`Signal::Frame`].
    fn start_frame_loops(&mut self, epoch: Epoch) -> Result<(), HudError>;

    /// Stops both per-frame loops. Idempotent.
    fn stop_frame_loops(&mut self);

    /// Starts a fixed-interval timer delivering [`Signal::Poll`]. Replaces
    /// any running interval.
    fn start_polling(&mut self, epoch: Epoch, every: Duration) -> Result<(), HudError>;

    /// Stops the polling timer. Idempotent.
    fn stop_polling(&mut self);

    /// Wires drag, hover, activity and resize listeners for `panel`,
    /// delivering [`Signal::Input`].
    fn listen_input(&mut self, epoch: Epoch, panel: &Self::Panel) -> Result<(), HudError>;

    /// Removes all input listeners. Idempotent.
    fn unlisten_input(&mut self);
}
