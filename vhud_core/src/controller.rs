// Copyright 2026 the VHUD Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle orchestration.
//!
//! [`Controller`] wires the tracker, estimator and overlay to a [`Platform`]
//! and routes every host [`Signal`] to the component that owns it.
//!
//! ```text
//!   Uninitialized ──init──► Running ──cleanup──► CleanedUp
//!                             ▲                      │
//!                             └────── init/apply ────┘
//! ```
//!
//! Two epochs guard against callbacks outliving what they were armed for:
//!
//! - the **session** epoch tags the frame loops, input listeners and the
//!   document observer; it advances on every `init` and `cleanup`;
//! - the **sampler** epoch tags frame-presentation callbacks and the polling
//!   timer; it additionally advances whenever the tracked video changes.
//!
//! A video change tears down the estimator synchronously before the next
//! render, so no rate measured on the previous video is ever displayed for
//! the new one.

use alloc::string::ToString as _;
use alloc::vec;

use crate::error::HudError;
use crate::estimator::{FrameRateEstimator, POLL_INTERVAL, Strategy};
use crate::messaging::{Request, Response};
use crate::metrics::NO_VIDEO_LINE;
use crate::overlay::Overlay;
use crate::platform::{Epoch, FrameLoop, InputEvent, Platform, Signal, VideoElement};
use crate::settings::{Settings, SettingsStore, SharedSettings};
use crate::time::HostTime;
use crate::tracker::{TrackerUpdate, VideoTracker};

/// Lifecycle phase of a [`Controller`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// `init` has not run yet.
    #[default]
    Uninitialized,
    /// Loops and listeners are armed.
    Running,
    /// Torn down; `init` may run again.
    CleanedUp,
}

/// Owns every HUD component for one page.
pub struct Controller<P: Platform> {
    platform: P,
    settings: SharedSettings,
    tracker: VideoTracker<P::Source>,
    estimator: FrameRateEstimator,
    overlay: Overlay<P::Panel>,
    lifecycle: Lifecycle,
    session: Epoch,
    sampler: Epoch,
}

impl<P: Platform> core::fmt::Debug for Controller<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Controller")
            .field("lifecycle", &self.lifecycle)
            .field("session", &self.session)
            .field("sampler", &self.sampler)
            .field("strategy", &self.estimator.strategy())
            .field("overlay", &self.overlay.phase())
            .finish_non_exhaustive()
    }
}

impl<P: Platform> Controller<P> {
    /// Creates an uninitialized controller.
    #[must_use]
    pub fn new(platform: P) -> Self {
        let settings = Settings::default().into_shared();
        let tracker = VideoTracker::new(platform.video_source());
        Self {
            platform,
            overlay: Overlay::new(settings.clone()),
            settings,
            tracker,
            estimator: FrameRateEstimator::new(),
            lifecycle: Lifecycle::Uninitialized,
            session: Epoch::default(),
            sampler: Epoch::default(),
        }
    }

    /// The host.
    #[must_use]
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Mutable access to the host.
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// The live settings record.
    #[must_use]
    pub fn settings(&self) -> &SharedSettings {
        &self.settings
    }

    /// The overlay state machine.
    #[must_use]
    pub fn overlay(&self) -> &Overlay<P::Panel> {
        &self.overlay
    }

    /// The frame-rate estimator.
    #[must_use]
    pub fn estimator(&self) -> &FrameRateEstimator {
        &self.estimator
    }

    /// The video tracker.
    #[must_use]
    pub fn tracker(&self) -> &VideoTracker<P::Source> {
        &self.tracker
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Epoch tagging the frame loops, listeners and observer.
    #[must_use]
    pub fn session_epoch(&self) -> Epoch {
        self.session
    }

    /// Epoch tagging frame callbacks and the polling timer.
    #[must_use]
    pub fn sampler_epoch(&self) -> Epoch {
        self.sampler
    }

    /// Loads settings and, if enabled, builds the panel and arms all loops
    /// and listeners.
    ///
    /// A running controller is cleaned up first. On failure everything armed
    /// so far is torn down again before the error is returned.
    pub fn init(&mut self) -> Result<(), HudError> {
        if self.lifecycle == Lifecycle::Running {
            self.cleanup();
        }
        let loaded = self.platform.store().load();
        *self.settings.borrow_mut() = loaded;
        self.session = self.session.next();
        self.sampler = self.sampler.next();

        if !self.settings.borrow().enabled {
            log::info!(target: "vhud::controller", "disabled by settings");
            self.cleanup();
            return Ok(());
        }

        if let Err(err) = self.arm() {
            log::error!(target: "vhud::controller", "init failed: {err}");
            self.cleanup();
            return Err(err);
        }
        self.lifecycle = Lifecycle::Running;
        log::info!(target: "vhud::controller", "running (session {:?})", self.session);
        Ok(())
    }

    fn arm(&mut self) -> Result<(), HudError> {
        let now = self.platform.now();
        let panel = self.platform.create_panel(&self.settings.borrow())?;
        self.overlay.attach(panel, now);
        if let Some(panel) = self.overlay.panel() {
            self.platform.listen_input(self.session, panel)?;
        }
        self.tracker.observe(self.session)?;
        self.overlay.init_visibility(now);
        self.overlay.clamp_to_viewport(self.platform.viewport());
        self.platform.start_frame_loops(self.session)?;
        Ok(())
    }

    /// Tears down every loop, listener, observer and the panel. Idempotent,
    /// and safe to call before `init`.
    pub fn cleanup(&mut self) {
        self.platform.stop_frame_loops();
        self.platform.stop_polling();
        self.platform.unlisten_input();
        self.tracker.stop();
        self.estimator.cleanup();
        self.estimator.reset();
        self.overlay.cleanup();
        self.session = self.session.next();
        self.sampler = self.sampler.next();
        if self.lifecycle == Lifecycle::Running {
            log::info!(target: "vhud::controller", "cleaned up");
        }
        self.lifecycle = Lifecycle::CleanedUp;
    }

    /// Reloads settings and reinitializes.
    pub fn apply(&mut self) -> Result<(), HudError> {
        self.cleanup();
        self.init()
    }

    /// Persists `settings` and applies them. This is the editor's save action.
    pub fn apply_settings(&mut self, settings: Settings) -> Result<(), HudError> {
        self.platform.store().save(&settings.sanitized())?;
        self.apply()
    }

    /// Answers one protocol request.
    pub fn handle_request(&mut self, request: Request) -> Response {
        match request {
            Request::Ping => Response::ok(),
            Request::Apply => match self.apply() {
                Ok(()) => Response::ok(),
                Err(err) => Response::failed(&err),
            },
        }
    }

    /// Parses and answers one raw protocol message.
    pub fn handle_message(&mut self, raw: &str) -> Response {
        match Request::parse(raw) {
            Ok(request) => self.handle_request(request),
            Err(err) => {
                log::warn!(target: "vhud::controller", "rejected message: {err}");
                Response::failed(&err)
            }
        }
    }

    /// Routes one host signal. Signals tagged with a stale epoch are dropped.
    pub fn dispatch(&mut self, signal: Signal) {
        if self.lifecycle != Lifecycle::Running {
            log::trace!(target: "vhud::controller", "not running, dropped {signal:?}");
            return;
        }
        match signal {
            Signal::Frame { epoch, which, now } if epoch == self.session => match which {
                FrameLoop::Render => self.render_tick(now),
                FrameLoop::IdleCheck => {
                    if self.overlay.on_idle_check(now) {
                        log::debug!(target: "vhud::overlay", "content hidden");
                    }
                }
            },
            Signal::VideoFrame {
                epoch,
                now,
                presented_frames,
            } if epoch == self.sampler => {
                if let Some(video) = self.tracker.current() {
                    self.estimator
                        .on_video_frame(video, self.sampler, now, presented_frames);
                }
            }
            Signal::Poll { epoch, now } if epoch == self.sampler => {
                let total = self
                    .tracker
                    .current()
                    .and_then(|video| video.playback_quality().total_frames);
                self.estimator.on_poll(now, total);
            }
            Signal::Mutation { epoch } if epoch == self.session => self.refresh_video(),
            Signal::Input { epoch, event } if epoch == self.session => self.on_input(event),
            stale => log::trace!(target: "vhud::controller", "stale {stale:?}"),
        }
    }

    fn refresh_video(&mut self) {
        match self.tracker.refresh() {
            TrackerUpdate::Unchanged => {}
            TrackerUpdate::Switched | TrackerUpdate::Lost => self.on_video_changed(),
        }
    }

    fn on_video_changed(&mut self) {
        self.estimator.cleanup();
        self.estimator.reset();
        self.platform.stop_polling();
        self.sampler = self.sampler.next();
        log::debug!(target: "vhud::controller", "video changed, sampler {:?}", self.sampler);
    }

    fn render_tick(&mut self, _now: HostTime) {
        self.refresh_video();
        let lines = match self.tracker.current() {
            None => vec![NO_VIDEO_LINE.to_string()],
            Some(video) => {
                if self.estimator.strategy() == Strategy::None
                    && self.estimator.engage(video, self.sampler) == Strategy::Polling
                    && let Err(err) = self.platform.start_polling(self.sampler, POLL_INTERVAL)
                {
                    log::error!(target: "vhud::estimator", "polling unavailable: {err}");
                    self.estimator.cleanup();
                }
                self.tracker
                    .sample(self.estimator.fps())
                    .map(|metrics| metrics.lines(&self.settings.borrow()))
                    .unwrap_or_default()
            }
        };
        self.overlay.update_content(&lines);
        self.overlay.clamp_to_viewport(self.platform.viewport());
    }

    fn on_input(&mut self, event: InputEvent) {
        let viewport = self.platform.viewport();
        match event {
            InputEvent::HandleDown {
                button,
                pointer,
                now,
            } => {
                self.overlay.on_activity(now);
                if self.overlay.on_handle_down(button, pointer) {
                    log::debug!(target: "vhud::overlay", "drag started");
                }
            }
            InputEvent::PointerMove { pointer, now } => {
                self.overlay.on_pointer_move(pointer, viewport);
                self.overlay.on_activity(now);
            }
            InputEvent::PointerUp { now } => {
                self.overlay.on_activity(now);
                if let Some(snapshot) = self.overlay.on_pointer_up(viewport) {
                    self.persist(&snapshot);
                }
            }
            InputEvent::PanelEnter { now } => self.overlay.on_panel_enter(now),
            InputEvent::PanelMove { now } => self.overlay.on_panel_move(now),
            InputEvent::PanelLeave { now } => self.overlay.on_panel_leave(now),
            InputEvent::Activity { now } => self.overlay.on_activity(now),
            InputEvent::Resize => self.overlay.on_resize(viewport),
        }
    }

    fn persist(&mut self, settings: &Settings) {
        match self.platform.store().save(settings) {
            Ok(()) => log::debug!(
                target: "vhud::settings",
                "saved position {},{}",
                settings.x,
                settings.y
            ),
            Err(err) => log::warn!(target: "vhud::settings", "position not saved: {err}"),
        }
    }
}
