// Copyright 2026 the VHUD Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory host doubles for unit tests.

use alloc::rc::Rc;
use alloc::string::{String, ToString as _};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use kurbo::{Point, Rect, Size};

use crate::error::HudError;
use crate::metrics::PlaybackQuality;
use crate::platform::{Epoch, Panel, Platform, VideoElement, VideoSource};
use crate::settings::{Settings, SettingsStore};
use crate::time::{Duration, HostTime};

#[derive(Debug)]
struct VideoInner {
    id: u32,
    rect: Cell<Rect>,
    intrinsic: Cell<(u32, u32)>,
    quality: Cell<PlaybackQuality>,
    frame_callbacks: Cell<bool>,
    fail_registration: Cell<bool>,
    registrations: Cell<usize>,
    last_epoch: Cell<Option<Epoch>>,
}

/// A video element with a fixed identity and mutable geometry.
#[derive(Clone, Debug)]
pub(crate) struct FakeVideo(Rc<VideoInner>);

impl PartialEq for FakeVideo {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl FakeVideo {
    pub(crate) fn new(id: u32, width: f64, height: f64) -> Self {
        Self(Rc::new(VideoInner {
            id,
            rect: Cell::new(Rect::new(0.0, 0.0, width, height)),
            intrinsic: Cell::new((0, 0)),
            quality: Cell::new(PlaybackQuality::UNAVAILABLE),
            frame_callbacks: Cell::new(false),
            fail_registration: Cell::new(false),
            registrations: Cell::new(0),
            last_epoch: Cell::new(None),
        }))
    }

    pub(crate) fn with_frame_callbacks(self) -> Self {
        self.0.frame_callbacks.set(true);
        self
    }

    pub(crate) fn id(&self) -> u32 {
        self.0.id
    }

    pub(crate) fn resize(&self, width: f64, height: f64) {
        self.0.rect.set(Rect::new(0.0, 0.0, width, height));
    }

    pub(crate) fn set_intrinsic(&self, width: u32, height: u32) {
        self.0.intrinsic.set((width, height));
    }

    pub(crate) fn set_quality(&self, total: Option<u64>, dropped: Option<u64>) {
        self.0.quality.set(PlaybackQuality {
            total_frames: total,
            dropped_frames: dropped,
        });
    }

    pub(crate) fn fail_registration(&self, fail: bool) {
        self.0.fail_registration.set(fail);
    }

    /// Number of successful frame-callback registrations so far.
    pub(crate) fn pending_callbacks(&self) -> usize {
        self.0.registrations.get()
    }

    pub(crate) fn last_epoch(&self) -> Option<Epoch> {
        self.0.last_epoch.get()
    }
}

impl VideoElement for FakeVideo {
    fn bounding_rect(&self) -> Rect {
        self.0.rect.get()
    }

    fn intrinsic_size(&self) -> (u32, u32) {
        self.0.intrinsic.get()
    }

    fn playback_quality(&self) -> PlaybackQuality {
        self.0.quality.get()
    }

    fn supports_frame_callbacks(&self) -> bool {
        self.0.frame_callbacks.get()
    }

    fn request_frame_callback(&self, epoch: Epoch) -> Result<(), HudError> {
        if self.0.fail_registration.get() {
            return Err(HudError::Registration("video detached".to_string()));
        }
        self.0.registrations.set(self.0.registrations.get() + 1);
        self.0.last_epoch.set(Some(epoch));
        Ok(())
    }
}

#[derive(Debug, Default)]
struct SourceInner {
    videos: Vec<FakeVideo>,
    observed: Option<Epoch>,
    disconnects: usize,
}

/// A document whose video list is set by the test.
#[derive(Clone, Debug, Default)]
pub(crate) struct FakeSource(Rc<RefCell<SourceInner>>);

impl FakeSource {
    pub(crate) fn set(&self, videos: Vec<FakeVideo>) {
        self.0.borrow_mut().videos = videos;
    }

    pub(crate) fn observed_epoch(&self) -> Option<Epoch> {
        self.0.borrow().observed
    }

    pub(crate) fn disconnects(&self) -> usize {
        self.0.borrow().disconnects
    }
}

impl VideoSource for FakeSource {
    type Video = FakeVideo;

    fn videos(&self) -> Vec<FakeVideo> {
        self.0.borrow().videos.clone()
    }

    fn observe(&mut self, epoch: Epoch) -> Result<(), HudError> {
        self.0.borrow_mut().observed = Some(epoch);
        Ok(())
    }

    fn disconnect(&mut self) {
        let mut inner = self.0.borrow_mut();
        inner.observed = None;
        inner.disconnects += 1;
    }
}

#[derive(Debug, Default)]
struct PanelInner {
    size: Size,
    origin: Point,
    origin_writes: usize,
    styled: bool,
    content_visible: bool,
    handle_visible: bool,
    shows: usize,
    hides: usize,
    dragging: bool,
    lines: Vec<String>,
    detaches: usize,
}

/// A panel that records what was applied to it.
#[derive(Clone, Debug, Default)]
pub(crate) struct FakePanel(Rc<RefCell<PanelInner>>);

impl FakePanel {
    pub(crate) fn new(size: Size) -> Self {
        let panel = Self::default();
        panel.0.borrow_mut().size = size;
        panel
    }

    /// Moves the panel as a layout engine would, without counting a write.
    pub(crate) fn place(&self, origin: Point) {
        self.0.borrow_mut().origin = origin;
    }

    pub(crate) fn origin(&self) -> Point {
        self.0.borrow().origin
    }

    pub(crate) fn origin_writes(&self) -> usize {
        self.0.borrow().origin_writes
    }

    pub(crate) fn styled(&self) -> bool {
        self.0.borrow().styled
    }

    pub(crate) fn content_visible(&self) -> bool {
        self.0.borrow().content_visible
    }

    pub(crate) fn handle_visible(&self) -> bool {
        self.0.borrow().handle_visible
    }

    /// How many times the content was switched to `visible`.
    pub(crate) fn visibility_changes_to(&self, visible: bool) -> usize {
        let inner = self.0.borrow();
        if visible { inner.shows } else { inner.hides }
    }

    pub(crate) fn dragging(&self) -> bool {
        self.0.borrow().dragging
    }

    pub(crate) fn lines(&self) -> Vec<String> {
        self.0.borrow().lines.clone()
    }

    pub(crate) fn text(&self) -> String {
        self.0.borrow().lines.join("\n")
    }

    pub(crate) fn detaches(&self) -> usize {
        self.0.borrow().detaches
    }
}

impl Panel for FakePanel {
    fn apply_style(&self, _settings: &Settings) {
        self.0.borrow_mut().styled = true;
    }

    fn apply_position(&self, settings: &Settings) {
        if settings.pos_mode == crate::settings::PosMode::Absolute {
            self.0.borrow_mut().origin = Point::new(settings.x, settings.y);
        }
    }

    fn set_origin(&self, origin: Point) {
        let mut inner = self.0.borrow_mut();
        inner.origin = origin;
        inner.origin_writes += 1;
    }

    fn rect(&self) -> Rect {
        let inner = self.0.borrow();
        Rect::from_origin_size(inner.origin, inner.size)
    }

    fn set_content_visible(&self, visible: bool) {
        let mut inner = self.0.borrow_mut();
        if visible != inner.content_visible {
            if visible {
                inner.shows += 1;
            } else {
                inner.hides += 1;
            }
        }
        inner.content_visible = visible;
    }

    fn set_handle_visible(&self, visible: bool) {
        self.0.borrow_mut().handle_visible = visible;
    }

    fn set_dragging(&self, dragging: bool) {
        self.0.borrow_mut().dragging = dragging;
    }

    fn set_lines(&self, lines: &[String]) {
        self.0.borrow_mut().lines = lines.to_vec();
    }

    fn detach(&self) {
        self.0.borrow_mut().detaches += 1;
    }
}

/// An in-memory settings store.
#[derive(Debug, Default)]
pub(crate) struct FakeStore {
    pub(crate) stored: Option<String>,
    pub(crate) saves: usize,
    pub(crate) fail_save: bool,
}

impl SettingsStore for FakeStore {
    fn load(&mut self) -> Settings {
        Settings::from_stored(self.stored.as_deref())
    }

    fn save(&mut self, settings: &Settings) -> Result<(), HudError> {
        if self.fail_save {
            return Err(HudError::Store("quota exceeded".to_string()));
        }
        self.stored = Some(settings.to_json()?);
        self.saves += 1;
        Ok(())
    }
}

/// A host whose clock, viewport and armed sources are plain fields.
#[derive(Debug)]
pub(crate) struct FakePlatform {
    pub(crate) now: HostTime,
    pub(crate) viewport: Size,
    pub(crate) store: FakeStore,
    pub(crate) source: FakeSource,
    pub(crate) panel_size: Size,
    pub(crate) panels: Vec<FakePanel>,
    pub(crate) fail_panel: bool,
    pub(crate) frame_loops: Option<Epoch>,
    pub(crate) polling: Option<(Epoch, Duration)>,
    pub(crate) input: Option<Epoch>,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self {
            now: HostTime(0),
            viewport: Size::new(1280.0, 720.0),
            store: FakeStore::default(),
            source: FakeSource::default(),
            panel_size: Size::new(200.0, 100.0),
            panels: Vec::new(),
            fail_panel: false,
            frame_loops: None,
            polling: None,
            input: None,
        }
    }
}

impl FakePlatform {
    /// The most recently created panel.
    pub(crate) fn panel(&self) -> &FakePanel {
        self.panels.last().expect("no panel was created")
    }
}

impl Platform for FakePlatform {
    type Source = FakeSource;
    type Panel = FakePanel;
    type Store = FakeStore;

    fn now(&self) -> HostTime {
        self.now
    }

    fn viewport(&self) -> Size {
        self.viewport
    }

    fn store(&mut self) -> &mut FakeStore {
        &mut self.store
    }

    fn video_source(&self) -> FakeSource {
        self.source.clone()
    }

    fn create_panel(&mut self, _settings: &Settings) -> Result<FakePanel, HudError> {
        if self.fail_panel {
            return Err(HudError::Platform("no document body".to_string()));
        }
        let panel = FakePanel::new(self.panel_size);
        self.panels.push(panel.clone());
        Ok(panel)
    }

    fn start_frame_loops(&mut self, epoch: Epoch) -> Result<(), HudError> {
        self.frame_loops = Some(epoch);
        Ok(())
    }

    fn stop_frame_loops(&mut self) {
        self.frame_loops = None;
    }

    fn start_polling(&mut self, epoch: Epoch, every: Duration) -> Result<(), HudError> {
        self.polling = Some((epoch, every));
        Ok(())
    }

    fn stop_polling(&mut self) {
        self.polling = None;
    }

    fn listen_input(&mut self, epoch: Epoch, _panel: &FakePanel) -> Result<(), HudError> {
        self.input = Some(epoch);
        Ok(())
    }

    fn unlisten_input(&mut self) {
        self.input = None;
    }
}
