// Copyright 2026 the VHUD Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlay visibility and drag state machine.
//!
//! [`Overlay`] owns the logical panel state and pushes it to a [`Panel`].
//! It moves between three phases:
//!
//! ```text
//!             show (mode / hover / activity)
//!   Hidden ───────────────────────────────► Visible
//!     ▲                                     │  ▲
//!     │  hide deadline / idle threshold     │  │ pointer up:
//!     └─────────────────────────────────────┘  │ clamp, persist
//!                          primary press on    │
//!                          handle ▼            │
//!                              Dragging ───────┘
//! ```
//!
//! Visibility policy depends on [`VisibilityMode`]:
//!
//! - `always`: content always shown, handle hidden.
//! - `hover`: a short flash after init, shown while the pointer is over
//!   the panel, hidden `hoverHideMs` after it leaves or stops moving. The
//!   handle is always shown.
//! - `idle`: shown until no activity was seen for `idleHideMs`.
//!
//! Hide "timers" are deadlines checked by [`Overlay::on_idle_check`] on every
//! animation frame. Scheduling a new deadline replaces the previous one.

use alloc::string::String;

use kurbo::{Point, Size, Vec2};

use crate::platform::Panel;
use crate::settings::{PosMode, Settings, SharedSettings, VisibilityMode};
use crate::time::{Duration, HostTime};

/// Inset of the panel from its anchor corner, in px.
pub const CORNER_INSET: f64 = 10.0;

/// How long hover mode shows the content after (re)initialization.
pub const HOVER_FLASH: Duration = Duration::from_millis(700);

/// Button index of the primary pointer button.
const PRIMARY_BUTTON: i16 = 0;

/// Coarse phase of the overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OverlayPhase {
    /// Content hidden.
    Hidden,
    /// Content shown.
    Visible,
    /// The panel is being dragged; content is forced visible.
    Dragging,
}

/// Pointer and panel positions captured when a drag starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragAnchor {
    /// Pointer position at press.
    pub pointer: Point,
    /// Panel top-left at press.
    pub origin: Point,
}

/// Platform-independent overlay state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OverlayState {
    /// Whether the content is shown.
    pub visible: bool,
    /// Present while dragging.
    pub drag: Option<DragAnchor>,
    /// Time of the last tracked user activity.
    pub last_activity: HostTime,
    /// Pending hover-mode hide.
    pub hide_deadline: Option<HostTime>,
}

/// Clamps a panel origin so the panel stays inside the viewport.
///
/// Coordinates are rounded to whole pixels. When the panel is larger than
/// the viewport the origin is pinned to `0`.
#[must_use]
pub fn clamp_origin(origin: Point, panel: Size, viewport: Size) -> Point {
    Point::new(
        clamp_axis(origin.x, viewport.width - panel.width),
        clamp_axis(origin.y, viewport.height - panel.height),
    )
}

fn clamp_axis(value: f64, max: f64) -> f64 {
    let max = if max.is_finite() {
        libm::round(max).max(0.0)
    } else {
        0.0
    };
    if !value.is_finite() {
        return 0.0;
    }
    libm::round(value).clamp(0.0, max)
}

/// Overlay state machine bound to one panel at a time.
#[derive(Debug)]
pub struct Overlay<P: Panel> {
    panel: Option<P>,
    settings: SharedSettings,
    state: OverlayState,
}

impl<P: Panel> Overlay<P> {
    /// Creates an overlay with no panel attached.
    #[must_use]
    pub fn new(settings: SharedSettings) -> Self {
        Self {
            panel: None,
            settings,
            state: OverlayState::default(),
        }
    }

    /// Takes ownership of a freshly created panel and applies style and
    /// position. Any previously attached panel is detached first.
    pub fn attach(&mut self, panel: P, now: HostTime) {
        self.cleanup();
        {
            let settings = self.settings.borrow();
            panel.apply_style(&settings);
            panel.apply_position(&settings);
        }
        self.panel = Some(panel);
        self.state.last_activity = now;
    }

    /// The attached panel.
    #[must_use]
    pub fn panel(&self) -> Option<&P> {
        self.panel.as_ref()
    }

    /// Logical state.
    #[must_use]
    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> OverlayPhase {
        if self.state.drag.is_some() {
            OverlayPhase::Dragging
        } else if self.state.visible {
            OverlayPhase::Visible
        } else {
            OverlayPhase::Hidden
        }
    }

    fn mode(&self) -> VisibilityMode {
        self.settings.borrow().visibility_mode
    }

    /// Applies the initial visibility for the configured mode.
    pub fn init_visibility(&mut self, now: HostTime) {
        self.state.last_activity = now;
        self.state.hide_deadline = None;
        self.set_visible(true);
        if self.mode() == VisibilityMode::Hover {
            self.state.hide_deadline = Some(now + HOVER_FLASH);
        }
    }

    /// Shows or hides the content and refreshes the handle for the mode.
    pub fn set_visible(&mut self, visible: bool) {
        self.state.visible = visible;
        let handle = self.mode() == VisibilityMode::Hover;
        if let Some(panel) = &self.panel {
            panel.set_content_visible(visible);
            panel.set_handle_visible(handle);
        }
    }

    fn schedule_hide(&mut self, at: HostTime) {
        self.state.hide_deadline = Some(at);
    }

    fn hover_refresh(&mut self, now: HostTime) {
        if self.mode() != VisibilityMode::Hover {
            return;
        }
        self.set_visible(true);
        let delay = self.settings.borrow().hover_hide();
        self.schedule_hide(now + delay);
    }

    /// The pointer entered the panel.
    pub fn on_panel_enter(&mut self, now: HostTime) {
        self.hover_refresh(now);
    }

    /// The pointer moved over the panel.
    pub fn on_panel_move(&mut self, now: HostTime) {
        self.hover_refresh(now);
    }

    /// The pointer left the panel.
    pub fn on_panel_leave(&mut self, now: HostTime) {
        if self.mode() == VisibilityMode::Hover {
            let delay = self.settings.borrow().hover_hide();
            self.schedule_hide(now + delay);
        }
    }

    /// Records user activity anywhere in the document.
    pub fn on_activity(&mut self, now: HostTime) {
        self.state.last_activity = now;
        if self.mode() == VisibilityMode::Idle && !self.state.visible {
            self.set_visible(true);
        }
    }

    /// Evaluates pending hides. Returns `true` if the content was hidden.
    pub fn on_idle_check(&mut self, now: HostTime) -> bool {
        if self.state.drag.is_some() || self.panel.is_none() {
            return false;
        }
        if let Some(deadline) = self.state.hide_deadline
            && now >= deadline
        {
            self.state.hide_deadline = None;
            if self.state.visible {
                self.set_visible(false);
                return true;
            }
        }
        if self.mode() == VisibilityMode::Idle && self.state.visible {
            let threshold = self.settings.borrow().idle_hide();
            if now.saturating_duration_since(self.state.last_activity) > threshold {
                self.set_visible(false);
                return true;
            }
        }
        false
    }

    /// A button was pressed on the drag handle. Returns `true` if a drag
    /// started.
    pub fn on_handle_down(&mut self, button: i16, pointer: Point) -> bool {
        if button != PRIMARY_BUTTON {
            return false;
        }
        let Some(panel) = &self.panel else {
            return false;
        };
        let origin = panel.rect().origin();
        {
            let mut settings = self.settings.borrow_mut();
            settings.pos_mode = PosMode::Absolute;
            settings.x = origin.x;
            settings.y = origin.y;
        }
        panel.set_origin(origin);
        panel.set_dragging(true);
        self.state.drag = Some(DragAnchor { pointer, origin });
        self.state.hide_deadline = None;
        self.set_visible(true);
        true
    }

    /// Moves the panel with the pointer while dragging.
    pub fn on_pointer_move(&mut self, pointer: Point, viewport: Size) {
        let (Some(anchor), Some(panel)) = (self.state.drag, &self.panel) else {
            return;
        };
        let delta: Vec2 = pointer - anchor.pointer;
        let origin = clamp_origin(anchor.origin + delta, panel.rect().size(), viewport);
        {
            let mut settings = self.settings.borrow_mut();
            settings.x = origin.x;
            settings.y = origin.y;
        }
        panel.set_origin(origin);
    }

    /// Ends a drag. Returns the settings snapshot to persist, or `None` if
    /// no drag was in progress.
    pub fn on_pointer_up(&mut self, viewport: Size) -> Option<Settings> {
        self.state.drag.take()?;
        if let Some(panel) = &self.panel {
            panel.set_dragging(false);
        }
        self.clamp_to_viewport(viewport);
        Some(self.settings.borrow().clone())
    }

    /// Re-clamps an absolute position after the viewport changed.
    pub fn on_resize(&mut self, viewport: Size) {
        self.clamp_to_viewport(viewport);
    }

    /// Keeps an absolutely positioned panel fully inside the viewport.
    /// Corner mode is left to the anchoring.
    pub fn clamp_to_viewport(&mut self, viewport: Size) {
        let Some(panel) = &self.panel else {
            return;
        };
        let origin = {
            let settings = self.settings.borrow();
            if settings.pos_mode != PosMode::Absolute {
                return;
            }
            Point::new(settings.x, settings.y)
        };
        let clamped = clamp_origin(origin, panel.rect().size(), viewport);
        {
            let mut settings = self.settings.borrow_mut();
            settings.x = clamped.x;
            settings.y = clamped.y;
        }
        panel.set_origin(clamped);
    }

    /// Replaces the displayed text block.
    pub fn update_content(&self, lines: &[String]) {
        if let Some(panel) = &self.panel {
            panel.set_lines(lines);
        }
    }

    /// Detaches the panel and resets all state. Idempotent.
    pub fn cleanup(&mut self) {
        if let Some(panel) = self.panel.take() {
            panel.detach();
        }
        self.state = OverlayState::default();
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString as _;
    use alloc::vec;

    use super::*;
    use crate::testing::FakePanel;

    const VIEWPORT: Size = Size::new(1280.0, 720.0);

    fn at(ms: u64) -> HostTime {
        HostTime(ms * 1_000)
    }

    fn overlay_with(mode: VisibilityMode) -> (Overlay<FakePanel>, FakePanel, SharedSettings) {
        let settings = Settings {
            visibility_mode: mode,
            ..Settings::default()
        }
        .into_shared();
        let panel = FakePanel::new(Size::new(200.0, 100.0));
        let mut overlay = Overlay::new(settings.clone());
        overlay.attach(panel.clone(), at(0));
        overlay.init_visibility(at(0));
        (overlay, panel, settings)
    }

    #[test]
    fn clamp_keeps_panel_inside() {
        let panel = Size::new(200.0, 100.0);
        assert_eq!(
            clamp_origin(Point::new(-50.0, 900.0), panel, VIEWPORT),
            Point::new(0.0, 620.0)
        );
        assert_eq!(
            clamp_origin(Point::new(10.4, 10.6), panel, VIEWPORT),
            Point::new(10.0, 11.0)
        );
    }

    #[test]
    fn clamp_pins_oversized_panel_to_origin() {
        let panel = Size::new(2000.0, 1000.0);
        assert_eq!(
            clamp_origin(Point::new(300.0, 300.0), panel, VIEWPORT),
            Point::ZERO
        );
    }

    #[test]
    fn clamped_rect_is_contained_for_many_inputs() {
        let panel = Size::new(180.0, 96.0);
        let mut x = -500.0;
        while x < 2000.0 {
            let mut y = -500.0;
            while y < 1500.0 {
                let o = clamp_origin(Point::new(x, y), panel, VIEWPORT);
                assert!(o.x >= 0.0 && o.y >= 0.0, "{o:?}");
                assert!(o.x + panel.width <= VIEWPORT.width, "{o:?}");
                assert!(o.y + panel.height <= VIEWPORT.height, "{o:?}");
                y += 37.3;
            }
            x += 41.7;
        }
    }

    #[test]
    fn always_mode_shows_content_without_handle() {
        let (overlay, panel, _) = overlay_with(VisibilityMode::Always);
        assert_eq!(overlay.phase(), OverlayPhase::Visible);
        assert!(panel.content_visible());
        assert!(!panel.handle_visible());
    }

    #[test]
    fn hover_mode_flashes_then_hides() {
        let (mut overlay, panel, _) = overlay_with(VisibilityMode::Hover);
        assert!(panel.content_visible());
        assert!(panel.handle_visible());
        assert!(!overlay.on_idle_check(at(699)));
        assert!(overlay.on_idle_check(at(700)));
        assert_eq!(overlay.phase(), OverlayPhase::Hidden);
        assert!(panel.handle_visible(), "handle stays in hover mode");
    }

    #[test]
    fn hover_enter_shows_and_leave_hides_after_delay() {
        let (mut overlay, panel, _) = overlay_with(VisibilityMode::Hover);
        let _ = overlay.on_idle_check(at(800));
        overlay.on_panel_enter(at(1000));
        assert!(panel.content_visible());
        overlay.on_panel_move(at(1500));
        overlay.on_panel_leave(at(1600));
        assert!(!overlay.on_idle_check(at(2799)));
        assert!(overlay.on_idle_check(at(2800)));
        assert!(!panel.content_visible());
    }

    #[test]
    fn hover_move_reschedules_pending_hide() {
        let (mut overlay, _, _) = overlay_with(VisibilityMode::Hover);
        overlay.on_panel_move(at(100));
        // The flash deadline at 700ms was replaced by 100 + 1200.
        assert!(!overlay.on_idle_check(at(700)));
        assert!(overlay.on_idle_check(at(1300)));
    }

    #[test]
    fn idle_mode_hides_exactly_once_after_threshold() {
        let (mut overlay, panel, _) = overlay_with(VisibilityMode::Idle);
        assert!(!overlay.on_idle_check(at(1500)), "threshold is exclusive");
        assert!(overlay.on_idle_check(at(1501)));
        assert!(!overlay.on_idle_check(at(1600)));
        assert!(!overlay.on_idle_check(at(9000)));
        assert_eq!(panel.visibility_changes_to(false), 1);
    }

    #[test]
    fn idle_activity_before_threshold_cancels_hide() {
        let (mut overlay, _, _) = overlay_with(VisibilityMode::Idle);
        overlay.on_activity(at(1400));
        assert!(!overlay.on_idle_check(at(1600)));
        assert!(!overlay.on_idle_check(at(2900)));
        assert!(overlay.on_idle_check(at(2901)));
    }

    #[test]
    fn idle_activity_reveals_hidden_content() {
        let (mut overlay, panel, _) = overlay_with(VisibilityMode::Idle);
        let _ = overlay.on_idle_check(at(5000));
        overlay.on_activity(at(5001));
        assert_eq!(overlay.phase(), OverlayPhase::Visible);
        assert!(panel.content_visible());
    }

    #[test]
    fn drag_switches_to_absolute_and_persists_clamped_position() {
        let (mut overlay, panel, settings) = overlay_with(VisibilityMode::Hover);
        panel.place(Point::new(1070.0, 10.0));

        assert!(overlay.on_handle_down(0, Point::new(1075.0, 20.0)));
        assert_eq!(overlay.phase(), OverlayPhase::Dragging);
        assert_eq!(settings.borrow().pos_mode, PosMode::Absolute);
        assert!(panel.dragging());
        assert!(panel.content_visible());

        overlay.on_pointer_move(Point::new(1300.0, 300.0), VIEWPORT);
        assert_eq!(panel.origin(), Point::new(1080.0, 290.0));

        let saved = overlay.on_pointer_up(VIEWPORT).unwrap();
        assert_eq!((saved.x, saved.y), (1080.0, 290.0));
        assert_eq!(saved.pos_mode, PosMode::Absolute);
        assert_eq!(overlay.phase(), OverlayPhase::Visible);
        assert!(!panel.dragging());
        assert_eq!(overlay.on_pointer_up(VIEWPORT), None);
    }

    #[test]
    fn press_without_move_keeps_panel_in_place() {
        let (mut overlay, panel, settings) = overlay_with(VisibilityMode::Hover);
        panel.place(Point::new(400.0, 200.0));
        assert!(overlay.on_handle_down(0, Point::new(405.0, 210.0)));
        let saved = overlay.on_pointer_up(VIEWPORT).unwrap();
        assert_eq!((saved.x, saved.y), (400.0, 200.0));
        assert_eq!(settings.borrow().x, 400.0);
    }

    #[test]
    fn secondary_button_does_not_drag() {
        let (mut overlay, _, settings) = overlay_with(VisibilityMode::Hover);
        assert!(!overlay.on_handle_down(2, Point::ZERO));
        assert_eq!(overlay.phase(), OverlayPhase::Visible);
        assert_eq!(settings.borrow().pos_mode, PosMode::Corner);
    }

    #[test]
    fn no_hide_while_dragging() {
        let (mut overlay, _, _) = overlay_with(VisibilityMode::Idle);
        let _ = overlay.on_handle_down(0, Point::ZERO);
        assert!(!overlay.on_idle_check(at(60_000)));
        assert_eq!(overlay.phase(), OverlayPhase::Dragging);
    }

    #[test]
    fn resize_reclamps_absolute_only() {
        let (mut overlay, panel, settings) = overlay_with(VisibilityMode::Always);
        overlay.on_resize(Size::new(100.0, 100.0));
        assert_eq!(panel.origin_writes(), 0, "corner mode is not clamped");

        {
            let mut s = settings.borrow_mut();
            s.pos_mode = PosMode::Absolute;
            s.x = 1100.0;
            s.y = 650.0;
        }
        overlay.on_resize(Size::new(800.0, 600.0));
        assert_eq!(panel.origin(), Point::new(600.0, 500.0));
        assert_eq!((settings.borrow().x, settings.borrow().y), (600.0, 500.0));
    }

    #[test]
    fn update_content_replaces_lines() {
        let (overlay, panel, _) = overlay_with(VisibilityMode::Always);
        overlay.update_content(&vec!["a".to_string(), "b".to_string()]);
        assert_eq!(panel.text(), "a\nb");
    }

    #[test]
    fn cleanup_detaches_once_and_allows_reattach() {
        let (mut overlay, panel, _) = overlay_with(VisibilityMode::Hover);
        overlay.cleanup();
        overlay.cleanup();
        assert_eq!(panel.detaches(), 1);
        assert!(overlay.panel().is_none());
        assert_eq!(*overlay.state(), OverlayState::default());

        let fresh = FakePanel::new(Size::new(10.0, 10.0));
        overlay.attach(fresh.clone(), at(5));
        assert!(fresh.styled());
    }
}
