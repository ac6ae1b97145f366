// Copyright 2026 the VHUD Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM presentation of the overlay panel.
//!
//! The panel is a fixed-position root `<div>` holding a drag handle and a
//! pre-formatted content block. Interactive styling (cursors, transitions)
//! lives in one shared `<style>` element inserted on first use.

use alloc::format;
use alloc::string::String;

use kurbo::{Point, Rect};
use vhud_core::error::HudError;
use vhud_core::overlay::CORNER_INSET;
use vhud_core::platform::Panel;
use vhud_core::settings::{PosMode, Settings};
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use crate::platform_error;

/// `id` of the panel root element.
pub(crate) const ROOT_ID: &str = "vhud-root";

/// `id` of the shared stylesheet.
pub(crate) const STYLE_ID: &str = "vhud-style";

/// Class set on the root while dragging.
pub(crate) const DRAGGING_CLASS: &str = "vhud-dragging";

const HANDLE_CLASS: &str = "vhud-handle";
const CONTENT_CLASS: &str = "vhud-content";

const ROOT_CSS: &str = "position: fixed; z-index: 2147483647; pointer-events: auto;";

const FONT_STACK: &str = "ui-monospace, SFMono-Regular, Menlo, Monaco, Consolas, \
                          \"Liberation Mono\", \"Courier New\", monospace";

/// Returns the shared stylesheet text.
#[must_use]
pub(crate) fn stylesheet() -> String {
    format!(
        "#{ROOT_ID} {{ user-select: none; -webkit-user-select: none; }}\n\
         #{ROOT_ID}.{DRAGGING_CLASS} {{ cursor: grabbing !important; }}\n\
         #{ROOT_ID} .{HANDLE_CLASS} {{ cursor: grab; transition: opacity 150ms ease; }}\n\
         #{ROOT_ID} .{HANDLE_CLASS}:hover {{ opacity: 1 !important; }}\n\
         #{ROOT_ID} .{CONTENT_CLASS} {{ transition: opacity 120ms linear; }}\n"
    )
}

/// Inline style of the drag handle.
#[must_use]
pub(crate) fn handle_css(settings: &Settings) -> String {
    format!(
        "width: {}px; height: {}px; border-radius: {}px; background: {}; opacity: 0.85; \
         box-shadow: 0 8px 18px rgba(0,0,0,0.35);",
        settings.handle_size,
        settings.handle_height(),
        settings.radius,
        settings.fg,
    )
}

/// Inline style of the content block.
#[must_use]
pub(crate) fn content_css(settings: &Settings) -> String {
    format!(
        "margin-top: 6px; color: {fg}; background: {bg}; font-size: {size}px; \
         padding: {pad}px {pad}px; border-radius: {radius}px; font-family: {FONT_STACK}; \
         white-space: pre; box-shadow: 0 8px 20px rgba(0,0,0,0.35); \
         backdrop-filter: blur(2px); -webkit-backdrop-filter: blur(2px); opacity: 1;",
        fg = settings.fg,
        bg = settings.bg,
        size = settings.font_size,
        pad = settings.padding,
        radius = settings.radius,
    )
}

/// Anchoring properties for the configured position, as `(property, value)`.
#[must_use]
pub(crate) fn anchor_properties(settings: &Settings) -> [(&'static str, String); 2] {
    match settings.pos_mode {
        PosMode::Absolute => [
            ("left", format!("{}px", settings.x)),
            ("top", format!("{}px", settings.y)),
        ],
        PosMode::Corner => {
            let (vertical, horizontal) = settings.corner.css_edges();
            [
                (vertical, format!("{CORNER_INSET}px")),
                (horizontal, format!("{CORNER_INSET}px")),
            ]
        }
    }
}

/// The overlay panel's DOM elements.
#[derive(Clone)]
pub struct DomPanel {
    root: HtmlElement,
    handle: HtmlElement,
    content: HtmlElement,
}

impl core::fmt::Debug for DomPanel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomPanel")
            .field("root", &ROOT_ID)
            .field("attached", &self.root.is_connected())
            .finish_non_exhaustive()
    }
}

impl DomPanel {
    /// Builds the panel and attaches it to the document element.
    ///
    /// A leftover root from an earlier instance is removed first.
    pub fn create(document: &Document) -> Result<Self, HudError> {
        let host = document
            .document_element()
            .ok_or_else(|| HudError::Platform("document has no root element".into()))?;
        ensure_stylesheet(document, &host)?;

        if let Some(stale) = document.get_element_by_id(ROOT_ID) {
            log::debug!(target: "vhud::web", "removing stale panel");
            stale.remove();
        }

        let root = div(document)?;
        root.set_id(ROOT_ID);
        let handle = div(document)?;
        handle.set_class_name(HANDLE_CLASS);
        let content = div(document)?;
        content.set_class_name(CONTENT_CLASS);

        root.append_child(&handle)
            .map_err(|err| platform_error("append handle", &err))?;
        root.append_child(&content)
            .map_err(|err| platform_error("append content", &err))?;
        host.append_child(&root)
            .map_err(|err| platform_error("append panel", &err))?;

        Ok(Self {
            root,
            handle,
            content,
        })
    }

    /// The root element.
    #[must_use]
    pub fn root(&self) -> &HtmlElement {
        &self.root
    }

    /// The drag handle element.
    #[must_use]
    pub fn handle(&self) -> &HtmlElement {
        &self.handle
    }
}

fn div(document: &Document) -> Result<HtmlElement, HudError> {
    document
        .create_element("div")
        .map(JsCast::unchecked_into)
        .map_err(|err| platform_error("create_element", &err))
}

fn ensure_stylesheet(document: &Document, host: &web_sys::Element) -> Result<(), HudError> {
    if document.get_element_by_id(STYLE_ID).is_some() {
        return Ok(());
    }
    let style = document
        .create_element("style")
        .map_err(|err| platform_error("create style", &err))?;
    style.set_id(STYLE_ID);
    style.set_text_content(Some(&stylesheet()));
    host.append_child(&style)
        .map_err(|err| platform_error("append style", &err))?;
    Ok(())
}

impl Panel for DomPanel {
    fn apply_style(&self, settings: &Settings) {
        self.root.style().set_css_text(ROOT_CSS);
        self.handle.style().set_css_text(&handle_css(settings));
        self.content.style().set_css_text(&content_css(settings));
    }

    fn apply_position(&self, settings: &Settings) {
        let s = self.root.style();
        for edge in ["top", "right", "bottom", "left"] {
            let _ = s.remove_property(edge);
        }
        for (property, value) in anchor_properties(settings) {
            let _ = s.set_property(property, &value);
        }
    }

    fn set_origin(&self, origin: Point) {
        let s = self.root.style();
        let _ = s.set_property("left", &format!("{}px", origin.x));
        let _ = s.set_property("top", &format!("{}px", origin.y));
        let _ = s.remove_property("right");
        let _ = s.remove_property("bottom");
    }

    fn rect(&self) -> Rect {
        let r = self.root.get_bounding_client_rect();
        Rect::new(r.left(), r.top(), r.right(), r.bottom())
    }

    fn set_content_visible(&self, visible: bool) {
        let _ = self
            .content
            .style()
            .set_property("opacity", if visible { "1" } else { "0" });
    }

    fn set_handle_visible(&self, visible: bool) {
        let _ = self
            .handle
            .style()
            .set_property("display", if visible { "block" } else { "none" });
    }

    fn set_dragging(&self, dragging: bool) {
        let classes = self.root.class_list();
        let _ = if dragging {
            classes.add_1(DRAGGING_CLASS)
        } else {
            classes.remove_1(DRAGGING_CLASS)
        };
    }

    fn set_lines(&self, lines: &[String]) {
        self.content.set_text_content(Some(&lines.join("\n")));
    }

    fn detach(&self) {
        self.root.remove();
    }
}
