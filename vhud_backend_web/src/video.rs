// Copyright 2026 the VHUD Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Video discovery and per-element measurement.
//!
//! [`DocumentVideoSource`] enumerates `<video>` elements in the top document
//! and in every reachable same-origin frame, and reports structural changes
//! through a `MutationObserver`.
//!
//! [`WebVideo`] reads geometry and playback counters and registers
//! [`requestVideoFrameCallback`][rvfc] callbacks. Counters are looked up
//! dynamically: `getVideoPlaybackQuality()` when present, otherwise the
//! WebKit decoded/dropped counters.
//!
//! Elements from other frames belong to other JS realms, so `instanceof`
//! checks fail for them; elements returned by tag selectors are cast
//! unchecked.
//!
//! [rvfc]: https://developer.mozilla.org/en-US/docs/Web/API/HTMLVideoElement/requestVideoFrameCallback

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;

use js_sys::{Array, Function, Reflect};
use kurbo::Rect;
use vhud_core::error::HudError;
use vhud_core::metrics::PlaybackQuality;
use vhud_core::platform::{Epoch, Signal, VideoElement, VideoSource};
use vhud_core::time::HostTime;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlIFrameElement, HtmlVideoElement, MutationObserver, MutationObserverInit};

use crate::{SignalSink, js_message, platform_error};

/// Nested frames deeper than this are not searched.
const MAX_FRAME_DEPTH: u32 = 4;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(extends = HtmlVideoElement)]
    type FrameCallbackVideo;

    #[wasm_bindgen(method, catch, js_name = "requestVideoFrameCallback")]
    fn request_video_frame_callback(
        this: &FrameCallbackVideo,
        callback: &JsValue,
    ) -> Result<u32, JsValue>;
}

/// A `<video>` element. Equality is JS object identity.
#[derive(Clone)]
pub struct WebVideo {
    element: HtmlVideoElement,
    sink: SignalSink,
}

impl PartialEq for WebVideo {
    fn eq(&self, other: &Self) -> bool {
        self.element == other.element
    }
}

impl core::fmt::Debug for WebVideo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebVideo")
            .field("src", &self.element.current_src())
            .finish_non_exhaustive()
    }
}

impl WebVideo {
    /// Wraps an element; frame callbacks are delivered to `sink`.
    #[must_use]
    pub fn new(element: HtmlVideoElement, sink: SignalSink) -> Self {
        Self { element, sink }
    }

    /// The wrapped element.
    #[must_use]
    pub fn element(&self) -> &HtmlVideoElement {
        &self.element
    }
}

impl VideoElement for WebVideo {
    fn bounding_rect(&self) -> Rect {
        let r = self.element.get_bounding_client_rect();
        Rect::new(r.left(), r.top(), r.right(), r.bottom())
    }

    fn intrinsic_size(&self) -> (u32, u32) {
        (self.element.video_width(), self.element.video_height())
    }

    fn playback_quality(&self) -> PlaybackQuality {
        if let Some(quality) = call_method(&self.element, "getVideoPlaybackQuality") {
            return PlaybackQuality {
                total_frames: read_count(&quality, "totalVideoFrames"),
                dropped_frames: read_count(&quality, "droppedVideoFrames"),
            };
        }
        PlaybackQuality {
            total_frames: read_count(&self.element, "webkitDecodedFrameCount"),
            dropped_frames: read_count(&self.element, "webkitDroppedFrameCount"),
        }
    }

    fn supports_frame_callbacks(&self) -> bool {
        method(&self.element, "requestVideoFrameCallback").is_some()
    }

    fn request_frame_callback(&self, epoch: Epoch) -> Result<(), HudError> {
        let sink = Rc::clone(&self.sink);
        // One-shot: the JS function frees itself after firing.
        let callback = Closure::once_into_js(move |now_ms: f64, metadata: JsValue| {
            sink(Signal::VideoFrame {
                epoch,
                now: HostTime::from_millis_f64(now_ms),
                presented_frames: read_count(&metadata, "presentedFrames"),
            });
        });
        self.element
            .unchecked_ref::<FrameCallbackVideo>()
            .request_video_frame_callback(&callback)
            .map(|_| ())
            .map_err(|err| HudError::Registration(js_message(&err)))
    }
}

fn method(target: &JsValue, name: &str) -> Option<Function> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<Function>()
        .ok()
}

fn call_method(target: &JsValue, name: &str) -> Option<JsValue> {
    method(target, name)?.call0(target).ok()
}

fn read_count(target: &JsValue, key: &str) -> Option<u64> {
    count_from_f64(Reflect::get(target, &JsValue::from_str(key)).ok()?.as_f64()?)
}

/// Converts a JS number to a frame counter. Negative, infinite and NaN values
/// are unavailable.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is checked finite and non-negative; counters are integral"
)]
pub(crate) fn count_from_f64(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0).then(|| value as u64)
}

type MutationClosure = Closure<dyn FnMut(Array, MutationObserver)>;

/// Video elements of one document and its reachable frames.
pub struct DocumentVideoSource {
    document: Document,
    sink: SignalSink,
    observer: Option<(MutationObserver, MutationClosure)>,
}

impl core::fmt::Debug for DocumentVideoSource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DocumentVideoSource")
            .field("observing", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

impl DocumentVideoSource {
    /// Creates a source over `document`.
    #[must_use]
    pub fn new(document: Document, sink: SignalSink) -> Self {
        Self {
            document,
            sink,
            observer: None,
        }
    }

    fn collect(&self, document: &Document, depth: u32, out: &mut Vec<WebVideo>) {
        if let Ok(list) = document.query_selector_all("video") {
            for i in 0..list.length() {
                if let Some(node) = list.item(i) {
                    let element = node.unchecked_into::<HtmlVideoElement>();
                    out.push(WebVideo::new(element, Rc::clone(&self.sink)));
                }
            }
        }
        if depth >= MAX_FRAME_DEPTH {
            return;
        }
        let Ok(frames) = document.query_selector_all("iframe") else {
            return;
        };
        for i in 0..frames.length() {
            // Cross-origin frames expose no content document.
            let inner = frames
                .item(i)
                .map(JsCast::unchecked_into::<HtmlIFrameElement>)
                .and_then(|frame| frame.content_document());
            if let Some(inner) = inner {
                self.collect(&inner, depth + 1, out);
            }
        }
    }
}

impl VideoSource for DocumentVideoSource {
    type Video = WebVideo;

    fn videos(&self) -> Vec<WebVideo> {
        let mut out = Vec::new();
        self.collect(&self.document, 0, &mut out);
        out
    }

    fn observe(&mut self, epoch: Epoch) -> Result<(), HudError> {
        self.disconnect();
        let target = self
            .document
            .document_element()
            .ok_or_else(|| HudError::Platform("document has no root element".into()))?;

        let sink = Rc::clone(&self.sink);
        let closure = Closure::wrap(Box::new(move |_records: Array, _observer: MutationObserver| {
            sink(Signal::Mutation { epoch });
        }) as Box<dyn FnMut(Array, MutationObserver)>);

        let observer = MutationObserver::new(closure.as_ref().unchecked_ref())
            .map_err(|err| platform_error("MutationObserver", &err))?;
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        observer
            .observe_with_options(&target, &init)
            .map_err(|err| platform_error("observe", &err))?;

        self.observer = Some((observer, closure));
        Ok(())
    }

    fn disconnect(&mut self) {
        if let Some((observer, _closure)) = self.observer.take() {
            observer.disconnect();
        }
    }
}

impl Drop for DocumentVideoSource {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_must_be_finite_and_non_negative() {
        assert_eq!(count_from_f64(120.0), Some(120));
        assert_eq!(count_from_f64(0.0), Some(0));
        assert_eq!(count_from_f64(-1.0), None);
        assert_eq!(count_from_f64(f64::NAN), None);
        assert_eq!(count_from_f64(f64::INFINITY), None);
    }
}
