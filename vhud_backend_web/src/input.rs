// Copyright 2026 the VHUD Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM event listeners feeding [`InputEvent`]s.

use alloc::boxed::Box;
use alloc::vec::Vec;

use kurbo::Point;
use vhud_core::error::HudError;
use vhud_core::platform::{Epoch, InputEvent, Signal};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast as _;
use web_sys::{AddEventListenerOptions, Event, EventTarget, MouseEvent, Window};

use crate::{DomPanel, SignalSink, now, platform_error};

type Listener = Closure<dyn FnMut(Event)>;

struct Binding {
    target: EventTarget,
    kind: &'static str,
    closure: Listener,
}

/// Owns every listener wired for one panel, so they can be removed together.
#[derive(Default)]
pub struct InputListeners {
    bindings: Vec<Binding>,
}

impl core::fmt::Debug for InputListeners {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let kinds: Vec<&str> = self.bindings.iter().map(|b| b.kind).collect();
        f.debug_struct("InputListeners")
            .field("bindings", &kinds)
            .finish()
    }
}

fn pointer(event: &MouseEvent) -> Point {
    Point::new(f64::from(event.client_x()), f64::from(event.client_y()))
}

impl InputListeners {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all listeners with a fresh set for `panel`, tagged `epoch`.
    ///
    /// Drag starts on the handle; drag moves and releases are tracked on the
    /// window so the pointer may leave the panel. Pointer moves, key presses
    /// and wheel events anywhere count as activity.
    pub fn listen(
        &mut self,
        window: &Window,
        panel: &DomPanel,
        epoch: Epoch,
        sink: &SignalSink,
    ) -> Result<(), HudError> {
        self.clear();
        let emit = move |sink: &SignalSink, event: InputEvent| sink(Signal::Input { epoch, event });

        let s = sink.clone();
        self.bind(panel.handle(), "mousedown", false, move |event: Event| {
            let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            if mouse.button() == 0 {
                event.prevent_default();
            }
            emit(
                &s,
                InputEvent::HandleDown {
                    button: mouse.button(),
                    pointer: pointer(mouse),
                    now: now(),
                },
            );
        })?;

        let s = sink.clone();
        self.bind(window, "mousemove", true, move |event: Event| {
            if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
                emit(
                    &s,
                    InputEvent::PointerMove {
                        pointer: pointer(mouse),
                        now: now(),
                    },
                );
            }
        })?;

        let s = sink.clone();
        self.bind(window, "mouseup", false, move |_| {
            emit(&s, InputEvent::PointerUp { now: now() });
        })?;

        let root = panel.root();
        let s = sink.clone();
        self.bind(root, "mouseenter", false, move |_| {
            emit(&s, InputEvent::PanelEnter { now: now() });
        })?;
        let s = sink.clone();
        self.bind(root, "mousemove", false, move |_| {
            emit(&s, InputEvent::PanelMove { now: now() });
        })?;
        let s = sink.clone();
        self.bind(root, "mouseleave", false, move |_| {
            emit(&s, InputEvent::PanelLeave { now: now() });
        })?;

        for kind in ["keydown", "wheel"] {
            let s = sink.clone();
            self.bind(window, kind, true, move |_| {
                emit(&s, InputEvent::Activity { now: now() });
            })?;
        }

        let s = sink.clone();
        self.bind(window, "resize", false, move |_| {
            emit(&s, InputEvent::Resize);
        })?;

        log::debug!(target: "vhud::web", "{} listeners wired", self.bindings.len());
        Ok(())
    }

    fn bind(
        &mut self,
        target: &EventTarget,
        kind: &'static str,
        passive: bool,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), HudError> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        let options = AddEventListenerOptions::new();
        options.set_passive(passive);
        target
            .add_event_listener_with_callback_and_add_event_listener_options(
                kind,
                closure.as_ref().unchecked_ref(),
                &options,
            )
            .map_err(|err| platform_error(kind, &err))?;
        self.bindings.push(Binding {
            target: target.clone(),
            kind,
            closure,
        });
        Ok(())
    }

    /// Removes every listener. Idempotent.
    pub fn clear(&mut self) {
        for binding in self.bindings.drain(..) {
            let _ = binding.target.remove_event_listener_with_callback(
                binding.kind,
                binding.closure.as_ref().unchecked_ref(),
            );
        }
    }
}

impl Drop for InputListeners {
    fn drop(&mut self) {
        self.clear();
    }
}
