// Copyright 2026 the VHUD Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Content-script entry point for the video HUD.
//!
//! The injection layer constructs one [`Hud`] per page and forwards its
//! messages to it:
//!
//! ```js
//! import init, { Hud } from "./vhud_content.js";
//! await init();
//! const hud = new Hud();
//! chrome.runtime.onMessage.addListener((msg, _sender, reply) => {
//!   reply(JSON.parse(hud.handleMessage(JSON.stringify(msg))));
//! });
//! ```
//!
//! Build with: `wasm-pack build --target web vhud_content`

#![no_std]
#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, reason = "this crate only runs in the browser")
)]

extern crate alloc;

mod platform;

pub use platform::WebPlatform;

use alloc::rc::{Rc, Weak};
use alloc::string::{String, ToString as _};
use core::cell::RefCell;

use log::LevelFilter;
use vhud_backend_web::{ConsoleLogger, SignalSink};
use vhud_core::controller::Controller;
use vhud_core::error::HudError;
use vhud_core::messaging::Response;
use vhud_core::platform::Signal;
use vhud_core::settings::Settings;
use wasm_bindgen::prelude::*;

type SharedController = Rc<RefCell<Controller<WebPlatform>>>;
type ControllerSlot = Rc<RefCell<Weak<RefCell<Controller<WebPlatform>>>>>;

/// The HUD instance for one page.
#[wasm_bindgen]
pub struct Hud {
    controller: SharedController,
}

impl core::fmt::Debug for Hud {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hud")
            .field("controller", &self.controller.try_borrow().ok())
            .finish()
    }
}

#[wasm_bindgen]
impl Hud {
    /// Creates the HUD and initializes it from stored settings.
    ///
    /// Initialization failures are logged, not thrown; a later `VHUD_APPLY`
    /// retries and reports the error.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<Self, JsValue> {
        ConsoleLogger::install(LevelFilter::Info);

        let slot: ControllerSlot = Rc::new(RefCell::new(Weak::new()));
        let sink: SignalSink = {
            let slot = Rc::clone(&slot);
            Rc::new(move |signal| deliver(&slot, signal))
        };
        let platform = WebPlatform::new(sink).map_err(|err| JsValue::from_str(&err.to_string()))?;
        let controller = Rc::new(RefCell::new(Controller::new(platform)));
        *slot.borrow_mut() = Rc::downgrade(&controller);

        // Already logged by the controller.
        let _ = controller.borrow_mut().init();
        Ok(Self { controller })
    }

    /// Answers a JSON request (`VHUD_PING`, `VHUD_APPLY`) with a JSON reply.
    #[wasm_bindgen(js_name = handleMessage)]
    pub fn handle_message(&self, raw: &str) -> String {
        let response = match self.controller.try_borrow_mut() {
            Ok(mut controller) => controller.handle_message(raw),
            Err(_) => busy(),
        };
        encode(&response)
    }

    /// Saves a complete settings record (JSON) and reinitializes with it.
    #[wasm_bindgen(js_name = applySettings)]
    pub fn apply_settings(&self, raw: &str) -> String {
        let response = match Settings::from_json(raw) {
            Err(err) => Response::failed(&err),
            Ok(settings) => match self.controller.try_borrow_mut() {
                Ok(mut controller) => match controller.apply_settings(settings) {
                    Ok(()) => Response::ok(),
                    Err(err) => Response::failed(&err),
                },
                Err(_) => busy(),
            },
        };
        encode(&response)
    }

    /// Tears the HUD down. It can be brought back with `VHUD_APPLY`.
    pub fn cleanup(&self) {
        if let Ok(mut controller) = self.controller.try_borrow_mut() {
            controller.cleanup();
        }
    }
}

impl Drop for Hud {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn deliver(slot: &ControllerSlot, signal: Signal) {
    let Some(controller) = slot.borrow().upgrade() else {
        return;
    };
    match controller.try_borrow_mut() {
        Ok(mut controller) => controller.dispatch(signal),
        Err(_) => log::trace!(target: "vhud::web", "controller busy, dropped {signal:?}"),
    }
}

fn busy() -> Response {
    Response::failed(&HudError::Protocol("HUD is busy".to_string()))
}

fn encode(response: &Response) -> String {
    response.to_json().unwrap_or_else(|err| {
        log::error!(target: "vhud::web", "reply encoding failed: {err}");
        String::from(r#"{"ok":false}"#)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_reply_is_a_failure() {
        assert_eq!(
            encode(&busy()),
            r#"{"ok":false,"error":"protocol: HUD is busy"}"#
        );
    }
}
