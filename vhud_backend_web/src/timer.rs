// Copyright 2026 the VHUD Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `setInterval` timer.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};

use vhud_core::error::HudError;
use vhud_core::time::{Duration, HostTime};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use crate::raf::performance_now;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = "setInterval", catch)]
    fn set_interval(callback: &JsValue, ms: i32) -> Result<i32, JsValue>;

    #[wasm_bindgen(js_name = "clearInterval")]
    fn clear_interval(id: i32);
}

/// A repeating timer delivering the current [`HostTime`] to a callback.
pub struct IntervalTimer {
    inner: Rc<TimerInner>,
}

struct TimerInner {
    closure: RefCell<Option<Closure<dyn FnMut()>>>,
    callback: RefCell<Box<dyn FnMut(HostTime)>>,
    interval_id: Cell<Option<i32>>,
}

impl IntervalTimer {
    /// Creates a stopped timer.
    pub fn new(callback: impl FnMut(HostTime) + 'static) -> Self {
        Self {
            inner: Rc::new(TimerInner {
                closure: RefCell::new(None),
                callback: RefCell::new(Box::new(callback)),
                interval_id: Cell::new(None),
            }),
        }
    }

    /// Starts firing every `every`, replacing any running interval.
    pub fn start(&self, every: Duration) -> Result<(), HudError> {
        self.stop();

        if self.inner.closure.borrow().is_none() {
            let weak = Rc::downgrade(&self.inner);
            let closure = Closure::wrap(Box::new(move || {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                if inner.interval_id.get().is_none() {
                    return;
                }
                if let Ok(mut callback) = inner.callback.try_borrow_mut() {
                    callback(HostTime::from_millis_f64(performance_now()));
                }
            }) as Box<dyn FnMut()>);
            *self.inner.closure.borrow_mut() = Some(closure);
        }

        let ms = i32::try_from(every.as_millis()).unwrap_or(i32::MAX).max(1);
        if let Some(ref closure) = *self.inner.closure.borrow() {
            let id = set_interval(closure.as_ref().unchecked_ref(), ms)
                .map_err(|err| crate::platform_error("setInterval", &err))?;
            self.inner.interval_id.set(Some(id));
        }
        Ok(())
    }

    /// Clears the interval. Idempotent.
    pub fn stop(&self) {
        if let Some(id) = self.inner.interval_id.take() {
            clear_interval(id);
        }
    }

    /// Returns `true` while the interval is armed.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.interval_id.get().is_some()
    }
}

impl Drop for IntervalTimer {
    fn drop(&mut self) {
        self.stop();
        self.inner.closure.borrow_mut().take();
    }
}

impl core::fmt::Debug for IntervalTimer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IntervalTimer")
            .field("interval_id", &self.inner.interval_id.get())
            .finish_non_exhaustive()
    }
}
