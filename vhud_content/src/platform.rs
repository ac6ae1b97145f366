// Copyright 2026 the VHUD Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`Platform`] implementation over the browser backend.

use alloc::rc::Rc;
use core::cell::Cell;

use kurbo::Size;
use vhud_backend_web::{
    DocumentVideoSource, DomPanel, InputListeners, IntervalTimer, LocalStorageStore, RafLoop,
    SignalSink,
};
use vhud_core::error::HudError;
use vhud_core::platform::{Epoch, FrameLoop, Platform, Signal};
use vhud_core::settings::Settings;
use vhud_core::time::{Duration, HostTime};
use web_sys::{Document, Window};

/// The browser host for one page.
///
/// Loops and timers are created once and restarted with a new epoch, so a
/// loop may be stopped from inside its own callback.
pub struct WebPlatform {
    window: Window,
    document: Document,
    sink: SignalSink,
    store: LocalStorageStore,
    loop_epoch: Rc<Cell<Epoch>>,
    render: RafLoop,
    idle: RafLoop,
    poll_epoch: Rc<Cell<Epoch>>,
    poll: IntervalTimer,
    listeners: InputListeners,
}

impl core::fmt::Debug for WebPlatform {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebPlatform")
            .field("store", &self.store)
            .field("render", &self.render)
            .field("idle", &self.idle)
            .field("poll", &self.poll)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

fn frame_loop(sink: &SignalSink, epoch: &Rc<Cell<Epoch>>, which: FrameLoop) -> RafLoop {
    let sink = Rc::clone(sink);
    let epoch = Rc::clone(epoch);
    RafLoop::new(move |now| {
        sink(Signal::Frame {
            epoch: epoch.get(),
            which,
            now,
        });
    })
}

impl WebPlatform {
    /// Binds to the current window. Every callback is delivered to `sink`.
    pub fn new(sink: SignalSink) -> Result<Self, HudError> {
        let window =
            web_sys::window().ok_or_else(|| HudError::Platform("no global window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| HudError::Platform("window has no document".into()))?;
        let store = LocalStorageStore::new(&window);

        let loop_epoch = Rc::new(Cell::new(Epoch::default()));
        let render = frame_loop(&sink, &loop_epoch, FrameLoop::Render);
        let idle = frame_loop(&sink, &loop_epoch, FrameLoop::IdleCheck);

        let poll_epoch = Rc::new(Cell::new(Epoch::default()));
        let poll = {
            let sink = Rc::clone(&sink);
            let epoch = Rc::clone(&poll_epoch);
            IntervalTimer::new(move |now| {
                sink(Signal::Poll {
                    epoch: epoch.get(),
                    now,
                });
            })
        };

        Ok(Self {
            window,
            document,
            sink,
            store,
            loop_epoch,
            render,
            idle,
            poll_epoch,
            poll,
            listeners: InputListeners::new(),
        })
    }
}

impl Platform for WebPlatform {
    type Source = DocumentVideoSource;
    type Panel = DomPanel;
    type Store = LocalStorageStore;

    fn now(&self) -> HostTime {
        vhud_backend_web::now()
    }

    fn viewport(&self) -> Size {
        vhud_backend_web::viewport(&self.window)
    }

    fn store(&mut self) -> &mut LocalStorageStore {
        &mut self.store
    }

    fn video_source(&self) -> DocumentVideoSource {
        DocumentVideoSource::new(self.document.clone(), Rc::clone(&self.sink))
    }

    fn create_panel(&mut self, _settings: &Settings) -> Result<DomPanel, HudError> {
        DomPanel::create(&self.document)
    }

    fn start_frame_loops(&mut self, epoch: Epoch) -> Result<(), HudError> {
        self.loop_epoch.set(epoch);
        self.render.start();
        self.idle.start();
        Ok(())
    }

    fn stop_frame_loops(&mut self) {
        self.render.stop();
        self.idle.stop();
    }

    fn start_polling(&mut self, epoch: Epoch, every: Duration) -> Result<(), HudError> {
        self.poll_epoch.set(epoch);
        self.poll.start(every)
    }

    fn stop_polling(&mut self) {
        self.poll.stop();
    }

    fn listen_input(&mut self, epoch: Epoch, panel: &DomPanel) -> Result<(), HudError> {
        self.listeners
            .listen(&self.window, panel, epoch, &self.sink)
    }

    fn unlisten_input(&mut self) {
        self.listeners.clear();
    }
}
