// Copyright 2026 the VHUD Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `localStorage`-backed settings store.

use alloc::string::String;

use vhud_core::error::HudError;
use vhud_core::settings::{STORAGE_KEY, Settings, SettingsStore};
use web_sys::{Storage, Window};

use crate::js_message;

/// Persists settings as one JSON blob in `window.localStorage`.
///
/// Storage can be missing (sandboxed frames, disabled cookies); loads then
/// return defaults and saves fail with [`HudError::Store`].
pub struct LocalStorageStore {
    storage: Option<Storage>,
    key: String,
}

impl core::fmt::Debug for LocalStorageStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LocalStorageStore")
            .field("available", &self.storage.is_some())
            .field("key", &self.key)
            .finish()
    }
}

impl LocalStorageStore {
    /// Opens the window's local storage under [`STORAGE_KEY`].
    #[must_use]
    pub fn new(window: &Window) -> Self {
        let storage = match window.local_storage() {
            Ok(storage) => storage,
            Err(err) => {
                log::warn!(target: "vhud::settings", "localStorage unavailable: {}", js_message(&err));
                None
            }
        };
        Self {
            storage,
            key: String::from(STORAGE_KEY),
        }
    }
}

impl SettingsStore for LocalStorageStore {
    fn load(&mut self) -> Settings {
        let Some(storage) = &self.storage else {
            return Settings::default();
        };
        match storage.get_item(&self.key) {
            Ok(raw) => Settings::from_stored(raw.as_deref()),
            Err(err) => {
                log::warn!(target: "vhud::settings", "load failed: {}", js_message(&err));
                Settings::default()
            }
        }
    }

    fn save(&mut self, settings: &Settings) -> Result<(), HudError> {
        let storage = self
            .storage
            .as_ref()
            .ok_or_else(|| HudError::Store(String::from("localStorage unavailable")))?;
        let raw = settings.to_json()?;
        storage
            .set_item(&self.key, &raw)
            .map_err(|err| HudError::Store(js_message(&err)))
    }
}
