//! Viewer state machine.
//!
//! One controller owns the state and every capability. The host forwards
//! events (config response, view changes, clicks, timer ticks) and the
//! controller calls back into the map, storage and UI.

use std::time::{Duration, Instant};

use serde_json::Value;

use super::{CoalescingTimer, MountPath, SavedView, Storage, ViewerError, rewrite_style, storage_key};
use crate::view::{CONFIG_PATH, ConfigDocument};
use crate::{debug, log};

/// Style document inside the archive.
pub const STYLE_PATH: &str = "./styles/liberty";
/// Duration of the animated return to the configured view.
pub const RESET_DURATION: Duration = Duration::from_millis(1000);
/// View used when the config is unavailable.
pub const FALLBACK_VIEW: Camera = Camera {
    center: [0.0, 0.0],
    zoom: 0.0,
};

/// Map position; `center` is `[lon, lat]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub center: [f64; 2],
    pub zoom: f64,
}

impl From<SavedView> for Camera {
    fn from(view: SavedView) -> Self {
        Self {
            center: view.center,
            zoom: view.zoom,
        }
    }
}

impl From<Camera> for SavedView {
    fn from(camera: Camera) -> Self {
        SavedView::new(camera.center, camera.zoom)
    }
}

/// Issues the config request; the host answers via
/// [`ViewerController::config_loaded`].
pub trait ConfigSource {
    fn request(&mut self, url: &str);
}

pub trait MapEngine {
    fn init(&mut self, style_url: &str, camera: Camera) -> Result<(), String>;
    fn camera(&self) -> Camera;
    fn ease_to(&mut self, camera: Camera, duration: Duration);
}

pub trait ViewerUi {
    fn show_reset_control(&mut self);
    fn set_readout(&mut self, coordinates: &str, zoom: &str);
    fn set_popover_open(&mut self, open: bool);
    fn show_error(&mut self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    PopoverControl,
    Popover,
    Outside,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerState {
    Loading,
    Ready,
    /// Terminal.
    Error(ViewerError),
}

pub struct ViewerController<C, M, S, U> {
    mount: MountPath,
    config_source: C,
    map: M,
    storage: S,
    ui: U,
    state: ViewerState,
    defaults: Option<Camera>,
    storage_key: Option<String>,
    timer: CoalescingTimer,
    popover_open: bool,
}

impl<C: ConfigSource, M: MapEngine, S: Storage, U: ViewerUi> ViewerController<C, M, S, U> {
    pub fn new(mount: MountPath, config_source: C, map: M, storage: S, ui: U) -> Self {
        Self {
            mount,
            config_source,
            map,
            storage,
            ui,
            state: ViewerState::Loading,
            defaults: None,
            storage_key: None,
            timer: CoalescingTimer::default(),
            popover_open: false,
        }
    }

    /// Request the view config relative to the mount.
    pub fn start(&mut self) {
        let url = self.mount.to_absolute(CONFIG_PATH);
        debug!("viewer"; "requesting {}", url);
        self.config_source.request(&url);
    }

    /// Handle the config response and initialize the map.
    ///
    /// Only the first response while `Loading` counts.
    pub fn config_loaded(&mut self, response: Result<Vec<u8>, String>) {
        if self.state != ViewerState::Loading {
            debug!("viewer"; "ignoring late config response in {:?}", self.state);
            return;
        }

        let parsed = response.and_then(|bytes| {
            serde_json::from_slice::<ConfigDocument>(&bytes).map_err(|e| e.to_string())
        });
        let document = match parsed {
            Ok(document) => document,
            Err(e) => {
                log!("warning"; "view config unavailable ({e}), using fallback view");
                ConfigDocument::default()
            }
        };

        self.storage_key = document
            .zim_name
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(storage_key);
        self.defaults = match (document.center, document.zoom) {
            (Some(center), Some(zoom)) => Some(Camera { center, zoom }),
            _ => None,
        };

        let initial = self
            .load_saved_view()
            .or(self.defaults)
            .unwrap_or(FALLBACK_VIEW);
        let style_url = self.mount.to_absolute(STYLE_PATH);

        match self.map.init(&style_url, initial) {
            Ok(()) => {
                self.state = ViewerState::Ready;
                if self.defaults.is_some() {
                    self.ui.show_reset_control();
                }
                self.update_readout(initial);
            }
            Err(reason) => {
                let err = ViewerError::MapInit(reason);
                self.ui.show_error(&err.to_string());
                self.state = ViewerState::Error(err);
            }
        }
    }

    /// Pan or zoom happened at `now`.
    pub fn on_view_change(&mut self, now: Instant) {
        if self.state == ViewerState::Ready {
            self.timer.schedule(now);
        }
    }

    /// Drive the coalescing timer; flushes once the burst has settled.
    pub fn tick(&mut self, now: Instant) {
        if self.timer.poll(now) && self.state == ViewerState::Ready {
            let camera = self.map.camera();
            self.update_readout(camera);
            self.persist(camera);
        }
    }

    /// Time until the next flush, for hosts that sleep between ticks.
    pub fn next_tick(&self, now: Instant) -> Option<Duration> {
        self.timer.remaining(now)
    }

    /// Animate back to the configured view. False when there is none.
    pub fn reset_view(&mut self) -> bool {
        match (&self.state, self.defaults) {
            (ViewerState::Ready, Some(defaults)) => {
                self.map.ease_to(defaults, RESET_DURATION);
                true
            }
            _ => false,
        }
    }

    pub fn click(&mut self, target: ClickTarget) {
        match target {
            ClickTarget::PopoverControl => self.set_popover(!self.popover_open),
            ClickTarget::Popover => {}
            ClickTarget::Outside if self.popover_open => self.set_popover(false),
            ClickTarget::Outside => {}
        }
    }

    /// Resolve a request URL issued by the map engine.
    pub fn transform_url(&self, url: &str) -> String {
        self.mount.to_absolute(url)
    }

    /// Rewrite the style's asset references before the engine sees them.
    pub fn prepare_style(&self, style: &mut Value) -> usize {
        rewrite_style(style, &self.mount)
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn storage_key(&self) -> Option<&str> {
        self.storage_key.as_deref()
    }

    pub fn is_popover_open(&self) -> bool {
        self.popover_open
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    fn load_saved_view(&self) -> Option<Camera> {
        let key = self.storage_key.as_deref()?;
        match self.storage.get(key) {
            Ok(Some(raw)) => {
                let view = SavedView::parse(&raw);
                if view.is_none() {
                    log!("warning"; "ignoring invalid saved view under {key}");
                }
                view.map(Camera::from)
            }
            Ok(None) => None,
            Err(e) => {
                log!("warning"; "cannot read saved view: {e}");
                None
            }
        }
    }

    fn persist(&mut self, camera: Camera) {
        let Some(key) = self.storage_key.as_deref() else {
            return;
        };
        let value = SavedView::from(camera).to_json();
        if let Err(e) = self.storage.set(key, &value) {
            log!("warning"; "cannot save view: {e}");
        }
    }

    fn update_readout(&mut self, camera: Camera) {
        let [lon, lat] = camera.center;
        self.ui
            .set_readout(&format!("{lat:.5}, {lon:.5}"), &format!("{:.2}", camera.zoom));
    }

    fn set_popover(&mut self, open: bool) {
        self.popover_open = open;
        self.ui.set_popover_open(open);
    }
}
