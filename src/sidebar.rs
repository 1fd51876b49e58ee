//! "Mobile mode": collapsing the hosted page's sidebar.
//!
//! Each window owns a [`SidebarToggle`] with an explicit state. Hiding injects
//! a style override into the page; showing removes exactly that style. The
//! state flips synchronously on [`SidebarToggle::toggle`], the page I/O runs
//! as a tokio task.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::report_failure;
use crate::host::{AppWindow, ContentSurface, StyleKey, WindowId};

/// Collapses the channel and settings sidebars and widens the content column.
pub const COLLAPSE_CSS: &str = concat!(
    "div[class^=sidebar_],div[class^=sidebarList_]{ width: 0px !important; }\n",
    "div[class^=sidebarRegion_]{ display: none !important; }\n",
    "div[class^=contentColumn_]{ max-width: 100% !important; }"
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarState {
    Visible,
    /// Style injection is in flight.
    HiddenPending,
    Hidden,
}

impl SidebarState {
    pub fn is_hidden(self) -> bool {
        self != SidebarState::Visible
    }
}

/// Callback for state transitions.
pub type ToggleCallback = Arc<dyn Fn(SidebarState) + Send + Sync + 'static>;

#[derive(Debug)]
struct Inner {
    state: SidebarState,
    style: Option<StyleKey>,
    /// A toggle arrived while the injection was still in flight.
    restore_requested: bool,
}

pub struct SidebarToggle {
    window: WindowId,
    surface: Arc<dyn ContentSurface>,
    runtime: Handle,
    inner: Mutex<Inner>,
    callbacks: Mutex<Vec<ToggleCallback>>,
}

impl SidebarToggle {
    pub fn new(window: WindowId, surface: Arc<dyn ContentSurface>, runtime: Handle) -> Arc<Self> {
        Arc::new(Self {
            window,
            surface,
            runtime,
            inner: Mutex::new(Inner {
                state: SidebarState::Visible,
                style: None,
                restore_requested: false,
            }),
            callbacks: Mutex::new(Vec::new()),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> SidebarState {
        self.lock().state
    }

    /// Register a callback for every state transition.
    pub fn on_toggled(&self, callback: impl Fn(SidebarState) + Send + Sync + 'static) {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(callback));
    }

    fn notify(&self, state: SidebarState) {
        debug!(window = %self.window, ?state, "Sidebar state changed");
        let callbacks = self
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for callback in callbacks {
            callback(state);
        }
    }

    /// Flip between visible and hidden.
    ///
    /// Returns the spawned page update, if any, for callers that need to wait on it.
    pub fn toggle(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let mut inner = self.lock();
        let current = inner.state;
        match current {
            SidebarState::Visible => {
                inner.state = SidebarState::HiddenPending;
                inner.restore_requested = false;
                drop(inner);
                self.notify(SidebarState::HiddenPending);
                let this = Arc::clone(self);
                Some(self.runtime.spawn(async move { this.finish_hide().await }))
            }
            SidebarState::HiddenPending => {
                inner.restore_requested = !inner.restore_requested;
                debug!(
                    window = %self.window,
                    restore = inner.restore_requested,
                    "Sidebar toggled while hiding"
                );
                None
            }
            SidebarState::Hidden => {
                let style = inner.style.take();
                inner.state = SidebarState::Visible;
                drop(inner);
                self.notify(SidebarState::Visible);
                style.map(|key| {
                    let this = Arc::clone(self);
                    self.runtime.spawn(async move { this.remove(key).await })
                })
            }
        }
    }

    async fn finish_hide(self: Arc<Self>) {
        let result = self.surface.insert_css(COLLAPSE_CSS).await;
        let (next, stale) = {
            let mut inner = self.lock();
            let outcome = match result {
                Ok(key) if inner.restore_requested => (SidebarState::Visible, Some(key)),
                Ok(key) => {
                    inner.style = Some(key);
                    (SidebarState::Hidden, None)
                }
                Err(e) => {
                    report_failure("sidebar.hide", &e);
                    (SidebarState::Visible, None)
                }
            };
            inner.state = outcome.0;
            inner.restore_requested = false;
            outcome
        };
        self.notify(next);
        if let Some(key) = stale {
            self.remove(key).await;
        }
    }

    async fn remove(&self, key: StyleKey) {
        debug!(window = %self.window, key = %key.0, "Removing sidebar override");
        if let Err(e) = self.surface.remove_inserted_css(&key).await {
            report_failure("sidebar.show", &e);
        }
    }
}

/// One [`SidebarToggle`] per window.
pub struct SidebarCoordinator {
    runtime: Handle,
    toggles: Mutex<HashMap<WindowId, Arc<SidebarToggle>>>,
}

impl SidebarCoordinator {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            toggles: Mutex::new(HashMap::new()),
        }
    }

    /// The toggle for `window`, created on first use.
    pub fn for_window(&self, window: &dyn AppWindow) -> Arc<SidebarToggle> {
        let mut toggles = self.toggles.lock().unwrap_or_else(PoisonError::into_inner);
        let toggle = toggles.entry(window.id()).or_insert_with(|| {
            SidebarToggle::new(window.id(), window.content(), self.runtime.clone())
        });
        Arc::clone(toggle)
    }

    pub fn get(&self, window: WindowId) -> Option<Arc<SidebarToggle>> {
        self.toggles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&window)
            .cloned()
    }

    /// Drop the state of a destroyed window.
    pub fn forget(&self, window: WindowId) -> bool {
        self.toggles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&window)
            .is_some()
    }
}
