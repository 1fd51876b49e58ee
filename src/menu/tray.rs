//! Tray icon menu and close-to-tray behaviour.

use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, info};

use crate::env::BuildEnvironment;
use crate::error::run_action;
use crate::host::{AppWindow, MenuHost, Services, WindowId};
use crate::menu::{Handler, MenuBuilder, MenuNode};

static GLOBAL_QUIT: Lazy<QuitFlag> = Lazy::new(QuitFlag::new);

/// Set once the application starts quitting; close requests then go through.
#[derive(Debug, Clone, Default)]
pub struct QuitFlag(Arc<AtomicBool>);

impl QuitFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide flag.
    pub fn global() -> Self {
        GLOBAL_QUIT.clone()
    }

    /// Mark the quit sequence as started. Returns `true` for the first call only.
    pub fn begin(&self) -> bool {
        let first = !self.0.swap(true, Ordering::SeqCst);
        if first {
            info!("Quit sequence started");
        }
        first
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of a window close request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosePolicy {
    /// Let the window close.
    Proceed,
    /// The close was cancelled and the window hidden.
    HideInstead,
}

/// What [`toggle_visibility`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityChange {
    Hidden,
    Shown,
    Focused,
}

/// Hide a focused window, show a hidden one, focus a visible but unfocused one.
pub fn toggle_visibility(window: &dyn AppWindow) -> VisibilityChange {
    let change = if window.is_visible() && window.is_focused() {
        window.hide();
        VisibilityChange::Hidden
    } else if !window.is_visible() {
        window.show();
        VisibilityChange::Shown
    } else {
        window.focus();
        VisibilityChange::Focused
    };
    debug!(window = %window.id(), ?change, "Toggled window visibility");
    change
}

/// Hides windows on close unless the application is quitting.
///
/// Holds the window weakly: the window owns the interceptor through its close handler.
pub struct CloseInterceptor {
    window: Weak<dyn AppWindow>,
    services: Services,
}

impl CloseInterceptor {
    pub fn new(window: &Arc<dyn AppWindow>, services: Services) -> Self {
        Self {
            window: Arc::downgrade(window),
            services,
        }
    }

    pub fn on_close_requested(&self) -> ClosePolicy {
        let Some(window) = self.window.upgrade() else {
            return ClosePolicy::Proceed;
        };
        let hide_on_close = self.services.settings.snapshot().window.hide_on_close;
        if !self.services.quit.is_set() && hide_on_close {
            window.hide();
            debug!(window = %window.id(), "Close intercepted, hiding to tray");
            ClosePolicy::HideInstead
        } else {
            ClosePolicy::Proceed
        }
    }
}

/// Everything the host needs to show a tray icon.
#[derive(Clone)]
pub struct TrayMenu {
    pub tooltip: String,
    pub icon: Option<String>,
    pub menu: MenuNode,
    /// Runs on a single click on the icon.
    pub on_click: Handler,
}

/// Result of installing a tray.
#[derive(Clone)]
pub struct TrayHandle {
    pub window: WindowId,
    pub tray: TrayMenu,
}

pub struct TrayMenuBuilder<'a> {
    env: &'a BuildEnvironment,
    services: &'a Services,
}

impl<'a> TrayMenuBuilder<'a> {
    pub fn new(env: &'a BuildEnvironment, services: &'a Services) -> Self {
        Self { env, services }
    }

    /// Build the tray for `window`, install it and hook the window's close requests.
    pub fn build(&self, window: Arc<dyn AppWindow>) -> TrayHandle {
        let tray = TrayMenu {
            tooltip: self.env.app_name.clone(),
            icon: self.env.tray_icon.clone(),
            menu: self.menu(&window),
            on_click: Arc::new(deferred_toggle(&self.services.host, &window)),
        };

        let interceptor = CloseInterceptor::new(&window, self.services.clone());
        window.set_close_handler(Arc::new(move || interceptor.on_close_requested()));

        self.services.host.set_tray(window.id(), tray.clone());
        info!(window = %window.id(), "Tray installed");

        TrayHandle {
            window: window.id(),
            tray,
        }
    }

    pub fn menu(&self, window: &Arc<dyn AppWindow>) -> MenuNode {
        let at_bottom = self.env.platform.toggle_at_bottom();
        let services = self.services;

        let mut header = MenuNode::label(self.env.app_name.as_str());
        if let Some(icon) = &self.env.tray_icon {
            header = header.with_icon(icon.as_str());
        }

        let mut menu = MenuBuilder::new();
        menu.push(header)
            .separator()
            .push_if(!at_bottom, || self.toggle_item(window))
            .push({
                let windows = Arc::clone(&services.windows);
                MenuNode::action(self.env.t("help.bugs"), move || {
                    let _ = run_action("tray.report_bug", || windows.report_bug());
                })
                .with_id("report-bug")
            })
            .push({
                let windows = Arc::clone(&services.windows);
                let parent = Arc::clone(window);
                MenuNode::action(self.env.t("windows.about"), move || {
                    windows.show_about(parent.as_ref())
                })
                .with_id("about")
            })
            .push({
                let windows = Arc::clone(&services.windows);
                let parent = Arc::clone(window);
                MenuNode::action(self.env.t("windows.docs"), move || {
                    let _ = run_action("tray.docs", || windows.open_docs(parent.as_ref()));
                })
                .with_id("docs")
            })
            .separator()
            .push_if(at_bottom, || self.toggle_item(window))
            .push({
                let services = services.clone();
                MenuNode::action(self.env.t("tray.quit"), move || services.quit()).with_id("quit")
            });

        menu.into_submenu(self.env.app_name.as_str())
    }

    fn toggle_item(&self, window: &Arc<dyn AppWindow>) -> MenuNode {
        MenuNode::action(
            self.env.t("tray.toggle"),
            deferred_toggle(&self.services.host, window),
        )
        .with_id("toggle-visibility")
    }
}

/// Toggle `window` once the host is done with the click that triggered it.
fn deferred_toggle(
    host: &Arc<dyn MenuHost>,
    window: &Arc<dyn AppWindow>,
) -> impl Fn() + Send + Sync + 'static {
    let host = Arc::clone(host);
    let window = Arc::clone(window);
    move || {
        let window = Arc::clone(&window);
        host.defer(Box::new(move || {
            toggle_visibility(window.as_ref());
        }));
    }
}
