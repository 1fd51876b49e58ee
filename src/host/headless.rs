//! In-process host without a windowing system.
//!
//! Used by the `webshell-menus` binary to print menu layouts, and as the
//! window/page stand-in in tests. Every operation is logged and recorded.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

use crate::error::ActionError;
use crate::host::{AppWindow, CloseHandler, ContentSurface, MenuHost, StyleKey, WindowId};
use crate::menu::tray::{ClosePolicy, TrayMenu};
use crate::menu::MenuNode;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Page stand-in that keeps injected styles in memory.
#[derive(Default)]
pub struct HeadlessSurface {
    next_key: AtomicU64,
    inserted: AtomicUsize,
    styles: Mutex<Vec<(StyleKey, String)>>,
    calls: Mutex<Vec<String>>,
    fail_inserts: AtomicBool,
}

impl HeadlessSurface {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Styles currently applied, oldest first.
    pub fn active_styles(&self) -> Vec<(StyleKey, String)> {
        lock(&self.styles).clone()
    }

    /// Total successful injections.
    pub fn inserted_count(&self) -> usize {
        self.inserted.load(Ordering::SeqCst)
    }

    /// Non-style operations, in call order.
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    fn record(&self, call: String) {
        debug!(%call, "Page operation");
        lock(&self.calls).push(call);
    }
}

#[async_trait]
impl ContentSurface for HeadlessSurface {
    async fn insert_css(&self, css: &str) -> Result<StyleKey, ActionError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(ActionError::Style("page is not accepting styles".into()));
        }
        let key = StyleKey(format!(
            "style-{}",
            self.next_key.fetch_add(1, Ordering::SeqCst)
        ));
        lock(&self.styles).push((key.clone(), css.to_string()));
        self.inserted.fetch_add(1, Ordering::SeqCst);
        debug!(key = %key.0, "Inserted style");
        Ok(key)
    }

    async fn remove_inserted_css(&self, key: &StyleKey) -> Result<(), ActionError> {
        let mut styles = lock(&self.styles);
        let before = styles.len();
        styles.retain(|(k, _)| k != key);
        if styles.len() == before {
            return Err(ActionError::Style(format!("unknown style {}", key.0)));
        }
        debug!(key = %key.0, "Removed style");
        Ok(())
    }

    fn replace_misspelling(&self, word: &str) {
        self.record(format!("replace:{}", word));
    }

    fn add_word_to_dictionary(&self, word: &str) {
        self.record(format!("dictionary:{}", word));
    }

    fn copy_image_at(&self, x: i32, y: i32) {
        self.record(format!("copy-image:{},{}", x, y));
    }

    fn inspect_element(&self, x: i32, y: i32) {
        self.record(format!("inspect:{},{}", x, y));
    }
}

/// Window stand-in tracking visibility and focus.
pub struct HeadlessWindow {
    id: WindowId,
    visible: AtomicBool,
    focused: AtomicBool,
    surface: Arc<HeadlessSurface>,
    popups: Mutex<Vec<(MenuNode, i32, i32)>>,
    close_handler: Mutex<Option<CloseHandler>>,
}

impl HeadlessWindow {
    /// A visible, focused window.
    pub fn new(id: WindowId) -> Arc<Self> {
        Arc::new(Self {
            id,
            visible: AtomicBool::new(true),
            focused: AtomicBool::new(true),
            surface: HeadlessSurface::new(),
            popups: Mutex::new(Vec::new()),
            close_handler: Mutex::new(None),
        })
    }

    pub fn surface(&self) -> Arc<HeadlessSurface> {
        Arc::clone(&self.surface)
    }

    pub fn set_state(&self, visible: bool, focused: bool) {
        self.visible.store(visible, Ordering::SeqCst);
        self.focused.store(focused, Ordering::SeqCst);
    }

    pub fn popups(&self) -> Vec<(MenuNode, i32, i32)> {
        lock(&self.popups).clone()
    }

    /// Simulate the user closing the window.
    pub fn request_close(&self) -> ClosePolicy {
        let handler = lock(&self.close_handler).clone();
        let policy = handler.map_or(ClosePolicy::Proceed, |handler| handler());
        info!(window = %self.id, ?policy, "Close requested");
        policy
    }
}

impl AppWindow for HeadlessWindow {
    fn id(&self) -> WindowId {
        self.id
    }

    fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    fn is_focused(&self) -> bool {
        self.focused.load(Ordering::SeqCst)
    }

    fn show(&self) {
        self.visible.store(true, Ordering::SeqCst);
    }

    fn hide(&self) {
        self.set_state(false, false);
    }

    fn focus(&self) {
        self.focused.store(true, Ordering::SeqCst);
    }

    fn content(&self) -> Arc<dyn ContentSurface> {
        self.surface.clone()
    }

    fn popup(&self, menu: MenuNode, x: i32, y: i32) {
        lock(&self.popups).push((menu, x, y));
    }

    fn set_close_handler(&self, handler: CloseHandler) {
        *lock(&self.close_handler) = Some(handler);
    }
}

/// Keeps the installed menus and logs them as JSON.
#[derive(Default)]
pub struct HeadlessHost {
    app_menu: Mutex<Option<MenuNode>>,
    installs: AtomicUsize,
    trays: Mutex<BTreeMap<WindowId, TrayMenu>>,
    deferred: Mutex<Vec<Box<dyn FnOnce() + Send>>>,
}

impl HeadlessHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn app_menu(&self) -> Option<MenuNode> {
        lock(&self.app_menu).clone()
    }

    /// How many times an application menu was installed.
    pub fn menus_installed(&self) -> usize {
        self.installs.load(Ordering::SeqCst)
    }

    pub fn tray(&self, window: WindowId) -> Option<TrayMenu> {
        lock(&self.trays).get(&window).cloned()
    }

    pub fn tray_count(&self) -> usize {
        lock(&self.trays).len()
    }

    /// Run deferred tasks in submission order, including any they defer.
    pub fn run_deferred(&self) -> usize {
        let mut ran = 0;
        loop {
            let tasks = std::mem::take(&mut *lock(&self.deferred));
            if tasks.is_empty() {
                return ran;
            }
            ran += tasks.len();
            tasks.into_iter().for_each(|task| task());
        }
    }
}

impl MenuHost for HeadlessHost {
    fn set_application_menu(&self, menu: MenuNode) {
        debug!(
            menu = %serde_json::to_string(&menu.snapshot()).unwrap_or_default(),
            "Application menu"
        );
        *lock(&self.app_menu) = Some(menu);
        self.installs.fetch_add(1, Ordering::SeqCst);
    }

    fn set_tray(&self, window: WindowId, tray: TrayMenu) {
        debug!(%window, tooltip = %tray.tooltip, "Tray menu");
        lock(&self.trays).insert(window, tray);
    }

    fn defer(&self, task: Box<dyn FnOnce() + Send>) {
        lock(&self.deferred).push(task);
    }
}
