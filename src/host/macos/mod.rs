//! AppKit menu host: the application menu and status-bar tray items.
//!
//! All AppKit calls run on the main thread; [`MacHost`] can be called from
//! anywhere and hops over with [`dispatch_to_main`].

pub mod render;
pub mod target;

use dispatch::Queue;
use objc2::rc::Retained;
use objc2::sel;
use objc2_app_kit::{NSApplication, NSImage, NSStatusBar, NSStatusItem, NSVariableStatusItemLength};
use objc2_foundation::{MainThreadMarker, NSString};
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, warn};

use crate::host::registry::Scope;
use crate::host::{MenuHost, WindowId};
use crate::menu::tray::TrayMenu;
use crate::menu::{MenuNode, Role};

use render::{Renderer, RoleHandler};
use target::{registry, MenuActionTarget};

/// Native objects that must stay alive while installed.
struct Installed {
    target: Retained<MenuActionTarget>,
    trays: HashMap<WindowId, Retained<NSStatusItem>>,
}

// SAFETY: only touched on the main thread, guarded by MainThreadMarker checks.
unsafe impl Send for Installed {}
unsafe impl Sync for Installed {}

static INSTALLED: OnceCell<Mutex<Installed>> = OnceCell::new();

fn installed(mtm: MainThreadMarker) -> &'static Mutex<Installed> {
    INSTALLED.get_or_init(|| {
        Mutex::new(Installed {
            target: MenuActionTarget::new(mtm),
            trays: HashMap::new(),
        })
    })
}

/// Run `f` on the main thread, inline when already there.
pub fn dispatch_to_main<F>(f: F)
where
    F: FnOnce() + Send + 'static,
{
    if MainThreadMarker::new().is_some() {
        f();
    } else {
        Queue::main().exec_async(f);
    }
}

#[derive(Default)]
pub struct MacHost {
    roles: Option<RoleHandler>,
}

impl MacHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle roles without a standard AppKit action (reload, zoom, dev tools).
    pub fn with_role_handler(mut self, handler: impl Fn(Role) + Send + Sync + 'static) -> Self {
        self.roles = Some(Arc::new(handler));
        self
    }
}

impl MenuHost for MacHost {
    fn set_application_menu(&self, menu: MenuNode) {
        let roles = self.roles.clone();
        dispatch_to_main(move || {
            let Some(mtm) = MainThreadMarker::new() else {
                return;
            };
            let state = installed(mtm).lock().unwrap_or_else(PoisonError::into_inner);
            let released = registry().release(Scope::MenuBar);

            let renderer = Renderer::new(mtm, &state.target, Scope::MenuBar, roles.as_ref());
            let main_menu = renderer.menu(&menu);
            let app = NSApplication::sharedApplication(mtm);
            unsafe { app.setMainMenu(Some(&main_menu)) };

            for (index, group) in menu.items().iter().enumerate() {
                if let MenuNode::Submenu {
                    role: Some(Role::HelpMenu),
                    ..
                } = group
                {
                    let submenu = unsafe { main_menu.itemAtIndex(index as isize) }
                        .and_then(|item| unsafe { item.submenu() });
                    if let Some(submenu) = submenu {
                        unsafe { app.setHelpMenu(Some(&submenu)) };
                    }
                }
            }
            info!(released, "Application menu rendered");
        });
    }

    fn set_tray(&self, window: WindowId, tray: TrayMenu) {
        let roles = self.roles.clone();
        dispatch_to_main(move || {
            let Some(mtm) = MainThreadMarker::new() else {
                return;
            };
            let mut state = installed(mtm).lock().unwrap_or_else(PoisonError::into_inner);
            let scope = Scope::Tray(window);
            registry().release(scope);

            let menu = Renderer::new(mtm, &state.target, scope, roles.as_ref()).menu(&tray.menu);
            let click_tag = registry().register(scope, tray.on_click.clone(), false);

            let status_item = match state.trays.get(&window) {
                Some(existing) => existing.clone(),
                None => unsafe {
                    NSStatusBar::systemStatusBar().statusItemWithLength(NSVariableStatusItemLength)
                },
            };

            if let Some(button) = unsafe { status_item.button(mtm) } {
                let image = tray.icon.as_deref().and_then(|path| unsafe {
                    NSImage::initByReferencingFile(NSImage::alloc(), &NSString::from_str(path))
                });
                unsafe {
                    match image {
                        Some(image) => {
                            image.setTemplate(true);
                            button.setImage(Some(&image));
                        }
                        None => {
                            if tray.icon.is_some() {
                                warn!(icon = ?tray.icon, "Tray icon not found, using title");
                            }
                            button.setTitle(&NSString::from_str(&tray.tooltip));
                        }
                    }
                    button.setToolTip(Some(&NSString::from_str(&tray.tooltip)));
                    // Left click toggles the window, right click opens the menu.
                    button.setTag(click_tag);
                    button.setTarget(Some(&state.target));
                    button.setAction(Some(sel!(itemClicked:)));
                    button.setMenu(Some(&menu));
                }
            }

            state.trays.insert(window, status_item);
            info!(%window, "Tray rendered");
        });
    }

    fn defer(&self, task: Box<dyn FnOnce() + Send>) {
        // Always queue, even on the main thread, so it runs after menu tracking ends.
        Queue::main().exec_async(task);
    }
}
