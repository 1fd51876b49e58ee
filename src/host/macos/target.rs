//! Objective-C action target for rendered menu items.
//!
//! Every rendered item and the tray button point at one `MenuActionTarget`;
//! the sender's tag selects the handler in the shared registry.

use objc2::mutability::MainThreadOnly;
use objc2::rc::Retained;
use objc2::{declare_class, msg_send, msg_send_id, ClassType, DeclaredClass};
use objc2_app_kit::{NSControlStateValueOff, NSControlStateValueOn, NSMenuItem};
use objc2_foundation::{MainThreadMarker, NSObject, NSObjectProtocol};
use once_cell::sync::Lazy;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

use crate::host::registry::HandlerRegistry;

static REGISTRY: Lazy<Mutex<HandlerRegistry>> = Lazy::new(|| Mutex::new(HandlerRegistry::new()));

/// The handlers of every installed native menu.
pub fn registry() -> MutexGuard<'static, HandlerRegistry> {
    REGISTRY.lock().unwrap_or_else(PoisonError::into_inner)
}

declare_class!(
    pub struct MenuActionTarget;

    unsafe impl ClassType for MenuActionTarget {
        type Super = NSObject;
        type Mutability = MainThreadOnly;
        const NAME: &'static str = "WebShellMenuActionTarget";
    }

    impl DeclaredClass for MenuActionTarget {}

    unsafe impl NSObjectProtocol for MenuActionTarget {}

    unsafe impl MenuActionTarget {
        #[method(itemClicked:)]
        fn item_clicked(&self, sender: &NSObject) {
            let tag: isize = unsafe { msg_send![sender, tag] };
            // Release the lock before running: handlers may reinstall menus.
            let resolved = registry().resolve(tag);
            let Some(resolved) = resolved else {
                warn!(tag, "Click on a released menu item");
                return;
            };
            debug!(tag, "Menu item clicked");
            (resolved.handler)();

            if resolved.checkable {
                // SAFETY: only menu items are registered as checkable.
                let item = unsafe { &*(sender as *const NSObject as *const NSMenuItem) };
                unsafe {
                    let next = if item.state() == NSControlStateValueOn {
                        NSControlStateValueOff
                    } else {
                        NSControlStateValueOn
                    };
                    item.setState(next);
                }
            }
        }
    }
);

impl MenuActionTarget {
    pub fn new(mtm: MainThreadMarker) -> Retained<Self> {
        unsafe { msg_send_id![mtm.alloc::<Self>(), init] }
    }
}
