//! Turns [`MenuNode`] trees into AppKit menus.

use objc2::rc::Retained;
use objc2::runtime::Sel;
use objc2::sel;
use objc2_app_kit::{
    NSControlStateValueOff, NSControlStateValueOn, NSEventModifierFlags, NSMenu, NSMenuItem,
};
use objc2_foundation::{MainThreadMarker, NSString};
use std::sync::Arc;

use crate::host::macos::target::{registry, MenuActionTarget};
use crate::host::registry::Scope;
use crate::menu::{Accelerator, Handler, MenuNode, Role};

/// Receives roles AppKit has no standard selector for (reload, zoom, dev tools).
pub type RoleHandler = Arc<dyn Fn(Role) + Send + Sync + 'static>;

/// Standard responder-chain action for `role`, if AppKit has one.
fn role_selector(role: Role) -> Option<Sel> {
    match role {
        Role::Undo => Some(sel!(undo:)),
        Role::Redo => Some(sel!(redo:)),
        Role::Cut => Some(sel!(cut:)),
        Role::Copy => Some(sel!(copy:)),
        Role::Paste => Some(sel!(paste:)),
        Role::SelectAll => Some(sel!(selectAll:)),
        Role::ToggleFullScreen => Some(sel!(toggleFullScreen:)),
        _ => None,
    }
}

/// Standard key equivalent for roles that have one.
fn role_key(role: Role) -> &'static str {
    match role {
        Role::Undo => "z",
        Role::Redo => "Z",
        Role::Cut => "x",
        Role::Copy => "c",
        Role::Paste => "v",
        Role::SelectAll => "a",
        Role::Reload => "r",
        Role::ZoomIn => "+",
        Role::ZoomOut => "-",
        Role::ResetZoom => "0",
        _ => "",
    }
}

pub struct Renderer<'a> {
    mtm: MainThreadMarker,
    target: &'a MenuActionTarget,
    scope: Scope,
    roles: Option<&'a RoleHandler>,
}

impl<'a> Renderer<'a> {
    pub fn new(
        mtm: MainThreadMarker,
        target: &'a MenuActionTarget,
        scope: Scope,
        roles: Option<&'a RoleHandler>,
    ) -> Self {
        Self {
            mtm,
            target,
            scope,
            roles,
        }
    }

    /// Render the children of `node` into a fresh menu.
    pub fn menu(&self, node: &MenuNode) -> Retained<NSMenu> {
        let menu = NSMenu::new(self.mtm);
        if let Some(label) = node.label_text() {
            unsafe { menu.setTitle(&NSString::from_str(label)) };
        }
        for child in node.items() {
            menu.addItem(&self.item(child));
        }
        menu
    }

    fn item(&self, node: &MenuNode) -> Retained<NSMenuItem> {
        match node {
            MenuNode::Separator => NSMenuItem::separatorItem(self.mtm),
            MenuNode::Action {
                label,
                enabled,
                accelerator,
                handler,
                ..
            } => {
                let item = self.create_item(label, accelerator.as_deref());
                match handler {
                    Some(handler) if *enabled => self.bind(&item, handler.clone(), false),
                    _ => unsafe { item.setEnabled(false) },
                }
                item
            }
            MenuNode::Role {
                label,
                role,
                enabled,
                ..
            } => self.role_item(label, *role, *enabled),
            MenuNode::Checkbox {
                label,
                checked,
                accelerator,
                handler,
                ..
            } => {
                let item = self.create_item(label, accelerator.as_deref());
                unsafe {
                    item.setState(if *checked {
                        NSControlStateValueOn
                    } else {
                        NSControlStateValueOff
                    });
                }
                self.bind(&item, handler.clone(), true);
                item
            }
            MenuNode::Submenu { label, .. } => {
                let item = self.create_item(label, None);
                item.setSubmenu(Some(&self.menu(node)));
                item
            }
        }
    }

    fn role_item(&self, label: &str, role: Role, enabled: bool) -> Retained<NSMenuItem> {
        let item = self.create_item(label, None);
        unsafe { item.setKeyEquivalent(&NSString::from_str(role_key(role))) };
        if !enabled {
            unsafe { item.setEnabled(false) };
            return item;
        }
        if let Some(action) = role_selector(role) {
            // Nil target: the first responder handles it.
            unsafe { item.setAction(Some(action)) };
        } else if let Some(roles) = self.roles {
            let roles = Arc::clone(roles);
            self.bind(&item, Arc::new(move || roles(role)), false);
        } else {
            unsafe { item.setEnabled(false) };
        }
        item
    }

    fn bind(&self, item: &NSMenuItem, handler: Handler, checkable: bool) {
        let tag = registry().register(self.scope, handler, checkable);
        unsafe {
            item.setTag(tag);
            item.setAction(Some(sel!(itemClicked:)));
            item.setTarget(Some(self.target));
        }
    }

    fn create_item(&self, title: &str, accelerator: Option<&str>) -> Retained<NSMenuItem> {
        let accel = accelerator.and_then(Accelerator::parse);
        let key = accel.as_ref().map_or("", |a| a.key.as_str());
        let item = unsafe {
            NSMenuItem::initWithTitle_action_keyEquivalent(
                self.mtm.alloc(),
                &NSString::from_str(title),
                None,
                &NSString::from_str(key),
            )
        };
        if let Some(accel) = accel {
            unsafe { item.setKeyEquivalentModifierMask(modifiers(&accel)) };
        }
        item
    }
}

fn modifiers(accel: &Accelerator) -> NSEventModifierFlags {
    let mut mask = 0;
    if accel.cmd_or_ctrl {
        mask |= NSEventModifierFlags::NSEventModifierFlagCommand.0;
    }
    if accel.alt {
        mask |= NSEventModifierFlags::NSEventModifierFlagOption.0;
    }
    if accel.shift {
        mask |= NSEventModifierFlags::NSEventModifierFlagShift.0;
    }
    NSEventModifierFlags(mask)
}
