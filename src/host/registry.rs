//! Numeric tags for native menu items.
//!
//! Native toolkits dispatch a click as "item with tag N was activated". The
//! registry maps tags back to handlers and groups them by the menu that owns
//! them, so reinstalling a menu releases exactly the old menu's handlers.

use std::collections::HashMap;

use crate::host::WindowId;
use crate::menu::Handler;

/// Which installed menu a tag belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    MenuBar,
    Tray(WindowId),
}

struct Entry {
    scope: Scope,
    handler: Handler,
    checkable: bool,
}

/// A registered handler, as returned by [`HandlerRegistry::resolve`].
#[derive(Clone)]
pub struct Resolved {
    pub handler: Handler,
    /// The item shows a check mark the host should flip after running the handler.
    pub checkable: bool,
}

pub struct HandlerRegistry {
    next: isize,
    entries: HashMap<isize, Entry>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            // Tag 0 is the toolkit default for untagged items.
            next: 1,
            entries: HashMap::new(),
        }
    }

    pub fn register(&mut self, scope: Scope, handler: Handler, checkable: bool) -> isize {
        let tag = self.next;
        self.next += 1;
        self.entries.insert(
            tag,
            Entry {
                scope,
                handler,
                checkable,
            },
        );
        tag
    }

    /// Drop every handler of `scope`. Returns how many were released.
    pub fn release(&mut self, scope: Scope) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.scope != scope);
        before - self.entries.len()
    }

    pub fn resolve(&self, tag: isize) -> Option<Resolved> {
        self.entries.get(&tag).map(|entry| Resolved {
            handler: entry.handler.clone(),
            checkable: entry.checkable,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
