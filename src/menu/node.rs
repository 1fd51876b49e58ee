//! Declarative menu trees.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Handler type for clickable menu items.
pub type Handler = Arc<dyn Fn() + Send + Sync + 'static>;

/// Standard behaviours supplied by the host toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    SelectAll,
    Reload,
    ForceReload,
    ToggleDevTools,
    ResetZoom,
    ZoomIn,
    ZoomOut,
    ToggleFullScreen,
    EditMenu,
    HelpMenu,
}

/// One node of a menu tree.
#[derive(Clone)]
pub enum MenuNode {
    Separator,
    Action {
        id: Option<String>,
        label: String,
        enabled: bool,
        icon: Option<String>,
        accelerator: Option<String>,
        handler: Option<Handler>,
    },
    Role {
        id: Option<String>,
        label: String,
        role: Role,
        enabled: bool,
    },
    Checkbox {
        id: Option<String>,
        label: String,
        checked: bool,
        accelerator: Option<String>,
        handler: Handler,
    },
    Submenu {
        label: String,
        role: Option<Role>,
        items: Vec<MenuNode>,
    },
}

impl MenuNode {
    /// A clickable item.
    pub fn action(label: impl Into<String>, handler: impl Fn() + Send + Sync + 'static) -> Self {
        Self::Action {
            id: None,
            label: label.into(),
            enabled: true,
            icon: None,
            accelerator: None,
            handler: Some(Arc::new(handler)),
        }
    }

    /// A disabled item with no handler, used for headers.
    pub fn label(label: impl Into<String>) -> Self {
        Self::Action {
            id: None,
            label: label.into(),
            enabled: false,
            icon: None,
            accelerator: None,
            handler: None,
        }
    }

    pub fn role(label: impl Into<String>, role: Role) -> Self {
        Self::Role {
            id: None,
            label: label.into(),
            role,
            enabled: true,
        }
    }

    pub fn checkbox(
        label: impl Into<String>,
        checked: bool,
        handler: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self::Checkbox {
            id: None,
            label: label.into(),
            checked,
            accelerator: None,
            handler: Arc::new(handler),
        }
    }

    pub fn submenu(label: impl Into<String>, items: Vec<MenuNode>) -> Self {
        Self::Submenu {
            label: label.into(),
            role: None,
            items,
        }
    }

    /// Builder: set the lookup id.
    pub fn with_id(mut self, new_id: impl Into<String>) -> Self {
        match &mut self {
            Self::Action { id, .. } | Self::Role { id, .. } | Self::Checkbox { id, .. } => {
                *id = Some(new_id.into())
            }
            Self::Separator | Self::Submenu { .. } => {}
        }
        self
    }

    /// Builder: set the enabled state.
    pub fn enabled(mut self, value: bool) -> Self {
        match &mut self {
            Self::Action { enabled, .. } | Self::Role { enabled, .. } => *enabled = value,
            _ => {}
        }
        self
    }

    pub fn with_icon(mut self, path: impl Into<String>) -> Self {
        if let Self::Action { icon, .. } = &mut self {
            *icon = Some(path.into());
        }
        self
    }

    pub fn with_accelerator(mut self, value: impl Into<String>) -> Self {
        match &mut self {
            Self::Action { accelerator, .. } | Self::Checkbox { accelerator, .. } => {
                *accelerator = Some(value.into())
            }
            _ => {}
        }
        self
    }

    /// Builder: attach a role to a submenu.
    pub fn with_role(mut self, value: Role) -> Self {
        if let Self::Submenu { role, .. } = &mut self {
            *role = Some(value);
        }
        self
    }

    pub fn is_separator(&self) -> bool {
        matches!(self, Self::Separator)
    }

    pub fn label_text(&self) -> Option<&str> {
        match self {
            Self::Separator => None,
            Self::Action { label, .. }
            | Self::Role { label, .. }
            | Self::Checkbox { label, .. }
            | Self::Submenu { label, .. } => Some(label),
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Action { id, .. } | Self::Role { id, .. } | Self::Checkbox { id, .. } => {
                id.as_deref()
            }
            _ => None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Separator => false,
            Self::Action { enabled, .. } | Self::Role { enabled, .. } => *enabled,
            Self::Checkbox { .. } | Self::Submenu { .. } => true,
        }
    }

    pub fn items(&self) -> &[MenuNode] {
        match self {
            Self::Submenu { items, .. } => items,
            _ => &[],
        }
    }

    /// Depth-first search by id.
    pub fn find(&self, id: &str) -> Option<&MenuNode> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.items().iter().find_map(|item| item.find(id))
    }

    /// Direct child submenu with the given label.
    pub fn submenu_named(&self, label: &str) -> Option<&MenuNode> {
        self.items()
            .iter()
            .find(|item| matches!(item, Self::Submenu { .. }) && item.label_text() == Some(label))
    }

    /// Invoke the handler if the item is enabled. Returns whether it ran.
    pub fn click(&self) -> bool {
        match self {
            Self::Action {
                enabled: true,
                handler: Some(handler),
                ..
            }
            | Self::Checkbox { handler, .. } => {
                handler();
                true
            }
            _ => false,
        }
    }

    /// Handler-free view of the tree.
    pub fn snapshot(&self) -> MenuSnapshot {
        match self {
            Self::Separator => MenuSnapshot::Separator,
            Self::Action {
                id,
                label,
                enabled,
                icon,
                accelerator,
                ..
            } => MenuSnapshot::Action {
                id: id.clone(),
                label: label.clone(),
                enabled: *enabled,
                icon: icon.clone(),
                accelerator: accelerator.clone(),
            },
            Self::Role {
                id,
                label,
                role,
                enabled,
            } => MenuSnapshot::Role {
                id: id.clone(),
                label: label.clone(),
                role: *role,
                enabled: *enabled,
            },
            Self::Checkbox {
                id,
                label,
                checked,
                accelerator,
                ..
            } => MenuSnapshot::Checkbox {
                id: id.clone(),
                label: label.clone(),
                checked: *checked,
                accelerator: accelerator.clone(),
            },
            Self::Submenu { label, role, items } => MenuSnapshot::Submenu {
                label: label.clone(),
                role: *role,
                items: items.iter().map(MenuNode::snapshot).collect(),
            },
        }
    }
}

impl fmt::Debug for MenuNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.snapshot().fmt(f)
    }
}

/// Serializable copy of a [`MenuNode`] tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MenuSnapshot {
    Separator,
    Action {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        label: String,
        enabled: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        accelerator: Option<String>,
    },
    Role {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        label: String,
        role: Role,
        enabled: bool,
    },
    Checkbox {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        label: String,
        checked: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        accelerator: Option<String>,
    },
    Submenu {
        label: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        role: Option<Role>,
        items: Vec<MenuSnapshot>,
    },
}

/// Ordered item list assembled from plain boolean guards.
#[derive(Default)]
pub struct MenuBuilder {
    items: Vec<MenuNode>,
}

impl MenuBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: MenuNode) -> &mut Self {
        self.items.push(node);
        self
    }

    pub fn separator(&mut self) -> &mut Self {
        self.push(MenuNode::Separator)
    }

    pub fn push_if(&mut self, condition: bool, node: impl FnOnce() -> MenuNode) -> &mut Self {
        if condition {
            self.items.push(node());
        }
        self
    }

    /// Append a block of items when `condition` holds.
    pub fn section_if(&mut self, condition: bool, block: impl FnOnce(&mut Self)) -> &mut Self {
        if condition {
            block(self);
        }
        self
    }

    pub fn into_items(self) -> Vec<MenuNode> {
        self.items
    }

    pub fn into_submenu(self, label: impl Into<String>) -> MenuNode {
        MenuNode::submenu(label, self.items)
    }
}

/// Parsed keyboard shortcut such as `CmdOrCtrl+Alt+R`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accelerator {
    pub key: String,
    pub cmd_or_ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Accelerator {
    pub fn parse(spec: &str) -> Option<Self> {
        let mut parts: Vec<&str> = spec.split('+').map(str::trim).collect();
        let key = parts.pop().filter(|k| !k.is_empty())?;
        let mut accel = Self {
            key: key.to_lowercase(),
            cmd_or_ctrl: false,
            alt: false,
            shift: false,
        };
        for modifier in parts {
            match modifier.to_lowercase().as_str() {
                "cmdorctrl" | "commandorcontrol" | "cmd" | "command" | "ctrl" | "control" => {
                    accel.cmd_or_ctrl = true
                }
                "alt" | "option" => accel.alt = true,
                "shift" => accel.shift = true,
                _ => return None,
            }
        }
        Some(accel)
    }
}
