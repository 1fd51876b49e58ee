//! Menu builders.
//!
//! Provides the menu bar, the tray menu and the right-click context menu.

pub mod bar;
pub mod context;
pub mod node;
pub mod tray;

pub use node::{Accelerator, Handler, MenuBuilder, MenuNode, MenuSnapshot, Role};
