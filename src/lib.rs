//! Native menus for a desktop shell hosting a single web application.
//!
//! Builders in [`menu`] produce declarative [`menu::MenuNode`] trees and wire
//! their handlers to the collaborators in [`host`]; hosts render and install
//! them. [`sidebar`] implements the "mobile mode" layout toggle.

pub mod bug;
pub mod config;
pub mod env;
pub mod error;
pub mod host;
pub mod l10n;
pub mod menu;
pub mod settings;
pub mod sidebar;

#[cfg(test)]
mod testing;
