//! Right-click context menu with spell checking.

use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::env::BuildEnvironment;
use crate::error::{run_action, ActionError};
use crate::host::{AppWindow, Services};
use crate::menu::{MenuBuilder, MenuNode, Role};

/// Edit capabilities at the click location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditFlags {
    pub can_copy: bool,
    pub can_cut: bool,
    pub can_paste: bool,
    pub can_delete: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    None,
    Image,
    Audio,
    Video,
    Canvas,
    File,
    Plugin,
}

/// Parameters of one right-click, as reported by the web contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClickContext {
    pub x: i32,
    pub y: i32,
    pub selection_text: String,
    pub misspelled_word: String,
    pub dictionary_suggestions: Vec<String>,
    pub edit_flags: EditFlags,
    #[serde(rename = "linkURL")]
    pub link_url: String,
    pub link_text: String,
    pub media_type: MediaType,
    #[serde(rename = "srcURL")]
    pub src_url: String,
}

/// Builds the popup for one window.
pub struct ContextMenuBuilder<'a> {
    window: &'a Arc<dyn AppWindow>,
    env: &'a BuildEnvironment,
    services: &'a Services,
}

impl<'a> ContextMenuBuilder<'a> {
    pub fn new(
        window: &'a Arc<dyn AppWindow>,
        env: &'a BuildEnvironment,
        services: &'a Services,
    ) -> Self {
        Self {
            window,
            env,
            services,
        }
    }

    /// Build the menu for `click` and show it at the click coordinates.
    pub fn popup(&self, click: &ClickContext) {
        let menu = self.build(click, self.env.dev_mode());
        debug!(window = %self.window.id(), x = click.x, y = click.y, "Showing context menu");
        self.window.popup(menu, click.x, click.y);
    }

    pub fn build(&self, click: &ClickContext, dev_mode: bool) -> MenuNode {
        let content = self.window.content();
        let flags = click.edit_flags;
        let has_misspelling = !click.misspelled_word.is_empty();
        let has_edit = flags.can_copy || flags.can_cut || flags.can_delete;
        let has_link = !click.link_url.is_empty();
        let has_link_text = !click.link_text.is_empty();
        let is_image = click.media_type == MediaType::Image;

        let mut menu = MenuBuilder::new();
        menu.separator();

        for suggestion in &click.dictionary_suggestions {
            let content = Arc::clone(&content);
            let word = suggestion.clone();
            menu.push(MenuNode::action(suggestion.as_str(), move || {
                content.replace_misspelling(&word)
            }));
        }

        menu.section_if(has_misspelling, |menu| {
            let content = Arc::clone(&content);
            let word = click.misspelled_word.clone();
            menu.separator()
                .push(
                    MenuNode::action(self.env.t("context.dictionaryAdd"), move || {
                        content.add_word_to_dictionary(&word)
                    })
                    .with_id("dictionary-add"),
                )
                .separator();
        });

        menu.section_if(has_edit, |menu| {
            let can_paste =
                flags.can_paste && !self.services.shell.clipboard_formats().is_empty();
            let shell = Arc::clone(&self.services.shell);
            let url = format!(
                "{}{}",
                self.env.search_url,
                urlencoding::encode(&click.selection_text)
            );
            menu.push(MenuNode::role(self.env.t("context.cut"), Role::Cut).enabled(flags.can_cut))
                .push(
                    MenuNode::role(self.env.t("context.copy"), Role::Copy)
                        .enabled(flags.can_copy),
                )
                .push(MenuNode::role(self.env.t("context.paste"), Role::Paste).enabled(can_paste))
                .push(
                    MenuNode::action(self.env.t("context.googleSearch"), move || {
                        let _ = run_action("context.search", || shell.open_external(&url));
                    })
                    .with_id("search-web")
                    .enabled(flags.can_copy),
                )
                .separator();
        });

        menu.section_if(has_link, |menu| {
            menu.push(
                self.copy_text_item("context.copyURL", click.link_url.clone())
                    .with_id("copy-link-url"),
            );
            menu.push_if(has_link_text, || {
                self.copy_text_item("context.copyURLText", click.link_text.clone())
                    .with_id("copy-link-text")
            });
            menu.separator();
        });

        menu.section_if(is_image, |menu| {
            let content = Arc::clone(&content);
            let (x, y) = (click.x, click.y);
            menu.push(
                MenuNode::action(self.env.t("context.copyImage"), move || {
                    content.copy_image_at(x, y)
                })
                .with_id("copy-image"),
            )
            .push(
                self.copy_text_item("context.copyImageURL", click.src_url.clone())
                    .with_id("copy-image-url"),
            )
            .separator();
        });

        menu.push_if(dev_mode, || {
            let content = Arc::clone(&content);
            let (x, y) = (click.x, click.y);
            MenuNode::action(self.env.t("context.inspectElement"), move || {
                content.inspect_element(x, y)
            })
            .with_id("inspect-element")
        });

        menu.into_submenu("")
    }

    fn copy_text_item(&self, label_key: &str, text: String) -> MenuNode {
        let shell = Arc::clone(&self.services.shell);
        MenuNode::action(self.env.t(label_key), move || {
            let _ = run_action("context.copy_text", || -> Result<(), ActionError> {
                shell.write_clipboard_text(&text)
            });
        })
    }
}
