//! Application menu bar.

use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::env::{repository_web_link, BuildEnvironment};
use crate::error::run_action;
use crate::host::{AppWindow, Services};
use crate::menu::{MenuBuilder, MenuNode, Role};

/// Id of the developer tools item, for hosts that look it up.
pub const DEV_TOOLS_ID: &str = "devTools";
pub const MOBILE_MODE_ID: &str = "mobile-mode";

/// Whether `arg` asks for a minimized start (`-m`, `--start-minimized` and their variants).
pub fn is_minimized_flag(arg: &str) -> bool {
    let name = arg
        .strip_prefix("--")
        .or_else(|| arg.strip_prefix('-'))
        .unwrap_or("");
    name == "m" || name == "start-minimized"
}

/// Arguments for a user-initiated relaunch.
///
/// Minimized-start flags are dropped so the new instance comes up visible.
/// The launcher prefix is dropped as well: the program path, plus the entry
/// point when the program is a script runtime (`node app --foo`).
pub fn relaunch_args<S: AsRef<OsStr>>(argv: &[S]) -> Vec<OsString> {
    let kept: Vec<&OsStr> = argv
        .iter()
        .map(AsRef::as_ref)
        .filter(|arg| !arg.to_str().is_some_and(is_minimized_flag))
        .collect();
    let launcher = match (kept.first(), kept.get(1)) {
        (Some(program), Some(entry))
            if !is_flag(entry) && (is_runtime(program) || is_script(entry)) =>
        {
            2
        }
        _ => 1,
    };
    kept.into_iter()
        .skip(launcher)
        .map(OsStr::to_os_string)
        .collect()
}

const RUNTIMES: [&str; 6] = ["node", "electron", "deno", "bun", "python", "python3"];

fn is_flag(arg: &OsStr) -> bool {
    arg.as_encoded_bytes().starts_with(b"-")
}

fn is_runtime(program: &OsStr) -> bool {
    Path::new(program)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| RUNTIMES.contains(&stem))
}

fn is_script(arg: &OsStr) -> bool {
    arg.to_str().is_some_and(|arg| {
        arg == "."
            || [".js", ".mjs", ".cjs", ".asar", ".py"]
                .iter()
                .any(|ext| arg.ends_with(ext))
    })
}

/// The installed menu bar.
#[derive(Clone)]
pub struct MenuBarHandle {
    pub menu: MenuNode,
}

pub struct MenuBarBuilder<'a> {
    env: &'a BuildEnvironment,
    services: &'a Services,
}

impl<'a> MenuBarBuilder<'a> {
    pub fn new(env: &'a BuildEnvironment, services: &'a Services) -> Self {
        Self { env, services }
    }

    /// Build the menu bar and install it as the application menu.
    pub fn build(&self, repo_link: &str, window: &Arc<dyn AppWindow>) -> MenuBarHandle {
        let menu = self.menu(repo_link, window);
        self.services.host.set_application_menu(menu.clone());
        info!(window = %window.id(), "Application menu installed");
        MenuBarHandle { menu }
    }

    pub fn menu(&self, repo_link: &str, window: &Arc<dyn AppWindow>) -> MenuNode {
        MenuNode::submenu(
            "",
            vec![
                self.file_menu(window),
                self.edit_menu(),
                self.view_menu(),
                self.window_menu(window),
                self.help_menu(repo_link, window),
            ],
        )
    }

    fn file_menu(&self, window: &Arc<dyn AppWindow>) -> MenuNode {
        let windows = Arc::clone(&self.services.windows);
        let parent = Arc::clone(window);
        let relaunch = self.services.clone();
        let quit = self.services.clone();

        let mut menu = MenuBuilder::new();
        menu.push(
            MenuNode::action(self.env.t("windows.settings"), move || {
                windows.open_settings(parent.as_ref())
            })
            .with_id("settings"),
        )
        .separator()
        .push(
            MenuNode::action(self.env.t("menubar.file.relaunch"), move || {
                relaunch_application(&relaunch)
            })
            .with_id("relaunch")
            .with_accelerator("CmdOrCtrl+Alt+R"),
        )
        .push(
            MenuNode::action(self.env.t("menubar.file.quit"), move || quit.quit())
                .with_id("quit")
                .with_accelerator("CmdOrCtrl+Q"),
        );
        menu.into_submenu(self.env.t("menubar.file.groupName"))
    }

    fn edit_menu(&self) -> MenuNode {
        let mut menu = MenuBuilder::new();
        menu.push(MenuNode::role(self.env.t("menubar.edit.undo"), Role::Undo))
            .push(MenuNode::role(self.env.t("menubar.edit.redo"), Role::Redo))
            .separator()
            .push(MenuNode::role(self.env.t("context.cut"), Role::Cut))
            .push(MenuNode::role(self.env.t("context.copy"), Role::Copy))
            .push(MenuNode::role(self.env.t("context.paste"), Role::Paste))
            .separator()
            .push(MenuNode::role(
                self.env.t("menubar.edit.selectAll"),
                Role::SelectAll,
            ));
        menu.into_submenu(self.env.t("menubar.edit.groupName"))
            .with_role(Role::EditMenu)
    }

    fn view_menu(&self) -> MenuNode {
        let mut menu = MenuBuilder::new();
        menu.push(MenuNode::role(self.env.t("menubar.view.reload"), Role::Reload))
            .push(MenuNode::role(
                self.env.t("menubar.view.forceReload"),
                Role::ForceReload,
            ))
            .separator()
            .push(
                MenuNode::role(self.env.t("menubar.view.devTools"), Role::ToggleDevTools)
                    .with_id(DEV_TOOLS_ID)
                    .enabled(self.env.dev_mode()),
            )
            .separator()
            .push(MenuNode::role(
                self.env.t("menubar.view.resetZoom"),
                Role::ResetZoom,
            ))
            .push(MenuNode::role(self.env.t("menubar.view.zoomIn"), Role::ZoomIn))
            .push(MenuNode::role(self.env.t("menubar.view.zoomOut"), Role::ZoomOut))
            .separator()
            .push(MenuNode::role(
                self.env.t("menubar.view.fullScreen"),
                Role::ToggleFullScreen,
            ));
        menu.into_submenu(self.env.t("menubar.view.groupName"))
    }

    fn window_menu(&self, window: &Arc<dyn AppWindow>) -> MenuNode {
        let toggle = self.services.sidebar.for_window(window.as_ref());
        let checked = toggle.state().is_hidden();
        let mobile_mode = MenuNode::checkbox(
            self.env.t("menubar.window.mobileMode"),
            checked,
            move || {
                let _ = toggle.toggle();
            },
        )
        .with_id(MOBILE_MODE_ID)
        .with_accelerator("CmdOrCtrl+Alt+M");
        MenuNode::submenu(self.env.t("menubar.window.groupName"), vec![mobile_mode])
    }

    fn help_menu(&self, repo_link: &str, window: &Arc<dyn AppWindow>) -> MenuNode {
        let web_link = repository_web_link(repo_link).to_string();
        let services = self.services;

        let mut menu = MenuBuilder::new();
        menu.push({
            let windows = Arc::clone(&services.windows);
            let parent = Arc::clone(window);
            MenuNode::action(self.env.t("windows.about"), move || {
                windows.show_about(parent.as_ref())
            })
            .with_id("about")
        })
        .push({
            let shell = Arc::clone(&services.shell);
            MenuNode::action(self.env.t("help.repo"), move || {
                let _ = run_action("help.repository", || shell.open_external(&web_link));
            })
            .with_id("repository")
        })
        .push({
            let windows = Arc::clone(&services.windows);
            let parent = Arc::clone(window);
            MenuNode::action(self.env.t("windows.docs"), move || {
                let _ = run_action("help.docs", || windows.open_docs(parent.as_ref()));
            })
            .with_id("docs")
        })
        .push({
            let windows = Arc::clone(&services.windows);
            MenuNode::action(self.env.t("help.bugs"), move || {
                let _ = run_action("help.report_bug", || windows.report_bug());
            })
            .with_id("report-bug")
        });
        menu.into_submenu(self.env.t("help.groupName"))
            .with_role(Role::HelpMenu)
    }
}

/// Restart without the minimized-start flag, then quit this instance.
fn relaunch_application(services: &Services) {
    let argv: Vec<OsString> = std::env::args_os().collect();
    let args = relaunch_args(&argv);
    info!(?args, "Relaunching");
    match run_action("file.relaunch", || services.shell.relaunch(&args)) {
        Ok(()) => services.quit(),
        Err(_) => warn!("Relaunch failed, keeping the current instance"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildType;
    use crate::env::Platform;
    use crate::sidebar::SidebarState;
    use crate::testing::{environment, Fixture};

    const REPO: &str = "v1.2.3+https://example.com/repo";

    fn group_labels(menu: &MenuNode) -> Vec<&str> {
        menu.items().iter().filter_map(MenuNode::label_text).collect()
    }

    #[test]
    fn test_relaunch_args_example() {
        let argv = ["node", "app", "--start-minimized", "--foo"];
        assert_eq!(relaunch_args(&argv), vec!["--foo"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_relaunch_args_keep_non_utf8_bytes() {
        use std::os::unix::ffi::{OsStrExt, OsStringExt};

        let raw = OsString::from_vec(vec![0x66, 0x6f, 0x80]);
        let argv = [
            OsString::from("/usr/bin/webshell"),
            OsString::from("--start-minimized"),
            raw.clone(),
            OsString::from("--foo"),
        ];
        let args = relaunch_args(&argv);
        assert_eq!(args, vec![raw.clone(), OsString::from("--foo")]);
        assert_eq!(args[0].as_bytes(), &[0x66, 0x6f, 0x80]);

        let argv = [OsString::from("node"), raw.clone(), OsString::from("-m")];
        assert_eq!(relaunch_args(&argv), Vec::<OsString>::new());
    }

    #[test]
    fn test_relaunch_args_native_binary() {
        let argv = ["/usr/bin/webshell", "-m", "--verbose", "-x"];
        assert_eq!(relaunch_args(&argv), vec!["--verbose", "-x"]);

        let argv = ["/usr/bin/webshell", "--foo", "page.html"];
        assert_eq!(relaunch_args(&argv), vec!["--foo", "page.html"]);

        let argv = ["electron", "main.js", "--bar"];
        assert_eq!(relaunch_args(&argv), vec!["--bar"]);

        let argv = ["/opt/node.exe", "--inspect", "server.js"];
        assert_eq!(relaunch_args(&argv), vec!["--inspect", "server.js"]);

        assert!(relaunch_args::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_minimized_flags() {
        for flag in ["-m", "--m", "--start-minimized", "-start-minimized"] {
            assert!(is_minimized_flag(flag), "{}", flag);
        }
        for flag in ["m", "--minimized", "-mm", "--start-minimized=1", ""] {
            assert!(!is_minimized_flag(flag), "{}", flag);
        }
    }

    #[test]
    fn test_group_order() {
        let fx = Fixture::new();
        let env = environment(Platform::Linux);
        let menu = fx.bar_builder(&env).menu(REPO, &fx.app_window);
        assert_eq!(
            group_labels(&menu),
            vec!["File", "Edit", "View", "Window", "Help"]
        );
    }

    #[test]
    fn test_file_menu() {
        let fx = Fixture::new();
        let env = environment(Platform::Linux);
        let menu = fx.bar_builder(&env).menu(REPO, &fx.app_window);
        let file = menu.submenu_named("File").unwrap().items();

        assert_eq!(file.len(), 4);
        assert_eq!(file[0].id(), Some("settings"));
        assert!(file[1].is_separator());
        assert_eq!(file[2].id(), Some("relaunch"));
        assert_eq!(file[3].id(), Some("quit"));

        file[0].click();
        assert_eq!(fx.windows.calls(), vec!["settings"]);
    }

    #[test]
    fn test_edit_menu_is_pure_roles() {
        let fx = Fixture::new();
        let env = environment(Platform::Linux);
        let menu = fx.bar_builder(&env).menu(REPO, &fx.app_window);
        let edit = menu.submenu_named("Edit").unwrap();

        assert!(matches!(edit, MenuNode::Submenu { role: Some(Role::EditMenu), .. }));
        let roles: Vec<Role> = edit
            .items()
            .iter()
            .filter_map(|item| match item {
                MenuNode::Role { role, .. } => Some(*role),
                _ => None,
            })
            .collect();
        assert_eq!(
            roles,
            vec![Role::Undo, Role::Redo, Role::Cut, Role::Copy, Role::Paste, Role::SelectAll]
        );
        assert_eq!(edit.items().len(), 8);
    }

    #[test]
    fn test_dev_tools_enablement() {
        let fx = Fixture::new();

        let env = environment(Platform::Linux);
        let menu = fx.bar_builder(&env).menu(REPO, &fx.app_window);
        assert!(!menu.find(DEV_TOOLS_ID).unwrap().is_enabled());

        let mut env = environment(Platform::Linux);
        env.settings.advanced.devel = true;
        let menu = fx.bar_builder(&env).menu(REPO, &fx.app_window);
        assert!(menu.find(DEV_TOOLS_ID).unwrap().is_enabled());

        let mut env = environment(Platform::Linux);
        env.build_type = BuildType::Devel;
        let menu = fx.bar_builder(&env).menu(REPO, &fx.app_window);
        assert!(menu.find(DEV_TOOLS_ID).unwrap().is_enabled());
    }

    #[test]
    fn test_view_menu_layout() {
        let fx = Fixture::new();
        let env = environment(Platform::Linux);
        let menu = fx.bar_builder(&env).menu(REPO, &fx.app_window);
        let view = menu.submenu_named("View").unwrap().items();
        let separators: Vec<usize> = view
            .iter()
            .enumerate()
            .filter(|(_, i)| i.is_separator())
            .map(|(idx, _)| idx)
            .collect();
        assert_eq!(view.len(), 10);
        assert_eq!(separators, vec![2, 4, 8]);
        assert!(matches!(view[9], MenuNode::Role { role: Role::ToggleFullScreen, .. }));
    }

    #[test]
    fn test_repository_link_opens_stripped_url() {
        let fx = Fixture::new();
        let env = environment(Platform::Linux);
        let menu = fx.bar_builder(&env).menu(REPO, &fx.app_window);
        menu.find("repository").unwrap().click();
        assert_eq!(fx.shell.opened(), vec!["https://example.com/repo".to_string()]);
    }

    #[test]
    fn test_help_menu_order() {
        let fx = Fixture::new();
        let env = environment(Platform::Linux);
        let menu = fx.bar_builder(&env).menu(REPO, &fx.app_window);
        let help = menu.submenu_named("Help").unwrap();
        let ids: Vec<_> = help.items().iter().filter_map(MenuNode::id).collect();
        assert_eq!(ids, vec!["about", "repository", "docs", "report-bug"]);
        assert!(matches!(help, MenuNode::Submenu { role: Some(Role::HelpMenu), .. }));
    }

    #[test]
    fn test_build_installs_single_menu() {
        let fx = Fixture::new();
        let env = environment(Platform::Linux);
        fx.bar_builder(&env).build(REPO, &fx.app_window);
        fx.bar_builder(&env).build(REPO, &fx.app_window);
        assert_eq!(fx.host.menus_installed(), 2);
        assert!(fx.host.app_menu().unwrap().find(MOBILE_MODE_ID).is_some());
    }

    #[test]
    fn test_mobile_mode_round_trip() {
        let fx = Fixture::new();
        let env = environment(Platform::Linux);
        let menu = fx.bar_builder(&env).menu(REPO, &fx.app_window);
        let checkbox = menu.find(MOBILE_MODE_ID).unwrap();
        assert!(matches!(checkbox, MenuNode::Checkbox { checked: false, .. }));

        checkbox.click();
        fx.settle();
        assert_eq!(fx.surface.active_styles().len(), 1);

        // A rebuilt menu reflects the hidden sidebar.
        let rebuilt = fx.bar_builder(&env).menu(REPO, &fx.app_window);
        assert!(matches!(
            rebuilt.find(MOBILE_MODE_ID).unwrap(),
            MenuNode::Checkbox { checked: true, .. }
        ));

        rebuilt.find(MOBILE_MODE_ID).unwrap().click();
        fx.settle();
        assert!(fx.surface.active_styles().is_empty());
        let toggle = fx.services.sidebar.for_window(fx.window.as_ref());
        assert_eq!(toggle.state(), SidebarState::Visible);
    }

    #[test]
    fn test_relaunch_quits_after_spawning() {
        let fx = Fixture::new();
        let env = environment(Platform::Linux);
        let menu = fx.bar_builder(&env).menu(REPO, &fx.app_window);
        menu.find("relaunch").unwrap().click();
        let relaunches = fx.shell.relaunches();
        assert_eq!(relaunches.len(), 1);
        assert!(!relaunches[0].iter().any(|arg| arg == "--start-minimized"));
        assert!(fx.services.quit.is_set());
        assert_eq!(fx.shell.quit_count(), 1);
    }

    #[test]
    fn test_failed_relaunch_keeps_running() {
        let fx = Fixture::new();
        let env = environment(Platform::Linux);
        fx.shell.fail_relaunch(true);
        let menu = fx.bar_builder(&env).menu(REPO, &fx.app_window);
        menu.find("relaunch").unwrap().click();
        assert!(!fx.services.quit.is_set());
        assert_eq!(fx.shell.quit_count(), 0);
    }
}
