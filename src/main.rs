//! WebShell menus
//!
//! Builds the application menu, the tray menu or a context menu and prints its
//! layout as JSON. On macOS, `--run` installs the menus natively and runs the
//! AppKit event loop.

#![deny(clippy::all)]

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use webshell_menus::config::{Config, LoggingConfig};
use webshell_menus::env::BuildEnvironment;
use webshell_menus::host::headless::{HeadlessHost, HeadlessWindow};
use webshell_menus::host::system::{SystemShell, SystemWindows};
use webshell_menus::host::{AppWindow, MenuHost, Services, Shell, WindowId};
use webshell_menus::l10n::Strings;
use webshell_menus::menu::bar::MenuBarBuilder;
use webshell_menus::menu::context::{ClickContext, ContextMenuBuilder};
use webshell_menus::menu::tray::{QuitFlag, TrayMenuBuilder};
use webshell_menus::menu::MenuNode;
use webshell_menus::settings::{self, SettingsStore};
use webshell_menus::sidebar::SidebarCoordinator;

const USAGE: &str = "usage: webshell-menus [bar | tray | context [CLICK_JSON] | --run]";

fn main() -> Result<()> {
    // Load .env file (if present) before anything else
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    let config = Config::load().context("Failed to load configuration")?;
    init_logging(&config.logging);

    info!("Starting {} v{}", config.app.name, config.app.version);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    let settings = Arc::new(
        SettingsStore::load(settings::settings_path()).context("Failed to load settings")?,
    );
    let strings = Arc::new(
        Strings::load(config.app.strings.as_deref().map(Path::new))
            .context("Failed to load strings")?,
    );
    let env = BuildEnvironment::new(&config, settings.snapshot(), strings);

    let args: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    let command = args.first().map(String::as_str).unwrap_or("bar");

    if command == "--run" {
        #[cfg(target_os = "macos")]
        return native::run(&config, env, settings, &runtime);
        #[cfg(not(target_os = "macos"))]
        bail!("--run needs a native menu host, which is only available on macOS");
    }

    let shell: Arc<dyn Shell> = Arc::new(SystemShell::new());
    let host = HeadlessHost::new();
    let services = services(shell, &env, host, settings, &runtime);
    let window: Arc<dyn AppWindow> = HeadlessWindow::new(WindowId(1));

    let menu = match command {
        "bar" => {
            MenuBarBuilder::new(&env, &services)
                .build(&config.links.repository, &window)
                .menu
        }
        "tray" => TrayMenuBuilder::new(&env, &services).build(window).tray.menu,
        "context" => {
            let click: ClickContext = match args.get(1) {
                Some(json) => serde_json::from_str(json).context("Invalid click JSON")?,
                None => ClickContext::default(),
            };
            ContextMenuBuilder::new(&window, &env, &services).build(&click, env.dev_mode())
        }
        other => bail!("unknown command '{}'\n{}", other, USAGE),
    };

    print_menu(&menu)
}

fn services(
    shell: Arc<dyn Shell>,
    env: &BuildEnvironment,
    host: Arc<dyn MenuHost>,
    settings: Arc<SettingsStore>,
    runtime: &tokio::runtime::Runtime,
) -> Services {
    Services {
        windows: Arc::new(SystemWindows::new(env.clone(), Arc::clone(&shell))),
        shell,
        host,
        settings,
        sidebar: Arc::new(SidebarCoordinator::new(runtime.handle().clone())),
        quit: QuitFlag::global(),
    }
}

fn print_menu(menu: &MenuNode) -> Result<()> {
    let json = serde_json::to_string_pretty(&menu.snapshot()).context("Failed to encode menu")?;
    println!("{}", json);
    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    // Create log directory
    if let Err(e) = settings::init_log_directory(&logging.log_dir) {
        eprintln!("Warning: Could not create log directory: {}", e);
    }

    let filter = EnvFilter::try_new(&logging.level).unwrap_or_else(|e| {
        eprintln!("Warning: Invalid log level '{}': {}", logging.level, e);
        EnvFilter::new("info")
    });

    // Menus are printed to stdout, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .init();
}

#[cfg(target_os = "macos")]
mod native {
    use super::*;
    use objc2_app_kit::{NSApplication, NSApplicationActivationPolicy};
    use objc2_foundation::MainThreadMarker;
    use tracing::warn;
    use webshell_menus::host::macos::{dispatch_to_main, MacHost};

    pub fn run(
        config: &Config,
        env: BuildEnvironment,
        settings: Arc<SettingsStore>,
        runtime: &tokio::runtime::Runtime,
    ) -> Result<()> {
        let mtm = MainThreadMarker::new().context("Must run on the main thread")?;
        let _guard = runtime.enter();

        let ns_app = NSApplication::sharedApplication(mtm);
        ns_app.setActivationPolicy(NSApplicationActivationPolicy::Accessory);

        let shell: Arc<dyn Shell> = Arc::new(SystemShell::new().with_quit_hook(|| {
            dispatch_to_main(|| {
                if let Some(mtm) = MainThreadMarker::new() {
                    unsafe { NSApplication::sharedApplication(mtm).terminate(None) };
                }
            })
        }));
        let host = Arc::new(MacHost::new().with_role_handler(|role| {
            warn!(?role, "No web view attached, ignoring role");
        }));
        let services = services(shell, &env, host, settings, runtime);

        let window: Arc<dyn AppWindow> = HeadlessWindow::new(WindowId(1));
        TrayMenuBuilder::new(&env, &services).build(Arc::clone(&window));
        MenuBarBuilder::new(&env, &services).build(&config.links.repository, &window);

        info!("Running AppKit event loop");
        unsafe { ns_app.run() };
        Ok(())
    }
}
