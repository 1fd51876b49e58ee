//! Build script that generates Info.plist for the macOS application bundle.
//!
//! Bundle metadata comes from the `[app]` table of `config.toml`.

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

#[derive(Deserialize)]
struct ConfigFile {
    app: AppSection,
}

#[derive(Deserialize)]
struct AppSection {
    name: String,
    version: String,
    bundle_identifier: String,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=config.toml");

    let config = fs::read_to_string("config.toml").expect("Failed to read config.toml");
    let config: ConfigFile = toml::from_str(&config).expect("Invalid config.toml");
    let app = config.app;

    let out_dir = env::var("OUT_DIR").unwrap();
    let plist_path = Path::new(&out_dir).join("Info.plist");

    let plist_content = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>CFBundleIdentifier</key>
    <string>{id}</string>

    <key>CFBundleName</key>
    <string>{name}</string>

    <key>CFBundleDisplayName</key>
    <string>{name}</string>

    <key>CFBundleExecutable</key>
    <string>{exe}</string>

    <key>CFBundleVersion</key>
    <string>{version}</string>

    <key>CFBundleShortVersionString</key>
    <string>{version}</string>

    <key>CFBundlePackageType</key>
    <string>APPL</string>

    <key>LSMinimumSystemVersion</key>
    <string>11.0</string>

    <key>NSHighResolutionCapable</key>
    <true/>

    <key>NSPrincipalClass</key>
    <string>NSApplication</string>
</dict>
</plist>
"#,
        id = app.bundle_identifier,
        name = app.name,
        exe = env::var("CARGO_PKG_NAME").unwrap_or_else(|_| "webshell-menus".into()),
        version = app.version,
    );

    fs::write(&plist_path, plist_content).expect("Failed to write Info.plist");

    println!("cargo:rustc-env=INFO_PLIST_PATH={}", plist_path.display());
}
