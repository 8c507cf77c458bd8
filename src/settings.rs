use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, RwLock};

pub const CURRENT_VERSION: u32 = 1;
const SETTINGS_FILENAME: &str = "config.yaml";
pub const APP_NAME: &str = "pdfslots";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Rows each page occupies in the viewer, separator included
    #[serde(default = "default_page_height")]
    pub page_height: u32,

    /// Animate jumps to a page instead of moving there at once
    #[serde(default = "default_true")]
    pub smooth_scroll: bool,

    /// Rows moved per tick while a smooth scroll is running
    #[serde(default = "default_scroll_step")]
    pub scroll_step: u32,

    /// Overrides the platform data directory for stored documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_page_height() -> u32 {
    20
}

fn default_scroll_step() -> u32 {
    4
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            page_height: default_page_height(),
            smooth_scroll: true,
            scroll_step: default_scroll_step(),
            data_dir: None,
        }
    }
}

static SETTINGS: LazyLock<RwLock<Settings>> = LazyLock::new(|| RwLock::new(Settings::default()));

fn preferred_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME).join(SETTINGS_FILENAME))
}

/// Load the config file, creating it with defaults on first run
pub fn load_settings() {
    let Some(path) = preferred_config_path() else {
        warn!("Could not determine config directory, using default settings");
        return;
    };
    if path.exists() {
        load_settings_from_path(&path);
    } else {
        info!("Settings file not found, creating with defaults at {path:?}");
        if let Ok(settings) = SETTINGS.read() {
            save_settings_to_file(&settings, &path);
        }
    }
}

pub fn load_settings_from_path(path: &Path) {
    match fs::read_to_string(path) {
        Ok(content) => match serde_yaml::from_str::<Settings>(&content) {
            Ok(mut settings) => {
                debug!("Loaded settings from {path:?}");

                if settings.version < CURRENT_VERSION {
                    migrate_settings(&mut settings);
                    save_settings_to_file(&settings, path);
                }
                sanitize(&mut settings);

                if let Ok(mut global) = SETTINGS.write() {
                    *global = settings;
                }
            }
            Err(e) => {
                error!("Failed to parse settings file {path:?}: {e}");
            }
        },
        Err(e) => {
            error!("Failed to read settings file {path:?}: {e}");
        }
    }
}

fn migrate_settings(settings: &mut Settings) {
    info!(
        "Migrating settings from v{} to v{}",
        settings.version, CURRENT_VERSION
    );
    settings.version = CURRENT_VERSION;
}

fn sanitize(settings: &mut Settings) {
    if settings.page_height == 0 {
        warn!("page_height must be positive, using {}", default_page_height());
        settings.page_height = default_page_height();
    }
    settings.scroll_step = settings.scroll_step.max(1);
}

fn save_settings_to_file(settings: &Settings, path: &Path) {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create config directory {parent:?}: {e}");
                return;
            }
        }
    }

    let body = match serde_yaml::to_string(settings) {
        Ok(body) => body,
        Err(e) => {
            error!("Failed to serialize settings: {e}");
            return;
        }
    };
    let content = format!("{SETTINGS_HEADER}{body}");

    match fs::write(path, content) {
        Ok(()) => debug!("Saved settings to {path:?}"),
        Err(e) => error!("Failed to save settings to {path:?}: {e}"),
    }
}

const SETTINGS_HEADER: &str = r#"# pdfslots configuration
#
# page_height:   rows per page in the viewer (including the separator row)
# smooth_scroll: animate jumps to extraction pages
# scroll_step:   rows per animation tick
# data_dir:      where documents.json is kept (defaults to the platform data dir)

"#;

pub fn current() -> Settings {
    SETTINGS.read().map(|s| s.clone()).unwrap_or_default()
}

pub fn get_page_height() -> u32 {
    SETTINGS
        .read()
        .map(|s| s.page_height)
        .unwrap_or_else(|_| default_page_height())
}

pub fn is_smooth_scroll() -> bool {
    SETTINGS.read().map(|s| s.smooth_scroll).unwrap_or(true)
}

pub fn get_scroll_step() -> u32 {
    SETTINGS
        .read()
        .map(|s| s.scroll_step)
        .unwrap_or_else(|_| default_scroll_step())
}

pub fn get_data_dir() -> Option<PathBuf> {
    SETTINGS.read().ok().and_then(|s| s.data_dir.clone())
}

/// Replace the active settings, e.g. with command line overrides applied
pub fn set_current(settings: Settings) {
    if let Ok(mut global) = SETTINGS.write() {
        *global = settings;
    }
}
