//! Local shortcut creation
//!
//! Shortcuts point the user's desktop environment at the Pi's web
//! interface. Creation is best-effort: the workflows log failures but
//! never abort over a missing desktop directory.

use std::path::{Path, PathBuf};

/// Creates local OS shortcuts for a URL. Each method reports whether
/// creation succeeded; how the shortcut is realized is this layer's
/// concern alone.
pub trait ShortcutCreator: Send + Sync {
    fn create_desktop_shortcut(&self, url: &str) -> bool;
    fn create_start_menu_shortcut(&self, url: &str) -> bool;
}

/// Writes `[InternetShortcut]`-format `.url` files, which desktop
/// environments on every platform we care about know how to open.
pub struct UrlFileShortcuts {
    desktop_dir: Option<PathBuf>,
    menu_dir: Option<PathBuf>,
}

impl UrlFileShortcuts {
    pub fn new() -> Self {
        Self {
            desktop_dir: dirs::desktop_dir(),
            menu_dir: menu_dir(),
        }
    }

    #[cfg(test)]
    fn with_dirs(desktop_dir: PathBuf, menu_dir: PathBuf) -> Self {
        Self {
            desktop_dir: Some(desktop_dir),
            menu_dir: Some(menu_dir),
        }
    }

    fn write_shortcut(&self, dir: Option<&Path>, url: &str) -> bool {
        let Some(dir) = dir else {
            tracing::warn!("No target directory for shortcut");
            return false;
        };
        if let Err(e) = std::fs::create_dir_all(dir) {
            tracing::warn!("Cannot create shortcut directory {}: {}", dir.display(), e);
            return false;
        }
        let path = dir.join("DreamPi Link Cable.url");
        let content = format!("[InternetShortcut]\nURL={}\n", url);
        match std::fs::write(&path, content) {
            Ok(()) => {
                tracing::info!("Created shortcut at {}", path.display());
                true
            }
            Err(e) => {
                tracing::warn!("Failed to write shortcut {}: {}", path.display(), e);
                false
            }
        }
    }
}

impl Default for UrlFileShortcuts {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortcutCreator for UrlFileShortcuts {
    fn create_desktop_shortcut(&self, url: &str) -> bool {
        self.write_shortcut(self.desktop_dir.as_deref(), url)
    }

    fn create_start_menu_shortcut(&self, url: &str) -> bool {
        self.write_shortcut(self.menu_dir.as_deref(), url)
    }
}

/// Application-menu directory, grouped under a product folder
fn menu_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("applications").join("DreamPi Link Cable"))
}
