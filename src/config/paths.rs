//! XDG-compliant path management

use directories::ProjectDirs;
use std::path::PathBuf;

/// Application paths following the XDG base directory specification
#[derive(Debug, Clone)]
pub struct Paths {
    dirs: ProjectDirs,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let dirs =
            ProjectDirs::from("", "", "tagsmith").expect("Failed to determine project directories");
        Self { dirs }
    }

    /// Config directory: ~/.config/tagsmith/
    pub fn config_dir(&self) -> PathBuf {
        self.dirs.config_dir().to_path_buf()
    }

    /// Main config file: ~/.config/tagsmith/config.toml
    pub fn config_file(&self) -> PathBuf {
        self.config_dir().join("config.toml")
    }

    /// Data directory: ~/.local/share/tagsmith/
    pub fn data_dir(&self) -> PathBuf {
        self.dirs.data_dir().to_path_buf()
    }

    /// Default library snapshot: ~/.local/share/tagsmith/library.json
    pub fn library_file(&self) -> PathBuf {
        self.data_dir().join("library.json")
    }
}
