use directories::{BaseDirs, ProjectDirs};
use std::path::{Path, PathBuf};

/// File name of the launcher placed in the install directory
pub const LAUNCHER_NAME: &str = "omni-autonomous-agent";

const APP_DIR: &str = "omni-agent";
const STATE_FILE: &str = "state.json";
const SYSTEM_BIN: &str = "/usr/local/bin";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// `$HOME/.config/omni-agent/state.json`, falling back to the platform config dir
    pub fn state_path() -> Option<PathBuf> {
        match Self::home() {
            Some(home) => Some(Self::state_path_in(&home)),
            None => ProjectDirs::from("", "", APP_DIR).map(|pd| pd.config_dir().join(STATE_FILE)),
        }
    }

    pub fn state_path_in(home: &Path) -> PathBuf {
        home.join(".config").join(APP_DIR).join(STATE_FILE)
    }

    /// Install directories in priority order: per-user first, then system-wide.
    pub fn install_candidates() -> Vec<PathBuf> {
        let mut candidates = Vec::with_capacity(2);
        if let Some(home) = Self::home() {
            candidates.push(home.join(".local").join("bin"));
        }
        candidates.push(PathBuf::from(SYSTEM_BIN));
        candidates
    }

    fn home() -> Option<PathBuf> {
        match std::env::var_os("HOME") {
            Some(home) if !home.is_empty() => Some(PathBuf::from(home)),
            _ => BaseDirs::new().map(|b| b.home_dir().to_path_buf()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_path_lives_under_home_config_dir() {
        assert_eq!(
            AppDirs::state_path_in(Path::new("/home/me")),
            PathBuf::from("/home/me/.config/omni-agent/state.json")
        );
    }

    #[test]
    fn fallback_config_dir_is_named_after_the_app() {
        if let Some(pd) = ProjectDirs::from("", "", APP_DIR) {
            let path = pd.config_dir().join(STATE_FILE);
            assert!(path.ends_with("state.json"));
            assert!(pd.config_dir().to_string_lossy().contains(APP_DIR));
        }
    }

    #[test]
    fn user_bin_is_preferred_over_system_bin() {
        let candidates = AppDirs::install_candidates();
        assert_eq!(candidates.last(), Some(&PathBuf::from("/usr/local/bin")));
        if candidates.len() == 2 {
            assert!(candidates[0].ends_with(".local/bin"));
        }
    }
}
