use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "essaytype";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Session history and the log file live here
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".local").join("state").join(APP_NAME))
        } else {
            ProjectDirs::from("", "", APP_NAME).map(|pd| pd.data_local_dir().to_path_buf())
        }
    }

    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME)
            .map(|pd| pd.config_dir().to_path_buf())
            .or_else(|| Self::state_dir().map(|d| d.join("config")))
    }

    pub fn log_path() -> Option<PathBuf> {
        Self::state_dir().map(|d| d.join(format!("{APP_NAME}.log")))
    }
}
