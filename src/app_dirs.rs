use directories::{ProjectDirs, UserDirs};
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn state_dir() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("essay-coach")
        } else {
            ProjectDirs::from("", "", "essay-coach")
                .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."))
        }
    }

    pub fn log_path() -> PathBuf {
        Self::state_dir().join("essay-coach.log")
    }

    /// Documents folder when the platform has one, else the working directory
    pub fn export_dir() -> PathBuf {
        UserDirs::new()
            .and_then(|dirs| dirs.document_dir().map(|d| d.join("essay-coach")))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
