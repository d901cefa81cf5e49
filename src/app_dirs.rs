use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// State directory holding the stats database, leaderboard and session log
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("plink"),
            )
        } else {
            ProjectDirs::from("", "", "plink").map(|pd| pd.data_local_dir().to_path_buf())
        }
    }

    pub fn db_path() -> Option<PathBuf> {
        Self::state_dir().map(|d| d.join("stats.db"))
    }

    pub fn leaderboard_path() -> Option<PathBuf> {
        Self::state_dir().map(|d| d.join("leaderboard.json"))
    }

    pub fn session_log_path() -> Option<PathBuf> {
        Self::state_dir().map(|d| d.join("sessions.csv"))
    }
}
