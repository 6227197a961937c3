use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Stores references to all the paths relevant to statusd, and abstracts
/// access to these files and directories.
#[derive(Debug, Clone)]
pub struct StatusdPaths {
    pub log_file: PathBuf,
    pub ipc_socket_file: PathBuf,
}

impl StatusdPaths {
    pub fn default() -> Result<Self> {
        // A short, fixed name: statusd is a single-instance, per-user daemon.
        let ipc_socket_file = std::env::var("XDG_RUNTIME_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
            .join("statusd.sock");

        let log_dir = std::env::var("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                PathBuf::from(std::env::var("HOME").expect("Neither $XDG_CACHE_HOME nor $HOME is set")).join(".cache")
            })
            .join("statusd");

        if !log_dir.exists() {
            log::info!("Creating log dir");
            std::fs::create_dir_all(&log_dir)
                .with_context(|| format!("Failed to create log dir {}", log_dir.display()))?;
        }

        Ok(StatusdPaths { log_file: log_dir.join("statusd.log"), ipc_socket_file })
    }

    pub fn get_log_file(&self) -> &Path {
        self.log_file.as_path()
    }

    pub fn get_ipc_socket_file(&self) -> &Path {
        self.ipc_socket_file.as_path()
    }
}

impl std::fmt::Display for StatusdPaths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ipc-socket: {}, log-file: {}", self.ipc_socket_file.display(), self.log_file.display())
    }
}
