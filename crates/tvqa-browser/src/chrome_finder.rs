use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Executable names searched on `PATH` after the well-known install locations.
const PATH_CANDIDATES: [&str; 5] = [
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "chrome",
];

/// Locates a Chrome or Chromium binary to drive.
pub struct ChromeFinder {
    custom_path: Option<PathBuf>,
}

impl ChromeFinder {
    pub fn new(custom_path: Option<PathBuf>) -> Self {
        Self { custom_path }
    }

    /// An explicit path is used as-is or rejected; otherwise install
    /// locations are tried first, then `PATH`.
    pub fn find(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.custom_path {
            return Self::validate(path);
        }

        if let Some(path) = Self::install_locations()
            .into_iter()
            .find_map(|p| Self::validate(&p).ok())
        {
            tracing::debug!("Using Chrome at {}", path.display());
            return Ok(path);
        }

        if let Some(path) = PATH_CANDIDATES
            .iter()
            .find_map(|name| which::which(name).ok())
        {
            tracing::debug!("Using Chrome from PATH at {}", path.display());
            return Ok(path);
        }

        Err(Error::Browser(format!(
            "Chrome not found. Checked: {} and PATH entries {}. Use --chrome-path to specify location.",
            Self::install_locations()
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
            PATH_CANDIDATES.join(", ")
        )))
    }

    fn install_locations() -> Vec<PathBuf> {
        #[cfg(target_os = "macos")]
        return vec![
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
            PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium"),
        ];

        #[cfg(target_os = "linux")]
        return vec![
            PathBuf::from("/usr/bin/google-chrome"),
            PathBuf::from("/usr/bin/chromium"),
            PathBuf::from("/usr/bin/chromium-browser"),
        ];

        #[cfg(target_os = "windows")]
        return vec![
            PathBuf::from(r"C:\Program Files\Google\Chrome\Application\chrome.exe"),
            PathBuf::from(r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe"),
        ];

        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        return vec![];
    }

    fn validate(path: &Path) -> Result<PathBuf> {
        if !path.is_file() {
            return Err(Error::Browser(format!(
                "Chrome not found at: {}",
                path.display()
            )));
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if std::fs::metadata(path)?.permissions().mode() & 0o111 == 0 {
                return Err(Error::Browser(format!(
                    "Chrome binary not executable: {}",
                    path.display()
                )));
            }
        }

        Ok(path.to_path_buf())
    }
}
