use crate::Result;
use std::path::Path;
use tempfile::TempDir;

/// Throwaway Chrome user-data directory, one per session.
///
/// Sessions never share cookies, storage or cache. The directory is removed
/// when the value is dropped.
#[derive(Debug)]
pub struct ProfileDir {
    dir: TempDir,
}

impl ProfileDir {
    pub fn temporary(label: &str) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(&format!("tvqa-{}-", label))
            .tempdir()?;
        tracing::debug!("Created Chrome profile at {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_is_removed_on_drop() {
        let profile = ProfileDir::temporary("samsung").unwrap();
        let path = profile.path().to_path_buf();

        assert!(path.is_dir());
        assert!(
            path.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("tvqa-samsung-")
        );

        drop(profile);
        assert!(!path.exists());
    }

    #[test]
    fn test_profiles_are_distinct() {
        let a = ProfileDir::temporary("lg").unwrap();
        let b = ProfileDir::temporary("lg").unwrap();
        assert_ne!(a.path(), b.path());
    }
}
