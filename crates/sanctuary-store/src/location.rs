//! On-disk layout of a profile.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::{Result, StoreError};
use crate::objects::ObjectStoreLocation;

/// Directory holding both backends of one profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// The platform-appropriate data directory:
    /// - Linux:   `~/.local/share/sanctuary/`
    /// - macOS:   `~/Library/Application Support/com.sanctuary.sanctuary/`
    /// - Windows: `{FOLDERID_RoamingAppData}\sanctuary\sanctuary\data\`
    pub fn platform_default() -> Result<Self> {
        let project_dirs =
            ProjectDirs::from("com", "sanctuary", "sanctuary").ok_or(StoreError::NoDataDir)?;
        Ok(Self::at(project_dirs.data_dir()))
    }

    pub fn at(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Create the directory if it does not exist yet.
    pub fn ensure(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// SQLite file of the flat backend.
    pub fn flat_path(&self) -> PathBuf {
        self.root.join("local.db")
    }

    pub fn objects_location(&self) -> ObjectStoreLocation {
        ObjectStoreLocation::Path(self.root.join("objects.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let dir = DataDir::at("/tmp/sanctuary-profile");
        assert_eq!(dir.flat_path(), PathBuf::from("/tmp/sanctuary-profile/local.db"));
        assert_eq!(
            dir.objects_location(),
            ObjectStoreLocation::Path(PathBuf::from("/tmp/sanctuary-profile/objects.db"))
        );
    }
}
