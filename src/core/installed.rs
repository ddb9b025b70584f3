use crate::error::Result;
use std::collections::BTreeMap;
use std::fs::read_dir;
use std::path::{Path, PathBuf};

/// Directory name used for one installed version, e.g. `blender-2.80`.
pub fn install_dir_name(project: &str, version: &str) -> String {
    format!("{project}-{version}")
}

/// Versions of one project present under an install root.
pub struct InstalledVersions {
    install_root: PathBuf,
    project: String,
}

impl InstalledVersions {
    pub fn new(install_root: impl Into<PathBuf>, project: impl Into<String>) -> Self {
        Self {
            install_root: install_root.into(),
            project: project.into(),
        }
    }

    pub fn version_dir(&self, version: &str) -> PathBuf {
        self.install_root
            .join(install_dir_name(&self.project, version))
    }

    pub fn is_installed(&self, version: &str) -> bool {
        self.version_dir(version).is_dir()
    }

    /// Every subdirectory whose name starts with the project name, keyed by
    /// directory name. A missing install root is an empty set.
    pub fn scan(&self) -> Result<BTreeMap<String, PathBuf>> {
        let mut installed = BTreeMap::new();

        if !self.install_root.exists() {
            return Ok(installed);
        }

        for entry in read_dir(&self.install_root)? {
            let entry = entry?;
            let path = entry.path();

            if !path.is_dir() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with(&self.project) {
                    installed.insert(name.to_string(), absolute(&path));
                }
            }
        }

        Ok(installed)
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
