use crate::core::listing::{anchors, split_version};
use std::collections::BTreeMap;

/// Project name -> version -> link relative to the release root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseCatalog {
    projects: BTreeMap<String, BTreeMap<String, String>>,
}

impl ReleaseCatalog {
    /// Builds a catalog from a release root listing.
    ///
    /// Only folder entries (href ending in `/`) are kept. Lines that do not
    /// look like anchors are skipped, so a page in an unexpected shape gives
    /// a smaller or empty catalog rather than an error. A repeated
    /// `(project, version)` pair keeps the last link seen.
    pub fn parse(body: &str) -> Self {
        let mut catalog = Self::default();

        for anchor in anchors(body) {
            if !anchor.href.ends_with('/') {
                continue;
            }
            let Some((name, _)) = anchor.label else {
                continue;
            };

            let name = name.trim_end_matches('/').to_lowercase();
            let (project, version) = split_version(&name);
            catalog.insert(project, version, anchor.href);
        }

        catalog
    }

    pub fn insert(&mut self, project: &str, version: &str, link: &str) {
        self.projects
            .entry(project.to_string())
            .or_default()
            .insert(version.to_string(), link.to_string());
    }

    pub fn versions(&self, project: &str) -> Option<&BTreeMap<String, String>> {
        self.projects.get(project)
    }

    pub fn link(&self, project: &str, version: &str) -> Option<&str> {
        self.projects
            .get(project)
            .and_then(|versions| versions.get(version))
            .map(String::as_str)
    }

    /// Greatest version by plain string order, so "2.9" sorts above "2.10".
    pub fn latest_version(&self, project: &str) -> Option<&str> {
        self.projects
            .get(project)
            .and_then(|versions| versions.keys().next_back())
            .map(String::as_str)
    }

    pub fn projects(&self) -> impl Iterator<Item = &str> {
        self.projects.keys().map(String::as_str)
    }

    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    pub fn version_count(&self) -> usize {
        self.projects.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}
