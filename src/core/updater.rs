use crate::core::catalog::ReleaseCatalog;
use crate::core::config::Config;
use crate::core::download::DownloadSession;
use crate::core::extract::{ArchiveExtractor, ExtractSummary};
use crate::core::installed::InstalledVersions;
use crate::core::packages::{PackageInfo, PackageListing};
use crate::core::transport::{HttpTransport, Transport};
use crate::error::{Blupd8Error, Result};
use crate::utils::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where an update attempt currently is. `Failed` can follow any stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStage {
    Start,
    CatalogFetched,
    VersionSelected,
    AlreadyInstalled,
    Downloading,
    Downloaded,
    Extracting,
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    AlreadyInstalled {
        version: String,
        path: PathBuf,
    },
    Installed {
        version: String,
        path: PathBuf,
        package: PackageInfo,
        summary: ExtractSummary,
    },
}

/// Receives download and extraction progress. The two streams use separate
/// counters.
pub trait ProgressObserver {
    fn download(&mut self, _received: u64, _total: Option<u64>) {}

    fn extract(&mut self, _index: usize, _total: usize) {}
}

/// Ignores all progress.
impl ProgressObserver for () {}

/// Drives one project from release listing to unpacked install.
///
/// Each call blocks until its network or extraction stage is over. The
/// release catalog is fetched once per `Updater`.
pub struct Updater<T: Transport> {
    transport: T,
    config: Config,
    catalog: Option<ReleaseCatalog>,
    stage: UpdateStage,
}

impl Updater<HttpTransport> {
    pub fn from_config(config: Config) -> Result<Self> {
        let transport = HttpTransport::new(&config.user_agent)?;
        Ok(Self::new(transport, config))
    }
}

impl<T: Transport> Updater<T> {
    pub fn new(transport: T, config: Config) -> Self {
        Self {
            transport,
            config,
            catalog: None,
            stage: UpdateStage::Start,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stage(&self) -> UpdateStage {
        self.stage
    }

    pub fn installed(&self) -> InstalledVersions {
        InstalledVersions::new(&self.config.install_root, &self.config.project)
    }

    /// The release catalog, fetched on first use.
    pub fn catalog(&mut self) -> Result<&ReleaseCatalog> {
        let catalog = match self.catalog.take() {
            Some(catalog) => catalog,
            None => self.fetch_catalog()?,
        };
        if self.stage == UpdateStage::Start {
            self.stage = UpdateStage::CatalogFetched;
        }

        let catalog: &ReleaseCatalog = self.catalog.insert(catalog);
        Ok(catalog)
    }

    fn fetch_catalog(&self) -> Result<ReleaseCatalog> {
        let url = &self.config.releases_url;
        info!(url = %url, "Fetching release catalog");
        let body = self.transport.fetch_text(url)?;
        let catalog = ReleaseCatalog::parse(&body);
        info!(
            projects = catalog.project_count(),
            versions = catalog.version_count(),
            "Fetched release catalog"
        );
        Ok(catalog)
    }

    /// Known versions of the configured project, in the order used to pick
    /// the latest.
    pub fn available_versions(&mut self) -> Result<Vec<String>> {
        let project = self.config.project.clone();
        let versions = self
            .catalog()?
            .versions(&project)
            .ok_or(Blupd8Error::UnknownProject { project })?;
        Ok(versions.keys().cloned().collect())
    }

    /// Lexicographically greatest version of the configured project.
    pub fn latest_version(&mut self) -> Result<String> {
        let project = self.config.project.clone();
        self.catalog()?
            .latest_version(&project)
            .map(str::to_string)
            .ok_or(Blupd8Error::UnknownProject { project })
    }

    /// Packages published for `version`.
    pub fn packages(&mut self, version: &str) -> Result<PackageListing> {
        let page_url = self.version_page_url(version)?;
        info!(url = %page_url, "Fetching package listing");
        let body = self.transport.fetch_text(&page_url)?;
        PackageListing::parse(&body, &page_url)
    }

    /// Installs the latest version unless it is already present.
    pub fn update(&mut self, progress: &mut dyn ProgressObserver) -> Result<UpdateOutcome> {
        let result = self
            .latest_version()
            .and_then(|version| self.install(&version, progress));
        self.finish(result)
    }

    /// Installs a specific catalog version unless it is already present.
    pub fn update_to(
        &mut self,
        version: &str,
        progress: &mut dyn ProgressObserver,
    ) -> Result<UpdateOutcome> {
        let result = self.install(version, progress);
        self.finish(result)
    }

    fn finish(&mut self, result: Result<UpdateOutcome>) -> Result<UpdateOutcome> {
        if let Err(e) = &result {
            warn!(stage = ?self.stage, error = %e, "Update failed");
            self.stage = UpdateStage::Failed;
        }
        result
    }

    fn version_page_url(&mut self, version: &str) -> Result<String> {
        let project = self.config.project.clone();
        let catalog = self.catalog()?;
        let versions = catalog
            .versions(&project)
            .ok_or_else(|| Blupd8Error::UnknownProject {
                project: project.clone(),
            })?;
        let link = versions
            .get(version)
            .cloned()
            .ok_or_else(|| Blupd8Error::VersionNotFound {
                version: version.to_string(),
                available: versions.keys().cloned().collect(),
            })?;

        Ok(format!("{}{link}", self.config.releases_url))
    }

    fn install(
        &mut self,
        version: &str,
        progress: &mut dyn ProgressObserver,
    ) -> Result<UpdateOutcome> {
        self.version_page_url(version)?;
        self.stage = UpdateStage::VersionSelected;
        info!(project = %self.config.project, version, "Selected version");

        let target = self.installed().version_dir(version);
        if target.is_dir() {
            info!(path = %target.display(), "Already installed");
            self.stage = UpdateStage::AlreadyInstalled;
            return Ok(UpdateOutcome::AlreadyInstalled {
                version: version.to_string(),
                path: target,
            });
        }

        let listing = self.packages(version)?;
        let package = listing
            .select(&self.config.platform, &self.config.package_type)?
            .clone();
        info!(package = %package.name, size = package.size_bytes, "Selected package");

        self.stage = UpdateStage::Downloading;
        let archive = self.config.download_path(version);
        if is_complete_download(&archive, package.size_bytes) {
            info!(path = %archive.display(), "Reusing earlier download");
        } else {
            DownloadSession::new(&package.url, &archive)
                .run(&self.transport, |received, total| progress.download(received, total))?;
        }
        self.stage = UpdateStage::Downloaded;

        if target.exists() {
            return Err(Blupd8Error::TargetExists { path: target });
        }
        self.stage = UpdateStage::Extracting;
        let summary = ArchiveExtractor::new()
            .extract(&archive, &target, |index, total| progress.extract(index, total))?;

        if !self.config.keep_downloads {
            fs::remove_file_if_exists(&archive)?;
        }
        self.stage = UpdateStage::Done;
        info!(path = %target.display(), files = summary.files, "Installed");

        Ok(UpdateOutcome::Installed {
            version: version.to_string(),
            path: target,
            package,
            summary,
        })
    }
}

/// A previous download is reused when it is non-empty and, if the listing
/// gave a size, exactly that size.
fn is_complete_download(path: &Path, expected: u64) -> bool {
    match fs::file_len(path) {
        Some(0) | None => false,
        Some(len) if expected > 0 && len != expected => {
            debug!(path = %path.display(), len, expected, "Discarding stale download");
            false
        }
        Some(_) => true,
    }
}
