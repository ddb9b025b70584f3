use crate::core::listing::anchors;
use crate::error::{Blupd8Error, Result};
use chrono::NaiveDateTime;

const LISTING_TIMESTAMP: &str = "%d-%b-%Y %H:%M";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    pub name: String,
    pub url: String,
    pub date: String,
    pub time: String,
    pub size_bytes: u64,
}

impl PackageInfo {
    /// Modification time as printed by the listing server, e.g. `30-Jul-2019 12:00`.
    pub fn modified(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&format!("{} {}", self.date, self.time), LISTING_TIMESTAMP)
            .ok()
    }

    pub fn matches(&self, platform: &str, package_type: &str) -> bool {
        self.name.contains(platform)
            && self
                .name
                .to_lowercase()
                .ends_with(&package_type.to_lowercase())
    }
}

/// Packages published under one version folder, in page order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageListing {
    packages: Vec<PackageInfo>,
}

impl PackageListing {
    /// Parses a version folder listing. Links are resolved by appending them
    /// to `page_url`.
    ///
    /// Unlike the release catalog this is strict: every anchor line must end
    /// in exactly `DATE TIME SIZE`, otherwise the whole page is rejected.
    pub fn parse(body: &str, page_url: &str) -> Result<Self> {
        let mut listing = Self::default();

        for anchor in anchors(body) {
            let malformed = || Blupd8Error::MalformedListing {
                line: anchor.line.to_string(),
            };
            let (name, metadata) = anchor.label.ok_or_else(malformed)?;

            let fields: Vec<&str> = metadata.split_whitespace().collect();
            let [date, time, size] = fields.as_slice() else {
                return Err(malformed());
            };
            let size_bytes = size.parse::<u64>().map_err(|_| malformed())?;

            listing.insert(PackageInfo {
                name: name.to_string(),
                url: format!("{page_url}{}", anchor.href),
                date: date.to_string(),
                time: time.to_string(),
                size_bytes,
            });
        }

        Ok(listing)
    }

    /// Adds a package, replacing an earlier one with the same name in place.
    pub fn insert(&mut self, package: PackageInfo) {
        match self.packages.iter_mut().find(|p| p.name == package.name) {
            Some(existing) => *existing = package,
            None => self.packages.push(package),
        }
    }

    /// First package whose name contains `platform` and ends with `package_type`.
    pub fn select(&self, platform: &str, package_type: &str) -> Result<&PackageInfo> {
        self.packages
            .iter()
            .find(|p| p.matches(platform, package_type))
            .ok_or_else(|| Blupd8Error::NoMatchingPackage {
                platform: platform.to_string(),
                package_type: package_type.to_string(),
                available: self.names().map(str::to_string).collect(),
            })
    }

    pub fn get(&self, name: &str) -> Option<&PackageInfo> {
        self.packages.iter().find(|p| p.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.packages.iter().map(|p| p.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &PackageInfo> {
        self.packages.iter()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
