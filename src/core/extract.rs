use crate::error::{Blupd8Error, Result};
use crate::utils::fs;
use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Component, Path, PathBuf};
use tar::{Archive, EntryType};
use tracing::{debug, info, warn};
use zip::ZipArchive;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    TarGz,
    TarBz2,
    Tar,
}

impl ArchiveKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_lowercase();
        if name.ends_with(".zip") {
            Some(Self::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".tar.bz2") || name.ends_with(".tbz2") {
            Some(Self::TarBz2)
        } else if name.ends_with(".tar") {
            Some(Self::Tar)
        } else {
            None
        }
    }
}

/// Entry path with `\` normalised to `/`, and whether it is a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
struct EntryName {
    path: String,
    is_dir: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractSummary {
    pub files: usize,
    /// Symbolic and hard links recreated from a tar archive.
    pub links: usize,
    /// Top-level folder that was dropped from every path, if any.
    pub stripped_root: Option<String>,
}

/// Unpacks release archives into an installation directory.
///
/// When every entry lives under one shared top-level folder that folder is
/// dropped, so `blender-2.80-linux/blender` lands at `<target>/blender`.
#[derive(Debug, Default)]
pub struct ArchiveExtractor;

impl ArchiveExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts `archive_path` into `target`, which must not exist yet.
    ///
    /// `progress` receives `(index, entry_count)` for every entry. A corrupt
    /// archive aborts with whatever was already written left in place.
    pub fn extract<F>(
        &self,
        archive_path: &Path,
        target: &Path,
        mut progress: F,
    ) -> Result<ExtractSummary>
    where
        F: FnMut(usize, usize),
    {
        let kind = ArchiveKind::from_path(archive_path).ok_or_else(|| {
            Blupd8Error::UnsupportedArchive {
                path: archive_path.to_path_buf(),
            }
        })?;

        let names = self
            .entry_names(kind, archive_path)
            .map_err(|e| Blupd8Error::extraction(archive_path, e))?;
        let root = shared_root(&names);

        claim_target(target)?;
        info!(
            archive = %archive_path.display(),
            target = %target.display(),
            entries = names.len(),
            stripped_root = root.as_deref().unwrap_or(""),
            "Extracting archive"
        );

        let mut plan = Plan {
            target,
            root: root.as_deref(),
            total: names.len(),
            files: 0,
            links: 0,
            progress: &mut progress,
        };

        let outcome = match kind {
            ArchiveKind::Zip => plan.unpack_zip(archive_path),
            ArchiveKind::TarGz => {
                plan.unpack_tar(Archive::new(GzDecoder::new(File::open(archive_path)?)))
            }
            ArchiveKind::TarBz2 => {
                plan.unpack_tar(Archive::new(BzDecoder::new(File::open(archive_path)?)))
            }
            ArchiveKind::Tar => plan.unpack_tar(Archive::new(File::open(archive_path)?)),
        };
        outcome.map_err(|e| match e {
            Unpack::Archive(message) => Blupd8Error::extraction(archive_path, message),
            Unpack::Fs(e) => e,
        })?;
        let (files, links) = (plan.files, plan.links);

        Ok(ExtractSummary {
            files,
            links,
            stripped_root: root,
        })
    }

    fn entry_names(
        &self,
        kind: ArchiveKind,
        archive_path: &Path,
    ) -> std::result::Result<Vec<EntryName>, String> {
        match kind {
            ArchiveKind::Zip => {
                let file = File::open(archive_path).map_err(|e| e.to_string())?;
                let mut archive = ZipArchive::new(file).map_err(|e| e.to_string())?;
                (0..archive.len())
                    .map(|i| -> std::result::Result<EntryName, String> {
                        let entry = archive.by_index(i).map_err(|e| e.to_string())?;
                        Ok(EntryName::new(entry.name(), entry.is_dir()))
                    })
                    .collect()
            }
            ArchiveKind::TarGz => {
                let file = File::open(archive_path).map_err(|e| e.to_string())?;
                tar_names(Archive::new(GzDecoder::new(file)))
            }
            ArchiveKind::TarBz2 => {
                let file = File::open(archive_path).map_err(|e| e.to_string())?;
                tar_names(Archive::new(BzDecoder::new(file)))
            }
            ArchiveKind::Tar => {
                let file = File::open(archive_path).map_err(|e| e.to_string())?;
                tar_names(Archive::new(file))
            }
        }
    }
}

impl EntryName {
    fn new(raw: &str, is_dir: bool) -> Self {
        let mut path = raw.replace('\\', "/");
        let is_dir = is_dir || path.ends_with('/');
        // tar may store `wrap/` as `wrap`; keep the separator for root detection.
        if is_dir && !path.is_empty() && !path.ends_with('/') {
            path.push('/');
        }
        Self { path, is_dir }
    }

    fn first_segment(&self) -> Option<&str> {
        self.path.split_once('/').map(|(first, _)| first)
    }
}

fn tar_names<R: Read>(mut archive: Archive<R>) -> std::result::Result<Vec<EntryName>, String> {
    let entries = archive.entries().map_err(|e| e.to_string())?;
    entries
        .map(|entry| -> std::result::Result<EntryName, String> {
            let entry = entry.map_err(|e| e.to_string())?;
            let path = entry.path().map_err(|e| e.to_string())?;
            Ok(EntryName::new(
                &path.to_string_lossy(),
                entry.header().entry_type().is_dir(),
            ))
        })
        .collect()
}

/// The first path segment shared by every entry, provided every entry has a
/// separator in its path.
fn shared_root(names: &[EntryName]) -> Option<String> {
    let mut segments = names.iter().map(EntryName::first_segment);
    let first = segments.next()??;
    if first.is_empty() {
        return None;
    }
    segments
        .all(|segment| segment == Some(first))
        .then(|| first.to_string())
}

/// Creates `target` itself, failing if something already claimed it.
fn claim_target(target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::ensure_dir_exists(parent)?;
    }
    match std::fs::create_dir(target) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            Err(Blupd8Error::TargetExists {
                path: target.to_path_buf(),
            })
        }
        Err(e) => Err(fs::permission_or_io(e, target)),
    }
}

/// Joins an archive path onto `target`, or `None` if it would escape it.
fn output_path(target: &Path, relative: &str) -> Option<PathBuf> {
    let relative = Path::new(relative);
    if relative.as_os_str().is_empty()
        || !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return None;
    }
    Some(target.join(relative))
}

enum Unpack {
    Archive(String),
    Fs(Blupd8Error),
}

impl From<std::io::Error> for Unpack {
    fn from(e: std::io::Error) -> Self {
        Unpack::Fs(e.into())
    }
}

impl From<Blupd8Error> for Unpack {
    fn from(e: Blupd8Error) -> Self {
        Unpack::Fs(e)
    }
}

struct Plan<'a> {
    target: &'a Path,
    root: Option<&'a str>,
    total: usize,
    files: usize,
    links: usize,
    progress: &'a mut dyn FnMut(usize, usize),
}

impl Plan<'_> {
    /// Where an entry goes, or `None` for entries that produce no file.
    fn destination(&mut self, index: usize, name: &EntryName) -> Option<PathBuf> {
        (self.progress)(index, self.total);
        if name.is_dir {
            return None;
        }

        self.resolve(&name.path)
    }

    /// Output path for an archive path, with the shared root dropped.
    fn resolve(&self, archive_path: &str) -> Option<PathBuf> {
        let relative = match self.root {
            Some(root) => archive_path.strip_prefix(root)?.trim_start_matches('/'),
            None => archive_path,
        };
        let out = output_path(self.target, relative);
        if out.is_none() {
            warn!(entry = %archive_path, "Skipping entry outside the install directory");
        }
        out
    }

    fn write<R: Read>(
        &mut self,
        out: &Path,
        reader: &mut R,
        mode: Option<u32>,
    ) -> std::result::Result<(), Unpack> {
        if let Some(parent) = out.parent() {
            fs::ensure_dir_exists(parent)?;
        }
        let mut file = File::create(out).map_err(|e| fs::permission_or_io(e, out))?;

        // Read failures mean a damaged archive, write failures are local.
        let mut buffer = vec![0u8; 64 * 1024];
        loop {
            let read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Unpack::Archive(e.to_string())),
            };
            file.write_all(&buffer[..read])
                .map_err(|e| fs::permission_or_io(e, out))?;
        }
        if let Some(mode) = mode.map(|m| m & 0o7777).filter(|m| m & 0o777 != 0) {
            fs::set_mode(out, mode)?;
        }

        self.files += 1;
        debug!(file = %out.display(), "Extracted");
        Ok(())
    }

    fn unpack_zip(&mut self, archive_path: &Path) -> std::result::Result<(), Unpack> {
        let mut archive = ZipArchive::new(File::open(archive_path)?)
            .map_err(|e| Unpack::Archive(e.to_string()))?;

        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .map_err(|e| Unpack::Archive(e.to_string()))?;
            let name = EntryName::new(entry.name(), entry.is_dir());
            let Some(out) = self.destination(i, &name) else {
                continue;
            };
            let mode = entry.unix_mode();
            self.write(&out, &mut entry, mode)?;
        }
        Ok(())
    }

    fn unpack_tar<R: Read>(&mut self, mut archive: Archive<R>) -> std::result::Result<(), Unpack> {
        let entries = archive
            .entries()
            .map_err(|e| Unpack::Archive(e.to_string()))?;

        for (i, entry) in entries.enumerate() {
            let mut entry = entry.map_err(|e| Unpack::Archive(e.to_string()))?;
            let kind = entry.header().entry_type();
            let path = entry
                .path()
                .map_err(|e| Unpack::Archive(e.to_string()))?
                .to_string_lossy()
                .into_owned();
            let name = EntryName::new(&path, kind.is_dir());
            let Some(out) = self.destination(i, &name) else {
                continue;
            };
            match kind {
                EntryType::Symlink | EntryType::Link => self.link(&mut entry, kind, &out)?,
                kind if kind.is_file() => {
                    let mode = entry.header().mode().ok();
                    self.write(&out, &mut entry, mode)?;
                }
                _ => warn!(entry = %name.path, ?kind, "Skipping unsupported tar entry"),
            }
        }
        Ok(())
    }

    /// Recreates a symbolic or hard link. Hard link targets are archive paths
    /// and get the same root stripping as the entry itself.
    fn link<R: Read>(
        &mut self,
        entry: &mut tar::Entry<'_, R>,
        kind: EntryType,
        out: &Path,
    ) -> std::result::Result<(), Unpack> {
        let target = entry
            .link_name()
            .map_err(|e| Unpack::Archive(e.to_string()))?
            .map(|t| t.to_string_lossy().replace('\\', "/"))
            .ok_or_else(|| Unpack::Archive(format!("link without target: {}", out.display())))?;

        if let Some(parent) = out.parent() {
            fs::ensure_dir_exists(parent)?;
        }

        if kind == EntryType::Link {
            let Some(source) = self.resolve(&target) else {
                return Ok(());
            };
            std::fs::hard_link(&source, out).map_err(|e| fs::permission_or_io(e, out))?;
        } else {
            if !self.stays_inside(out, &target) {
                warn!(link = %out.display(), target = %target, "Skipping symlink leaving the install directory");
                return Ok(());
            }
            entry
                .unpack(out)
                .map_err(|e| fs::permission_or_io(e, out))?;
        }

        self.links += 1;
        debug!(link = %out.display(), target = %target, "Linked");
        Ok(())
    }

    /// Whether a relative symlink target at `link` resolves inside the target.
    fn stays_inside(&self, link: &Path, target: &str) -> bool {
        let Some(mut depth) = link
            .parent()
            .and_then(|parent| parent.strip_prefix(self.target).ok())
            .map(|relative| relative.components().count())
        else {
            return false;
        };
        for component in Path::new(target).components() {
            match component {
                Component::Normal(_) => depth += 1,
                Component::CurDir => {}
                Component::ParentDir if depth > 0 => depth -= 1,
                _ => return false,
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use pretty_assertions::assert_eq;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_zip(path: &Path, entries: &[(&str, Option<&[u8]>)]) {
        let mut writer = ZipWriter::new(File::create(path).unwrap());
        let options = SimpleFileOptions::default();
        for (name, data) in entries {
            match data {
                Some(data) => {
                    writer.start_file(*name, options).unwrap();
                    writer.write_all(data).unwrap();
                }
                None => writer.add_directory(*name, options).unwrap(),
            }
        }
        writer.finish().unwrap();
    }

    enum TarItem<'a> {
        Dir,
        File(&'a [u8]),
        Symlink(&'a str),
        Hardlink(&'a str),
    }

    fn fill_tar<W: Write>(writer: W, entries: &[(&str, TarItem<'_>)]) -> W {
        let mut builder = tar::Builder::new(writer);
        for (name, item) in entries {
            let mut header = tar::Header::new_gnu();
            match item {
                TarItem::Dir => {
                    header.set_entry_type(EntryType::Directory);
                    header.set_size(0);
                    header.set_mode(0o755);
                    header.set_cksum();
                    builder.append_data(&mut header, name, std::io::empty()).unwrap();
                }
                TarItem::File(data) => {
                    header.set_entry_type(EntryType::Regular);
                    header.set_size(data.len() as u64);
                    header.set_mode(0o755);
                    header.set_cksum();
                    builder.append_data(&mut header, name, *data).unwrap();
                }
                TarItem::Symlink(target) | TarItem::Hardlink(target) => {
                    let kind = match item {
                        TarItem::Symlink(_) => EntryType::Symlink,
                        _ => EntryType::Link,
                    };
                    header.set_entry_type(kind);
                    header.set_size(0);
                    header.set_mode(0o777);
                    builder.append_link(&mut header, name, target).unwrap();
                }
            }
        }
        builder.into_inner().unwrap()
    }

    fn write_tar(path: &Path, entries: &[(&str, TarItem<'_>)]) {
        fill_tar(File::create(path).unwrap(), entries);
    }

    fn write_tar_gz(path: &Path, entries: &[(&str, TarItem<'_>)]) {
        let encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
        fill_tar(encoder, entries).finish().unwrap();
    }

    fn write_tar_bz2(path: &Path, entries: &[(&str, TarItem<'_>)]) {
        let encoder =
            bzip2::write::BzEncoder::new(File::create(path).unwrap(), bzip2::Compression::default());
        fill_tar(encoder, entries).finish().unwrap();
    }

    /// Linux package layout: wrapper folder, executable, library with links.
    fn linux_package() -> Vec<(&'static str, TarItem<'static>)> {
        vec![
            ("blender-2.80-linux64/", TarItem::Dir),
            ("blender-2.80-linux64/blender", TarItem::File(b"#!/bin/sh\n")),
            ("blender-2.80-linux64/lib/", TarItem::Dir),
            ("blender-2.80-linux64/lib/libfoo.so.1", TarItem::File(b"elf")),
        ]
    }

    fn assert_linux_package(summary: &ExtractSummary, target: &Path) {
        assert_eq!(summary.files, 2);
        assert_eq!(
            summary.stripped_root.as_deref(),
            Some("blender-2.80-linux64")
        );
        assert_eq!(std::fs::read(target.join("blender")).unwrap(), b"#!/bin/sh\n");
        assert_eq!(std::fs::read(target.join("lib/libfoo.so.1")).unwrap(), b"elf");
        assert!(!target.join("blender-2.80-linux64").exists());
    }

    fn names(paths: &[&str]) -> Vec<EntryName> {
        paths.iter().map(|p| EntryName::new(p, false)).collect()
    }

    #[test]
    fn test_shared_root_detection() {
        assert_eq!(
            shared_root(&names(&["wrap/", "wrap/a", "wrap/b/c"])),
            Some("wrap".to_string())
        );
        assert_eq!(shared_root(&names(&["wrap/a", "other/b"])), None);
        assert_eq!(shared_root(&names(&["wrap/a", "readme.txt"])), None);
        assert_eq!(shared_root(&names(&["wrap\\a", "wrap\\b"])), Some("wrap".to_string()));
        assert_eq!(shared_root(&names(&["/abs/a", "/abs/b"])), None);
        assert_eq!(shared_root(&[]), None);
    }

    #[test]
    fn test_zip_wrapper_is_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("blender-2.80-windows64.zip");
        write_zip(
            &archive,
            &[
                ("blender-2.80-windows64/", None),
                ("blender-2.80-windows64/blender.exe", Some(b"exe")),
                ("blender-2.80-windows64/2.80/", None),
                ("blender-2.80-windows64/2.80/scripts/startup.py", Some(b"print()")),
            ],
        );
        let target = dir.path().join("install").join("blender-2.80");

        let mut calls = Vec::new();
        let summary = ArchiveExtractor::new()
            .extract(&archive, &target, |index, total| calls.push((index, total)))
            .unwrap();

        assert_eq!(
            summary,
            ExtractSummary {
                files: 2,
                links: 0,
                stripped_root: Some("blender-2.80-windows64".to_string()),
            }
        );
        assert_eq!(calls, vec![(0, 4), (1, 4), (2, 4), (3, 4)]);
        assert_eq!(std::fs::read(target.join("blender.exe")).unwrap(), b"exe");
        assert!(target.join("2.80/scripts/startup.py").is_file());
        assert!(!target.join("blender-2.80-windows64").exists());
    }

    #[test]
    fn test_zip_mixed_roots_kept() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("pkg.zip");
        write_zip(
            &archive,
            &[("bin/tool", Some(b"t")), ("share/doc.txt", Some(b"d"))],
        );
        let target = dir.path().join("out");

        let summary = ArchiveExtractor::new()
            .extract(&archive, &target, |_, _| {})
            .unwrap();

        assert_eq!(summary.stripped_root, None);
        assert!(target.join("bin/tool").is_file());
        assert!(target.join("share/doc.txt").is_file());
    }

    #[test]
    fn test_rootless_entry_disables_stripping() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("pkg.zip");
        write_zip(
            &archive,
            &[("wrap/a.txt", Some(b"a")), ("readme.txt", Some(b"r"))],
        );
        let target = dir.path().join("out");

        ArchiveExtractor::new()
            .extract(&archive, &target, |_, _| {})
            .unwrap();

        assert!(target.join("wrap/a.txt").is_file());
        assert!(target.join("readme.txt").is_file());
    }

    #[test]
    fn test_tar_gz_wrapper_is_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("blender-2.80-linux64.tar.gz");
        write_tar_gz(&archive, &linux_package());
        let target = dir.path().join("blender-2.80");

        let summary = ArchiveExtractor::new()
            .extract(&archive, &target, |_, _| {})
            .unwrap();

        assert_linux_package(&summary, &target);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(target.join("blender")).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[test]
    fn test_tar_bz2_wrapper_is_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("blender-2.80-linux-glibc217-x86_64.tar.bz2");
        write_tar_bz2(&archive, &linux_package());
        let target = dir.path().join("blender-2.80");

        let mut calls = Vec::new();
        let summary = ArchiveExtractor::new()
            .extract(&archive, &target, |index, total| calls.push((index, total)))
            .unwrap();

        assert_linux_package(&summary, &target);
        assert_eq!(calls, vec![(0, 4), (1, 4), (2, 4), (3, 4)]);
    }

    #[test]
    fn test_plain_tar_wrapper_is_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("blender-2.80-linux64.tar");
        write_tar(&archive, &linux_package());
        let target = dir.path().join("blender-2.80");

        let summary = ArchiveExtractor::new()
            .extract(&archive, &target, |_, _| {})
            .unwrap();

        assert_linux_package(&summary, &target);
    }

    #[test]
    fn test_tar_directory_without_slash_counts_as_root() {
        assert_eq!(EntryName::new("wrap", true).path, "wrap/");
        let entries = vec![EntryName::new("wrap", true), EntryName::new("wrap/a", false)];
        assert_eq!(shared_root(&entries), Some("wrap".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn test_tar_links_are_recreated() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("blender-2.80-linux64.tar.gz");
        let mut entries = linux_package();
        entries.push(("blender-2.80-linux64/lib/libfoo.so", TarItem::Symlink("libfoo.so.1")));
        entries.push((
            "blender-2.80-linux64/lib/libfoo-hard.so",
            TarItem::Hardlink("blender-2.80-linux64/lib/libfoo.so.1"),
        ));
        entries.push(("blender-2.80-linux64/lib/escape", TarItem::Symlink("../../../etc/passwd")));
        write_tar_gz(&archive, &entries);
        let target = dir.path().join("blender-2.80");

        let summary = ArchiveExtractor::new()
            .extract(&archive, &target, |_, _| {})
            .unwrap();

        assert_linux_package(&summary, &target);
        assert_eq!(summary.links, 2);

        let symlink = target.join("lib/libfoo.so");
        assert!(std::fs::symlink_metadata(&symlink).unwrap().file_type().is_symlink());
        assert_eq!(std::fs::read_link(&symlink).unwrap(), PathBuf::from("libfoo.so.1"));
        assert_eq!(std::fs::read(&symlink).unwrap(), b"elf");

        let hard = target.join("lib/libfoo-hard.so");
        assert!(!std::fs::symlink_metadata(&hard).unwrap().file_type().is_symlink());
        assert_eq!(std::fs::read(&hard).unwrap(), b"elf");

        assert!(std::fs::symlink_metadata(target.join("lib/escape")).is_err());
    }

    #[test]
    fn test_damaged_deflate_stream_is_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("pkg.zip");

        let mut seed = 0x2545_f491_u32;
        let data: Vec<u8> = (0..100_000)
            .map(|_| {
                seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                (seed >> 16) as u8
            })
            .collect();
        let mut writer = ZipWriter::new(File::create(&archive).unwrap());
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        writer.start_file("wrap/a.txt", options).unwrap();
        writer.write_all(&data).unwrap();
        writer.finish().unwrap();

        // The central directory sits in the last few dozen bytes; damage the middle.
        let mut bytes = std::fs::read(&archive).unwrap();
        let middle = bytes.len() / 2;
        for byte in &mut bytes[middle..middle + 100] {
            *byte ^= 0xff;
        }
        std::fs::write(&archive, &bytes).unwrap();

        let result = ArchiveExtractor::new().extract(&archive, &dir.path().join("out"), |_, _| {});

        match result {
            Err(Blupd8Error::ArchiveExtraction { path, .. }) => assert_eq!(path, archive),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_existing_target_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("pkg.zip");
        write_zip(&archive, &[("a.txt", Some(b"a"))]);
        let target = dir.path().join("out");
        std::fs::create_dir(&target).unwrap();

        let result = ArchiveExtractor::new().extract(&archive, &target, |_, _| {});

        assert!(matches!(result, Err(Blupd8Error::TargetExists { .. })));
        assert!(!target.join("a.txt").exists());
    }

    #[test]
    fn test_corrupt_archive() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("pkg.zip");
        std::fs::write(&archive, b"this is not a zip file").unwrap();

        let result = ArchiveExtractor::new().extract(&archive, &dir.path().join("out"), |_, _| {});

        match result {
            Err(Blupd8Error::ArchiveExtraction { path, .. }) => assert_eq!(path, archive),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("pkg.dmg");
        std::fs::write(&archive, b"").unwrap();

        let result = ArchiveExtractor::new().extract(&archive, &dir.path().join("out"), |_, _| {});

        assert!(matches!(result, Err(Blupd8Error::UnsupportedArchive { .. })));
    }

    #[test]
    fn test_output_path_rejects_escapes() {
        let target = Path::new("/install/blender-2.80");
        assert_eq!(
            output_path(target, "bin/blender"),
            Some(PathBuf::from("/install/blender-2.80/bin/blender"))
        );
        assert_eq!(output_path(target, "../evil"), None);
        assert_eq!(output_path(target, "/etc/passwd"), None);
        assert_eq!(output_path(target, ""), None);
    }

    #[test]
    fn test_archive_kind() {
        assert_eq!(ArchiveKind::from_path(Path::new("a.ZIP")), Some(ArchiveKind::Zip));
        assert_eq!(ArchiveKind::from_path(Path::new("a.tar.gz")), Some(ArchiveKind::TarGz));
        assert_eq!(ArchiveKind::from_path(Path::new("a.tgz")), Some(ArchiveKind::TarGz));
        assert_eq!(ArchiveKind::from_path(Path::new("a.tar")), Some(ArchiveKind::Tar));
        assert_eq!(
            ArchiveKind::from_path(Path::new("blender-2.80-linux-glibc217-x86_64.tar.bz2")),
            Some(ArchiveKind::TarBz2)
        );
        assert_eq!(ArchiveKind::from_path(Path::new("a.tar.xz")), None);
    }
}
