use crate::core::transport::Transport;
use crate::error::{Blupd8Error, Result};
use crate::utils::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadState {
    pub destination: PathBuf,
    pub bytes_received: u64,
    /// `None` when the server did not announce a length.
    pub bytes_total: Option<u64>,
    pub finished: bool,
}

/// Fetches one URL into one file.
///
/// Bytes are written to an anonymous sibling of `destination` and only
/// renamed onto it once the transfer completed, so `destination` either does
/// not exist or holds the whole payload.
pub struct DownloadSession {
    url: String,
    state: DownloadState,
}

impl DownloadSession {
    pub fn new(url: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            state: DownloadState {
                destination: destination.into(),
                bytes_received: 0,
                bytes_total: None,
                finished: false,
            },
        }
    }

    pub fn state(&self) -> &DownloadState {
        &self.state
    }

    /// Streams the body to disk, reporting `(bytes_received, bytes_total)`
    /// after every chunk. Blocks until the transfer has finished or failed.
    pub fn run<T, F>(mut self, transport: &T, mut progress: F) -> Result<DownloadState>
    where
        T: Transport + ?Sized,
        F: FnMut(u64, Option<u64>),
    {
        let destination = self.state.destination.clone();
        let parent = destination
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        fs::ensure_dir_exists(parent)?;

        info!(url = %self.url, destination = %destination.display(), "Starting download");
        let mut body = transport.open(&self.url)?;
        self.state.bytes_total = body.content_length;

        // Dropping the temp file on any early return deletes it.
        let mut temp = NamedTempFile::new_in(parent)?;
        let mut buffer = vec![0u8; CHUNK_SIZE];

        loop {
            let read = match body.reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Blupd8Error::download_failed(&self.url, e)),
            };

            temp.write_all(&buffer[..read])?;
            self.state.bytes_received += read as u64;
            progress(self.state.bytes_received, self.state.bytes_total);
        }

        if let Some(total) = self.state.bytes_total {
            if total != self.state.bytes_received {
                return Err(Blupd8Error::download_failed(
                    &self.url,
                    format!(
                        "received {} of {} bytes",
                        self.state.bytes_received, total
                    ),
                ));
            }
        }

        temp.as_file().sync_all()?;
        temp.persist(&destination)
            .map_err(|e| Blupd8Error::download_failed(&self.url, e.error))?;

        if !destination.is_file() {
            return Err(Blupd8Error::download_failed(
                &self.url,
                "output file missing after transfer",
            ));
        }

        self.state.finished = true;
        debug!(bytes = self.state.bytes_received, "Download committed");
        Ok(self.state)
    }
}
