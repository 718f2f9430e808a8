//! Raster source access for local paths, `file://` and `http(s)://` URLs.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::time::Duration;

use reqwest::StatusCode;

use crate::constants::DEFAULT_MAX_SOURCE_BYTES;
use crate::error::{Error, Result};
use crate::factory::path::has_scheme;

const REMOTE_TIMEOUT: Duration = Duration::from_secs(60);

/// Reads whole rasters into memory, refusing sources larger than `max_bytes`.
///
/// Accepts plain paths, `file://` URLs and `http(s)://` URLs. Blocking: call from a
/// blocking context (the handlers run delegates on tokio's blocking pool).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceReader {
    max_bytes: u64,
}

impl Default for SourceReader {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SOURCE_BYTES)
    }
}

impl SourceReader {
    /// Reader refusing sources larger than `max_bytes`
    pub const fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    /// Largest accepted source, in bytes
    pub const fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Read the raster at `location`
    pub fn read(&self, location: &str) -> Result<Vec<u8>> {
        let data = if let Some(path) = location.strip_prefix("file://") {
            self.read_local(Path::new(path))?
        } else if location.starts_with("http://") || location.starts_with("https://") {
            self.read_remote(location)?
        } else if has_scheme(location) {
            return Err(Error::UnsupportedRaster(format!(
                "unsupported location scheme: {location}"
            )));
        } else {
            self.read_local(Path::new(location))?
        };

        tracing::debug!(location, bytes = data.len(), "Read raster source");
        Ok(data)
    }

    fn too_large(&self, location: &str, size: u64) -> Error {
        Error::UnsupportedRaster(format!(
            "{location} is {size} bytes, more than the {} byte limit",
            self.max_bytes
        ))
    }

    /// Read at most one byte past the limit so an oversized stream is detected
    fn read_capped(
        &self,
        location: &str,
        reader: impl Read,
        on_io: impl FnOnce(std::io::Error) -> Error,
    ) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        reader
            .take(self.max_bytes.saturating_add(1))
            .read_to_end(&mut data)
            .map_err(on_io)?;
        let size = u64::try_from(data.len()).unwrap_or(u64::MAX);
        if size > self.max_bytes {
            return Err(self.too_large(location, size));
        }
        Ok(data)
    }

    fn read_local(&self, path: &Path) -> Result<Vec<u8>> {
        let location = path.display().to_string();
        let not_found = |e: std::io::Error| match e.kind() {
            ErrorKind::NotFound => Error::SourceNotFound(location.clone()),
            _ => Error::Io(e),
        };

        let file = File::open(path).map_err(not_found)?;
        let size = file.metadata()?.len();
        if size > self.max_bytes {
            return Err(self.too_large(&location, size));
        }
        self.read_capped(&location, file, Error::Io)
    }

    fn read_remote(&self, url: &str) -> Result<Vec<u8>> {
        let remote_error = |reason: String| Error::RemoteSource {
            url: url.to_string(),
            reason,
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(REMOTE_TIMEOUT)
            .build()
            .map_err(|e| remote_error(e.to_string()))?;

        let response = client
            .get(url)
            .send()
            .map_err(|e| remote_error(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(Error::SourceNotFound(url.to_string())),
            status if !status.is_success() => return Err(remote_error(format!("HTTP {status}"))),
            _ => {}
        }

        if let Some(size) = response.content_length().filter(|size| *size > self.max_bytes) {
            return Err(self.too_large(url, size));
        }
        self.read_capped(url, response, |e| remote_error(e.to_string()))
    }
}
