//! Dataset path dependency shared by every route of a factory.

use std::path::{Component, Path, PathBuf};

use url::Url;

use crate::constants::{DESC_URL, PARAM_URL};
use crate::error::{Error, Result};
use crate::support::{ParamDef, QueryParams};
use crate::support::params::extract_required_string;

/// Dependency that turns caller-supplied query input into a source identifier.
///
/// Every route on a factory shares one instance, so whatever normalization or
/// access control it applies is inherited by routes added later by extensions.
pub trait PathDependency: Send + Sync {
    /// Resolve the dataset location for one request
    fn resolve(&self, params: &QueryParams) -> Result<String>;

    /// Query parameters consumed by [`PathDependency::resolve`]
    fn params(&self) -> Vec<ParamDef>;
}

/// Default dataset dependency: a required `url` query parameter.
///
/// With a data root configured, relative local paths are joined onto the root and
/// paths climbing out of it are refused. `file://` URLs are decoded and held to the
/// same root. Any other URL scheme is passed through.
#[derive(Debug, Clone, Default)]
pub struct DatasetPathParams {
    root: Option<PathBuf>,
}

impl DatasetPathParams {
    /// Dependency without a data root: locations are used as given
    pub const fn new() -> Self {
        Self { root: None }
    }

    /// Dependency confining local paths to `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve_local(&self, candidate: &Path) -> Result<String> {
        let Some(root) = &self.root else {
            return Ok(candidate.to_string_lossy().into_owned());
        };

        let escapes = candidate
            .components()
            .any(|c| matches!(c, Component::ParentDir));
        if escapes {
            return Err(Error::invalid_parameter(
                PARAM_URL,
                "path must not contain '..' segments",
            ));
        }

        let resolved = if candidate.is_absolute() {
            if !candidate.starts_with(root) {
                return Err(Error::invalid_parameter(
                    PARAM_URL,
                    format!("path is outside of {}", root.display()),
                ));
            }
            candidate.to_path_buf()
        } else {
            root.join(candidate)
        };

        Ok(resolved.to_string_lossy().into_owned())
    }
}

impl PathDependency for DatasetPathParams {
    fn resolve(&self, params: &QueryParams) -> Result<String> {
        let raw = extract_required_string(params, PARAM_URL)?.trim();
        if raw.is_empty() {
            return Err(Error::invalid_parameter(PARAM_URL, "must not be empty"));
        }

        match &self.root {
            Some(_) if is_file_url(raw) => self.resolve_local(&file_url_path(raw)?),
            _ if has_scheme(raw) => Ok(raw.to_string()),
            _ => self.resolve_local(Path::new(raw)),
        }
    }

    fn params(&self) -> Vec<ParamDef> {
        vec![ParamDef::required_string(PARAM_URL, DESC_URL)]
    }
}

/// True for `scheme://...` locations (http, https, file, s3, ...)
pub fn has_scheme(location: &str) -> bool {
    location
        .split_once("://")
        .is_some_and(|(scheme, _)| {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        })
}

fn is_file_url(location: &str) -> bool {
    location
        .get(..7)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("file://"))
}

/// Local path of a `file://` URL, percent-decoded and with dot segments removed
fn file_url_path(location: &str) -> Result<PathBuf> {
    Url::parse(location)
        .ok()
        .and_then(|url| url.to_file_path().ok())
        .ok_or_else(|| Error::invalid_parameter(PARAM_URL, "not a local file URL"))
}
