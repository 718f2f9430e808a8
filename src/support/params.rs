//! Query string container and typed parameter extraction.

use std::num::NonZeroU32;

use crate::error::{Error, Result};

/// Raw query string decoded into ordered `(name, value)` pairs.
///
/// Repeated names are kept, so list parameters such as
/// `extensions=a&extensions=b` survive decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Decode an `application/x-www-form-urlencoded` query string
    pub fn parse(query: &str) -> Self {
        let pairs = url::form_urlencoded::parse(query.as_bytes())
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect();
        Self { pairs }
    }

    /// Decode an optional raw query (as handed out by axum's `RawQuery`)
    pub fn from_raw(query: Option<&str>) -> Self {
        query.map(Self::parse).unwrap_or_default()
    }

    /// First value for `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Every value for `name`, in query order
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    /// Whether the query carried no pairs
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// Extract a required string parameter
pub fn extract_required_string<'a>(params: &'a QueryParams, param_name: &str) -> Result<&'a str> {
    params
        .get(param_name)
        .ok_or_else(|| Error::MissingParameter(param_name.to_string()))
}

/// Extract an optional string parameter
/// Returns None if not provided or empty string
pub fn extract_optional_string(params: &QueryParams, param_name: &str) -> Option<String> {
    params
        .get(param_name)
        .filter(|value| !value.is_empty())
        .map(String::from)
}

/// Extract an optional string parameter with a default value
pub fn extract_string_or<'a>(params: &'a QueryParams, param_name: &str, default: &'a str) -> &'a str {
    params
        .get(param_name)
        .filter(|value| !value.is_empty())
        .unwrap_or(default)
}

/// Extract an optional boolean parameter with a default value.
///
/// Accepts the spellings `true/false`, `1/0`, `yes/no` and `on/off`, case-insensitively.
pub fn extract_optional_bool(params: &QueryParams, param_name: &str, default: bool) -> Result<bool> {
    let Some(raw) = params.get(param_name) else {
        return Ok(default);
    };

    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(Error::invalid_parameter(
            param_name,
            format!("expected a boolean, got '{raw}'"),
        )),
    }
}

/// Extract an optional string array parameter (repeated query key).
/// Returns None when the key is absent.
pub fn extract_optional_string_array(params: &QueryParams, param_name: &str) -> Option<Vec<String>> {
    let values = params.get_all(param_name);
    if values.is_empty() {
        None
    } else {
        Some(values.into_iter().map(String::from).collect())
    }
}

/// Extract an optional strictly positive integer with a default value
pub fn extract_optional_positive_u32(
    params: &QueryParams,
    param_name: &str,
    default: NonZeroU32,
) -> Result<NonZeroU32> {
    let Some(raw) = params.get(param_name) else {
        return Ok(default);
    };

    let value: i128 = raw.trim().parse().map_err(|_| {
        Error::invalid_parameter(param_name, format!("expected an integer, got '{raw}'"))
    })?;

    if value <= 0 {
        return Err(Error::invalid_parameter(param_name, "must be greater than 0"));
    }
    u32::try_from(value)
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or_else(|| {
            Error::invalid_parameter(param_name, format!("must be at most {}", u32::MAX))
        })
}
