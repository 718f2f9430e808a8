//! Asset media types accepted by `asset_media_type`.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

/// Value of `asset_media_type` asking the synthesizer to pick the media type
pub const AUTO: &str = "auto";

/// Asset media types accepted by the catalog-item endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    /// Cloud Optimized GeoTIFF
    Cog,
    /// FlatGeobuf
    FlatGeobuf,
    /// GeoJSON
    GeoJson,
    /// GeoPackage
    GeoPackage,
    /// GeoTIFF
    GeoTiff,
    /// HDF4
    Hdf,
    /// HDF5
    Hdf5,
    /// HTML
    Html,
    /// JPEG
    Jpeg,
    /// JPEG 2000
    Jpeg2000,
    /// JSON
    Json,
    /// GeoParquet
    Parquet,
    /// PNG
    Png,
    /// Plain text
    Text,
    /// TIFF without georeferencing
    Tiff,
    /// KML
    Kml,
    /// XML
    Xml,
    /// PDF
    Pdf,
    /// Zarr
    Zarr,
    /// NetCDF
    NetCdf,
}

impl MediaType {
    /// Every media type, in the order they are offered
    pub const ALL: [Self; 20] = [
        Self::Cog,
        Self::FlatGeobuf,
        Self::GeoJson,
        Self::GeoPackage,
        Self::GeoTiff,
        Self::Hdf,
        Self::Hdf5,
        Self::Html,
        Self::Jpeg,
        Self::Jpeg2000,
        Self::Json,
        Self::Parquet,
        Self::Png,
        Self::Text,
        Self::Tiff,
        Self::Kml,
        Self::Xml,
        Self::Pdf,
        Self::Zarr,
        Self::NetCdf,
    ];

    /// IANA media type string
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cog => "image/tiff; application=geotiff; profile=cloud-optimized",
            Self::FlatGeobuf => "application/vnd.flatgeobuf",
            Self::GeoJson => "application/geo+json",
            Self::GeoPackage => "application/geopackage+sqlite3",
            Self::GeoTiff => "image/tiff; application=geotiff",
            Self::Hdf => "application/x-hdf",
            Self::Hdf5 => "application/x-hdf5",
            Self::Html => "text/html",
            Self::Jpeg => "image/jpeg",
            Self::Jpeg2000 => "image/jp2",
            Self::Json => "application/json",
            Self::Parquet => "application/x-parquet",
            Self::Png => "image/png",
            Self::Text => "text/plain",
            Self::Tiff => "image/tiff",
            Self::Kml => "application/vnd.google-earth.kml+xml",
            Self::Xml => "application/xml",
            Self::Pdf => "application/pdf",
            Self::Zarr => "application/vnd+zarr",
            Self::NetCdf => "application/netcdf",
        }
    }

    /// Every accepted `asset_media_type` value, `auto` last
    pub fn choices() -> Vec<&'static str> {
        Self::ALL
            .iter()
            .map(|media| media.as_str())
            .chain(std::iter::once(AUTO))
            .collect()
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MediaType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

static BY_VALUE: Lazy<HashMap<&'static str, MediaType>> = Lazy::new(|| {
    MediaType::ALL
        .iter()
        .map(|media| (media.as_str(), *media))
        .collect()
});

/// Requested asset media type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssetMediaType {
    /// Let the synthesizer choose from the file layout
    #[default]
    Auto,
    /// Use this media type
    Known(MediaType),
}

impl AssetMediaType {
    /// Parse an `asset_media_type` value; `param_name` is reported on failure
    pub fn parse(value: &str, param_name: &str) -> Result<Self> {
        if value == AUTO {
            return Ok(Self::Auto);
        }
        BY_VALUE
            .get(value)
            .copied()
            .map(Self::Known)
            .ok_or_else(|| {
                Error::invalid_parameter(
                    param_name,
                    format!("'{value}' is not a supported media type"),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn parses_enumerated_values_and_auto() {
        assert_eq!(AssetMediaType::parse("auto", "m").unwrap(), AssetMediaType::Auto);
        assert_eq!(
            AssetMediaType::parse("image/tiff; application=geotiff", "m").unwrap(),
            AssetMediaType::Known(MediaType::GeoTiff)
        );
    }

    #[test]
    fn rejects_values_outside_the_set() {
        let err = AssetMediaType::parse("image/gif", "asset_media_type").unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name, .. } if name == "asset_media_type"));
        assert!(AssetMediaType::parse("COG", "m").is_err());
    }

    #[test]
    fn choices_are_unique_and_end_with_auto() {
        let choices = MediaType::choices();
        assert_eq!(choices.len(), MediaType::ALL.len() + 1);
        assert_eq!(choices.last(), Some(&AUTO));
        assert_eq!(BY_VALUE.len(), MediaType::ALL.len());
    }
}
