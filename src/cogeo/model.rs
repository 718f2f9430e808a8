//! Validation record returned by `/validate`.

use serde::{Deserialize, Serialize};

/// COG validation record, serialized with rio-cogeo's `Info` field names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CogInfo {
    /// Source as requested
    #[serde(rename = "Path")]
    pub path:        String,
    /// Always `GTiff`
    #[serde(rename = "Driver")]
    pub driver:      String,
    /// Whether the file is a valid COG
    #[serde(rename = "COG")]
    pub cog:         bool,
    /// Compression name, e.g. `deflate`
    #[serde(rename = "Compression")]
    pub compression: Option<String>,
    /// Photometric interpretation, e.g. `rgb`
    #[serde(rename = "ColorSpace")]
    pub color_space: Option<String>,
    /// Layout rule violations
    #[serde(rename = "COG_errors")]
    pub errors:      Vec<String>,
    /// Layout recommendations not met
    #[serde(rename = "COG_warnings")]
    pub warnings:    Vec<String>,
    /// Main image description
    #[serde(rename = "Profile")]
    pub profile:     Profile,
    /// Georeferencing of the main image
    #[serde(rename = "GEO")]
    pub geo:         Geo,
    /// Main image then overviews
    #[serde(rename = "IFD")]
    pub ifd:         Vec<IfdInfo>,
}

/// Main image description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Profile {
    /// Samples per pixel
    pub bands:         u64,
    /// Width in pixels
    pub width:         u64,
    /// Height in pixels
    pub height:        u64,
    /// Whether the image is tiled rather than stripped
    pub tiled:         bool,
    /// Sample type, e.g. `uint8`
    pub dtype:         Option<String>,
    /// `PIXEL` or `BAND`
    pub interleave:    String,
    /// Whether an internal mask IFD is present
    pub internal_mask: bool,
    /// GDAL nodata value
    pub nodata:        Option<f64>,
}

/// Georeferencing of the main image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Geo {
    /// `EPSG:<code>`
    #[serde(rename = "CRS")]
    pub crs:          Option<String>,
    /// `[minx, miny, maxx, maxy]` in the native CRS
    pub bounding_box: Option<[f64; 4]>,
    /// Upper-left corner
    pub origin:       Option<[f64; 2]>,
    /// Pixel size along x and y
    pub resolution:   Option<[f64; 2]>,
}

/// One resolution level. `Blocksize` is `[rows, cols]`, `Decimation` is 0 for the main image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IfdInfo {
    /// 0 for the main image
    pub level:      usize,
    /// Width in pixels
    pub width:      u64,
    /// Height in pixels
    pub height:     u64,
    /// Block rows and columns
    pub blocksize:  [u64; 2],
    /// Main width over level width, rounded
    pub decimation: u64,
}
