//! STAC item model and the request handed to an [`ItemSynthesizer`](super::ItemSynthesizer).

use std::collections::BTreeMap;
use std::num::NonZeroU32;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::media_type::AssetMediaType;
use crate::error::{Error, Result};

/// STAC specification version written on every item
pub const STAC_VERSION: &str = "1.0.0";
const ITEM_TYPE: &str = "Feature";

/// A STAC item, as returned by `/stac`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Always `Feature`
    #[serde(rename = "type")]
    pub type_:           String,
    /// STAC version, [`STAC_VERSION`] for new items
    pub stac_version:    String,
    /// Schema URLs of the extensions the item implements
    #[serde(default)]
    pub stac_extensions: Vec<String>,
    /// Item identifier
    pub id:              String,
    /// GeoJSON footprint in EPSG:4326
    pub geometry:        Option<Value>,
    /// `[west, south, east, north]` in EPSG:4326
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox:            Option<Vec<f64>>,
    /// Item properties, `datetime` or `start_datetime`/`end_datetime` included
    pub properties:      Map<String, Value>,
    /// Related documents
    #[serde(default)]
    pub links:           Vec<Link>,
    /// Assets by name
    #[serde(default)]
    pub assets:          BTreeMap<String, Asset>,
    /// Collection ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection:      Option<String>,
}

impl Item {
    /// Empty item with no geometry, properties or assets
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            type_:           ITEM_TYPE.to_string(),
            stac_version:    STAC_VERSION.to_string(),
            stac_extensions: Vec::new(),
            id:              id.into(),
            geometry:        None,
            bbox:            None,
            properties:      Map::new(),
            links:           Vec::new(),
            assets:          BTreeMap::new(),
            collection:      None,
        }
    }

    /// Plain JSON object form of the item
    pub fn into_map(self) -> Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(Error::Serialization(format!("item is not a JSON object: {other}"))),
        }
    }
}

/// Link from an item to a related document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// Relation type, e.g. `collection`
    pub rel:        String,
    /// Target URL
    pub href:       String,
    /// Target media type
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

impl Link {
    /// Untyped link
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel:        rel.into(),
            href:       href.into(),
            media_type: None,
        }
    }

    /// Mark the target as `application/json`
    #[must_use]
    pub fn json(mut self) -> Self {
        self.media_type = Some("application/json".to_string());
        self
    }
}

/// Data file referenced by an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Location of the file
    pub href:              String,
    /// Media type of the file
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type:        Option<String>,
    /// Semantic roles, e.g. `data`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles:             Option<Vec<String>>,
    /// Extension fields such as `raster:bands` and `eo:bands`
    #[serde(flatten)]
    pub additional_fields: Map<String, Value>,
}

/// Normalized arguments handed to an [`ItemSynthesizer`](super::ItemSynthesizer).
///
/// `properties` already holds `start_datetime`/`end_datetime` when a range was
/// requested, in which case `input_datetime` is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRequest {
    /// Source resolved by the path dependency
    pub path:             String,
    /// Requested instant
    pub input_datetime:   Option<DateTime<Utc>>,
    /// Extra extension schema URLs
    pub extensions:       Option<Vec<String>>,
    /// Collection ID
    pub collection:       Option<String>,
    /// Collection URL, linked as `rel=collection`
    pub collection_url:   Option<String>,
    /// Initial item properties
    pub properties:       Map<String, Value>,
    /// Item ID; the synthesizer picks one when `None`
    pub id:               Option<String>,
    /// Key of the asset in `assets`
    pub asset_name:       String,
    /// Asset roles
    pub asset_roles:      Option<Vec<String>>,
    /// Asset media type, or `Auto` to detect it
    pub asset_media_type: AssetMediaType,
    /// Asset href, the resolved source when none was given
    pub asset_href:       String,
    /// Add projection properties
    pub with_proj:        bool,
    /// Add `raster:bands`
    pub with_raster:      bool,
    /// Add `eo:bands`
    pub with_eo:          bool,
    /// Longest side of the level used for statistics
    pub raster_max_size:  NonZeroU32,
}
