//! Query parameters of `/stac`.

use std::num::NonZeroU32;

use super::datetime::{TemporalProperties, parse_temporal};
use super::item::ItemRequest;
use super::media_type::{AUTO, AssetMediaType, MediaType};
use crate::constants::{
    DEFAULT_ASSET_NAME, DEFAULT_MAX_SIZE, DESC_ASSET_HREF, DESC_ASSET_MEDIA_TYPE, DESC_ASSET_NAME,
    DESC_ASSET_ROLES, DESC_COLLECTION, DESC_COLLECTION_URL, DESC_DATETIME, DESC_EXTENSIONS,
    DESC_ID, DESC_MAX_SIZE, DESC_WITH_EO, DESC_WITH_PROJ, DESC_WITH_RASTER, PARAM_ASSET_HREF,
    PARAM_ASSET_MEDIA_TYPE, PARAM_ASSET_NAME, PARAM_ASSET_ROLES, PARAM_COLLECTION,
    PARAM_COLLECTION_URL, PARAM_DATETIME, PARAM_EXTENSIONS, PARAM_ID, PARAM_MAX_SIZE,
    PARAM_WITH_EO, PARAM_WITH_PROJ, PARAM_WITH_RASTER,
};
use crate::error::{Error, Result};
use crate::factory::PathDependency;
use crate::support::params::{
    extract_optional_bool, extract_optional_positive_u32, extract_optional_string,
    extract_optional_string_array, extract_string_or,
};
use crate::support::{ParamDef, ParamType, QueryParams};

/// Validated query of one `/stac` request
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogItemParams {
    /// `url`, resolved by the path dependency
    pub source_path:      String,
    /// `datetime`
    pub datetime:         Option<TemporalProperties>,
    /// `extensions`, repeatable
    pub extensions:       Option<Vec<String>>,
    /// `collection`
    pub collection:       Option<String>,
    /// `collection_url`
    pub collection_url:   Option<String>,
    /// `id`
    pub id:               Option<String>,
    /// `asset_name`, `data` by default
    pub asset_name:       String,
    /// `asset_roles`, repeatable
    pub asset_roles:      Option<Vec<String>>,
    /// `asset_media_type`, `auto` by default
    pub asset_media_type: AssetMediaType,
    /// `asset_href`
    pub asset_href:       Option<String>,
    /// `with_proj`
    pub with_proj:        bool,
    /// `with_raster`
    pub with_raster:      bool,
    /// `with_eo`
    pub with_eo:          bool,
    /// `max_size`
    pub max_size:         NonZeroU32,
}

impl CatalogItemParams {
    /// Extract and check every parameter. Any failure here is a client input error.
    pub fn from_query(params: &QueryParams, path_dependency: &dyn PathDependency) -> Result<Self> {
        let source_path = path_dependency.resolve(params)?;

        let datetime = parse_temporal(params.get(PARAM_DATETIME))?;
        let asset_media_type = AssetMediaType::parse(
            extract_string_or(params, PARAM_ASSET_MEDIA_TYPE, AUTO),
            PARAM_ASSET_MEDIA_TYPE,
        )?;
        let max_size = extract_optional_positive_u32(params, PARAM_MAX_SIZE, default_max_size()?)?;

        Ok(Self {
            source_path,
            datetime,
            extensions: extract_optional_string_array(params, PARAM_EXTENSIONS),
            collection: extract_optional_string(params, PARAM_COLLECTION),
            collection_url: extract_optional_string(params, PARAM_COLLECTION_URL),
            id: extract_optional_string(params, PARAM_ID),
            asset_name: extract_string_or(params, PARAM_ASSET_NAME, DEFAULT_ASSET_NAME).to_string(),
            asset_roles: extract_optional_string_array(params, PARAM_ASSET_ROLES),
            asset_media_type,
            asset_href: extract_optional_string(params, PARAM_ASSET_HREF),
            with_proj: extract_optional_bool(params, PARAM_WITH_PROJ, true)?,
            with_raster: extract_optional_bool(params, PARAM_WITH_RASTER, true)?,
            with_eo: extract_optional_bool(params, PARAM_WITH_EO, true)?,
            max_size,
        })
    }

    /// Arguments for the synthesizer. The asset href falls back to the resolved source.
    pub fn into_item_request(self) -> ItemRequest {
        let properties = self
            .datetime
            .map(|temporal| temporal.properties())
            .unwrap_or_default();

        ItemRequest {
            input_datetime: self.datetime.and_then(|temporal| temporal.instant()),
            asset_href: self.asset_href.unwrap_or_else(|| self.source_path.clone()),
            path: self.source_path,
            extensions: self.extensions,
            collection: self.collection,
            collection_url: self.collection_url,
            properties,
            id: self.id,
            asset_name: self.asset_name,
            asset_roles: self.asset_roles,
            asset_media_type: self.asset_media_type,
            with_proj: self.with_proj,
            with_raster: self.with_raster,
            with_eo: self.with_eo,
            raster_max_size: self.max_size,
        }
    }
}

fn default_max_size() -> Result<NonZeroU32> {
    NonZeroU32::new(DEFAULT_MAX_SIZE)
        .ok_or_else(|| Error::invalid_parameter(PARAM_MAX_SIZE, "default must be greater than 0"))
}

/// Query parameters of `/stac`, excluding those of the path dependency
pub fn stac_params() -> Vec<ParamDef> {
    vec![
        ParamDef::optional(PARAM_DATETIME, DESC_DATETIME, ParamType::String),
        ParamDef::optional(PARAM_EXTENSIONS, DESC_EXTENSIONS, ParamType::StringArray),
        ParamDef::optional(PARAM_COLLECTION, DESC_COLLECTION, ParamType::String),
        ParamDef::optional(PARAM_COLLECTION_URL, DESC_COLLECTION_URL, ParamType::String),
        ParamDef::optional(PARAM_ID, DESC_ID, ParamType::String),
        ParamDef::optional(
            PARAM_ASSET_NAME,
            DESC_ASSET_NAME,
            ParamType::StringWithDefault {
                default: DEFAULT_ASSET_NAME,
            },
        ),
        ParamDef::optional(PARAM_ASSET_ROLES, DESC_ASSET_ROLES, ParamType::StringArray),
        ParamDef::optional(
            PARAM_ASSET_MEDIA_TYPE,
            DESC_ASSET_MEDIA_TYPE,
            ParamType::Enum {
                values:  MediaType::choices(),
                default: AUTO,
            },
        ),
        ParamDef::optional(PARAM_ASSET_HREF, DESC_ASSET_HREF, ParamType::String),
        ParamDef::optional(PARAM_WITH_PROJ, DESC_WITH_PROJ, ParamType::Boolean { default: true }),
        ParamDef::optional(
            PARAM_WITH_RASTER,
            DESC_WITH_RASTER,
            ParamType::Boolean { default: true },
        ),
        ParamDef::optional(PARAM_WITH_EO, DESC_WITH_EO, ParamType::Boolean { default: true }),
        ParamDef::optional(
            PARAM_MAX_SIZE,
            DESC_MAX_SIZE,
            ParamType::PositiveInteger {
                default: DEFAULT_MAX_SIZE,
            },
        ),
    ]
}
