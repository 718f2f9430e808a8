// This file contains constants shared by the factory and the extensions.
// Raster-format constants (TIFF tags, GeoKeys) live in src/raster/tags.rs

// ============================================================================
// ROUTES
// ============================================================================

pub const ROUTE_VALIDATE: &str = "/validate";
pub const ROUTE_STAC: &str = "/stac";

pub const ROUTE_NAME_VALIDATE: &str = "Validate a COG";
pub const ROUTE_NAME_STAC: &str = "Create STAC Item";

pub const RESPONSE_INFO: &str = "Info";
pub const RESPONSE_ITEM: &str = "Item";

// ============================================================================
// PARAMETER NAMES
// ============================================================================

pub const PARAM_URL: &str = "url";
pub const PARAM_STRICT: &str = "strict";
pub const PARAM_DATETIME: &str = "datetime";
pub const PARAM_EXTENSIONS: &str = "extensions";
pub const PARAM_COLLECTION: &str = "collection";
pub const PARAM_COLLECTION_URL: &str = "collection_url";
pub const PARAM_ID: &str = "id";
pub const PARAM_ASSET_NAME: &str = "asset_name";
pub const PARAM_ASSET_ROLES: &str = "asset_roles";
pub const PARAM_ASSET_MEDIA_TYPE: &str = "asset_media_type";
pub const PARAM_ASSET_HREF: &str = "asset_href";
pub const PARAM_WITH_PROJ: &str = "with_proj";
pub const PARAM_WITH_RASTER: &str = "with_raster";
pub const PARAM_WITH_EO: &str = "with_eo";
pub const PARAM_MAX_SIZE: &str = "max_size";

// ============================================================================
// PARAMETER DESCRIPTIONS
// ============================================================================

pub const DESC_URL: &str = "Dataset URL";
pub const DESC_STRICT: &str = "Treat warnings as errors";
pub const DESC_DATETIME: &str =
    "The date and time of the assets, in UTC (e.g 2020-01-01, 2020-01-01T01:01:01).";
pub const DESC_EXTENSIONS: &str = "STAC extension URL the Item implements.";
pub const DESC_COLLECTION: &str = "The Collection ID that this item belongs to.";
pub const DESC_COLLECTION_URL: &str = "Link to the STAC Collection.";
pub const DESC_ID: &str = "Id to assign to the item (default to the source basename).";
pub const DESC_ASSET_NAME: &str = "asset name for the source (default to 'data').";
pub const DESC_ASSET_ROLES: &str = "list of asset's roles.";
pub const DESC_ASSET_MEDIA_TYPE: &str = "Asset's media type";
pub const DESC_ASSET_HREF: &str = "Asset's URI (default to source's path)";
pub const DESC_WITH_PROJ: &str = "Add the `projection` extension and properties.";
pub const DESC_WITH_RASTER: &str = "Add the `raster` extension and properties.";
pub const DESC_WITH_EO: &str = "Add the `eo` extension and properties.";
pub const DESC_MAX_SIZE: &str = "Limit array size from which to get the raster statistics.";

// ============================================================================
// DEFAULTS
// ============================================================================

pub const DEFAULT_PREFIX: &str = "/cog";
pub const DEFAULT_ASSET_NAME: &str = "data";
pub const DEFAULT_MAX_SIZE: u32 = 1024;
pub const DEFAULT_MAX_SOURCE_BYTES: u64 = 1 << 30;

// Optional capability names, as reported by MissingDependency
pub const DEPENDENCY_COGEO: &str = "cogeo";
pub const DEPENDENCY_STAC: &str = "stac";
