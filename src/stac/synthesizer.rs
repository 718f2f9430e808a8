//! Item synthesis delegate and its bundled raster implementation.

use super::item::{Item, ItemRequest};
use crate::error::Result;

/// Projection extension schema
pub const PROJECTION_EXTENSION: &str =
    "https://stac-extensions.github.io/projection/v1.1.0/schema.json";
/// Raster extension schema
pub const RASTER_EXTENSION: &str = "https://stac-extensions.github.io/raster/v1.1.0/schema.json";
/// Electro-optical extension schema
pub const EO_EXTENSION: &str = "https://stac-extensions.github.io/eo/v1.1.0/schema.json";

/// Capability behind `/stac`: build a STAC item describing one raster.
///
/// Called on the blocking thread pool, so implementations may do synchronous I/O.
/// Errors are returned to the caller untouched.
pub trait ItemSynthesizer: Send + Sync {
    /// Build the item described by `request`
    fn create_item(&self, request: &ItemRequest) -> Result<Item>;
}

#[cfg(feature = "stac")]
pub use raster_synthesizer::RasterItemSynthesizer;

#[cfg(feature = "stac")]
mod raster_synthesizer {
    use chrono::Utc;
    use serde_json::{Map, Value, json};

    use super::{EO_EXTENSION, ItemSynthesizer, PROJECTION_EXTENSION, RASTER_EXTENSION};
    use crate::error::Result;
    use crate::raster::geo::GeoInfo;
    use crate::raster::ifd::{Ifd, TiffFile};
    use crate::raster::projection::{WGS84, transform_bounds};
    use crate::raster::source::SourceReader;
    use crate::raster::stats::band_statistics;
    use crate::stac::datetime::format_datetime;
    use crate::stac::item::{Asset, Item, ItemRequest, Link};
    use crate::stac::media_type::{AssetMediaType, MediaType};

    /// Item synthesizer working from the TIFF directory chain and GeoTIFF keys
    #[derive(Debug, Clone, Copy, Default)]
    pub struct RasterItemSynthesizer {
        source: SourceReader,
    }

    impl RasterItemSynthesizer {
        /// Synthesizer fetching sources through `source`
        pub const fn new(source: SourceReader) -> Self {
            Self { source }
        }

        /// Build an item from an in-memory file
        pub fn build(request: &ItemRequest, data: &[u8]) -> Result<Item> {
            let tiff = TiffFile::parse(data)?;
            let main = tiff.main_image();
            let geo = GeoInfo::from_ifd(main);
            let width = main.width()?;
            let height = main.height()?;

            let id = request
                .id
                .clone()
                .unwrap_or_else(|| default_id(&request.path));
            let mut item = Item::new(id);
            item.collection.clone_from(&request.collection);
            if let Some(url) = &request.collection_url {
                item.links.push(Link::new("collection", url).json());
            }

            let native_bounds = geo.transform.map(|t| t.bounds(width, height));
            if let Some(bounds) = native_bounds {
                let bbox = match geo.epsg {
                    Some(epsg) => transform_bounds(epsg, WGS84, bounds)?,
                    None => bounds,
                };
                item.bbox = Some(bbox.to_vec());
                item.geometry = Some(bbox_to_polygon(bbox));
            }

            let mut properties = request.properties.clone();
            if !properties.contains_key("start_datetime") {
                let instant = request
                    .input_datetime
                    .or(geo.datetime)
                    .unwrap_or_else(Utc::now);
                properties.insert("datetime".to_string(), format_datetime(&instant).into());
            }

            let mut extensions = request.extensions.clone().unwrap_or_default();

            if request.with_proj {
                properties.insert("proj:epsg".to_string(), json!(geo.epsg));
                properties.insert("proj:shape".to_string(), json!([height, width]));
                if let (Some(bounds), Some(transform)) = (native_bounds, geo.transform) {
                    properties.insert("proj:bbox".to_string(), json!(bounds));
                    properties.insert("proj:geometry".to_string(), bbox_to_polygon(bounds));
                    properties.insert("proj:transform".to_string(), json!(transform.to_affine()));
                }
                extensions.push(PROJECTION_EXTENSION.to_string());
            }

            let mut asset_fields = Map::new();
            let bands = main.samples_per_pixel();

            if request.with_raster {
                let statistics = level_statistics(&tiff, data, request, bands, geo.nodata);
                let raster_bands: Vec<Value> = (0..bands)
                    .map(|band| {
                        let mut entry = Map::new();
                        entry.insert("data_type".to_string(), json!(main.dtype()));
                        let sampling = if geo.pixel_is_point { "point" } else { "area" };
                        entry.insert("sampling".to_string(), sampling.into());
                        if let Some(nodata) = geo.nodata {
                            entry.insert("nodata".to_string(), nodata_value(nodata));
                        }
                        let band_stats = usize::try_from(band)
                            .ok()
                            .and_then(|index| statistics.get(index))
                            .and_then(Option::as_ref);
                        if let Some(stats) = band_stats {
                            entry.insert("statistics".to_string(), json!(stats));
                        }
                        Value::Object(entry)
                    })
                    .collect();
                asset_fields.insert("raster:bands".to_string(), raster_bands.into());
                extensions.push(RASTER_EXTENSION.to_string());
            }

            if request.with_eo {
                let eo_bands: Vec<Value> = (1..=bands)
                    .map(|band| json!({ "name": format!("b{band}") }))
                    .collect();
                asset_fields.insert("eo:bands".to_string(), eo_bands.into());
                extensions.push(EO_EXTENSION.to_string());
            }

            let mut seen = std::collections::HashSet::new();
            extensions.retain(|url| seen.insert(url.clone()));
            item.stac_extensions = extensions;
            item.properties = properties;

            let media_type = match request.asset_media_type {
                AssetMediaType::Known(media) => media,
                AssetMediaType::Auto => detect_media_type(&tiff, &geo),
            };
            item.assets.insert(
                request.asset_name.clone(),
                Asset {
                    href:              request.asset_href.clone(),
                    media_type:        Some(media_type.to_string()),
                    roles:             request.asset_roles.clone(),
                    additional_fields: asset_fields,
                },
            );

            tracing::debug!(
                id = %item.id,
                extensions = item.stac_extensions.len(),
                "Created STAC item"
            );
            Ok(item)
        }
    }

    impl ItemSynthesizer for RasterItemSynthesizer {
        fn create_item(&self, request: &ItemRequest) -> Result<Item> {
            let data = self.source.read(&request.path)?;
            Self::build(request, &data)
        }
    }

    /// Statistics of the level chosen by `raster_max_size`; empty when decoding fails
    fn level_statistics(
        tiff: &TiffFile,
        data: &[u8],
        request: &ItemRequest,
        bands: u64,
        nodata: Option<f64>,
    ) -> Vec<Option<crate::raster::stats::BandStatistics>> {
        let max_size = u64::from(request.raster_max_size.get());
        let Some((index, level)) = statistics_level(tiff, max_size) else {
            return Vec::new();
        };
        let bands = usize::try_from(bands).unwrap_or(1);

        match band_statistics(data, index, bands, nodata) {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!(
                    path = %request.path,
                    ifd_offset = level.offset,
                    error = %e,
                    "Skipping raster statistics"
                );
                Vec::new()
            }
        }
    }

    /// Largest level whose longest side fits `max_size`, else the smallest level
    fn statistics_level(tiff: &TiffFile, max_size: u64) -> Option<(usize, &Ifd)> {
        let levels = tiff.levels();
        let fits = |ifd: &Ifd| match (ifd.width(), ifd.height()) {
            (Ok(w), Ok(h)) => w.max(h) <= max_size,
            _ => false,
        };
        levels
            .iter()
            .find(|&&(_, ifd)| fits(ifd))
            .or_else(|| levels.last())
            .copied()
    }

    fn detect_media_type(tiff: &TiffFile, geo: &GeoInfo) -> MediaType {
        if tiff.main_image().is_tiled() && !tiff.overviews().is_empty() {
            MediaType::Cog
        } else if geo.epsg.is_some() || geo.transform.is_some() {
            MediaType::GeoTiff
        } else {
            MediaType::Tiff
        }
    }

    /// Basename up to its first dot, ignoring any query string
    fn default_id(path: &str) -> String {
        let location = path.split(['?', '#']).next().unwrap_or(path);
        let basename = location.rsplit(['/', '\\']).next().unwrap_or(location);
        basename.split('.').next().unwrap_or(basename).to_string()
    }

    /// JSON can't carry NaN or infinities, so those are written as strings
    fn nodata_value(nodata: f64) -> Value {
        if nodata.is_nan() {
            "nan".into()
        } else if nodata.is_infinite() {
            Value::from(if nodata > 0.0 { "inf" } else { "-inf" })
        } else {
            json!(nodata)
        }
    }

    fn bbox_to_polygon([minx, miny, maxx, maxy]: [f64; 4]) -> Value {
        json!({
            "type": "Polygon",
            "coordinates": [[
                [minx, miny],
                [maxx, miny],
                [maxx, maxy],
                [minx, maxy],
                [minx, miny],
            ]],
        })
    }

}
