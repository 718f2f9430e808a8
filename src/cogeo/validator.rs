//! Validation delegate and its bundled TIFF implementation.

use super::model::CogInfo;
use crate::error::Result;

/// Capability behind `/validate`: inspect a source and report its COG conformance.
///
/// Called on the blocking thread pool, so implementations may do synchronous I/O.
pub trait CogValidator: Send + Sync {
    /// Validate the raster at `path`; `strict` turns warnings into failures
    fn validate(&self, path: &str, strict: bool) -> Result<CogInfo>;
}

#[cfg(feature = "cogeo")]
pub use tiff_validator::TiffCogValidator;

#[cfg(feature = "cogeo")]
mod tiff_validator {
    use super::CogValidator;
    use crate::cogeo::layout::{check_layout, decimation};
    use crate::cogeo::model::{CogInfo, Geo, IfdInfo, Profile};
    use crate::error::Result;
    use crate::raster::geo::GeoInfo;
    use crate::raster::ifd::TiffFile;
    use crate::raster::source::SourceReader;
    use crate::raster::tags::{compression_name, photometric_name};

    const DRIVER: &str = "GTiff";

    /// Validator reading the TIFF directory chain directly, without decoding imagery
    #[derive(Debug, Clone, Copy, Default)]
    pub struct TiffCogValidator {
        source: SourceReader,
    }

    impl TiffCogValidator {
        /// Validator fetching sources through `source`
        pub const fn new(source: SourceReader) -> Self {
            Self { source }
        }

        /// Validate an in-memory file; `path` is only echoed back in the record
        pub fn inspect(path: &str, data: &[u8], strict: bool) -> Result<CogInfo> {
            let tiff = TiffFile::parse(data)?;
            let report = check_layout(&tiff, data)?;
            let cog = report.is_valid(strict);

            let main = tiff.main_image();
            let geo = GeoInfo::from_ifd(main);
            let width = main.width()?;
            let height = main.height()?;

            let mut ifd = Vec::new();
            for (level, (_, image)) in tiff.levels().into_iter().enumerate() {
                let (block_width, block_height) = image.block_size()?;
                ifd.push(IfdInfo {
                    level,
                    width: image.width()?,
                    height: image.height()?,
                    blocksize: [block_height, block_width],
                    decimation: if level == 0 {
                        0
                    } else {
                        decimation(main, image)?
                    },
                });
            }

            let interleave = if main.planar_configuration() == 2 {
                "BAND"
            } else {
                "PIXEL"
            };

            tracing::debug!(
                path,
                cog,
                errors = report.errors.len(),
                warnings = report.warnings.len(),
                "Validated COG layout"
            );

            Ok(CogInfo {
                path: path.to_string(),
                driver: DRIVER.to_string(),
                cog,
                compression: compression_name(main.compression()).map(String::from),
                color_space: main
                    .photometric()
                    .and_then(photometric_name)
                    .map(String::from),
                errors: report.errors,
                warnings: report.warnings,
                profile: Profile {
                    bands: main.samples_per_pixel(),
                    width,
                    height,
                    tiled: main.is_tiled(),
                    dtype: main.dtype().map(String::from),
                    interleave: interleave.to_string(),
                    internal_mask: tiff.has_internal_mask(),
                    nodata: geo.nodata,
                },
                geo: Geo {
                    crs:          geo.crs(),
                    bounding_box: geo.transform.map(|t| t.bounds(width, height)),
                    origin:       geo.transform.map(|t| {
                        let (x, y) = t.origin();
                        [x, y]
                    }),
                    resolution:   geo.transform.map(|t| {
                        let (x, y) = t.resolution();
                        [x, y]
                    }),
                },
                ifd,
            })
        }
    }

    impl CogValidator for TiffCogValidator {
        fn validate(&self, path: &str, strict: bool) -> Result<CogInfo> {
            let data = self.source.read(path)?;
            Self::inspect(path, &data, strict)
        }
    }
}
