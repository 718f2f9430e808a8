//! GeoTIFF georeferencing: affine transform, CRS code, nodata and acquisition time.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};

use super::ifd::Ifd;
use super::tags::{
    GEOKEY_GEOGRAPHIC_TYPE, GEOKEY_MODEL_TYPE, GEOKEY_PROJECTED_CS_TYPE, GEOKEY_RASTER_TYPE,
    GEOKEY_USER_DEFINED, MODEL_TYPE_GEOGRAPHIC, MODEL_TYPE_PROJECTED, RASTER_PIXEL_IS_POINT,
    TAG_DATETIME, TAG_GDAL_NODATA, TAG_GEO_KEY_DIRECTORY, TAG_MODEL_PIXEL_SCALE,
    TAG_MODEL_TIEPOINT, TAG_MODEL_TRANSFORMATION,
};

/// Affine pixel-to-model transform.
///
/// `x = a * col + b * row + c`, `y = d * col + e * row + f`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl GeoTransform {
    /// Read ModelTransformation, or ModelTiepoint + ModelPixelScale
    pub fn from_ifd(ifd: &Ifd) -> Option<Self> {
        let matrix = ifd
            .get_f64_vec(TAG_MODEL_TRANSFORMATION)
            .filter(|m| m.len() >= 8);
        if let Some(m) = matrix {
            return Some(Self {
                a: m[0],
                b: m[1],
                c: m[3],
                d: m[4],
                e: m[5],
                f: m[7],
            });
        }

        let tie = ifd.get_f64_vec(TAG_MODEL_TIEPOINT)?;
        let scale = ifd.get_f64_vec(TAG_MODEL_PIXEL_SCALE)?;
        if tie.len() < 6 || scale.len() < 2 {
            return None;
        }

        Some(Self {
            a: scale[0],
            b: 0.0,
            c: scale[0].mul_add(-tie[0], tie[3]),
            d: 0.0,
            e: -scale[1],
            f: scale[1].mul_add(tie[1], tie[4]),
        })
    }

    /// Shift the origin half a pixel up-left (PixelIsPoint rasters)
    #[must_use]
    pub fn to_pixel_corner(self) -> Self {
        Self {
            c: self.c - 0.5 * self.a - 0.5 * self.b,
            f: self.f - 0.5 * self.d - 0.5 * self.e,
            ..self
        }
    }

    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.a.mul_add(col, self.b.mul_add(row, self.c)),
            self.d.mul_add(col, self.e.mul_add(row, self.f)),
        )
    }

    /// `[minx, miny, maxx, maxy]` of a `width` x `height` raster
    #[allow(clippy::cast_precision_loss)]
    pub fn bounds(&self, width: u64, height: u64) -> [f64; 4] {
        let (w, h) = (width as f64, height as f64);
        let corners = [
            self.apply(0.0, 0.0),
            self.apply(w, 0.0),
            self.apply(w, h),
            self.apply(0.0, h),
        ];
        corners.iter().fold(
            [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY],
            |[minx, miny, maxx, maxy], (x, y)| [minx.min(*x), miny.min(*y), maxx.max(*x), maxy.max(*y)],
        )
    }

    pub const fn origin(&self) -> (f64, f64) {
        (self.c, self.f)
    }

    pub const fn resolution(&self) -> (f64, f64) {
        (self.a, self.e)
    }

    /// Full 3x3 affine, row-major, as used by `proj:transform`
    pub fn to_affine(&self) -> [f64; 9] {
        [self.a, self.b, self.c, self.d, self.e, self.f, 0.0, 0.0, 1.0]
    }
}

/// Georeferencing of the full resolution image
#[derive(Debug, Clone, Default)]
pub struct GeoInfo {
    pub epsg:           Option<u32>,
    pub transform:      Option<GeoTransform>,
    pub pixel_is_point: bool,
    pub nodata:         Option<f64>,
    pub datetime:       Option<DateTime<Utc>>,
}

impl GeoInfo {
    pub fn from_ifd(ifd: &Ifd) -> Self {
        let keys = geo_keys(ifd);
        let pixel_is_point = keys.get(&GEOKEY_RASTER_TYPE) == Some(&RASTER_PIXEL_IS_POINT);

        let transform = GeoTransform::from_ifd(ifd).map(|t| {
            if pixel_is_point {
                t.to_pixel_corner()
            } else {
                t
            }
        });

        Self {
            epsg: epsg_from_keys(&keys),
            transform,
            pixel_is_point,
            nodata: ifd.get_ascii(TAG_GDAL_NODATA).and_then(parse_nodata),
            datetime: ifd.get_ascii(TAG_DATETIME).and_then(parse_tiff_datetime),
        }
    }

    pub fn crs(&self) -> Option<String> {
        self.epsg.map(|code| format!("EPSG:{code}"))
    }
}

/// Short-valued GeoKeys stored inline in the key directory
fn geo_keys(ifd: &Ifd) -> HashMap<u16, u16> {
    let Some(directory) = ifd.get_u16_vec(TAG_GEO_KEY_DIRECTORY) else {
        return HashMap::new();
    };
    if directory.len() < 4 {
        return HashMap::new();
    }

    directory[4..]
        .chunks_exact(4)
        .take(usize::from(directory[3]))
        .filter(|key| key[1] == 0)
        .map(|key| (key[0], key[3]))
        .collect()
}

fn epsg_from_keys(keys: &HashMap<u16, u16>) -> Option<u32> {
    let projected = keys.get(&GEOKEY_PROJECTED_CS_TYPE).copied();
    let geographic = keys.get(&GEOKEY_GEOGRAPHIC_TYPE).copied();
    let code = match keys.get(&GEOKEY_MODEL_TYPE).copied() {
        Some(MODEL_TYPE_PROJECTED) => projected,
        Some(MODEL_TYPE_GEOGRAPHIC) => geographic,
        _ => projected.or(geographic),
    }?;

    (code != 0 && code != GEOKEY_USER_DEFINED).then_some(u32::from(code))
}

fn parse_nodata(raw: &str) -> Option<f64> {
    raw.trim().parse().ok()
}

/// TIFF DateTime tag: `YYYY:MM:DD HH:MM:SS`
fn parse_tiff_datetime(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw.trim(), "%Y:%m:%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::collections::BTreeMap;

    use super::*;
    use crate::raster::ifd::TagValue;

    fn ifd(entries: Vec<(u16, TagValue)>) -> Ifd {
        Ifd {
            offset:  8,
            entries: entries.into_iter().collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn tiepoint_and_scale_give_north_up_transform() {
        let ifd = ifd(vec![
            (TAG_MODEL_PIXEL_SCALE, TagValue::Float(vec![0.5, 0.25, 0.0])),
            (
                TAG_MODEL_TIEPOINT,
                TagValue::Float(vec![0.0, 0.0, 0.0, 10.0, 50.0, 0.0]),
            ),
        ]);
        let t = GeoTransform::from_ifd(&ifd).unwrap();
        assert_eq!(t.origin(), (10.0, 50.0));
        assert_eq!(t.resolution(), (0.5, -0.25));
        assert_eq!(t.bounds(4, 8), [10.0, 48.0, 12.0, 50.0]);
    }

    #[test]
    fn epsg_follows_model_type() {
        let ifd = ifd(vec![(
            TAG_GEO_KEY_DIRECTORY,
            TagValue::Unsigned(vec![
                1, 1, 0, 3, //
                1024, 0, 1, 1, //
                2048, 0, 1, 4326, //
                3072, 0, 1, 32633,
            ]),
        )]);
        let geo = GeoInfo::from_ifd(&ifd);
        assert_eq!(geo.epsg, Some(32633));
        assert_eq!(geo.crs().as_deref(), Some("EPSG:32633"));
    }

    #[test]
    fn user_defined_crs_is_unknown() {
        let keys = HashMap::from([(GEOKEY_MODEL_TYPE, 2), (GEOKEY_GEOGRAPHIC_TYPE, 32767)]);
        assert_eq!(epsg_from_keys(&keys), None);
    }

    #[test]
    fn nodata_and_datetime_tags() {
        let ifd = ifd(vec![
            (TAG_GDAL_NODATA, TagValue::Ascii("-9999 ".to_string())),
            (TAG_DATETIME, TagValue::Ascii("2021:03:04 05:06:07".to_string())),
        ]);
        let geo = GeoInfo::from_ifd(&ifd);
        assert_eq!(geo.nodata, Some(-9999.0));
        assert_eq!(
            geo.datetime.map(|dt| dt.to_rfc3339()),
            Some("2021-03-04T05:06:07+00:00".to_string())
        );
        assert!(geo.transform.is_none());
    }

    #[test]
    fn pixel_is_point_shifts_origin() {
        let t = GeoTransform {
            a: 2.0,
            b: 0.0,
            c: 100.0,
            d: 0.0,
            e: -2.0,
            f: 200.0,
        };
        assert_eq!(t.to_pixel_corner().origin(), (99.0, 201.0));
    }
}
