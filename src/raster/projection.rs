//! Bounds reprojection with proj4rs and the crs-definitions EPSG database.

use proj4rs::proj::Proj;
use proj4rs::transform::transform;

use crate::error::{Error, Result};

pub const WGS84: u32 = 4326;

/// Points sampled along each edge when reprojecting bounds
const DENSIFY_POINTS: usize = 21;

/// PROJ4 string for an EPSG code
pub fn get_proj_string(epsg: u32) -> Option<&'static str> {
    u16::try_from(epsg)
        .ok()
        .and_then(crs_definitions::from_code)
        .map(|def| def.proj4)
}

/// Check if an EPSG code represents a geographic (lon/lat) CRS
pub fn is_geographic_crs(epsg: u32) -> bool {
    get_proj_string(epsg).map_or_else(
        || epsg == WGS84 || (4000..5000).contains(&epsg),
        |proj| proj.contains("+proj=longlat"),
    )
}

fn load(epsg: u32) -> Result<Proj> {
    let proj_str = get_proj_string(epsg).ok_or_else(|| {
        Error::Projection(format!("EPSG:{epsg} is not in the crs-definitions database"))
    })?;
    Proj::from_proj_string(proj_str)
        .map_err(|e| Error::Projection(format!("Invalid projection EPSG:{epsg}: {e:?}")))
}

/// Reproject `[minx, miny, maxx, maxy]` from `source_epsg` to `target_epsg`.
///
/// Edges are densified so curved edges in the target CRS are enclosed.
pub fn transform_bounds(source_epsg: u32, target_epsg: u32, bounds: [f64; 4]) -> Result<[f64; 4]> {
    if source_epsg == target_epsg {
        return Ok(bounds);
    }

    let source = load(source_epsg)?;
    let target = load(target_epsg)?;
    let source_geographic = is_geographic_crs(source_epsg);
    let target_geographic = is_geographic_crs(target_epsg);

    let mut out = [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY];
    for (x, y) in densified_ring(bounds) {
        // proj4rs works in radians for geographic coordinates
        let mut point = if source_geographic {
            (x.to_radians(), y.to_radians(), 0.0)
        } else {
            (x, y, 0.0)
        };
        transform(&source, &target, &mut point).map_err(|e| {
            Error::Projection(format!(
                "Transform from EPSG:{source_epsg} to EPSG:{target_epsg} failed: {e:?}"
            ))
        })?;
        let (px, py) = if target_geographic {
            (point.0.to_degrees(), point.1.to_degrees())
        } else {
            (point.0, point.1)
        };

        if px.is_finite() && py.is_finite() {
            out = [out[0].min(px), out[1].min(py), out[2].max(px), out[3].max(py)];
        }
    }

    if out.iter().all(|v| v.is_finite()) {
        Ok(out)
    } else {
        Err(Error::Projection(format!(
            "bounds {bounds:?} have no valid point in EPSG:{target_epsg}"
        )))
    }
}

#[allow(clippy::cast_precision_loss)]
fn densified_ring([minx, miny, maxx, maxy]: [f64; 4]) -> Vec<(f64, f64)> {
    let steps = DENSIFY_POINTS + 1;
    let lerp = |a: f64, b: f64, i: usize| (b - a).mul_add(i as f64 / steps as f64, a);

    let mut points = Vec::with_capacity(steps * 4);
    for i in 0..steps {
        points.push((lerp(minx, maxx, i), miny));
        points.push((maxx, lerp(miny, maxy, i)));
        points.push((lerp(maxx, minx, i), maxy));
        points.push((minx, lerp(maxy, miny, i)));
    }
    points
}
