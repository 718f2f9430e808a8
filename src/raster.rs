//! Raster inspection used by the bundled delegates.
//!
//! Everything here works on a whole file held in memory. [`source::SourceReader`]
//! fetches the bytes up to a size limit, `ifd::TiffFile` walks the directory chain,
//! and `geo` reads the georeferencing of the full resolution image.

pub(crate) mod geo;
pub(crate) mod ifd;
#[cfg(feature = "stac")]
pub(crate) mod projection;
pub mod source;
#[cfg(feature = "stac")]
pub(crate) mod stats;
pub(crate) mod tags;
