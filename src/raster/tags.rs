// Baseline and extension TIFF tags read by the inspectors
pub const TAG_NEW_SUBFILE_TYPE: u16 = 254;
pub const TAG_IMAGE_WIDTH: u16 = 256;
pub const TAG_IMAGE_LENGTH: u16 = 257;
pub const TAG_BITS_PER_SAMPLE: u16 = 258;
pub const TAG_COMPRESSION: u16 = 259;
pub const TAG_PHOTOMETRIC: u16 = 262;
pub const TAG_STRIP_OFFSETS: u16 = 273;
pub const TAG_SAMPLES_PER_PIXEL: u16 = 277;
pub const TAG_ROWS_PER_STRIP: u16 = 278;
pub const TAG_PLANAR_CONFIGURATION: u16 = 284;
pub const TAG_DATETIME: u16 = 306;
pub const TAG_TILE_WIDTH: u16 = 322;
pub const TAG_TILE_LENGTH: u16 = 323;
pub const TAG_TILE_OFFSETS: u16 = 324;
pub const TAG_SAMPLE_FORMAT: u16 = 339;

// GeoTIFF
pub const TAG_MODEL_PIXEL_SCALE: u16 = 33550;
pub const TAG_MODEL_TIEPOINT: u16 = 33922;
pub const TAG_MODEL_TRANSFORMATION: u16 = 34264;
pub const TAG_GEO_KEY_DIRECTORY: u16 = 34735;

// GDAL private tags
pub const TAG_GDAL_NODATA: u16 = 42113;

// GeoKeys
pub const GEOKEY_MODEL_TYPE: u16 = 1024;
pub const GEOKEY_RASTER_TYPE: u16 = 1025;
pub const GEOKEY_GEOGRAPHIC_TYPE: u16 = 2048;
pub const GEOKEY_PROJECTED_CS_TYPE: u16 = 3072;

pub const MODEL_TYPE_PROJECTED: u16 = 1;
pub const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
pub const RASTER_PIXEL_IS_POINT: u16 = 2;
pub const GEOKEY_USER_DEFINED: u16 = 32767;

// NewSubfileType bits
pub const SUBFILE_REDUCED_IMAGE: u64 = 0x1;
pub const SUBFILE_MASK: u64 = 0x4;

// Header layout
pub const CLASSIC_TIFF_MAGIC: u16 = 42;
pub const BIG_TIFF_MAGIC: u16 = 43;
pub const CLASSIC_HEADER_SIZE: u64 = 8;
pub const BIG_TIFF_HEADER_SIZE: u64 = 16;

/// Name of a TIFF compression code, as reported in the info record
pub const fn compression_name(code: u64) -> Option<&'static str> {
    match code {
        1 => None,
        5 => Some("LZW"),
        6 | 7 => Some("JPEG"),
        8 | 32946 => Some("DEFLATE"),
        32773 => Some("PACKBITS"),
        34887 => Some("LERC"),
        34925 => Some("LZMA"),
        50000 => Some("ZSTD"),
        50001 => Some("WEBP"),
        50002 => Some("JXL"),
        _ => Some("UNKNOWN"),
    }
}

/// Name of a photometric interpretation, as reported in the info record
pub const fn photometric_name(code: u64) -> Option<&'static str> {
    match code {
        0 => Some("MINISWHITE"),
        1 => Some("MINISBLACK"),
        2 => Some("RGB"),
        3 => Some("PALETTE"),
        4 => Some("MASK"),
        5 => Some("CMYK"),
        6 => Some("YCbCr"),
        8 => Some("CIELAB"),
        _ => None,
    }
}
