//! Minimal TIFF / BigTIFF directory reader.
//!
//! Only the header and the IFD chain are decoded: tag values are read eagerly,
//! pixel data is never touched. IFD offsets are kept because the COG layout rules
//! are expressed in terms of where directories and blocks sit in the file.

use std::collections::{BTreeMap, HashSet};

use byteorder::{BigEndian, ByteOrder as _, LittleEndian};

use super::tags::{
    BIG_TIFF_MAGIC, CLASSIC_TIFF_MAGIC, SUBFILE_MASK, SUBFILE_REDUCED_IMAGE, TAG_BITS_PER_SAMPLE,
    TAG_COMPRESSION, TAG_IMAGE_LENGTH, TAG_IMAGE_WIDTH, TAG_NEW_SUBFILE_TYPE,
    TAG_PHOTOMETRIC, TAG_PLANAR_CONFIGURATION, TAG_ROWS_PER_STRIP, TAG_SAMPLE_FORMAT,
    TAG_SAMPLES_PER_PIXEL, TAG_STRIP_OFFSETS, TAG_TILE_LENGTH, TAG_TILE_OFFSETS,
    TAG_TILE_WIDTH,
};
use crate::error::{Error, Result};

const MAX_IFDS: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    fn u16(self, buf: &[u8]) -> u16 {
        match self {
            Self::Little => LittleEndian::read_u16(buf),
            Self::Big => BigEndian::read_u16(buf),
        }
    }

    fn u32(self, buf: &[u8]) -> u32 {
        match self {
            Self::Little => LittleEndian::read_u32(buf),
            Self::Big => BigEndian::read_u32(buf),
        }
    }

    fn u64(self, buf: &[u8]) -> u64 {
        match self {
            Self::Little => LittleEndian::read_u64(buf),
            Self::Big => BigEndian::read_u64(buf),
        }
    }

    fn i16(self, buf: &[u8]) -> i16 {
        match self {
            Self::Little => LittleEndian::read_i16(buf),
            Self::Big => BigEndian::read_i16(buf),
        }
    }

    fn i32(self, buf: &[u8]) -> i32 {
        match self {
            Self::Little => LittleEndian::read_i32(buf),
            Self::Big => BigEndian::read_i32(buf),
        }
    }

    fn i64(self, buf: &[u8]) -> i64 {
        match self {
            Self::Little => LittleEndian::read_i64(buf),
            Self::Big => BigEndian::read_i64(buf),
        }
    }

    fn f32(self, buf: &[u8]) -> f32 {
        match self {
            Self::Little => LittleEndian::read_f32(buf),
            Self::Big => BigEndian::read_f32(buf),
        }
    }

    fn f64(self, buf: &[u8]) -> f64 {
        match self {
            Self::Little => LittleEndian::read_f64(buf),
            Self::Big => BigEndian::read_f64(buf),
        }
    }
}

/// Decoded value of one directory entry
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Unsigned(Vec<u64>),
    Signed(Vec<i64>),
    Float(Vec<f64>),
    Ascii(String),
    Undefined(Vec<u8>),
}

/// One image file directory
#[derive(Debug, Clone)]
pub struct Ifd {
    /// Byte offset of the directory in the file
    pub offset:  u64,
    pub entries: BTreeMap<u16, TagValue>,
}

impl Ifd {
    pub fn get(&self, tag: u16) -> Option<&TagValue> {
        self.entries.get(&tag)
    }

    pub fn get_u64_vec(&self, tag: u16) -> Option<Vec<u64>> {
        match self.get(tag)? {
            TagValue::Unsigned(values) => Some(values.clone()),
            TagValue::Signed(values) => values.iter().map(|v| u64::try_from(*v).ok()).collect(),
            TagValue::Undefined(bytes) => Some(bytes.iter().map(|b| u64::from(*b)).collect()),
            TagValue::Float(_) | TagValue::Ascii(_) => None,
        }
    }

    pub fn get_u64(&self, tag: u16) -> Option<u64> {
        self.get_u64_vec(tag)?.first().copied()
    }

    pub fn get_u16_vec(&self, tag: u16) -> Option<Vec<u16>> {
        self.get_u64_vec(tag)?
            .into_iter()
            .map(|v| u16::try_from(v).ok())
            .collect()
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn get_f64_vec(&self, tag: u16) -> Option<Vec<f64>> {
        match self.get(tag)? {
            TagValue::Float(values) => Some(values.clone()),
            TagValue::Unsigned(values) => Some(values.iter().map(|v| *v as f64).collect()),
            TagValue::Signed(values) => Some(values.iter().map(|v| *v as f64).collect()),
            TagValue::Ascii(_) | TagValue::Undefined(_) => None,
        }
    }

    pub fn get_ascii(&self, tag: u16) -> Option<&str> {
        match self.get(tag)? {
            TagValue::Ascii(text) => Some(text.as_str()),
            _ => None,
        }
    }

    fn required_u64(&self, tag: u16, name: &str) -> Result<u64> {
        self.get_u64(tag).ok_or_else(|| {
            Error::InvalidRaster(format!("IFD at byte {} has no {name} tag", self.offset))
        })
    }

    pub fn width(&self) -> Result<u64> {
        self.required_u64(TAG_IMAGE_WIDTH, "ImageWidth")
    }

    pub fn height(&self) -> Result<u64> {
        self.required_u64(TAG_IMAGE_LENGTH, "ImageLength")
    }

    pub fn subfile_type(&self) -> u64 {
        self.get_u64(TAG_NEW_SUBFILE_TYPE).unwrap_or(0)
    }

    pub fn is_reduced_resolution(&self) -> bool {
        self.subfile_type() & SUBFILE_REDUCED_IMAGE != 0
    }

    pub fn is_mask(&self) -> bool {
        self.subfile_type() & SUBFILE_MASK != 0
    }

    pub fn is_tiled(&self) -> bool {
        self.get(TAG_TILE_WIDTH).is_some()
    }

    /// Block (tile or strip) dimensions as `(width, height)`
    pub fn block_size(&self) -> Result<(u64, u64)> {
        if self.is_tiled() {
            let width = self.required_u64(TAG_TILE_WIDTH, "TileWidth")?;
            let height = self.required_u64(TAG_TILE_LENGTH, "TileLength")?;
            Ok((width, height))
        } else {
            let width = self.width()?;
            let height = self.height()?;
            let rows = self
                .get_u64(TAG_ROWS_PER_STRIP)
                .map_or(height, |rows| rows.min(height));
            Ok((width, rows))
        }
    }

    /// Offsets of every data block, tiles or strips
    pub fn block_offsets(&self) -> Option<Vec<u64>> {
        if self.is_tiled() {
            self.get_u64_vec(TAG_TILE_OFFSETS)
        } else {
            self.get_u64_vec(TAG_STRIP_OFFSETS)
        }
    }

    /// Offset of the first block, when it exists and is non-zero
    pub fn first_block_offset(&self) -> Option<u64> {
        self.block_offsets()?.first().copied().filter(|offset| *offset != 0)
    }

    pub fn samples_per_pixel(&self) -> u64 {
        self.get_u64(TAG_SAMPLES_PER_PIXEL).unwrap_or(1)
    }

    pub fn compression(&self) -> u64 {
        self.get_u64(TAG_COMPRESSION).unwrap_or(1)
    }

    pub fn photometric(&self) -> Option<u64> {
        self.get_u64(TAG_PHOTOMETRIC)
    }

    pub fn planar_configuration(&self) -> u64 {
        self.get_u64(TAG_PLANAR_CONFIGURATION).unwrap_or(1)
    }

    /// numpy-style data type name of the first sample
    pub fn dtype(&self) -> Option<&'static str> {
        let bits = self.get_u64(TAG_BITS_PER_SAMPLE).unwrap_or(1);
        let format = self.get_u64(TAG_SAMPLE_FORMAT).unwrap_or(1);
        match (format, bits) {
            (1, 8) => Some("uint8"),
            (1, 16) => Some("uint16"),
            (1, 32) => Some("uint32"),
            (1, 64) => Some("uint64"),
            (2, 8) => Some("int8"),
            (2, 16) => Some("int16"),
            (2, 32) => Some("int32"),
            (2, 64) => Some("int64"),
            (3, 16) => Some("float16"),
            (3, 32) => Some("float32"),
            (3, 64) => Some("float64"),
            _ => None,
        }
    }
}

/// Parsed TIFF header plus its whole directory chain
#[derive(Debug, Clone)]
pub struct TiffFile {
    pub endian:   Endian,
    pub big_tiff: bool,
    /// Every IFD, in chain order
    pub ifds:     Vec<Ifd>,
}

impl TiffFile {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let header = slice(data, 0, 8)?;
        let endian = match &header[0..2] {
            b"II" => Endian::Little,
            b"MM" => Endian::Big,
            _ => return Err(Error::InvalidRaster("not a TIFF file".to_string())),
        };

        let magic = endian.u16(&header[2..4]);
        let (big_tiff, first_offset) = match magic {
            CLASSIC_TIFF_MAGIC => (false, u64::from(endian.u32(&header[4..8]))),
            BIG_TIFF_MAGIC => {
                let header = slice(data, 0, 16)?;
                if endian.u16(&header[4..6]) != 8 {
                    return Err(Error::UnsupportedRaster(
                        "BigTIFF with offset size other than 8".to_string(),
                    ));
                }
                (true, endian.u64(&header[8..16]))
            }
            other => {
                return Err(Error::InvalidRaster(format!("unknown TIFF version {other}")));
            }
        };

        let reader = DirectoryReader {
            data,
            endian,
            big_tiff,
        };

        let mut ifds = Vec::new();
        let mut seen = HashSet::new();
        let mut next = first_offset;
        while next != 0 {
            if !seen.insert(next) {
                return Err(Error::InvalidRaster(format!("IFD chain loops back to byte {next}")));
            }
            if ifds.len() >= MAX_IFDS {
                return Err(Error::UnsupportedRaster(format!("more than {MAX_IFDS} IFDs")));
            }
            let (ifd, following) = reader.read_ifd(next)?;
            ifds.push(ifd);
            next = following;
        }

        if ifds.is_empty() {
            return Err(Error::InvalidRaster("TIFF file has no image directory".to_string()));
        }

        Ok(Self {
            endian,
            big_tiff,
            ifds,
        })
    }

    /// Full resolution image (first directory)
    pub fn main_image(&self) -> &Ifd {
        &self.ifds[0]
    }

    /// Reduced resolution images, paired with their index in the IFD chain
    pub fn overviews(&self) -> Vec<(usize, &Ifd)> {
        self.ifds
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, ifd)| ifd.is_reduced_resolution() && !ifd.is_mask())
            .collect()
    }

    /// Main image followed by its overviews, each paired with its IFD chain index
    pub fn levels(&self) -> Vec<(usize, &Ifd)> {
        std::iter::once((0, self.main_image()))
            .chain(self.overviews())
            .collect()
    }

    pub fn has_internal_mask(&self) -> bool {
        self.ifds.iter().any(Ifd::is_mask)
    }
}

struct DirectoryReader<'a> {
    data:     &'a [u8],
    endian:   Endian,
    big_tiff: bool,
}

impl DirectoryReader<'_> {
    fn read_ifd(&self, offset: u64) -> Result<(Ifd, u64)> {
        let (count_size, entry_size, next_size) = if self.big_tiff {
            (8, 20, 8)
        } else {
            (2, 12, 4)
        };

        let count_bytes = slice(self.data, offset, count_size)?;
        let count = if self.big_tiff {
            self.endian.u64(count_bytes)
        } else {
            u64::from(self.endian.u16(count_bytes))
        };

        let entries_start = offset + count_size;
        let mut entries = BTreeMap::new();
        for index in 0..count {
            let raw = slice(self.data, entries_start + index * entry_size, entry_size)?;
            if let Some((tag, value)) = self.read_entry(raw)? {
                entries.insert(tag, value);
            }
        }

        let next_bytes = slice(self.data, entries_start + count * entry_size, next_size)?;
        let next = if self.big_tiff {
            self.endian.u64(next_bytes)
        } else {
            u64::from(self.endian.u32(next_bytes))
        };

        Ok((Ifd { offset, entries }, next))
    }

    fn read_entry(&self, raw: &[u8]) -> Result<Option<(u16, TagValue)>> {
        let tag = self.endian.u16(&raw[0..2]);
        let field_type = self.endian.u16(&raw[2..4]);
        let (count, field) = if self.big_tiff {
            (self.endian.u64(&raw[4..12]), &raw[12..20])
        } else {
            (u64::from(self.endian.u32(&raw[4..8])), &raw[8..12])
        };

        let Some(size) = type_size(field_type) else {
            tracing::debug!(tag, field_type, "Skipping entry with unknown field type");
            return Ok(None);
        };

        let total = count
            .checked_mul(size)
            .ok_or_else(|| Error::InvalidRaster(format!("tag {tag} value size overflows")))?;
        let bytes = if total <= field.len() as u64 {
            &field[..usize::try_from(total).unwrap_or(0)]
        } else {
            let value_offset = if self.big_tiff {
                self.endian.u64(field)
            } else {
                u64::from(self.endian.u32(field))
            };
            slice(self.data, value_offset, total)?
        };

        Ok(Some((tag, self.decode(field_type, bytes, size))))
    }

    fn decode(&self, field_type: u16, bytes: &[u8], size: u64) -> TagValue {
        let step = usize::try_from(size).unwrap_or(1);
        let chunks = bytes.chunks_exact(step);
        let e = self.endian;
        match field_type {
            1 => TagValue::Unsigned(bytes.iter().map(|b| u64::from(*b)).collect()),
            2 => TagValue::Ascii(
                String::from_utf8_lossy(bytes)
                    .trim_end_matches('\0')
                    .to_string(),
            ),
            3 => TagValue::Unsigned(chunks.map(|c| u64::from(e.u16(c))).collect()),
            4 | 13 => TagValue::Unsigned(chunks.map(|c| u64::from(e.u32(c))).collect()),
            16 | 18 => TagValue::Unsigned(chunks.map(|c| e.u64(c)).collect()),
            6 => TagValue::Signed(bytes.iter().map(|b| i64::from(i8::from_ne_bytes([*b]))).collect()),
            8 => TagValue::Signed(chunks.map(|c| i64::from(e.i16(c))).collect()),
            9 => TagValue::Signed(chunks.map(|c| i64::from(e.i32(c))).collect()),
            17 => TagValue::Signed(chunks.map(|c| e.i64(c)).collect()),
            5 => TagValue::Float(
                chunks
                    .map(|c| ratio(f64::from(e.u32(&c[0..4])), f64::from(e.u32(&c[4..8]))))
                    .collect(),
            ),
            10 => TagValue::Float(
                chunks
                    .map(|c| ratio(f64::from(e.i32(&c[0..4])), f64::from(e.i32(&c[4..8]))))
                    .collect(),
            ),
            11 => TagValue::Float(chunks.map(|c| f64::from(e.f32(c))).collect()),
            12 => TagValue::Float(chunks.map(|c| e.f64(c)).collect()),
            _ => TagValue::Undefined(bytes.to_vec()),
        }
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

const fn type_size(field_type: u16) -> Option<u64> {
    match field_type {
        1 | 2 | 6 | 7 => Some(1),
        3 | 8 => Some(2),
        4 | 9 | 11 | 13 => Some(4),
        5 | 10 | 12 | 16 | 17 | 18 => Some(8),
        _ => None,
    }
}

fn slice(data: &[u8], offset: u64, len: u64) -> Result<&[u8]> {
    let start = usize::try_from(offset).ok();
    let end = offset
        .checked_add(len)
        .and_then(|end| usize::try_from(end).ok());
    match (start, end) {
        (Some(start), Some(end)) if end <= data.len() => Ok(&data[start..end]),
        _ => Err(Error::InvalidRaster(format!(
            "truncated file: {len} bytes at offset {offset} are past the end ({} bytes)",
            data.len()
        ))),
    }
}
