#![allow(dead_code, clippy::unwrap_used)]

//! Hand-built GeoTIFF fixtures.
//!
//! Images are square, single band `uint8`, uncompressed. The left half of every level
//! is 10 and the right half 30, so any level has min 10, max 30, mean 20 and stddev 10.

use std::path::{Path, PathBuf};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

pub const TILE: u32 = 256;

const TYPE_ASCII: u16 = 2;
const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;
const TYPE_DOUBLE: u16 = 12;

struct Entry {
    tag:   u16,
    kind:  u16,
    count: u32,
    data:  Vec<u8>,
}

fn shorts(tag: u16, values: &[u16]) -> Entry {
    Entry {
        tag,
        kind: TYPE_SHORT,
        count: values.len() as u32,
        data: values.iter().flat_map(|v| v.to_le_bytes()).collect(),
    }
}

fn longs(tag: u16, values: &[u32]) -> Entry {
    Entry {
        tag,
        kind: TYPE_LONG,
        count: values.len() as u32,
        data: values.iter().flat_map(|v| v.to_le_bytes()).collect(),
    }
}

fn doubles(tag: u16, values: &[f64]) -> Entry {
    Entry {
        tag,
        kind: TYPE_DOUBLE,
        count: values.len() as u32,
        data: values.iter().flat_map(|v| v.to_le_bytes()).collect(),
    }
}

fn ascii(tag: u16, text: &str) -> Entry {
    let mut data = text.as_bytes().to_vec();
    data.push(0);
    Entry {
        tag,
        kind: TYPE_ASCII,
        count: data.len() as u32,
        data,
    }
}

fn external_len(entry: &Entry) -> u32 {
    if entry.data.len() <= 4 {
        0
    } else {
        (entry.data.len() as u32 + 1) & !1
    }
}

fn ifd_len(entries: &[Entry]) -> u32 {
    2 + 12 * entries.len() as u32 + 4 + entries.iter().map(external_len).sum::<u32>()
}

fn serialize_ifd(entries: &[Entry], at: u32, next: u32) -> Vec<u8> {
    let table_end = at + 2 + 12 * entries.len() as u32 + 4;
    let mut out = Vec::new();
    let mut external = Vec::new();

    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for entry in entries {
        out.extend_from_slice(&entry.tag.to_le_bytes());
        out.extend_from_slice(&entry.kind.to_le_bytes());
        out.extend_from_slice(&entry.count.to_le_bytes());
        if entry.data.len() <= 4 {
            let mut inline = entry.data.clone();
            inline.resize(4, 0);
            out.extend_from_slice(&inline);
        } else {
            out.extend_from_slice(&(table_end + external.len() as u32).to_le_bytes());
            external.extend_from_slice(&entry.data);
            if external.len() % 2 == 1 {
                external.push(0);
            }
        }
    }
    out.extend_from_slice(&next.to_le_bytes());
    out.extend_from_slice(&external);
    out
}

fn put(buffer: &mut Vec<u8>, at: u32, bytes: &[u8]) {
    let start = at as usize;
    if buffer.len() < start + bytes.len() {
        buffer.resize(start + bytes.len(), 0);
    }
    buffer[start..start + bytes.len()].copy_from_slice(bytes);
}

/// Description of a fixture file
#[derive(Debug, Clone)]
pub struct Fixture {
    /// Side of each level, main image first
    pub levels:     Vec<u32>,
    pub tiled:      bool,
    /// IFDs first and imagery smallest level first, as a COG writer lays it out
    pub cog_layout: bool,
    pub epsg:       Option<u16>,
    pub nodata:     Option<&'static str>,
    pub datetime:   Option<&'static str>,
}

impl Fixture {
    /// Tiled COG with overviews halving down to one tile
    pub fn cog(size: u32) -> Self {
        let mut levels = vec![size];
        let mut side = size;
        while side > TILE {
            side /= 2;
            levels.push(side);
        }
        Self {
            levels,
            tiled: true,
            cog_layout: true,
            epsg: Some(4326),
            nodata: None,
            datetime: None,
        }
    }

    /// Tiled, no overviews
    pub fn tiled(size: u32) -> Self {
        Self {
            levels: vec![size],
            ..Self::cog(size)
        }
    }

    /// One strip, no overviews
    pub fn stripped(size: u32) -> Self {
        Self {
            tiled: false,
            ..Self::tiled(size)
        }
    }

    /// Imagery first, IFDs at the end of the file
    pub fn scattered(mut self) -> Self {
        self.cog_layout = false;
        self
    }

    pub fn with_epsg(mut self, epsg: Option<u16>) -> Self {
        self.epsg = epsg;
        self
    }

    pub fn with_nodata(mut self, nodata: &'static str) -> Self {
        self.nodata = Some(nodata);
        self
    }

    /// TIFF `DateTime` tag, `YYYY:MM:DD HH:MM:SS`
    pub fn with_datetime(mut self, datetime: &'static str) -> Self {
        self.datetime = Some(datetime);
        self
    }

    fn blocks(&self, size: u32) -> Vec<Vec<u8>> {
        let pixel = |x: u32| if x < size / 2 { 10u8 } else { 30u8 };
        if !self.tiled {
            let row: Vec<u8> = (0..size).map(pixel).collect();
            return vec![row.repeat(size as usize)];
        }

        let across = size.div_ceil(TILE);
        let mut tiles = Vec::new();
        for tile_row in 0..across {
            for tile_col in 0..across {
                let mut tile = Vec::with_capacity((TILE * TILE) as usize);
                for y in 0..TILE {
                    for x in 0..TILE {
                        let (px, py) = (tile_col * TILE + x, tile_row * TILE + y);
                        tile.push(if px < size && py < size { pixel(px) } else { 0 });
                    }
                }
                tiles.push(tile);
            }
        }
        tiles
    }

    /// Model-space extent: EPSG:4326 spans [-10, 10], anything else [-100000, 100000]
    fn half_extent(&self) -> f64 {
        match self.epsg {
            Some(4326) | None => 10.0,
            Some(_) => 100_000.0,
        }
    }

    fn entries(&self, level: usize, offsets: &[u32], counts: &[u32]) -> Vec<Entry> {
        let size = self.levels[level];
        let mut entries = vec![
            longs(254, &[u32::from(level > 0)]),
            longs(256, &[size]),
            longs(257, &[size]),
            shorts(258, &[8]),
            shorts(259, &[1]),
            shorts(262, &[1]),
            shorts(277, &[1]),
            shorts(284, &[1]),
            shorts(339, &[1]),
        ];

        if self.tiled {
            entries.push(longs(322, &[TILE]));
            entries.push(longs(323, &[TILE]));
            entries.push(longs(324, offsets));
            entries.push(longs(325, counts));
        } else {
            entries.push(longs(273, offsets));
            entries.push(longs(278, &[size]));
            entries.push(longs(279, counts));
        }

        if level == 0 {
            let half = self.half_extent();
            let resolution = 2.0 * half / f64::from(size);
            entries.push(doubles(33550, &[resolution, resolution, 0.0]));
            entries.push(doubles(33922, &[0.0, 0.0, 0.0, -half, half, 0.0]));

            if let Some(epsg) = self.epsg {
                let (model, key) = if epsg == 4326 { (2, 2048) } else { (1, 3072) };
                entries.push(shorts(
                    34735,
                    &[1, 1, 0, 3, 1024, 0, 1, model, 1025, 0, 1, 1, key, 0, 1, epsg],
                ));
            }
            if let Some(datetime) = self.datetime {
                entries.push(ascii(306, datetime));
            }
            if let Some(nodata) = self.nodata {
                entries.push(ascii(42113, nodata));
            }
        }

        entries.sort_by_key(|entry| entry.tag);
        entries
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let blocks: Vec<Vec<Vec<u8>>> = self.levels.iter().map(|size| self.blocks(*size)).collect();
        let counts: Vec<Vec<u32>> = blocks
            .iter()
            .map(|level| level.iter().map(|block| block.len() as u32).collect())
            .collect();
        let sizes: Vec<u32> = (0..self.levels.len())
            .map(|level| ifd_len(&self.entries(level, &vec![0; counts[level].len()], &counts[level])))
            .collect();
        let ifds_len: u32 = sizes.iter().sum();
        let data_len: u32 = counts.iter().flatten().sum();

        let (first_ifd, data_start) = if self.cog_layout {
            (8, 8 + ifds_len)
        } else {
            (8 + data_len, 8)
        };

        let mut ifd_positions = Vec::new();
        let mut cursor = first_ifd;
        for size in &sizes {
            ifd_positions.push(cursor);
            cursor += size;
        }

        // COG imagery goes smallest level first
        let order: Vec<usize> = if self.cog_layout {
            (0..self.levels.len()).rev().collect()
        } else {
            (0..self.levels.len()).collect()
        };
        let mut offsets = vec![Vec::new(); self.levels.len()];
        let mut cursor = data_start;
        for level in order {
            for count in &counts[level] {
                offsets[level].push(cursor);
                cursor += count;
            }
        }

        let mut file = Vec::new();
        put(&mut file, 0, b"II");
        put(&mut file, 2, &42u16.to_le_bytes());
        put(&mut file, 4, &first_ifd.to_le_bytes());

        for level in 0..self.levels.len() {
            let next = ifd_positions.get(level + 1).copied().unwrap_or(0);
            let entries = self.entries(level, &offsets[level], &counts[level]);
            put(&mut file, ifd_positions[level], &serialize_ifd(&entries, ifd_positions[level], next));
            for (block, offset) in blocks[level].iter().zip(&offsets[level]) {
                put(&mut file, *offset, block);
            }
        }
        file
    }

    /// Write the fixture as `name` under `dir`
    pub fn write(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, self.to_bytes()).unwrap();
        path
    }
}

/// `key=value` pairs encoded as a query string
pub fn query(pairs: &[(&str, &str)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// Issue a GET against the router, returning the status and JSON body
pub async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}
