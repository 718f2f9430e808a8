//! Per-band statistics computed by decoding one resolution level with the `tiff` crate.

use std::io::Cursor;

use serde::Serialize;
use tiff::decoder::{Decoder, DecodingResult};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandStatistics {
    pub minimum:       f64,
    pub maximum:       f64,
    pub mean:          f64,
    pub stddev:        f64,
    pub valid_percent: f64,
}

#[derive(Default)]
struct Accumulator {
    count: u64,
    total: u64,
    min:   f64,
    max:   f64,
    mean:  f64,
    m2:    f64,
}

impl Accumulator {
    #[allow(clippy::cast_precision_loss)]
    fn push(&mut self, value: f64, nodata: Option<f64>) {
        self.total += 1;
        if value.is_nan() || nodata.is_some_and(|nd| nd == value) {
            return;
        }

        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }

        // Welford
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(self) -> Option<BandStatistics> {
        if self.count == 0 {
            return None;
        }
        Some(BandStatistics {
            minimum:       self.min,
            maximum:       self.max,
            mean:          self.mean,
            stddev:        (self.m2 / self.count as f64).sqrt(),
            valid_percent: self.count as f64 / self.total as f64 * 100.0,
        })
    }
}

/// Decode the IFD at `image_index` and compute statistics for each of its `bands`.
///
/// Samples are expected pixel-interleaved. A band without any valid sample yields `None`.
pub fn band_statistics(
    data: &[u8],
    image_index: usize,
    bands: usize,
    nodata: Option<f64>,
) -> Result<Vec<Option<BandStatistics>>> {
    let decode_error = |e: tiff::TiffError| Error::UnsupportedRaster(format!("decode failed: {e}"));

    let mut decoder = Decoder::new(Cursor::new(data)).map_err(decode_error)?;
    for _ in 0..image_index {
        decoder.next_image().map_err(decode_error)?;
    }
    let image = decoder.read_image().map_err(decode_error)?;

    let bands = bands.max(1);
    let mut accumulators: Vec<Accumulator> = (0..bands).map(|_| Accumulator::default()).collect();
    let mut feed = |values: &mut dyn Iterator<Item = f64>| {
        for (index, value) in values.enumerate() {
            accumulators[index % bands].push(value, nodata);
        }
    };

    #[allow(clippy::cast_precision_loss)]
    match image {
        DecodingResult::U8(v) => feed(&mut v.into_iter().map(f64::from)),
        DecodingResult::U16(v) => feed(&mut v.into_iter().map(f64::from)),
        DecodingResult::U32(v) => feed(&mut v.into_iter().map(f64::from)),
        DecodingResult::U64(v) => feed(&mut v.into_iter().map(|x| x as f64)),
        DecodingResult::I8(v) => feed(&mut v.into_iter().map(f64::from)),
        DecodingResult::I16(v) => feed(&mut v.into_iter().map(f64::from)),
        DecodingResult::I32(v) => feed(&mut v.into_iter().map(f64::from)),
        DecodingResult::I64(v) => feed(&mut v.into_iter().map(|x| x as f64)),
        DecodingResult::F32(v) => feed(&mut v.into_iter().map(f64::from)),
        DecodingResult::F64(v) => feed(&mut v.into_iter()),
        #[allow(unreachable_patterns)]
        _ => {
            return Err(Error::UnsupportedRaster(
                "unsupported sample type for statistics".to_string(),
            ));
        }
    }

    Ok(accumulators.into_iter().map(Accumulator::finish).collect())
}
