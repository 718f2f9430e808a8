//! Cloud Optimized GeoTIFF layout rules.
//!
//! The rules follow rio-cogeo's `cog_validate`: a COG keeps every IFD at the start of
//! the file (main image first, then overviews from largest to smallest), stores the
//! imagery after the IFDs with the smallest overview first, and tiles every level
//! bigger than 512 pixels.

use crate::error::Result;
use crate::raster::ifd::{Ifd, TiffFile};
use crate::raster::tags::{BIG_TIFF_HEADER_SIZE, CLASSIC_HEADER_SIZE};

/// Largest untiled dimension tolerated for a level
const MAX_UNTILED_SIZE: u64 = 512;

/// Leader of GDAL's ghost area, written right after the TIFF header
const GHOST_AREA_KEY: &[u8] = b"GDAL_STRUCTURAL_METADATA_SIZE=";
/// `GDAL_STRUCTURAL_METADATA_SIZE=XXXXXX bytes\n`
const GHOST_AREA_LEADER_LEN: usize = GHOST_AREA_KEY.len() + 6 + " bytes\n".len();

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutReport {
    pub errors:   Vec<String>,
    pub warnings: Vec<String>,
}

impl LayoutReport {
    /// Valid when there are no errors, and also no warnings when `strict`
    pub fn is_valid(&self, strict: bool) -> bool {
        self.errors.is_empty() && !(strict && !self.warnings.is_empty())
    }
}

/// Decimation factor of an overview relative to the main image
pub fn decimation(main: &Ifd, overview: &Ifd) -> Result<u64> {
    let main_width = main.width()?;
    let width = overview.width()?;
    Ok(if width == 0 {
        0
    } else {
        (main_width + width / 2) / width
    })
}

fn exceeds_untiled_size(ifd: &Ifd) -> Result<bool> {
    Ok(ifd.width()? > MAX_UNTILED_SIZE || ifd.height()? > MAX_UNTILED_SIZE)
}

/// Apply every layout rule to a parsed TIFF.
///
/// `data` is the raw file, needed to recognise GDAL's ghost area after the header.
pub fn check_layout(tiff: &TiffFile, data: &[u8]) -> Result<LayoutReport> {
    let mut report = LayoutReport::default();
    let main = tiff.main_image();
    let overviews = tiff.overviews();

    if exceeds_untiled_size(main)? {
        if !main.is_tiled() {
            report
                .errors
                .push("The file is greater than 512xH or 512xW, but is not tiled".to_string());
        }
        if overviews.is_empty() {
            report.warnings.push(
                "The file is greater than 512xH or 512xW, it is recommended to include internal overviews"
                    .to_string(),
            );
        }
    }

    check_ifd_offsets(tiff, data, &mut report)?;
    check_block_offsets(tiff, &mut report);

    for (index, (_, overview)) in overviews.iter().enumerate() {
        if exceeds_untiled_size(overview)? && !overview.is_tiled() {
            report
                .errors
                .push(format!("Overview of index {index} is not tiled"));
        }
    }

    Ok(report)
}

fn check_ifd_offsets(tiff: &TiffFile, data: &[u8], report: &mut LayoutReport) -> Result<()> {
    let main = tiff.main_image();
    let header_size = if tiff.big_tiff {
        BIG_TIFF_HEADER_SIZE
    } else {
        CLASSIC_HEADER_SIZE
    };
    let expected = ghost_area_end(data, header_size).unwrap_or(header_size);
    if main.offset != expected {
        report.errors.push(format!(
            "The offset of the main IFD should be 8 for ClassicTIFF or 16 for BigTIFF. It is {} instead",
            main.offset
        ));
    }

    let overviews = tiff.overviews();
    let mut decimations = Vec::with_capacity(overviews.len());
    for (index, (_, overview)) in overviews.iter().enumerate() {
        let dec = decimation(main, overview)?;
        if dec <= 1 {
            report
                .errors
                .push(format!("Invalid Decimation {dec} for overview level {index}"));
        }
        decimations.push(dec);
    }
    if decimations.windows(2).any(|pair| pair[0] > pair[1]) {
        report.errors.push("Overviews should be sorted".to_string());
    }

    let mut previous = main.offset;
    for (index, (_, overview)) in overviews.iter().enumerate() {
        if overview.offset < previous {
            let whereas = if index == 0 {
                format!("the one of the main image, which is at byte {previous}")
            } else {
                format!("the one of index {}, which is at byte {previous}", index - 1)
            };
            report.errors.push(format!(
                "The offset of the IFD for overview of index {index} is {}, whereas it should be greater than {whereas}",
                overview.offset
            ));
        }
        previous = overview.offset;
    }

    Ok(())
}

fn check_block_offsets(tiff: &TiffFile, report: &mut LayoutReport) {
    let levels = tiff.levels();
    let data_offsets: Vec<u64> = levels
        .iter()
        .map(|(_, ifd)| ifd.first_block_offset().unwrap_or(0))
        .collect();

    if data_offsets.iter().any(|offset| *offset == 0) {
        report.errors.push("Missing BLOCK_OFFSET_0_0".to_string());
    }

    // levels is never empty: it always starts with the main image
    let last = data_offsets.len() - 1;
    let smallest_ifd = levels[last].1.offset;
    if data_offsets[last] != 0 && data_offsets[last] < smallest_ifd {
        let level = if last > 0 {
            "smallest overview"
        } else {
            "image"
        };
        report.errors.push(format!(
            "The offset of the first block of the {level} should be after its IFD"
        ));
    }

    // Imagery is stored smallest overview first, so offsets decrease with the level
    for i in (1..last).rev() {
        if data_offsets[i] < data_offsets[i + 1] {
            report.errors.push(format!(
                "The offset of the first block of overview of index {} should be after the one of the overview of index {i}",
                i - 1
            ));
        }
    }
    if data_offsets.len() >= 2 && data_offsets[0] < data_offsets[1] {
        report.errors.push(format!(
            "The offset of the first block of the main resolution image should be after the one of the overview of index {}",
            last - 1
        ));
    }
}

/// Offset right after GDAL's ghost area, when the file has one
fn ghost_area_end(data: &[u8], header_size: u64) -> Option<u64> {
    let start = usize::try_from(header_size).ok()?;
    let leader = data.get(start..start + GHOST_AREA_LEADER_LEN)?;
    if !leader.starts_with(GHOST_AREA_KEY) {
        return None;
    }
    let digits = &leader[GHOST_AREA_KEY.len()..GHOST_AREA_KEY.len() + 6];
    let size: u64 = std::str::from_utf8(digits).ok()?.trim().parse().ok()?;
    Some(header_size + GHOST_AREA_LEADER_LEN as u64 + size)
}
