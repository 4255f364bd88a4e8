//! `IMD` block: image timing, TLC table, TDI level and pixel dimensions.

use dg_xml::Element;
use nalgebra::Vector2;
use tracing::{debug, warn};

use crate::completeness::Completeness;
use crate::MetaError;

const META: usize = 0;
const BAND: usize = 1;
const TLC_LIST: usize = 2;
const IMAGE_SIZE: usize = 3;

/// Image timing and size information.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageMetadata {
    pub sat_id: String,
    pub scan_direction: String,
    /// Anchor time of the TLC table (UTC, as written in the file).
    pub tlc_start_time: String,
    pub first_line_start_time: String,
    /// Lines per second.
    pub avg_line_rate: f64,
    /// `(line, seconds since tlc_start_time)` pairs.
    pub tlc: Vec<(f64, f64)>,
    /// Time delay integration stages; 0 when the file does not report it.
    pub tdi: i32,
    pub rows: u32,
    pub columns: u32,
}

impl ImageMetadata {
    /// Image size as `(columns, rows)`.
    pub fn image_size(&self) -> Vector2<u32> {
        Vector2::new(self.columns, self.rows)
    }
}

/// Builder reading an `IMD` block.
#[derive(Debug, Clone)]
pub struct ImageXml {
    tracker: Completeness<4>,
    declared_tlc: usize,
    record: ImageMetadata,
}

impl Default for ImageXml {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageXml {
    pub fn new() -> Self {
        ImageXml {
            tracker: Completeness::new("IMD", ["IMAGE", "BAND_P", "TLCLISTList", "image size"]),
            declared_tlc: 0,
            record: ImageMetadata::default(),
        }
    }

    /// Parse the `IMD` element, failing on the first non-recoverable step.
    pub fn parse(&mut self, node: &Element) -> Result<(), MetaError> {
        let image = node.get_child("IMAGE")?;
        self.parse_meta(image)?;
        self.parse_band(node)?;
        self.parse_tlc_list(image.get_child("TLCLISTList")?)?;
        self.parse_image_size(node)?;
        debug!(
            sat_id = %self.record.sat_id,
            tlc = self.record.tlc.len(),
            tdi = self.record.tdi,
            "parsed IMD block"
        );
        Ok(())
    }

    /// Read the scalar fields of the `IMAGE` element and the declared TLC count.
    pub fn parse_meta(&mut self, image: &Element) -> Result<(), MetaError> {
        self.record.sat_id = image.child_value("SATID")?;
        self.record.scan_direction = image.child_value("SCANDIRECTION")?;
        self.record.tlc_start_time = image.child_value("TLCTIME")?;
        self.record.first_line_start_time = image.child_value("FIRSTLINETIME")?;
        self.record.avg_line_rate = image.child_value("AVGLINERATE")?;
        self.declared_tlc = image.child_value("NUMTLC")?;
        self.tracker.mark(META);
        Ok(())
    }

    /// Read `BAND_P/TDILEVEL`; mosaicked products drop it, in which case TDI is 0.
    pub fn parse_band(&mut self, node: &Element) -> Result<(), MetaError> {
        self.record.tdi = match node.child("BAND_P").and_then(|band| band.child("TDILEVEL")) {
            Some(level) => level.parse_text()?,
            None => {
                warn!("BAND_P/TDILEVEL absent; assuming TDI level 0");
                0
            }
        };
        self.tracker.mark(BAND);
        Ok(())
    }

    /// Read the `(line, time offset)` pairs; their number must match `NUMTLC`.
    pub fn parse_tlc_list(&mut self, node: &Element) -> Result<(), MetaError> {
        let mut tlc = Vec::with_capacity(node.children().len());
        for entry in node.children() {
            let values: Vec<f64> = entry.parse_list()?;
            match values.as_slice() {
                [line, offset, ..] => tlc.push((*line, *offset)),
                _ => {
                    return Err(MetaError::Argument(format!(
                        "<{}> entry {:?} needs a line and a time offset",
                        entry.name(),
                        entry.text()
                    )))
                }
            }
        }
        if tlc.len() != self.declared_tlc {
            return Err(MetaError::Io(format!(
                "Read incorrect number of TLC: found {}, declared {}",
                tlc.len(),
                self.declared_tlc
            )));
        }
        self.record.tlc = tlc;
        self.tracker.mark(TLC_LIST);
        Ok(())
    }

    pub fn parse_image_size(&mut self, node: &Element) -> Result<(), MetaError> {
        self.record.rows = node.child_value("NUMROWS")?;
        self.record.columns = node.child_value("NUMCOLUMNS")?;
        self.tracker.mark(IMAGE_SIZE);
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.tracker.is_ready()
    }

    /// Hand out the finished record once every step has run.
    pub fn finish(self) -> Result<ImageMetadata, MetaError> {
        self.tracker.ensure_ready()?;
        Ok(self.record)
    }
}
