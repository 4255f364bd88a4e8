//! Rational polynomial camera coefficients from either vendor layout.
//!
//! DigitalGlobe files carry an `RPB/IMAGE` section with one element per
//! offset/scale and the coefficients grouped into space separated lists.
//! Astrium/Pleiades files carry a `Rational_Function_Model` section with 80
//! individually tagged coefficients and an `RFM_Validity` block of
//! offsets/scales, with pixel offsets counted from 1 instead of 0. Both end
//! up in the same [`RpcModel`].

use std::fmt;

use dg_xml::Element;
use nalgebra::{SVector, Vector2, Vector3};
use tracing::debug;

use crate::completeness::Completeness;
use crate::MetaError;

/// Number of terms of a cubic polynomial in longitude, latitude and height.
pub const RPC_TERMS: usize = 20;

/// One polynomial's coefficients.
pub type Coefficients = SVector<f64, RPC_TERMS>;

const SCALARS: usize = 0;
const COEFFICIENTS: usize = 1;

/// Reference ellipsoid the geodetic offsets and scales refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Datum {
    Wgs84,
}

impl Datum {
    pub fn name(&self) -> &'static str {
        match self {
            Datum::Wgs84 => "WGS84",
        }
    }

    /// Metres.
    pub fn semi_major_axis(&self) -> f64 {
        match self {
            Datum::Wgs84 => 6_378_137.0,
        }
    }

    /// Metres.
    pub fn semi_minor_axis(&self) -> f64 {
        match self {
            Datum::Wgs84 => 6_356_752.314_245,
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which vendor layout an RPC section used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcSchema {
    /// `RPB/IMAGE` with grouped coefficient lists.
    Native,
    /// `Rational_Function_Model` with individually tagged coefficients.
    Alternate,
}

/// Canonical RPC camera: ground `(lon, lat, height)` to image `(sample, line)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcModel {
    datum: Datum,
    line_num_coeff: Coefficients,
    line_den_coeff: Coefficients,
    samp_num_coeff: Coefficients,
    samp_den_coeff: Coefficients,
    xy_offset: Vector2<f64>,
    xy_scale: Vector2<f64>,
    geodetic_offset: Vector3<f64>,
    geodetic_scale: Vector3<f64>,
}

impl RpcModel {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        datum: Datum,
        line_num_coeff: Coefficients,
        line_den_coeff: Coefficients,
        samp_num_coeff: Coefficients,
        samp_den_coeff: Coefficients,
        xy_offset: Vector2<f64>,
        xy_scale: Vector2<f64>,
        geodetic_offset: Vector3<f64>,
        geodetic_scale: Vector3<f64>,
    ) -> Self {
        RpcModel {
            datum,
            line_num_coeff,
            line_den_coeff,
            samp_num_coeff,
            samp_den_coeff,
            xy_offset,
            xy_scale,
            geodetic_offset,
            geodetic_scale,
        }
    }

    pub fn datum(&self) -> Datum {
        self.datum
    }

    pub fn line_num_coeff(&self) -> &Coefficients {
        &self.line_num_coeff
    }

    pub fn line_den_coeff(&self) -> &Coefficients {
        &self.line_den_coeff
    }

    pub fn samp_num_coeff(&self) -> &Coefficients {
        &self.samp_num_coeff
    }

    pub fn samp_den_coeff(&self) -> &Coefficients {
        &self.samp_den_coeff
    }

    /// `(sample, line)` offset, zero based.
    pub fn xy_offset(&self) -> Vector2<f64> {
        self.xy_offset
    }

    /// `(sample, line)` scale.
    pub fn xy_scale(&self) -> Vector2<f64> {
        self.xy_scale
    }

    /// `(longitude, latitude, height)` offset in degrees and metres.
    pub fn geodetic_offset(&self) -> Vector3<f64> {
        self.geodetic_offset
    }

    /// `(longitude, latitude, height)` scale in degrees and metres.
    pub fn geodetic_scale(&self) -> Vector3<f64> {
        self.geodetic_scale
    }
}

/// Builder reading either RPC layout.
#[derive(Debug, Clone)]
pub struct RpcXml {
    tracker: Completeness<2>,
    schema: Option<RpcSchema>,
    line_num_coeff: Coefficients,
    line_den_coeff: Coefficients,
    samp_num_coeff: Coefficients,
    samp_den_coeff: Coefficients,
    xy_offset: Vector2<f64>,
    xy_scale: Vector2<f64>,
    geodetic_offset: Vector3<f64>,
    geodetic_scale: Vector3<f64>,
}

impl Default for RpcXml {
    fn default() -> Self {
        Self::new()
    }
}

impl RpcXml {
    pub fn new() -> Self {
        RpcXml {
            tracker: Completeness::new("RPC", ["offsets and scales", "coefficients"]),
            schema: None,
            line_num_coeff: Coefficients::zeros(),
            line_den_coeff: Coefficients::zeros(),
            samp_num_coeff: Coefficients::zeros(),
            samp_den_coeff: Coefficients::zeros(),
            xy_offset: Vector2::zeros(),
            xy_scale: Vector2::zeros(),
            geodetic_offset: Vector3::zeros(),
            geodetic_scale: Vector3::zeros(),
        }
    }

    /// Parse an `RPB` element found while walking a metadata file.
    pub fn parse(&mut self, node: &Element) -> Result<(), MetaError> {
        self.parse_rpb(node)
    }

    /// Locate an RPC section under `root`, preferring the native layout.
    ///
    /// Absence of both sections is [`MetaError::NotFound`]. Errors inside a
    /// section that is present are returned as is.
    pub fn parse_document_root(&mut self, root: &Element) -> Result<RpcSchema, MetaError> {
        if let Some(rpb) = root
            .child("RPB")
            .filter(|rpb| rpb.child("IMAGE").is_some())
        {
            self.parse_rpb(rpb)?;
            return Ok(RpcSchema::Native);
        }
        if let Some(rfm) = root.child("Rational_Function_Model") {
            debug!("no RPB/IMAGE section, reading Rational_Function_Model");
            self.parse_rational_function_model(rfm)?;
            return Ok(RpcSchema::Alternate);
        }
        Err(MetaError::NotFound(format!(
            "neither RPB nor Rational_Function_Model section present under <{}>",
            root.name()
        )))
    }

    /// Native layout: `IMAGE` with scalar offsets/scales and grouped lists.
    pub fn parse_rpb(&mut self, node: &Element) -> Result<(), MetaError> {
        let image = node.get_child("IMAGE")?;

        self.xy_offset = Vector2::new(
            image.child_value("SAMPOFFSET")?,
            image.child_value("LINEOFFSET")?,
        );
        self.xy_scale = Vector2::new(
            image.child_value("SAMPSCALE")?,
            image.child_value("LINESCALE")?,
        );
        self.geodetic_offset = Vector3::new(
            image.child_value("LONGOFFSET")?,
            image.child_value("LATOFFSET")?,
            image.child_value("HEIGHTOFFSET")?,
        );
        self.geodetic_scale = Vector3::new(
            image.child_value("LONGSCALE")?,
            image.child_value("LATSCALE")?,
            image.child_value("HEIGHTSCALE")?,
        );
        self.tracker.mark(SCALARS);

        self.line_num_coeff = grouped_coefficients(image, "LINENUMCOEF")?;
        self.line_den_coeff = grouped_coefficients(image, "LINEDENCOEF")?;
        self.samp_num_coeff = grouped_coefficients(image, "SAMPNUMCOEF")?;
        self.samp_den_coeff = grouped_coefficients(image, "SAMPDENCOEF")?;
        self.tracker.mark(COEFFICIENTS);

        self.schema = Some(RpcSchema::Native);
        debug!(offset = ?self.xy_offset, "parsed RPB section");
        Ok(())
    }

    /// Alternate layout: `Inverse_Model` coefficients and `RFM_Validity`
    /// offsets/scales. The pixel offset is shifted by `(-1, -1)`.
    pub fn parse_rational_function_model(&mut self, node: &Element) -> Result<(), MetaError> {
        // The inverse model maps ground to image.
        let inverse = node.get_child("Inverse_Model")?;
        let validity = node.get_child("RFM_Validity")?;

        self.samp_num_coeff = tagged_coefficients(inverse, "SAMP_NUM_COEFF")?;
        self.samp_den_coeff = tagged_coefficients(inverse, "SAMP_DEN_COEFF")?;
        self.line_num_coeff = tagged_coefficients(inverse, "LINE_NUM_COEFF")?;
        self.line_den_coeff = tagged_coefficients(inverse, "LINE_DEN_COEFF")?;
        self.tracker.mark(COEFFICIENTS);

        self.geodetic_scale = Vector3::new(
            validity.child_value("LONG_SCALE")?,
            validity.child_value("LAT_SCALE")?,
            validity.child_value("HEIGHT_SCALE")?,
        );
        self.geodetic_offset = Vector3::new(
            validity.child_value("LONG_OFF")?,
            validity.child_value("LAT_OFF")?,
            validity.child_value("HEIGHT_OFF")?,
        );
        self.xy_scale = Vector2::new(
            validity.child_value("SAMP_SCALE")?,
            validity.child_value("LINE_SCALE")?,
        );
        let one_based: Vector2<f64> = Vector2::new(
            validity.child_value("SAMP_OFF")?,
            validity.child_value("LINE_OFF")?,
        );
        self.xy_offset = one_based - Vector2::new(1.0, 1.0);
        self.tracker.mark(SCALARS);

        self.schema = Some(RpcSchema::Alternate);
        debug!(offset = ?self.xy_offset, "parsed Rational_Function_Model section");
        Ok(())
    }

    /// Layout of the last section parsed.
    pub fn schema(&self) -> Option<RpcSchema> {
        self.schema
    }

    pub fn is_ready(&self) -> bool {
        self.tracker.is_ready()
    }

    /// Build the model. The datum is always WGS84: the vendors state all
    /// heights are metres above the WGS84 ellipsoid.
    pub fn finish(self) -> Result<RpcModel, MetaError> {
        self.tracker.ensure_ready()?;
        Ok(RpcModel::new(
            Datum::Wgs84,
            self.line_num_coeff,
            self.line_den_coeff,
            self.samp_num_coeff,
            self.samp_den_coeff,
            self.xy_offset,
            self.xy_scale,
            self.geodetic_offset,
            self.geodetic_scale,
        ))
    }
}

/// Read the RPC section of a document, whichever layout it uses.
pub fn reconcile_rpc(root: &Element) -> Result<RpcModel, MetaError> {
    let mut xml = RpcXml::new();
    let schema = xml.parse_document_root(root)?;
    debug!(?schema, "reconciled RPC section");
    xml.finish()
}

fn grouped_coefficients(image: &Element, tag: &str) -> Result<Coefficients, MetaError> {
    let list = image.get_child(&format!("{tag}List"))?.get_child(tag)?;
    let values: Vec<f64> = list.parse_list()?;
    if values.len() != RPC_TERMS {
        return Err(MetaError::Io(format!(
            "<{tag}> holds {} coefficients, expected {RPC_TERMS}",
            values.len()
        )));
    }
    Ok(Coefficients::from_column_slice(&values))
}

fn tagged_coefficients(inverse: &Element, prefix: &str) -> Result<Coefficients, MetaError> {
    let mut coeffs = Coefficients::zeros();
    for (index, slot) in coeffs.iter_mut().enumerate() {
        *slot = inverse.child_value(&format!("{prefix}_{}", index + 1))?;
    }
    Ok(coeffs)
}
