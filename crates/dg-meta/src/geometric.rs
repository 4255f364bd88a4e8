//! `GEO` block: camera interior geometry and mounting.
//!
//! The sub-blocks are read in whatever order the file lists them; a static
//! table maps each known tag to its reader. Tags outside the table are
//! skipped.

use dg_xml::Element;
use nalgebra::{Quaternion, UnitQuaternion, Vector2, Vector3};
use tracing::{debug, trace};

use crate::completeness::Completeness;
use crate::MetaError;

const PRINCIPAL_DISTANCE: usize = 0;
const OPTICAL_DISTORTION: usize = 1;
const PERSPECTIVE_CENTER: usize = 2;
const CAMERA_ATTITUDE: usize = 3;
const DETECTOR_MOUNTING: usize = 4;

const SLOT_NAMES: [&str; 5] = [
    "PRINCIPAL_DISTANCE",
    "OPTICAL_DISTORTION",
    "PERSPECTIVE_CENTER",
    "CAMERA_ATTITUDE",
    "DETECTOR_MOUNTING",
];

type Handler = fn(&mut GeometricXml, &Element) -> Result<(), MetaError>;

const HANDLERS: &[(&str, Handler)] = &[
    ("PRINCIPAL_DISTANCE", GeometricXml::parse_principal_distance),
    ("OPTICAL_DISTORTION", GeometricXml::parse_optical_distortion),
    ("PERSPECTIVE_CENTER", GeometricXml::parse_perspective_center),
    ("CAMERA_ATTITUDE", GeometricXml::parse_camera_attitude),
    ("DETECTOR_MOUNTING", GeometricXml::parse_detector_mounting),
];

/// Interior orientation of the camera.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometricMetadata {
    /// Millimetres.
    pub principal_distance: f64,
    /// Optical distortion polynomial order; may be negative.
    pub optical_polyorder: i32,
    /// Distortion coefficients as read; all zero whenever present.
    pub optical_a: Vec<f64>,
    pub optical_b: Vec<f64>,
    /// Metres in the spacecraft frame.
    pub perspective_center: Vector3<f64>,
    /// Camera to spacecraft rotation, components as read (not normalised).
    pub camera_attitude: Quaternion<f64>,
    /// Millimetres.
    pub detector_origin: Vector2<f64>,
    /// Degrees about +Z of the camera frame.
    pub detector_rotation: f64,
    /// Millimetres.
    pub detector_pixel_pitch: f64,
}

impl GeometricMetadata {
    fn empty() -> Self {
        GeometricMetadata {
            principal_distance: 0.0,
            optical_polyorder: 0,
            optical_a: Vec::new(),
            optical_b: Vec::new(),
            perspective_center: Vector3::zeros(),
            camera_attitude: Quaternion::identity(),
            detector_origin: Vector2::zeros(),
            detector_rotation: 0.0,
            detector_pixel_pitch: 0.0,
        }
    }

    /// Normalised camera attitude.
    pub fn camera_rotation(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_quaternion(self.camera_attitude)
    }
}

/// Builder reading a `GEO` block.
#[derive(Debug, Clone)]
pub struct GeometricXml {
    tracker: Completeness<5>,
    record: GeometricMetadata,
}

impl Default for GeometricXml {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometricXml {
    pub fn new() -> Self {
        GeometricXml {
            tracker: Completeness::new("GEO", SLOT_NAMES),
            record: GeometricMetadata::empty(),
        }
    }

    /// Dispatch every element child of `node` to its reader.
    pub fn parse(&mut self, node: &Element) -> Result<(), MetaError> {
        for child in node.children() {
            match HANDLERS.iter().find(|(tag, _)| *tag == child.name()) {
                Some((_, handler)) => handler(&mut *self, child)?,
                None => trace!(tag = child.name(), "skipping GEO child"),
            }
        }
        debug!(
            ready = self.tracker.is_ready(),
            pd = self.record.principal_distance,
            "parsed GEO block"
        );
        Ok(())
    }

    pub fn parse_principal_distance(&mut self, node: &Element) -> Result<(), MetaError> {
        self.record.principal_distance = node.child_value("PD")?;
        self.tracker.mark(PRINCIPAL_DISTANCE);
        Ok(())
    }

    /// Accept the block only when it describes no actual distortion.
    ///
    /// A polynomial order below 1 is accepted as is. Otherwise every value in
    /// `ALISTList` and `BLISTList` must be zero, else
    /// [`MetaError::NotImplemented`].
    pub fn parse_optical_distortion(&mut self, node: &Element) -> Result<(), MetaError> {
        let order: i32 = node.child_value("POLYORDER")?;
        self.record.optical_polyorder = order;
        self.record.optical_a.clear();
        self.record.optical_b.clear();
        if order >= 1 {
            self.record.optical_a = zero_distortion_list(node, "ALISTList")?;
            self.record.optical_b = zero_distortion_list(node, "BLISTList")?;
        }
        self.tracker.mark(OPTICAL_DISTORTION);
        Ok(())
    }

    pub fn parse_perspective_center(&mut self, node: &Element) -> Result<(), MetaError> {
        self.record.perspective_center = Vector3::new(
            node.child_value("CX")?,
            node.child_value("CY")?,
            node.child_value("CZ")?,
        );
        self.tracker.mark(PERSPECTIVE_CENTER);
        Ok(())
    }

    /// `QCS4` is the scalar part; `QCS1..QCS3` the vector part.
    pub fn parse_camera_attitude(&mut self, node: &Element) -> Result<(), MetaError> {
        let mut buffer = [0.0; 4];
        for (slot, tag) in buffer.iter_mut().zip(["QCS4", "QCS1", "QCS2", "QCS3"]) {
            *slot = node.child_value(tag)?;
        }
        self.record.camera_attitude = Quaternion::new(buffer[0], buffer[1], buffer[2], buffer[3]);
        self.tracker.mark(CAMERA_ATTITUDE);
        Ok(())
    }

    /// Every `BAND_*` detector array must share one origin, rotation and pitch.
    pub fn parse_detector_mounting(&mut self, node: &Element) -> Result<(), MetaError> {
        let mut bands: Vec<[f64; 4]> = Vec::new();
        for band in node.children().filter(|child| child.name().starts_with("BAND_")) {
            let detector = band.get_child("DETECTOR_ARRAY")?;
            bands.push([
                detector.child_value("DETORIGINX")?,
                detector.child_value("DETORIGINY")?,
                detector.child_value("DETROTANGLE")?,
                detector.child_value("DETPITCH")?,
            ]);
        }

        let first = *bands.first().ok_or_else(|| {
            MetaError::Argument(
                "Could not find any bands in the DETECTOR_MOUNTING section of the XML file".into(),
            )
        })?;
        if bands.iter().skip(1).any(|band| *band != first) {
            return Err(MetaError::Argument(
                "XML files with multiple and distinct detector arrays in the DETECTOR_MOUNTING \
                 section of the XML file are not supported"
                    .into(),
            ));
        }

        self.record.detector_origin = Vector2::new(first[0], first[1]);
        self.record.detector_rotation = first[2];
        self.record.detector_pixel_pitch = first[3];
        self.tracker.mark(DETECTOR_MOUNTING);
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.tracker.is_ready()
    }

    pub fn finish(self) -> Result<GeometricMetadata, MetaError> {
        self.tracker.ensure_ready()?;
        Ok(self.record)
    }
}

fn zero_distortion_list(node: &Element, tag: &str) -> Result<Vec<f64>, MetaError> {
    let Some(list) = node.child(tag) else {
        return Ok(Vec::new());
    };
    let mut values = Vec::new();
    for entry in list.children() {
        for value in entry.parse_list::<f64>()? {
            if value != 0.0 {
                return Err(MetaError::NotImplemented(
                    "Optical distortion is not implemented".into(),
                ));
            }
            values.push(value);
        }
    }
    Ok(values)
}
