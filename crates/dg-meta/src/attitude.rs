//! `ATT` block: time-tagged spacecraft orientation.

use dg_xml::Element;
use nalgebra::{Quaternion, UnitQuaternion};
use tracing::debug;

use crate::completeness::Completeness;
use crate::list::read_labeled_list;
use crate::{IndexPolicy, MetaError};

const META: usize = 0;
const LIST: usize = 1;

/// Attitude samples.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttitudeMetadata {
    pub start_time: String,
    /// Seconds between samples.
    pub time_interval: f64,
    /// Spacecraft to ECEF rotation per sample, components as read.
    pub quaternion: Vec<Quaternion<f64>>,
    /// Upper triangle of the quaternion covariance.
    pub covariance: Vec<[f64; 10]>,
}

impl AttitudeMetadata {
    pub fn len(&self) -> usize {
        self.quaternion.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quaternion.is_empty()
    }

    /// Normalised rotation of sample `index`.
    pub fn rotation(&self, index: usize) -> Option<UnitQuaternion<f64>> {
        self.quaternion
            .get(index)
            .map(|q| UnitQuaternion::from_quaternion(*q))
    }
}

/// Builder reading an `ATT` block.
#[derive(Debug, Clone)]
pub struct AttitudeXml {
    tracker: Completeness<2>,
    policy: IndexPolicy,
    declared: usize,
    record: AttitudeMetadata,
}

impl Default for AttitudeXml {
    fn default() -> Self {
        Self::new()
    }
}

impl AttitudeXml {
    pub fn new() -> Self {
        Self::with_policy(IndexPolicy::default())
    }

    pub fn with_policy(policy: IndexPolicy) -> Self {
        AttitudeXml {
            tracker: Completeness::new("ATT", ["meta", "ATTLISTList"]),
            policy,
            declared: 0,
            record: AttitudeMetadata::default(),
        }
    }

    pub fn parse(&mut self, node: &Element) -> Result<(), MetaError> {
        self.parse_meta(node)?;
        self.parse_list(node.get_child("ATTLISTList")?)?;
        debug!(
            points = self.record.len(),
            interval = self.record.time_interval,
            "parsed ATT block"
        );
        Ok(())
    }

    pub fn parse_meta(&mut self, node: &Element) -> Result<(), MetaError> {
        self.record.start_time = node.child_value("STARTTIME")?;
        self.record.time_interval = node.child_value("TIMEINTERVAL")?;
        self.declared = node.child_value("NUMPOINTS")?;
        self.tracker.mark(META);
        Ok(())
    }

    /// Each entry is `label q1 q2 q3 q4 c0..c9`; `q4` is the scalar part.
    pub fn parse_list(&mut self, node: &Element) -> Result<(), MetaError> {
        let samples = read_labeled_list::<14>(node, self.declared, self.policy)?;
        self.record.quaternion = samples
            .iter()
            .map(|s| Quaternion::new(s[3], s[0], s[1], s[2]))
            .collect();
        self.record.covariance = samples
            .iter()
            .map(|s| {
                let mut covariance = [0.0; 10];
                covariance.copy_from_slice(&s[4..]);
                covariance
            })
            .collect();
        self.tracker.mark(LIST);
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.tracker.is_ready()
    }

    pub fn finish(self) -> Result<AttitudeMetadata, MetaError> {
        self.tracker.ensure_ready()?;
        Ok(self.record)
    }
}
