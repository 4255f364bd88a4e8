//! `EPH` block: time-tagged spacecraft position and velocity.

use dg_xml::Element;
use nalgebra::Vector3;
use tracing::debug;

use crate::completeness::Completeness;
use crate::list::read_labeled_list;
use crate::{IndexPolicy, MetaError};

const META: usize = 0;
const LIST: usize = 1;

/// Ephemeris samples, ECEF metres and metres per second.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EphemerisMetadata {
    /// UTC time of the first sample, as written in the file.
    pub start_time: String,
    /// Seconds between samples.
    pub time_interval: f64,
    pub position: Vec<Vector3<f64>>,
    pub velocity: Vec<Vector3<f64>>,
    /// Upper triangle of the position covariance.
    pub covariance: Vec<[f64; 6]>,
}

impl EphemerisMetadata {
    pub fn len(&self) -> usize {
        self.position.len()
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    /// Seconds after `start_time` of sample `index`.
    pub fn sample_offset(&self, index: usize) -> f64 {
        index as f64 * self.time_interval
    }
}

/// Builder reading an `EPH` block.
#[derive(Debug, Clone)]
pub struct EphemerisXml {
    tracker: Completeness<2>,
    policy: IndexPolicy,
    declared: usize,
    record: EphemerisMetadata,
}

impl Default for EphemerisXml {
    fn default() -> Self {
        Self::new()
    }
}

impl EphemerisXml {
    pub fn new() -> Self {
        Self::with_policy(IndexPolicy::default())
    }

    pub fn with_policy(policy: IndexPolicy) -> Self {
        EphemerisXml {
            tracker: Completeness::new("EPH", ["meta", "EPHEMLISTList"]),
            policy,
            declared: 0,
            record: EphemerisMetadata::default(),
        }
    }

    pub fn parse(&mut self, node: &Element) -> Result<(), MetaError> {
        self.parse_meta(node)?;
        self.parse_list(node.get_child("EPHEMLISTList")?)?;
        debug!(
            points = self.record.len(),
            interval = self.record.time_interval,
            "parsed EPH block"
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

    /// Each entry is `label px py pz vx vy vz c0..c5`.
    pub fn parse_list(&mut self, node: &Element) -> Result<(), MetaError> {
        let samples = read_labeled_list::<12>(node, self.declared, self.policy)?;
        self.record.position = samples
            .iter()
            .map(|s| Vector3::new(s[0], s[1], s[2]))
            .collect();
        self.record.velocity = samples
            .iter()
            .map(|s| Vector3::new(s[3], s[4], s[5]))
            .collect();
        self.record.covariance = samples
            .iter()
            .map(|s| [s[6], s[7], s[8], s[9], s[10], s[11]])
            .collect();
        self.tracker.mark(LIST);
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.tracker.is_ready()
    }

    pub fn finish(self) -> Result<EphemerisMetadata, MetaError> {
        self.tracker.ensure_ready()?;
        Ok(self.record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, EPH_BLOCK};

    fn block(declared: usize, entries: usize) -> String {
        let list: String = (1..=entries)
            .rev()
            .map(|label| {
                format!("<EPHEMLIST>{label} {label} 0 0 0 {label} 0 0 0 0 0 0 0</EPHEMLIST>")
            })
            .collect();
        format!(
            "<EPH><STARTTIME>T0</STARTTIME><NUMPOINTS>{declared}</NUMPOINTS>\
             <TIMEINTERVAL>0.5</TIMEINTERVAL><EPHEMLISTList>{list}</EPHEMLISTList></EPH>"
        )
    }

    #[test]
    fn parse_full_block() {
        let mut xml = EphemerisXml::new();
        xml.parse(&fixtures::element(EPH_BLOCK)).expect("parse EPH");
        let eph = xml.finish().expect("finish");
        assert_eq!(eph.start_time, "2009-10-31T07:28:30.000000Z");
        assert_eq!(eph.len(), 3);
        assert_eq!(eph.position[1], Vector3::new(6.1e6, 1.1e5, 2.1e5));
        assert_eq!(eph.velocity[2], Vector3::new(-1.2, 7.7e3, 2.2));
        assert_eq!(eph.covariance[0], [1e-6, 0.0, 0.0, 1e-6, 0.0, 1e-6]);
        assert!((eph.sample_offset(2) - 0.04).abs() < 1e-12);
    }

    #[test]
    fn declared_count_must_match_entries() {
        for _ in 0..16 {
            let n = fastrand::usize(0..12);
            let mut xml = EphemerisXml::new();
            xml.parse(&fixtures::element(&block(n, n)))
                .expect("matching count");
            let eph = xml.finish().expect("finish");
            for (index, position) in eph.position.iter().enumerate() {
                assert_eq!(position.x, (index + 1) as f64);
            }

            let mut wrong_counts = vec![n + 1];
            if n > 0 {
                wrong_counts.push(n - 1);
            }
            for entries in wrong_counts {
                let mut xml = EphemerisXml::new();
                let err = xml.parse(&fixtures::element(&block(n, entries))).unwrap_err();
                assert!(matches!(err, MetaError::Io(_)), "n={n} entries={entries}");
                assert!(!xml.is_ready());
            }
        }
    }

    #[test]
    fn unparsable_label_is_argument_error() {
        let text = EPH_BLOCK.replace("<EPHEMLIST>2 ", "<EPHEMLIST>two ");
        let mut xml = EphemerisXml::new();
        let err = xml.parse(&fixtures::element(&text)).unwrap_err();
        assert!(matches!(err, MetaError::Argument(_)));
    }

    #[test]
    fn duplicate_label_policy() {
        let text = EPH_BLOCK.replace("<EPHEMLIST>2 ", "<EPHEMLIST>1 ");
        let mut strict = EphemerisXml::new();
        assert!(matches!(
            strict.parse(&fixtures::element(&text)),
            Err(MetaError::Argument(_))
        ));

        let mut permissive = EphemerisXml::with_policy(IndexPolicy::Permissive);
        permissive
            .parse(&fixtures::element(&text))
            .expect("permissive accepts duplicates");
        let eph = permissive.finish().expect("finish");
        assert_eq!(eph.position[0], Vector3::new(6.1e6, 1.1e5, 2.1e5));
        assert_eq!(eph.position[1], Vector3::zeros());
    }
}
