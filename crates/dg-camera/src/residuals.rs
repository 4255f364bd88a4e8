//! Stereo intersection residuals over a control network.

use std::fmt;

use nalgebra::Vector2;
use tracing::{debug, info};

/// One observation of a ground point in one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlMeasure {
    /// Index of the image (and its camera model) the measure lives in.
    pub image_id: usize,
    /// Pixel position `(sample, line)`.
    pub position: Vector2<f64>,
}

impl ControlMeasure {
    pub fn new(image_id: usize, sample: f64, line: f64) -> Self {
        ControlMeasure {
            image_id,
            position: Vector2::new(sample, line),
        }
    }
}

/// A ground point with its image measures.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlPoint {
    pub measures: Vec<ControlMeasure>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlNetwork {
    pub points: Vec<ControlPoint>,
}

/// Closest-approach distance between the rays of two measures.
///
/// Implementors own the camera models and look them up by `image_id`.
pub trait StereoIntersection {
    fn intersection_error(&self, left: &ControlMeasure, right: &ControlMeasure) -> f64;
}

impl<F> StereoIntersection for F
where
    F: Fn(&ControlMeasure, &ControlMeasure) -> f64,
{
    fn intersection_error(&self, left: &ControlMeasure, right: &ControlMeasure) -> f64 {
        self(left, right)
    }
}

/// Minimum, maximum and mean of the per-pair errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidualSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl fmt::Display for ResidualSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stereo Intersection Residuals -- Min: {}  Max: {}  Average: {}",
            self.min, self.max, self.mean
        )
    }
}

/// Intersect each consecutive pair of measures of every point and summarise
/// the errors.
///
/// Returns `None` when no point has at least two measures.
pub fn compute_stereo_residuals<S>(network: &ControlNetwork, model: &S) -> Option<ResidualSummary>
where
    S: StereoIntersection + ?Sized,
{
    let mut count = 0usize;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;

    for (index, point) in network.points.iter().enumerate() {
        if point.measures.len() < 2 {
            debug!(point = index, "skipping point with fewer than two measures");
            continue;
        }
        for pair in point.measures.windows(2) {
            let error = model.intersection_error(&pair[0], &pair[1]);
            min = min.min(error);
            max = max.max(error);
            sum += error;
            count += 1;
        }
    }

    if count == 0 {
        return None;
    }
    let summary = ResidualSummary {
        count,
        min,
        max,
        mean: sum / count as f64,
    };
    info!("{summary}");
    Some(summary)
}
