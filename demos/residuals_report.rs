use dg_camera::{
    compute_stereo_residuals, ControlMeasure, ControlNetwork, ControlPoint, StereoIntersection,
};
use nalgebra::{Vector2, Vector3};

/// Ideal pinhole looking down -Z from `center`.
struct Pinhole {
    center: Vector3<f64>,
    focal: f64,
}

impl Pinhole {
    fn ray(&self, pixel: &Vector2<f64>) -> Vector3<f64> {
        Vector3::new(pixel.x, pixel.y, -self.focal).normalize()
    }

    fn project(&self, ground: &Vector3<f64>) -> Vector2<f64> {
        let d = ground - self.center;
        Vector2::new(-self.focal * d.x / d.z, -self.focal * d.y / d.z)
    }
}

struct StereoPair {
    cameras: [Pinhole; 2],
}

impl StereoIntersection for StereoPair {
    fn intersection_error(&self, left: &ControlMeasure, right: &ControlMeasure) -> f64 {
        let (a, b) = (&self.cameras[left.image_id], &self.cameras[right.image_id]);
        let (u, v) = (a.ray(&left.position), b.ray(&right.position));
        let w = a.center - b.center;
        let n = u.cross(&v);
        if n.norm() < f64::EPSILON {
            return w.cross(&u).norm();
        }
        w.dot(&n).abs() / n.norm()
    }
}

fn main() {
    tracing_subscriber::fmt::init();
    let pair = StereoPair {
        cameras: [
            Pinhole {
                center: Vector3::new(-50_000.0, 0.0, 600_000.0),
                focal: 8836.2,
            },
            Pinhole {
                center: Vector3::new(50_000.0, 0.0, 600_000.0),
                focal: 8836.2,
            },
        ],
    };

    let points = (0..20)
        .map(|i| {
            let ground = Vector3::new(i as f64 * 250.0, (i % 5) as f64 * 400.0, 0.0);
            let jitter = Vector2::new(0.0, (i % 3) as f64 * 0.05);
            ControlPoint {
                measures: vec![
                    ControlMeasure {
                        image_id: 0,
                        position: pair.cameras[0].project(&ground),
                    },
                    ControlMeasure {
                        image_id: 1,
                        position: pair.cameras[1].project(&ground) + jitter,
                    },
                ],
            }
        })
        .collect();
    let network = ControlNetwork { points };

    match compute_stereo_residuals(&network, &pair) {
        Some(summary) => println!("{summary}"),
        None => println!("no stereo points"),
    }
}
