use nalgebra::{Point3, Rotation3, Unit, Vector3};
use std::f64::consts::PI;

const DEGENERATE_NORM: f64 = 1e-10;

/// Cosine of the angle between two vectors, or `0.0` when either is degenerate.
pub fn cos_angle(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let norms = a.norm() * b.norm();
    if norms < DEGENERATE_NORM {
        return 0.0;
    }
    (a.dot(b) / norms).clamp(-1.0, 1.0)
}

pub fn rotation_to_align(from: &Vector3<f64>, to: &Vector3<f64>) -> Option<Rotation3<f64>> {
    Rotation3::rotation_between(from, to)
}

/// Rotation that carries `normal` onto the +z axis.
///
/// Antiparallel input has no unique minimal rotation; a half turn about the
/// x axis is used instead.
pub fn rotation_onto_z(normal: &Unit<Vector3<f64>>) -> Rotation3<f64> {
    let z = Vector3::z();
    rotation_to_align(normal.as_ref(), &z)
        .unwrap_or_else(|| Rotation3::from_axis_angle(&Vector3::x_axis(), PI))
}

pub fn mean_point<'a, I>(points: I) -> Option<Point3<f64>>
where
    I: IntoIterator<Item = &'a Point3<f64>>,
{
    let mut sum = Vector3::zeros();
    let mut count = 0usize;
    for p in points {
        sum += p.coords;
        count += 1;
    }
    (count > 0).then(|| Point3::from(sum / count as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn cos_angle_of_orthogonal_vectors_is_zero() {
        let c = cos_angle(&Vector3::x(), &Vector3::y());
        assert!(c.abs() < EPSILON);
    }

    #[test]
    fn cos_angle_handles_degenerate_input() {
        assert_eq!(cos_angle(&Vector3::zeros(), &Vector3::x()), 0.0);
    }

    #[test]
    fn cos_angle_is_scale_invariant() {
        let c = cos_angle(&Vector3::new(3.0, 0.0, 3.0), &Vector3::new(0.0, 0.0, 0.5));
        assert!((c - (0.5f64).sqrt()).abs() < EPSILON);
    }

    #[test]
    fn rotation_onto_z_maps_normal_to_z_axis() {
        let normal = Unit::new_normalize(Vector3::new(1.0, 2.0, -0.5));
        let rotated = rotation_onto_z(&normal) * normal.into_inner();
        assert!((rotated - Vector3::z()).norm() < 1e-9);
    }

    #[test]
    fn rotation_onto_z_handles_antiparallel_normal() {
        let normal = Unit::new_normalize(Vector3::new(0.0, 0.0, -1.0));
        let rotated = rotation_onto_z(&normal) * normal.into_inner();
        assert!((rotated - Vector3::z()).norm() < 1e-9);
    }

    #[test]
    fn mean_point_averages_coordinates() {
        let points = [Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 4.0, -2.0)];
        let mean = mean_point(points.iter()).unwrap();
        assert!((mean - Point3::new(1.0, 2.0, -1.0)).norm() < EPSILON);
        assert!(mean_point(std::iter::empty()).is_none());
    }
}
