use crate::core::utils::geometry::{cos_angle, rotation_onto_z};
use nalgebra::{Point3, Rotation3, Unit, Vector3};
use serde::Serialize;

pub const DEFAULT_HALF_THICKNESS: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MembraneKind {
    Planar,
    Curved,
}

/// Shape of one candidate (or committed) membrane.
///
/// Both variants measure distances in a frame fixed by the structure's mass
/// centre and the candidate normal; the scalar `offset`/`radius` then places
/// the mid-surface inside that frame.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateGeometry {
    /// Infinite flat slab with mid-plane `{p : normal·(p − origin) = offset}`.
    Planar {
        normal: Unit<Vector3<f64>>,
        origin: Point3<f64>,
        offset: f64,
    },
    /// Spherical shell with mid-surface `{p : |p − center| = radius}`.
    ///
    /// `center` lies on the line through the mass centre along `normal`.
    Curved {
        normal: Unit<Vector3<f64>>,
        center: Point3<f64>,
        radius: f64,
    },
}

impl CandidateGeometry {
    pub fn planar(normal: Unit<Vector3<f64>>, origin: Point3<f64>) -> Self {
        Self::Planar {
            normal,
            origin,
            offset: 0.0,
        }
    }

    /// A curved candidate whose centre sits `distance` behind `mass_centre` along `normal`.
    pub fn curved(normal: Unit<Vector3<f64>>, mass_centre: Point3<f64>, distance: f64) -> Self {
        Self::Curved {
            normal,
            center: mass_centre - normal.into_inner() * distance,
            radius: 0.0,
        }
    }

    pub fn kind(&self) -> MembraneKind {
        match self {
            Self::Planar { .. } => MembraneKind::Planar,
            Self::Curved { .. } => MembraneKind::Curved,
        }
    }

    pub fn normal(&self) -> Unit<Vector3<f64>> {
        match self {
            Self::Planar { normal, .. } | Self::Curved { normal, .. } => *normal,
        }
    }

    /// The offset (planar) or radius (curved) of the mid-surface.
    pub fn shift(&self) -> f64 {
        match self {
            Self::Planar { offset, .. } => *offset,
            Self::Curved { radius, .. } => *radius,
        }
    }

    pub fn with_shift(&self, shift: f64) -> Self {
        match self {
            Self::Planar { normal, origin, .. } => Self::Planar {
                normal: *normal,
                origin: *origin,
                offset: shift,
            },
            Self::Curved { normal, center, .. } => Self::Curved {
                normal: *normal,
                center: *center,
                radius: shift.max(0.0),
            },
        }
    }

    /// Distance of `point` along the frame axis, before the mid-surface shift.
    pub fn raw_distance(&self, point: &Point3<f64>) -> f64 {
        match self {
            Self::Planar { normal, origin, .. } => normal.dot(&(point - origin)),
            Self::Curved { center, .. } => (point - center).norm(),
        }
    }

    /// Signed distance from `point` to the mid-surface; negative inside a curved shell.
    pub fn distance(&self, point: &Point3<f64>) -> f64 {
        self.raw_distance(point) - self.shift()
    }

    /// The point where the normal line through the frame origin meets the mid-surface.
    pub fn anchor(&self) -> Point3<f64> {
        match self {
            Self::Planar {
                normal,
                origin,
                offset,
            } => origin + normal.into_inner() * *offset,
            Self::Curved {
                normal,
                center,
                radius,
            } => center + normal.into_inner() * *radius,
        }
    }

    /// Membrane-normal direction at `point`.
    pub fn axis_at(&self, point: &Point3<f64>) -> Unit<Vector3<f64>> {
        match self {
            Self::Planar { normal, .. } => *normal,
            Self::Curved { normal, center, .. } => {
                Unit::try_new(point - center, 1e-10).unwrap_or(*normal)
            }
        }
    }

    /// Absolute cosine between a segment direction and the membrane axis at its midpoint.
    pub fn angle_to_membrane_axis(&self, direction: &Vector3<f64>, midpoint: &Point3<f64>) -> f64 {
        cos_angle(direction, self.axis_at(midpoint).as_ref()).abs()
    }
}

/// A committed membrane: its geometry, half thickness and winning quality value.
#[derive(Debug, Clone, PartialEq)]
pub struct Membrane {
    pub geometry: CandidateGeometry,
    pub half_thickness: f64,
    pub q_value: f64,
}

impl Membrane {
    pub fn kind(&self) -> MembraneKind {
        self.geometry.kind()
    }
}

/// Rigid transform placing the first membrane's mid-plane at z = 0 with its normal along +z.
#[derive(Debug, Clone, PartialEq)]
pub struct MembraneFrame {
    pub rotation: Rotation3<f64>,
    pub translation: Vector3<f64>,
}

impl MembraneFrame {
    /// Frame for a membrane whose mid-plane passes through `origin` with the given normal.
    pub fn new(normal: &Unit<Vector3<f64>>, origin: &Point3<f64>) -> Self {
        Self {
            rotation: rotation_onto_z(normal),
            translation: -origin.coords,
        }
    }

    pub fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * (point.coords + self.translation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn z_axis() -> Unit<Vector3<f64>> {
        Vector3::z_axis()
    }

    #[test]
    fn planar_distance_is_zero_on_the_shifted_plane() {
        let geometry = CandidateGeometry::planar(z_axis(), Point3::new(1.0, 1.0, 1.0)).with_shift(4.0);
        assert!(geometry.distance(&Point3::new(-7.0, 3.0, 5.0)).abs() < EPSILON);
        assert!((geometry.distance(&Point3::new(0.0, 0.0, 9.0)) - 4.0).abs() < EPSILON);
        assert!((geometry.raw_distance(&Point3::new(0.0, 0.0, 9.0)) - 8.0).abs() < EPSILON);
    }

    #[test]
    fn curved_distance_is_zero_on_the_sphere_and_negative_inside() {
        let geometry = CandidateGeometry::curved(z_axis(), Point3::origin(), 50.0).with_shift(50.0);
        assert!(geometry.distance(&Point3::origin()).abs() < EPSILON);
        assert!(geometry.distance(&Point3::new(0.0, 30.0, -50.0)) < 0.0);
        assert!(geometry.distance(&Point3::new(0.0, 0.0, 10.0)) > 0.0);
    }

    #[test]
    fn curved_center_lies_on_the_normal_line_through_mass_centre() {
        let mass_centre = Point3::new(2.0, -1.0, 3.0);
        let normal = Unit::new_normalize(Vector3::new(1.0, 1.0, 0.0));
        let CandidateGeometry::Curved { center, .. } =
            CandidateGeometry::curved(normal, mass_centre, 10.0)
        else {
            panic!("expected curved geometry");
        };
        let offset = mass_centre - center;
        assert!((offset.norm() - 10.0).abs() < EPSILON);
        assert!((offset.normalize() - normal.into_inner()).norm() < EPSILON);
    }

    #[test]
    fn curved_radius_is_never_negative() {
        let geometry = CandidateGeometry::curved(z_axis(), Point3::origin(), 10.0).with_shift(-3.0);
        assert_eq!(geometry.shift(), 0.0);
    }

    #[test]
    fn anchor_lies_on_the_mid_surface() {
        let planar = CandidateGeometry::planar(z_axis(), Point3::new(1.0, 2.0, 3.0)).with_shift(-5.0);
        assert!((planar.anchor() - Point3::new(1.0, 2.0, -2.0)).norm() < EPSILON);
        assert!(planar.distance(&planar.anchor()).abs() < EPSILON);

        let curved = CandidateGeometry::curved(z_axis(), Point3::origin(), 80.0).with_shift(95.0);
        assert!((curved.anchor() - Point3::new(0.0, 0.0, 15.0)).norm() < EPSILON);
        assert!(curved.distance(&curved.anchor()).abs() < EPSILON);
    }

    #[test]
    fn angle_to_membrane_axis_uses_local_axis_for_curved() {
        let planar = CandidateGeometry::planar(z_axis(), Point3::origin());
        let direction = Vector3::new(1.0, 0.0, 0.0);
        let midpoint = Point3::new(10.0, 0.0, 0.0);
        assert!(planar.angle_to_membrane_axis(&direction, &midpoint) < EPSILON);

        let curved = CandidateGeometry::curved(z_axis(), Point3::origin(), 0.0);
        assert!((curved.angle_to_membrane_axis(&direction, &midpoint) - 1.0).abs() < EPSILON);
    }

    #[test]
    fn membrane_frame_maps_mid_plane_to_origin_and_normal_to_z() {
        let normal = Unit::new_normalize(Vector3::new(0.0, 1.0, 0.0));
        let origin = Point3::new(0.0, 5.0, 0.0);
        let frame = MembraneFrame::new(&normal, &origin);
        let mapped = frame.apply(&Point3::new(0.0, 12.0, 0.0));
        assert!((mapped - Point3::new(0.0, 0.0, 7.0)).norm() < 1e-9);
    }
}
