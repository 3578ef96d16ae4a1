use crate::core::models::atom::Atom;
use crate::core::models::chain::ChainType;
use crate::core::models::secondary::SecondaryStructure;
use crate::core::models::structure::Structure;
use nalgebra::{Point3, Unit, Vector3};
use std::f64::consts::PI;

pub(crate) const CHAIN_RESIDUES: usize = 37;
pub(crate) const RISE: f64 = 1.5;
pub(crate) const HELIX_FIRST: usize = 8;
pub(crate) const HELIX_LAST: usize = 28;

/// Adds a CA-only chain running from `start` along `direction`, with a LEU
/// helix over `HELIX_FIRST..=HELIX_LAST` and LYS coil caps on both ends.
pub(crate) fn add_straight_chain(
    structure: &mut Structure,
    chain: &str,
    start: Point3<f64>,
    direction: Unit<Vector3<f64>>,
) {
    let chain_id = structure.add_chain(chain, ChainType::Protein);
    for k in 0..CHAIN_RESIDUES {
        let in_helix = (HELIX_FIRST..=HELIX_LAST).contains(&k);
        let (name, ss) = if in_helix {
            ("LEU", SecondaryStructure::AlphaHelix)
        } else {
            ("LYS", SecondaryStructure::Coil)
        };
        let seq = k as isize + 1;
        let residue_id = structure.add_residue(chain_id, seq, seq + 100, name).unwrap();
        structure.residue_mut(residue_id).unwrap().secondary = ss;
        let position = start + direction.into_inner() * (k as f64 * RISE);
        structure
            .add_atom_to_residue(residue_id, Atom::new("CA", residue_id, position))
            .unwrap();
    }
}

/// Six helical chains on a 10 Å circle around the z axis; the helices span
/// `z_centre ± 15` and the caps reach `z_centre ± 27`.
pub(crate) fn add_helix_bundle(structure: &mut Structure, prefix: &str, z_centre: f64) {
    for k in 0..6 {
        let angle = k as f64 * PI / 3.0;
        let start = Point3::new(10.0 * angle.cos(), 10.0 * angle.sin(), z_centre - 27.0);
        add_straight_chain(structure, &format!("{prefix}{k}"), start, Vector3::z_axis());
    }
}

pub(crate) fn helix_bundle() -> Structure {
    let mut structure = Structure::new("bundle");
    add_helix_bundle(&mut structure, "A", 0.0);
    structure
}

pub(crate) fn double_bundle() -> Structure {
    let mut structure = Structure::new("envelope");
    add_helix_bundle(&mut structure, "L", -40.0);
    add_helix_bundle(&mut structure, "U", 40.0);
    structure
}

/// Radial helices on a spherical cap around the origin: helices occupy
/// radii 85..115 Å, polar angles up to 40° from +z.
pub(crate) fn curved_cap() -> Structure {
    let mut structure = Structure::new("shell");
    let rings = [(0.0, 1), (10.0, 6), (20.0, 12), (30.0, 18), (40.0, 24)];
    let mut serial = 0;
    for (polar_degrees, count) in rings {
        let polar = f64::to_radians(polar_degrees);
        for j in 0..count {
            let azimuth = 2.0 * PI * j as f64 / count as f64;
            let direction = Unit::new_normalize(Vector3::new(
                polar.sin() * azimuth.cos(),
                polar.sin() * azimuth.sin(),
                polar.cos(),
            ));
            let start = Point3::from(direction.into_inner() * 73.0);
            add_straight_chain(&mut structure, &format!("C{serial}"), start, direction);
            serial += 1;
        }
    }
    structure
}

/// A compact coil of polar residues spread over a sphere.
pub(crate) fn globular_coil() -> Structure {
    let mut structure = Structure::new("globule");
    let chain_id = structure.add_chain("A", ChainType::Protein);
    let count = 60;
    let golden = PI * (3.0 - 5.0_f64.sqrt());
    for k in 0..count {
        let y = 1.0 - 2.0 * (k as f64 + 0.5) / count as f64;
        let ring = (1.0 - y * y).sqrt();
        let theta = golden * k as f64;
        let position = Point3::from(Vector3::new(ring * theta.cos(), y, ring * theta.sin()) * 15.0);
        let seq = k as isize + 1;
        let residue_id = structure.add_residue(chain_id, seq, seq, "LYS").unwrap();
        structure
            .add_atom_to_residue(residue_id, Atom::new("CA", residue_id, position))
            .unwrap();
    }
    structure
}
