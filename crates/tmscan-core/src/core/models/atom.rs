use super::ids::ResidueId;
use nalgebra::Point3;

#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub name: String,              // Atom name (e.g., "CA", "CB")
    pub residue_id: ResidueId,     // ID of the parent residue
    pub position: Point3<f64>,     // 3D coordinates
    pub surface: f64,              // Total solvent-accessible surface
    pub out_surface: f64,          // Surface exposed toward the outside of the assembly
}

impl Atom {
    pub fn new(name: &str, residue_id: ResidueId, position: Point3<f64>) -> Self {
        Self {
            name: name.trim().to_string(),
            residue_id,
            position,
            surface: 0.0,
            out_surface: 0.0,
        }
    }

    pub fn with_surface(mut self, surface: f64, out_surface: f64) -> Self {
        self.surface = surface;
        self.out_surface = out_surface;
        self
    }
}
