use super::ids::ChainId;
use nalgebra::{Point3, Vector3};
use serde::Serialize;
use std::fmt;

/// Per-residue secondary-structure class, as assigned by a DSSP-like collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecondaryStructure {
    AlphaHelix,
    Helix310,
    PiHelix,
    Strand,
    Bridge,
    Turn,
    Bend,
    #[default]
    Coil,
}

impl SecondaryStructure {
    /// Parses a DSSP one-letter code. Anything unrecognised is coil.
    pub fn from_code(code: char) -> Self {
        match code {
            'H' => Self::AlphaHelix,
            'G' => Self::Helix310,
            'I' => Self::PiHelix,
            'E' => Self::Strand,
            'B' => Self::Bridge,
            'T' => Self::Turn,
            'S' => Self::Bend,
            _ => Self::Coil,
        }
    }

    pub fn code(self) -> char {
        match self {
            Self::AlphaHelix => 'H',
            Self::Helix310 => 'G',
            Self::PiHelix => 'I',
            Self::Strand => 'E',
            Self::Bridge => 'B',
            Self::Turn => 'T',
            Self::Bend => 'S',
            Self::Coil => '-',
        }
    }

    pub fn is_helix(self) -> bool {
        matches!(self, Self::AlphaHelix | Self::Helix310 | Self::PiHelix)
    }

    pub fn is_strand(self) -> bool {
        matches!(self, Self::Strand)
    }

    /// The element kind a residue of this class belongs to, if it is straight.
    pub fn element_kind(self) -> Option<ElementKind> {
        if self.is_helix() {
            Some(ElementKind::Helix)
        } else if self.is_strand() {
            Some(ElementKind::Strand)
        } else {
            None
        }
    }
}

impl fmt::Display for SecondaryStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    Helix,
    Strand,
}

impl ElementKind {
    /// Shortest run of residues that still forms an element of this kind.
    pub fn min_length(self) -> usize {
        match self {
            Self::Helix => 4,
            Self::Strand => 3,
        }
    }
}

/// A straight secondary-structure segment summarised as a vector.
#[derive(Debug, Clone, PartialEq)]
pub struct SecondaryElement {
    pub kind: ElementKind,
    pub chain_id: ChainId,
    pub first: usize, // Index of the first residue within the chain
    pub last: usize,  // Index of the last residue within the chain (inclusive)
    pub begin: Point3<f64>,
    pub end: Point3<f64>,
}

impl SecondaryElement {
    pub fn direction(&self) -> Vector3<f64> {
        self.end - self.begin
    }

    pub fn midpoint(&self) -> Point3<f64> {
        nalgebra::center(&self.begin, &self.end)
    }

    /// Number of residues covered by the element.
    pub fn residue_count(&self) -> usize {
        self.last + 1 - self.first
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.first..=self.last).contains(&index)
    }
}
