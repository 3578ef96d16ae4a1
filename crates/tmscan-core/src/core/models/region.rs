use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Topological region of a residue relative to the committed membrane(s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegionType {
    Side1,
    Side2,
    Membrane,
    InterMembrane,
    ReentrantLoop,
    InterfacialHelix,
    Inside,
    ChainTerminus,
    #[default]
    Unknown,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid region code: '{0}'")]
pub struct ParseRegionTypeError(pub String);

impl RegionType {
    pub fn code(self) -> char {
        match self {
            Self::Side1 => '1',
            Self::Side2 => '2',
            Self::Membrane => 'M',
            Self::InterMembrane => '3',
            Self::ReentrantLoop => 'L',
            Self::InterfacialHelix => 'F',
            Self::Inside => 'I',
            Self::ChainTerminus => 'T',
            Self::Unknown => 'U',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        Some(match code {
            '1' => Self::Side1,
            '2' => Self::Side2,
            'M' => Self::Membrane,
            '3' => Self::InterMembrane,
            'L' => Self::ReentrantLoop,
            'F' => Self::InterfacialHelix,
            'I' => Self::Inside,
            'T' => Self::ChainTerminus,
            'U' => Self::Unknown,
            _ => return None,
        })
    }

    pub fn is_side(self) -> bool {
        matches!(self, Self::Side1 | Self::Side2)
    }

    /// Whether the residue carries a label derived from its own position.
    pub fn is_located(self) -> bool {
        !matches!(self, Self::Unknown | Self::ChainTerminus)
    }
}

impl fmt::Display for RegionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for RegionType {
    type Err = ParseRegionTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_code(c).ok_or_else(|| ParseRegionTypeError(s.to_string())),
            _ => Err(ParseRegionTypeError(s.to_string())),
        }
    }
}

/// Identifies one residue of a chain by position and by both numbering schemes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResidueRef {
    pub index: usize,
    pub label_seq: isize,
    pub auth_seq: isize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icode: Option<char>,
}

/// A labelled, contiguous run of residues within one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionSegment {
    pub chain: String,
    pub region: RegionType,
    pub start: ResidueRef,
    pub end: ResidueRef,
}

impl RegionSegment {
    pub fn len(&self) -> usize {
        self.end.index + 1 - self.start.index
    }

    pub fn is_empty(&self) -> bool {
        self.end.index < self.start.index
    }
}
