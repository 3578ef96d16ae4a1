use super::ids::ResidueId;
use super::region::RegionSegment;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainType {
    Protein,
    LowResolution, // Protein chain dominated by backbone-only residues
    NonPolymer,
}

#[derive(Debug, Error)]
#[error("Invalid chain type string")]
pub struct ParseChainTypeError;

impl FromStr for ChainType {
    type Err = ParseChainTypeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "protein" => Ok(ChainType::Protein),
            "low-resolution" | "low_res" => Ok(ChainType::LowResolution),
            "non-polymer" | "ligand" => Ok(ChainType::NonPolymer),
            _ => Err(ParseChainTypeError),
        }
    }
}

impl fmt::Display for ChainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ChainType::Protein => "Protein",
                ChainType::LowResolution => "LowResolution",
                ChainType::NonPolymer => "NonPolymer",
            }
        )
    }
}

impl ChainType {
    pub fn is_protein(self) -> bool {
        matches!(self, ChainType::Protein | ChainType::LowResolution)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    pub id: String,                      // Author chain identifier (e.g., "A", "AA")
    pub chain_type: ChainType,           // Type of the chain
    pub selected: bool,                  // Participates in the membrane search
    pub regions: Vec<RegionSegment>,     // Region segments, filled by side detection
    pub num_tm: usize,                   // Number of membrane-spanning segments
    pub transmembrane: bool,             // Whether the chain crosses a membrane
    pub(crate) residues: Vec<ResidueId>, // Ordered list of residue IDs belonging to this chain
}

impl Chain {
    pub(crate) fn new(id: &str, chain_type: ChainType) -> Self {
        Self {
            id: id.to_string(),
            chain_type,
            selected: true,
            regions: Vec::new(),
            num_tm: 0,
            transmembrane: false,
            residues: Vec::new(),
        }
    }

    pub fn residues(&self) -> &[ResidueId] {
        &self.residues
    }

    pub(crate) fn clear_annotation(&mut self) {
        self.regions.clear();
        self.num_tm = 0;
        self.transmembrane = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_type_from_str_parses_known_types() {
        assert_eq!("protein".parse::<ChainType>().unwrap(), ChainType::Protein);
        assert_eq!(
            "Low-Resolution".parse::<ChainType>().unwrap(),
            ChainType::LowResolution
        );
        assert_eq!("ligand".parse::<ChainType>().unwrap(), ChainType::NonPolymer);
        assert!("water".parse::<ChainType>().is_err());
    }

    #[test]
    fn only_protein_types_are_protein() {
        assert!(ChainType::Protein.is_protein());
        assert!(ChainType::LowResolution.is_protein());
        assert!(!ChainType::NonPolymer.is_protein());
    }

    #[test]
    fn new_chain_starts_selected_and_unannotated() {
        let chain = Chain::new("B", ChainType::Protein);
        assert_eq!(chain.id, "B");
        assert!(chain.selected);
        assert!(chain.regions.is_empty());
        assert_eq!(chain.num_tm, 0);
        assert!(!chain.transmembrane);
        assert!(chain.residues().is_empty());
    }

    #[test]
    fn chain_type_display_formats_correctly() {
        assert_eq!(ChainType::LowResolution.to_string(), "LowResolution");
    }
}
