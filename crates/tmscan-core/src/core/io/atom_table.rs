use super::error::TableError;
use super::traits::StructureFile;
use crate::core::models::atom::Atom;
use crate::core::models::chain::ChainType;
use crate::core::models::ids::ResidueId;
use crate::core::models::secondary::SecondaryStructure;
use crate::core::models::structure::Structure;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};

/// One row of the per-atom annotation table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct AtomRecord {
    chain: String,
    label_seq: isize,
    auth_seq: isize,
    #[serde(default)]
    icode: Option<String>,
    residue: String,
    atom: String,
    x: f64,
    y: f64,
    z: f64,
    #[serde(default)]
    surface: f64,
    #[serde(default)]
    out_surface: f64,
    #[serde(default)]
    ss: Option<String>,
}

impl AtomRecord {
    fn validate(&self, line: u64) -> Result<(), TableError> {
        let invalid = |message: String| TableError::InvalidRecord { line, message };
        if self.chain.trim().is_empty() {
            return Err(invalid("empty chain identifier".to_string()));
        }
        if self.atom.trim().is_empty() {
            return Err(invalid("empty atom name".to_string()));
        }
        if ![self.x, self.y, self.z].iter().all(|v| v.is_finite()) {
            return Err(invalid(format!(
                "non-finite coordinates for atom '{}'",
                self.atom
            )));
        }
        if !(self.surface >= 0.0 && self.out_surface >= 0.0) {
            return Err(invalid(format!(
                "negative or non-numeric surface for atom '{}'",
                self.atom
            )));
        }
        Ok(())
    }
}

/// The annotated structure table: a CSV with one row per atom.
///
/// Columns: `chain,label_seq,auth_seq,icode,residue,atom,x,y,z,surface,out_surface,ss`.
/// Consecutive rows sharing `(chain, label_seq)` form one residue; the first row
/// of a residue carries its secondary-structure code. Lines starting with `#`
/// are ignored.
pub struct AtomTableFile;

impl StructureFile for AtomTableFile {
    type Error = TableError;

    fn read_from(reader: &mut impl BufRead) -> Result<Structure, Self::Error> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(reader);
        let headers = csv_reader
            .headers()
            .map_err(TableError::from_csv_read)?
            .clone();

        let mut structure = Structure::new("");
        let mut current: Option<(String, isize, ResidueId)> = None;

        for result in csv_reader.records() {
            let record = result.map_err(TableError::from_csv_read)?;
            let line = record.position().map_or(0, |p| p.line());
            let row: AtomRecord = record
                .deserialize(Some(&headers))
                .map_err(|source| TableError::Csv { line, source })?;
            row.validate(line)?;

            let existing = match &current {
                Some((chain, seq, id)) if *chain == row.chain && *seq == row.label_seq => Some(*id),
                _ => None,
            };
            let residue_id = match existing {
                Some(id) => id,
                None => {
                    let chain_id = structure.add_chain(&row.chain, ChainType::Protein);
                    if structure.find_residue_by_id(chain_id, row.label_seq).is_some() {
                        return Err(TableError::InvalidRecord {
                            line,
                            message: format!(
                                "residue {}/{} is not contiguous in the table",
                                row.chain, row.label_seq
                            ),
                        });
                    }
                    let residue_id = structure
                        .add_residue(chain_id, row.label_seq, row.auth_seq, &row.residue)
                        .ok_or_else(|| TableError::InvalidRecord {
                            line,
                            message: format!("chain '{}' could not be created", row.chain),
                        })?;
                    if let Some(residue) = structure.residue_mut(residue_id) {
                        residue.icode = row.icode.as_deref().and_then(|s| s.chars().next());
                        residue.secondary = row
                            .ss
                            .as_deref()
                            .and_then(|s| s.chars().next())
                            .map_or(SecondaryStructure::Coil, SecondaryStructure::from_code);
                    }
                    current = Some((row.chain.clone(), row.label_seq, residue_id));
                    residue_id
                }
            };

            let atom = Atom::new(&row.atom, residue_id, Point3::new(row.x, row.y, row.z))
                .with_surface(row.surface, row.out_surface);
            structure.add_atom_to_residue(residue_id, atom);
        }

        let non_polymer: Vec<_> = structure
            .chains_iter()
            .filter(|(_, chain)| {
                !chain.residues().iter().any(|&id| {
                    structure
                        .residue(id)
                        .is_some_and(|residue| residue.is_standard_amino_acid())
                })
            })
            .map(|(id, _)| id)
            .collect();
        for chain_id in non_polymer {
            if let Some(chain) = structure.chain_mut(chain_id) {
                chain.chain_type = ChainType::NonPolymer;
            }
        }

        Ok(structure)
    }

    fn write_to(structure: &Structure, writer: &mut impl Write) -> Result<(), Self::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for (_, chain) in structure.chains_iter() {
            for &residue_id in chain.residues() {
                let Some(residue) = structure.residue(residue_id) else {
                    continue;
                };
                for &atom_id in residue.atoms() {
                    let Some(atom) = structure.atom(atom_id) else {
                        continue;
                    };
                    csv_writer.serialize(AtomRecord {
                        chain: chain.id.clone(),
                        label_seq: residue.label_seq,
                        auth_seq: residue.auth_seq,
                        icode: residue.icode.map(String::from),
                        residue: residue.name.clone(),
                        atom: atom.name.clone(),
                        x: atom.position.x,
                        y: atom.position.y,
                        z: atom.position.z,
                        surface: atom.surface,
                        out_surface: atom.out_surface,
                        ss: Some(residue.secondary.code().to_string()),
                    })?;
                }
            }
        }
        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "\
chain,label_seq,auth_seq,icode,residue,atom,x,y,z,surface,out_surface,ss
# a comment line
A,1,10,,LEU,N,0.0,0.0,0.0,1.0,0.5,H
A,1,10,,LEU,CA,1.0,0.0,0.0,2.0,1.5,H
A,2,11,B,LYS,CA,2.0,0.0,0.0,3.0,0.0,-
B,1,1,,HOH,O,9.0,9.0,9.0,0.0,0.0,
";

    fn read(text: &str) -> Result<Structure, TableError> {
        AtomTableFile::read_from(&mut Cursor::new(text.as_bytes()))
    }

    #[test]
    fn read_groups_rows_into_residues_and_chains() {
        let structure = read(SAMPLE).unwrap();
        assert_eq!(structure.chain_ids().len(), 2);

        let a = structure.find_chain_by_id("A").unwrap();
        let chain = structure.chain(a).unwrap();
        assert_eq!(chain.chain_type, ChainType::Protein);
        assert_eq!(chain.residues().len(), 2);

        let leu = structure.residue(chain.residues()[0]).unwrap();
        assert_eq!(leu.name, "LEU");
        assert_eq!(leu.auth_seq, 10);
        assert_eq!(leu.secondary, SecondaryStructure::AlphaHelix);
        assert_eq!(leu.atoms().len(), 2);
        let ca = structure.atom(leu.get_atom_id_by_name("CA").unwrap()).unwrap();
        assert_eq!(ca.out_surface, 1.5);

        let lys = structure.residue(chain.residues()[1]).unwrap();
        assert_eq!(lys.icode, Some('B'));
        assert_eq!(lys.secondary, SecondaryStructure::Coil);
    }

    #[test]
    fn chains_without_amino_acids_are_non_polymer() {
        let structure = read(SAMPLE).unwrap();
        let b = structure.find_chain_by_id("B").unwrap();
        assert_eq!(structure.chain(b).unwrap().chain_type, ChainType::NonPolymer);
    }

    #[test]
    fn malformed_number_reports_line() {
        let text = "\
chain,label_seq,auth_seq,icode,residue,atom,x,y,z,surface,out_surface,ss
A,1,1,,ALA,CA,0.0,0.0,0.0,0.0,0.0,H
A,2,2,,ALA,CA,abc,0.0,0.0,0.0,0.0,H
";
        match read(text) {
            Err(TableError::Csv { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected CSV error, got {:?}", other.map(|s| s.name)),
        }
    }

    #[test]
    fn negative_surface_is_rejected() {
        let text = "\
chain,label_seq,auth_seq,icode,residue,atom,x,y,z,surface,out_surface,ss
A,1,1,,ALA,CA,0.0,0.0,0.0,-1.0,0.0,H
";
        assert!(matches!(
            read(text),
            Err(TableError::InvalidRecord { line: 2, .. })
        ));
    }

    #[test]
    fn split_residue_rows_are_rejected() {
        let text = "\
chain,label_seq,auth_seq,icode,residue,atom,x,y,z,surface,out_surface,ss
A,1,1,,ALA,N,0.0,0.0,0.0,0.0,0.0,H
A,2,2,,ALA,CA,0.0,0.0,0.0,0.0,0.0,H
A,1,1,,ALA,CA,0.0,0.0,0.0,0.0,0.0,H
";
        assert!(matches!(
            read(text),
            Err(TableError::InvalidRecord { line: 4, .. })
        ));
    }

    #[test]
    fn write_then_read_preserves_annotations() {
        let structure = read(SAMPLE).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("copy.csv");
        AtomTableFile::write_to_path(&structure, &path).unwrap();

        let reread = AtomTableFile::read_from_path(&path).unwrap();
        assert_eq!(reread.name, "copy");
        assert_eq!(reread.residue_count(), structure.residue_count());
        let a = reread.find_chain_by_id("A").unwrap();
        let lys = reread
            .residue(reread.find_residue_by_id(a, 2).unwrap())
            .unwrap();
        assert_eq!(lys.icode, Some('B'));
        assert_eq!(lys.auth_seq, 11);
    }
}
