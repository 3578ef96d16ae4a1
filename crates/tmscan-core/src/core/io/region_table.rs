use super::error::TableError;
use crate::core::models::structure::Structure;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct RegionRecord<'a> {
    chain: &'a str,
    start_label_seq: isize,
    start_auth_seq: isize,
    end_label_seq: isize,
    end_auth_seq: isize,
    length: usize,
    region: char,
}

/// Writes every chain's region segments as CSV, one row per segment.
pub fn write_region_segments(structure: &Structure, writer: &mut impl Write) -> Result<(), TableError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for (_, chain) in structure.chains_iter() {
        for segment in &chain.regions {
            csv_writer.serialize(RegionRecord {
                chain: &chain.id,
                start_label_seq: segment.start.label_seq,
                start_auth_seq: segment.start.auth_seq,
                end_label_seq: segment.end.label_seq,
                end_auth_seq: segment.end.auth_seq,
                length: segment.len(),
                region: segment.region.code(),
            })?;
        }
    }
    csv_writer.flush()?;
    Ok(())
}
