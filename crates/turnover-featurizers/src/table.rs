//! Tabular assembly and CSV I/O for extraction and prediction runs.
use crate::foldseek::StructureTokens;
use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::{Path, PathBuf};

/// Materialize extraction results as a flat table, one row per structure
/// file, in input order.
pub fn extraction_frame(files: &[PathBuf], records: &[StructureTokens]) -> Result<DataFrame> {
    let paths: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();
    let aa: Vec<&str> = records.iter().map(|r| r.aa.as_str()).collect();
    let foldseek: Vec<&str> = records.iter().map(|r| r.foldseek.as_str()).collect();
    let combined: Vec<&str> = records.iter().map(|r| r.combined.as_str()).collect();
    let df = df!(
        "file" => paths,
        "aa" => aa,
        "foldseek" => foldseek,
        "aa_foldseek" => combined,
    )?;
    Ok(df)
}

pub fn read_csv(path: &Path) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("Failed to open {path:?}"))?
        .finish()
        .with_context(|| format!("Failed to parse CSV {path:?}"))
}

pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file =
        std::fs::File::create(path).with_context(|| format!("Failed to create {path:?}"))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .with_context(|| format!("Failed to write CSV {path:?}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(aa: &str, fs: &str) -> StructureTokens {
        let combined = aa
            .chars()
            .zip(fs.chars())
            .flat_map(|(a, s)| [a, s.to_ascii_lowercase()])
            .collect();
        StructureTokens {
            aa: aa.to_string(),
            foldseek: fs.to_string(),
            combined,
        }
    }

    #[test]
    fn frame_rows_follow_input_order() {
        let files = vec![PathBuf::from("b.pdb"), PathBuf::from("a.pdb")];
        let records = vec![record("MK", "DP"), record("GG", "DD")];
        let df = extraction_frame(&files, &records).unwrap();
        assert_eq!(df.shape(), (2, 4));
        let first = df.column("file").unwrap().as_materialized_series();
        assert_eq!(first.str().unwrap().get(0), Some("b.pdb"));
        assert_eq!(first.str().unwrap().get(1), Some("a.pdb"));
    }

    #[test]
    fn csv_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.csv");
        let files = vec![PathBuf::from("a.pdb")];
        let records = vec![record("MKT", "DPQ")];
        let mut df = extraction_frame(&files, &records).unwrap();
        write_csv(&mut df, &path).unwrap();
        let back = read_csv(&path).unwrap();
        assert_eq!(back.shape(), (1, 4));
        let combined = back.column("aa_foldseek").unwrap().as_materialized_series();
        assert_eq!(combined.str().unwrap().get(0), Some("MdKpTq"));
    }
}
