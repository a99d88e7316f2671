//! One-shot wrapper around `foldseek structureto3didescriptor`.
//!
//! Each call runs the tool once on one structure file and pulls out a single
//! chain. Foldseek writes its descriptor table to a scratch path; the
//! isolation token keys that path so concurrent invocations from a worker
//! pool never collide on identically-named scratch files.
use anyhow::{anyhow, bail, Context, Result};
use itertools::Itertools;
use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

/// The three aligned sequence views of one chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureTokens {
    /// Amino-acid sequence, one letter per residue.
    pub aa: String,
    /// 3Di structural-token sequence, aligned index-for-index with `aa`.
    pub foldseek: String,
    /// Interleaved combined sequence: amino-acid letter followed by the
    /// lowercased 3Di letter, per residue.
    pub combined: String,
}

/// Run foldseek once on `structure` and return the sequences for `chain`.
///
/// `isolation_token` must be unique enough across concurrently running
/// invocations; callers draw it fresh from `0..10_000_000` per dispatch.
/// A missing chain is a hard error naming what was requested and found.
pub fn extract_chain(
    foldseek_bin: &Path,
    structure: &Path,
    chain: &str,
    isolation_token: u64,
) -> Result<StructureTokens> {
    let scratch = std::env::temp_dir().join(format!("foldseek_3di_{isolation_token}.tsv"));
    let output = Command::new(foldseek_bin)
        .arg("structureto3didescriptor")
        .args(["-v", "0", "--threads", "1", "--chain-name-mode", "1"])
        .arg(structure)
        .arg(&scratch)
        .output()
        .with_context(|| format!("Failed to execute foldseek at {foldseek_bin:?}"))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("foldseek failed on {structure:?}: {}", stderr.trim());
    }

    let descriptors = std::fs::read_to_string(&scratch)
        .with_context(|| format!("Foldseek output missing at {scratch:?}"))?;
    let _ = std::fs::remove_file(&scratch);
    let _ = std::fs::remove_file(scratch.with_extension("tsv.dbtype"));

    let file_name = structure
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("Invalid structure file name: {structure:?}"))?;
    let mut chains = parse_descriptors(&descriptors, file_name)?;
    chains.remove(chain).ok_or_else(|| {
        anyhow!(
            "chain '{chain}' not found in foldseek output for {structure:?} (found: {})",
            chains.keys().sorted().join(", ")
        )
    })
}

/// Parse the descriptor TSV emitted by foldseek: one line per chain with
/// `description \t aa_seq \t 3di_seq`. The chain id is whatever follows the
/// structure file name in the description. The first occurrence of a chain
/// wins.
pub fn parse_descriptors(
    descriptors: &str,
    file_name: &str,
) -> Result<HashMap<String, StructureTokens>> {
    let mut chains: HashMap<String, StructureTokens> = HashMap::new();
    for line in descriptors.lines().filter(|l| !l.trim().is_empty()) {
        let mut fields = line.split('\t');
        let (desc, aa, foldseek) = fields
            .next_tuple()
            .ok_or_else(|| anyhow!("Malformed foldseek descriptor line: {line:?}"))?;
        let name_chain = desc.split_whitespace().next().unwrap_or(desc);
        let chain = name_chain
            .replace(file_name, "")
            .trim_start_matches('_')
            .to_string();
        if aa.chars().count() != foldseek.chars().count() {
            bail!(
                "foldseek descriptor for chain '{chain}' has {} residues but {} 3Di tokens",
                aa.chars().count(),
                foldseek.chars().count()
            );
        }
        let combined = aa
            .chars()
            .zip(foldseek.chars())
            .flat_map(|(a, s)| [a, s.to_ascii_lowercase()])
            .collect();
        chains.entry(chain).or_insert(StructureTokens {
            aa: aa.to_string(),
            foldseek: foldseek.to_string(),
            combined,
        });
    }
    Ok(chains)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTORS: &str = "1abc.pdb_A desc\tMKTV\tDPQA\n1abc.pdb_B\tGG\tDD\n";

    #[test]
    fn parses_chains_and_interleaves_combined() {
        let chains = parse_descriptors(DESCRIPTORS, "1abc.pdb").unwrap();
        let a = &chains["A"];
        assert_eq!(a.aa, "MKTV");
        assert_eq!(a.foldseek, "DPQA");
        assert_eq!(a.combined, "MdKpTqVa");
        assert_eq!(chains["B"].combined, "GdGd");
    }

    #[test]
    fn parsing_is_deterministic() {
        let first = parse_descriptors(DESCRIPTORS, "1abc.pdb").unwrap();
        let second = parse_descriptors(DESCRIPTORS, "1abc.pdb").unwrap();
        assert_eq!(first["A"], second["A"]);
        assert_eq!(first["B"], second["B"]);
    }

    #[test]
    fn first_occurrence_of_a_chain_wins() {
        let dup = "1abc.pdb_A\tMK\tDP\n1abc.pdb_A\tGG\tDD\n";
        let chains = parse_descriptors(dup, "1abc.pdb").unwrap();
        assert_eq!(chains["A"].aa, "MK");
    }

    #[test]
    fn misaligned_sequences_are_rejected() {
        assert!(parse_descriptors("1abc.pdb_A\tMKT\tDP\n", "1abc.pdb").is_err());
    }

    #[test]
    fn malformed_lines_are_rejected() {
        assert!(parse_descriptors("just-one-field\n", "1abc.pdb").is_err());
    }
}
