//! Recursive discovery of structure files. The enumeration order becomes the
//! canonical row order for the extraction run.
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// All files matching `*.extension` under `root`, recursively.
pub fn discover_structures(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}/**/*.{extension}", root.display());
    let mut files = Vec::new();
    for entry in glob::glob(&pattern).with_context(|| format!("Bad glob pattern {pattern:?}"))? {
        files.push(entry?);
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn finds_nested_structure_files_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub/deeper")).unwrap();
        fs::write(dir.path().join("a.pdb"), "").unwrap();
        fs::write(dir.path().join("sub/b.pdb"), "").unwrap();
        fs::write(dir.path().join("sub/deeper/c.pdb"), "").unwrap();
        fs::write(dir.path().join("sub/readme.txt"), "").unwrap();

        let files = discover_structures(dir.path(), "pdb").unwrap();
        assert_eq!(files.len(), 3);
        assert!(files.iter().all(|f| f.extension().unwrap() == "pdb"));
    }

    #[test]
    fn empty_directory_yields_no_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_structures(dir.path(), "pdb").unwrap().is_empty());
    }
}
