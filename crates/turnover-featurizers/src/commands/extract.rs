use anyhow::Result;
use rand::Rng;
use std::path::Path;
use turnover_featurizers::{
    discover_structures, extract_chain, extraction_frame, write_csv, ExtractionPool,
};

/// Isolation tokens are drawn uniformly from this space per dispatch; it is
/// large enough that simultaneous reuse across a small worker pool is
/// negligible.
const ISOLATION_TOKEN_SPACE: u64 = 10_000_000;

pub fn execute(
    pdb_dir: &Path,
    num_processes: usize,
    output_dir: &Path,
    output_file: &str,
    chain: &str,
    foldseek: &Path,
) -> Result<()> {
    let files = discover_structures(pdb_dir, "pdb")?;
    println!(
        "Extracting chain '{chain}' from {} structure files with {num_processes} workers",
        files.len()
    );

    let pool = ExtractionPool::new(num_processes);
    let records = pool.run(&files, |path| {
        let isolation_token = rand::thread_rng().gen_range(0..ISOLATION_TOKEN_SPACE);
        extract_chain(foldseek, path, chain, isolation_token)
    })?;

    std::fs::create_dir_all(output_dir)?;
    let mut df = extraction_frame(&files, &records)?;
    let out_path = output_dir.join(output_file);
    write_csv(&mut df, &out_path)?;
    println!("Wrote {} rows to {out_path:?}", df.height());
    Ok(())
}
