//! turnover-featurizers
//!
//! - convert protein structure files into foldseek 3Di "structure sequences"
//!   alongside their amino-acid sequences, in parallel over a directory tree.
//! - CLI wiring for extraction and for batched prediction with
//!   `turnover-plms`.
pub use discover::discover_structures;
pub use foldseek::{extract_chain, StructureTokens};
pub use pool::ExtractionPool;
pub use table::{extraction_frame, read_csv, write_csv};

pub mod discover;
pub mod foldseek;
pub mod pool;
pub mod table;
