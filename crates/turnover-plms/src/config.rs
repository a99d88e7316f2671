//! Run-wide prediction configuration.
//!
//! One immutable [`PredictConfig`] is resolved from the CLI and passed by
//! reference into every component. Closed policy sets (architecture, task,
//! windowing, padding) are enums so a new case is a compile-time-visible
//! change rather than a silently-ignored string.
use crate::window::WindowPolicy;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// Sentinel positions reserved in every model input: `<cls>` and `<eos>`.
pub const SENTINEL_TOKENS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, strum::Display)]
pub enum Architecture {
    #[value(name = "ESM2")]
    #[strum(serialize = "ESM2")]
    Esm2,
    #[value(name = "SaProt")]
    #[strum(serialize = "SaProt")]
    SaProt,
    #[value(name = "LSTM")]
    #[strum(serialize = "LSTM")]
    Lstm,
}

impl Architecture {
    /// Characters per residue unit in the sequence column this architecture
    /// consumes. SaProt reads the combined alphabet where every residue is an
    /// amino-acid letter followed by a lowercased 3Di letter.
    pub fn token_unit_width(&self) -> usize {
        match self {
            Architecture::SaProt => 2,
            Architecture::Esm2 | Architecture::Lstm => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Task {
    Classification,
    Regression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum PaddingSide {
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub struct PredictConfig {
    /// Pretrained model name (hf-hub) or local directory holding
    /// `tokenizer.json`.
    pub model: String,
    /// Safetensors checkpoint with the fine-tuned weights.
    pub model_path: PathBuf,
    pub architecture: Architecture,
    pub task: Task,
    pub batch_size: usize,
    pub seed: u64,
    pub use_amp: bool,
    pub num_workers: usize,
    pub max_length: usize,
    pub used_sequence: WindowPolicy,
    pub padding_side: PaddingSide,
    pub sequence_col: String,
}

impl PredictConfig {
    /// Residues that survive windowing: `max_length` minus the sentinel
    /// positions, minus one more slot for the separator when the `both`
    /// policy later concatenates two disjoint spans.
    pub fn token_budget(&self) -> Result<usize> {
        let mut reserved = SENTINEL_TOKENS;
        if self.used_sequence == WindowPolicy::Both {
            reserved += 1;
        }
        if self.max_length <= reserved {
            bail!(
                "max_length {} leaves no token budget after reserving {} positions",
                self.max_length,
                reserved
            );
        }
        Ok(self.max_length - reserved)
    }
}
