//! Lazy, indexable dataset composing windowing and tokenization over a
//! tabular input. Indexing is deterministic and side-effect free, so rows
//! may be fetched repeatedly and in any order.
use crate::config::PredictConfig;
use crate::tokenizer::TokenizationAdapter;
use crate::window::{split_residues, WindowPolicy};
use anyhow::{anyhow, Result};
use candle_core::Tensor;
use polars::prelude::*;

/// Placeholder label for rows without a ground-truth value.
pub const LABEL_PLACEHOLDER: f32 = -1.0;

pub struct InferenceDataset {
    sequences: Vec<String>,
    labels: Option<Vec<f32>>,
    unit_width: usize,
    budget: usize,
    policy: WindowPolicy,
    adapter: TokenizationAdapter,
}

impl InferenceDataset {
    /// Build from a DataFrame holding the configured sequence column and,
    /// optionally, a `label` column.
    pub fn from_frame(
        df: &DataFrame,
        cfg: &PredictConfig,
        adapter: TokenizationAdapter,
    ) -> Result<Self> {
        let sequences = df
            .column(&cfg.sequence_col)
            .map_err(|e| anyhow!("Missing sequence column '{}': {e}", cfg.sequence_col))?
            .as_materialized_series()
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, s)| {
                s.map(|s| s.to_string())
                    .ok_or_else(|| anyhow!("Row {row}: null value in '{}'", cfg.sequence_col))
            })
            .collect::<Result<Vec<_>>>()?;
        let labels = if df.get_column_names().iter().any(|c| c.as_str() == "label") {
            let values = df
                .column("label")?
                .as_materialized_series()
                .cast(&DataType::Float32)?
                .f32()?
                .into_iter()
                .map(|v| v.unwrap_or(LABEL_PLACEHOLDER))
                .collect();
            Some(values)
        } else {
            None
        };
        Ok(Self {
            sequences,
            labels,
            unit_width: cfg.architecture.token_unit_width(),
            budget: cfg.token_budget()?,
            policy: cfg.used_sequence,
            adapter,
        })
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Window + tokenize row `idx`, returning the fixed-shape token tensor
    /// and the row's label (or the placeholder).
    pub fn get(&self, idx: usize) -> Result<(Tensor, f32)> {
        let units = split_residues(&self.sequences[idx], self.unit_width);
        let segments = self.policy.select(&units, self.budget);
        let ids = self
            .adapter
            .encode_windowed(&segments)
            .map_err(|e| anyhow!("Row {idx}: {e}"))?;
        let label = self
            .labels
            .as_ref()
            .map_or(LABEL_PLACEHOLDER, |l| l[idx]);
        Ok((ids, label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Architecture, PaddingSide, Task};
    use crate::tokenizer::tests::toy_adapter;
    use std::path::PathBuf;

    fn config(policy: WindowPolicy, max_length: usize) -> PredictConfig {
        PredictConfig {
            model: "toy".to_string(),
            model_path: PathBuf::from("model.safetensors"),
            architecture: Architecture::Esm2,
            task: Task::Classification,
            batch_size: 2,
            seed: 42,
            use_amp: false,
            num_workers: 0,
            max_length,
            used_sequence: policy,
            padding_side: PaddingSide::Right,
            sequence_col: "aa".to_string(),
        }
    }

    #[test]
    fn indexes_rows_deterministically() {
        let df = df!("aa" => ["ACD", "AC"]).unwrap();
        let cfg = config(WindowPolicy::Left, 8);
        let ds =
            InferenceDataset::from_frame(&df, &cfg, toy_adapter(8, PaddingSide::Right)).unwrap();
        assert_eq!(ds.len(), 2);
        let (first, label) = ds.get(0).unwrap();
        let (again, _) = ds.get(0).unwrap();
        assert_eq!(
            first.to_vec1::<u32>().unwrap(),
            again.to_vec1::<u32>().unwrap()
        );
        assert_eq!(label, LABEL_PLACEHOLDER);
    }

    #[test]
    fn windows_before_tokenizing() {
        // budget = 4 - 2 = 2, so only the first two residues survive.
        let df = df!("aa" => ["ACDE"]).unwrap();
        let cfg = config(WindowPolicy::Left, 4);
        let ds =
            InferenceDataset::from_frame(&df, &cfg, toy_adapter(4, PaddingSide::Right)).unwrap();
        let (ids, _) = ds.get(0).unwrap();
        assert_eq!(ids.to_vec1::<u32>().unwrap(), vec![0, 4, 5, 2]);
    }

    #[test]
    fn picks_up_label_column_when_present() {
        let df = df!("aa" => ["AC"], "label" => [1.0f32]).unwrap();
        let cfg = config(WindowPolicy::Left, 8);
        let ds =
            InferenceDataset::from_frame(&df, &cfg, toy_adapter(8, PaddingSide::Right)).unwrap();
        assert_eq!(ds.get(0).unwrap().1, 1.0);
    }

    #[test]
    fn empty_frame_yields_empty_dataset() {
        let df = df!("aa" => Vec::<String>::new()).unwrap();
        let cfg = config(WindowPolicy::Left, 8);
        let ds =
            InferenceDataset::from_frame(&df, &cfg, toy_adapter(8, PaddingSide::Right)).unwrap();
        assert!(ds.is_empty());
    }
}
