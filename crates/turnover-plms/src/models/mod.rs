//! Model wrappers. The predictor only needs `forward(token_batch) -> scores`;
//! everything behind that seam is architecture-specific.
use crate::config::{Architecture, PredictConfig};
use crate::exec::ExecContext;
use anyhow::{Context, Result};
use candle_core::Tensor;
use candle_nn::VarBuilder;

pub use esm2::{Esm2Config, Esm2Scorer};
pub use lstm::{LstmConfig, LstmScorer};

pub mod esm2;
pub mod lstm;

/// A loaded scoring model. One case per supported architecture; ESM2 and
/// SaProt share the transformer scorer and differ only in vocabulary and
/// token-unit width.
pub enum Scorer {
    Esm2(Esm2Scorer),
    Lstm(LstmScorer),
}

impl Scorer {
    /// Load the fine-tuned checkpoint at the context's device and dtype.
    /// Hyperparameters come from a `config.json` next to the checkpoint when
    /// present, otherwise from the architecture defaults.
    pub fn load(
        cfg: &PredictConfig,
        vocab_size: usize,
        pad_id: u32,
        ctx: &ExecContext,
    ) -> Result<Self> {
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[&cfg.model_path], ctx.dtype, &ctx.device)
        }
        .with_context(|| format!("Failed to load checkpoint {:?}", cfg.model_path))?;
        match cfg.architecture {
            Architecture::Esm2 | Architecture::SaProt => {
                let model_cfg = Esm2Config::resolve(&cfg.model_path, vocab_size, pad_id)?;
                Ok(Scorer::Esm2(Esm2Scorer::load(vb, &model_cfg)?))
            }
            Architecture::Lstm => {
                let model_cfg = LstmConfig::resolve(&cfg.model_path, vocab_size)?;
                Ok(Scorer::Lstm(LstmScorer::load(vb, &model_cfg)?))
            }
        }
    }

    /// Raw per-sample scores for a `(batch, max_length)` token batch,
    /// shape `(batch,)`.
    pub fn forward(&self, token_ids: &Tensor) -> candle_core::Result<Tensor> {
        match self {
            Scorer::Esm2(model) => model.forward(token_ids),
            Scorer::Lstm(model) => model.forward(token_ids),
        }
    }
}
