//! Recurrent baseline scorer: embedding, single-layer LSTM, linear head on
//! the final hidden state.
use anyhow::Result as AnyResult;
use candle_core::{Module, Result, Tensor, D};
use candle_nn::{
    embedding, linear, lstm, Embedding, Linear, LSTMConfig as RnnConfig, VarBuilder, LSTM, RNN,
};
use serde::Deserialize;
use std::path::Path;

fn default_embed_dim() -> usize {
    128
}
fn default_hidden_dim() -> usize {
    256
}

#[derive(Debug, Clone, Deserialize)]
pub struct LstmConfig {
    #[serde(default)]
    pub vocab_size: usize,
    #[serde(default = "default_embed_dim")]
    pub embed_dim: usize,
    #[serde(default = "default_hidden_dim")]
    pub hidden_dim: usize,
}

impl LstmConfig {
    pub fn resolve(checkpoint: &Path, vocab_size: usize) -> AnyResult<Self> {
        let sidecar = checkpoint.with_file_name("config.json");
        let mut cfg: LstmConfig = if sidecar.is_file() {
            serde_json::from_str(&std::fs::read_to_string(&sidecar)?)?
        } else {
            serde_json::from_str("{}")?
        };
        cfg.vocab_size = vocab_size;
        Ok(cfg)
    }
}

#[derive(Debug)]
pub struct LstmScorer {
    embeddings: Embedding,
    rnn: LSTM,
    head: Linear,
}

impl LstmScorer {
    pub fn load(vb: VarBuilder, cfg: &LstmConfig) -> Result<Self> {
        let embeddings = embedding(cfg.vocab_size, cfg.embed_dim, vb.pp("embeddings"))?;
        let rnn = lstm(cfg.embed_dim, cfg.hidden_dim, RnnConfig::default(), vb.pp("lstm"))?;
        let head = linear(cfg.hidden_dim, 1, vb.pp("head"))?;
        Ok(Self {
            embeddings,
            rnn,
            head,
        })
    }

    /// `(batch, seq_len)` token ids to `(batch,)` raw scores.
    pub fn forward(&self, token_ids: &Tensor) -> Result<Tensor> {
        let embedded = self.embeddings.forward(token_ids)?;
        let states = self.rnn.seq(&embedded)?;
        let last = states
            .last()
            .ok_or_else(|| candle_core::Error::Msg("empty LSTM state sequence".to_string()))?;
        self.head.forward(last.h())?.squeeze(D::Minus1)
    }
}
