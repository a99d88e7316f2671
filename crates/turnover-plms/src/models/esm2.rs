//! ESM2-style transformer scorer.
//!
//! Pre-norm encoder blocks with rotary attention over the token embedding,
//! followed by a masked mean pool and a single-logit head. SaProt checkpoints
//! load through the same structure with their structure-aware vocabulary.
use anyhow::Result as AnyResult;
use candle_core::{DType, Module, Result, Tensor, D};
use candle_nn::ops::softmax_last_dim;
use candle_nn::{embedding, layer_norm, linear, Embedding, LayerNorm, Linear, VarBuilder};
use serde::Deserialize;
use std::path::Path;

fn default_hidden_size() -> usize {
    320
}
fn default_num_hidden_layers() -> usize {
    6
}
fn default_num_attention_heads() -> usize {
    20
}
fn default_intermediate_size() -> usize {
    1280
}
fn default_layer_norm_eps() -> f64 {
    1e-5
}

#[derive(Debug, Clone, Deserialize)]
pub struct Esm2Config {
    #[serde(default)]
    pub vocab_size: usize,
    #[serde(default = "default_hidden_size")]
    pub hidden_size: usize,
    #[serde(default = "default_num_hidden_layers")]
    pub num_hidden_layers: usize,
    #[serde(default = "default_num_attention_heads")]
    pub num_attention_heads: usize,
    #[serde(default = "default_intermediate_size")]
    pub intermediate_size: usize,
    #[serde(default = "default_layer_norm_eps")]
    pub layer_norm_eps: f64,
    #[serde(default)]
    pub pad_token_id: u32,
}

impl Esm2Config {
    /// Read hyperparameters from a `config.json` next to the checkpoint when
    /// one exists; fall back to the t6-8M shape. The tokenizer is
    /// authoritative for the vocabulary and pad id either way.
    pub fn resolve(checkpoint: &Path, vocab_size: usize, pad_id: u32) -> AnyResult<Self> {
        let sidecar = checkpoint.with_file_name("config.json");
        let mut cfg: Esm2Config = if sidecar.is_file() {
            serde_json::from_str(&std::fs::read_to_string(&sidecar)?)?
        } else {
            serde_json::from_str("{}")?
        };
        cfg.vocab_size = vocab_size;
        cfg.pad_token_id = pad_id;
        Ok(cfg)
    }
}

fn rotate_half(x: &Tensor) -> Result<Tensor> {
    let chunks = x.chunk(2, D::Minus1)?;
    Tensor::cat(&[&chunks[1].neg()?, &chunks[0]], D::Minus1)
}

fn apply_rotary(x: &Tensor, cos: &Tensor, sin: &Tensor) -> Result<Tensor> {
    let x_cos = x.broadcast_mul(cos)?;
    let x_sin = rotate_half(x)?.broadcast_mul(sin)?;
    x_cos.add(&x_sin)
}

/// cos/sin tables for `seq_len` positions, shape `(1, 1, seq_len, head_dim)`.
fn rotary_tables(
    head_dim: usize,
    seq_len: usize,
    dtype: DType,
    device: &candle_core::Device,
) -> Result<(Tensor, Tensor)> {
    let inv_freq: Vec<f32> = (0..head_dim)
        .step_by(2)
        .map(|i| 1f32 / 10000f32.powf(i as f32 / head_dim as f32))
        .collect();
    let inv_freq = Tensor::new(inv_freq, device)?;
    let t = Tensor::arange(0u32, seq_len as u32, device)?.to_dtype(DType::F32)?;
    let freqs = t.unsqueeze(1)?.matmul(&inv_freq.unsqueeze(0)?)?;
    let emb = Tensor::cat(&[&freqs, &freqs], D::Minus1)?;
    let cos = emb.cos()?.to_dtype(dtype)?.unsqueeze(0)?.unsqueeze(0)?;
    let sin = emb.sin()?.to_dtype(dtype)?.unsqueeze(0)?.unsqueeze(0)?;
    Ok((cos, sin))
}

#[derive(Debug)]
struct EncoderBlock {
    q: Linear,
    k: Linear,
    v: Linear,
    wo: Linear,
    fc1: Linear,
    fc2: Linear,
    attention_norm: LayerNorm,
    ffn_norm: LayerNorm,
    num_heads: usize,
    head_dim: usize,
}

impl EncoderBlock {
    fn load(vb: VarBuilder, cfg: &Esm2Config) -> Result<Self> {
        let h = cfg.hidden_size;
        Ok(Self {
            q: linear(h, h, vb.pp("attention.q"))?,
            k: linear(h, h, vb.pp("attention.k"))?,
            v: linear(h, h, vb.pp("attention.v"))?,
            wo: linear(h, h, vb.pp("attention.out"))?,
            fc1: linear(h, cfg.intermediate_size, vb.pp("ffn.fc1"))?,
            fc2: linear(cfg.intermediate_size, h, vb.pp("ffn.fc2"))?,
            attention_norm: layer_norm(h, cfg.layer_norm_eps, vb.pp("attention_norm"))?,
            ffn_norm: layer_norm(h, cfg.layer_norm_eps, vb.pp("ffn_norm"))?,
            num_heads: cfg.num_attention_heads,
            head_dim: h / cfg.num_attention_heads,
        })
    }

    fn split_heads(&self, x: &Tensor) -> Result<Tensor> {
        let (b, l, _) = x.dims3()?;
        x.reshape((b, l, self.num_heads, self.head_dim))?
            .transpose(1, 2)?
            .contiguous()
    }

    fn attention(&self, x: &Tensor, pad_mask: &Tensor, cos: &Tensor, sin: &Tensor) -> Result<Tensor> {
        let (b, l, h) = x.dims3()?;
        let q = self.split_heads(&self.q.forward(x)?)?;
        let k = self.split_heads(&self.k.forward(x)?)?;
        let v = self.split_heads(&self.v.forward(x)?)?;
        let q = apply_rotary(&q, cos, sin)?;
        let k = apply_rotary(&k, cos, sin)?;
        let scale = 1.0 / (self.head_dim as f64).sqrt();
        let scores = (q.matmul(&k.transpose(D::Minus2, D::Minus1)?)? * scale)?;
        let scores = scores.broadcast_add(pad_mask)?;
        let attn = softmax_last_dim(&scores)?;
        let out = attn
            .matmul(&v)?
            .transpose(1, 2)?
            .reshape((b, l, h))?;
        self.wo.forward(&out)
    }

    fn forward(&self, x: &Tensor, pad_mask: &Tensor, cos: &Tensor, sin: &Tensor) -> Result<Tensor> {
        let normed = self.attention_norm.forward(x)?;
        let x = x.add(&self.attention(&normed, pad_mask, cos, sin)?)?;
        let normed = self.ffn_norm.forward(&x)?;
        let ff = self.fc2.forward(&self.fc1.forward(&normed)?.gelu_erf()?)?;
        x.add(&ff)
    }
}

#[derive(Debug)]
pub struct Esm2Scorer {
    embeddings: Embedding,
    blocks: Vec<EncoderBlock>,
    final_norm: LayerNorm,
    head: Linear,
    pad_token_id: u32,
    head_dim: usize,
}

impl Esm2Scorer {
    pub fn load(vb: VarBuilder, cfg: &Esm2Config) -> Result<Self> {
        let vb_m = vb.pp("esm2");
        let embeddings = embedding(cfg.vocab_size, cfg.hidden_size, vb_m.pp("embeddings"))?;
        let mut blocks = Vec::with_capacity(cfg.num_hidden_layers);
        for i in 0..cfg.num_hidden_layers {
            blocks.push(EncoderBlock::load(vb_m.pp("layers").pp(i), cfg)?);
        }
        let final_norm = layer_norm(cfg.hidden_size, cfg.layer_norm_eps, vb_m.pp("final_norm"))?;
        let head = linear(cfg.hidden_size, 1, vb.pp("head"))?;
        Ok(Self {
            embeddings,
            blocks,
            final_norm,
            head,
            pad_token_id: cfg.pad_token_id,
            head_dim: cfg.hidden_size / cfg.num_attention_heads,
        })
    }

    /// `(batch, seq_len)` token ids to `(batch,)` raw scores.
    pub fn forward(&self, token_ids: &Tensor) -> Result<Tensor> {
        let (_, seq_len) = token_ids.dims2()?;
        let mut x = self.embeddings.forward(token_ids)?;
        let dtype = x.dtype();
        // Non-pad positions as 0/1, pad positions pushed to -inf in scores.
        let keep = token_ids
            .ne(self.pad_token_id)?
            .to_dtype(dtype)?;
        let pad_mask = keep
            .affine(1e4, -1e4)?
            .unsqueeze(1)?
            .unsqueeze(1)?;
        let (cos, sin) = rotary_tables(self.head_dim, seq_len, dtype, token_ids.device())?;
        for block in self.blocks.iter() {
            x = block.forward(&x, &pad_mask, &cos, &sin)?;
        }
        let x = self.final_norm.forward(&x)?;
        // Mean over non-pad positions only.
        let keep = keep.unsqueeze(D::Minus1)?;
        let summed = x.broadcast_mul(&keep)?.sum(1)?;
        let counts = keep.sum(1)?.clamp(1.0, f64::INFINITY)?;
        let pooled = summed.broadcast_div(&counts)?;
        self.head.forward(&pooled)?.squeeze(D::Minus1)
    }
}
