//! Tokenization of windowed sequences into fixed-shape tensors.
//!
//! Wraps a pretrained `tokenizers::Tokenizer` resolved by model name or local
//! path. Sentinel tokens and padding are applied here, so the tokenizer
//! itself runs without truncation: if a windowed sequence still overflows
//! `max_length`, that is a length-accounting bug and surfaces as an error.
use crate::config::PaddingSide;
use anyhow::{anyhow, bail, Result};
use candle_core::{Device, Tensor};
use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};
use std::path::Path;
use tokenizers::Tokenizer;

pub struct TokenizationAdapter {
    tokenizer: Tokenizer,
    cls_id: u32,
    eos_id: u32,
    pad_id: u32,
    max_length: usize,
    padding_side: PaddingSide,
}

impl TokenizationAdapter {
    /// Resolve `model` as a local directory containing `tokenizer.json`, or
    /// as a hf-hub model id. Resolution failures propagate; there is no
    /// fallback tokenizer.
    pub fn from_pretrained(
        model: &str,
        max_length: usize,
        padding_side: PaddingSide,
    ) -> Result<Self> {
        let local = Path::new(model).join("tokenizer.json");
        let tokenizer_path = if local.is_file() {
            local
        } else {
            let repo = Repo::with_revision(model.to_string(), RepoType::Model, "main".to_string());
            Api::new()?.repo(repo).get("tokenizer.json")?
        };
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {tokenizer_path:?}: {e}"))?;
        Self::from_tokenizer(tokenizer, max_length, padding_side)
    }

    pub fn from_tokenizer(
        tokenizer: Tokenizer,
        max_length: usize,
        padding_side: PaddingSide,
    ) -> Result<Self> {
        let cls_id = tokenizer
            .token_to_id("<cls>")
            .ok_or_else(|| anyhow!("Missing cls token"))?;
        let eos_id = tokenizer
            .token_to_id("<eos>")
            .ok_or_else(|| anyhow!("Missing eos token"))?;
        let pad_id = tokenizer
            .token_to_id("<pad>")
            .ok_or_else(|| anyhow!("Missing pad token"))?;
        Ok(Self {
            tokenizer,
            cls_id,
            eos_id,
            pad_id,
            max_length,
            padding_side,
        })
    }

    pub fn vocab_size(&self) -> usize {
        self.tokenizer.get_vocab_size(true)
    }

    pub fn pad_id(&self) -> u32 {
        self.pad_id
    }

    /// Encode windowed residue segments into exactly `max_length` token ids:
    /// `<cls>` + segment ids + `<eos>`, with an `<eos>` separator between the
    /// two segments of a `both` window, padded on the configured side.
    pub fn encode_windowed(&self, segments: &[&[String]]) -> Result<Tensor> {
        let mut ids: Vec<u32> = vec![self.cls_id];
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                ids.push(self.eos_id);
            }
            let encoding = self
                .tokenizer
                .encode(segment.join(" ").as_str(), false)
                .map_err(|e| anyhow!("Failed to encode sequence: {e}"))?;
            ids.extend_from_slice(encoding.get_ids());
        }
        ids.push(self.eos_id);

        if ids.len() > self.max_length {
            bail!(
                "windowed sequence tokenized to {} ids, over the configured max_length {}",
                ids.len(),
                self.max_length
            );
        }
        let pad = vec![self.pad_id; self.max_length - ids.len()];
        let ids = match self.padding_side {
            PaddingSide::Right => [ids, pad].concat(),
            PaddingSide::Left => [pad, ids].concat(),
        };
        Ok(Tensor::new(ids, &Device::Cpu)?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokenizers::models::wordlevel::WordLevel;
    use tokenizers::pre_tokenizers::whitespace::Whitespace;

    /// A minimal whitespace/word-level tokenizer over a toy residue alphabet.
    pub(crate) fn toy_tokenizer() -> Tokenizer {
        let mut vocab = HashMap::new();
        for (i, token) in ["<cls>", "<pad>", "<eos>", "<unk>", "A", "C", "D", "E", "Aa", "Cc"]
            .iter()
            .enumerate()
        {
            vocab.insert(token.to_string(), i as u32);
        }
        let model = WordLevel::builder()
            .vocab(vocab)
            .unk_token("<unk>".to_string())
            .build()
            .unwrap();
        let mut tokenizer = Tokenizer::new(model);
        tokenizer.with_pre_tokenizer(Some(Whitespace {}));
        tokenizer
    }

    pub(crate) fn toy_adapter(max_length: usize, side: PaddingSide) -> TokenizationAdapter {
        TokenizationAdapter::from_tokenizer(toy_tokenizer(), max_length, side).unwrap()
    }

    fn seq(letters: &[&str]) -> Vec<String> {
        letters.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn encodes_to_fixed_shape_with_right_padding() {
        let adapter = toy_adapter(8, PaddingSide::Right);
        let units = seq(&["A", "C", "D"]);
        let ids: Vec<u32> = adapter
            .encode_windowed(&[&units])
            .unwrap()
            .to_vec1()
            .unwrap();
        assert_eq!(ids, vec![0, 4, 5, 6, 2, 1, 1, 1]);
    }

    #[test]
    fn pads_on_the_left_when_configured() {
        let adapter = toy_adapter(8, PaddingSide::Left);
        let units = seq(&["A", "C", "D"]);
        let ids: Vec<u32> = adapter
            .encode_windowed(&[&units])
            .unwrap()
            .to_vec1()
            .unwrap();
        assert_eq!(ids, vec![1, 1, 1, 0, 4, 5, 6, 2]);
    }

    #[test]
    fn joins_both_segments_with_separator() {
        let adapter = toy_adapter(8, PaddingSide::Right);
        let head = seq(&["A", "C"]);
        let tail = seq(&["D", "E"]);
        let ids: Vec<u32> = adapter
            .encode_windowed(&[&head, &tail])
            .unwrap()
            .to_vec1()
            .unwrap();
        assert_eq!(ids, vec![0, 4, 5, 2, 6, 7, 2, 1]);
    }

    #[test]
    fn overflow_is_an_invariant_violation() {
        let adapter = toy_adapter(4, PaddingSide::Right);
        let units = seq(&["A", "C", "D", "E"]);
        assert!(adapter.encode_windowed(&[&units]).is_err());
    }
}
