//! Batched prediction loop.
//!
//! Batches are fixed-size, non-shuffled, and never dropped, so score `i` of
//! the output always corresponds to dataset row `i`. Tokenization is CPU
//! work and may run on rayon workers ahead of device compute.
use crate::config::Task;
use crate::dataset::InferenceDataset;
use crate::exec::ExecContext;
use crate::models::Scorer;
use anyhow::Result;
use candle_core::{DType, Device, Tensor};
use candle_nn::ops::sigmoid;
use rayon::prelude::*;

pub struct BatchedPredictor<'a> {
    model: &'a Scorer,
    ctx: &'a ExecContext,
    task: Task,
    batch_size: usize,
    num_workers: usize,
}

impl<'a> BatchedPredictor<'a> {
    pub fn new(
        model: &'a Scorer,
        ctx: &'a ExecContext,
        task: Task,
        batch_size: usize,
        num_workers: usize,
    ) -> Self {
        Self {
            model,
            ctx,
            task,
            batch_size: batch_size.max(1),
            num_workers,
        }
    }

    fn tokenize_batch(&self, dataset: &InferenceDataset, rows: &[usize]) -> Result<Vec<Tensor>> {
        if self.num_workers > 1 {
            rows.par_iter()
                .map(|&i| dataset.get(i).map(|(ids, _)| ids))
                .collect()
        } else {
            rows.iter()
                .map(|&i| dataset.get(i).map(|(ids, _)| ids))
                .collect()
        }
    }

    /// Score every dataset row in order. Classification scores pass through
    /// a sigmoid; regression scores are collected raw.
    pub fn predict(&self, dataset: &InferenceDataset) -> Result<Vec<f32>> {
        let rows: Vec<usize> = (0..dataset.len()).collect();
        let mut scores = Vec::with_capacity(dataset.len());
        for batch in rows.chunks(self.batch_size) {
            let items = self.tokenize_batch(dataset, batch)?;
            let token_ids = Tensor::stack(&items, 0)?.to_device(&self.ctx.device)?;
            let raw = self.model.forward(&token_ids)?;
            let raw = match self.task {
                Task::Classification => sigmoid(&raw)?,
                Task::Regression => raw,
            };
            let host = raw.to_dtype(DType::F32)?.to_device(&Device::Cpu)?;
            scores.extend(host.flatten_all()?.to_vec1::<f32>()?);
        }
        // Batch jobs may run several predict calls per session; make sure
        // device work is finished before the tensors above are dropped.
        self.ctx.device.synchronize()?;
        Ok(scores)
    }
}

/// Binary decisions from classification scores. The threshold is exclusive:
/// exactly 0.5 maps to 0.
pub fn binarize(scores: &[f32]) -> Vec<i64> {
    scores.iter().map(|&s| i64::from(s > 0.5)).collect()
}
