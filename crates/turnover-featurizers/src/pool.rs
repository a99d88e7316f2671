//! Bounded worker pool for extraction.
//!
//! Workers run blocking external-tool invocations independently and share no
//! mutable state; results come back in submission order regardless of which
//! worker finished first. A single failed unit fails the whole run.
use anyhow::{Context, Result};
use rayon::prelude::*;

pub struct ExtractionPool {
    num_workers: usize,
}

impl ExtractionPool {
    pub fn new(num_workers: usize) -> Self {
        Self {
            num_workers: num_workers.max(1),
        }
    }

    /// Apply `work` to every item on the pool's workers. Generic over the
    /// work function so the pool's ordering guarantee is testable without
    /// the external tool.
    pub fn run<I, T, F>(&self, items: &[I], work: F) -> Result<Vec<T>>
    where
        I: Sync,
        T: Send,
        F: Fn(&I) -> Result<T> + Sync,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.num_workers)
            .build()
            .context("Failed to build extraction worker pool")?;
        pool.install(|| items.par_iter().map(|item| work(item)).collect())
    }
}
