//! turnover-plms
//!
//! Batched inference over protein "structure sequences": windowing of
//! variable-length sequences into a fixed token budget, tokenization into
//! fixed-shape tensors, and scoring with pretrained sequence models.
//!
//! ```shell
//! cargo run --bin turnover -- predict --data-path data/foldseek_result.csv \
//!     --model-path model.safetensors
//! ```
use candle_core::utils::{cuda_is_available, metal_is_available};
use candle_core::{Device, Result};

pub use config::{Architecture, PaddingSide, PredictConfig, Task};
pub use dataset::InferenceDataset;
pub use exec::ExecContext;
pub use models::{Esm2Config, Esm2Scorer, LstmConfig, LstmScorer, Scorer};
pub use predict::{binarize, BatchedPredictor};
pub use tokenizer::TokenizationAdapter;
pub use window::{split_residues, WindowPolicy};

pub mod config;
pub mod dataset;
pub mod exec;
pub mod models;
pub mod predict;
pub mod tokenizer;
pub mod window;

pub fn device(cpu: bool) -> Result<Device> {
    if cpu {
        Ok(Device::Cpu)
    } else if cuda_is_available() {
        Ok(Device::new_cuda(0)?)
    } else if metal_is_available() {
        Ok(Device::new_metal(0)?)
    } else {
        #[cfg(all(target_os = "macos", target_arch = "aarch64"))]
        {
            println!("Running on CPU, to run on GPU(metal), build with `--features metal`");
        }
        #[cfg(not(all(target_os = "macos", target_arch = "aarch64")))]
        {
            println!("Running on CPU, to run on GPU, build with `--features cuda`");
        }
        Ok(Device::Cpu)
    }
}
