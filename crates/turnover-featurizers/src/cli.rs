use super::commands;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use turnover_plms::{Architecture, PaddingSide, Task, WindowPolicy};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract foldseek 3Di structure sequences from a directory of PDB files.
    Extract {
        /// Directory containing PDB files, searched recursively.
        #[arg(long, default_value = "./pdb_files")]
        pdb_dir: PathBuf,

        /// Number of extraction workers.
        #[arg(long, default_value_t = 2)]
        num_processes: usize,

        #[arg(long, default_value = "./data")]
        output_dir: PathBuf,

        #[arg(long, default_value = "foldseek_result.csv")]
        output_file: String,

        /// Chain ID to extract from every PDB file.
        #[arg(long, default_value = "A")]
        chain: String,

        /// Path to the foldseek executable.
        #[arg(long, default_value = "foldseek")]
        foldseek: PathBuf,
    },
    /// Score sequences from a CSV with a fine-tuned sequence model.
    Predict {
        /// Input CSV holding the sequence column.
        #[arg(long, required = true)]
        data_path: PathBuf,

        /// Pretrained model name or local directory (tokenizer source).
        #[arg(long, default_value = "westlake-repl/SaProt_650M_AF2")]
        model: String,

        #[arg(long, value_enum, default_value_t = Architecture::SaProt)]
        architecture: Architecture,

        /// Safetensors checkpoint with the fine-tuned weights.
        #[arg(long, required = true)]
        model_path: PathBuf,

        #[arg(long, default_value_t = 4)]
        batch_size: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Use reduced precision on accelerator devices.
        #[arg(long, default_value_t = false)]
        use_amp: bool,

        /// Workers for CPU-side tokenization.
        #[arg(long, default_value_t = 4)]
        num_workers: usize,

        /// Model input length including the <cls> and <eos> tokens.
        #[arg(long, default_value_t = 512)]
        max_length: usize,

        /// Which part of an over-length sequence to keep.
        #[arg(long, value_enum, default_value_t = WindowPolicy::Left)]
        used_sequence: WindowPolicy,

        #[arg(long, value_enum, default_value_t = PaddingSide::Right)]
        padding_side: PaddingSide,

        #[arg(long, default_value = "./output")]
        output_dir: PathBuf,

        #[arg(long, value_enum, default_value_t = Task::Classification)]
        task: Task,

        /// Column name for the input sequence.
        #[arg(long, default_value = "aa_foldseek")]
        sequence_col: String,

        /// Run on CPU even when an accelerator is available.
        #[arg(long, default_value_t = false)]
        cpu: bool,
    },
}

impl Cli {
    pub fn execute(self) -> anyhow::Result<()> {
        match self.command {
            Commands::Extract {
                pdb_dir,
                num_processes,
                output_dir,
                output_file,
                chain,
                foldseek,
            } => commands::extract::execute(
                &pdb_dir,
                num_processes,
                &output_dir,
                &output_file,
                &chain,
                &foldseek,
            ),
            Commands::Predict {
                data_path,
                model,
                architecture,
                model_path,
                batch_size,
                seed,
                use_amp,
                num_workers,
                max_length,
                used_sequence,
                padding_side,
                output_dir,
                task,
                sequence_col,
                cpu,
            } => {
                let cfg = turnover_plms::PredictConfig {
                    model,
                    model_path,
                    architecture,
                    task,
                    batch_size,
                    seed,
                    use_amp,
                    num_workers,
                    max_length,
                    used_sequence,
                    padding_side,
                    sequence_col,
                };
                commands::predict::execute(&data_path, &output_dir, cpu, &cfg)
            }
        }
    }
}
