use anyhow::Result;
use polars::prelude::*;
use std::path::Path;
use turnover_featurizers::{read_csv, write_csv};
use turnover_plms::{
    binarize, BatchedPredictor, ExecContext, InferenceDataset, PredictConfig, Scorer, Task,
    TokenizationAdapter,
};

pub fn execute(
    data_path: &Path,
    output_dir: &Path,
    cpu: bool,
    cfg: &PredictConfig,
) -> Result<()> {
    let ctx = ExecContext::resolve(cpu, cfg.use_amp)?;
    println!(
        "Predicting with {} ({}) on {:?} at {:?}",
        cfg.architecture, cfg.task, ctx.device, ctx.dtype
    );
    ctx.device.set_seed(cfg.seed)?;

    let mut df = read_csv(data_path)?;
    let adapter =
        TokenizationAdapter::from_pretrained(&cfg.model, cfg.max_length, cfg.padding_side)?;
    let vocab_size = adapter.vocab_size();
    let pad_id = adapter.pad_id();
    let dataset = InferenceDataset::from_frame(&df, cfg, adapter)?;

    let model = Scorer::load(cfg, vocab_size, pad_id, &ctx)?;
    let predictor =
        BatchedPredictor::new(&model, &ctx, cfg.task, cfg.batch_size, cfg.num_workers);
    let scores = predictor.predict(&dataset)?;
    drop(model);

    df.with_column(Column::new("raw prediction values".into(), &scores))?;
    if cfg.task == Task::Classification {
        df.with_column(Column::new(
            "binary prediction values".into(),
            binarize(&scores),
        ))?;
    }

    std::fs::create_dir_all(output_dir)?;
    let out_path = output_dir.join("result.csv");
    write_csv(&mut df, &out_path)?;
    println!("Wrote {} scored rows to {out_path:?}", df.height());
    Ok(())
}
