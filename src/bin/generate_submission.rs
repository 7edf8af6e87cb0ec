use demand_forecast::{pipeline, PipelineConfig};
use env_logger::Env;
use log::{error, info};
use std::process;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = PipelineConfig::default();
    info!(
        "generating submission from {} into {}",
        config.data_dir.display(),
        config.submissions_dir.display()
    );

    match pipeline::run(&config) {
        Ok(summary) => {
            info!(
                "done: {} records ({} pairs x {} weeks ahead), trained on {} rows",
                summary.records,
                summary.pairs,
                summary.records / summary.pairs.max(1),
                summary.training_rows
            );
        }
        Err(err) => {
            error!("pipeline failed: {}", err);
            process::exit(1);
        }
    }
}
