use {
    tracing::info,
    bigdata_reddit_core::{
        cache::DatasetCache,
        config::Config,
    },
    crate::{
        clean::run_clean_step,
        report::run_report_step,
    },
};

mod clean;
mod report;
mod utils;

fn main() -> anyhow::Result<()> {
    utils::init_logging();

    info!("bigdata reddit submissions analysis");

    let config = Config::load();
    let cache = DatasetCache::new();

    if config.steps.clean.enabled {
        run_clean_step(&config.steps.clean)?;
    }

    if config.steps.report.enabled {
        run_report_step(&config.steps.report, &cache)?;
    }

    Ok(())
}
