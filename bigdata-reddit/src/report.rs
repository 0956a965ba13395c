use {
    anyhow::{Context, Result},
    tracing::{info, warn},
    bigdata_reddit_core::{
        cache::DatasetCache,
        config::ReportStepConfig,
        export,
        report::{self, Report},
        sentiment::{LexiconEstimator, PolarityEstimator, SentimentScorer},
    },
    crate::utils::{write_file, or_na},
};

pub fn run_report_step(config: &ReportStepConfig, cache: &DatasetCache) -> Result<()> {
    let source = config.source();
    let dataset = cache.get_or_load(&source)?;
    let options = config.report_options();

    let scorer = SentimentScorer::new(estimator(config)?);
    let report = report::build(&dataset, &options, &scorer);
    log_report(&report);

    if let Some(output) = config.output() {
        let data = serde_json::to_vec_pretty(&report)?;
        write_file(output, &data).with_context(|| format!("failed to write {}", output))?;
        info!("report saved to {}", output);
    }

    let view = options.filter.apply(&dataset);
    let columns = if config.table_columns().is_empty() {
        export::default_columns(dataset.schema())
    } else {
        config.table_columns().to_vec()
    };

    let shown = export::preview(&view, &columns, config.rows_to_show());
    info!("table preview: {} of {} rows, columns: {}", shown.len(), view.len(), columns.join(", "));

    let export_path = config.export();
    let data = export::export_selection(&view, &columns)?;
    write_file(&export_path, &data).with_context(|| format!("failed to write {}", export_path))?;
    info!("filtered data saved to {}", export_path);

    Ok(())
}

fn estimator(config: &ReportStepConfig) -> Result<Box<dyn PolarityEstimator>> {
    if config.use_bert() {
        #[cfg(feature = "bert")]
        {
            let estimator = bigdata_reddit_core::sentiment::BertEstimator::new()
                .context("failed to load sentiment model")?;
            return Ok(Box::new(estimator));
        }

        #[cfg(not(feature = "bert"))]
        warn!("bert sentiment requested, but built without the bert feature; using lexicon estimator");
    }

    Ok(Box::new(LexiconEstimator::default()))
}

fn log_report(report: &Report) {
    info!("showing {} of {} posts", report.showing, report.total);

    let summary = &report.summary;
    info!(
        "total posts: {}, avg upvote ratio: {}, unique flairs: {}, max upvotes: {}",
        summary.total_posts,
        or_na(summary.avg_upvote_ratio.map(|v| format!("{:.2}", v))),
        or_na(summary.unique_flairs),
        or_na(summary.max_upvotes),
    );

    if let Some(flairs) = &report.flair_distribution {
        for (flair, count) in flairs {
            info!("flair {}: {} posts", flair, count);
        }
    }

    for (term, frequency) in &report.top_terms {
        info!("term {}: {}", term, frequency);
    }

    match &report.sentiment {
        Some(sentiment) => info!("overall {:?} sentiment (avg polarity: {:.2})", sentiment.label, sentiment.mean),
        None => info!("sentiment: N/A"),
    }

    if let Some(weekdays) = &report.mean_ups_by_weekday {
        for (weekday, mean) in weekdays {
            info!("average upvotes on {}: {:.1}", weekday, mean);
        }
    }
}
