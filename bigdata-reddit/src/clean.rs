use {
    std::time::Duration,
    anyhow::{Context, Result},
    indicatif::ProgressBar,
    tracing::info,
    bigdata_reddit_core::{
        aggregation::{self, CategoryOrder},
        config::CleanStepConfig,
        export,
        Dataset,
        Field,
        View,
    },
    crate::utils::{write_file, or_na},
};

pub fn run_clean_step(config: &CleanStepConfig) -> Result<()> {
    let source = config.source();
    let output = config.output();

    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("loading {}", source));

    let dataset = Dataset::load(&source)?;

    pb.set_message(format!("cleaning {} posts", dataset.len()));
    let cleaned = dataset.clean();
    pb.finish_and_clear();

    log_dataset_stats(&cleaned);

    let data = export::export(&cleaned)?;
    write_file(&output, &data).with_context(|| format!("failed to write {}", output))?;

    info!("cleaned dataset saved to {}", output);

    Ok(())
}

fn log_dataset_stats(dataset: &Dataset) {
    let view = View::all(dataset);

    if let Some(flairs) = aggregation::count_by_category(&view, Field::LinkFlairText) {
        for (flair, count) in flairs {
            info!("posts with flair {}: {}", flair, count);
        }
    }

    if let Some(means) = aggregation::mean_by_category(&view, Field::LinkFlairText, Field::Ups, &CategoryOrder::ByMagnitude) {
        for (flair, mean) in means {
            info!("average upvotes for flair {}: {:.1}", flair, mean);
        }
    }

    if let Some(weekdays) = aggregation::count_by_category(&view, Field::Weekday) {
        for (weekday, count) in weekdays {
            info!("posts on {}: {}", weekday, count);
        }
    }

    if dataset.schema().has_field(Field::UpvoteRatio) {
        let stats = aggregation::describe(&view, Field::UpvoteRatio);
        info!(
            "upvote ratio: max {}, average {}, min {}",
            or_na(stats.as_ref().map(|v| format!("{:.2}", v.max))),
            or_na(stats.as_ref().map(|v| format!("{:.2}", v.mean))),
            or_na(stats.as_ref().map(|v| format!("{:.2}", v.min))),
        );
    }
}
