use {
    serde::{Serialize, Deserialize},
    tracing::info,
    crate::{
        aggregation::{self, Bin, CategoryOrder, Summary},
        filter::Membership,
        schema::Field,
        sentiment::{self, PolarityEstimator, SentimentLabel, SentimentScorer},
        store::Dataset,
    },
};

/// What one recomputation pass should compute.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub filter: Membership,
    pub terms_field: Field,
    pub top_terms: usize,
    pub sentiment_field: Field,
    pub histogram_bins: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SentimentReport {
    pub mean: f64,
    pub label: SentimentLabel,
    pub histogram: Vec<Bin>,
}

/// Everything the presentation layer draws for one filter state. `None`
/// means the inputs were not available, not zero.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Report {
    pub showing: usize,
    pub total: usize,
    pub flair_options: Option<Vec<String>>,
    pub summary: Summary,
    pub flair_distribution: Option<Vec<(String, usize)>>,
    pub mean_ups_by_flair: Option<Vec<(String, f64)>>,
    pub posts_by_weekday: Option<Vec<(String, usize)>>,
    pub mean_ups_by_weekday: Option<Vec<(String, f64)>>,
    pub top_terms: Vec<(String, usize)>,
    pub sentiment: Option<SentimentReport>,
    pub comments_histogram: Option<Vec<Bin>>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            filter: Membership::everything(Field::LinkFlairText),
            terms_field: Field::Title,
            top_terms: 15,
            sentiment_field: Field::Title,
            histogram_bins: 25,
        }
    }
}

/// Runs one pass: filter the dataset, then derive every output from the
/// resulting view. Nothing is kept between passes.
pub fn build<E: PolarityEstimator>(dataset: &Dataset, options: &ReportOptions, scorer: &SentimentScorer<E>) -> Report {
    let view = options.filter.apply(dataset);
    info!("showing {} of {} posts", view.len(), dataset.len());

    let sentiment = scorer.score_view(&view, options.sentiment_field)
        .and_then(|scores| sentiment::mean(&scores).map(|mean| SentimentReport {
            mean,
            label: sentiment::label(mean),
            histogram: aggregation::histogram(&scores, options.histogram_bins),
        }));

    let comments_histogram = if view.schema().has_field(Field::NumComments) {
        let comments: Vec<f64> = view.numbers(Field::NumComments).collect();
        Some(aggregation::histogram(&comments, options.histogram_bins))
    } else {
        None
    };

    Report {
        showing: view.len(),
        total: dataset.len(),
        flair_options: dataset.distinct_values(Field::LinkFlairText),
        summary: aggregation::summary(&view),
        flair_distribution: aggregation::count_by_category(&view, Field::LinkFlairText),
        mean_ups_by_flair: aggregation::mean_by_category(&view, Field::LinkFlairText, Field::Ups, &CategoryOrder::ByMagnitude),
        posts_by_weekday: aggregation::count_by_category(&view, Field::Weekday),
        mean_ups_by_weekday: aggregation::mean_by_category(&view, Field::Weekday, Field::Ups, &CategoryOrder::weekdays()),
        top_terms: aggregation::top_terms(&view, options.terms_field, options.top_terms),
        sentiment,
        comments_histogram,
    }
}
