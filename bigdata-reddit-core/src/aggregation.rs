use {
    std::collections::{HashMap, HashSet},
    serde::{Serialize, Deserialize},
    crate::{
        filter::View,
        normalizer::normalize,
        schema::Field,
        stopwords::is_stop_word,
    },
};

/// How `mean_by_category` orders its output. The caller picks; nothing is
/// inferred from the data.
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryOrder {
    /// Largest mean first, ties in order of first appearance.
    ByMagnitude,
    /// Exactly this order. Categories not listed are dropped.
    Canonical(Vec<String>),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_posts: usize,
    pub avg_upvote_ratio: Option<f64>,
    pub unique_flairs: Option<usize>,
    pub max_upvotes: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NumericStats {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Bin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

impl CategoryOrder {
    pub fn weekdays() -> Self {
        Self::Canonical(crate::schema::WEEKDAYS.iter().map(|v| v.to_string()).collect())
    }
}

/// Number of records per category, most frequent first. `None` when the
/// column is absent.
pub fn count_by_category(view: &View, field: Field) -> Option<Vec<(String, usize)>> {
    if !view.schema().has_field(field) {
        return None;
    }

    let mut groups = Groups::new();
    for value in view.texts(field) {
        *groups.entry(value, 0usize) += 1;
    }

    let mut counts = groups.into_vec();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    Some(counts)
}

/// Mean of `numeric_field` per category of `field`, over present values only.
/// Categories without any present value are left out.
pub fn mean_by_category(view: &View, field: Field, numeric_field: Field, order: &CategoryOrder) -> Option<Vec<(String, f64)>> {
    let schema = view.schema();
    if !schema.has_field(field) || !schema.has_field(numeric_field) {
        return None;
    }

    let mut groups = Groups::new();
    for record in view.records() {
        if let (Some(category), Some(value)) = (record.text(field), record.number(numeric_field)) {
            let (sum, count) = groups.entry(category, (0.0, 0usize));
            *sum += value;
            *count += 1;
        }
    }

    let means: Vec<(String, f64)> = groups.into_vec()
        .into_iter()
        .map(|(category, (sum, count))| (category, sum / count as f64))
        .collect();

    Some(match order {
        CategoryOrder::ByMagnitude => {
            let mut means = means;
            means.sort_by(|a, b| b.1.total_cmp(&a.1));
            means
        },
        CategoryOrder::Canonical(canonical) => {
            let mut by_category: HashMap<String, f64> = means.into_iter().collect();
            canonical.iter()
                .filter_map(|category| by_category.remove(category).map(|mean| (category.clone(), mean)))
                .collect()
        },
    })
}

/// The `k` most frequent non stop-word tokens of a text column. Values are
/// normalized first, so raw and cleaned columns give the same terms.
pub fn top_terms(view: &View, text_field: Field, k: usize) -> Vec<(String, usize)> {
    if !view.schema().has_field(text_field) || k == 0 {
        return Vec::new();
    }

    let mut groups = Groups::new();
    for text in view.texts(text_field) {
        let cleaned = normalize(Some(text));
        for token in cleaned.split_whitespace().filter(|token| !is_stop_word(token)) {
            *groups.entry(token, 0usize) += 1;
        }
    }

    let mut terms = groups.into_vec();
    terms.sort_by(|a, b| b.1.cmp(&a.1));
    terms.truncate(k);
    terms
}

pub fn summary(view: &View) -> Summary {
    let schema = view.schema();

    let avg_upvote_ratio = if schema.has_field(Field::UpvoteRatio) {
        describe(view, Field::UpvoteRatio).map(|stats| stats.mean)
    } else {
        None
    };

    let unique_flairs = if schema.has_field(Field::LinkFlairText) {
        Some(view.texts(Field::LinkFlairText).collect::<HashSet<_>>().len())
    } else {
        None
    };

    let max_upvotes = view.records().filter_map(|record| record.ups()).max();

    Summary {
        total_posts: view.len(),
        avg_upvote_ratio,
        unique_flairs,
        max_upvotes,
    }
}

/// Min, mean and max over the present values of a numeric column.
pub fn describe(view: &View, numeric_field: Field) -> Option<NumericStats> {
    if !view.schema().has_field(numeric_field) {
        return None;
    }

    let mut count = 0;
    let mut sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for value in view.numbers(numeric_field) {
        count += 1;
        sum += value;
        min = min.min(value);
        max = max.max(value);
    }

    if count == 0 {
        return None;
    }

    Some(NumericStats {
        min,
        mean: sum / count as f64,
        max,
    })
}

/// Equal-width histogram. Identical values all land in one bin.
pub fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    let values: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if min == max {
        return vec![Bin { lower: min, upper: max, count: values.len() }];
    }

    let width = (max - min) / bins as f64;
    let mut result: Vec<Bin> = (0..bins)
        .map(|index| Bin {
            lower: min + width * index as f64,
            upper: if index + 1 == bins { max } else { min + width * (index + 1) as f64 },
            count: 0,
        })
        .collect();

    for value in values {
        let index = (((value - min) / width).floor() as usize).min(bins - 1);
        result[index].count += 1;
    }

    result
}

// insertion-ordered grouping, so stable sorts keep first-appearance order on ties
struct Groups<T> {
    index: HashMap<String, usize>,
    entries: Vec<(String, T)>,
}

impl<T> Groups<T> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    fn entry(&mut self, key: &str, initial: T) -> &mut T {
        let position = match self.index.get(key) {
            Some(position) => *position,
            None => {
                self.entries.push((key.to_owned(), initial));
                self.index.insert(key.to_owned(), self.entries.len() - 1);
                self.entries.len() - 1
            },
        };

        &mut self.entries[position].1
    }

    fn into_vec(self) -> Vec<(String, T)> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            filter::{Membership, View},
            schema::Schema,
            store::{Dataset, Record},
        },
    };

    fn scenario() -> Dataset {
        let records = vec![
            Record::builder().link_flair_text("News").ups(10).build(),
            Record::builder().link_flair_text("News").ups(20).build(),
            Record::builder().link_flair_text("Discussion").ups(5).build(),
        ];
        Dataset::new(Schema::from_headers(["link_flair_text", "ups"]), records)
    }

    #[test]
    fn counts_and_means_for_scenario() {
        let dataset = scenario();
        let view = View::all(&dataset);

        assert_eq!(
            count_by_category(&view, Field::LinkFlairText),
            Some(vec![("News".to_owned(), 2), ("Discussion".to_owned(), 1)])
        );
        assert_eq!(
            mean_by_category(&view, Field::LinkFlairText, Field::Ups, &CategoryOrder::ByMagnitude),
            Some(vec![("News".to_owned(), 15.0), ("Discussion".to_owned(), 5.0)])
        );
    }

    #[test]
    fn count_ties_keep_first_appearance() {
        let records = ["b", "a", "c", "a", "b", "c"].iter()
            .map(|flair| Record::builder().link_flair_text(*flair).build())
            .collect();
        let dataset = Dataset::new(Schema::from_headers(["link_flair_text"]), records);

        let counts = count_by_category(&View::all(&dataset), Field::LinkFlairText).unwrap();
        let order: Vec<&str> = counts.iter().map(|(category, _)| category.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn count_sum_matches_present_values() {
        let records = vec![
            Record::builder().link_flair_text("x").build(),
            Record::builder().build(),
            Record::builder().link_flair_text("y").build(),
            Record::builder().link_flair_text("x").build(),
        ];
        let dataset = Dataset::new(Schema::from_headers(["link_flair_text"]), records);
        let view = View::all(&dataset);

        let total: usize = count_by_category(&view, Field::LinkFlairText).unwrap().iter().map(|(_, count)| count).sum();
        assert_eq!(total, view.texts(Field::LinkFlairText).count());
        assert_eq!(total, 3);
    }

    #[test]
    fn absent_columns_are_unavailable() {
        let dataset = scenario();
        let view = View::all(&dataset);

        assert_eq!(count_by_category(&view, Field::Weekday), None);
        assert_eq!(mean_by_category(&view, Field::Weekday, Field::Ups, &CategoryOrder::weekdays()), None);
        assert_eq!(describe(&view, Field::UpvoteRatio), None);
        assert!(top_terms(&view, Field::Title, 5).is_empty());
    }

    #[test]
    fn empty_view_gives_empty_results() {
        let dataset = scenario();
        let view = Membership::new(Field::LinkFlairText, ["Nothing"]).apply(&dataset);

        assert_eq!(count_by_category(&view, Field::LinkFlairText), Some(vec![]));
        assert_eq!(mean_by_category(&view, Field::LinkFlairText, Field::Ups, &CategoryOrder::ByMagnitude), Some(vec![]));

        let summary = summary(&view);
        assert_eq!(summary.total_posts, 0);
        assert_eq!(summary.max_upvotes, None);
        assert_eq!(summary.unique_flairs, Some(0));
    }

    #[test]
    fn means_skip_missing_numbers_and_follow_canonical_order() {
        let records = vec![
            Record::builder().weekday("Friday").ups(4).build(),
            Record::builder().weekday("Monday").ups(1).build(),
            Record::builder().weekday("Monday").build(),
            Record::builder().weekday("Monday").ups(3).build(),
            Record::builder().weekday("Sunday").build(),
            Record::builder().weekday("Someday").ups(100).build(),
        ];
        let dataset = Dataset::new(Schema::from_headers(["weekday", "ups"]), records);
        let view = View::all(&dataset);

        assert_eq!(
            mean_by_category(&view, Field::Weekday, Field::Ups, &CategoryOrder::weekdays()),
            Some(vec![("Monday".to_owned(), 2.0), ("Friday".to_owned(), 4.0)])
        );
        assert_eq!(
            mean_by_category(&view, Field::Weekday, Field::Ups, &CategoryOrder::ByMagnitude),
            Some(vec![("Someday".to_owned(), 100.0), ("Friday".to_owned(), 4.0), ("Monday".to_owned(), 2.0)])
        );
    }

    #[test]
    fn equal_means_keep_first_appearance() {
        let records = vec![
            Record::builder().link_flair_text("Meme").ups(10).build(),
            Record::builder().link_flair_text("News").ups(4).build(),
            Record::builder().link_flair_text("Discussion").ups(20).build(),
            Record::builder().link_flair_text("News").ups(16).build(),
            Record::builder().link_flair_text("Art").ups(10).build(),
        ];
        let dataset = Dataset::new(Schema::from_headers(["link_flair_text", "ups"]), records);
        let view = View::all(&dataset);

        assert_eq!(
            mean_by_category(&view, Field::LinkFlairText, Field::Ups, &CategoryOrder::ByMagnitude),
            Some(vec![
                ("Discussion".to_owned(), 20.0),
                ("Meme".to_owned(), 10.0),
                ("News".to_owned(), 10.0),
                ("Art".to_owned(), 10.0),
            ])
        );
    }

    #[test]
    fn top_terms_skip_stop_words() {
        let records = vec![
            Record::builder().title("Rust is great, Rust is fast!").build(),
            Record::builder().title("Why the borrow checker is great").build(),
            Record::builder().build(),
            Record::builder().title("fast fast http://rust-lang.org").build(),
        ];
        let dataset = Dataset::new(Schema::from_headers(["title"]), records);

        let terms = top_terms(&View::all(&dataset), Field::Title, 3);
        assert_eq!(terms, vec![
            ("fast".to_owned(), 3),
            ("rust".to_owned(), 2),
            ("great".to_owned(), 2),
        ]);
    }

    #[test]
    fn top_terms_of_all_null_column_is_empty() {
        let dataset = Dataset::new(Schema::from_headers(["title"]), vec![Record::builder().build()]);
        assert!(top_terms(&View::all(&dataset), Field::Title, 15).is_empty());
    }

    #[test]
    fn summary_reports_metrics() {
        let records = vec![
            Record::builder().link_flair_text("a").ups(3).upvote_ratio(0.5).build(),
            Record::builder().link_flair_text("b").ups(9).upvote_ratio(1.0).build(),
            Record::builder().link_flair_text("a").build(),
        ];
        let dataset = Dataset::new(Schema::from_headers(["link_flair_text", "ups", "upvote_ratio"]), records);

        let summary = summary(&View::all(&dataset));
        assert_eq!(summary, Summary {
            total_posts: 3,
            avg_upvote_ratio: Some(0.75),
            unique_flairs: Some(2),
            max_upvotes: Some(9),
        });
    }

    #[test]
    fn histogram_counts_every_value() {
        let values = [0.0, 0.1, 0.5, 0.9, 1.0, -1.0];
        let bins = histogram(&values, 4);

        assert_eq!(bins.len(), 4);
        assert_eq!(bins.iter().map(|bin| bin.count).sum::<usize>(), values.len());
        assert_eq!(bins[0].lower, -1.0);
        assert_eq!(bins[3].upper, 1.0);
        assert_eq!(bins[3].count, 3);
    }

    #[test]
    fn histogram_of_constant_values_is_one_bin() {
        assert_eq!(histogram(&[0.0, 0.0], 25), vec![Bin { lower: 0.0, upper: 0.0, count: 2 }]);
        assert!(histogram(&[], 25).is_empty());
    }
}
