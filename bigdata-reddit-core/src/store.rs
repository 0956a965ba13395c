use {
    std::{collections::{BTreeMap, BTreeSet}, fs::File, io::Read, path::Path},
    serde::{Deserialize, Deserializer},
    typed_builder::TypedBuilder,
    tracing::info,
    crate::{
        error::{PipelineError, Result},
        normalizer::normalize,
        schema::{Field, Schema},
    },
};

/// One submission row.
#[derive(TypedBuilder, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Record {
    #[serde(default)]
    #[builder(default, setter(strip_option, into))]
    id: Option<String>,
    #[serde(default)]
    #[builder(default, setter(strip_option, into))]
    title: Option<String>,
    #[serde(default)]
    #[builder(default, setter(strip_option, into))]
    selftext: Option<String>,
    #[serde(default)]
    #[builder(default, setter(strip_option, into))]
    link_flair_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    #[builder(default, setter(strip_option))]
    ups: Option<u64>,
    #[serde(default, deserialize_with = "lenient_float")]
    #[builder(default, setter(strip_option))]
    upvote_ratio: Option<f64>,
    #[serde(default, deserialize_with = "lenient_count")]
    #[builder(default, setter(strip_option))]
    num_comments: Option<u64>,
    #[serde(default)]
    #[builder(default, setter(strip_option, into))]
    weekday: Option<String>,
    #[serde(default)]
    #[builder(default, setter(strip_option, into))]
    author: Option<String>,
    #[serde(default)]
    #[builder(default, setter(strip_option, into))]
    created: Option<String>,
    #[serde(default)]
    #[builder(default, setter(strip_option, into))]
    clean_title: Option<String>,
    #[serde(default)]
    #[builder(default, setter(strip_option, into))]
    clean_selftext: Option<String>,

    // unrecognized and numeric columns as read, by header name
    #[serde(skip)]
    #[builder(default)]
    raw_cells: BTreeMap<String, String>,
}

/// Loaded table. Never changes after load; cleaning produces a new dataset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    schema: Schema,
    records: Vec<Record>,
}

impl Record {
    /// Value of a text-valued field. Numeric fields have no text value.
    pub fn text(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::Id => &self.id,
            Field::Title => &self.title,
            Field::Selftext => &self.selftext,
            Field::LinkFlairText => &self.link_flair_text,
            Field::Weekday => &self.weekday,
            Field::Author => &self.author,
            Field::Created => &self.created,
            Field::CleanTitle => &self.clean_title,
            Field::CleanSelftext => &self.clean_selftext,
            Field::Ups | Field::UpvoteRatio | Field::NumComments => return None,
        };

        value.as_deref()
    }

    pub fn number(&self, field: Field) -> Option<f64> {
        match field {
            Field::Ups => self.ups.map(|v| v as f64),
            Field::UpvoteRatio => self.upvote_ratio,
            Field::NumComments => self.num_comments.map(|v| v as f64),
            _ => None,
        }
    }

    pub fn ups(&self) -> Option<u64> {
        self.ups
    }

    pub fn num_comments(&self) -> Option<u64> {
        self.num_comments
    }

    /// Cell value by column name, the way it is written back out. Loaded
    /// numeric cells keep their source text even when it does not parse.
    pub fn cell(&self, column: &str) -> Option<String> {
        if let Some(raw) = self.raw_cells.get(column) {
            return Some(raw.clone());
        }

        match Field::from_name(column) {
            Some(Field::Ups) => self.ups.map(|v| v.to_string()),
            Some(Field::NumComments) => self.num_comments.map(|v| v.to_string()),
            Some(Field::UpvoteRatio) => self.upvote_ratio.map(|v| v.to_string()),
            Some(field) => self.text(field).map(str::to_owned),
            None => None,
        }
    }

    fn cleaned(&self, schema: &Schema) -> Self {
        let mut record = self.clone();
        if schema.has_field(Field::Selftext) {
            record.clean_selftext = Some(normalize(self.selftext.as_deref()));
        }
        if schema.has_field(Field::Title) {
            record.clean_title = Some(normalize(self.title.as_deref()));
        }
        record
    }
}

impl Dataset {
    pub fn new(schema: Schema, records: Vec<Record>) -> Self {
        Self {
            schema,
            records,
        }
    }

    /// Reads a comma-separated table with a header row.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source_name = path.display().to_string();

        let mut data = Vec::new();
        File::open(path)
            .and_then(|mut file| file.read_to_end(&mut data))
            .map_err(|err| PipelineError::schema(&source_name, err))?;

        Self::from_bytes(&source_name, &data)
    }

    pub fn from_bytes(source_name: &str, data: &[u8]) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(data);
        let headers = reader.headers()
            .map_err(|err| PipelineError::schema(source_name, err))?
            .clone();

        let schema = Schema::from_headers(headers.iter());
        let raw_columns: Vec<(usize, &str)> = headers.iter()
            .enumerate()
            .filter(|(_, name)| Field::from_name(name).map(|field| field.is_numeric()).unwrap_or(true))
            .collect();

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|err| PipelineError::schema(source_name, err))?;
            let mut record: Record = row.deserialize(Some(&headers))
                .map_err(|err| PipelineError::schema(source_name, err))?;

            for (index, name) in &raw_columns {
                if let Some(value) = row.get(*index).filter(|v| !v.is_empty()) {
                    record.raw_cells.insert(name.to_string(), value.to_owned());
                }
            }

            records.push(record);
        }

        info!("loaded {} records with {} columns from {}", records.len(), schema.columns().len(), source_name);

        Ok(Self::new(schema, records))
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.schema.has_column(name)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Adds `clean_selftext` and `clean_title` for whichever source text
    /// columns are present.
    pub fn clean(&self) -> Self {
        let mut schema = self.schema.clone();
        if schema.has_field(Field::Selftext) {
            schema = schema.with_field(Field::CleanSelftext);
        }
        if schema.has_field(Field::Title) {
            schema = schema.with_field(Field::CleanTitle);
        }

        let records = self.records.iter().map(|record| record.cleaned(&self.schema)).collect();

        Self::new(schema, records)
    }

    /// Sorted distinct values of a categorical field, or `None` if the
    /// column is absent.
    pub fn distinct_values(&self, field: Field) -> Option<Vec<String>> {
        if !self.schema.has_field(field) {
            return None;
        }

        let values: BTreeSet<&str> = self.records.iter()
            .filter_map(|record| record.text(field))
            .collect();

        Some(values.into_iter().map(str::to_owned).collect())
    }
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<u64>, D::Error> {
    let value = lenient_float(deserializer)?;
    Ok(value.filter(|v| *v >= 0.0 && v.fract() == 0.0).map(|v| v as u64))
}

fn lenient_float<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<f64>, D::Error> {
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
id,title,selftext,link_flair_text,ups,upvote_ratio,num_comments,weekday,score
a1,Hello World!,Body text,News,10,0.9,3,Monday,42
a2,,,News,20.0,0.5,,Tuesday,
a3,Third post,see [x](http://y.z),,abc,,7,,1
";

    #[test]
    fn loads_typed_records() {
        let dataset = Dataset::from_bytes("sample", SAMPLE.as_bytes()).unwrap();

        assert_eq!(dataset.len(), 3);
        assert!(dataset.has_column("ups"));
        assert!(!dataset.has_column("author"));

        let first = &dataset.records()[0];
        assert_eq!(first.text(Field::Title), Some("Hello World!"));
        assert_eq!(first.ups(), Some(10));
        assert_eq!(first.number(Field::UpvoteRatio), Some(0.9));
        assert_eq!(first.cell("score"), Some("42".to_owned()));
    }

    #[test]
    fn empty_and_invalid_cells_are_null() {
        let dataset = Dataset::from_bytes("sample", SAMPLE.as_bytes()).unwrap();

        let second = &dataset.records()[1];
        assert_eq!(second.text(Field::Title), None);
        assert_eq!(second.ups(), Some(20));
        assert_eq!(second.num_comments(), None);
        assert_eq!(second.cell("score"), None);

        let third = &dataset.records()[2];
        assert_eq!(third.ups(), None);
        assert_eq!(third.text(Field::LinkFlairText), None);
    }

    #[test]
    fn numeric_cells_keep_source_text() {
        let data = "title,ups,upvote_ratio,num_comments\nhello,-3,0.90,1e3\nworld,12.5,,\"1,234\"\n";
        let dataset = Dataset::from_bytes("numbers", data.as_bytes()).unwrap();

        let hello = &dataset.records()[0];
        assert_eq!(hello.ups(), None);
        assert_eq!(hello.number(Field::UpvoteRatio), Some(0.9));
        assert_eq!(hello.num_comments(), Some(1000));
        assert_eq!(hello.cell("ups"), Some("-3".to_owned()));
        assert_eq!(hello.cell("upvote_ratio"), Some("0.90".to_owned()));
        assert_eq!(hello.cell("num_comments"), Some("1e3".to_owned()));

        let world = &dataset.records()[1];
        assert_eq!(world.ups(), None);
        assert_eq!(world.num_comments(), None);
        assert_eq!(world.cell("ups"), Some("12.5".to_owned()));
        assert_eq!(world.cell("upvote_ratio"), None);
        assert_eq!(world.cell("num_comments"), Some("1,234".to_owned()));
    }

    #[test]
    fn built_records_format_parsed_numbers() {
        let record = Record::builder().ups(7).upvote_ratio(0.5).build();
        assert_eq!(record.cell("ups"), Some("7".to_owned()));
        assert_eq!(record.cell("upvote_ratio"), Some("0.5".to_owned()));
        assert_eq!(record.cell("score"), None);
    }

    #[test]
    fn zero_known_columns_is_valid() {
        let dataset = Dataset::from_bytes("other", b"foo,bar\n1,2\n").unwrap();
        assert_eq!(dataset.len(), 1);
        assert!(dataset.schema().is_empty());
    }

    #[test]
    fn ragged_rows_are_schema_errors() {
        let err = Dataset::from_bytes("broken", b"title,ups\na,1\nb,2,3\n").unwrap_err();
        assert!(matches!(err, PipelineError::Schema { .. }));
    }

    #[test]
    fn missing_file_is_schema_error() {
        let err = Dataset::load("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, PipelineError::Schema { .. }));
    }

    #[test]
    fn clean_adds_derived_columns() {
        let dataset = Dataset::from_bytes("sample", SAMPLE.as_bytes()).unwrap().clean();

        assert!(dataset.has_column("clean_title"));
        assert!(dataset.has_column("clean_selftext"));
        assert_eq!(dataset.records()[0].text(Field::CleanTitle), Some("hello world"));
        assert_eq!(dataset.records()[1].text(Field::CleanTitle), Some(""));
        assert_eq!(dataset.records()[2].text(Field::CleanSelftext), Some("see"));
    }

    #[test]
    fn clean_skips_absent_text_columns() {
        let dataset = Dataset::from_bytes("no-text", b"ups\n1\n").unwrap().clean();
        assert_eq!(dataset.schema().columns(), &["ups"]);
        assert_eq!(dataset.records()[0].text(Field::CleanTitle), None);
    }

    #[test]
    fn distinct_values_are_sorted() {
        let dataset = Dataset::from_bytes("sample", SAMPLE.as_bytes()).unwrap();

        assert_eq!(dataset.distinct_values(Field::Weekday), Some(vec!["Monday".to_owned(), "Tuesday".to_owned()]));
        assert_eq!(dataset.distinct_values(Field::Author), None);
    }
}
