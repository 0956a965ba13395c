use {
    std::fs::read_to_string,
    tracing::warn,
    serde::Deserialize,
    crate::{
        filter::Membership,
        report::ReportOptions,
        schema::Field,
    },
};

#[derive(Deserialize, Debug, Default)]
pub struct Config {
    #[serde(default)]
    pub steps: StepsConfig,
}

#[derive(Deserialize, Debug, Default)]
pub struct StepsConfig {
    #[serde(default)]
    pub clean: CleanStepConfig,
    #[serde(default)]
    pub report: ReportStepConfig,
}

#[derive(Deserialize, Clone, Debug)]
pub struct CleanStepConfig {
    pub enabled: bool,
    source: Option<String>,
    output: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ReportStepConfig {
    pub enabled: bool,
    source: Option<String>,
    filter_field: Option<Field>,
    #[serde(default)]
    flairs: Vec<String>,
    top_terms: Option<usize>,
    terms_field: Option<Field>,
    sentiment_field: Option<Field>,
    histogram_bins: Option<usize>,
    #[serde(default)]
    table_columns: Vec<String>,
    rows_to_show: Option<usize>,
    export: Option<String>,
    output: Option<String>,
    #[serde(default)]
    use_bert: bool,
}

impl Default for CleanStepConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            source: None,
            output: None,
        }
    }
}

impl Default for ReportStepConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            source: None,
            filter_field: None,
            flairs: Vec::new(),
            top_terms: None,
            terms_field: None,
            sentiment_field: None,
            histogram_bins: None,
            table_columns: Vec::new(),
            rows_to_show: None,
            export: None,
            output: None,
            use_bert: false,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        read_to_string("./config.toml")
            .or_else(|_| read_to_string("/config/config.toml"))
            .map_err(|err| err.to_string())
            .and_then(|v| Self::from_toml(&v))
            .unwrap_or_else(|err| {
                warn!("failed to read config: {}", err);
                Config::default()
            })
    }

    pub fn from_toml(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|err| err.to_string())
    }
}

impl CleanStepConfig {
    pub fn source(&self) -> String {
        self.source.as_ref().cloned().unwrap_or("dataset/data.csv".to_owned())
    }

    pub fn output(&self) -> String {
        self.output.as_ref().cloned().unwrap_or("dataset/reddit_posts_clean.csv".to_owned())
    }
}

impl ReportStepConfig {
    pub fn source(&self) -> String {
        self.source.as_ref().cloned().unwrap_or("dataset/reddit_posts_clean.csv".to_owned())
    }

    pub fn filter(&self) -> Membership {
        Membership::new(self.filter_field.unwrap_or(Field::LinkFlairText), self.flairs.iter().cloned())
    }

    pub fn report_options(&self) -> ReportOptions {
        let defaults = ReportOptions::default();

        ReportOptions {
            filter: self.filter(),
            terms_field: self.terms_field.unwrap_or(defaults.terms_field),
            top_terms: self.top_terms.unwrap_or(defaults.top_terms),
            sentiment_field: self.sentiment_field.unwrap_or(defaults.sentiment_field),
            histogram_bins: self.histogram_bins.unwrap_or(defaults.histogram_bins),
        }
    }

    pub fn table_columns(&self) -> &[String] {
        &self.table_columns
    }

    pub fn rows_to_show(&self) -> usize {
        self.rows_to_show.unwrap_or(30)
    }

    pub fn export(&self) -> String {
        self.export.as_ref().cloned().unwrap_or("filtered_reddit_data.csv".to_owned())
    }

    pub fn output(&self) -> Option<&String> {
        self.output.as_ref()
    }

    pub fn use_bert(&self) -> bool {
        self.use_bert
    }
}
