use {
    std::collections::HashSet,
    serde::{Serialize, Deserialize},
};

/// Columns the pipeline knows how to interpret. Anything else in the source
/// table is carried along as a passthrough cell.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Id,
    Title,
    Selftext,
    LinkFlairText,
    Ups,
    UpvoteRatio,
    NumComments,
    Weekday,
    Author,
    Created,
    CleanTitle,
    CleanSelftext,
}

pub const ALL_FIELDS: [Field; 12] = [
    Field::Id,
    Field::Title,
    Field::Selftext,
    Field::LinkFlairText,
    Field::Ups,
    Field::UpvoteRatio,
    Field::NumComments,
    Field::Weekday,
    Field::Author,
    Field::Created,
    Field::CleanTitle,
    Field::CleanSelftext,
];

// columns written to the cleaned dataset file
pub const EXPORT_ALLOW_LIST: [Field; 11] = [
    Field::Selftext,
    Field::Title,
    Field::CleanSelftext,
    Field::CleanTitle,
    Field::LinkFlairText,
    Field::Ups,
    Field::UpvoteRatio,
    Field::NumComments,
    Field::Weekday,
    Field::Author,
    Field::Created,
];

pub const WEEKDAYS: [&str; 7] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"];

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Selftext => "selftext",
            Self::LinkFlairText => "link_flair_text",
            Self::Ups => "ups",
            Self::UpvoteRatio => "upvote_ratio",
            Self::NumComments => "num_comments",
            Self::Weekday => "weekday",
            Self::Author => "author",
            Self::Created => "created",
            Self::CleanTitle => "clean_title",
            Self::CleanSelftext => "clean_selftext",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        ALL_FIELDS.iter().find(|field| field.name() == name).copied()
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Ups | Self::UpvoteRatio | Self::NumComments)
    }
}

/// Which columns a loaded dataset actually has. Computed once at load time and
/// consulted by every component instead of probing records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    columns: Vec<String>,
    present: HashSet<Field>,
}

impl Schema {
    pub fn from_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> Self {
        let mut schema = Self::default();
        for header in headers {
            schema.push_column(header);
        }
        schema
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    pub fn has_field(&self, field: Field) -> bool {
        self.present.contains(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.present.is_empty()
    }

    pub(crate) fn with_field(mut self, field: Field) -> Self {
        if !self.has_field(field) {
            self.push_column(field.name());
        }
        self
    }

    fn push_column(&mut self, name: &str) {
        if self.has_column(name) {
            return;
        }

        if let Some(field) = Field::from_name(name) {
            self.present.insert(field);
        }
        self.columns.push(name.to_owned());
    }
}
