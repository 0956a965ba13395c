use {
    std::collections::BTreeSet,
    serde::{Serialize, Deserialize},
    tracing::debug,
    crate::{
        schema::{Field, Schema},
        store::{Dataset, Record},
    },
};

/// Categorical membership over a single field. An empty `allowed` set means
/// "no selection", which keeps every record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Membership {
    pub field: Field,
    #[serde(default)]
    pub allowed: BTreeSet<String>,
}

/// Read-only subset of a dataset, valid for one computation pass.
#[derive(Debug, Clone)]
pub struct View<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl Membership {
    pub fn new(field: Field, allowed: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            field,
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    pub fn everything(field: Field) -> Self {
        Self {
            field,
            allowed: BTreeSet::new(),
        }
    }

    pub fn is_pass_through(&self) -> bool {
        self.allowed.is_empty()
    }

    /// Whether `apply` keeps `record` from a dataset with this `schema`.
    /// A selection over an absent column keeps everything.
    pub fn matches(&self, schema: &Schema, record: &Record) -> bool {
        self.is_pass_through() || !schema.has_field(self.field) || is_member(record, self.field, &self.allowed)
    }

    pub fn apply<'a>(&self, dataset: &'a Dataset) -> View<'a> {
        apply(dataset, self.field, &self.allowed)
    }
}

pub fn apply<'a>(dataset: &'a Dataset, field: Field, allowed: &BTreeSet<String>) -> View<'a> {
    if allowed.is_empty() {
        return View::all(dataset);
    }

    if !dataset.schema().has_field(field) {
        debug!("dataset has no {} column, not filtering", field.name());
        return View::all(dataset);
    }

    let indices = dataset.records().iter()
        .enumerate()
        .filter(|(_, record)| is_member(record, field, allowed))
        .map(|(index, _)| index)
        .collect();

    View {
        dataset,
        indices,
    }
}

fn is_member(record: &Record, field: Field, allowed: &BTreeSet<String>) -> bool {
    record.text(field).map(|value| allowed.contains(value)).unwrap_or(false)
}

impl<'a> View<'a> {
    pub fn all(dataset: &'a Dataset) -> Self {
        Self {
            dataset,
            indices: (0..dataset.len()).collect(),
        }
    }

    pub fn schema(&self) -> &'a Schema {
        self.dataset.schema()
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let records = self.dataset.records();
        self.indices.iter().map(move |index| &records[*index])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Present text values of `field`, in view order.
    pub fn texts(&self, field: Field) -> impl Iterator<Item = &'a str> + '_ {
        self.records().filter_map(move |record| record.text(field))
    }

    /// Present numeric values of `field`, in view order.
    pub fn numbers(&self, field: Field) -> impl Iterator<Item = f64> + '_ {
        self.records().filter_map(move |record| record.number(field))
    }
}
