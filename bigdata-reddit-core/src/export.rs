use {
    tracing::debug,
    crate::{
        error::{PipelineError, Result},
        filter::View,
        schema::{Field, Schema, EXPORT_ALLOW_LIST},
        store::{Dataset, Record},
    },
};

pub const MIN_ROWS_TO_SHOW: usize = 10;
pub const MAX_ROWS_TO_SHOW: usize = 100;

const DEFAULT_TABLE_FIELDS: [Field; 6] = [
    Field::Title,
    Field::LinkFlairText,
    Field::Ups,
    Field::UpvoteRatio,
    Field::NumComments,
    Field::Weekday,
];

/// The cleaned dataset file: allow-listed columns that are present, in
/// dataset column order, every row.
pub fn export(dataset: &Dataset) -> Result<Vec<u8>> {
    let columns: Vec<String> = dataset.schema().columns().iter()
        .filter(|column| Field::from_name(column).map(|field| EXPORT_ALLOW_LIST.contains(&field)).unwrap_or(false))
        .cloned()
        .collect();

    write_csv(&columns, dataset.records().iter())
}

/// Ad hoc export of the caller's column selection over the whole view.
/// Columns the dataset does not have are left out.
pub fn export_selection(view: &View, columns: &[String]) -> Result<Vec<u8>> {
    let columns = present_columns(view.schema(), columns);
    write_csv(&columns, view.records())
}

/// The first `rows` rows of the same selection, for display. `rows` is
/// clamped to the range the table widget offers.
pub fn preview(view: &View, columns: &[String], rows: usize) -> Vec<Vec<Option<String>>> {
    let columns = present_columns(view.schema(), columns);
    let rows = rows.clamp(MIN_ROWS_TO_SHOW, MAX_ROWS_TO_SHOW);

    view.records()
        .take(rows)
        .map(|record| columns.iter().map(|column| record.cell(column)).collect())
        .collect()
}

/// Table columns shown when the caller has not picked any.
pub fn default_columns(schema: &Schema) -> Vec<String> {
    if schema.has_field(Field::LinkFlairText) {
        DEFAULT_TABLE_FIELDS.iter()
            .filter(|field| schema.has_field(**field))
            .map(|field| field.name().to_owned())
            .collect()
    } else {
        schema.columns().iter().take(6).cloned().collect()
    }
}

fn present_columns(schema: &Schema, columns: &[String]) -> Vec<String> {
    columns.iter()
        .filter(|column| {
            let present = schema.has_column(column);
            if !present {
                debug!("skipping unknown column {} in export", column);
            }
            present
        })
        .cloned()
        .collect()
}

fn write_csv<'a>(columns: &[String], records: impl Iterator<Item = &'a Record>) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(columns)?;

    for record in records {
        writer.write_record(columns.iter().map(|column| record.cell(column).unwrap_or_default()))?;
    }

    writer.into_inner().map_err(|err| PipelineError::Export(err.to_string()))
}
