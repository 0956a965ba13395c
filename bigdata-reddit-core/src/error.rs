use thiserror::Error;

/// Errors that abort the pipeline. Missing columns, empty views and failed
/// sentiment estimates are not errors and never show up here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read {source_name} as a table: {reason}")]
    Schema {
        source_name: String,
        reason: String,
    },

    #[error("failed to write export: {0}")]
    Export(String),
}

impl PipelineError {
    pub fn schema(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Schema {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<csv::Error> for PipelineError {
    fn from(err: csv::Error) -> Self {
        Self::Export(err.to_string())
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        Self::Export(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
