pub mod aggregation;
pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod normalizer;
pub mod report;
pub mod schema;
pub mod sentiment;
pub mod store;

mod stopwords;

pub use {
    error::{PipelineError, Result},
    filter::{Membership, View},
    schema::{Field, Schema},
    store::{Dataset, Record},
};
