//! Crawl configuration: types, typestate builder, and getters.

mod builder;
mod getters;
mod types;

pub use builder::{FetchConfigBuilder, WithUrl};
pub use types::{
    ConversionStrategy, CrawlMode, FetchConfig, LinkClassification, OutputStructure,
};
