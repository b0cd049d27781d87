//! One-shot promotional posting job.
//!
//! [`pipeline::Pipeline`] wires the stages together: scrape trending terms,
//! draw a link from the local catalog ([`links`]), ask the generation provider
//! for post text, and publish it.
pub mod links;
pub mod pipeline;

pub use links::{FileLinkPicker, LinkCatalog, LinkPicker};
pub use pipeline::{Pipeline, RunReport};
