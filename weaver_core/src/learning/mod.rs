//! Usage learning: a persisted document of how prompts, characters and
//! extraction are used, plus the queries that summarize it.
//!
//! - **data**: the document sections and their JSON shape
//! - **tracker**: record operations, each persisting the whole document
//! - **insights**: ranked and bucketed queries over the document
//! - **clock**: injectable time source

mod clock;
mod data;
mod insights;
mod tracker;

pub use clock::*;
pub use data::*;
pub use insights::*;
pub use tracker::*;
