//! # StoryWeaver Core
//!
//! The analysis engine behind the writing tool. It finds probable characters
//! in free-form prose, links them back to the stories that mention them,
//! generates writing prompts from those links, and learns from how the
//! writer uses the prompts.
//!
//! ## Core Components
//!
//! - **extraction**: Heuristic character detection with four independent strategies
//! - **inference**: Role and theme inference from keyword co-occurrence
//! - **linker**: Character-story connection index and integration views
//! - **prompts**: Prompt generation behind an injectable template picker
//! - **learning**: Persisted usage document, tracker and insight queries
//! - **store**: Key-value document store and library loaders
//! - **analysis**: `StoryAnalyzer` facade and writing-pattern report
//!
//! ## Design Philosophy
//!
//! - **Pure Analysis**: Extraction and linking depend only on their inputs
//! - **Whole-Document Persistence**: Every tracker update rewrites the full learning document
//! - **Soft Failure**: Malformed stored data degrades to empty defaults instead of erroring

pub mod analysis;
pub mod config;
pub mod error;
pub mod extraction;
pub mod inference;
pub mod learning;
pub mod linker;
pub mod prompts;
pub mod store;

pub use analysis::*;
pub use config::*;
pub use error::*;
pub use extraction::*;
pub use inference::*;
pub use learning::*;
pub use linker::*;
pub use prompts::*;
pub use store::*;
