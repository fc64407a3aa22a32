//! Role & theme inference by keyword co-occurrence.
//!
//! - **Roles**: a narrative role for a character, from role keywords present
//!   alongside the name
//! - **Themes**: thematic tags for a story, from keyword substrings

mod role;
mod theme;

pub use role::*;
pub use theme::*;
