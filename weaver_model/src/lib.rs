//! # Weaver Model
//!
//! Plain data records shared between the writing tool and the analysis core.
//! The tool owns and persists these records; the core only reads them, except
//! for the character rosters it produces during extraction.

pub mod entities;
pub mod library;

pub use entities::*;
pub use library::*;
