//! # fabula-core
//!
//! Core types for the fabula workspace: the story annotation data model shared
//! by the evaluation engine and the CLI.
//!
//! This crate provides:
//! - **Documents**: `Document`, `SourceInfo`
//! - **Annotation records**: `Character`, `NarrativeEvent`, `Relationship`,
//!   `ActionLayer`, `TextSpan`
//! - **Errors**: `Error`, `Result`

#![warn(missing_docs)]

pub mod document;
pub mod error;
mod lenient;

pub use document::{
    ActionField, ActionLayer, Character, Document, NarrativeEvent, Relationship, SourceInfo,
    TextSpan,
};
pub use error::{Error, Result};
pub use lenient::split_aliases;
