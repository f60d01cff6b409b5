//! # fabula
//!
//! Evaluation of structured narrative annotations ("JSON v3" story
//! documents) against human-authored references.
//!
//! - **Evaluation**: event alignment, five dimension scorers and a composite
//!   score that discounts incomplete references ([`eval`])
//! - **Configuration**: explicit [`EvalConfig`] with TOML loading ([`config`])
//! - **Taxonomies**: optional label vocabularies for validation ([`taxonomy`])
//!
//! Document types and the error type live in `fabula-core` and are re-exported
//! here.
//!
//! # Feature flags
//!
//! | Feature    | Effect                                          |
//! |------------|-------------------------------------------------|
//! | `parallel` | evaluate corpus documents on the rayon thread pool |

#![warn(missing_docs)]

pub mod config;
pub mod eval;
pub mod taxonomy;

pub use config::{EvalConfig, EvalConfigBuilder, TaxonomyPaths};
pub use fabula_core::{
    split_aliases, ActionField, ActionLayer, Character, Document, Error, NarrativeEvent,
    Relationship, Result, SourceInfo, TextSpan,
};
pub use taxonomy::{Taxonomies, Vocabulary};
