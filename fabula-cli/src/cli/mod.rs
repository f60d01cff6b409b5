//! CLI module for the fabula binary
//!
//! Argument parsing lives in [`parser`], one file per subcommand in
//! [`commands`], and shared terminal helpers in [`output`] and [`utils`].

pub mod commands;
pub mod output;
pub mod parser;
pub mod utils;
