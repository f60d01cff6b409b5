//! Command implementations for the fabula CLI
//!
//! Each command has its own module/file.

pub mod batch;
pub mod config;
pub mod eval;
pub mod validate;

// Re-export argument types for parser
pub use batch::BatchArgs;
pub use config::ConfigArgs;
pub use eval::EvalArgs;
pub use validate::ValidateArgs;
