//! Core analysis logic.
//!
//! This module contains:
//! - Prompt: Strategy selection and request composition
//! - Parser: Report extraction from model replies
//! - Analyzer: The analysis entry point

pub mod analyzer;
pub mod parser;
pub mod prompt;

// Re-export commonly used types
pub use analyzer::Analyzer;
pub use parser::{extract_analysis, extract_sources, locate_block, parse, BlockSource, Extraction};
pub use prompt::{contains_url, PromptStrategy, RequestBuilder, SYSTEM_INSTRUCTION};
