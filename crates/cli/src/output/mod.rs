//! Structured output envelope and payload models.

#[cfg(test)]
mod tests;

mod data;
mod format;
mod model;
mod result_builder;

pub use data::*;
pub use format::OutputFormat;
pub use model::*;
pub use result_builder::{RenderText, ResultBuilder, print_result};
