//! Renderers that turn validated issue data into text.
//!
//! Both renderers are pure functions of their input. They never perform I/O and
//! accept any combination of optional fields.

pub mod json;
pub mod prompt;

/// The output formats a caller can choose from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Markdown document for an AI coding agent
    #[default]
    Prompt,

    /// The issue and its notes as pretty printed JSON
    Json,
}
