//! Error types surfaced across the crate.
//!
//! Every fallible operation that can be triggered by bad user input (a malformed corpus line, an
//! unparsable feature template, an unwritable predictions file) produces a [`ParserError`] with
//! enough context to render a complete, localized diagnostic without a second pass over the
//! input. Internal invariant violations are not represented here: they are bugs, not recoverable
//! conditions, and are reported with `assert!`/`debug_assert!` at the call site instead.

use std::fmt;
use std::io;
use std::path::PathBuf;

use annotate_snippets::display_list::{DisplayList, FormatOptions};
use annotate_snippets::snippet::{Annotation, AnnotationType, Slice, Snippet, SourceAnnotation};

/// A single fallible outcome from reading input, parsing a template, or writing output.
#[derive(Debug)]
pub enum ParserError {
    /// A corpus line could not be parsed as a header, feature declaration, or constraint.
    InputParse {
        file: PathBuf,
        line: usize,
        message: String,
    },
    /// A feature template expression could not be tokenized or parsed.
    TemplateParse { message: String },
    /// A writer could not be opened.
    OutputFailure { path: PathBuf, source: io::Error },
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParserError::InputParse { file, line, message } => write!(
                f,
                "Input error in file {} on line {}: {}",
                file.display(),
                line,
                message
            ),
            ParserError::TemplateParse { message } => {
                write!(f, "Error parsing feature template: {message}")
            }
            ParserError::OutputFailure { path, source } => {
                write!(f, "could not open {} for writing: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ParserError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParserError::OutputFailure { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ParserError>;

/// Renders an error to a human-facing string, using an annotated single-line snippet when the
/// error carries enough context (a source line) to show one.
pub fn render(err: &ParserError, source_line: Option<&str>) -> String {
    match (err, source_line) {
        (ParserError::InputParse { file, line, message }, Some(src)) => {
            let origin = format!("{}:{}", file.display(), line);
            let snippet = Snippet {
                title: Some(Annotation {
                    label: Some(message.as_str()),
                    id: None,
                    annotation_type: AnnotationType::Error,
                }),
                footer: vec![],
                slices: vec![Slice {
                    source: src,
                    line_start: *line,
                    origin: Some(origin.as_str()),
                    fold: false,
                    annotations: vec![SourceAnnotation {
                        label: "",
                        annotation_type: AnnotationType::Error,
                        range: (0, src.len()),
                    }],
                }],
                opt: FormatOptions {
                    color: true,
                    ..Default::default()
                },
            };
            DisplayList::from(snippet).to_string()
        }
        _ => err.to_string(),
    }
}
