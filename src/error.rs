//! Error types shared by the parser and the renderer

use std::path::PathBuf;
use thiserror::Error;

/// Template parsing and rendering errors
#[derive(Error, Debug)]
pub enum MustacheError {
    /// Malformed tag syntax. Aborts the whole parse.
    #[error("Syntax error in {template} at line {line}, column {column}: {message}")]
    Syntax {
        template: String,
        line: usize,
        column: usize,
        message: String,
    },

    /// Host-level evaluation failure (e.g. a pragma asks for a capability the host lacks)
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("Partial recursion limit of {limit} exceeded while including {path:?}")]
    RecursionLimit { limit: usize, path: PathBuf },

    #[error("Rendering interrupted by host")]
    Interrupted,

    #[error("Template not found: {0:?}")]
    TemplateNotFound(PathBuf),

    #[error("Template {0:?} is not valid UTF-8")]
    InvalidEncoding(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MustacheError {
    /// Whether this error was raised while parsing
    pub fn is_syntax(&self) -> bool {
        matches!(self, MustacheError::Syntax { .. })
    }
}

pub type Result<T, E = MustacheError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display() {
        let err = MustacheError::Syntax {
            template: "index".to_string(),
            line: 3,
            column: 7,
            message: "unterminated section `a`".to_string(),
        };
        assert!(err.is_syntax());
        assert_eq!(
            err.to_string(),
            "Syntax error in index at line 3, column 7: unterminated section `a`"
        );
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: MustacheError = io.into();
        assert!(!err.is_syntax());
        assert!(err.to_string().contains("gone"));
    }
}
