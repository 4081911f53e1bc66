//! Error types for the scripting crate

use npcscript_core::CoreError;

/// Error returned by a host delegate, passed through untouched
pub type DelegateError = Box<dyn std::error::Error + Send + Sync>;

/// Script-specific error types
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Indentation or quoting problem in the source text
    #[error("Malformed line {line}: {message}")]
    MalformedLine { line: usize, message: String },

    /// Keyword not present in the statement registry
    #[error("Unknown statement `{keyword}` at line {line}")]
    UnknownStatement { keyword: String, line: usize },

    /// Misplaced else/else-if, bad parameters, stray indentation
    #[error("Parse error at line {line}: {message}")]
    ParseStructure { line: usize, message: String },

    /// Variable not found in any enclosing scope
    #[error("Variable not found: {0}")]
    UndefinedVariable(String),

    /// Division by zero, integer overflow
    #[error("Arithmetic error: {0}")]
    Arithmetic(String),

    /// Operand of the wrong kind
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// `run` target missing from the script
    #[error("Block not found: {0}")]
    BlockNotFound(String),

    /// `run` target script missing from the library
    #[error("Script not found: {0}")]
    ScriptNotFound(String),

    /// Native call nobody handled while strict mode is on
    #[error("Unhandled native call: {0}")]
    UnhandledCall(String),

    /// Failure reported by the host delegate
    #[error("Native call `{function}` failed: {source}")]
    Delegate {
        function: String,
        #[source]
        source: DelegateError,
    },

    /// `run` nesting deeper than the configured limit
    #[error("Stack overflow")]
    StackOverflow,

    /// File I/O error while loading scripts
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScriptError {
    /// Source line the error refers to, for parse-time errors
    pub fn line(&self) -> Option<usize> {
        match self {
            ScriptError::MalformedLine { line, .. }
            | ScriptError::UnknownStatement { line, .. }
            | ScriptError::ParseStructure { line, .. } => Some(*line),
            _ => None,
        }
    }

    pub(crate) fn structure(line: usize, message: impl Into<String>) -> Self {
        ScriptError::ParseStructure {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn malformed(line: usize, message: impl Into<String>) -> Self {
        ScriptError::MalformedLine {
            line,
            message: message.into(),
        }
    }
}

impl From<ScriptError> for CoreError {
    fn from(err: ScriptError) -> Self {
        match err {
            ScriptError::Io(e) => CoreError::Io(e),
            ScriptError::BlockNotFound(name) | ScriptError::ScriptNotFound(name) => {
                CoreError::NotFound(name)
            }
            other => CoreError::Script(other.to_string()),
        }
    }
}

/// Result type for scripting operations
pub type Result<T> = std::result::Result<T, ScriptError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_errors_carry_line() {
        let err = ScriptError::UnknownStatement {
            keyword: "dance".into(),
            line: 12,
        };
        assert_eq!(err.line(), Some(12));
        assert_eq!(err.to_string(), "Unknown statement `dance` at line 12");
        assert_eq!(ScriptError::StackOverflow.line(), None);
    }

    #[test]
    fn test_into_core_error() {
        let core: CoreError = ScriptError::BlockNotFound("greet".into()).into();
        assert!(matches!(core, CoreError::NotFound(name) if name == "greet"));

        let core: CoreError = ScriptError::Arithmetic("division by zero".into()).into();
        assert!(matches!(core, CoreError::Script(_)));
    }
}
