//! Shared error type
//!
//! Each crate keeps its own error enum and converts into [`CoreError`] at
//! crate boundaries.

#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    /// Script failed to parse or execute
    #[error("Script error: {0}")]
    Script(String),

    /// Host entity rejected script data
    #[error("Entity error: {0}")]
    Entity(String),

    /// Missing script, block or entity
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
