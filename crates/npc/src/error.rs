//! Error types for the NPC crate

use npcscript_core::CoreError;
use npcscript_scripting::ScriptError;

#[derive(Debug, thiserror::Error)]
pub enum NpcError {
    /// Data native called with a parameter of the wrong kind
    #[error("`{function}` expects {expected}, found {found}")]
    InvalidParameter {
        function: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Parameter of the right kind but an unusable value
    #[error("`{function}`: invalid value {value}")]
    InvalidValue { function: String, value: String },

    /// Script failed while loading NPC data
    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    #[error("NPC ID space exhausted")]
    IdsExhausted,

    #[error("NPC not found: {0}")]
    NotFound(u32),
}

pub type Result<T> = std::result::Result<T, NpcError>;

impl From<NpcError> for CoreError {
    fn from(err: NpcError) -> Self {
        match err {
            NpcError::Script(e) => e.into(),
            NpcError::NotFound(id) => CoreError::NotFound(format!("npc#{}", id)),
            other => CoreError::Entity(other.to_string()),
        }
    }
}
