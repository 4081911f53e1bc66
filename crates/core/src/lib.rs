//! NpcScript Core - Fundamental types shared by the engine and its hosts

mod error;
mod types;
mod idgen;

pub use error::*;
pub use types::*;
pub use idgen::*;
