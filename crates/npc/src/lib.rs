//! # NpcScript NPC Host
//!
//! Game-side host for NPC scripts: the NPC entity, the delegate that maps
//! data block natives onto its stats, and the manager tracking live NPCs.
//!
//! ## Modules
//!
//! - `npc` - NPC entity and stat types
//! - `data` - Data block native handlers
//! - `manager` - NPC collection management

pub mod data;
pub mod error;
pub mod manager;
pub mod npc;

pub use data::NpcDataDelegate;
pub use error::{NpcError, Result};
pub use manager::{NpcHandle, NpcManager};
pub use npc::{Gender, Npc, NpcKind, NpcStats, Profession, Rank};
