//! Core type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Player ID (16-bit unsigned)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u16);

impl PlayerId {
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u16 {
        self.0
    }
}

impl From<u16> for PlayerId {
    fn from(id: u16) -> Self {
        Self(id)
    }
}

/// NPC ID (32-bit unsigned)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NpcId(pub u32);

impl NpcId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl From<u32> for NpcId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NpcId> for u64 {
    fn from(id: NpcId) -> Self {
        id.0 as u64
    }
}

impl TryFrom<u64> for NpcId {
    type Error = std::num::TryFromIntError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        u32::try_from(value).map(Self)
    }
}

/// Handle to the entity a script execution is bound to.
///
/// The script engine never looks inside; it only hands the handle back to
/// the host through native calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityHandle {
    Npc(NpcId),
    Player(PlayerId),
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityHandle::Npc(id) => write!(f, "npc#{}", id.get()),
            EntityHandle::Player(id) => write!(f, "player#{}", id.get()),
        }
    }
}

impl From<NpcId> for EntityHandle {
    fn from(id: NpcId) -> Self {
        EntityHandle::Npc(id)
    }
}

impl From<PlayerId> for EntityHandle {
    fn from(id: PlayerId) -> Self {
        EntityHandle::Player(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_handle_display() {
        assert_eq!(EntityHandle::from(NpcId::new(7)).to_string(), "npc#7");
        assert_eq!(EntityHandle::from(PlayerId::new(3)).to_string(), "player#3");
    }

    #[test]
    fn test_entity_handle_serde() {
        let handle = EntityHandle::Npc(NpcId::new(12));
        let json = serde_json::to_string(&handle).unwrap();
        let back: EntityHandle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, handle);
    }
}
