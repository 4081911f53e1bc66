//! # NPC Manager
//!
//! Spawns NPCs from parsed scripts and keeps track of the live ones.

use crate::error::{NpcError, Result};
use crate::npc::Npc;
use npcscript_config::EngineConfig;
use npcscript_core::{IdGenerator, NpcId};
use npcscript_scripting::{ParsedScript, ScriptLibrary};
use parking_lot::Mutex;
use std::sync::Arc;

/// Shared handle to a live NPC
pub type NpcHandle = Arc<Mutex<Npc>>;

/// NPC Manager
///
/// # Thread Safety
/// All operations are thread-safe using DashMap for concurrent access.
pub struct NpcManager {
    /// Live NPCs by ID
    npcs: dashmap::DashMap<NpcId, NpcHandle>,

    ids: IdGenerator<NpcId>,

    config: EngineConfig,
}

impl NpcManager {
    /// Create an empty manager
    pub fn new(config: EngineConfig) -> Self {
        tracing::debug!("Creating NpcManager");

        Self {
            npcs: dashmap::DashMap::new(),
            ids: IdGenerator::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create an NPC for `script` and load its data block.
    ///
    /// A script without a data block still spawns an NPC with default stats.
    /// If loading fails the ID is released and nothing is registered.
    pub fn spawn(&self, script: &Arc<ParsedScript>, library: Option<&ScriptLibrary>) -> Result<NpcHandle> {
        let id = self.ids.next_id().ok_or(NpcError::IdsExhausted)?;
        let mut npc = Npc::new(id, script.name());

        if let Err(e) = npc.load_data(script, library, &self.config) {
            self.ids.release(id);
            return Err(e);
        }

        tracing::debug!("Spawned npc#{} ({}) from {}", id.get(), npc.name, script.name());
        let handle = Arc::new(Mutex::new(npc));
        self.npcs.insert(id, Arc::clone(&handle));
        Ok(handle)
    }

    /// Remove an NPC and free its ID
    pub fn despawn(&self, id: NpcId) -> Result<NpcHandle> {
        let (_, handle) = self.npcs.remove(&id).ok_or(NpcError::NotFound(id.get()))?;
        self.ids.release(id);
        tracing::debug!("Despawned npc#{}", id.get());
        Ok(handle)
    }

    pub fn get(&self, id: NpcId) -> Option<NpcHandle> {
        self.npcs.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// IDs of all live NPCs, ascending
    pub fn ids(&self) -> Vec<NpcId> {
        let mut ids: Vec<NpcId> = self.npcs.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        ids
    }

    pub fn npc_count(&self) -> usize {
        self.npcs.len()
    }
}

impl Default for NpcManager {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
