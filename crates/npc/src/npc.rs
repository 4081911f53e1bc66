//! # NPC Entity
//!
//! Identity and combat stats of one NPC, filled in by its script's data block.

use crate::data::NpcDataDelegate;
use crate::error::Result;
use npcscript_config::EngineConfig;
use npcscript_core::NpcId;
use npcscript_scripting::{ExecutionContext, ParsedScript, ScriptLibrary};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

/// Whether the NPC talks or fights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NpcKind {
    #[default]
    Npc,
    Monster,
}

/// Monster rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    #[default]
    Normal,
    Elite1,
    Elite2,
    Elite3,
    Hero,
    Titan,
}

impl FromStr for Rank {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "normal" | "normalny" | "zwykły" => Ok(Rank::Normal),
            "elite" | "elite1" | "elita" | "elitaI" | "elita1" | "e1" | "eI" => Ok(Rank::Elite1),
            "elite2" | "elitaII" | "elita2" | "e2" | "eII" => Ok(Rank::Elite2),
            "elite3" | "elitaIII" | "elita3" | "e3" | "eIII" => Ok(Rank::Elite3),
            "hero" | "heros" => Ok(Rank::Hero),
            "titan" | "tytan" => Ok(Rank::Titan),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

impl FromStr for Gender {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "m" | "male" | "mężczyzna" => Ok(Gender::Male),
            "f" | "k" | "female" | "kobieta" => Ok(Gender::Female),
            "x" | "unknown" | "nieokreślona" | "nieznana" => Ok(Gender::Unknown),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Profession {
    #[default]
    Warrior,
    Paladin,
    BladeDancer,
    Mage,
    Hunter,
    Tracker,
}

impl FromStr for Profession {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "w" | "warrior" | "wojownik" => Ok(Profession::Warrior),
            "p" | "paladin" | "paladyn" => Ok(Profession::Paladin),
            "b" | "blade-dancer" | "tancerz ostrzy" => Ok(Profession::BladeDancer),
            "m" | "mage" | "mag" => Ok(Profession::Mage),
            "h" | "hunter" | "łowca" => Ok(Profession::Hunter),
            "t" | "tracker" | "tropiciel" => Ok(Profession::Tracker),
            _ => Err(()),
        }
    }
}

/// Combat statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcStats {
    pub level: u32,
    pub profession: Profession,
    pub strength: u32,
    pub agility: u32,
    pub intellect: u32,
    /// Attacks per turn
    pub attack_speed: f64,
    pub max_hp: u32,
    /// Damage range, inclusive
    pub damage: (u32, u32),
    pub armor: u32,
    pub block: u32,
    pub evade: u32,
}

impl Default for NpcStats {
    fn default() -> Self {
        Self {
            level: 1,
            profession: Profession::default(),
            strength: 0,
            agility: 0,
            intellect: 0,
            attack_speed: 0.0,
            max_hp: 100,
            damage: (0, 0),
            armor: 0,
            block: 0,
            evade: 0,
        }
    }
}

/// Individual NPC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Npc {
    pub id: NpcId,

    /// Script the NPC was spawned from
    pub script: String,

    pub name: String,

    /// Graphic file shown by clients
    pub graphic: String,

    pub gender: Gender,
    pub kind: NpcKind,
    pub rank: Rank,

    /// Monster group, 0 for none
    pub group: u32,

    /// Custom respawn delay in seconds
    pub respawn_secs: Option<u64>,

    pub stats: NpcStats,
}

impl Npc {
    pub fn new(id: NpcId, script: impl Into<String>) -> Self {
        Self {
            id,
            script: script.into(),
            name: String::new(),
            graphic: String::new(),
            gender: Gender::default(),
            kind: NpcKind::default(),
            rank: Rank::default(),
            group: 0,
            respawn_secs: None,
            stats: NpcStats::default(),
        }
    }

    /// Run the script's data block against this NPC.
    ///
    /// Returns `false` when the script has no data block, which leaves the
    /// NPC untouched.
    pub fn load_data(
        &mut self,
        script: &Arc<ParsedScript>,
        library: Option<&ScriptLibrary>,
        config: &EngineConfig,
    ) -> Result<bool> {
        if !script.has_block(&config.data_block) {
            tracing::debug!("Script {} has no #{} block", script.name(), config.data_block);
            return Ok(false);
        }

        let id = self.id;
        let mut delegate = NpcDataDelegate::new(self);
        let mut ctx = ExecutionContext::new()
            .with_delegate(&mut delegate)
            .with_owner(id)
            .with_strict_natives(config.strict_natives)
            .with_max_call_depth(config.max_call_depth);
        if let Some(library) = library {
            ctx = ctx.with_library(library);
        }
        ctx.run_block(script, &config.data_block)?;

        tracing::debug!("Loaded data for npc#{} from {}", id.get(), script.name());
        Ok(true)
    }

    /// Pretty JSON for the runner output
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
