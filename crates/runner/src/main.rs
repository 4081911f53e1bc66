//! NpcScript - NPC script checker and loader
//!
//! Usage: `npcscript [check|run] [config path]`
//!
//! - `check` parses every script in the scripts directory and reports errors
//! - `run` spawns one NPC per script with a data block and prints it as JSON

use anyhow::{bail, Context};
use npcscript_config::{EngineConfig, DEFAULT_CONFIG_PATH};
use npcscript_npc::NpcManager;
use npcscript_scripting::{Registry, ScriptLibrary};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Check,
    Run,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let command = match args.next().as_deref() {
        None | Some("run") => Command::Run,
        Some("check") => Command::Check,
        Some(other) => bail!("unknown command `{}` (expected `check` or `run`)", other),
    };
    let config_path = args.next().unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = EngineConfig::load_or_default(&config_path)
        .map_err(|e| anyhow::anyhow!("failed to load {}: {}", config_path, e))?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log_level")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("NpcScript starting ({:?})", command);
    config.display();

    let library = Arc::new(ScriptLibrary::new());
    let report = library
        .load_dir(&config.scripts_dir, &config.script_extension, Registry::standard())
        .with_context(|| format!("failed to read {}", config.scripts_dir.display()))?;

    for (path, e) in &report.failed {
        error!("{}: {}", path.display(), e);
    }

    match command {
        Command::Check => {
            if !report.is_clean() {
                bail!("{} of {} script(s) failed to parse", report.failed.len(), report.failed.len() + report.loaded.len());
            }
            info!("All {} script(s) parsed", report.loaded.len());
            Ok(())
        }
        Command::Run => run(config, library).await,
    }
}

/// Spawn every script's NPC on the blocking pool and print the results
async fn run(config: EngineConfig, library: Arc<ScriptLibrary>) -> anyhow::Result<()> {
    let manager = Arc::new(NpcManager::new(config));

    let mut tasks = Vec::new();
    for name in library.names() {
        let Some(script) = library.get(&name) else {
            continue;
        };
        if !script.has_block(&manager.config().data_block) {
            info!("Skipping {} (no #{} block)", name, manager.config().data_block);
            continue;
        }

        let manager = Arc::clone(&manager);
        let library = Arc::clone(&library);
        let task = tokio::task::spawn_blocking(move || manager.spawn(&script, Some(&library)));
        tasks.push((name, task));
    }

    let mut failed = 0;
    for (name, task) in tasks {
        match task.await.context("npc loader panicked")? {
            Ok(handle) => {
                let npc = handle.lock();
                println!("{}", npc.to_json()?);
            }
            Err(e) => {
                warn!("Failed to load {}: {}", name, e);
                failed += 1;
            }
        }
    }

    info!("Spawned {} NPC(s), {} failed", manager.npc_count(), failed);
    if failed > 0 {
        bail!("{} NPC(s) failed to load", failed);
    }
    Ok(())
}
