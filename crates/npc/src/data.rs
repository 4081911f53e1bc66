//! Data block natives
//!
//! Maps the native calls of an NPC's data block onto its fields. Both the
//! English and the Polish names are understood. Parameters are checked by
//! kind; a wrong kind fails the load instead of being coerced.

use crate::error::NpcError;
use crate::npc::{Npc, NpcKind};
use npcscript_scripting::{Delegate, DelegateError, Dispatch, ExecutionContext, NativeCall, Value};
use std::str::FromStr;

type CallResult<T> = std::result::Result<T, DelegateError>;

/// Delegate that writes data block calls into an [`Npc`]
pub struct NpcDataDelegate<'a> {
    npc: &'a mut Npc,
}

impl<'a> NpcDataDelegate<'a> {
    pub fn new(npc: &'a mut Npc) -> Self {
        Self { npc }
    }
}

impl Delegate for NpcDataDelegate<'_> {
    fn call(&mut self, call: &NativeCall<'_>, _ctx: &ExecutionContext<'_>) -> CallResult<Dispatch> {
        let npc = &mut *self.npc;
        let stats = &mut npc.stats;

        match call.function {
            "name" | "nazwa" => npc.name = text(call)?.to_string(),
            "graphic" | "grafika" => npc.graphic = text(call)?.to_string(),
            "npc" => npc.kind = NpcKind::Npc,
            "monster" | "potwór" => npc.kind = NpcKind::Monster,
            "type" | "typ" => npc.rank = parse_name(call)?,
            "gender" | "płeć" => npc.gender = parse_name(call)?,
            "group" | "grupa" => npc.group = unsigned(call)?,
            "respawn" => npc.respawn_secs = Some(u64::from(unsigned(call)?)),

            "level" | "poziom" => stats.level = unsigned(call)?,
            "profession" | "profesja" => stats.profession = parse_name(call)?,
            "strength" | "siła" | "str" => stats.strength = unsigned(call)?,
            "agility" | "zręczność" | "agi" => stats.agility = unsigned(call)?,
            "intellect" | "intelekt" | "int" => stats.intellect = unsigned(call)?,
            "hp" => stats.max_hp = unsigned(call)?,
            "attack-speed" | "sa" => stats.attack_speed = attack_speed(call)?,
            "attack" | "atak" => stats.damage = damage(call)?,
            "armor" | "pancerz" => stats.armor = unsigned(call)?,
            "block" | "blok" => stats.block = unsigned(call)?,
            "evade" | "unik" => stats.evade = unsigned(call)?,

            "log" => {
                let line: Vec<String> = call.params.iter().map(Value::to_string).collect();
                tracing::info!("[npc#{}] {}", npc.id.get(), line.join(" "));
            }

            _ => return Ok(Dispatch::Ignored),
        }

        Ok(Dispatch::Handled)
    }
}

fn invalid_parameter(call: &NativeCall<'_>, expected: &'static str, found: &Value) -> DelegateError {
    NpcError::InvalidParameter {
        function: call.function.to_string(),
        expected,
        found: found.kind(),
    }
    .into()
}

fn invalid_value(call: &NativeCall<'_>, value: impl ToString) -> DelegateError {
    NpcError::InvalidValue {
        function: call.function.to_string(),
        value: value.to_string(),
    }
    .into()
}

fn text<'c>(call: &'c NativeCall<'_>) -> CallResult<&'c str> {
    match call.param(0)? {
        Value::Text(s) => Ok(s),
        other => Err(invalid_parameter(call, "text", other)),
    }
}

fn unsigned(call: &NativeCall<'_>) -> CallResult<u32> {
    match call.param(0)? {
        Value::Integer(n) => u32::try_from(*n).map_err(|_| invalid_value(call, n)),
        other => Err(invalid_parameter(call, "integer", other)),
    }
}

fn parse_name<T: FromStr>(call: &NativeCall<'_>) -> CallResult<T> {
    let name = text(call)?;
    name.parse().map_err(|_| invalid_value(call, format!("\"{}\"", name)))
}

/// `sa 150` is 1.5 attacks per turn; a decimal is taken as is
fn attack_speed(call: &NativeCall<'_>) -> CallResult<f64> {
    match call.param(0)? {
        Value::Integer(n) if *n >= 0 => Ok(*n as f64 / 100.0),
        Value::Decimal(d) if *d >= 0.0 => Ok(*d),
        value @ (Value::Integer(_) | Value::Decimal(_)) => Err(invalid_value(call, value)),
        other => Err(invalid_parameter(call, "number", other)),
    }
}

/// Damage as `"lo-hi"`, a range `lo..hi`, or a single integer
fn damage(call: &NativeCall<'_>) -> CallResult<(u32, u32)> {
    let (lo, hi) = match call.param(0)? {
        Value::Text(s) => {
            let parsed = s
                .split_once('-')
                .and_then(|(lo, hi)| Some((lo.trim().parse().ok()?, hi.trim().parse().ok()?)));
            parsed.ok_or_else(|| invalid_value(call, format!("\"{}\"", s)))?
        }
        Value::Range(lo, hi) => (*lo, *hi),
        Value::Integer(n) => (*n, *n),
        other => return Err(invalid_parameter(call, "damage range", other)),
    };

    match (u32::try_from(lo), u32::try_from(hi)) {
        (Ok(lo), Ok(hi)) if lo <= hi => Ok((lo, hi)),
        _ => Err(invalid_value(call, format!("{}-{}", lo, hi))),
    }
}

#[cfg(test)]
mod tests {
    use crate::npc::{Gender, Profession, Rank};
    use crate::*;
    use npcscript_config::EngineConfig;
    use npcscript_core::NpcId;
    use npcscript_scripting::{ParsedScript, ScriptError};
    use std::sync::Arc;

    fn load(source: &str, config: &EngineConfig) -> (Npc, Result<bool>) {
        let script = Arc::new(ParsedScript::parse("test", source).unwrap());
        let mut npc = Npc::new(NpcId::new(1), "test");
        let result = npc.load_data(&script, None, config);
        (npc, result)
    }

    #[test]
    fn test_polish_data_block() {
        let source = "\
#data
nazwa \"Strażnik\"
grafika \"npc/guard.gif\"
potwór
typ \"e2\"
płeć \"m\"
profesja \"w\"
poziom 25
siła 40
zręczność 12
intelekt 5
sa 150
hp 2400
atak \"30-45\"
pancerz 80
blok 15
unik 20
grupa 3
";
        let (npc, result) = load(source, &EngineConfig::default());
        assert!(result.unwrap());

        assert_eq!(npc.name, "Strażnik");
        assert_eq!(npc.graphic, "npc/guard.gif");
        assert_eq!(npc.kind, NpcKind::Monster);
        assert_eq!(npc.rank, Rank::Elite2);
        assert_eq!(npc.gender, Gender::Male);
        assert_eq!(npc.group, 3);
        assert_eq!(npc.stats.profession, Profession::Warrior);
        assert_eq!(npc.stats.level, 25);
        assert_eq!(npc.stats.strength, 40);
        assert_eq!(npc.stats.agility, 12);
        assert_eq!(npc.stats.intellect, 5);
        assert_eq!(npc.stats.attack_speed, 1.5);
        assert_eq!(npc.stats.max_hp, 2400);
        assert_eq!(npc.stats.damage, (30, 45));
        assert_eq!(npc.stats.armor, 80);
        assert_eq!(npc.stats.block, 15);
        assert_eq!(npc.stats.evade, 20);
    }

    #[test]
    fn test_english_data_block_with_logic() {
        let source = "\
#data
set lvl = 10
name \"Wolf\"
monster
type \"hero\"
level lvl * 3
hp lvl * 100
attack 5..lvl
if lvl >= 10
    respawn 120
";
        let (npc, result) = load(source, &EngineConfig::default());
        assert!(result.unwrap());
        assert_eq!(npc.rank, Rank::Hero);
        assert_eq!(npc.stats.level, 30);
        assert_eq!(npc.stats.max_hp, 1000);
        assert_eq!(npc.stats.damage, (5, 10));
        assert_eq!(npc.respawn_secs, Some(120));
    }

    #[test]
    fn test_wrong_parameter_kind_fails() {
        let (_, result) = load("#data\nlevel \"high\"\n", &EngineConfig::default());
        match result.unwrap_err() {
            NpcError::Script(ScriptError::Delegate { function, source }) => {
                assert_eq!(function, "level");
                assert!(source.to_string().contains("expects integer"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_values_fail() {
        for source in [
            "#data\ntype \"boss\"\n",
            "#data\nattack \"9-3\"\n",
            "#data\nattack \"lots\"\n",
            "#data\nhp -5\n",
            "#data\nname\n",
        ] {
            let (_, result) = load(source, &EngineConfig::default());
            assert!(
                matches!(result, Err(NpcError::Script(ScriptError::Delegate { .. }))),
                "{:?} for {:?}",
                result,
                source
            );
        }
    }

    #[test]
    fn test_dialogs_ignored_unless_strict() {
        let source = "#data\nname \"Old Man\"\ndialog \"Hello\"\n";
        let (npc, result) = load(source, &EngineConfig::default());
        assert!(result.unwrap());
        assert_eq!(npc.name, "Old Man");

        let strict = EngineConfig {
            strict_natives: true,
            ..EngineConfig::default()
        };
        let (_, result) = load(source, &strict);
        assert!(matches!(
            result,
            Err(NpcError::Script(ScriptError::UnhandledCall(name))) if name == "dialog"
        ));
    }

    #[test]
    fn test_missing_data_block() {
        let (npc, result) = load("#talk\ndialog \"Hi\"\n", &EngineConfig::default());
        assert!(!result.unwrap());
        assert_eq!(npc, Npc::new(NpcId::new(1), "test"));
    }

    #[test]
    fn test_configured_data_block_name() {
        let config = EngineConfig {
            data_block: "dane".into(),
            ..EngineConfig::default()
        };
        let (npc, result) = load("#dane\nnazwa \"Kupiec\"\n", &config);
        assert!(result.unwrap());
        assert_eq!(npc.name, "Kupiec");
    }
}
