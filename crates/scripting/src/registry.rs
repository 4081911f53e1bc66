//! Statement type registry
//!
//! Maps the leading keyword of a line to the statement kind that parses it.
//! This table is the whole surface grammar of the language: a keyword that
//! is not registered here does not parse.

use crate::value::ArithOp;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Statement kind a keyword resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    If,
    ElseIf,
    Else,
    While,
    ForEach,
    Assign,
    AssignOuter,
    Execute,
    Arithmetic(ArithOp),
    Break,
    Continue,
    /// Delegated call; the keyword is the function name
    Native,
}

/// Keyword table
#[derive(Debug, Clone, Default)]
pub struct Registry {
    keywords: HashMap<String, StatementKind>,
}

/// English control keywords
const ENGLISH: &[(&str, StatementKind)] = &[
    ("if", StatementKind::If),
    ("else-if", StatementKind::ElseIf),
    ("else", StatementKind::Else),
    ("while", StatementKind::While),
    ("for-each", StatementKind::ForEach),
    ("set", StatementKind::Assign),
    ("outer", StatementKind::AssignOuter),
    ("run", StatementKind::Execute),
    ("add", StatementKind::Arithmetic(ArithOp::Add)),
    ("subtract", StatementKind::Arithmetic(ArithOp::Sub)),
    ("multiply", StatementKind::Arithmetic(ArithOp::Mul)),
    ("divide", StatementKind::Arithmetic(ArithOp::Div)),
    ("break", StatementKind::Break),
    ("continue", StatementKind::Continue),
];

/// Polish control keywords
const POLISH: &[(&str, StatementKind)] = &[
    ("jeżeli", StatementKind::If),
    ("lub", StatementKind::ElseIf),
    ("przeciwnie", StatementKind::Else),
    ("dopóki", StatementKind::While),
    ("każdy", StatementKind::ForEach),
    ("ustaw", StatementKind::Assign),
    ("zewnętrzny", StatementKind::AssignOuter),
    ("wykonaj", StatementKind::Execute),
    ("dodaj", StatementKind::Arithmetic(ArithOp::Add)),
    ("odejmij", StatementKind::Arithmetic(ArithOp::Sub)),
    ("pomnóż", StatementKind::Arithmetic(ArithOp::Mul)),
    ("podziel", StatementKind::Arithmetic(ArithOp::Div)),
    ("przerwij", StatementKind::Break),
    ("kontynuuj", StatementKind::Continue),
];

/// Native functions understood by NPC hosts, in both vocabularies
const NATIVES: &[&str] = &[
    // Identity
    "name", "nazwa",
    "graphic", "grafika",
    "npc",
    "monster", "potwór",
    "type", "typ",
    "gender", "płeć",
    "group", "grupa",
    "respawn",
    // Dialogs
    "dialog",
    "option", "opcja",
    // Stats
    "level", "poziom",
    "profession", "profesja",
    "strength", "siła", "str",
    "agility", "zręczność", "agi",
    "intellect", "intelekt", "int",
    "hp",
    "attack-speed", "sa",
    "attack", "atak",
    "armor", "pancerz",
    "block", "blok",
    "evade", "unik",
    // Diagnostics
    "log",
];

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with both built-in vocabularies and all NPC natives
    pub fn with_standard_vocabulary() -> Self {
        let mut registry = Self::new();
        for (keyword, kind) in ENGLISH.iter().chain(POLISH) {
            registry.register(keyword, *kind);
        }
        for name in NATIVES {
            registry.register_native(name);
        }
        registry
    }

    /// Shared standard registry, built on first use
    pub fn standard() -> &'static Registry {
        static STANDARD: OnceLock<Registry> = OnceLock::new();
        STANDARD.get_or_init(|| {
            let registry = Self::with_standard_vocabulary();
            tracing::debug!("Statement registry initialised with {} keywords", registry.len());
            registry
        })
    }

    /// Register a keyword, replacing any previous mapping
    pub fn register(&mut self, keyword: &str, kind: StatementKind) {
        self.keywords.insert(keyword.to_string(), kind);
    }

    /// Register a native function name
    pub fn register_native(&mut self, name: &str) {
        self.register(name, StatementKind::Native);
    }

    /// Exact, case-sensitive lookup
    pub fn lookup(&self, keyword: &str) -> Option<StatementKind> {
        self.keywords.get(keyword).copied()
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_vocabularies() {
        let registry = Registry::standard();
        assert_eq!(registry.lookup("if"), Some(StatementKind::If));
        assert_eq!(registry.lookup("jeżeli"), Some(StatementKind::If));
        assert_eq!(registry.lookup("każdy"), Some(StatementKind::ForEach));
        assert_eq!(
            registry.lookup("podziel"),
            Some(StatementKind::Arithmetic(ArithOp::Div))
        );
    }

    #[test]
    fn test_many_natives_share_one_kind() {
        let registry = Registry::standard();
        for name in ["nazwa", "dialog", "hp", "atak", "log"] {
            assert_eq!(registry.lookup(name), Some(StatementKind::Native));
        }
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let registry = Registry::standard();
        assert_eq!(registry.lookup("If"), None);
        assert_eq!(registry.lookup("WHILE"), None);
        assert_eq!(registry.lookup("dance"), None);
    }

    #[test]
    fn test_custom_registry() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());
        registry.register("when", StatementKind::If);
        registry.register_native("teleport");
        assert_eq!(registry.lookup("when"), Some(StatementKind::If));
        assert_eq!(registry.lookup("teleport"), Some(StatementKind::Native));
        assert_eq!(registry.lookup("if"), None);
        assert_eq!(registry.len(), 2);
    }
}
