//! Parsed scripts
//!
//! A script source is a sequence of named blocks. Each block starts with a
//! header line `#name` in column 0 and runs until the next header:
//!
//! ```text
//! #data
//! name "Guard"
//! level 12
//!
//! #talk
//! dialog "Halt!"
//! ```

use crate::error::{Result, ScriptError};
use crate::line::read_lines;
use crate::parser::parse_lines;
use crate::registry::Registry;
use crate::statement::Statement;
use std::collections::HashMap;

/// Named top-level statement list
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    name: String,
    statements: Vec<Statement>,
}

impl Block {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }
}

/// All blocks of one script source, immutable once parsed
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedScript {
    name: String,
    blocks: HashMap<String, Block>,
}

/// Raw block text waiting to be parsed
struct Section<'s> {
    name: &'s str,
    header_line: usize,
    body: Vec<&'s str>,
}

impl ParsedScript {
    /// Parse `source` with the standard registry
    pub fn parse(name: &str, source: &str) -> Result<Self> {
        Self::parse_with(name, source, Registry::standard())
    }

    /// Parse `source` with a custom registry. Any error fails the whole script.
    pub fn parse_with(name: &str, source: &str, registry: &Registry) -> Result<Self> {
        let mut blocks = HashMap::new();

        for section in split_sections(source)? {
            let lines = read_lines(&section.body.join("\n"), section.header_line + 1)?;
            let statements = parse_lines(&lines, registry)?;

            if blocks.contains_key(section.name) {
                return Err(ScriptError::structure(
                    section.header_line,
                    format!("duplicate block `{}`", section.name),
                ));
            }
            blocks.insert(
                section.name.to_string(),
                Block {
                    name: section.name.to_string(),
                    statements,
                },
            );
        }

        tracing::debug!("Parsed script {} with {} block(s)", name, blocks.len());

        Ok(Self {
            name: name.to_string(),
            blocks,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_block(&self, name: &str) -> Option<&Block> {
        self.blocks.get(name)
    }

    pub fn has_block(&self, name: &str) -> bool {
        self.blocks.contains_key(name)
    }

    /// Block names in sorted order
    pub fn block_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.blocks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}

fn split_sections(source: &str) -> Result<Vec<Section<'_>>> {
    let mut sections: Vec<Section<'_>> = Vec::new();

    for (index, raw) in source.lines().enumerate() {
        let number = index + 1;

        if let Some(header) = raw.strip_prefix('#') {
            let name = header.trim();
            if name.is_empty() {
                return Err(ScriptError::structure(number, "block header without a name"));
            }
            if name.contains(char::is_whitespace) {
                return Err(ScriptError::structure(
                    number,
                    format!("block name `{}` contains whitespace", name),
                ));
            }
            sections.push(Section {
                name,
                header_line: number,
                body: Vec::new(),
            });
            continue;
        }

        match sections.last_mut() {
            Some(section) => section.body.push(raw),
            None => {
                let trimmed = raw.trim();
                if !trimmed.is_empty() && !trimmed.starts_with("//") {
                    return Err(ScriptError::structure(number, "statement outside of a block"));
                }
            }
        }
    }

    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Expr, Term};
    use crate::value::Value;

    const GUARD: &str = "\
// town guard
#data
name \"Guard\"
level 12

#talk
dialog \"Halt!\"
";

    #[test]
    fn test_blocks_by_name() {
        let script = ParsedScript::parse("guard", GUARD).unwrap();
        assert_eq!(script.name(), "guard");
        assert_eq!(script.block_names(), vec!["data", "talk"]);

        let data = script.get_block("data").unwrap();
        assert_eq!(data.name(), "data");
        assert_eq!(data.statements().len(), 2);
        assert_eq!(
            data.statements()[1],
            Statement::DelegatedCall {
                function: "level".into(),
                params: vec![Expr::Term(Term::Literal(Value::Integer(12)))],
                line: 4,
            }
        );
        assert!(script.get_block("missing").is_none());
    }

    #[test]
    fn test_parsing_is_deterministic() {
        let source = "#main\nset x = 0\nwhile x < 3\n    add x 1\n    if x == 2\n        log x\n";
        let first = ParsedScript::parse("s", source).unwrap();
        let second = ParsedScript::parse("s", source).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_keyword_reports_line() {
        let source = "#data\nname \"Guard\"\n\n// comment\ndance 3\n";
        let err = ParsedScript::parse("s", source).unwrap_err();
        match err {
            ScriptError::UnknownStatement { keyword, line } => {
                assert_eq!(keyword, "dance");
                assert_eq!(line, 5);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_header_errors() {
        let err = ParsedScript::parse("s", "#a\nlog 1\n#a\nlog 2\n").unwrap_err();
        assert!(matches!(err, ScriptError::ParseStructure { line: 3, .. }));

        let err = ParsedScript::parse("s", "#\nlog 1\n").unwrap_err();
        assert!(matches!(err, ScriptError::ParseStructure { line: 1, .. }));

        let err = ParsedScript::parse("s", "log 1\n#a\n").unwrap_err();
        assert!(matches!(err, ScriptError::ParseStructure { line: 1, .. }));
    }

    #[test]
    fn test_error_in_any_block_fails_the_script() {
        let err = ParsedScript::parse("s", "#good\nlog 1\n#bad\nif\n").unwrap_err();
        assert_eq!(err.line(), Some(4));
    }

    #[test]
    fn test_empty_block() {
        let script = ParsedScript::parse("s", "#empty\n\n#other\nlog 1\n").unwrap();
        assert!(script.get_block("empty").unwrap().statements().is_empty());
        assert_eq!(script.block_count(), 2);
    }

    #[test]
    fn test_custom_registry() {
        let mut registry = Registry::new();
        registry.register_native("teleport");
        let script = ParsedScript::parse_with("s", "#a\nteleport 1, 2\n", &registry).unwrap();
        assert!(script.has_block("a"));

        let err = ParsedScript::parse_with("s", "#a\nlog 1\n", &registry).unwrap_err();
        assert!(matches!(err, ScriptError::UnknownStatement { line: 2, .. }));
    }
}
