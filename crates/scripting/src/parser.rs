//! Block parser
//!
//! Walks the [`Line`] records of one block and builds its statement tree.
//! Block-bearing statements pull their own children through the cursor.

use crate::error::{Result, ScriptError};
use crate::line::Line;
use crate::registry::{Registry, StatementKind};
use crate::statement::Statement;

/// Parser cursor over the lines of one block
pub struct Cursor<'a> {
    lines: &'a [Line],
    pos: usize,
    registry: &'a Registry,
    loop_depth: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(lines: &'a [Line], registry: &'a Registry) -> Self {
        Self {
            lines,
            pos: 0,
            registry,
            loop_depth: 0,
        }
    }

    fn peek(&self) -> Option<&'a Line> {
        self.lines.get(self.pos)
    }

    /// Parse consecutive statements at `depth`, stopping at the first
    /// shallower line
    pub fn parse_block(&mut self, depth: usize) -> Result<Vec<Statement>> {
        let mut statements = Vec::new();

        while let Some(line) = self.peek() {
            if line.depth < depth {
                break;
            }
            if line.depth > depth {
                return Err(ScriptError::structure(line.number, "unexpected indentation"));
            }
            self.pos += 1;

            let kind = self
                .registry
                .lookup(&line.keyword)
                .ok_or_else(|| ScriptError::UnknownStatement {
                    keyword: line.keyword.clone(),
                    line: line.number,
                })?;
            statements.push(kind.parse(&line.keyword, self, line)?);
        }

        Ok(statements)
    }

    /// Parse the children of `parent`; no deeper lines means an empty body
    pub fn parse_body(&mut self, parent: &Line) -> Result<Vec<Statement>> {
        match self.peek() {
            Some(next) if next.depth > parent.depth => self.parse_block(parent.depth + 1),
            _ => Ok(Vec::new()),
        }
    }

    /// Parse the body of a loop, where `break` and `continue` are allowed
    pub fn parse_loop_body(&mut self, parent: &Line) -> Result<Vec<Statement>> {
        self.loop_depth += 1;
        let body = self.parse_body(parent);
        self.loop_depth -= 1;
        body
    }

    pub fn in_loop(&self) -> bool {
        self.loop_depth > 0
    }

    /// Take the next line if it continues a conditional chain at `depth`
    pub fn next_chain_link(&mut self, depth: usize) -> Option<(StatementKind, &'a Line)> {
        let line = self.peek().filter(|line| line.depth == depth)?;
        match self.registry.lookup(&line.keyword) {
            Some(kind @ (StatementKind::ElseIf | StatementKind::Else)) => {
                self.pos += 1;
                Some((kind, line))
            }
            _ => None,
        }
    }
}

/// Parse the lines of one block into its root statement list
pub fn parse_lines(lines: &[Line], registry: &Registry) -> Result<Vec<Statement>> {
    Cursor::new(lines, registry).parse_block(0)
}
