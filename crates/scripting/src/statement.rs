//! Statements
//!
//! The statement tree is a closed enum. Each [`StatementKind`] knows how to
//! parse its own parameters (and children, for block-bearing kinds) and each
//! [`Statement`] executes against an [`ExecutionContext`], returning a
//! [`Signal`] for the enclosing loop.

use crate::context::{ExecutionContext, Signal};
use crate::error::{Result, ScriptError};
use crate::expr::{Condition, Expr, IterSource, TokenStream};
use crate::lexer::Token;
use crate::line::Line;
use crate::parser::Cursor;
use crate::registry::StatementKind;
use crate::value::{ArithOp, Value};

/// One branch of a conditional chain; `None` is the `else` branch
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub condition: Option<Condition>,
    pub body: Vec<Statement>,
}

/// Target of a `run` statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTarget {
    /// Other script in the library, `None` for the running script
    pub script: Option<String>,
    pub block: String,
}

impl BlockTarget {
    /// Parse `block` or `script:block`
    pub fn parse(text: &str, line: usize) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() || text.contains(char::is_whitespace) {
            return Err(ScriptError::structure(line, "Expected a single block name"));
        }

        match text.split_once(':') {
            Some((script, block)) if !script.is_empty() && !block.is_empty() => Ok(Self {
                script: Some(script.to_string()),
                block: block.to_string(),
            }),
            Some(_) => Err(ScriptError::structure(line, format!("Invalid block reference `{}`", text))),
            None => Ok(Self {
                script: None,
                block: text.to_string(),
            }),
        }
    }
}

/// Executable statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `if` / `else-if` / `else` chain
    Conditional { branches: Vec<Branch>, line: usize },
    While {
        condition: Condition,
        body: Vec<Statement>,
        line: usize,
    },
    ForEach {
        binding: String,
        source: IterSource,
        body: Vec<Statement>,
        line: usize,
    },
    /// `set` writes locally, `outer` writes to the defining scope
    Assign {
        target: String,
        value: Expr,
        outer: bool,
        line: usize,
    },
    Arithmetic {
        target: String,
        op: ArithOp,
        operand: Expr,
        line: usize,
    },
    Execute { target: BlockTarget, line: usize },
    DelegatedCall {
        function: String,
        params: Vec<Expr>,
        line: usize,
    },
    /// `break` or `continue`
    Control { signal: Signal, line: usize },
}

impl Statement {
    /// Source line the statement starts on
    pub fn line(&self) -> usize {
        match self {
            Statement::Conditional { line, .. }
            | Statement::While { line, .. }
            | Statement::ForEach { line, .. }
            | Statement::Assign { line, .. }
            | Statement::Arithmetic { line, .. }
            | Statement::Execute { line, .. }
            | Statement::DelegatedCall { line, .. }
            | Statement::Control { line, .. } => *line,
        }
    }

    pub fn execute(&self, ctx: &mut ExecutionContext<'_>) -> Result<Signal> {
        tracing::trace!("Executing line {}", self.line());

        match self {
            Statement::Conditional { branches, .. } => {
                for branch in branches {
                    let taken = match &branch.condition {
                        Some(condition) => condition.evaluate(ctx)?,
                        None => true,
                    };
                    if taken {
                        return execute_statements(&branch.body, ctx);
                    }
                }
                Ok(Signal::None)
            }

            Statement::While { condition, body, .. } => {
                while condition.evaluate(ctx)? {
                    if execute_statements(body, ctx)? == Signal::Break {
                        break;
                    }
                }
                Ok(Signal::None)
            }

            Statement::ForEach {
                binding,
                source,
                body,
                ..
            } => {
                for item in source.items(ctx)? {
                    let signal = ctx.with_scope(|ctx| {
                        ctx.assign(binding, item);
                        execute_statements(body, ctx)
                    })?;
                    if signal == Signal::Break {
                        break;
                    }
                }
                Ok(Signal::None)
            }

            Statement::Assign {
                target,
                value,
                outer,
                ..
            } => {
                let value = value.evaluate(ctx)?;
                if *outer {
                    ctx.assign_outer(target, value);
                } else {
                    ctx.assign(target, value);
                }
                Ok(Signal::None)
            }

            Statement::Arithmetic {
                target, op, operand, ..
            } => {
                let current = ctx.lookup(target).cloned().unwrap_or(Value::Integer(0));
                let operand = operand.evaluate(ctx)?;
                let result = current.arithmetic(*op, &operand)?;
                ctx.update(target, result);
                Ok(Signal::None)
            }

            Statement::Execute { target, .. } => {
                ctx.run_target(target)?;
                Ok(Signal::None)
            }

            Statement::DelegatedCall {
                function,
                params,
                line,
            } => {
                let params = params
                    .iter()
                    .map(|param| param.evaluate(ctx))
                    .collect::<Result<Vec<_>>>()?;
                ctx.call_native(function, params, *line)?;
                Ok(Signal::None)
            }

            Statement::Control { signal, .. } => Ok(*signal),
        }
    }
}

/// Execute statements in order, stopping at the first loop signal
pub fn execute_statements(statements: &[Statement], ctx: &mut ExecutionContext<'_>) -> Result<Signal> {
    for statement in statements {
        let signal = statement.execute(ctx)?;
        if signal != Signal::None {
            return Ok(signal);
        }
    }
    Ok(Signal::None)
}

impl StatementKind {
    /// Build the statement for `line`, pulling its children from `cursor`
    pub fn parse(self, keyword: &str, cursor: &mut Cursor<'_>, line: &Line) -> Result<Statement> {
        let number = line.number;

        match self {
            StatementKind::If => parse_conditional(cursor, line),

            StatementKind::ElseIf | StatementKind::Else => Err(ScriptError::structure(
                number,
                format!("`{}` without a preceding `if`", keyword),
            )),

            StatementKind::While => {
                let condition = Condition::parse(&line.params, number)?;
                let body = cursor.parse_loop_body(line)?;
                Ok(Statement::While {
                    condition,
                    body,
                    line: number,
                })
            }

            StatementKind::ForEach => {
                let mut tokens = TokenStream::new(&line.params, number)?;
                let binding = tokens.identifier("loop variable")?;
                match tokens.next() {
                    Some(Token::In) | Some(Token::Colon) => {}
                    Some(Token::Identifier(word)) if word == "w" => {}
                    _ => return Err(tokens.error(format!("Expected `in` after `{}`", binding))),
                }
                let source = IterSource::parse(&mut tokens)?;
                tokens.expect_end()?;
                let body = cursor.parse_loop_body(line)?;
                Ok(Statement::ForEach {
                    binding,
                    source,
                    body,
                    line: number,
                })
            }

            StatementKind::Assign | StatementKind::AssignOuter => {
                let mut tokens = TokenStream::new(&line.params, number)?;
                let target = tokens.identifier("variable name")?;
                tokens.expect(Token::Assign, "Expected `=` after the variable name")?;
                let value = Expr::parse_tokens(&mut tokens)?;
                tokens.expect_end()?;
                Ok(Statement::Assign {
                    target,
                    value,
                    outer: self == StatementKind::AssignOuter,
                    line: number,
                })
            }

            StatementKind::Arithmetic(op) => {
                let mut tokens = TokenStream::new(&line.params, number)?;
                let target = tokens.identifier("variable name")?;
                let operand = Expr::parse_tokens(&mut tokens)?;
                tokens.expect_end()?;
                Ok(Statement::Arithmetic {
                    target,
                    op,
                    operand,
                    line: number,
                })
            }

            StatementKind::Execute => Ok(Statement::Execute {
                target: BlockTarget::parse(&line.params, number)?,
                line: number,
            }),

            StatementKind::Break | StatementKind::Continue => {
                if !cursor.in_loop() {
                    return Err(ScriptError::structure(
                        number,
                        format!("`{}` outside of a loop", keyword),
                    ));
                }
                if !line.params.is_empty() {
                    return Err(ScriptError::structure(
                        number,
                        format!("`{}` takes no parameters", keyword),
                    ));
                }
                let signal = if self == StatementKind::Break {
                    Signal::Break
                } else {
                    Signal::Continue
                };
                Ok(Statement::Control { signal, line: number })
            }

            StatementKind::Native => {
                let mut tokens = TokenStream::new(&line.params, number)?;
                let params = Expr::parse_list(&mut tokens)?;
                tokens.expect_end()?;
                Ok(Statement::DelegatedCall {
                    function: keyword.to_string(),
                    params,
                    line: number,
                })
            }
        }
    }
}

fn parse_conditional(cursor: &mut Cursor<'_>, line: &Line) -> Result<Statement> {
    let mut branches = vec![Branch {
        condition: Some(Condition::parse(&line.params, line.number)?),
        body: cursor.parse_body(line)?,
    }];
    let mut has_else = false;

    while let Some((kind, next)) = cursor.next_chain_link(line.depth) {
        if has_else {
            let message = if kind == StatementKind::Else {
                "duplicate `else` branch".to_string()
            } else {
                format!("`{}` after the `else` branch", next.keyword)
            };
            return Err(ScriptError::structure(next.number, message));
        }

        let condition = if kind == StatementKind::Else {
            if !next.params.is_empty() {
                return Err(ScriptError::structure(
                    next.number,
                    format!("`{}` takes no condition", next.keyword),
                ));
            }
            has_else = true;
            None
        } else {
            Some(Condition::parse(&next.params, next.number)?)
        };

        branches.push(Branch {
            condition,
            body: cursor.parse_body(next)?,
        });
    }

    Ok(Statement::Conditional {
        branches,
        line: line.number,
    })
}
