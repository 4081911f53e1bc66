//! # NpcScript Scripting Engine
//!
//! Parser and interpreter for the NPC scripting language.
//!
//! ## Pipeline
//! - Script text is split into named blocks (`#data`, `#talk`, ...)
//! - Each block is read into indented [`Line`]s
//! - The [`Registry`] maps every line's keyword to a [`StatementKind`]
//! - The parser builds a [`Statement`] tree per block, collected in a [`ParsedScript`]
//! - [`ExecutionContext`] runs a block, handing native calls to a host [`Delegate`]
//!
//! ## Example
//!
//! ```
//! use npcscript_scripting::{ExecutionContext, ParsedScript};
//! use std::sync::Arc;
//!
//! let script = Arc::new(ParsedScript::parse("guard", "#data\nset lvl = 3\nlevel lvl * 2\n")?);
//! let mut ctx = ExecutionContext::new();
//! ctx.run_block(&script, "data")?;
//! # Ok::<(), npcscript_scripting::ScriptError>(())
//! ```

pub mod context;
pub mod error;
pub mod expr;
pub mod lexer;
pub mod library;
pub mod line;
pub mod parser;
pub mod registry;
pub mod script;
pub mod statement;
pub mod value;

pub use context::{Delegate, Dispatch, ExecutionContext, FnDelegate, NativeCall, Signal};
pub use error::{DelegateError, Result, ScriptError};
pub use library::{LoadReport, ScriptLibrary};
pub use line::Line;
pub use registry::{Registry, StatementKind};
pub use script::{Block, ParsedScript};
pub use statement::{BlockTarget, Branch, Statement};
pub use value::{ArithOp, CmpOp, Value};
