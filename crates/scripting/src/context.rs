//! Script execution context
//!
//! Carries the variable scopes, the host delegate and the owner handle
//! through one execution. Scopes form a stack: a scope's parent is the one
//! below it, reads walk outward, plain writes stay local. A fresh scope is
//! pushed for every `for-each` iteration and every `run` call and dropped
//! when it ends.

use crate::error::{DelegateError, Result, ScriptError};
use crate::library::ScriptLibrary;
use crate::script::ParsedScript;
use crate::statement::{execute_statements, BlockTarget};
use crate::value::Value;
use npcscript_core::EntityHandle;
use std::collections::HashMap;
use std::sync::Arc;

/// Default limit for nested `run` calls
pub const DEFAULT_MAX_CALL_DEPTH: usize = 64;

/// Control-flow outcome of executing a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    None,
    Continue,
    Break,
}

/// Whether the host acted on a native call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Handled,
    Ignored,
}

/// A native call as seen by the host
#[derive(Debug, Clone)]
pub struct NativeCall<'a> {
    /// Function name, i.e. the statement keyword
    pub function: &'a str,
    /// Evaluated parameters in source order
    pub params: &'a [Value],
    /// Entity the execution is bound to
    pub owner: Option<EntityHandle>,
    /// Source line of the call
    pub line: usize,
}

impl NativeCall<'_> {
    /// Parameter at `index`, or a type error naming the function
    pub fn param(&self, index: usize) -> std::result::Result<&Value, DelegateError> {
        self.params.get(index).ok_or_else(|| {
            format!("`{}` expects at least {} parameter(s)", self.function, index + 1).into()
        })
    }
}

/// Host hook for native calls.
///
/// This is the only way scripts reach game state. Errors returned here are
/// passed to the caller of the execution unchanged, wrapped in
/// [`ScriptError::Delegate`].
pub trait Delegate {
    fn call(
        &mut self,
        call: &NativeCall<'_>,
        ctx: &ExecutionContext<'_>,
    ) -> std::result::Result<Dispatch, DelegateError>;
}

/// Delegate backed by a closure
pub struct FnDelegate<F>(F);

impl<F> FnDelegate<F>
where
    F: FnMut(&NativeCall<'_>) -> std::result::Result<Dispatch, DelegateError>,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Delegate for FnDelegate<F>
where
    F: FnMut(&NativeCall<'_>) -> std::result::Result<Dispatch, DelegateError>,
{
    fn call(
        &mut self,
        call: &NativeCall<'_>,
        _ctx: &ExecutionContext<'_>,
    ) -> std::result::Result<Dispatch, DelegateError> {
        (self.0)(call)
    }
}

#[derive(Debug, Default)]
struct Scope {
    variables: HashMap<String, Value>,
}

/// Script execution context
pub struct ExecutionContext<'h> {
    /// Scope stack, root first
    scopes: Vec<Scope>,

    /// Host native call handler
    delegate: Option<&'h mut dyn Delegate>,

    /// Entity this execution is bound to
    owner: Option<EntityHandle>,

    /// Script whose block is executing, target of same-script `run`
    script: Option<Arc<ParsedScript>>,

    /// Other scripts reachable through `run script:block`
    library: Option<&'h ScriptLibrary>,

    /// Fail on native calls the delegate ignores
    strict: bool,

    max_call_depth: usize,
    call_depth: usize,
}

impl<'h> ExecutionContext<'h> {
    /// Create a context with an empty root scope and no delegate
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
            delegate: None,
            owner: None,
            script: None,
            library: None,
            strict: false,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            call_depth: 0,
        }
    }

    pub fn with_delegate(mut self, delegate: &'h mut dyn Delegate) -> Self {
        self.delegate = Some(delegate);
        self
    }

    pub fn with_owner(mut self, owner: impl Into<EntityHandle>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_library(mut self, library: &'h ScriptLibrary) -> Self {
        self.library = Some(library);
        self
    }

    pub fn with_strict_natives(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn owner(&self) -> Option<EntityHandle> {
        self.owner
    }

    /// Number of scopes currently open, including the root
    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    /// Look a variable up, innermost scope first
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.variables.get(name))
    }

    /// Like [`lookup`](Self::lookup), but a missing variable is an error
    pub fn resolve(&self, name: &str) -> Result<&Value> {
        self.lookup(name)
            .ok_or_else(|| ScriptError::UndefinedVariable(name.to_string()))
    }

    /// Variable defined in the innermost scope only
    pub fn local(&self, name: &str) -> Option<&Value> {
        self.scopes.last().and_then(|scope| scope.variables.get(name))
    }

    /// Write to the innermost scope
    pub fn assign(&mut self, name: &str, value: Value) {
        let index = self.scopes.len() - 1;
        self.write(index, name, value);
    }

    /// Write to the nearest scope defining `name`, or the root scope
    pub fn assign_outer(&mut self, name: &str, value: Value) {
        let index = self.defining_scope(name).unwrap_or(0);
        self.write(index, name, value);
    }

    /// Write to the nearest scope defining `name`, or the innermost scope
    pub fn update(&mut self, name: &str, value: Value) {
        let index = self
            .defining_scope(name)
            .unwrap_or(self.scopes.len() - 1);
        self.write(index, name, value);
    }

    fn defining_scope(&self, name: &str) -> Option<usize> {
        self.scopes
            .iter()
            .rposition(|scope| scope.variables.contains_key(name))
    }

    fn write(&mut self, index: usize, name: &str, value: Value) {
        if let Some(scope) = self.scopes.get_mut(index) {
            scope.variables.insert(name.to_string(), value);
        }
    }

    /// Run `f` inside a fresh child scope, dropped afterwards even on error
    pub fn with_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.scopes.push(Scope::default());
        let result = f(self);
        self.scopes.pop();
        result
    }

    /// Run a named block of `script` in the current scope
    pub fn run_block(&mut self, script: &Arc<ParsedScript>, name: &str) -> Result<()> {
        let block = script
            .get_block(name)
            .ok_or_else(|| ScriptError::BlockNotFound(format!("{}:{}", script.name(), name)))?;

        tracing::debug!("Running block {}:{}", script.name(), name);

        let previous = self.script.replace(Arc::clone(script));
        let result = execute_statements(block.statements(), self);
        self.script = previous;
        result.map(|_| ())
    }

    /// Execute a `run` target in a child scope
    pub(crate) fn run_target(&mut self, target: &BlockTarget) -> Result<()> {
        if self.call_depth >= self.max_call_depth {
            return Err(ScriptError::StackOverflow);
        }

        // A qualified name that matches the running script resolves locally
        let current = self.script.as_ref().filter(|script| {
            target.script.as_deref().map_or(true, |name| name == script.name())
        });
        let script = match (&target.script, current) {
            (_, Some(script)) => Arc::clone(script),
            (Some(name), None) => self
                .library
                .and_then(|library| library.get(name))
                .ok_or_else(|| ScriptError::ScriptNotFound(name.clone()))?,
            (None, None) => return Err(ScriptError::BlockNotFound(target.block.clone())),
        };
        let block = script
            .get_block(&target.block)
            .ok_or_else(|| ScriptError::BlockNotFound(format!("{}:{}", script.name(), target.block)))?;

        tracing::trace!("Entering block {}:{}", script.name(), target.block);

        let previous = self.script.replace(Arc::clone(&script));
        self.call_depth += 1;
        // Signals end at the block boundary
        let result = self.with_scope(|ctx| execute_statements(block.statements(), ctx));
        self.call_depth -= 1;
        self.script = previous;
        result.map(|_| ())
    }

    /// Forward a native call to the delegate
    pub(crate) fn call_native(&mut self, function: &str, params: Vec<Value>, line: usize) -> Result<()> {
        let Some(delegate) = self.delegate.take() else {
            tracing::trace!("No delegate for `{}` at line {}, skipping", function, line);
            return Ok(());
        };

        let call = NativeCall {
            function,
            params: &params,
            owner: self.owner,
            line,
        };
        let outcome = delegate.call(&call, self);
        self.delegate = Some(delegate);

        match outcome {
            Ok(Dispatch::Handled) => Ok(()),
            Ok(Dispatch::Ignored) if self.strict => Err(ScriptError::UnhandledCall(function.to_string())),
            Ok(Dispatch::Ignored) => {
                tracing::debug!("Native call `{}` at line {} ignored by host", function, line);
                Ok(())
            }
            Err(source) => Err(ScriptError::Delegate {
                function: function.to_string(),
                source,
            }),
        }
    }
}

impl Default for ExecutionContext<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_walk_outward_writes_stay_local() {
        let mut ctx = ExecutionContext::new();
        ctx.assign("x", Value::Integer(1));

        ctx.with_scope(|ctx| {
            assert_eq!(ctx.resolve("x")?, &Value::Integer(1));
            ctx.assign("x", Value::Integer(2));
            ctx.assign("y", Value::Integer(3));
            assert_eq!(ctx.resolve("x")?, &Value::Integer(2));
            Ok(())
        })
        .unwrap();

        assert_eq!(ctx.resolve("x").unwrap(), &Value::Integer(1));
        assert!(matches!(ctx.resolve("y"), Err(ScriptError::UndefinedVariable(name)) if name == "y"));
    }

    #[test]
    fn test_assign_outer_targets_defining_scope() {
        let mut ctx = ExecutionContext::new();
        ctx.assign("total", Value::Integer(0));

        ctx.with_scope(|ctx| {
            ctx.with_scope(|ctx| {
                ctx.assign_outer("total", Value::Integer(5));
                ctx.assign_outer("fresh", Value::Bool(true));
                Ok(())
            })
        })
        .unwrap();

        assert_eq!(ctx.local("total"), Some(&Value::Integer(5)));
        assert_eq!(ctx.local("fresh"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_update_falls_back_to_innermost() {
        let mut ctx = ExecutionContext::new();
        ctx.with_scope(|ctx| {
            ctx.update("count", Value::Integer(1));
            assert_eq!(ctx.local("count"), Some(&Value::Integer(1)));
            Ok(())
        })
        .unwrap();
        assert!(ctx.lookup("count").is_none());
    }

    #[test]
    fn test_scope_popped_on_error() {
        let mut ctx = ExecutionContext::new();
        let result: Result<()> = ctx.with_scope(|_| Err(ScriptError::StackOverflow));
        assert!(result.is_err());
        assert_eq!(ctx.scope_depth(), 1);
    }

    #[test]
    fn test_native_call_without_delegate_is_noop() {
        let mut ctx = ExecutionContext::new().with_strict_natives(true);
        ctx.call_native("name", vec![Value::from("Guard")], 1).unwrap();
    }

    #[test]
    fn test_native_call_reaches_delegate_with_owner() {
        use npcscript_core::NpcId;

        let mut seen = Vec::new();
        let mut delegate = FnDelegate::new(|call: &NativeCall<'_>| {
            seen.push((call.function.to_string(), call.params.to_vec(), call.owner));
            Ok(Dispatch::Handled)
        });

        {
            let mut ctx = ExecutionContext::new()
                .with_delegate(&mut delegate)
                .with_owner(NpcId::new(4));
            ctx.call_native("hp", vec![Value::Integer(50)], 2).unwrap();
        }
        drop(delegate);

        assert_eq!(
            seen,
            vec![(
                "hp".to_string(),
                vec![Value::Integer(50)],
                Some(EntityHandle::Npc(NpcId::new(4)))
            )]
        );
    }

    #[test]
    fn test_strict_mode_rejects_ignored_calls() {
        let mut delegate = FnDelegate::new(|_: &NativeCall<'_>| Ok(Dispatch::Ignored));

        let mut lenient = ExecutionContext::new().with_delegate(&mut delegate);
        lenient.call_native("dance", Vec::new(), 1).unwrap();
        drop(lenient);

        let mut strict = ExecutionContext::new()
            .with_delegate(&mut delegate)
            .with_strict_natives(true);
        let err = strict.call_native("dance", Vec::new(), 1).unwrap_err();
        assert!(matches!(err, ScriptError::UnhandledCall(name) if name == "dance"));
    }

    #[test]
    fn test_delegate_errors_pass_through() {
        let mut delegate = FnDelegate::new(|_: &NativeCall<'_>| Err("host refused".into()));
        let mut ctx = ExecutionContext::new().with_delegate(&mut delegate);

        let err = ctx.call_native("hp", Vec::new(), 3).unwrap_err();
        match err {
            ScriptError::Delegate { function, source } => {
                assert_eq!(function, "hp");
                assert_eq!(source.to_string(), "host refused");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
