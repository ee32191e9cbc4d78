//! Command registry and the built-in calculator commands.
//!
//! Commands are registered by name and invoked with JSON input/output.
//! Stateful commands return the calculator view; errors the calculator
//! shows to the user (divide by zero, overflow) are part of that view, not
//! command failures.

use crate::calculator::View;
use crate::context::AppContext;
use crate::evaluator::{self, CalcError};
use crate::keys::{self, Key};
use crate::operator::Operator;
use crate::types::*;
use crate::validator::{self, Selection};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Instant;

/// Signature for all engine commands.
pub type CommandHandler = fn(Value, &mut AppContext) -> Result<Value, CommandError>;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Calc(#[from] CalcError),
    #[error("{0}")]
    Other(String),
}

impl CommandError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            CommandError::InvalidInput(_) => ErrorCode::InvalidInput,
            CommandError::Calc(e) => e.code(),
            CommandError::Other(_) => ErrorCode::InternalError,
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

pub struct CommandRegistry {
    handlers: HashMap<String, CommandHandler>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        let mut reg = Self {
            handlers: HashMap::new(),
        };
        // Register built-in commands
        reg.register("digit", cmd_digit);
        reg.register("decimal", cmd_decimal);
        reg.register("toggle_sign", cmd_toggle_sign);
        reg.register("operator", cmd_operator);
        reg.register("equals", cmd_equals);
        reg.register("clear", cmd_clear);
        reg.register("backspace", cmd_backspace);
        reg.register("input", cmd_input);
        reg.register("key", cmd_key);
        reg.register("keys", cmd_keys);
        reg.register("state", cmd_state);
        reg.register("validate", cmd_validate);
        reg.register("evaluate", cmd_evaluate);
        reg
    }

    pub fn register(&mut self, name: &str, handler: CommandHandler) {
        self.handlers.insert(name.to_string(), handler);
    }

    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    /// Execute a command by name and return a full CommandResult.
    pub fn execute(&self, name: &str, args: Value, ctx: &mut AppContext) -> CommandResult {
        let run_id = new_run_id();
        let start = Instant::now();

        let handler = match self.handlers.get(name) {
            Some(h) => h,
            None => {
                return result_err(
                    "call",
                    name,
                    &run_id,
                    start.elapsed().as_millis() as u64,
                    ErrorCode::InvalidInput,
                    format!("unknown command: {}", name),
                );
            }
        };

        match handler(args, ctx) {
            Ok(data) => {
                let mut r = result_ok("call", name, &run_id, start.elapsed().as_millis() as u64);
                r.data = Some(data);
                r
            }
            Err(e) => {
                tracing::debug!(command = name, error = %e, "command failed");
                result_err(
                    "call",
                    name,
                    &run_id,
                    start.elapsed().as_millis() as u64,
                    e.error_code(),
                    e.to_string(),
                )
            }
        }
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ===========================================================================
// Arg helpers
// ===========================================================================

fn str_arg<'a>(args: &'a Value, field: &str) -> Result<&'a str, CommandError> {
    args.get(field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| CommandError::InvalidInput(format!("missing '{}' string field", field)))
}

fn num_arg(args: &Value, field: &str) -> Result<f64, CommandError> {
    args.get(field)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| CommandError::InvalidInput(format!("missing '{}' number field", field)))
}

fn op_arg(args: &Value) -> Result<Operator, CommandError> {
    str_arg(args, "op")?
        .parse()
        .map_err(|e: crate::operator::ParseOperatorError| CommandError::InvalidInput(e.to_string()))
}

fn view_json(view: &View) -> Result<Value, CommandError> {
    serde_json::to_value(view).map_err(|e| CommandError::Other(e.to_string()))
}

// ===========================================================================
// Built-in commands
// ===========================================================================

/// `digit` – append one digit. Args: `{ "digit": "7" }`
fn cmd_digit(args: Value, ctx: &mut AppContext) -> Result<Value, CommandError> {
    let raw = str_arg(&args, "digit")?;
    let mut chars = raw.chars();
    let digit = match (chars.next(), chars.next()) {
        (Some(d), None) if d.is_ascii_digit() => d,
        _ => {
            return Err(CommandError::InvalidInput(format!(
                "'digit' must be a single 0-9 character, got {:?}",
                raw
            )))
        }
    };
    view_json(&ctx.dispatch(|c| c.on_digit(digit)))
}

fn cmd_decimal(_args: Value, ctx: &mut AppContext) -> Result<Value, CommandError> {
    view_json(&ctx.dispatch(|c| c.on_decimal()))
}

fn cmd_toggle_sign(_args: Value, ctx: &mut AppContext) -> Result<Value, CommandError> {
    view_json(&ctx.dispatch(|c| c.on_toggle_sign()))
}

/// `operator` – press an operator. Args: `{ "op": "+" }`
fn cmd_operator(args: Value, ctx: &mut AppContext) -> Result<Value, CommandError> {
    let op = op_arg(&args)?;
    view_json(&ctx.dispatch(|c| c.on_operator(op)))
}

fn cmd_equals(_args: Value, ctx: &mut AppContext) -> Result<Value, CommandError> {
    view_json(&ctx.dispatch(|c| c.on_equals()))
}

fn cmd_clear(_args: Value, ctx: &mut AppContext) -> Result<Value, CommandError> {
    view_json(&ctx.dispatch(|c| c.on_clear()))
}

fn cmd_backspace(_args: Value, ctx: &mut AppContext) -> Result<Value, CommandError> {
    view_json(&ctx.dispatch(|c| c.on_backspace()))
}

/// `input` – text typed straight into the field.
///
/// Args: `{ "text": "12.5", "selection": { "start": 4, "end": 4 } }`
/// Returns: the view plus `"rolled_back": bool`
fn cmd_input(args: Value, ctx: &mut AppContext) -> Result<Value, CommandError> {
    let text = str_arg(&args, "text")?.to_string();
    let selection: Option<Selection> = match args.get("selection") {
        None | Some(Value::Null) => None,
        Some(v) => Some(
            serde_json::from_value(v.clone())
                .map_err(|e| CommandError::InvalidInput(format!("bad 'selection': {}", e)))?,
        ),
    };

    let mut rolled_back = false;
    let view = ctx.dispatch(|c| {
        let (view, rb) = c.on_input(&text, selection);
        rolled_back = rb;
        view
    });
    let mut data = view_json(&view)?;
    data["rolled_back"] = Value::Bool(rolled_back);
    Ok(data)
}

/// `key` – press a keyboard key by name. Args: `{ "key": "Enter" }`
fn cmd_key(args: Value, ctx: &mut AppContext) -> Result<Value, CommandError> {
    let name = str_arg(&args, "key")?;
    let key = Key::from_name(name)
        .ok_or_else(|| CommandError::InvalidInput(format!("unknown key: {:?}", name)))?;
    view_json(&ctx.press_key(key))
}

/// `keys` – press a whole key sequence. Args: `{ "sequence": "5+3=" }`
fn cmd_keys(args: Value, ctx: &mut AppContext) -> Result<Value, CommandError> {
    let seq = str_arg(&args, "sequence")?;
    let keys = keys::parse_sequence(seq).map_err(|e| CommandError::InvalidInput(e.to_string()))?;
    view_json(&ctx.press_keys(&keys))
}

fn cmd_state(_args: Value, ctx: &mut AppContext) -> Result<Value, CommandError> {
    view_json(&ctx.calculator().view())
}

/// `validate` – check a candidate input. Args: `{ "value": "1e5" }`
fn cmd_validate(args: Value, _ctx: &mut AppContext) -> Result<Value, CommandError> {
    let value = str_arg(&args, "value")?;
    Ok(serde_json::json!({ "valid": validator::is_valid_number(value) }))
}

/// `evaluate` – stateless computation.
///
/// Args: `{ "op": "^", "lhs": 2, "rhs": 8 }`
/// Returns: `{ "value": 256.0, "display": "256", "history": "2 ^ 8 =" }`
fn cmd_evaluate(args: Value, _ctx: &mut AppContext) -> Result<Value, CommandError> {
    let op = op_arg(&args)?;
    let lhs = num_arg(&args, "lhs")?;
    let rhs = num_arg(&args, "rhs")?;
    let result = evaluator::compute(op, lhs, rhs)?;
    Ok(serde_json::json!({
        "value": result.value,
        "display": result.display(),
        "history": result.history,
    }))
}

// ===========================================================================
// Tests
// ===========================================================================
