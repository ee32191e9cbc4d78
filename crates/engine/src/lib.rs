//! Engine crate – the headless calculator core.
//!
//! Holds the input validator, the single-pending-operation state machine
//! and the arithmetic evaluator, plus the command registry and scenario
//! runner the CLI harness drives. It does NOT depend on any UI toolkit:
//! presentation goes through the [`traits::UiShell`] seam.

pub mod calculator;
pub mod commands;
pub mod context;
pub mod evaluator;
pub mod keys;
pub mod layout;
pub mod number;
pub mod operator;
pub mod platform;
pub mod scenario;
pub mod traits;
pub mod types;
pub mod validator;

// Re-exports for convenience
pub use calculator::{Calculator, CalculatorSettings, View};
pub use commands::CommandRegistry;
pub use context::AppContext;
pub use evaluator::CalcError;
pub use operator::Operator;
pub use types::{CommandResult, ErrorCode, ErrorInfo, Status};
