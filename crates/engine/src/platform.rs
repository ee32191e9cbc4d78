//! Concrete UI shells.
//!
//! - [`HeadlessShell`]: renders nothing (CI, daemon, scenarios)
//! - [`RecordingShell`]: keeps every view and button flash, for tests
//! - [`TerminalShell`]: prints the history and input lines to a writer

use crate::calculator::View;
use crate::keys::Button;
use crate::traits::UiShell;
use std::io::Write;
use std::sync::{Arc, Mutex};

// ===========================================================================
// Headless
// ===========================================================================

pub struct HeadlessShell;

impl UiShell for HeadlessShell {
    fn render(&mut self, view: &View) {
        tracing::trace!(input = %view.input, history = %view.history, "render (headless)");
    }
}

// ===========================================================================
// Recording
// ===========================================================================

#[derive(Debug, Default)]
pub struct Recording {
    pub views: Vec<View>,
    pub buttons: Vec<Button>,
}

/// Records into a shared [`Recording`] so the caller can inspect it after
/// handing the shell to a context.
#[derive(Clone, Default)]
pub struct RecordingShell {
    log: Arc<Mutex<Recording>>,
}

impl RecordingShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Arc<Mutex<Recording>> {
        Arc::clone(&self.log)
    }
}

impl UiShell for RecordingShell {
    fn render(&mut self, view: &View) {
        if let Ok(mut log) = self.log.lock() {
            log.views.push(view.clone());
        }
    }

    fn flash_button(&mut self, button: Button) {
        if let Ok(mut log) = self.log.lock() {
            log.buttons.push(button);
        }
    }
}

// ===========================================================================
// Terminal
// ===========================================================================

pub struct TerminalShell<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> TerminalShell<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl TerminalShell<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> UiShell for TerminalShell<W> {
    fn render(&mut self, view: &View) {
        let pending = view.pending.map(|op| op.to_string()).unwrap_or_default();
        let res = writeln!(self.out, "  {:>25}  {}", view.history, pending)
            .and_then(|_| writeln!(self.out, "  {:>25}", view.input))
            .and_then(|_| self.out.flush());
        if let Err(e) = res {
            tracing::warn!(error = %e, "terminal render failed");
        }
    }
}
