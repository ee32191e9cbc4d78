//! Application context – one calculator plus the shell it renders into.

use crate::calculator::{Calculator, CalculatorSettings, View};
use crate::keys::Key;
use crate::platform::HeadlessShell;
use crate::traits::UiShell;

/// Central context passed to all engine commands.
///
/// Holds the calculator state and a trait-object shell so callers (CLI,
/// daemon, a GUI) can swap presentation without touching the engine.
pub struct AppContext {
    calculator: Calculator,
    shell: Box<dyn UiShell>,
}

impl AppContext {
    pub fn new(settings: CalculatorSettings, shell: Box<dyn UiShell>) -> Self {
        Self {
            calculator: Calculator::new(settings),
            shell,
        }
    }

    /// Create a context that renders nothing, with default settings.
    pub fn default_headless() -> Self {
        Self::new(CalculatorSettings::default(), Box::new(HeadlessShell))
    }

    pub fn calculator(&self) -> &Calculator {
        &self.calculator
    }

    /// Run one action against the calculator and render the result.
    pub fn dispatch<F>(&mut self, action: F) -> View
    where
        F: FnOnce(&mut Calculator) -> View,
    {
        let view = action(&mut self.calculator);
        self.shell.render(&view);
        view
    }

    /// Press a key, flashing its on-screen button first.
    pub fn press_key(&mut self, key: Key) -> View {
        if let Some(button) = key.button() {
            self.shell.flash_button(button);
        }
        self.dispatch(|calc| calc.press_key(key))
    }

    pub fn press_keys(&mut self, keys: &[Key]) -> View {
        for key in keys {
            self.press_key(*key);
        }
        self.calculator.view()
    }
}
