use crate::calculator::View;
use crate::keys::Button;

// ---------------------------------------------------------------------------
// UI shell
// ---------------------------------------------------------------------------

/// The presentation side of the calculator: whatever draws the input and
/// history lines and animates the on-screen buttons.
pub trait UiShell: Send {
    /// Show the latest state.
    fn render(&mut self, view: &View);

    /// Visually press an on-screen button (keyboard input mirrors the
    /// button it stands for).
    fn flash_button(&mut self, _button: Button) {}
}
