//! Keyboard selection of the boolean operation shown by the viewer.

use easymesh::CsgOperation;
use macroquad::prelude::*;

/// Cycles through the CSG operations, plus a raw view of both operands.
pub struct OperationPicker {
    index: usize,
}

impl Default for OperationPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationPicker {
    /// Selectable entries; `None` shows the operands untouched.
    pub const OPERATIONS: [Option<CsgOperation>; 6] = [
        None,
        Some(CsgOperation::Union),
        Some(CsgOperation::Substract),
        Some(CsgOperation::SubstractLoss),
        Some(CsgOperation::And),
        Some(CsgOperation::Xor),
    ];

    /// Starts on the union.
    pub fn new() -> Self {
        Self { index: 1 }
    }

    pub fn selected(&self) -> Option<CsgOperation> {
        Self::OPERATIONS[self.index]
    }

    pub fn next(&mut self) {
        self.index = (self.index + 1) % Self::OPERATIONS.len();
    }

    pub fn previous(&mut self) {
        self.index = (self.index + Self::OPERATIONS.len() - 1) % Self::OPERATIONS.len();
    }

    /// Handles `Tab`/`Backspace` and the number keys.
    /// Returns true if the selection changed.
    pub fn update(&mut self) -> bool {
        let before = self.index;

        if is_key_pressed(KeyCode::Tab) {
            self.next();
        }
        if is_key_pressed(KeyCode::Backspace) {
            self.previous();
        }
        let digits = [
            KeyCode::Key0,
            KeyCode::Key1,
            KeyCode::Key2,
            KeyCode::Key3,
            KeyCode::Key4,
            KeyCode::Key5,
        ];
        if let Some(pressed) = digits.iter().position(|key| is_key_pressed(*key)) {
            self.index = pressed;
        }

        self.index != before
    }

    pub fn label(&self) -> &'static str {
        match self.selected() {
            None => "inputs",
            Some(CsgOperation::Union) => "union",
            Some(CsgOperation::Substract) => "substract",
            Some(CsgOperation::SubstractLoss) => "substract (open)",
            Some(CsgOperation::And) => "and",
            Some(CsgOperation::Xor) => "xor",
        }
    }

    /// Draws the selection overlay.
    pub fn draw_ui(&self, y_offset: f32) {
        draw_text(
            &format!("Operation: {} [{}]", self.label(), self.index),
            10.0,
            y_offset,
            18.0,
            YELLOW,
        );
        draw_text(
            "[Tab] next | [Backspace] previous | [0-5] select",
            10.0,
            y_offset + 20.0,
            16.0,
            DARKGRAY,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_both_ways() {
        let mut picker = OperationPicker::new();
        assert_eq!(picker.selected(), Some(CsgOperation::Union));

        picker.previous();
        assert_eq!(picker.selected(), None);
        picker.previous();
        assert_eq!(picker.selected(), Some(CsgOperation::Xor));
        picker.next();
        picker.next();
        assert_eq!(picker.label(), "union");
    }
}
