use crate::tui::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeName {
    Dark,
    Light,
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub foreground: Color,
    pub dim: Color,
    pub border: Color,
    pub selection: Color,
    pub selection_text: Color,
    pub branch_current: Color,
    pub branch_local: Color,
    pub branch_remote: Color,
    pub modified: Color,
    pub merged: Color,
    pub warning: Color,
    pub error: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            background: Color::rgb(30, 30, 46),        // #1e1e2e
            foreground: Color::rgb(205, 214, 244),     // #cdd6f4
            dim: Color::rgb(108, 112, 134),            // #6c7086
            border: Color::rgb(108, 112, 134),         // #6c7086
            selection: Color::rgb(49, 50, 68),         // #313244
            selection_text: Color::rgb(205, 214, 244), // #cdd6f4
            branch_current: Color::rgb(166, 227, 161), // #a6e3a1
            branch_local: Color::rgb(137, 180, 250),   // #89b4fa
            branch_remote: Color::rgb(203, 166, 247),  // #cba6f7
            modified: Color::rgb(249, 226, 175),       // #f9e2af
            merged: Color::rgb(148, 226, 213),         // #94e2d5
            warning: Color::rgb(249, 226, 175),        // #f9e2af
            error: Color::rgb(243, 139, 168),          // #f38ba8
        }
    }

    pub fn light() -> Self {
        Self {
            background: Color::rgb(239, 241, 245),     // #eff1f5
            foreground: Color::rgb(76, 79, 105),       // #4c4f69
            dim: Color::rgb(156, 160, 176),            // #9ca0b0
            border: Color::rgb(156, 160, 176),         // #9ca0b0
            selection: Color::rgb(204, 208, 218),      // #ccd0da
            selection_text: Color::rgb(76, 79, 105),   // #4c4f69
            branch_current: Color::rgb(64, 160, 43),   // #40a02b
            branch_local: Color::rgb(30, 102, 245),    // #1e66f5
            branch_remote: Color::rgb(136, 57, 239),   // #8839ef
            modified: Color::rgb(223, 142, 29),        // #df8e1d
            merged: Color::rgb(23, 146, 153),          // #179299
            warning: Color::rgb(223, 142, 29),         // #df8e1d
            error: Color::rgb(210, 15, 57),            // #d20f39
        }
    }
}
