use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub modifier: Modifier,
}

impl Style {
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            modifier: Modifier::empty(),
        }
    }

    pub const fn fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    pub const fn bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    pub const fn bold(mut self) -> Self {
        self.modifier = self.modifier.union(Modifier::BOLD);
        self
    }

    pub const fn dim(mut self) -> Self {
        self.modifier = self.modifier.union(Modifier::DIM);
        self
    }

    /// The whole style as one SGR sequence, starting from a reset so no
    /// attribute leaks over from the previously emitted cell.
    pub fn sgr(&self) -> String {
        let mut seq = String::from("\x1b[0");
        if self.modifier.contains(Modifier::BOLD) {
            seq.push_str(";1");
        }
        if self.modifier.contains(Modifier::DIM) {
            seq.push_str(";2");
        }
        if let Some(fg) = self.fg {
            let _ = write!(seq, ";38;2;{};{};{}", fg.r, fg.g, fg.b);
        }
        if let Some(bg) = self.bg {
            let _ = write!(seq, ";48;2;{};{};{}", bg.r, bg.g, bg.b);
        }
        seq.push('m');
        seq
    }
}

/// Truecolor value. An unset `Option<Color>` falls back to the
/// terminal's own default, so no named palette is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifier(u8);

impl Modifier {
    pub const BOLD: Self = Self(0b01);
    pub const DIM: Self = Self(0b10);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}
