use super::layout::Rect;
use super::style::Style;

/// Marker stored in the cell shadowed by a double-width character. Never
/// emitted; the flush skips it and lets the wide glyph cover both columns.
pub const WIDE_SHADOW: char = '\0';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            style: Style::default(),
        }
    }
}

/// Grid of styled characters the views draw into. The terminal keeps two
/// of these and only emits the cells that changed between frames.
#[derive(Debug, Clone)]
pub struct Buffer {
    pub area: Rect,
    cells: Vec<Cell>,
}

impl Buffer {
    pub fn empty(area: Rect) -> Self {
        let size = area.width as usize * area.height as usize;
        Self {
            area,
            cells: vec![Cell::default(); size],
        }
    }

    pub fn resize(&mut self, area: Rect) {
        self.area = area;
        self.cells.clear();
        self.cells
            .resize(area.width as usize * area.height as usize, Cell::default());
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    fn index(&self, x: u16, y: u16) -> usize {
        let col = x.saturating_sub(self.area.x) as usize;
        let row = y.saturating_sub(self.area.y) as usize;
        row * self.area.width as usize + col
    }

    pub fn get(&self, x: u16, y: u16) -> &Cell {
        &self.cells[self.index(x, y)]
    }

    pub fn get_mut(&mut self, x: u16, y: u16) -> &mut Cell {
        let idx = self.index(x, y);
        &mut self.cells[idx]
    }

    pub fn put_char(&mut self, x: u16, y: u16, ch: char, style: Style) {
        if x >= self.area.right() || y >= self.area.bottom() {
            return;
        }
        *self.get_mut(x, y) = Cell { ch, style };
    }

    /// Write a string starting at (x, y), clipped to the buffer edge.
    pub fn put_str(&mut self, x: u16, y: u16, text: &str, style: Style) {
        let max = self.area.right().saturating_sub(x);
        self.put_str_clipped(x, y, text, max, style);
    }

    /// Write at most `max_width` columns of `text`. A double-width glyph
    /// that would straddle the limit is dropped whole.
    pub fn put_str_clipped(&mut self, x: u16, y: u16, text: &str, max_width: u16, style: Style) {
        if y >= self.area.bottom() {
            return;
        }
        let mut col = x;
        let limit = self.area.right().min(x.saturating_add(max_width));

        for ch in text.chars() {
            let w = char_width(ch) as u16;
            if col + w > limit {
                break;
            }
            *self.get_mut(col, y) = Cell { ch, style };
            if w == 2 {
                *self.get_mut(col + 1, y) = Cell {
                    ch: WIDE_SHADOW,
                    style,
                };
            }
            col += w;
        }
    }

    /// Paint a region with spaces in the given style. Used to lay the
    /// backdrop under dialogs and highlighted rows.
    pub fn fill(&mut self, region: Rect, style: Style) {
        let region = self.area.intersection(region);
        for y in region.y..region.bottom() {
            for x in region.x..region.right() {
                *self.get_mut(x, y) = Cell { ch: ' ', style };
            }
        }
    }

    /// Cells where `newer` differs from this buffer, in row-major order.
    pub fn diff(&self, newer: &Buffer) -> Vec<(u16, u16, Cell)> {
        let mut changed = Vec::new();
        for y in self.area.y..self.area.bottom() {
            for x in self.area.x..self.area.right() {
                let cell = *newer.get(x, y);
                if *self.get(x, y) != cell {
                    changed.push((x, y, cell));
                }
            }
        }
        changed
    }
}

/// Display columns a character occupies. ASCII is 1; the common CJK and
/// fullwidth ranges are 2; everything else is treated as 1.
pub fn char_width(ch: char) -> usize {
    if ch.is_ascii() {
        return 1;
    }
    match ch {
        '\u{1100}'..='\u{115F}'
        | '\u{2E80}'..='\u{303E}'
        | '\u{3040}'..='\u{A4CF}'
        | '\u{AC00}'..='\u{D7A3}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{FE30}'..='\u{FE4F}'
        | '\u{FF00}'..='\u{FF60}'
        | '\u{FFE0}'..='\u{FFE6}'
        | '\u{20000}'..='\u{2FFFD}' => 2,
        _ => 1,
    }
}
