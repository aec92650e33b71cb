use crate::tui::{Buffer, Rect, Style};

/// Vertical scrollbar drawn in a one-column strip. Hidden entirely when
/// the list fits on screen.
pub struct Scrollbar {
    total: usize,
    visible: usize,
    offset: usize,
}

impl Scrollbar {
    pub fn new(total: usize, visible: usize, offset: usize) -> Self {
        Self {
            total,
            visible,
            offset,
        }
    }

    pub fn render(&self, strip: Rect, buf: &mut Buffer, style: Style) {
        if strip.is_empty() || self.total == 0 || self.visible >= self.total {
            return;
        }

        let track = strip.height as usize;
        let thumb = (self.visible * track / self.total).max(1);
        let max_offset = self.total - self.visible;
        let top = self.offset.min(max_offset) * (track - thumb) / max_offset;

        for i in 0..track {
            let ch = if i >= top && i < top + thumb { '█' } else { '│' };
            buf.put_char(strip.x, strip.y + i as u16, ch, style);
        }
    }
}
