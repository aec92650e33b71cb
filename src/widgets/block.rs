use crate::tui::{Buffer, Rect, Style};

/// Rounded border box with an optional title in the top edge. Every
/// surface in the app sits inside one of these.
#[derive(Debug, Clone, Copy, Default)]
pub struct Block<'a> {
    title: Option<&'a str>,
    border_style: Style,
    title_style: Style,
}

impl<'a> Block<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = Some(title);
        self
    }

    pub fn border_style(mut self, style: Style) -> Self {
        self.border_style = style;
        self
    }

    pub fn title_style(mut self, style: Style) -> Self {
        self.title_style = style;
        self
    }

    /// The drawable area left inside the border.
    pub fn inner(&self, area: Rect) -> Rect {
        area.inner(1)
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        if area.width < 2 || area.height < 2 {
            return;
        }
        let right = area.x + area.width - 1;
        let bottom = area.y + area.height - 1;

        for x in area.x + 1..right {
            buf.put_char(x, area.y, '─', self.border_style);
            buf.put_char(x, bottom, '─', self.border_style);
        }
        for y in area.y + 1..bottom {
            buf.put_char(area.x, y, '│', self.border_style);
            buf.put_char(right, y, '│', self.border_style);
        }
        buf.put_char(area.x, area.y, '╭', self.border_style);
        buf.put_char(right, area.y, '╮', self.border_style);
        buf.put_char(area.x, bottom, '╰', self.border_style);
        buf.put_char(right, bottom, '╯', self.border_style);

        if let Some(title) = self.title {
            if area.width > 4 {
                buf.put_str_clipped(
                    area.x + 2,
                    area.y,
                    title,
                    area.width - 4,
                    self.title_style,
                );
            }
        }
    }
}
