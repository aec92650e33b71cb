use crate::config::Theme;
use crate::tui::{Buffer, Color, Rect, Style};
use crate::widgets::Block;

const DIALOG_WIDTH: u16 = 56;

fn frame(buf: &mut Buffer, theme: &Theme, title: &str, accent: Color, height: u16) -> Rect {
    let area = buf.area.centered(DIALOG_WIDTH.min(buf.area.width.saturating_sub(4)), height);
    buf.fill(area, Style::new().bg(theme.background));
    let block = Block::new()
        .title(title)
        .border_style(Style::new().fg(accent))
        .title_style(Style::new().fg(accent).bold());
    let inner = block.inner(area);
    block.render(area, buf);
    inner
}

/// One-line text entry with a block cursor after the typed value.
pub fn input(buf: &mut Buffer, theme: &Theme, title: &str, label: &str, value: &str) {
    let inner = frame(buf, theme, title, theme.border, 5);
    if inner.is_empty() {
        return;
    }
    buf.put_str_clipped(
        inner.x + 1,
        inner.y,
        label,
        inner.width.saturating_sub(2),
        Style::new().fg(theme.dim).bg(theme.background),
    );

    let field_y = inner.y + 1;
    let field = format!("{}█", value);
    buf.put_str_clipped(
        inner.x + 1,
        field_y,
        &field,
        inner.width.saturating_sub(2),
        Style::new().fg(theme.foreground).bg(theme.background),
    );
    buf.put_str(
        inner.x + 1,
        inner.y + 2,
        "enter confirm   esc cancel",
        Style::new().fg(theme.dim).bg(theme.background),
    );
}

/// Yes/no question. `danger` switches the border to the error color for
/// destructive confirmations.
pub fn confirm(buf: &mut Buffer, theme: &Theme, title: &str, lines: &[String], danger: bool) {
    let accent = if danger { theme.error } else { theme.warning };
    let inner = frame(buf, theme, title, accent, lines.len() as u16 + 4);
    if inner.is_empty() {
        return;
    }
    for (i, line) in lines.iter().enumerate() {
        buf.put_str_clipped(
            inner.x + 1,
            inner.y + i as u16,
            line,
            inner.width.saturating_sub(2),
            Style::new().fg(theme.foreground).bg(theme.background),
        );
    }
    buf.put_str(
        inner.x + 1,
        inner.y + lines.len() as u16 + 1,
        "y confirm   n / esc cancel",
        Style::new().fg(theme.dim).bg(theme.background),
    );
}

/// Modal message; any key dismisses it.
pub fn notice(buf: &mut Buffer, theme: &Theme, title: &str, message: &str, accent: Color) {
    // Wrap the message to the dialog width by whole words.
    let width = DIALOG_WIDTH.saturating_sub(4) as usize;
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in message.split_whitespace() {
        if !current.is_empty() && current.len() + word.len() + 1 > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }

    let inner = frame(buf, theme, title, accent, lines.len() as u16 + 4);
    if inner.is_empty() {
        return;
    }
    for (i, line) in lines.iter().enumerate() {
        buf.put_str_clipped(
            inner.x + 1,
            inner.y + i as u16,
            line,
            inner.width.saturating_sub(2),
            Style::new().fg(theme.foreground).bg(theme.background),
        );
    }
    buf.put_str(
        inner.x + 1,
        inner.y + lines.len() as u16 + 1,
        "press any key",
        Style::new().fg(theme.dim).bg(theme.background),
    );
}
