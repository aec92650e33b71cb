use crate::config::Theme;
use crate::tui::{Buffer, Style};
use crate::widgets::Block;

const BINDINGS: &[(&str, &str)] = &[
    ("j/k ↑/↓", "move"),
    ("enter", "checkout (stash prompts as needed)"),
    ("n", "new branch from HEAD"),
    ("d", "delete branch"),
    ("R", "rename branch"),
    ("s", "restore tracked stash"),
    ("/", "search by substring"),
    ("p", "filter by prefix"),
    ("a", "toggle my-branches filter"),
    ("m", "toggle hide-merged"),
    ("o", "cycle age filter (7d/30d/90d)"),
    ("c", "clear all filters"),
    ("t", "toggle remote branches"),
    ("f", "fetch and prune (background)"),
    ("r", "refresh"),
    ("b", "open branch in browser"),
    ("T", "toggle theme"),
    ("q/esc", "quit"),
];

pub fn render(buf: &mut Buffer, theme: &Theme) {
    let height = BINDINGS.len() as u16 + 4;
    let area = buf.area.centered(46.min(buf.area.width), height.min(buf.area.height));
    buf.fill(area, Style::new().bg(theme.background));

    let block = Block::new()
        .title(" keys ")
        .border_style(Style::new().fg(theme.border))
        .title_style(Style::new().fg(theme.foreground).bold());
    let inner = block.inner(area);
    block.render(area, buf);

    for (i, (key, action)) in BINDINGS.iter().enumerate() {
        let y = inner.y + 1 + i as u16;
        if y >= inner.bottom() {
            break;
        }
        buf.put_str(
            inner.x + 2,
            y,
            key,
            Style::new().fg(theme.branch_local).bg(theme.background),
        );
        buf.put_str_clipped(
            inner.x + 12,
            y,
            action,
            inner.width.saturating_sub(13),
            Style::new().fg(theme.foreground).bg(theme.background),
        );
    }
}
