use crate::config::Theme;
use crate::git::{Branch, Gateway};
use crate::session::Session;
use crate::tui::{Buffer, Rect, Style};
use crate::widgets::{Block, Scrollbar};

/// The branch table. Holds only the scroll offset; everything else is
/// read from the session each frame.
pub struct BranchListView {
    offset: usize,
}

impl BranchListView {
    pub fn new() -> Self {
        Self { offset: 0 }
    }

    pub fn render<G>(&mut self, session: &Session<G>, theme: &Theme, area: Rect, buf: &mut Buffer)
    where
        G: Gateway + Clone + Send + 'static,
    {
        let title = format!(
            " branches ({}){} ",
            session.visible().len(),
            if session.show_remotes() { " +remotes" } else { "" },
        );
        let block = Block::new()
            .title(&title)
            .border_style(Style::new().fg(theme.border))
            .title_style(Style::new().fg(theme.foreground).bold());
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.is_empty() {
            return;
        }

        let height = inner.height as usize;
        let cursor = session.cursor();
        if cursor < self.offset {
            self.offset = cursor;
        } else if cursor >= self.offset + height {
            self.offset = cursor - height + 1;
        }

        let branches = session.visible();
        if branches.is_empty() {
            buf.put_str(
                inner.x + 1,
                inner.y,
                "no branches match the active filters",
                Style::new().fg(theme.dim),
            );
            return;
        }

        let now = chrono::Utc::now().timestamp();
        let row_width = inner.width.saturating_sub(1);

        for (i, branch) in branches.iter().skip(self.offset).take(height).enumerate() {
            let y = inner.y + i as u16;
            let selected = self.offset + i == cursor;
            self.render_row(session, branch, theme, buf, inner.x, y, row_width, selected, now);
        }

        let strip = Rect::new(inner.x + inner.width - 1, inner.y, 1, inner.height);
        Scrollbar::new(branches.len(), height, self.offset).render(
            strip,
            buf,
            Style::new().fg(theme.border),
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn render_row<G>(
        &self,
        session: &Session<G>,
        branch: &Branch,
        theme: &Theme,
        buf: &mut Buffer,
        x: u16,
        y: u16,
        width: u16,
        selected: bool,
        now: i64,
    ) where
        G: Gateway + Clone + Send + 'static,
    {
        let row = Rect::new(x, y, width, 1);
        if selected {
            buf.fill(row, Style::new().bg(theme.selection));
        }
        let with_bg = |s: Style| if selected { s.bg(theme.selection) } else { s };
        // Neutral text swaps to the selection foreground on the cursor row
        // so it stays readable against the highlight; semantic colors
        // (branch kind, modified) keep theirs.
        let text = if selected { theme.selection_text } else { theme.foreground };
        let muted = if selected { theme.selection_text } else { theme.dim };

        let name_color = if branch.is_current {
            theme.branch_current
        } else if branch.is_remote {
            theme.branch_remote
        } else if branch.is_merged {
            theme.merged
        } else {
            theme.branch_local
        };

        let marker = if branch.is_current { '*' } else { ' ' };
        buf.put_char(x, y, marker, with_bg(Style::new().fg(theme.branch_current)));

        let mut col = x + 2;
        let end = x + width;

        let name_style = with_bg(Style::new().fg(name_color));
        buf.put_str_clipped(col, y, &branch.name, end.saturating_sub(col), name_style);
        col += display_width(&branch.name).min(end.saturating_sub(col));

        let dirty = branch.has_uncommitted
            || session.worktree_dirty_for(branch).unwrap_or(false);
        if dirty && col + 11 <= end {
            buf.put_str(col, y, " [modified]", with_bg(Style::new().fg(theme.modified)));
            col += 11;
        }
        if branch.worktree.is_some() && col + 11 <= end {
            buf.put_str(col, y, " [worktree]", with_bg(Style::new().fg(muted)));
            col += 11;
        }
        if branch.has_upstream && col + 2 <= end {
            buf.put_str(col, y, " ⇡", with_bg(Style::new().fg(muted)));
            col += 2;
        }

        // Right column: relative age, then the short hash.
        let age = relative_date(now, branch.commit_date);
        let tail = format!("{} {:>4}", branch.commit_hash, age);
        let tail_width = display_width(&tail);
        let tail_x = end.saturating_sub(tail_width + 1);
        if tail_x > col {
            buf.put_str(tail_x, y, &tail, with_bg(Style::new().fg(muted)));

            // Subject fills whatever is left in between.
            let subject_x = col + 2;
            if subject_x + 2 < tail_x {
                buf.put_str_clipped(
                    subject_x,
                    y,
                    &branch.commit_subject,
                    tail_x - subject_x - 1,
                    with_bg(Style::new().fg(text).dim()),
                );
            }
        }
    }
}

fn display_width(s: &str) -> u16 {
    s.chars().map(|c| crate::tui::char_width(c) as u16).sum()
}

/// Compact age of a commit: "now", "5m", "3h", "12d", "4mo", "2y".
pub fn relative_date(now: i64, then: i64) -> String {
    let delta = (now - then).max(0);
    match delta {
        0..=59 => "now".to_string(),
        60..=3_599 => format!("{}m", delta / 60),
        3_600..=86_399 => format!("{}h", delta / 3_600),
        86_400..=2_591_999 => format!("{}d", delta / 86_400),
        2_592_000..=31_535_999 => format!("{}mo", delta / 2_592_000),
        _ => format!("{}y", delta / 31_536_000),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::git::test_support::ScriptedGateway;
    use crate::git::LISTING_FORMAT;
    use crate::tui::Color;

    fn row(head: &str, refname: &str, date: &str, subject: &str) -> String {
        [head, refname, date, "abc1234", subject, "<dev@example.com>"].join("\u{1f}")
    }

    #[test]
    fn cursor_row_text_switches_to_the_selection_foreground() {
        let g = ScriptedGateway::new();
        let format = format!("--format={}", LISTING_FORMAT);
        let rows = [
            row("*", "refs/heads/main", "100", "initial work"),
            row(" ", "refs/heads/feature/x", "90", "more work"),
        ];
        g.respond(&["for-each-ref", format.as_str()], &rows.join("\n"));
        let session = Session::new(g, Config::default());

        // A sentinel selection foreground distinct from every other color.
        let mut theme = Theme::dark();
        theme.selection_text = Color::rgb(1, 2, 3);

        let area = Rect::new(0, 0, 60, 8);
        let mut buf = Buffer::empty(area);
        BranchListView::new().render(&session, &theme, area, &mut buf);

        let has_marked =
            |y: u16| (1..59).any(|x| buf.get(x, y).style.fg == Some(theme.selection_text));
        assert!(has_marked(1), "cursor row text takes the selection foreground");
        assert!(!has_marked(2), "other rows keep the normal palette");
    }

    #[test]
    fn relative_dates_step_through_the_units() {
        let now = 1_700_000_000;
        assert_eq!(relative_date(now, now - 30), "now");
        assert_eq!(relative_date(now, now - 300), "5m");
        assert_eq!(relative_date(now, now - 7_200), "2h");
        assert_eq!(relative_date(now, now - 86_400 * 12), "12d");
        assert_eq!(relative_date(now, now - 2_592_000 * 4), "4mo");
        assert_eq!(relative_date(now, now - 31_536_000 * 2), "2y");
    }

    #[test]
    fn future_timestamps_clamp_to_now() {
        assert_eq!(relative_date(100, 500), "now");
    }
}
