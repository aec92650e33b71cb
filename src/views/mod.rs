mod branches;
mod dialog;
mod help;

pub use branches::BranchListView;

use crate::config::Theme;
use crate::git::Gateway;
use crate::session::{Mode, Session, StashPrompt};
use crate::tui::{Buffer, Rect, Style};

/// Compose one frame: the branch table, the two status rows and, when a
/// dialog mode is active, its overlay on top.
pub fn draw<G>(session: &Session<G>, list: &mut BranchListView, theme: &Theme, buf: &mut Buffer)
where
    G: Gateway + Clone + Send + 'static,
{
    let (main, status) = buf.area.split_bottom(2);
    list.render(session, theme, main, buf);
    draw_status(session, theme, status, buf);

    match session.mode() {
        Mode::Normal | Mode::FetchInProgress => {}
        Mode::SearchInput => {
            dialog::input(buf, theme, " search ", "name contains:", session.input());
        }
        Mode::PrefixInput => {
            dialog::input(buf, theme, " prefix filter ", "name starts with:", session.input());
        }
        Mode::NewBranchInput => {
            dialog::input(buf, theme, " new branch ", "created from HEAD:", session.input());
        }
        Mode::RenameInput { from } => {
            let label = format!("rename {} to:", from);
            dialog::input(buf, theme, " rename ", &label, session.input());
        }
        Mode::ConfirmDelete { branch, force } => {
            let lines = if *force {
                vec![
                    format!("{} is not fully merged.", branch),
                    "Force delete and lose its commits?".to_string(),
                ]
            } else {
                vec![format!("Delete {}?", branch)]
            };
            dialog::confirm(buf, theme, " delete ", &lines, *force);
        }
        Mode::ConfirmDeleteProtected { branch } => {
            let label = format!("{} is protected. Type its name to delete:", branch);
            dialog::input(buf, theme, " delete protected ", &label, session.input());
        }
        Mode::StashPrompt(StashPrompt::SaveBeforeCheckout { target }) => {
            let lines = vec![
                "You have uncommitted changes.".to_string(),
                format!("Stash them before switching to {}?", target.short_name()),
            ];
            dialog::confirm(buf, theme, " stash ", &lines, false);
        }
        Mode::StashPrompt(StashPrompt::RestoreAfterCheckout { record }) => {
            let lines = vec![format!("Restore the stash saved on {}?", record.branch)];
            dialog::confirm(buf, theme, " restore stash ", &lines, false);
        }
        Mode::Help => help::render(buf, theme),
        Mode::ErrorBanner { message } => {
            dialog::notice(buf, theme, " error ", message, theme.error);
        }
    }
}

fn draw_status<G>(session: &Session<G>, theme: &Theme, area: Rect, buf: &mut Buffer)
where
    G: Gateway + Clone + Send + 'static,
{
    if area.height < 2 {
        return;
    }

    // First row: active filters on the left, stash count on the right.
    let filters = session.filter().describe();
    if !filters.is_empty() {
        let line = format!(" filters: {}", filters);
        buf.put_str(area.x, area.y, &line, Style::new().fg(theme.warning));
    }
    let stashes = session.tracked_stash_count();
    if stashes > 0 {
        let tag = format!("stashes: {} ", stashes);
        let x = area.right().saturating_sub(tag.len() as u16);
        buf.put_str(x, area.y, &tag, Style::new().fg(theme.modified));
    }

    // Second row: spinner while fetching, else banner, else key hints.
    let y = area.y + 1;
    if let Some((frame, secs)) = session.spinner() {
        let line = format!(" {} fetching ({}s)", frame, secs);
        buf.put_str(area.x, y, &line, Style::new().fg(theme.warning));
    } else if let Some(banner) = session.banner() {
        let line = format!(" {}", banner);
        buf.put_str(area.x, y, &line, Style::new().fg(theme.warning));
    } else {
        let hints = " enter checkout  d delete  n new  / search  f fetch  ? help  q quit";
        buf.put_str(area.x, y, hints, Style::new().fg(theme.dim));
    }
}
