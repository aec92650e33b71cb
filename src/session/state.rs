use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use super::background::{FetchHandle, FetchOutcome};
use super::filter::{self, FilterContext, FilterState};
use crate::config::Config;
use crate::git::{
    ops, platform, Branch, BranchAggregator, CheckoutDecision, CollectReport, Gateway,
    PopOutcome, StashRecord, StashTracker,
};
use crate::input::{KeyCode, KeyEvent, Modifiers};

/// What a pending `StashPrompt` is asking about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StashPrompt {
    /// The working tree is dirty; stash before checking out `target`?
    SaveBeforeCheckout { target: Branch },
    /// A tracked stash exists for the branch just checked out; pop it?
    RestoreAfterCheckout { record: StashRecord },
}

/// Modal UI state. `Normal` is the initial mode and the mode every dialog
/// returns to; quitting is only accepted from `Normal` (and during a
/// fetch, where navigation stays live).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Normal,
    SearchInput,
    PrefixInput,
    RenameInput { from: String },
    NewBranchInput,
    ConfirmDelete { branch: String, force: bool },
    /// Protected deletion: the user must type the branch name back.
    ConfirmDeleteProtected { branch: String },
    StashPrompt(StashPrompt),
    Help,
    FetchInProgress,
    ErrorBanner { message: String },
}

/// The interactive session: owns the branch snapshot, the filter, the
/// stash tracker and the modal state machine. All mutation funnels
/// through `handle_key` and `poll` on the control thread.
pub struct Session<G: Gateway + Clone + Send + 'static> {
    gateway: G,
    config: Config,
    mode: Mode,
    branches: Vec<Branch>,
    visible: Vec<Branch>,
    filter: FilterState,
    cursor: usize,
    input: String,
    banner: Option<String>,
    stashes: StashTracker,
    show_remotes: bool,
    user_email: Option<String>,
    fetch: Option<FetchHandle>,
    worktree_dirty: HashMap<PathBuf, bool>,
    should_quit: bool,
}

impl<G: Gateway + Clone + Send + 'static> Session<G> {
    pub fn new(gateway: G, config: Config) -> Self {
        let user_email = ops::user_email(&gateway);
        let mut session = Self {
            gateway,
            config,
            mode: Mode::Normal,
            branches: Vec::new(),
            visible: Vec::new(),
            filter: FilterState::default(),
            cursor: 0,
            input: String::new(),
            banner: None,
            stashes: StashTracker::new(),
            show_remotes: false,
            user_email,
            fetch: None,
            worktree_dirty: HashMap::new(),
            should_quit: false,
        };
        session.refresh();
        session.select_current();
        session
    }

    // --- read-only projection for the renderer ---

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn visible(&self) -> &[Branch] {
        &self.visible
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected(&self) -> Option<&Branch> {
        self.visible.get(self.cursor)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn show_remotes(&self) -> bool {
        self.show_remotes
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn spinner(&self) -> Option<(&'static str, u64)> {
        self.fetch
            .as_ref()
            .map(|f| (f.spinner_char(), f.elapsed_secs()))
    }

    /// Lazily resolved dirty state for a worktree branch row.
    pub fn worktree_dirty_for(&self, branch: &Branch) -> Option<bool> {
        let path = branch.worktree.as_ref()?;
        self.worktree_dirty.get(path).copied()
    }

    pub fn tracked_stash_count(&self) -> usize {
        self.stashes.open_count()
    }

    // --- refresh & filtering ---

    /// Synchronous re-collect of the whole snapshot.
    pub fn refresh(&mut self) {
        let aggregator = BranchAggregator::new(&self.gateway);
        let (branches, report) = aggregator.collect(
            &self.config.default_base_branch,
            self.show_remotes,
        );
        self.install_snapshot(branches, report);
    }

    fn install_snapshot(&mut self, branches: Vec<Branch>, report: CollectReport) {
        let selected_name = self.selected().map(|b| b.name.clone());
        self.branches = branches;
        self.worktree_dirty.clear();
        self.apply_filter();
        self.restore_cursor(selected_name);
        if let Some(summary) = report.summary() {
            self.banner = Some(summary);
        }
    }

    fn apply_filter(&mut self) {
        let protected = self.config.protected_names();
        let ctx = FilterContext {
            protected: &protected,
            now: chrono::Utc::now().timestamp(),
        };
        self.visible = filter::apply(&self.branches, &self.filter, &ctx);
        if self.cursor >= self.visible.len() {
            self.cursor = self.visible.len().saturating_sub(1);
        }
    }

    fn restore_cursor(&mut self, name: Option<String>) {
        if let Some(name) = name {
            if let Some(idx) = self.visible.iter().position(|b| b.name == name) {
                self.cursor = idx;
                return;
            }
        }
        if self.cursor >= self.visible.len() {
            self.cursor = self.visible.len().saturating_sub(1);
        }
    }

    fn select_current(&mut self) {
        if let Some(idx) = self.visible.iter().position(|b| b.is_current) {
            self.cursor = idx;
        }
    }

    fn current_branch(&self) -> Option<&Branch> {
        self.branches.iter().find(|b| b.is_current)
    }

    // --- background fetch ---

    /// Called every tick by the control loop: animates the spinner and
    /// applies the worker's result as one atomic transition.
    pub fn poll(&mut self) {
        let Some(handle) = self.fetch.as_mut() else {
            return;
        };
        handle.tick();

        if let Some(outcome) = handle.try_take() {
            self.fetch = None;
            match outcome {
                FetchOutcome::Completed { branches, report } => {
                    self.banner = None;
                    self.install_snapshot(branches, report);
                    if self.banner.is_none() {
                        self.banner = Some("fetch complete".to_string());
                    }
                    self.mode = Mode::Normal;
                }
                FetchOutcome::Failed(message) => {
                    self.mode = Mode::ErrorBanner { message };
                }
            }
        }
    }

    fn request_fetch(&mut self) {
        if self.fetch.is_some() {
            self.banner = Some("a fetch is already running".to_string());
            return;
        }
        self.banner = None;
        self.fetch = Some(FetchHandle::spawn(
            &self.gateway,
            self.config.default_base_branch.clone(),
            self.show_remotes,
        ));
        self.mode = Mode::FetchInProgress;
    }

    // --- key dispatch ---

    pub fn handle_key(&mut self, key: KeyEvent) {
        // Ctrl+C ends the session from any mode; with ISIG disabled it
        // arrives as an ordinary key.
        if key.modifiers.contains(Modifiers::CTRL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.mode.clone() {
            Mode::Normal => self.handle_normal(key),
            Mode::FetchInProgress => self.handle_fetching(key),
            Mode::SearchInput => self.handle_text_input(key, Submit::Search),
            Mode::PrefixInput => self.handle_text_input(key, Submit::Prefix),
            Mode::NewBranchInput => self.handle_text_input(key, Submit::NewBranch),
            Mode::RenameInput { from } => self.handle_text_input(key, Submit::Rename(from)),
            Mode::ConfirmDeleteProtected { branch } => {
                self.handle_text_input(key, Submit::ProtectedDelete(branch))
            }
            Mode::ConfirmDelete { branch, force } => self.handle_confirm_delete(key, branch, force),
            Mode::StashPrompt(prompt) => self.handle_stash_prompt(key, prompt),
            Mode::Help | Mode::ErrorBanner { .. } => {
                // Any key dismisses.
                self.mode = Mode::Normal;
            }
        }
    }

    fn handle_normal(&mut self, key: KeyEvent) {
        self.banner = None;
        match key.code {
            KeyCode::Char('q') | KeyCode::Escape => self.should_quit = true,

            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),
            KeyCode::Home => self.move_to(0),
            KeyCode::End => self.move_to(self.visible.len().saturating_sub(1)),

            KeyCode::Enter => self.request_checkout(),
            KeyCode::Char('d') => self.request_delete(),
            KeyCode::Char('n') => self.enter_input(Mode::NewBranchInput, ""),
            KeyCode::Char('R') => self.request_rename(),

            KeyCode::Char('/') => self.enter_input(Mode::SearchInput, ""),
            KeyCode::Char('p') => self.enter_input(Mode::PrefixInput, ""),
            KeyCode::Char('a') => self.toggle_author_filter(),
            KeyCode::Char('m') => {
                self.filter.hide_merged = !self.filter.hide_merged;
                self.apply_filter();
            }
            KeyCode::Char('o') => self.cycle_age_filter(),
            KeyCode::Char('c') => self.clear_filters(),

            KeyCode::Char('t') => {
                self.show_remotes = !self.show_remotes;
                self.refresh();
            }
            KeyCode::Char('r') => {
                self.refresh();
                if self.banner.is_none() {
                    self.banner = Some("refreshed".to_string());
                }
            }
            KeyCode::Char('f') => self.request_fetch(),
            KeyCode::Char('s') => self.request_restore(),
            KeyCode::Char('b') => self.open_in_browser(),
            KeyCode::Char('T') => self.config.toggle_theme(),
            KeyCode::Char('?') => self.mode = Mode::Help,

            _ => {}
        }
    }

    /// During a fetch only navigation and quit are live; every mutating
    /// action is rejected, not queued.
    fn handle_fetching(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Escape => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),
            KeyCode::Home => self.move_to(0),
            KeyCode::End => self.move_to(self.visible.len().saturating_sub(1)),
            _ => {
                self.banner = Some("unavailable while fetching".to_string());
            }
        }
    }

    fn handle_confirm_delete(&mut self, key: KeyEvent, branch: String, force: bool) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => self.execute_delete(&branch, force),
            _ => self.cancel_dialog(),
        }
    }

    fn handle_stash_prompt(&mut self, key: KeyEvent, prompt: StashPrompt) {
        match (key.code, prompt) {
            (KeyCode::Char('y') | KeyCode::Char('Y'), StashPrompt::SaveBeforeCheckout { target }) => {
                self.stash_then_checkout(target);
            }
            (KeyCode::Char('n') | KeyCode::Char('N'), StashPrompt::SaveBeforeCheckout { target }) => {
                // Proceed with the uncommitted changes in tow.
                self.perform_checkout(&target);
            }
            (KeyCode::Char('y') | KeyCode::Char('Y'), StashPrompt::RestoreAfterCheckout { record }) => {
                self.pop_record(record);
            }
            (KeyCode::Char('n') | KeyCode::Char('N'), StashPrompt::RestoreAfterCheckout { .. }) => {
                // Keep the record; the user can restore later with `s`.
                self.mode = Mode::Normal;
            }
            _ => self.cancel_dialog(),
        }
    }

    fn cancel_dialog(&mut self) {
        self.input.clear();
        self.mode = Mode::Normal;
    }

    fn enter_input(&mut self, mode: Mode, prefill: &str) {
        self.input.clear();
        self.input.push_str(prefill);
        self.mode = mode;
    }

    fn handle_text_input(&mut self, key: KeyEvent, submit: Submit) {
        match key.code {
            KeyCode::Escape => self.cancel_dialog(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => self.input.push(c),
            KeyCode::Enter => {
                let text = std::mem::take(&mut self.input);
                self.mode = Mode::Normal;
                self.submit_input(submit, text.trim());
            }
            _ => {}
        }
    }

    fn submit_input(&mut self, submit: Submit, text: &str) {
        match submit {
            Submit::Search => {
                self.filter.search = if text.is_empty() {
                    None
                } else {
                    Some(text.to_string())
                };
                self.apply_filter();
            }
            Submit::Prefix => {
                self.filter.prefix = if text.is_empty() {
                    None
                } else {
                    Some(text.to_string())
                };
                self.apply_filter();
            }
            Submit::NewBranch => {
                if text.is_empty() {
                    return;
                }
                match ops::create_branch(&self.gateway, text) {
                    Ok(()) => {
                        self.refresh();
                        self.select_current();
                        self.banner = Some(format!("created {}", text));
                    }
                    Err(message) => self.mode = Mode::ErrorBanner { message },
                }
            }
            Submit::Rename(from) => {
                if text.is_empty() || text == from {
                    return;
                }
                match ops::rename_branch(&self.gateway, &from, text) {
                    Ok(()) => {
                        self.refresh();
                        self.banner = Some(format!("renamed {} to {}", from, text));
                    }
                    Err(message) => self.mode = Mode::ErrorBanner { message },
                }
            }
            Submit::ProtectedDelete(branch) => {
                if text == branch {
                    self.execute_delete(&branch, false);
                } else {
                    self.banner = Some("confirmation did not match, delete aborted".to_string());
                }
            }
        }
    }

    // --- filters ---

    fn toggle_author_filter(&mut self) {
        if self.filter.author.is_some() {
            self.filter.author = None;
        } else {
            match &self.user_email {
                Some(email) => self.filter.author = Some(email.clone()),
                None => {
                    self.banner = Some("user.email is not configured".to_string());
                    return;
                }
            }
        }
        self.apply_filter();
    }

    fn cycle_age_filter(&mut self) {
        const DAY: u64 = 86_400;
        self.filter.hide_older_than = match self.filter.hide_older_than.map(|d| d.as_secs()) {
            None => Some(Duration::from_secs(7 * DAY)),
            Some(s) if s == 7 * DAY => Some(Duration::from_secs(30 * DAY)),
            Some(s) if s == 30 * DAY => Some(Duration::from_secs(90 * DAY)),
            Some(_) => None,
        };
        self.apply_filter();
    }

    fn clear_filters(&mut self) {
        if self.filter.is_empty() {
            return;
        }
        self.filter.clear();
        self.apply_filter();
        self.banner = Some("filters cleared".to_string());
    }

    // --- navigation ---

    fn move_down(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        self.cursor = if self.cursor + 1 < len { self.cursor + 1 } else { 0 };
        self.probe_worktree_status();
    }

    fn move_up(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        self.cursor = if self.cursor > 0 { self.cursor - 1 } else { len - 1 };
        self.probe_worktree_status();
    }

    fn move_to(&mut self, idx: usize) {
        if idx < self.visible.len() {
            self.cursor = idx;
            self.probe_worktree_status();
        }
    }

    /// On-demand dirty check when the cursor lands on a worktree row;
    /// cached until the next refresh so a batch refresh never pays for
    /// every worktree up front.
    fn probe_worktree_status(&mut self) {
        let Some(path) = self.selected().and_then(|b| b.worktree.clone()) else {
            return;
        };
        if self.worktree_dirty.contains_key(&path) {
            return;
        }
        let aggregator = BranchAggregator::new(&self.gateway);
        if let Some(dirty) = aggregator.worktree_dirty(&path) {
            self.worktree_dirty.insert(path, dirty);
        }
    }

    // --- checkout ---

    fn request_checkout(&mut self) {
        let Some(branch) = self.selected().cloned() else {
            return;
        };
        if branch.is_current {
            self.banner = Some(format!("already on {}", branch.name));
            return;
        }
        // A branch live in another worktree can never be checked out
        // here; no override exists.
        if let Some(path) = &branch.worktree {
            self.banner = Some(format!(
                "{} is checked out in {}",
                branch.name,
                path.display()
            ));
            return;
        }

        let dirty = self
            .current_branch()
            .map(|b| b.has_uncommitted)
            .unwrap_or(false);

        match self
            .stashes
            .on_checkout_requested(branch.short_name(), dirty)
        {
            CheckoutDecision::PromptToStash => {
                self.mode = Mode::StashPrompt(StashPrompt::SaveBeforeCheckout { target: branch });
            }
            CheckoutDecision::ProceedNoStash
            | CheckoutDecision::AutoRestoreAvailable(_) => self.perform_checkout(&branch),
        }
    }

    fn stash_then_checkout(&mut self, target: Branch) {
        let Some(source) = self.current_branch().map(|b| b.name.clone()) else {
            self.perform_checkout(&target);
            return;
        };
        match self.stashes.stash_current(&self.gateway, &source) {
            Ok(_) => self.perform_checkout(&target),
            Err(message) => self.mode = Mode::ErrorBanner { message },
        }
    }

    fn perform_checkout(&mut self, branch: &Branch) {
        let result = if branch.is_remote {
            ops::checkout_tracking(&self.gateway, &branch.name, branch.short_name())
        } else {
            ops::checkout(&self.gateway, &branch.name)
        };

        match result {
            Ok(()) => {
                let target = branch.short_name().to_string();
                self.refresh();
                self.select_current();
                self.banner = Some(format!("switched to {}", target));
                match self.stashes.record_for(&target).cloned() {
                    Some(record) => {
                        self.mode =
                            Mode::StashPrompt(StashPrompt::RestoreAfterCheckout { record });
                    }
                    None => self.mode = Mode::Normal,
                }
            }
            Err(message) => {
                // Roll back to a consistent pre-attempt view and show
                // git's message verbatim.
                self.refresh();
                self.mode = Mode::ErrorBanner { message };
            }
        }
    }

    // --- stash restore ---

    fn request_restore(&mut self) {
        let Some(current) = self.current_branch().map(|b| b.name.clone()) else {
            return;
        };
        match self.stashes.record_for(&current).cloned() {
            Some(record) => {
                self.mode = Mode::StashPrompt(StashPrompt::RestoreAfterCheckout { record });
            }
            None => self.banner = Some(format!("no tracked stash for {}", current)),
        }
    }

    fn pop_record(&mut self, record: StashRecord) {
        match self.stashes.pop_tracked(&self.gateway, &record) {
            PopOutcome::Popped => {
                self.refresh();
                self.banner = Some(format!("restored stash for {}", record.branch));
                self.mode = Mode::Normal;
            }
            PopOutcome::Conflict(message) => {
                // Record stays tracked; the stash itself is untouched.
                self.mode = Mode::ErrorBanner { message };
            }
            PopOutcome::Missing => {
                self.banner = Some("stash is gone from the stash list".to_string());
                self.mode = Mode::Normal;
            }
        }
    }

    // --- delete / rename ---

    fn request_delete(&mut self) {
        let Some(branch) = self.selected().cloned() else {
            return;
        };
        if branch.is_remote {
            self.banner = Some("remote branches are pruned by fetch, not deleted here".to_string());
            return;
        }
        if branch.is_current {
            self.banner = Some("cannot delete the current branch".to_string());
            return;
        }
        if let Some(path) = &branch.worktree {
            self.banner = Some(format!(
                "{} is checked out in {}",
                branch.name,
                path.display()
            ));
            return;
        }

        if self.config.is_protected(&branch.name) {
            self.input.clear();
            self.mode = Mode::ConfirmDeleteProtected {
                branch: branch.name,
            };
        } else {
            self.mode = Mode::ConfirmDelete {
                branch: branch.name,
                force: false,
            };
        }
    }

    fn execute_delete(&mut self, branch: &str, force: bool) {
        match ops::delete_branch(&self.gateway, branch, force) {
            Ok(()) => {
                self.refresh();
                self.banner = Some(format!("deleted {}", branch));
                self.mode = Mode::Normal;
            }
            Err(message) if !force && ops::is_unmerged_delete_failure(&message) => {
                // Escalate to a second, explicit confirmation; never
                // force silently.
                self.mode = Mode::ConfirmDelete {
                    branch: branch.to_string(),
                    force: true,
                };
            }
            Err(message) => {
                self.mode = Mode::ErrorBanner { message };
            }
        }
    }

    fn request_rename(&mut self) {
        let Some(branch) = self.selected().cloned() else {
            return;
        };
        if branch.is_remote {
            self.banner = Some("only local branches can be renamed".to_string());
            return;
        }
        let from = branch.name.clone();
        self.enter_input(Mode::RenameInput { from: from.clone() }, &from);
    }

    // --- browser ---

    fn open_in_browser(&mut self) {
        let Some(branch) = self.selected().cloned() else {
            return;
        };
        if self.config.prevent_browser_for_merged && branch.is_merged {
            self.banner = Some(format!("{} is merged; browser disabled by config", branch.name));
            return;
        }
        let Some(remote) = ops::origin_url(&self.gateway) else {
            self.banner = Some("no origin remote configured".to_string());
            return;
        };
        match platform::branch_url(self.config.platform, &remote, branch.short_name()) {
            Some(url) => {
                let _ = platform::open_in_browser(&url);
                self.banner = Some(format!("opening {}", url));
            }
            None => self.banner = Some("could not determine hosting platform".to_string()),
        }
    }
}

enum Submit {
    Search,
    Prefix,
    NewBranch,
    Rename(String),
    ProtectedDelete(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::test_support::ScriptedGateway;
    use crate::git::LISTING_FORMAT;

    fn row(head: &str, refname: &str, date: i64, subject: &str, email: &str) -> String {
        [
            head,
            refname,
            &date.to_string(),
            "abc1234",
            subject,
            email,
        ]
        .join("\u{1f}")
    }

    fn script_listing(g: &ScriptedGateway, rows: &[String]) {
        let format = format!("--format={}", LISTING_FORMAT);
        g.respond(&["for-each-ref", format.as_str()], &rows.join("\n"));
    }

    /// main (current, newest), feature/x, feature/y, master (protected).
    fn basic_repo() -> ScriptedGateway {
        let g = ScriptedGateway::new();
        script_listing(
            &g,
            &[
                row("*", "refs/heads/main", 100, "init", "<dev@example.com>"),
                row(" ", "refs/heads/master", 95, "legacy", "<dev@example.com>"),
                row(" ", "refs/heads/feature/x", 90, "wip", "<dev@example.com>"),
                row(" ", "refs/heads/feature/y", 80, "old", "<other@example.com>"),
            ],
        );
        g
    }

    fn session(g: &ScriptedGateway) -> Session<ScriptedGateway> {
        Session::new(g.clone(), Config::default())
    }

    fn press(s: &mut Session<ScriptedGateway>, c: char) {
        s.handle_key(KeyEvent::char(c));
    }

    fn press_code(s: &mut Session<ScriptedGateway>, code: KeyCode) {
        s.handle_key(KeyEvent::plain(code));
    }

    fn type_text(s: &mut Session<ScriptedGateway>, text: &str) {
        for c in text.chars() {
            press(s, c);
        }
    }

    fn move_to_name(s: &mut Session<ScriptedGateway>, name: &str) {
        let idx = s
            .visible()
            .iter()
            .position(|b| b.name == name)
            .unwrap_or_else(|| panic!("{} not visible", name));
        while s.cursor() != idx {
            press(s, 'j');
        }
    }

    fn selected_name(s: &Session<ScriptedGateway>) -> &str {
        s.selected().map(|b| b.name.as_str()).unwrap()
    }

    #[test]
    fn initial_cursor_lands_on_current_branch() {
        let g = ScriptedGateway::new();
        script_listing(
            &g,
            &[
                row(" ", "refs/heads/feature/x", 200, "wip", "<d@e.com>"),
                row("*", "refs/heads/main", 100, "init", "<d@e.com>"),
            ],
        );
        let s = session(&g);
        assert_eq!(selected_name(&s), "main");
        assert_eq!(s.cursor(), 1);
    }

    #[test]
    fn navigation_wraps_both_ways() {
        let g = basic_repo();
        let mut s = session(&g);
        assert_eq!(s.cursor(), 0);

        press(&mut s, 'k');
        assert_eq!(s.cursor(), s.visible().len() - 1);
        press(&mut s, 'j');
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn quit_only_from_list_modes() {
        let g = basic_repo();
        let mut s = session(&g);

        press(&mut s, '/');
        press(&mut s, 'q');
        assert!(!s.should_quit());
        assert_eq!(s.input(), "q");
        press_code(&mut s, KeyCode::Escape);
        assert!(!s.should_quit());
        assert_eq!(s.mode(), &Mode::Normal);

        press(&mut s, 'q');
        assert!(s.should_quit());
    }

    #[test]
    fn checkout_refuses_branch_held_by_another_worktree() {
        let g = basic_repo();
        g.respond(
            &["worktree", "list", "--porcelain"],
            "worktree /repo\nbranch refs/heads/main\n\n\
             worktree /repo/wt\nbranch refs/heads/feature/x\n",
        );
        let mut s = session(&g);

        move_to_name(&mut s, "feature/x");
        press_code(&mut s, KeyCode::Enter);

        assert_eq!(s.mode(), &Mode::Normal);
        assert!(s.banner().unwrap().contains("checked out in"));
        assert!(!g.called_with(&["checkout", "feature/x"]));
    }

    #[test]
    fn checkout_of_current_branch_is_a_no_op() {
        let g = basic_repo();
        let mut s = session(&g);

        press_code(&mut s, KeyCode::Enter);
        assert!(s.banner().unwrap().contains("already on"));
        assert!(!g.called_with(&["checkout"]));
    }

    #[test]
    fn dirty_checkout_stashes_and_restores_on_return() {
        let g = basic_repo();
        g.respond(&["status", "--porcelain"], " M src/lib.rs\n");
        let mut s = session(&g);
        assert!(s.selected().unwrap().has_uncommitted);

        move_to_name(&mut s, "feature/x");
        press_code(&mut s, KeyCode::Enter);
        assert!(matches!(
            s.mode(),
            Mode::StashPrompt(StashPrompt::SaveBeforeCheckout { .. })
        ));

        // The post-checkout world: feature/x current, tree clean.
        script_listing(
            &g,
            &[
                row(" ", "refs/heads/main", 100, "init", "<dev@example.com>"),
                row(" ", "refs/heads/master", 95, "legacy", "<dev@example.com>"),
                row("*", "refs/heads/feature/x", 90, "wip", "<dev@example.com>"),
                row(" ", "refs/heads/feature/y", 80, "old", "<other@example.com>"),
            ],
        );
        g.respond(&["status", "--porcelain"], "");

        press(&mut s, 'y');
        assert!(g.called_with(&["stash", "push", "-m"]));
        assert!(g.called_with(&["checkout", "feature/x"]));
        assert_eq!(s.mode(), &Mode::Normal);
        assert_eq!(selected_name(&s), "feature/x");
        assert_eq!(s.tracked_stash_count(), 1);

        let message = g
            .calls()
            .into_iter()
            .find(|c| c.starts_with(&["stash".to_string(), "push".to_string()]))
            .map(|c| c[3].clone())
            .unwrap();

        // Going back to main offers the tracked stash.
        script_listing(
            &g,
            &[
                row("*", "refs/heads/main", 100, "init", "<dev@example.com>"),
                row(" ", "refs/heads/master", 95, "legacy", "<dev@example.com>"),
                row(" ", "refs/heads/feature/x", 90, "wip", "<dev@example.com>"),
                row(" ", "refs/heads/feature/y", 80, "old", "<other@example.com>"),
            ],
        );
        move_to_name(&mut s, "main");
        press_code(&mut s, KeyCode::Enter);
        assert!(g.called_with(&["checkout", "main"]));
        assert!(matches!(
            s.mode(),
            Mode::StashPrompt(StashPrompt::RestoreAfterCheckout { .. })
        ));

        g.respond(
            &["stash", "list"],
            &format!("stash@{{0}}\u{1f}On main: {}", message),
        );
        press(&mut s, 'y');
        assert!(g.called_with(&["stash", "pop", "stash@{0}"]));
        assert_eq!(s.mode(), &Mode::Normal);
        assert!(s.banner().unwrap().contains("restored stash"));
        assert_eq!(s.tracked_stash_count(), 0);
    }

    #[test]
    fn declining_the_stash_prompt_still_checks_out() {
        let g = basic_repo();
        g.respond(&["status", "--porcelain"], "?? new.txt\n");
        let mut s = session(&g);

        move_to_name(&mut s, "feature/x");
        press_code(&mut s, KeyCode::Enter);
        press(&mut s, 'n');

        assert!(!g.called_with(&["stash", "push"]));
        assert!(g.called_with(&["checkout", "feature/x"]));
        assert_eq!(s.tracked_stash_count(), 0);
    }

    #[test]
    fn escape_cancels_the_stash_prompt_entirely() {
        let g = basic_repo();
        g.respond(&["status", "--porcelain"], " M a\n");
        let mut s = session(&g);

        move_to_name(&mut s, "feature/x");
        press_code(&mut s, KeyCode::Enter);
        press_code(&mut s, KeyCode::Escape);

        assert_eq!(s.mode(), &Mode::Normal);
        assert!(!g.called_with(&["stash", "push"]));
        assert!(!g.called_with(&["checkout", "feature/x"]));
    }

    #[test]
    fn declined_restore_stays_available_via_explicit_restore() {
        let g = basic_repo();
        g.respond(&["status", "--porcelain"], " M a\n");
        let mut s = session(&g);

        move_to_name(&mut s, "feature/x");
        press_code(&mut s, KeyCode::Enter);
        g.respond(&["status", "--porcelain"], "");
        script_listing(
            &g,
            &[
                row(" ", "refs/heads/main", 100, "init", "<dev@example.com>"),
                row("*", "refs/heads/feature/x", 90, "wip", "<dev@example.com>"),
            ],
        );
        press(&mut s, 'y');

        // Back on main, decline the restore.
        script_listing(
            &g,
            &[
                row("*", "refs/heads/main", 100, "init", "<dev@example.com>"),
                row(" ", "refs/heads/feature/x", 90, "wip", "<dev@example.com>"),
            ],
        );
        move_to_name(&mut s, "main");
        press_code(&mut s, KeyCode::Enter);
        press(&mut s, 'n');
        assert_eq!(s.mode(), &Mode::Normal);
        assert_eq!(s.tracked_stash_count(), 1);
        assert!(!g.called_with(&["stash", "pop"]));

        // `s` brings the prompt back for the current branch.
        press(&mut s, 's');
        assert!(matches!(
            s.mode(),
            Mode::StashPrompt(StashPrompt::RestoreAfterCheckout { .. })
        ));
    }

    #[test]
    fn delete_rejects_current_remote_and_worktree_rows() {
        let g = basic_repo();
        g.respond(
            &["worktree", "list", "--porcelain"],
            "worktree /repo\nbranch refs/heads/main\n\n\
             worktree /repo/wt\nbranch refs/heads/feature/x\n",
        );
        let mut s = session(&g);

        press(&mut s, 'd');
        assert!(s.banner().unwrap().contains("current branch"));

        move_to_name(&mut s, "feature/x");
        press(&mut s, 'd');
        assert!(s.banner().unwrap().contains("checked out in"));
        assert_eq!(s.mode(), &Mode::Normal);
        assert!(!g.called_with(&["branch", "-d"]));
        assert!(!g.called_with(&["branch", "-D"]));
    }

    #[test]
    fn plain_delete_confirms_then_removes() {
        let g = basic_repo();
        let mut s = session(&g);

        move_to_name(&mut s, "feature/y");
        press(&mut s, 'd');
        assert_eq!(
            s.mode(),
            &Mode::ConfirmDelete {
                branch: "feature/y".to_string(),
                force: false,
            }
        );

        script_listing(
            &g,
            &[
                row("*", "refs/heads/main", 100, "init", "<dev@example.com>"),
                row(" ", "refs/heads/master", 95, "legacy", "<dev@example.com>"),
                row(" ", "refs/heads/feature/x", 90, "wip", "<dev@example.com>"),
            ],
        );
        press(&mut s, 'y');
        assert!(g.called_with(&["branch", "-d", "feature/y"]));
        assert_eq!(s.mode(), &Mode::Normal);
        assert!(s.visible().iter().all(|b| b.name != "feature/y"));
    }

    #[test]
    fn any_other_key_cancels_delete_confirmation() {
        let g = basic_repo();
        let mut s = session(&g);

        move_to_name(&mut s, "feature/y");
        press(&mut s, 'd');
        press(&mut s, 'x');
        assert_eq!(s.mode(), &Mode::Normal);
        assert!(!g.called_with(&["branch", "-d"]));
    }

    #[test]
    fn unmerged_delete_escalates_to_a_second_confirmation() {
        let g = basic_repo();
        g.fail(
            &["branch", "-d", "feature/y"],
            "error: the branch 'feature/y' is not fully merged",
        );
        let mut s = session(&g);

        move_to_name(&mut s, "feature/y");
        press(&mut s, 'd');
        press(&mut s, 'y');
        assert_eq!(
            s.mode(),
            &Mode::ConfirmDelete {
                branch: "feature/y".to_string(),
                force: true,
            }
        );
        assert!(!g.called_with(&["branch", "-D"]));

        press(&mut s, 'y');
        assert!(g.called_with(&["branch", "-D", "feature/y"]));
    }

    #[test]
    fn protected_delete_requires_typing_the_branch_name() {
        let g = basic_repo();
        let mut s = session(&g);

        move_to_name(&mut s, "master");
        press(&mut s, 'd');
        assert_eq!(
            s.mode(),
            &Mode::ConfirmDeleteProtected {
                branch: "master".to_string(),
            }
        );

        type_text(&mut s, "mast");
        press_code(&mut s, KeyCode::Enter);
        assert!(s.banner().unwrap().contains("did not match"));
        assert!(!g.called_with(&["branch", "-d", "master"]));

        move_to_name(&mut s, "master");
        press(&mut s, 'd');
        type_text(&mut s, "master");
        press_code(&mut s, KeyCode::Enter);
        assert!(g.called_with(&["branch", "-d", "master"]));
    }

    #[test]
    fn remote_checkout_creates_a_tracking_branch() {
        let g = ScriptedGateway::new();
        script_listing(
            &g,
            &[
                row("*", "refs/heads/main", 100, "init", "<d@e.com>"),
                row(" ", "refs/remotes/origin/feature/z", 70, "new", "<d@e.com>"),
            ],
        );
        g.fail(&["rev-parse", "--verify", "--quiet", "refs/heads/feature/z"], "");
        let mut s = session(&g);

        press(&mut s, 't');
        assert!(s.show_remotes());
        move_to_name(&mut s, "origin/feature/z");
        press_code(&mut s, KeyCode::Enter);

        assert!(g.called_with(&["checkout", "--track", "origin/feature/z"]));
    }

    #[test]
    fn remote_checkout_conflicting_with_local_name_fails_loudly() {
        let g = ScriptedGateway::new();
        script_listing(
            &g,
            &[
                row("*", "refs/heads/main", 100, "init", "<d@e.com>"),
                row(" ", "refs/heads/feature/z", 80, "local", "<d@e.com>"),
                row(" ", "refs/remotes/origin/feature/z", 70, "new", "<d@e.com>"),
            ],
        );
        g.respond(
            &["rev-parse", "--verify", "--quiet", "refs/heads/feature/z"],
            "abc1234\n",
        );
        let mut s = session(&g);

        press(&mut s, 't');
        move_to_name(&mut s, "origin/feature/z");
        press_code(&mut s, KeyCode::Enter);

        match s.mode() {
            Mode::ErrorBanner { message } => assert!(message.contains("already exists")),
            other => panic!("expected error banner, got {:?}", other),
        }
        assert!(!g.called_with(&["checkout", "--track"]));
    }

    #[test]
    fn fetch_blocks_mutations_but_not_navigation() {
        let g = basic_repo();
        let mut s = session(&g);

        press(&mut s, 'f');
        assert_eq!(s.mode(), &Mode::FetchInProgress);
        assert!(s.spinner().is_some());

        press(&mut s, 'd');
        assert!(s.banner().unwrap().contains("unavailable while fetching"));
        assert!(!g.called_with(&["branch", "-d"]));

        let before = s.cursor();
        press(&mut s, 'j');
        assert_ne!(s.cursor(), before);

        for _ in 0..200 {
            s.poll();
            if s.mode() != &Mode::FetchInProgress {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert_eq!(s.mode(), &Mode::Normal);
        assert!(g.called_with(&["fetch", "--all", "--prune"]));
        assert!(s.banner().unwrap().contains("fetch complete"));
    }

    #[test]
    fn search_filters_and_clear_restores_everything() {
        let g = basic_repo();
        let mut s = session(&g);

        press(&mut s, '/');
        type_text(&mut s, "FEATURE");
        press_code(&mut s, KeyCode::Enter);
        assert_eq!(s.visible().len(), 2);
        assert!(s.visible().iter().all(|b| b.name.starts_with("feature/")));

        press(&mut s, 'c');
        assert_eq!(s.visible().len(), 4);
        assert!(s.banner().unwrap().contains("cleared"));

        // Clearing again with nothing active is a quiet no-op.
        press(&mut s, 'c');
        assert!(s.banner().is_none());
    }

    #[test]
    fn author_toggle_needs_a_configured_email() {
        let g = basic_repo();
        let mut s = session(&g);
        press(&mut s, 'a');
        assert!(s.banner().unwrap().contains("user.email"));
        assert!(s.filter().author.is_none());

        let g = basic_repo();
        g.respond(&["config", "user.email"], "dev@example.com\n");
        let mut s = session(&g);
        press(&mut s, 'a');
        assert_eq!(s.visible().len(), 3);
        assert!(s.visible().iter().all(|b| b.name != "feature/y"));

        press(&mut s, 'a');
        assert_eq!(s.visible().len(), 4);
    }

    #[test]
    fn age_filter_cycles_through_windows_and_off() {
        let g = basic_repo();
        let mut s = session(&g);

        let days = |s: &Session<ScriptedGateway>| {
            s.filter().hide_older_than.map(|d| d.as_secs() / 86_400)
        };
        press(&mut s, 'o');
        assert_eq!(days(&s), Some(7));
        press(&mut s, 'o');
        assert_eq!(days(&s), Some(30));
        press(&mut s, 'o');
        assert_eq!(days(&s), Some(90));
        press(&mut s, 'o');
        assert_eq!(days(&s), None);
    }

    #[test]
    fn rename_prefills_the_old_name() {
        let g = basic_repo();
        let mut s = session(&g);

        move_to_name(&mut s, "feature/y");
        press(&mut s, 'R');
        assert_eq!(s.input(), "feature/y");
        press(&mut s, '2');
        press_code(&mut s, KeyCode::Enter);

        assert!(g.called_with(&["branch", "-m", "feature/y", "feature/y2"]));
    }

    #[test]
    fn submitting_the_unchanged_rename_does_nothing() {
        let g = basic_repo();
        let mut s = session(&g);

        move_to_name(&mut s, "feature/y");
        press(&mut s, 'R');
        press_code(&mut s, KeyCode::Enter);
        assert!(!g.called_with(&["branch", "-m"]));
    }

    #[test]
    fn new_branch_creates_and_selects_it() {
        let g = basic_repo();
        let mut s = session(&g);

        press(&mut s, 'n');
        type_text(&mut s, "feature/new");
        script_listing(
            &g,
            &[
                row(" ", "refs/heads/main", 100, "init", "<dev@example.com>"),
                row("*", "refs/heads/feature/new", 100, "init", "<dev@example.com>"),
            ],
        );
        press_code(&mut s, KeyCode::Enter);

        assert!(g.called_with(&["checkout", "-b", "feature/new"]));
        assert_eq!(selected_name(&s), "feature/new");
    }

    #[test]
    fn browser_respects_the_merged_guard() {
        let g = basic_repo();
        g.respond(
            &["branch", "--merged", "main"],
            "main\nfeature/y\n",
        );
        let mut config = Config::default();
        config.prevent_browser_for_merged = true;
        let mut s = Session::new(g.clone(), config);

        move_to_name(&mut s, "feature/y");
        press(&mut s, 'b');
        assert!(s.banner().unwrap().contains("merged"));
        assert!(!g.called_with(&["remote", "get-url", "origin"]));
    }

    #[test]
    fn degraded_refresh_surfaces_a_partial_data_banner() {
        let g = basic_repo();
        g.fail(&["branch", "--merged"], "fatal: malformed object name");
        let s = session(&g);
        assert!(s.banner().unwrap().contains("partial branch data"));
        assert_eq!(s.visible().len(), 4);
    }

    #[test]
    fn help_overlay_opens_and_any_key_dismisses() {
        let g = basic_repo();
        let mut s = session(&g);

        press(&mut s, '?');
        assert_eq!(s.mode(), &Mode::Help);
        press(&mut s, 'x');
        assert_eq!(s.mode(), &Mode::Normal);
        assert!(!s.should_quit());
    }
}
