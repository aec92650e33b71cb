use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;

use super::branch::{normalize_email, sort_snapshot, Branch};
use super::gateway::Gateway;

/// Unit separator. Guaranteed absent from ref names and emails, and not
/// something that survives in commit subjects, so the listing parse never
/// has to guess where a field ends.
const FIELD_SEP: char = '\u{1f}';

pub(crate) const LISTING_FORMAT: &str =
    "%(HEAD)%1f%(refname)%1f%(committerdate:unix)%1f%(objectname:short)%1f%(contents:subject)%1f%(authoremail)";

/// One batch query that failed. The affected fields fall back to safe
/// defaults; the refresh itself still succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Listing,
    Upstreams,
    MergedSet,
    Worktrees,
    StatusCheck,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Listing => "branch listing",
            Step::Upstreams => "upstreams",
            Step::MergedSet => "merged set",
            Step::Worktrees => "worktrees",
            Step::StatusCheck => "status check",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CollectReport {
    pub degraded: Vec<(Step, String)>,
}

impl CollectReport {
    pub fn is_clean(&self) -> bool {
        self.degraded.is_empty()
    }

    pub fn summary(&self) -> Option<String> {
        if self.degraded.is_empty() {
            return None;
        }
        let steps: Vec<String> = self.degraded.iter().map(|(s, _)| s.to_string()).collect();
        Some(format!("partial branch data ({})", steps.join(", ")))
    }

    fn mark(&mut self, step: Step, detail: impl Into<String>) {
        let detail = detail.into();
        warn!("degraded {}: {}", step, detail);
        self.degraded.push((step, detail));
    }
}

/// Gathers independent facts about every branch through a fixed set of
/// batch queries and reconciles them into one consistent snapshot.
pub struct BranchAggregator<'a, G: Gateway> {
    gateway: &'a G,
}

impl<'a, G: Gateway> BranchAggregator<'a, G> {
    pub fn new(gateway: &'a G) -> Self {
        Self { gateway }
    }

    pub fn collect(&self, base_branch: &str, include_remotes: bool) -> (Vec<Branch>, CollectReport) {
        let mut report = CollectReport::default();

        // 1. One listing pass over all refs. This is the only query whose
        // failure leaves nothing to show.
        let mut branches = match self.query_listing(include_remotes) {
            Ok(list) => list,
            Err(detail) => {
                report.mark(Step::Listing, detail);
                Vec::new()
            }
        };

        // 2. Remote short names, for the upstream flag on local branches.
        match self.query_remote_names() {
            Ok(remote_names) => {
                for b in branches.iter_mut().filter(|b| !b.is_remote) {
                    b.has_upstream = remote_names.contains(b.name.as_str());
                }
            }
            Err(detail) => report.mark(Step::Upstreams, detail),
        }

        // 3. Branches reachable from the base. The base is never "merged"
        // into itself.
        match self.query_merged_set(base_branch) {
            Ok(merged) => {
                for b in branches.iter_mut().filter(|b| !b.is_remote) {
                    b.is_merged = b.name != base_branch && merged.contains(b.name.as_str());
                }
            }
            Err(detail) => report.mark(Step::MergedSet, detail),
        }

        // 4. Secondary worktree checkouts. The current branch belongs to
        // the primary tree by definition and never gets a path here.
        match self.query_worktrees() {
            Ok(worktrees) => {
                for b in branches.iter_mut().filter(|b| !b.is_remote && !b.is_current) {
                    b.worktree = worktrees.get(b.name.as_str()).cloned();
                }
            }
            Err(detail) => report.mark(Step::Worktrees, detail),
        }

        // 5. Dirty state of the primary tree, attributed to the current
        // branch. Worktree dirtiness is resolved on demand by the session.
        match self.query_primary_dirty() {
            Ok(dirty) => {
                if let Some(current) = branches.iter_mut().find(|b| b.is_current) {
                    current.has_uncommitted = dirty;
                }
            }
            Err(detail) => report.mark(Step::StatusCheck, detail),
        }

        sort_snapshot(&mut branches);
        (branches, report)
    }

    /// Dirty check for one secondary worktree, best effort.
    pub fn worktree_dirty(&self, path: &std::path::Path) -> Option<bool> {
        match self.gateway.run_in(&["status", "--porcelain"], path) {
            Ok(out) if out.success() => Some(!out.stdout.trim().is_empty()),
            _ => None,
        }
    }

    fn query_listing(&self, include_remotes: bool) -> std::result::Result<Vec<Branch>, String> {
        let format = format!("--format={}", LISTING_FORMAT);
        let mut args = vec!["for-each-ref", format.as_str(), "refs/heads"];
        if include_remotes {
            args.push("refs/remotes");
        }

        let out = self.gateway.run(&args).map_err(|e| e.to_string())?;
        if !out.success() {
            return Err(out.message().to_string());
        }

        let mut branches = Vec::new();
        for line in out.stdout.lines().filter(|l| !l.is_empty()) {
            if let Some(branch) = parse_listing_line(line) {
                branches.push(branch);
            } else {
                warn!("skipping malformed listing line: {:?}", line);
            }
        }
        Ok(branches)
    }

    fn query_remote_names(&self) -> std::result::Result<HashSet<String>, String> {
        let out = self
            .gateway
            .run(&["for-each-ref", "refs/remotes", "--format=%(refname:short)"])
            .map_err(|e| e.to_string())?;
        if !out.success() {
            return Err(out.message().to_string());
        }

        let mut names = HashSet::new();
        for line in out.stdout.lines().filter(|l| !l.is_empty()) {
            // "origin/feature/x" -> "feature/x"; the origin/HEAD symref
            // is not a branch.
            if let Some((_, short)) = line.split_once('/') {
                if short != "HEAD" {
                    names.insert(short.to_string());
                }
            }
        }
        Ok(names)
    }

    fn query_merged_set(&self, base: &str) -> std::result::Result<HashSet<String>, String> {
        let out = self
            .gateway
            .run(&["branch", "--merged", base, "--format=%(refname:short)"])
            .map_err(|e| e.to_string())?;
        if !out.success() {
            return Err(out.message().to_string());
        }
        Ok(out
            .stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn query_worktrees(&self) -> std::result::Result<HashMap<String, PathBuf>, String> {
        let out = self
            .gateway
            .run(&["worktree", "list", "--porcelain"])
            .map_err(|e| e.to_string())?;
        if !out.success() {
            return Err(out.message().to_string());
        }
        Ok(parse_worktrees(&out.stdout))
    }

    fn query_primary_dirty(&self) -> std::result::Result<bool, String> {
        let out = self
            .gateway
            .run(&["status", "--porcelain"])
            .map_err(|e| e.to_string())?;
        if !out.success() {
            return Err(out.message().to_string());
        }
        Ok(!out.stdout.trim().is_empty())
    }
}

/// One `for-each-ref` record. Malformed lines yield `None` rather than a
/// half-filled branch. Extra separators are tolerated by anchoring the
/// first three fields from the left and the email from the right; the
/// subject is whatever sits in between.
fn parse_listing_line(line: &str) -> Option<Branch> {
    let fields: Vec<&str> = line.split(FIELD_SEP).collect();
    if fields.len() < 6 {
        return None;
    }

    let head_marker = fields[0];
    let refname = fields[1];
    let date = fields[2].parse::<i64>().ok()?;
    let hash = fields[3];
    let email = fields[fields.len() - 1];
    let subject = fields[4..fields.len() - 1].join(&FIELD_SEP.to_string());

    let (name, is_remote) = if let Some(short) = refname.strip_prefix("refs/heads/") {
        (short.to_string(), false)
    } else if let Some(short) = refname.strip_prefix("refs/remotes/") {
        if short.ends_with("/HEAD") {
            return None;
        }
        (short.to_string(), true)
    } else {
        return None;
    };

    Some(Branch {
        name,
        is_remote,
        is_current: head_marker == "*" && !is_remote,
        commit_hash: hash.to_string(),
        commit_date: date,
        commit_subject: subject,
        author_email: normalize_email(email),
        has_uncommitted: false,
        has_upstream: false,
        is_merged: false,
        worktree: None,
    })
}

/// `git worktree list --porcelain` output: stanzas separated by blank
/// lines, the first stanza being the primary working tree. Returns
/// branch -> path for every stanza after the first.
fn parse_worktrees(text: &str) -> HashMap<String, PathBuf> {
    let mut map = HashMap::new();
    let mut path: Option<PathBuf> = None;
    let mut branch: Option<String> = None;
    let mut is_primary = true;

    let mut flush = |path: &mut Option<PathBuf>, branch: &mut Option<String>, primary: &mut bool| {
        if let (Some(p), Some(b)) = (path.take(), branch.take()) {
            if !*primary {
                map.insert(b, p);
            }
        } else {
            path.take();
            branch.take();
        }
        *primary = false;
    };

    for line in text.lines() {
        if line.is_empty() {
            flush(&mut path, &mut branch, &mut is_primary);
        } else if let Some(p) = line.strip_prefix("worktree ") {
            path = Some(PathBuf::from(p));
        } else if let Some(r) = line.strip_prefix("branch ") {
            branch = Some(
                r.strip_prefix("refs/heads/").unwrap_or(r).to_string(),
            );
        }
        // "HEAD <sha>", "detached", "bare" etc. are irrelevant here.
    }
    flush(&mut path, &mut branch, &mut is_primary);
    map
}
