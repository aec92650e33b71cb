use std::time::Duration;

use crate::git::{normalize_email, Branch};

/// Active filters. All fields independent; an empty state passes every
/// branch through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Case-insensitive substring on the branch name.
    pub search: Option<String>,
    /// Exact match on the normalized author email.
    pub author: Option<String>,
    /// Branches whose last commit is older than this are hidden.
    pub hide_older_than: Option<Duration>,
    pub hide_merged: bool,
    /// Case-sensitive starts-with on the branch name.
    pub prefix: Option<String>,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.author.is_none()
            && self.hide_older_than.is_none()
            && !self.hide_merged
            && self.prefix.is_none()
    }

    pub fn clear(&mut self) {
        *self = FilterState::default();
    }

    /// Short description for the status line, e.g. `/"fix" merged-hidden`.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(s) = &self.search {
            parts.push(format!("/{:?}", s));
        }
        if let Some(p) = &self.prefix {
            parts.push(format!("prefix:{}", p));
        }
        if let Some(a) = &self.author {
            parts.push(format!("author:{}", a));
        }
        if let Some(d) = self.hide_older_than {
            parts.push(format!("<{}d", d.as_secs() / 86400));
        }
        if self.hide_merged {
            parts.push("merged-hidden".to_string());
        }
        parts.join(" ")
    }
}

/// Inputs the filter needs beyond the branch set itself, passed in so the
/// function stays deterministic for identical arguments.
#[derive(Debug, Clone)]
pub struct FilterContext<'a> {
    /// Names exempt from the merged exclusion (configured protected
    /// branches plus the configured base branch).
    pub protected: &'a [String],
    /// Unix seconds "now" used for the age cutoff.
    pub now: i64,
}

/// Pure filter application. Filters AND together; the input order is
/// preserved exactly, so clearing filters reproduces the aggregator's
/// ordering with no re-sort.
pub fn apply(branches: &[Branch], filter: &FilterState, ctx: &FilterContext) -> Vec<Branch> {
    branches
        .iter()
        .filter(|b| retain(b, filter, ctx))
        .cloned()
        .collect()
}

fn retain(branch: &Branch, filter: &FilterState, ctx: &FilterContext) -> bool {
    if let Some(term) = &filter.search {
        if !branch.name.to_lowercase().contains(&term.to_lowercase()) {
            return false;
        }
    }

    if let Some(prefix) = &filter.prefix {
        if !branch.name.starts_with(prefix.as_str()) {
            return false;
        }
    }

    if let Some(author) = &filter.author {
        if branch.author_email != normalize_email(author) {
            return false;
        }
    }

    if let Some(max_age) = filter.hide_older_than {
        let cutoff = ctx.now - max_age.as_secs() as i64;
        if branch.commit_date < cutoff {
            return false;
        }
    }

    if filter.hide_merged && branch.is_merged {
        // The branch under your feet and protected branches stay visible
        // no matter what.
        let exempt = branch.is_current
            || ctx.protected.iter().any(|p| p == branch.short_name());
        if !exempt {
            return false;
        }
    }

    true
}
