use std::path::PathBuf;

/// Everything the session knows about one branch, reconciled from the
/// aggregator's batch queries. Immutable for the lifetime of a snapshot;
/// a refresh replaces the whole set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    /// Short ref name; remote branches keep their remote prefix
    /// (e.g. "origin/feature/x").
    pub name: String,
    pub is_remote: bool,
    /// Checked out in the primary working tree.
    pub is_current: bool,
    pub commit_hash: String,
    /// Committer date, unix seconds.
    pub commit_date: i64,
    pub commit_subject: String,
    /// Normalized (no angle brackets, lowercased).
    pub author_email: String,
    /// Only ever true for the current branch; remote branches never
    /// carry uncommitted changes.
    pub has_uncommitted: bool,
    /// A same-named branch exists on some remote.
    pub has_upstream: bool,
    /// Reachable from the configured base branch.
    pub is_merged: bool,
    /// Checked out in a worktree other than the primary one. Mutually
    /// exclusive with `is_current`.
    pub worktree: Option<PathBuf>,
}

impl Branch {
    /// Name without the remote prefix; identity for local branches.
    pub fn short_name(&self) -> &str {
        if self.is_remote {
            self.name.split_once('/').map(|(_, rest)| rest).unwrap_or(&self.name)
        } else {
            &self.name
        }
    }
}

/// Snapshot order: newest commit first, name as a deterministic tiebreak.
pub fn sort_snapshot(branches: &mut [Branch]) {
    branches.sort_by(|a, b| {
        b.commit_date
            .cmp(&a.commit_date)
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// Git's listing formats wrap author emails in angle brackets while
/// `git config user.email` does not; strip both before comparing.
pub fn normalize_email(raw: &str) -> String {
    raw.trim()
        .trim_start_matches('<')
        .trim_end_matches('>')
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_branch(name: &str, date: i64) -> Branch {
        Branch {
            name: name.to_string(),
            is_remote: false,
            is_current: false,
            commit_hash: "abc1234".to_string(),
            commit_date: date,
            commit_subject: String::new(),
            author_email: String::new(),
            has_uncommitted: false,
            has_upstream: false,
            is_merged: false,
            worktree: None,
        }
    }

    #[test]
    fn sorts_newest_first_with_name_tiebreak() {
        let mut branches = vec![
            make_branch("zeta", 100),
            make_branch("alpha", 100),
            make_branch("old", 50),
            make_branch("new", 200),
        ];
        sort_snapshot(&mut branches);
        let names: Vec<&str> = branches.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["new", "alpha", "zeta", "old"]);
    }

    #[test]
    fn normalizes_bracketed_and_bare_emails_equally() {
        assert_eq!(normalize_email("<Dev@Example.com>"), "dev@example.com");
        assert_eq!(normalize_email("dev@example.com "), "dev@example.com");
        assert_eq!(
            normalize_email("<a@b.c>"),
            normalize_email("a@b.c"),
        );
    }

    #[test]
    fn short_name_strips_remote_prefix_only() {
        let mut b = make_branch("origin/feature/x", 0);
        b.is_remote = true;
        assert_eq!(b.short_name(), "feature/x");

        let local = make_branch("feature/x", 0);
        assert_eq!(local.short_name(), "feature/x");
    }
}
