use super::branch::normalize_email;
use super::gateway::Gateway;

/// Outcome of a synchronous branch mutation. `Err` carries git's own
/// message verbatim so the user sees exactly what the tool saw.
pub type OpResult = std::result::Result<(), String>;

fn run_checked<G: Gateway>(gateway: &G, args: &[&str]) -> OpResult {
    match gateway.run(args) {
        Ok(out) if out.success() => Ok(()),
        Ok(out) => Err(out.message().to_string()),
        Err(e) => Err(e.to_string()),
    }
}

/// The configured identity, normalized for author-filter comparison.
pub fn user_email<G: Gateway>(gateway: &G) -> Option<String> {
    let out = gateway.run(&["config", "user.email"]).ok()?;
    if !out.success() || out.stdout.trim().is_empty() {
        return None;
    }
    Some(normalize_email(&out.stdout))
}

pub fn checkout<G: Gateway>(gateway: &G, name: &str) -> OpResult {
    run_checked(gateway, &["checkout", name])
}

pub fn local_branch_exists<G: Gateway>(gateway: &G, name: &str) -> bool {
    let refname = format!("refs/heads/{}", name);
    matches!(
        gateway.run(&["rev-parse", "--verify", "--quiet", &refname]),
        Ok(out) if out.success()
    )
}

/// Check out a remote-only branch by creating a local tracking branch of
/// the same short name. An existing local branch of that name is a
/// conflict, never silently reused.
pub fn checkout_tracking<G: Gateway>(gateway: &G, remote_name: &str, short_name: &str) -> OpResult {
    if local_branch_exists(gateway, short_name) {
        return Err(format!(
            "a local branch '{}' already exists; checkout of '{}' would shadow it",
            short_name, remote_name
        ));
    }
    run_checked(gateway, &["checkout", "--track", remote_name])
}

/// Create a branch at HEAD and switch to it.
pub fn create_branch<G: Gateway>(gateway: &G, name: &str) -> OpResult {
    run_checked(gateway, &["checkout", "-b", name])
}

pub fn delete_branch<G: Gateway>(gateway: &G, name: &str, force: bool) -> OpResult {
    let flag = if force { "-D" } else { "-d" };
    run_checked(gateway, &["branch", flag, name])
}

/// Whether a failed plain delete can be retried with the force flag.
pub fn is_unmerged_delete_failure(message: &str) -> bool {
    message.contains("not fully merged")
}

pub fn rename_branch<G: Gateway>(gateway: &G, old: &str, new: &str) -> OpResult {
    run_checked(gateway, &["branch", "-m", old, new])
}

/// Long-running; only ever called from the background fetch worker.
pub fn fetch_all<G: Gateway>(gateway: &G) -> OpResult {
    run_checked(gateway, &["fetch", "--all", "--prune"])
}

/// The URL of the `origin` remote, if any. Feeds platform URL building.
pub fn origin_url<G: Gateway>(gateway: &G) -> Option<String> {
    let out = gateway.run(&["remote", "get-url", "origin"]).ok()?;
    if !out.success() {
        return None;
    }
    let url = out.stdout.trim().to_string();
    if url.is_empty() {
        None
    } else {
        Some(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::gateway::test_support::ScriptedGateway;

    #[test]
    fn checkout_tracking_refuses_existing_local_name() {
        let g = ScriptedGateway::new();
        g.respond(&["rev-parse", "--verify", "--quiet", "refs/heads/feature/x"], "abc123\n");

        let err = checkout_tracking(&g, "origin/feature/x", "feature/x").unwrap_err();
        assert!(err.contains("already exists"));
        assert!(!g.called_with(&["checkout", "--track"]));
    }

    #[test]
    fn checkout_tracking_creates_tracking_branch_when_free() {
        let g = ScriptedGateway::new();
        g.fail(&["rev-parse", "--verify", "--quiet", "refs/heads/feature/x"], "");

        assert!(checkout_tracking(&g, "origin/feature/x", "feature/x").is_ok());
        assert!(g.called_with(&["checkout", "--track", "origin/feature/x"]));
    }

    #[test]
    fn delete_reports_git_message_verbatim() {
        let g = ScriptedGateway::new();
        g.fail(
            &["branch", "-d", "feature/x"],
            "error: the branch 'feature/x' is not fully merged",
        );

        let err = delete_branch(&g, "feature/x", false).unwrap_err();
        assert!(is_unmerged_delete_failure(&err));
        assert!(err.contains("not fully merged"));
    }

    #[test]
    fn force_delete_uses_capital_flag() {
        let g = ScriptedGateway::new();
        assert!(delete_branch(&g, "feature/x", true).is_ok());
        assert!(g.called_with(&["branch", "-D", "feature/x"]));
    }

    #[test]
    fn user_email_is_normalized() {
        let g = ScriptedGateway::new();
        g.respond(&["config", "user.email"], "Dev@Example.com\n");
        assert_eq!(user_email(&g).unwrap(), "dev@example.com");
    }
}
