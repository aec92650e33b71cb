use std::collections::HashMap;

use super::gateway::Gateway;

const STASH_SEP: char = '\u{1f}';

/// A stash this tool created on the user's behalf. `stash_ref` is the
/// positional `stash@{N}` selector observed at creation time; positions
/// shift whenever the stash list changes, so the message tag is the
/// durable identity and the position is re-resolved at use time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StashRecord {
    pub branch: String,
    pub stash_ref: String,
    pub message: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutDecision {
    ProceedNoStash,
    PromptToStash,
    AutoRestoreAvailable(StashRecord),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopOutcome {
    Popped,
    /// The stash exists but could not be applied cleanly; the record is
    /// kept because the stash may still be poppable by hand.
    Conflict(String),
    /// The tagged stash is gone from the list entirely.
    Missing,
}

/// Tracks the stashes created by checkout flows, at most one open record
/// per branch (a newer stash supersedes, never stacks).
#[derive(Debug, Default)]
pub struct StashTracker {
    records: HashMap<String, StashRecord>,
}

impl StashTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide what a checkout of `target` needs from the user. A dirty
    /// working tree is dealt with first; only a clean switch can offer
    /// the target branch's auto-restore.
    pub fn on_checkout_requested(&self, target: &str, dirty: bool) -> CheckoutDecision {
        if dirty {
            return CheckoutDecision::PromptToStash;
        }
        match self.records.get(target) {
            Some(record) => CheckoutDecision::AutoRestoreAvailable(record.clone()),
            None => CheckoutDecision::ProceedNoStash,
        }
    }

    pub fn record_for(&self, branch: &str) -> Option<&StashRecord> {
        self.records.get(branch)
    }

    pub fn open_count(&self) -> usize {
        self.records.len()
    }

    /// Stash the working tree for `branch` with an attributable message.
    /// Called only after the user confirmed the prompt.
    pub fn stash_current<G: Gateway>(
        &mut self,
        gateway: &G,
        branch: &str,
    ) -> std::result::Result<StashRecord, String> {
        let created_at = chrono::Utc::now().timestamp();
        let message = format!("twig: {} @ {}", branch, created_at);

        match gateway.run(&["stash", "push", "-m", &message]) {
            Ok(out) if out.success() => {}
            Ok(out) => return Err(out.message().to_string()),
            Err(e) => return Err(e.to_string()),
        }

        // Freshly pushed stashes land at position zero, but read the list
        // back rather than assume.
        let stash_ref = resolve_by_message(gateway, &message)
            .unwrap_or_else(|| "stash@{0}".to_string());

        let record = StashRecord {
            branch: branch.to_string(),
            stash_ref,
            message,
            created_at,
        };
        info!("stashed changes for {} as {}", branch, record.stash_ref);
        self.records.insert(branch.to_string(), record.clone());
        Ok(record)
    }

    /// Pop the stash behind `record`, re-resolving its position first.
    pub fn pop_tracked<G: Gateway>(&mut self, gateway: &G, record: &StashRecord) -> PopOutcome {
        let stash_ref = match resolve_by_message(gateway, &record.message) {
            Some(r) => r,
            None => {
                // Nothing left to restore; dropping the record is the
                // only consistent outcome.
                self.records.remove(&record.branch);
                return PopOutcome::Missing;
            }
        };

        match gateway.run(&["stash", "pop", &stash_ref]) {
            Ok(out) if out.success() => {
                self.records.remove(&record.branch);
                PopOutcome::Popped
            }
            Ok(out) => PopOutcome::Conflict(out.message().to_string()),
            Err(e) => PopOutcome::Conflict(e.to_string()),
        }
    }
}

/// Scan the stash list for the entry carrying `message` and return its
/// current positional selector.
fn resolve_by_message<G: Gateway>(gateway: &G, message: &str) -> Option<String> {
    let out = gateway
        .run(&["stash", "list", "--format=%gd\u{1f}%s"])
        .ok()?;
    if !out.success() {
        return None;
    }
    for line in out.stdout.lines() {
        if let Some((selector, subject)) = line.split_once(STASH_SEP) {
            // `stash push -m` prefixes the subject with "On <branch>:".
            if subject.ends_with(message) {
                return Some(selector.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::gateway::test_support::ScriptedGateway;

    fn stash_list_line(selector: &str, branch: &str, message: &str) -> String {
        format!("{}\u{1f}On {}: {}", selector, branch, message)
    }

    #[test]
    fn dirty_tree_prompts_before_anything_else() {
        let tracker = StashTracker::new();
        assert_eq!(
            tracker.on_checkout_requested("feature/x", true),
            CheckoutDecision::PromptToStash
        );
        assert_eq!(
            tracker.on_checkout_requested("feature/x", false),
            CheckoutDecision::ProceedNoStash
        );
    }

    #[test]
    fn stash_then_return_offers_auto_restore() {
        let g = ScriptedGateway::new();
        let mut tracker = StashTracker::new();

        // The push succeeds (unscripted = exit 0); the list resolves the tag.
        let record = tracker.stash_current(&g, "feature/z").unwrap();
        assert_eq!(record.branch, "feature/z");
        assert!(g.called_with(&["stash", "push", "-m"]));

        match tracker.on_checkout_requested("feature/z", false) {
            CheckoutDecision::AutoRestoreAvailable(r) => assert_eq!(r, record),
            other => panic!("expected auto-restore, got {:?}", other),
        }
    }

    #[test]
    fn newer_stash_supersedes_older_for_same_branch() {
        let g = ScriptedGateway::new();
        let mut tracker = StashTracker::new();

        tracker.stash_current(&g, "feature/z").unwrap();
        let second = tracker.stash_current(&g, "feature/z").unwrap();

        assert_eq!(tracker.open_count(), 1);
        assert_eq!(tracker.record_for("feature/z"), Some(&second));
    }

    #[test]
    fn pop_reresolves_position_from_message_tag() {
        let g = ScriptedGateway::new();
        let mut tracker = StashTracker::new();

        let record = tracker.stash_current(&g, "feature/z").unwrap();

        // The list shifted since creation: our stash is now at {2}.
        let g2 = ScriptedGateway::new();
        g2.respond(
            &["stash", "list"],
            &[
                stash_list_line("stash@{0}", "main", "unrelated"),
                stash_list_line("stash@{1}", "main", "also unrelated"),
                stash_list_line("stash@{2}", "feature/z", &record.message),
            ]
            .join("\n"),
        );

        assert_eq!(tracker.pop_tracked(&g2, &record), PopOutcome::Popped);
        assert!(g2.called_with(&["stash", "pop", "stash@{2}"]));
        assert_eq!(tracker.open_count(), 0);
    }

    #[test]
    fn conflicting_pop_keeps_the_record() {
        let g = ScriptedGateway::new();
        let mut tracker = StashTracker::new();
        let record = tracker.stash_current(&g, "feature/z").unwrap();

        let g2 = ScriptedGateway::new();
        g2.respond(
            &["stash", "list"],
            &stash_list_line("stash@{0}", "feature/z", &record.message),
        );
        g2.fail(&["stash", "pop"], "error: could not restore untracked files");

        match tracker.pop_tracked(&g2, &record) {
            PopOutcome::Conflict(msg) => assert!(msg.contains("could not restore")),
            other => panic!("expected conflict, got {:?}", other),
        }
        assert_eq!(tracker.record_for("feature/z"), Some(&record));
    }

    #[test]
    fn vanished_stash_drops_the_record() {
        let g = ScriptedGateway::new();
        let mut tracker = StashTracker::new();
        let record = tracker.stash_current(&g, "feature/z").unwrap();

        let g2 = ScriptedGateway::new();
        g2.respond(&["stash", "list"], "");

        assert_eq!(tracker.pop_tracked(&g2, &record), PopOutcome::Missing);
        assert_eq!(tracker.open_count(), 0);
    }
}
