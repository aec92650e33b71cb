use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use crate::git::{Branch, BranchAggregator, CollectReport, Gateway};

pub const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

#[derive(Debug)]
pub enum FetchOutcome {
    Completed {
        branches: Vec<Branch>,
        report: CollectReport,
    },
    Failed(String),
}

/// Handle to the single outstanding background fetch. The worker owns a
/// cloned gateway and communicates exclusively through the channel; the
/// control thread polls `try_take` every tick while animating the spinner.
pub struct FetchHandle {
    rx: mpsc::Receiver<FetchOutcome>,
    started: Instant,
    spinner_frame: usize,
}

impl FetchHandle {
    pub fn spawn<G>(gateway: &G, base_branch: String, include_remotes: bool) -> Self
    where
        G: Gateway + Clone + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let gateway = gateway.clone();

        thread::spawn(move || {
            info!("background fetch started");
            let outcome = match crate::git::ops::fetch_all(&gateway) {
                Ok(()) => {
                    let aggregator = BranchAggregator::new(&gateway);
                    let (branches, report) = aggregator.collect(&base_branch, include_remotes);
                    FetchOutcome::Completed { branches, report }
                }
                Err(message) => {
                    error!("fetch failed: {}", message);
                    FetchOutcome::Failed(message)
                }
            };
            // The receiver may already be gone if the app quit; nothing
            // to do about it.
            let _ = tx.send(outcome);
        });

        Self {
            rx,
            started: Instant::now(),
            spinner_frame: 0,
        }
    }

    /// Non-blocking poll; `Some` exactly once, when the worker finishes.
    pub fn try_take(&self) -> Option<FetchOutcome> {
        self.rx.try_recv().ok()
    }

    pub fn tick(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
    }

    pub fn spinner_char(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner_frame]
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}
