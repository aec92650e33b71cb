mod aggregator;
mod branch;
mod gateway;
pub mod ops;
pub mod platform;
mod stash;

pub use aggregator::{BranchAggregator, CollectReport};
pub use branch::{normalize_email, Branch};
pub use gateway::{Gateway, GitGateway};
pub use stash::{CheckoutDecision, PopOutcome, StashRecord, StashTracker};

#[cfg(test)]
pub(crate) use aggregator::LISTING_FORMAT;
#[cfg(test)]
pub(crate) use gateway::test_support;
