mod background;
mod filter;
mod state;

pub use state::{Mode, Session, StashPrompt};
