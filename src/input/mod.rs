mod event;
mod reader;

pub use event::{Event, KeyCode, KeyEvent, Modifiers};
pub use reader::EventReader;
