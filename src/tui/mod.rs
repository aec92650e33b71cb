mod buffer;
mod layout;
mod style;
mod terminal;

pub use buffer::{char_width, Buffer};
pub use layout::Rect;
pub use style::{Color, Style};
pub use terminal::Terminal;
