mod block;
mod scrollbar;

pub use block::Block;
pub use scrollbar::Scrollbar;
