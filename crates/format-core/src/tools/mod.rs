mod bold;
mod clear_format;
mod format;
mod italic;
mod link;
mod marker;

pub use bold::BoldTool;
pub use clear_format::ClearFormatTool;
pub use format::FormatTool;
pub use italic::ItalicTool;
pub use link::{INVALID_LINK_MESSAGE, LinkTool};
pub use marker::MarkerTool;
