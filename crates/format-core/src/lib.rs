mod clear_format;
mod config;
mod document;
mod dom;
mod error;
mod html;
mod link;
mod range;
mod registry;
mod snapshot;
mod store;
mod tag;
mod toggle;
mod tool;
mod tools;
mod value;

pub use crate::clear_format::*;
pub use crate::config::*;
pub use crate::document::*;
pub use crate::dom::*;
pub use crate::error::*;
pub use crate::html::{serialize_children, serialize_node};
pub use crate::link::*;
pub use crate::range::*;
pub use crate::registry::*;
pub use crate::snapshot::*;
pub use crate::store::*;
pub use crate::tag::*;
pub use crate::toggle::FormatToggle;
pub use crate::tool::*;
pub use crate::tools::*;
pub use crate::value::*;
