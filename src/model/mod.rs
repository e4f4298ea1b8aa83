//! The type model: formats, containers and vertex identity.

mod container;
mod format;
mod ty;

pub use container::Container;
pub use format::Format;
pub use ty::{Type, TypeKey};
