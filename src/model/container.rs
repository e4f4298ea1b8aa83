//! Container — the physical value shape backing a type.

use std::any::{TypeId, type_name};
use std::fmt;

/// The physical representation carrying a value, independent of its
/// [`Format`](super::Format).
///
/// Backed by [`TypeId`], so generic containers are distinguished for free:
/// `Container::of::<Vec<String>>()` and `Container::of::<Vec<u8>>()` are
/// different containers.
#[derive(Clone, Copy, Debug)]
pub struct Container {
    id: TypeId,
    name: &'static str,
}

impl Container {
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// The full type name as captured at construction.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The type name with module paths stripped, for diagnostics.
    pub fn short_name(&self) -> String {
        short_type_name(self.name)
    }
}

// Identity is the TypeId alone; the name is derived metadata.
impl PartialEq for Container {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Container {}

impl std::hash::Hash for Container {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// Strips module paths from a type name, including inside generic arguments:
/// `alloc::vec::Vec<alloc::string::String>` becomes `Vec<String>`.
fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for c in full.chars() {
        match c {
            ':' => segment.clear(),
            '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | ';' | '&' => {
                out.push_str(&segment);
                segment.clear();
                out.push(c);
            }
            _ => segment.push(c),
        }
    }
    out.push_str(&segment);
    out
}
