//! Type — the vertex identity of the conversion graph.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use super::{Container, Format};

/// The typed handle callers use to name a conversion endpoint.
///
/// A `Type<T>` pairs a [`Format`] with the [`Container`] of `T`. The type
/// parameter only exists at the API surface — the graph works on the erased
/// [`TypeKey`].
pub struct Type<T> {
    key: TypeKey,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> Type<T> {
    /// A format-less type backed by the container of `T`.
    pub fn of() -> Self {
        Self::from_key(TypeKey::bare(Container::of::<T>()))
    }

    /// A type carrying the given format.
    pub fn tagged(format: Format) -> Self {
        Self::from_key(TypeKey::new(format, Container::of::<T>()))
    }

    /// A format-less type inferred from a value reference.
    pub fn dynamic(_value: &T) -> Self {
        Self::of()
    }

    pub fn format(&self) -> &Format {
        &self.key.format
    }

    pub fn container(&self) -> Container {
        self.key.container
    }

    pub(crate) fn from_key(key: TypeKey) -> Self {
        Self { key, _marker: PhantomData }
    }

    pub(crate) fn key(&self) -> &TypeKey {
        &self.key
    }
}

impl<T> Clone for Type<T> {
    fn clone(&self) -> Self {
        Self { key: self.key.clone(), _marker: PhantomData }
    }
}

impl<T> PartialEq for Type<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T> Eq for Type<T> {}

impl<T> Hash for Type<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl<T> fmt::Debug for Type<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({:?})", self.key)
    }
}

impl<T> fmt::Display for Type<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}

// ============================================================================
// TypeKey — erased vertex identity
// ============================================================================

/// The erased form of [`Type`]: what the graph actually keys on.
///
/// Identity is `(format, container)`. The `strict` marker records that the
/// vertex was reached through an implicit widening step during a search and
/// is deliberately excluded from `Eq`/`Hash`, so the same vertex can be
/// revisited with and without the marker.
#[derive(Clone, Debug)]
pub struct TypeKey {
    pub(crate) format: Format,
    pub(crate) container: Container,
    pub(crate) strict: bool,
}

impl TypeKey {
    pub(crate) fn new(format: Format, container: Container) -> Self {
        Self { format, container, strict: false }
    }

    pub(crate) fn bare(container: Container) -> Self {
        Self::new(Format::None, container)
    }

    pub(crate) fn as_strict(&self) -> Self {
        Self { strict: true, ..self.clone() }
    }

    pub fn format(&self) -> &Format {
        &self.format
    }

    pub fn container(&self) -> Container {
        self.container
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Format equivalence against another vertex. Never true for
    /// format-less types.
    pub(crate) fn matches_format(&self, other: &TypeKey) -> bool {
        self.format.matches(&other.format)
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.format == other.format && self.container == other.container
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.format.hash(state);
        self.container.hash(state);
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.format {
            Format::None => write!(f, "{}", self.container),
            Format::Tag(tag) => write!(f, "{tag}[{}]", self.container),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_excludes_strict() {
        let key = TypeKey::bare(Container::of::<String>());
        assert_eq!(key, key.as_strict());
        assert!(key.as_strict().is_strict());
        assert!(!key.is_strict());
    }

    #[test]
    fn test_identity_includes_format() {
        let bare = Type::<String>::of();
        let tagged = Type::<String>::tagged(Format::tag("text"));
        assert_ne!(bare, tagged);
        assert_eq!(tagged, Type::<String>::tagged(Format::tag("text")));
    }

    #[test]
    fn test_dynamic_matches_of() {
        let value = 42i64;
        assert_eq!(Type::dynamic(&value), Type::<i64>::of());
    }

    #[test]
    fn test_display() {
        assert_eq!(Type::<String>::of().to_string(), "String");
        assert_eq!(
            Type::<String>::tagged(Format::tag("text")).to_string(),
            "text[String]"
        );
    }
}
