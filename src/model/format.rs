//! Format — the capability tag half of a type's identity.

use std::borrow::Cow;
use std::fmt;

/// A tag describing the representation family of a [`Type`](crate::Type).
///
/// Two types sharing a matching format are considered interchangeable up to
/// their containers: the path search may connect them without an explicit
/// mapper and defer to a container-level conversion instead.
///
/// `Format::None` deliberately matches nothing, including another `None` —
/// format-less types only connect through explicit mapper edges or declared
/// supertype relations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Format {
    /// Absence of a format.
    None,
    /// A domain-specific tag, compared verbatim.
    Tag(Cow<'static, str>),
}

impl Format {
    /// Creates a tagged format, e.g. `Format::tag("discord:user_id")`.
    pub fn tag(tag: impl Into<Cow<'static, str>>) -> Self {
        Format::Tag(tag.into())
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Format::None)
    }

    /// The format-equivalence predicate used by the path search.
    ///
    /// Distinct from `==`: identity treats `None == None` as true (two
    /// format-less vertices with the same container are the same vertex),
    /// while `matches` never holds for `None`.
    pub fn matches(&self, other: &Format) -> bool {
        match (self, other) {
            (Format::Tag(a), Format::Tag(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::None => write!(f, "-"),
            Format::Tag(tag) => write!(f, "{tag}"),
        }
    }
}
