//! Path — an immutable, append-only edge sequence built up during search.

use std::fmt;
use std::sync::Arc;

use crate::mapping::ErasedMapper;
use crate::model::TypeKey;

use super::Vertex;

// ============================================================================
// Edge
// ============================================================================

/// An opaque handle to the mapper attached to a resolved edge.
#[derive(Clone)]
pub struct MapperRef(pub(crate) Arc<ErasedMapper>);

impl fmt::Debug for MapperRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MapperRef({})", self.0.name)
    }
}

/// One hop of a conversion path.
#[derive(Clone, Debug)]
pub enum Edge {
    /// A hop backed by a registered mapper.
    Resolved {
        from: TypeKey,
        into: TypeKey,
        mapper: MapperRef,
    },
    /// A hop between two format-equivalent vertices. No mapper is attached;
    /// the engine resolves it by recursing on the container types with the
    /// format stripped.
    Unresolved { from: TypeKey, into: TypeKey },
}

impl Edge {
    pub fn source(&self) -> &TypeKey {
        match self {
            Edge::Resolved { from, .. } | Edge::Unresolved { from, .. } => from,
        }
    }

    pub fn target(&self) -> &TypeKey {
        match self {
            Edge::Resolved { into, .. } | Edge::Unresolved { into, .. } => into,
        }
    }
}

// ============================================================================
// Path
// ============================================================================

/// Edge sequence plus the running head vertex. Every mutation returns a new
/// `Path`; search fringes share nothing.
#[derive(Clone)]
pub(crate) struct Path {
    edges: Vec<Edge>,
    head: TypeKey,
}

impl Path {
    pub(crate) fn new(head: TypeKey) -> Self {
        Self { edges: Vec::new(), head }
    }

    pub(crate) fn head(&self) -> &TypeKey {
        &self.head
    }

    /// Appends a hop to `intermediate`. With a vertex this records a resolved
    /// edge; without one the endpoints must be format-equivalent and an
    /// unresolved edge is recorded instead. An unresolved hop always changes
    /// the container, so the new head is marked strict: the value arriving
    /// there went through a container conversion and may not be the exact
    /// type a strict edge demands.
    pub(crate) fn add_edge(&self, intermediate: TypeKey, vertex: Option<&Vertex>) -> Path {
        let mut edges = self.edges.clone();
        match vertex {
            Some(vertex) => {
                edges.push(Edge::Resolved {
                    from: self.head.clone(),
                    into: intermediate.clone(),
                    mapper: MapperRef(vertex.mapper.clone()),
                });
                Path { edges, head: intermediate }
            }
            None => {
                assert!(
                    self.head.matches_format(&intermediate),
                    "illegal edge between '{}' and '{}': endpoints of a mapper-less edge \
                     must share a concrete format",
                    self.head,
                    intermediate,
                );
                edges.push(Edge::Unresolved {
                    from: self.head.clone(),
                    into: intermediate.clone(),
                });
                let head = intermediate.as_strict();
                Path { edges, head }
            }
        }
    }

    /// Appends an implicit widening hop with its upcast mapper.
    pub(crate) fn add_resolved(&self, intermediate: TypeKey, mapper: Arc<ErasedMapper>) -> Path {
        let mut edges = self.edges.clone();
        edges.push(Edge::Resolved {
            from: self.head.clone(),
            into: intermediate.clone(),
            mapper: MapperRef(mapper),
        });
        Path { edges, head: intermediate }
    }

    pub(crate) fn into_edges(self) -> Vec<Edge> {
        self.edges
    }
}
