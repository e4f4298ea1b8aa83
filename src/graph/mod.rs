//! The conversion graph: adjacency, registration and path discovery.
//!
//! Types are vertices; each directed edge carries exactly one erased
//! one-directional mapper. Most of the graph is implicit — besides explicit
//! mapper edges the search understands format-equivalence shortcuts (no
//! mapper, container reinterpreted) and lazily-discovered widening edges
//! over the declared supertype hierarchy. Materializing every supertype of
//! every vertex up front would explode the adjacency list, so hierarchy
//! edges are only computed when a vertex has no literal neighbours.

mod cache;
mod hierarchy;
mod path;

use std::collections::VecDeque;
use std::sync::Arc;

use dashmap::DashMap;
use hashbrown::{HashMap, HashSet, hash_map::Entry};
use tracing::{debug, trace};

use crate::builder::ConflictStrategy;
use crate::mapping::{ErasedMapper, Flag, FlagSet, MapperKind};
use crate::model::{Container, Format, TypeKey};

pub use path::{Edge, MapperRef};

pub(crate) use cache::PathCache;
pub(crate) use hierarchy::{ChainStep, Hierarchy};
pub(crate) use path::Path;

// ============================================================================
// Vertex
// ============================================================================

/// Directed edge payload: the mapper and its registration flags.
#[derive(Clone)]
pub(crate) struct Vertex {
    pub(crate) mapper: Arc<ErasedMapper>,
    pub(crate) flags: FlagSet,
}

// ============================================================================
// Graph
// ============================================================================

pub(crate) struct Graph {
    adjacency: DashMap<TypeKey, HashMap<TypeKey, Vertex>>,
    hierarchy: Hierarchy,
    cache: PathCache,
}

impl Graph {
    pub(crate) fn new(cache_size: usize) -> Self {
        Self {
            adjacency: DashMap::new(),
            hierarchy: Hierarchy::new(),
            cache: PathCache::new(cache_size),
        }
    }

    /// Registers a conversion route. A one-directional mapper inserts one
    /// edge; a bidirectional mapper inserts one per direction.
    pub(crate) fn register(
        &self,
        from: TypeKey,
        into: TypeKey,
        kind: MapperKind,
        strategy: ConflictStrategy,
        flags: &[Flag],
    ) {
        match kind {
            MapperKind::Uni(mapper) => self.add(from, into, mapper, strategy, flags),
            MapperKind::Bi { forward, reverse } => {
                self.add(from.clone(), into.clone(), forward, strategy, flags);
                self.add(into, from, reverse, strategy, flags);
            }
        }
    }

    fn add(
        &self,
        source: TypeKey,
        target: TypeKey,
        mapper: Arc<ErasedMapper>,
        strategy: ConflictStrategy,
        flags: &[Flag],
    ) {
        let vertex = Vertex { mapper, flags: flags.iter().copied().collect() };
        let mut neighbours = self.adjacency.entry(source.clone()).or_default();
        match neighbours.entry(target.clone()) {
            Entry::Occupied(mut occupied) => match strategy {
                ConflictStrategy::Fail => panic!(
                    "duplicated mapper registration for route '{source}' -> '{target}'"
                ),
                ConflictStrategy::Ignore => {
                    debug!(%source, %target, "ignoring duplicate mapper registration");
                }
                ConflictStrategy::Override => {
                    debug!(%source, %target, "overriding existing mapper registration");
                    occupied.insert(vertex);
                }
            },
            Entry::Vacant(vacant) => {
                trace!(%source, %target, "registered mapper");
                vacant.insert(vertex);
            }
        }
    }

    pub(crate) fn declare_supertype(
        &self,
        sub: Container,
        sup: Container,
        upcast: Arc<ErasedMapper>,
    ) {
        self.hierarchy.declare(sub, sup, upcast);
    }

    /// The cached path between two vertices; runs the search on a miss.
    pub(crate) fn path(&self, source: &TypeKey, target: &TypeKey) -> Arc<[Edge]> {
        self.cache
            .get_or_compute((source.clone(), target.clone()), || self.find_path(source, target))
    }

    /// Replaces the path cache, discarding all cached routes.
    pub(crate) fn adjust_cache_size(&self, capacity: usize) {
        self.cache.resize(capacity);
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Breadth-first search with a FIFO fringe and a vertex-keyed visited
    /// set. Returns an empty list when the two vertices are not connected.
    fn find_path(&self, source: &TypeKey, target: &TypeKey) -> Vec<Edge> {
        assert!(
            source != target,
            "path search invoked with equal source and target; the engine short-circuits \
             identity conversions before reaching the graph"
        );

        // Shared concrete format: defer entirely to a container conversion.
        if source.matches_format(target) {
            return vec![Edge::Unresolved { from: source.clone(), into: target.clone() }];
        }

        let mut visited: HashSet<TypeKey> = HashSet::new();
        visited.insert(source.clone());
        let mut queue: VecDeque<Path> = VecDeque::new();
        queue.push_back(Path::new(source.clone()));

        while let Some(current) = queue.pop_front() {
            let head = current.head().clone();

            // A format-less head whose container the hierarchy can widen
            // straight into the target completes the path with upcast edges.
            if head.format().is_none() && target.format().is_none() {
                if let Some(chain) = self.hierarchy.chain(head.container(), target.container()) {
                    if !chain.is_empty() {
                        return extend_with_chain(current, &Format::None, &chain).into_edges();
                    }
                }
            }

            let neighbours = self.neighbours(&head);
            if neighbours.is_empty() {
                // No literal neighbours: widen over declared supertypes. The
                // widened vertices are format-less and marked strict, so
                // strict-subtype edges out of them are skipped. They count as
                // visited so a cyclic declaration cannot re-enqueue them.
                for (sup, chain) in self.hierarchy.walk(head.container()) {
                    if !visited.insert(TypeKey::bare(sup)) {
                        continue;
                    }
                    trace!(%head, sup = %sup, "widening head via declared supertype");
                    queue.push_back(extend_with_chain(current.clone(), &Format::None, &chain));
                }
                continue;
            }

            for neighbour in neighbours {
                if !visited.insert(neighbour.clone()) {
                    continue;
                }

                let vertex = self.vertex(&head, &neighbour);
                if let Some(vertex) = &vertex {
                    if head.is_strict() && vertex.flags.contains(&Flag::StrictSubTypes) {
                        trace!(%head, %neighbour, "skipping strict-subtype edge for widened head");
                        continue;
                    }
                }

                let next = current.add_edge(neighbour.clone(), vertex.as_ref());
                if neighbour == *target {
                    return next.into_edges();
                }
                // A neighbour sharing the target's format completes the path
                // up to a final container conversion.
                if neighbour.matches_format(target) {
                    return next.add_edge(target.clone(), None).into_edges();
                }
                // The neighbour may sit below the target in the declared
                // hierarchy; identical formats required (format-less counts
                // here, unlike format equivalence).
                if neighbour.format() == target.format() {
                    if let Some(chain) =
                        self.hierarchy.chain(neighbour.container(), target.container())
                    {
                        if !chain.is_empty() {
                            let format = neighbour.format().clone();
                            return extend_with_chain(next, &format, &chain).into_edges();
                        }
                    }
                }

                queue.push_back(next);
            }
        }

        trace!(%source, %target, "no conversion path found");
        Vec::new()
    }

    /// Explicit adjacency of `ty` plus every registered source vertex whose
    /// format matches. The latter are reachable without a mapper, through a
    /// container conversion.
    fn neighbours(&self, ty: &TypeKey) -> Vec<TypeKey> {
        let mut result: HashSet<TypeKey> = HashSet::new();
        if let Some(adjacent) = self.adjacency.get(ty) {
            result.extend(adjacent.keys().cloned());
        }
        for entry in self.adjacency.iter() {
            if entry.key().matches_format(ty) {
                result.insert(entry.key().clone());
            }
        }
        result.into_iter().collect()
    }

    fn vertex(&self, from: &TypeKey, into: &TypeKey) -> Option<Vertex> {
        self.adjacency.get(from).and_then(|map| map.get(into).cloned())
    }
}

/// Appends the upcast chain as resolved widening edges; every intermediate
/// vertex is marked strict.
fn extend_with_chain(mut path: Path, format: &Format, chain: &[ChainStep]) -> Path {
    for step in chain {
        let key = TypeKey::new(format.clone(), step.container).as_strict();
        path = path.add_resolved(key, step.upcast.clone());
    }
    path
}
