//! # typebridge — A Generic Value-Conversion Engine
//!
//! Converts values between arbitrary Rust types over a directed graph of
//! user-registered mappers, with automatic multi-hop path discovery.
//!
//! ## Design Principles
//!
//! 1. **Types are vertices**: a [`Type`] is a format plus a container; mappers
//!    are the edges between them
//! 2. **Paths are discovered, not declared**: registering `A -> B` and
//!    `B -> C` makes `A -> C` convertible
//! 3. **Losslessness is tracked per value**: every step reports whether it
//!    discarded information, and callers can demand fully lossless routes
//! 4. **Failures are values, faults are panics**: a value that cannot be
//!    converted yields a [`ConversionResult::Failure`]; a misconfigured graph
//!    (duplicate routes, cycling mappers) panics
//!
//! ## Quick Start
//!
//! ```rust
//! use typebridge::{Bridge, Mapper, MappingResult, Type};
//!
//! let bridge = Bridge::builder().no_default_bundles().build();
//! bridge.register(
//!     Type::<u16>::of(),
//!     Type::<u32>::of(),
//!     Mapper::uni(|port: u16, _| MappingResult::Lossless(u32::from(port))),
//! );
//!
//! let result = bridge.convert(8080u16, &Type::<u16>::of(), &Type::<u32>::of());
//! assert_eq!(result.value(), Some(8080));
//! ```
//!
//! ## Built-in Bundles
//!
//! | Bundle | Contents |
//! |--------|----------|
//! | [`DefaultBundle::WideningNumeric`] | Exact numeric widenings, lossless |
//! | [`DefaultBundle::NarrowingNumeric`] | Range-checked numeric narrowings |
//! | [`DefaultBundle::Strings`] | Number/string parsing, `String` ↔ `Vec<char>` |

// ============================================================================
// Modules
// ============================================================================

pub mod builder;
pub mod convert;
pub mod mapping;
pub mod model;

mod defaults;
mod graph;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::{BridgeBuilder, BridgeConfig, ConflictStrategy, DefaultBundle};
pub use convert::{ConversionContext, ConversionError, ConversionResult, ErrorKind};
pub use graph::{Edge, MapperRef};
pub use mapping::{Flag, Mapper, MappingContext, MappingResult};
pub use model::{Container, Format, Type, TypeKey};

use graph::Graph;
use model::TypeKey as Key;

// ============================================================================
// Bridge
// ============================================================================

/// The conversion engine. Thread-safe; registration and conversion may run
/// concurrently from any number of threads.
pub struct Bridge {
    graph: Graph,
    default_strategy: ConflictStrategy,
}

impl Bridge {
    /// An engine with the default configuration: all built-in bundles, a
    /// path cache of 1000 routes and the [`ConflictStrategy::Fail`] policy.
    pub fn new() -> Self {
        Self::with_config(BridgeConfig::default())
    }

    pub fn builder() -> BridgeBuilder {
        BridgeBuilder::default()
    }

    /// An engine built from an explicit configuration, e.g. one deserialized
    /// from a file. [`Bridge::builder`] is the ergonomic front end.
    pub fn with_config(config: BridgeConfig) -> Self {
        let bridge = Self {
            graph: Graph::new(config.cache_size),
            default_strategy: config.conflict_strategy,
        };
        for bundle in config.bundles {
            defaults::register_bundle(&bridge, bundle);
        }
        bridge
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Registers a mapper for the route `from -> into` under the configured
    /// default conflict strategy. A bidirectional mapper also registers the
    /// reverse route.
    ///
    /// # Panics
    ///
    /// Under [`ConflictStrategy::Fail`], if the route already has a mapper.
    pub fn register<S: 'static, T: 'static>(
        &self,
        from: Type<S>,
        into: Type<T>,
        mapper: Mapper<S, T>,
    ) {
        self.register_with(from, into, mapper, self.default_strategy, &[]);
    }

    /// Registers a mapper with an explicit conflict strategy and edge flags.
    pub fn register_with<S: 'static, T: 'static>(
        &self,
        from: Type<S>,
        into: Type<T>,
        mapper: Mapper<S, T>,
        strategy: ConflictStrategy,
        flags: &[Flag],
    ) {
        self.graph
            .register(from.key().clone(), into.key().clone(), mapper.kind, strategy, flags);
    }

    /// Declares `Base` a supertype of `Sub`, enabling implicit widening
    /// during path discovery. The upcast runs whenever a search steps from a
    /// `Sub` vertex up to a `Base` vertex; it must be lossless.
    ///
    /// Re-declaring the same pair replaces the upcast.
    pub fn register_supertype<Sub: 'static, Base: 'static>(
        &self,
        upcast: impl Fn(Sub) -> Base + Send + Sync + 'static,
    ) {
        self.graph.declare_supertype(
            Container::of::<Sub>(),
            Container::of::<Base>(),
            mapping::identity_upcast(upcast),
        );
    }

    /// Starts a fluent registration from a single source type.
    pub fn from<S: 'static>(&self, from: Type<S>) -> MappingAction<'_, S> {
        MappingAction { bridge: self, sources: vec![from] }
    }

    /// Starts a fluent registration from several source types at once; each
    /// `into` call registers the mapper for every source.
    pub fn from_all<S: 'static>(
        &self,
        sources: impl IntoIterator<Item = Type<S>>,
    ) -> MappingAction<'_, S> {
        MappingAction { bridge: self, sources: sources.into_iter().collect() }
    }

    // ========================================================================
    // Conversion
    // ========================================================================

    /// Converts a value, allowing lossy steps. The result records whether
    /// the traversed route was lossless for this value.
    pub fn convert<S: 'static, T: 'static>(
        &self,
        value: S,
        from: &Type<S>,
        into: &Type<T>,
    ) -> ConversionResult<T> {
        self.convert_internal(value, from, into, false)
    }

    /// Converts a value, failing with [`ErrorKind::NoLosslessConversion`] if
    /// any step on the route reports a lossy result for this value.
    pub fn convert_lossless<S: 'static, T: 'static>(
        &self,
        value: S,
        from: &Type<S>,
        into: &Type<T>,
    ) -> ConversionResult<T> {
        self.convert_internal(value, from, into, true)
    }

    fn convert_internal<S: 'static, T: 'static>(
        &self,
        value: S,
        from: &Type<S>,
        into: &Type<T>,
        lossless: bool,
    ) -> ConversionResult<T> {
        match convert::convert_erased(&self.graph, Box::new(value), from.key(), into.key(), lossless)
        {
            ConversionResult::Success { value, lossless } => {
                let value = value.downcast::<T>().unwrap_or_else(|_| {
                    panic!(
                        "conversion from '{from}' into '{into}' produced a value of the wrong \
                         container; a mapper on the route was registered for the wrong types"
                    )
                });
                ConversionResult::Success { value: *value, lossless }
            }
            ConversionResult::Failure(error) => ConversionResult::Failure(error),
        }
    }

    /// Whether a conversion route exists between the two types. Any route
    /// relying on a format-equivalence shortcut only counts if the underlying
    /// container conversion exists as well.
    pub fn exists_path<S: 'static, T: 'static>(&self, from: &Type<S>, into: &Type<T>) -> bool {
        self.exists_path_keys(from.key(), into.key())
    }

    fn exists_path_keys(&self, from: &Key, into: &Key) -> bool {
        if from == into {
            return true;
        }
        let path = self.graph.path(from, into);
        if path.is_empty() {
            return false;
        }
        path.iter().all(|edge| match edge {
            Edge::Resolved { .. } => true,
            Edge::Unresolved { from, into } => self.exists_path_keys(
                &Key::bare(from.container()),
                &Key::bare(into.container()),
            ),
        })
    }

    /// Resizes the route cache. All cached routes are discarded.
    pub fn adjust_cache_size(&self, capacity: usize) {
        self.graph.adjust_cache_size(capacity);
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// MappingAction — fluent registration
// ============================================================================

/// In-flight fluent registration started by [`Bridge::from`] or
/// [`Bridge::from_all`]. Each `into` call registers one route per source.
pub struct MappingAction<'b, S> {
    bridge: &'b Bridge,
    sources: Vec<Type<S>>,
}

impl<'b, S: 'static> MappingAction<'b, S> {
    /// Registers the mapper towards `target` under the engine's default
    /// conflict strategy and returns `self` for further `into` calls.
    pub fn into<T: 'static>(self, target: Type<T>, mapper: Mapper<S, T>) -> Self {
        let strategy = self.bridge.default_strategy;
        self.into_with(target, mapper, strategy, &[])
    }

    /// Registers the mapper towards `target` with an explicit strategy and
    /// flags.
    pub fn into_with<T: 'static>(
        self,
        target: Type<T>,
        mapper: Mapper<S, T>,
        strategy: ConflictStrategy,
        flags: &[Flag],
    ) -> Self {
        for source in &self.sources {
            self.bridge
                .register_with(source.clone(), target.clone(), mapper.clone(), strategy, flags);
        }
        self
    }
}
