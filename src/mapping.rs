//! Mappers — the edge payloads of the conversion graph — and the per-call
//! result type they produce.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::convert::ConversionResult;
use crate::graph::Edge;
use crate::model::TypeKey;

// ============================================================================
// Flags
// ============================================================================

/// Per-edge registration flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    /// Forbids using the edge when its source vertex was reached through an
    /// implicit widening step rather than being the type the caller asked
    /// for.
    StrictSubTypes,
}

pub(crate) type FlagSet = SmallVec<[Flag; 2]>;

// ============================================================================
// MappingResult
// ============================================================================

/// The result of a single mapper call.
#[derive(Debug, Clone, PartialEq)]
pub enum MappingResult<T> {
    /// The conversion succeeded and no information was discarded.
    Lossless(T),
    /// The conversion succeeded but discarded information.
    Lossy(T),
    /// The conversion failed for this value.
    Failure(String),
}

impl<T> MappingResult<T> {
    pub fn lossless(value: T) -> Self {
        MappingResult::Lossless(value)
    }

    pub fn lossy(value: T) -> Self {
        MappingResult::Lossy(value)
    }

    pub fn failure(message: impl Into<String>) -> Self {
        MappingResult::Failure(message.into())
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, MappingResult::Failure(_))
    }

    /// Maps the carried value, preserving the losslessness of the variant.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> MappingResult<U> {
        match self {
            MappingResult::Lossless(value) => MappingResult::Lossless(f(value)),
            MappingResult::Lossy(value) => MappingResult::Lossy(f(value)),
            MappingResult::Failure(message) => MappingResult::Failure(message),
        }
    }
}

/// Truncates a full conversion result to a per-call result, keeping only the
/// bare failure message. Used by mappers that recurse into
/// [`Bridge::convert`](crate::Bridge::convert).
impl<T> From<ConversionResult<T>> for MappingResult<T> {
    fn from(result: ConversionResult<T>) -> Self {
        match result {
            ConversionResult::Success { value, lossless: true } => MappingResult::Lossless(value),
            ConversionResult::Success { value, lossless: false } => MappingResult::Lossy(value),
            ConversionResult::Failure(error) => MappingResult::Failure(error.message().to_owned()),
        }
    }
}

// ============================================================================
// MappingContext
// ============================================================================

/// Read-only view of the conversion a mapper is running inside of: the full
/// edge path and the step currently being applied.
#[derive(Clone)]
pub struct MappingContext {
    pub(crate) path: Arc<[Edge]>,
    pub(crate) step: usize,
}

impl MappingContext {
    /// The source vertex of the whole path.
    pub fn source(&self) -> &TypeKey {
        self.path
            .first()
            .expect("a mapping context always carries a non-empty path")
            .source()
    }

    /// The destination vertex of the whole path.
    pub fn target(&self) -> &TypeKey {
        self.path
            .last()
            .expect("a mapping context always carries a non-empty path")
            .target()
    }

    /// The edge currently being applied.
    pub fn step(&self) -> &Edge {
        &self.path[self.step]
    }

    pub fn path(&self) -> &[Edge] {
        &self.path
    }
}

impl fmt::Debug for MappingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingContext")
            .field("source", self.source())
            .field("target", self.target())
            .field("step", &self.step)
            .finish()
    }
}

// ============================================================================
// Mapper — public construction
// ============================================================================

/// A conversion function between two types, one-directional or bidirectional.
///
/// Registering a bidirectional mapper inserts two one-directional edges into
/// the graph, one per direction.
pub struct Mapper<S, T> {
    pub(crate) kind: MapperKind,
    _marker: std::marker::PhantomData<fn(S) -> T>,
}

pub(crate) enum MapperKind {
    Uni(Arc<ErasedMapper>),
    Bi {
        forward: Arc<ErasedMapper>,
        reverse: Arc<ErasedMapper>,
    },
}

impl<S: 'static, T: 'static> Mapper<S, T> {
    /// A one-directional mapper. Losslessness is decided per call by the
    /// [`MappingResult`] variant the function returns.
    pub fn uni<F>(f: F) -> Self
    where
        F: Fn(S, &MappingContext) -> MappingResult<T> + Send + Sync + 'static,
    {
        Self::from_kind(MapperKind::Uni(erase(f, true)))
    }

    /// A one-directional mapper that never preserves all information: every
    /// `Lossless` result it returns is downgraded to `Lossy` by the engine.
    pub fn lossy<F>(f: F) -> Self
    where
        F: Fn(S, &MappingContext) -> MappingResult<T> + Send + Sync + 'static,
    {
        Self::from_kind(MapperKind::Uni(erase(f, false)))
    }

    /// A bidirectional mapper. Both directions are lossless by contract.
    pub fn bi<F, G>(from: F, into: G) -> Self
    where
        F: Fn(S, &MappingContext) -> MappingResult<T> + Send + Sync + 'static,
        G: Fn(T, &MappingContext) -> MappingResult<S> + Send + Sync + 'static,
    {
        Self::from_kind(MapperKind::Bi {
            forward: erase(from, true),
            reverse: erase(into, true),
        })
    }

    fn from_kind(kind: MapperKind) -> Self {
        Self { kind, _marker: std::marker::PhantomData }
    }
}

impl<S, T> Clone for Mapper<S, T> {
    fn clone(&self) -> Self {
        let kind = match &self.kind {
            MapperKind::Uni(m) => MapperKind::Uni(m.clone()),
            MapperKind::Bi { forward, reverse } => MapperKind::Bi {
                forward: forward.clone(),
                reverse: reverse.clone(),
            },
        };
        Self { kind, _marker: std::marker::PhantomData }
    }
}

// ============================================================================
// Erased internals
// ============================================================================

/// A value with its static type erased. Values never leave the calling
/// thread, so no `Send` bound is required.
pub(crate) type ErasedValue = Box<dyn Any>;

/// A type-erased one-directional mapper as stored in the graph. The closure
/// downcasts its input, runs the user function and re-boxes the output.
pub(crate) struct ErasedMapper {
    pub(crate) func:
        Box<dyn Fn(ErasedValue, &MappingContext) -> MappingResult<ErasedValue> + Send + Sync>,
    pub(crate) lossless: bool,
    /// Closure type name, used in cycle diagnostics.
    pub(crate) name: &'static str,
}

pub(crate) fn erase<S, T, F>(f: F, lossless: bool) -> Arc<ErasedMapper>
where
    S: 'static,
    T: 'static,
    F: Fn(S, &MappingContext) -> MappingResult<T> + Send + Sync + 'static,
{
    let name = type_name::<F>();
    let func = move |value: ErasedValue, context: &MappingContext| {
        let value = value.downcast::<S>().unwrap_or_else(|_| {
            panic!(
                "mapper '{name}' expected a '{}' input but received a different container; \
                 a registered supertype upcast likely returned the wrong type",
                type_name::<S>(),
            )
        });
        f(*value, context).map(|value| Box::new(value) as ErasedValue)
    };
    Arc::new(ErasedMapper { func: Box::new(func), lossless, name })
}

/// The identity upcast used for implicit widening edges.
pub(crate) fn identity_upcast<Sub, Base, F>(f: F) -> Arc<ErasedMapper>
where
    Sub: 'static,
    Base: 'static,
    F: Fn(Sub) -> Base + Send + Sync + 'static,
{
    erase(move |value: Sub, _: &MappingContext| MappingResult::Lossless(f(value)), true)
}
