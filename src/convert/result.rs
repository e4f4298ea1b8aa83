//! The per-conversion result union and its failure diagnostics.

use std::fmt;
use std::sync::Arc;

use crate::graph::Edge;
use crate::model::TypeKey;

// ============================================================================
// ErrorKind
// ============================================================================

/// Classification of a failed conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The search exhausted the graph without connecting the two types.
    /// Recoverable by registering more mappers; never retried automatically.
    NoPathFound,
    /// A path was found but a mapper on it failed for this value.
    MappingFailed,
    /// A path was found and executed, but a step was lossy while a lossless
    /// conversion was demanded.
    NoLosslessConversion,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NoPathFound => "NO_PATH_FOUND",
            ErrorKind::MappingFailed => "MAPPING_FAILED",
            ErrorKind::NoLosslessConversion => "NO_LOSSLESS_CONVERSION",
        };
        write!(f, "{name}")
    }
}

// ============================================================================
// ConversionContext
// ============================================================================

/// Additional information about a conversion that failed mid-path: the full
/// edge path and the step at which it failed.
#[derive(Clone)]
pub struct ConversionContext {
    pub(crate) path: Arc<[Edge]>,
    pub(crate) step: usize,
}

impl ConversionContext {
    /// The source vertex of the whole path.
    pub fn source(&self) -> &TypeKey {
        self.path
            .first()
            .expect("a conversion context always carries a non-empty path")
            .source()
    }

    /// The destination vertex of the whole path.
    pub fn target(&self) -> &TypeKey {
        self.path
            .last()
            .expect("a conversion context always carries a non-empty path")
            .target()
    }

    /// The edge at which the conversion failed.
    pub fn step(&self) -> &Edge {
        &self.path[self.step]
    }

    pub fn path(&self) -> &[Edge] {
        &self.path
    }
}

impl fmt::Debug for ConversionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionContext")
            .field("source", self.source())
            .field("target", self.target())
            .field("step", &self.step)
            .finish()
    }
}

// ============================================================================
// ConversionError
// ============================================================================

/// A failed conversion: kind, message and, when the failure happened while
/// walking a path, the context describing where.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ConversionError {
    kind: ErrorKind,
    message: String,
    context: Option<ConversionContext>,
}

impl ConversionError {
    pub(crate) fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), context: None }
    }

    pub(crate) fn with_context(mut self, context: ConversionContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> Option<&ConversionContext> {
        self.context.as_ref()
    }

    /// A multi-line report showing the source/target pair, the error kind
    /// and message, the failing step and the full path with the failing hop
    /// marked. Aimed at debugging misconfigured graphs.
    pub fn detailed_message(&self) -> String {
        let Some(context) = &self.context else {
            return self.message.clone();
        };
        let step = context.step();
        let mut out = String::new();
        out.push_str(&format!(
            "Failed to convert from '{}' into '{}'\n",
            context.source(),
            context.target()
        ));
        out.push_str(&format!("Reason:\n     {}(message={})\n", self.kind, self.message));
        out.push_str(&format!("Step:\n     '{}' -> '{}'\n", step.source(), step.target()));
        out.push_str("Path:\n");
        for (index, edge) in context.path().iter().enumerate() {
            if index == context.step {
                out.push_str(&format!("  -> {}\n  -> {}\n", edge.source(), edge.target()));
            } else {
                out.push_str(&format!("     {}\n     {}\n", edge.source(), edge.target()));
            }
        }
        out
    }
}

// ============================================================================
// ConversionResult
// ============================================================================

/// The final result of a conversion.
#[derive(Debug)]
pub enum ConversionResult<T> {
    /// The value reached the target type; `lossless` is true only if every
    /// traversed mapper reported a lossless step.
    Success { value: T, lossless: bool },
    Failure(ConversionError),
}

impl<T> ConversionResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionResult::Success { .. })
    }

    /// The converted value, discarding losslessness information.
    pub fn value(self) -> Option<T> {
        match self {
            ConversionResult::Success { value, .. } => Some(value),
            ConversionResult::Failure(_) => None,
        }
    }

    pub fn into_result(self) -> Result<T, ConversionError> {
        match self {
            ConversionResult::Success { value, .. } => Ok(value),
            ConversionResult::Failure(error) => Err(error),
        }
    }

    pub fn error(&self) -> Option<&ConversionError> {
        match self {
            ConversionResult::Success { .. } => None,
            ConversionResult::Failure(error) => Some(error),
        }
    }
}

/// Equality ignores failure context: two failures with the same kind and
/// message compare equal regardless of the path they were produced on.
impl<T: PartialEq> PartialEq for ConversionResult<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                ConversionResult::Success { value: a, lossless: la },
                ConversionResult::Success { value: b, lossless: lb },
            ) => a == b && la == lb,
            (ConversionResult::Failure(a), ConversionResult::Failure(b)) => {
                a.kind == b.kind && a.message == b.message
            }
            _ => false,
        }
    }
}
