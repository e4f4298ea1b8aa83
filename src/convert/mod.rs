//! The conversion engine: walks a discovered path, applies mappers and
//! enforces lossless semantics.

mod result;

pub use result::{ConversionContext, ConversionError, ConversionResult, ErrorKind};

use std::cell::RefCell;
use std::sync::Arc;

use tracing::trace;

use crate::graph::{Edge, Graph};
use crate::mapping::{ErasedMapper, ErasedValue, MappingContext, MappingResult};
use crate::model::TypeKey;

// ============================================================================
// Cycle detection
// ============================================================================

// Per-thread stack of in-flight mappers. A mapper recursing into `convert`
// for an unrelated route is fine; literal re-entry into the same
// still-executing mapper instance is a registration bug and faults. Cycles
// spanning cooperating threads are not detected.
thread_local! {
    static CALL_STACK: RefCell<Vec<StackEntry>> = const { RefCell::new(Vec::new()) };
}

struct StackEntry {
    id: usize,
    name: &'static str,
}

struct StackGuard;

impl Drop for StackGuard {
    fn drop(&mut self) {
        CALL_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Converts an erased value between two vertices, optionally demanding that
/// no step discards information.
pub(crate) fn convert_erased(
    graph: &Graph,
    value: ErasedValue,
    source: &TypeKey,
    target: &TypeKey,
    lossless: bool,
) -> ConversionResult<ErasedValue> {
    if source == target {
        return ConversionResult::Success { value, lossless: true };
    }

    let path = graph.path(source, target);
    if path.is_empty() {
        return ConversionResult::Failure(ConversionError::new(
            ErrorKind::NoPathFound,
            format!("no path found to convert from '{source}' into '{target}'"),
        ));
    }
    trace!(%source, %target, hops = path.len(), "executing conversion path");

    let context_at = |step: usize| ConversionContext { path: path.clone(), step };

    let mut value = value;
    let mut all_lossless = true;
    for (index, edge) in path.iter().enumerate() {
        let step_result = match edge {
            Edge::Resolved { mapper, .. } => {
                let context = MappingContext { path: path.clone(), step: index };
                apply_mapper(&mapper.0, value, &context)
            }
            Edge::Unresolved { from, into } => {
                // Format-equivalent hop: recurse on the container types with
                // the formats stripped, same lossless flag. An inner failure
                // keeps its kind and message, with this path as context.
                let inner_source = TypeKey::bare(from.container());
                let inner_target = TypeKey::bare(into.container());
                match convert_erased(graph, value, &inner_source, &inner_target, lossless) {
                    ConversionResult::Success { value, lossless: true } => {
                        MappingResult::Lossless(value)
                    }
                    ConversionResult::Success { value, lossless: false } => {
                        MappingResult::Lossy(value)
                    }
                    ConversionResult::Failure(error) => {
                        return ConversionResult::Failure(
                            ConversionError::new(error.kind(), error.message())
                                .with_context(context_at(index)),
                        );
                    }
                }
            }
        };

        match step_result {
            MappingResult::Lossless(next) => value = next,
            MappingResult::Lossy(next) => {
                // The mapper call already happened; in lossless mode only
                // the outcome is downgraded to a failure.
                if lossless {
                    return ConversionResult::Failure(
                        ConversionError::new(
                            ErrorKind::NoLosslessConversion,
                            format!(
                                "the mapper for step '{}' -> '{}' is not lossless",
                                edge.source(),
                                edge.target()
                            ),
                        )
                        .with_context(context_at(index)),
                    );
                }
                all_lossless = false;
                value = next;
            }
            MappingResult::Failure(message) => {
                return ConversionResult::Failure(
                    ConversionError::new(ErrorKind::MappingFailed, message)
                        .with_context(context_at(index)),
                );
            }
        }
    }

    ConversionResult::Success { value, lossless: all_lossless }
}

/// Invokes a single mapper with cycle detection. Mappers registered with a
/// lossy tag have their `Lossless` results downgraded here.
fn apply_mapper(
    mapper: &Arc<ErasedMapper>,
    value: ErasedValue,
    context: &MappingContext,
) -> MappingResult<ErasedValue> {
    let id = Arc::as_ptr(mapper) as usize;
    CALL_STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        if stack.iter().any(|entry| entry.id == id) {
            let step = context.step();
            let chain = stack
                .iter()
                .rev()
                .map(|entry| entry.name)
                .collect::<Vec<_>>()
                .join("\n      was called by ");
            panic!(
                "cannot convert from '{}' into '{}' because of cycling mapper invocation!\n   \
                 -> {}\n      was called by {}",
                step.source(),
                step.target(),
                mapper.name,
                chain,
            );
        }
        stack.push(StackEntry { id, name: mapper.name });
    });
    let _guard = StackGuard;
    let result = (mapper.func)(value, context);

    if mapper.lossless {
        result
    } else {
        match result {
            MappingResult::Lossless(value) => MappingResult::Lossy(value),
            other => other,
        }
    }
}
