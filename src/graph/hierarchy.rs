//! Declared supertype relations.
//!
//! Rust has no runtime class hierarchy to reflect over, so widening works on
//! relations the caller declares explicitly: "`Base` is a direct supertype of
//! `Sub`, and this function performs the upcast". The search traverses the
//! registry transitively wherever the conversion graph needs to widen a
//! vertex.

use std::collections::VecDeque;
use std::sync::Arc;

use dashmap::DashMap;
use hashbrown::HashSet;

use crate::mapping::ErasedMapper;
use crate::model::Container;

/// One hop up the declared hierarchy: the supertype container and the upcast
/// that carries a value into it.
#[derive(Clone)]
pub(crate) struct ChainStep {
    pub(crate) container: Container,
    pub(crate) upcast: Arc<ErasedMapper>,
}

pub(crate) struct Hierarchy {
    supers: DashMap<Container, Vec<ChainStep>>,
}

impl Hierarchy {
    pub(crate) fn new() -> Self {
        Self { supers: DashMap::new() }
    }

    /// Declares `sup` as a direct supertype of `sub`. Re-declaring an
    /// existing relation replaces its upcast.
    pub(crate) fn declare(&self, sub: Container, sup: Container, upcast: Arc<ErasedMapper>) {
        let mut entries = self.supers.entry(sub).or_default();
        if let Some(existing) = entries.iter_mut().find(|step| step.container == sup) {
            existing.upcast = upcast;
        } else {
            entries.push(ChainStep { container: sup, upcast });
        }
    }

    /// The upcast chain from `sub` up to `sup`, if `sup` is a transitive
    /// supertype. `Some(vec![])` when the containers are equal. The registry
    /// walk guards against cyclic declarations.
    pub(crate) fn chain(&self, sub: Container, sup: Container) -> Option<Vec<ChainStep>> {
        if sub == sup {
            return Some(Vec::new());
        }
        self.walk(sub)
            .into_iter()
            .find(|(container, _)| *container == sup)
            .map(|(_, chain)| chain)
    }

    /// Every transitive supertype of `from` with the shortest upcast chain
    /// leading to it, in breadth-first order.
    pub(crate) fn walk(&self, from: Container) -> Vec<(Container, Vec<ChainStep>)> {
        let mut result = Vec::new();
        let mut visited: HashSet<Container> = HashSet::new();
        visited.insert(from);
        let mut queue: VecDeque<(Container, Vec<ChainStep>)> = VecDeque::new();
        queue.push_back((from, Vec::new()));

        while let Some((current, chain)) = queue.pop_front() {
            let Some(entries) = self.supers.get(&current) else {
                continue;
            };
            for step in entries.iter() {
                if !visited.insert(step.container) {
                    continue;
                }
                let mut next = chain.clone();
                next.push(step.clone());
                result.push((step.container, next.clone()));
                queue.push_back((step.container, next));
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::identity_upcast;

    struct Sub;
    struct Base;
    struct Root;

    fn hierarchy() -> Hierarchy {
        let h = Hierarchy::new();
        h.declare(
            Container::of::<Sub>(),
            Container::of::<Base>(),
            identity_upcast(|_: Sub| Base),
        );
        h.declare(
            Container::of::<Base>(),
            Container::of::<Root>(),
            identity_upcast(|_: Base| Root),
        );
        h
    }

    #[test]
    fn test_transitive_chain() {
        let h = hierarchy();
        let chain = h.chain(Container::of::<Sub>(), Container::of::<Root>()).unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].container, Container::of::<Base>());
        assert_eq!(chain[1].container, Container::of::<Root>());
    }

    #[test]
    fn test_chain_to_self_is_empty() {
        let h = hierarchy();
        let chain = h.chain(Container::of::<Sub>(), Container::of::<Sub>()).unwrap();
        assert!(chain.is_empty());
    }

    #[test]
    fn test_unrelated_containers_have_no_chain() {
        let h = hierarchy();
        assert!(h.chain(Container::of::<Base>(), Container::of::<Sub>()).is_none());
        assert!(h.chain(Container::of::<String>(), Container::of::<Root>()).is_none());
    }

    #[test]
    fn test_walk_lists_all_supertypes() {
        let h = hierarchy();
        let walked = h.walk(Container::of::<Sub>());
        let containers: Vec<Container> = walked.iter().map(|(c, _)| *c).collect();
        assert_eq!(containers, vec![Container::of::<Base>(), Container::of::<Root>()]);
    }

    #[test]
    fn test_cyclic_declaration_terminates() {
        let h = hierarchy();
        h.declare(
            Container::of::<Root>(),
            Container::of::<Sub>(),
            identity_upcast(|_: Root| Sub),
        );
        // must not loop forever
        assert_eq!(h.walk(Container::of::<Sub>()).len(), 2);
    }
}
