//! Stable integer ids for the literal nodes of one parsed file.
//!
//! Ids are assigned in source order during a single numbering pass, so the
//! template pass and the literal pass agree on node identity without holding
//! references into the AST.

use std::collections::{HashMap, HashSet};

use swc_common::Span;
use swc_ecma_ast::{Module, Str, Tpl};
use swc_ecma_visit::{Visit, VisitWith};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Literal nodes of one file, keyed by span.
#[derive(Debug, Default)]
pub struct NodeArena {
    ids: HashMap<(u32, u32), NodeId>,
    consumed: HashSet<NodeId>,
}

impl NodeArena {
    pub fn build(module: &Module) -> Self {
        let mut numbering = Numbering::default();
        module.visit_with(&mut numbering);
        Self {
            ids: numbering.ids,
            consumed: HashSet::new(),
        }
    }

    pub fn id_of(&self, span: Span) -> Option<NodeId> {
        self.ids.get(&(span.lo.0, span.hi.0)).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Mark the literal at `span` as handled; later passes skip it.
    pub fn consume(&mut self, span: Span) {
        if let Some(id) = self.id_of(span) {
            self.consumed.insert(id);
        }
    }

    pub fn is_consumed(&self, span: Span) -> bool {
        self.id_of(span)
            .is_some_and(|id| self.consumed.contains(&id))
    }
}

#[derive(Default)]
struct Numbering {
    ids: HashMap<(u32, u32), NodeId>,
}

impl Numbering {
    fn assign(&mut self, span: Span) {
        let next = NodeId(self.ids.len() as u32);
        self.ids.entry((span.lo.0, span.hi.0)).or_insert(next);
    }
}

impl Visit for Numbering {
    fn visit_str(&mut self, node: &Str) {
        self.assign(node.span);
    }

    fn visit_tpl(&mut self, node: &Tpl) {
        self.assign(node.span);
        node.visit_children_with(self);
    }
}
