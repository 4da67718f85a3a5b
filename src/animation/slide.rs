use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Serialize;

use crate::activity::{ActivityQueue, TimerEventQueue};
use crate::element::{AnimatedElement, ElementRef, ElementState, ShapeInfo};

use super::node::{AnimationNode, AnimationNodeInfo, NodeContext, NodeRef, NodeState};

/// Element state as seen from outside, keyed by shape hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementSnapshot {
    pub hash: String,
    pub animated: bool,
    #[serde(flatten)]
    pub state: ElementState,
}

/// Elements and animation nodes of one slide.
#[derive(Debug)]
pub struct SlideAnimations {
    hash: String,
    shapes: Vec<String>,
    elements: BTreeMap<String, ElementRef>,
    nodes: Vec<NodeRef>,
}

impl SlideAnimations {
    #[tracing::instrument(skip(shapes, infos, ctx), fields(shapes = shapes.len(), nodes = infos.len()))]
    pub fn new(
        hash: &str,
        shapes: &[ShapeInfo],
        infos: &[AnimationNodeInfo],
        ctx: &NodeContext,
    ) -> Self {
        let mut elements = BTreeMap::new();
        let mut order = Vec::with_capacity(shapes.len());
        for shape in shapes {
            if elements.contains_key(&shape.hash) {
                tracing::warn!(slide = hash, shape = %shape.hash, "duplicate shape hash ignored");
                continue;
            }
            let element = AnimatedElement::from_shape(shape, ctx.slide_size).into_ref();
            elements.insert(shape.hash.clone(), element);
            order.push(shape.hash.clone());
        }

        let nodes: Vec<NodeRef> = infos
            .iter()
            .enumerate()
            .map(|(i, info)| Rc::new(AnimationNode::parse(i, info, ctx, &elements)))
            .collect();
        for node in &nodes {
            node.init();
        }

        let valid = nodes.iter().filter(|n| n.is_valid()).count();
        tracing::debug!(slide = hash, valid, total = nodes.len(), "slide animations parsed");
        Self {
            hash: hash.to_owned(),
            shapes: order,
            elements,
            nodes,
        }
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Whether at least one node can run.
    pub fn is_animated(&self) -> bool {
        self.nodes.iter().any(|n| n.is_valid())
    }

    pub fn nodes(&self) -> &[NodeRef] {
        &self.nodes
    }

    pub fn element(&self, hash: &str) -> Option<&ElementRef> {
        self.elements.get(hash)
    }

    /// Elements in descriptor order.
    pub fn elements(&self) -> impl Iterator<Item = &ElementRef> {
        self.shapes.iter().filter_map(|h| self.elements.get(h))
    }

    /// Put every element back to its loaded state, then activate every valid
    /// node or schedule it for its begin offset. Returns how many were started.
    pub fn start(&self, queue: &mut ActivityQueue, events: &mut TimerEventQueue) -> usize {
        for element in self.elements.values() {
            element.borrow_mut().reset();
        }
        let started = self
            .nodes
            .iter()
            .filter(|node| node.is_valid())
            .filter(|node| node.resolve(queue, events))
            .count();
        tracing::debug!(slide = %self.hash, started, "slide animations started");
        started
    }

    /// Jump every running or scheduled node to its final state.
    pub fn end(&self, queue: &mut ActivityQueue, events: &mut TimerEventQueue) {
        for node in &self.nodes {
            if node.cancel_begin() {
                node.activate(queue);
            }
            node.end(events);
        }
    }

    /// No node is still running or waiting to begin.
    pub fn all_finished(&self) -> bool {
        self.nodes
            .iter()
            .all(|n| n.state() != NodeState::Active && !n.is_scheduled())
    }

    pub fn has_started(&self) -> bool {
        self.nodes.iter().any(|n| {
            n.is_scheduled()
                || matches!(
                    n.state(),
                    NodeState::Active | NodeState::Frozen | NodeState::Ended
                )
        })
    }

    /// Undo every node, last started first, and reload the elements.
    pub fn rewind(&self) {
        for node in self.nodes.iter().rev() {
            node.rewind();
        }
        for element in self.elements.values() {
            element.borrow_mut().reset();
        }
    }

    pub fn dispose(&self) {
        for node in &self.nodes {
            node.dispose();
        }
    }

    pub fn snapshot(&self) -> Vec<ElementSnapshot> {
        self.shapes
            .iter()
            .filter_map(|hash| {
                let element = self.elements.get(hash)?.borrow();
                Some(ElementSnapshot {
                    hash: hash.clone(),
                    animated: element.is_animated(),
                    state: element.state().clone(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/slide.rs"]
mod tests;
