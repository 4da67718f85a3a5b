use std::collections::BTreeMap;
use std::fmt;

use super::kinds::{ClipWipe, Fade, NoTransition, Primitive3d, SlideMove};
use super::{Transition, TransitionContext, TransitionFamily, TransitionKind};

pub type TransitionConstructor = fn(&TransitionContext) -> Box<dyn Transition>;

/// Constructors keyed by transition kind.
#[derive(Clone, Default)]
pub struct TransitionRegistry {
    constructors: BTreeMap<TransitionKind, TransitionConstructor>,
}

impl fmt::Debug for TransitionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.constructors.keys()).finish()
    }
}

fn fade(ctx: &TransitionContext) -> Box<dyn Transition> {
    Box::new(Fade::new(ctx))
}

fn clip(ctx: &TransitionContext) -> Box<dyn Transition> {
    Box::new(ClipWipe::new(ctx))
}

fn slide_move(ctx: &TransitionContext) -> Box<dyn Transition> {
    Box::new(SlideMove::new(ctx))
}

fn primitive(ctx: &TransitionContext) -> Box<dyn Transition> {
    Box::new(Primitive3d::new(ctx))
}

impl TransitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry knowing every built-in kind.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for kind in TransitionKind::ALL {
            let constructor: Option<TransitionConstructor> = match kind.family() {
                TransitionFamily::None => None,
                TransitionFamily::Fade => Some(fade as TransitionConstructor),
                TransitionFamily::Clip => Some(clip as TransitionConstructor),
                TransitionFamily::Move => Some(slide_move as TransitionConstructor),
                TransitionFamily::Primitive3d => Some(primitive as TransitionConstructor),
            };
            if let Some(constructor) = constructor {
                registry.register(kind, constructor);
            }
        }
        registry
    }

    /// Add or replace the constructor for `kind`.
    pub fn register(&mut self, kind: TransitionKind, constructor: TransitionConstructor) {
        self.constructors.insert(kind, constructor);
    }

    pub fn contains(&self, kind: TransitionKind) -> bool {
        self.constructors.contains_key(&kind)
    }

    pub fn create(&self, ctx: &TransitionContext) -> Box<dyn Transition> {
        if ctx.kind == TransitionKind::NoTransition {
            return Box::new(NoTransition);
        }
        match self.constructors.get(&ctx.kind) {
            Some(constructor) => constructor(ctx),
            None => {
                tracing::warn!(kind = %ctx.kind, "no constructor registered for transition");
                Box::new(NoTransition)
            }
        }
    }
}
