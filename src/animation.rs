//! Per-shape effects: declarative animation nodes turned into activities.

pub(crate) mod factory;
pub mod node;
pub mod slide;
pub mod value;

pub use self::node::{
    AnimationNode, AnimationNodeInfo, FillMode, NodeContext, NodeKind, NodeRef, NodeState,
    NodeTiming, Scalar, parse_duration,
};
pub use self::slide::{ElementSnapshot, SlideAnimations};
pub use self::value::{CalcMode, ColorSpace, Interpolator, PropertyValue, ValueType};
