//! Slideplay schedules the animated parts of a slide show.
//!
//! A [`SlideShow`] owns one master clock and drives two queues from it:
//!
//! - a [`TimerEventQueue`] of callbacks keyed by activation time
//! - an [`ActivityQueue`] of running effects polled once per tick
//!
//! Slides come from a [`PresentationInfo`] document. Each slide may carry a
//! transition, rendered as [`TransitionFrame`]s onto a host surface, and a list
//! of effect nodes that animate element attributes.
#![forbid(unsafe_code)]

mod foundation;

pub mod activity;
pub mod animation;
pub mod clock;
pub mod color;
pub mod config;
pub mod element;
pub mod expression;
pub mod lerp;
pub mod presentation;
pub mod slideshow;
pub mod transition;

pub use crate::foundation::error::{SlideplayError, SlideplayResult};

pub use crate::activity::{Activity, ActivityQueue, ActivityRef, EventCallback, TimerEventQueue};
pub use crate::animation::{AnimationNode, AnimationNodeInfo, ElementSnapshot, SlideAnimations};
pub use crate::clock::{ElapsedTime, ManualTimeSource, SharedClock, SystemTimeSource, TimeSource};
pub use crate::color::{HslColor, RgbColor};
pub use crate::config::SlideShowConfig;
pub use crate::element::{AnimatedElement, Attribute, ElementState, ShapeInfo};
pub use crate::presentation::{MetaPresentation, MetaSlide, PresentationInfo, SlideDisplay, SlideInfo};
pub use crate::slideshow::SlideShow;
pub use crate::transition::{
    RecordingSurface, SlideTransition, SurfaceRef, TransitionFrame, TransitionKind,
    TransitionRegistry, TransitionSpec, TransitionSurface,
};
