use kurbo::Vec2;

use crate::color::RgbColor;

use super::info::{DEFAULT_CLIP, TransitionInfo, TransitionReverseMethod};
use super::{Transition, TransitionContext, TransitionFrame, TransitionKind, TransitionSubType};

const COMB_STRIPS: u32 = 8;

/// Draws nothing. Stands in for unsupported transitions.
#[derive(Debug, Default)]
pub struct NoTransition;

impl Transition for NoTransition {
    fn kind(&self) -> TransitionKind {
        TransitionKind::NoTransition
    }

    fn frame(&self, _progress: f64) -> Option<TransitionFrame> {
        None
    }
}

#[derive(Debug)]
pub struct Fade {
    kind: TransitionKind,
    color: Option<RgbColor>,
}

impl Fade {
    pub fn new(ctx: &TransitionContext) -> Self {
        Self {
            kind: ctx.kind,
            color: (ctx.kind == TransitionKind::FadeOverColor).then_some(ctx.fade_color),
        }
    }
}

impl Transition for Fade {
    fn kind(&self) -> TransitionKind {
        self.kind
    }

    fn frame(&self, progress: f64) -> Option<TransitionFrame> {
        // Over a color the leaving slide is gone by half time.
        let (leaving_opacity, entering_opacity) = match self.color {
            Some(_) => (
                (1.0 - 2.0 * progress).max(0.0),
                (2.0 * progress - 1.0).max(0.0),
            ),
            None => (1.0, progress),
        };
        Some(TransitionFrame::Fade {
            kind: self.kind,
            progress,
            leaving_opacity,
            entering_opacity,
            color: self.color,
        })
    }
}

/// 2D wipe revealing the entering slide through a growing clip shape.
#[derive(Debug)]
pub struct ClipWipe {
    kind: TransitionKind,
    info: TransitionInfo,
    rotation: f64,
    reverse: bool,
}

impl ClipWipe {
    pub fn new(ctx: &TransitionContext) -> Self {
        let info = ctx.info.unwrap_or(DEFAULT_CLIP);
        let start_angle = match ctx.subtype {
            TransitionSubType::ClockwiseThree => 90.0,
            TransitionSubType::ClockwiseSix => 180.0,
            TransitionSubType::ClockwiseNine => 270.0,
            _ => 0.0,
        };
        Self {
            kind: ctx.kind,
            rotation: info.rotation_angle + start_angle,
            info,
            reverse: ctx.reverse,
        }
    }
}

impl Transition for ClipWipe {
    fn kind(&self) -> TransitionKind {
        self.kind
    }

    fn frame(&self, progress: f64) -> Option<TransitionFrame> {
        let mut progress = progress;
        let mut rotation = self.rotation;
        let (mut flip_x, mut flip_y, mut inverted) = (false, false, false);
        if self.reverse {
            match self.info.reverse_method {
                TransitionReverseMethod::Ignore => {}
                TransitionReverseMethod::SubtractAndInvert => {
                    progress = 1.0 - progress;
                    inverted = true;
                }
                TransitionReverseMethod::Rotate180 => rotation += 180.0,
                TransitionReverseMethod::FlipX => flip_x = true,
                TransitionReverseMethod::FlipY => flip_y = true,
            }
        }
        Some(TransitionFrame::Clip {
            kind: self.kind,
            progress,
            rotation,
            scale: Vec2::new(self.info.scale_x, self.info.scale_y),
            flip_x,
            flip_y,
            inverted,
            isotropic: self.info.scale_isotropically,
        })
    }
}

/// Push, cover, uncover and comb: slides moving across the screen.
#[derive(Debug)]
pub struct SlideMove {
    kind: TransitionKind,
    direction: Vec2,
    strips: u32,
}

impl SlideMove {
    pub fn new(ctx: &TransitionContext) -> Self {
        let direction = match ctx.subtype {
            TransitionSubType::FromRight => Vec2::new(-1.0, 0.0),
            TransitionSubType::FromTop | TransitionSubType::CombVertical => Vec2::new(0.0, 1.0),
            TransitionSubType::FromBottom => Vec2::new(0.0, -1.0),
            _ => Vec2::new(1.0, 0.0),
        };
        Self {
            kind: ctx.kind,
            direction: if ctx.reverse { -direction } else { direction },
            strips: if ctx.kind == TransitionKind::Comb {
                COMB_STRIPS
            } else {
                1
            },
        }
    }
}

impl Transition for SlideMove {
    fn kind(&self) -> TransitionKind {
        self.kind
    }

    fn frame(&self, progress: f64) -> Option<TransitionFrame> {
        let d = self.direction;
        let (leaving_offset, entering_offset) = match self.kind {
            TransitionKind::Cover => (Vec2::ZERO, d * (progress - 1.0)),
            TransitionKind::Uncover => (d * progress, Vec2::ZERO),
            _ => (d * progress, d * (progress - 1.0)),
        };
        Some(TransitionFrame::Move {
            kind: self.kind,
            leaving_offset,
            entering_offset,
            strips: self.strips,
        })
    }
}

/// 3D scene transitions; the backend owns the geometry.
#[derive(Debug)]
pub struct Primitive3d {
    kind: TransitionKind,
    reverse: bool,
}

impl Primitive3d {
    pub fn new(ctx: &TransitionContext) -> Self {
        Self {
            kind: ctx.kind,
            reverse: ctx.reverse,
        }
    }
}

impl Transition for Primitive3d {
    fn kind(&self) -> TransitionKind {
        self.kind
    }

    fn frame(&self, progress: f64) -> Option<TransitionFrame> {
        Some(TransitionFrame::Primitive3d {
            kind: self.kind,
            progress: if self.reverse {
                1.0 - progress
            } else {
                progress
            },
        })
    }
}
