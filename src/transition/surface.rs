use std::cell::RefCell;
use std::rc::Rc;

use kurbo::Vec2;
use serde::Serialize;

use crate::color::RgbColor;

use super::TransitionKind;

/// One rendered transition step, ready for a drawing backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "frame", rename_all = "kebab-case")]
pub enum TransitionFrame {
    Fade {
        kind: TransitionKind,
        progress: f64,
        leaving_opacity: f64,
        entering_opacity: f64,
        color: Option<RgbColor>,
    },
    Clip {
        kind: TransitionKind,
        /// Share of the entering slide uncovered by the clip shape.
        progress: f64,
        rotation: f64,
        scale: Vec2,
        flip_x: bool,
        flip_y: bool,
        inverted: bool,
        isotropic: bool,
    },
    Move {
        kind: TransitionKind,
        /// Offsets as fractions of the slide size; odd comb strips use the negated offsets.
        leaving_offset: Vec2,
        entering_offset: Vec2,
        strips: u32,
    },
    Primitive3d {
        kind: TransitionKind,
        progress: f64,
    },
}

impl TransitionFrame {
    pub fn kind(&self) -> TransitionKind {
        match self {
            Self::Fade { kind, .. }
            | Self::Clip { kind, .. }
            | Self::Move { kind, .. }
            | Self::Primitive3d { kind, .. } => *kind,
        }
    }
}

/// Where transitions draw. Provided by the host.
pub trait TransitionSurface {
    fn draw(&mut self, frame: &TransitionFrame);
}

pub type SurfaceRef = Rc<RefCell<dyn TransitionSurface>>;

/// Keeps every drawn frame; used for simulation and tests.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    frames: Vec<TransitionFrame>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[TransitionFrame] {
        &self.frames
    }

    /// Hand out the frames drawn since the last call.
    pub fn take(&mut self) -> Vec<TransitionFrame> {
        std::mem::take(&mut self.frames)
    }
}

impl TransitionSurface for RecordingSurface {
    fn draw(&mut self, frame: &TransitionFrame) {
        self.frames.push(frame.clone());
    }
}
