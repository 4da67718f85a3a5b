//! Slide transitions: descriptor parsing, kind selection and the activity
//! that drives a transition's progress.

mod info;
mod kinds;
mod registry;
mod surface;

pub use self::info::{TransitionClass, TransitionInfo, TransitionReverseMethod, transition_info};
pub use self::kinds::{ClipWipe, Fade, NoTransition, Primitive3d, SlideMove};
pub use self::registry::{TransitionConstructor, TransitionRegistry};
pub use self::surface::{RecordingSurface, SurfaceRef, TransitionFrame, TransitionSurface};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::activity::{
    Activity, ActivityHook, ActivityParams, ActivityRef, Frame, RepeatCount, TimingMode,
};
use crate::clock::SharedClock;
use crate::color::RgbColor;

/// Used when a descriptor has no usable duration.
pub const DEFAULT_TRANSITION_DURATION: f64 = 0.001;

fn normalized_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionType {
    BarWipe,
    BarnDoorWipe,
    BlindsWipe,
    CheckerBoardWipe,
    ClockWipe,
    Dissolve,
    EllipseWipe,
    Fade,
    FanWipe,
    FourBoxWipe,
    IrisWipe,
    MiscShapeWipe,
    PinWheelWipe,
    PushWipe,
    RandomBarWipe,
    SlideWipe,
    WaterfallWipe,
}

impl TransitionType {
    pub const ALL: [TransitionType; 17] = [
        Self::BarWipe,
        Self::BarnDoorWipe,
        Self::BlindsWipe,
        Self::CheckerBoardWipe,
        Self::ClockWipe,
        Self::Dissolve,
        Self::EllipseWipe,
        Self::Fade,
        Self::FanWipe,
        Self::FourBoxWipe,
        Self::IrisWipe,
        Self::MiscShapeWipe,
        Self::PinWheelWipe,
        Self::PushWipe,
        Self::RandomBarWipe,
        Self::SlideWipe,
        Self::WaterfallWipe,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::BarWipe => "barWipe",
            Self::BarnDoorWipe => "barnDoorWipe",
            Self::BlindsWipe => "blindsWipe",
            Self::CheckerBoardWipe => "checkerBoardWipe",
            Self::ClockWipe => "clockWipe",
            Self::Dissolve => "dissolve",
            Self::EllipseWipe => "ellipseWipe",
            Self::Fade => "fade",
            Self::FanWipe => "fanWipe",
            Self::FourBoxWipe => "fourBoxWipe",
            Self::IrisWipe => "irisWipe",
            Self::MiscShapeWipe => "miscShapeWipe",
            Self::PinWheelWipe => "pinWheelWipe",
            Self::PushWipe => "pushWipe",
            Self::RandomBarWipe => "randomBarWipe",
            Self::SlideWipe => "slideWipe",
            Self::WaterfallWipe => "waterfallWipe",
        }
    }

    /// Case-insensitive; `-`, `_` and spaces are ignored.
    pub fn parse(name: &str) -> Option<Self> {
        let name = normalized_name(name);
        Self::ALL
            .into_iter()
            .find(|t| normalized_name(t.name()) == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionSubType {
    Default,
    CrossFade,
    FadeOverColor,
    LeftToRight,
    TopToBottom,
    Vertical,
    Horizontal,
    Down,
    Across,
    Circle,
    Rectangle,
    Diamond,
    Heart,
    CenterTop,
    CornersIn,
    CornersOut,
    OneBlade,
    TwoBladeVertical,
    ThreeBlade,
    FourBlade,
    EightBlade,
    FromLeft,
    FromTop,
    FromRight,
    FromBottom,
    CombHorizontal,
    CombVertical,
    HorizontalLeft,
    HorizontalRight,
    ClockwiseTwelve,
    ClockwiseThree,
    ClockwiseSix,
    ClockwiseNine,
    TopLeft,
    TopCenter,
    BottomRight,
    BottomLeft,
    FanOutHorizontal,
}

impl TransitionSubType {
    pub const ALL: [TransitionSubType; 38] = [
        Self::Default,
        Self::CrossFade,
        Self::FadeOverColor,
        Self::LeftToRight,
        Self::TopToBottom,
        Self::Vertical,
        Self::Horizontal,
        Self::Down,
        Self::Across,
        Self::Circle,
        Self::Rectangle,
        Self::Diamond,
        Self::Heart,
        Self::CenterTop,
        Self::CornersIn,
        Self::CornersOut,
        Self::OneBlade,
        Self::TwoBladeVertical,
        Self::ThreeBlade,
        Self::FourBlade,
        Self::EightBlade,
        Self::FromLeft,
        Self::FromTop,
        Self::FromRight,
        Self::FromBottom,
        Self::CombHorizontal,
        Self::CombVertical,
        Self::HorizontalLeft,
        Self::HorizontalRight,
        Self::ClockwiseTwelve,
        Self::ClockwiseThree,
        Self::ClockwiseSix,
        Self::ClockwiseNine,
        Self::TopLeft,
        Self::TopCenter,
        Self::BottomRight,
        Self::BottomLeft,
        Self::FanOutHorizontal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::CrossFade => "crossfade",
            Self::FadeOverColor => "fadeOverColor",
            Self::LeftToRight => "leftToRight",
            Self::TopToBottom => "topToBottom",
            Self::Vertical => "vertical",
            Self::Horizontal => "horizontal",
            Self::Down => "down",
            Self::Across => "across",
            Self::Circle => "circle",
            Self::Rectangle => "rectangle",
            Self::Diamond => "diamond",
            Self::Heart => "heart",
            Self::CenterTop => "centerTop",
            Self::CornersIn => "cornersIn",
            Self::CornersOut => "cornersOut",
            Self::OneBlade => "oneBlade",
            Self::TwoBladeVertical => "twoBladeVertical",
            Self::ThreeBlade => "threeBlade",
            Self::FourBlade => "fourBlade",
            Self::EightBlade => "eightBlade",
            Self::FromLeft => "fromLeft",
            Self::FromTop => "fromTop",
            Self::FromRight => "fromRight",
            Self::FromBottom => "fromBottom",
            Self::CombHorizontal => "combHorizontal",
            Self::CombVertical => "combVertical",
            Self::HorizontalLeft => "horizontalLeft",
            Self::HorizontalRight => "horizontalRight",
            Self::ClockwiseTwelve => "clockwiseTwelve",
            Self::ClockwiseThree => "clockwiseThree",
            Self::ClockwiseSix => "clockwiseSix",
            Self::ClockwiseNine => "clockwiseNine",
            Self::TopLeft => "topLeft",
            Self::TopCenter => "topCenter",
            Self::BottomRight => "bottomRight",
            Self::BottomLeft => "bottomLeft",
            Self::FanOutHorizontal => "fanOutHorizontal",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        let name = normalized_name(name);
        Self::ALL
            .into_iter()
            .find(|t| normalized_name(t.name()) == name)
    }
}

/// Tag naming one transition implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionKind {
    NoTransition,
    CrossFade,
    FadeOverColor,
    BarWipe,
    BarnDoorWipe,
    BlindsWipe,
    CheckerBoardWipe,
    RandomBarWipe,
    Dissolve,
    IrisBox,
    IrisDiamond,
    EllipseWipe,
    FanWipe,
    FourBoxWipe,
    PinWheelWipe,
    ClockWipe,
    WaterfallWipe,
    Push,
    Cover,
    Uncover,
    Comb,
    OutsideCube,
    InsideCube,
    TurnAround,
    Fall,
    Iris,
    Rochade,
    Static,
    ShapeDissolve,
    RevolvingCircles,
    Helix,
    TileFlip,
    Honeycomb,
    Glitter,
    Vortex,
    Ripple,
}

/// How a kind is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionFamily {
    None,
    Fade,
    Clip,
    Move,
    Primitive3d,
}

impl TransitionKind {
    pub const ALL: [TransitionKind; 36] = [
        Self::NoTransition,
        Self::CrossFade,
        Self::FadeOverColor,
        Self::BarWipe,
        Self::BarnDoorWipe,
        Self::BlindsWipe,
        Self::CheckerBoardWipe,
        Self::RandomBarWipe,
        Self::Dissolve,
        Self::IrisBox,
        Self::IrisDiamond,
        Self::EllipseWipe,
        Self::FanWipe,
        Self::FourBoxWipe,
        Self::PinWheelWipe,
        Self::ClockWipe,
        Self::WaterfallWipe,
        Self::Push,
        Self::Cover,
        Self::Uncover,
        Self::Comb,
        Self::OutsideCube,
        Self::InsideCube,
        Self::TurnAround,
        Self::Fall,
        Self::Iris,
        Self::Rochade,
        Self::Static,
        Self::ShapeDissolve,
        Self::RevolvingCircles,
        Self::Helix,
        Self::TileFlip,
        Self::Honeycomb,
        Self::Glitter,
        Self::Vortex,
        Self::Ripple,
    ];

    pub fn family(self) -> TransitionFamily {
        match self {
            Self::NoTransition => TransitionFamily::None,
            Self::CrossFade | Self::FadeOverColor => TransitionFamily::Fade,
            Self::BarWipe
            | Self::BarnDoorWipe
            | Self::BlindsWipe
            | Self::CheckerBoardWipe
            | Self::RandomBarWipe
            | Self::Dissolve
            | Self::IrisBox
            | Self::IrisDiamond
            | Self::EllipseWipe
            | Self::FanWipe
            | Self::FourBoxWipe
            | Self::PinWheelWipe
            | Self::ClockWipe
            | Self::WaterfallWipe => TransitionFamily::Clip,
            Self::Push | Self::Cover | Self::Uncover | Self::Comb => TransitionFamily::Move,
            _ => TransitionFamily::Primitive3d,
        }
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Map a (type, subtype) pair to its implementation; `None` when unsupported.
pub fn resolve_kind(ty: TransitionType, subtype: TransitionSubType) -> Option<TransitionKind> {
    use TransitionKind as K;
    use TransitionSubType as S;
    use TransitionType as T;

    let kind = match (ty, subtype) {
        (T::Fade, S::Default | S::CrossFade) => K::CrossFade,
        (T::Fade, S::FadeOverColor) => K::FadeOverColor,
        (T::BarWipe, S::LeftToRight | S::TopToBottom) => K::BarWipe,
        (T::BarnDoorWipe, S::Vertical | S::Horizontal) => K::BarnDoorWipe,
        (T::BlindsWipe, S::Vertical | S::Horizontal) => K::BlindsWipe,
        (T::CheckerBoardWipe, S::Down | S::Across) => K::CheckerBoardWipe,
        (T::Dissolve, S::Default) => K::Dissolve,
        (T::EllipseWipe, S::Circle | S::Horizontal | S::Vertical) => K::EllipseWipe,
        (T::FanWipe, S::CenterTop) => K::FanWipe,
        (T::FourBoxWipe, S::CornersIn | S::CornersOut) => K::FourBoxWipe,
        (T::IrisWipe, S::Rectangle) => K::IrisBox,
        (T::IrisWipe, S::Diamond) => K::IrisDiamond,
        (
            T::PinWheelWipe,
            S::OneBlade | S::TwoBladeVertical | S::ThreeBlade | S::FourBlade | S::EightBlade,
        ) => K::PinWheelWipe,
        (T::RandomBarWipe, S::Horizontal | S::Vertical) => K::RandomBarWipe,
        (T::SlideWipe, S::FromLeft | S::FromTop | S::FromRight | S::FromBottom) => K::Cover,
        (T::PushWipe, S::FromLeft | S::FromTop | S::FromRight | S::FromBottom) => K::Push,
        (T::PushWipe, S::CombHorizontal | S::CombVertical) => K::Comb,
        (T::WaterfallWipe, S::HorizontalLeft | S::HorizontalRight) => K::WaterfallWipe,
        (
            T::ClockWipe,
            S::ClockwiseTwelve | S::ClockwiseThree | S::ClockwiseSix | S::ClockwiseNine,
        ) => K::ClockWipe,
        (T::MiscShapeWipe, S::CornersOut) => K::OutsideCube,
        (T::MiscShapeWipe, S::CornersIn) => K::InsideCube,
        (T::MiscShapeWipe, S::TopToBottom) => K::TurnAround,
        (T::MiscShapeWipe, S::LeftToRight) => K::Fall,
        (T::MiscShapeWipe, S::TopLeft) => K::Iris,
        (T::MiscShapeWipe, S::TopCenter) => K::Rochade,
        (T::MiscShapeWipe, S::BottomRight) => K::Static,
        (T::MiscShapeWipe, S::BottomLeft) => K::ShapeDissolve,
        (T::MiscShapeWipe, S::Circle) => K::RevolvingCircles,
        (T::MiscShapeWipe, S::FanOutHorizontal) => K::Helix,
        (T::MiscShapeWipe, S::Across) => K::TileFlip,
        (T::MiscShapeWipe, S::Diamond) => K::Honeycomb,
        (T::MiscShapeWipe, S::Heart) => K::Glitter,
        (T::MiscShapeWipe, S::Vertical) => K::Vortex,
        (T::MiscShapeWipe, S::Horizontal) => K::Ripple,
        _ => return None,
    };
    Some(kind)
}

/// Every supported (type, subtype) pair with its kind.
pub fn known_transitions() -> Vec<(TransitionType, TransitionSubType, TransitionKind)> {
    TransitionType::ALL
        .into_iter()
        .flat_map(|ty| {
            TransitionSubType::ALL
                .into_iter()
                .filter_map(move |sub| resolve_kind(ty, sub).map(|kind| (ty, sub, kind)))
        })
        .collect()
}

/// Transition part of a slide descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransitionSpec {
    #[serde(rename = "type")]
    pub transition_type: String,
    pub subtype: Option<String>,
    pub duration: Option<f64>,
    pub reverse: bool,
    pub fade_color: Option<RgbColor>,
}

/// What a transition constructor gets to work with.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionContext {
    pub kind: TransitionKind,
    pub subtype: TransitionSubType,
    pub info: Option<TransitionInfo>,
    pub reverse: bool,
    pub fade_color: RgbColor,
}

pub trait Transition: fmt::Debug {
    fn kind(&self) -> TransitionKind;

    /// The frame to draw at `progress` in `[0, 1]`; `None` draws nothing.
    fn frame(&self, progress: f64) -> Option<TransitionFrame>;

    fn render(&self, progress: f64, surface: &mut dyn TransitionSurface) {
        if let Some(frame) = self.frame(progress.clamp(0.0, 1.0)) {
            surface.draw(&frame);
        }
    }
}

/// A slide's resolved transition.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideTransition {
    transition_type: Option<TransitionType>,
    subtype: TransitionSubType,
    kind: TransitionKind,
    duration: f64,
    min_frame_count: f64,
    reverse: bool,
    fade_color: RgbColor,
}

impl SlideTransition {
    pub fn new(spec: &TransitionSpec, minimum_frames_per_second: f64) -> Self {
        let transition_type = TransitionType::parse(&spec.transition_type);
        let subtype = match spec.subtype.as_deref().map(str::trim) {
            None | Some("") => Some(TransitionSubType::Default),
            Some(name) => TransitionSubType::parse(name),
        };

        let kind = match (transition_type, subtype) {
            (Some(ty), Some(sub)) => resolve_kind(ty, sub),
            _ => None,
        };
        let kind = match kind {
            Some(TransitionKind::Cover) if spec.reverse => TransitionKind::Uncover,
            Some(kind) => kind,
            None => {
                tracing::warn!(
                    transition = %spec.transition_type,
                    subtype = ?spec.subtype,
                    "unhandled transition, showing the slide without effect"
                );
                TransitionKind::NoTransition
            }
        };

        let duration = spec
            .duration
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(DEFAULT_TRANSITION_DURATION);
        let min_fps = minimum_frames_per_second.max(1.0);
        Self {
            transition_type,
            subtype: subtype.unwrap_or(TransitionSubType::Default),
            kind,
            duration,
            min_frame_count: (duration * min_fps).clamp(1.0, min_fps),
            reverse: spec.reverse,
            fade_color: spec.fade_color.unwrap_or(RgbColor::BLACK),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.kind != TransitionKind::NoTransition
    }

    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    pub fn transition_type(&self) -> Option<TransitionType> {
        self.transition_type
    }

    pub fn subtype(&self) -> TransitionSubType {
        self.subtype
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn min_frame_count(&self) -> f64 {
        self.min_frame_count
    }

    pub fn is_reverse(&self) -> bool {
        self.reverse
    }

    pub fn context(&self) -> TransitionContext {
        TransitionContext {
            kind: self.kind,
            subtype: self.subtype,
            info: self
                .transition_type
                .and_then(|ty| transition_info(ty, self.subtype)),
            reverse: self.reverse,
            fade_color: self.fade_color,
        }
    }

    pub fn create_transition(&self, registry: &TransitionRegistry) -> Box<dyn Transition> {
        registry.create(&self.context())
    }

    /// Continuous activity rendering this transition onto `surface`.
    pub fn create_activity(
        &self,
        registry: &TransitionRegistry,
        surface: SurfaceRef,
        master: &SharedClock,
    ) -> ActivityRef {
        let params = ActivityParams {
            repeat: RepeatCount::Finite(1.0),
            min_duration: self.duration,
            min_frame_count: self.min_frame_count,
            ..ActivityParams::default()
        };
        let hook = TransitionHook {
            transition: self.create_transition(registry),
            surface,
        };
        Activity::new(params, TimingMode::Continuous, master, Box::new(hook))
    }
}

struct TransitionHook {
    transition: Box<dyn Transition>,
    surface: SurfaceRef,
}

impl TransitionHook {
    fn render(&self, progress: f64) {
        self.transition
            .render(progress, &mut *self.surface.borrow_mut());
    }
}

impl ActivityHook for TransitionHook {
    fn perform(&mut self, frame: Frame) {
        let t = match frame {
            Frame::Continuous { t, .. } => t,
            Frame::KeyTime { fraction, .. } => fraction,
            Frame::Discrete { .. } => 1.0,
        };
        self.render(t);
    }

    fn perform_end(&mut self, _auto_reverse: bool) {
        self.render(1.0);
    }
}

#[cfg(test)]
#[path = "../tests/unit/transition/transition.rs"]
mod tests;
