use serde::Serialize;

use super::{TransitionSubType, TransitionType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransitionClass {
    /// Entering slide revealed through a clip shape.
    ClipPolygon,
    /// Drawn by a dedicated implementation.
    Special,
}

/// How a clip wipe plays when the direction is reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransitionReverseMethod {
    Ignore,
    SubtractAndInvert,
    Rotate180,
    FlipX,
    FlipY,
}

/// Geometry parameters of a (type, subtype) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransitionInfo {
    pub class: TransitionClass,
    pub rotation_angle: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub reverse_method: TransitionReverseMethod,
    pub out_inverts_sweep: bool,
    pub scale_isotropically: bool,
}

const fn clip(
    rotation_angle: f64,
    reverse_method: TransitionReverseMethod,
    out_inverts_sweep: bool,
    scale_isotropically: bool,
) -> TransitionInfo {
    TransitionInfo {
        class: TransitionClass::ClipPolygon,
        rotation_angle,
        scale_x: 1.0,
        scale_y: 1.0,
        reverse_method,
        out_inverts_sweep,
        scale_isotropically,
    }
}

const SPECIAL: TransitionInfo = TransitionInfo {
    class: TransitionClass::Special,
    rotation_angle: 0.0,
    scale_x: 1.0,
    scale_y: 1.0,
    reverse_method: TransitionReverseMethod::Ignore,
    out_inverts_sweep: true,
    scale_isotropically: false,
};

pub fn transition_info(ty: TransitionType, subtype: TransitionSubType) -> Option<TransitionInfo> {
    use TransitionReverseMethod as R;
    use TransitionSubType as S;
    use TransitionType as T;

    let info = match (ty, subtype) {
        (T::BarnDoorWipe, S::Vertical) => clip(0.0, R::SubtractAndInvert, true, false),
        (T::BarnDoorWipe, S::Horizontal) => clip(90.0, R::SubtractAndInvert, true, false),
        (T::BarWipe, S::LeftToRight) => clip(0.0, R::FlipX, false, false),
        (T::BarWipe, S::TopToBottom) => clip(90.0, R::FlipY, false, false),
        (T::BlindsWipe, S::Horizontal) => clip(90.0, R::FlipX, true, false),
        (T::BlindsWipe, S::Vertical) => clip(0.0, R::FlipY, true, false),
        (T::CheckerBoardWipe, S::Down) => clip(90.0, R::FlipY, true, false),
        (T::CheckerBoardWipe, S::Across) => clip(0.0, R::FlipX, true, false),
        (T::Dissolve, S::Default) => clip(0.0, R::Ignore, true, true),
        (T::EllipseWipe, S::Circle) => clip(0.0, R::SubtractAndInvert, true, true),
        (T::EllipseWipe, S::Horizontal) => clip(0.0, R::SubtractAndInvert, true, false),
        (T::EllipseWipe, S::Vertical) => clip(90.0, R::SubtractAndInvert, true, true),
        (T::Fade, S::Default | S::CrossFade | S::FadeOverColor) => SPECIAL,
        (T::FanWipe, S::CenterTop) => clip(0.0, R::FlipY, true, false),
        (T::FourBoxWipe, S::CornersIn | S::CornersOut) => {
            clip(0.0, R::SubtractAndInvert, true, false)
        }
        (T::IrisWipe, S::Rectangle) => clip(0.0, R::SubtractAndInvert, true, false),
        (T::IrisWipe, S::Diamond) => TransitionInfo {
            scale_x: std::f64::consts::SQRT_2,
            scale_y: std::f64::consts::SQRT_2,
            ..clip(45.0, R::SubtractAndInvert, true, false)
        },
        (
            T::PinWheelWipe,
            S::OneBlade | S::TwoBladeVertical | S::ThreeBlade | S::FourBlade | S::EightBlade,
        ) => clip(0.0, R::FlipX, true, true),
        (T::RandomBarWipe, S::Horizontal) => clip(90.0, R::Ignore, true, false),
        (T::RandomBarWipe, S::Vertical) => clip(0.0, R::Ignore, true, false),
        (T::SlideWipe, S::FromLeft | S::FromTop | S::FromRight | S::FromBottom) => SPECIAL,
        (T::WaterfallWipe, S::HorizontalLeft) => clip(-90.0, R::Rotate180, true, false),
        (T::WaterfallWipe, S::HorizontalRight) => clip(90.0, R::Rotate180, true, false),
        _ => return None,
    };
    Some(info)
}

/// Used for clip wipes without a table entry.
pub(crate) const DEFAULT_CLIP: TransitionInfo =
    clip(0.0, TransitionReverseMethod::SubtractAndInvert, true, false);
