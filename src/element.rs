//! Shapes whose properties are driven by animation nodes.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

use crate::animation::value::{PropertyValue, ValueType};
use crate::color::RgbColor;
use crate::expression::ExprEnv;

pub type ElementRef = Rc<RefCell<AnimatedElement>>;

/// Animatable attribute of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Opacity,
    X,
    Y,
    Width,
    Height,
    Rotate,
    SkewX,
    SkewY,
    Scale,
    Translate,
    Visibility,
    FillStyle,
    LineStyle,
    FillColor,
    LineColor,
    CharColor,
    DimColor,
}

impl Attribute {
    pub const ALL: [Attribute; 17] = [
        Self::Opacity,
        Self::X,
        Self::Y,
        Self::Width,
        Self::Height,
        Self::Rotate,
        Self::SkewX,
        Self::SkewY,
        Self::Scale,
        Self::Translate,
        Self::Visibility,
        Self::FillStyle,
        Self::LineStyle,
        Self::FillColor,
        Self::LineColor,
        Self::CharColor,
        Self::DimColor,
    ];

    /// Case-insensitive lookup by attribute name.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|a| a.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Opacity => "opacity",
            Self::X => "x",
            Self::Y => "y",
            Self::Width => "width",
            Self::Height => "height",
            Self::Rotate => "rotate",
            Self::SkewX => "skewx",
            Self::SkewY => "skewy",
            Self::Scale => "scale",
            Self::Translate => "translate",
            Self::Visibility => "visibility",
            Self::FillStyle => "fillstyle",
            Self::LineStyle => "linestyle",
            Self::FillColor => "fillcolor",
            Self::LineColor => "linecolor",
            Self::CharColor => "charcolor",
            Self::DimColor => "dimcolor",
        }
    }

    pub fn value_type(self) -> ValueType {
        match self {
            Self::Opacity
            | Self::X
            | Self::Y
            | Self::Width
            | Self::Height
            | Self::Rotate
            | Self::SkewX
            | Self::SkewY => ValueType::Number,
            Self::Scale | Self::Translate => ValueType::Tuple,
            Self::Visibility => ValueType::Enum,
            Self::FillStyle | Self::LineStyle => ValueType::String,
            Self::FillColor | Self::LineColor | Self::CharColor | Self::DimColor => {
                ValueType::Color
            }
        }
    }
}

/// Shape geometry as delivered with the slide, in slide units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeInfo {
    pub hash: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub fill_color: Option<RgbColor>,
    #[serde(default)]
    pub line_color: Option<RgbColor>,
}

/// Current visual state of a shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementState {
    pub center: Point,
    pub size: Size,
    pub rotation: f64,
    pub skew_x: f64,
    pub skew_y: f64,
    pub opacity: f64,
    pub visible: bool,
    pub fill_color: RgbColor,
    pub line_color: RgbColor,
    pub char_color: RgbColor,
    pub dim_color: RgbColor,
    pub fill_style: String,
    pub line_style: String,
}

#[derive(Debug)]
pub struct AnimatedElement {
    id: String,
    slide_size: Size,
    base_bounds: Rect,
    base: ElementState,
    state: ElementState,
    saved: BTreeMap<usize, ElementState>,
    running_animations: usize,
}

fn normalized(value: f64, extent: f64) -> f64 {
    if extent > 0.0 { value / extent } else { value }
}

fn denormalized(value: f64, extent: f64) -> f64 {
    if extent > 0.0 { value * extent } else { value }
}

impl AnimatedElement {
    pub fn new(id: impl Into<String>, base_bounds: Rect, slide_size: Size) -> Self {
        let state = ElementState {
            center: base_bounds.center(),
            size: base_bounds.size(),
            rotation: 0.0,
            skew_x: 0.0,
            skew_y: 0.0,
            opacity: 1.0,
            visible: true,
            fill_color: RgbColor::new(1.0, 1.0, 1.0),
            line_color: RgbColor::BLACK,
            char_color: RgbColor::BLACK,
            dim_color: RgbColor::BLACK,
            fill_style: "solid".to_owned(),
            line_style: "solid".to_owned(),
        };
        Self {
            id: id.into(),
            slide_size,
            base_bounds,
            base: state.clone(),
            state,
            saved: BTreeMap::new(),
            running_animations: 0,
        }
    }

    pub fn from_shape(shape: &ShapeInfo, slide_size: Size) -> Self {
        let bounds = Rect::new(
            shape.x,
            shape.y,
            shape.x + shape.width,
            shape.y + shape.height,
        );
        let mut element = Self::new(shape.hash.clone(), bounds, slide_size);
        element.state.visible = !shape.hidden;
        if let Some(c) = shape.fill_color {
            element.state.fill_color = c;
        }
        if let Some(c) = shape.line_color {
            element.state.line_color = c;
        }
        element.base = element.state.clone();
        element
    }

    pub fn into_ref(self) -> ElementRef {
        Rc::new(RefCell::new(self))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> &ElementState {
        &self.state
    }

    pub fn base_bounds(&self) -> Rect {
        self.base_bounds
    }

    /// Current bounds, before rotation and skew.
    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(self.state.center, self.state.size)
    }

    /// Geometry in slide-relative units, as seen by value expressions.
    pub fn expr_env(&self) -> ExprEnv {
        let slide = self.slide_size;
        ExprEnv {
            x: normalized(self.state.center.x, slide.width),
            y: normalized(self.state.center.y, slide.height),
            width: normalized(self.state.size.width, slide.width),
            height: normalized(self.state.size.height, slide.height),
            param: 0.0,
        }
    }

    pub fn get(&self, attribute: Attribute) -> PropertyValue {
        let s = &self.state;
        let slide = self.slide_size;
        let base = self.base_bounds.size();
        match attribute {
            Attribute::Opacity => PropertyValue::Number(s.opacity),
            Attribute::X => PropertyValue::Number(normalized(s.center.x, slide.width)),
            Attribute::Y => PropertyValue::Number(normalized(s.center.y, slide.height)),
            Attribute::Width => PropertyValue::Number(normalized(s.size.width, slide.width)),
            Attribute::Height => PropertyValue::Number(normalized(s.size.height, slide.height)),
            Attribute::Rotate => PropertyValue::Number(s.rotation),
            Attribute::SkewX => PropertyValue::Number(s.skew_x),
            Attribute::SkewY => PropertyValue::Number(s.skew_y),
            Attribute::Scale => PropertyValue::Tuple(Vec2::new(
                normalized(s.size.width, base.width),
                normalized(s.size.height, base.height),
            )),
            Attribute::Translate => PropertyValue::Tuple(Vec2::new(
                normalized(s.center.x, slide.width),
                normalized(s.center.y, slide.height),
            )),
            Attribute::Visibility => PropertyValue::String(
                if s.visible { "visible" } else { "hidden" }.to_owned(),
            ),
            Attribute::FillStyle => PropertyValue::String(s.fill_style.clone()),
            Attribute::LineStyle => PropertyValue::String(s.line_style.clone()),
            Attribute::FillColor => PropertyValue::Color(s.fill_color),
            Attribute::LineColor => PropertyValue::Color(s.line_color),
            Attribute::CharColor => PropertyValue::Color(s.char_color),
            Attribute::DimColor => PropertyValue::Color(s.dim_color),
        }
    }

    /// Apply `value` to `attribute`. A value of the wrong type is logged and ignored.
    pub fn set(&mut self, attribute: Attribute, value: &PropertyValue) -> bool {
        let slide = self.slide_size;
        let base = self.base_bounds.size();
        let s = &mut self.state;
        match (attribute, value) {
            (Attribute::Opacity, PropertyValue::Number(v)) => s.opacity = v.clamp(0.0, 1.0),
            (Attribute::X, PropertyValue::Number(v)) => s.center.x = denormalized(*v, slide.width),
            (Attribute::Y, PropertyValue::Number(v)) => {
                s.center.y = denormalized(*v, slide.height)
            }
            (Attribute::Width, PropertyValue::Number(v)) => {
                s.size.width = denormalized(*v, slide.width).max(0.0)
            }
            (Attribute::Height, PropertyValue::Number(v)) => {
                s.size.height = denormalized(*v, slide.height).max(0.0)
            }
            (Attribute::Rotate, PropertyValue::Number(v)) => s.rotation = *v,
            (Attribute::SkewX, PropertyValue::Number(v)) => s.skew_x = *v,
            (Attribute::SkewY, PropertyValue::Number(v)) => s.skew_y = *v,
            (Attribute::Scale, PropertyValue::Tuple(v)) => {
                s.size = Size::new(
                    denormalized(v.x, base.width).abs(),
                    denormalized(v.y, base.height).abs(),
                );
            }
            (Attribute::Translate, PropertyValue::Tuple(v)) => {
                s.center = Point::new(
                    denormalized(v.x, slide.width),
                    denormalized(v.y, slide.height),
                );
            }
            (Attribute::Visibility, PropertyValue::String(v)) => {
                s.visible = !v.eq_ignore_ascii_case("hidden")
            }
            (Attribute::Visibility, PropertyValue::Bool(v)) => s.visible = *v,
            (Attribute::FillStyle, PropertyValue::String(v)) => s.fill_style = v.clone(),
            (Attribute::LineStyle, PropertyValue::String(v)) => s.line_style = v.clone(),
            (Attribute::FillColor, PropertyValue::Color(c)) => s.fill_color = c.clamped(),
            (Attribute::LineColor, PropertyValue::Color(c)) => s.line_color = c.clamped(),
            (Attribute::CharColor, PropertyValue::Color(c)) => s.char_color = c.clamped(),
            (Attribute::DimColor, PropertyValue::Color(c)) => s.dim_color = c.clamped(),
            (attribute, value) => {
                tracing::warn!(
                    element = %self.id,
                    attribute = attribute.name(),
                    ?value,
                    "value type does not match attribute"
                );
                return false;
            }
        }
        true
    }

    /// Remember the current state under `key` (one slot per animation node).
    pub fn save_state(&mut self, key: usize) {
        self.saved.insert(key, self.state.clone());
    }

    pub fn restore_state(&mut self, key: usize) -> bool {
        match self.saved.remove(&key) {
            Some(state) => {
                self.state = state;
                true
            }
            None => false,
        }
    }

    /// Back to the state the shape was loaded with. Saved snapshots are dropped.
    pub fn reset(&mut self) {
        self.state = self.base.clone();
        self.saved.clear();
        self.running_animations = 0;
    }

    /// Drop the snapshot under `key` without restoring it.
    pub fn discard_state(&mut self, key: usize) {
        self.saved.remove(&key);
    }

    pub fn notify_animation_start(&mut self) {
        self.running_animations += 1;
    }

    pub fn notify_animation_end(&mut self) {
        self.running_animations = self.running_animations.saturating_sub(1);
    }

    pub fn is_animated(&self) -> bool {
        self.running_animations > 0
    }
}

#[cfg(test)]
#[path = "../tests/unit/element.rs"]
mod tests;
