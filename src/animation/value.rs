use kurbo::Vec2;
use serde::{Deserialize, Serialize};

use crate::color::{HueDirection, RgbColor};
use crate::expression::{ExprEnv, ValueExpr};
use crate::foundation::error::{SlideplayError, SlideplayResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Number,
    Tuple,
    Color,
    String,
    Enum,
    Bool,
}

impl ValueType {
    /// Whether values of this type blend continuously.
    pub fn is_interpolable(self) -> bool {
        matches!(self, Self::Number | Self::Tuple | Self::Color)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Number(f64),
    Tuple(Vec2),
    Color(RgbColor),
    String(String),
    Bool(bool),
}

impl PropertyValue {
    /// Parse a descriptor value string as `ty`, evaluating expressions in `env`.
    pub fn parse(text: &str, ty: ValueType, env: &ExprEnv) -> SlideplayResult<Self> {
        let text = text.trim();
        match ty {
            ValueType::Number => Ok(Self::Number(ValueExpr::parse(text)?.eval(env))),
            ValueType::Tuple => {
                let parts: Vec<&str> = text.split(',').collect();
                let [x, y] = parts.as_slice() else {
                    return Err(SlideplayError::validation(format!(
                        "expected a pair \"x,y\", got \"{text}\""
                    )));
                };
                Ok(Self::Tuple(Vec2::new(
                    ValueExpr::parse(x)?.eval(env),
                    ValueExpr::parse(y)?.eval(env),
                )))
            }
            ValueType::Color => Ok(Self::Color(RgbColor::parse(text)?)),
            ValueType::String | ValueType::Enum => Ok(Self::String(text.to_owned())),
            ValueType::Bool => match text.to_ascii_lowercase().as_str() {
                "true" | "on" | "1" => Ok(Self::Bool(true)),
                "false" | "off" | "0" => Ok(Self::Bool(false)),
                _ => Err(SlideplayError::validation(format!(
                    "invalid boolean \"{text}\""
                ))),
            },
        }
    }

    pub fn add(&self, other: &Self) -> Option<Self> {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => Some(Self::Number(a + b)),
            (Self::Tuple(a), Self::Tuple(b)) => Some(Self::Tuple(*a + *b)),
            (Self::Color(a), Self::Color(b)) => Some(Self::Color(a.add(*b))),
            _ => None,
        }
    }

    pub fn scale(&self, k: f64) -> Option<Self> {
        match self {
            Self::Number(a) => Some(Self::Number(a * k)),
            Self::Tuple(a) => Some(Self::Tuple(*a * k)),
            Self::Color(a) => Some(Self::Color(a.scale(k))),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    #[default]
    Rgb,
    Hsl,
}

impl ColorSpace {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "rgb" => Some(Self::Rgb),
            "hsl" => Some(Self::Hsl),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalcMode {
    Discrete,
    #[default]
    Linear,
    Paced,
    Spline,
}

impl CalcMode {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "discrete" => Some(Self::Discrete),
            "linear" => Some(Self::Linear),
            "paced" => Some(Self::Paced),
            "spline" => Some(Self::Spline),
            _ => None,
        }
    }
}

/// Blending strategy for a value type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interpolator {
    Number,
    Tuple,
    Rgb,
    Hsl(HueDirection),
}

impl Interpolator {
    /// Pick the interpolator for `ty`; `None` for types that only change in steps.
    pub fn select(ty: ValueType, space: ColorSpace, direction: HueDirection) -> Option<Self> {
        match ty {
            ValueType::Number => Some(Self::Number),
            ValueType::Tuple => Some(Self::Tuple),
            ValueType::Color => Some(match space {
                ColorSpace::Rgb => Self::Rgb,
                ColorSpace::Hsl => Self::Hsl(direction),
            }),
            ValueType::String | ValueType::Enum | ValueType::Bool => None,
        }
    }

    pub fn interpolate(
        self,
        from: &PropertyValue,
        to: &PropertyValue,
        t: f64,
    ) -> Option<PropertyValue> {
        let s = 1.0 - t;
        match (self, from, to) {
            (Self::Number, PropertyValue::Number(a), PropertyValue::Number(b)) => {
                Some(PropertyValue::Number(s * a + t * b))
            }
            (Self::Tuple, PropertyValue::Tuple(a), PropertyValue::Tuple(b)) => {
                Some(PropertyValue::Tuple(a.lerp(*b, t)))
            }
            (Self::Rgb, PropertyValue::Color(a), PropertyValue::Color(b)) => {
                Some(PropertyValue::Color(a.lerp(*b, t)))
            }
            (Self::Hsl(direction), PropertyValue::Color(a), PropertyValue::Color(b)) => {
                let hsl = a.to_hsl().interpolate(b.to_hsl(), t, direction);
                Some(PropertyValue::Color(hsl.to_rgb()))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/value.rs"]
mod tests;
