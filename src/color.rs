use std::fmt;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{SlideplayError, SlideplayResult};

/// sRGB color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RgbColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Hue in degrees `[0, 360)`, saturation and lightness in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HslColor {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

/// Direction of a hue sweep around the color wheel.
///
/// Clockwise runs toward lower hue values, wrapping through 360.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HueDirection {
    #[default]
    Clockwise,
    CounterClockwise,
}

impl RgbColor {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
        )
    }

    /// Parse `#rgb`, `#rrggbb`, `rgb(r, g, b)`, `hsl(h, s%, l%)` or a basic color name.
    pub fn parse(text: &str) -> SlideplayResult<Self> {
        let s = text.trim().to_ascii_lowercase();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        if let Some(args) = function_args(&s, "rgb") {
            let [r, g, b] = parse_three(args, 255.0)?;
            return Ok(Self::new(r, g, b).clamped());
        }
        if let Some(args) = function_args(&s, "hsl") {
            let [h, sat, l] = parse_three(args, 1.0)?;
            return Ok(HslColor::new(h, sat, l).to_rgb());
        }
        named(&s).ok_or_else(|| SlideplayError::validation(format!("unknown color \"{text}\"")))
    }

    pub fn clamped(self) -> Self {
        Self::new(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
        )
    }

    pub fn add(self, other: Self) -> Self {
        Self::new(self.r + other.r, self.g + other.g, self.b + other.b)
    }

    pub fn scale(self, k: f64) -> Self {
        Self::new(self.r * k, self.g * k, self.b * k)
    }

    pub fn lerp(self, to: Self, t: f64) -> Self {
        let s = 1.0 - t;
        Self::new(
            s * self.r + t * to.r,
            s * self.g + t * to.g,
            s * self.b + t * to.b,
        )
    }

    pub fn to_hsl(self) -> HslColor {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let l = (max + min) / 2.0;
        if max == min {
            return HslColor::new(0.0, 0.0, l);
        }

        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if max == self.r {
            (self.g - self.b) / d + if self.g < self.b { 6.0 } else { 0.0 }
        } else if max == self.g {
            (self.b - self.r) / d + 2.0
        } else {
            (self.r - self.g) / d + 4.0
        };
        HslColor::new(h * 60.0, s, l)
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        write!(
            f,
            "#{:02x}{:02x}{:02x}",
            to_u8(self.r),
            to_u8(self.g),
            to_u8(self.b)
        )
    }
}

impl<'de> Deserialize<'de> for RgbColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            RgbObj { r: f64, g: f64, b: f64 },
            HslObj { h: f64, s: f64, l: f64 },
            Arr(Vec<f64>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => Self::parse(&s).map_err(serde::de::Error::custom),
            Repr::RgbObj { r, g, b } => Ok(Self::new(r, g, b)),
            Repr::HslObj { h, s, l } => Ok(HslColor::new(h, s, l).to_rgb()),
            Repr::Arr(v) => match v.as_slice() {
                [r, g, b] => Ok(Self::new(*r, *g, *b)),
                _ => Err(serde::de::Error::custom(
                    "rgb array must have len 3 ([r,g,b])",
                )),
            },
        }
    }
}

impl HslColor {
    pub fn new(h: f64, s: f64, l: f64) -> Self {
        Self {
            h: normalize_hue(h),
            s: s.clamp(0.0, 1.0),
            l: l.clamp(0.0, 1.0),
        }
    }

    pub fn to_rgb(self) -> RgbColor {
        let h = self.h / 360.0;
        let (s, l) = (self.s, self.l);
        if s == 0.0 {
            return RgbColor::new(l, l, l);
        }

        fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
            if t < 0.0 {
                t += 1.0;
            }
            if t > 1.0 {
                t -= 1.0;
            }
            if t < 1.0 / 6.0 {
                return p + (q - p) * 6.0 * t;
            }
            if t < 1.0 / 2.0 {
                return q;
            }
            if t < 2.0 / 3.0 {
                return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
            }
            p
        }

        let q = if l < 0.5 {
            l * (1.0 + s)
        } else {
            l + s - l * s
        };
        let p = 2.0 * l - q;
        RgbColor::new(
            hue_to_rgb(p, q, h + 1.0 / 3.0),
            hue_to_rgb(p, q, h),
            hue_to_rgb(p, q, h - 1.0 / 3.0),
        )
    }

    /// Interpolate in HSL space, sweeping the hue in `direction`.
    pub fn interpolate(self, to: Self, t: f64, direction: HueDirection) -> Self {
        let s = 1.0 - t;
        let ccw = direction == HueDirection::CounterClockwise;
        let hue = if self.h <= to.h && !ccw {
            s * (self.h + 360.0) + t * to.h
        } else if self.h > to.h && ccw {
            s * self.h + t * (to.h + 360.0)
        } else {
            s * self.h + t * to.h
        };
        Self::new(hue, s * self.s + t * to.s, s * self.l + t * to.l)
    }
}

fn normalize_hue(h: f64) -> f64 {
    if h.is_finite() { h.rem_euclid(360.0) } else { 0.0 }
}

fn function_args<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    s.strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

/// Three comma-separated numbers; plain values are divided by `scale`, percentages by 100.
fn parse_three(args: &str, scale: f64) -> SlideplayResult<[f64; 3]> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let [a, b, c] = parts.as_slice() else {
        return Err(SlideplayError::validation(format!(
            "expected three color components, got \"{args}\""
        )));
    };
    let component = |raw: &str, scale: f64| -> SlideplayResult<f64> {
        let (digits, divisor) = match raw.strip_suffix('%') {
            Some(p) => (p, 100.0),
            None => (raw, scale),
        };
        digits
            .trim()
            .parse::<f64>()
            .map(|v| v / divisor)
            .map_err(|_| SlideplayError::validation(format!("invalid color component \"{raw}\"")))
    };
    Ok([component(a, scale)?, component(b, scale)?, component(c, scale)?])
}

fn parse_hex(hex: &str) -> SlideplayResult<RgbColor> {
    fn hex_byte(pair: &str) -> SlideplayResult<u8> {
        u8::from_str_radix(pair, 16)
            .map_err(|_| SlideplayError::validation(format!("invalid hex byte \"{pair}\"")))
    }

    if !hex.is_ascii() {
        return Err(SlideplayError::validation(format!("invalid hex color \"#{hex}\"")));
    }
    match hex.len() {
        3 => {
            let mut v = [0u8; 3];
            for (slot, i) in v.iter_mut().zip(0..3) {
                let nibble = hex_byte(&hex[i..i + 1])?;
                *slot = nibble * 17;
            }
            Ok(RgbColor::from_rgb8(v[0], v[1], v[2]))
        }
        6 => Ok(RgbColor::from_rgb8(
            hex_byte(&hex[0..2])?,
            hex_byte(&hex[2..4])?,
            hex_byte(&hex[4..6])?,
        )),
        _ => Err(SlideplayError::validation(
            "hex color must be #RGB or #RRGGBB (case-insensitive)",
        )),
    }
}

fn named(name: &str) -> Option<RgbColor> {
    let (r, g, b) = match name {
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "lime" => (0, 255, 0),
        "green" => (0, 128, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "cyan" | "aqua" => (0, 255, 255),
        "magenta" | "fuchsia" => (255, 0, 255),
        "gray" | "grey" => (128, 128, 128),
        "orange" => (255, 165, 0),
        _ => return None,
    };
    Some(RgbColor::from_rgb8(r, g, b))
}

#[cfg(test)]
#[path = "../tests/unit/color.rs"]
mod tests;
