//! Activity hooks that write interpolated values into element attributes.

use crate::activity::{Activity, ActivityHook, ActivityParams, ActivityRef, Frame, TimingMode};
use crate::clock::SharedClock;
use crate::element::{Attribute, ElementRef};
use crate::expression::ValueExpr;

use super::value::{CalcMode, Interpolator, PropertyValue};

/// Binds one attribute of one element to an activity.
pub(crate) struct PropertyAnimation {
    element: ElementRef,
    attribute: Attribute,
    formula: Option<ValueExpr>,
    started: bool,
}

impl PropertyAnimation {
    pub(crate) fn new(element: ElementRef, attribute: Attribute, formula: Option<ValueExpr>) -> Self {
        Self {
            element,
            attribute,
            formula,
            started: false,
        }
    }

    fn start(&mut self) {
        if !self.started {
            self.started = true;
            self.element.borrow_mut().notify_animation_start();
        }
    }

    fn end(&mut self) {
        if self.started {
            self.started = false;
            self.element.borrow_mut().notify_animation_end();
        }
    }

    fn underlying(&self) -> PropertyValue {
        self.element.borrow().get(self.attribute)
    }

    fn apply(&self, value: PropertyValue) {
        let value = match (&self.formula, value) {
            (Some(formula), PropertyValue::Number(v)) => {
                let env = self.element.borrow().expr_env().with_param(v);
                PropertyValue::Number(formula.eval(&env))
            }
            (_, value) => value,
        };
        self.element.borrow_mut().set(self.attribute, &value);
    }
}

/// Adds `repeat` copies of `last` to `value` for cumulative animations.
fn accumulate(value: PropertyValue, last: &PropertyValue, repeat: u32) -> PropertyValue {
    if repeat == 0 {
        return value;
    }
    last.scale(f64::from(repeat))
        .and_then(|offset| offset.add(&value))
        .unwrap_or(value)
}

/// Steps or blends through an explicit list of values.
pub(crate) struct ValueListHook {
    animation: PropertyAnimation,
    values: Vec<PropertyValue>,
    interpolator: Option<Interpolator>,
    cumulative: bool,
}

impl ValueListHook {
    fn value_at(&self, index: usize, fraction: Option<f64>, repeat: u32) -> Option<PropertyValue> {
        let last = self.values.last()?;
        let index = index.min(self.values.len() - 1);
        let from = &self.values[index];
        let value = match (fraction, self.interpolator, self.values.get(index + 1)) {
            (Some(t), Some(interpolator), Some(to)) => interpolator
                .interpolate(from, to, t)
                .unwrap_or_else(|| from.clone()),
            _ => from.clone(),
        };
        Some(if self.cumulative {
            accumulate(value, last, repeat)
        } else {
            value
        })
    }
}

impl ActivityHook for ValueListHook {
    fn start_animation(&mut self) {
        self.animation.start();
    }

    fn perform(&mut self, frame: Frame) {
        let value = match frame {
            Frame::KeyTime {
                index,
                fraction,
                repeat,
            } => self.value_at(index, Some(fraction), repeat),
            Frame::Discrete { index, repeat } => self.value_at(index, None, repeat),
            Frame::Continuous { t, repeat } => {
                let segments = self.values.len().saturating_sub(1);
                let scaled = t * segments as f64;
                let index = (scaled.floor() as usize).min(segments.saturating_sub(1));
                self.value_at(index, Some(scaled - index as f64), repeat)
            }
        };
        if let Some(value) = value {
            self.animation.apply(value);
        }
    }

    fn perform_end(&mut self, auto_reverse: bool) {
        let value = if auto_reverse {
            self.values.first()
        } else {
            self.values.last()
        };
        if let Some(value) = value.cloned() {
            self.animation.apply(value);
        }
    }

    fn end_animation(&mut self) {
        self.animation.end();
    }
}

/// Animates between `from`/`to`/`by` endpoints resolved when the animation starts.
pub(crate) struct FromToByHook {
    animation: PropertyAnimation,
    from: Option<PropertyValue>,
    to: Option<PropertyValue>,
    by: Option<PropertyValue>,
    interpolator: Option<Interpolator>,
    cumulative: bool,
    start_value: Option<PropertyValue>,
    end_value: Option<PropertyValue>,
    interpolation_start: Option<PropertyValue>,
    previous_value: Option<PropertyValue>,
    dynamic_start: bool,
    iteration: u32,
}

impl FromToByHook {
    fn resolve_endpoints(&mut self) {
        let underlying = self.animation.underlying();
        let sum = |a: &PropertyValue, b: &PropertyValue| a.add(b).unwrap_or_else(|| b.clone());
        self.dynamic_start = false;
        let (start, end) = match (&self.from, &self.to, &self.by) {
            (Some(from), Some(to), _) => (from.clone(), to.clone()),
            (Some(from), None, Some(by)) => (from.clone(), sum(from, by)),
            (None, Some(to), _) => {
                self.dynamic_start = true;
                (underlying, to.clone())
            }
            (None, None, Some(by)) => {
                let end = sum(&underlying, by);
                (underlying, end)
            }
            (Some(from), None, None) => (from.clone(), from.clone()),
            (None, None, None) => (underlying.clone(), underlying),
        };
        self.interpolation_start = Some(start.clone());
        self.start_value = Some(start);
        self.end_value = Some(end);
        self.previous_value = None;
        self.iteration = 0;
    }

    fn blend(&mut self, t: f64, repeat: u32) -> Option<PropertyValue> {
        let end = self.end_value.clone()?;
        if self.dynamic_start {
            if self.iteration != repeat {
                self.iteration = repeat;
                self.interpolation_start = self.start_value.clone();
            } else {
                let actual = self.animation.underlying();
                if self.previous_value.as_ref() != Some(&actual) {
                    self.interpolation_start = Some(actual);
                }
            }
        }
        let start = self.interpolation_start.clone()?;
        let value = match self.interpolator {
            Some(interpolator) => interpolator
                .interpolate(&start, &end, t)
                .unwrap_or_else(|| if t < 1.0 { start.clone() } else { end.clone() }),
            None if t < 1.0 => start,
            None => end.clone(),
        };
        Some(if self.cumulative && !self.dynamic_start {
            accumulate(value, &end, repeat)
        } else {
            value
        })
    }
}

impl ActivityHook for FromToByHook {
    fn start_animation(&mut self) {
        self.animation.start();
        self.resolve_endpoints();
    }

    fn perform(&mut self, frame: Frame) {
        let value = match frame {
            Frame::Continuous { t, repeat } => self.blend(t, repeat),
            Frame::KeyTime {
                fraction, repeat, ..
            } => self.blend(fraction, repeat),
            Frame::Discrete { index, repeat } => {
                let value = if index == 0 {
                    self.start_value.clone()
                } else {
                    self.end_value.clone()
                };
                match (value, &self.end_value) {
                    (Some(v), Some(end)) if self.cumulative => Some(accumulate(v, end, repeat)),
                    (v, _) => v,
                }
            }
        };
        if let Some(value) = value {
            self.animation.apply(value);
            if self.dynamic_start {
                self.previous_value = Some(self.animation.underlying());
            }
        }
    }

    fn perform_end(&mut self, auto_reverse: bool) {
        let value = if auto_reverse {
            self.start_value.clone()
        } else {
            self.end_value.clone()
        };
        if let Some(value) = value {
            self.animation.apply(value);
        }
    }

    fn end_animation(&mut self) {
        self.animation.end();
    }
}

/// Parsed value description of an animation node.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct AnimationValues {
    pub(crate) values: Vec<PropertyValue>,
    pub(crate) key_times: Vec<f64>,
    pub(crate) from: Option<PropertyValue>,
    pub(crate) to: Option<PropertyValue>,
    pub(crate) by: Option<PropertyValue>,
    pub(crate) calc_mode: CalcMode,
    pub(crate) cumulative: bool,
    pub(crate) interpolator: Option<Interpolator>,
    pub(crate) formula: Option<ValueExpr>,
}

impl AnimationValues {
    /// Timing mode and key times the activity will run with.
    pub(crate) fn timing(&self) -> (TimingMode, Vec<f64>) {
        let discrete = self.calc_mode == CalcMode::Discrete || self.interpolator.is_none();
        if !self.values.is_empty() {
            let n = self.values.len();
            let discrete = discrete || n < 2;
            let key_times = if !self.key_times.is_empty() {
                self.key_times.clone()
            } else if discrete {
                (0..n).map(|i| i as f64 / n as f64).collect()
            } else {
                (0..n).map(|i| i as f64 / (n - 1) as f64).collect()
            };
            let mode = if discrete {
                TimingMode::Discrete
            } else {
                TimingMode::KeyTimes
            };
            (mode, key_times)
        } else if discrete {
            let key_times = if self.key_times.is_empty() {
                vec![0.0, 0.5]
            } else {
                self.key_times.clone()
            };
            (TimingMode::Discrete, key_times)
        } else {
            (TimingMode::Continuous, Vec::new())
        }
    }
}

/// Build the activity animating `animation` with `values`.
pub(crate) fn create_activity(
    mut params: ActivityParams,
    values: &AnimationValues,
    animation: PropertyAnimation,
    master: &SharedClock,
) -> ActivityRef {
    let (mode, key_times) = values.timing();
    params.key_times = key_times;

    let hook: Box<dyn ActivityHook> = if !values.values.is_empty() {
        Box::new(ValueListHook {
            animation,
            values: values.values.clone(),
            interpolator: values.interpolator,
            cumulative: values.cumulative,
        })
    } else {
        Box::new(FromToByHook {
            animation,
            from: values.from.clone(),
            to: values.to.clone(),
            by: values.by.clone(),
            interpolator: values.interpolator,
            cumulative: values.cumulative,
            start_value: None,
            end_value: None,
            interpolation_start: None,
            previous_value: None,
            dynamic_start: false,
            iteration: 0,
        })
    };
    Activity::new(params, mode, master, hook)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/factory.rs"]
mod tests;
