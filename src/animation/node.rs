use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use kurbo::Size;
use serde::{Deserialize, Serialize};

use crate::activity::{
    ActivityParams, ActivityQueue, ActivityRef, EventCallback, RepeatCount, TimerEventQueue,
};
use crate::clock::SharedClock;
use crate::color::HueDirection;
use crate::element::{Attribute, ElementRef};
use crate::expression::ValueExpr;
use crate::foundation::error::{SlideplayError, SlideplayResult};

use super::factory::{self, AnimationValues, PropertyAnimation};
use super::value::{CalcMode, ColorSpace, Interpolator, PropertyValue, ValueType};

/// Default simple duration for nodes without a usable `dur`.
const FALLBACK_DURATION: f64 = 0.001;

/// Descriptor field that may arrive as a JSON number, bool or string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl Scalar {
    fn text(&self) -> String {
        match self {
            Self::Number(v) => v.to_string(),
            Self::Bool(v) => v.to_string(),
            Self::Text(s) => s.trim().to_owned(),
        }
    }

    fn number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Bool(_) => None,
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    fn flag(&self) -> bool {
        match self {
            Self::Bool(v) => *v,
            Self::Number(v) => *v != 0.0,
            Self::Text(s) => s.trim().eq_ignore_ascii_case("true"),
        }
    }
}

/// Declarative description of one animation node, as shipped with a slide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationNodeInfo {
    pub id: Option<String>,
    pub node_name: String,
    pub target_element: Option<String>,
    pub sub_item: Option<String>,
    pub attribute_name: Option<String>,
    pub transform_type: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub by: Option<String>,
    pub values: Option<String>,
    pub key_times: Option<String>,
    pub calc_mode: Option<String>,
    pub accumulate: Option<String>,
    pub formula: Option<String>,
    pub color_interpolation: Option<String>,
    pub color_interpolation_direction: Option<String>,
    pub begin: Option<Scalar>,
    pub dur: Option<Scalar>,
    pub repeat_count: Option<Scalar>,
    #[serde(alias = "autoreverse")]
    pub auto_reverse: Option<Scalar>,
    pub accelerate: Option<Scalar>,
    pub decelerate: Option<Scalar>,
    pub fill: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    Animate,
    Set,
    AnimateColor,
    AnimateTransform,
}

impl NodeKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "animate" => Some(Self::Animate),
            "set" => Some(Self::Set),
            "animatecolor" => Some(Self::AnimateColor),
            "animatetransform" => Some(Self::AnimateTransform),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeState {
    Invalid,
    Unresolved,
    Resolved,
    Active,
    Frozen,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FillMode {
    /// Restore the element once the node ends.
    Remove,
    /// Keep the final animated value.
    Freeze,
}

/// Parse a duration such as `1.5`, `"2s"`, `"250ms"` or `"indefinite"`.
pub fn parse_duration(value: &Scalar) -> Option<f64> {
    let text = match value {
        Scalar::Number(v) => return (v.is_finite() && *v >= 0.0).then_some(*v),
        Scalar::Bool(_) => return None,
        Scalar::Text(s) => s.trim().to_ascii_lowercase(),
    };
    let (digits, unit) = if let Some(d) = text.strip_suffix("ms") {
        (d, 0.001)
    } else if let Some(d) = text.strip_suffix("min") {
        (d, 60.0)
    } else if let Some(d) = text.strip_suffix('s') {
        (d, 1.0)
    } else if let Some(d) = text.strip_suffix('h') {
        (d, 3600.0)
    } else {
        (text.as_str(), 1.0)
    };
    let v: f64 = digits.trim().parse().ok()?;
    (v.is_finite() && v >= 0.0).then_some(v * unit)
}

/// Timing attributes shared by every node kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeTiming {
    /// Seconds between the slide's effects starting and this node starting.
    pub begin: f64,
    /// Simple duration; `None` for indefinite or missing.
    pub duration: Option<f64>,
    pub repeat: RepeatCountRepr,
    pub auto_reverse: bool,
    pub acceleration: f64,
    pub deceleration: f64,
    pub fill: FillMode,
}

/// Serializable mirror of [`RepeatCount`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatCountRepr {
    Finite(f64),
    Indefinite,
}

impl From<RepeatCountRepr> for RepeatCount {
    fn from(value: RepeatCountRepr) -> Self {
        match value {
            RepeatCountRepr::Finite(n) => RepeatCount::Finite(n),
            RepeatCountRepr::Indefinite => RepeatCount::Indefinite,
        }
    }
}

impl NodeTiming {
    pub fn parse(info: &AnimationNodeInfo) -> Self {
        let duration = info.dur.as_ref().and_then(parse_duration);
        let begin = match &info.begin {
            Some(value) => parse_duration(value).unwrap_or_else(|| {
                tracing::debug!(?value, "begin is not an offset, starting with the slide");
                0.0
            }),
            None => 0.0,
        };

        let repeat = match &info.repeat_count {
            Some(v) if v.text().eq_ignore_ascii_case("indefinite") => RepeatCountRepr::Indefinite,
            Some(v) => RepeatCountRepr::Finite(v.number().filter(|n| *n > 0.0).unwrap_or(1.0)),
            None => RepeatCountRepr::Finite(1.0),
        };

        let fraction = |v: &Option<Scalar>| {
            v.as_ref()
                .and_then(Scalar::number)
                .map_or(0.0, |n| n.clamp(0.0, 1.0))
        };
        let mut acceleration = fraction(&info.accelerate);
        let mut deceleration = fraction(&info.decelerate);
        if acceleration + deceleration > 1.0 {
            acceleration = 0.0;
            deceleration = 0.0;
        }

        let fill = match info.fill.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("remove") => FillMode::Remove,
            Some("freeze" | "hold" | "transition") => FillMode::Freeze,
            _ => {
                if repeat != RepeatCountRepr::Finite(1.0) || duration.is_some() {
                    FillMode::Remove
                } else {
                    FillMode::Freeze
                }
            }
        };

        Self {
            begin,
            duration,
            repeat,
            auto_reverse: info.auto_reverse.as_ref().is_some_and(Scalar::flag),
            acceleration,
            deceleration,
            fill,
        }
    }
}

/// What a slide's nodes share: the master clock and slide geometry.
#[derive(Debug, Clone)]
pub struct NodeContext {
    pub master: SharedClock,
    pub slide_size: Size,
    pub minimum_frames_per_second: f64,
}

pub type NodeRef = Rc<AnimationNode>;

/// One animation effect bound to an attribute of a shape.
#[derive(Debug)]
pub struct AnimationNode {
    id: usize,
    name: Option<String>,
    kind: Option<NodeKind>,
    timing: NodeTiming,
    target: Option<ElementRef>,
    attribute: Option<Attribute>,
    values: AnimationValues,
    min_frame_count: f64,
    master: SharedClock,
    state: Cell<NodeState>,
    scheduled: Cell<bool>,
    invalid_reason: Option<String>,
    activity: RefCell<Option<ActivityRef>>,
}

struct Parsed {
    kind: NodeKind,
    target: ElementRef,
    attribute: Attribute,
    values: AnimationValues,
}

impl AnimationNode {
    /// Parse `info`. Malformed descriptors yield a node in [`NodeState::Invalid`].
    #[tracing::instrument(skip(info, ctx, elements), fields(node = ?info.id))]
    pub fn parse(
        id: usize,
        info: &AnimationNodeInfo,
        ctx: &NodeContext,
        elements: &BTreeMap<String, ElementRef>,
    ) -> Self {
        let timing = NodeTiming::parse(info);
        let min_fps = ctx.minimum_frames_per_second;
        let min_frame_count = timing
            .duration
            .map_or(min_fps, |d| (d * min_fps).clamp(1.0, min_fps.max(1.0)));

        let mut node = Self {
            id,
            name: info.id.clone(),
            kind: NodeKind::parse(&info.node_name),
            timing,
            target: None,
            attribute: None,
            values: AnimationValues::default(),
            min_frame_count,
            master: ctx.master.clone(),
            state: Cell::new(NodeState::Unresolved),
            scheduled: Cell::new(false),
            invalid_reason: None,
            activity: RefCell::new(None),
        };

        match Self::parse_effect(info, elements) {
            Ok(parsed) => {
                node.kind = Some(parsed.kind);
                node.target = Some(parsed.target);
                node.attribute = Some(parsed.attribute);
                node.values = parsed.values;
            }
            Err(err) => {
                tracing::warn!(node = id, "animation node is invalid: {err}");
                node.invalid_reason = Some(err.to_string());
                node.state.set(NodeState::Invalid);
            }
        }
        node
    }

    fn parse_effect(
        info: &AnimationNodeInfo,
        elements: &BTreeMap<String, ElementRef>,
    ) -> SlideplayResult<Parsed> {
        let kind = NodeKind::parse(&info.node_name).ok_or_else(|| {
            SlideplayError::animation(format!("unknown node \"{}\"", info.node_name))
        })?;
        let target_hash = info
            .target_element
            .as_deref()
            .ok_or_else(|| SlideplayError::animation("missing targetElement"))?;
        let target = elements.get(target_hash).cloned().ok_or_else(|| {
            SlideplayError::animation(format!("unknown target element \"{target_hash}\""))
        })?;

        let attribute_name = match kind {
            NodeKind::AnimateTransform => info
                .transform_type
                .as_deref()
                .or(info.attribute_name.as_deref()),
            _ => info.attribute_name.as_deref(),
        }
        .ok_or_else(|| SlideplayError::animation("missing attributeName"))?;
        let attribute = Attribute::parse(attribute_name).ok_or_else(|| {
            SlideplayError::animation(format!("unsupported attribute \"{attribute_name}\""))
        })?;
        let ty = attribute.value_type();

        let (space, direction) = if kind == NodeKind::AnimateColor {
            if ty != ValueType::Color {
                return Err(SlideplayError::animation(format!(
                    "animateColor cannot drive \"{}\"",
                    attribute.name()
                )));
            }
            let space = match info.color_interpolation.as_deref() {
                Some(name) => ColorSpace::parse(name).ok_or_else(|| {
                    SlideplayError::animation(format!("unknown color space \"{name}\""))
                })?,
                None => ColorSpace::Rgb,
            };
            let direction = match info.color_interpolation_direction.as_deref().map(str::trim) {
                Some(d) if d.eq_ignore_ascii_case("counter-clockwise") => {
                    HueDirection::CounterClockwise
                }
                _ => HueDirection::Clockwise,
            };
            (space, direction)
        } else {
            (ColorSpace::Rgb, HueDirection::Clockwise)
        };

        let env = target.borrow().expr_env();
        let parse = |text: &Option<String>| -> SlideplayResult<Option<PropertyValue>> {
            text.as_deref()
                .map(|t| PropertyValue::parse(t, ty, &env))
                .transpose()
        };

        let mut values = AnimationValues {
            from: parse(&info.from)?,
            to: parse(&info.to)?,
            by: parse(&info.by)?,
            interpolator: Interpolator::select(ty, space, direction),
            ..AnimationValues::default()
        };
        if let Some(list) = info.values.as_deref() {
            values.values = split_list(list)
                .map(|v| PropertyValue::parse(v, ty, &env))
                .collect::<SlideplayResult<_>>()?;
        }
        if let Some(list) = info.key_times.as_deref() {
            values.key_times = split_list(list)
                .map(|k| {
                    k.parse::<f64>().map_err(|_| {
                        SlideplayError::animation(format!("invalid key time \"{k}\""))
                    })
                })
                .collect::<SlideplayResult<_>>()?;
        }
        values.calc_mode = match info.calc_mode.as_deref() {
            Some(mode) => CalcMode::parse(mode).unwrap_or_else(|| {
                tracing::warn!(mode, "unknown calcMode, using linear");
                CalcMode::Linear
            }),
            None => CalcMode::Linear,
        };
        values.cumulative = info
            .accumulate
            .as_deref()
            .is_some_and(|a| a.trim().eq_ignore_ascii_case("sum"))
            && ty.is_interpolable();

        if let Some(formula) = info.formula.as_deref().filter(|f| !f.trim().is_empty()) {
            let formula = ValueExpr::parse(formula)?;
            if ty != ValueType::Number {
                tracing::debug!(formula = formula.source(), "formula ignored for non-numeric attribute");
            }
            values.formula = Some(formula);
        }
        Self::finish(kind, target, attribute, values)
    }

    fn finish(
        kind: NodeKind,
        target: ElementRef,
        attribute: Attribute,
        mut values: AnimationValues,
    ) -> SlideplayResult<Parsed> {
        if kind == NodeKind::Set {
            let to = values
                .to
                .take()
                .ok_or_else(|| SlideplayError::animation("set node without \"to\" value"))?;
            values.values = vec![to];
            values.key_times = vec![0.0, 1.0];
            values.from = None;
            values.by = None;
            values.calc_mode = CalcMode::Discrete;
        } else {
            if values.values.is_empty()
                && values.from.is_none()
                && values.to.is_none()
                && values.by.is_none()
            {
                return Err(SlideplayError::animation(
                    "node has neither values nor from/to/by",
                ));
            }
            if !values.values.is_empty()
                && !values.key_times.is_empty()
                && values.key_times.len() != values.values.len()
            {
                return Err(SlideplayError::animation(format!(
                    "{} key times for {} values",
                    values.key_times.len(),
                    values.values.len()
                )));
            }
        }
        Ok(Parsed {
            kind,
            target,
            attribute,
            values,
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn kind(&self) -> Option<NodeKind> {
        self.kind
    }

    pub fn state(&self) -> NodeState {
        self.state.get()
    }

    pub fn is_valid(&self) -> bool {
        self.state.get() != NodeState::Invalid
    }

    /// Waiting for its begin offset to elapse.
    pub fn is_scheduled(&self) -> bool {
        self.scheduled.get()
    }

    pub fn invalid_reason(&self) -> Option<&str> {
        self.invalid_reason.as_deref()
    }

    pub fn timing(&self) -> &NodeTiming {
        &self.timing
    }

    pub fn attribute(&self) -> Option<Attribute> {
        self.attribute
    }

    pub fn target(&self) -> Option<&ElementRef> {
        self.target.as_ref()
    }

    pub fn interpolator(&self) -> Option<Interpolator> {
        self.values.interpolator
    }

    pub fn min_frame_count(&self) -> f64 {
        self.min_frame_count
    }

    pub fn activity(&self) -> Option<ActivityRef> {
        self.activity.borrow().clone()
    }

    pub fn activity_params(&self) -> ActivityParams {
        let min_duration = match self.timing.duration.filter(|d| *d > 0.0) {
            Some(d) => d,
            None => {
                tracing::debug!(node = self.id, "no usable duration, using fallback");
                FALLBACK_DURATION
            }
        };
        ActivityParams {
            repeat: self.timing.repeat.into(),
            auto_reverse: self.timing.auto_reverse,
            min_duration,
            min_frame_count: self.min_frame_count,
            key_times: Vec::new(),
            acceleration: self.timing.acceleration,
            deceleration: self.timing.deceleration,
        }
    }

    /// Build the activity for this node: property adapter plus interpolator.
    pub fn create_activity(&self) -> Option<ActivityRef> {
        let (Some(target), Some(attribute)) = (&self.target, self.attribute) else {
            return None;
        };
        let animation =
            PropertyAnimation::new(target.clone(), attribute, self.values.formula.clone());
        Some(factory::create_activity(
            self.activity_params(),
            &self.values,
            animation,
            &self.master,
        ))
    }

    /// Create the activity if needed; the node becomes resolved.
    pub fn init(&self) -> bool {
        if !self.is_valid() {
            return false;
        }
        if self.activity.borrow().is_none() {
            let activity = self.create_activity();
            *self.activity.borrow_mut() = activity;
        }
        if matches!(
            self.state.get(),
            NodeState::Unresolved | NodeState::Frozen | NodeState::Ended
        ) {
            self.state.set(NodeState::Resolved);
        }
        self.activity.borrow().is_some()
    }

    fn runnable_activity(&self) -> Option<ActivityRef> {
        let activity = self.activity()?;
        if !activity.borrow().is_valid() {
            tracing::warn!(node = self.id, "animation node has an unusable activity");
            return None;
        }
        Some(activity)
    }

    /// Start the effect: arm the activity and hand it to `queue`.
    pub fn activate(self: &Rc<Self>, queue: &mut ActivityQueue) -> bool {
        if self.state.get() == NodeState::Active || !self.init() {
            return false;
        }
        let Some(activity) = self.runnable_activity() else {
            return false;
        };
        if !queue.add_activity(activity.clone()) {
            return false;
        }
        if let Some(target) = &self.target {
            target.borrow_mut().save_state(self.id);
        }

        let node = Rc::downgrade(self);
        let on_end: EventCallback = Rc::new(move |_queue: &mut ActivityQueue| {
            if let Some(node) = node.upgrade() {
                node.deactivate();
            }
        });
        activity.borrow_mut().activate(Some(on_end));
        tracing::debug!(node = self.id, attribute = ?self.attribute, "animation node active");
        self.state.set(NodeState::Active);
        true
    }

    /// Activate now, or once `begin` seconds have passed on the timer queue.
    pub fn resolve(
        self: &Rc<Self>,
        queue: &mut ActivityQueue,
        events: &mut TimerEventQueue,
    ) -> bool {
        let begin = self.timing.begin;
        if begin <= 0.0 {
            return self.activate(queue);
        }
        if self.state.get() == NodeState::Active || self.scheduled.get() || !self.init() {
            return false;
        }
        if self.runnable_activity().is_none() {
            return false;
        }

        let node = Rc::downgrade(self);
        let start: EventCallback = Rc::new(move |queue: &mut ActivityQueue| {
            if let Some(node) = node.upgrade() {
                if node.scheduled.replace(false) {
                    node.activate(queue);
                }
            }
        });
        events.add_callback(start, begin);
        self.scheduled.set(true);
        tracing::debug!(node = self.id, begin, "animation node scheduled");
        true
    }

    /// Forget a pending begin. Returns whether one was pending.
    pub fn cancel_begin(&self) -> bool {
        self.scheduled.replace(false)
    }

    /// Called when the activity has ended; applies the fill behavior.
    pub fn deactivate(&self) {
        if self.state.get() != NodeState::Active {
            return;
        }
        if let Some(activity) = self.activity.borrow().as_ref() {
            activity.borrow_mut().dispose();
        }
        let next = match self.timing.fill {
            FillMode::Freeze => NodeState::Frozen,
            FillMode::Remove => NodeState::Ended,
        };
        if let Some(target) = &self.target {
            let mut target = target.borrow_mut();
            if next == NodeState::Ended {
                target.restore_state(self.id);
            } else {
                target.discard_state(self.id);
            }
        }
        tracing::debug!(node = self.id, state = ?next, "animation node deactivated");
        self.state.set(next);
    }

    /// Skip to the final state; deactivation follows through the timer queue.
    pub fn end(&self, events: &mut TimerEventQueue) {
        if self.state.get() != NodeState::Active {
            return;
        }
        if let Some(activity) = self.activity.borrow().as_ref() {
            activity.borrow_mut().end(events);
        }
    }

    /// Undo what this node applied to its element so it can run again.
    pub fn rewind(&self) {
        self.scheduled.set(false);
        if let Some(activity) = self.activity.borrow().as_ref() {
            activity.borrow_mut().dispose();
        }
        let state = self.state.get();
        if state == NodeState::Active {
            if let Some(target) = &self.target {
                target.borrow_mut().restore_state(self.id);
            }
        }
        if matches!(state, NodeState::Active | NodeState::Frozen | NodeState::Ended) {
            self.state.set(NodeState::Resolved);
        }
    }

    pub fn dispose(&self) {
        self.scheduled.set(false);
        if let Some(activity) = self.activity.borrow().as_ref() {
            activity.borrow_mut().dispose();
        }
        if self.state.get() == NodeState::Active {
            self.state.set(NodeState::Ended);
        }
    }
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(';').map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
#[path = "../../tests/unit/animation/node.rs"]
mod tests;
