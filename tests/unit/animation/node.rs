use super::*;

use kurbo::Rect;

use crate::clock::{ElapsedTime, ManualTimeSource};
use crate::element::AnimatedElement;

struct Rig {
    source: Rc<ManualTimeSource>,
    ctx: NodeContext,
    events: TimerEventQueue,
    queue: ActivityQueue,
    elements: BTreeMap<String, ElementRef>,
}

impl Rig {
    fn new() -> Self {
        let source = Rc::new(ManualTimeSource::new(0.0));
        let master = Rc::new(ElapsedTime::new(source.clone()));
        let slide_size = Size::new(1000.0, 1000.0);
        let element =
            AnimatedElement::new("s1", Rect::new(0.0, 0.0, 100.0, 100.0), slide_size).into_ref();
        Self {
            events: TimerEventQueue::new(master.clone()),
            queue: ActivityQueue::new(master.clone()),
            ctx: NodeContext {
                master,
                slide_size,
                minimum_frames_per_second: 10.0,
            },
            elements: BTreeMap::from([("s1".to_owned(), element)]),
            source,
        }
    }

    fn node(&self, json: &str) -> NodeRef {
        let info: AnimationNodeInfo = serde_json::from_str(json).unwrap();
        Rc::new(AnimationNode::parse(0, &info, &self.ctx, &self.elements))
    }

    fn tick_at(&mut self, now: f64) {
        self.source.set(now);
        self.events.process(&mut self.queue);
        self.queue.process(&mut self.events);
        self.queue.process_dequeued();
    }

    fn opacity(&self) -> f64 {
        self.elements["s1"].borrow().state().opacity
    }
}

fn info(json: &str) -> AnimationNodeInfo {
    serde_json::from_str(json).unwrap()
}

#[test]
fn durations_accept_units_and_indefinite() {
    assert_eq!(parse_duration(&Scalar::Number(1.5)), Some(1.5));
    assert_eq!(parse_duration(&Scalar::Text("2s".into())), Some(2.0));
    assert_eq!(parse_duration(&Scalar::Text("250ms".into())), Some(0.25));
    assert_eq!(parse_duration(&Scalar::Text("1min".into())), Some(60.0));
    assert_eq!(parse_duration(&Scalar::Text("indefinite".into())), None);
    assert_eq!(parse_duration(&Scalar::Text("-1".into())), None);
}

#[test]
fn timing_defaults_and_repeat_parsing() {
    let t = NodeTiming::parse(&info(r#"{"nodeName":"animate"}"#));
    assert_eq!(t.duration, None);
    assert_eq!(t.repeat, RepeatCountRepr::Finite(1.0));
    assert!(!t.auto_reverse);
    assert_eq!(t.fill, FillMode::Freeze);

    let t = NodeTiming::parse(&info(
        r#"{"nodeName":"animate","dur":"1s","repeatCount":"indefinite","autoreverse":"true"}"#,
    ));
    assert_eq!(t.duration, Some(1.0));
    assert_eq!(t.repeat, RepeatCountRepr::Indefinite);
    assert!(t.auto_reverse);

    let t = NodeTiming::parse(&info(r#"{"nodeName":"animate","repeatCount":"often"}"#));
    assert_eq!(t.repeat, RepeatCountRepr::Finite(1.0));
    let t = NodeTiming::parse(&info(r#"{"nodeName":"animate","repeatCount":2.5}"#));
    assert_eq!(t.repeat, RepeatCountRepr::Finite(2.5));
}

#[test]
fn oversized_acceleration_is_dropped() {
    let t = NodeTiming::parse(&info(
        r#"{"nodeName":"animate","accelerate":"0.7","decelerate":0.5}"#,
    ));
    assert_eq!((t.acceleration, t.deceleration), (0.0, 0.0));

    let t = NodeTiming::parse(&info(
        r#"{"nodeName":"animate","accelerate":"0.25","decelerate":"x"}"#,
    ));
    assert_eq!((t.acceleration, t.deceleration), (0.25, 0.0));
}

#[test]
fn auto_fill_removes_timed_effects() {
    let fill = |json: &str| NodeTiming::parse(&info(json)).fill;
    assert_eq!(fill(r#"{"nodeName":"animate","dur":"1s"}"#), FillMode::Remove);
    assert_eq!(fill(r#"{"nodeName":"animate","repeatCount":"2"}"#), FillMode::Remove);
    assert_eq!(fill(r#"{"nodeName":"animate","dur":"indefinite"}"#), FillMode::Freeze);
    assert_eq!(fill(r#"{"nodeName":"animate","dur":"1s","fill":"hold"}"#), FillMode::Freeze);
    assert_eq!(fill(r#"{"nodeName":"animate","fill":"remove"}"#), FillMode::Remove);
}

#[test]
fn min_frame_count_is_clamped() {
    let rig = Rig::new();
    let count = |dur: &str| {
        rig.node(&format!(
            r#"{{"nodeName":"animate","targetElement":"s1","attributeName":"opacity","to":"1","dur":"{dur}"}}"#
        ))
        .min_frame_count()
    };
    assert_eq!(count("0.05s"), 1.0);
    assert_eq!(count("0.5s"), 5.0);
    assert_eq!(count("3s"), 10.0);
    assert_eq!(count("indefinite"), 10.0);
}

#[test]
fn malformed_nodes_are_invalid() {
    let rig = Rig::new();
    for json in [
        r#"{"nodeName":"animate","targetElement":"nope","attributeName":"opacity","to":"1"}"#,
        r#"{"nodeName":"animate","attributeName":"opacity","to":"1"}"#,
        r#"{"nodeName":"animate","targetElement":"s1","attributeName":"zoom","to":"1"}"#,
        r#"{"nodeName":"animate","targetElement":"s1","attributeName":"opacity"}"#,
        r#"{"nodeName":"animateColor","targetElement":"s1","attributeName":"opacity","to":"1"}"#,
        r#"{"nodeName":"set","targetElement":"s1","attributeName":"opacity"}"#,
        r#"{"nodeName":"animate","targetElement":"s1","attributeName":"opacity","values":"0;1","keyTimes":"0"}"#,
        r#"{"nodeName":"animate","targetElement":"s1","attributeName":"opacity","to":"1 +"}"#,
        r#"{"nodeName":"wobble","targetElement":"s1","attributeName":"opacity","to":"1"}"#,
    ] {
        let node = rig.node(json);
        assert_eq!(node.state(), NodeState::Invalid, "{json}");
        assert!(node.invalid_reason().is_some());
        assert!(node.create_activity().is_none());
    }
}

#[test]
fn color_and_transform_nodes_resolve_their_attribute() {
    let rig = Rig::new();
    let color = rig.node(
        r##"{"nodeName":"animateColor","targetElement":"s1","attributeName":"fillColor",
            "to":"#00ff00","colorInterpolation":"hsl","colorInterpolationDirection":"counter-clockwise"}"##,
    );
    assert_eq!(color.kind(), Some(NodeKind::AnimateColor));
    assert_eq!(
        color.interpolator(),
        Some(Interpolator::Hsl(HueDirection::CounterClockwise))
    );

    let transform = rig.node(
        r#"{"nodeName":"animateTransform","targetElement":"s1","transformType":"rotate","by":"90"}"#,
    );
    assert_eq!(transform.attribute(), Some(Attribute::Rotate));
    assert!(transform.is_valid());
}

#[test]
fn missing_duration_falls_back_to_a_millisecond() {
    let rig = Rig::new();
    let node = rig.node(
        r#"{"nodeName":"animate","targetElement":"s1","attributeName":"opacity","to":"0"}"#,
    );
    assert_eq!(node.activity_params().min_duration, FALLBACK_DURATION);
    assert!(node.init());
    assert_eq!(node.state(), NodeState::Resolved);
}

#[test]
fn remove_fill_restores_the_element() {
    let mut rig = Rig::new();
    let node = rig.node(
        r#"{"nodeName":"animate","targetElement":"s1","attributeName":"opacity","from":"1","to":"0","dur":"1s"}"#,
    );
    assert!(node.activate(&mut rig.queue));
    assert_eq!(node.state(), NodeState::Active);

    rig.tick_at(0.0);
    rig.tick_at(0.5);
    assert!((rig.opacity() - 0.5).abs() < 1e-9);
    rig.tick_at(1.0);
    rig.tick_at(1.1);
    assert_eq!(node.state(), NodeState::Ended);
    assert_eq!(rig.opacity(), 1.0);
    assert!(rig.queue.is_empty());
}

#[test]
fn freeze_fill_keeps_the_final_value() {
    let mut rig = Rig::new();
    let node = rig.node(
        r#"{"nodeName":"animate","targetElement":"s1","attributeName":"opacity","to":"0.3","dur":"1s","fill":"freeze"}"#,
    );
    assert!(node.activate(&mut rig.queue));
    rig.tick_at(0.0);
    rig.tick_at(1.0);
    rig.tick_at(1.1);
    assert_eq!(node.state(), NodeState::Frozen);
    assert!((rig.opacity() - 0.3).abs() < 1e-9);
}

#[test]
fn end_skips_to_the_final_state() {
    let mut rig = Rig::new();
    let node = rig.node(
        r#"{"nodeName":"animate","targetElement":"s1","attributeName":"opacity","to":"0.2","dur":"10s","fill":"freeze"}"#,
    );
    assert!(node.activate(&mut rig.queue));
    rig.tick_at(0.0);
    node.end(&mut rig.events);
    rig.events.force_empty(&mut rig.queue);
    assert_eq!(node.state(), NodeState::Frozen);
    assert!((rig.opacity() - 0.2).abs() < 1e-9);
}

#[test]
fn set_holds_its_value_for_the_duration() {
    let mut rig = Rig::new();
    let node = rig.node(
        r#"{"nodeName":"set","targetElement":"s1","attributeName":"visibility","to":"hidden","dur":"2s"}"#,
    );
    assert!(node.activate(&mut rig.queue));
    rig.tick_at(0.0);
    assert!(!rig.elements["s1"].borrow().state().visible);
    rig.tick_at(1.0);
    assert_eq!(node.state(), NodeState::Active);
    rig.tick_at(2.0);
    rig.tick_at(2.1);
    assert_eq!(node.state(), NodeState::Ended);
    assert!(rig.elements["s1"].borrow().state().visible);
}

#[test]
fn invalid_nodes_never_activate() {
    let mut rig = Rig::new();
    let node = rig.node(r#"{"nodeName":"animate","targetElement":"s1"}"#);
    assert!(!node.activate(&mut rig.queue));
    assert!(rig.queue.is_empty());
}

#[test]
fn dispose_stops_a_running_node() {
    let mut rig = Rig::new();
    let node = rig.node(
        r#"{"nodeName":"animate","targetElement":"s1","attributeName":"opacity","to":"0","dur":"1s"}"#,
    );
    assert!(node.activate(&mut rig.queue));
    rig.tick_at(0.0);
    node.dispose();
    assert_eq!(node.state(), NodeState::Ended);
    rig.tick_at(0.5);
    assert!(rig.queue.is_empty());
}

#[test]
#[cfg(not(feature = "strict-checks"))]
fn unusable_key_times_are_never_armed_or_queued() {
    let mut rig = Rig::new();
    let node = rig.node(
        r#"{"nodeName":"animate","targetElement":"s1","attributeName":"opacity",
            "values":"0;1","keyTimes":"0.2;1","dur":"1s"}"#,
    );
    assert!(node.is_valid());
    assert!(!node.activate(&mut rig.queue));

    let activity = node.activity().unwrap();
    assert!(!activity.borrow().is_valid());
    assert!(!activity.borrow().is_active());
    assert_eq!(rig.queue.size(), 0);
    assert_ne!(node.state(), NodeState::Active);
    assert!(!rig.elements["s1"].borrow_mut().restore_state(node.id()));
}

#[test]
fn begin_offsets_parse_like_durations() {
    let t = NodeTiming::parse(&info(r#"{"nodeName":"animate","begin":"500ms"}"#));
    assert_eq!(t.begin, 0.5);
    let t = NodeTiming::parse(&info(r#"{"nodeName":"animate","begin":2}"#));
    assert_eq!(t.begin, 2.0);
    let t = NodeTiming::parse(&info(r#"{"nodeName":"animate","begin":"on click"}"#));
    assert_eq!(t.begin, 0.0);
    let t = NodeTiming::parse(&info(r#"{"nodeName":"animate"}"#));
    assert_eq!(t.begin, 0.0);
}

#[test]
fn begin_offset_delays_activation() {
    let mut rig = Rig::new();
    let node = rig.node(
        r#"{"nodeName":"animate","targetElement":"s1","attributeName":"opacity",
            "from":"1","to":"0","dur":"1s","begin":"1s","fill":"freeze"}"#,
    );
    assert!(node.resolve(&mut rig.queue, &mut rig.events));
    assert!(node.is_scheduled());
    assert_eq!(node.state(), NodeState::Resolved);
    assert!(rig.queue.is_empty());

    rig.tick_at(0.5);
    assert!(node.is_scheduled());
    assert_eq!(rig.opacity(), 1.0);

    rig.tick_at(1.0);
    assert!(!node.is_scheduled());
    assert_eq!(node.state(), NodeState::Active);
    rig.tick_at(1.5);
    assert!((rig.opacity() - 0.5).abs() < 1e-9);
    rig.tick_at(2.0);
    rig.tick_at(2.1);
    assert_eq!(node.state(), NodeState::Frozen);
}

#[test]
fn cancelled_begin_never_fires() {
    let mut rig = Rig::new();
    let node = rig.node(
        r#"{"nodeName":"animate","targetElement":"s1","attributeName":"opacity",
            "to":"0","dur":"1s","begin":"1s"}"#,
    );
    assert!(node.resolve(&mut rig.queue, &mut rig.events));
    assert!(node.cancel_begin());
    assert!(!node.cancel_begin());
    rig.tick_at(1.5);
    assert_eq!(node.state(), NodeState::Resolved);
    assert!(rig.queue.is_empty());
}

#[test]
fn rewind_restores_a_running_node() {
    let mut rig = Rig::new();
    let node = rig.node(
        r#"{"nodeName":"animate","targetElement":"s1","attributeName":"opacity",
            "from":"1","to":"0","dur":"1s","fill":"freeze"}"#,
    );
    assert!(node.activate(&mut rig.queue));
    rig.tick_at(0.0);
    rig.tick_at(0.5);
    assert!((rig.opacity() - 0.5).abs() < 1e-9);

    node.rewind();
    assert_eq!(node.state(), NodeState::Resolved);
    assert_eq!(rig.opacity(), 1.0);
    assert!(node.activity().unwrap().borrow().is_disposed());

    rig.queue.clear();
    assert!(node.activate(&mut rig.queue));
    assert_eq!(node.state(), NodeState::Active);
}
