use super::*;

use kurbo::Size;

use crate::clock::{ElapsedTime, ManualTimeSource};

fn shapes() -> Vec<ShapeInfo> {
    serde_json::from_str(
        r#"[
            {"hash":"a","x":0,"y":0,"width":100,"height":100},
            {"hash":"b","x":200,"y":0,"width":100,"height":100},
            {"hash":"a","x":5,"y":5,"width":1,"height":1}
        ]"#,
    )
    .unwrap()
}

fn nodes() -> Vec<AnimationNodeInfo> {
    serde_json::from_str(
        r#"[
            {"nodeName":"animate","targetElement":"a","attributeName":"opacity","from":"0","to":"1","dur":"1s","fill":"freeze"},
            {"nodeName":"animate","targetElement":"b","attributeName":"x","by":"0.1","dur":"2s","fill":"freeze"},
            {"nodeName":"animate","targetElement":"ghost","attributeName":"x","to":"0"}
        ]"#,
    )
    .unwrap()
}

struct Rig {
    source: Rc<ManualTimeSource>,
    events: TimerEventQueue,
    queue: ActivityQueue,
    slide: SlideAnimations,
}

impl Rig {
    fn new() -> Self {
        let source = Rc::new(ManualTimeSource::new(0.0));
        let master = Rc::new(ElapsedTime::new(source.clone()));
        let ctx = NodeContext {
            master: master.clone(),
            slide_size: Size::new(1000.0, 1000.0),
            minimum_frames_per_second: 10.0,
        };
        Self {
            events: TimerEventQueue::new(master.clone()),
            queue: ActivityQueue::new(master),
            slide: SlideAnimations::new("slide-1", &shapes(), &nodes(), &ctx),
            source,
        }
    }

    fn tick_at(&mut self, now: f64) {
        self.source.set(now);
        self.events.process(&mut self.queue);
        self.queue.process(&mut self.events);
        self.queue.process_dequeued();
    }
}

#[test]
fn duplicate_shapes_and_unknown_targets_are_skipped() {
    let rig = Rig::new();
    let slide = &rig.slide;
    assert_eq!(slide.hash(), "slide-1");
    assert_eq!(slide.elements().count(), 2);
    assert_eq!(
        slide.element("a").unwrap().borrow().base_bounds().width(),
        100.0
    );
    assert!(slide.is_animated());

    let states: Vec<NodeState> = slide.nodes().iter().map(|n| n.state()).collect();
    assert_eq!(
        states,
        [NodeState::Resolved, NodeState::Resolved, NodeState::Invalid]
    );
}

#[test]
fn start_runs_every_valid_node_to_completion() {
    let mut rig = Rig::new();
    assert_eq!(rig.slide.start(&mut rig.queue, &mut rig.events), 2);
    assert!(!rig.slide.all_finished());

    rig.tick_at(0.0);
    rig.tick_at(1.0);
    rig.tick_at(1.5);
    assert!(!rig.slide.all_finished());
    rig.tick_at(2.0);
    rig.tick_at(2.1);
    assert!(rig.slide.all_finished());

    let snapshot = rig.slide.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[0].hash, "a");
    assert_eq!(snapshot[0].state.opacity, 1.0);
    assert!((snapshot[1].state.center.x - 350.0).abs() < 1e-6);
    assert!(snapshot.iter().all(|s| !s.animated));
}

#[test]
fn end_freezes_everything_at_once() {
    let mut rig = Rig::new();
    rig.slide.start(&mut rig.queue, &mut rig.events);
    rig.tick_at(0.0);
    rig.slide.end(&mut rig.queue, &mut rig.events);
    rig.events.force_empty(&mut rig.queue);
    assert!(rig.slide.all_finished());
    assert_eq!(
        rig.slide.element("a").unwrap().borrow().state().opacity,
        1.0
    );
}

#[test]
fn slide_without_nodes_is_not_animated() {
    let source = Rc::new(ManualTimeSource::new(0.0));
    let ctx = NodeContext {
        master: Rc::new(ElapsedTime::new(source)),
        slide_size: Size::new(10.0, 10.0),
        minimum_frames_per_second: 10.0,
    };
    let slide = SlideAnimations::new("empty", &shapes(), &[], &ctx);
    assert!(!slide.is_animated());
    assert!(slide.all_finished());
    slide.dispose();
}

#[test]
fn restarting_begins_from_the_loaded_shapes() {
    let mut rig = Rig::new();
    rig.slide.start(&mut rig.queue, &mut rig.events);
    rig.tick_at(0.0);
    rig.slide.end(&mut rig.queue, &mut rig.events);
    rig.events.force_empty(&mut rig.queue);
    let moved = rig.slide.element("b").unwrap().borrow().state().center.x;
    assert!((moved - 350.0).abs() < 1e-6);

    rig.queue.clear();
    rig.slide.start(&mut rig.queue, &mut rig.events);
    rig.slide.end(&mut rig.queue, &mut rig.events);
    rig.events.force_empty(&mut rig.queue);
    let again = rig.slide.element("b").unwrap().borrow().state().center.x;
    assert!((again - 350.0).abs() < 1e-6);
}

#[test]
fn delayed_node_keeps_the_slide_busy() {
    let source = Rc::new(ManualTimeSource::new(0.0));
    let master = Rc::new(ElapsedTime::new(source.clone()));
    let ctx = NodeContext {
        master: master.clone(),
        slide_size: Size::new(1000.0, 1000.0),
        minimum_frames_per_second: 10.0,
    };
    let infos: Vec<AnimationNodeInfo> = serde_json::from_str(
        r#"[{"nodeName":"set","targetElement":"a","attributeName":"visibility",
             "to":"hidden","dur":"1s","begin":"2s","fill":"freeze"}]"#,
    )
    .unwrap();
    let mut rig = Rig {
        events: TimerEventQueue::new(master.clone()),
        queue: ActivityQueue::new(master),
        slide: SlideAnimations::new("delayed", &shapes(), &infos, &ctx),
        source,
    };

    assert_eq!(rig.slide.start(&mut rig.queue, &mut rig.events), 1);
    assert!(rig.slide.has_started());
    rig.tick_at(1.0);
    assert!(!rig.slide.all_finished());
    assert!(rig.slide.element("a").unwrap().borrow().state().visible);

    rig.slide.end(&mut rig.queue, &mut rig.events);
    rig.events.force_empty(&mut rig.queue);
    assert!(rig.slide.all_finished());
    assert!(!rig.slide.element("a").unwrap().borrow().state().visible);
}

#[test]
fn rewind_puts_every_element_back() {
    let mut rig = Rig::new();
    assert!(!rig.slide.has_started());
    rig.slide.start(&mut rig.queue, &mut rig.events);
    rig.tick_at(0.0);
    rig.tick_at(1.5);

    rig.slide.rewind();
    rig.queue.clear();
    let a = rig.slide.element("a").unwrap().borrow().state().clone();
    let b = rig.slide.element("b").unwrap().borrow().state().clone();
    assert_eq!(a.opacity, 1.0);
    assert!((b.center.x - 250.0).abs() < 1e-6);
    assert!(!rig.slide.has_started());
    assert!(rig.slide.all_finished());
}
