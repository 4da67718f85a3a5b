use super::*;
use std::cell::Cell;

use crate::clock::{ElapsedTime, ManualTimeSource};

#[derive(Clone, Debug, PartialEq)]
enum Seen {
    Start,
    Frame(Frame),
    End(bool),
    EndAnimation,
}

struct Recorder(Rc<RefCell<Vec<Seen>>>);

impl ActivityHook for Recorder {
    fn start_animation(&mut self) {
        self.0.borrow_mut().push(Seen::Start);
    }

    fn perform(&mut self, frame: Frame) {
        self.0.borrow_mut().push(Seen::Frame(frame));
    }

    fn perform_end(&mut self, auto_reverse: bool) {
        self.0.borrow_mut().push(Seen::End(auto_reverse));
    }

    fn end_animation(&mut self) {
        self.0.borrow_mut().push(Seen::EndAnimation);
    }
}

struct Rig {
    source: Rc<ManualTimeSource>,
    master: SharedClock,
    events: TimerEventQueue,
    queue: ActivityQueue,
}

impl Rig {
    fn new() -> Self {
        let source = Rc::new(ManualTimeSource::new(0.0));
        let master = Rc::new(ElapsedTime::new(source.clone()));
        Self {
            events: TimerEventQueue::new(master.clone()),
            queue: ActivityQueue::new(master.clone()),
            source,
            master,
        }
    }

    fn spawn(
        &self,
        params: ActivityParams,
        mode: TimingMode,
    ) -> (ActivityRef, Rc<RefCell<Vec<Seen>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let activity = Activity::new(params, mode, &self.master, Box::new(Recorder(log.clone())));
        (activity, log)
    }

    fn tick(&mut self) {
        self.events.process(&mut self.queue);
        self.queue.process(&mut self.events);
        self.queue.process_dequeued();
    }
}

fn frames(log: &Rc<RefCell<Vec<Seen>>>) -> Vec<Frame> {
    log.borrow()
        .iter()
        .filter_map(|seen| match seen {
            Seen::Frame(frame) => Some(*frame),
            _ => None,
        })
        .collect()
}

fn unit_params() -> ActivityParams {
    ActivityParams {
        min_duration: 1.0,
        min_frame_count: 1.0,
        ..ActivityParams::default()
    }
}

#[test]
fn accelerated_time_shapes_within_unit_range() {
    let params = ActivityParams {
        acceleration: 0.5,
        deceleration: 0.5,
        ..ActivityParams::default()
    };
    assert_eq!(params.accelerated_time(0.0), 0.0);
    assert!((params.accelerated_time(0.25) - 0.125).abs() < 1e-12);
    assert!((params.accelerated_time(0.5) - 0.5).abs() < 1e-12);
    assert!((params.accelerated_time(1.0) - 1.0).abs() < 1e-12);
    assert!((params.accelerated_time(7.0) - 1.0).abs() < 1e-12);
}

#[test]
fn accelerated_time_ignores_oversized_fractions() {
    let params = ActivityParams {
        acceleration: 0.75,
        deceleration: 0.5,
        ..ActivityParams::default()
    };
    assert_eq!(params.accelerated_time(0.3), 0.3);
}

#[test]
fn repeat_limit_ignores_non_positive_counts() {
    assert_eq!(RepeatCount::Finite(2.0).limit(), Some(2.0));
    assert_eq!(RepeatCount::Finite(0.0).limit(), None);
    assert_eq!(RepeatCount::Indefinite.limit(), None);
}

#[test]
fn continuous_activity_runs_to_its_duration() {
    let mut rig = Rig::new();
    let (activity, log) = rig.spawn(unit_params(), TimingMode::Continuous);
    activity.borrow_mut().activate(None);
    assert!(rig.queue.add_activity(activity.clone()));

    rig.tick();
    rig.source.advance(0.5);
    rig.tick();
    rig.source.advance(0.75);
    rig.tick();

    assert_eq!(
        frames(&log),
        vec![
            Frame::Continuous { t: 0.0, repeat: 0 },
            Frame::Continuous { t: 0.5, repeat: 0 },
            Frame::Continuous { t: 1.0, repeat: 0 },
        ]
    );
    assert_eq!(log.borrow()[0], Seen::Start);
    assert_eq!(log.borrow().last(), Some(&Seen::EndAnimation));
    assert_eq!(activity.borrow().state(), ActivityState::Ended);
    assert!(rig.queue.is_empty());
}

#[test]
fn auto_reverse_runs_backwards_on_odd_passes() {
    let mut rig = Rig::new();
    let params = ActivityParams {
        auto_reverse: true,
        ..unit_params()
    };
    let (activity, log) = rig.spawn(params, TimingMode::Continuous);
    activity.borrow_mut().activate(None);
    rig.queue.add_activity(activity.clone());

    rig.tick();
    rig.source.advance(0.25);
    rig.tick();
    rig.source.advance(1.25);
    rig.tick();
    rig.source.advance(1.0);
    rig.tick();

    assert_eq!(
        frames(&log),
        vec![
            Frame::Continuous { t: 0.0, repeat: 0 },
            Frame::Continuous { t: 0.25, repeat: 0 },
            Frame::Continuous { t: 0.5, repeat: 0 },
            Frame::Continuous { t: 0.0, repeat: 1 },
        ]
    );
    assert!(!activity.borrow().is_active());
}

#[test]
fn key_time_activity_reports_segment_positions() {
    let mut rig = Rig::new();
    let params = ActivityParams {
        key_times: vec![0.0, 0.5, 1.0],
        repeat: RepeatCount::Indefinite,
        ..unit_params()
    };
    let (activity, log) = rig.spawn(params, TimingMode::KeyTimes);
    activity.borrow_mut().activate(None);
    rig.queue.add_activity(activity.clone());

    rig.tick();
    rig.source.advance(0.75);
    rig.tick();

    assert_eq!(
        frames(&log)[1],
        Frame::KeyTime {
            index: 1,
            fraction: 0.5,
            repeat: 0
        }
    );
    assert!(activity.borrow().is_active());
}

#[test]
fn discrete_activity_wakes_for_each_key_time() {
    let mut rig = Rig::new();
    let params = ActivityParams {
        key_times: vec![0.0, 0.5],
        ..unit_params()
    };
    let (activity, log) = rig.spawn(params, TimingMode::Discrete);
    let ended = Rc::new(Cell::new(false));
    let flag = ended.clone();
    let on_end: EventCallback = Rc::new(move |_queue: &mut ActivityQueue| flag.set(true));
    activity.borrow_mut().activate(Some(on_end));
    rig.queue.add_activity(activity.clone());

    rig.tick();
    assert_eq!(frames(&log), vec![Frame::Discrete { index: 0, repeat: 0 }]);
    assert!(rig.queue.is_empty());
    assert_eq!(rig.events.len(), 1);
    assert_eq!(rig.events.next_timeout(), Some(0.5));

    rig.source.advance(0.25);
    rig.tick();
    assert_eq!(frames(&log).len(), 1);

    rig.source.advance(0.25);
    rig.tick();
    assert_eq!(
        frames(&log),
        vec![
            Frame::Discrete { index: 0, repeat: 0 },
            Frame::Discrete { index: 1, repeat: 0 },
        ]
    );
    assert_eq!(activity.borrow().state(), ActivityState::Ended);

    rig.tick();
    assert!(ended.get());
}

#[test]
fn end_shows_final_state_once() {
    let mut rig = Rig::new();
    let params = ActivityParams {
        auto_reverse: true,
        ..unit_params()
    };
    let (activity, log) = rig.spawn(params, TimingMode::Continuous);
    let on_end: EventCallback = Rc::new(|_queue: &mut ActivityQueue| {});
    activity.borrow_mut().activate(Some(on_end));

    activity.borrow_mut().end(&mut rig.events);
    activity.borrow_mut().end(&mut rig.events);

    assert_eq!(
        *log.borrow(),
        vec![Seen::Start, Seen::End(true), Seen::EndAnimation]
    );
    assert_eq!(rig.events.len(), 1);
    assert!(activity.borrow().is_disposed());
}

#[test]
fn disposed_activity_ignores_pending_wakeup() {
    let mut rig = Rig::new();
    let params = ActivityParams {
        key_times: vec![0.0, 0.5],
        ..unit_params()
    };
    let (activity, log) = rig.spawn(params, TimingMode::Discrete);
    activity.borrow_mut().activate(None);
    rig.queue.add_activity(activity.clone());
    rig.tick();

    activity.borrow_mut().dispose();
    activity.borrow_mut().dispose();
    assert!(activity.borrow().is_disposed());

    rig.source.advance(1.0);
    rig.tick();
    assert_eq!(frames(&log).len(), 1);
    assert_eq!(rig.queue.size(), 0);
}

#[test]
fn inactive_activity_does_not_perform() {
    let mut rig = Rig::new();
    let (activity, log) = rig.spawn(unit_params(), TimingMode::Continuous);
    assert_eq!(activity.borrow().state(), ActivityState::Inactive);
    assert_eq!(activity.borrow_mut().calc_time_lag(), 0.0);
    assert!(!activity.borrow_mut().perform(&mut rig.events));
    assert!(log.borrow().is_empty());
}

#[cfg(not(feature = "strict-checks"))]
#[test]
fn malformed_key_times_make_activity_invalid() {
    let mut rig = Rig::new();
    let params = ActivityParams {
        key_times: vec![0.25, 1.0],
        ..unit_params()
    };
    let (activity, _log) = rig.spawn(params, TimingMode::KeyTimes);
    assert!(!activity.borrow().is_valid());
    assert!(!rig.queue.add_activity(activity));
    rig.tick();
    assert_eq!(rig.queue.size(), 0);
}
