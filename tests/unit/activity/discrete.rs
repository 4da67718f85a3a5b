use super::*;

#[test]
fn auto_reverse_folds_frames_into_triangle_wave() {
    let indices: Vec<usize> = (0..8).map(|calls| discrete_frame_index(calls, 4, true)).collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4, 3, 2, 1]);

    let repeats: Vec<u64> = (0..17).map(|calls| discrete_repeat_count(calls, 4, true)).collect();
    assert!(repeats[..8].iter().all(|r| *r == 0));
    assert!(repeats[8..16].iter().all(|r| *r == 1));
    assert_eq!(repeats[16], 2);
}

#[test]
fn forward_frames_wrap_per_repeat() {
    let indices: Vec<usize> = (0..6).map(|calls| discrete_frame_index(calls, 3, false)).collect();
    assert_eq!(indices, vec![0, 1, 2, 0, 1, 2]);
    assert_eq!(discrete_repeat_count(2, 3, false), 0);
    assert_eq!(discrete_repeat_count(3, 3, false), 1);
}

#[test]
fn empty_vector_is_harmless() {
    assert_eq!(discrete_frame_index(5, 0, true), 0);
    assert_eq!(discrete_repeat_count(5, 0, false), 0);
}

#[test]
fn wakeup_time_never_lies_in_the_past() {
    let wakeup = Wakeup {
        elapsed: 2.0,
        next_time: 0.5,
    };
    assert_eq!(wakeup.time(10.0), 10.0);

    let wakeup = Wakeup {
        elapsed: 0.25,
        next_time: 1.0,
    };
    assert_eq!(wakeup.time(10.0), 10.75);
}

#[test]
fn repeat_budget_stops_rescheduling() {
    use std::rc::Rc;

    use crate::activity::RepeatCount;
    use crate::clock::{ElapsedTime, ManualTimeSource};

    let master = Rc::new(ElapsedTime::new(Rc::new(ManualTimeSource::new(0.0))));
    let mut timing = DiscreteTiming::new(&master);
    let params = ActivityParams {
        key_times: vec![0.0, 0.5],
        repeat: RepeatCount::Finite(2.0),
        min_duration: 2.0,
        ..ActivityParams::default()
    };
    timing.activate();
    timing.start();

    let delays: Vec<Option<f64>> = (0..4)
        .map(|_| timing.advance(&params).map(|w| w.time(0.0)))
        .collect();
    assert_eq!(delays, vec![Some(1.0), Some(2.0), Some(3.0), None]);
    assert!(!timing.is_charged());
}
