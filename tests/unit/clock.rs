use super::*;

fn manual(start: f64) -> (Rc<ManualTimeSource>, ElapsedTime) {
    let source = Rc::new(ManualTimeSource::new(start));
    let clock = ElapsedTime::new(source.clone());
    (source, clock)
}

#[test]
fn elapsed_time_follows_source() {
    let (source, clock) = manual(10.0);
    assert_eq!(clock.elapsed_time(), 0.0);
    source.advance(1.5);
    assert_eq!(clock.elapsed_time(), 1.5);
}

#[test]
fn pause_and_continue_keep_time_continuous() {
    let (source, clock) = manual(0.0);
    source.advance(2.25);
    let before = clock.elapsed_time();
    clock.pause_timer();
    source.advance(7.5);
    assert_eq!(clock.elapsed_time(), before);
    clock.continue_timer();
    assert_eq!(clock.elapsed_time(), before);
    source.advance(0.5);
    assert_eq!(clock.elapsed_time(), before + 0.5);
}

#[test]
fn repeated_pauses_stay_continuous() {
    let (source, clock) = manual(0.0);
    for _ in 0..4 {
        source.advance(0.25);
        let before = clock.elapsed_time();
        clock.pause_timer();
        source.advance(3.0);
        clock.continue_timer();
        assert_eq!(clock.elapsed_time(), before);
    }
    assert_eq!(clock.elapsed_time(), 1.0);
}

#[test]
fn second_hold_keeps_first_instant() {
    let (source, clock) = manual(0.0);
    source.advance(1.0);
    clock.hold_timer();
    source.advance(2.0);
    clock.hold_timer();
    assert_eq!(clock.elapsed_time(), 1.0);
    clock.release_timer();
    assert!(!clock.is_held());
    assert_eq!(clock.elapsed_time(), 3.0);
}

#[test]
fn adjust_while_held_shifts_frozen_value() {
    let (source, clock) = manual(0.0);
    source.advance(4.0);
    clock.hold_timer();
    clock.adjust_timer(-1.0, false);
    assert_eq!(clock.elapsed_time(), 3.0);
    clock.release_timer();
    assert_eq!(clock.elapsed_time(), 3.0);
}

#[test]
fn adjust_respects_last_queried_limit() {
    let (source, clock) = manual(0.0);
    source.advance(2.0);
    assert_eq!(clock.elapsed_time(), 2.0);
    source.advance(0.5);
    clock.adjust_timer(-1.0, true);
    assert_eq!(clock.elapsed_time(), 2.0);
}

#[test]
fn child_clock_follows_parent_adjustments() {
    let (source, parent) = manual(0.0);
    let parent = Rc::new(parent);
    source.advance(1.0);
    let child = ElapsedTime::with_parent(parent.clone());
    assert!(child.parent().is_some());
    source.advance(0.5);
    assert_eq!(child.elapsed_time(), 0.5);
    parent.adjust_timer(-0.25, false);
    assert_eq!(child.elapsed_time(), 0.25);
    parent.hold_timer();
    source.advance(10.0);
    assert_eq!(child.elapsed_time(), 0.25);
}

#[test]
fn reset_restarts_from_zero() {
    let (source, clock) = manual(0.0);
    source.advance(3.0);
    clock.pause_timer();
    clock.reset();
    assert!(!clock.is_paused());
    assert_eq!(clock.elapsed_time(), 0.0);
    source.advance(1.0);
    assert_eq!(clock.elapsed_time(), 1.0);
}
