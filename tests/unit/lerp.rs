use super::*;

fn assert_pos(pos: LerpPosition, index: usize, fraction: f64) {
    assert_eq!(pos.index, index, "{pos:?}");
    assert!((pos.fraction - fraction).abs() < 1e-12, "{pos:?}");
}

#[test]
fn finds_segment_and_fraction() {
    let mut lerp = KeyStopLerp::new(vec![0.0, 0.3, 0.7, 1.0]);
    assert_pos(lerp.lerp(0.5), 1, 0.5);
    assert_pos(lerp.lerp(1.0), 2, 1.0);
}

#[test]
fn starts_in_first_segment() {
    let mut lerp = KeyStopLerp::new(vec![0.0, 0.5, 1.0]);
    assert_pos(lerp.lerp(0.0), 0, 0.0);
    assert_pos(lerp.lerp(0.25), 0, 0.5);
    assert_pos(lerp.lerp(0.5), 0, 1.0);
    assert_pos(lerp.lerp(0.75), 1, 0.5);
}

#[test]
fn skips_zero_length_segments() {
    let mut lerp = KeyStopLerp::new(vec![0.0, 0.5, 0.5, 1.0]);
    assert_pos(lerp.lerp(0.75), 2, 0.5);
}

#[test]
fn equal_first_stops_do_not_divide_by_zero() {
    let mut lerp = KeyStopLerp::new(vec![0.0, 0.0, 1.0]);
    let pos = lerp.lerp(0.0);
    assert_eq!(pos.index, 0);
    assert!(pos.fraction.is_finite());
    assert_pos(lerp.lerp(0.5), 1, 0.5);
}

#[test]
fn smaller_alpha_rescans_from_start() {
    let mut lerp = KeyStopLerp::new(vec![0.0, 0.25, 0.5, 1.0]);
    assert_pos(lerp.lerp(0.75), 2, 0.5);
    assert_pos(lerp.lerp(0.125), 0, 0.5);
}

#[test]
fn fraction_is_clamped() {
    let mut lerp = KeyStopLerp::new(vec![0.0, 0.5, 1.0]);
    assert_pos(lerp.lerp(-1.0), 0, 0.0);
    assert_pos(lerp.lerp(2.0), 1, 1.0);
}

#[test]
fn reset_rewinds_cursor() {
    let mut lerp = KeyStopLerp::new(vec![0.0, 0.5, 1.0]);
    lerp.lerp(0.9);
    lerp.reset();
    assert_pos(lerp.lerp(0.5), 0, 1.0);
}

#[cfg(not(feature = "strict-checks"))]
#[test]
fn short_vector_falls_back_to_unit_range() {
    let mut lerp = KeyStopLerp::new(vec![0.0]);
    assert_eq!(lerp.key_stops(), &[0.0, 1.0]);
    assert_pos(lerp.lerp(0.25), 0, 0.25);
}
