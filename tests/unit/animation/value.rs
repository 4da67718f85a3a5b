use super::*;

fn env() -> ExprEnv {
    ExprEnv {
        x: 0.25,
        y: 0.5,
        width: 0.5,
        height: 0.25,
        param: 0.0,
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn numbers_are_expressions_over_geometry() {
    let v = PropertyValue::parse("x + width/2", ValueType::Number, &env()).unwrap();
    assert_eq!(v, PropertyValue::Number(0.5));
    assert!(PropertyValue::parse("x +", ValueType::Number, &env()).is_err());
}

#[test]
fn tuples_need_exactly_two_parts() {
    let v = PropertyValue::parse("1, height*4", ValueType::Tuple, &env()).unwrap();
    assert_eq!(v, PropertyValue::Tuple(Vec2::new(1.0, 1.0)));
    assert!(PropertyValue::parse("1", ValueType::Tuple, &env()).is_err());
    assert!(PropertyValue::parse("1,2,3", ValueType::Tuple, &env()).is_err());
}

#[test]
fn strings_and_bools_parse_verbatim() {
    assert_eq!(
        PropertyValue::parse(" hidden ", ValueType::Enum, &env()).unwrap(),
        PropertyValue::String("hidden".to_owned())
    );
    assert_eq!(
        PropertyValue::parse("On", ValueType::Bool, &env()).unwrap(),
        PropertyValue::Bool(true)
    );
    assert!(PropertyValue::parse("maybe", ValueType::Bool, &env()).is_err());
}

#[test]
fn arithmetic_only_for_interpolable_values() {
    let a = PropertyValue::Tuple(Vec2::new(1.0, 2.0));
    let b = PropertyValue::Tuple(Vec2::new(0.5, 0.5));
    assert_eq!(a.add(&b), Some(PropertyValue::Tuple(Vec2::new(1.5, 2.5))));
    assert_eq!(a.scale(2.0), Some(PropertyValue::Tuple(Vec2::new(2.0, 4.0))));
    assert_eq!(a.add(&PropertyValue::Number(1.0)), None);
    assert_eq!(PropertyValue::String("a".into()).scale(2.0), None);
    assert_eq!(PropertyValue::Number(3.0).as_number(), Some(3.0));
}

#[test]
fn selection_follows_value_type_and_color_space() {
    let cw = HueDirection::Clockwise;
    assert_eq!(
        Interpolator::select(ValueType::Number, ColorSpace::Hsl, cw),
        Some(Interpolator::Number)
    );
    assert_eq!(
        Interpolator::select(ValueType::Color, ColorSpace::Rgb, cw),
        Some(Interpolator::Rgb)
    );
    assert_eq!(
        Interpolator::select(ValueType::Color, ColorSpace::Hsl, HueDirection::CounterClockwise),
        Some(Interpolator::Hsl(HueDirection::CounterClockwise))
    );
    assert_eq!(Interpolator::select(ValueType::Enum, ColorSpace::Rgb, cw), None);
    assert!(!ValueType::String.is_interpolable());
}

#[test]
fn hsl_direction_picks_the_hue_sweep() {
    let red = PropertyValue::Color(RgbColor::new(1.0, 0.0, 0.0));
    let green = PropertyValue::Color(RgbColor::new(0.0, 1.0, 0.0));

    let Some(PropertyValue::Color(c)) =
        Interpolator::Hsl(HueDirection::Clockwise).interpolate(&red, &green, 0.5)
    else {
        panic!("expected a color");
    };
    assert!(close(c.r, 0.0) && close(c.g, 0.0) && close(c.b, 1.0), "{c:?}");

    let Some(PropertyValue::Color(c)) =
        Interpolator::Hsl(HueDirection::CounterClockwise).interpolate(&red, &green, 0.5)
    else {
        panic!("expected a color");
    };
    assert!(close(c.r, 1.0) && close(c.g, 1.0) && close(c.b, 0.0), "{c:?}");
}

#[test]
fn mismatched_operands_do_not_interpolate() {
    let n = PropertyValue::Number(1.0);
    let c = PropertyValue::Color(RgbColor::BLACK);
    assert_eq!(Interpolator::Number.interpolate(&n, &c, 0.5), None);
    assert_eq!(
        Interpolator::Number.interpolate(&n, &PropertyValue::Number(3.0), 0.25),
        Some(PropertyValue::Number(1.5))
    );
}

#[test]
fn modes_parse_case_insensitively() {
    assert_eq!(CalcMode::parse("Discrete"), Some(CalcMode::Discrete));
    assert_eq!(CalcMode::parse("bounce"), None);
    assert_eq!(ColorSpace::parse(" HSL"), Some(ColorSpace::Hsl));
    assert_eq!(CalcMode::default(), CalcMode::Linear);
}
