// Auto filters - default windows around a user's own measurement
use crate::domain::filter::{Filter, FilterError, SelectedFilter};
use crate::domain::grade::{GradeScale, IRCRA_MAX, IRCRA_MIN};
use crate::domain::measures::{MeasureClass, MeasureRegistry};
use crate::domain::snapshot::MeasureMap;
use crate::domain::units::{FeetInches, UnitValue, INCHES_PER_FOOT};

const WEIGHT_WINDOW_KG: f64 = 5.0;
const WEIGHT_WINDOW_LB: f64 = 10.0;
const LENGTH_WINDOW_CM: f64 = 5.0;
const LENGTH_WINDOW_INCH: f64 = 2.0;
const RELATIVE_WINDOW: f64 = 0.1;
const COUNT_MIN_WINDOW: f64 = 1.0;
const GRADE_STEPS_DOWN: i32 = -1;
const GRADE_STEPS_UP: i32 = 2;
const IRCRA_DOWN: f64 = 1.0;
const IRCRA_UP: f64 = 2.0;

// Keeps 1.75 m from widening to 1.69 m through float noise.
const ROUNDING_EPSILON: f64 = 1e-6;

/// Default filter around `value` for `measure_id`, in the unit the value was
/// entered in.
///
/// Grades get a window of one grade down and two up on their own scale; sex
/// yields a toggle on the same value.
pub fn min_max_input_values(
    measure_id: &str,
    value: &UnitValue,
    registry: &MeasureRegistry,
) -> Result<Filter, FilterError> {
    let spec = registry.require(measure_id)?;
    if !spec.allows_unit(value.unit()) {
        return Err(FilterError::UnitNotAllowed {
            measure_id: spec.id.clone(),
            unit: value.unit(),
        });
    }
    Ok(window_around(value))
}

fn window_around(value: &UnitValue) -> Filter {
    match *value {
        UnitValue::Kilogram(kg) => Filter::min_max(
            UnitValue::Kilogram(kg - WEIGHT_WINDOW_KG),
            UnitValue::Kilogram(kg + WEIGHT_WINDOW_KG),
        ),
        UnitValue::Pound(lb) => Filter::min_max(
            UnitValue::Pound(lb - WEIGHT_WINDOW_LB),
            UnitValue::Pound(lb + WEIGHT_WINDOW_LB),
        ),
        UnitValue::Meter(m) => {
            let (min_cm, max_cm) = whole_cm_window(m * 100.0);
            Filter::min_max(UnitValue::Meter(min_cm / 100.0), UnitValue::Meter(max_cm / 100.0))
        }
        UnitValue::Centimeter(cm) => {
            let (min_cm, max_cm) = whole_cm_window(cm);
            Filter::min_max(UnitValue::Centimeter(min_cm), UnitValue::Centimeter(max_cm))
        }
        UnitValue::Inch(inches) => Filter::min_max(
            UnitValue::Inch(inches - LENGTH_WINDOW_INCH),
            UnitValue::Inch(inches + LENGTH_WINDOW_INCH),
        ),
        UnitValue::FeetInches(ft_in) => {
            let total = ft_in.ft * INCHES_PER_FOOT + ft_in.inches;
            Filter::min_max(
                UnitValue::FeetInches(feet_inches(total - LENGTH_WINDOW_INCH)),
                UnitValue::FeetInches(feet_inches(total + LENGTH_WINDOW_INCH)),
            )
        }
        UnitValue::Count(count) => {
            let window = (count * RELATIVE_WINDOW).max(COUNT_MIN_WINDOW);
            Filter::min_max(
                UnitValue::Count((count - window).max(0.0)),
                UnitValue::Count(count + window),
            )
        }
        UnitValue::Second(seconds) => {
            let (min, max) = relative_window(seconds);
            Filter::min_max(UnitValue::Second(min), UnitValue::Second(max))
        }
        UnitValue::Month(months) => {
            let (min, max) = relative_window(months);
            Filter::min_max(UnitValue::Month(min), UnitValue::Month(max))
        }
        UnitValue::Year(years) => {
            let (min, max) = relative_window(years);
            Filter::min_max(UnitValue::Year(min), UnitValue::Year(max))
        }
        UnitValue::SexAtBirth(sex) => Filter::toggle(UnitValue::SexAtBirth(sex)),
        UnitValue::Ircra(ircra) => Filter::min_max(
            UnitValue::Ircra((ircra - IRCRA_DOWN).clamp(IRCRA_MIN, IRCRA_MAX)),
            UnitValue::Ircra((ircra + IRCRA_UP).clamp(IRCRA_MIN, IRCRA_MAX)),
        ),
        UnitValue::Vermin(grade) => grade_window(grade, UnitValue::Vermin),
        UnitValue::Font(grade) => grade_window(grade, UnitValue::Font),
        UnitValue::FrenchSport(grade) => grade_window(grade, UnitValue::FrenchSport),
        UnitValue::Yds(grade) => grade_window(grade, UnitValue::Yds),
        UnitValue::Ewbank(grade) => grade_window(grade, UnitValue::Ewbank),
    }
}

fn whole_cm_window(cm: f64) -> (f64, f64) {
    (
        (cm - LENGTH_WINDOW_CM + ROUNDING_EPSILON).floor(),
        (cm + LENGTH_WINDOW_CM - ROUNDING_EPSILON).ceil(),
    )
}

fn relative_window(value: f64) -> (f64, f64) {
    let window = value.abs() * RELATIVE_WINDOW;
    (value - window, value + window)
}

fn feet_inches(total_inches: f64) -> FeetInches {
    let total = total_inches.max(0.0);
    let ft = (total / INCHES_PER_FOOT).floor();
    FeetInches {
        ft,
        inches: total - ft * INCHES_PER_FOOT,
    }
}

fn grade_window<G: GradeScale>(grade: G, wrap: fn(G) -> UnitValue) -> Filter {
    Filter::min_max(wrap(grade.step(GRADE_STEPS_DOWN)), wrap(grade.step(GRADE_STEPS_UP)))
}

/// Filters matching people like the owner of `measures`: one per recorded
/// anthropometric or grade measure.
pub fn auto_filters(
    measures: &MeasureMap,
    registry: &MeasureRegistry,
) -> Result<Vec<SelectedFilter>, FilterError> {
    let mut filters = Vec::new();
    for (measure_id, value) in measures {
        let Some(spec) = registry.get(measure_id) else {
            continue;
        };
        if matches!(spec.class(), MeasureClass::Anthro | MeasureClass::Grade) {
            let filter = min_max_input_values(measure_id, value, registry)?;
            filters.push(SelectedFilter::new(measure_id.clone(), filter));
        }
    }
    Ok(filters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grade::{Font, VGrade, Yds};
    use crate::domain::measures::registry;
    use crate::domain::units::{Sex, UnitKind};
    use approx::assert_relative_eq;

    fn bounds(filter: Filter) -> (UnitValue, UnitValue) {
        match filter {
            Filter::MinMax {
                min_value: Some(min),
                max_value: Some(max),
            } => (min, max),
            other => panic!("expected a closed range, got {other:?}"),
        }
    }

    #[test]
    fn test_height_window_rounds_to_whole_centimeters() {
        let filter = min_max_input_values("height", &UnitValue::Meter(1.75), registry()).unwrap();
        let (min, max) = bounds(filter);
        let (UnitValue::Meter(min), UnitValue::Meter(max)) = (min, max) else {
            panic!("height window changed unit");
        };
        assert_relative_eq!(min, 1.70, epsilon = 1e-9);
        assert_relative_eq!(max, 1.80, epsilon = 1e-9);

        let filter =
            min_max_input_values("height", &UnitValue::Centimeter(172.4), registry()).unwrap();
        assert_eq!(
            bounds(filter),
            (UnitValue::Centimeter(167.0), UnitValue::Centimeter(178.0))
        );
    }

    #[test]
    fn test_weight_window_depends_on_unit() {
        let kg = min_max_input_values("weight", &UnitValue::Kilogram(70.0), registry()).unwrap();
        assert_eq!(bounds(kg), (UnitValue::Kilogram(65.0), UnitValue::Kilogram(75.0)));

        let lb = min_max_input_values("weight", &UnitValue::Pound(150.0), registry()).unwrap();
        assert_eq!(bounds(lb), (UnitValue::Pound(140.0), UnitValue::Pound(160.0)));
    }

    #[test]
    fn test_grade_window_steps_through_scale() {
        let filter = min_max_input_values(
            "grade:boulder:gym:project",
            &UnitValue::Font(Font::F7A),
            registry(),
        )
        .unwrap();
        assert_eq!(
            bounds(filter),
            (UnitValue::Font(Font::F6CPlus), UnitValue::Font(Font::F7B))
        );

        let lowest = VGrade::at(0);
        let filter = min_max_input_values(
            "grade:boulder:outdoor:flash",
            &UnitValue::Vermin(lowest),
            registry(),
        )
        .unwrap();
        assert_eq!(
            bounds(filter),
            (UnitValue::Vermin(lowest), UnitValue::Vermin(VGrade::at(2)))
        );

        let filter = min_max_input_values(
            "grade:sport:outdoor:flash",
            &UnitValue::Yds(Yds::Y511a),
            registry(),
        )
        .unwrap();
        assert_eq!(
            bounds(filter),
            (UnitValue::Yds(Yds::Y510d), UnitValue::Yds(Yds::Y511c))
        );
    }

    #[test]
    fn test_ircra_window_is_clamped() {
        let filter = min_max_input_values(
            "grade:sport:gym:flash",
            &UnitValue::Ircra(31.0),
            registry(),
        )
        .unwrap();
        assert_eq!(bounds(filter), (UnitValue::Ircra(30.0), UnitValue::Ircra(IRCRA_MAX)));
    }

    #[test]
    fn test_count_and_duration_windows() {
        let filter =
            min_max_input_values("maxreps:pullup", &UnitValue::Count(4.0), registry()).unwrap();
        assert_eq!(bounds(filter), (UnitValue::Count(3.0), UnitValue::Count(5.0)));

        let filter = min_max_input_values("age", &UnitValue::Year(30.0), registry()).unwrap();
        let (UnitValue::Year(min), UnitValue::Year(max)) = bounds(filter) else {
            panic!("age window changed unit");
        };
        assert_relative_eq!(min, 27.0, epsilon = 1e-9);
        assert_relative_eq!(max, 33.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sex_yields_toggle() {
        let filter = min_max_input_values(
            "sex-at-birth",
            &UnitValue::SexAtBirth(Sex::Male),
            registry(),
        )
        .unwrap();
        assert_eq!(filter, Filter::toggle(UnitValue::SexAtBirth(Sex::Male)));
    }

    #[test]
    fn test_rejects_foreign_unit() {
        assert_eq!(
            min_max_input_values("height", &UnitValue::Kilogram(70.0), registry()),
            Err(FilterError::UnitNotAllowed {
                measure_id: "height".to_string(),
                unit: UnitKind::Kilogram,
            })
        );
    }

    #[test]
    fn test_auto_filters_skip_performance_measures() {
        let measures = MeasureMap::from([
            ("height".to_string(), UnitValue::Meter(1.8)),
            ("weight".to_string(), UnitValue::Kilogram(70.0)),
            (
                "maxhang:20mm:7s:half-crimp".to_string(),
                UnitValue::Kilogram(20.0),
            ),
            ("not-a-measure".to_string(), UnitValue::Count(1.0)),
        ]);
        let filters = auto_filters(&measures, registry()).unwrap();
        let ids: Vec<&str> = filters.iter().map(|f| f.measure_id.as_str()).collect();
        assert_eq!(ids, vec!["height", "weight"]);
        assert!(filters.iter().all(|f| f.passes(&measures)));
    }
}
