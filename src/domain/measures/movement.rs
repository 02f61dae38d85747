// Strength and conditioning measures - weighted lifts, rep counts, holds
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use super::params::{
    parse_param, IsometricMovement, MaxRepsMovement, TrainedClass, WeightedMovement, REP_MAXES,
};
use super::training::TrainingParams;
use super::{
    match_id, no_such_param, MeasureClass, MeasureCodec, MeasureIdError, MeasureParams,
    MeasureSpec, ParamName,
};
use crate::domain::filter::Filter;
use crate::domain::units::{UnitKind, UnitValue};

static WEIGHTED_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^weighted:([a-z]+):(\d+)rm$").expect("weighted id pattern compiles")
});
static MAX_REPS_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^maxreps:([a-z-]+)$").expect("maxreps id pattern compiles"));
static ISOMETRIC_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^isometric:([a-z-]+)$").expect("isometric id pattern compiles")
});

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedParams {
    pub movement: WeightedMovement,
    pub rep_max: u32,
}

impl WeightedParams {
    /// Kilogram range a typical intermediate climber lands in.
    fn typical_range_kg(&self) -> (f64, f64) {
        match self.movement {
            WeightedMovement::Pullup => (0.0, 40.0),
            WeightedMovement::Dip => (0.0, 50.0),
            WeightedMovement::BenchPress => (40.0, 100.0),
            WeightedMovement::Squat => (60.0, 140.0),
            WeightedMovement::Deadlift => (80.0, 180.0),
        }
    }
}

impl MeasureCodec for WeightedParams {
    const CLASS: MeasureClass = MeasureClass::Weighted;
    const FORMAT: &'static str = "weighted:{movement}:{n}rm";

    fn generate(&self) -> String {
        format!("weighted:{}:{}rm", self.movement, self.rep_max)
    }

    fn parse(id: &str) -> Result<Self, MeasureIdError> {
        let captures = match_id::<Self>(&WEIGHTED_ID, id)?;
        Ok(WeightedParams {
            movement: parse_param(ParamName::Movement, &captures[1])?,
            rep_max: parse_param(ParamName::RepMax, &captures[2])?,
        })
    }

    fn combinations() -> Vec<Self> {
        WeightedMovement::ALL
            .iter()
            .flat_map(|&movement| {
                REP_MAXES
                    .into_iter()
                    .map(move |rep_max| WeightedParams { movement, rep_max })
            })
            .collect()
    }

    fn spec(&self) -> MeasureSpec {
        let (min, max) = self.typical_range_kg();
        let added = match self.movement {
            WeightedMovement::Pullup | WeightedMovement::Dip => {
                " Count only the weight added on top of your body weight."
            }
            _ => "",
        };
        MeasureSpec {
            id: self.generate(),
            name: format!("Weighted {}: {}RM", self.movement.label(), self.rep_max),
            description: format!(
                "The most weight you can move for {} clean {}.{added}",
                self.rep_max,
                if self.rep_max == 1 { "rep" } else { "reps" }
            ),
            units: vec![UnitKind::Kilogram, UnitKind::Pound],
            initial_filter: Filter::min_max(UnitValue::Kilogram(min), UnitValue::Kilogram(max)),
            training_measure_id: Some(
                TrainingParams {
                    class: TrainedClass::Weighted,
                }
                .generate(),
            ),
            params: MeasureParams::Weighted(self.clone()),
        }
    }

    fn params(&self) -> Vec<(ParamName, String)> {
        vec![
            (ParamName::Movement, self.movement.to_string()),
            (ParamName::RepMax, self.rep_max.to_string()),
        ]
    }

    fn with_param(&self, name: ParamName, value: &str) -> Result<Self, MeasureIdError> {
        let mut next = self.clone();
        match name {
            ParamName::Movement => next.movement = parse_param(name, value)?,
            ParamName::RepMax => next.rep_max = parse_param(name, value)?,
            _ => return Err(no_such_param::<Self>(name)),
        }
        Ok(next)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaxRepsParams {
    pub movement: MaxRepsMovement,
}

impl MeasureCodec for MaxRepsParams {
    const CLASS: MeasureClass = MeasureClass::MaxReps;
    const FORMAT: &'static str = "maxreps:{movement}";

    fn generate(&self) -> String {
        format!("maxreps:{}", self.movement)
    }

    fn parse(id: &str) -> Result<Self, MeasureIdError> {
        let captures = match_id::<Self>(&MAX_REPS_ID, id)?;
        Ok(MaxRepsParams {
            movement: parse_param(ParamName::Movement, &captures[1])?,
        })
    }

    fn combinations() -> Vec<Self> {
        MaxRepsMovement::ALL
            .iter()
            .map(|&movement| MaxRepsParams { movement })
            .collect()
    }

    fn spec(&self) -> MeasureSpec {
        MeasureSpec {
            id: self.generate(),
            name: format!("Max reps: {}", self.movement.label()),
            description: format!(
                "How many strict {} you can do in one set without resting.",
                self.movement.label()
            ),
            units: vec![UnitKind::Count],
            initial_filter: Filter::min_max(UnitValue::Count(5.0), UnitValue::Count(20.0)),
            training_measure_id: Some(
                TrainingParams {
                    class: TrainedClass::MaxReps,
                }
                .generate(),
            ),
            params: MeasureParams::MaxReps(self.clone()),
        }
    }

    fn params(&self) -> Vec<(ParamName, String)> {
        vec![(ParamName::Movement, self.movement.to_string())]
    }

    fn with_param(&self, name: ParamName, value: &str) -> Result<Self, MeasureIdError> {
        match name {
            ParamName::Movement => Ok(MaxRepsParams {
                movement: parse_param(name, value)?,
            }),
            _ => Err(no_such_param::<Self>(name)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IsometricParams {
    pub movement: IsometricMovement,
}

impl MeasureCodec for IsometricParams {
    const CLASS: MeasureClass = MeasureClass::Isometric;
    const FORMAT: &'static str = "isometric:{movement}";

    fn generate(&self) -> String {
        format!("isometric:{}", self.movement)
    }

    fn parse(id: &str) -> Result<Self, MeasureIdError> {
        let captures = match_id::<Self>(&ISOMETRIC_ID, id)?;
        Ok(IsometricParams {
            movement: parse_param(ParamName::Movement, &captures[1])?,
        })
    }

    fn combinations() -> Vec<Self> {
        IsometricMovement::ALL
            .iter()
            .map(|&movement| IsometricParams { movement })
            .collect()
    }

    fn spec(&self) -> MeasureSpec {
        MeasureSpec {
            id: self.generate(),
            name: format!("Max hold: {}", self.movement.label()),
            description: format!(
                "How long you can hold a {} with good form.",
                self.movement.label()
            ),
            units: vec![UnitKind::Second],
            initial_filter: Filter::min_max(UnitValue::Second(10.0), UnitValue::Second(60.0)),
            training_measure_id: Some(
                TrainingParams {
                    class: TrainedClass::Isometric,
                }
                .generate(),
            ),
            params: MeasureParams::Isometric(self.clone()),
        }
    }

    fn params(&self) -> Vec<(ParamName, String)> {
        vec![(ParamName::Movement, self.movement.to_string())]
    }

    fn with_param(&self, name: ParamName, value: &str) -> Result<Self, MeasureIdError> {
        match name {
            ParamName::Movement => Ok(IsometricParams {
                movement: parse_param(name, value)?,
            }),
            _ => Err(no_such_param::<Self>(name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_rep_maxes_follow_movement() {
        let ids: Vec<String> = WeightedParams::combinations()
            .iter()
            .take(3)
            .map(|params| params.generate())
            .collect();
        assert_eq!(
            ids,
            vec!["weighted:pullup:1rm", "weighted:pullup:2rm", "weighted:pullup:5rm"]
        );
    }

    #[test]
    fn test_movement_sets_do_not_mix() {
        assert!(MaxRepsParams::parse("maxreps:toes-to-bar").is_ok());
        assert_eq!(
            MaxRepsParams::parse("maxreps:squat"),
            Err(MeasureIdError::InvalidParam {
                param: ParamName::Movement,
                value: "squat".to_string(),
            })
        );
        assert!(IsometricParams::parse("isometric:pullup").is_err());
        assert!(WeightedParams::parse("weighted:plank:1rm").is_err());
    }

    #[test]
    fn test_weighted_description_mentions_added_load() {
        let pullup = WeightedParams::parse("weighted:pullup:5rm").unwrap().spec();
        assert!(pullup.description.contains("5 clean reps"));
        assert!(pullup.description.contains("added on top"));

        let squat = WeightedParams::parse("weighted:squat:1rm").unwrap().spec();
        assert!(squat.description.ends_with("1 clean rep."));
    }

    #[test]
    fn test_rep_max_swap() {
        let params = WeightedParams::parse("weighted:deadlift:1rm").unwrap();
        assert_eq!(
            params.with_param(ParamName::RepMax, "5").unwrap().generate(),
            "weighted:deadlift:5rm"
        );
        assert!(params.with_param(ParamName::Grip, "open-hand").is_err());
    }
}
