// Grade measures - hardest grade per discipline, venue and style
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use super::params::{parse_param, Discipline, Location, Performance, TrainedClass};
use super::training::TrainingParams;
use super::{
    match_id, MeasureClass, MeasureCodec, MeasureIdError, MeasureParams, MeasureSpec, ParamName,
};
use crate::domain::filter::Filter;
use crate::domain::grade::{GradeScale, VGrade, Yds};
use crate::domain::units::{UnitKind, UnitValue};

static GRADE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^grade:([a-z]+):([a-z]+):([a-z]+)$").expect("grade id pattern compiles")
});

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeParams {
    pub discipline: Discipline,
    pub location: Location,
    pub performance: Performance,
}

impl GradeParams {
    pub fn units(&self) -> Vec<UnitKind> {
        match self.discipline {
            Discipline::Boulder => vec![UnitKind::Vermin, UnitKind::Font, UnitKind::Ircra],
            Discipline::Sport | Discipline::Trad => vec![
                UnitKind::Yds,
                UnitKind::FrenchSport,
                UnitKind::Ewbank,
                UnitKind::Ircra,
            ],
        }
    }

    fn initial_filter(&self) -> Filter {
        match self.discipline {
            Discipline::Boulder => Filter::min_max(
                UnitValue::Vermin(VGrade::at(2)),
                UnitValue::Vermin(VGrade::at(6)),
            ),
            Discipline::Sport | Discipline::Trad => Filter::min_max(
                UnitValue::Yds(Yds::Y510a),
                UnitValue::Yds(Yds::Y512a),
            ),
        }
    }
}

impl MeasureCodec for GradeParams {
    const CLASS: MeasureClass = MeasureClass::Grade;
    const FORMAT: &'static str = "grade:{discipline}:{location}:{performance}";

    fn generate(&self) -> String {
        format!(
            "grade:{}:{}:{}",
            self.discipline, self.location, self.performance
        )
    }

    fn parse(id: &str) -> Result<Self, MeasureIdError> {
        let captures = match_id::<Self>(&GRADE_ID, id)?;
        Ok(GradeParams {
            discipline: parse_param(ParamName::Discipline, &captures[1])?,
            location: parse_param(ParamName::Location, &captures[2])?,
            performance: parse_param(ParamName::Performance, &captures[3])?,
        })
    }

    fn combinations() -> Vec<Self> {
        let mut all = Vec::new();
        for &discipline in Discipline::ALL {
            for &location in Location::ALL {
                for &performance in Performance::ALL {
                    all.push(GradeParams {
                        discipline,
                        location,
                        performance,
                    });
                }
            }
        }
        all
    }

    fn spec(&self) -> MeasureSpec {
        MeasureSpec {
            id: self.generate(),
            name: format!(
                "Max {} grade: {} {}",
                self.discipline, self.location, self.performance
            ),
            description: format!(
                "The hardest {} grade you have {} {} in the last 12 months.",
                self.discipline.label(),
                self.performance.label(),
                self.location.label()
            ),
            units: self.units(),
            initial_filter: self.initial_filter(),
            training_measure_id: Some(
                TrainingParams {
                    class: TrainedClass::from(self.discipline),
                }
                .generate(),
            ),
            params: MeasureParams::Grade(self.clone()),
        }
    }

    fn params(&self) -> Vec<(ParamName, String)> {
        vec![
            (ParamName::Discipline, self.discipline.to_string()),
            (ParamName::Location, self.location.to_string()),
            (ParamName::Performance, self.performance.to_string()),
        ]
    }

    fn with_param(&self, name: ParamName, value: &str) -> Result<Self, MeasureIdError> {
        let mut next = self.clone();
        match name {
            ParamName::Discipline => next.discipline = parse_param(name, value)?,
            ParamName::Location => next.location = parse_param(name, value)?,
            ParamName::Performance => next.performance = parse_param(name, value)?,
            _ => return Err(super::no_such_param::<Self>(name)),
        }
        Ok(next)
    }
}
