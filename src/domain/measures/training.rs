// Training history measures - how long someone has practised an activity
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use super::params::{parse_param, TrainedClass};
use super::{
    match_id, no_such_param, MeasureClass, MeasureCodec, MeasureIdError, MeasureParams,
    MeasureSpec, ParamName,
};
use crate::domain::filter::Filter;
use crate::domain::units::{UnitKind, UnitValue};

static TRAINING_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^training:([a-z]+)$").expect("training id pattern compiles"));

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingParams {
    pub class: TrainedClass,
}

impl MeasureCodec for TrainingParams {
    const CLASS: MeasureClass = MeasureClass::Training;
    const FORMAT: &'static str = "training:{class}";

    fn generate(&self) -> String {
        format!("training:{}", self.class)
    }

    fn parse(id: &str) -> Result<Self, MeasureIdError> {
        let captures = match_id::<Self>(&TRAINING_ID, id)?;
        Ok(TrainingParams {
            class: parse_param(ParamName::TrainedClass, &captures[1])?,
        })
    }

    fn combinations() -> Vec<Self> {
        TrainedClass::ALL
            .iter()
            .map(|&class| TrainingParams { class })
            .collect()
    }

    fn spec(&self) -> MeasureSpec {
        MeasureSpec {
            id: self.generate(),
            name: format!("Time spent on {}", self.class.label()),
            description: format!(
                "How long you have been doing {} regularly.",
                self.class.label()
            ),
            units: vec![UnitKind::Year, UnitKind::Month],
            initial_filter: Filter::min_max(UnitValue::Year(1.0), UnitValue::Year(5.0)),
            training_measure_id: None,
            params: MeasureParams::Training(self.clone()),
        }
    }

    fn params(&self) -> Vec<(ParamName, String)> {
        vec![(ParamName::TrainedClass, self.class.to_string())]
    }

    fn with_param(&self, name: ParamName, value: &str) -> Result<Self, MeasureIdError> {
        match name {
            ParamName::TrainedClass => Ok(TrainingParams {
                class: parse_param(name, value)?,
            }),
            _ => Err(no_such_param::<Self>(name)),
        }
    }
}
