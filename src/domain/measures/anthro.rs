// Anthropometric measures - fixed ids with no parameters
use serde::{Deserialize, Serialize};

use super::{MeasureClass, MeasureCodec, MeasureIdError, MeasureParams, MeasureSpec, ParamName};
use crate::domain::filter::Filter;
use crate::domain::units::{Sex, UnitKind, UnitValue};

const LENGTH_UNITS: [UnitKind; 4] = [
    UnitKind::Meter,
    UnitKind::Centimeter,
    UnitKind::Inch,
    UnitKind::FeetInches,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnthroMeasure {
    Height,
    Armspan,
    Weight,
    SexAtBirth,
    Age,
}

impl AnthroMeasure {
    pub const ALL: [AnthroMeasure; 5] = [
        AnthroMeasure::Height,
        AnthroMeasure::Armspan,
        AnthroMeasure::Weight,
        AnthroMeasure::SexAtBirth,
        AnthroMeasure::Age,
    ];

    pub fn id(self) -> &'static str {
        match self {
            AnthroMeasure::Height => "height",
            AnthroMeasure::Armspan => "armspan",
            AnthroMeasure::Weight => "weight",
            AnthroMeasure::SexAtBirth => "sex-at-birth",
            AnthroMeasure::Age => "age",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnthroParams {
    pub measure: AnthroMeasure,
}

impl MeasureCodec for AnthroParams {
    const CLASS: MeasureClass = MeasureClass::Anthro;
    const FORMAT: &'static str = "height | armspan | weight | sex-at-birth | age";

    fn generate(&self) -> String {
        self.measure.id().to_string()
    }

    fn parse(id: &str) -> Result<Self, MeasureIdError> {
        AnthroMeasure::ALL
            .into_iter()
            .find(|measure| measure.id() == id)
            .map(|measure| AnthroParams { measure })
            .ok_or_else(|| MeasureIdError::Mismatch {
                class: Self::CLASS,
                id: id.to_string(),
                format: Self::FORMAT,
            })
    }

    fn combinations() -> Vec<Self> {
        AnthroMeasure::ALL
            .into_iter()
            .map(|measure| AnthroParams { measure })
            .collect()
    }

    fn spec(&self) -> MeasureSpec {
        let (name, description, units, initial_filter): (&str, &str, Vec<UnitKind>, Filter) =
            match self.measure {
                AnthroMeasure::Height => (
                    "Height",
                    "Your height, standing barefoot.",
                    LENGTH_UNITS.to_vec(),
                    Filter::min_max(UnitValue::Meter(1.5), UnitValue::Meter(2.0)),
                ),
                AnthroMeasure::Armspan => (
                    "Armspan",
                    "Fingertip to fingertip with both arms stretched out to the sides.",
                    LENGTH_UNITS.to_vec(),
                    Filter::min_max(UnitValue::Meter(1.5), UnitValue::Meter(2.1)),
                ),
                AnthroMeasure::Weight => (
                    "Weight",
                    "Your body weight.",
                    vec![UnitKind::Kilogram, UnitKind::Pound],
                    Filter::min_max(UnitValue::Kilogram(50.0), UnitValue::Kilogram(80.0)),
                ),
                AnthroMeasure::SexAtBirth => (
                    "Sex at birth",
                    "Sex assigned at birth.",
                    vec![UnitKind::SexAtBirth],
                    Filter::toggle(UnitValue::SexAtBirth(Sex::Female)),
                ),
                AnthroMeasure::Age => (
                    "Age",
                    "Your age in years.",
                    vec![UnitKind::Year],
                    Filter::min_max(UnitValue::Year(18.0), UnitValue::Year(40.0)),
                ),
            };

        MeasureSpec {
            id: self.generate(),
            name: name.to_string(),
            description: description.to_string(),
            units,
            initial_filter,
            training_measure_id: None,
            params: MeasureParams::Anthro(self.clone()),
        }
    }

    fn params(&self) -> Vec<(ParamName, String)> {
        Vec::new()
    }

    fn with_param(&self, name: ParamName, _value: &str) -> Result<Self, MeasureIdError> {
        Err(super::no_such_param::<Self>(name))
    }
}
