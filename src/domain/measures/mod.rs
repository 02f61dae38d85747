// Measure registry - every measurable quantity, generated from its parameter axes
pub mod anthro;
pub mod fingers;
pub mod grades;
pub mod movement;
pub mod params;
pub mod training;

use crate::domain::filter::Filter;
use crate::domain::units::UnitKind;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

pub use anthro::{AnthroMeasure, AnthroParams};
pub use fingers::{BlockPullParams, ContinuousHangParams, MaxHangParams, RepeatersParams};
pub use grades::GradeParams;
pub use movement::{IsometricParams, MaxRepsParams, WeightedParams};
pub use params::ParamName;
pub use training::TrainingParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasureClass {
    Anthro,
    Grade,
    MaxHang,
    BlockPull,
    ContinuousHang,
    Repeaters,
    Weighted,
    MaxReps,
    Isometric,
    Training,
}

impl fmt::Display for MeasureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MeasureClass::Anthro => "anthro",
            MeasureClass::Grade => "grade",
            MeasureClass::MaxHang => "maxhang",
            MeasureClass::BlockPull => "blockpull",
            MeasureClass::ContinuousHang => "continuoushang",
            MeasureClass::Repeaters => "repeaters",
            MeasureClass::Weighted => "weighted",
            MeasureClass::MaxReps => "maxreps",
            MeasureClass::Isometric => "isometric",
            MeasureClass::Training => "training",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeasureIdError {
    #[error("'{id}' is not a {class} measure id, expected {format}")]
    Mismatch {
        class: MeasureClass,
        id: String,
        format: &'static str,
    },
    #[error("'{value}' is not a valid {param}")]
    InvalidParam { param: ParamName, value: String },
    #[error("{class} measures have no {param} parameter")]
    NoSuchParam { class: MeasureClass, param: ParamName },
    #[error("'{0}' does not match any measure class")]
    Unrecognized(String),
    #[error("unknown measure '{0}'")]
    UnknownMeasure(String),
}

/// Typed id builder/parser for one measure class.
///
/// `parse(&generate(p)) == p` for every combination the class produces.
pub trait MeasureCodec: Sized {
    const CLASS: MeasureClass;
    /// Id layout shown in parse errors.
    const FORMAT: &'static str;

    fn generate(&self) -> String;
    fn parse(id: &str) -> Result<Self, MeasureIdError>;
    /// Cartesian product of the class's parameter domains, in stable order.
    fn combinations() -> Vec<Self>;
    fn spec(&self) -> MeasureSpec;
    fn params(&self) -> Vec<(ParamName, String)>;
    fn with_param(&self, name: ParamName, value: &str) -> Result<Self, MeasureIdError>;
}

pub(crate) fn match_id<'a, C: MeasureCodec>(
    pattern: &Regex,
    id: &'a str,
) -> Result<Captures<'a>, MeasureIdError> {
    pattern.captures(id).ok_or_else(|| MeasureIdError::Mismatch {
        class: C::CLASS,
        id: id.to_string(),
        format: C::FORMAT,
    })
}

pub(crate) fn no_such_param<C: MeasureCodec>(param: ParamName) -> MeasureIdError {
    MeasureIdError::NoSuchParam {
        class: C::CLASS,
        param,
    }
}

/// Structured form of a measure id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "measureClass", rename_all = "lowercase")]
pub enum MeasureParams {
    Anthro(AnthroParams),
    Grade(GradeParams),
    MaxHang(MaxHangParams),
    BlockPull(BlockPullParams),
    ContinuousHang(ContinuousHangParams),
    Repeaters(RepeatersParams),
    Weighted(WeightedParams),
    MaxReps(MaxRepsParams),
    Isometric(IsometricParams),
    Training(TrainingParams),
}

macro_rules! each_class {
    ($params:expr, |$inner:ident| $body:expr) => {
        match $params {
            MeasureParams::Anthro($inner) => $body,
            MeasureParams::Grade($inner) => $body,
            MeasureParams::MaxHang($inner) => $body,
            MeasureParams::BlockPull($inner) => $body,
            MeasureParams::ContinuousHang($inner) => $body,
            MeasureParams::Repeaters($inner) => $body,
            MeasureParams::Weighted($inner) => $body,
            MeasureParams::MaxReps($inner) => $body,
            MeasureParams::Isometric($inner) => $body,
            MeasureParams::Training($inner) => $body,
        }
    };
    ($params:expr, |$inner:ident, $wrap:ident| $body:expr) => {
        match $params {
            MeasureParams::Anthro($inner) => {
                let $wrap = MeasureParams::Anthro;
                $body
            }
            MeasureParams::Grade($inner) => {
                let $wrap = MeasureParams::Grade;
                $body
            }
            MeasureParams::MaxHang($inner) => {
                let $wrap = MeasureParams::MaxHang;
                $body
            }
            MeasureParams::BlockPull($inner) => {
                let $wrap = MeasureParams::BlockPull;
                $body
            }
            MeasureParams::ContinuousHang($inner) => {
                let $wrap = MeasureParams::ContinuousHang;
                $body
            }
            MeasureParams::Repeaters($inner) => {
                let $wrap = MeasureParams::Repeaters;
                $body
            }
            MeasureParams::Weighted($inner) => {
                let $wrap = MeasureParams::Weighted;
                $body
            }
            MeasureParams::MaxReps($inner) => {
                let $wrap = MeasureParams::MaxReps;
                $body
            }
            MeasureParams::Isometric($inner) => {
                let $wrap = MeasureParams::Isometric;
                $body
            }
            MeasureParams::Training($inner) => {
                let $wrap = MeasureParams::Training;
                $body
            }
        }
    };
}

impl MeasureParams {
    pub fn class(&self) -> MeasureClass {
        fn class_of<C: MeasureCodec>(_: &C) -> MeasureClass {
            C::CLASS
        }
        each_class!(self, |inner| class_of(inner))
    }

    pub fn id(&self) -> String {
        each_class!(self, |inner| inner.generate())
    }

    pub fn params(&self) -> Vec<(ParamName, String)> {
        each_class!(self, |inner| inner.params())
    }

    pub fn param(&self, name: ParamName) -> Option<String> {
        self.params()
            .into_iter()
            .find(|(param, _)| *param == name)
            .map(|(_, value)| value)
    }

    /// Same measure with one parameter swapped, e.g. `full-crimp` for `half-crimp`.
    pub fn with_param(
        &self,
        name: ParamName,
        value: &str,
    ) -> Result<MeasureParams, MeasureIdError> {
        each_class!(self, |inner, wrap| inner.with_param(name, value).map(wrap))
    }
}

fn try_class<C: MeasureCodec>(id: &str, wrap: fn(C) -> MeasureParams) -> Option<MeasureParams> {
    C::parse(id).ok().map(wrap)
}

/// Recover structured parameters from any measure id. Classes are tried in a
/// fixed order and the first one that parses wins.
pub fn parse_measure_id(id: &str) -> Result<MeasureParams, MeasureIdError> {
    try_class::<AnthroParams>(id, MeasureParams::Anthro)
        .or_else(|| try_class::<GradeParams>(id, MeasureParams::Grade))
        .or_else(|| try_class::<MaxHangParams>(id, MeasureParams::MaxHang))
        .or_else(|| try_class::<BlockPullParams>(id, MeasureParams::BlockPull))
        .or_else(|| try_class::<ContinuousHangParams>(id, MeasureParams::ContinuousHang))
        .or_else(|| try_class::<RepeatersParams>(id, MeasureParams::Repeaters))
        .or_else(|| try_class::<WeightedParams>(id, MeasureParams::Weighted))
        .or_else(|| try_class::<MaxRepsParams>(id, MeasureParams::MaxReps))
        .or_else(|| try_class::<IsometricParams>(id, MeasureParams::Isometric))
        .or_else(|| try_class::<TrainingParams>(id, MeasureParams::Training))
        .ok_or_else(|| MeasureIdError::Unrecognized(id.to_string()))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureSpec {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Allowed units; the first is the default.
    pub units: Vec<UnitKind>,
    pub initial_filter: Filter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_measure_id: Option<String>,
    pub params: MeasureParams,
}

impl MeasureSpec {
    pub fn default_unit(&self) -> UnitKind {
        self.units[0]
    }

    pub fn allows_unit(&self, unit: UnitKind) -> bool {
        self.units.contains(&unit)
    }

    pub fn class(&self) -> MeasureClass {
        self.params.class()
    }
}

/// Use `source_measure_id` as data for `target_measure_id` when a snapshot
/// lacks the target. Both ids differ only in `param`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterpolationOption {
    pub param: ParamName,
    pub source_measure_id: String,
    pub target_measure_id: String,
    pub measure_param_value: String,
    pub target_param_value: String,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("measure id '{0}' is generated more than once")]
    DuplicateId(String),
    #[error("{measure} refers to missing training measure {training}")]
    MissingTrainingMeasure { measure: String, training: String },
    #[error("training measure {0} has its own training measure")]
    NestedTrainingMeasure(String),
    #[error("{0} declares no units")]
    NoUnits(String),
}

#[derive(Debug)]
pub struct MeasureRegistry {
    specs: Vec<MeasureSpec>,
    index: HashMap<String, usize>,
}

impl MeasureRegistry {
    pub fn from_specs(specs: Vec<MeasureSpec>) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(specs.len());
        for (position, spec) in specs.iter().enumerate() {
            if spec.units.is_empty() {
                return Err(RegistryError::NoUnits(spec.id.clone()));
            }
            if index.insert(spec.id.clone(), position).is_some() {
                return Err(RegistryError::DuplicateId(spec.id.clone()));
            }
        }

        for spec in &specs {
            let Some(training_id) = &spec.training_measure_id else {
                continue;
            };
            let training = index
                .get(training_id)
                .map(|position| &specs[*position])
                .ok_or_else(|| RegistryError::MissingTrainingMeasure {
                    measure: spec.id.clone(),
                    training: training_id.clone(),
                })?;
            if training.training_measure_id.is_some() {
                return Err(RegistryError::NestedTrainingMeasure(training.id.clone()));
            }
        }

        Ok(Self { specs, index })
    }

    pub fn specs(&self) -> &[MeasureSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&MeasureSpec> {
        self.index.get(id).map(|position| &self.specs[*position])
    }

    pub fn require(&self, id: &str) -> Result<&MeasureSpec, MeasureIdError> {
        self.get(id)
            .ok_or_else(|| MeasureIdError::UnknownMeasure(id.to_string()))
    }

    pub fn training_measure(&self, id: &str) -> Option<&MeasureSpec> {
        self.get(id)?
            .training_measure_id
            .as_deref()
            .and_then(|training_id| self.get(training_id))
    }

    /// Case-insensitive match on id or name; an empty query lists everything.
    pub fn search(&self, query: &str) -> Vec<&MeasureSpec> {
        let needle = query.trim().to_lowercase();
        self.specs
            .iter()
            .filter(|spec| {
                needle.is_empty()
                    || spec.id.to_lowercase().contains(&needle)
                    || spec.name.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Registered siblings of `target_id` that differ only in `param`.
    pub fn interpolation_options(
        &self,
        target_id: &str,
        param: ParamName,
    ) -> Result<Vec<InterpolationOption>, MeasureIdError> {
        let target = self.require(target_id)?;
        let target_params = target.params.params();
        let target_value = target.params.param(param).ok_or(MeasureIdError::NoSuchParam {
            class: target.class(),
            param,
        })?;

        let others_match = |candidate: &[(ParamName, String)]| {
            candidate
                .iter()
                .zip(&target_params)
                .all(|(theirs, ours)| theirs.0 == param || theirs == ours)
        };

        Ok(self
            .specs
            .iter()
            .filter(|spec| spec.class() == target.class() && spec.id != target.id)
            .filter_map(|spec| {
                let candidate = spec.params.params();
                if !others_match(&candidate) {
                    return None;
                }
                let source_value = spec.params.param(param)?;
                Some(InterpolationOption {
                    param,
                    source_measure_id: spec.id.clone(),
                    target_measure_id: target.id.clone(),
                    measure_param_value: source_value,
                    target_param_value: target_value.clone(),
                })
            })
            .collect())
    }

    /// Build one interpolation option from the target and the value to borrow from.
    pub fn interpolation_option(
        &self,
        target_id: &str,
        param: ParamName,
        source_value: &str,
    ) -> Result<InterpolationOption, MeasureIdError> {
        let target = self.require(target_id)?;
        let target_value = target.params.param(param).ok_or(MeasureIdError::NoSuchParam {
            class: target.class(),
            param,
        })?;
        let source_id = target.params.with_param(param, source_value)?.id();
        let source = self.require(&source_id)?;
        Ok(InterpolationOption {
            param,
            source_measure_id: source.id.clone(),
            target_measure_id: target.id.clone(),
            measure_param_value: source_value.to_string(),
            target_param_value: target_value,
        })
    }
}

fn specs_of<C: MeasureCodec>() -> impl Iterator<Item = MeasureSpec> {
    C::combinations().into_iter().map(|params| params.spec())
}

/// Expand every class over its parameter domains. Pure and deterministic.
pub fn generate_specs() -> Vec<MeasureSpec> {
    specs_of::<AnthroParams>()
        .chain(specs_of::<GradeParams>())
        .chain(specs_of::<MaxHangParams>())
        .chain(specs_of::<BlockPullParams>())
        .chain(specs_of::<ContinuousHangParams>())
        .chain(specs_of::<RepeatersParams>())
        .chain(specs_of::<WeightedParams>())
        .chain(specs_of::<MaxRepsParams>())
        .chain(specs_of::<IsometricParams>())
        .chain(specs_of::<TrainingParams>())
        .collect()
}

/// Process-wide registry, built on first use and read-only afterwards.
pub fn registry() -> &'static MeasureRegistry {
    static REGISTRY: OnceLock<MeasureRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        MeasureRegistry::from_specs(generate_specs())
            .unwrap_or_else(|err| panic!("measure registry is inconsistent: {err}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn assert_codec_round_trip<C: MeasureCodec + PartialEq + fmt::Debug>() {
        let combinations = C::combinations();
        assert!(!combinations.is_empty(), "{} has no measures", C::CLASS);
        for params in combinations {
            let id = params.generate();
            assert_eq!(C::parse(&id).as_ref(), Ok(&params), "{id}");
        }
    }

    #[test]
    fn test_every_class_round_trips() {
        assert_codec_round_trip::<AnthroParams>();
        assert_codec_round_trip::<GradeParams>();
        assert_codec_round_trip::<MaxHangParams>();
        assert_codec_round_trip::<BlockPullParams>();
        assert_codec_round_trip::<ContinuousHangParams>();
        assert_codec_round_trip::<RepeatersParams>();
        assert_codec_round_trip::<WeightedParams>();
        assert_codec_round_trip::<MaxRepsParams>();
        assert_codec_round_trip::<IsometricParams>();
        assert_codec_round_trip::<TrainingParams>();
    }

    #[test]
    fn test_registry_ids_are_unique() {
        let specs = generate_specs();
        let unique: HashSet<&str> = specs.iter().map(|spec| spec.id.as_str()).collect();
        assert_eq!(unique.len(), specs.len());
        assert_eq!(registry().len(), specs.len());
    }

    #[test]
    fn test_generation_is_deterministic() {
        let first: Vec<String> = generate_specs().into_iter().map(|spec| spec.id).collect();
        let second: Vec<String> = generate_specs().into_iter().map(|spec| spec.id).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let mut specs = generate_specs();
        specs.push(specs[0].clone());
        assert_eq!(
            MeasureRegistry::from_specs(specs).err(),
            Some(RegistryError::DuplicateId("height".to_string()))
        );
    }

    #[test]
    fn test_parse_any_measure_id() {
        for spec in registry().specs() {
            let parsed = parse_measure_id(&spec.id).unwrap();
            assert_eq!(parsed, spec.params);
            assert_eq!(parsed.id(), spec.id);
        }
        assert_eq!(
            parse_measure_id("maxhang:20mm"),
            Err(MeasureIdError::Unrecognized("maxhang:20mm".to_string()))
        );
    }

    #[test]
    fn test_training_measures_resolve() {
        let registry = registry();
        let training = registry.training_measure("maxhang:20mm:7s:half-crimp").unwrap();
        assert_eq!(training.id, "training:maxhang");
        assert!(training.training_measure_id.is_none());
        assert_eq!(
            registry
                .training_measure("grade:sport:outdoor:flash")
                .map(|spec| spec.id.as_str()),
            Some("training:sport")
        );
        assert!(registry.training_measure("height").is_none());
    }

    #[test]
    fn test_with_param_swaps_one_segment() {
        let params = parse_measure_id("maxhang:20mm:7s:half-crimp").unwrap();
        let swapped = params.with_param(ParamName::Grip, "full-crimp").unwrap();
        assert_eq!(swapped.id(), "maxhang:20mm:7s:full-crimp");
        assert_eq!(params.param(ParamName::EdgeSize), Some("20".to_string()));
        assert_eq!(
            params.with_param(ParamName::Movement, "squat"),
            Err(MeasureIdError::NoSuchParam {
                class: MeasureClass::MaxHang,
                param: ParamName::Movement,
            })
        );
    }

    #[test]
    fn test_interpolation_options_list_siblings() {
        let options = registry()
            .interpolation_options("weighted:pullup:1rm", ParamName::RepMax)
            .unwrap();
        let sources: Vec<&str> = options
            .iter()
            .map(|option| option.source_measure_id.as_str())
            .collect();
        assert_eq!(sources, vec!["weighted:pullup:2rm", "weighted:pullup:5rm"]);
        assert!(options.iter().all(|option| option.target_param_value == "1"));

        let option = registry()
            .interpolation_option("maxhang:20mm:7s:full-crimp", ParamName::Grip, "half-crimp")
            .unwrap();
        assert_eq!(option.source_measure_id, "maxhang:20mm:7s:half-crimp");
        assert_eq!(option.measure_param_value, "half-crimp");
        assert_eq!(option.target_param_value, "full-crimp");
    }

    #[test]
    fn test_initial_filters_use_allowed_units() {
        for spec in registry().specs() {
            assert!(
                crate::domain::filter::check_units(&spec.id, &spec.initial_filter, registry())
                    .is_ok(),
                "{}",
                spec.id
            );
            assert_eq!(spec.initial_filter.unit(), Some(spec.default_unit()), "{}", spec.id);
        }
    }
}
