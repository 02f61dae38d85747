// Finger strength measures - hangboard and block pull protocols
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use super::params::{
    parse_param, Grip, RepeaterTiming, Side, TrainedClass, BLOCK_EDGE_SIZES_MM,
    ENDURANCE_EDGE_SIZES_MM, EDGE_SIZES_MM, HANG_DURATIONS_S,
};
use super::training::TrainingParams;
use super::{
    match_id, no_such_param, MeasureClass, MeasureCodec, MeasureIdError, MeasureParams,
    MeasureSpec, ParamName,
};
use crate::domain::filter::Filter;
use crate::domain::units::{UnitKind, UnitValue};

static MAX_HANG_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^maxhang:(\d+)mm:(\d+)s:([a-z-]+)$").expect("maxhang id pattern compiles")
});
static BLOCK_PULL_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^blockpull:(\d+)mm:(\d+)s:([a-z-]+):([a-z]+)$")
        .expect("blockpull id pattern compiles")
});
static CONTINUOUS_HANG_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^continuoushang:([a-z-]+):(\d+)mm$").expect("continuoushang id pattern compiles")
});
static REPEATERS_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^repeaters:(\d+-\d+):(\d+)mm:([a-z-]+)$").expect("repeaters id pattern compiles")
});

const MASS_UNITS: [UnitKind; 2] = [UnitKind::Kilogram, UnitKind::Pound];

fn training_id(class: TrainedClass) -> Option<String> {
    Some(TrainingParams { class }.generate())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxHangParams {
    pub edge_mm: u32,
    pub duration_s: u32,
    pub grip: Grip,
}

impl MeasureCodec for MaxHangParams {
    const CLASS: MeasureClass = MeasureClass::MaxHang;
    const FORMAT: &'static str = "maxhang:{edge}mm:{duration}s:{grip}";

    fn generate(&self) -> String {
        format!("maxhang:{}mm:{}s:{}", self.edge_mm, self.duration_s, self.grip)
    }

    fn parse(id: &str) -> Result<Self, MeasureIdError> {
        let captures = match_id::<Self>(&MAX_HANG_ID, id)?;
        Ok(MaxHangParams {
            edge_mm: parse_param(ParamName::EdgeSize, &captures[1])?,
            duration_s: parse_param(ParamName::Duration, &captures[2])?,
            grip: parse_param(ParamName::Grip, &captures[3])?,
        })
    }

    fn combinations() -> Vec<Self> {
        let mut all = Vec::new();
        for edge_mm in EDGE_SIZES_MM {
            for duration_s in HANG_DURATIONS_S {
                for &grip in Grip::ALL {
                    all.push(MaxHangParams {
                        edge_mm,
                        duration_s,
                        grip,
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
                "Max hang: {}mm, {}s, {}",
                self.edge_mm,
                self.duration_s,
                self.grip.label()
            ),
            description: format!(
                "The most added weight you can hang for {} seconds on a {}mm edge using a {} grip, \
                 with both hands. Record assisted hangs as negative weight.",
                self.duration_s,
                self.edge_mm,
                self.grip.label()
            ),
            units: MASS_UNITS.to_vec(),
            initial_filter: Filter::min_max(UnitValue::Kilogram(0.0), UnitValue::Kilogram(40.0)),
            training_measure_id: training_id(TrainedClass::MaxHang),
            params: MeasureParams::MaxHang(self.clone()),
        }
    }

    fn params(&self) -> Vec<(ParamName, String)> {
        vec![
            (ParamName::EdgeSize, self.edge_mm.to_string()),
            (ParamName::Duration, self.duration_s.to_string()),
            (ParamName::Grip, self.grip.to_string()),
        ]
    }

    fn with_param(&self, name: ParamName, value: &str) -> Result<Self, MeasureIdError> {
        let mut next = self.clone();
        match name {
            ParamName::EdgeSize => next.edge_mm = parse_param(name, value)?,
            ParamName::Duration => next.duration_s = parse_param(name, value)?,
            ParamName::Grip => next.grip = parse_param(name, value)?,
            _ => return Err(no_such_param::<Self>(name)),
        }
        Ok(next)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockPullParams {
    pub edge_mm: u32,
    pub duration_s: u32,
    pub grip: Grip,
    pub side: Side,
}

impl MeasureCodec for BlockPullParams {
    const CLASS: MeasureClass = MeasureClass::BlockPull;
    const FORMAT: &'static str = "blockpull:{edge}mm:{duration}s:{grip}:{side}";

    fn generate(&self) -> String {
        format!(
            "blockpull:{}mm:{}s:{}:{}",
            self.edge_mm, self.duration_s, self.grip, self.side
        )
    }

    fn parse(id: &str) -> Result<Self, MeasureIdError> {
        let captures = match_id::<Self>(&BLOCK_PULL_ID, id)?;
        Ok(BlockPullParams {
            edge_mm: parse_param(ParamName::EdgeSize, &captures[1])?,
            duration_s: parse_param(ParamName::Duration, &captures[2])?,
            grip: parse_param(ParamName::Grip, &captures[3])?,
            side: parse_param(ParamName::Side, &captures[4])?,
        })
    }

    fn combinations() -> Vec<Self> {
        let mut all = Vec::new();
        for edge_mm in BLOCK_EDGE_SIZES_MM {
            for duration_s in HANG_DURATIONS_S {
                for &grip in Grip::ALL {
                    for &side in Side::ALL {
                        all.push(BlockPullParams {
                            edge_mm,
                            duration_s,
                            grip,
                            side,
                        });
                    }
                }
            }
        }
        all
    }

    fn spec(&self) -> MeasureSpec {
        MeasureSpec {
            id: self.generate(),
            name: format!(
                "Block pull: {}mm, {}s, {}, {}",
                self.edge_mm,
                self.duration_s,
                self.grip.label(),
                self.side.label()
            ),
            description: format!(
                "The most weight you can lift off the ground and hold for {} seconds with a {}mm \
                 block in a {} grip, using your {}.",
                self.duration_s,
                self.edge_mm,
                self.grip.label(),
                self.side.label()
            ),
            units: MASS_UNITS.to_vec(),
            initial_filter: Filter::min_max(UnitValue::Kilogram(20.0), UnitValue::Kilogram(60.0)),
            training_measure_id: training_id(TrainedClass::BlockPull),
            params: MeasureParams::BlockPull(self.clone()),
        }
    }

    fn params(&self) -> Vec<(ParamName, String)> {
        vec![
            (ParamName::EdgeSize, self.edge_mm.to_string()),
            (ParamName::Duration, self.duration_s.to_string()),
            (ParamName::Grip, self.grip.to_string()),
            (ParamName::Side, self.side.to_string()),
        ]
    }

    fn with_param(&self, name: ParamName, value: &str) -> Result<Self, MeasureIdError> {
        let mut next = self.clone();
        match name {
            ParamName::EdgeSize => next.edge_mm = parse_param(name, value)?,
            ParamName::Duration => next.duration_s = parse_param(name, value)?,
            ParamName::Grip => next.grip = parse_param(name, value)?,
            ParamName::Side => next.side = parse_param(name, value)?,
            _ => return Err(no_such_param::<Self>(name)),
        }
        Ok(next)
    }
}

/// Longest single hang to failure. Ids are `continuoushang:{grip}:{edge}mm`;
/// the hyphenated `continuous-hang:` prefix is never produced or accepted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinuousHangParams {
    pub grip: Grip,
    pub edge_mm: u32,
}

impl MeasureCodec for ContinuousHangParams {
    const CLASS: MeasureClass = MeasureClass::ContinuousHang;
    const FORMAT: &'static str = "continuoushang:{grip}:{edge}mm";

    fn generate(&self) -> String {
        format!("continuoushang:{}:{}mm", self.grip, self.edge_mm)
    }

    fn parse(id: &str) -> Result<Self, MeasureIdError> {
        let captures = match_id::<Self>(&CONTINUOUS_HANG_ID, id)?;
        Ok(ContinuousHangParams {
            grip: parse_param(ParamName::Grip, &captures[1])?,
            edge_mm: parse_param(ParamName::EdgeSize, &captures[2])?,
        })
    }

    fn combinations() -> Vec<Self> {
        let mut all = Vec::new();
        for &grip in Grip::ALL {
            for edge_mm in ENDURANCE_EDGE_SIZES_MM {
                all.push(ContinuousHangParams { grip, edge_mm });
            }
        }
        all
    }

    fn spec(&self) -> MeasureSpec {
        MeasureSpec {
            id: self.generate(),
            name: format!("Continuous hang: {}, {}mm", self.grip.label(), self.edge_mm),
            description: format!(
                "How long you can hang on a {}mm edge in a {} grip before failing.",
                self.edge_mm,
                self.grip.label()
            ),
            units: vec![UnitKind::Second],
            initial_filter: Filter::min_max(UnitValue::Second(10.0), UnitValue::Second(60.0)),
            training_measure_id: training_id(TrainedClass::ContinuousHang),
            params: MeasureParams::ContinuousHang(self.clone()),
        }
    }

    fn params(&self) -> Vec<(ParamName, String)> {
        vec![
            (ParamName::Grip, self.grip.to_string()),
            (ParamName::EdgeSize, self.edge_mm.to_string()),
        ]
    }

    fn with_param(&self, name: ParamName, value: &str) -> Result<Self, MeasureIdError> {
        let mut next = self.clone();
        match name {
            ParamName::Grip => next.grip = parse_param(name, value)?,
            ParamName::EdgeSize => next.edge_mm = parse_param(name, value)?,
            _ => return Err(no_such_param::<Self>(name)),
        }
        Ok(next)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatersParams {
    pub timing: RepeaterTiming,
    pub edge_mm: u32,
    pub grip: Grip,
}

impl MeasureCodec for RepeatersParams {
    const CLASS: MeasureClass = MeasureClass::Repeaters;
    const FORMAT: &'static str = "repeaters:{on}-{off}:{edge}mm:{grip}";

    fn generate(&self) -> String {
        format!("repeaters:{}:{}mm:{}", self.timing, self.edge_mm, self.grip)
    }

    fn parse(id: &str) -> Result<Self, MeasureIdError> {
        let captures = match_id::<Self>(&REPEATERS_ID, id)?;
        Ok(RepeatersParams {
            timing: parse_param(ParamName::Timing, &captures[1])?,
            edge_mm: parse_param(ParamName::EdgeSize, &captures[2])?,
            grip: parse_param(ParamName::Grip, &captures[3])?,
        })
    }

    fn combinations() -> Vec<Self> {
        let mut all = Vec::new();
        for &timing in RepeaterTiming::ALL {
            for edge_mm in ENDURANCE_EDGE_SIZES_MM {
                for &grip in Grip::ALL {
                    all.push(RepeatersParams {
                        timing,
                        edge_mm,
                        grip,
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
                "Repeaters: {}, {}mm, {}",
                self.timing,
                self.edge_mm,
                self.grip.label()
            ),
            description: format!(
                "Total time on a {}mm edge in a {} grip, hanging {} until you fall off.",
                self.edge_mm,
                self.grip.label(),
                self.timing.label()
            ),
            units: vec![UnitKind::Second],
            initial_filter: Filter::min_max(UnitValue::Second(30.0), UnitValue::Second(180.0)),
            training_measure_id: training_id(TrainedClass::Repeaters),
            params: MeasureParams::Repeaters(self.clone()),
        }
    }

    fn params(&self) -> Vec<(ParamName, String)> {
        vec![
            (ParamName::Timing, self.timing.to_string()),
            (ParamName::EdgeSize, self.edge_mm.to_string()),
            (ParamName::Grip, self.grip.to_string()),
        ]
    }

    fn with_param(&self, name: ParamName, value: &str) -> Result<Self, MeasureIdError> {
        let mut next = self.clone();
        match name {
            ParamName::Timing => next.timing = parse_param(name, value)?,
            ParamName::EdgeSize => next.edge_mm = parse_param(name, value)?,
            ParamName::Grip => next.grip = parse_param(name, value)?,
            _ => return Err(no_such_param::<Self>(name)),
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_hang_id_layout() {
        let params = MaxHangParams::parse("maxhang:20mm:7s:half-crimp").unwrap();
        assert_eq!(
            params,
            MaxHangParams {
                edge_mm: 20,
                duration_s: 7,
                grip: Grip::HalfCrimp,
            }
        );
        assert_eq!(params.generate(), "maxhang:20mm:7s:half-crimp");
    }

    #[test]
    fn test_block_pull_id_layout() {
        let params = BlockPullParams {
            edge_mm: 15,
            duration_s: 10,
            grip: Grip::OpenHand,
            side: Side::Nondominant,
        };
        assert_eq!(params.generate(), "blockpull:15mm:10s:open-hand:nondominant");
        assert_eq!(BlockPullParams::parse(&params.generate()), Ok(params));
    }

    #[test]
    fn test_continuous_hang_uses_one_prefix() {
        let params = ContinuousHangParams {
            grip: Grip::HalfCrimp,
            edge_mm: 20,
        };
        assert_eq!(params.generate(), "continuoushang:half-crimp:20mm");
        assert_eq!(ContinuousHangParams::parse("continuoushang:half-crimp:20mm"), Ok(params));
        assert!(ContinuousHangParams::parse("continuous-hang:half-crimp:20mm").is_err());
    }

    #[test]
    fn test_parse_errors_describe_the_format() {
        let err = MaxHangParams::parse("maxhang:20:7:half-crimp").unwrap_err();
        assert_eq!(
            err.to_string(),
            "'maxhang:20:7:half-crimp' is not a maxhang measure id, expected \
             maxhang:{edge}mm:{duration}s:{grip}"
        );
        assert_eq!(
            RepeatersParams::parse("repeaters:7-3:20mm:pinch"),
            Err(MeasureIdError::InvalidParam {
                param: ParamName::Grip,
                value: "pinch".to_string(),
            })
        );
    }

    #[test]
    fn test_with_param_rejects_foreign_axes() {
        let params = RepeatersParams::parse("repeaters:10-5:15mm:open-hand").unwrap();
        assert_eq!(
            params.with_param(ParamName::Timing, "7-3").unwrap().generate(),
            "repeaters:7-3:15mm:open-hand"
        );
        assert!(params.with_param(ParamName::Side, "dominant").is_err());
    }
}
