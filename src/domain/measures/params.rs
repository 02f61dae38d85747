// Parameter axes measure classes are generated over
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::MeasureIdError;

/// Names of the positional parameters inside a measure id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParamName {
    EdgeSize,
    Duration,
    Grip,
    Side,
    Timing,
    Movement,
    RepMax,
    Discipline,
    Location,
    Performance,
    TrainedClass,
}

impl ParamName {
    pub fn as_str(self) -> &'static str {
        match self {
            ParamName::EdgeSize => "edge-size",
            ParamName::Duration => "duration",
            ParamName::Grip => "grip",
            ParamName::Side => "side",
            ParamName::Timing => "timing",
            ParamName::Movement => "movement",
            ParamName::RepMax => "rep-max",
            ParamName::Discipline => "discipline",
            ParamName::Location => "location",
            ParamName::Performance => "performance",
            ParamName::TrainedClass => "trained-class",
        }
    }
}

impl fmt::Display for ParamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const EDGE_SIZES_MM: [u32; 5] = [10, 15, 18, 20, 25];
pub const BLOCK_EDGE_SIZES_MM: [u32; 2] = [15, 20];
pub const HANG_DURATIONS_S: [u32; 2] = [7, 10];
pub const ENDURANCE_EDGE_SIZES_MM: [u32; 2] = [15, 20];
pub const REP_MAXES: [u32; 3] = [1, 2, 5];

/// Parse one parameter out of an id segment or an interpolation request.
pub fn parse_param<T: FromStr>(param: ParamName, value: &str) -> Result<T, MeasureIdError> {
    value.parse().map_err(|_| MeasureIdError::InvalidParam {
        param,
        value: value.to_string(),
    })
}

macro_rules! param_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => $id:literal, $label:literal;)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $id)] $variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// Segment used inside measure ids.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $id,)+
                }
            }

            /// Human readable form used in names and descriptions.
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($id => Ok($name::$variant),)+
                    _ => Err(()),
                }
            }
        }
    };
}

param_enum! {
    Grip {
        HalfCrimp => "half-crimp", "half crimp";
        FullCrimp => "full-crimp", "full crimp";
        OpenHand => "open-hand", "open hand";
    }
}

param_enum! {
    Side {
        Dominant => "dominant", "dominant hand";
        Nondominant => "nondominant", "non-dominant hand";
    }
}

param_enum! {
    RepeaterTiming {
        SevenThree => "7-3", "7s on / 3s off";
        TenFive => "10-5", "10s on / 5s off";
    }
}

param_enum! {
    Discipline {
        Boulder => "boulder", "bouldering";
        Sport => "sport", "sport climbing";
        Trad => "trad", "trad climbing";
    }
}

param_enum! {
    Location {
        Gym => "gym", "in the gym";
        Outdoor => "outdoor", "outdoors";
    }
}

param_enum! {
    Performance {
        Project => "project", "sent after projecting";
        Flash => "flash", "flashed or onsighted";
    }
}

param_enum! {
    WeightedMovement {
        Pullup => "pullup", "pull-up";
        Dip => "dip", "dip";
        BenchPress => "benchpress", "bench press";
        Squat => "squat", "back squat";
        Deadlift => "deadlift", "deadlift";
    }
}

param_enum! {
    MaxRepsMovement {
        Pullup => "pullup", "pull-ups";
        Pushup => "pushup", "push-ups";
        Dip => "dip", "dips";
        ToesToBar => "toes-to-bar", "toes-to-bar";
    }
}

param_enum! {
    IsometricMovement {
        LSit => "lsit", "L-sit";
        FrontLever => "front-lever", "front lever";
        Plank => "plank", "plank";
        DeadHang => "dead-hang", "dead hang from a bar";
    }
}

param_enum! {
    /// Activities that carry a "how long have you trained this" measure.
    TrainedClass {
        Boulder => "boulder", "bouldering";
        Sport => "sport", "sport climbing";
        Trad => "trad", "trad climbing";
        MaxHang => "maxhang", "max hangs";
        BlockPull => "blockpull", "block pulls";
        ContinuousHang => "continuoushang", "continuous hangs";
        Repeaters => "repeaters", "repeaters";
        Weighted => "weighted", "weighted strength training";
        MaxReps => "maxreps", "bodyweight rep work";
        Isometric => "isometric", "isometric core and hang holds";
    }
}

impl From<Discipline> for TrainedClass {
    fn from(discipline: Discipline) -> Self {
        match discipline {
            Discipline::Boulder => TrainedClass::Boulder,
            Discipline::Sport => TrainedClass::Sport,
            Discipline::Trad => TrainedClass::Trad,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_enum_ids_round_trip() {
        for grip in Grip::ALL {
            assert_eq!(grip.as_str().parse::<Grip>(), Ok(*grip));
        }
        for class in TrainedClass::ALL {
            assert_eq!(class.as_str().parse::<TrainedClass>(), Ok(*class));
        }
        assert!("crimp".parse::<Grip>().is_err());
    }

    #[test]
    fn test_parse_numeric_param() {
        assert_eq!(parse_param::<u32>(ParamName::EdgeSize, "20"), Ok(20));
        assert_eq!(
            parse_param::<u32>(ParamName::EdgeSize, "twenty"),
            Err(MeasureIdError::InvalidParam {
                param: ParamName::EdgeSize,
                value: "twenty".to_string(),
            })
        );
    }
}
