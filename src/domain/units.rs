// Unit values - tagged measurement values and conversion to canonical units
use crate::domain::grade::{
    Ewbank, Font, FrenchSport, GradeError, GradeScale, IRCRA_MAX, IRCRA_MIN, VGrade, Yds,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

pub const KG_PER_LB: f64 = 0.45359237;
pub const M_PER_INCH: f64 = 0.0254;
pub const INCHES_PER_FOOT: f64 = 12.0;
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Tag of a [`UnitValue`]; the wire name is the `unit` field of the JSON shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    #[serde(rename = "second")]
    Second,
    #[serde(rename = "month")]
    Month,
    #[serde(rename = "year")]
    Year,
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "lb")]
    Pound,
    #[serde(rename = "m")]
    Meter,
    #[serde(rename = "cm")]
    Centimeter,
    #[serde(rename = "inch")]
    Inch,
    #[serde(rename = "ft_in")]
    FeetInches,
    #[serde(rename = "count")]
    Count,
    #[serde(rename = "sex-at-birth")]
    SexAtBirth,
    #[serde(rename = "ircra")]
    Ircra,
    #[serde(rename = "vermin")]
    Vermin,
    #[serde(rename = "font")]
    Font,
    #[serde(rename = "frenchsport")]
    FrenchSport,
    #[serde(rename = "yds")]
    Yds,
    #[serde(rename = "ewbank")]
    Ewbank,
}

/// Units within one category share a canonical unit and convert freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitCategory {
    ShortDuration,
    TrainingDuration,
    Mass,
    Length,
    Count,
    Sex,
    Grade,
}

impl UnitKind {
    pub const ALL: [UnitKind; 17] = [
        UnitKind::Second,
        UnitKind::Month,
        UnitKind::Year,
        UnitKind::Kilogram,
        UnitKind::Pound,
        UnitKind::Meter,
        UnitKind::Centimeter,
        UnitKind::Inch,
        UnitKind::FeetInches,
        UnitKind::Count,
        UnitKind::SexAtBirth,
        UnitKind::Ircra,
        UnitKind::Vermin,
        UnitKind::Font,
        UnitKind::FrenchSport,
        UnitKind::Yds,
        UnitKind::Ewbank,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UnitKind::Second => "second",
            UnitKind::Month => "month",
            UnitKind::Year => "year",
            UnitKind::Kilogram => "kg",
            UnitKind::Pound => "lb",
            UnitKind::Meter => "m",
            UnitKind::Centimeter => "cm",
            UnitKind::Inch => "inch",
            UnitKind::FeetInches => "ft_in",
            UnitKind::Count => "count",
            UnitKind::SexAtBirth => "sex-at-birth",
            UnitKind::Ircra => "ircra",
            UnitKind::Vermin => "vermin",
            UnitKind::Font => "font",
            UnitKind::FrenchSport => "frenchsport",
            UnitKind::Yds => "yds",
            UnitKind::Ewbank => "ewbank",
        }
    }

    pub fn category(self) -> UnitCategory {
        match self {
            UnitKind::Second => UnitCategory::ShortDuration,
            UnitKind::Month | UnitKind::Year => UnitCategory::TrainingDuration,
            UnitKind::Kilogram | UnitKind::Pound => UnitCategory::Mass,
            UnitKind::Meter | UnitKind::Centimeter | UnitKind::Inch | UnitKind::FeetInches => {
                UnitCategory::Length
            }
            UnitKind::Count => UnitCategory::Count,
            UnitKind::SexAtBirth => UnitCategory::Sex,
            UnitKind::Ircra
            | UnitKind::Vermin
            | UnitKind::Font
            | UnitKind::FrenchSport
            | UnitKind::Yds
            | UnitKind::Ewbank => UnitCategory::Grade,
        }
    }

    pub fn is_compatible_with(self, other: UnitKind) -> bool {
        self.category() == other.category()
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Female,
    Male,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeetInches {
    pub ft: f64,
    #[serde(rename = "in")]
    pub inches: f64,
}

impl FeetInches {
    pub fn from_meters(meters: f64) -> Self {
        let total_inches = meters / M_PER_INCH;
        let ft = (total_inches / INCHES_PER_FOOT).floor();
        let inches = total_inches - ft * INCHES_PER_FOOT;
        // Whole feet converted through meters land a hair under 12 inches.
        if INCHES_PER_FOOT - inches < 1e-9 {
            return Self {
                ft: ft + 1.0,
                inches: 0.0,
            };
        }
        Self { ft, inches }
    }

    pub fn to_meters(self) -> f64 {
        (self.ft * INCHES_PER_FOOT + self.inches) * M_PER_INCH
    }
}

/// A measurement in the unit the user entered it in.
///
/// Serializes as `{"unit": <tag>, "value": <payload>}`, the shape stored in
/// every snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value")]
pub enum UnitValue {
    #[serde(rename = "second")]
    Second(f64),
    #[serde(rename = "month")]
    Month(f64),
    #[serde(rename = "year")]
    Year(f64),
    #[serde(rename = "kg")]
    Kilogram(f64),
    #[serde(rename = "lb")]
    Pound(f64),
    #[serde(rename = "m")]
    Meter(f64),
    #[serde(rename = "cm")]
    Centimeter(f64),
    #[serde(rename = "inch")]
    Inch(f64),
    #[serde(rename = "ft_in")]
    FeetInches(FeetInches),
    #[serde(rename = "count")]
    Count(f64),
    #[serde(rename = "sex-at-birth")]
    SexAtBirth(Sex),
    #[serde(rename = "ircra")]
    Ircra(f64),
    #[serde(rename = "vermin")]
    Vermin(VGrade),
    #[serde(rename = "font")]
    Font(Font),
    #[serde(rename = "frenchsport")]
    FrenchSport(FrenchSport),
    #[serde(rename = "yds")]
    Yds(Yds),
    #[serde(rename = "ewbank")]
    Ewbank(Ewbank),
}

impl UnitValue {
    pub fn unit(&self) -> UnitKind {
        match self {
            UnitValue::Second(_) => UnitKind::Second,
            UnitValue::Month(_) => UnitKind::Month,
            UnitValue::Year(_) => UnitKind::Year,
            UnitValue::Kilogram(_) => UnitKind::Kilogram,
            UnitValue::Pound(_) => UnitKind::Pound,
            UnitValue::Meter(_) => UnitKind::Meter,
            UnitValue::Centimeter(_) => UnitKind::Centimeter,
            UnitValue::Inch(_) => UnitKind::Inch,
            UnitValue::FeetInches(_) => UnitKind::FeetInches,
            UnitValue::Count(_) => UnitKind::Count,
            UnitValue::SexAtBirth(_) => UnitKind::SexAtBirth,
            UnitValue::Ircra(_) => UnitKind::Ircra,
            UnitValue::Vermin(_) => UnitKind::Vermin,
            UnitValue::Font(_) => UnitKind::Font,
            UnitValue::FrenchSport(_) => UnitKind::FrenchSport,
            UnitValue::Yds(_) => UnitKind::Yds,
            UnitValue::Ewbank(_) => UnitKind::Ewbank,
        }
    }

    pub fn canonical(&self) -> f64 {
        convert_to_standard_unit(self)
    }

    /// Re-express this value in `target`, keeping its canonical meaning.
    pub fn convert_to(&self, target: UnitKind) -> UnitValue {
        convert_to_target_unit(self.canonical(), target)
    }
}

impl fmt::Display for UnitValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&unit_value_to_string(self))
    }
}

/// Map any value onto its category's canonical number: seconds, years,
/// kilograms, meters, counts, `female = 0 / male = 1`, or IRCRA.
pub fn convert_to_standard_unit(value: &UnitValue) -> f64 {
    match *value {
        UnitValue::Second(seconds) => seconds,
        UnitValue::Month(months) => months / MONTHS_PER_YEAR,
        UnitValue::Year(years) => years,
        UnitValue::Kilogram(kg) => kg,
        UnitValue::Pound(lb) => lb * KG_PER_LB,
        UnitValue::Meter(m) => m,
        UnitValue::Centimeter(cm) => cm / 100.0,
        UnitValue::Inch(inches) => inches * M_PER_INCH,
        UnitValue::FeetInches(ft_in) => ft_in.to_meters(),
        UnitValue::Count(count) => count,
        UnitValue::SexAtBirth(Sex::Female) => 0.0,
        UnitValue::SexAtBirth(Sex::Male) => 1.0,
        UnitValue::Ircra(ircra) => ircra,
        UnitValue::Vermin(grade) => grade.to_canonical(),
        UnitValue::Font(grade) => grade.to_canonical(),
        UnitValue::FrenchSport(grade) => grade.to_canonical(),
        UnitValue::Yds(grade) => grade.to_canonical(),
        UnitValue::Ewbank(grade) => grade.to_canonical(),
    }
}

/// Inverse of [`convert_to_standard_unit`]. Exact for physical units; grade
/// units bucket through their scale's `from_canonical`.
pub fn convert_to_target_unit(canonical: f64, target: UnitKind) -> UnitValue {
    match target {
        UnitKind::Second => UnitValue::Second(canonical),
        UnitKind::Month => UnitValue::Month(canonical * MONTHS_PER_YEAR),
        UnitKind::Year => UnitValue::Year(canonical),
        UnitKind::Kilogram => UnitValue::Kilogram(canonical),
        UnitKind::Pound => UnitValue::Pound(canonical / KG_PER_LB),
        UnitKind::Meter => UnitValue::Meter(canonical),
        UnitKind::Centimeter => UnitValue::Centimeter(canonical * 100.0),
        UnitKind::Inch => UnitValue::Inch(canonical / M_PER_INCH),
        UnitKind::FeetInches => UnitValue::FeetInches(FeetInches::from_meters(canonical)),
        UnitKind::Count => UnitValue::Count(canonical),
        UnitKind::SexAtBirth => {
            UnitValue::SexAtBirth(if canonical >= 0.5 { Sex::Male } else { Sex::Female })
        }
        UnitKind::Ircra => UnitValue::Ircra(canonical),
        UnitKind::Vermin => UnitValue::Vermin(VGrade::from_canonical(canonical)),
        UnitKind::Font => UnitValue::Font(Font::from_canonical(canonical)),
        UnitKind::FrenchSport => UnitValue::FrenchSport(FrenchSport::from_canonical(canonical)),
        UnitKind::Yds => UnitValue::Yds(Yds::from_canonical(canonical)),
        UnitKind::Ewbank => UnitValue::Ewbank(Ewbank::from_canonical(canonical)),
    }
}

/// The plain number a plot axis shows for `value` in its own unit.
///
/// Grades plot on the IRCRA axis; feet and inches plot as total inches.
pub fn unit_value_to_number(value: &UnitValue) -> f64 {
    match *value {
        UnitValue::Second(n)
        | UnitValue::Month(n)
        | UnitValue::Year(n)
        | UnitValue::Kilogram(n)
        | UnitValue::Pound(n)
        | UnitValue::Meter(n)
        | UnitValue::Centimeter(n)
        | UnitValue::Inch(n)
        | UnitValue::Count(n)
        | UnitValue::Ircra(n) => n,
        UnitValue::FeetInches(ft_in) => ft_in.ft * INCHES_PER_FOOT + ft_in.inches,
        UnitValue::SexAtBirth(_)
        | UnitValue::Vermin(_)
        | UnitValue::Font(_)
        | UnitValue::FrenchSport(_)
        | UnitValue::Yds(_)
        | UnitValue::Ewbank(_) => convert_to_standard_unit(value),
    }
}

pub fn unit_value_to_string(value: &UnitValue) -> String {
    match value {
        UnitValue::Second(s) => format!("{}s", format_number(*s)),
        UnitValue::Month(m) => format!("{} mo", format_number(*m)),
        UnitValue::Year(y) => format!("{} yr", format_number(*y)),
        UnitValue::Kilogram(kg) => format!("{} kg", format_number(*kg)),
        UnitValue::Pound(lb) => format!("{} lb", format_number(*lb)),
        UnitValue::Meter(m) => format!("{} m", format_number(*m)),
        UnitValue::Centimeter(cm) => format!("{} cm", format_number(*cm)),
        UnitValue::Inch(inches) => format!("{} in", format_number(*inches)),
        UnitValue::FeetInches(ft_in) => {
            format!("{}'{}\"", format_number(ft_in.ft), format_number(ft_in.inches))
        }
        UnitValue::Count(count) => format_number(*count),
        UnitValue::SexAtBirth(Sex::Female) => "female".to_string(),
        UnitValue::SexAtBirth(Sex::Male) => "male".to_string(),
        UnitValue::Ircra(ircra) => format!("IRCRA {}", format_number(*ircra)),
        UnitValue::Vermin(grade) => grade.to_string(),
        UnitValue::Font(grade) => grade.to_string(),
        UnitValue::FrenchSport(grade) => grade.to_string(),
        UnitValue::Yds(grade) => grade.to_string(),
        UnitValue::Ewbank(grade) => grade.to_string(),
    }
}

/// Up to two decimals, trailing zeros dropped.
fn format_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let text = format!("{rounded:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" { "0".to_string() } else { text.to_string() }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitParseError {
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("value must not be negative")]
    Negative,
    #[error("'{0}' is not a whole number")]
    NotWhole(String),
    #[error("IRCRA grade must be between {} and {}, got {}", IRCRA_MIN, IRCRA_MAX, .0)]
    IrcraOutOfRange(f64),
    #[error("expected feet and inches like 5'10\", got '{0}'")]
    FeetInches(String),
    #[error("expected 'male' or 'female', got '{0}'")]
    Sex(String),
    #[error(transparent)]
    Grade(#[from] GradeError),
}

/// Parse raw user input for a given unit.
pub fn parse_unit_value(unit: UnitKind, input: &str) -> Result<UnitValue, UnitParseError> {
    match unit {
        UnitKind::Second => parse_non_negative(input).map(UnitValue::Second),
        UnitKind::Month => parse_non_negative(input).map(UnitValue::Month),
        UnitKind::Year => parse_non_negative(input).map(UnitValue::Year),
        UnitKind::Kilogram => parse_number(input).map(UnitValue::Kilogram),
        UnitKind::Pound => parse_number(input).map(UnitValue::Pound),
        UnitKind::Meter => parse_non_negative(input).map(UnitValue::Meter),
        UnitKind::Centimeter => parse_non_negative(input).map(UnitValue::Centimeter),
        UnitKind::Inch => parse_non_negative(input).map(UnitValue::Inch),
        UnitKind::FeetInches => parse_feet_inches(input).map(UnitValue::FeetInches),
        UnitKind::Count => parse_count(input).map(UnitValue::Count),
        UnitKind::SexAtBirth => parse_sex(input).map(UnitValue::SexAtBirth),
        UnitKind::Ircra => parse_ircra(input).map(UnitValue::Ircra),
        UnitKind::Vermin => Ok(UnitValue::Vermin(input.parse()?)),
        UnitKind::Font => Ok(UnitValue::Font(input.parse()?)),
        UnitKind::FrenchSport => Ok(UnitValue::FrenchSport(input.parse()?)),
        UnitKind::Yds => Ok(UnitValue::Yds(input.parse()?)),
        UnitKind::Ewbank => Ok(UnitValue::Ewbank(input.parse()?)),
    }
}

/// Check an already typed value against the rules [`parse_unit_value`]
/// applies to text input.
pub fn validate_unit_value(value: &UnitValue) -> Result<(), UnitParseError> {
    let number = match *value {
        UnitValue::SexAtBirth(_)
        | UnitValue::Vermin(_)
        | UnitValue::Font(_)
        | UnitValue::FrenchSport(_)
        | UnitValue::Yds(_)
        | UnitValue::Ewbank(_) => return Ok(()),
        UnitValue::FeetInches(ft_in) => {
            if !(ft_in.ft.is_finite() && ft_in.inches.is_finite())
                || ft_in.ft < 0.0
                || ft_in.inches < 0.0
                || ft_in.inches >= INCHES_PER_FOOT
            {
                return Err(UnitParseError::FeetInches(unit_value_to_string(value)));
            }
            return Ok(());
        }
        UnitValue::Second(n)
        | UnitValue::Month(n)
        | UnitValue::Year(n)
        | UnitValue::Kilogram(n)
        | UnitValue::Pound(n)
        | UnitValue::Meter(n)
        | UnitValue::Centimeter(n)
        | UnitValue::Inch(n)
        | UnitValue::Count(n)
        | UnitValue::Ircra(n) => n,
    };
    if !number.is_finite() {
        return Err(UnitParseError::NotANumber(number.to_string()));
    }
    match value {
        UnitValue::Kilogram(_) | UnitValue::Pound(_) => Ok(()),
        UnitValue::Ircra(_) if !(IRCRA_MIN..=IRCRA_MAX).contains(&number) => {
            Err(UnitParseError::IrcraOutOfRange(number))
        }
        UnitValue::Ircra(_) => Ok(()),
        _ if number < 0.0 => Err(UnitParseError::Negative),
        UnitValue::Count(_) if number.fract() != 0.0 => {
            Err(UnitParseError::NotWhole(number.to_string()))
        }
        _ => Ok(()),
    }
}

// Mass is left signed: assisted hangs are recorded as negative added weight.
fn parse_number(input: &str) -> Result<f64, UnitParseError> {
    let trimmed = input.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(UnitParseError::NotANumber(trimmed.to_string())),
    }
}

fn parse_non_negative(input: &str) -> Result<f64, UnitParseError> {
    let value = parse_number(input)?;
    if value < 0.0 {
        return Err(UnitParseError::Negative);
    }
    Ok(value)
}

fn parse_count(input: &str) -> Result<f64, UnitParseError> {
    let value = parse_non_negative(input)?;
    if value.fract() != 0.0 {
        return Err(UnitParseError::NotWhole(input.trim().to_string()));
    }
    Ok(value)
}

fn parse_ircra(input: &str) -> Result<f64, UnitParseError> {
    let value = parse_number(input)?;
    if !(IRCRA_MIN..=IRCRA_MAX).contains(&value) {
        return Err(UnitParseError::IrcraOutOfRange(value));
    }
    Ok(value)
}

fn parse_sex(input: &str) -> Result<Sex, UnitParseError> {
    match input.trim().to_ascii_lowercase().as_str() {
        "female" => Ok(Sex::Female),
        "male" => Ok(Sex::Male),
        other => Err(UnitParseError::Sex(other.to_string())),
    }
}

static FEET_INCHES_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\s*(\d+)\s*(?:(?:'|ft)\s*(?:(\d+(?:\.\d+)?)\s*(?:"|in)?)?|\s+(\d+(?:\.\d+)?)\s*(?:"|in)?)?\s*$"#,
    )
    .expect("feet and inches pattern compiles")
});

/// Accepts `5'10"`, `5' 10`, `5 10`, `5ft 10in` and a bare `5`.
fn parse_feet_inches(input: &str) -> Result<FeetInches, UnitParseError> {
    let invalid = || UnitParseError::FeetInches(input.trim().to_string());
    let captures = FEET_INCHES_PATTERN.captures(input).ok_or_else(invalid)?;
    let ft = captures[1].parse::<f64>().map_err(|_| invalid())?;
    let inches = match captures.get(2).or_else(|| captures.get(3)) {
        Some(inches) => inches.as_str().parse::<f64>().map_err(|_| invalid())?,
        None => 0.0,
    };
    if inches >= INCHES_PER_FOOT {
        return Err(invalid());
    }
    Ok(FeetInches { ft, inches })
}
