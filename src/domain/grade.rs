// Grade scales - ordered lookup tables mapping each grading system onto IRCRA
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Range of IRCRA values accepted from direct user input.
pub const IRCRA_MIN: f64 = 6.0;
pub const IRCRA_MAX: f64 = 32.0;

// Slack for float error picked up in unit switches before bucketing.
const BUCKET_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GradeError {
    #[error("'{label}' is not a {scale} grade")]
    UnknownLabel { scale: &'static str, label: String },
    #[error("{value} is outside the {scale} scale")]
    OutOfDomain { scale: &'static str, value: u8 },
}

/// A climbing grade system backed by an ordered `(grade, ircra)` table.
///
/// Tables are listed easiest first and their IRCRA values strictly increase,
/// so `from_canonical(to_canonical(g)) == g` for every grade in the table.
pub trait GradeScale: Copy + PartialEq + fmt::Display + 'static {
    const NAME: &'static str;

    fn table() -> &'static [(Self, f64)];

    fn domain() -> impl Iterator<Item = Self> {
        Self::table().iter().map(|(grade, _)| *grade)
    }

    /// Position in the ordered domain.
    fn index(self) -> usize {
        Self::table()
            .iter()
            .position(|(grade, _)| *grade == self)
            .unwrap_or(0)
    }

    /// Grade at `position` in the domain, clamped to the hardest grade.
    fn at(position: usize) -> Self {
        let table = Self::table();
        table[position.min(table.len() - 1)].0
    }

    fn to_canonical(self) -> f64 {
        Self::table()[self.index()].1
    }

    /// Floor-style bucketing: the hardest grade whose IRCRA value does not
    /// exceed `value`. Inputs beyond either end clamp to the extreme grade.
    fn from_canonical(value: f64) -> Self {
        let table = Self::table();
        let mut grade = table[0].0;
        if value.is_nan() {
            return grade;
        }
        for &(candidate, ircra) in table {
            if value + BUCKET_TOLERANCE < ircra {
                break;
            }
            grade = candidate;
        }
        grade
    }

    /// Move `delta` positions through the domain, clamped at both ends.
    fn step(self, delta: i32) -> Self {
        let table = Self::table();
        let last = table.len() as i64 - 1;
        let target = (self.index() as i64 + delta as i64).clamp(0, last);
        table[target as usize].0
    }
}

macro_rules! labelled_scale {
    (
        $(#[$meta:meta])*
        $name:ident, $scale:literal {
            $($variant:ident => $label:literal = $ircra:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant,)+
        }

        impl $name {
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl GradeScale for $name {
            const NAME: &'static str = $scale;

            fn table() -> &'static [(Self, f64)] {
                &[$(($name::$variant, $ircra),)+]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = GradeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::domain()
                    .find(|grade| grade.label().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| GradeError::UnknownLabel {
                        scale: $scale,
                        label: wanted.to_string(),
                    })
            }
        }
    };
}

// Numbered scales serialize as bare integers, so the wire format stays
// `{"unit":"vermin","value":5}`. Deserialization rejects numbers off the table.
macro_rules! numbered_scale {
    (
        $(#[$meta:meta])*
        $name:ident, $scale:literal, prefix $prefix:literal {
            $($number:literal => $ircra:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "u8", into = "u8")]
        pub struct $name(u8);

        impl $name {
            const TABLE: &'static [($name, f64)] = &[$(($name($number), $ircra),)+];

            pub fn number(self) -> u8 {
                self.0
            }
        }

        impl GradeScale for $name {
            const NAME: &'static str = $scale;

            fn table() -> &'static [(Self, f64)] {
                Self::TABLE
            }
        }

        impl TryFrom<u8> for $name {
            type Error = GradeError;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                Self::domain()
                    .find(|grade| grade.0 == value)
                    .ok_or(GradeError::OutOfDomain { scale: $scale, value })
            }
        }

        impl From<$name> for u8 {
            fn from(grade: $name) -> u8 {
                grade.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = GradeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                let digits = match trimmed.get(..$prefix.len()) {
                    Some(head) if !$prefix.is_empty() && head.eq_ignore_ascii_case($prefix) => {
                        &trimmed[$prefix.len()..]
                    }
                    _ => trimmed,
                };
                let number: u8 = digits.parse().map_err(|_| GradeError::UnknownLabel {
                    scale: $scale,
                    label: trimmed.to_string(),
                })?;
                Self::try_from(number)
            }
        }
    };
}

numbered_scale! {
    /// Hueco "V" boulder grades, V0 to V17.
    VGrade, "V-scale", prefix "V" {
        0 => 12.0,
        1 => 14.0,
        2 => 15.0,
        3 => 16.25,
        4 => 17.5,
        5 => 19.5,
        6 => 21.0,
        7 => 22.0,
        8 => 23.25,
        9 => 24.0,
        10 => 25.0,
        11 => 26.0,
        12 => 27.0,
        13 => 28.0,
        14 => 29.0,
        15 => 30.0,
        16 => 31.0,
        17 => 32.0,
    }
}

numbered_scale! {
    /// Australian Ewbank route grades, 12 to 39.
    Ewbank, "Ewbank", prefix "" {
        12 => 6.0,
        13 => 6.5,
        14 => 7.0,
        15 => 7.5,
        16 => 8.0,
        17 => 8.5,
        18 => 9.0,
        19 => 10.0,
        20 => 11.0,
        21 => 11.5,
        22 => 12.0,
        23 => 13.0,
        24 => 14.0,
        25 => 15.0,
        26 => 16.0,
        27 => 17.0,
        28 => 18.0,
        29 => 19.0,
        30 => 20.0,
        31 => 21.0,
        32 => 22.0,
        33 => 23.0,
        34 => 24.0,
        35 => 25.0,
        36 => 26.0,
        37 => 27.0,
        38 => 28.0,
        39 => 29.0,
    }
}

labelled_scale! {
    /// Fontainebleau boulder grades.
    Font, "Font" {
        F3 => "3" = 10.0,
        F4 => "4" = 12.0,
        F4Plus => "4+" = 13.0,
        F5 => "5" = 14.0,
        F5Plus => "5+" = 15.0,
        F6A => "6A" = 16.0,
        F6APlus => "6A+" = 16.5,
        F6B => "6B" = 17.0,
        F6BPlus => "6B+" = 18.0,
        F6C => "6C" = 19.0,
        F6CPlus => "6C+" = 20.0,
        F7A => "7A" = 21.0,
        F7APlus => "7A+" = 22.0,
        F7B => "7B" = 23.0,
        F7BPlus => "7B+" = 23.5,
        F7C => "7C" = 24.0,
        F7CPlus => "7C+" = 25.0,
        F8A => "8A" = 26.0,
        F8APlus => "8A+" = 27.0,
        F8B => "8B" = 28.0,
        F8BPlus => "8B+" = 29.0,
        F8C => "8C" = 30.0,
        F8CPlus => "8C+" = 31.0,
        F9A => "9A" = 32.0,
    }
}

labelled_scale! {
    /// French sport route grades.
    FrenchSport, "French sport" {
        F4 => "4" = 6.0,
        F5a => "5a" = 7.0,
        F5b => "5b" = 8.0,
        F5c => "5c" = 9.0,
        F6a => "6a" = 10.0,
        F6aPlus => "6a+" = 11.0,
        F6b => "6b" = 12.0,
        F6bPlus => "6b+" = 13.0,
        F6c => "6c" = 14.0,
        F6cPlus => "6c+" = 15.0,
        F7a => "7a" = 16.0,
        F7aPlus => "7a+" = 17.0,
        F7b => "7b" = 18.0,
        F7bPlus => "7b+" = 19.0,
        F7c => "7c" = 20.0,
        F7cPlus => "7c+" = 21.0,
        F8a => "8a" = 22.0,
        F8aPlus => "8a+" = 23.0,
        F8b => "8b" = 24.0,
        F8bPlus => "8b+" = 25.0,
        F8c => "8c" = 26.0,
        F8cPlus => "8c+" = 27.0,
        F9a => "9a" = 28.0,
        F9aPlus => "9a+" = 29.0,
        F9b => "9b" = 30.0,
        F9bPlus => "9b+" = 31.0,
        F9c => "9c" = 32.0,
    }
}

labelled_scale! {
    /// Yosemite Decimal System route grades.
    Yds, "YDS" {
        Y56 => "5.6" = 6.0,
        Y57 => "5.7" = 7.0,
        Y58 => "5.8" = 8.0,
        Y59 => "5.9" = 9.0,
        Y510a => "5.10a" = 10.0,
        Y510b => "5.10b" = 11.0,
        Y510c => "5.10c" = 11.5,
        Y510d => "5.10d" = 12.0,
        Y511a => "5.11a" = 12.5,
        Y511b => "5.11b" = 13.0,
        Y511c => "5.11c" = 14.0,
        Y511d => "5.11d" = 15.0,
        Y512a => "5.12a" = 16.0,
        Y512b => "5.12b" = 17.0,
        Y512c => "5.12c" = 18.0,
        Y512d => "5.12d" = 19.0,
        Y513a => "5.13a" = 20.0,
        Y513b => "5.13b" = 21.0,
        Y513c => "5.13c" = 22.0,
        Y513d => "5.13d" = 23.0,
        Y514a => "5.14a" = 24.0,
        Y514b => "5.14b" = 25.0,
        Y514c => "5.14c" = 26.0,
        Y514d => "5.14d" = 27.0,
        Y515a => "5.15a" = 28.0,
        Y515b => "5.15b" = 29.0,
        Y515c => "5.15c" = 30.0,
        Y515d => "5.15d" = 31.0,
    }
}
