//! Compass directions.
//!
//! Directions serve three purposes: biasing radial dispersal toward a
//! bearing, fixing the step of the deterministic-neighbor kernel, and
//! reporting the side from which infection is nearest to escaping a
//! quarantine area.  Row indices grow southward, column indices eastward.

use std::fmt;
use std::str::FromStr;

use crate::PopsError;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
    /// No preferred direction.
    #[default]
    None,
}

impl Direction {
    /// The eight compass points in clockwise order starting at north.
    pub const CLOCKWISE: [Direction; 8] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
    ];

    /// Bearing in degrees clockwise from north, `None` for [`Direction::None`].
    pub fn degrees(self) -> Option<f64> {
        match self {
            Direction::N => Some(0.0),
            Direction::NE => Some(45.0),
            Direction::E => Some(90.0),
            Direction::SE => Some(135.0),
            Direction::S => Some(180.0),
            Direction::SW => Some(225.0),
            Direction::W => Some(270.0),
            Direction::NW => Some(315.0),
            Direction::None => None,
        }
    }

    /// Bearing in radians, `None` for [`Direction::None`].
    pub fn radians(self) -> Option<f64> {
        self.degrees().map(f64::to_radians)
    }

    /// `(d_row, d_col)` of the adjacent cell in this direction.
    pub fn offset(self) -> Option<(i64, i64)> {
        match self {
            Direction::N => Some((-1, 0)),
            Direction::NE => Some((-1, 1)),
            Direction::E => Some((0, 1)),
            Direction::SE => Some((1, 1)),
            Direction::S => Some((1, 0)),
            Direction::SW => Some((1, -1)),
            Direction::W => Some((0, -1)),
            Direction::NW => Some((-1, -1)),
            Direction::None => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::N => "N",
            Direction::NE => "NE",
            Direction::E => "E",
            Direction::SE => "SE",
            Direction::S => "S",
            Direction::SW => "SW",
            Direction::W => "W",
            Direction::NW => "NW",
            Direction::None => "None",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = PopsError;

    /// Accepts the upper-case compass abbreviations plus `"NONE"`, `"None"`,
    /// `"none"`, and the empty string for [`Direction::None`].
    fn from_str(s: &str) -> Result<Self, PopsError> {
        match s.trim() {
            "N" => Ok(Direction::N),
            "NE" => Ok(Direction::NE),
            "E" => Ok(Direction::E),
            "SE" => Ok(Direction::SE),
            "S" => Ok(Direction::S),
            "SW" => Ok(Direction::SW),
            "W" => Ok(Direction::W),
            "NW" => Ok(Direction::NW),
            "NONE" | "None" | "none" | "" => Ok(Direction::None),
            other => Err(PopsError::Parse(format!("invalid direction {other:?}"))),
        }
    }
}

impl TryFrom<String> for Direction {
    type Error = PopsError;
    fn try_from(s: String) -> Result<Self, PopsError> {
        s.parse()
    }
}

impl From<Direction> for String {
    fn from(d: Direction) -> String {
        d.as_str().to_owned()
    }
}
