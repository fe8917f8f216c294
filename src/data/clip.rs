use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use utoipa::ToSchema;

use crate::error::RosterError;

const MIN_POSITION: u8 = 0;
const MAX_POSITION: u8 = 3;
const DEFAULT_POSITION: u8 = 1;

/// Discipline level of a single student on the clip chart.
///
/// Positions run from `0` (purple) through `1` (green, the starting point),
/// `2` (yellow) and `3` (red). A value outside of that range can't be
/// constructed, so deserializing a stored out-of-range number fails instead
/// of producing an invalid student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "i64", into = "i64")]
pub struct ClipPosition(u8);

impl ClipPosition {
    pub const PURPLE: ClipPosition = ClipPosition(0);
    pub const GREEN: ClipPosition = ClipPosition(1);
    pub const YELLOW: ClipPosition = ClipPosition(2);
    pub const RED: ClipPosition = ClipPosition(3);

    /// Moves one step towards red. Saturates at red.
    pub fn increase_severity(self) -> ClipPosition {
        if self.0 < MAX_POSITION {
            ClipPosition(self.0 + 1)
        } else {
            self
        }
    }

    /// Moves one step towards purple. Saturates at purple.
    pub fn decrease_severity(self) -> ClipPosition {
        if self.0 > MIN_POSITION {
            ClipPosition(self.0 - 1)
        } else {
            self
        }
    }

    pub fn reset(self) -> ClipPosition {
        ClipPosition::default()
    }

    pub fn color(self) -> &'static str {
        match self.0 {
            0 => "purple",
            1 => "green",
            2 => "yellow",
            _ => "red",
        }
    }

    pub fn apply(self, transition: ClipTransition) -> ClipPosition {
        match transition {
            ClipTransition::IncreaseSeverity => self.increase_severity(),
            ClipTransition::DecreaseSeverity => self.decrease_severity(),
            ClipTransition::Reset => self.reset(),
        }
    }
}

impl Default for ClipPosition {
    fn default() -> Self {
        ClipPosition(DEFAULT_POSITION)
    }
}

impl TryFrom<i64> for ClipPosition {
    type Error = RosterError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (MIN_POSITION as i64..=MAX_POSITION as i64).contains(&value) {
            Ok(ClipPosition(value as u8))
        } else {
            Err(RosterError::InvalidClipPosition(value))
        }
    }
}

impl From<ClipPosition> for i64 {
    fn from(value: ClipPosition) -> Self {
        value.0 as i64
    }
}

impl Display for ClipPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.0, self.color())
    }
}

/// A single move on the clip chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClipTransition {
    IncreaseSeverity,
    DecreaseSeverity,
    Reset,
}

impl<'a> rocket::request::FromParam<'a> for ClipTransition {
    type Error = &'a str;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        match param {
            "increase" => Ok(ClipTransition::IncreaseSeverity),
            "decrease" => Ok(ClipTransition::DecreaseSeverity),
            "reset" => Ok(ClipTransition::Reset),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_positions() -> Vec<ClipPosition> {
        (0i64..=3)
            .map(|p| ClipPosition::try_from(p).unwrap())
            .collect()
    }

    #[test]
    fn transitions_stay_in_bounds() {
        for p in all_positions() {
            assert!(p.increase_severity() <= ClipPosition::RED);
            assert!(p.decrease_severity() >= ClipPosition::PURPLE);
            assert_eq!(p.reset(), ClipPosition::GREEN);
        }
    }

    #[test]
    fn transitions_saturate() {
        assert_eq!(ClipPosition::RED.increase_severity(), ClipPosition::RED);
        assert_eq!(ClipPosition::PURPLE.decrease_severity(), ClipPosition::PURPLE);
        assert_eq!(ClipPosition::GREEN.increase_severity(), ClipPosition::YELLOW);
        assert_eq!(ClipPosition::GREEN.decrease_severity(), ClipPosition::PURPLE);
    }

    #[test]
    fn default_is_green() {
        assert_eq!(ClipPosition::default(), ClipPosition::GREEN);
        assert_eq!(ClipPosition::default().color(), "green");
    }

    #[test]
    fn out_of_range_rejected() {
        assert!(matches!(
            ClipPosition::try_from(4i64),
            Err(RosterError::InvalidClipPosition(4))
        ));
        assert!(ClipPosition::try_from(-1i64).is_err());
    }

    #[test]
    fn stored_value_is_validated() {
        let doc = bson::doc! { "p": 7 };
        #[derive(Debug, Deserialize)]
        struct Holder {
            p: ClipPosition,
        }
        assert!(bson::from_document::<Holder>(doc).is_err());

        let doc = bson::doc! { "p": 2 };
        let holder: Holder = bson::from_document(doc).unwrap();
        assert_eq!(holder.p, ClipPosition::YELLOW);
    }

    #[test]
    fn transition_params() {
        use rocket::request::FromParam;
        assert_eq!(
            ClipTransition::from_param("increase"),
            Ok(ClipTransition::IncreaseSeverity)
        );
        assert_eq!(ClipTransition::from_param("reset"), Ok(ClipTransition::Reset));
        assert!(ClipTransition::from_param("sideways").is_err());
    }
}
