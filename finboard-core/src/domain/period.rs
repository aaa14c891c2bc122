//! Chart periods offered by the market views.

use crate::error::DataError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "5D")]
    FiveDays,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "MAX")]
    Max,
}

impl Period {
    pub const ALL: [Period; 7] = [
        Period::OneDay,
        Period::FiveDays,
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::Max,
    ];

    /// Label used in cache keys and in the remote API's `period` parameter.
    pub fn label(self) -> &'static str {
        match self {
            Period::OneDay => "1D",
            Period::FiveDays => "5D",
            Period::OneMonth => "1M",
            Period::ThreeMonths => "3M",
            Period::SixMonths => "6M",
            Period::OneYear => "1Y",
            Period::Max => "MAX",
        }
    }

    /// Intraday periods keep weekend points; everything else skips them.
    pub fn is_intraday(self) -> bool {
        self == Period::OneDay
    }
}

impl FromStr for Period {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Period::ALL
            .into_iter()
            .find(|p| p.label() == upper)
            .ok_or_else(|| DataError::UnknownPeriod(s.to_string()))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_labels_case_insensitively() {
        assert_eq!("1d".parse::<Period>().unwrap(), Period::OneDay);
        assert_eq!(" max ".parse::<Period>().unwrap(), Period::Max);
        assert_eq!("6M".parse::<Period>().unwrap(), Period::SixMonths);
    }

    #[test]
    fn unknown_label_is_an_error() {
        assert!(matches!(
            "2W".parse::<Period>(),
            Err(DataError::UnknownPeriod(_))
        ));
    }

    #[test]
    fn serde_uses_labels() {
        let json = serde_json::to_string(&Period::ThreeMonths).unwrap();
        assert_eq!(json, "\"3M\"");
        let back: Period = serde_json::from_str("\"1Y\"").unwrap();
        assert_eq!(back, Period::OneYear);
    }
}
