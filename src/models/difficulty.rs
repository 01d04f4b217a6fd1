use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Outcome of a single review, as chosen by the learner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Forgot,
    Unsure,
    Remembered,
    Perfect,
}

impl Difficulty {
    /// All outcomes, from worst to best
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Forgot,
        Difficulty::Unsure,
        Difficulty::Remembered,
        Difficulty::Perfect,
    ];

    /// The lowercase label used in stored records and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Forgot => "forgot",
            Difficulty::Unsure => "unsure",
            Difficulty::Remembered => "remembered",
            Difficulty::Perfect => "perfect",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forgot" => Ok(Difficulty::Forgot),
            "unsure" => Ok(Difficulty::Unsure),
            "remembered" => Ok(Difficulty::Remembered),
            "perfect" => Ok(Difficulty::Perfect),
            other => Err(AppError::InvalidOutcome(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_labels() {
        for difficulty in Difficulty::ALL {
            assert_eq!(difficulty.as_str().parse::<Difficulty>().unwrap(), difficulty);
        }
    }

    #[test]
    fn test_parse_unknown_label_is_invalid_outcome() {
        let err = "easy".parse::<Difficulty>().unwrap_err();
        assert!(matches!(err, AppError::InvalidOutcome(ref label) if label == "easy"));
    }

    #[test]
    fn test_labels_are_case_sensitive() {
        assert!("Perfect".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_serde_uses_lowercase_labels() {
        let json = serde_json::to_string(&Difficulty::Remembered).unwrap();
        assert_eq!(json, "\"remembered\"");
    }
}
