use std::fmt;

use serde::{Deserialize, Serialize};

/// Inclusive upper bound, in meters, of each accuracy tier.
pub const EXCELLENT_MAX_METERS: f64 = 10.0;
pub const GOOD_MAX_METERS: f64 = 30.0;
pub const MEDIUM_MAX_METERS: f64 = 100.0;
pub const BAD_MAX_METERS: f64 = 200.0;

/// Qualitative tier for a reported accuracy radius.
///
/// Variants are ordered from the smallest radius of uncertainty to the
/// largest, so `Excellent < VeryBad`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccuracyQuality {
    Excellent,
    Good,
    Medium,
    Bad,
    #[serde(rename = "very bad")]
    VeryBad,
}

impl AccuracyQuality {
    pub const ALL: [AccuracyQuality; 5] = [
        AccuracyQuality::Excellent,
        AccuracyQuality::Good,
        AccuracyQuality::Medium,
        AccuracyQuality::Bad,
        AccuracyQuality::VeryBad,
    ];

    /// Classifies an accuracy radius in meters.
    ///
    /// Every comparison against `NaN` is false, so `NaN` falls through to
    /// [`AccuracyQuality::VeryBad`], as does `+inf`. There is no lower bound:
    /// zero, negative values and `-inf` are all `Excellent`.
    pub fn from_accuracy(accuracy: f64) -> Self {
        if accuracy <= EXCELLENT_MAX_METERS {
            AccuracyQuality::Excellent
        } else if accuracy <= GOOD_MAX_METERS {
            AccuracyQuality::Good
        } else if accuracy <= MEDIUM_MAX_METERS {
            AccuracyQuality::Medium
        } else if accuracy <= BAD_MAX_METERS {
            AccuracyQuality::Bad
        } else {
            AccuracyQuality::VeryBad
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AccuracyQuality::Excellent => "excellent",
            AccuracyQuality::Good => "good",
            AccuracyQuality::Medium => "medium",
            AccuracyQuality::Bad => "bad",
            AccuracyQuality::VeryBad => "very bad",
        }
    }
}

impl fmt::Display for AccuracyQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-function form of [`AccuracyQuality::from_accuracy`].
pub fn classify_accuracy(accuracy: f64) -> AccuracyQuality {
    AccuracyQuality::from_accuracy(accuracy)
}
