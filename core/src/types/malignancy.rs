use std::fmt;

/// Predicted malignancy rating for a nodule
///
/// Annotators rate suspected cancer likelihood on a 1-5 scale. Scores
/// outside that domain map to [`Malignancy::Unknown`] rather than failing,
/// since the rating is display-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "kebab-case"))]
pub enum Malignancy {
    Unknown,
    HighlyUnlikely,
    ModeratelyUnlikely,
    Indeterminate,
    ModeratelySuspicious,
    HighlySuspicious,
}

impl Malignancy {
    /// Maps a raw annotation score to a rating
    ///
    /// Scores 1-5 map to their rating; anything else falls back to
    /// [`Malignancy::Unknown`].
    pub fn from_score(score: i64) -> Self {
        match score {
            1 => Malignancy::HighlyUnlikely,
            2 => Malignancy::ModeratelyUnlikely,
            3 => Malignancy::Indeterminate,
            4 => Malignancy::ModeratelySuspicious,
            5 => Malignancy::HighlySuspicious,
            _ => Malignancy::Unknown,
        }
    }

    /// Returns whether this rating is unknown
    pub fn is_unknown(&self) -> bool {
        matches!(self, Malignancy::Unknown)
    }

    /// Returns the numeric score, or `None` for unknown ratings
    pub fn score(&self) -> Option<i64> {
        match self {
            Malignancy::Unknown => None,
            Malignancy::HighlyUnlikely => Some(1),
            Malignancy::ModeratelyUnlikely => Some(2),
            Malignancy::Indeterminate => Some(3),
            Malignancy::ModeratelySuspicious => Some(4),
            Malignancy::HighlySuspicious => Some(5),
        }
    }

    /// Returns the human-readable label for display
    pub fn label(&self) -> &'static str {
        match self {
            Malignancy::Unknown => "Unknown",
            Malignancy::HighlyUnlikely => "Highly Unlikely",
            Malignancy::ModeratelyUnlikely => "Moderately Unlikely",
            Malignancy::Indeterminate => "Indeterminate",
            Malignancy::ModeratelySuspicious => "Moderately Suspicious",
            Malignancy::HighlySuspicious => "Highly Suspicious",
        }
    }

    /// Returns whether this rating marks the nodule as suspicious (score >= 4)
    pub fn is_suspicious(&self) -> bool {
        matches!(
            self,
            Malignancy::ModeratelySuspicious | Malignancy::HighlySuspicious
        )
    }
}

impl fmt::Display for Malignancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
