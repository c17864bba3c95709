use serde::{Deserialize, Serialize};

/// Importance tier declared for a concept when it is extracted from a book.
///
/// The tier only seeds the initial memory state; it is never mutated here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ImportanceTier {
    Foundation,
    BuildingBlock,
    Enhancement,
    #[default]
    Unset,
}

impl ImportanceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Foundation => "foundation",
            Self::BuildingBlock => "buildingBlock",
            Self::Enhancement => "enhancement",
            Self::Unset => "unset",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "foundation" => Self::Foundation,
            "buildingblock" => Self::BuildingBlock,
            "enhancement" => Self::Enhancement,
            _ => Self::Unset,
        }
    }

    /// Initial `(difficulty, stability)` seed for a freshly tracked concept.
    pub fn seed(&self) -> (f64, f64) {
        match self {
            Self::Foundation => (0.2, 1.5),
            Self::BuildingBlock => (0.3, 1.0),
            Self::Enhancement => (0.4, 0.8),
            Self::Unset => (0.3, 1.0),
        }
    }
}

/// Graded performance on one concept over a test attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Performance {
    Again,
    Hard,
    Good,
    Easy,
}

impl Performance {
    /// Maps a correctness ratio onto a performance grade.
    ///
    /// `total == 0` counts as a ratio of zero so the function stays total.
    pub fn classify(correct: u32, total: u32) -> Self {
        if total == 0 {
            return Self::Again;
        }
        let ratio = correct as f64 / total as f64;
        if ratio < 0.60 {
            Self::Again
        } else if ratio < 0.75 {
            Self::Hard
        } else if ratio < 0.95 {
            Self::Good
        } else {
            Self::Easy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Again => "again",
            Self::Hard => "hard",
            Self::Good => "good",
            Self::Easy => "easy",
        }
    }
}

/// Shape of the question a queue entry will be re-tested with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestionType {
    SingleSelect,
    MultiSelect,
    OpenEnded,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleSelect => "singleSelect",
            Self::MultiSelect => "multiSelect",
            Self::OpenEnded => "openEnded",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "singleSelect" => Some(Self::SingleSelect),
            "multiSelect" => Some(Self::MultiSelect),
            "openEnded" => Some(Self::OpenEnded),
            _ => None,
        }
    }

    /// Single- and multi-select entries share one selection pool.
    pub fn is_choice(&self) -> bool {
        !matches!(self, Self::OpenEnded)
    }
}

/// Why a review candidate was queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryOrigin {
    Mistake,
    Curveball,
    SpacedFollowUp,
}

impl EntryOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mistake => "mistake",
            Self::Curveball => "curveball",
            Self::SpacedFollowUp => "spacedFollowUp",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "mistake" => Some(Self::Mistake),
            "curveball" => Some(Self::Curveball),
            "spacedFollowUp" => Some(Self::SpacedFollowUp),
            _ => None,
        }
    }

    /// Lower rank is surfaced first when assembling a session.
    pub fn priority_rank(&self) -> u8 {
        match self {
            Self::Curveball => 0,
            Self::SpacedFollowUp => 1,
            Self::Mistake => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(Performance::classify(0, 10), Performance::Again);
        assert_eq!(Performance::classify(5, 10), Performance::Again);
        assert_eq!(Performance::classify(6, 10), Performance::Hard);
        assert_eq!(Performance::classify(7, 10), Performance::Hard);
        assert_eq!(Performance::classify(3, 4), Performance::Good);
        assert_eq!(Performance::classify(9, 10), Performance::Good);
        assert_eq!(Performance::classify(19, 20), Performance::Easy);
        assert_eq!(Performance::classify(10, 10), Performance::Easy);
    }

    #[test]
    fn test_classify_seven_of_eight_is_good() {
        // ratio 0.875
        assert_eq!(Performance::classify(7, 8), Performance::Good);
    }

    #[test]
    fn test_classify_empty_attempt() {
        assert_eq!(Performance::classify(0, 0), Performance::Again);
    }

    #[test]
    fn test_tier_seed_values() {
        assert_eq!(ImportanceTier::Foundation.seed(), (0.2, 1.5));
        assert_eq!(ImportanceTier::BuildingBlock.seed(), (0.3, 1.0));
        assert_eq!(ImportanceTier::Enhancement.seed(), (0.4, 0.8));
        assert_eq!(ImportanceTier::Unset.seed(), (0.3, 1.0));
    }

    #[test]
    fn test_tier_parse_round_trip() {
        for tier in [
            ImportanceTier::Foundation,
            ImportanceTier::BuildingBlock,
            ImportanceTier::Enhancement,
            ImportanceTier::Unset,
        ] {
            assert_eq!(ImportanceTier::parse(tier.as_str()), tier);
        }
        assert_eq!(ImportanceTier::parse("unknown"), ImportanceTier::Unset);
    }

    #[test]
    fn test_origin_priority_ordering() {
        assert!(EntryOrigin::Curveball.priority_rank() < EntryOrigin::SpacedFollowUp.priority_rank());
        assert!(EntryOrigin::SpacedFollowUp.priority_rank() < EntryOrigin::Mistake.priority_rank());
    }

    #[test]
    fn test_question_type_string_round_trip() {
        for qt in [
            QuestionType::SingleSelect,
            QuestionType::MultiSelect,
            QuestionType::OpenEnded,
        ] {
            assert_eq!(QuestionType::from_str(qt.as_str()), Some(qt));
        }
        assert_eq!(QuestionType::from_str("spelling"), None);
    }

    #[test]
    fn test_origin_string_round_trip() {
        for origin in [
            EntryOrigin::Mistake,
            EntryOrigin::Curveball,
            EntryOrigin::SpacedFollowUp,
        ] {
            assert_eq!(EntryOrigin::from_str(origin.as_str()), Some(origin));
        }
        assert_eq!(EntryOrigin::from_str(""), None);
    }
}
