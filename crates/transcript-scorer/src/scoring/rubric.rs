use serde::{Deserialize, Serialize};

/// Bounds and quality threshold for one scored dimension of the payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreValidationRule {
    pub key: &'static str,
    pub min: f64,
    pub max: f64,
    pub threshold: f64,
    pub message: &'static str,
}

/// Scored dimensions, in the order the workflow reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Total,
    ContentClarity,
    InstructionalStructure,
    Engagement,
    Language,
    AdditionalValue,
}

impl Dimension {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Total,
            Self::ContentClarity,
            Self::InstructionalStructure,
            Self::Engagement,
            Self::Language,
            Self::AdditionalValue,
        ]
    }

    /// The five dimensions whose scores add up to the total.
    pub const fn subscores() -> [Self; 5] {
        [
            Self::ContentClarity,
            Self::InstructionalStructure,
            Self::Engagement,
            Self::Language,
            Self::AdditionalValue,
        ]
    }

    /// Field name used by the scoring workflow payload.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Total => "totalScore",
            Self::ContentClarity => "Content Clarity and Relevance",
            Self::InstructionalStructure => "Instructional Structure",
            Self::Engagement => "Engagement and Interaction",
            Self::Language => "Language and Presentation",
            Self::AdditionalValue => "Additional Value and Accessibility",
        }
    }

    /// Short label used in text reports.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Total => "Total Score",
            Self::ContentClarity => "Content Clarity",
            Self::InstructionalStructure => "Instructional Structure",
            Self::Engagement => "Engagement",
            Self::Language => "Language",
            Self::AdditionalValue => "Additional Value",
        }
    }

    pub fn rule(self) -> &'static ScoreValidationRule {
        &SCORE_RULES[self as usize]
    }
}

/// Fixed rubric table, indexed by `Dimension` discriminant.
pub static SCORE_RULES: [ScoreValidationRule; 6] = [
    ScoreValidationRule {
        key: "totalScore",
        min: 0.0,
        max: 100.0,
        threshold: 50.0,
        message: "Total score should be between 0-100 and above 50 for acceptable quality",
    },
    ScoreValidationRule {
        key: "Content Clarity and Relevance",
        min: 0.0,
        max: 30.0,
        threshold: 15.0,
        message: "Content clarity score should be between 0-30 and above 15 for acceptable quality",
    },
    ScoreValidationRule {
        key: "Instructional Structure",
        min: 0.0,
        max: 20.0,
        threshold: 10.0,
        message:
            "Instructional structure score should be between 0-20 and above 10 for acceptable quality",
    },
    ScoreValidationRule {
        key: "Engagement and Interaction",
        min: 0.0,
        max: 20.0,
        threshold: 10.0,
        message: "Engagement score should be between 0-20 and above 10 for acceptable quality",
    },
    ScoreValidationRule {
        key: "Language and Presentation",
        min: 0.0,
        max: 20.0,
        threshold: 10.0,
        message: "Language score should be between 0-20 and above 10 for acceptable quality",
    },
    ScoreValidationRule {
        key: "Additional Value and Accessibility",
        min: 0.0,
        max: 10.0,
        threshold: 5.0,
        message:
            "Additional value score should be between 0-10 and above 5 for acceptable quality",
    },
];

/// Traffic-light classification used when presenting a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreStatus {
    Green,
    Yellow,
    Red,
}

impl ScoreStatus {
    /// 80% of the maximum or better is green, at or above the threshold is yellow.
    pub fn classify(score: f64, threshold: f64, max: f64) -> Self {
        let percentage = score / max * 100.0;
        if percentage >= 80.0 {
            Self::Green
        } else if score >= threshold {
            Self::Yellow
        } else {
            Self::Red
        }
    }

    pub fn for_dimension(dimension: Dimension, score: f64) -> Self {
        let rule = dimension.rule();
        Self::classify(score, rule.threshold, rule.max)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
        }
    }
}
