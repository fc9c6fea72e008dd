//! Sanity checks applied to the payload returned by the scoring workflow.
//!
//! The checks never fail: every anomaly becomes an entry in the report, and the
//! caller decides what to do with it. Structural problems are errors; low
//! scores and thin explanations are warnings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::rubric::{Dimension, SCORE_RULES};

pub const INVALID_FORMAT: &str = "Invalid response format";
/// Counted in UTF-16 code units.
pub const MIN_EXPLANATION_CHARS: usize = 50;
/// Absolute slack allowed between the declared total and the subscore sum.
pub const SUM_TOLERANCE: f64 = 0.1;

const EXPLANATION_FIELD: &str = "explanation";

/// Outcome of validating one scoring payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn from_findings(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Warnings followed by errors, the single list surfaced alongside a score.
    pub fn into_notices(self) -> Vec<String> {
        let mut notices = self.warnings;
        notices.extend(self.errors);
        notices
    }
}

/// Validates an untyped scoring payload against the rubric.
pub fn validate_payload(payload: &Value) -> ValidationReport {
    let Some(fields) = payload.as_object() else {
        debug!("scoring payload is not a JSON object");
        return ValidationReport::from_findings(vec![INVALID_FORMAT.to_string()], Vec::new());
    };

    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    check_required_fields(fields, &mut errors);
    check_explanation(fields, &mut warnings);
    check_ranges(fields, &mut errors, &mut warnings);
    check_subscore_sum(fields, &mut errors);

    debug!(
        errors = errors.len(),
        warnings = warnings.len(),
        "scoring payload validated"
    );

    ValidationReport::from_findings(errors, warnings)
}

fn required_fields() -> impl Iterator<Item = &'static str> {
    std::iter::once(EXPLANATION_FIELD).chain(Dimension::ordered().into_iter().map(Dimension::key))
}

// Presence only: a key holding `null` still counts as present.
fn check_required_fields(fields: &Map<String, Value>, errors: &mut Vec<String>) {
    for field in required_fields() {
        if !fields.contains_key(field) {
            errors.push(format!("Missing required field: {field}"));
        }
    }
}

fn check_explanation(fields: &Map<String, Value>, warnings: &mut Vec<String>) {
    let long_enough = fields
        .get(EXPLANATION_FIELD)
        .and_then(Value::as_str)
        .is_some_and(|text| text.encode_utf16().count() >= MIN_EXPLANATION_CHARS);

    if !long_enough {
        warnings.push("Explanation is too short or missing".to_string());
    }
}

// A missing score is reported here as well as in the required-field check.
fn check_ranges(fields: &Map<String, Value>, errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    for rule in &SCORE_RULES {
        let score = fields.get(rule.key).and_then(Value::as_f64);

        match score {
            Some(value) if value >= rule.min && value <= rule.max => {}
            _ => errors.push(format!(
                "{}: Score must be between {} and {}",
                rule.key, rule.min, rule.max
            )),
        }

        if let Some(value) = score {
            if value < rule.threshold {
                warnings.push(format!(
                    "{}: Score ({}) is below minimum threshold of {}",
                    rule.key, value, rule.threshold
                ));
            }
        }
    }
}

fn check_subscore_sum(fields: &Map<String, Value>, errors: &mut Vec<String>) {
    let sum: f64 = Dimension::subscores()
        .iter()
        .filter_map(|dimension| fields.get(dimension.key()).and_then(Value::as_f64))
        .sum();

    let Some((total, shown)) = fields.get(Dimension::Total.key()).and_then(coerce_total) else {
        return;
    };

    if (sum - total).abs() > SUM_TOLERANCE {
        errors.push(format!(
            "Total score ({shown}) does not match sum of subscores ({sum})"
        ));
    }
}

/// Numeric reading of a non-number total, plus the text shown in the mismatch
/// error. `null` and booleans read as 0/1, numeric strings are parsed, and
/// anything else has no numeric reading, so the sum check is skipped.
fn coerce_total(value: &Value) -> Option<(f64, String)> {
    match value {
        Value::Number(number) => number.as_f64().map(|total| (total, total.to_string())),
        Value::Null => Some((0.0, "null".to_string())),
        Value::Bool(flag) => Some((f64::from(u8::from(*flag)), flag.to_string())),
        Value::String(raw) => {
            let trimmed = raw.trim();
            let total = if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().ok().filter(|total| total.is_finite())?
            };
            Some((total, raw.clone()))
        }
        Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn explanation() -> String {
        "x".repeat(60)
    }

    fn strong_payload() -> Value {
        json!({
            "explanation": explanation(),
            "totalScore": 85,
            "Content Clarity and Relevance": 25,
            "Instructional Structure": 18,
            "Engagement and Interaction": 18,
            "Language and Presentation": 18,
            "Additional Value and Accessibility": 6,
        })
    }

    fn set(payload: &mut Value, key: &str, value: Value) {
        payload
            .as_object_mut()
            .expect("payload is an object")
            .insert(key.to_string(), value);
    }

    #[test]
    fn non_object_inputs_report_invalid_format_only() {
        for input in [
            Value::Null,
            json!(42),
            json!("score"),
            json!(true),
            json!([1, 2, 3]),
        ] {
            let report = validate_payload(&input);
            assert_eq!(
                report,
                ValidationReport {
                    is_valid: false,
                    errors: vec![INVALID_FORMAT.to_string()],
                    warnings: Vec::new(),
                },
                "input {input}"
            );
        }
    }

    #[test]
    fn strong_payload_passes_cleanly() {
        let report = validate_payload(&strong_payload());
        assert!(report.is_valid);
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn low_additional_value_only_warns() {
        let mut payload = strong_payload();
        set(&mut payload, "Additional Value and Accessibility", json!(2));
        set(&mut payload, "totalScore", json!(81));

        let report = validate_payload(&payload);

        assert!(report.is_valid);
        assert_eq!(
            report.warnings,
            vec![
                "Additional Value and Accessibility: Score (2) is below minimum threshold of 5"
                    .to_string()
            ]
        );
    }

    #[test]
    fn out_of_range_total_reports_bound_and_mismatch() {
        let mut payload = strong_payload();
        set(&mut payload, "totalScore", json!(999));

        let report = validate_payload(&payload);

        assert!(!report.is_valid);
        assert_eq!(
            report.errors,
            vec![
                "totalScore: Score must be between 0 and 100".to_string(),
                "Total score (999) does not match sum of subscores (85)".to_string(),
            ]
        );
    }

    #[test]
    fn each_missing_field_is_named_in_errors() {
        for field in required_fields() {
            let mut payload = strong_payload();
            payload
                .as_object_mut()
                .expect("payload is an object")
                .remove(field);

            let report = validate_payload(&payload);

            assert!(
                report.errors.iter().any(|error| error.contains(field)),
                "missing {field} should be reported: {:?}",
                report.errors
            );
        }
    }

    #[test]
    fn missing_score_is_reported_twice() {
        let mut payload = strong_payload();
        payload
            .as_object_mut()
            .expect("payload is an object")
            .remove("Instructional Structure");
        set(&mut payload, "totalScore", json!(67));

        let report = validate_payload(&payload);

        assert_eq!(
            report.errors,
            vec![
                "Missing required field: Instructional Structure".to_string(),
                "Instructional Structure: Score must be between 0 and 20".to_string(),
            ]
        );
    }

    #[test]
    fn null_score_counts_as_present_but_not_numeric() {
        let mut payload = strong_payload();
        set(&mut payload, "Language and Presentation", Value::Null);
        set(&mut payload, "totalScore", json!(67));

        let report = validate_payload(&payload);

        assert_eq!(
            report.errors,
            vec!["Language and Presentation: Score must be between 0 and 20".to_string()]
        );
    }

    #[test]
    fn string_score_fails_range_without_threshold_warning() {
        let mut payload = strong_payload();
        set(&mut payload, "Engagement and Interaction", json!("3"));
        set(&mut payload, "totalScore", json!(67));

        let report = validate_payload(&payload);

        assert_eq!(
            report.errors,
            vec!["Engagement and Interaction: Score must be between 0 and 20".to_string()]
        );
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn bounds_are_inclusive() {
        let mut at_max = strong_payload();
        set(&mut at_max, "Content Clarity and Relevance", json!(30));
        set(&mut at_max, "Instructional Structure", json!(20));
        set(&mut at_max, "Engagement and Interaction", json!(20));
        set(&mut at_max, "Language and Presentation", json!(20));
        set(&mut at_max, "Additional Value and Accessibility", json!(10));
        set(&mut at_max, "totalScore", json!(100));
        let report = validate_payload(&at_max);
        assert!(report.is_valid, "{:?}", report.errors);

        let mut at_min = strong_payload();
        for dimension in Dimension::ordered() {
            set(&mut at_min, dimension.key(), json!(0));
        }
        let report = validate_payload(&at_min);
        assert!(report.is_valid, "{:?}", report.errors);
        assert_eq!(report.warnings.len(), 6);
    }

    #[test]
    fn one_below_threshold_yields_exactly_one_warning() {
        for dimension in Dimension::subscores() {
            let rule = dimension.rule();
            let mut payload = strong_payload();
            let current = payload[dimension.key()].as_f64().expect("numeric score");
            let lowered = rule.threshold - 1.0;
            set(&mut payload, dimension.key(), json!(lowered));
            set(&mut payload, "totalScore", json!(85.0 - current + lowered));

            let report = validate_payload(&payload);

            assert!(report.is_valid, "{:?}", report.errors);
            let mentions: Vec<_> = report
                .warnings
                .iter()
                .filter(|warning| warning.starts_with(dimension.key()))
                .collect();
            assert_eq!(mentions.len(), 1, "{dimension:?}: {:?}", report.warnings);
        }
    }

    #[test]
    fn sum_tolerance_is_absolute() {
        let mut payload = strong_payload();
        set(&mut payload, "totalScore", json!(85.05));
        assert!(validate_payload(&payload).is_valid);

        set(&mut payload, "totalScore", json!(85.2));
        let report = validate_payload(&payload);
        assert!(!report.is_valid);
        assert_eq!(
            report.errors,
            vec!["Total score (85.2) does not match sum of subscores (85)".to_string()]
        );
    }

    #[test]
    fn non_numeric_subscores_contribute_zero_to_sum() {
        let mut payload = strong_payload();
        set(&mut payload, "Additional Value and Accessibility", json!("six"));

        let report = validate_payload(&payload);

        assert!(report
            .errors
            .contains(&"Total score (85) does not match sum of subscores (79)".to_string()));
    }

    #[test]
    fn missing_total_skips_sum_check() {
        let mut payload = strong_payload();
        payload
            .as_object_mut()
            .expect("payload is an object")
            .remove("totalScore");

        let report = validate_payload(&payload);

        assert_eq!(
            report.errors,
            vec![
                "Missing required field: totalScore".to_string(),
                "totalScore: Score must be between 0 and 100".to_string(),
            ]
        );
    }

    #[test]
    fn null_total_reads_as_zero_in_sum_check() {
        let mut payload = strong_payload();
        set(&mut payload, "totalScore", Value::Null);

        let report = validate_payload(&payload);

        assert_eq!(
            report.errors,
            vec![
                "totalScore: Score must be between 0 and 100".to_string(),
                "Total score (null) does not match sum of subscores (85)".to_string(),
            ]
        );
    }

    #[test]
    fn string_total_is_parsed_for_sum_check() {
        let mut payload = strong_payload();
        set(&mut payload, "totalScore", json!("999"));
        let report = validate_payload(&payload);
        assert_eq!(
            report.errors,
            vec![
                "totalScore: Score must be between 0 and 100".to_string(),
                "Total score (999) does not match sum of subscores (85)".to_string(),
            ]
        );

        set(&mut payload, "totalScore", json!(" 85 "));
        let report = validate_payload(&payload);
        assert_eq!(
            report.errors,
            vec!["totalScore: Score must be between 0 and 100".to_string()]
        );

        set(&mut payload, "totalScore", json!("eighty-five"));
        let report = validate_payload(&payload);
        assert_eq!(
            report.errors,
            vec!["totalScore: Score must be between 0 and 100".to_string()]
        );
    }

    #[test]
    fn boolean_total_reads_as_one_or_zero() {
        let mut payload = strong_payload();
        set(&mut payload, "totalScore", json!(true));

        let report = validate_payload(&payload);

        assert!(report
            .errors
            .contains(&"Total score (true) does not match sum of subscores (85)".to_string()));
    }

    #[test]
    fn explanation_length_counts_utf16_units() {
        let mut payload = strong_payload();
        // 25 emoji are 25 chars but 50 UTF-16 units.
        set(&mut payload, "explanation", json!("\u{1F600}".repeat(25)));
        assert!(validate_payload(&payload).warnings.is_empty());

        set(&mut payload, "explanation", json!("\u{1F600}".repeat(24)));
        assert_eq!(
            validate_payload(&payload).warnings,
            vec!["Explanation is too short or missing"]
        );
    }

    #[test]
    fn short_explanation_is_a_warning() {
        let mut payload = strong_payload();
        set(&mut payload, "explanation", json!("Too brief."));
        let report = validate_payload(&payload);
        assert!(report.is_valid);
        assert_eq!(report.warnings, vec!["Explanation is too short or missing"]);

        set(&mut payload, "explanation", json!(12));
        let report = validate_payload(&payload);
        assert_eq!(report.warnings, vec!["Explanation is too short or missing"]);
    }

    #[test]
    fn notices_list_warnings_before_errors() {
        let mut payload = strong_payload();
        set(&mut payload, "explanation", json!("short"));
        set(&mut payload, "totalScore", json!(70));

        let notices = validate_payload(&payload).into_notices();

        assert_eq!(
            notices,
            vec![
                "Explanation is too short or missing".to_string(),
                "Total score (70) does not match sum of subscores (85)".to_string(),
            ]
        );
    }

    #[test]
    fn report_serializes_with_camel_case_keys() {
        let report = validate_payload(&Value::Null);
        let encoded = serde_json::to_value(&report).expect("report serializes");
        assert_eq!(
            encoded,
            json!({
                "isValid": false,
                "errors": ["Invalid response format"],
                "warnings": [],
            })
        );
    }
}
