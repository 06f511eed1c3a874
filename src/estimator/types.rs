use serde::{Deserialize, Serialize};
use std::fmt;

/// One salary estimate request.
///
/// Categorical fields are optional; a `None` or blank value counts as missing
/// and falls back to a neutral default when scored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EstimateInput {
    #[serde(default)]
    pub country: Option<String>,

    /// Years of professional experience
    #[serde(default)]
    pub experience: u32,

    /// Informational only, never affects the estimate
    #[serde(default)]
    pub age: u32,

    #[serde(default)]
    pub company_size: Option<String>,

    #[serde(default)]
    pub employment_type: Option<String>,

    #[serde(default)]
    pub languages: Vec<String>,
}

impl EstimateInput {
    pub fn country(&self) -> Option<&str> {
        present(&self.country)
    }

    pub fn company_size(&self) -> Option<&str> {
        present(&self.company_size)
    }

    pub fn employment_type(&self) -> Option<&str> {
        present(&self.employment_type)
    }

    /// Languages with blanks dropped and case-insensitive duplicates removed,
    /// in first-seen order.
    pub fn distinct_languages(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for lang in &self.languages {
            let lang = lang.trim();
            if lang.is_empty() || seen.iter().any(|s| s.eq_ignore_ascii_case(lang)) {
                continue;
            }
            seen.push(lang);
        }
        seen
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Signed percentage impact of one applied multiplier.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FactorContribution {
    pub name: String, // e.g. "Experience", "Language: Go"
    pub impact_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum ImpactLevel {
    High,
    Medium,
    Low,
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ImpactLevel::High => "High",
            ImpactLevel::Medium => "Medium",
            ImpactLevel::Low => "Low",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Timeframe {
    #[serde(rename = "Short-term")]
    ShortTerm,
    #[serde(rename = "Medium-term")]
    MediumTerm,
    #[serde(rename = "Long-term")]
    LongTerm,
    Ongoing,
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Timeframe::ShortTerm => "Short-term",
            Timeframe::MediumTerm => "Medium-term",
            Timeframe::LongTerm => "Long-term",
            Timeframe::Ongoing => "Ongoing",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Geographic,
    Skill,
    Career,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub title: String,
    pub description: String,
    pub impact: ImpactLevel,
    pub timeframe: Timeframe,
    /// Market-trend note shown under the description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insight: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateOutput {
    /// Name of the profile that produced this estimate
    pub profile: String,
    /// Table key the country resolved to (the fallback for unknown countries)
    pub country: String,
    /// Country baseline before any multiplier
    pub baseline: i64,
    pub salary: i64,
    pub salary_min: i64,
    pub salary_max: i64,
    pub confidence: u8,
    pub contributions: Vec<FactorContribution>,
    pub recommendations: Vec<Recommendation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_fields_count_as_missing() {
        let input = EstimateInput {
            country: Some("  ".to_string()),
            company_size: Some(String::new()),
            employment_type: None,
            ..Default::default()
        };
        assert!(input.country().is_none());
        assert!(input.company_size().is_none());
        assert!(input.employment_type().is_none());
    }

    #[test]
    fn test_distinct_languages_dedupes_case_insensitively() {
        let input = EstimateInput {
            languages: vec![
                "Go".to_string(),
                "go".to_string(),
                " ".to_string(),
                "Rust".to_string(),
            ],
            ..Default::default()
        };
        assert_eq!(input.distinct_languages(), vec!["Go", "Rust"]);
    }

    #[test]
    fn test_input_parses_from_json() {
        let json = r#"{
            "country": "Germany",
            "experience": 5,
            "age": 30,
            "languages": ["Go"]
        }"#;
        let input: EstimateInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.country(), Some("Germany"));
        assert_eq!(input.experience, 5);
        assert!(input.company_size.is_none());
        assert_eq!(input.languages, vec!["Go".to_string()]);
    }

    #[test]
    fn test_input_rejects_unknown_fields() {
        let json = r#"{ "salary": 100 }"#;
        assert!(serde_json::from_str::<EstimateInput>(json).is_err());
    }

    #[test]
    fn test_timeframe_serializes_with_hyphen() {
        let json = serde_json::to_string(&Timeframe::MediumTerm).unwrap();
        assert_eq!(json, "\"Medium-term\"");
        assert_eq!(Timeframe::LongTerm.to_string(), "Long-term");
    }
}
