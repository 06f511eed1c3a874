use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::rules::{Condition, Field, RangeOp};
use super::types::{ImpactLevel, Recommendation, RecommendationKind, Timeframe};

/// Lookup tables and rules that drive an estimate.
///
/// A profile is plain data: it is loaded (or built from a preset) once and
/// never mutated afterwards. Every field has a default, so a YAML file only
/// needs to name what it changes.
///
/// Example YAML:
/// ```yaml
/// name: custom
/// countries:
///   Germany: 70000
///   Other: 36000
/// language_premiums:
///   Rust: 21.0
/// band: { lower: 0.9, upper: 1.1 }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Profile {
    pub name: String,

    /// Country name -> baseline salary
    pub countries: BTreeMap<String, f64>,

    /// Country key used when the input country is missing or unknown
    pub fallback_country: String,

    /// Language name -> premium in percent (may be negative)
    pub language_premiums: BTreeMap<String, f64>,

    /// Company size bucket label -> multiplier
    pub company_sizes: BTreeMap<String, f64>,

    /// Employment type label -> multiplier
    pub employment_types: BTreeMap<String, f64>,

    pub experience: ExperienceCurve,

    pub band: SalaryBand,

    pub confidence: ConfidenceConfig,

    pub recommendations: RecommendationConfig,

    /// Maximum number of factor contributions reported
    pub contribution_limit: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporal: Option<TemporalWeighting>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub feature_importance: Vec<FeatureImportance>,
}

impl Default for Profile {
    fn default() -> Self {
        Self::standard()
    }
}

/// Experience curve: `max(floor, 1 + growth*ln(1+x) - decay*(x/pivot)^2)`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ExperienceCurve {
    /// Reference salary for a new developer; listed but not part of the formula
    pub base: f64,
    pub growth_rate: f64,
    pub decay_rate: f64,
    /// Lowest multiplier the curve can produce
    pub floor: f64,
    pub pivot_years: f64,
    /// Experience beyond this is clamped
    pub max_years: u32,
}

impl Default for ExperienceCurve {
    fn default() -> Self {
        Self {
            base: 45_000.0,
            growth_rate: 0.08,
            decay_rate: 0.02,
            floor: 0.5,
            pivot_years: 20.0,
            max_years: 50,
        }
    }
}

/// Fixed factors applied to the estimate to produce the low/high range.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SalaryBand {
    pub lower: f64,
    pub upper: f64,
}

impl Default for SalaryBand {
    fn default() -> Self {
        Self {
            lower: 0.85,
            upper: 1.15,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfidenceConfig {
    pub base: i32,
    pub floor: i32,
    pub ceiling: i32,
    pub adjustments: Vec<ConfidenceAdjustment>,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            base: 85,
            floor: 60,
            ceiling: 95,
            adjustments: standard_adjustments(),
        }
    }
}

/// Adds `delta` to the confidence when `when` holds.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfidenceAdjustment {
    pub delta: i32,
    #[serde(default)]
    pub when: Condition,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RecommendationConfig {
    /// Maximum number of recommendations returned
    pub limit: usize,
    pub rules: Vec<RecommendationRule>,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            limit: 4,
            rules: standard_rules(),
        }
    }
}

/// Emits a recommendation when `when` holds.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RecommendationRule {
    pub kind: RecommendationKind,
    pub title: String,
    pub description: String,
    pub impact: ImpactLevel,
    pub timeframe: Timeframe,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insight: Option<String>,
    #[serde(default)]
    pub when: Condition,
}

impl RecommendationRule {
    pub fn recommendation(&self) -> Recommendation {
        Recommendation {
            kind: self.kind,
            title: self.title.clone(),
            description: self.description.clone(),
            impact: self.impact,
            timeframe: self.timeframe,
            insight: self.insight.clone(),
        }
    }

    pub fn with_insight(mut self, insight: &str) -> Self {
        self.insight = Some(insight.to_string());
        self
    }
}

/// Scales the baseline, experience growth, language premiums and confidence
/// by the weight of a reference survey year.
///
/// Each adjustment is `1 + (weight - 1) * share`; the confidence bonus is
/// `round((weight - 1) * confidence_share)`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TemporalWeighting {
    pub reference_year: u16,
    pub year_weights: BTreeMap<u16, f64>,
    pub baseline_share: f64,
    pub experience_share: f64,
    pub premium_share: f64,
    pub confidence_share: f64,
}

impl TemporalWeighting {
    /// Weight of the reference year, neutral if the year has no weight.
    pub fn weight(&self) -> f64 {
        self.year_weights
            .get(&self.reference_year)
            .copied()
            .unwrap_or(1.0)
    }

    pub fn adjustment(&self, share: f64) -> f64 {
        1.0 + (self.weight() - 1.0) * share
    }

    pub fn confidence_bonus(&self) -> i32 {
        ((self.weight() - 1.0) * self.confidence_share).round() as i32
    }
}

/// Share of the estimate attributed to an input, for display only.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FeatureImportance {
    pub label: String,
    pub share: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Built-in profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    #[default]
    Standard,
    Temporal,
}

impl Preset {
    pub fn profile(self) -> Profile {
        match self {
            Preset::Standard => Profile::standard(),
            Preset::Temporal => Profile::temporal(),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::Standard => f.write_str("standard"),
            Preset::Temporal => f.write_str("temporal"),
        }
    }
}

const US: &str = "United States of America";
const LARGEST_COMPANY: &str = "10,000 or more employees";

fn table(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect()
}

fn names(items: &[&str]) -> Option<Vec<String>> {
    Some(items.iter().map(|s| s.to_string()).collect())
}

fn missing(field: Field, delta: i32) -> ConfidenceAdjustment {
    ConfidenceAdjustment {
        delta,
        when: Condition {
            missing: Some(field),
            ..Default::default()
        },
    }
}

fn rule(
    when: Condition,
    kind: RecommendationKind,
    title: &str,
    description: &str,
    impact: ImpactLevel,
    timeframe: Timeframe,
) -> RecommendationRule {
    RecommendationRule {
        kind,
        title: title.to_string(),
        description: description.to_string(),
        impact,
        timeframe,
        insight: None,
        when,
    }
}

fn importance(label: &str, share: f64, note: Option<&str>) -> FeatureImportance {
    FeatureImportance {
        label: label.to_string(),
        share,
        note: note.map(str::to_string),
    }
}

/// Missing-field penalties and combination bonuses of the standard profile.
fn standard_adjustments() -> Vec<ConfidenceAdjustment> {
    vec![
        missing(Field::Country, -20),
        missing(Field::CompanySize, -15),
        missing(Field::EmploymentType, -10),
        missing(Field::Languages, -10),
        ConfidenceAdjustment {
            delta: 5,
            when: Condition {
                country_in: names(&[US]),
                any_language: names(&["Go"]),
                ..Default::default()
            },
        },
        ConfidenceAdjustment {
            delta: -5,
            when: Condition {
                experience: Some(RangeOp::GreaterThan(25)),
                ..Default::default()
            },
        },
    ]
}

fn standard_rules() -> Vec<RecommendationRule> {
    vec![
        rule(
            Condition {
                country_not_in: names(&[US, "Switzerland"]),
                ..Default::default()
            },
            RecommendationKind::Geographic,
            "Consider Geographic Opportunities",
            "Moving to higher-paying markets like the US or Switzerland could increase your salary by 40-80%.",
            ImpactLevel::High,
            Timeframe::LongTerm,
        ),
        rule(
            Condition {
                no_language: names(&["Go", "Rust", "Scala"]),
                ..Default::default()
            },
            RecommendationKind::Skill,
            "Learn High-Premium Languages",
            "Learning Go, Rust, or Scala could increase your salary by 18-23%. These languages are in high demand.",
            ImpactLevel::High,
            Timeframe::MediumTerm,
        ),
        rule(
            Condition {
                company_size_not_in: names(&[LARGEST_COMPANY]),
                ..Default::default()
            },
            RecommendationKind::Career,
            "Target Large Enterprises",
            "Large companies (10,000+ employees) typically pay 25% more than smaller organizations.",
            ImpactLevel::Medium,
            Timeframe::ShortTerm,
        ),
        rule(
            Condition {
                experience: Some(RangeOp::LessThan(10)),
                ..Default::default()
            },
            RecommendationKind::Career,
            "Focus on Experience Growth",
            "The first 10 years provide the highest salary growth. Focus on challenging projects and skill development.",
            ImpactLevel::Medium,
            Timeframe::Ongoing,
        ),
        rule(
            Condition {
                no_language: names(&["TypeScript", "Python", "Go"]),
                ..Default::default()
            },
            RecommendationKind::Skill,
            "Modernize Your Technology Stack",
            "Learning modern technologies like TypeScript, Python, or cloud platforms can boost your market value.",
            ImpactLevel::Medium,
            Timeframe::ShortTerm,
        ),
    ]
}

impl Profile {
    /// Median survey salaries (2022-2024) with flat language premiums.
    pub fn standard() -> Self {
        Self {
            name: "standard".to_string(),
            countries: table(&[
                (US, 120_000.0),
                ("Switzerland", 98_500.0),
                ("Australia", 78_000.0),
                ("Netherlands", 72_000.0),
                ("Canada", 71_500.0),
                ("Germany", 68_000.0),
                ("United Kingdom", 65_000.0),
                ("Sweden", 62_000.0),
                ("France", 58_000.0),
                ("Israel", 55_000.0),
                ("Norway", 54_000.0),
                ("Denmark", 52_000.0),
                ("Belgium", 48_000.0),
                ("Austria", 46_000.0),
                ("Italy", 42_000.0),
                ("Other", 35_000.0),
            ]),
            fallback_country: "Other".to_string(),
            language_premiums: table(&[
                ("Go", 23.4),
                ("Rust", 20.1),
                ("Scala", 18.7),
                ("Kotlin", 8.2),
                ("Python", 6.7),
                ("TypeScript", 4.9),
                ("C#", 3.8),
                ("Java", 1.7),
                ("SQL", 0.4),
                ("JavaScript", -1.6),
                ("PHP", -4.2),
                ("Ruby", 1.3),
                ("C++", 2.1),
                ("Swift", 5.2),
                ("Dart", 3.1),
            ]),
            company_sizes: table(&[
                ("2 to 9 employees", 0.893),
                ("10 to 19 employees", 0.938),
                ("20 to 99 employees", 1.000),
                ("100 to 499 employees", 1.046),
                ("500 to 999 employees", 1.092),
                ("1,000 to 4,999 employees", 1.154),
                ("5,000 to 9,999 employees", 1.200),
                (LARGEST_COMPANY, 1.246),
            ]),
            employment_types: table(&[
                ("Employed, full-time", 1.000),
                ("Employed, part-time", 0.692),
                ("Independent contractor, freelancer, or self-employed", 1.108),
                ("Student", 0.400),
                ("Unemployed", 0.000),
            ]),
            experience: ExperienceCurve::default(),
            band: SalaryBand::default(),
            confidence: ConfidenceConfig::default(),
            recommendations: RecommendationConfig::default(),
            contribution_limit: 6,
            temporal: None,
            feature_importance: vec![
                importance("Geographic Location", 63.1, None),
                importance("Years of Experience", 14.2, None),
                importance("Company Size", 8.9, None),
                importance("Programming Languages", 6.7, None),
                importance("Employment Type", 4.1, None),
            ],
        }
    }

    /// Survey data from 2017-2024 with recent years weighted up.
    pub fn temporal() -> Self {
        Self {
            name: "temporal".to_string(),
            countries: table(&[
                (US, 125_000.0),
                ("Switzerland", 102_000.0),
                ("Australia", 82_000.0),
                ("Netherlands", 75_000.0),
                ("Canada", 74_000.0),
                ("Germany", 70_000.0),
                ("United Kingdom", 67_000.0),
                ("Sweden", 64_000.0),
                ("France", 60_000.0),
                ("Israel", 57_000.0),
                ("Norway", 56_000.0),
                ("Denmark", 54_000.0),
                ("Belgium", 50_000.0),
                ("Austria", 48_000.0),
                ("Italy", 44_000.0),
                ("Other", 37_000.0),
            ]),
            fallback_country: "Other".to_string(),
            language_premiums: table(&[
                ("Go", 25.8),
                ("Rust", 22.4),
                ("Scala", 19.2),
                ("Kotlin", 9.1),
                ("Python", 7.8),
                ("TypeScript", 6.2),
                ("C#", 4.1),
                ("Java", 2.0),
                ("SQL", 0.7),
                ("JavaScript", -1.2),
                ("PHP", -3.8),
                ("Ruby", 1.8),
                ("C++", 2.7),
                ("Swift", 6.1),
                ("Dart", 4.2),
            ]),
            company_sizes: table(&[
                ("2 to 9 employees", 0.885),
                ("10 to 19 employees", 0.925),
                ("20 to 99 employees", 1.000),
                ("100 to 499 employees", 1.055),
                ("500 to 999 employees", 1.105),
                ("1,000 to 4,999 employees", 1.175),
                ("5,000 to 9,999 employees", 1.225),
                (LARGEST_COMPANY, 1.285),
            ]),
            employment_types: table(&[
                ("Employed, full-time", 1.000),
                ("Employed, part-time", 0.705),
                ("Independent contractor, freelancer, or self-employed", 1.125),
                ("Student", 0.420),
                ("Unemployed", 0.000),
            ]),
            experience: ExperienceCurve {
                base: 48_000.0,
                growth_rate: 0.085,
                decay_rate: 0.018,
                floor: 0.6,
                ..Default::default()
            },
            band: SalaryBand {
                lower: 0.88,
                upper: 1.12,
            },
            confidence: ConfidenceConfig {
                base: 88,
                floor: 65,
                ceiling: 97,
                adjustments: vec![
                    missing(Field::Country, -18),
                    missing(Field::CompanySize, -12),
                    missing(Field::EmploymentType, -8),
                    missing(Field::Languages, -8),
                    ConfidenceAdjustment {
                        delta: 7,
                        when: Condition {
                            country_in: names(&[US]),
                            any_language: names(&["Go"]),
                            ..Default::default()
                        },
                    },
                    ConfidenceAdjustment {
                        delta: 4,
                        when: Condition {
                            any_language: names(&["Python"]),
                            experience: Some(RangeOp::GreaterEqual(3)),
                            ..Default::default()
                        },
                    },
                    ConfidenceAdjustment {
                        delta: -3,
                        when: Condition {
                            experience: Some(RangeOp::GreaterThan(25)),
                            ..Default::default()
                        },
                    },
                ],
            },
            recommendations: RecommendationConfig {
                limit: 4,
                rules: vec![
                    rule(
                        Condition {
                            country_not_in: names(&[US, "Switzerland"]),
                            ..Default::default()
                        },
                        RecommendationKind::Geographic,
                        "Consider High-Growth Tech Markets",
                        "Recent data shows US and Swiss markets offer 50-90% salary premiums. Remote work opportunities have increased access to these markets.",
                        ImpactLevel::High,
                        Timeframe::MediumTerm,
                    )
                    .with_insight("Remote work trends in 2023-2024 have made geographic arbitrage more accessible."),
                    rule(
                        Condition {
                            no_language: names(&["Go", "Rust", "TypeScript"]),
                            ..Default::default()
                        },
                        RecommendationKind::Skill,
                        "Learn High-Growth Languages",
                        "Go and Rust show 25%+ premiums in 2024 data. TypeScript demand has grown 40% in recent surveys.",
                        ImpactLevel::High,
                        Timeframe::ShortTerm,
                    )
                    .with_insight("2023-2024 data shows accelerating demand for systems programming and type-safe languages."),
                    rule(
                        Condition {
                            no_language: names(&["Python"]),
                            experience: Some(RangeOp::GreaterEqual(2)),
                            ..Default::default()
                        },
                        RecommendationKind::Skill,
                        "Capitalize on AI/ML Boom",
                        "Python developers with AI/ML skills show 15-25% salary premiums in recent data. Demand has surged in 2023-2024.",
                        ImpactLevel::High,
                        Timeframe::ShortTerm,
                    )
                    .with_insight("AI adoption has accelerated dramatically, creating unprecedented demand for Python skills."),
                    rule(
                        Condition {
                            company_size_not_in: names(&[LARGEST_COMPANY]),
                            ..Default::default()
                        },
                        RecommendationKind::Career,
                        "Target Large Tech Companies",
                        "Large enterprises (10,000+ employees) now pay 28% more than smaller companies, up from 25% in previous years.",
                        ImpactLevel::Medium,
                        Timeframe::MediumTerm,
                    )
                    .with_insight("Big tech compensation has outpaced smaller companies even more in recent years."),
                    rule(
                        Condition::always(),
                        RecommendationKind::Career,
                        "Leverage Remote Work Opportunities",
                        "Remote-first companies often pay 10-20% premiums to access global talent. This trend has stabilized post-2022.",
                        ImpactLevel::Medium,
                        Timeframe::ShortTerm,
                    )
                    .with_insight("Remote work normalization has created new salary arbitrage opportunities."),
                ],
            },
            contribution_limit: 6,
            temporal: Some(TemporalWeighting {
                reference_year: 2024,
                year_weights: [
                    (2017, 0.558),
                    (2018, 0.648),
                    (2019, 0.753),
                    (2020, 0.875),
                    (2021, 1.017),
                    (2022, 1.181),
                    (2023, 1.373),
                    (2024, 1.595),
                ]
                .into_iter()
                .collect(),
                baseline_share: 0.1,
                experience_share: 0.02,
                premium_share: 0.05,
                confidence_share: 5.0,
            }),
            feature_importance: vec![
                importance("Experience Level", 30.5, Some("Most important factor")),
                importance("Age/Seniority", 30.3, Some("Closely correlated with experience")),
                importance("Geographic Location", 18.7, Some("Reduced due to remote work trends")),
                importance("Programming Languages", 14.0, Some("Combined language effects")),
                importance("Temporal Trends", 6.5, Some("Recent market conditions")),
            ],
        }
    }

    /// Resolve a country to its table key, falling back to `fallback_country`.
    pub fn resolve_country(&self, country: Option<&str>) -> (&str, f64) {
        if let Some((key, value)) = country.and_then(|c| self.country(c)) {
            return (key, value);
        }
        match self.countries.get_key_value(&self.fallback_country) {
            Some((key, value)) => (key.as_str(), *value),
            None => (self.fallback_country.as_str(), 0.0),
        }
    }

    pub fn country(&self, name: &str) -> Option<(&str, f64)> {
        lookup(&self.countries, name)
    }

    pub fn language_premium(&self, language: &str) -> Option<(&str, f64)> {
        lookup(&self.language_premiums, language)
    }

    pub fn company_size(&self, label: &str) -> Option<(&str, f64)> {
        lookup(&self.company_sizes, label)
    }

    pub fn employment_type(&self, label: &str) -> Option<(&str, f64)> {
        lookup(&self.employment_types, label)
    }
}

/// Exact match first, then ASCII case-insensitive.
fn lookup<'a>(table: &'a BTreeMap<String, f64>, key: &str) -> Option<(&'a str, f64)> {
    let key = key.trim();
    if let Some((k, v)) = table.get_key_value(key) {
        return Some((k.as_str(), *v));
    }
    table
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(k, v)| (k.as_str(), *v))
}
