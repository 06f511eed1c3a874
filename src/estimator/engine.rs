use std::sync::LazyLock;

use tracing::debug;

use super::profile::{ExperienceCurve, Profile};
use super::rules::Facts;
use super::types::{EstimateInput, EstimateOutput, FactorContribution};

static DEFAULT_PROFILE: LazyLock<Profile> = LazyLock::new(Profile::standard);

/// Estimate a salary with the standard profile.
pub fn estimate(input: &EstimateInput) -> EstimateOutput {
    estimate_with(input, &DEFAULT_PROFILE)
}

/// Estimate a salary with the given profile.
///
/// Never fails: unknown or missing categorical values fall back to neutral
/// defaults (the fallback country baseline, a 1.0 multiplier, no premium).
pub fn estimate_with(input: &EstimateInput, profile: &Profile) -> EstimateOutput {
    let temporal = profile.temporal.as_ref();
    let mut factors = Vec::new();

    let (country, baseline) = profile.resolve_country(input.country());
    let mut salary = baseline;
    debug!(country, baseline, "resolved country baseline");

    if let Some(t) = temporal {
        let multiplier = t.adjustment(t.baseline_share);
        salary *= multiplier;
        factors.push(contribution("Market trend", multiplier));
        debug!(year = t.reference_year, multiplier, "applied market trend");
    }

    let experience = input.experience.min(profile.experience.max_years);
    let growth_boost = temporal.map_or(1.0, |t| t.adjustment(t.experience_share));
    let experience_mult = experience_multiplier(&profile.experience, experience, growth_boost);
    salary *= experience_mult;
    factors.push(contribution("Experience", experience_mult));
    debug!(years = experience, multiplier = experience_mult, "applied experience");

    // Unrecognized buckets are kept raw so rules can still see them
    let mut company_size = input.company_size();
    if let Some(label) = company_size {
        if let Some((key, multiplier)) = profile.company_size(label) {
            company_size = Some(key);
            salary *= multiplier;
            factors.push(contribution("Company size", multiplier));
            debug!(company_size = key, multiplier, "applied company size");
        }
    }

    let mut employment_type = input.employment_type();
    if let Some(label) = employment_type {
        if let Some((key, multiplier)) = profile.employment_type(label) {
            employment_type = Some(key);
            salary *= multiplier;
            factors.push(contribution("Employment type", multiplier));
            debug!(employment_type = key, multiplier, "applied employment type");
        }
    }

    let premium_boost = temporal.map_or(1.0, |t| t.adjustment(t.premium_share));
    let mut languages = Vec::new();
    let mut language_mult = 1.0;
    for lang in input.distinct_languages() {
        match profile.language_premium(lang) {
            Some((key, premium)) => {
                let weighted = premium * premium_boost;
                language_mult += weighted / 100.0;
                factors.push(FactorContribution {
                    name: format!("Language: {}", key),
                    impact_percent: weighted,
                });
                languages.push(key);
            }
            None => {
                debug!(language = lang, "no premium for language");
                languages.push(lang);
            }
        }
    }
    salary *= language_mult;
    debug!(multiplier = language_mult, "applied language premiums");

    let facts = Facts {
        country: input
            .country()
            .map(|c| profile.country(c).map_or(c, |(key, _)| key)),
        company_size,
        employment_type,
        languages,
        experience,
    };

    let mut confidence = profile.confidence.base;
    for adjustment in &profile.confidence.adjustments {
        if adjustment.when.holds(&facts) {
            confidence = confidence.saturating_add(adjustment.delta);
        }
    }
    if let Some(t) = temporal {
        confidence = confidence.saturating_add(t.confidence_bonus());
    }
    let confidence = confidence
        .max(profile.confidence.floor)
        .min(profile.confidence.ceiling)
        .clamp(0, 100) as u8;

    // Stable sort keeps declaration order for equal impacts
    factors.sort_by(|a, b| b.impact_percent.abs().total_cmp(&a.impact_percent.abs()));
    factors.truncate(profile.contribution_limit);

    let recommendations = profile
        .recommendations
        .rules
        .iter()
        .filter(|rule| rule.when.holds(&facts))
        .take(profile.recommendations.limit)
        .map(|rule| rule.recommendation())
        .collect();

    EstimateOutput {
        profile: profile.name.clone(),
        country: country.to_string(),
        baseline: round_currency(baseline),
        salary: round_currency(salary),
        salary_min: round_currency(salary * profile.band.lower),
        salary_max: round_currency(salary * profile.band.upper),
        confidence,
        contributions: factors,
        recommendations,
    }
}

/// Logarithmic growth with quadratic decay, never below `curve.floor`.
///
/// `growth_boost` scales the growth term; it is 1.0 unless temporal
/// weighting is active.
pub fn experience_multiplier(curve: &ExperienceCurve, years: u32, growth_boost: f64) -> f64 {
    let x = f64::from(years);
    let multiplier = 1.0 + curve.growth_rate * (1.0 + x).ln() * growth_boost
        - curve.decay_rate * (x / curve.pivot_years).powi(2);
    multiplier.max(curve.floor)
}

fn contribution(name: &str, multiplier: f64) -> FactorContribution {
    FactorContribution {
        name: name.to_string(),
        impact_percent: (multiplier - 1.0) * 100.0,
    }
}

fn round_currency(value: f64) -> i64 {
    value.round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::profile::{ConfidenceAdjustment, Preset};
    use crate::estimator::rules::Condition;
    use crate::estimator::types::RecommendationKind;

    fn sample_input() -> EstimateInput {
        EstimateInput {
            country: Some("Germany".to_string()),
            experience: 5,
            age: 30,
            company_size: Some("20 to 99 employees".to_string()),
            employment_type: Some("Employed, full-time".to_string()),
            languages: vec!["Go".to_string()],
        }
    }

    fn minimal_input(country: &str) -> EstimateInput {
        EstimateInput {
            country: Some(country.to_string()),
            experience: 0,
            age: 30,
            ..Default::default()
        }
    }

    fn standard_curve(years: u32) -> f64 {
        experience_multiplier(&ExperienceCurve::default(), years, 1.0)
    }

    #[test]
    fn test_germany_go_example() {
        let result = estimate(&sample_input());
        let m = 1.0 + 0.08 * (6.0f64).ln() - 0.02 * (5.0f64 / 20.0).powi(2);
        let expected = 68_000.0 * m * 1.0 * 1.0 * (1.0 + 23.4 / 100.0);

        assert_eq!(result.salary, expected.round() as i64);
        assert_eq!(result.salary_min, (expected * 0.85).round() as i64);
        assert_eq!(result.salary_max, (expected * 1.15).round() as i64);
        assert_eq!(result.country, "Germany");
        assert_eq!(result.baseline, 68_000);
        assert_eq!(result.confidence, 85);
        assert_eq!(result.profile, "standard");
    }

    #[test]
    fn test_every_country_reproduces_baseline_times_curve() {
        let profile = Profile::standard();
        for (country, baseline) in &profile.countries {
            for years in [0, 5, 20] {
                let mut input = minimal_input(country);
                input.experience = years;
                let result = estimate(&input);
                let expected = baseline * standard_curve(years);
                assert_eq!(result.salary, expected.round() as i64, "{country} at {years}y");
            }
        }
    }

    #[test]
    fn test_zero_experience_is_baseline() {
        let result = estimate(&minimal_input("Switzerland"));
        assert_eq!(result.salary, 98_500);
    }

    #[test]
    fn test_unknown_country_uses_fallback() {
        let result = estimate(&minimal_input("Atlantis"));
        assert_eq!(result.country, "Other");
        assert_eq!(result.salary, 35_000);
    }

    #[test]
    fn test_country_lookup_is_case_insensitive() {
        let result = estimate(&minimal_input("germany"));
        assert_eq!(result.country, "Germany");
        assert_eq!(result.salary, 68_000);
    }

    #[test]
    fn test_unknown_language_contributes_nothing() {
        let mut with_unknown = sample_input();
        with_unknown.languages = vec!["Go".to_string(), "COBOL".to_string()];
        let baseline = estimate(&sample_input());
        let result = estimate(&with_unknown);
        assert_eq!(result.salary, baseline.salary);
        assert!(!result.contributions.iter().any(|c| c.name.contains("COBOL")));
    }

    #[test]
    fn test_empty_languages_leave_salary_unscaled() {
        let mut input = sample_input();
        input.languages.clear();
        let result = estimate(&input);
        let expected = 68_000.0 * standard_curve(5);
        assert_eq!(result.salary, expected.round() as i64);
    }

    #[test]
    fn test_duplicate_languages_count_once() {
        let mut input = sample_input();
        input.languages = vec!["Go".to_string(), "go".to_string()];
        assert_eq!(estimate(&input).salary, estimate(&sample_input()).salary);
    }

    #[test]
    fn test_language_premiums_add_up() {
        let mut input = minimal_input("Germany");
        input.languages = vec!["Rust".to_string(), "PHP".to_string()];
        let result = estimate(&input);
        let expected: f64 = 68_000.0 * (1.0 + 20.1 / 100.0 + -4.2 / 100.0);
        assert_eq!(result.salary, expected.round() as i64);
    }

    #[test]
    fn test_unknown_company_size_and_employment_are_neutral() {
        let mut input = minimal_input("Germany");
        input.company_size = Some("a lot of people".to_string());
        input.employment_type = Some("Astronaut".to_string());
        let result = estimate(&input);
        assert_eq!(result.salary, 68_000);
        assert!(!result.contributions.iter().any(|c| c.name == "Company size"));
        assert!(!result.contributions.iter().any(|c| c.name == "Employment type"));
    }

    #[test]
    fn test_unemployed_zeroes_salary() {
        let mut input = sample_input();
        input.employment_type = Some("Unemployed".to_string());
        let result = estimate(&input);
        assert_eq!(result.salary, 0);
        assert_eq!(result.salary_min, 0);
        assert_eq!(result.salary_max, 0);
        let employment = result
            .contributions
            .iter()
            .find(|c| c.name == "Employment type")
            .unwrap();
        assert_eq!(employment.impact_percent, -100.0);
    }

    #[test]
    fn test_experience_clamped_to_max_years() {
        let mut at_cap = minimal_input("Germany");
        at_cap.experience = 50;
        let mut beyond = minimal_input("Germany");
        beyond.experience = 70;
        assert_eq!(estimate(&at_cap), estimate(&beyond));
    }

    #[test]
    fn test_experience_multiplier_floor() {
        let curve = ExperienceCurve {
            decay_rate: 5.0,
            ..Default::default()
        };
        assert_eq!(experience_multiplier(&curve, 40, 1.0), 0.5);
    }

    #[test]
    fn test_experience_curve_grows_then_flattens() {
        let early = standard_curve(5) - standard_curve(0);
        let late = standard_curve(30) - standard_curve(25);
        assert!(early > 0.0);
        assert!(late < early);
    }

    #[test]
    fn test_contributions_sorted_by_absolute_impact() {
        let mut input = sample_input();
        input.company_size = Some("10,000 or more employees".to_string());
        input.employment_type = Some("Employed, part-time".to_string());
        input.languages = vec!["JavaScript".to_string(), "Go".to_string()];
        let result = estimate(&input);

        let names: Vec<&str> = result.contributions.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Employment type",
                "Company size",
                "Language: Go",
                "Experience",
                "Language: JavaScript",
            ]
        );
        for pair in result.contributions.windows(2) {
            assert!(pair[0].impact_percent.abs() >= pair[1].impact_percent.abs());
        }
    }

    #[test]
    fn test_contributions_truncated_to_limit() {
        let mut input = sample_input();
        input.languages = ["Go", "Rust", "Scala", "Kotlin", "Python", "Swift"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let result = estimate(&input);
        assert_eq!(result.contributions.len(), 6);
        assert_eq!(result.contributions[0].name, "Language: Go");
    }

    #[test]
    fn test_confidence_missing_fields() {
        let input = EstimateInput::default();
        // 85 - 20 - 15 - 10 - 10 = 30, floored at 60
        assert_eq!(estimate(&input).confidence, 60);

        let mut partial = sample_input();
        partial.company_size = None;
        assert_eq!(estimate(&partial).confidence, 70);
    }

    #[test]
    fn test_confidence_well_documented_combination() {
        let mut input = sample_input();
        input.country = Some("United States of America".to_string());
        assert_eq!(estimate(&input).confidence, 90);
    }

    #[test]
    fn test_confidence_senior_penalty() {
        let mut input = sample_input();
        input.experience = 30;
        assert_eq!(estimate(&input).confidence, 80);
    }

    #[test]
    fn test_confidence_ceiling() {
        let mut profile = Profile::standard();
        profile.confidence.base = 120;
        assert_eq!(estimate_with(&sample_input(), &profile).confidence, 95);
    }

    #[test]
    fn test_inverted_confidence_bounds_do_not_panic() {
        let mut profile = Profile::standard();
        profile.confidence.floor = 90;
        profile.confidence.ceiling = 10;
        assert_eq!(estimate_with(&sample_input(), &profile).confidence, 10);
    }

    #[test]
    fn test_extreme_confidence_values_saturate() {
        let mut profile = Profile::standard();
        profile.confidence.base = i32::MAX;
        profile.confidence.floor = 0;
        profile.confidence.ceiling = 100;
        profile.confidence.adjustments = vec![ConfidenceAdjustment {
            delta: 5,
            when: Condition::always(),
        }];
        assert_eq!(estimate_with(&sample_input(), &profile).confidence, 100);

        profile.confidence.base = i32::MIN;
        profile.confidence.adjustments[0].delta = -5;
        assert_eq!(estimate_with(&sample_input(), &profile).confidence, 0);
    }

    #[test]
    fn test_temporal_bonus_saturates() {
        let mut profile = Profile::temporal();
        profile.confidence.base = i32::MAX;
        profile.confidence.adjustments.clear();
        assert_eq!(estimate_with(&sample_input(), &profile).confidence, 97);
    }

    #[test]
    fn test_partial_profile_keeps_standard_rules() {
        let yaml = "recommendations:\n  limit: 3\nconfidence:\n  base: 80\n";
        let profile: Profile = serde_saphyr::from_str(yaml).unwrap();
        let mut input = sample_input();
        input.company_size = None;
        input.languages.clear();

        let standard = estimate(&input);
        assert_eq!(standard.recommendations.len(), 4);
        assert_eq!(standard.confidence, 60);

        // 80 - 15 (company size) - 10 (languages), clamped to the floor
        let tweaked = estimate_with(&input, &profile);
        assert_eq!(tweaked.recommendations.len(), 3);
        assert_eq!(tweaked.confidence, 60);
        assert_eq!(tweaked.recommendations[..], standard.recommendations[..3]);
    }

    #[test]
    fn test_temporal_recommendations_carry_insight() {
        let result = estimate_with(&sample_input(), &Profile::temporal());
        assert!(!result.recommendations.is_empty());
        assert!(result.recommendations.iter().all(|r| r.insight.is_some()));
    }

    #[test]
    fn test_recommendations_for_sample() {
        let result = estimate(&sample_input());
        let titles: Vec<&str> = result.recommendations.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Consider Geographic Opportunities",
                "Target Large Enterprises",
                "Focus on Experience Growth",
            ]
        );
        assert_eq!(result.recommendations[0].kind, RecommendationKind::Geographic);
    }

    #[test]
    fn test_recommendations_capped_in_declaration_order() {
        let mut input = sample_input();
        input.languages = vec!["PHP".to_string()];
        let result = estimate(&input);
        // All five rules fire; the last one is dropped
        let titles: Vec<&str> = result.recommendations.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Consider Geographic Opportunities",
                "Learn High-Premium Languages",
                "Target Large Enterprises",
                "Focus on Experience Growth",
            ]
        );
    }

    #[test]
    fn test_no_recommendations_for_top_profile() {
        let input = EstimateInput {
            country: Some("Switzerland".to_string()),
            experience: 15,
            age: 40,
            company_size: Some("10,000 or more employees".to_string()),
            employment_type: Some("Employed, full-time".to_string()),
            languages: vec!["Rust".to_string(), "Python".to_string()],
        };
        assert!(estimate(&input).recommendations.is_empty());
    }

    #[test]
    fn test_missing_company_size_skips_enterprise_advice() {
        let mut input = sample_input();
        input.company_size = None;
        let result = estimate(&input);
        assert!(!result
            .recommendations
            .iter()
            .any(|r| r.title == "Target Large Enterprises"));
    }

    #[test]
    fn test_estimate_is_idempotent() {
        let input = sample_input();
        assert_eq!(estimate(&input), estimate(&input));
    }

    #[test]
    fn test_temporal_profile_applies_weights() {
        let profile = Preset::Temporal.profile();
        let result = estimate_with(&sample_input(), &profile);

        let w: f64 = 1.595;
        let trend = 1.0 + (w - 1.0) * 0.1;
        let boost = 1.0 + (w - 1.0) * 0.02;
        let m = (1.0 + 0.085 * (6.0f64).ln() * boost) - 0.018 * (5.0f64 / 20.0).powi(2);
        let premium = 25.8 * (1.0 + (w - 1.0) * 0.05);
        let expected = 70_000.0 * trend * m * 1.0 * 1.0 * (1.0 + premium / 100.0);

        assert_eq!(result.profile, "temporal");
        assert!((result.salary as f64 - expected).abs() <= 1.0);
        assert!((result.salary_min as f64 - expected * 0.88).abs() <= 1.0);
        assert!((result.salary_max as f64 - expected * 1.12).abs() <= 1.0);
        // 88 + 3 temporal bonus
        assert_eq!(result.confidence, 91);
        assert!(result.contributions.iter().any(|c| c.name == "Market trend"));
    }

    #[test]
    fn test_temporal_profile_always_suggests_remote_work() {
        let profile = Preset::Temporal.profile();
        let input = EstimateInput {
            country: Some("United States of America".to_string()),
            experience: 1,
            age: 25,
            company_size: Some("10,000 or more employees".to_string()),
            employment_type: Some("Employed, full-time".to_string()),
            languages: vec!["Rust".to_string()],
        };
        let result = estimate_with(&input, &profile);
        assert_eq!(result.recommendations.len(), 1);
        assert_eq!(result.recommendations[0].title, "Leverage Remote Work Opportunities");
    }
}
