use super::profile::Profile;
use super::types::EstimateInput;
use crate::error::InputError;

pub const EXPERIENCE_RANGE: (u32, u32) = (0, 50);
pub const AGE_RANGE: (u32, u32) = (18, 80);

/// Range-check an estimate request before scoring it.
/// Returns all violations at once (not just the first).
pub fn validate_input(input: &EstimateInput) -> Result<(), Vec<InputError>> {
    let mut errors = Vec::new();

    let (min, max) = EXPERIENCE_RANGE;
    if !(min..=max).contains(&input.experience) {
        errors.push(InputError::ExperienceOutOfRange {
            value: input.experience,
            min,
            max,
        });
    }

    let (min, max) = AGE_RANGE;
    if !(min..=max).contains(&input.age) {
        errors.push(InputError::AgeOutOfRange {
            value: input.age,
            min,
            max,
        });
    }

    if input.distinct_languages().is_empty() {
        errors.push(InputError::NoLanguages);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a profile loaded from disk.
/// Returns all validation errors at once (not just the first).
pub fn validate_profile(profile: &Profile) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if profile.countries.is_empty() {
        errors.push("countries: must not be empty".to_string());
    }
    for (country, baseline) in &profile.countries {
        if !baseline.is_finite() || *baseline < 0.0 {
            errors.push(format!("countries.{}: must be non-negative, got {}", country, baseline));
        }
    }
    if !profile.countries.contains_key(&profile.fallback_country) {
        errors.push(format!(
            "fallback_country: '{}' has no entry in countries",
            profile.fallback_country
        ));
    }

    for (lang, premium) in &profile.language_premiums {
        if !premium.is_finite() || *premium <= -100.0 {
            errors.push(format!(
                "language_premiums.{}: must be above -100, got {}",
                lang, premium
            ));
        }
    }

    for (section, table) in [
        ("company_sizes", &profile.company_sizes),
        ("employment_types", &profile.employment_types),
    ] {
        for (label, multiplier) in table {
            if !multiplier.is_finite() || *multiplier < 0.0 {
                errors.push(format!(
                    "{}.{}: must be non-negative, got {}",
                    section, label, multiplier
                ));
            }
        }
    }

    let curve = &profile.experience;
    if curve.floor <= 0.0 {
        errors.push("experience.floor: must be positive".to_string());
    }
    if curve.pivot_years <= 0.0 {
        errors.push("experience.pivot_years: must be positive".to_string());
    }
    if curve.growth_rate < 0.0 || curve.decay_rate < 0.0 {
        errors.push("experience: growth_rate and decay_rate must be non-negative".to_string());
    }

    let band = profile.band;
    if !(band.lower > 0.0 && band.lower <= 1.0 && band.upper >= 1.0) {
        errors.push(format!(
            "band: expected 0 < lower <= 1 <= upper, got lower={} upper={}",
            band.lower, band.upper
        ));
    }

    let confidence = &profile.confidence;
    if !(0 <= confidence.floor && confidence.floor <= confidence.ceiling && confidence.ceiling <= 100)
    {
        errors.push(format!(
            "confidence: expected 0 <= floor <= ceiling <= 100, got floor={} ceiling={}",
            confidence.floor, confidence.ceiling
        ));
    }

    for (i, rule) in profile.recommendations.rules.iter().enumerate() {
        if rule.title.trim().is_empty() {
            errors.push(format!("recommendations.rules[{}].title: must not be empty", i));
        }
    }

    if let Some(ref temporal) = profile.temporal {
        if !temporal.year_weights.contains_key(&temporal.reference_year) {
            errors.push(format!(
                "temporal.reference_year: {} has no entry in year_weights",
                temporal.reference_year
            ));
        }
        for (year, weight) in &temporal.year_weights {
            if !weight.is_finite() || *weight <= 0.0 {
                errors.push(format!("temporal.year_weights.{}: must be positive", year));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
