use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric range expression used for experience thresholds.
///
/// Serialized as its string form (`"<10"`, `">=3"`, `"5-10"`), so a bad
/// expression is rejected when the profile is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum RangeOp {
    LessThan(u64),
    LessEqual(u64),
    GreaterThan(u64),
    GreaterEqual(u64),
    Equal(u64),
    Between(u64, u64), // Inclusive range: N-M
}

impl RangeOp {
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(val) = s.strip_prefix(">=") {
            Ok(RangeOp::GreaterEqual(val.trim().parse()?))
        } else if let Some(val) = s.strip_prefix("<=") {
            Ok(RangeOp::LessEqual(val.trim().parse()?))
        } else if let Some(val) = s.strip_prefix('>') {
            Ok(RangeOp::GreaterThan(val.trim().parse()?))
        } else if let Some(val) = s.strip_prefix('<') {
            Ok(RangeOp::LessThan(val.trim().parse()?))
        } else if s.contains('-') && !s.starts_with('-') {
            let parts: Vec<&str> = s.split('-').collect();
            if parts.len() == 2 {
                let low: u64 = parts[0].trim().parse()?;
                let high: u64 = parts[1].trim().parse()?;
                if low > high {
                    bail!("Range start exceeds end: {}", s)
                }
                Ok(RangeOp::Between(low, high))
            } else {
                bail!("Invalid range format: {}", s)
            }
        } else {
            Ok(RangeOp::Equal(s.parse()?))
        }
    }

    pub fn matches(&self, value: u64) -> bool {
        match self {
            RangeOp::LessThan(n) => value < *n,
            RangeOp::LessEqual(n) => value <= *n,
            RangeOp::GreaterThan(n) => value > *n,
            RangeOp::GreaterEqual(n) => value >= *n,
            RangeOp::Equal(n) => value == *n,
            RangeOp::Between(low, high) => value >= *low && value <= *high,
        }
    }
}

impl fmt::Display for RangeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeOp::LessThan(n) => write!(f, "<{}", n),
            RangeOp::LessEqual(n) => write!(f, "<={}", n),
            RangeOp::GreaterThan(n) => write!(f, ">{}", n),
            RangeOp::GreaterEqual(n) => write!(f, ">={}", n),
            RangeOp::Equal(n) => write!(f, "{}", n),
            RangeOp::Between(low, high) => write!(f, "{}-{}", low, high),
        }
    }
}

impl TryFrom<String> for RangeOp {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self> {
        RangeOp::parse(&s)
    }
}

impl From<RangeOp> for String {
    fn from(op: RangeOp) -> Self {
        op.to_string()
    }
}

/// Input fields whose absence a condition can test for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Country,
    CompanySize,
    EmploymentType,
    Languages,
}

/// The resolved view of an input that conditions are evaluated against.
///
/// Country and company size hold the matching table key when the input
/// matched one, and the raw input otherwise.
#[derive(Debug, Clone)]
pub struct Facts<'a> {
    pub country: Option<&'a str>,
    pub company_size: Option<&'a str>,
    pub employment_type: Option<&'a str>,
    pub languages: Vec<&'a str>,
    pub experience: u32,
}

/// A conjunction of optional clauses. A condition with no clauses always holds.
///
/// Example YAML:
/// ```yaml
/// when:
///   country_not_in: ["United States of America", "Switzerland"]
///   experience: "<10"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Condition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_in: Option<Vec<String>>,

    /// Also holds when the country is missing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_not_in: Option<Vec<String>>,

    /// At least one of these languages is selected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub any_language: Option<Vec<String>>,

    /// None of these languages is selected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_language: Option<Vec<String>>,

    /// A company size is given and is not one of these
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_size_not_in: Option<Vec<String>>,

    /// Range over years of experience, written as "<10", ">25", "5-10"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<RangeOp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing: Option<Field>,
}

impl Condition {
    pub fn always() -> Self {
        Self::default()
    }

    pub fn holds(&self, facts: &Facts) -> bool {
        if let Some(ref countries) = self.country_in {
            match facts.country {
                Some(country) if contains(countries, country) => {}
                _ => return false,
            }
        }

        if let Some(ref countries) = self.country_not_in {
            if let Some(country) = facts.country {
                if contains(countries, country) {
                    return false;
                }
            }
        }

        if let Some(ref langs) = self.any_language {
            if !facts.languages.iter().any(|l| contains(langs, l)) {
                return false;
            }
        }

        if let Some(ref langs) = self.no_language {
            if facts.languages.iter().any(|l| contains(langs, l)) {
                return false;
            }
        }

        if let Some(ref sizes) = self.company_size_not_in {
            match facts.company_size {
                Some(size) if !contains(sizes, size) => {}
                _ => return false,
            }
        }

        if let Some(range) = self.experience {
            if !range.matches(u64::from(facts.experience)) {
                return false;
            }
        }

        if let Some(field) = self.missing {
            let is_missing = match field {
                Field::Country => facts.country.is_none(),
                Field::CompanySize => facts.company_size.is_none(),
                Field::EmploymentType => facts.employment_type.is_none(),
                Field::Languages => facts.languages.is_empty(),
            };
            if !is_missing {
                return false;
            }
        }

        true
    }
}

fn contains(list: &[String], value: &str) -> bool {
    list.iter().any(|s| s.eq_ignore_ascii_case(value))
}
