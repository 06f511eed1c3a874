use owo_colors::OwoColorize;
use std::collections::BTreeMap;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::estimator::{EstimateOutput, ImpactLevel, Profile};

/// Indent used for recommendation descriptions
const DETAIL_INDENT: usize = 5;

/// Widest line used when stdout is not a terminal
const DEFAULT_WIDTH: usize = 80;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Format a currency amount with thousands separators (95833 -> "95,833")
pub fn format_salary(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if amount < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Format a signed percentage impact with one decimal ("+23.4%", "-30.8%")
pub fn format_percent(impact: f64) -> String {
    // Avoid "-0.0%" for tiny negative rounding noise
    let rounded = (impact * 10.0).round() / 10.0;
    if rounded == 0.0 {
        "0.0%".to_string()
    } else {
        format!("{:+.1}%", rounded)
    }
}

/// Greedy word wrap; words longer than `width` get their own line.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(10);
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Format an estimate as a multi-line report
pub fn format_estimate(result: &EstimateOutput, use_colors: bool) -> String {
    let width = get_terminal_width().unwrap_or(DEFAULT_WIDTH);
    let mut out = Vec::new();

    let salary = format_salary(result.salary);
    let range = format!(
        "{} - {}",
        format_salary(result.salary_min),
        format_salary(result.salary_max)
    );
    if use_colors {
        out.push(format!("Estimated salary: {}", salary.bold().green()));
        out.push(format!("Range:            {}", range.cyan()));
    } else {
        out.push(format!("Estimated salary: {}", salary));
        out.push(format!("Range:            {}", range));
    }
    out.push(format!("Confidence:       {}%", result.confidence));
    out.push(format!(
        "Country:          {} (baseline {})",
        result.country,
        format_salary(result.baseline)
    ));
    out.push(format!("Profile:          {}", result.profile));

    if !result.contributions.is_empty() {
        out.push(String::new());
        out.push("Factor impact:".to_string());
        let name_width = result
            .contributions
            .iter()
            .map(|c| c.name.chars().count())
            .max()
            .unwrap_or(0);
        for factor in &result.contributions {
            let percent = format!("{:>7}", format_percent(factor.impact_percent));
            let percent = if !use_colors {
                percent
            } else if factor.impact_percent > 0.0 {
                percent.green().to_string()
            } else if factor.impact_percent < 0.0 {
                percent.red().to_string()
            } else {
                percent.dimmed().to_string()
            };
            out.push(format!(
                "  {:<width$}  {}",
                factor.name,
                percent,
                width = name_width
            ));
        }
    }

    if !result.recommendations.is_empty() {
        out.push(String::new());
        out.push("Recommendations:".to_string());
        for (idx, rec) in result.recommendations.iter().enumerate() {
            let meta = format!("[{} impact, {}]", rec.impact, rec.timeframe);
            let meta = if !use_colors {
                meta
            } else {
                match rec.impact {
                    ImpactLevel::High => meta.yellow().to_string(),
                    ImpactLevel::Medium => meta.cyan().to_string(),
                    ImpactLevel::Low => meta.dimmed().to_string(),
                }
            };
            let title = if use_colors {
                rec.title.bold().to_string()
            } else {
                rec.title.clone()
            };
            out.push(format!("{:>3}. {} {}", idx + 1, title, meta));
            for line in wrap_text(&rec.description, width.saturating_sub(DETAIL_INDENT)) {
                out.push(format!("{:indent$}{}", "", line, indent = DETAIL_INDENT));
            }
            if let Some(ref insight) = rec.insight {
                for line in wrap_text(&format!("Trend: {}", insight), width.saturating_sub(DETAIL_INDENT)) {
                    let line = if use_colors { line.dimmed().to_string() } else { line };
                    out.push(format!("{:indent$}{}", "", line, indent = DETAIL_INDENT));
                }
            }
        }
    }

    out.join("\n")
}

/// Format an estimate as a single tab-separated line for scripting
/// Columns: salary, salary_min, salary_max, confidence, country, profile
pub fn format_tsv(result: &EstimateOutput) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}",
        result.salary,
        result.salary_min,
        result.salary_max,
        result.confidence,
        result.country,
        result.profile
    )
}

/// Format an estimate as pretty-printed JSON
pub fn format_json(result: &EstimateOutput) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}

/// Table rows sorted by value descending, then by name
fn sorted_rows(table: &BTreeMap<String, f64>) -> Vec<(&str, f64)> {
    let mut rows: Vec<(&str, f64)> = table.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    rows.sort_by(|a, b| b.1.total_cmp(&a.1));
    rows
}

fn format_section<F>(title: &str, table: &BTreeMap<String, f64>, use_colors: bool, fmt_value: F) -> String
where
    F: Fn(f64) -> String,
{
    let rows = sorted_rows(table);
    let name_width = rows.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    let header = if use_colors {
        title.bold().to_string()
    } else {
        title.to_string()
    };
    let mut lines = vec![header];
    for (name, value) in rows {
        lines.push(format!(
            "  {:<width$}  {:>9}",
            name,
            fmt_value(value),
            width = name_width
        ));
    }
    lines.join("\n")
}

/// Format the lookup tables of a profile for display
pub fn format_tables(profile: &Profile, use_colors: bool) -> String {
    let mut sections = vec![format!("Profile: {}", profile.name)];

    sections.push(format_section(
        "Country baselines",
        &profile.countries,
        use_colors,
        |v| format_salary(v.round() as i64),
    ));
    sections.push(format_section(
        "Language premiums",
        &profile.language_premiums,
        use_colors,
        format_percent,
    ));
    sections.push(format_section(
        "Company size multipliers",
        &profile.company_sizes,
        use_colors,
        |v| format!("x{:.3}", v),
    ));
    sections.push(format_section(
        "Employment type multipliers",
        &profile.employment_types,
        use_colors,
        |v| format!("x{:.3}", v),
    ));

    let curve = &profile.experience;
    sections.push(format!(
        "Experience curve\n  growth {}  decay {}  floor {}  pivot {}y  max {}y  reference base {}",
        curve.growth_rate,
        curve.decay_rate,
        curve.floor,
        curve.pivot_years,
        curve.max_years,
        format_salary(curve.base.round() as i64)
    ));

    if let Some(ref temporal) = profile.temporal {
        sections.push(format!(
            "Temporal weighting\n  reference year {} (weight {})",
            temporal.reference_year,
            temporal.weight()
        ));
    }

    if !profile.feature_importance.is_empty() {
        let mut lines = vec!["Feature importance".to_string()];
        for item in &profile.feature_importance {
            match item.note {
                Some(ref note) => lines.push(format!("  {:>5.1}%  {} ({})", item.share, item.label, note)),
                None => lines.push(format!("  {:>5.1}%  {}", item.share, item.label)),
            }
        }
        sections.push(lines.join("\n"));
    }

    sections.join("\n\n")
}
