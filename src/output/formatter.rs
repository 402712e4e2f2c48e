use std::io::IsTerminal;
use owo_colors::OwoColorize;

use crate::config::Config;
use crate::run::{lifetime_points, speed_points, title_points, RunOutcome, RunScoring};
use crate::scoring::ScoringMethod;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a number with at most 2 decimals, trimming trailing zeros
/// (6.0 -> "6", 5.3333 -> "5.33", 2.5 -> "2.5")
pub fn format_number(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn format_optional(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_else(|| "n/a".to_string())
}

/// Short list of the flags a method has switched on
fn method_flags(method: &ScoringMethod) -> Vec<&'static str> {
    let flags = [
        (method.drop_fractions, "drop fractions"),
        (method.clean_q_required, "clean Q"),
        (method.time_faults_under, "TF under"),
        (method.time_faults_over, "TF over"),
        (method.subtract_time_faults, "subtract TF"),
        (method.super_q, "SuperQ"),
        (method.double_q, "DoubleQ"),
        (method.speed_points, "speed pts"),
        (method.bonus_title_points, "bonus pts"),
    ];
    flags
        .into_iter()
        .filter(|(on, _)| *on)
        .map(|(_, label)| label)
        .collect()
}

/// Format a scoring method as one line
/// Format: "{division}/{level}  {style}  {dates}  [{flags}]"
pub fn format_method_line(method: &ScoringMethod, use_colors: bool) -> String {
    let target = format!("{}/{}", method.division, method.level);
    let dates = method.valid_date_string();
    let dates = if dates.is_empty() { "always".to_string() } else { dates };
    let mut flags = method_flags(method).join(", ");
    if method.style().uses_points() {
        let pts = format!("open {} / close {}", method.opening_points(), method.closing_points());
        flags = if flags.is_empty() { pts } else { format!("{}, {}", pts, flags) };
    }

    if use_colors {
        format!(
            "{}  {}  {}  [{}]",
            target.bold(),
            method.style().as_str().cyan(),
            dates.dimmed(),
            flags
        )
    } else {
        format!("{}  {}  {}  [{}]", target, method.style().as_str(), dates, flags)
    }
}

/// Format a list of scoring methods, one per line
pub fn format_methods(methods: &[&ScoringMethod], use_colors: bool) -> String {
    if methods.is_empty() {
        return "No scoring methods found.".to_string();
    }
    methods
        .iter()
        .map(|m| format_method_line(m, use_colors))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Everything computed for one run, ready for display
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub time_faults: f64,
    pub total_faults: f64,
    pub score: f64,
    pub yps: Option<f64>,
    pub min_yps: Option<f64>,
    pub ops: Option<f64>,
    pub meets_requirements: bool,
    pub title_points: f64,
    pub lifetime_points: f64,
    pub speed_points: f64,
}

impl RunReport {
    pub fn build(run: &RunScoring, method: &ScoringMethod, outcome: &RunOutcome, config: &Config) -> Self {
        Self {
            time_faults: run.time_faults(method),
            total_faults: run.total_faults(method),
            score: run.score(method),
            yps: run.yps(config.table_in_yps, None),
            min_yps: run.min_yps(config.table_in_yps),
            ops: run.obstacles_ps(config.table_in_yps, config.run_time_in_ops),
            meets_requirements: run.meets_requirements(method),
            title_points: title_points(run, method, outcome),
            lifetime_points: lifetime_points(run, method, outcome),
            speed_points: speed_points(run, method, outcome),
        }
    }
}

/// Format a run report as aligned "label: value" lines
pub fn format_run_report(report: &RunReport, use_colors: bool) -> String {
    let rows = [
        ("Time faults", format_number(report.time_faults)),
        ("Total faults", format_number(report.total_faults)),
        ("Score", format_number(report.score)),
        ("YPS", format_optional(report.yps)),
        ("Min YPS", format_optional(report.min_yps)),
        ("OPS", format_optional(report.ops)),
        (
            "Requirements",
            (if report.meets_requirements { "met" } else { "not met" }).to_string(),
        ),
        ("Title points", format_number(report.title_points)),
        ("Lifetime points", format_number(report.lifetime_points)),
        ("Speed points", format_number(report.speed_points)),
    ];

    rows.iter()
        .map(|(label, value)| {
            let label = format!("{:>15}:", label);
            if use_colors {
                format!("{} {}", label.dimmed(), value.bold())
            } else {
                format!("{} {}", label, value)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
