//! Text templates for each typed result.

use super::results::*;
use serde_json::Value;
use std::fmt::Write;

/// Render a typed result body (without the guidance section).
pub fn render_body(result: &ToolResult) -> String {
    let mut out = String::new();
    match result {
        ToolResult::Explain(r) => explain(&mut out, r),
        ToolResult::Health(r) => health(&mut out, r),
        ToolResult::Alternatives(r) => alternatives(&mut out, r),
        ToolResult::Trends(r) => trends(&mut out, r),
        ToolResult::SafeUpgrade(r) => safe_upgrade(&mut out, r),
        ToolResult::StackRecommend(r) => stack_recommend(&mut out, r),
        ToolResult::StackValidate(r) => stack_validate(&mut out, r),
        ToolResult::StackDefaults(r) => stack_defaults(&mut out, r),
        ToolResult::MigrationPlan(r) => migration_plan(&mut out, r),
        ToolResult::ArchitectureEvaluate(r) => architecture(&mut out, r),
        ToolResult::SignalsEvaluate(r) => signals(&mut out, r),
        ToolResult::Generic { tool, raw } => generic(&mut out, tool, raw),
    }
    out.trim_end().to_string()
}

// =============================================================================
// Number formatting
// =============================================================================

/// Fraction to whole-number percentage: `0.876` → `88%`. Ties round away from zero.
pub fn percent(fraction: f64) -> String {
    format!("{}%", (fraction * 100.0).round() as i64)
}

/// Signed percentage change: `0.12` → `+12%`.
pub fn percent_change(fraction: f64) -> String {
    format!("{:+}%", (fraction * 100.0).round() as i64)
}

/// Continuous reward-like value with two decimals.
pub fn score(value: f64) -> String {
    format!("{:.2}", (value * 100.0).round() / 100.0)
}

// =============================================================================
// Helpers
// =============================================================================

// Writes to a String are infallible.
macro_rules! emit {
    ($out:expr) => {{
        let _ = writeln!($out);
    }};
    ($out:expr, $($arg:tt)*) => {{
        let _ = writeln!($out, $($arg)*);
    }};
}

fn bullets(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    emit!(out);
    emit!(out, "## {heading}");
    for item in items {
        emit!(out, "- {item}");
    }
}

// =============================================================================
// Templates
// =============================================================================

fn explain(out: &mut String, r: &Explanation) {
    emit!(out, "# {}", r.package.label());
    emit!(out);
    emit!(out, "{}", r.summary);
    bullets(out, "Use cases", &r.use_cases);
    bullets(out, "Key features", &r.key_features);
    bullets(out, "Considerations", &r.considerations);
}

fn health(out: &mut String, r: &HealthReport) {
    emit!(out, "# Health: {}", r.package.label());
    emit!(out);
    match &r.health.status {
        Some(status) => emit!(out, "Health score: {} ({status})", percent(r.health.score)),
        None => emit!(out, "Health score: {}", percent(r.health.score)),
    }
    if let Some(m) = r.health.maintenance {
        emit!(out, "Maintenance: {}", percent(m));
    }
    if let Some(p) = r.health.popularity {
        emit!(out, "Popularity: {}", percent(p));
    }
    if let Some(date) = &r.health.last_release {
        emit!(out, "Last release: {date}");
    }
    if let Some(risk) = &r.risk {
        emit!(out);
        emit!(out, "## Risk: {}", risk.level);
        for factor in &risk.factors {
            emit!(out, "- {factor}");
        }
    }
}

fn alternatives(out: &mut String, r: &Alternatives) {
    emit!(out, "# Alternatives to {}", r.package.label());
    emit!(out);
    if r.alternatives.is_empty() {
        emit!(out, "No alternatives found.");
        return;
    }
    for (rank, alt) in r.alternatives.iter().enumerate() {
        match alt.score {
            Some(s) => emit!(out, "{}. {} ({} match)", rank + 1, alt.name, percent(s)),
            None => emit!(out, "{}. {}", rank + 1, alt.name),
        }
        if let Some(reason) = &alt.reason {
            emit!(out, "   {reason}");
        }
        if let Some(effort) = &alt.migration_effort {
            emit!(out, "   Migration effort: {effort}");
        }
    }
}

fn trends(out: &mut String, r: &Trends) {
    match &r.period {
        Some(period) => emit!(out, "# Trends: {} ({period})", r.package.label()),
        None => emit!(out, "# Trends: {}", r.package.label()),
    }
    emit!(out);
    emit!(out, "Direction: {}", r.trend.direction);
    if let Some(change) = r.trend.downloads_change {
        emit!(out, "Download change: {}", percent_change(change));
    }
    if let Some(weekly) = r.trend.weekly_downloads {
        emit!(out, "Weekly downloads: {weekly}");
    }
    if let Some(summary) = &r.summary {
        emit!(out);
        emit!(out, "{summary}");
    }
}

fn safe_upgrade(out: &mut String, r: &SafeUpgrade) {
    emit!(
        out,
        "# Safe upgrade: {} {} -> {}",
        r.package.label(),
        r.current_version,
        r.recommended_version
    );
    emit!(out);
    if r.safe {
        emit!(out, "Verdict: safe to upgrade");
    } else {
        emit!(out, "Verdict: review required before upgrading");
    }
    if !r.breaking_changes.is_empty() {
        emit!(out);
        emit!(out, "## Breaking changes");
        for change in &r.breaking_changes {
            match &change.version {
                Some(v) => emit!(out, "- [{v}] {}", change.description),
                None => emit!(out, "- {}", change.description),
            }
        }
    }
    bullets(out, "Notes", &r.notes);
}

fn stack_recommend(out: &mut String, r: &StackRecommendation) {
    let (name, summary) = match &r.stack {
        StackInfo::Name(name) => (Some(name.as_str()), None),
        StackInfo::Detailed { name, summary } => (name.as_deref(), summary.as_deref()),
    };
    match name {
        Some(name) => emit!(out, "# Recommended stack: {name}"),
        None => emit!(out, "# Recommended stack"),
    }
    if let Some(summary) = summary {
        emit!(out);
        emit!(out, "{summary}");
    }
    emit!(out);
    emit!(out, "## Packages");
    for pkg in &r.packages {
        let mut entry = format!("- **{}**", pkg.name);
        if let Some(version) = &pkg.version {
            let _ = write!(entry, " {version}");
        }
        if let Some(role) = &pkg.role {
            let _ = write!(entry, " ({role})");
        }
        if let Some(reason) = &pkg.reason {
            let _ = write!(entry, ": {reason}");
        }
        emit!(out, "{entry}");
    }
}

fn stack_validate(out: &mut String, r: &StackValidation) {
    let verdict = if r.valid { "passed" } else { "issues found" };
    match r.score {
        Some(s) => emit!(out, "# Stack validation: {verdict} (score {})", percent(s)),
        None => emit!(out, "# Stack validation: {verdict}"),
    }
    emit!(out);
    if r.issues.is_empty() {
        emit!(out, "No issues found.");
        return;
    }
    for (i, issue) in r.issues.iter().enumerate() {
        if issue.packages.is_empty() {
            emit!(out, "{}. [{}] {}", i + 1, issue.severity, issue.message);
        } else {
            emit!(
                out,
                "{}. [{}] {} ({})",
                i + 1,
                issue.severity,
                issue.message,
                issue.packages.join(", ")
            );
        }
        if let Some(suggestion) = &issue.suggestion {
            emit!(out, "   Suggestion: {suggestion}");
        }
    }
}

fn stack_defaults(out: &mut String, r: &StackDefaults) {
    match &r.framework {
        Some(framework) => emit!(out, "# Defaults for {framework}"),
        None => emit!(out, "# Defaults"),
    }
    emit!(out);
    for choice in &r.defaults {
        match &choice.reason {
            Some(reason) => emit!(out, "- {}: {} - {reason}", choice.category, choice.package),
            None => emit!(out, "- {}: {}", choice.category, choice.package),
        }
    }
}

fn migration_plan(out: &mut String, r: &MigrationPlan) {
    match (&r.from, &r.to) {
        (Some(from), Some(to)) => emit!(out, "# Migration plan: {from} -> {to}"),
        _ => emit!(out, "# Migration plan"),
    }
    if let Some(effort) = &r.estimated_effort {
        emit!(out);
        emit!(out, "Estimated effort: {effort}");
    }

    // Explicit `order` wins; unordered steps keep their position after them.
    let mut steps: Vec<&MigrationStep> = r.steps.iter().collect();
    steps.sort_by_key(|s| s.order.unwrap_or(u32::MAX));

    emit!(out);
    emit!(out, "## Steps");
    for (i, step) in steps.iter().enumerate() {
        emit!(out, "{}. {}", i + 1, step.title);
        if let Some(description) = &step.description {
            emit!(out, "   {description}");
        }
    }
    bullets(out, "Risks", &r.risks);
}

fn architecture(out: &mut String, r: &ArchitectureEvaluation) {
    match r.overall_score {
        Some(s) => emit!(out, "# Architecture evaluation: {} overall", percent(s)),
        None => emit!(out, "# Architecture evaluation"),
    }
    emit!(out);
    emit!(out, "## Dimensions");
    for dim in &r.dimensions {
        match &dim.notes {
            Some(notes) => emit!(out, "- {}: {} - {notes}", dim.name, percent(dim.score)),
            None => emit!(out, "- {}: {}", dim.name, percent(dim.score)),
        }
    }
    bullets(out, "Recommendations", &r.recommendations);
}

fn signals(out: &mut String, r: &SignalEvaluation) {
    emit!(out, "# Signal evaluation");
    emit!(out);
    match &r.verdict {
        Some(verdict) => emit!(out, "Reward: {} ({verdict})", score(r.reward)),
        None => emit!(out, "Reward: {}", score(r.reward)),
    }
    if !r.signals.is_empty() {
        emit!(out);
        emit!(out, "## Signals");
        for signal in &r.signals {
            let value = scalar_text(&signal.value);
            match signal.contribution {
                Some(c) => emit!(out, "- {}: {value} (contribution {})", signal.name, score(c)),
                None => emit!(out, "- {}: {value}", signal.name),
            }
        }
    }
    if let Some(explanation) = &r.explanation {
        emit!(out);
        emit!(out, "{explanation}");
    }
}

fn generic(out: &mut String, tool: &str, raw: &Value) {
    let pretty = serde_json::to_string_pretty(raw).unwrap_or_else(|_| raw.to_string());
    emit!(out, "# {tool} result");
    emit!(out);
    emit!(out, "```json");
    emit!(out, "{pretty}");
    emit!(out, "```");
}

/// Strings unquoted, everything else as compact JSON.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
