//! Typed result payloads, one variant per tool.
//!
//! Parsing is keyed by tool name. A payload that does not match its tool's
//! shape becomes [`ToolResult::Generic`], so parsing never fails.

use serde::Deserialize;
use serde_json::Value;

/// Package reference: upstream sends either a bare name or an object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PackageRef {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        ecosystem: Option<String>,
        #[serde(default)]
        version: Option<String>,
    },
}

impl PackageRef {
    /// `name@version (ecosystem)`, omitting absent parts.
    pub fn label(&self) -> String {
        match self {
            PackageRef::Name(name) => name.clone(),
            PackageRef::Detailed {
                name,
                ecosystem,
                version,
            } => {
                let mut label = name.clone();
                if let Some(version) = version {
                    label.push('@');
                    label.push_str(version);
                }
                if let Some(ecosystem) = ecosystem {
                    label.push_str(&format!(" ({ecosystem})"));
                }
                label
            }
        }
    }
}

// =============================================================================
// dependency.*
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Explanation {
    pub package: PackageRef,
    pub summary: String,
    #[serde(default)]
    pub use_cases: Vec<String>,
    #[serde(default)]
    pub key_features: Vec<String>,
    #[serde(default)]
    pub considerations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub package: PackageRef,
    pub health: Health,
    #[serde(default)]
    pub risk: Option<Risk>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    /// Fraction in `[0, 1]`.
    pub score: f64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub maintenance: Option<f64>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub last_release: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Risk {
    pub level: String,
    #[serde(default)]
    pub factors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alternatives {
    pub package: PackageRef,
    pub alternatives: Vec<Alternative>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alternative {
    pub name: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub migration_effort: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trends {
    pub package: PackageRef,
    pub trend: Trend,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trend {
    pub direction: String,
    /// Relative change as a fraction, e.g. `0.12` for +12%.
    #[serde(default)]
    pub downloads_change: Option<f64>,
    #[serde(default)]
    pub weekly_downloads: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeUpgrade {
    pub package: PackageRef,
    pub current_version: String,
    pub recommended_version: String,
    pub safe: bool,
    #[serde(default)]
    pub breaking_changes: Vec<BreakingChange>,
    #[serde(default)]
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BreakingChange {
    #[serde(default)]
    pub version: Option<String>,
    pub description: String,
}

// =============================================================================
// stack.*
// =============================================================================

/// Stack header: a bare name or `{name, summary}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StackInfo {
    Name(String),
    Detailed {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        summary: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StackRecommendation {
    pub stack: StackInfo,
    pub packages: Vec<RecommendedPackage>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecommendedPackage {
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StackValidation {
    pub valid: bool,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub issues: Vec<ValidationIssue>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ValidationIssue {
    pub severity: String,
    pub message: String,
    #[serde(default)]
    pub packages: Vec<String>,
    #[serde(default)]
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StackDefaults {
    #[serde(default)]
    pub framework: Option<String>,
    pub defaults: Vec<DefaultChoice>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DefaultChoice {
    pub category: String,
    pub package: String,
    #[serde(default)]
    pub reason: Option<String>,
}

// =============================================================================
// migration / architecture / signals
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationPlan {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub estimated_effort: Option<String>,
    pub steps: Vec<MigrationStep>,
    #[serde(default)]
    pub risks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MigrationStep {
    #[serde(default)]
    pub order: Option<u32>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchitectureEvaluation {
    #[serde(default)]
    pub overall_score: Option<f64>,
    pub dimensions: Vec<Dimension>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Dimension {
    pub name: String,
    /// Fraction in `[0, 1]`.
    pub score: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SignalEvaluation {
    pub reward: f64,
    #[serde(default)]
    pub verdict: Option<String>,
    #[serde(default)]
    pub signals: Vec<SignalContribution>,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SignalContribution {
    pub name: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub contribution: Option<f64>,
}

// =============================================================================
// Union
// =============================================================================

/// A tool result, typed by the tool that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    Explain(Explanation),
    Health(HealthReport),
    Alternatives(Alternatives),
    Trends(Trends),
    SafeUpgrade(SafeUpgrade),
    StackRecommend(StackRecommendation),
    StackValidate(StackValidation),
    StackDefaults(StackDefaults),
    MigrationPlan(MigrationPlan),
    ArchitectureEvaluate(ArchitectureEvaluation),
    SignalsEvaluate(SignalEvaluation),
    /// Unknown tool or unrecognised shape.
    Generic { tool: String, raw: Value },
}

impl ToolResult {
    pub fn parse(tool: &str, raw: &Value) -> Self {
        let typed = match tool {
            "dependency.explain" => from(raw).map(Self::Explain),
            "dependency.health" => from(raw).map(Self::Health),
            "dependency.alternatives" => from(raw).map(Self::Alternatives),
            "dependency.trends" => from(raw).map(Self::Trends),
            "dependency.safe-upgrade" => from(raw).map(Self::SafeUpgrade),
            "stack.recommend" => from(raw).map(Self::StackRecommend),
            "stack.validate" => from(raw).map(Self::StackValidate),
            "stack.defaults" => from(raw).map(Self::StackDefaults),
            "migration.plan" => from(raw).map(Self::MigrationPlan),
            "architecture.evaluate" => from(raw).map(Self::ArchitectureEvaluate),
            "signals.evaluate" => from(raw).map(Self::SignalsEvaluate),
            _ => None,
        };

        typed.unwrap_or_else(|| {
            if raw.is_object() || raw.is_array() {
                tracing::debug!(tool, "Result shape not recognised, using generic rendering");
            }
            Self::Generic {
                tool: tool.to_string(),
                raw: raw.clone(),
            }
        })
    }
}

fn from<T: serde::de::DeserializeOwned>(raw: &Value) -> Option<T> {
    T::deserialize(raw).ok()
}
