//! Output envelopes and renderers for CLI payloads.
//!
//! Every payload is wrapped with the schema version, a run id, and the
//! policy snapshot that produced it, then rendered as JSON, Markdown, or a
//! one-line summary.

use chrono::{DateTime, Utc};
use rc_common::{CompositeRiskScore, OutputFormat, ProbabilityBucket, Result, RunId, SCHEMA_VERSION};
use rc_config::ConfigSnapshot;
use serde::Serialize;
use std::fmt::Write as _;

use crate::engine::ForecastReport;
use crate::exit_codes::ExitCode;
use crate::insight::Insight;

/// Payload of `rc-core forecast`.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastOutput {
    pub schema_version: &'static str,
    pub run_id: RunId,
    pub generated_at: DateTime<Utc>,
    pub policy: ConfigSnapshot,
    pub report: ForecastReport,
    pub insights: Vec<Insight>,
}

impl ForecastOutput {
    pub fn new(
        run_id: RunId,
        policy: ConfigSnapshot,
        report: ForecastReport,
        insights: Vec<Insight>,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            run_id,
            generated_at: Utc::now(),
            policy,
            report,
            insights,
        }
    }

    /// `BreachImminent` when any breach prediction is critical.
    pub fn exit_code(&self) -> ExitCode {
        match self.report.worst_breach() {
            Some(ProbabilityBucket::Critical) => ExitCode::BreachImminent,
            _ => ExitCode::Ok,
        }
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            OutputFormat::Md => Ok(self.render_markdown()),
            OutputFormat::Summary => Ok(self.render_summary()),
        }
    }

    fn render_markdown(&self) -> String {
        let report = &self.report;
        let mut out = String::new();
        let _ = writeln!(out, "# Risk forecast: {}", report.org_id);
        let _ = writeln!(out);
        if let Some(window) = &report.window {
            let _ = writeln!(
                out,
                "Window: {} to {}  ",
                window.start.format("%Y-%m-%d"),
                window.end.format("%Y-%m-%d")
            );
        }
        let _ = writeln!(
            out,
            "Bucketing: {} | Rows: {} | Run: {}",
            report.bucketing, report.row_count, self.run_id
        );
        let _ = writeln!(out);

        let _ = writeln!(out, "## Trends");
        let _ = writeln!(out);
        if report.categories.is_empty() {
            let _ = writeln!(out, "_No categories with data._");
        } else {
            let _ = writeln!(
                out,
                "| Category | Direction | Change % | Rolling avg | Next | Confidence | Samples |"
            );
            let _ = writeln!(out, "|---|---|---:|---:|---:|---:|---:|");
            for c in &report.categories {
                let t = &c.trend;
                let _ = writeln!(
                    out,
                    "| {} | {} | {:.1} | {:.2} | {:.2} | {:.2} | {} |",
                    c.category,
                    t.direction,
                    t.magnitude,
                    t.rolling_average,
                    t.predicted_next,
                    t.confidence,
                    t.samples
                );
            }
        }

        let breaches: Vec<_> = report.breaches().collect();
        if !breaches.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "## Threshold breaches");
            let _ = writeln!(out);
            let _ = writeln!(out, "| Series | Current | Threshold | Rate/step | Days | Likelihood |");
            let _ = writeln!(out, "|---|---:|---:|---:|---:|---|");
            for b in breaches {
                let days = b
                    .days_to_breach
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "never".to_string());
                let _ = writeln!(
                    out,
                    "| {} | {:.2} | {:.2} | {:.3} | {} | {} |",
                    b.series_id, b.current_value, b.threshold, b.change_rate, days, b.probability_bucket
                );
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "## Scores");
        let _ = writeln!(out);
        write_score_table(&mut out, "Category resilience (0-100)", &report.category_scores);
        if let Some(composite) = &report.composite {
            let _ = writeln!(out);
            write_score_table(&mut out, "Risk index (1-10)", composite);
        }

        let visible: Vec<_> = self.insights.iter().filter(|i| !i.suppressed).collect();
        if !visible.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "## Insights");
            let _ = writeln!(out);
            for insight in visible {
                let metric = insight
                    .metric
                    .map(|m| format!("{:.2}", m))
                    .unwrap_or_else(|| "-".to_string());
                let _ = writeln!(
                    out,
                    "- **{}** `{}` {} ({})",
                    insight.severity,
                    insight.label,
                    insight.category.as_deref().unwrap_or("organization"),
                    metric
                );
            }
        }
        out
    }

    fn render_summary(&self) -> String {
        let report = &self.report;
        let worst = report
            .worst_breach()
            .map(|b| b.to_string())
            .unwrap_or_else(|| "none".to_string());
        let increasing = report
            .categories
            .iter()
            .filter(|c| c.trend.direction == rc_common::TrendDirection::Increasing)
            .count();
        let mut line = format!(
            "[{}] {}: {} categories, {} increasing, worst breach {}, resilience {:.1}",
            self.run_id,
            report.org_id,
            report.categories.len(),
            increasing,
            worst,
            report.category_scores.overall_score
        );
        if let Some(composite) = &report.composite {
            let _ = write!(line, ", risk index {:.1}", composite.overall_score);
        }
        line
    }
}

fn write_score_table(out: &mut String, title: &str, score: &CompositeRiskScore) {
    let _ = writeln!(out, "**{}**: {:.2}", title, score.overall_score);
    let _ = writeln!(out);
    let _ = writeln!(out, "| Component | Value |");
    let _ = writeln!(out, "|---|---:|");
    for (name, value) in &score.component_scores {
        let _ = writeln!(out, "| {} | {:.2} |", name, value);
    }
}

/// Payload of `rc-core score`.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreOutput {
    pub schema_version: &'static str,
    pub run_id: RunId,
    pub generated_at: DateTime<Utc>,
    pub score: CompositeRiskScore,
}

impl ScoreOutput {
    pub fn new(run_id: RunId, score: CompositeRiskScore) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            run_id,
            generated_at: Utc::now(),
            score,
        }
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            OutputFormat::Md => {
                let mut out = String::from("# Composite risk score\n\n");
                write_score_table(&mut out, "Risk index (1-10)", &self.score);
                Ok(out)
            }
            OutputFormat::Summary => Ok(format!(
                "[{}] risk index {:.2}",
                self.run_id, self.score.overall_score
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ForecastEngine, ForecastRequest};
    use crate::insight::build_insights;
    use crate::scoring::{score, RiskInputs};
    use crate::Bucketing;
    use chrono::TimeZone;
    use rc_common::TimeSeriesPoint;
    use rc_config::resolve::PolicyPath;
    use rc_config::Policy;

    fn output(threshold: f64) -> ForecastOutput {
        let rows = [85.0, 87.0, 89.0, 91.0, 93.0, 95.0]
            .iter()
            .enumerate()
            .map(|(i, v)| {
                TimeSeriesPoint::new(
                    Utc.with_ymd_and_hms(2024, 2, i as u32 + 1, 0, 0, 0).unwrap(),
                    *v,
                    "cyber",
                )
            })
            .collect();
        let policy = Policy::default();
        let request = ForecastRequest::new("org-9", rows)
            .with_bucketing(Bucketing::Day)
            .with_threshold("cyber", threshold);
        let report = ForecastEngine::new(policy.clone()).forecast(&request).unwrap();
        let insights = build_insights(&report, &policy.insights);
        let snapshot = ConfigSnapshot::new(&policy, &PolicyPath::default(), None);
        ForecastOutput::new(RunId::new(), snapshot, report, insights)
    }

    #[test]
    fn json_envelope_has_schema_and_policy() {
        let out = output(100.0);
        let value: serde_json::Value =
            serde_json::from_str(&out.render(OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(value["schema_version"], SCHEMA_VERSION);
        assert!(value["run_id"].as_str().unwrap().starts_with("run-"));
        assert_eq!(value["policy"]["policy_source"], "builtin default");
        assert_eq!(
            value["report"]["categories"][0]["breach"]["probability_bucket"],
            "critical"
        );
    }

    #[test]
    fn critical_breach_sets_exit_code() {
        assert_eq!(output(100.0).exit_code(), ExitCode::BreachImminent);
        assert_eq!(output(1000.0).exit_code(), ExitCode::Ok);
    }

    #[test]
    fn markdown_has_sections() {
        let md = output(100.0).render(OutputFormat::Md).unwrap();
        assert!(md.starts_with("# Risk forecast: org-9"));
        assert!(md.contains("## Trends"));
        assert!(md.contains("## Threshold breaches"));
        assert!(md.contains("| cyber | 95.00 | 100.00 |"));
    }

    #[test]
    fn summary_is_one_line() {
        let summary = output(100.0).render(OutputFormat::Summary).unwrap();
        assert!(!summary.contains('\n'));
        assert!(summary.contains("worst breach critical"));
    }

    #[test]
    fn score_output_renders() {
        let s = score(
            &RiskInputs {
                incident_count: 2,
                control_effectiveness_pct: 50.0,
                high_risk_vendor_count: 0,
                kri_breach_count: 0,
            },
            &Policy::default().scoring,
        )
        .unwrap();
        let out = ScoreOutput::new(RunId::new(), s);
        assert!(out
            .render(OutputFormat::Summary)
            .unwrap()
            .ends_with("risk index 3.50"));
        assert!(out.render(OutputFormat::Md).unwrap().contains("| incidents | 1.00 |"));
    }
}
