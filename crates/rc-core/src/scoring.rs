//! Composite risk scoring.
//!
//! Two scorers, on two scales:
//! - [`score`] folds organization-level counts into a `[1, 10]` risk index
//!   (higher is riskier).
//! - [`score_categories`] turns per-category event volume into `[0, 100]`
//!   resilience scores (higher is healthier) and averages them.

use rc_common::{CompositeRiskScore, Error, Result, RiskCategory, ScoreScale, TimeSeriesPoint};
use rc_config::ScoringPolicy;
use rc_math::{clamp_range, mean};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Component keys emitted by [`score`].
pub mod components {
    pub const BASE: &str = "base";
    pub const INCIDENTS: &str = "incidents";
    pub const CONTROL_GAP: &str = "control_gap";
    pub const VENDORS: &str = "vendors";
    pub const KRI_BREACHES: &str = "kri_breaches";
}

/// Organization-level inputs to the risk index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskInputs {
    pub incident_count: u32,
    /// Share of controls tested effective, in percent.
    pub control_effectiveness_pct: f64,
    #[serde(default)]
    pub high_risk_vendor_count: u32,
    #[serde(default)]
    pub kri_breach_count: u32,
}

impl RiskInputs {
    /// Parse inputs from a JSON object.
    pub fn parse_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Compute the `[1, 10]` risk index.
///
/// Each count contributes `count × weight`, saturating at its cap; the
/// control gap contributes `(1 − effectiveness / 100) × weight`. The sum
/// plus the base score is clamped to the scale.
///
/// # Errors
///
/// [`Error::OutOfRange`] when effectiveness is outside `[0, 100]` or not
/// a number.
pub fn score(inputs: &RiskInputs, policy: &ScoringPolicy) -> Result<CompositeRiskScore> {
    let pct = inputs.control_effectiveness_pct;
    if !(0.0..=100.0).contains(&pct) {
        return Err(Error::OutOfRange {
            field: "control_effectiveness_pct".to_string(),
            value: pct,
            min: 0.0,
            max: 100.0,
        });
    }

    let incidents = capped(inputs.incident_count, policy.incident_weight, policy.incident_cap);
    let control_gap = (1.0 - pct / 100.0) * policy.control_gap_weight;
    let vendors = capped(
        inputs.high_risk_vendor_count,
        policy.vendor_weight,
        policy.vendor_cap,
    );
    let kri_breaches = capped(
        inputs.kri_breach_count,
        policy.kri_breach_weight,
        policy.kri_breach_cap,
    );

    let (lo, hi) = ScoreScale::RiskIndex.bounds();
    let overall = clamp_range(
        policy.base_score + incidents + control_gap + vendors + kri_breaches,
        lo,
        hi,
    );

    let component_scores = BTreeMap::from([
        (components::BASE.to_string(), policy.base_score),
        (components::INCIDENTS.to_string(), incidents),
        (components::CONTROL_GAP.to_string(), control_gap),
        (components::VENDORS.to_string(), vendors),
        (components::KRI_BREACHES.to_string(), kri_breaches),
    ]);

    Ok(CompositeRiskScore {
        overall_score: overall,
        scale: ScoreScale::RiskIndex,
        component_scores,
    })
}

fn capped(count: u32, weight: f64, cap: f64) -> f64 {
    (count as f64 * weight).min(cap)
}

/// Score each configured category on the `[0, 100]` scale.
///
/// A category loses `unit_penalty` points per unit of summed row value,
/// down to 0. Rows whose tag matches no configured category are ignored,
/// and so are non-finite values. The overall score is the unweighted mean
/// of the category scores.
pub fn score_categories(rows: &[TimeSeriesPoint], policy: &ScoringPolicy) -> CompositeRiskScore {
    let (lo, hi) = ScoreScale::Percent.bounds();

    let component_scores: BTreeMap<String, f64> = policy
        .categories
        .iter()
        .map(|category| {
            let volume: f64 = rows
                .iter()
                .filter(|row| row.value.is_finite() && category_matches(category, &row.category))
                .map(|row| row.value)
                .sum();
            let penalty = (volume * policy.category_unit_penalty).min(hi);
            (category.clone(), clamp_range(hi - penalty, lo, hi))
        })
        .collect();

    let values: Vec<f64> = component_scores.values().copied().collect();
    CompositeRiskScore {
        overall_score: mean(&values).unwrap_or(hi),
        scale: ScoreScale::Percent,
        component_scores,
    }
}

/// Whether a row tag belongs to a configured category.
///
/// Tags compare case-insensitively; known aliases (`security` for `cyber`,
/// `ops` for `operational`, ...) resolve to their canonical category.
pub fn category_matches(configured: &str, tag: &str) -> bool {
    let configured = configured.trim();
    let tag = tag.trim();
    if configured.eq_ignore_ascii_case(tag) {
        return true;
    }
    match (RiskCategory::parse(configured), RiskCategory::parse(tag)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
