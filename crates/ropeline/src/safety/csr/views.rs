use serde::Serialize;

use super::domain::{CompanyId, ScoringPeriod};
use super::provider::VendorId;
use super::{CsrCategory, CsrResult};

/// Display band for a rating. Purely presentational; scoring never consults it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingBand {
    Excellent,
    Good,
    Warning,
    Critical,
}

impl RatingBand {
    pub fn for_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::Excellent
        } else if score >= 70.0 {
            Self::Good
        } else if score >= 50.0 {
            Self::Warning
        } else {
            Self::Critical
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Warning => "Warning",
            Self::Critical => "Critical",
        }
    }

    pub const fn color(self) -> &'static str {
        match self {
            Self::Excellent => "green",
            Self::Good => "yellow",
            Self::Warning => "orange",
            Self::Critical => "red",
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryView {
    pub category: CsrCategory,
    pub label: &'static str,
    pub penalty: f64,
    pub max_penalty: f64,
    pub scored: bool,
    pub satisfied: usize,
    pub required: usize,
    pub detail: String,
}

/// Nudge toward the category costing the company the most points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImprovementPrompt {
    pub category: CsrCategory,
    pub label: &'static str,
    pub recoverable_points: f64,
    pub message: String,
}

/// One prompt per penalised scored category, largest penalty first.
pub fn improvement_prompts(result: &CsrResult) -> Vec<ImprovementPrompt> {
    let mut penalised: Vec<_> = result
        .scored_categories()
        .filter(|score| score.penalty > 0.0)
        .collect();
    penalised.sort_by(|left, right| right.penalty.total_cmp(&left.penalty));

    penalised
        .into_iter()
        .map(|score| {
            let action = match score.category {
                CsrCategory::Documentation => "upload the missing company documents",
                CsrCategory::ToolboxMeeting => {
                    "hold a toolbox meeting within three days of every work session"
                }
                CsrCategory::HarnessInspection => {
                    "record a harness inspection on each day crews are on rope"
                }
                CsrCategory::DocumentReview => "collect outstanding employee acknowledgments",
                CsrCategory::ProjectCompletion => "",
            };
            ImprovementPrompt {
                category: score.category,
                label: score.category.label(),
                recoverable_points: round2(score.penalty),
                message: format!("{action} ({})", score.detail),
            }
        })
        .collect()
}

/// API/CLI payload wrapping a rating with its display band and prompts.
#[derive(Debug, Clone, Serialize)]
pub struct CsrRatingView {
    pub company_id: CompanyId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<ScoringPeriod>,
    pub overall_score: f64,
    pub band: RatingBand,
    pub band_label: &'static str,
    pub color: &'static str,
    pub categories: Vec<CategoryView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub improvement_prompts: Vec<ImprovementPrompt>,
}

impl CsrRatingView {
    pub fn from_result(result: &CsrResult, period: Option<ScoringPeriod>) -> Self {
        let band = RatingBand::for_score(result.overall_score);
        let categories = result
            .categories
            .iter()
            .map(|score| CategoryView {
                category: score.category,
                label: score.category.label(),
                penalty: round2(score.penalty),
                max_penalty: score.max_penalty,
                scored: score.category.is_scored(),
                satisfied: score.satisfied,
                required: score.required,
                detail: score.detail.clone(),
            })
            .collect();

        Self {
            company_id: result.company_id.clone(),
            period,
            overall_score: round2(result.overall_score),
            band,
            band_label: band.label(),
            color: band.color(),
            categories,
            improvement_prompts: improvement_prompts(result),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VendorCompanyRow {
    pub company_id: CompanyId,
    pub overall_score: f64,
    pub band: RatingBand,
}

/// Read-only roll-up of a vendor's companies for property managers.
#[derive(Debug, Clone, Serialize)]
pub struct VendorComparison {
    pub vendor_id: VendorId,
    pub period: ScoringPeriod,
    pub company_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lowest_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub band: Option<RatingBand>,
    pub companies: Vec<VendorCompanyRow>,
}

impl VendorComparison {
    pub fn from_results(vendor_id: VendorId, period: ScoringPeriod, results: &[CsrResult]) -> Self {
        let mut companies: Vec<VendorCompanyRow> = results
            .iter()
            .map(|result| VendorCompanyRow {
                company_id: result.company_id.clone(),
                overall_score: round2(result.overall_score),
                band: RatingBand::for_score(result.overall_score),
            })
            .collect();
        companies.sort_by(|left, right| {
            right
                .overall_score
                .total_cmp(&left.overall_score)
                .then_with(|| left.company_id.cmp(&right.company_id))
        });

        let scores = results.iter().map(|result| result.overall_score);
        let average_score = if results.is_empty() {
            None
        } else {
            Some(scores.clone().sum::<f64>() / results.len() as f64)
        };
        let lowest_score = scores.clone().min_by(f64::total_cmp);
        let highest_score = scores.max_by(f64::total_cmp);

        Self {
            vendor_id,
            period,
            company_count: results.len(),
            average_score: average_score.map(round2),
            lowest_score: lowest_score.map(round2),
            highest_score: highest_score.map(round2),
            band: average_score.map(RatingBand::for_score),
            companies,
        }
    }
}
