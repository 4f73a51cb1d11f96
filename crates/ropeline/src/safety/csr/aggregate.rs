use tracing::error;

use super::domain::CompanyId;
use super::{CategoryScore, CsrResult, PERFECT_SCORE};

/// Sum the scored penalties into the overall rating. The informational entry is appended after
/// the scored ones and never enters the arithmetic.
pub(crate) fn combine(
    company_id: CompanyId,
    scored: [CategoryScore; 4],
    informational: CategoryScore,
) -> CsrResult {
    let mut categories = Vec::with_capacity(scored.len() + 1);
    let mut total_penalty = 0.0;

    for mut score in scored {
        score.penalty = enforce_ceiling(&company_id, &score);
        total_penalty += score.penalty;
        categories.push(score);
    }

    let mut informational = informational;
    if informational.penalty != 0.0 {
        error!(
            company_id = %company_id,
            category = informational.category.label(),
            penalty = informational.penalty,
            "informational category carried a penalty"
        );
        if cfg!(debug_assertions) {
            panic!("informational category carried a penalty");
        }
        informational.penalty = 0.0;
    }
    categories.push(informational);

    CsrResult {
        company_id,
        overall_score: PERFECT_SCORE - total_penalty,
        total_penalty,
        categories,
    }
}

/// A penalty outside `[0, max]` is a scorer defect. Debug builds stop here; release builds log
/// and clamp so the displayed rating stays within bounds.
pub(crate) fn enforce_ceiling(company_id: &CompanyId, score: &CategoryScore) -> f64 {
    let ceiling = score.category.max_penalty();
    if (0.0..=ceiling).contains(&score.penalty) {
        return score.penalty;
    }

    error!(
        company_id = %company_id,
        category = score.category.label(),
        penalty = score.penalty,
        ceiling,
        "category penalty outside its ceiling"
    );
    if cfg!(debug_assertions) {
        panic!(
            "{} penalty {} outside [0, {}]",
            score.category.label(),
            score.penalty,
            ceiling
        );
    }

    if score.penalty.is_nan() {
        ceiling
    } else {
        score.penalty.clamp(0.0, ceiling)
    }
}
