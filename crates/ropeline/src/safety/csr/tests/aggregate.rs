use crate::safety::csr::aggregate::{combine, enforce_ceiling};
use crate::safety::csr::domain::CompanyId;
use crate::safety::csr::{CategoryScore, CsrCategory, PERFECT_SCORE};

fn category(category: CsrCategory, penalty: f64) -> CategoryScore {
    CategoryScore {
        category,
        penalty,
        max_penalty: category.max_penalty(),
        satisfied: 0,
        required: 0,
        detail: String::new(),
    }
}

fn company() -> CompanyId {
    CompanyId("aggregate-test".to_string())
}

#[test]
fn combine_sums_scored_penalties_only() {
    let result = combine(
        company(),
        [
            category(CsrCategory::Documentation, 8.5),
            category(CsrCategory::ToolboxMeeting, 10.0),
            category(CsrCategory::HarnessInspection, 0.0),
            category(CsrCategory::DocumentReview, 1.5),
        ],
        category(CsrCategory::ProjectCompletion, 0.0),
    );

    assert_eq!(result.total_penalty, 20.0);
    assert_eq!(result.overall_score, PERFECT_SCORE - 20.0);
    assert_eq!(
        result.categories.last().map(|score| score.category),
        Some(CsrCategory::ProjectCompletion)
    );
}

#[test]
fn in_range_penalties_pass_through_unchanged() {
    let score = category(CsrCategory::DocumentReview, 5.0);
    assert_eq!(enforce_ceiling(&company(), &score), 5.0);
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "outside")]
fn out_of_range_penalty_fails_loudly_in_debug_builds() {
    enforce_ceiling(&company(), &category(CsrCategory::Documentation, 31.0));
}

#[cfg(not(debug_assertions))]
#[test]
fn out_of_range_penalty_is_clamped_in_release_builds() {
    assert_eq!(
        enforce_ceiling(&company(), &category(CsrCategory::Documentation, 31.0)),
        25.0
    );
    assert_eq!(
        enforce_ceiling(&company(), &category(CsrCategory::ToolboxMeeting, -2.0)),
        0.0
    );
    assert_eq!(
        enforce_ceiling(&company(), &category(CsrCategory::DocumentReview, f64::NAN)),
        5.0
    );
}
