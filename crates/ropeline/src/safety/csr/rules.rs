use super::coverage::{compute_coverage, Coverage, CoverageRule};
use super::domain::{CompanyComplianceSnapshot, RequiredDocumentKind};
use super::{CategoryScore, CsrCategory};

/// Penalty proportional to the deficient share; nothing to be deficient in means no penalty.
fn linear_penalty(category: CsrCategory, deficient: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    category.max_penalty() * (deficient as f64 / total as f64)
}

fn coverage_penalty(category: CsrCategory, coverage: &Coverage) -> f64 {
    category.max_penalty() * (1.0 - coverage.ratio())
}

pub(crate) fn documentation(snapshot: &CompanyComplianceSnapshot) -> CategoryScore {
    let required = RequiredDocumentKind::ordered();
    let on_file = required
        .iter()
        .filter(|kind| snapshot.has_document(**kind))
        .count();
    let missing = required.len() - on_file;

    let detail = if missing == 0 {
        format!("{on_file} of {} required documents on file", required.len())
    } else {
        let missing_labels: Vec<&str> = required
            .iter()
            .filter(|kind| !snapshot.has_document(**kind))
            .map(|kind| kind.label())
            .collect();
        format!(
            "{on_file} of {} required documents on file (missing {})",
            required.len(),
            missing_labels.join(", ")
        )
    };

    CategoryScore {
        category: CsrCategory::Documentation,
        penalty: linear_penalty(CsrCategory::Documentation, missing, required.len()),
        max_penalty: CsrCategory::Documentation.max_penalty(),
        satisfied: on_file,
        required: required.len(),
        detail,
    }
}

pub(crate) fn toolbox_meetings(
    snapshot: &CompanyComplianceSnapshot,
    rule: CoverageRule,
) -> CategoryScore {
    let coverage = compute_coverage(
        snapshot.work_sessions().iter().map(|session| session.date),
        snapshot.toolbox_meetings().iter().map(|meeting| meeting.date),
        rule,
    );

    CategoryScore {
        category: CsrCategory::ToolboxMeeting,
        penalty: coverage_penalty(CsrCategory::ToolboxMeeting, &coverage),
        max_penalty: CsrCategory::ToolboxMeeting.max_penalty(),
        satisfied: coverage.covered,
        required: coverage.total,
        detail: format!(
            "{} of {} work sessions covered by a toolbox meeting",
            coverage.covered, coverage.total
        ),
    }
}

pub(crate) fn harness_inspections(
    snapshot: &CompanyComplianceSnapshot,
    rule: CoverageRule,
) -> CategoryScore {
    let coverage = compute_coverage(
        snapshot.work_sessions().iter().map(|session| session.date),
        snapshot
            .harness_inspections()
            .iter()
            .map(|inspection| inspection.date),
        rule,
    );

    CategoryScore {
        category: CsrCategory::HarnessInspection,
        penalty: coverage_penalty(CsrCategory::HarnessInspection, &coverage),
        max_penalty: CsrCategory::HarnessInspection.max_penalty(),
        satisfied: coverage.covered,
        required: coverage.total,
        detail: format!(
            "{} of {} work sessions with a harness inspection",
            coverage.covered, coverage.total
        ),
    }
}

pub(crate) fn document_review(snapshot: &CompanyComplianceSnapshot) -> CategoryScore {
    let (required, unsigned) = snapshot.acknowledgable_documents().iter().fold(
        (0usize, 0usize),
        |(required, unsigned), acknowledgment| {
            (
                required + acknowledgment.total_employees as usize,
                unsigned + acknowledgment.unsigned() as usize,
            )
        },
    );
    let signed = required - unsigned;

    CategoryScore {
        category: CsrCategory::DocumentReview,
        penalty: linear_penalty(CsrCategory::DocumentReview, unsigned, required),
        max_penalty: CsrCategory::DocumentReview.max_penalty(),
        satisfied: signed,
        required,
        detail: format!("{signed} of {required} document acknowledgments signed"),
    }
}

pub(crate) fn project_completion(snapshot: &CompanyComplianceSnapshot) -> CategoryScore {
    let total = snapshot.projects().len();
    let completed = snapshot
        .projects()
        .iter()
        .filter(|project| project.completed)
        .count();

    let detail = if total == 0 {
        "no project data reported".to_string()
    } else {
        format!("{completed} of {total} projects completed (informational)")
    };

    CategoryScore {
        category: CsrCategory::ProjectCompletion,
        penalty: 0.0,
        max_penalty: CsrCategory::ProjectCompletion.max_penalty(),
        satisfied: completed,
        required: total,
        detail,
    }
}
