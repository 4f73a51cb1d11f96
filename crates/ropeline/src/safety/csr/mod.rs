//! Company Safety Rating (CSR): a penalty-based compliance score between 20 and 100.
//!
//! The engine is a pure function over a [`CompanyComplianceSnapshot`]. Fetching facts, caching
//! results, and presenting them live in the surrounding [`provider`], [`cache`], [`service`],
//! and [`views`] modules so the engine never holds state between calls.

mod aggregate;
pub mod cache;
pub mod coverage;
pub mod domain;
pub mod provider;
pub mod router;
mod rules;
pub mod service;
pub mod views;

#[cfg(test)]
mod tests;

pub use cache::{snapshot_fingerprint, RatingCache};
pub use coverage::{compute_coverage, Coverage, CoverageRule};
pub use domain::{
    AcknowledgableDocumentKind, CompanyComplianceSnapshot, CompanyId, DocumentAcknowledgment,
    HarnessInspection, ProjectStatus, RequiredDocument, RequiredDocumentKind, ScoringPeriod,
    SnapshotError, SnapshotSubmission, ToolboxMeeting, WorkSession,
};
pub use provider::{ComplianceFactProvider, ProviderError, VendorId};
pub use router::csr_router;
pub use service::{CsrRatingService, CsrServiceError};
pub use views::{
    improvement_prompts, CsrRatingView, ImprovementPrompt, RatingBand, VendorComparison,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

pub const PERFECT_SCORE: f64 = 100.0;
pub const DOCUMENTATION_MAX_PENALTY: f64 = 25.0;
pub const TOOLBOX_MEETING_MAX_PENALTY: f64 = 25.0;
pub const HARNESS_INSPECTION_MAX_PENALTY: f64 = 25.0;
pub const DOCUMENT_REVIEW_MAX_PENALTY: f64 = 5.0;
/// Every scored category at its ceiling.
pub const SCORE_FLOOR: f64 = PERFECT_SCORE
    - (DOCUMENTATION_MAX_PENALTY
        + TOOLBOX_MEETING_MAX_PENALTY
        + HARNESS_INSPECTION_MAX_PENALTY
        + DOCUMENT_REVIEW_MAX_PENALTY);

const DEFAULT_TOOLBOX_WINDOW_DAYS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CsrCategory {
    Documentation,
    ToolboxMeeting,
    HarnessInspection,
    DocumentReview,
    ProjectCompletion,
}

impl CsrCategory {
    pub const fn scored() -> [Self; 4] {
        [
            Self::Documentation,
            Self::ToolboxMeeting,
            Self::HarnessInspection,
            Self::DocumentReview,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Documentation => "Documentation",
            Self::ToolboxMeeting => "Toolbox Meeting Coverage",
            Self::HarnessInspection => "Harness Inspections",
            Self::DocumentReview => "Document Review",
            Self::ProjectCompletion => "Project Completion",
        }
    }

    pub const fn max_penalty(self) -> f64 {
        match self {
            Self::Documentation => DOCUMENTATION_MAX_PENALTY,
            Self::ToolboxMeeting => TOOLBOX_MEETING_MAX_PENALTY,
            Self::HarnessInspection => HARNESS_INSPECTION_MAX_PENALTY,
            Self::DocumentReview => DOCUMENT_REVIEW_MAX_PENALTY,
            Self::ProjectCompletion => 0.0,
        }
    }

    pub const fn is_scored(self) -> bool {
        !matches!(self, Self::ProjectCompletion)
    }
}

/// Outcome of a single category scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: CsrCategory,
    pub penalty: f64,
    pub max_penalty: f64,
    /// Items meeting the requirement (documents on file, sessions covered, signatures).
    pub satisfied: usize,
    pub required: usize,
    pub detail: String,
}

/// Overall rating with the four scored categories followed by project completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsrResult {
    pub company_id: CompanyId,
    pub overall_score: f64,
    pub total_penalty: f64,
    pub categories: Vec<CategoryScore>,
}

impl CsrResult {
    pub fn category(&self, category: CsrCategory) -> Option<&CategoryScore> {
        self.categories
            .iter()
            .find(|score| score.category == category)
    }

    pub fn penalty(&self, category: CsrCategory) -> f64 {
        self.category(category)
            .map(|score| score.penalty)
            .unwrap_or(0.0)
    }

    pub fn scored_categories(&self) -> impl Iterator<Item = &CategoryScore> {
        self.categories
            .iter()
            .filter(|score| score.category.is_scored())
    }

    pub fn project_completion(&self) -> Option<&CategoryScore> {
        self.category(CsrCategory::ProjectCompletion)
    }
}

/// Tunables for the coverage rules. Ceilings and weights are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringPolicy {
    toolbox_window_days: u32,
}

impl ScoringPolicy {
    /// Even or zero windows cannot be split symmetrically and fall back to seven days.
    pub fn new(toolbox_window_days: u32) -> Self {
        let sanitized = if toolbox_window_days % 2 == 1 {
            toolbox_window_days
        } else {
            DEFAULT_TOOLBOX_WINDOW_DAYS
        };

        Self {
            toolbox_window_days: sanitized,
        }
    }

    pub fn toolbox_window_days(&self) -> u32 {
        self.toolbox_window_days
    }

    pub fn toolbox_rule(&self) -> CoverageRule {
        CoverageRule::Bidirectional {
            window_days: self.toolbox_window_days,
        }
    }

    pub fn harness_rule(&self) -> CoverageRule {
        CoverageRule::SameDay
    }
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_TOOLBOX_WINDOW_DAYS)
    }
}

/// Stateless scorer applying the penalty model to a snapshot.
#[derive(Debug, Clone, Default)]
pub struct CsrEngine {
    policy: ScoringPolicy,
}

impl CsrEngine {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    pub fn score(&self, snapshot: &CompanyComplianceSnapshot) -> CsrResult {
        let scored = [
            rules::documentation(snapshot),
            rules::toolbox_meetings(snapshot, self.policy.toolbox_rule()),
            rules::harness_inspections(snapshot, self.policy.harness_rule()),
            rules::document_review(snapshot),
        ];
        let informational = rules::project_completion(snapshot);

        let result = aggregate::combine(snapshot.company_id().clone(), scored, informational);
        debug!(
            company_id = %result.company_id,
            overall_score = result.overall_score,
            total_penalty = result.total_penalty,
            "scored company safety rating"
        );
        result
    }
}
