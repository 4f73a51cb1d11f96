use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// How a covering event (meeting, inspection) is matched to a work session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "rule")]
pub enum CoverageRule {
    /// Covered when a coverer lies within `window_days / 2` days either side of the session.
    Bidirectional { window_days: u32 },
    /// Covered only by a coverer on the session's own date.
    SameDay,
}

impl CoverageRule {
    pub const fn reach_days(self) -> i64 {
        match self {
            Self::Bidirectional { window_days } => (window_days / 2) as i64,
            Self::SameDay => 0,
        }
    }
}

/// Count of anchors matched by at least one coverer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Coverage {
    pub covered: usize,
    pub total: usize,
}

impl Coverage {
    /// Fraction of anchors covered; an empty anchor set has nothing to miss and reports 1.0.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.covered as f64 / self.total as f64
        }
    }

    pub fn uncovered(&self) -> usize {
        self.total - self.covered
    }
}

/// Match each anchor date against the coverer dates under `rule`. Inputs may arrive in any
/// order; duplicate anchors are counted individually.
pub fn compute_coverage<A, C>(anchors: A, coverers: C, rule: CoverageRule) -> Coverage
where
    A: IntoIterator<Item = NaiveDate>,
    C: IntoIterator<Item = NaiveDate>,
{
    let mut coverers: Vec<NaiveDate> = coverers.into_iter().collect();
    coverers.sort_unstable();
    coverers.dedup();

    let reach = Duration::days(rule.reach_days());
    let mut coverage = Coverage {
        covered: 0,
        total: 0,
    };

    for anchor in anchors {
        coverage.total += 1;

        let earliest = anchor.checked_sub_signed(reach).unwrap_or(NaiveDate::MIN);
        let latest = anchor.checked_add_signed(reach).unwrap_or(NaiveDate::MAX);
        let first_candidate = coverers.partition_point(|date| *date < earliest);

        if coverers
            .get(first_candidate)
            .map(|date| *date <= latest)
            .unwrap_or(false)
        {
            coverage.covered += 1;
        }
    }

    coverage
}
