use std::sync::Arc;
use tracing::{debug, warn};

use super::cache::{snapshot_fingerprint, RatingCache};
use super::domain::{
    CompanyComplianceSnapshot, CompanyId, ScoringPeriod, SnapshotError, SnapshotSubmission,
};
use super::provider::{ComplianceFactProvider, ProviderError, VendorId};
use super::views::VendorComparison;
use super::{CsrEngine, CsrResult};

/// Service composing the fact provider, the scoring engine, and the rating cache.
pub struct CsrRatingService<P> {
    provider: Arc<P>,
    engine: Arc<CsrEngine>,
    cache: Arc<RatingCache>,
}

impl<P> CsrRatingService<P>
where
    P: ComplianceFactProvider + 'static,
{
    pub fn new(provider: Arc<P>, engine: CsrEngine, cache: RatingCache) -> Self {
        Self {
            provider,
            engine: Arc::new(engine),
            cache: Arc::new(cache),
        }
    }

    pub fn cache(&self) -> &RatingCache {
        &self.cache
    }

    /// Score an already-assembled snapshot, consulting the cache first.
    pub fn rate_snapshot(
        &self,
        snapshot: &CompanyComplianceSnapshot,
        period: Option<&ScoringPeriod>,
    ) -> CsrResult {
        let key = snapshot_fingerprint(snapshot, period);
        if let Some(result) = self.cache.get(&key) {
            debug!(company_id = %snapshot.company_id(), "rating cache hit");
            return result;
        }

        let result = self.engine.score(snapshot);
        if self.cache.is_enabled() {
            debug!(company_id = %snapshot.company_id(), "rating cache miss");
            self.cache.insert(key, result.clone());
        }
        result
    }

    /// Validate a caller-assembled submission and score it.
    pub fn rate_submission(
        &self,
        submission: SnapshotSubmission,
    ) -> Result<CsrResult, CsrServiceError> {
        let snapshot = CompanyComplianceSnapshot::try_from(submission)?;
        Ok(self.rate_snapshot(&snapshot, None))
    }

    /// Fetch the company's facts for `period` and score them.
    pub fn rate_company(
        &self,
        company_id: &CompanyId,
        period: &ScoringPeriod,
    ) -> Result<CsrResult, CsrServiceError> {
        let snapshot = self
            .provider
            .fetch_snapshot(company_id, period)
            .map_err(|error| {
                warn!(company_id = %company_id, %period, %error, "compliance fact fetch failed");
                error
            })?;

        Ok(self.rate_snapshot(&snapshot, Some(period)))
    }

    /// Rate every company under a vendor account and roll the results up.
    pub fn compare_vendor(
        &self,
        vendor_id: &VendorId,
        period: &ScoringPeriod,
    ) -> Result<VendorComparison, CsrServiceError> {
        let companies = self.provider.vendor_companies(vendor_id)?;
        let results = companies
            .iter()
            .map(|company_id| self.rate_company(company_id, period))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(VendorComparison::from_results(
            vendor_id.clone(),
            *period,
            &results,
        ))
    }
}

/// Error raised by the rating service.
#[derive(Debug, thiserror::Error)]
pub enum CsrServiceError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}
