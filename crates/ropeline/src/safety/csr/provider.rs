use serde::{Deserialize, Serialize};
use std::fmt;

use super::domain::{CompanyComplianceSnapshot, CompanyId, ScoringPeriod};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VendorId(pub String);

impl fmt::Display for VendorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Adapter boundary in front of whatever store holds documents, sessions, meetings,
/// inspections, and acknowledgments. Implementations must return a point-in-time consistent
/// snapshot; the engine is never handed partial data.
pub trait ComplianceFactProvider: Send + Sync {
    fn fetch_snapshot(
        &self,
        company_id: &CompanyId,
        period: &ScoringPeriod,
    ) -> Result<CompanyComplianceSnapshot, ProviderError>;

    /// Companies operating under a vendor account, used for property-manager comparisons.
    fn vendor_companies(&self, vendor_id: &VendorId) -> Result<Vec<CompanyId>, ProviderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("company {0} not found")]
    UnknownCompany(CompanyId),
    #[error("vendor {0} not found")]
    UnknownVendor(VendorId),
    #[error("compliance facts unavailable: {0}")]
    Unavailable(String),
}
