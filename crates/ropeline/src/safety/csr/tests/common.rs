use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::response::Response;
use chrono::{Duration, NaiveDate};
use serde_json::Value;

use crate::safety::csr::domain::{
    AcknowledgableDocumentKind, CompanyComplianceSnapshot, CompanyId, DocumentAcknowledgment,
    HarnessInspection, RequiredDocument, RequiredDocumentKind, ScoringPeriod, SnapshotSubmission,
    ToolboxMeeting, WorkSession,
};
use crate::safety::csr::provider::{ComplianceFactProvider, ProviderError, VendorId};
use crate::safety::csr::{CsrEngine, CsrRatingService, RatingCache};

pub(super) fn day(offset: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 3).expect("valid date") + Duration::days(offset)
}

pub(super) fn period() -> ScoringPeriod {
    ScoringPeriod::new(day(0), day(60)).expect("valid period")
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

pub(super) fn documents(present: [bool; 3]) -> Vec<RequiredDocument> {
    RequiredDocumentKind::ordered()
        .into_iter()
        .zip(present)
        .map(|(kind, present)| RequiredDocument { kind, present })
        .collect()
}

pub(super) fn sessions(offsets: &[i64]) -> Vec<WorkSession> {
    offsets
        .iter()
        .map(|offset| WorkSession {
            date: day(*offset),
            project_id: "tower-a".to_string(),
        })
        .collect()
}

pub(super) fn meetings(offsets: &[i64]) -> Vec<ToolboxMeeting> {
    offsets
        .iter()
        .map(|offset| ToolboxMeeting { date: day(*offset) })
        .collect()
}

pub(super) fn inspections(offsets: &[i64]) -> Vec<HarnessInspection> {
    offsets
        .iter()
        .map(|offset| HarnessInspection {
            date: day(*offset),
            session_id: None,
        })
        .collect()
}

/// Four acknowledgable documents with `employees` each; `signed` per kind in order.
pub(super) fn acknowledgments(employees: u32, signed: [u32; 4]) -> Vec<DocumentAcknowledgment> {
    AcknowledgableDocumentKind::ordered()
        .into_iter()
        .zip(signed)
        .map(|(kind, signed_count)| DocumentAcknowledgment {
            kind,
            total_employees: employees,
            signed_count,
        })
        .collect()
}

/// Everything on file, every session covered, every acknowledgment signed.
pub(super) fn clean_submission(company: &str) -> SnapshotSubmission {
    let session_days = [0, 1, 2, 8, 9];
    SnapshotSubmission {
        company_id: Some(CompanyId(company.to_string())),
        required_documents: Some(documents([true, true, true])),
        work_sessions: Some(sessions(&session_days)),
        toolbox_meetings: Some(meetings(&[1, 8])),
        harness_inspections: Some(inspections(&session_days)),
        acknowledgable_documents: Some(acknowledgments(10, [10, 10, 10, 10])),
        projects: None,
    }
}

/// Seven sessions of which three fall within a toolbox meeting's window.
pub(super) fn partially_covered_sessions() -> (Vec<WorkSession>, Vec<ToolboxMeeting>) {
    let session_days = [0, 1, 2, 10, 20, 30, 40];
    (sessions(&session_days), meetings(&[1]))
}

pub(super) fn snapshot(submission: SnapshotSubmission) -> CompanyComplianceSnapshot {
    CompanyComplianceSnapshot::try_from(submission).expect("valid snapshot")
}

#[derive(Default)]
pub(super) struct MemoryProvider {
    pub(super) companies: HashMap<CompanyId, SnapshotSubmission>,
    pub(super) vendors: HashMap<VendorId, Vec<CompanyId>>,
    pub(super) unavailable: bool,
    pub(super) fetches: AtomicUsize,
}

impl MemoryProvider {
    pub(super) fn with_company(mut self, submission: SnapshotSubmission) -> Self {
        let id = submission.company_id.clone().expect("company id");
        self.companies.insert(id, submission);
        self
    }

    pub(super) fn with_vendor(mut self, vendor: &str, companies: &[&str]) -> Self {
        self.vendors.insert(
            VendorId(vendor.to_string()),
            companies
                .iter()
                .map(|company| CompanyId(company.to_string()))
                .collect(),
        );
        self
    }

    pub(super) fn offline() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }
}

impl ComplianceFactProvider for MemoryProvider {
    fn fetch_snapshot(
        &self,
        company_id: &CompanyId,
        _period: &ScoringPeriod,
    ) -> Result<CompanyComplianceSnapshot, ProviderError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(ProviderError::Unavailable("connection refused".to_string()));
        }
        let submission = self
            .companies
            .get(company_id)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownCompany(company_id.clone()))?;
        CompanyComplianceSnapshot::try_from(submission)
            .map_err(|error| ProviderError::Unavailable(error.to_string()))
    }

    fn vendor_companies(&self, vendor_id: &VendorId) -> Result<Vec<CompanyId>, ProviderError> {
        if self.unavailable {
            return Err(ProviderError::Unavailable("connection refused".to_string()));
        }
        self.vendors
            .get(vendor_id)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownVendor(vendor_id.clone()))
    }
}

pub(super) fn build_service(provider: MemoryProvider) -> Arc<CsrRatingService<MemoryProvider>> {
    Arc::new(CsrRatingService::new(
        Arc::new(provider),
        CsrEngine::default(),
        RatingCache::new(std::time::Duration::from_secs(60), 16),
    ))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).expect("valid json body")
}
