use chrono::{Duration, NaiveDate};
use metrics_exporter_prometheus::PrometheusHandle;
use ropeline::safety::activity::ActivityLog;
use ropeline::safety::csr::{
    AcknowledgableDocumentKind, CompanyComplianceSnapshot, CompanyId, ComplianceFactProvider,
    DocumentAcknowledgment, HarnessInspection, ProjectStatus, ProviderError, RequiredDocument,
    RequiredDocumentKind, ScoringPeriod, SnapshotSubmission, ToolboxMeeting, VendorId,
    WorkSession,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, RwLock};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Static company facts plus the dated activity the store filters per request.
#[derive(Debug, Clone)]
pub(crate) struct CompanyRecord {
    pub(crate) profile: SnapshotSubmission,
    pub(crate) activity: ActivityLog,
}

/// Process-local stand-in for the tenant database.
#[derive(Default, Clone)]
pub(crate) struct InMemoryComplianceStore {
    companies: Arc<RwLock<HashMap<CompanyId, CompanyRecord>>>,
    vendors: Arc<RwLock<HashMap<VendorId, Vec<CompanyId>>>>,
    reach_days: i64,
}

impl InMemoryComplianceStore {
    /// `reach_days` pads coverer dates around the requested period.
    pub(crate) fn new(reach_days: i64) -> Self {
        Self {
            reach_days,
            ..Self::default()
        }
    }

    pub(crate) fn upsert_company(&self, record: CompanyRecord) -> Result<(), ProviderError> {
        let company_id = record
            .profile
            .company_id
            .clone()
            .ok_or_else(|| ProviderError::Unavailable("company record without id".to_string()))?;
        let mut guard = self
            .companies
            .write()
            .map_err(|_| ProviderError::Unavailable("company store poisoned".to_string()))?;
        guard.insert(company_id, record);
        Ok(())
    }

    pub(crate) fn assign_vendor(
        &self,
        vendor_id: VendorId,
        companies: Vec<CompanyId>,
    ) -> Result<(), ProviderError> {
        let mut guard = self
            .vendors
            .write()
            .map_err(|_| ProviderError::Unavailable("vendor store poisoned".to_string()))?;
        guard.insert(vendor_id, companies);
        Ok(())
    }
}

impl ComplianceFactProvider for InMemoryComplianceStore {
    fn fetch_snapshot(
        &self,
        company_id: &CompanyId,
        period: &ScoringPeriod,
    ) -> Result<CompanyComplianceSnapshot, ProviderError> {
        let record = {
            let guard = self
                .companies
                .read()
                .map_err(|_| ProviderError::Unavailable("company store poisoned".to_string()))?;
            guard
                .get(company_id)
                .cloned()
                .ok_or_else(|| ProviderError::UnknownCompany(company_id.clone()))?
        };

        let snapshot = CompanyComplianceSnapshot::try_from(record.profile)
            .map_err(|err| ProviderError::Unavailable(err.to_string()))?;
        Ok(record
            .activity
            .restrict_to(period, self.reach_days)
            .merge_into(snapshot))
    }

    fn vendor_companies(&self, vendor_id: &VendorId) -> Result<Vec<CompanyId>, ProviderError> {
        let guard = self
            .vendors
            .read()
            .map_err(|_| ProviderError::Unavailable("vendor store poisoned".to_string()))?;
        guard
            .get(vendor_id)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownVendor(vendor_id.clone()))
    }
}

pub(crate) const DEMO_VENDOR: &str = "skyline-group";
pub(crate) const DEMO_COMPANIES: [&str; 3] =
    ["summit-rope-access", "harbour-heights", "cliffside-industrial"];

/// Seed three companies with activity over the sixty days before `today`.
pub(crate) fn seed_demo_store(
    store: &InMemoryComplianceStore,
    today: NaiveDate,
) -> Result<(), ProviderError> {
    let session_days: Vec<NaiveDate> = (0..9)
        .map(|week| today - Duration::days(2 + week * 7))
        .collect();

    // Everything on file and every session covered.
    store.upsert_company(demo_company(
        DEMO_COMPANIES[0],
        [true, true, true],
        (8, [8, 8, 8, 8]),
        &session_days,
        |index| Some(index as i64 % 2),
        |_| true,
    ))?;

    // Policy missing, toolbox meetings lapse for the older half, a few inspections skipped.
    store.upsert_company(demo_company(
        DEMO_COMPANIES[1],
        [true, true, false],
        (15, [15, 14, 13, 15]),
        &session_days,
        |index| (index < 5).then_some(1),
        |index| index % 3 != 2,
    ))?;

    // Only insurance on file, no toolbox meetings, sparse inspections.
    store.upsert_company(demo_company(
        DEMO_COMPANIES[2],
        [true, false, false],
        (6, [3, 2, 4, 1]),
        &session_days,
        |_| None,
        |index| index % 4 == 0,
    ))?;

    store.assign_vendor(
        VendorId(DEMO_VENDOR.to_string()),
        DEMO_COMPANIES
            .iter()
            .map(|company| CompanyId(company.to_string()))
            .collect(),
    )
}

fn demo_company(
    company: &str,
    documents: [bool; 3],
    acknowledgments: (u32, [u32; 4]),
    session_days: &[NaiveDate],
    meeting_offset: impl Fn(usize) -> Option<i64>,
    inspected: impl Fn(usize) -> bool,
) -> CompanyRecord {
    let (employees, signed) = acknowledgments;
    let mut activity = ActivityLog::default();

    for (index, date) in session_days.iter().copied().enumerate() {
        activity.work_sessions.push(WorkSession {
            date,
            project_id: format!("P-{}", 100 + index / 3 * 100),
        });
        if let Some(offset) = meeting_offset(index) {
            activity.toolbox_meetings.push(ToolboxMeeting {
                date: date - Duration::days(offset),
            });
        }
        if inspected(index) {
            activity.harness_inspections.push(HarnessInspection {
                date,
                session_id: Some(format!("{company}-S{index}")),
            });
        }
    }

    let profile = SnapshotSubmission {
        company_id: Some(CompanyId(company.to_string())),
        required_documents: Some(
            RequiredDocumentKind::ordered()
                .into_iter()
                .zip(documents)
                .map(|(kind, present)| RequiredDocument { kind, present })
                .collect(),
        ),
        work_sessions: Some(Vec::new()),
        toolbox_meetings: Some(Vec::new()),
        harness_inspections: Some(Vec::new()),
        acknowledgable_documents: Some(
            AcknowledgableDocumentKind::ordered()
                .into_iter()
                .zip(signed)
                .map(|(kind, signed_count)| DocumentAcknowledgment {
                    kind,
                    total_employees: employees,
                    signed_count,
                })
                .collect(),
        ),
        projects: Some(vec![
            ProjectStatus {
                project_id: "P-100".to_string(),
                completed: true,
            },
            ProjectStatus {
                project_id: "P-200".to_string(),
                completed: true,
            },
            ProjectStatus {
                project_id: "P-300".to_string(),
                completed: false,
            },
        ]),
    };

    CompanyRecord { profile, activity }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).expect("valid date")
    }

    fn seeded() -> InMemoryComplianceStore {
        let store = InMemoryComplianceStore::new(3);
        seed_demo_store(&store, today()).expect("seed succeeds");
        store
    }

    #[test]
    fn fetch_snapshot_limits_sessions_to_period() {
        let store = seeded();
        let period = ScoringPeriod::new(today() - Duration::days(20), today()).expect("period");

        let snapshot = store
            .fetch_snapshot(&CompanyId(DEMO_COMPANIES[0].to_string()), &period)
            .expect("snapshot fetched");

        assert_eq!(snapshot.work_sessions().len(), 3);
        assert!(snapshot
            .work_sessions()
            .iter()
            .all(|session| period.contains(session.date)));
        assert_eq!(snapshot.required_documents().len(), 3);
    }

    #[test]
    fn coverers_just_outside_period_still_count() {
        let store = seeded();
        // The session nine days back was briefed the day before.
        let period = ScoringPeriod::new(today() - Duration::days(9), today()).expect("period");

        let snapshot = store
            .fetch_snapshot(&CompanyId(DEMO_COMPANIES[0].to_string()), &period)
            .expect("snapshot fetched");

        assert!(snapshot
            .toolbox_meetings()
            .iter()
            .any(|meeting| meeting.date == today() - Duration::days(10)));
    }

    #[test]
    fn unknown_ids_are_reported() {
        let store = seeded();
        let period = ScoringPeriod::new(today(), today()).expect("period");

        assert!(matches!(
            store.fetch_snapshot(&CompanyId("ghost".to_string()), &period),
            Err(ProviderError::UnknownCompany(_))
        ));
        assert!(matches!(
            store.vendor_companies(&VendorId("nobody".to_string())),
            Err(ProviderError::UnknownVendor(_))
        ));
    }

    #[test]
    fn vendor_lists_seeded_companies() {
        let companies = seeded()
            .vendor_companies(&VendorId(DEMO_VENDOR.to_string()))
            .expect("vendor known");
        assert_eq!(companies.len(), 3);
    }

    #[test]
    fn parse_date_rejects_other_formats() {
        assert_eq!(parse_date(" 2025-06-30 "), Ok(today()));
        assert!(parse_date("30/06/2025").is_err());
    }
}
