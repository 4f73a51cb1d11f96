use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyId(pub String);

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Documents every company must keep on file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredDocumentKind {
    #[serde(alias = "certificate_of_insurance")]
    Coi,
    HealthSafetyManual,
    CompanyPolicy,
}

impl RequiredDocumentKind {
    pub const fn ordered() -> [Self; 3] {
        [Self::Coi, Self::HealthSafetyManual, Self::CompanyPolicy]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Coi => "Certificate of Insurance",
            Self::HealthSafetyManual => "Health & Safety Manual",
            Self::CompanyPolicy => "Company Policy",
        }
    }
}

/// Documents employees are expected to read and sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcknowledgableDocumentKind {
    HealthSafetyManual,
    CompanyPolicy,
    SafeWorkProcedures,
    SafeWorkPractices,
}

impl AcknowledgableDocumentKind {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::HealthSafetyManual,
            Self::CompanyPolicy,
            Self::SafeWorkProcedures,
            Self::SafeWorkPractices,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::HealthSafetyManual => "Health & Safety Manual",
            Self::CompanyPolicy => "Company Policy",
            Self::SafeWorkProcedures => "Safe Work Procedures",
            Self::SafeWorkPractices => "Safe Work Practices",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredDocument {
    pub kind: RequiredDocumentKind,
    pub present: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSession {
    pub date: NaiveDate,
    pub project_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolboxMeeting {
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessInspection {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Signature tally for one acknowledgable document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentAcknowledgment {
    pub kind: AcknowledgableDocumentKind,
    pub total_employees: u32,
    pub signed_count: u32,
}

impl DocumentAcknowledgment {
    pub fn unsigned(&self) -> u32 {
        self.total_employees.saturating_sub(self.signed_count)
    }
}

/// Informational project state; never contributes to the rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStatus {
    pub project_id: String,
    pub completed: bool,
}

/// Inclusive reporting window used when assembling a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ScoringPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

impl ScoringPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, SnapshotError> {
        if start > end {
            return Err(SnapshotError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for ScoringPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Loosely-typed inbound payload. `None` means the caller never supplied the field, which is
/// different from supplying an empty list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotSubmission {
    #[serde(default)]
    pub company_id: Option<CompanyId>,
    #[serde(default)]
    pub required_documents: Option<Vec<RequiredDocument>>,
    #[serde(default)]
    pub work_sessions: Option<Vec<WorkSession>>,
    #[serde(default)]
    pub toolbox_meetings: Option<Vec<ToolboxMeeting>>,
    #[serde(default)]
    pub harness_inspections: Option<Vec<HarnessInspection>>,
    #[serde(default)]
    pub acknowledgable_documents: Option<Vec<DocumentAcknowledgment>>,
    #[serde(default)]
    pub projects: Option<Vec<ProjectStatus>>,
}

/// Validated input bundle for one scoring run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SnapshotSubmission")]
pub struct CompanyComplianceSnapshot {
    company_id: CompanyId,
    required_documents: Vec<RequiredDocument>,
    work_sessions: Vec<WorkSession>,
    toolbox_meetings: Vec<ToolboxMeeting>,
    harness_inspections: Vec<HarnessInspection>,
    acknowledgable_documents: Vec<DocumentAcknowledgment>,
    projects: Vec<ProjectStatus>,
}

impl CompanyComplianceSnapshot {
    pub fn company_id(&self) -> &CompanyId {
        &self.company_id
    }

    pub fn required_documents(&self) -> &[RequiredDocument] {
        &self.required_documents
    }

    pub fn work_sessions(&self) -> &[WorkSession] {
        &self.work_sessions
    }

    pub fn toolbox_meetings(&self) -> &[ToolboxMeeting] {
        &self.toolbox_meetings
    }

    pub fn harness_inspections(&self) -> &[HarnessInspection] {
        &self.harness_inspections
    }

    pub fn acknowledgable_documents(&self) -> &[DocumentAcknowledgment] {
        &self.acknowledgable_documents
    }

    pub fn projects(&self) -> &[ProjectStatus] {
        &self.projects
    }

    /// Whether the given required document is on file. Kinds absent from the list count as
    /// missing.
    pub fn has_document(&self, kind: RequiredDocumentKind) -> bool {
        self.required_documents
            .iter()
            .any(|document| document.kind == kind && document.present)
    }

    /// Appends dated activity (e.g. from a CSV export). Appending cannot break any invariant
    /// checked at construction.
    pub fn with_activity(
        mut self,
        work_sessions: impl IntoIterator<Item = WorkSession>,
        toolbox_meetings: impl IntoIterator<Item = ToolboxMeeting>,
        harness_inspections: impl IntoIterator<Item = HarnessInspection>,
    ) -> Self {
        self.work_sessions.extend(work_sessions);
        self.toolbox_meetings.extend(toolbox_meetings);
        self.harness_inspections.extend(harness_inspections);
        self
    }
}

impl TryFrom<SnapshotSubmission> for CompanyComplianceSnapshot {
    type Error = SnapshotError;

    fn try_from(submission: SnapshotSubmission) -> Result<Self, Self::Error> {
        let company_id = submission
            .company_id
            .filter(|id| !id.0.trim().is_empty())
            .ok_or(SnapshotError::MissingSnapshotData("company_id"))?;
        let required_documents = submission
            .required_documents
            .ok_or(SnapshotError::MissingSnapshotData("required_documents"))?;
        let work_sessions = submission
            .work_sessions
            .ok_or(SnapshotError::MissingSnapshotData("work_sessions"))?;
        let toolbox_meetings = submission
            .toolbox_meetings
            .ok_or(SnapshotError::MissingSnapshotData("toolbox_meetings"))?;
        let harness_inspections = submission
            .harness_inspections
            .ok_or(SnapshotError::MissingSnapshotData("harness_inspections"))?;
        let acknowledgable_documents = submission
            .acknowledgable_documents
            .ok_or(SnapshotError::MissingSnapshotData("acknowledgable_documents"))?;

        let mut seen = BTreeSet::new();
        for document in &required_documents {
            if !seen.insert(document.kind) {
                return Err(SnapshotError::DuplicateDocument(document.kind.label()));
            }
        }

        let mut seen = BTreeSet::new();
        for acknowledgment in &acknowledgable_documents {
            if !seen.insert(acknowledgment.kind) {
                return Err(SnapshotError::DuplicateDocument(acknowledgment.kind.label()));
            }
            if acknowledgment.signed_count > acknowledgment.total_employees {
                return Err(SnapshotError::SignedExceedsEmployees {
                    kind: acknowledgment.kind.label(),
                    signed: acknowledgment.signed_count,
                    total: acknowledgment.total_employees,
                });
            }
        }

        Ok(Self {
            company_id,
            required_documents,
            work_sessions,
            toolbox_meetings,
            harness_inspections,
            acknowledgable_documents,
            projects: submission.projects.unwrap_or_default(),
        })
    }
}

/// Rejections raised while assembling a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot is missing required field `{0}`")]
    MissingSnapshotData(&'static str),
    #[error("{kind} acknowledgments list {signed} signatures for {total} employees")]
    SignedExceedsEmployees {
        kind: &'static str,
        signed: u32,
        total: u32,
    },
    #[error("{0} is listed more than once")]
    DuplicateDocument(&'static str),
    #[error("scoring period starts {start} after it ends {end}")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },
}

impl SnapshotError {
    /// Stable machine-readable classification for API payloads and logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingSnapshotData(_) => "missing_snapshot_data",
            Self::SignedExceedsEmployees { .. } | Self::DuplicateDocument(_) => {
                "invariant_violation"
            }
            Self::InvalidPeriod { .. } => "invalid_period",
        }
    }
}
