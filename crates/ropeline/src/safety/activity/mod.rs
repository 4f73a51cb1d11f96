//! Import of field activity exports (work sessions, toolbox meetings, harness inspections).

mod parser;

use chrono::{Duration, NaiveDate};
use std::io::Read;
use std::path::Path;

use crate::safety::csr::{
    CompanyComplianceSnapshot, HarnessInspection, ScoringPeriod, ToolboxMeeting, WorkSession,
};
use parser::RecordType;

#[derive(Debug, thiserror::Error)]
pub enum ActivityImportError {
    #[error("failed to read activity export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid activity CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("activity export line {line}: {reason}")]
    InvalidRow { line: u64, reason: String },
}

/// Dated activity parsed from an export, ready to merge into a snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityLog {
    pub work_sessions: Vec<WorkSession>,
    pub toolbox_meetings: Vec<ToolboxMeeting>,
    pub harness_inspections: Vec<HarnessInspection>,
}

impl ActivityLog {
    pub fn is_empty(&self) -> bool {
        self.work_sessions.is_empty()
            && self.toolbox_meetings.is_empty()
            && self.harness_inspections.is_empty()
    }

    /// Keep sessions inside `period`; coverers may sit up to `reach_days` outside it so that
    /// sessions on the period edges can still be covered. Padding saturates at the calendar
    /// bounds.
    pub fn restrict_to(self, period: &ScoringPeriod, reach_days: i64) -> Self {
        let reach = Duration::days(reach_days);
        let padded_start = period
            .start()
            .checked_sub_signed(reach)
            .unwrap_or(NaiveDate::MIN);
        let padded_end = period
            .end()
            .checked_add_signed(reach)
            .unwrap_or(NaiveDate::MAX);
        let near = |date: NaiveDate| padded_start <= date && date <= padded_end;

        Self {
            work_sessions: self
                .work_sessions
                .into_iter()
                .filter(|session| period.contains(session.date))
                .collect(),
            toolbox_meetings: self
                .toolbox_meetings
                .into_iter()
                .filter(|meeting| near(meeting.date))
                .collect(),
            harness_inspections: self
                .harness_inspections
                .into_iter()
                .filter(|inspection| near(inspection.date))
                .collect(),
        }
    }

    pub fn merge_into(self, snapshot: CompanyComplianceSnapshot) -> CompanyComplianceSnapshot {
        snapshot.with_activity(
            self.work_sessions,
            self.toolbox_meetings,
            self.harness_inspections,
        )
    }
}

pub struct ActivityLogImporter;

impl ActivityLogImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<ActivityLog, ActivityImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<ActivityLog, ActivityImportError> {
        let mut log = ActivityLog::default();

        for record in parser::parse_records(reader)? {
            match record.record_type {
                RecordType::WorkSession => log.work_sessions.push(WorkSession {
                    date: record.date,
                    project_id: record.project_id.unwrap_or_default(),
                }),
                RecordType::ToolboxMeeting => {
                    log.toolbox_meetings.push(ToolboxMeeting { date: record.date })
                }
                RecordType::HarnessInspection => log.harness_inspections.push(HarnessInspection {
                    date: record.date,
                    session_id: record.session_id,
                }),
            }
        }

        Ok(log)
    }
}
