use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};
use std::io::Read;

use super::ActivityImportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RecordType {
    WorkSession,
    ToolboxMeeting,
    HarnessInspection,
}

impl RecordType {
    fn parse(raw: &str) -> Option<Self> {
        let normalized = raw
            .trim()
            .to_ascii_lowercase()
            .replace(['-', ' '], "_");
        match normalized.as_str() {
            "work_session" | "session" => Some(Self::WorkSession),
            "toolbox_meeting" | "toolbox" => Some(Self::ToolboxMeeting),
            "harness_inspection" | "harness" => Some(Self::HarnessInspection),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub(crate) struct ActivityRecord {
    pub(crate) record_type: RecordType,
    pub(crate) date: NaiveDate,
    pub(crate) project_id: Option<String>,
    pub(crate) session_id: Option<String>,
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<ActivityRecord>, ActivityImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut records = Vec::new();

    for row in csv_reader.records() {
        let row = row?;
        let line = row.position().map(|position| position.line()).unwrap_or(0);
        let parsed: ActivityRow = row.deserialize(Some(&headers))?;

        let record_type = RecordType::parse(&parsed.record_type).ok_or_else(|| {
            ActivityImportError::InvalidRow {
                line,
                reason: format!("unknown record type '{}'", parsed.record_type),
            }
        })?;
        let date = parse_date(&parsed.date).ok_or_else(|| ActivityImportError::InvalidRow {
            line,
            reason: format!("unparseable date '{}'", parsed.date),
        })?;
        if record_type == RecordType::WorkSession && parsed.project_id.is_none() {
            return Err(ActivityImportError::InvalidRow {
                line,
                reason: "work session rows need a Project ID".to_string(),
            });
        }

        records.push(ActivityRecord {
            record_type,
            date,
            project_id: parsed.project_id,
            session_id: parsed.session_id,
        });
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct ActivityRow {
    #[serde(rename = "Record Type")]
    record_type: String,
    #[serde(rename = "Date")]
    date: String,
    #[serde(
        rename = "Project ID",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    project_id: Option<String>,
    #[serde(
        rename = "Session ID",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    session_id: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Calendar dates or RFC 3339 timestamps; timestamps resolve to their UTC date.
pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.naive_utc().date())
}
