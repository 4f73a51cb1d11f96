//! Caller-side memo of ratings keyed by snapshot content. The engine itself never caches.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use super::domain::{CompanyComplianceSnapshot, ScoringPeriod};
use super::CsrResult;

/// SHA-256 over a canonical encoding of the snapshot plus the period bounds. Every field is
/// length-prefixed so free-text ids cannot forge neighbouring entries. Event order does not
/// affect scoring, so each section is sorted before hashing.
pub fn snapshot_fingerprint(
    snapshot: &CompanyComplianceSnapshot,
    period: Option<&ScoringPeriod>,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(entry("company", &[snapshot.company_id().to_string()]));
    match period {
        Some(period) => hasher.update(entry(
            "period",
            &[period.start().to_string(), period.end().to_string()],
        )),
        None => hasher.update(entry("period", &[])),
    }

    hash_section(
        &mut hasher,
        snapshot.required_documents().iter().map(|document| {
            entry(
                "doc",
                &[format!("{:?}", document.kind), document.present.to_string()],
            )
        }),
    );
    hash_section(
        &mut hasher,
        snapshot.work_sessions().iter().map(|session| {
            entry(
                "session",
                &[session.date.to_string(), session.project_id.clone()],
            )
        }),
    );
    hash_section(
        &mut hasher,
        snapshot
            .toolbox_meetings()
            .iter()
            .map(|meeting| entry("toolbox", &[meeting.date.to_string()])),
    );
    hash_section(
        &mut hasher,
        snapshot
            .harness_inspections()
            .iter()
            .map(|inspection| match &inspection.session_id {
                Some(session_id) => entry(
                    "harness",
                    &[inspection.date.to_string(), session_id.clone()],
                ),
                None => entry("harness", &[inspection.date.to_string()]),
            }),
    );
    hash_section(
        &mut hasher,
        snapshot.acknowledgable_documents().iter().map(|ack| {
            entry(
                "ack",
                &[
                    format!("{:?}", ack.kind),
                    ack.total_employees.to_string(),
                    ack.signed_count.to_string(),
                ],
            )
        }),
    );
    hash_section(
        &mut hasher,
        snapshot.projects().iter().map(|project| {
            entry(
                "project",
                &[project.project_id.clone(), project.completed.to_string()],
            )
        }),
    );

    format!("{:x}", hasher.finalize())
}

fn hash_section(hasher: &mut Sha256, entries: impl Iterator<Item = Vec<u8>>) {
    let mut entries: Vec<Vec<u8>> = entries.collect();
    entries.sort();
    hasher.update((entries.len() as u64).to_le_bytes());
    for entry in &entries {
        hasher.update(entry);
    }
}

/// Tag, field count, then each field as a little-endian length followed by its bytes.
fn entry(tag: &str, fields: &[String]) -> Vec<u8> {
    let mut buffer = Vec::new();
    frame(&mut buffer, tag);
    buffer.extend_from_slice(&(fields.len() as u64).to_le_bytes());
    for field in fields {
        frame(&mut buffer, field);
    }
    buffer
}

fn frame(buffer: &mut Vec<u8>, field: &str) {
    buffer.extend_from_slice(&(field.len() as u64).to_le_bytes());
    buffer.extend_from_slice(field.as_bytes());
}

#[derive(Debug, Clone)]
struct CachedRating {
    result: CsrResult,
    created_at: Instant,
}

/// TTL-bounded rating memo with oldest-first eviction once full.
#[derive(Debug)]
pub struct RatingCache {
    ttl: Duration,
    max_entries: usize,
    entries: Mutex<HashMap<String, CachedRating>>,
}

impl RatingCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, 0)
    }

    pub fn is_enabled(&self) -> bool {
        self.max_entries > 0
    }

    pub fn get(&self, key: &str) -> Option<CsrResult> {
        if !self.is_enabled() {
            return None;
        }
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, entry| entry.created_at.elapsed() <= self.ttl);
        entries.get(key).map(|entry| entry.result.clone())
    }

    pub fn insert(&self, key: String, result: CsrResult) {
        if !self.is_enabled() {
            return;
        }
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, entry| entry.created_at.elapsed() <= self.ttl);
        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            if let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, entry)| entry.created_at)
                .map(|(key, _)| key.clone())
            {
                entries.remove(&oldest);
            }
        }
        entries.insert(
            key,
            CachedRating {
                result,
                created_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
