//! Report persistence

use std::io::Write;
use std::sync::Mutex;

use posture_analysis::Report;
use tracing::debug;
use uuid::Uuid;

use crate::StoreError;

/// Storage collaborator for completed reports
pub trait ReportStore: Send + Sync {
    /// Store a report; ids are unique
    fn save(&self, report: Report) -> Result<(), StoreError>;

    fn get(&self, id: Uuid) -> Result<Option<Report>, StoreError>;

    /// Reports of one subject, oldest first
    fn list_for_subject(&self, subject_id: &str) -> Result<Vec<Report>, StoreError>;
}

/// In-memory store backed by a mutex-guarded vector
#[derive(Debug, Default)]
pub struct MemoryReportStore {
    reports: Mutex<Vec<Report>>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        let reports = self
            .reports
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))?;
        Ok(reports.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Snapshot of every stored report in insertion order
    pub fn all(&self) -> Result<Vec<Report>, StoreError> {
        let reports = self
            .reports
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))?;
        Ok(reports.clone())
    }
}

impl ReportStore for MemoryReportStore {
    fn save(&self, report: Report) -> Result<(), StoreError> {
        let mut reports = self
            .reports
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))?;

        if reports.iter().any(|r| r.id == report.id) {
            return Err(StoreError::Duplicate(report.id));
        }
        debug!("Stored report {} for subject {}", report.id, report.subject.id);
        reports.push(report);
        Ok(())
    }

    fn get(&self, id: Uuid) -> Result<Option<Report>, StoreError> {
        let reports = self
            .reports
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))?;
        Ok(reports.iter().find(|r| r.id == id).cloned())
    }

    fn list_for_subject(&self, subject_id: &str) -> Result<Vec<Report>, StoreError> {
        let reports = self
            .reports
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))?;

        let mut matching: Vec<Report> = reports
            .iter()
            .filter(|r| r.subject.id == subject_id)
            .cloned()
            .collect();
        matching.sort_by_key(|r| r.created_at);
        Ok(matching)
    }
}

/// Write reports as JSON lines, one report per line
pub fn export_jsonl<W: Write>(reports: &[Report], mut out: W) -> Result<usize, StoreError> {
    for report in reports {
        serde_json::to_writer(&mut out, report)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(reports.len())
}
