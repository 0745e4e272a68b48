use crate::engine::DedupeReport;
use crate::error::Error;
use crate::keeper::FileSize;
use crate::resolve::Decision;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

const HEADER: [&str; 7] = [
    "index", "result", "dupl_inx", "filename", "line2", "line3", "file_size",
];

/// One line of the audit log. Field names are the CSV header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditRow {
    pub index: i64,
    pub result: String,
    pub dupl_inx: String,
    pub filename: String,
    pub line2: String,
    pub line3: String,
    pub file_size: Option<u64>,
}

/// `result` column: "True" when the candidate is removed, spelled the way
/// existing log readers expect.
fn removal_flag(decision: Decision) -> &'static str {
    if decision == Decision::Remove {
        "True"
    } else {
        "False"
    }
}

/// Rows for every candidate in order, then one row per name skipped by an
/// excluded pattern (`index` -1, `result` "-").
pub fn audit_rows(report: &DedupeReport) -> Vec<AuditRow> {
    let mut rows: Vec<AuditRow> = report
        .resolution
        .outcomes
        .iter()
        .map(|outcome| {
            let record = report.records.get(outcome.index);
            let file_size = match report.sizes.get(outcome.index) {
                Some(FileSize::Present(bytes)) => Some(bytes),
                _ => None,
            };
            AuditRow {
                index: outcome.index as i64,
                result: removal_flag(outcome.decision).to_string(),
                dupl_inx: outcome
                    .annotation
                    .as_ref()
                    .map(|a| a.to_string())
                    .unwrap_or_default(),
                filename: report
                    .candidates
                    .get(outcome.index)
                    .unwrap_or_default()
                    .to_string(),
                line2: record.map(|r| r.line2.clone()).unwrap_or_default(),
                line3: record.map(|r| r.line3.clone()).unwrap_or_default(),
                file_size,
            }
        })
        .collect();

    rows.extend(report.candidates.skipped().iter().map(|name| AuditRow {
        index: -1,
        result: "-".to_string(),
        dupl_inx: String::new(),
        filename: name.clone(),
        line2: String::new(),
        line3: String::new(),
        file_size: None,
    }));
    rows
}

pub fn write_audit_log_to<W: Write>(writer: W, report: &DedupeReport) -> Result<usize, Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    let rows = audit_rows(report);
    if rows.is_empty() {
        wtr.write_record(HEADER)?;
    }
    for row in &rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(rows.len())
}

/// Overwrite `path` with the audit log of `report`. Returns rows written.
pub fn write_audit_log(path: &Path, report: &DedupeReport) -> Result<usize, Error> {
    let file = File::create(path)?;
    let count = write_audit_log_to(file, report)?;
    info!("Wrote {} audit rows to {}", count, path.display());
    Ok(count)
}
