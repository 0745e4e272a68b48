use crate::engine::DedupeReport;
use crate::error::Error;
use crate::metadata::SidecarFormat;
use chrono::{DateTime, Utc};
use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

#[derive(Debug)]
pub struct RemovalSummary {
    pub executed_at: DateTime<Utc>,
    pub dry_run: bool,
    /// Files deleted, or that would be deleted on a dry run.
    pub removed: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

/// Every file in `root` belonging to the recording `stem`: `<stem>.*`.
pub fn companion_files(root: &Path, stem: &str) -> Result<Vec<PathBuf>, Error> {
    let pattern = format!(
        "{}/{}.*",
        Pattern::escape(&root.to_string_lossy()),
        Pattern::escape(stem)
    );
    let mut files = Vec::new();
    for entry in glob::glob(&pattern)? {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => error!("Error listing {}: {}", pattern, e),
        }
    }
    files.sort();
    Ok(files)
}

/// Stems of every listed sidecar, including names skipped by pattern.
fn recording_stems<'a>(report: &'a DedupeReport, format: &SidecarFormat) -> Vec<&'a str> {
    report
        .candidates
        .names()
        .iter()
        .chain(report.candidates.skipped())
        .filter(|name| format.is_sidecar(name))
        .map(|name| format.recording_stem(name))
        .collect()
}

/// Stems that `<stem>.*` would also match, as `<other>.` prefixes.
fn longer_stems(stem: &str, stems: &[&str]) -> Vec<String> {
    let prefix = format!("{}.", stem);
    stems
        .iter()
        .filter(|other| other.starts_with(&prefix))
        .map(|other| format!("{}.", other))
        .collect()
}

fn belongs_to_longer_stem(path: &Path, longer: &[String]) -> bool {
    let file_name = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    longer.iter().any(|prefix| file_name.starts_with(prefix.as_str()))
}

/// Delete the media, sidecar and other companion files of every removed
/// candidate. Files of another recording whose stem extends a removed one
/// (`X` vs `X.Special`) are left alone. Refused when the classification
/// reported cluster conflicts.
pub fn execute_removal(
    root: &Path,
    report: &DedupeReport,
    format: &SidecarFormat,
    dry_run: bool,
) -> Result<RemovalSummary, Error> {
    if report.resolution.has_conflicts() {
        return Err(Error::ClusterConflict(report.resolution.conflicts.len()));
    }

    let stems = recording_stems(report, format);
    let mut removed = Vec::new();
    let mut failed = Vec::new();

    for name in report.removed_names() {
        let stem = format.recording_stem(name);
        let longer = longer_stems(stem, &stems);
        for path in companion_files(root, stem)? {
            if belongs_to_longer_stem(&path, &longer) {
                debug!("{} belongs to another recording, not removed", path.display());
                continue;
            }
            if dry_run {
                debug!("[dry-run] would remove {}", path.display());
                removed.push(path);
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!("Removed {}", path.display());
                    removed.push(path);
                }
                Err(e) => {
                    error!("Failed to remove '{}': {}", path.display(), e);
                    failed.push((path, e.to_string()));
                }
            }
        }
    }

    info!(
        "Removal executed: {} files {}, {} failed",
        removed.len(),
        if dry_run { "planned" } else { "removed" },
        failed.len()
    );
    Ok(RemovalSummary {
        executed_at: Utc::now(),
        dry_run,
        removed,
        failed,
    })
}
