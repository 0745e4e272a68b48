use crate::candidates::CandidateList;
use crate::config::AppConfig;
use crate::progress::ProgressReporter;
use std::fs;
use std::io;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, trace, warn};

/// Minimum number of name segments (date, channel, title) for a sidecar to
/// take part in matching.
pub const MIN_NAME_SEGMENTS: usize = 3;

/// Identity of one candidate used for duplicate matching.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataRecord {
    pub index: usize,
    pub name: String,
    pub segments: Vec<String>,
    pub line2: String,
    pub line3: String,
    /// False for non-sidecars, short names and unreadable sidecars.
    pub matchable: bool,
}

impl MetadataRecord {
    fn empty(index: usize, name: &str) -> Self {
        Self {
            index,
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn same_description(&self, other: &MetadataRecord) -> bool {
        self.line2 == other.line2 && self.line3 == other.line3
    }
}

/// Naming rules for sidecar files.
#[derive(Debug, Clone, PartialEq)]
pub struct SidecarFormat {
    pub suffix: String,
    pub separator: String,
}

impl Default for SidecarFormat {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl SidecarFormat {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            suffix: config.sidecar_suffix.clone(),
            separator: config.segment_separator.clone(),
        }
    }

    pub fn is_sidecar(&self, name: &str) -> bool {
        name.len() > self.suffix.len() && name.ends_with(&self.suffix)
    }

    /// Name segments of a sidecar, or `None` when `name` is not a sidecar.
    pub fn segments<'a>(&self, name: &'a str) -> Option<Vec<&'a str>> {
        if !self.is_sidecar(name) {
            return None;
        }
        Some(self.recording_stem(name).split(self.separator.as_str()).collect())
    }

    /// `name` without the sidecar suffix. Companion files of one recording
    /// all start with this stem.
    pub fn recording_stem<'a>(&self, name: &'a str) -> &'a str {
        name.strip_suffix(self.suffix.as_str()).unwrap_or(name)
    }

    /// The media file a sidecar describes: the sidecar name minus its final
    /// extension (`x.ts.meta` -> `x.ts`).
    pub fn media_name<'a>(&self, name: &'a str) -> &'a str {
        match name.rsplit_once('.') {
            Some((media, _)) if !media.is_empty() => media,
            _ => name,
        }
    }
}

/// Build the metadata record for candidate `index`.
pub fn extract(root: &Path, index: usize, name: &str, format: &SidecarFormat) -> MetadataRecord {
    let segments = match format.segments(name) {
        Some(segments) => segments,
        None => {
            trace!("{} is not a sidecar", name);
            return MetadataRecord::empty(index, name);
        }
    };
    if segments.len() < MIN_NAME_SEGMENTS {
        debug!(
            "{} has {} name segments, expected at least {}",
            name,
            segments.len(),
            MIN_NAME_SEGMENTS
        );
        return MetadataRecord::empty(index, name);
    }

    let path = root.join(name);
    let (line2, line3) = match read_description_lines(&path) {
        Ok(lines) => lines,
        Err(err) => {
            warn!("Could not read sidecar {}: {}", path.display(), err);
            return MetadataRecord::empty(index, name);
        }
    };

    MetadataRecord {
        index,
        name: name.to_string(),
        segments: segments.into_iter().map(str::to_string).collect(),
        line2,
        line3,
        matchable: true,
    }
}

/// Extract records for every candidate. The result is indexed like `candidates`.
pub fn extract_all(
    root: &Path,
    candidates: &CandidateList,
    format: &SidecarFormat,
    reporter: &dyn ProgressReporter,
) -> Vec<MetadataRecord> {
    let start = Instant::now();
    let total = candidates.len();
    reporter.on_extract_start(total);

    let mut records = Vec::with_capacity(total);
    for (index, name) in candidates.iter() {
        records.push(extract(root, index, name, format));
        reporter.on_extract_progress(index + 1, total);
    }

    let sidecars = records.iter().filter(|r| r.matchable).count();
    reporter.on_extract_complete(sidecars, start.elapsed().as_secs_f64());
    debug!("{} of {} candidates have usable metadata", sidecars, total);
    records
}

/// The 2nd and 3rd lines of a sidecar, trimmed. Missing lines are empty.
pub fn read_description_lines(path: &Path) -> io::Result<(String, String)> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    let mut lines = text.lines().skip(1);
    let line2 = lines.next().unwrap_or_default().trim().to_string();
    let line3 = lines.next().unwrap_or_default().trim().to_string();
    Ok((line2, line3))
}
