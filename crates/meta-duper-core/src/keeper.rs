use crate::candidates::CandidateList;
use crate::cluster::Cluster;
use crate::metadata::SidecarFormat;
use crate::progress::ProgressReporter;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, trace, warn};

/// Looks up the on-disk size of a media file by name.
pub trait SizeProbe {
    /// `None` when the file does not exist.
    fn probe(&self, media_name: &str) -> Option<u64>;
}

/// Stats files relative to the recording directory.
pub struct FsSizeProbe {
    root: PathBuf,
}

impl FsSizeProbe {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SizeProbe for FsSizeProbe {
    fn probe(&self, media_name: &str) -> Option<u64> {
        let path = self.root.join(media_name);
        match fs::metadata(&path) {
            Ok(metadata) => Some(metadata.len()),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                warn!("Error reading metadata for {}: {}", path.display(), err);
                None
            }
        }
    }
}

impl SizeProbe for HashMap<String, u64> {
    fn probe(&self, media_name: &str) -> Option<u64> {
        self.get(media_name).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSize {
    Present(u64),
    /// Looked up, but the media file was not there. Counts as 0 bytes.
    Missing,
}

impl FileSize {
    pub fn bytes(self) -> u64 {
        match self {
            FileSize::Present(bytes) => bytes,
            FileSize::Missing => 0,
        }
    }
}

/// Sizes of the candidates looked up so far, keyed by candidate index.
/// Absent keys have not been looked up.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SizeTable {
    entries: HashMap<usize, FileSize>,
}

impl SizeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, index: usize) -> Option<FileSize> {
        self.entries.get(&index).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Size of candidate `index`, probing `media_name` on first use.
    pub fn resolve(&mut self, index: usize, media_name: &str, probe: &dyn SizeProbe) -> u64 {
        let size = *self.entries.entry(index).or_insert_with(|| match probe.probe(media_name) {
            Some(bytes) => FileSize::Present(bytes),
            None => {
                warn!("Media file {} not found, treating size as 0", media_name);
                FileSize::Missing
            }
        });
        size.bytes()
    }
}

/// Position that should move into the keeper (last) slot, if any.
///
/// The largest size wins, later positions winning ties. It replaces the last
/// entry only when it is larger than `last_size * size_factor`.
pub fn keeper_swap_position(sizes: &[u64], size_factor: f64) -> Option<usize> {
    let last = sizes.len().checked_sub(1)?;
    let mut max_size = 0u64;
    let mut max_position = 0usize;
    for (position, &size) in sizes.iter().enumerate() {
        if size >= max_size {
            max_size = size;
            max_position = position;
        }
    }

    if max_position != last && max_size as f64 > sizes[last] as f64 * size_factor {
        Some(max_position)
    } else {
        None
    }
}

/// Reorder every cluster so its last member is the copy to keep.
pub fn select_keepers(
    clusters: Vec<Cluster>,
    candidates: &CandidateList,
    format: &SidecarFormat,
    size_factor: f64,
    sizes: &mut SizeTable,
    probe: &dyn SizeProbe,
    reporter: &dyn ProgressReporter,
) -> Vec<Cluster> {
    let start = Instant::now();
    let total = clusters.len();
    reporter.on_size_start(total);

    let mut selected = Vec::with_capacity(total);
    for (done, mut cluster) in clusters.into_iter().enumerate() {
        let cluster_sizes: Vec<u64> = cluster
            .members()
            .iter()
            .map(|&index| {
                let name = candidates.get(index).unwrap_or_default();
                sizes.resolve(index, format.media_name(name), probe)
            })
            .collect();

        if let Some(position) = keeper_swap_position(&cluster_sizes, size_factor) {
            trace!(
                "Cluster {} sizes {:?}: moving position {} to keeper slot",
                cluster,
                cluster_sizes,
                position
            );
            cluster.swap_into_keeper_slot(position);
        }
        selected.push(cluster);
        reporter.on_size_progress(done + 1, total);
    }

    reporter.on_size_complete(sizes.len(), start.elapsed().as_secs_f64());
    debug!("Selected keepers for {} clusters", selected.len());
    selected
}
