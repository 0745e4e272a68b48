use crate::candidates::{CandidateList, CandidateSource, NameFilter};
use crate::cluster::{self, Cluster};
use crate::config::AppConfig;
use crate::error::Error;
use crate::keeper::{self, FsSizeProbe, SizeProbe, SizeTable};
use crate::matcher::{self, DuplicateGroup};
use crate::metadata::{self, MetadataRecord, SidecarFormat};
use crate::progress::ProgressReporter;
use crate::resolve::{self, Resolution};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub struct DedupeEngine {
    config: AppConfig,
    root: PathBuf,
}

/// Everything one run produced, handed to reporting, logging and removal.
#[derive(Debug)]
pub struct DedupeReport {
    pub candidates: CandidateList,
    pub records: Vec<MetadataRecord>,
    pub groups: Vec<DuplicateGroup>,
    /// Merged clusters with the keeper in the last slot.
    pub clusters: Vec<Cluster>,
    pub sizes: SizeTable,
    pub resolution: Resolution,
    pub duration: Duration,
}

impl DedupeReport {
    pub fn kept_names(&self) -> Vec<&str> {
        self.resolution.kept_names(&self.candidates)
    }

    pub fn removed_names(&self) -> Vec<&str> {
        self.resolution.removed_names(&self.candidates)
    }
}

impl DedupeEngine {
    pub fn new(config: AppConfig, root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            root: root.into(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sidecar_format(&self) -> SidecarFormat {
        SidecarFormat::from_config(&self.config)
    }

    /// List and filter names. Fails before any classification if the source
    /// cannot be read.
    pub fn collect_candidates(&self, source: &CandidateSource) -> Result<CandidateList, Error> {
        let filter = NameFilter::from_config(&self.config)?;
        let names = source.list_names()?;
        Ok(filter.apply(names))
    }

    /// Collect candidates from `source` and run the full pipeline on them.
    pub fn scan(
        &self,
        source: &CandidateSource,
        reporter: &dyn ProgressReporter,
    ) -> Result<DedupeReport, Error> {
        let candidates = self.collect_candidates(source)?;
        self.run(candidates, reporter)
    }

    /// Run the pipeline, sizing media files relative to the engine root.
    pub fn run(
        &self,
        candidates: CandidateList,
        reporter: &dyn ProgressReporter,
    ) -> Result<DedupeReport, Error> {
        let probe = FsSizeProbe::new(&self.root);
        self.run_with_probe(candidates, &probe, reporter)
    }

    /// Run the duplicate detection pipeline:
    /// 1. Read sidecar metadata for every candidate
    /// 2. Pairwise match on the two description lines
    /// 3. Merge overlapping groups into clusters
    /// 4. Move the copy to keep into each cluster's last slot
    /// 5. Classify every candidate as kept or removed
    pub fn run_with_probe(
        &self,
        candidates: CandidateList,
        probe: &dyn SizeProbe,
        reporter: &dyn ProgressReporter,
    ) -> Result<DedupeReport, Error> {
        self.config.validate()?;
        let start = Instant::now();
        let format = self.sidecar_format();

        info!("Reading metadata for {} candidates...", candidates.len());
        let records = metadata::extract_all(&self.root, &candidates, &format, reporter);

        info!("Matching descriptions...");
        let groups = matcher::find_duplicate_groups(&records, self.config.match_empty_description);
        debug!("Duplicate groups: {:?}", groups);
        let clusters = cluster::merge_groups(groups.clone());
        debug!("Cleaned clusters: {:?}", clusters);
        reporter.on_match_complete(groups.len(), clusters.len());

        info!("Comparing sizes in {} clusters...", clusters.len());
        let mut sizes = SizeTable::new();
        let clusters = keeper::select_keepers(
            clusters,
            &candidates,
            &format,
            self.config.size_factor,
            &mut sizes,
            probe,
            reporter,
        );

        let resolution = resolve::classify(candidates.len(), &clusters);
        let duration = start.elapsed();
        info!(
            "{} candidates, {} duplicate clusters, {} to remove in {:.2}s",
            candidates.len(),
            clusters.len(),
            resolution.removed_indices().len(),
            duration.as_secs_f64()
        );

        Ok(DedupeReport {
            candidates,
            records,
            groups,
            clusters,
            sizes,
            resolution,
            duration,
        })
    }
}
