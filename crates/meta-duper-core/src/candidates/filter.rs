use super::CandidateList;
use crate::config::AppConfig;
use crate::error::Error;
use regex::Regex;
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// Required/excluded name patterns, compiled once per run.
#[derive(Debug, Clone)]
pub struct NameFilter {
    required: Vec<Regex>,
    excluded: Vec<Regex>,
}

impl NameFilter {
    pub fn new(required: &[String], excluded: &[String]) -> Result<Self, Error> {
        Ok(Self {
            required: compile(required)?,
            excluded: compile(excluded)?,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        Self::new(&config.required_patterns, &config.excluded_patterns)
    }

    /// Build the candidate list: names matching any required pattern (all
    /// names when there are none), deduplicated and sorted, minus names that
    /// match an excluded pattern.
    pub fn apply(&self, names: Vec<String>) -> CandidateList {
        let selected: BTreeSet<String> = names
            .into_iter()
            .filter(|name| self.required.is_empty() || self.required.iter().any(|re| re.is_match(name)))
            .collect();

        let mut kept = Vec::with_capacity(selected.len());
        let mut skipped = Vec::new();
        for name in selected {
            if self.excluded.iter().any(|re| re.is_match(&name)) {
                trace!("Skipping {} by pattern", name);
                skipped.push(name);
            } else {
                kept.push(name);
            }
        }

        debug!(
            "{} candidates selected, {} skipped by pattern",
            kept.len(),
            skipped.len()
        );
        CandidateList::new(kept, skipped)
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Regex>, Error> {
    patterns
        .iter()
        .map(|p| Regex::new(p).map_err(Error::from))
        .collect()
}
