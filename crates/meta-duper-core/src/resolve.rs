use crate::candidates::CandidateList;
use crate::cluster::Cluster;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Keep,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterRole {
    Removed,
    Kept,
}

/// Which cluster decided a candidate's fate, and its role in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterAnnotation {
    pub role: ClusterRole,
    pub cluster: Cluster,
}

impl fmt::Display for ClusterAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.role {
            ClusterRole::Removed => '-',
            ClusterRole::Kept => '+',
        };
        write!(f, "{} {}", marker, self.cluster)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub index: usize,
    pub decision: Decision,
    pub annotation: Option<ClusterAnnotation>,
}

/// A candidate that more than one cluster tried to annotate. The cluster
/// merger should make this impossible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterConflict {
    pub index: usize,
    pub existing: ClusterAnnotation,
    pub conflicting: ClusterAnnotation,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// One outcome per candidate, in candidate order.
    pub outcomes: Vec<Outcome>,
    pub conflicts: Vec<ClusterConflict>,
}

impl Resolution {
    pub fn outcome(&self, index: usize) -> Option<&Outcome> {
        self.outcomes.get(index)
    }

    pub fn kept_indices(&self) -> Vec<usize> {
        self.indices_with(Decision::Keep)
    }

    pub fn removed_indices(&self) -> Vec<usize> {
        self.indices_with(Decision::Remove)
    }

    pub fn kept_names<'a>(&self, candidates: &'a CandidateList) -> Vec<&'a str> {
        self.names_with(Decision::Keep, candidates)
    }

    pub fn removed_names<'a>(&self, candidates: &'a CandidateList) -> Vec<&'a str> {
        self.names_with(Decision::Remove, candidates)
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    fn indices_with(&self, decision: Decision) -> Vec<usize> {
        self.outcomes
            .iter()
            .filter(|o| o.decision == decision)
            .map(|o| o.index)
            .collect()
    }

    fn names_with<'a>(&self, decision: Decision, candidates: &'a CandidateList) -> Vec<&'a str> {
        self.indices_with(decision)
            .into_iter()
            .filter_map(|index| candidates.get(index))
            .collect()
    }
}

/// Classify every candidate as kept or removed.
///
/// `clusters` must already have their keeper in the last slot. A candidate
/// found at a non-last position of a cluster is removed and taken out of that
/// cluster; a cluster that would drop below two members is discarded.
pub fn classify(candidate_count: usize, clusters: &[Cluster]) -> Resolution {
    let (mut annotations, conflicts) = annotate(clusters);

    let mut open: Vec<Cluster> = clusters.to_vec();
    let mut outcomes = Vec::with_capacity(candidate_count);

    for index in 0..candidate_count {
        let hit = open
            .iter()
            .position(|cluster| cluster.removable().contains(&index));

        let decision = match hit {
            Some(position) => {
                open = open
                    .into_iter()
                    .enumerate()
                    .filter_map(|(i, cluster)| {
                        if i == position {
                            cluster.without(index)
                        } else {
                            Some(cluster)
                        }
                    })
                    .collect();
                Decision::Remove
            }
            None => Decision::Keep,
        };

        outcomes.push(Outcome {
            index,
            decision,
            annotation: annotations.remove(&index),
        });
    }

    debug!(
        "Classified {} candidates: {} removed",
        outcomes.len(),
        outcomes.iter().filter(|o| o.decision == Decision::Remove).count()
    );
    Resolution { outcomes, conflicts }
}

fn annotate(clusters: &[Cluster]) -> (HashMap<usize, ClusterAnnotation>, Vec<ClusterConflict>) {
    let mut annotations: HashMap<usize, ClusterAnnotation> = HashMap::new();
    let mut conflicts = Vec::new();

    for cluster in clusters {
        let last = cluster.len().saturating_sub(1);
        for (position, &index) in cluster.members().iter().enumerate() {
            let annotation = ClusterAnnotation {
                role: if position < last {
                    ClusterRole::Removed
                } else {
                    ClusterRole::Kept
                },
                cluster: cluster.clone(),
            };
            match annotations.get(&index) {
                Some(existing) => {
                    error!(
                        "Internal error: candidate {} already annotated {}, also claimed {}",
                        index, existing, annotation
                    );
                    conflicts.push(ClusterConflict {
                        index,
                        existing: existing.clone(),
                        conflicting: annotation,
                    });
                }
                None => {
                    annotations.insert(index, annotation);
                }
            }
        }
    }

    (annotations, conflicts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decisions(resolution: &Resolution) -> Vec<Decision> {
        resolution.outcomes.iter().map(|o| o.decision).collect()
    }

    #[test]
    fn test_every_candidate_gets_one_outcome() {
        let clusters = vec![Cluster::new(vec![0, 3, 5]), Cluster::new(vec![2, 4])];
        let resolution = classify(7, &clusters);

        assert_eq!(resolution.outcomes.len(), 7);
        let mut all: Vec<usize> = resolution.kept_indices();
        all.extend(resolution.removed_indices());
        all.sort();
        assert_eq!(all, (0..7).collect::<Vec<_>>());
        assert_eq!(resolution.removed_indices(), vec![0, 2, 3]);
        assert_eq!(resolution.kept_indices(), vec![1, 4, 5, 6]);
        assert!(!resolution.has_conflicts());
    }

    #[test]
    fn test_swapped_keeper_survives() {
        let clusters = vec![Cluster::new(vec![2, 1, 0])];
        let resolution = classify(3, &clusters);
        assert_eq!(
            decisions(&resolution),
            vec![Decision::Keep, Decision::Remove, Decision::Remove]
        );
    }

    #[test]
    fn test_annotations_mark_role() {
        let clusters = vec![Cluster::new(vec![1, 3])];
        let resolution = classify(4, &clusters);

        let removed = resolution.outcome(1).unwrap();
        assert_eq!(removed.annotation.as_ref().unwrap().to_string(), "- [1, 3]");
        let kept = resolution.outcome(3).unwrap();
        assert_eq!(kept.annotation.as_ref().unwrap().to_string(), "+ [1, 3]");
        assert_eq!(kept.decision, Decision::Keep);
        assert!(resolution.outcome(0).unwrap().annotation.is_none());
    }

    #[test]
    fn test_conflicting_clusters_are_reported() {
        let clusters = vec![Cluster::new(vec![0, 2]), Cluster::new(vec![2, 4])];
        let resolution = classify(5, &clusters);

        assert_eq!(resolution.conflicts.len(), 1);
        let conflict = &resolution.conflicts[0];
        assert_eq!(conflict.index, 2);
        assert_eq!(conflict.existing.to_string(), "+ [0, 2]");
        assert_eq!(conflict.conflicting.to_string(), "- [2, 4]");
        // Still exactly one outcome each.
        assert_eq!(resolution.outcomes.len(), 5);
        assert_eq!(resolution.removed_indices(), vec![0, 2]);
    }

    #[test]
    fn test_no_clusters_keeps_everything() {
        let resolution = classify(3, &[]);
        assert_eq!(resolution.kept_indices(), vec![0, 1, 2]);
        assert!(resolution.removed_indices().is_empty());
    }

    #[test]
    fn test_names_follow_candidate_order() {
        let candidates = CandidateList::new(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            vec![],
        );
        let resolution = classify(3, &[Cluster::new(vec![0, 2])]);
        assert_eq!(resolution.kept_names(&candidates), vec!["b", "c"]);
        assert_eq!(resolution.removed_names(&candidates), vec!["a"]);
    }
}
