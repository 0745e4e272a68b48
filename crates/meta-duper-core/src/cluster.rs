use crate::matcher::DuplicateGroup;
use std::fmt;
use tracing::{debug, trace};

/// A duplicate set after merging. The last member is the keeper slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    members: Vec<usize>,
}

impl Cluster {
    pub fn new(members: Vec<usize>) -> Self {
        Self { members }
    }

    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn anchor(&self) -> Option<usize> {
        self.members.first().copied()
    }

    pub fn keeper(&self) -> Option<usize> {
        self.members.last().copied()
    }

    /// Members that lose to the keeper.
    pub fn removable(&self) -> &[usize] {
        match self.members.split_last() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }

    pub(crate) fn swap_into_keeper_slot(&mut self, position: usize) {
        let last = self.members.len() - 1;
        self.members.swap(position, last);
    }

    /// The cluster without `index`, or `None` once fewer than two members
    /// would remain.
    pub(crate) fn without(&self, index: usize) -> Option<Cluster> {
        if self.members.len() <= 2 {
            return None;
        }
        let members = self.members.iter().copied().filter(|&m| m != index).collect();
        Some(Cluster { members })
    }
}

impl From<DuplicateGroup> for Cluster {
    fn from(group: DuplicateGroup) -> Self {
        Cluster::new(group.into_indices())
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, member) in self.members.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", member)?;
        }
        write!(f, "]")
    }
}

/// Collapse overlapping groups into clusters.
///
/// Each group, left to right, absorbs the later groups anchored at its 2nd,
/// 3rd, ... members, walking those members in order against the remaining
/// groups. The last member of a group never absorbs anything. The remaining
/// list is rebuilt on every pass.
pub fn merge_groups(groups: Vec<DuplicateGroup>) -> Vec<Cluster> {
    let found = groups.len();
    let mut remaining: Vec<DuplicateGroup> = groups;
    let mut clusters: Vec<Cluster> = Vec::with_capacity(found);

    while !remaining.is_empty() {
        let group = remaining.remove(0);
        let members = group.indices();
        let mut cursor = 1;
        let mut rest = Vec::with_capacity(remaining.len());

        for later in remaining {
            if cursor + 1 < members.len() && members[cursor] == later.anchor() {
                trace!("Group anchored at {} absorbed by {}", later.anchor(), group.anchor());
                cursor += 1;
            } else {
                rest.push(later);
            }
        }

        remaining = rest;
        clusters.push(Cluster::from(group));
    }

    debug!("Merged {} groups into {} clusters", found, clusters.len());
    clusters
}
