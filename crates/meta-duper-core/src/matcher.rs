use crate::metadata::MetadataRecord;
use tracing::{debug, trace};

/// Candidate indices found equal by metadata during the pairwise scan.
/// The first index is the anchor; indices are strictly increasing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    indices: Vec<usize>,
}

impl DuplicateGroup {
    fn open(anchor: usize, first_match: usize) -> Self {
        Self {
            indices: vec![anchor, first_match],
        }
    }

    pub fn anchor(&self) -> usize {
        self.indices[0]
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }
}

impl From<Vec<usize>> for DuplicateGroup {
    fn from(indices: Vec<usize>) -> Self {
        Self { indices }
    }
}

/// Scan every pair `i < j` and group `j` under `i` when both description
/// lines are equal. Each index anchors at most one group.
///
/// With `match_empty_description` off, a record with an empty 3rd line is
/// never used as a scan source, so it neither opens nor extends a group.
pub fn find_duplicate_groups(
    records: &[MetadataRecord],
    match_empty_description: bool,
) -> Vec<DuplicateGroup> {
    let mut groups: Vec<DuplicateGroup> = Vec::new();

    for (i, record) in records.iter().enumerate() {
        if !record.matchable {
            continue;
        }
        if !match_empty_description && record.line3.is_empty() {
            trace!("Empty description for {}, not matched", record.name);
            continue;
        }

        let mut group: Option<DuplicateGroup> = None;
        for (j, other) in records.iter().enumerate().skip(i + 1) {
            if !other.matchable || !record.same_description(other) {
                continue;
            }
            trace!("Duplicate at {} cmp {}: {}", i, j, record.line2);
            match group.as_mut() {
                Some(g) => g.indices.push(j),
                None => group = Some(DuplicateGroup::open(i, j)),
            }
        }
        groups.extend(group);
    }

    debug!("Found {} duplicate groups", groups.len());
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(index: usize, line2: &str, line3: &str) -> MetadataRecord {
        MetadataRecord {
            index,
            name: format!("{index} - ch - title.ts.meta"),
            segments: vec![index.to_string(), "ch".into(), "title".into()],
            line2: line2.to_string(),
            line3: line3.to_string(),
            matchable: true,
        }
    }

    fn indices(groups: &[DuplicateGroup]) -> Vec<Vec<usize>> {
        groups.iter().map(|g| g.indices().to_vec()).collect()
    }

    #[test]
    fn test_three_identical_one_distinct() {
        let records = vec![
            record(0, "Movie", "Plot"),
            record(1, "News", "Today"),
            record(2, "Movie", "Plot"),
            record(3, "Movie", "Plot"),
        ];
        let groups = find_duplicate_groups(&records, true);
        // Every anchor of the class opens its own group; the merger collapses them.
        assert_eq!(indices(&groups), vec![vec![0, 2, 3], vec![2, 3]]);
        assert!(groups.iter().all(|g| !g.indices().contains(&1)));
        assert_eq!(groups.iter().filter(|g| g.len() == 3).count(), 1);
    }

    #[test]
    fn test_title_alone_is_not_enough() {
        let records = vec![record(0, "Movie", "Plot A"), record(1, "Movie", "Plot B")];
        assert!(find_duplicate_groups(&records, true).is_empty());
    }

    #[test]
    fn test_unmatchable_records_never_group() {
        let mut blank = record(1, "", "");
        blank.matchable = false;
        let mut other_blank = record(2, "", "");
        other_blank.matchable = false;
        let records = vec![record(0, "Movie", "Plot"), blank, other_blank];
        assert!(find_duplicate_groups(&records, true).is_empty());
    }

    #[test]
    fn test_empty_description_matches_when_enabled() {
        let records = vec![record(0, "Movie", ""), record(1, "Movie", "")];
        assert_eq!(indices(&find_duplicate_groups(&records, true)), vec![vec![0, 1]]);
    }

    #[test]
    fn test_empty_description_skipped_when_disabled() {
        let records = vec![
            record(0, "Movie", ""),
            record(1, "Movie", ""),
            record(2, "Show", "Episode"),
            record(3, "Show", "Episode"),
        ];
        let groups = find_duplicate_groups(&records, false);
        assert_eq!(indices(&groups), vec![vec![2, 3]]);
    }

    #[test]
    fn test_groups_are_ordered_by_anchor() {
        let records = vec![
            record(0, "B", "b"),
            record(1, "A", "a"),
            record(2, "B", "b"),
            record(3, "A", "a"),
        ];
        let groups = find_duplicate_groups(&records, true);
        assert_eq!(indices(&groups), vec![vec![0, 2], vec![1, 3]]);
    }
}
