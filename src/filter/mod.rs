use rayon::prelude::*;

use crate::config::{ClassifierConfig, MpType};
use crate::parsers::{Relation, Way};
use crate::pipeline::WayIndex;

/// Smallest node count of a closed way that can enclose an area.
pub const MIN_RING_NODES: usize = 4;

///
/// Closed ways long enough to be checked as rings on their own.
///
pub fn is_ring_candidate(way: &Way) -> bool {
    way.nodes.len() >= MIN_RING_NODES && way.is_closed()
}

pub fn area_relation_type(rel: &Relation, config: &ClassifierConfig) -> Option<MpType> {
    config.mp_type(&rel.tags)
}

///
/// Split relations into those whose way members are all in the index and
/// those missing at least one. Both keep the input order.
///
pub fn filter_complete<'a>(
    relations: &'a [Relation],
    index: &WayIndex,
) -> (Vec<&'a Relation>, Vec<&'a Relation>) {
    relations
        .par_iter()
        .partition(|rel| rel.way_members().all(|way| index.contains(way)))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parsers::{MemberType, NodeId, RelationId, RelationMember, TagSet, WayId};

    fn way(id: i64, nodes: &[i64]) -> Way {
        Way {
            id: WayId(id),
            nodes: nodes.iter().map(|n| NodeId(*n)).collect(),
            tags: TagSet::new(),
        }
    }

    fn relation(id: i64, ways: &[i64]) -> Relation {
        Relation {
            id: RelationId(id),
            tags: vec![("type", "multipolygon")].into_iter().collect(),
            members: ways
                .iter()
                .map(|w| RelationMember::new(MemberType::Way, *w, "outer"))
                .collect(),
        }
    }

    #[test]
    fn test_ring_candidates() {
        assert!(is_ring_candidate(&way(1, &[1, 2, 3, 1])));
        assert!(!is_ring_candidate(&way(1, &[1, 2, 1])));
        assert!(!is_ring_candidate(&way(1, &[1, 2, 3, 4])));
    }

    #[test]
    fn test_area_relation_type() {
        let config = ClassifierConfig::default();
        assert_eq!(
            area_relation_type(&relation(1, &[]), &config),
            Some(MpType::Multipolygon)
        );
    }

    #[test]
    fn test_filter_complete() {
        let mut index = WayIndex::new();
        index.insert(&way(10, &[1, 2, 3, 1])).unwrap();
        index.insert(&way(11, &[4, 5, 6, 4])).unwrap();

        let relations = vec![
            relation(1, &[10, 11]),
            relation(2, &[10, 12]),
            relation(3, &[11]),
            relation(4, &[]),
        ];
        let (complete, incomplete) = filter_complete(&relations, &index);

        let complete: Vec<i64> = complete.iter().map(|r| r.id.0).collect();
        let incomplete: Vec<i64> = incomplete.iter().map(|r| r.id.0).collect();
        assert_eq!(complete, vec![1, 3, 4]);
        assert_eq!(incomplete, vec![2]);
    }
}
