use std::fmt;

use crate::config::MpType;
use crate::parsers::{MemberType, OsmRef, Relation, RelationId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// Multipolygon relations may only have way members.
    NonWayMember {
        member_type: MemberType,
        member_ref: OsmRef,
        role: String,
    },
    /// Way members must have role `outer`, `inner` or no role.
    InvalidRole { way: OsmRef, role: String },
    DuplicateMemberWay { way: OsmRef },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub relation: RelationId,
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let id = self.relation.0;
        match &self.kind {
            ViolationKind::NonWayMember {
                member_type,
                member_ref,
                role,
            } => write!(
                f,
                "r{} non-way member {}{} (role='{}')",
                id, member_type, member_ref, role
            ),
            ViolationKind::InvalidRole { role, .. } => write!(f, "r{} wrong role '{}'", id, role),
            ViolationKind::DuplicateMemberWay { way } => {
                write!(f, "r{} has duplicate member way {}", id, way)
            }
        }
    }
}

fn is_area_role(role: &str) -> bool {
    role.is_empty() || role == "outer" || role == "inner"
}

///
/// Check the members of an area relation.
///
/// Member violations come in member order, followed by one duplicate
/// violation per way id that occurs more than once, in ascending id order.
///
pub fn check_relation(relation: &Relation, mp_type: MpType) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut way_ids = Vec::with_capacity(relation.members.len());

    for member in &relation.members {
        if member.member_type != MemberType::Way {
            if mp_type == MpType::Multipolygon {
                violations.push(ViolationKind::NonWayMember {
                    member_type: member.member_type,
                    member_ref: member.member_ref,
                    role: member.role.clone(),
                });
            }
            continue;
        }

        way_ids.push(member.member_ref);
        if !is_area_role(&member.role) {
            violations.push(ViolationKind::InvalidRole {
                way: member.member_ref,
                role: member.role.clone(),
            });
        }
    }

    way_ids.sort_unstable();
    let mut rest = way_ids.as_slice();
    while let Some(first) = rest.first() {
        let run = rest.iter().take_while(|id| *id == first).count();
        if run > 1 {
            violations.push(ViolationKind::DuplicateMemberWay { way: *first });
        }
        rest = &rest[run..];
    }

    violations
        .into_iter()
        .map(|kind| Violation {
            relation: relation.id,
            kind,
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parsers::{RelationMember, TagSet};
    use proptest::prelude::*;

    fn relation(members: Vec<RelationMember>) -> Relation {
        Relation {
            id: RelationId(17),
            tags: TagSet::new(),
            members,
        }
    }

    fn way(id: OsmRef, role: &str) -> RelationMember {
        RelationMember::new(MemberType::Way, id, role)
    }

    #[test]
    fn test_valid_relation() {
        let rel = relation(vec![way(1, "outer"), way(2, "inner"), way(3, "")]);
        assert!(check_relation(&rel, MpType::Multipolygon).is_empty());
        assert!(check_relation(&rel, MpType::Boundary).is_empty());
    }

    #[test]
    fn test_non_way_member() {
        let rel = relation(vec![
            way(1, "outer"),
            RelationMember::new(MemberType::Node, 5, "label"),
        ]);

        let violations = check_relation(&rel, MpType::Multipolygon);
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].to_string(),
            "r17 non-way member n5 (role='label')"
        );
        assert!(check_relation(&rel, MpType::Boundary).is_empty());
    }

    #[test]
    fn test_wrong_role() {
        let rel = relation(vec![
            way(1, "outer"),
            way(2, "subarea"),
            RelationMember::new(MemberType::Relation, 9, "subarea"),
        ]);

        let violations = check_relation(&rel, MpType::Boundary);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].to_string(), "r17 wrong role 'subarea'");
        assert_eq!(
            violations[0].kind,
            ViolationKind::InvalidRole {
                way: 2,
                role: "subarea".to_string()
            }
        );
    }

    #[test]
    fn test_duplicates_reported_once() {
        let rel = relation(vec![way(42, "outer"), way(42, "outer")]);
        let violations = check_relation(&rel, MpType::Multipolygon);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].to_string(), "r17 has duplicate member way 42");

        let rel = relation(vec![
            way(42, "outer"),
            way(7, "inner"),
            way(42, "outer"),
            way(42, ""),
            way(7, "inner"),
            way(42, "inner"),
        ]);
        let kinds: Vec<ViolationKind> = check_relation(&rel, MpType::Multipolygon)
            .into_iter()
            .map(|v| v.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                ViolationKind::DuplicateMemberWay { way: 7 },
                ViolationKind::DuplicateMemberWay { way: 42 },
            ]
        );
    }

    #[test]
    fn test_node_and_way_with_same_id_are_no_duplicate() {
        let rel = relation(vec![
            way(3, "outer"),
            RelationMember::new(MemberType::Node, 3, ""),
        ]);
        assert!(check_relation(&rel, MpType::Boundary).is_empty());
    }

    #[test]
    fn test_violation_order() {
        let rel = relation(vec![
            way(1, "outer"),
            way(1, "forward"),
            RelationMember::new(MemberType::Relation, 2, ""),
        ]);
        let lines: Vec<String> = check_relation(&rel, MpType::Multipolygon)
            .iter()
            .map(|v| v.to_string())
            .collect();
        assert_eq!(
            lines,
            vec![
                "r17 wrong role 'forward'",
                "r17 non-way member r2 (role='')",
                "r17 has duplicate member way 1",
            ]
        );
    }

    proptest! {
        #[test]
        fn one_violation_per_duplicated_way(ref ids in prop::collection::vec(0i64..20, 0..60)) {
            let rel = relation(ids.iter().map(|id| way(*id, "outer")).collect());
            let violations = check_relation(&rel, MpType::Multipolygon);

            let mut distinct = ids.clone();
            distinct.sort_unstable();
            distinct.dedup();
            let duplicated = distinct
                .iter()
                .filter(|id| ids.iter().filter(|other| other == id).count() > 1)
                .count();
            prop_assert_eq!(violations.len(), duplicated);
        }
    }
}
