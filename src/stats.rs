use std::collections::BTreeMap;
use std::fmt;
use std::ops::AddAssign;

use serde::Serialize;

use crate::config::MpType;
use crate::parsers::{MemberType, Relation, Way};
use crate::pipeline::WayIndex;

/// Single member relations whose way has fewer nodes count as small.
pub const FEW_NODES: usize = 500;

/// Area relations with at least this many way members are large.
pub const MIN_WAYS: usize = 1000;

/// Area relations whose way members have at least this many nodes in total
/// are large.
pub const MIN_NODES: usize = 100_000;

/// Tag keys naming what kind of area a relation is, in lookup order.
pub const SUBTYPE_KEYS: [&str; 7] = [
    "boundary",
    "land_area",
    "landuse",
    "leisure",
    "natural",
    "place",
    "waterway",
];

/// Value -> number of occurrences.
pub type Histogram = BTreeMap<usize, u64>;

fn merge(into: &mut Histogram, other: Histogram) {
    for (value, num) in other {
        *into.entry(value).or_insert(0) += num;
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct AreaStats {
    pub ways_all: u64,
    pub ways_closed: u64,
    pub relations_all: u64,
    pub relations_type_multipolygon: u64,
    pub relations_type_boundary: u64,
    pub area_relations_without_tags: u64,
    pub area_relations_without_members: u64,
    pub area_relations_with_single_member: u64,
    pub area_relations_with_single_member_and_few_nodes: u64,

    pub member_nodes: u64,
    pub member_ways: u64,
    pub member_relations: u64,

    pub roles_outer: u64,
    pub roles_inner: u64,
    pub roles_empty: u64,
    pub roles_other: u64,

    pub nodes_in_ways: Histogram,
    pub ways_in_relations: Histogram,
    pub nodes_in_relations: Histogram,
}

impl AreaStats {
    pub fn add_way(&mut self, way: &Way) {
        self.ways_all += 1;
        if way.is_closed() {
            self.ways_closed += 1;
            *self.nodes_in_ways.entry(way.nodes.len()).or_insert(0) += 1;
        }
    }

    pub fn add_relation(&mut self, rel: &Relation, mp_type: Option<MpType>, index: &WayIndex) {
        self.relations_all += 1;
        match mp_type {
            Some(MpType::Multipolygon) => self.relations_type_multipolygon += 1,
            Some(MpType::Boundary) => self.relations_type_boundary += 1,
            None => return,
        }

        if rel.tags.len() == 1 {
            self.area_relations_without_tags += 1;
        }
        match rel.members.as_slice() {
            [] => self.area_relations_without_members += 1,
            [member] => {
                self.area_relations_with_single_member += 1;
                let nodes = member
                    .way()
                    .and_then(|way| index.node_count(way))
                    .unwrap_or(0);
                if nodes < FEW_NODES {
                    self.area_relations_with_single_member_and_few_nodes += 1;
                }
            }
            _ => (),
        }

        let mut way_members = 0;
        let mut nodes_in_way_members = 0;
        for member in &rel.members {
            match member.member_type {
                MemberType::Node => self.member_nodes += 1,
                MemberType::Relation => self.member_relations += 1,
                MemberType::Way => {
                    self.member_ways += 1;
                    way_members += 1;
                    match member.role.as_str() {
                        "outer" => self.roles_outer += 1,
                        "inner" => self.roles_inner += 1,
                        "" => self.roles_empty += 1,
                        _ => self.roles_other += 1,
                    }
                    if let Some(way) = member.way() {
                        nodes_in_way_members += index.node_count(way).unwrap_or(0);
                    }
                }
            }
        }

        *self.ways_in_relations.entry(way_members).or_insert(0) += 1;
        *self
            .nodes_in_relations
            .entry(nodes_in_way_members)
            .or_insert(0) += 1;
    }
}

impl AddAssign for AreaStats {
    fn add_assign(&mut self, other: Self) {
        self.ways_all += other.ways_all;
        self.ways_closed += other.ways_closed;
        self.relations_all += other.relations_all;
        self.relations_type_multipolygon += other.relations_type_multipolygon;
        self.relations_type_boundary += other.relations_type_boundary;
        self.area_relations_without_tags += other.area_relations_without_tags;
        self.area_relations_without_members += other.area_relations_without_members;
        self.area_relations_with_single_member += other.area_relations_with_single_member;
        self.area_relations_with_single_member_and_few_nodes +=
            other.area_relations_with_single_member_and_few_nodes;
        self.member_nodes += other.member_nodes;
        self.member_ways += other.member_ways;
        self.member_relations += other.member_relations;
        self.roles_outer += other.roles_outer;
        self.roles_inner += other.roles_inner;
        self.roles_empty += other.roles_empty;
        self.roles_other += other.roles_other;
        merge(&mut self.nodes_in_ways, other.nodes_in_ways);
        merge(&mut self.ways_in_relations, other.ways_in_relations);
        merge(&mut self.nodes_in_relations, other.nodes_in_relations);
    }
}

impl fmt::Display for AreaStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(
            f,
            r#"Ways:
  all:                        {}
  closed:                     {}
Relations:
  all:                        {}
  type=multipolygon:          {}
  type=boundary:              {}
Area relations:
  without tags:               {}
  without members:            {}
  with single member:         {}
  with single small member:   {}
Members:
  nodes:                      {}
  ways:                       {}
  relations:                  {}
Way member roles:
  outer:                      {}
  inner:                      {}
  empty:                      {}
  other:                      {}"#,
            self.ways_all,
            self.ways_closed,
            self.relations_all,
            self.relations_type_multipolygon,
            self.relations_type_boundary,
            self.area_relations_without_tags,
            self.area_relations_without_members,
            self.area_relations_with_single_member,
            self.area_relations_with_single_member_and_few_nodes,
            self.member_nodes,
            self.member_ways,
            self.member_relations,
            self.roles_outer,
            self.roles_inner,
            self.roles_empty,
            self.roles_other
        )?;
        write_histogram(f, "Nodes per closed way", &self.nodes_in_ways)?;
        write_histogram(f, "Way members per area relation", &self.ways_in_relations)?;
        write_histogram(f, "Nodes per area relation", &self.nodes_in_relations)
    }
}

fn write_histogram(f: &mut fmt::Formatter, title: &str, histogram: &Histogram) -> fmt::Result {
    if histogram.is_empty() {
        return Ok(());
    }
    write!(f, "\n{}:", title)?;
    for (value, num) in histogram {
        write!(f, "\n  {:>10}: {}", value, num)?;
    }
    Ok(())
}

/// Way member count and summed member node count of a relation. Ways that
/// are not in the index count with zero nodes.
fn way_member_size(rel: &Relation, index: &WayIndex) -> (usize, usize) {
    rel.way_members().fold((0, 0), |(ways, nodes), way| {
        (ways + 1, nodes + index.node_count(way).unwrap_or(0))
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LargeAreaLimits {
    pub min_ways: usize,
    pub min_nodes: usize,
}

impl Default for LargeAreaLimits {
    fn default() -> Self {
        LargeAreaLimits {
            min_ways: MIN_WAYS,
            min_nodes: MIN_NODES,
        }
    }
}

impl LargeAreaLimits {
    /// Either limit is enough.
    pub fn selects(&self, area: &LargeArea) -> bool {
        area.num_ways >= self.min_ways || area.num_nodes >= self.min_nodes
    }
}

///
/// Size and description of an area relation, one row of the large areas
/// report.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LargeArea {
    pub relation_id: i64,
    pub num_ways: usize,
    pub num_nodes: usize,
    pub num_tags: usize,
    #[serde(rename = "type")]
    pub area_type: String,
    pub key: String,
    pub value: String,
    pub name: String,
    pub name_en: String,
}

impl LargeArea {
    pub fn measure(rel: &Relation, index: &WayIndex) -> LargeArea {
        let (num_ways, num_nodes) = way_member_size(rel, index);
        let (key, value) = rel
            .tags
            .iter()
            .find(|tag| SUBTYPE_KEYS.contains(&tag.key.as_str()))
            .map(|tag| (tag.key.clone(), tag.value.clone()))
            .unwrap_or_default();
        let tag = |key: &str| rel.tags.get(key).unwrap_or_default().to_string();

        LargeArea {
            relation_id: rel.id.0,
            num_ways,
            num_nodes,
            num_tags: rel.tags.len(),
            area_type: tag("type"),
            key,
            value,
            name: tag("name"),
            name_en: tag("name:en"),
        }
    }
}

impl fmt::Display for LargeArea {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "r{}\t{}\t{}\t{}\t{}\t{}={}\t{}",
            self.relation_id,
            self.num_ways,
            self.num_nodes,
            self.num_tags,
            self.area_type,
            self.key,
            self.value,
            self.name
        )
    }
}
