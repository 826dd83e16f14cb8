//! Staged drivers feeding entity streams to the classifiers.
//!
//! Relation classification never starts before the way pass that fills the
//! [`WayIndex`] has finished; the index is only read afterwards, so the
//! relation stage can run in parallel.

mod index;

use std::collections::HashSet;
use std::fmt;
use std::io::Write;
use std::time::Instant;

use log::{debug, info, trace};
use rayon::prelude::*;

use crate::classify::{check_relation, classify_tags, classify_topology};
use crate::classify::{CategoryCounts, Topology};
use crate::config::ClassifierConfig;
use crate::error::Result;
use crate::filter;
use crate::output::{CategoryWriter, IdSink};
use crate::parsers::{Entity, EntitySource, Relation, RelationId, WayId};
use crate::stats::{AreaStats, LargeArea, LargeAreaLimits};

pub use index::WayIndex;

fn pass<S, F>(source: &mut S, name: &str, mut process: F) -> Result<()>
where
    S: EntitySource + ?Sized,
    F: FnMut(Entity) -> Result<()>,
{
    info!("Starting {} pass...", name);
    let now = Instant::now();
    let mut count: u64 = 0;
    for entity in source.entities() {
        process(entity?)?;
        count += 1;
    }
    debug!("{} pass read {} entities in {:?}", name, count, now.elapsed());
    info!("{} pass done.", name);
    Ok(())
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TagReport {
    pub ways: CategoryCounts,
    pub relations: Option<CategoryCounts>,
}

impl fmt::Display for TagReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.ways)?;
        if let Some(relations) = &self.relations {
            write!(f, "\nArea relations:\n{}", relations)?;
        }
        Ok(())
    }
}

///
/// Classify the tags of every closed way (and, if asked, of every area
/// relation) and route its id to the partition of its category.
///
pub fn closed_way_tags<S, K>(
    source: &mut S,
    config: &ClassifierConfig,
    include_relations: bool,
    partitions: &mut CategoryWriter<K>,
) -> Result<TagReport>
where
    S: EntitySource + ?Sized,
    K: IdSink,
{
    let mut ways = CategoryCounts::default();
    let mut relations = CategoryCounts::default();

    pass(source, "tag", |entity| {
        match entity {
            Entity::Way(way) if way.is_closed() => {
                let category = classify_tags(&way.tags, config);
                trace!("w{} is {}", way.id.0, category.label());
                ways.increment(category);
                partitions.write_id(category, 'w', way.id.0)?;
            }
            Entity::Relation(rel) if include_relations => {
                if config.mp_type(&rel.tags).is_some() {
                    // `type` only says this is an area
                    let category = classify_tags(&rel.tags.without("type"), config);
                    trace!("r{} is {}", rel.id.0, category.label());
                    relations.increment(category);
                    partitions.write_id(category, 'r', rel.id.0)?;
                }
            }
            _ => (),
        }
        Ok(())
    })?;
    partitions.flush()?;

    Ok(TagReport {
        ways,
        relations: if include_relations {
            Some(relations)
        } else {
            None
        },
    })
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TopologyReport {
    pub simple_ways: u64,
    pub complex_ways: u64,
    pub simple_relations: u64,
    pub complex_relations: u64,
    pub incomplete_relations: u64,
}

impl TopologyReport {
    fn count(&mut self, is_relation: bool, topology: Topology) {
        match (is_relation, topology) {
            (false, Topology::Simple) => self.simple_ways += 1,
            (false, Topology::Complex) => self.complex_ways += 1,
            (true, Topology::Simple) => self.simple_relations += 1,
            (true, Topology::Complex) => self.complex_relations += 1,
        }
    }
}

impl fmt::Display for TopologyReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "         | simple     | complex\n\
             ---------+------------+------------\n\
             Ways     |{:>11} |{:>11}\n\
             Areas    |{:>11} |{:>11}\n\
             Incomplete areas: {}",
            self.simple_ways,
            self.complex_ways,
            self.simple_relations,
            self.complex_relations,
            self.incomplete_relations
        )
    }
}

fn write_topology<A: IdSink, B: IdSink>(
    topology: Topology,
    type_char: char,
    id: i64,
    simple: &mut A,
    complex: &mut B,
) -> std::io::Result<()> {
    match topology {
        Topology::Simple => simple.write_id(type_char, id),
        Topology::Complex => complex.write_id(type_char, id),
    }
}

///
/// Sort closed ways and area relations into simple and complex ones.
///
/// 1. Relation pass: keep the area relations and the ids of their way
///    members.
/// 2. Way pass: fill the way index and classify closed ways on their own.
/// 3. Classify every relation whose way members are all indexed.
///
pub fn complex_areas<S, A, B>(
    source: &mut S,
    config: &ClassifierConfig,
    simple: &mut A,
    complex: &mut B,
) -> Result<TopologyReport>
where
    S: EntitySource + ?Sized,
    A: IdSink,
    B: IdSink,
{
    let mut report = TopologyReport::default();

    let mut relations: Vec<Relation> = Vec::new();
    let mut needed: HashSet<WayId> = HashSet::new();
    pass(source, "relation", |entity| {
        if let Entity::Relation(rel) = entity {
            if filter::area_relation_type(&rel, config).is_some() {
                needed.extend(rel.way_members());
                relations.push(rel);
            }
        }
        Ok(())
    })?;
    info!(
        "Found {} area relations with {} member ways",
        relations.len(),
        needed.len()
    );

    let mut index = WayIndex::new();
    pass(source, "way", |entity| {
        if let Entity::Way(way) = entity {
            index.record(&way, needed.contains(&way.id))?;
            if filter::is_ring_candidate(&way) {
                let topology = classify_topology(vec![way.nodes.as_slice()]);
                trace!("w{} is {:?}", way.id.0, topology);
                report.count(false, topology);
                write_topology(topology, 'w', way.id.0, simple, complex)?;
            }
        }
        Ok(())
    })?;
    let index = index;

    let (complete, incomplete) = filter::filter_complete(&relations, &index);
    for rel in &incomplete {
        debug!("r{} is missing member ways, not classified", rel.id.0);
    }
    report.incomplete_relations = incomplete.len() as u64;

    let verdicts: Vec<(RelationId, Topology)> = complete
        .par_iter()
        .map(|rel| {
            let member_nodes = rel.way_members().filter_map(|way| index.nodes(way));
            (rel.id, classify_topology(member_nodes))
        })
        .collect();

    for (id, topology) in verdicts {
        trace!("r{} is {:?}", id.0, topology);
        report.count(true, topology);
        write_topology(topology, 'r', id.0, simple, complex)?;
    }

    simple.flush()?;
    complex.flush()?;
    Ok(report)
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProblemReport {
    pub relations_checked: u64,
    pub relations_with_problems: u64,
    pub errors: u64,
}

///
/// Check every area relation, write one diagnostic line per violation and
/// the ids of the relations with at least one violation.
///
pub fn find_problems<S, K, D>(
    source: &mut S,
    config: &ClassifierConfig,
    problems: &mut K,
    diagnostics: &mut D,
) -> Result<ProblemReport>
where
    S: EntitySource + ?Sized,
    K: IdSink,
    D: Write,
{
    let mut report = ProblemReport::default();

    pass(source, "relation", |entity| {
        if let Entity::Relation(rel) = entity {
            if let Some(mp_type) = filter::area_relation_type(&rel, config) {
                report.relations_checked += 1;
                let violations = check_relation(&rel, mp_type);
                for violation in &violations {
                    writeln!(diagnostics, "{}", violation)?;
                }
                if !violations.is_empty() {
                    report.relations_with_problems += 1;
                    report.errors += violations.len() as u64;
                    problems.write_id('r', rel.id.0)?;
                }
            }
        }
        Ok(())
    })?;

    diagnostics.flush()?;
    problems.flush()?;
    Ok(report)
}

///
/// Gather statistics about closed ways and area relations.
///
pub fn area_stats<S>(source: &mut S, config: &ClassifierConfig) -> Result<AreaStats>
where
    S: EntitySource + ?Sized,
{
    let mut stats = AreaStats::default();
    let mut index = WayIndex::new();
    pass(source, "way", |entity| {
        if let Entity::Way(way) = entity {
            stats.add_way(&way);
            index.record(&way, false)?;
        }
        Ok(())
    })?;
    let index = index;

    let mut relations = Vec::new();
    pass(source, "relation", |entity| {
        if let Entity::Relation(rel) = entity {
            relations.push(rel);
        }
        Ok(())
    })?;

    let relation_stats = relations
        .par_iter()
        .fold(AreaStats::default, |mut stats, rel| {
            stats.add_relation(rel, filter::area_relation_type(rel, config), &index);
            stats
        })
        .reduce(AreaStats::default, |mut left, right| {
            left += right;
            left
        });
    stats += relation_stats;

    Ok(stats)
}

///
/// Find the area relations with many way members or many nodes in their
/// way members. Way node counts are collected first, the relations are
/// measured in parallel afterwards. Selected ids go to `selected`.
///
pub fn large_areas<S, K>(
    source: &mut S,
    config: &ClassifierConfig,
    limits: &LargeAreaLimits,
    selected: &mut K,
) -> Result<Vec<LargeArea>>
where
    S: EntitySource + ?Sized,
    K: IdSink,
{
    let mut index = WayIndex::new();
    pass(source, "way", |entity| {
        if let Entity::Way(way) = entity {
            index.record(&way, false)?;
        }
        Ok(())
    })?;
    let index = index;

    let mut relations = Vec::new();
    pass(source, "relation", |entity| {
        if let Entity::Relation(rel) = entity {
            if filter::area_relation_type(&rel, config).is_some() {
                relations.push(rel);
            }
        }
        Ok(())
    })?;

    let areas: Vec<LargeArea> = relations
        .par_iter()
        .map(|rel| LargeArea::measure(rel, &index))
        .filter(|area| limits.selects(area))
        .collect();

    for area in &areas {
        trace!(
            "r{} is large: {} ways, {} nodes",
            area.relation_id,
            area.num_ways,
            area.num_nodes
        );
        selected.write_id('r', area.relation_id)?;
    }
    selected.flush()?;
    info!(
        "Found {} large areas among {} area relations",
        areas.len(),
        relations.len()
    );
    Ok(areas)
}

/// Write the ids of all closed ways.
pub fn closed_way_filter<S, K>(source: &mut S, closed: &mut K) -> Result<u64>
where
    S: EntitySource + ?Sized,
    K: IdSink,
{
    let mut count = 0;
    pass(source, "way", |entity| {
        if let Entity::Way(way) = entity {
            if way.is_closed() {
                count += 1;
                closed.write_id('w', way.id.0)?;
            }
        }
        Ok(())
    })?;
    closed.flush()?;
    Ok(count)
}
