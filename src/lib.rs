use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use std::time::Instant;

use log::{info, log, warn, Level};

pub mod classify;
pub mod config;
pub mod error;
pub mod filter;
pub mod output;
pub mod parsers;
pub mod pipeline;
pub mod stats;

pub mod prelude {
    pub use crate::parsers::{NodeId, OsmRef, RelationId, WayId};
    pub use crate::parsers::{Entity, EntitySource, PbfSource};
    pub use crate::parsers::{MemberType, Relation, RelationMember, Tag, TagSet, Way};

    pub use crate::classify::{check_relation, classify_tags, classify_topology};
    pub use crate::classify::{Category, Topology, Violation, ViolationKind};
    pub use crate::config::{ClassifierConfig, MpType};
    pub use crate::error::{Error, Result};
}

use output::{create_file, create_id_list, write_json, CategoryWriter, IdListWriter};
use stats::LargeAreaLimits;
use prelude::*;

type OutputList = Option<IdListWriter<BufWriter<File>>>;

fn open_optional(path: Option<&Path>, overwrite: bool) -> Result<OutputList> {
    path.map(|path| create_id_list(path, overwrite)).transpose()
}

///
/// Split the closed ways of an OSM file by what their tags say about the
/// geometry. Writes one id list per category next to `output_prefix`.
///
pub fn closed_way_tags(
    input: &Path,
    output_prefix: &str,
    overwrite: bool,
    include_relations: bool,
    config: &ClassifierConfig,
) -> Result<()> {
    let mut source = PbfSource::open(input)?;
    let mut partitions = CategoryWriter::create(output_prefix, overwrite)?;

    let report =
        pipeline::closed_way_tags(&mut source, config, include_relations, &mut partitions)?;

    println!("{}", report);
    Ok(())
}

///
/// Write the ids of simple and complex areas. At least one of the outputs
/// should be given, otherwise only the counts are printed.
///
pub fn complex_areas(
    input: &Path,
    simple: Option<&Path>,
    complex: Option<&Path>,
    overwrite: bool,
    config: &ClassifierConfig,
) -> Result<()> {
    if simple.is_none() && complex.is_none() {
        warn!("Neither simple nor complex output given, only counting");
    }

    let mut source = PbfSource::open(input)?;
    let mut simple = open_optional(simple, overwrite)?;
    let mut complex = open_optional(complex, overwrite)?;

    let now = Instant::now();
    let report = pipeline::complex_areas(&mut source, config, &mut simple, &mut complex)?;
    info!("Classified areas in {:?}", now.elapsed());

    println!("{}", report);
    Ok(())
}

///
/// Check all area relations of an OSM file. Returns the number of problems
/// found.
///
pub fn find_problems(
    input: &Path,
    output: Option<&Path>,
    overwrite: bool,
    config: &ClassifierConfig,
) -> Result<u64> {
    let mut source = PbfSource::open(input)?;
    let mut problems = open_optional(output, overwrite)?;

    let stdout = io::stdout();
    let mut diagnostics = stdout.lock();
    let report = pipeline::find_problems(&mut source, config, &mut problems, &mut diagnostics)?;

    info!(
        "Checked {} area relations, {} with problems",
        report.relations_checked, report.relations_with_problems
    );
    log!(problem_summary_level(report.errors), "Found {} errors", report.errors);
    Ok(report.errors)
}

fn problem_summary_level(errors: u64) -> Level {
    if errors > 0 {
        Level::Warn
    } else {
        Level::Info
    }
}

///
/// Print statistics about closed ways and area relations, optionally also
/// writing them as JSON.
///
pub fn area_stats(
    input: &Path,
    output: Option<&Path>,
    overwrite: bool,
    config: &ClassifierConfig,
) -> Result<()> {
    let mut source = PbfSource::open(input)?;
    let stats = pipeline::area_stats(&mut source, config)?;

    if let Some(path) = output {
        write_json(create_file(path, overwrite)?, &stats)?;
        info!("Wrote statistics to {}", path.display());
    }

    println!("{}", stats);
    Ok(())
}

///
/// Find the largest area relations. Writes their ids to
/// `<output_prefix>.ids` and their rows to `<output_prefix>.json`.
///
pub fn large_areas(
    input: &Path,
    output_prefix: &str,
    overwrite: bool,
    limits: &LargeAreaLimits,
    config: &ClassifierConfig,
) -> Result<()> {
    let mut source = PbfSource::open(input)?;
    let ids_path = format!("{}.ids", output_prefix);
    let json_path = format!("{}.json", output_prefix);
    let mut selected = create_id_list(Path::new(&ids_path), overwrite)?;
    let rows = create_file(Path::new(&json_path), overwrite)?;

    let areas = pipeline::large_areas(&mut source, config, limits, &mut selected)?;
    write_json(rows, &areas)?;
    info!("Wrote {} large areas to {} and {}", areas.len(), ids_path, json_path);

    println!("relation\tways\tnodes\ttags\ttype\tsubtype\tname");
    for area in &areas {
        println!("{}", area);
    }
    Ok(())
}

/// Write the ids of all closed ways of an OSM file.
pub fn closed_way_filter(input: &Path, output: &Path, overwrite: bool) -> Result<()> {
    let mut source = PbfSource::open(input)?;
    let mut closed = create_id_list(output, overwrite)?;

    let count = pipeline::closed_way_filter(&mut source, &mut closed)?;
    info!("Wrote {} closed ways to {}", count, output.display());
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_problem_summary_is_a_warning() {
        assert_eq!(problem_summary_level(0), Level::Info);
        assert_eq!(problem_summary_level(3), Level::Warn);
    }
}
