extern crate clap;

use std::path::Path;
use std::process;

use clap::{value_t, App, AppSettings, Arg, ArgMatches, SubCommand};

extern crate library;

use library::config::ClassifierConfig;
use library::stats::LargeAreaLimits;

const EXIT_OK: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_CMDLINE_ERROR: i32 = 2;

fn main() {
    let params = match create_cli_interface().get_matches_safe() {
        Ok(params) => params,
        Err(err) if err.use_stderr() => {
            eprintln!("{}", err.message);
            process::exit(EXIT_CMDLINE_ERROR);
        }
        Err(err) => err.exit(),
    };

    let level = match params.occurrences_of("verbose") {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_module_path(false)
        .init();

    match run(&params) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("Error: {}", err);
            process::exit(EXIT_ERROR);
        }
    }
}

fn load_config(params: &ArgMatches) -> library::error::Result<ClassifierConfig> {
    match params.value_of("config") {
        Some(path) => ClassifierConfig::from_json_file(path),
        None => Ok(ClassifierConfig::default()),
    }
}

fn run(params: &ArgMatches) -> library::error::Result<i32> {
    let (name, sub) = params.subcommand();
    let sub = match sub {
        Some(sub) => sub,
        None => return Ok(EXIT_CMDLINE_ERROR),
    };

    let config = load_config(sub)?;
    let overwrite = sub.is_present("overwrite");
    // required by every subcommand
    let input = Path::new(sub.value_of("input").unwrap_or_default());

    match name {
        "closed-way-tags" => {
            let prefix = sub.value_of("output_prefix").unwrap_or("closed-way-tags");
            library::closed_way_tags(
                input,
                prefix,
                overwrite,
                sub.is_present("relations"),
                &config,
            )?;
        }
        "complex-areas" => {
            library::complex_areas(
                input,
                sub.value_of("output_simple").map(Path::new),
                sub.value_of("output_complex").map(Path::new),
                overwrite,
                &config,
            )?;
        }
        "find-problems" => {
            let errors = library::find_problems(
                input,
                sub.value_of("output").map(Path::new),
                overwrite,
                &config,
            )?;
            if errors > 0 {
                return Ok(EXIT_ERROR);
            }
        }
        "stats" => {
            library::area_stats(input, sub.value_of("output").map(Path::new), overwrite, &config)?;
        }
        "large-areas" => {
            let limits = match (
                clap::value_t!(sub, "min_ways", usize),
                clap::value_t!(sub, "min_nodes", usize),
            ) {
                (Ok(min_ways), Ok(min_nodes)) => LargeAreaLimits {
                    min_ways,
                    min_nodes,
                },
                (Err(err), _) | (_, Err(err)) => {
                    eprintln!("{}", err.message);
                    return Ok(EXIT_CMDLINE_ERROR);
                }
            };
            let prefix = sub.value_of("output_prefix").unwrap_or("large_areas");
            library::large_areas(input, prefix, overwrite, &limits, &config)?;
        }
        "closed-way-filter" => {
            let output = Path::new(sub.value_of("output").unwrap_or_default());
            library::closed_way_filter(input, output, overwrite)?;
        }
        _ => return Ok(EXIT_CMDLINE_ERROR),
    }

    Ok(EXIT_OK)
}

fn input_arg<'a>() -> Arg<'a, 'a> {
    Arg::with_name("input")
        .value_name("PBF FILE")
        .help("Input pbf file")
        .required(true)
        .index(1)
}

fn overwrite_arg<'a>() -> Arg<'a, 'a> {
    Arg::with_name("overwrite")
        .short("O")
        .long("overwrite")
        .help("Allow overwriting of output files")
}

fn config_arg<'a>() -> Arg<'a, 'a> {
    Arg::with_name("config")
        .short("C")
        .long("config")
        .value_name("JSON FILE")
        .help("Classifier configuration (tag rules, uninteresting keys, area relation types)")
        .takes_value(true)
}

fn create_cli_interface<'a>() -> App<'a, 'a> {

    App::new("OSM Area Tools - Rust")
        .version("0.1")
        .author("Filip Krumpe <filip.krumpe@fmi.uni-stuttgart.de>")
        .about("Find problems in closed ways and area relations of pbf files")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Verbose mode (-v, -vv, -vvv, etc.)")
                .multiple(true)
                .global(true),
        )
        .subcommand(
            SubCommand::with_name("closed-way-tags")
                .about("Split up closed ways according to polygon/non-polygon tags")
                .arg(input_arg())
                .arg(
                    Arg::with_name("output_prefix")
                        .short("o")
                        .long("output-prefix")
                        .value_name("PREFIX")
                        .help("Prefix for output files")
                        .takes_value(true)
                        .default_value("closed-way-tags"),
                )
                .arg(
                    Arg::with_name("relations")
                        .short("r")
                        .long("relations")
                        .help("Also classify the tags of multipolygon and boundary relations"),
                )
                .arg(overwrite_arg())
                .arg(config_arg()),
        )
        .subcommand(
            SubCommand::with_name("complex-areas")
                .about("Find complex areas")
                .arg(input_arg())
                .arg(
                    Arg::with_name("output_simple")
                        .short("s")
                        .long("output-simple")
                        .value_name("FILE")
                        .help("Where to write ids of simple areas")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("output_complex")
                        .short("c")
                        .long("output-complex")
                        .value_name("FILE")
                        .help("Where to write ids of complex areas")
                        .takes_value(true),
                )
                .group(
                    clap::ArgGroup::with_name("outputs")
                        .args(&["output_simple", "output_complex"])
                        .multiple(true)
                        .required(true),
                )
                .arg(overwrite_arg())
                .arg(config_arg()),
        )
        .subcommand(
            SubCommand::with_name("find-problems")
                .about("Find problems in area relations")
                .arg(input_arg())
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .value_name("FILE")
                        .help("Where to write ids of relations with problems")
                        .takes_value(true),
                )
                .arg(overwrite_arg())
                .arg(config_arg()),
        )
        .subcommand(
            SubCommand::with_name("stats")
                .about("Statistics about closed ways and area relations")
                .arg(input_arg())
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .value_name("JSON FILE")
                        .help("Also write the statistics to this file")
                        .takes_value(true),
                )
                .arg(overwrite_arg())
                .arg(config_arg()),
        )
        .subcommand(
            SubCommand::with_name("large-areas")
                .about("Find the largest area relations")
                .arg(input_arg())
                .arg(
                    Arg::with_name("output_prefix")
                        .short("o")
                        .long("output")
                        .value_name("PREFIX")
                        .help("Prefix for the .ids and .json output files")
                        .takes_value(true)
                        .default_value("large_areas"),
                )
                .arg(
                    Arg::with_name("min_ways")
                        .short("w")
                        .long("min-ways")
                        .value_name("NUM")
                        .help("Minimum number of way members")
                        .takes_value(true)
                        .default_value("1000"),
                )
                .arg(
                    Arg::with_name("min_nodes")
                        .short("n")
                        .long("min-nodes")
                        .value_name("NUM")
                        .help("Minimum number of nodes in the way members")
                        .takes_value(true)
                        .default_value("100000"),
                )
                .arg(overwrite_arg())
                .arg(config_arg()),
        )
        .subcommand(
            SubCommand::with_name("closed-way-filter")
                .about("Write the ids of all closed ways")
                .arg(input_arg())
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .value_name("FILE")
                        .help("Where to write the way ids")
                        .takes_value(true)
                        .required(true),
                )
                .arg(overwrite_arg()),
        )
}
