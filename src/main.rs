use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use contam_check::output;
use contam_check::scoring::{self, SortOrder, WeightConfig};
use contam_check::table;
use contam_check::EngineError;

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 1;
const EXIT_CONFIG: i32 = 2;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write the default weight set to a JSON file
    InitWeights {
        /// Destination path
        #[arg(default_value = "score_weights.json")]
        path: PathBuf,
    },
}

#[derive(Parser, Debug)]
#[command(name = "contam-check")]
#[command(about = "Flag likely contaminant species in sequencing surveys", long_about = None)]
#[command(version)]
struct Cli {
    /// Input survey table (.csv, .tsv/.tab/.txt, or .json); first column
    /// is the species name, remaining columns are per-location read counts
    infile: Option<PathBuf>,

    /// Curated species reference CSV
    #[arg(short = 'd', long, default_value = "data/curated_species.csv")]
    curated: PathBuf,

    /// Property weights JSON (defaults to the shipped weight set)
    #[arg(short = 'c', long)]
    weights: Option<PathBuf>,

    /// Minimum weighted score for a species to be reported
    #[arg(short = 't', long, default_value_t = 1.0)]
    score_threshold: f64,

    /// Read count a location must exceed to count as a detection
    #[arg(short = 'l', long, default_value_t = 2000)]
    local_threshold: u64,

    /// Sort code: S (score desc), L (location count desc), A (alphabetic),
    /// I (input order, alone). Leftmost letter is the primary key.
    #[arg(short = 's', long)]
    sort: Option<String>,

    /// Input table has no header row; location names become loc2, loc3, ...
    #[arg(long)]
    no_header: bool,

    /// Write the result table as TSV to this file
    #[arg(short = 'o', long)]
    outfile: Option<PathBuf>,

    /// Print the property -> species reverse table
    #[arg(long)]
    by_property: bool,

    /// Verbose reporting (-v stats and unmatched rows, -vv adds per-species detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn exit_code(err: &EngineError) -> i32 {
    match err {
        EngineError::NotFound { .. } | EngineError::MalformedInput(_) => EXIT_INPUT,
        EngineError::InvalidArgument(_) | EngineError::ConfigurationMismatch(_) => EXIT_CONFIG,
    }
}

fn write_default_weights(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }
    let json = WeightConfig::default().to_pretty_json();
    std::fs::write(path, json + "\n")
        .with_context(|| format!("Failed to write weights to {}", path.display()))?;
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Some(Commands::InitWeights { path }) = cli.command {
        match write_default_weights(&path) {
            Ok(()) => {
                println!("Default weights written to {}", path.display());
                std::process::exit(EXIT_SUCCESS);
            }
            Err(e) => {
                eprintln!("{e:#}");
                std::process::exit(EXIT_INPUT);
            }
        }
    }

    let Some(infile) = cli.infile else {
        eprintln!("You must specify an infile name.");
        std::process::exit(EXIT_CONFIG);
    };

    // Load weights (shipped defaults unless a file was given) and validate
    // at startup, reporting every problem at once.
    let weights = match &cli.weights {
        Some(path) => match WeightConfig::load(path) {
            Ok(w) => w,
            Err(e) => {
                eprintln!("Weight config error: {e}");
                std::process::exit(exit_code(&e));
            }
        },
        None => WeightConfig::default(),
    };
    if let Err(errors) = scoring::validate_weights(&weights) {
        eprintln!("Weight config errors:");
        for error in errors {
            eprintln!("  - {error}");
        }
        std::process::exit(EXIT_CONFIG);
    }

    // Validate the sort code once, at the boundary.
    let order = match cli.sort.as_deref() {
        Some(code) => match SortOrder::parse(code) {
            Ok(order) => order,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(EXIT_CONFIG);
            }
        },
        None => SortOrder::input_order(),
    };

    let curated = match table::load_curated(&cli.curated) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Curated reference error: {e}");
            std::process::exit(exit_code(&e));
        }
    };
    if cli.verbose > 0 {
        eprintln!(
            "Loaded {} curated species with {} properties from {}",
            curated.len(),
            curated.properties().len(),
            cli.curated.display()
        );
    }

    let survey = match table::load_survey(&infile, !cli.no_header) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Input table error: {e}");
            std::process::exit(exit_code(&e));
        }
    };
    if cli.verbose > 0 {
        eprintln!(
            "Loaded {} species rows across {} locations from {}",
            survey.len(),
            survey.locations.len(),
            infile.display()
        );
    }

    let report = match scoring::score(
        &survey,
        &curated,
        &weights,
        cli.score_threshold,
        cli.local_threshold,
        &order,
    ) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(exit_code(&e));
        }
    };

    if !report.dropped_properties.is_empty() {
        eprintln!(
            "Warning: weighted properties not in curated columns were dropped: {}",
            report.dropped_properties.join(", ")
        );
    }

    let use_colors = output::should_use_colors();

    println!(
        "{}",
        output::format_summary(&report, cli.score_threshold, cli.local_threshold)
    );
    println!();

    if cli.verbose >= 2 && !report.species.is_empty() {
        // Detailed output with per-species score contributions
        for row in &report.species {
            println!("{}", output::format_species_detail(row, use_colors));
            println!();
        }
    } else {
        println!("{}", output::format_result_table(&report.species, use_colors));
    }

    if cli.by_property {
        let index = scoring::reverse_index(&report.species);
        println!();
        println!("{}", output::format_reverse_table(&index, use_colors));
    }

    if cli.verbose > 0 && !report.unmatched.is_empty() {
        eprintln!();
        eprintln!("{} rows not in the curated reference:", report.unmatched.len());
        for name in report.unmatched.iter().take(10) {
            eprintln!("  {name}");
        }
        if report.unmatched.len() > 10 {
            eprintln!("  ... and {} more", report.unmatched.len() - 10);
        }
    }

    if let Some(outfile) = &cli.outfile {
        let tsv = output::format_tsv(&report.species);
        if let Err(e) = std::fs::write(outfile, tsv + "\n") {
            eprintln!("Failed to write {}: {e}", outfile.display());
            std::process::exit(EXIT_INPUT);
        }
        if cli.verbose > 0 {
            eprintln!("Wrote {} rows to {}", report.species.len(), outfile.display());
        }
    }

    std::process::exit(EXIT_SUCCESS);
}
