use agility_scoring::callback::{CollectingCallback, LoadCallback, TracingCallback};
use agility_scoring::config::Config;
use agility_scoring::element::{load_element, save_element, Element};
use agility_scoring::run::{RunOutcome, RunScoring};
use agility_scoring::scoring::{self, EventConfig, VenueConfig};
use agility_scoring::version::ArbVersion;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

const EXIT_SUCCESS: i32 = 0;
const EXIT_CONFIG: i32 = 4;

/// Which venue document and event/division/level a command works on
#[derive(Args, Debug)]
struct Target {
    /// Venue configuration document (defaults to venue_config from the config file)
    #[arg(long)]
    venue: Option<PathBuf>,

    /// Event name, e.g. "Jumpers"
    #[arg(long)]
    event: String,

    #[arg(long)]
    division: String,

    #[arg(long)]
    level: String,

    /// Trial date (YYYY-MM-DD); unknown dates match every scoring method
    #[arg(long)]
    date: Option<NaiveDate>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List scoring methods that apply to an event/division/level
    Methods {
        #[command(flatten)]
        target: Target,
    },
    /// Validate a venue configuration document
    Check {
        /// Venue configuration document (defaults to venue_config from the config file)
        venue: Option<PathBuf>,

        /// Write the validated configuration, migrated to the current layout
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Compute faults, speed and points for a stored run
    Run {
        #[command(flatten)]
        target: Target,

        /// Run scoring document (a ByTime, ByOpenClose or ByPoints node)
        run: PathBuf,

        /// The run qualified
        #[arg(long)]
        q: bool,

        /// Placement in class
        #[arg(long)]
        place: Option<u16>,

        /// Number of dogs in class
        #[arg(long)]
        in_class: Option<u16>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "agility-score")]
#[command(about = "Dog agility scoring and title-point calculator", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/agility-scoring/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Document version of the files being read
    #[arg(long, global = true, default_value_t = ArbVersion::CURRENT)]
    doc_version: ArbVersion,

    #[command(subcommand)]
    command: Commands,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Load the venue document, reporting soft problems to `callback`, or exit.
fn load_venue(path: &Path, doc_version: ArbVersion, callback: &mut dyn LoadCallback) -> VenueConfig {
    let root = match load_element(path) {
        Ok(root) => root,
        Err(e) => {
            eprintln!("Venue error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };
    match VenueConfig::load(&root, doc_version, callback) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Venue error in {}: {}", path.display(), e);
            std::process::exit(EXIT_CONFIG);
        }
    }
}

fn print_warnings(callback: &mut CollectingCallback) {
    for msg in callback.drain() {
        eprintln!("  warning: {}", msg);
    }
}

fn venue_path(explicit: Option<PathBuf>, config: &Config) -> PathBuf {
    match explicit.or_else(|| config.venue_config.clone()) {
        Some(p) => p,
        None => {
            eprintln!("No venue configuration given.");
            eprintln!("Pass --venue or set venue_config in ~/.config/agility-scoring/config.yaml");
            std::process::exit(EXIT_CONFIG);
        }
    }
}

fn find_event<'a>(venue: &'a VenueConfig, name: &str) -> &'a EventConfig {
    match venue.events.find(name) {
        Some(e) => e,
        None => {
            eprintln!("Event '{}' not found in venue configuration.", name);
            std::process::exit(EXIT_CONFIG);
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.map(PathBuf::from);
    let config = match agility_scoring::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let use_colors = agility_scoring::output::should_use_colors();

    match cli.command {
        Commands::Methods { target } => {
            let venue = load_venue(
                &venue_path(target.venue, &config),
                cli.doc_version,
                &mut TracingCallback,
            );
            let event = find_event(&venue, &target.event);
            let methods =
                event
                    .scorings
                    .find_all_events(&target.division, &target.level, target.date, false);
            println!("{}", agility_scoring::output::format_methods(&methods, use_colors));
        }
        Commands::Check { venue, save } => {
            let path = venue_path(venue, &config);
            let mut callback = CollectingCallback::new();
            let venue = load_venue(&path, cli.doc_version, &mut callback);
            print_warnings(&mut callback);

            for event in venue.events.iter() {
                let prefix = format!("Event[{}]", event.name);
                for warning in scoring::find_overlaps(&prefix, &event.scorings) {
                    eprintln!("  warning: {}", warning);
                }
            }
            if let Err(errors) = scoring::validate_venue(&venue) {
                eprintln!("Venue configuration errors:");
                for error in errors {
                    eprintln!("  - {}", error);
                }
                std::process::exit(EXIT_CONFIG);
            }
            if cli.verbose {
                eprintln!("{} events checked in {}", venue.events.len(), path.display());
            }
            if let Some(out) = save {
                if let Err(e) = save_element(&out, &venue.to_element()) {
                    eprintln!("Save error: {:#}", e);
                    std::process::exit(EXIT_CONFIG);
                }
                if cli.verbose {
                    eprintln!("Saved {}", out.display());
                }
            }
            println!("OK");
        }
        Commands::Run {
            target,
            run,
            q,
            place,
            in_class,
        } => {
            let mut callback = CollectingCallback::new();
            let venue = load_venue(&venue_path(target.venue, &config), cli.doc_version, &mut callback);
            let event = find_event(&venue, &target.event);
            let Some(method) = event
                .scorings
                .find_event(&target.division, &target.level, target.date)
            else {
                eprintln!(
                    "No scoring method for {}/{} in '{}'.",
                    target.division, target.level, event.name
                );
                std::process::exit(EXIT_CONFIG);
            };

            let node: Element = match load_element(&run) {
                Ok(n) => n,
                Err(e) => {
                    eprintln!("Run error: {:#}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            };
            let mut scoring = match RunScoring::load(
                venue.version,
                event,
                method,
                &node,
                cli.doc_version,
                &mut callback,
            ) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Run error in {}: {}", run.display(), e);
                    std::process::exit(EXIT_CONFIG);
                }
            };
            print_warnings(&mut callback);
            scoring.resolve_table_conversion(event.has_table);

            if cli.verbose {
                eprintln!(
                    "Scoring: {}",
                    agility_scoring::output::format_method_line(method, false)
                );
            }

            let outcome = RunOutcome {
                qualified: q,
                place,
                in_class,
            };
            let report = agility_scoring::output::RunReport::build(&scoring, method, &outcome, &config);
            println!("{}", agility_scoring::output::format_run_report(&report, use_colors));
        }
    }

    std::process::exit(EXIT_SUCCESS);
}
