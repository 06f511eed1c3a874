use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use salary_estimator::estimator::{self, EstimateInput, Preset, Profile};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_IO: i32 = 1;
const EXIT_INPUT: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Tsv,
}

#[derive(Args, Debug)]
struct EstimateArgs {
    /// Country name, e.g. "Germany" (unknown countries use the fallback baseline)
    #[arg(long)]
    country: Option<String>,

    /// Years of professional experience (0-50)
    #[arg(short, long, default_value_t = 5)]
    experience: u32,

    /// Age in years (18-80, informational)
    #[arg(long, default_value_t = 30)]
    age: u32,

    /// Company size bucket, e.g. "20 to 99 employees"
    #[arg(long)]
    company_size: Option<String>,

    /// Employment type, e.g. "Employed, full-time"
    #[arg(long)]
    employment: Option<String>,

    /// Programming language (repeat or comma-separate for several)
    #[arg(short, long = "language", value_delimiter = ',')]
    languages: Vec<String>,

    /// Read the request as JSON from a file ("-" for stdin) instead of flags
    #[arg(
        short,
        long,
        conflicts_with_all = ["country", "company_size", "employment", "languages"]
    )]
    input: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl EstimateArgs {
    fn to_input(&self) -> Result<EstimateInput> {
        match self.input {
            Some(ref path) => read_input(path),
            None => Ok(EstimateInput {
                country: self.country.clone(),
                experience: self.experience,
                age: self.age,
                company_size: self.company_size.clone(),
                employment_type: self.employment.clone(),
                languages: self.languages.clone(),
            }),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Estimate a salary
    Estimate(EstimateArgs),
    /// Show the lookup tables of the active profile (default if no subcommand)
    Tables,
    /// Check the active profile for errors
    Validate,
    /// Write a starter profile file
    Init {
        /// Where to write the profile (prompts if omitted)
        path: Option<PathBuf>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "salary-estimator")]
#[command(about = "Developer salary estimator", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to profile file (defaults to ~/.config/salary-estimator/profile.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Use a built-in profile instead of the profile file
    #[arg(long, global = true, value_enum)]
    preset: Option<Preset>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("salary_estimator=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn read_input(path: &Path) -> Result<EstimateInput> {
    if path.as_os_str() == "-" {
        let stdin = std::io::stdin();
        return serde_json::from_reader(stdin.lock()).context("Failed to parse input JSON from stdin");
    }
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file at {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse input JSON in {}", path.display()))
}

fn run_estimate(args: &EstimateArgs, profile: &Profile) {
    let input = match args.to_input() {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Input error: {:#}", e);
            std::process::exit(EXIT_IO);
        }
    };
    debug!(?input, "estimate request");

    if let Err(errors) = estimator::validate_input(&input) {
        eprintln!("Invalid input:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_INPUT);
    }

    let result = estimator::estimate_with(&input, profile);
    info!(salary = result.salary, confidence = result.confidence, "estimate ready");

    match args.format {
        OutputFormat::Text => {
            let use_colors = salary_estimator::output::should_use_colors();
            println!("{}", salary_estimator::output::format_estimate(&result, use_colors));
        }
        OutputFormat::Tsv => println!("{}", salary_estimator::output::format_tsv(&result)),
        OutputFormat::Json => match salary_estimator::output::format_json(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize result: {}", e);
                std::process::exit(EXIT_IO);
            }
        },
    }
}

/// Load the active profile, exiting with the config code if it is unusable.
fn load_validated_profile(config_path: Option<PathBuf>, preset: Option<Preset>) -> Profile {
    let profile = match salary_estimator::config::load_profile(config_path, preset) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = estimator::validate_profile(&profile) {
        eprintln!("Profile errors in '{}':", profile.name);
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    profile
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let command = cli.command.unwrap_or(Commands::Tables);
    let config_path = cli.config.map(PathBuf::from);

    match command {
        Commands::Init { path } => {
            if let Err(e) = salary_estimator::config::run_init_wizard(path.or(config_path)) {
                eprintln!("Init failed: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
        }
        Commands::Estimate(args) => {
            let profile = load_validated_profile(config_path, cli.preset);
            run_estimate(&args, &profile);
        }
        Commands::Tables => {
            let profile = load_validated_profile(config_path, cli.preset);
            let use_colors = salary_estimator::output::should_use_colors();
            println!("{}", salary_estimator::output::format_tables(&profile, use_colors));
        }
        Commands::Validate => {
            let profile = load_validated_profile(config_path, cli.preset);
            println!(
                "Profile '{}' is valid: {} countries, {} languages, {} recommendation rules",
                profile.name,
                profile.countries.len(),
                profile.language_premiums.len(),
                profile.recommendations.rules.len()
            );
        }
    }

    std::process::exit(EXIT_SUCCESS);
}
